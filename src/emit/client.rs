//! @acp:module "Client Rendering"
//! @acp:summary "Service class and request helper text"
//! @acp:domain cli
//! @acp:layer service
//!
//! Client service text rendering
//!
//! Produces the service class that calls each operation over the network.
//! All operations go through one shared `request` helper which unwraps the
//! `{result}` / `{error}` envelope.

use serde::{Deserialize, Serialize};

use crate::conventions::Verb;

/// Flavor of the generated client class
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ClientFlavor {
    /// Plain class using `fetch`
    #[default]
    Fetch,
    /// Same class registered as an injectable root service
    Angular,
}

impl ClientFlavor {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClientFlavor::Fetch => "fetch",
            ClientFlavor::Angular => "angular",
        }
    }
}

impl std::fmt::Display for ClientFlavor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One parameter of a client operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OperationParam {
    pub name: String,
    pub type_text: String,
    pub optional: bool,
}

/// One exposed operation as the client sees it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Operation {
    pub name: String,
    pub verb: Verb,
    pub path: String,
    pub params: Vec<OperationParam>,
    /// Payload type with any `Promise<...>` wrapper removed
    pub return_type: Option<String>,
}

const REQUEST_HELPER: &str = r#"    public async request(urlPath: string, method: string, queryParams?: any, body?: any, headers?: any): Promise<any> {
        const searchParams = new URLSearchParams();
        if (queryParams) {
            for (const paramName of Object.keys(queryParams)) {
                if (queryParams[paramName] !== undefined) {
                    searchParams.set(paramName, queryParams[paramName]);
                }
            }
        }

        const url = new URL(this.serverUrl + urlPath);
        url.search = searchParams.toString();

        const init: any = { method: method.toUpperCase(), headers: { ...headers } };
        if (body) {
            init.headers["content-type"] = "application/json";
            init.body = JSON.stringify(body);
        }

        const response = await fetch(url.toString(), init);
        const data = await response.json();
        if (data.error !== undefined) {
            throw new Error(data.error);
        }
        return data.result;
    }
"#;

/// Shared request helper text, indented for a class body
pub fn request_helper() -> &'static str {
    REQUEST_HELPER
}

/// Render one operation as a class method
pub fn render_operation(operation: &Operation) -> String {
    let signature = operation
        .params
        .iter()
        .map(|p| {
            let optional = if p.optional { "?" } else { "" };
            format!("{}{}: {}", p.name, optional, p.type_text)
        })
        .collect::<Vec<_>>()
        .join(", ");

    let bag = argument_bag(&operation.params);
    let (query, body) = if operation.verb.uses_query() {
        (bag, "undefined".to_string())
    } else {
        ("undefined".to_string(), bag)
    };

    let return_type = match operation.return_type.as_deref() {
        Some(t) if !t.is_empty() => t,
        _ => "void",
    };

    format!(
        "    public async {}({}): Promise<{}> {{\n        return this.request(\"{}\", \"{}\", {}, {});\n    }}\n",
        operation.name,
        signature,
        return_type,
        operation.path,
        operation.verb.as_str(),
        query,
        body
    )
}

fn argument_bag(params: &[OperationParam]) -> String {
    if params.is_empty() {
        return "undefined".to_string();
    }
    let fields = params
        .iter()
        .map(|p| format!("{}: {}", p.name, p.name))
        .collect::<Vec<_>>()
        .join(", ");
    format!("{{ {} }}", fields)
}

/// Render the full service class for an API declaration
pub fn render_service(class_name: &str, operations: &[Operation], flavor: ClientFlavor, server_url: &str) -> String {
    let mut out = String::new();
    if flavor == ClientFlavor::Angular {
        out.push_str("@Injectable({providedIn: 'root'})\n");
    }
    out.push_str(&format!("export class {}Service {{\n", class_name));
    out.push_str(&format!("    serverUrl = {};\n\n", server_url));
    out.push_str(request_helper());
    for operation in operations {
        out.push('\n');
        out.push_str(&render_operation(operation));
    }
    out.push_str("}\n");
    out
}

/// Import lines the flavor itself needs
pub fn flavor_imports(flavor: ClientFlavor) -> Option<&'static str> {
    match flavor {
        ClientFlavor::Fetch => None,
        ClientFlavor::Angular => Some("import { Injectable } from '@angular/core';"),
    }
}
