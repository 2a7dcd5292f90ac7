//! @acp:module "Stub Emitter"
//! @acp:summary "Client service generation for annotated API classes"
//! @acp:domain cli
//! @acp:layer service
//!
//! # Stub Emitter
//!
//! Generates the client service for one API class:
//! 1. **Locate** the API class in the declaration file
//! 2. **Derive** path and verb per exposed operation (shared conventions)
//! 3. **Resolve** every non-primitive parameter and return type
//! 4. **Prepend** either embedded interface text (with `type` aliases for
//!    renamed imports) or grouped import statements
//!
//! Derivation goes through [`crate::conventions`] so the generated client and
//! the runtime dispatcher cannot disagree on routes.

pub mod client;
pub mod interfaces;

pub use client::{ClientFlavor, Operation, OperationParam};
pub use interfaces::{emit_alias, emit_interface_graph, render_declaration, EmittedNames, InterfaceGraph};

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::conventions::{endpoint_path, unwrap_async_type, verb_of};
use crate::error::{RestgenError, Result};
use crate::parse::{Declaration, Method, SourceFile};
use crate::registry::{DeclarationId, ParamType, Registry};
use crate::resolve::{
    find_api_declaration, method_referenced_types, relative_import_specifier, DeclarationResolver,
    DEFAULT_SOURCE_EXTENSION,
};

/// Default expression for the generated `serverUrl` field
pub const DEFAULT_SERVER_URL: &str = "window.location.protocol + '//' + window.location.host";

/// Settings for one emission
#[derive(Debug, Clone)]
pub struct EmitSettings {
    /// Only consider the API class with this name
    pub class_name: Option<String>,
    /// Inline referenced declarations instead of importing them
    pub embed_interfaces: bool,
    pub flavor: ClientFlavor,
    pub api_decorator: String,
    pub method_decorator: String,
    /// Extension appended to extensionless import specifiers
    pub source_extension: String,
    /// Expression assigned to the service's `serverUrl`
    pub server_url: String,
}

impl Default for EmitSettings {
    fn default() -> Self {
        Self {
            class_name: None,
            embed_interfaces: true,
            flavor: ClientFlavor::default(),
            api_decorator: "RestAPI".to_string(),
            method_decorator: "RestMethod".to_string(),
            source_extension: DEFAULT_SOURCE_EXTENSION.to_string(),
            server_url: DEFAULT_SERVER_URL.to_string(),
        }
    }
}

/// Static description of an API class
#[derive(Debug, Clone, Serialize)]
pub struct ApiDescription {
    pub class_name: String,
    pub prefix: String,
    pub source_path: PathBuf,
    pub operations: Vec<Operation>,
}

/// Result of one emission
#[derive(Debug, Clone)]
pub struct GeneratedClient {
    pub text: String,
    pub api: ApiDescription,
    /// Declarations embedded or imported, in emission order
    pub referenced: Vec<String>,
}

/// A referenced declaration and the local name the API file uses for it
#[derive(Debug, Clone)]
struct Reference {
    local: String,
    declaration: Declaration,
}

/// Generates client stubs from annotated source files
#[derive(Debug, Clone, Default)]
pub struct StubEmitter {
    settings: EmitSettings,
}

impl StubEmitter {
    pub fn new(settings: EmitSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &EmitSettings {
        &self.settings
    }

    /// Describe the API class of a declaration file without generating code
    pub fn describe(&self, declaration_path: &Path) -> Result<ApiDescription> {
        let mut resolver = DeclarationResolver::new(self.settings.source_extension.as_str());
        let file = resolver.load(declaration_path)?;
        let api = find_api_declaration(&file, &self.settings.api_decorator, self.settings.class_name.as_deref())?;
        self.describe_declaration(api, &Registry::new())
    }

    /// Generate client source text for the API class in `declaration_path`
    pub fn emit(&self, declaration_path: &Path, output_path: &Path) -> Result<String> {
        Ok(self.generate(declaration_path, output_path, &Registry::new())?.text)
    }

    /// Like [`StubEmitter::emit`], checking operations against runtime
    /// parameter types recorded in `registry`
    pub fn emit_with_registry(
        &self,
        declaration_path: &Path,
        output_path: &Path,
        registry: &Registry,
    ) -> Result<String> {
        Ok(self.generate(declaration_path, output_path, registry)?.text)
    }

    /// Generate the client and write it to `output_path`, creating parent directories
    pub fn generate_to_file(&self, declaration_path: &Path, output_path: &Path) -> Result<GeneratedClient> {
        let generated = self.generate(declaration_path, output_path, &Registry::new())?;
        if let Some(parent) = output_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(output_path, &generated.text)?;
        info!(
            output = %output_path.display(),
            operations = generated.api.operations.len(),
            "Wrote client service"
        );
        Ok(generated)
    }

    /// Run one full emission pass
    pub fn generate(
        &self,
        declaration_path: &Path,
        output_path: &Path,
        runtime: &Registry,
    ) -> Result<GeneratedClient> {
        let mut resolver = DeclarationResolver::new(self.settings.source_extension.as_str());
        let file = resolver.load(declaration_path)?;
        let api = find_api_declaration(&file, &self.settings.api_decorator, self.settings.class_name.as_deref())?;
        let description = self.describe_declaration(api, runtime)?;

        let references = self.collect_references(&mut resolver, &file, api)?;
        let service = client::render_service(
            &api.name,
            &description.operations,
            self.settings.flavor,
            &self.settings.server_url,
        );

        let mut header = String::new();
        if let Some(line) = client::flavor_imports(self.settings.flavor) {
            header.push_str(line);
            header.push('\n');
        }

        let mut body = String::new();
        let referenced = if self.settings.embed_interfaces {
            let mut emitted = EmittedNames::new();
            let mut names = Vec::new();
            for reference in &references {
                let graph = emit_interface_graph(&mut resolver, &reference.declaration, true, &mut emitted)?;
                let alias = emit_alias(&reference.local, &reference.declaration, &mut emitted);
                for part in [graph, alias].into_iter().filter(|g| !g.is_empty()) {
                    body.push_str(&part.text);
                    body.push_str("\n\n");
                    names.extend(part.names);
                }
            }
            names
        } else {
            let output_dir = output_path.parent().unwrap_or_else(|| Path::new(""));
            header.push_str(&import_statements(output_dir, &references));
            references.iter().map(|r| r.local.clone()).collect()
        };

        let mut text = header;
        if !text.is_empty() {
            text.push('\n');
        }
        text.push_str(&body);
        text.push_str(&service);

        Ok(GeneratedClient {
            text,
            api: description,
            referenced,
        })
    }

    fn describe_declaration(&self, api: &Declaration, runtime: &Registry) -> Result<ApiDescription> {
        let mut registry = Registry::new();
        registry.record_source_declaration(api, &self.settings.api_decorator, &self.settings.method_decorator);
        let id = DeclarationId::new(api.name.as_str());
        let prefix = registry.prefix(&id).unwrap_or_default().to_string();

        let mut operations = Vec::new();
        for method in api.methods().filter(|m| registry.is_exposed(&id, &m.name)) {
            check_runtime_arity(runtime, &id, method)?;
            operations.push(operation_for(&prefix, method));
        }
        debug!(class = %api.name, prefix = %prefix, operations = operations.len(), "Described API class");

        Ok(ApiDescription {
            class_name: api.name.clone(),
            prefix,
            source_path: api.source_path.clone(),
            operations,
        })
    }

    /// Resolve every non-primitive type the exposed operations mention
    fn collect_references(
        &self,
        resolver: &mut DeclarationResolver,
        file: &SourceFile,
        api: &Declaration,
    ) -> Result<Vec<Reference>> {
        let mut references: Vec<Reference> = Vec::new();
        let exposed = api
            .methods()
            .filter(|m| m.has_decorator(&self.settings.method_decorator));
        for method in exposed {
            for name in method_referenced_types(method) {
                if references.iter().any(|r| r.local == name) {
                    continue;
                }
                match resolver.resolve(&name, file)? {
                    Some(declaration) => references.push(Reference {
                        local: name,
                        declaration,
                    }),
                    None => warn!(
                        name = %name,
                        method = %method.name,
                        "Type has no resolvable declaration, leaving it unimported"
                    ),
                }
            }
        }
        Ok(references)
    }
}

/// Build the client view of one exposed method
pub fn operation_for(prefix: &str, method: &Method) -> Operation {
    let tags: Vec<ParamType> = method
        .params
        .iter()
        .map(|p| ParamType::from_type_text(p.type_or_any()))
        .collect();
    Operation {
        name: method.name.clone(),
        verb: verb_of(&method.name, &tags),
        path: endpoint_path(prefix, &method.name),
        params: method
            .params
            .iter()
            .map(|p| OperationParam {
                name: p.name.clone(),
                type_text: p.type_or_any().to_string(),
                optional: p.is_optional(),
            })
            .collect(),
        return_type: method
            .return_type
            .as_deref()
            .map(|t| unwrap_async_type(t).to_string()),
    }
}

fn check_runtime_arity(runtime: &Registry, id: &DeclarationId, method: &Method) -> Result<()> {
    if let Some(types) = runtime.param_types(id, &method.name) {
        if types.len() != method.params.len() {
            return Err(RestgenError::ArityMismatch {
                declaration: id.to_string(),
                method: method.name.clone(),
                types: types.len(),
                names: method.params.len(),
            });
        }
    }
    Ok(())
}

/// One import statement per contributing file, each naming all its types
fn import_statements(output_dir: &Path, references: &[Reference]) -> String {
    let mut groups: Vec<(&Path, Vec<String>)> = Vec::new();
    for reference in references {
        let source = reference.declaration.source_path.as_path();
        let binding = if reference.local == reference.declaration.name {
            reference.local.clone()
        } else {
            format!("{} as {}", reference.declaration.name, reference.local)
        };
        match groups.iter_mut().find(|(path, _)| *path == source) {
            Some((_, names)) => names.push(binding),
            None => groups.push((source, vec![binding])),
        }
    }

    groups
        .into_iter()
        .map(|(path, names)| {
            format!(
                "import {{ {} }} from \"{}\";\n",
                names.join(", "),
                relative_import_specifier(output_dir, path)
            )
        })
        .collect()
}
