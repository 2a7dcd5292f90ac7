//! @acp:module "Routes Command"
//! @acp:summary "Print the statically derived route table"
//! @acp:domain cli
//! @acp:layer handler
//!
//! Routes command: print the route table of an API class

use std::path::PathBuf;

use anyhow::Result;
use console::style;

use crate::emit::StubEmitter;
use crate::Config;

/// Options for the routes command
#[derive(Debug, Clone)]
pub struct RoutesOptions {
    /// Declaration file containing the API class
    pub source: PathBuf,
    /// Only consider the API class with this name
    pub class_name: Option<String>,
    /// Print JSON instead of a table
    pub json: bool,
}

/// Execute the routes command
pub fn execute_routes(options: RoutesOptions, config: &Config) -> Result<()> {
    let mut settings = config.emit_settings();
    settings.class_name = options.class_name;
    let api = StubEmitter::new(settings).describe(&options.source)?;

    if options.json {
        println!("{}", serde_json::to_string_pretty(&api)?);
        return Ok(());
    }

    println!(
        "{} {} ({})",
        style("→").cyan(),
        style(&api.class_name).bold(),
        api.source_path.display()
    );
    if api.operations.is_empty() {
        println!("  {} No exposed operations", style("•").dim());
        return Ok(());
    }

    let width = api
        .operations
        .iter()
        .map(|op| op.path.len())
        .max()
        .unwrap_or(0);
    for op in &api.operations {
        let params: Vec<String> = op
            .params
            .iter()
            .map(|p| format!("{}{}: {}", p.name, if p.optional { "?" } else { "" }, p.type_text))
            .collect();
        println!(
            "  {:<6} {:<width$}  {}({})",
            style(op.verb.as_str().to_uppercase()).yellow(),
            op.path,
            op.name,
            params.join(", "),
            width = width
        );
    }

    Ok(())
}
