//! @acp:module "Generate Command"
//! @acp:summary "Write the client service for an API class"
//! @acp:domain cli
//! @acp:layer handler
//!
//! Generate command: write the client service for an API class

use std::path::PathBuf;

use anyhow::{Context, Result};
use console::style;

use crate::emit::{ClientFlavor, StubEmitter};
use crate::Config;

/// Options for the generate command
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    /// Declaration file containing the API class
    pub source: PathBuf,
    /// Output file; falls back to the configured output
    pub output: Option<PathBuf>,
    /// Only consider the API class with this name
    pub class_name: Option<String>,
    /// Override the configured embed-vs-import policy
    pub embed_interfaces: Option<bool>,
    /// Override the configured client flavor
    pub flavor: Option<ClientFlavor>,
}

/// Execute the generate command
pub fn execute_generate(options: GenerateOptions, config: &Config) -> Result<()> {
    let output = options
        .output
        .or_else(|| config.output.clone())
        .context("No output path given (use --output or set \"output\" in the config)")?;

    let mut settings = config.emit_settings();
    settings.class_name = options.class_name;
    if let Some(embed) = options.embed_interfaces {
        settings.embed_interfaces = embed;
    }
    if let Some(flavor) = options.flavor {
        settings.flavor = flavor;
    }
    let embed = settings.embed_interfaces;

    let generated = StubEmitter::new(settings)
        .generate_to_file(&options.source, &output)
        .with_context(|| format!("Failed to generate client for {}", options.source.display()))?;

    println!(
        "{} Generated {}Service ({} operations) -> {}",
        style("✓").green(),
        generated.api.class_name,
        generated.api.operations.len(),
        output.display()
    );
    if !generated.referenced.is_empty() {
        let mode = if embed { "Embedded" } else { "Imported" };
        println!(
            "  {} types: {}",
            mode,
            style(generated.referenced.join(", ")).dim()
        );
    }

    Ok(())
}
