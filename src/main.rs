#![forbid(unsafe_code)]
//! restgen command line interface

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use console::style;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use restgen::commands::{execute_generate, execute_routes, GenerateOptions, RoutesOptions};
use restgen::config::DEFAULT_CONFIG_FILE;
use restgen::emit::ClientFlavor;
use restgen::Config;

#[derive(Parser)]
#[command(name = "restgen")]
#[command(about = "Generate REST client services from annotated TypeScript API classes")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the client service for an API class
    Generate {
        /// TypeScript file declaring the API class
        source: PathBuf,

        /// Output file (defaults to "output" from the config)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Name of the API class when the file declares several
        #[arg(long = "class")]
        class_name: Option<String>,

        /// Import referenced types from their files
        #[arg(long, conflicts_with = "embed")]
        import: bool,

        /// Inline referenced types as interfaces
        #[arg(long)]
        embed: bool,

        /// Client flavor
        #[arg(long, value_enum)]
        flavor: Option<ClientFlavor>,
    },

    /// Print the routes an API class is served under
    Routes {
        /// TypeScript file declaring the API class
        source: PathBuf,

        /// Name of the API class when the file declares several
        #[arg(long = "class")]
        class_name: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "restgen=debug" } else { "restgen=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .with_filter(filter);

    if tracing_subscriber::registry().with(fmt_layer).try_init().is_err() {
        eprintln!("Warning: tracing subscriber already initialized");
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // Load config
    let config = if cli.config.exists() {
        Config::load(&cli.config)?
    } else {
        Config::default()
    };

    let result = match cli.command {
        Commands::Generate { source, output, class_name, import, embed, flavor } => {
            let embed_interfaces = match (import, embed) {
                (true, _) => Some(false),
                (_, true) => Some(true),
                _ => None,
            };
            let options = GenerateOptions {
                source,
                output,
                class_name,
                embed_interfaces,
                flavor,
            };
            execute_generate(options, &config)
        }

        Commands::Routes { source, class_name, json } => {
            let options = RoutesOptions { source, class_name, json };
            execute_routes(options, &config)
        }
    };

    if let Err(err) = result {
        eprintln!("{} {:#}", style("✗").red(), err);
        std::process::exit(1);
    }

    Ok(())
}
