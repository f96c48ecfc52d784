//! hashkv CLI
//!
//! Command-line tools for inspecting the hashkv wire format.
//!
//! # Commands
//!
//! - `flatten` - Flatten a JSON document into its hash entries
//! - `read` - Rebuild a JSON document from hash entries
//! - `indexes` - List the index definitions a schema and config produce

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// hashkv command-line mapping tools.
#[derive(Parser)]
#[command(name = "hashkv")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the schema file (JSON)
    #[arg(global = true, short, long)]
    schema: Option<PathBuf>,

    /// Path to the converter configuration file (JSON)
    #[arg(global = true, short, long)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Flatten a JSON document into hash entries
    Flatten {
        /// Path to the JSON document
        #[arg(short, long)]
        input: PathBuf,

        /// Root type (defaults to the document's `_class` member)
        #[arg(short = 't', long = "type")]
        type_name: Option<String>,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Rebuild a JSON document from hash entries
    Read {
        /// Path to a JSON object of path keys to values
        #[arg(short, long)]
        input: PathBuf,

        /// Requested root type
        #[arg(short = 't', long = "type")]
        type_name: String,
    },

    /// List index definitions
    Indexes {
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Flatten {
            input,
            type_name,
            format,
        } => {
            let schema = cli.schema.ok_or("Schema path required for flatten")?;
            commands::flatten::run(
                &schema,
                cli.config.as_deref(),
                &input,
                type_name.as_deref(),
                &format,
            )?;
        }
        Commands::Read { input, type_name } => {
            let schema = cli.schema.ok_or("Schema path required for read")?;
            commands::read::run(&schema, cli.config.as_deref(), &input, &type_name)?;
        }
        Commands::Indexes { format } => {
            let schema = cli.schema.ok_or("Schema path required for indexes")?;
            commands::indexes::run(&schema, cli.config.as_deref(), &format)?;
        }
        Commands::Version => {
            println!("hashkv CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("hashkv Core v{}", hashkv_core::VERSION);
        }
    }

    Ok(())
}
