//! mdpage CLI - Batch Markdown to HTML page generator.
//!
//! Provides commands for:
//! - `generate`: Render a Markdown tree into HTML pages

mod commands;
mod error;
mod output;

use std::error::Error as _;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::GenerateArgs;
use output::Output;

/// mdpage - Batch Markdown to HTML page generator.
#[derive(Parser)]
#[command(name = "mdpage", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate HTML pages from Markdown documents.
    Generate(GenerateArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --debug enables DEBUG, --verbose enables INFO, otherwise RUST_LOG or WARN
    let filter = match &cli.command {
        Commands::Generate(args) if args.debug => EnvFilter::new("debug"),
        Commands::Generate(args) if args.verbose => EnvFilter::new("info"),
        Commands::Generate(_) => {
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
        }
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Generate(args) => args.execute(),
    };

    if let Err(err) = result {
        let message = err.to_string();
        output.error(&format!("Error: {message}"));
        let mut source = err.source();
        while let Some(cause) = source {
            let cause_message = cause.to_string();
            // Most variants already embed their direct cause.
            if !message.contains(&cause_message) {
                output.error(&format!("  Caused by: {cause_message}"));
            }
            source = cause.source();
        }
        std::process::exit(1);
    }
}
