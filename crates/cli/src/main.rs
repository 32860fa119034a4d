//! codeloop CLI — the main entry point.
//!
//! Commands:
//! - `batch <FILE>` — Run the tasks of a JSON batch file one after another
//! - `stream`       — Run the prompt read from stdin, streaming the answer

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use codeloop_core::tool::ToolKind;

mod commands;

use commands::RunOptions;

#[derive(Parser)]
#[command(
    name = "codeloop",
    about = "codeloop — tool-calling orchestrator for an AI coding assistant",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run every task in a batch file and report pass/fail counts
    Batch {
        /// Path to the batch JSON file
        file: PathBuf,

        #[command(flatten)]
        options: RunOptions,
    },

    /// Read one prompt from stdin and stream the answer to stdout
    Stream {
        /// Comma-separated tools to enable (default: all)
        #[arg(long, value_delimiter = ',')]
        tools: Vec<ToolKind>,

        #[command(flatten)]
        options: RunOptions,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Logs go to stderr so streamed output on stdout stays clean.
    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    match cli.command {
        Commands::Batch { file, options } => commands::batch::run(file, options).await,
        Commands::Stream { tools, options } => commands::stream::run(tools, options).await,
    }
}
