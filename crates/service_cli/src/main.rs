//! Risk Engine CLI — operational entry point for running risk snapshots,
//! data-quality checks, and configuration validation.
//!
//! # Commands
//!
//! - `risk-engine snapshot --book <file> --config <file>` - run the full
//!   risk pipeline over a book and print the resulting snapshot
//! - `risk-engine dq --book <file>` - run the data-quality evaluator alone
//! - `risk-engine check --config <file>` - validate an engine configuration
//! - `risk-engine demo` - run a self-contained single-bond demonstration

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod error;
mod io;

pub use error::{CliError, Result};

/// Risk Engine CLI
#[derive(Parser)]
#[command(name = "risk-engine")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full risk pipeline over a book and print the snapshot
    Snapshot {
        /// Path to the book file (positions, market data, reference data)
        #[arg(short, long)]
        book: String,

        /// Path to the engine configuration file
        #[arg(short, long)]
        config: String,

        /// Output format: json or table
        #[arg(short, long, default_value = "table")]
        format: String,
    },

    /// Run the data-quality evaluator alone over a book
    Dq {
        /// Path to the book file
        #[arg(short, long)]
        book: String,
    },

    /// Validate an engine configuration file
    Check {
        /// Path to the engine configuration file
        #[arg(short, long)]
        config: String,
    },

    /// Run a self-contained single-bond demonstration
    Demo,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if cli.verbose {
        info!("verbose mode enabled");
    }

    match cli.command {
        Commands::Snapshot { book, config, format } => commands::snapshot::run(&book, &config, &format),
        Commands::Dq { book } => commands::dq::run(&book),
        Commands::Check { config } => commands::check::run(&config),
        Commands::Demo => commands::demo::run(),
    }
}
