//! FieldSync CLI
//!
//! Command-line tools for inspecting a device's sync store.
//!
//! # Commands
//!
//! - `inspect` - Display store statistics and metadata
//! - `queue` - Dump pending operations in enqueue order
//! - `node-id` - Print (or mint) the persisted device identity

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// FieldSync command-line device store tools.
#[derive(Parser)]
#[command(name = "fieldsync")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the device store directory
    #[arg(global = true, short, long)]
    path: Option<PathBuf>,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Display store statistics and metadata
    Inspect {
        /// Show per-collection record counts
        #[arg(short, long)]
        collections: bool,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Dump pending operations in enqueue order
    Queue {
        /// Maximum number of operations to dump
        #[arg(short, long)]
        limit: Option<usize>,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Print the persisted device identity, minting one if absent
    NodeId,

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Inspect {
            collections,
            format,
        } => {
            let path = cli.path.ok_or("Store path required for inspect")?;
            commands::inspect::run(&path, collections, &format)?;
        }
        Commands::Queue { limit, format } => {
            let path = cli.path.ok_or("Store path required for queue")?;
            commands::queue::run(&path, limit, &format)?;
        }
        Commands::NodeId => {
            let path = cli.path.ok_or("Store path required for node-id")?;
            commands::node_id::run(&path)?;
        }
        Commands::Version => {
            println!("FieldSync CLI v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
