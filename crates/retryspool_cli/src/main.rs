//! Retryspool data CLI
//!
//! Command-line tools for inspecting and repairing a filesystem data store.
//!
//! # Commands
//!
//! - `put` - Store a blob from a file or stdin
//! - `get` - Write a blob to a file or stdout
//! - `delete` - Remove a blob and reclaim empty shard directories
//! - `path` - Print where a blob lives on disk

mod commands;

use clap::{Parser, Subcommand};
use retryspool_data::FilesystemConfig;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Retryspool message data tools.
#[derive(Parser)]
#[command(name = "retryspool-data")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Base directory of the data store
    #[arg(global = true, short, long, env = "RETRYSPOOL_DATA_DIR")]
    base_path: Option<PathBuf>,

    /// Sync blobs to disk before reporting them written
    #[arg(global = true, long)]
    sync: bool,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Store a blob
    Put {
        /// Message id
        id: String,

        /// Read the blob from this file instead of stdin
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Print a blob
    Get {
        /// Message id
        id: String,

        /// Write the blob to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Delete a blob
    Delete {
        /// Message id
        id: String,
    },

    /// Print the on-disk path of a blob
    Path {
        /// Message id
        id: String,
    },

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Logs go to stderr so `get` output stays clean
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Commands::Version = cli.command {
        println!("retryspool-data CLI v{}", env!("CARGO_PKG_VERSION"));
        println!("retryspool_data v{}", retryspool_data::VERSION);
        return Ok(());
    }

    let base_path = cli
        .base_path
        .ok_or("Base path required (--base-path or RETRYSPOOL_DATA_DIR)")?;
    let config = FilesystemConfig::new(base_path).sync_on_write(cli.sync);

    match cli.command {
        Commands::Put { id, file } => commands::put::run(config, &id, file.as_deref())?,
        Commands::Get { id, output } => commands::get::run(config, &id, output.as_deref())?,
        Commands::Delete { id } => commands::delete::run(config, &id)?,
        Commands::Path { id } => commands::path::run(config, &id)?,
        Commands::Version => {}
    }

    Ok(())
}
