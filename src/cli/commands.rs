//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Klaviyo extractor emitting a SCHEMA/RECORD/STATE message stream
#[derive(Parser, Debug)]
#[command(name = "klaviyo-tap")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (JSON)
    #[arg(short, long, global = true, conflicts_with = "config_json")]
    pub config: Option<PathBuf>,

    /// Inline config JSON
    #[arg(long, global = true)]
    pub config_json: Option<String>,

    /// State file (JSON), checkpointed after every page
    #[arg(short, long, global = true, conflicts_with = "state_json")]
    pub state: Option<PathBuf>,

    /// Inline state JSON
    #[arg(long, global = true)]
    pub state_json: Option<String>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the catalog of available streams
    Discover,

    /// Replicate the selected streams to stdout
    Sync {
        /// Catalog file; without one, every runnable stream is discovered and synced
        #[arg(long)]
        catalog: Option<PathBuf>,
    },
}
