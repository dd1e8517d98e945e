//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Sift - search and inspect record-type indexes
#[derive(Parser, Debug)]
#[command(name = "sift", author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file path (defaults to ./sift.toml)
    #[arg(short, long, env = "SIFT_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Search one record type's index
    Search(SearchArgs),

    /// List indexed record types and their document counts
    Stats {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Configuration file operations
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(clap::Args, Debug, Clone)]
pub struct SearchArgs {
    /// Record type name (the index directory name)
    pub record_type: String,

    /// Query text
    pub query: String,

    /// Maximum number of hits
    #[arg(short, long)]
    pub limit: Option<usize>,

    /// Only search this field (repeatable)
    #[arg(short, long = "field")]
    pub fields: Vec<String>,

    /// Match any term instead of all terms
    #[arg(long)]
    pub or: bool,

    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// Show the resolved config file path
    Path,

    /// Print the effective configuration as TOML
    Show,

    /// Print one configuration value
    Get {
        /// Key name, e.g. `base_path`
        key: String,
    },

    /// Write a default configuration file
    Init {
        /// Target file (defaults to the resolved config path)
        #[arg(long)]
        file: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

// ============================================================================
// Tests
// ============================================================================
