//! Sift CLI
//!
//! Command-line interface for searching and inspecting Sift indexes.

#![forbid(unsafe_code)]

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use sift_cli::config_handlers::{handle_config_command, load_config};
use sift_cli::{Cli, Command, commands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins over --verbose
    let default_level = if cli.verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config_path = cli.config.as_deref();
    let mut stdout = std::io::stdout().lock();

    match cli.command {
        Command::Search(args) => {
            let config = load_config(config_path).context("failed to load configuration")?;
            tracing::debug!(base_path = %config.base_path.display(), "searching {}", args.record_type);
            commands::cmd_search(&config, &args, &mut stdout)
                .with_context(|| format!("search in {} failed", args.record_type))?;
        }
        Command::Stats { json } => {
            let config = load_config(config_path).context("failed to load configuration")?;
            commands::cmd_stats(&config, json, &mut stdout)?;
        }
        Command::Config { action } => {
            handle_config_command(config_path, action, &mut stdout)?;
        }
    }

    Ok(())
}
