//! Handler functions for config CLI commands.
//!
//! Resolves the configuration file (explicit `--config`, otherwise
//! `./sift.toml`), loads it with environment overrides, and implements the
//! `config` subcommands.

use std::io::Write;
use std::path::{Path, PathBuf};

use sift_core::{Error, Result};
use sift_fts::SyncConfig;

use crate::cli::ConfigAction;

/// Config file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "sift.toml";

// ============================================================================
// Loading
// ============================================================================

/// The config file path: `explicit` if given, otherwise [`DEFAULT_CONFIG_FILE`].
pub fn resolve_config_path(explicit: Option<&Path>) -> PathBuf {
    explicit
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
}

/// Load the effective configuration.
///
/// A missing default file yields the defaults; a missing explicit file is an
/// error. Environment overrides apply either way.
pub fn load_config(explicit: Option<&Path>) -> Result<SyncConfig> {
    let path = resolve_config_path(explicit);
    if path.exists() {
        log::debug!("Loading configuration from {}", path.display());
        return SyncConfig::load(&path);
    }
    if explicit.is_some() {
        return Err(Error::config(format!(
            "Config file does not exist at {}",
            path.display()
        )));
    }

    let mut config = SyncConfig::default();
    config.apply_env_overrides()?;
    Ok(config)
}

// ============================================================================
// Command dispatch
// ============================================================================

/// Handle a config subcommand.
pub fn handle_config_command(
    config_path: Option<&Path>,
    action: ConfigAction,
    out: &mut impl Write,
) -> Result<()> {
    match action {
        ConfigAction::Path => cmd_config_path(config_path, out),
        ConfigAction::Show => cmd_config_show(&load_config(config_path)?, out),
        ConfigAction::Get { key } => cmd_config_get(&load_config(config_path)?, &key, out),
        ConfigAction::Init { file, force } => {
            let path = file.unwrap_or_else(|| resolve_config_path(config_path));
            cmd_config_init(&path, force, out)
        }
    }
}

/// Show the resolved config file path.
pub fn cmd_config_path(config_path: Option<&Path>, out: &mut impl Write) -> Result<()> {
    let path = resolve_config_path(config_path);
    writeln!(out, "{}", path.display())?;
    if !path.exists() {
        writeln!(out, "(file does not exist; run `sift config init` to create it)")?;
    }
    Ok(())
}

/// Print the effective configuration.
pub fn cmd_config_show(config: &SyncConfig, out: &mut impl Write) -> Result<()> {
    write!(out, "{}", config.to_toml_string()?)?;
    Ok(())
}

/// Print one configuration value by dotted key.
pub fn cmd_config_get(config: &SyncConfig, key: &str, out: &mut impl Write) -> Result<()> {
    let value = toml::Value::try_from(config).map_err(|e| Error::config(e.to_string()))?;
    match get_nested_value(&value, key) {
        Some(val) => {
            writeln!(out, "{}", format_toml_value(val))?;
            Ok(())
        }
        None => Err(Error::config(format!("Key '{key}' not found in configuration"))),
    }
}

/// Write a default configuration file.
pub fn cmd_config_init(path: &Path, force: bool, out: &mut impl Write) -> Result<()> {
    if path.exists() && !force {
        return Err(Error::config(format!(
            "Config file already exists at {}. Use --force to overwrite.",
            path.display()
        )));
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| Error::io_with_path(e, parent))?;
    }

    let toml_str = SyncConfig::default().to_toml_string()?;
    std::fs::write(path, &toml_str).map_err(|e| Error::io_with_path(e, path))?;

    writeln!(out, "Config file created at {}", path.display())?;
    Ok(())
}

// ============================================================================
// TOML helpers
// ============================================================================

/// Navigate a dotted key path in a TOML value tree.
pub fn get_nested_value<'a>(value: &'a toml::Value, key: &str) -> Option<&'a toml::Value> {
    key.split('.')
        .try_fold(value, |current, part| current.as_table()?.get(part))
}

/// Format a TOML value for display on stdout.
pub fn format_toml_value(value: &toml::Value) -> String {
    match value {
        toml::Value::String(s) => s.clone(),
        toml::Value::Integer(i) => i.to_string(),
        toml::Value::Float(f) => f.to_string(),
        toml::Value::Boolean(b) => b.to_string(),
        toml::Value::Datetime(dt) => dt.to_string(),
        toml::Value::Array(items) => items
            .iter()
            .map(format_toml_value)
            .collect::<Vec<_>>()
            .join(", "),
        toml::Value::Table(_) => {
            toml::to_string_pretty(value).unwrap_or_else(|_| format!("{value:?}"))
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
