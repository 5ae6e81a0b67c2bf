//! Config command implementation.

use std::path::Path;

use anyhow::{Context, Result};

use super::emit;
use crate::cli::ConfigAction;
use crate::config::Config;

/// Execute a config subcommand. `config` is the effective configuration,
/// `path` the file it was (or would be) loaded from.
pub fn cmd_config(action: &ConfigAction, config: &Config, path: &Path) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let content = toml::to_string_pretty(config).context("Failed to serialize config")?;
            emit(&content)
        }
        ConfigAction::Path => emit(&format!("{}\n", path.display())),
        ConfigAction::Init { force } => {
            if path.exists() && !force {
                anyhow::bail!(
                    "Config file already exists at {}. Use --force to overwrite",
                    path.display()
                );
            }
            Config::default().save(path)?;
            emit(&format!("Wrote default configuration to {}\n", path.display()))
        }
    }
}
