//! Subcommands of the `invex` binary.

pub mod batch;
pub mod config;
pub mod process;

use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::debug;

use invex_core::InvexConfig;

/// Default configuration file location.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("invex")
        .join("config.json")
}

/// Load the configuration named on the command line, else the default file if it
/// exists, else built-in defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<InvexConfig> {
    let path = match config_path {
        Some(path) => PathBuf::from(path),
        None => {
            let path = default_config_path();
            if !path.exists() {
                debug!("No config file at {}, using defaults", path.display());
                return Ok(InvexConfig::default());
            }
            path
        }
    };

    read_config(&path)
}

fn read_config(path: &Path) -> anyhow::Result<InvexConfig> {
    debug!("Loading config from {}", path.display());
    let config = InvexConfig::from_file(path)
        .with_context(|| format!("Failed to load config from {}", path.display()))?;
    config
        .validate()
        .with_context(|| format!("Invalid configuration in {}", path.display()))?;
    Ok(config)
}
