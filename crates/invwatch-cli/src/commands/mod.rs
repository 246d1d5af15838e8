pub mod batch;
pub mod config;
pub mod process;
pub mod watch;

use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::debug;

use invwatch_core::models::config::WatchAppConfig;

/// Per-user configuration file.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("invwatch")
        .join("config.json")
}

/// Load the explicit config file, else the per-user one, else defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<WatchAppConfig> {
    if let Some(path) = config_path {
        return WatchAppConfig::from_file(Path::new(path))
            .with_context(|| format!("failed to read config file {}", path));
    }

    let default_path = default_config_path();
    if default_path.exists() {
        debug!("Using config file {}", default_path.display());
        return WatchAppConfig::from_file(&default_path)
            .with_context(|| format!("failed to read config file {}", default_path.display()));
    }

    Ok(WatchAppConfig::default())
}
