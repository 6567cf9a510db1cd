//! CLI configuration: a thin wrapper around `gatus_config` that respects
//! the `--config`, `--entry` and `--timeout` flags.

use std::path::PathBuf;
use std::time::Duration;

use gatus_core::{ConfigEntry, CoordinatorSettings};

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub use gatus_config::{Config, save_config_to};

/// The config file in effect: `--config` or the platform default.
pub fn config_file(global: &GlobalOpts) -> PathBuf {
    global.config.clone().unwrap_or_else(gatus_config::config_path)
}

/// Load the config file in effect. A missing file yields an empty config.
pub fn load(global: &GlobalOpts) -> Result<Config, CliError> {
    let path = config_file(global);
    tracing::debug!(path = %path.display(), "loading config");
    Ok(gatus_config::load_config_from(&path)?)
}

/// Resolve the entry selected by `--entry` (or the default).
pub fn active_entry(global: &GlobalOpts, cfg: &Config) -> Result<ConfigEntry, CliError> {
    cfg.config_entry(global.entry.as_deref()).map_err(|e| match e {
        gatus_config::ConfigError::NoEntries => CliError::NoConfig {
            path: config_file(global).display().to_string(),
        },
        other => other.into(),
    })
}

/// Coordinator timing from the config file, with `--timeout` applied.
pub fn settings(global: &GlobalOpts, cfg: &Config) -> Result<CoordinatorSettings, CliError> {
    let mut settings = cfg.coordinator.to_settings()?;
    if let Some(secs) = global.timeout {
        if secs == 0 {
            return Err(CliError::Validation {
                field: "timeout".into(),
                reason: "must be at least 1 second".into(),
            });
        }
        settings.request_timeout = Duration::from_secs(secs);
    }
    Ok(settings)
}
