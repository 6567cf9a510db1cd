//! Config file for the Gatus bridge.
//!
//! TOML entry profiles plus coordinator timing, layered with `GATUS_`
//! environment overrides, and translation to `gatus_core::ConfigEntry` /
//! `CoordinatorSettings`. The CLI adds flag-aware wrappers on top.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use gatus_core::{ConfigEntry, CoordinatorSettings, FlowInput, slugify};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no entry named '{name}' in config")]
    UnknownEntry { name: String },

    #[error("no Gatus entries configured")]
    NoEntries,

    #[error("an entry with id '{id}' already exists")]
    DuplicateEntry { id: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Entry used when `--entry` is not given.
    pub default_entry: Option<String>,

    #[serde(default)]
    pub coordinator: CoordinatorDefaults,

    /// Configured Gatus servers, keyed by entry id.
    #[serde(default)]
    pub entries: BTreeMap<String, EntryProfile>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct CoordinatorDefaults {
    #[serde(default = "default_secs")]
    pub update_interval_secs: u64,

    #[serde(default = "default_secs")]
    pub request_timeout_secs: u64,
}

impl Default for CoordinatorDefaults {
    fn default() -> Self {
        Self {
            update_interval_secs: default_secs(),
            request_timeout_secs: default_secs(),
        }
    }
}

fn default_secs() -> u64 {
    10
}

/// One configured Gatus server.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct EntryProfile {
    /// Display name; its slug is the entry's unique id.
    pub name: String,

    /// Gatus root URL (e.g. "https://status.example.com").
    pub url: String,

    #[serde(default = "default_verify_ssl")]
    pub verify_ssl: bool,
}

fn default_verify_ssl() -> bool {
    true
}

impl EntryProfile {
    pub fn unique_id(&self) -> String {
        slugify(&self.name)
    }

    /// Build the runtime entry for this profile.
    pub fn to_config_entry(&self, entry_id: &str) -> Result<ConfigEntry, ConfigError> {
        FlowInput::new(&self.name, &self.url, self.verify_ssl)
            .into_entry(entry_id)
            .ok_or_else(|| ConfigError::Validation {
                field: format!("entries.{entry_id}.url"),
                reason: format!("not an http(s) URL: {}", self.url),
            })
    }
}

impl From<FlowInput> for EntryProfile {
    fn from(input: FlowInput) -> Self {
        Self {
            name: input.name,
            url: input.url,
            verify_ssl: input.verify_ssl,
        }
    }
}

impl CoordinatorDefaults {
    pub fn to_settings(self) -> Result<CoordinatorSettings, ConfigError> {
        let positive = |field: &str, secs: u64| {
            if secs == 0 {
                Err(ConfigError::Validation {
                    field: format!("coordinator.{field}"),
                    reason: "must be at least 1 second".into(),
                })
            } else {
                Ok(Duration::from_secs(secs))
            }
        };
        Ok(CoordinatorSettings {
            update_interval: positive("update_interval_secs", self.update_interval_secs)?,
            request_timeout: positive("request_timeout_secs", self.request_timeout_secs)?,
        })
    }
}

impl Config {
    /// Pick an entry: the named one, else `default_entry`, else the only
    /// entry if there is exactly one.
    pub fn resolve_entry(&self, name: Option<&str>) -> Result<(String, &EntryProfile), ConfigError> {
        let id = match name.or(self.default_entry.as_deref()) {
            Some(id) => id.to_string(),
            None => {
                let mut ids = self.entries.keys();
                match (ids.next(), ids.next()) {
                    (Some(only), None) => only.clone(),
                    (None, _) => return Err(ConfigError::NoEntries),
                    (Some(_), Some(_)) => {
                        return Err(ConfigError::Validation {
                            field: "default_entry".into(),
                            reason: "several entries configured; pass --entry or set default_entry".into(),
                        });
                    }
                }
            }
        };
        let profile = self
            .entries
            .get(&id)
            .ok_or_else(|| ConfigError::UnknownEntry { name: id.clone() })?;
        Ok((id, profile))
    }

    /// The runtime entry for `name` (see [`Config::resolve_entry`]).
    pub fn config_entry(&self, name: Option<&str>) -> Result<ConfigEntry, ConfigError> {
        let (id, profile) = self.resolve_entry(name)?;
        profile.to_config_entry(&id)
    }

    /// Every configured entry, in id order.
    pub fn config_entries(&self) -> Result<Vec<ConfigEntry>, ConfigError> {
        self.entries
            .iter()
            .map(|(id, profile)| profile.to_config_entry(id))
            .collect()
    }

    /// Unique ids already taken, for duplicate detection.
    pub fn unique_ids(&self) -> Vec<String> {
        self.entries.values().map(EntryProfile::unique_id).collect()
    }

    /// Store an accepted flow result. The entry id is the slug of the name.
    /// The first entry becomes the default.
    pub fn add_entry(&mut self, input: FlowInput) -> Result<String, ConfigError> {
        let id = input.unique_id();
        if id.is_empty() {
            return Err(ConfigError::Validation {
                field: "name".into(),
                reason: "must contain at least one letter or digit".into(),
            });
        }
        if self.entries.contains_key(&id) {
            return Err(ConfigError::DuplicateEntry { id });
        }
        self.entries.insert(id.clone(), EntryProfile::from(input));
        if self.default_entry.is_none() {
            self.default_entry = Some(id.clone());
        }
        Ok(id)
    }

    /// Remove an entry, clearing `default_entry` if it pointed there.
    pub fn remove_entry(&mut self, id: &str) -> Result<EntryProfile, ConfigError> {
        let removed = self
            .entries
            .remove(id)
            .ok_or_else(|| ConfigError::UnknownEntry { name: id.into() })?;
        if self.default_entry.as_deref() == Some(id) {
            self.default_entry = None;
        }
        Ok(removed)
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("dev", "gatus-ha", "gatus-ha").map_or_else(
        || dirs_fallback().join("config.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("gatus-ha");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the config from `path` + environment.
///
/// Nested keys use a double underscore, e.g.
/// `GATUS_COORDINATOR__UPDATE_INTERVAL_SECS=30`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("GATUS_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write it to `path`.
pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}
