//! Configuration: an optional YAML file overlaid by environment variables.
//!
//! # Sources (lowest to highest precedence)
//!
//! ```text
//! ~/.leadsync/config.yaml   (or the path given with --config)
//! environment               (AIRTABLE_API_KEY, CLICKUP_LIST_ID, ...)
//! ```
//!
//! # API pattern
//!
//! - [`SyncConfig::resolve`] — pure; takes a parsed [`ConfigFile`] and a
//!   lookup closure standing in for the environment
//! - [`SyncConfig::load_at`] — explicit home; used in tests with `TempDir`
//! - [`SyncConfig::load`] — derives home from `dirs::home_dir()` and reads
//!   the real process environment
//!
//! The resolved [`SyncConfig`] is built once at startup and passed by
//! reference to the adapters and the engine.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::CustomFieldId;

pub const AIRTABLE_API_KEY: &str = "AIRTABLE_API_KEY";
pub const AIRTABLE_BASE_ID: &str = "AIRTABLE_BASE_ID";
pub const AIRTABLE_TABLE_NAME: &str = "AIRTABLE_TABLE_NAME";
pub const AIRTABLE_BASE_URL: &str = "AIRTABLE_BASE_URL";
pub const AIRTABLE_RATE_LIMIT_PAUSE_SECS: &str = "AIRTABLE_RATE_LIMIT_PAUSE_SECS";
pub const CLICKUP_API_KEY: &str = "CLICKUP_API_KEY";
pub const CLICKUP_LIST_ID: &str = "CLICKUP_LIST_ID";
pub const CLICKUP_CUSTOM_FIELD_ID: &str = "CLICKUP_CUSTOM_FIELD_ID";
pub const CLICKUP_BASE_URL: &str = "CLICKUP_BASE_URL";
pub const CLICKUP_RATE_LIMIT_PAUSE_SECS: &str = "CLICKUP_RATE_LIMIT_PAUSE_SECS";
pub const WINDOW_MINUTES: &str = "LEADSYNC_WINDOW_MINUTES";

pub const DEFAULT_AIRTABLE_BASE_URL: &str = "https://api.airtable.com/v0";
pub const DEFAULT_CLICKUP_BASE_URL: &str = "https://api.clickup.com/api/v2";
pub const DEFAULT_AIRTABLE_PAUSE: Duration = Duration::from_secs(5);
pub const DEFAULT_CLICKUP_PAUSE: Duration = Duration::from_secs(10);
pub const DEFAULT_WINDOW_MINUTES: u32 = 60;

// ---------------------------------------------------------------------------
// File representation
// ---------------------------------------------------------------------------

/// On-disk config file. Every field is optional; the environment fills gaps.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    pub airtable: AirtableSection,
    pub clickup: ClickUpSection,
    pub sync: SyncSection,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AirtableSection {
    pub api_key: Option<String>,
    pub base_id: Option<String>,
    pub table_name: Option<String>,
    pub base_url: Option<String>,
    pub rate_limit_pause_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClickUpSection {
    pub api_key: Option<String>,
    pub list_id: Option<String>,
    pub custom_field_id: Option<String>,
    pub base_url: Option<String>,
    pub rate_limit_pause_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SyncSection {
    pub window_minutes: Option<u32>,
}

/// `<home>/.leadsync/config.yaml` — pure, no I/O.
pub fn config_path_at(home: &Path) -> PathBuf {
    home.join(".leadsync").join("config.yaml")
}

/// Read and parse a config file. The file must exist.
pub fn read_file(path: &Path) -> Result<ConfigFile, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    if contents.trim().is_empty() {
        return Ok(ConfigFile::default());
    }
    serde_yaml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

// ---------------------------------------------------------------------------
// Resolved configuration
// ---------------------------------------------------------------------------

/// Lead tracker (Airtable) connection settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AirtableConfig {
    pub api_key: String,
    pub base_id: String,
    pub table_name: String,
    pub base_url: String,
    /// Pause applied after a 429 before the request is reported as failed.
    pub rate_limit_pause: Duration,
}

/// Work tracker (ClickUp) connection settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClickUpConfig {
    pub api_key: String,
    pub list_id: String,
    /// Custom field on each task that holds the lead record id.
    pub custom_field_id: CustomFieldId,
    pub base_url: String,
    pub rate_limit_pause: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncSettings {
    /// How far back phase 2 looks for updated tasks.
    pub window_minutes: u32,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            window_minutes: DEFAULT_WINDOW_MINUTES,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    pub airtable: AirtableConfig,
    pub clickup: ClickUpConfig,
    pub sync: SyncSettings,
}

impl SyncConfig {
    /// Merge `file` with values from `lookup`, which take precedence.
    ///
    /// Blank values count as absent. Required keys are checked in a fixed
    /// order (credentials first) and the first missing one is reported.
    pub fn resolve<F>(file: ConfigFile, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let ConfigFile {
            airtable,
            clickup,
            sync,
        } = file;

        let airtable_key = required(&lookup, AIRTABLE_API_KEY, airtable.api_key)?;
        let clickup_key = required(&lookup, CLICKUP_API_KEY, clickup.api_key)?;
        let base_id = required(&lookup, AIRTABLE_BASE_ID, airtable.base_id)?;
        let table_name = required(&lookup, AIRTABLE_TABLE_NAME, airtable.table_name)?;
        let list_id = required(&lookup, CLICKUP_LIST_ID, clickup.list_id)?;
        let custom_field_id = required(&lookup, CLICKUP_CUSTOM_FIELD_ID, clickup.custom_field_id)?;

        let airtable_pause = pause(&lookup, AIRTABLE_RATE_LIMIT_PAUSE_SECS, airtable.rate_limit_pause_secs)?
            .unwrap_or(DEFAULT_AIRTABLE_PAUSE);
        let clickup_pause = pause(&lookup, CLICKUP_RATE_LIMIT_PAUSE_SECS, clickup.rate_limit_pause_secs)?
            .unwrap_or(DEFAULT_CLICKUP_PAUSE);

        let window_minutes = match pick(&lookup, WINDOW_MINUTES, None) {
            Some(raw) => parse_number::<u32>(WINDOW_MINUTES, &raw)?,
            None => sync.window_minutes.unwrap_or(DEFAULT_WINDOW_MINUTES),
        };
        if window_minutes == 0 {
            return Err(ConfigError::Invalid {
                key: WINDOW_MINUTES,
                reason: "window must be at least one minute".to_string(),
            });
        }

        Ok(Self {
            airtable: AirtableConfig {
                api_key: airtable_key,
                base_id,
                table_name,
                base_url: base_url(&lookup, AIRTABLE_BASE_URL, airtable.base_url, DEFAULT_AIRTABLE_BASE_URL),
                rate_limit_pause: airtable_pause,
            },
            clickup: ClickUpConfig {
                api_key: clickup_key,
                list_id,
                custom_field_id: CustomFieldId::from(custom_field_id),
                base_url: base_url(&lookup, CLICKUP_BASE_URL, clickup.base_url, DEFAULT_CLICKUP_BASE_URL),
                rate_limit_pause: clickup_pause,
            },
            sync: SyncSettings { window_minutes },
        })
    }

    /// Resolve against `<home>/.leadsync/config.yaml`, or `explicit` when given.
    ///
    /// The default file is optional; an explicit path must exist.
    pub fn load_at<F>(home: &Path, explicit: Option<&Path>, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let file = match explicit {
            Some(path) => read_file(path)?,
            None => {
                let path = config_path_at(home);
                if path.exists() {
                    read_file(&path)?
                } else {
                    ConfigFile::default()
                }
            }
        };
        Self::resolve(file, lookup)
    }

    /// `load_at` convenience wrapper over the real home directory and
    /// process environment.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let lookup = |key: &str| std::env::var(key).ok();
        match (explicit, dirs::home_dir()) {
            (None, Some(home)) => Self::load_at(&home, None, lookup),
            (Some(path), _) => Self::resolve(read_file(path)?, lookup),
            (None, None) => Self::resolve(ConfigFile::default(), lookup),
        }
    }

    /// Display-safe view with API keys masked.
    pub fn redacted(&self) -> RedactedConfig {
        RedactedConfig {
            airtable: RedactedAirtable {
                api_key: mask(&self.airtable.api_key),
                base_id: self.airtable.base_id.clone(),
                table_name: self.airtable.table_name.clone(),
                base_url: self.airtable.base_url.clone(),
                rate_limit_pause_secs: self.airtable.rate_limit_pause.as_secs(),
            },
            clickup: RedactedClickUp {
                api_key: mask(&self.clickup.api_key),
                list_id: self.clickup.list_id.clone(),
                custom_field_id: self.clickup.custom_field_id.0.clone(),
                base_url: self.clickup.base_url.clone(),
                rate_limit_pause_secs: self.clickup.rate_limit_pause.as_secs(),
            },
            window_minutes: self.sync.window_minutes,
        }
    }
}

/// Serializable, secret-free rendering of a [`SyncConfig`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RedactedConfig {
    pub airtable: RedactedAirtable,
    pub clickup: RedactedClickUp,
    pub window_minutes: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RedactedAirtable {
    pub api_key: String,
    pub base_id: String,
    pub table_name: String,
    pub base_url: String,
    pub rate_limit_pause_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RedactedClickUp {
    pub api_key: String,
    pub list_id: String,
    pub custom_field_id: String,
    pub base_url: String,
    pub rate_limit_pause_secs: u64,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn pick<F>(lookup: &F, key: &str, file_value: Option<String>) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .filter(|v| !v.trim().is_empty())
        .or_else(|| file_value.filter(|v| !v.trim().is_empty()))
        .map(|v| v.trim().to_string())
}

fn required<F>(lookup: &F, key: &'static str, file_value: Option<String>) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    pick(lookup, key, file_value).ok_or(ConfigError::Missing { key })
}

fn base_url<F>(lookup: &F, key: &str, file_value: Option<String>, default: &str) -> String
where
    F: Fn(&str) -> Option<String>,
{
    pick(lookup, key, file_value)
        .map(|url| url.trim_end_matches('/').to_string())
        .unwrap_or_else(|| default.to_string())
}

fn pause<F>(lookup: &F, key: &'static str, file_value: Option<u64>) -> Result<Option<Duration>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let secs = match pick(lookup, key, None) {
        Some(raw) => Some(parse_number::<u64>(key, &raw)?),
        None => file_value,
    };
    Ok(secs.map(Duration::from_secs))
}

fn parse_number<T>(key: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse::<T>().map_err(|e| ConfigError::Invalid {
        key,
        reason: format!("'{raw}': {e}"),
    })
}

fn mask(secret: &str) -> String {
    if secret.chars().count() <= 8 {
        return "***".to_string();
    }
    let prefix: String = secret.chars().take(4).collect();
    format!("{prefix}…")
}
