pub mod config;
pub mod map;
pub mod sync;

use std::path::Path;

use anyhow::{Context, Result};

use leadsync_core::SyncConfig;

/// Resolve configuration from the environment and the optional YAML file.
pub(crate) fn load_config(path: Option<&Path>) -> Result<SyncConfig> {
    SyncConfig::load(path).context("configuration error; no sync attempted")
}
