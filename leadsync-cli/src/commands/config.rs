//! `leadsync config` — show the resolved configuration.

use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;
use tabled::{settings::Style, Table, Tabled};

use super::load_config;

/// Arguments for `leadsync config`.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Tabled)]
struct ConfigRow {
    #[tabled(rename = "setting")]
    setting: &'static str,
    #[tabled(rename = "value")]
    value: String,
}

impl ConfigArgs {
    pub fn run(self, config_path: Option<&Path>) -> Result<()> {
        let config = load_config(config_path)?.redacted();

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&config).context("failed to serialize config JSON")?
            );
            return Ok(());
        }

        let rows = vec![
            row("airtable.api_key", config.airtable.api_key),
            row("airtable.base_id", config.airtable.base_id),
            row("airtable.table_name", config.airtable.table_name),
            row("airtable.base_url", config.airtable.base_url),
            row(
                "airtable.rate_limit_pause",
                format!("{}s", config.airtable.rate_limit_pause_secs),
            ),
            row("clickup.api_key", config.clickup.api_key),
            row("clickup.list_id", config.clickup.list_id),
            row("clickup.custom_field_id", config.clickup.custom_field_id),
            row("clickup.base_url", config.clickup.base_url),
            row(
                "clickup.rate_limit_pause",
                format!("{}s", config.clickup.rate_limit_pause_secs),
            ),
            row("sync.window_minutes", config.window_minutes.to_string()),
        ];
        let mut table = Table::new(rows);
        table.with(Style::rounded());
        println!("{table}");
        Ok(())
    }
}

fn row(setting: &'static str, value: String) -> ConfigRow {
    ConfigRow { setting, value }
}
