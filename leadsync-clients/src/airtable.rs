//! Lead tracker adapter (Airtable REST API).

use serde::Deserialize;
use serde_json::{json, Map, Value};

use leadsync_core::{AirtableConfig, ApiError, Lead, LeadId, LeadStatus, LeadUpdate, TaskId};
use leadsync_sync::LeadTracker;

use crate::http::HttpService;

pub const SERVICE: &str = "Airtable";

/// Column names in the leads table.
pub mod fields {
    pub const NAME: &str = "Name";
    pub const EMAIL: &str = "Email";
    pub const STATUS: &str = "Status";
    pub const SOURCE: &str = "Source";
    pub const TASK_ID: &str = "ClickUp Task ID";

    pub const ALL: [&str; 5] = [NAME, EMAIL, STATUS, SOURCE, TASK_ID];
}

/// Active-lead filter; LOST leads never enter phase 1.
pub const ACTIVE_FILTER: &str = "NOT({Status} = 'LOST')";

pub struct AirtableClient {
    http: HttpService,
}

impl AirtableClient {
    pub fn new(config: &AirtableConfig) -> Self {
        let base_url = format!(
            "{}/{}/{}",
            config.base_url.trim_end_matches('/'),
            config.base_id,
            config.table_name
        );
        tracing::info!("Airtable client ready for table '{}'", config.table_name);
        Self {
            http: HttpService::new(
                SERVICE,
                base_url,
                format!("Bearer {}", config.api_key),
                config.rate_limit_pause,
            ),
        }
    }
}

impl LeadTracker for AirtableClient {
    /// One page of records, as the list endpoint returns it.
    fn fetch_active_leads(&self) -> Result<Vec<Lead>, ApiError> {
        tracing::info!("fetching leads from {}", self.http.service());
        let mut query: Vec<(&str, String)> = fields::ALL
            .iter()
            .map(|field| ("fields[]", (*field).to_string()))
            .collect();
        query.push(("filterByFormula", ACTIVE_FILTER.to_string()));

        let list: RecordList = self.http.send("GET", "", &query, None)?;
        Ok(list.into_leads())
    }

    fn update_lead(&self, id: &LeadId, update: &LeadUpdate) -> Result<(), ApiError> {
        if update.is_empty() {
            return Ok(());
        }
        tracing::info!("updating {} lead {id}", self.http.service());
        let body = json!({ "fields": update_fields(update) });
        let _: Value = self.http.send("PATCH", &id.0, &[], Some(&body))?;
        tracing::info!("updated lead {id}");
        Ok(())
    }
}

/// Translate a typed update into the table's column map.
pub fn update_fields(update: &LeadUpdate) -> Map<String, Value> {
    let mut map = Map::new();
    if let Some(status) = &update.status {
        map.insert(fields::STATUS.to_string(), Value::String(status.to_string()));
    }
    if let Some(task) = &update.linked_task {
        map.insert(fields::TASK_ID.to_string(), Value::String(task.0.clone()));
    }
    map
}

// ---------------------------------------------------------------------------
// Wire format
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct RecordList {
    #[serde(default)]
    records: Vec<Value>,
}

/// Columns are read loosely: a value of an unexpected type counts as absent
/// for that column only, so one oddly-shaped record never sinks the list.
#[derive(Debug, Deserialize)]
struct Record {
    id: String,
    #[serde(default)]
    fields: Map<String, Value>,
}

impl RecordList {
    fn into_leads(self) -> Vec<Lead> {
        self.records
            .into_iter()
            .filter_map(|raw| match serde_json::from_value::<Record>(raw) {
                Ok(record) => Some(record.into_lead()),
                Err(err) => {
                    tracing::warn!("skipping {SERVICE} record without a usable id: {err}");
                    None
                }
            })
            .collect()
    }
}

impl Record {
    fn into_lead(self) -> Lead {
        Lead {
            name: text(&self.fields, fields::NAME),
            email: text(&self.fields, fields::EMAIL),
            source: text(&self.fields, fields::SOURCE),
            status: text(&self.fields, fields::STATUS).map(LeadStatus::from),
            linked_task: identifier(&self.fields, fields::TASK_ID).map(TaskId::from),
            id: LeadId::from(self.id),
        }
    }
}

fn text(fields: &Map<String, Value>, column: &str) -> Option<String> {
    match fields.get(column) {
        Some(Value::String(value)) => Some(value.clone()),
        Some(Value::Null) | None => None,
        Some(other) => {
            tracing::debug!("ignoring non-text value in column '{column}': {other}");
            None
        }
    }
}

/// Like [`text`], but a numeric cell is accepted as its decimal form.
fn identifier(fields: &Map<String, Value>, column: &str) -> Option<String> {
    match fields.get(column) {
        Some(Value::Number(number)) => Some(number.to_string()),
        _ => text(fields, column),
    }
}
