//! Lead → task payload construction.

use leadsync_core::{
    ConfigError, CustomField, CustomFieldId, Lead, LeadStatus, TaskPayload,
};
use serde_json::Value;

use crate::status_map::lead_to_task_status;

const UNKNOWN_NAME: &str = "Unknown Lead";
const UNKNOWN: &str = "N/A";

/// Lead tracker named in task descriptions. Display text only; nothing in
/// this crate talks to a specific service.
pub const LEAD_TRACKER_LABEL: &str = "Airtable";

/// Builds work-tracker payloads for leads.
///
/// Holds the reverse-link field id, so construction is where a missing field
/// id surfaces; mapping itself cannot fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskPayloadMapper {
    link_field: CustomFieldId,
}

impl TaskPayloadMapper {
    /// Fails with [`ConfigError::Missing`] when `link_field` is blank.
    pub fn new(link_field: &CustomFieldId) -> Result<Self, ConfigError> {
        if link_field.0.trim().is_empty() {
            return Err(ConfigError::Missing {
                key: leadsync_core::config::CLICKUP_CUSTOM_FIELD_ID,
            });
        }
        Ok(Self {
            link_field: link_field.clone(),
        })
    }

    /// Custom field that carries the lead id on each task.
    pub fn link_field(&self) -> &CustomFieldId {
        &self.link_field
    }

    pub fn map(&self, lead: &Lead) -> TaskPayload {
        let status = lead.status.clone().unwrap_or(LeadStatus::New);
        let name = non_blank(lead.name.as_deref()).unwrap_or(UNKNOWN_NAME);
        let source = non_blank(lead.source.as_deref()).unwrap_or(UNKNOWN);
        let email = non_blank(lead.email.as_deref()).unwrap_or(UNKNOWN);

        TaskPayload {
            name: format!("[{status}] Follow-up: {name} from {source}"),
            description: format!(
                "**Lead Details:**\nEmail: {email}\nSource: {source}\n\n\
                 This task is linked to {LEAD_TRACKER_LABEL} record {}.",
                lead.id
            ),
            status: lead_to_task_status(&status),
            custom_fields: vec![CustomField {
                id: self.link_field.clone(),
                value: Value::String(lead.id.0.clone()),
            }],
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
