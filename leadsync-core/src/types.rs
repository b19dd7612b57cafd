//! Domain types shared by the reconciliation engine and the service adapters.
//!
//! Leads live in the lead tracker (Airtable), tasks in the work tracker
//! (ClickUp). Neither side is stored locally; these types only carry what a
//! single reconciliation pass needs.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// Record identifier assigned by the lead tracker (e.g. `rec123`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LeadId(pub String);

impl fmt::Display for LeadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for LeadId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for LeadId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Task identifier assigned by the work tracker.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub String);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for TaskId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for TaskId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Identifier of a work-tracker custom field (the reverse-link field).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomFieldId(pub String);

impl fmt::Display for CustomFieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for CustomFieldId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for CustomFieldId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Statuses
// ---------------------------------------------------------------------------

/// Status of a lead, as stored in the lead tracker's `Status` column.
///
/// Values the tracker holds that this tool does not know are kept verbatim in
/// [`LeadStatus::Other`] so they survive a round trip.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LeadStatus {
    New,
    Contacted,
    Qualified,
    Lost,
    Other(String),
}

impl LeadStatus {
    /// The value written to the lead tracker.
    pub fn as_str(&self) -> &str {
        match self {
            LeadStatus::New => "NEW",
            LeadStatus::Contacted => "CONTACTED",
            LeadStatus::Qualified => "QUALIFIED",
            LeadStatus::Lost => "LOST",
            LeadStatus::Other(raw) => raw,
        }
    }
}

impl fmt::Display for LeadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for LeadStatus {
    fn from(s: &str) -> Self {
        match s {
            "NEW" => LeadStatus::New,
            "CONTACTED" => LeadStatus::Contacted,
            "QUALIFIED" => LeadStatus::Qualified,
            "LOST" => LeadStatus::Lost,
            other => LeadStatus::Other(other.to_owned()),
        }
    }
}

impl From<String> for LeadStatus {
    fn from(s: String) -> Self {
        match LeadStatus::from(s.as_str()) {
            LeadStatus::Other(_) => LeadStatus::Other(s),
            known => known,
        }
    }
}

impl From<LeadStatus> for String {
    fn from(status: LeadStatus) -> Self {
        match status {
            LeadStatus::Other(raw) => raw,
            known => known.as_str().to_owned(),
        }
    }
}

/// Status of a task in the work tracker.
///
/// The tracker reports labels in lower case (`"in progress"`) but accepts the
/// title-case form on writes, so parsing is case-insensitive and
/// [`TaskStatus::label`] yields the title-case form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "String")]
pub enum TaskStatus {
    ToDo,
    InProgress,
    Complete,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 3] = [TaskStatus::ToDo, TaskStatus::InProgress, TaskStatus::Complete];

    pub fn label(self) -> &'static str {
        match self {
            TaskStatus::ToDo => "To Do",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Complete => "Complete",
        }
    }

    /// Match a label case-insensitively; `None` for labels outside the known set.
    pub fn from_label(label: &str) -> Option<Self> {
        let wanted = label.trim();
        Self::ALL
            .into_iter()
            .find(|status| status.label().eq_ignore_ascii_case(wanted))
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl From<TaskStatus> for String {
    fn from(status: TaskStatus) -> Self {
        status.label().to_owned()
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// A lead as read from the lead tracker.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Lead {
    pub id: LeadId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<LeadStatus>,
    /// Task created for this lead on an earlier pass, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linked_task: Option<TaskId>,
}

impl Lead {
    /// The linked task id, ignoring blank values left behind by manual edits.
    pub fn task_link(&self) -> Option<&TaskId> {
        self.linked_task
            .as_ref()
            .filter(|id| !id.0.trim().is_empty())
    }
}

/// One entry of a task's custom-field collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomField {
    pub id: CustomFieldId,
    #[serde(default)]
    pub value: serde_json::Value,
}

/// A task as read from the work tracker.
#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    pub id: TaskId,
    pub name: String,
    /// Raw status label as reported by the tracker (usually lower case).
    pub status_label: String,
    pub custom_fields: Vec<CustomField>,
}

impl Task {
    /// Lead identifier stored in the reverse-link custom field.
    ///
    /// Returns `None` when the field is absent, cleared, or not a string.
    pub fn linked_lead(&self, field: &CustomFieldId) -> Option<LeadId> {
        self.custom_fields
            .iter()
            .find(|f| &f.id == field)
            .and_then(|f| f.value.as_str())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(LeadId::from)
    }
}

/// Body sent to the work tracker when creating a task for a lead.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskPayload {
    pub name: String,
    pub description: String,
    pub status: TaskStatus,
    pub custom_fields: Vec<CustomField>,
}

/// Partial field update applied to a lead.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LeadUpdate {
    pub status: Option<LeadStatus>,
    pub linked_task: Option<TaskId>,
}

impl LeadUpdate {
    pub fn status(status: LeadStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn link(task: TaskId) -> Self {
        Self {
            linked_task: Some(task),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.linked_task.is_none()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
