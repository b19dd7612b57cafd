//! Work tracker adapter (ClickUp API v2).

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use serde_json::{json, Value};

use leadsync_core::{ApiError, ClickUpConfig, CustomField, Task, TaskId, TaskPayload, TaskStatus};
use leadsync_sync::WorkTracker;

use crate::http::HttpService;

pub const SERVICE: &str = "ClickUp";

pub struct ClickUpClient {
    http: HttpService,
    list_id: String,
}

impl ClickUpClient {
    pub fn new(config: &ClickUpConfig) -> Self {
        tracing::info!("ClickUp client ready for list {}", config.list_id);
        Self {
            // ClickUp personal tokens go in the header as-is, no scheme.
            http: HttpService::new(
                SERVICE,
                config.base_url.clone(),
                config.api_key.clone(),
                config.rate_limit_pause,
            ),
            list_id: config.list_id.clone(),
        }
    }

    fn list_tasks_path(&self) -> String {
        format!("list/{}/task", self.list_id)
    }
}

impl WorkTracker for ClickUpClient {
    fn create_task(&self, payload: &TaskPayload) -> Result<TaskId, ApiError> {
        tracing::info!("creating {} task '{}'", self.http.service(), payload.name);
        let body = serde_json::to_value(payload).map_err(|e| ApiError::Decode {
            service: SERVICE,
            message: e.to_string(),
        })?;
        let created: CreatedTask = self
            .http
            .send("POST", &self.list_tasks_path(), &[], Some(&body))?;
        tracing::info!("created task {}", created.id);
        Ok(TaskId::from(created.id))
    }

    fn fetch_recently_updated(&self, window_minutes: u32) -> Result<Vec<Task>, ApiError> {
        tracing::info!("fetching {} tasks updated in the last {window_minutes} minutes", self.http.service());
        let query = [
            ("include_closed", "true".to_string()),
            ("subtasks", "false".to_string()),
            (
                "date_updated_gt",
                updated_after_millis(Utc::now(), window_minutes).to_string(),
            ),
        ];
        let list: TaskList = self.http.send("GET", &self.list_tasks_path(), &query, None)?;
        Ok(list.tasks.into_iter().map(WireTask::into_task).collect())
    }

    fn update_task_status(&self, id: &TaskId, status: TaskStatus) -> Result<(), ApiError> {
        let body = json!({ "status": status.label() });
        let _: Value = self.http.send("PUT", &format!("task/{id}"), &[], Some(&body))?;
        tracing::info!("updated task {id} → status '{status}'");
        Ok(())
    }
}

/// Lower bound for `date_updated_gt`, in epoch milliseconds.
pub fn updated_after_millis(now: DateTime<Utc>, window_minutes: u32) -> i64 {
    (now - Duration::minutes(i64::from(window_minutes))).timestamp_millis()
}

// ---------------------------------------------------------------------------
// Wire format
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct CreatedTask {
    id: String,
}

#[derive(Debug, Deserialize)]
struct TaskList {
    #[serde(default)]
    tasks: Vec<WireTask>,
}

#[derive(Debug, Deserialize)]
struct WireTask {
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    status: WireStatus,
    #[serde(default)]
    custom_fields: Vec<CustomField>,
}

#[derive(Debug, Default, Deserialize)]
struct WireStatus {
    #[serde(default)]
    status: String,
}

impl WireTask {
    fn into_task(self) -> Task {
        Task {
            id: TaskId::from(self.id),
            name: self.name,
            status_label: self.status.status,
            custom_fields: self.custom_fields,
        }
    }
}
