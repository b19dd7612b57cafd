//! Adapter contracts the engine drives.
//!
//! Implementations make exactly one request per call and report failure as
//! [`ApiError`]; they never retry. The engine owns the degradation policy.

use leadsync_core::{ApiError, Lead, LeadId, LeadUpdate, Task, TaskId, TaskPayload, TaskStatus};

/// The lead tracker (source A).
pub trait LeadTracker {
    /// All leads whose status is not `LOST`.
    fn fetch_active_leads(&self) -> Result<Vec<Lead>, ApiError>;

    /// Apply a partial field update to one lead.
    fn update_lead(&self, id: &LeadId, update: &LeadUpdate) -> Result<(), ApiError>;
}

/// The work tracker (source B).
pub trait WorkTracker {
    /// Create a task and return its identifier.
    fn create_task(&self, payload: &TaskPayload) -> Result<TaskId, ApiError>;

    /// Tasks updated within the last `window_minutes`, closed tasks included,
    /// subtasks excluded.
    fn fetch_recently_updated(&self, window_minutes: u32) -> Result<Vec<Task>, ApiError>;

    fn update_task_status(&self, id: &TaskId, status: TaskStatus) -> Result<(), ApiError>;
}
