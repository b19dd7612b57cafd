//! Recording in-memory trackers for engine tests.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::HashSet;

use serde_json::json;

use leadsync_core::{
    ApiError, CustomField, CustomFieldId, Lead, LeadId, LeadStatus, LeadUpdate, Task, TaskId,
    TaskPayload, TaskStatus,
};
use leadsync_sync::{LeadTracker, TaskPayloadMapper, WorkTracker};

pub const LINK_FIELD: &str = "cf-airtable-record";

pub fn mapper() -> TaskPayloadMapper {
    TaskPayloadMapper::new(&CustomFieldId::from(LINK_FIELD)).expect("mapper")
}

pub fn api_error(status: u16) -> ApiError {
    ApiError::Status {
        service: "fake",
        status,
        message: "simulated".to_string(),
    }
}

pub fn lead(id: &str, status: LeadStatus, linked_task: Option<&str>) -> Lead {
    Lead {
        id: LeadId::from(id),
        name: Some(format!("Lead {id}")),
        email: Some(format!("{id}@example.com")),
        source: Some("Referral".to_string()),
        status: Some(status),
        linked_task: linked_task.map(TaskId::from),
    }
}

pub fn task(id: &str, label: &str, linked_lead: Option<&str>) -> Task {
    let custom_fields = match linked_lead {
        Some(lead) => vec![
            CustomField {
                id: CustomFieldId::from("cf-unrelated"),
                value: json!("noise"),
            },
            CustomField {
                id: CustomFieldId::from(LINK_FIELD),
                value: json!(lead),
            },
        ],
        None => vec![],
    };
    Task {
        id: TaskId::from(id),
        name: format!("task {id}"),
        status_label: label.to_string(),
        custom_fields,
    }
}

// ---------------------------------------------------------------------------
// Lead tracker
// ---------------------------------------------------------------------------

/// Holds leads in memory and applies updates to them, so a second pass sees
/// the links written by the first.
#[derive(Default)]
pub struct FakeLeadTracker {
    pub leads: RefCell<Vec<Lead>>,
    pub updates: RefCell<Vec<(LeadId, LeadUpdate)>>,
    pub failing_updates: HashSet<LeadId>,
    pub fetch_error: Option<ApiError>,
    pub fetch_calls: Cell<usize>,
    pub panic_on_update_for: Option<LeadId>,
}

impl FakeLeadTracker {
    pub fn with_leads(leads: Vec<Lead>) -> Self {
        Self {
            leads: RefCell::new(leads),
            ..Self::default()
        }
    }

    pub fn failing_update_for(mut self, id: &str) -> Self {
        self.failing_updates.insert(LeadId::from(id));
        self
    }

    pub fn update_count(&self) -> usize {
        self.updates.borrow().len()
    }

    pub fn lead(&self, id: &str) -> Option<Lead> {
        self.leads
            .borrow()
            .iter()
            .find(|l| l.id.0 == id)
            .cloned()
    }
}

impl LeadTracker for FakeLeadTracker {
    fn fetch_active_leads(&self) -> Result<Vec<Lead>, ApiError> {
        self.fetch_calls.set(self.fetch_calls.get() + 1);
        if let Some(err) = &self.fetch_error {
            return Err(err.clone());
        }
        Ok(self
            .leads
            .borrow()
            .iter()
            .filter(|l| l.status != Some(LeadStatus::Lost))
            .cloned()
            .collect())
    }

    fn update_lead(&self, id: &LeadId, update: &LeadUpdate) -> Result<(), ApiError> {
        if self.panic_on_update_for.as_ref() == Some(id) {
            panic!("lead table rejected {id} unexpectedly");
        }
        if self.failing_updates.contains(id) {
            return Err(api_error(422));
        }
        self.updates.borrow_mut().push((id.clone(), update.clone()));
        if let Some(lead) = self.leads.borrow_mut().iter_mut().find(|l| &l.id == id) {
            if let Some(status) = &update.status {
                lead.status = Some(status.clone());
            }
            if let Some(task) = &update.linked_task {
                lead.linked_task = Some(task.clone());
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Work tracker
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct FakeWorkTracker {
    pub tasks: Vec<Task>,
    pub created: RefCell<Vec<TaskPayload>>,
    pub status_updates: RefCell<Vec<(TaskId, TaskStatus)>>,
    pub fetch_windows: RefCell<Vec<u32>>,
    pub next_id: Cell<u32>,
    pub create_error: Option<ApiError>,
    pub fetch_error: Option<ApiError>,
    pub failing_status_updates: HashSet<TaskId>,
    pub panic_on_fetch: bool,
    /// Panic when asked to create the task linked to this lead.
    pub panic_on_create_for: Option<LeadId>,
}

impl FakeWorkTracker {
    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        Self {
            tasks,
            ..Self::default()
        }
    }

    pub fn create_count(&self) -> usize {
        self.created.borrow().len()
    }

    pub fn status_update_count(&self) -> usize {
        self.status_updates.borrow().len()
    }
}

impl WorkTracker for FakeWorkTracker {
    fn create_task(&self, payload: &TaskPayload) -> Result<TaskId, ApiError> {
        if let Some(lead) = &self.panic_on_create_for {
            if payload.custom_fields.iter().any(|f| f.value == json!(lead.0)) {
                panic!("unexpected payload shape");
            }
        }
        if let Some(err) = &self.create_error {
            return Err(err.clone());
        }
        self.created.borrow_mut().push(payload.clone());
        let next = self.next_id.get() + 1;
        self.next_id.set(next);
        Ok(TaskId::from(format!("tsk{next}")))
    }

    fn fetch_recently_updated(&self, window_minutes: u32) -> Result<Vec<Task>, ApiError> {
        if self.panic_on_fetch {
            panic!("work tracker exploded");
        }
        self.fetch_windows.borrow_mut().push(window_minutes);
        if let Some(err) = &self.fetch_error {
            return Err(err.clone());
        }
        Ok(self.tasks.clone())
    }

    fn update_task_status(&self, id: &TaskId, status: TaskStatus) -> Result<(), ApiError> {
        if self.failing_status_updates.contains(id) {
            return Err(ApiError::RateLimited { service: "fake" });
        }
        self.status_updates.borrow_mut().push((id.clone(), status));
        Ok(())
    }
}
