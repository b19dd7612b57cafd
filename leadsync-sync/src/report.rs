//! Per-record outcomes and pass summaries.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

use leadsync_core::{ApiError, LeadId, LeadStatus, TaskId, TaskStatus};

/// Common view over phase outcomes, used for tallies.
pub trait Outcome {
    /// Short snake_case name of the outcome variant.
    fn kind(&self) -> &'static str;

    /// True when the record was not brought in line because of an API failure.
    fn is_failure(&self) -> bool;
}

// ---------------------------------------------------------------------------
// Phase 1
// ---------------------------------------------------------------------------

/// What happened to one lead during the lead → task phase.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum LeadOutcome {
    /// A task was created and its id written back to the lead.
    Created { lead: LeadId, task: TaskId },
    /// A task was created but the write-back failed. The next pass will
    /// create another task for this lead.
    CreatedUnlinked {
        lead: LeadId,
        task: TaskId,
        #[serde(serialize_with = "display")]
        error: ApiError,
    },
    /// The linked task's status was re-applied.
    StatusPushed {
        lead: LeadId,
        task: TaskId,
        status: TaskStatus,
    },
    /// `--dry-run`: a task would be created.
    WouldCreate { lead: LeadId, status: TaskStatus },
    /// `--dry-run`: the linked task's status would be re-applied.
    WouldPush {
        lead: LeadId,
        task: TaskId,
        status: TaskStatus,
    },
    Failed {
        lead: LeadId,
        #[serde(serialize_with = "display")]
        error: ApiError,
    },
    /// Processing this lead stopped on an unexpected failure (a panic).
    Aborted { lead: LeadId, reason: String },
}

impl Outcome for LeadOutcome {
    fn kind(&self) -> &'static str {
        match self {
            LeadOutcome::Created { .. } => "created",
            LeadOutcome::CreatedUnlinked { .. } => "created_unlinked",
            LeadOutcome::StatusPushed { .. } => "status_pushed",
            LeadOutcome::WouldCreate { .. } => "would_create",
            LeadOutcome::WouldPush { .. } => "would_push",
            LeadOutcome::Failed { .. } => "failed",
            LeadOutcome::Aborted { .. } => "aborted",
        }
    }

    fn is_failure(&self) -> bool {
        matches!(
            self,
            LeadOutcome::Failed { .. }
                | LeadOutcome::CreatedUnlinked { .. }
                | LeadOutcome::Aborted { .. }
        )
    }
}

// ---------------------------------------------------------------------------
// Phase 2
// ---------------------------------------------------------------------------

/// What happened to one task during the task → lead phase.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TaskOutcome {
    /// The linked lead now carries the task-derived status.
    Applied {
        task: TaskId,
        lead: LeadId,
        status: LeadStatus,
    },
    /// `--dry-run`: the lead would be updated.
    WouldApply {
        task: TaskId,
        lead: LeadId,
        status: LeadStatus,
    },
    /// No reverse link; not a lead follow-up task.
    NoLink { task: TaskId },
    /// The task's status label has no lead equivalent.
    Unmapped {
        task: TaskId,
        lead: LeadId,
        label: String,
    },
    Failed {
        task: TaskId,
        lead: LeadId,
        #[serde(serialize_with = "display")]
        error: ApiError,
    },
    /// Processing this task stopped on an unexpected failure (a panic).
    Aborted { task: TaskId, reason: String },
}

impl Outcome for TaskOutcome {
    fn kind(&self) -> &'static str {
        match self {
            TaskOutcome::Applied { .. } => "applied",
            TaskOutcome::WouldApply { .. } => "would_apply",
            TaskOutcome::NoLink { .. } => "no_link",
            TaskOutcome::Unmapped { .. } => "unmapped",
            TaskOutcome::Failed { .. } => "failed",
            TaskOutcome::Aborted { .. } => "aborted",
        }
    }

    fn is_failure(&self) -> bool {
        matches!(self, TaskOutcome::Failed { .. } | TaskOutcome::Aborted { .. })
    }
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

/// Result of one phase.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhaseReport<T> {
    pub outcomes: Vec<T>,
    /// Set when the initial fetch failed; the phase then processed nothing.
    #[serde(serialize_with = "display_opt", skip_serializing_if = "Option::is_none")]
    pub fetch_error: Option<ApiError>,
    /// Set when the phase as a whole stopped on an unexpected failure (a
    /// panic outside any single record).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aborted: Option<String>,
}

impl<T> PhaseReport<T> {
    pub fn completed(outcomes: Vec<T>) -> Self {
        Self {
            outcomes,
            fetch_error: None,
            aborted: None,
        }
    }

    pub fn fetch_failed(error: ApiError) -> Self {
        Self {
            outcomes: Vec::new(),
            fetch_error: Some(error),
            aborted: None,
        }
    }

    pub fn aborted(reason: impl Into<String>) -> Self {
        Self {
            outcomes: Vec::new(),
            fetch_error: None,
            aborted: Some(reason.into()),
        }
    }
}

impl<T: Outcome> PhaseReport<T> {
    /// Outcome counts keyed by [`Outcome::kind`].
    pub fn tally(&self) -> BTreeMap<&'static str, usize> {
        let mut counts = BTreeMap::new();
        for outcome in &self.outcomes {
            *counts.entry(outcome.kind()).or_insert(0) += 1;
        }
        counts
    }

    pub fn failures(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_failure()).count()
    }

    /// No per-record failure, no fetch failure, no abort.
    pub fn is_clean(&self) -> bool {
        self.failures() == 0 && self.fetch_error.is_none() && self.aborted.is_none()
    }
}

/// Result of a reconciliation pass. Phases that were not requested are `None`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SyncReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub dry_run: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lead_to_task: Option<PhaseReport<LeadOutcome>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_to_lead: Option<PhaseReport<TaskOutcome>>,
}

impl SyncReport {
    pub fn is_clean(&self) -> bool {
        self.lead_to_task.as_ref().map_or(true, PhaseReport::is_clean)
            && self.task_to_lead.as_ref().map_or(true, PhaseReport::is_clean)
    }
}

fn display<S: Serializer>(error: &ApiError, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(error)
}

fn display_opt<S: Serializer>(error: &Option<ApiError>, serializer: S) -> Result<S::Ok, S::Error> {
    match error {
        Some(error) => serializer.collect_str(error),
        None => serializer.serialize_none(),
    }
}
