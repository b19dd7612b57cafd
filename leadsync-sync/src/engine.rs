//! Reconciliation engine.
//!
//! ## Pass order
//!
//! 1. Lead → task: every active lead gets a task. Leads with a linked task
//!    get a status-only update; the rest get a new task whose id is written
//!    back onto the lead.
//! 2. Task → lead: every recently updated task that carries a reverse link
//!    pushes its (mapped) status onto the linked lead.
//!
//! Phase 1 always completes before phase 2 starts. Records are independent:
//! a failure is logged, recorded as an outcome, and the loop moves on. A
//! failed fetch yields an empty phase. A panic while handling one record
//! becomes that record's `Aborted` outcome; a panic anywhere else in a phase
//! is caught at the phase boundary so the other phase still runs.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use chrono::Utc;

use leadsync_core::{Lead, LeadUpdate, Task};

use crate::mapper::TaskPayloadMapper;
use crate::ports::{LeadTracker, WorkTracker};
use crate::report::{LeadOutcome, PhaseReport, SyncReport, TaskOutcome};
use crate::status_map;

/// Tunables for a pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineOptions {
    /// Phase 2 look-back window.
    pub window_minutes: u32,
    /// Read from both trackers but write nothing.
    pub dry_run: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            window_minutes: leadsync_core::config::DEFAULT_WINDOW_MINUTES,
            dry_run: false,
        }
    }
}

/// Which phases a pass runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PassScope {
    #[default]
    Both,
    LeadsToTasks,
    TasksToLeads,
}

impl PassScope {
    fn includes_leads(self) -> bool {
        matches!(self, PassScope::Both | PassScope::LeadsToTasks)
    }

    fn includes_tasks(self) -> bool {
        matches!(self, PassScope::Both | PassScope::TasksToLeads)
    }
}

pub struct Engine<'a, L: ?Sized, W: ?Sized> {
    leads: &'a L,
    tasks: &'a W,
    mapper: &'a TaskPayloadMapper,
    options: EngineOptions,
}

impl<'a, L, W> Engine<'a, L, W>
where
    L: LeadTracker + ?Sized,
    W: WorkTracker + ?Sized,
{
    pub fn new(
        leads: &'a L,
        tasks: &'a W,
        mapper: &'a TaskPayloadMapper,
        options: EngineOptions,
    ) -> Self {
        Self {
            leads,
            tasks,
            mapper,
            options,
        }
    }

    /// One full reconciliation pass: phase 1, then phase 2.
    pub fn run_pass(&self) -> SyncReport {
        self.run(PassScope::Both)
    }

    /// Run the phases selected by `scope`, in order, each behind the guard.
    pub fn run(&self, scope: PassScope) -> SyncReport {
        let started_at = Utc::now();
        let lead_to_task = scope
            .includes_leads()
            .then(|| guarded("lead → task", || self.sync_leads_to_tasks()));
        let task_to_lead = scope
            .includes_tasks()
            .then(|| guarded("task → lead", || self.sync_tasks_to_leads()));

        SyncReport {
            started_at,
            finished_at: Utc::now(),
            dry_run: self.options.dry_run,
            lead_to_task,
            task_to_lead,
        }
    }

    // -----------------------------------------------------------------------
    // Phase 1
    // -----------------------------------------------------------------------

    /// Ensure every active lead has a task carrying the mapped status.
    pub fn sync_leads_to_tasks(&self) -> PhaseReport<LeadOutcome> {
        tracing::info!("phase 1: lead → task (lead tracker is source)");

        let leads = match self.leads.fetch_active_leads() {
            Ok(leads) => leads,
            Err(err) => {
                tracing::error!("failed to retrieve leads: {err}");
                return PhaseReport::fetch_failed(err);
            }
        };
        tracing::info!("retrieved {} active leads", leads.len());

        let outcomes = leads
            .iter()
            .map(|lead| {
                isolated(&format!("lead {}", lead.id), || self.reconcile_lead(lead))
                    .unwrap_or_else(|reason| LeadOutcome::Aborted {
                        lead: lead.id.clone(),
                        reason,
                    })
            })
            .collect();
        PhaseReport::completed(outcomes)
    }

    fn reconcile_lead(&self, lead: &Lead) -> LeadOutcome {
        let payload = self.mapper.map(lead);
        let name = lead.name.as_deref().unwrap_or("N/A");

        if let Some(task) = lead.task_link() {
            if self.options.dry_run {
                tracing::info!("[dry-run] would set task {task} to '{}' for lead '{name}'", payload.status);
                return LeadOutcome::WouldPush {
                    lead: lead.id.clone(),
                    task: task.clone(),
                    status: payload.status,
                };
            }

            tracing::info!("existing lead '{name}' ({}): task {task} → '{}'", lead.id, payload.status);
            return match self.tasks.update_task_status(task, payload.status) {
                Ok(()) => LeadOutcome::StatusPushed {
                    lead: lead.id.clone(),
                    task: task.clone(),
                    status: payload.status,
                },
                Err(error) => {
                    tracing::error!("failed to process lead '{name}' ({}): {error}; continuing", lead.id);
                    LeadOutcome::Failed {
                        lead: lead.id.clone(),
                        error,
                    }
                }
            };
        }

        if self.options.dry_run {
            tracing::info!("[dry-run] would create task '{}' for lead '{name}'", payload.name);
            return LeadOutcome::WouldCreate {
                lead: lead.id.clone(),
                status: payload.status,
            };
        }

        tracing::info!("new lead '{name}' ({}): creating task", lead.id);
        let task = match self.tasks.create_task(&payload) {
            Ok(task) => task,
            Err(error) => {
                tracing::error!("failed to process lead '{name}' ({}): {error}; continuing", lead.id);
                return LeadOutcome::Failed {
                    lead: lead.id.clone(),
                    error,
                };
            }
        };

        match self.leads.update_lead(&lead.id, &LeadUpdate::link(task.clone())) {
            Ok(()) => {
                tracing::info!("linked lead {} → task {task}", lead.id);
                LeadOutcome::Created {
                    lead: lead.id.clone(),
                    task,
                }
            }
            Err(error) => {
                tracing::error!(
                    "task {task} created for lead {} but linking it failed: {error}; \
                     the next pass will create another task",
                    lead.id
                );
                LeadOutcome::CreatedUnlinked {
                    lead: lead.id.clone(),
                    task,
                    error,
                }
            }
        }
    }

    // -----------------------------------------------------------------------
    // Phase 2
    // -----------------------------------------------------------------------

    /// Push recently changed task statuses back onto their linked leads.
    pub fn sync_tasks_to_leads(&self) -> PhaseReport<TaskOutcome> {
        tracing::info!("phase 2: task → lead (work tracker is source)");

        let window = self.options.window_minutes;
        let tasks = match self.tasks.fetch_recently_updated(window) {
            Ok(tasks) => tasks,
            Err(err) => {
                tracing::error!("failed to retrieve updated tasks: {err}");
                return PhaseReport::fetch_failed(err);
            }
        };
        tracing::info!("retrieved {} tasks updated in the last {window} minutes", tasks.len());

        let outcomes = tasks
            .iter()
            .map(|task| {
                isolated(&format!("task {}", task.id), || self.reconcile_task(task))
                    .unwrap_or_else(|reason| TaskOutcome::Aborted {
                        task: task.id.clone(),
                        reason,
                    })
            })
            .collect();
        PhaseReport::completed(outcomes)
    }

    fn reconcile_task(&self, task: &Task) -> TaskOutcome {
        let Some(lead) = task.linked_lead(self.mapper.link_field()) else {
            tracing::debug!("task {} skipped: no lead link (internal task)", task.id);
            return TaskOutcome::NoLink {
                task: task.id.clone(),
            };
        };

        let Some(status) = status_map::task_to_lead_status(&task.status_label) else {
            tracing::warn!(
                "task status '{}' has no lead mapping; skipping lead {lead}",
                task.status_label
            );
            return TaskOutcome::Unmapped {
                task: task.id.clone(),
                lead,
                label: task.status_label.clone(),
            };
        };

        if self.options.dry_run {
            tracing::info!("[dry-run] would set lead {lead} to '{status}' from task {}", task.id);
            return TaskOutcome::WouldApply {
                task: task.id.clone(),
                lead,
                status,
            };
        }

        tracing::info!(
            "task {} is '{}': updating lead {lead} to '{status}'",
            task.id,
            task.status_label
        );
        match self.leads.update_lead(&lead, &LeadUpdate::status(status.clone())) {
            Ok(()) => TaskOutcome::Applied {
                task: task.id.clone(),
                lead,
                status,
            },
            Err(error) => {
                tracing::error!("failed to update lead {lead} from task {}: {error}; continuing", task.id);
                TaskOutcome::Failed {
                    task: task.id.clone(),
                    lead,
                    error,
                }
            }
        }
    }
}

/// Run one record's reconciliation; a panic comes back as its message so the
/// loop can move on to the next record.
fn isolated<T>(record: &str, run: impl FnOnce() -> T) -> Result<T, String> {
    panic::catch_unwind(AssertUnwindSafe(run)).map_err(|payload| {
        let reason = panic_message(payload.as_ref());
        tracing::error!("critical: processing {record} stopped: {reason}; continuing");
        reason
    })
}

/// Run one phase, turning a panic into an aborted report.
fn guarded<T>(phase: &str, run: impl FnOnce() -> PhaseReport<T>) -> PhaseReport<T> {
    match panic::catch_unwind(AssertUnwindSafe(run)) {
        Ok(report) => report,
        Err(payload) => {
            let reason = panic_message(payload.as_ref());
            tracing::error!("critical: {phase} phase stopped: {reason}");
            PhaseReport::aborted(reason)
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
