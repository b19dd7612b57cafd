//! Static status translation between the two trackers.
//!
//! Lead → task is total: anything unrecognised becomes "To Do".
//! Task → lead is partial: labels outside the known three map to nothing and
//! the caller skips the record.

use leadsync_core::{LeadStatus, TaskStatus};

/// Task status a lead's follow-up task should carry.
///
/// `LOST` maps to "Complete" even though active-lead fetches exclude LOST
/// leads; both the filter and this entry are kept until one is retired.
pub fn lead_to_task_status(status: &LeadStatus) -> TaskStatus {
    match status {
        LeadStatus::New => TaskStatus::ToDo,
        LeadStatus::Contacted => TaskStatus::InProgress,
        LeadStatus::Qualified | LeadStatus::Lost => TaskStatus::Complete,
        LeadStatus::Other(_) => TaskStatus::ToDo,
    }
}

/// Lead status implied by a task's status label, matched case-insensitively.
pub fn task_to_lead_status(label: &str) -> Option<LeadStatus> {
    TaskStatus::from_label(label).map(|status| match status {
        TaskStatus::ToDo => LeadStatus::New,
        TaskStatus::InProgress => LeadStatus::Contacted,
        TaskStatus::Complete => LeadStatus::Qualified,
    })
}

/// Every explicit lead → task entry, in lifecycle order.
pub fn lead_to_task_entries() -> Vec<(LeadStatus, TaskStatus)> {
    [
        LeadStatus::New,
        LeadStatus::Contacted,
        LeadStatus::Qualified,
        LeadStatus::Lost,
    ]
    .into_iter()
    .map(|lead| {
        let task = lead_to_task_status(&lead);
        (lead, task)
    })
    .collect()
}

/// Every task → lead entry, keyed by the lower-case label the tracker reports.
pub fn task_to_lead_entries() -> Vec<(String, LeadStatus)> {
    TaskStatus::ALL
        .into_iter()
        .filter_map(|status| {
            let label = status.label().to_lowercase();
            task_to_lead_status(&label).map(|lead| (label, lead))
        })
        .collect()
}
