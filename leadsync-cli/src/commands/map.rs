//! `leadsync map` — print the status translation tables.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use leadsync_core::LeadStatus;
use leadsync_sync::status_map;

/// Arguments for `leadsync map`.
#[derive(Args, Debug)]
pub struct MapArgs {}

#[derive(Tabled)]
struct LeadToTaskRow {
    #[tabled(rename = "lead status")]
    lead: String,
    #[tabled(rename = "task status")]
    task: String,
    #[tabled(rename = "note")]
    note: &'static str,
}

#[derive(Tabled)]
struct TaskToLeadRow {
    #[tabled(rename = "task status")]
    task: String,
    #[tabled(rename = "lead status")]
    lead: String,
}

impl MapArgs {
    pub fn run(self) -> Result<()> {
        let forward: Vec<LeadToTaskRow> = status_map::lead_to_task_entries()
            .into_iter()
            .map(|(lead, task)| LeadToTaskRow {
                note: if lead == LeadStatus::Lost {
                    "unreachable: LOST leads are not fetched"
                } else {
                    ""
                },
                lead: lead.to_string(),
                task: task.to_string(),
            })
            .chain(std::iter::once(LeadToTaskRow {
                lead: "(anything else)".to_string(),
                task: status_map::lead_to_task_status(&LeadStatus::Other(String::new())).to_string(),
                note: "default",
            }))
            .collect();

        let reverse: Vec<TaskToLeadRow> = status_map::task_to_lead_entries()
            .into_iter()
            .map(|(task, lead)| TaskToLeadRow {
                task,
                lead: lead.to_string(),
            })
            .chain(std::iter::once(TaskToLeadRow {
                task: "(anything else)".to_string(),
                lead: "skipped".to_string(),
            }))
            .collect();

        println!("{}", "Lead → task".bold());
        let mut table = Table::new(forward);
        table.with(Style::rounded());
        println!("{table}");

        println!("{}", "Task → lead (case-insensitive)".bold());
        let mut table = Table::new(reverse);
        table.with(Style::rounded());
        println!("{table}");
        Ok(())
    }
}
