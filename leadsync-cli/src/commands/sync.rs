//! `leadsync sync` — run one reconciliation pass.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use colored::Colorize;

use leadsync_clients::{AirtableClient, ClickUpClient};
use leadsync_sync::{
    Engine, EngineOptions, LeadOutcome, Outcome, PassScope, PhaseReport, SyncReport,
    TaskOutcome, TaskPayloadMapper,
};

use super::load_config;

/// Arguments for `leadsync sync`.
#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Which direction(s) to reconcile.
    #[arg(long, value_enum, default_value_t = Phase::Both)]
    pub phase: Phase,

    /// Look-back window for task changes, overriding the configured value.
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub window_minutes: Option<u32>,

    /// Read from both trackers and report what would change, writing nothing.
    #[arg(long)]
    pub dry_run: bool,

    /// Emit the pass report as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Both,
    /// Lead → task only.
    Leads,
    /// Task → lead only.
    Tasks,
}

impl From<Phase> for PassScope {
    fn from(phase: Phase) -> Self {
        match phase {
            Phase::Both => PassScope::Both,
            Phase::Leads => PassScope::LeadsToTasks,
            Phase::Tasks => PassScope::TasksToLeads,
        }
    }
}

impl SyncArgs {
    /// Only configuration problems fail the command. Failures inside the pass
    /// are reported and the process still exits cleanly.
    pub fn run(self, config_path: Option<&Path>) -> Result<()> {
        let config = load_config(config_path).map_err(|err| {
            tracing::error!("critical: {err:#}");
            err
        })?;
        let mapper = TaskPayloadMapper::new(&config.clickup.custom_field_id)
            .context("configuration error; no sync attempted")?;

        let airtable = AirtableClient::new(&config.airtable);
        let clickup = ClickUpClient::new(&config.clickup);
        let options = EngineOptions {
            window_minutes: self.window_minutes.unwrap_or(config.sync.window_minutes),
            dry_run: self.dry_run,
        };

        tracing::info!("starting two-way synchronization");
        let report = Engine::new(&airtable, &clickup, &mapper, options).run(self.phase.into());
        tracing::info!("synchronization completed");

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&report).context("failed to serialize sync report")?
            );
            return Ok(());
        }

        print_report(&report);
        Ok(())
    }
}

fn print_report(report: &SyncReport) {
    let prefix = if report.dry_run { "[dry-run] " } else { "" };

    if let Some(phase) = &report.lead_to_task {
        print_phase(prefix, "lead → task", phase, lead_line);
    }
    if let Some(phase) = &report.task_to_lead {
        print_phase(prefix, "task → lead", phase, task_line);
    }

    let elapsed = report.finished_at - report.started_at;
    println!(
        "{}",
        format!("pass finished in {}ms", elapsed.num_milliseconds()).bright_black()
    );
}

fn print_phase<T: Outcome>(
    prefix: &str,
    name: &str,
    phase: &PhaseReport<T>,
    line: fn(&T) -> String,
) {
    if let Some(reason) = &phase.aborted {
        println!("{prefix}{} {name} aborted: {reason}", "✗".red().bold());
        return;
    }
    if let Some(error) = &phase.fetch_error {
        println!("{prefix}{} {name} skipped, fetch failed: {error}", "✗".red().bold());
        return;
    }
    if phase.outcomes.is_empty() {
        println!("{prefix}✓ {name} — nothing to do");
        return;
    }

    let mark = if phase.is_clean() {
        "✓".green().bold()
    } else {
        "!".yellow().bold()
    };
    println!("{prefix}{mark} {name} ({})", summarize(&phase.tally()));
    for outcome in &phase.outcomes {
        println!("  {}", line(outcome));
    }
}

fn summarize(tally: &BTreeMap<&'static str, usize>) -> String {
    tally
        .iter()
        .map(|(kind, count)| format!("{count} {}", kind.replace('_', " ")))
        .collect::<Vec<_>>()
        .join(", ")
}

fn lead_line(outcome: &LeadOutcome) -> String {
    match outcome {
        LeadOutcome::Created { lead, task } => format!("✎  {lead} → new task {task}"),
        LeadOutcome::CreatedUnlinked { lead, task, error } => format!(
            "{}  {lead} → new task {task}, link not saved: {error}",
            "!".yellow()
        ),
        LeadOutcome::StatusPushed { lead, task, status } => {
            format!("✎  {lead} → {task} '{status}'")
        }
        LeadOutcome::WouldCreate { lead, status } => format!("~  {lead} → new task '{status}'"),
        LeadOutcome::WouldPush { lead, task, status } => format!("~  {lead} → {task} '{status}'"),
        LeadOutcome::Failed { lead, error } => format!("{}  {lead}: {error}", "✗".red()),
        LeadOutcome::Aborted { lead, reason } => {
            format!("{}  {lead} aborted: {reason}", "✗".red())
        }
    }
}

fn task_line(outcome: &TaskOutcome) -> String {
    match outcome {
        TaskOutcome::Applied { task, lead, status } => format!("✎  {task} → {lead} {status}"),
        TaskOutcome::WouldApply { task, lead, status } => format!("~  {task} → {lead} {status}"),
        TaskOutcome::NoLink { task } => format!("·  {task} has no linked lead"),
        TaskOutcome::Unmapped { task, label, .. } => {
            format!("·  {task} status '{label}' has no lead equivalent")
        }
        TaskOutcome::Failed { task, lead, error } => {
            format!("{}  {task} → {lead}: {error}", "✗".red())
        }
        TaskOutcome::Aborted { task, reason } => {
            format!("{}  {task} aborted: {reason}", "✗".red())
        }
    }
}
