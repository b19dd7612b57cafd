//! # leadsync-sync
//!
//! Two-way lead/task reconciliation.
//!
//! Build a [`TaskPayloadMapper`] once at startup, hand it to an [`Engine`]
//! together with a [`LeadTracker`] and a [`WorkTracker`], and call
//! [`Engine::run_pass`]. A pass never fails: per-record problems end up as
//! outcomes in the returned [`SyncReport`].

pub mod engine;
pub mod mapper;
pub mod ports;
pub mod report;
pub mod status_map;

pub use engine::{Engine, EngineOptions, PassScope};
pub use mapper::TaskPayloadMapper;
pub use ports::{LeadTracker, WorkTracker};
pub use report::{LeadOutcome, Outcome, PhaseReport, SyncReport, TaskOutcome};
