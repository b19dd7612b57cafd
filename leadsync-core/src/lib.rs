//! leadsync core library — domain types, configuration, errors.
//!
//! Public API surface:
//! - [`types`] — newtypes and domain structs shared by the engine and adapters
//! - [`error`] — [`ConfigError`] and [`ApiError`]
//! - [`config`] — [`SyncConfig`] resolution from YAML + environment

pub mod config;
pub mod error;
pub mod types;

pub use config::{AirtableConfig, ClickUpConfig, SyncConfig, SyncSettings};
pub use error::{ApiError, ConfigError};
pub use types::{
    CustomField, CustomFieldId, Lead, LeadId, LeadStatus, LeadUpdate, Task, TaskId, TaskPayload,
    TaskStatus,
};
