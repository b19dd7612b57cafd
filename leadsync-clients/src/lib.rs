//! Blocking REST adapters for the two trackers.
//!
//! - [`AirtableClient`] implements [`leadsync_sync::LeadTracker`]
//! - [`ClickUpClient`] implements [`leadsync_sync::WorkTracker`]
//!
//! Both make one request per call. A 429 pauses for the configured duration
//! and then fails the call with [`leadsync_core::ApiError::RateLimited`].

pub mod airtable;
pub mod clickup;
mod http;

pub use airtable::AirtableClient;
pub use clickup::ClickUpClient;
