//! Error types for leadsync-core.

use std::path::PathBuf;

use thiserror::Error;

/// Startup-time configuration failures. Any of these aborts before the first
/// request is sent.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required setting was absent (or blank) in both the config file and
    /// the environment.
    #[error("missing required setting {key}; set it in the environment or the config file")]
    Missing { key: &'static str },

    /// A setting was present but could not be used.
    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },

    /// The config file could not be read.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid YAML for [`crate::config::ConfigFile`].
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// An explicitly requested config file does not exist.
    #[error("config file not found at {path}")]
    NotFound { path: PathBuf },
}

/// A failed call to one of the remote services.
///
/// Adapters return this instead of panicking or retrying; the engine decides
/// whether it means "empty result" (reads) or "skip this record" (writes).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The service answered 429. The adapter has already paused before
    /// returning this.
    #[error("{service} rate limit exceeded")]
    RateLimited { service: &'static str },

    /// Any other non-success HTTP status.
    #[error("{service} API error ({status}): {message}")]
    Status {
        service: &'static str,
        status: u16,
        message: String,
    },

    /// Connection, DNS or TLS failure; no HTTP status available.
    #[error("{service} connection error: {message}")]
    Transport {
        service: &'static str,
        message: String,
    },

    /// The response body did not have the expected shape.
    #[error("{service} returned an unexpected payload: {message}")]
    Decode {
        service: &'static str,
        message: String,
    },
}

impl ApiError {
    /// HTTP status associated with the failure, if there was one.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ApiError::RateLimited { .. } => Some(429),
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Transport { .. } | ApiError::Decode { .. } => None,
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, ApiError::RateLimited { .. })
    }
}
