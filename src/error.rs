//! Error taxonomy
//!
//! Insufficient samples and cooldown suppression are not errors; they are
//! ordinary zero-risk / no-alert outcomes and never surface here.
//! Evidence collection failures are recorded on the bundle instead.

use std::path::PathBuf;
use thiserror::Error;

/// Rejected at the aggregator boundary.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RiskError {
    #[error("invalid distress score {score}: must be within [0, 1]")]
    InvalidScore { score: f64 },
}

/// Failures of the alert lifecycle. `Persistence` is fatal to `trigger()`.
#[derive(Error, Debug)]
pub enum AlertError {
    #[error("failed to persist alert {alert_id} to {path}: {source}")]
    Persistence {
        alert_id: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("alert record for {0} already exists")]
    DuplicateId(String),

    #[error("alert not found: {0}")]
    NotFound(String),

    #[error("invalid status transition for {alert_id}: {from} -> {to}")]
    InvalidTransition {
        alert_id: String,
        from: String,
        to: String,
    },

    #[error("corrupt alert record {path}: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize alert: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// A single sink's failure. Isolated per sink, never propagated past `trigger()`.
#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("sink not configured: {0}")]
    NotConfigured(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("network error: {0}")]
    Network(String),

    #[error("format error: {0}")]
    Format(String),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

pub type AlertResult<T> = Result<T, AlertError>;
