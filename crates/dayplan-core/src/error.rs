//! Core error types for dayplan-core.
//!
//! Scheduling validation errors are synchronous and must be handled at the
//! call site before a save proceeds. Write coordinator failures are logged
//! and retried by the coordinator itself; they only reach a caller that
//! invoked `flush()` directly.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for dayplan-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Scheduling validation errors
    #[error("Schedule error: {0}")]
    Schedule(#[from] ScheduleError),

    /// Batched write errors
    #[error("Batch error: {0}")]
    Batch(#[from] BatchError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Plan documents that cannot be parsed
    #[error("Failed to parse plan: {0}")]
    PlanParse(String),
}

/// Errors raised by the day-schedule and sub-timeline engines.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    /// Malformed or out-of-range time of day
    #[error("Invalid time '{input}': {reason}")]
    InvalidTime { input: String, reason: String },

    /// End does not come after start once day offsets are applied
    #[error("Invalid interval: end ({end}) must be greater than start ({start})")]
    InvalidInterval { start: i64, end: i64 },

    /// Candidate interval collides with an existing entry
    #[error("Scheduling conflict with '{with}'")]
    SchedulingConflict { with: String },

    /// Two adjacent entries overlap even though they passed validation
    #[error("Inconsistent timeline: '{earlier}' ends {overlap_minutes} min after '{later}' starts")]
    Inconsistent {
        earlier: String,
        later: String,
        overlap_minutes: i64,
    },

    /// Referenced parent block does not exist
    #[error("Unknown block: {0}")]
    UnknownBlock(String),
}

impl ScheduleError {
    pub(crate) fn invalid_time(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidTime {
            input: input.into(),
            reason: reason.into(),
        }
    }
}

/// Errors reported by a [`RemoteStore`](crate::batch::RemoteStore) implementation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{collection}: {message}")]
pub struct StoreError {
    pub collection: String,
    pub message: String,
}

impl StoreError {
    pub fn new(collection: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            message: message.into(),
        }
    }
}

/// Batched write coordinator errors.
#[derive(Error, Debug)]
pub enum BatchError {
    /// The store rejected some operations; they were put back on the queue.
    #[error("Batch flush failed: {failed} of {attempted} operations re-queued ({source})")]
    FlushFailure {
        attempted: usize,
        failed: usize,
        #[source]
        source: StoreError,
    },

    /// The coordinator was created outside a Tokio runtime
    #[error("Write coordinator requires a Tokio runtime")]
    NoRuntime,
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Unknown dot-path key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// No home directory to put the configuration in
    #[error("Cannot determine configuration directory")]
    NoConfigDir,
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
