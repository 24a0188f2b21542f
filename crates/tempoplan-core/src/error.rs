//! Core error types for tempoplan-core.
//!
//! Structural input errors (bad time strings, malformed slots) fail fast.
//! Placement shortfalls are not errors: they flow through
//! [`ScheduleResult::unscheduled`](crate::scheduler::ScheduleResult).

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for tempoplan-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Time string parsing/formatting errors
    #[error("Time error: {0}")]
    Time(#[from] TimeError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Learning store / database errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Task source failures
    #[error("Task source error: {0}")]
    TaskSource(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors from "HH:MM" conversions.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimeError {
    /// Input is not a zero-padded "HH:MM" wall-clock time
    #[error("Invalid time format '{input}': expected zero-padded HH:MM")]
    InvalidFormat { input: String },

    /// Minute value outside of a single day
    #[error("Minute value {minutes} is outside of [0, {limit})")]
    OutOfRange { minutes: u32, limit: u32 },
}

/// Validation errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Slot or busy interval with end <= start, or outside of a day
    #[error("Malformed slot: start ({start}) must be before end ({end}) and within a day")]
    MalformedSlot { start: u32, end: u32 },

    /// Pre-computed slots that overlap each other
    #[error("Slots overlap: [{first_start}, {first_end}) and [{second_start}, {second_end})")]
    OverlappingSlots {
        first_start: u32,
        first_end: u32,
        second_start: u32,
        second_end: u32,
    },

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },

    /// Mood string outside of the closed enumeration
    #[error("Unknown mood '{0}': expected energetic, neutral or tired")]
    UnknownMood(String),
}

/// Learning store errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Backing storage cannot be reached
    #[error("Learning store unavailable: {0}")]
    Unavailable(String),

    /// Failed to open the database file
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    Query(String),

    /// Stored row could not be decoded
    #[error("Corrupt learning record for '{mood}': {message}")]
    Corrupt { mood: String, message: String },

    /// Data directory could not be prepared
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
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

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Dotted key that does not exist in the configuration
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(inner, _msg)
                if matches!(
                    inner.code,
                    rusqlite::ErrorCode::DatabaseBusy
                        | rusqlite::ErrorCode::DatabaseLocked
                        | rusqlite::ErrorCode::CannotOpen
                ) =>
            {
                StorageError::Unavailable(err.to_string())
            }
            _ => StorageError::Query(err.to_string()),
        }
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
