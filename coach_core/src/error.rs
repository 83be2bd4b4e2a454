//! Error types for the coach_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for coach_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// The persistence gateway could not be reached or refused the write.
    /// Callers may retry; no local state was discarded.
    #[error("Gateway unavailable: {0}")]
    Gateway(String),

    /// No user is signed in
    #[error("Not signed in")]
    Unauthenticated,

    /// Exercise id is not part of the loaded day schedule
    #[error("Unknown exercise: {0}")]
    UnknownExercise(String),

    /// Exercise already has a completion record for its date
    #[error("Exercise already completed: {0}")]
    AlreadyCompleted(String),

    /// Operation needs an active timer session
    #[error("No active exercise session")]
    NoActiveSession,

    /// Value could not be parsed (kind, level, date)
    #[error("Parse error: {0}")]
    Parse(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}
