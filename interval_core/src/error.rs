//! Error types for the interval_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for interval_core operations
///
/// The timer engine itself never fails; these cover loading routines and
/// configuration from disk.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Routine validation error
    #[error("Routine validation error: {0}")]
    RoutineValidation(String),

    /// No built-in routine or file matched the requested name
    #[error("Unknown routine: {0}")]
    UnknownRoutine(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

/// Failure reported by an audio or haptics collaborator
///
/// These never reach the timer; outlets log and discard them.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CueError {
    /// The device or sound bank is not available
    #[error("cue output unavailable: {0}")]
    Unavailable(String),

    /// Playback was attempted and refused
    #[error("cue rejected: {0}")]
    Rejected(String),
}
