//! Error types for control system operations.
//!
//! The control step itself never fails. These errors cover construction,
//! configuration loading, time parsing and named command dispatch.

use thiserror::Error;

/// Result type for control system operations.
pub type ControlResult<T> = Result<T, ControlError>;

/// Errors that can occur in control system operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ControlError {
    /// Invalid argument provided to a control function.
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    /// Time-of-day string could not be parsed.
    #[error("Invalid time of day: {what}")]
    InvalidTime { what: String },

    /// Command name not exposed by the controller.
    #[error("Unknown command: {name}")]
    UnknownCommand { name: String },

    /// Command invoked with the wrong number of arguments.
    #[error("Command {name} expects {expected} argument(s), got {got}")]
    CommandArity {
        name: String,
        expected: usize,
        got: usize,
    },

    /// Failure reported by a result sink.
    #[error("Result sink failed: {what}")]
    Sink { what: String },

    /// Configuration could not be read or decoded.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ControlError {
    /// Convenience constructor for sink failures.
    pub fn sink(what: impl Into<String>) -> Self {
        Self::Sink { what: what.into() }
    }
}

impl From<serde_yaml::Error> for ControlError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<serde_json::Error> for ControlError {
    fn from(err: serde_json::Error) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<std::io::Error> for ControlError {
    fn from(err: std::io::Error) -> Self {
        Self::Config(err.to_string())
    }
}
