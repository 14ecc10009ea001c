//! Error types for CLI operations.

use thiserror::Error;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// Input line that is not a valid record
    #[error("Invalid record on line {line}: {message}")]
    InvalidRecord { line: u64, message: String },

    /// Trigger time that is not RFC 3339
    #[error("Invalid trigger time '{value}': {message}")]
    InvalidTriggerTime { value: String, message: String },

    /// Dispatch run failed
    #[error("Dispatch failed: {message}")]
    Dispatch { message: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub fn config_not_found(path: impl Into<String>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }

    pub fn invalid_record(line: u64, message: impl Into<String>) -> Self {
        Self::InvalidRecord {
            line,
            message: message.into(),
        }
    }

    pub fn invalid_trigger_time(value: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidTriggerTime {
            value: value.into(),
            message: message.into(),
        }
    }

    pub fn dispatch(message: impl Into<String>) -> Self {
        Self::Dispatch {
            message: message.into(),
        }
    }
}

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;
