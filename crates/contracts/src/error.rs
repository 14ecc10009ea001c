//! Layered error definitions
//!
//! Categorized by source: config / sink / task log

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Sink Errors =====
    /// Sink write error
    #[error("sink '{sink_name}' write error: {message}")]
    SinkWrite { sink_name: String, message: String },

    /// Sink connection error
    #[error("sink '{sink_name}' connection error: {message}")]
    SinkConnection {
        sink_name: String,
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },

    // ===== Task Log Errors =====
    /// Task log could not be opened
    #[error("task log '{log_id}' unavailable: {message}")]
    TaskLog { log_id: String, message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create sink write error
    pub fn sink_write(sink_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SinkWrite {
            sink_name: sink_name.into(),
            message: message.into(),
        }
    }

    /// Create sink connection error wrapping the underlying IO failure
    pub fn sink_connection(sink_name: impl Into<String>, source: std::io::Error) -> Self {
        Self::SinkConnection {
            sink_name: sink_name.into(),
            message: source.to_string(),
            source: Some(source),
        }
    }

    /// Create task log error
    pub fn task_log(log_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::TaskLog {
            log_id: log_id.into(),
            message: message.into(),
        }
    }
}
