//! Dispatcher error types

use contracts::{ContractError, DestinationId, OperationKind};
use thiserror::Error;

/// Errors that terminate a dispatch run
#[derive(Debug, Error)]
pub enum DispatcherError {
    /// Routing key missing from the destination table. Configuration error, never retried.
    #[error("no destination configured for routing key '{routing_key}'")]
    DestinationNotFound { routing_key: String },

    /// The write sink call itself failed mid-stream
    #[error("flush of {operation} batch ({records} records) to destination '{destination}' failed")]
    Flush {
        destination: DestinationId,
        operation: OperationKind,
        records: usize,
        #[source]
        source: ContractError,
    },

    /// Task log could not be opened
    #[error("failed to open task log: {0}")]
    TaskLog(#[source] ContractError),

    /// Sink creation error
    #[error("failed to create sink '{name}': {message}")]
    SinkCreation { name: String, message: String },
}

impl DispatcherError {
    /// Create a sink creation error
    pub fn sink_creation(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SinkCreation {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Destination code the failure is attributed to, if any
    pub fn destination(&self) -> Option<&DestinationId> {
        match self {
            Self::Flush { destination, .. } => Some(destination),
            _ => None,
        }
    }

    /// Render the error with its full `source()` chain, one cause per line
    pub fn trace(&self) -> String {
        let mut out = self.to_string();
        let mut cause = std::error::Error::source(self);
        while let Some(err) = cause {
            out.push_str("\n  caused by: ");
            out.push_str(&err.to_string());
            cause = err.source();
        }
        out
    }
}
