//! Per-task log context
//!
//! A dispatch run writes its human-readable diagnostics to a log bound to
//! the task that produced the records. The log is opened once per run from
//! the task parameters and must be closed on every exit path.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ContractError;

/// Identifies the task run a dispatch belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskParams {
    /// When the task was triggered
    pub trigger_time: DateTime<Utc>,
    /// Log stream identifier of the task
    pub log_id: String,
}

impl TaskParams {
    pub fn new(trigger_time: DateTime<Utc>, log_id: impl Into<String>) -> Self {
        Self {
            trigger_time,
            log_id: log_id.into(),
        }
    }

    /// Params for a run triggered now
    pub fn now(log_id: impl Into<String>) -> Self {
        Self::new(Utc::now(), log_id)
    }
}

impl fmt::Display for TaskParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.log_id, self.trigger_time.to_rfc3339())
    }
}

/// Severity of a task log line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
        }
    }
}

/// An open task log handle
pub trait TaskLog {
    /// Append one line
    fn log(&mut self, level: LogLevel, message: &str);

    /// Release the handle. Called exactly once per opened handle.
    fn close(&mut self);
}

/// Opens task logs
pub trait TaskLogFactory {
    type Handle: TaskLog;

    /// Open the log for one run
    ///
    /// # Errors
    /// Returns an error if the backing storage cannot be opened.
    fn open(&self, params: &TaskParams) -> Result<Self::Handle, ContractError>;
}

impl<F: TaskLogFactory + ?Sized> TaskLogFactory for &F {
    type Handle = F::Handle;

    fn open(&self, params: &TaskParams) -> Result<Self::Handle, ContractError> {
        (**self).open(params)
    }
}
