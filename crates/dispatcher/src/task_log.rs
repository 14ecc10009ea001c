//! Task log context
//!
//! Every dispatch run opens the log of the task that produced its records,
//! writes per-record failures and fatal conditions to it, and closes it on
//! every exit path. [`TaskLogScope`] owns the open handle and closes it in
//! `Drop`, so an early `?` return closes the log too.

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;
use contracts::{ContractError, LogLevel, TaskLog, TaskLogConfig, TaskLogFactory, TaskParams};
use tracing::{debug, error, info, warn};

fn emit(level: LogLevel, log_id: &str, message: &str) {
    match level {
        LogLevel::Info => info!(target: "task_log", log_id = %log_id, "{message}"),
        LogLevel::Warn => warn!(target: "task_log", log_id = %log_id, "{message}"),
        LogLevel::Error => error!(target: "task_log", log_id = %log_id, "{message}"),
    }
}

/// Open task log bound to one run; closes the handle when dropped
pub struct TaskLogScope<H: TaskLog> {
    handle: H,
}

impl<H: TaskLog> TaskLogScope<H> {
    /// Open the log for `params` through `factory`
    pub fn open<F>(factory: &F, params: &TaskParams) -> Result<Self, ContractError>
    where
        F: TaskLogFactory<Handle = H> + ?Sized,
    {
        Ok(Self::new(factory.open(params)?))
    }

    pub fn new(handle: H) -> Self {
        Self { handle }
    }

    pub fn info(&mut self, message: &str) {
        self.handle.log(LogLevel::Info, message);
    }

    pub fn warn(&mut self, message: &str) {
        self.handle.log(LogLevel::Warn, message);
    }

    pub fn error(&mut self, message: &str) {
        self.handle.log(LogLevel::Error, message);
    }
}

impl<H: TaskLog> Drop for TaskLogScope<H> {
    fn drop(&mut self) {
        self.handle.close();
    }
}

// ===== tracing-only =====

/// Task logs that only go through `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingTaskLogs;

#[derive(Debug)]
pub struct TracingTaskLog {
    log_id: String,
}

impl TaskLogFactory for TracingTaskLogs {
    type Handle = TracingTaskLog;

    fn open(&self, params: &TaskParams) -> Result<TracingTaskLog, ContractError> {
        debug!(log_id = %params.log_id, trigger_time = %params.trigger_time, "Task log opened");
        Ok(TracingTaskLog {
            log_id: params.log_id.clone(),
        })
    }
}

impl TaskLog for TracingTaskLog {
    fn log(&mut self, level: LogLevel, message: &str) {
        emit(level, &self.log_id, message);
    }

    fn close(&mut self) {
        debug!(log_id = %self.log_id, "Task log closed");
    }
}

// ===== file =====

/// Task logs stored as `<dir>/<log_id>/<trigger_time>.log`
#[derive(Debug, Clone)]
pub struct FileTaskLogs {
    dir: PathBuf,
}

impl FileTaskLogs {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Location of the log file for `params`
    ///
    /// The log id becomes a single directory name, so it never escapes `dir`.
    pub fn path_for(&self, params: &TaskParams) -> PathBuf {
        self.dir.join(dir_name(&params.log_id)).join(format!(
            "{}.log",
            params.trigger_time.format("%Y%m%dT%H%M%SZ")
        ))
    }
}

impl TaskLogFactory for FileTaskLogs {
    type Handle = FileTaskLog;

    fn open(&self, params: &TaskParams) -> Result<FileTaskLog, ContractError> {
        let path = self.path_for(params);
        let file = open_append(&path).map_err(|e| {
            ContractError::task_log(&params.log_id, format!("{}: {e}", path.display()))
        })?;

        debug!(log_id = %params.log_id, path = %path.display(), "Task log opened");
        Ok(FileTaskLog {
            log_id: params.log_id.clone(),
            path,
            writer: Some(BufWriter::new(file)),
        })
    }
}

fn dir_name(log_id: &str) -> String {
    let name: String = log_id
        .chars()
        .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
        .collect();
    match name.as_str() {
        "" | "." | ".." => "_".to_string(),
        _ => name,
    }
}

fn open_append(path: &Path) -> std::io::Result<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

/// Task log appending timestamped lines to a file, mirrored to `tracing`
#[derive(Debug)]
pub struct FileTaskLog {
    log_id: String,
    path: PathBuf,
    writer: Option<BufWriter<File>>,
}

impl FileTaskLog {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TaskLog for FileTaskLog {
    fn log(&mut self, level: LogLevel, message: &str) {
        emit(level, &self.log_id, message);

        let Some(writer) = self.writer.as_mut() else {
            warn!(log_id = %self.log_id, "Write to closed task log ignored");
            return;
        };
        let line = format!(
            "{} [{}] {}\n",
            Utc::now().to_rfc3339(),
            level.as_str(),
            message
        );
        if let Err(e) = writer.write_all(line.as_bytes()) {
            error!(
                log_id = %self.log_id,
                path = %self.path.display(),
                error = %e,
                "Task log write failed"
            );
        }
    }

    fn close(&mut self) {
        if let Some(mut writer) = self.writer.take() {
            if let Err(e) = writer.flush() {
                error!(log_id = %self.log_id, error = %e, "Task log flush failed on close");
            }
            debug!(log_id = %self.log_id, "Task log closed");
        }
    }
}

// ===== config-driven =====

/// Task log factory chosen from configuration
#[derive(Debug, Clone)]
pub enum TaskLogs {
    Tracing(TracingTaskLogs),
    File(FileTaskLogs),
}

impl TaskLogs {
    pub fn from_config(config: &TaskLogConfig) -> Self {
        match &config.dir {
            Some(dir) => Self::File(FileTaskLogs::new(dir)),
            None => Self::Tracing(TracingTaskLogs),
        }
    }
}

#[derive(Debug)]
pub enum AnyTaskLog {
    Tracing(TracingTaskLog),
    File(FileTaskLog),
}

impl TaskLogFactory for TaskLogs {
    type Handle = AnyTaskLog;

    fn open(&self, params: &TaskParams) -> Result<AnyTaskLog, ContractError> {
        match self {
            Self::Tracing(logs) => logs.open(params).map(AnyTaskLog::Tracing),
            Self::File(logs) => logs.open(params).map(AnyTaskLog::File),
        }
    }
}

impl TaskLog for AnyTaskLog {
    fn log(&mut self, level: LogLevel, message: &str) {
        match self {
            Self::Tracing(log) => log.log(level, message),
            Self::File(log) => log.log(level, message),
        }
    }

    fn close(&mut self) {
        match self {
            Self::Tracing(log) => log.close(),
            Self::File(log) => log.close(),
        }
    }
}
