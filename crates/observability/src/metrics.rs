//! Prometheus metrics of the batch dispatcher
//!
//! Thin wrappers over the `metrics` macros so metric names and labels stay
//! in one place. Without an installed recorder every call is a no-op.

use contracts::{DestinationId, OperationKind};
use metrics::{counter, histogram};

/// Why a buffer was flushed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushPhase {
    /// Buffer reached its batch size mid-stream
    Threshold,
    /// End-of-stream sweep
    Drain,
}

impl FlushPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Threshold => "threshold",
            Self::Drain => "drain",
        }
    }
}

impl std::fmt::Display for FlushPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a dispatch run ended, as a metric label
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunLabel {
    Completed,
    Cancelled,
    Failed,
}

impl RunLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Failed => "failed",
        }
    }
}

/// Record taken off the inbound queue
pub fn record_record_received() {
    counter!("dispatch_records_received_total").increment(1);
}

/// Sink call that returned per-record results
pub fn record_flush(
    destination: &DestinationId,
    operation: OperationKind,
    phase: FlushPhase,
    written: usize,
    failed: usize,
) {
    let destination = destination.to_string();
    let operation = operation.as_str();

    counter!(
        "dispatch_flushes_total",
        "destination" => destination.clone(),
        "operation" => operation,
        "phase" => phase.as_str()
    )
    .increment(1);

    histogram!("dispatch_batch_size", "operation" => operation).record((written + failed) as f64);

    if written > 0 {
        counter!(
            "dispatch_records_written_total",
            "destination" => destination.clone(),
            "operation" => operation
        )
        .increment(written as u64);
    }
    if failed > 0 {
        counter!(
            "dispatch_record_failures_total",
            "destination" => destination,
            "operation" => operation
        )
        .increment(failed as u64);
    }
}

/// Sink call that failed as a whole
pub fn record_flush_error(destination: &DestinationId, operation: OperationKind, phase: FlushPhase) {
    counter!(
        "dispatch_flush_errors_total",
        "destination" => destination.to_string(),
        "operation" => operation.as_str(),
        "phase" => phase.as_str()
    )
    .increment(1);
}

/// Finished dispatch run
pub fn record_run(outcome: RunLabel) {
    counter!("dispatch_runs_total", "outcome" => outcome.as_str()).increment(1);
}
