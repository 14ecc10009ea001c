//! Run metrics for observability

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters of a single dispatcher, reported through [`MetricsSnapshot`]
#[derive(Debug, Default)]
pub struct DispatchMetrics {
    /// Records taken off the inbound queue
    records_received: AtomicU64,
    /// Sink calls made when a buffer reached its batch size
    threshold_flushes: AtomicU64,
    /// Sink calls made by the end-of-stream drain
    drain_flushes: AtomicU64,
    /// Records the sink reported as written
    records_written: AtomicU64,
    /// Records the sink reported as failed
    record_failures: AtomicU64,
    /// Drain flushes whose sink call failed
    drain_failures: AtomicU64,
}

impl DispatchMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records_received(&self) -> u64 {
        self.records_received.load(Ordering::Relaxed)
    }

    pub fn inc_records_received(&self) {
        self.records_received.fetch_add(1, Ordering::Relaxed);
    }

    pub fn threshold_flushes(&self) -> u64 {
        self.threshold_flushes.load(Ordering::Relaxed)
    }

    pub fn inc_threshold_flushes(&self) {
        self.threshold_flushes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn drain_flushes(&self) -> u64 {
        self.drain_flushes.load(Ordering::Relaxed)
    }

    pub fn inc_drain_flushes(&self) {
        self.drain_flushes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn records_written(&self) -> u64 {
        self.records_written.load(Ordering::Relaxed)
    }

    pub fn add_records_written(&self, n: u64) {
        self.records_written.fetch_add(n, Ordering::Relaxed);
    }

    pub fn record_failures(&self) -> u64 {
        self.record_failures.load(Ordering::Relaxed)
    }

    pub fn add_record_failures(&self, n: u64) {
        self.record_failures.fetch_add(n, Ordering::Relaxed);
    }

    pub fn drain_failures(&self) -> u64 {
        self.drain_failures.load(Ordering::Relaxed)
    }

    pub fn inc_drain_failures(&self) {
        self.drain_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot of all metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            records_received: self.records_received(),
            threshold_flushes: self.threshold_flushes(),
            drain_flushes: self.drain_flushes(),
            records_written: self.records_written(),
            record_failures: self.record_failures(),
            drain_failures: self.drain_failures(),
        }
    }
}

/// Snapshot of dispatch metrics (for reporting)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub records_received: u64,
    pub threshold_flushes: u64,
    pub drain_flushes: u64,
    pub records_written: u64,
    pub record_failures: u64,
    pub drain_failures: u64,
}

impl MetricsSnapshot {
    /// Total sink calls
    pub fn flushes(&self) -> u64 {
        self.threshold_flushes + self.drain_flushes
    }
}
