//! Statistics of a dispatch run.

use std::time::Duration;

use dispatcher::{MetricsSnapshot, RunOutcome};

use super::reader::InputStats;

/// Statistics from a pipeline run
#[derive(Debug, Clone)]
pub struct PipelineStats {
    pub outcome: RunOutcome,

    /// Input side counters
    pub input: InputStats,

    /// Dispatcher counters
    pub dispatch: MetricsSnapshot,

    /// Records still buffered when the dispatcher returned
    pub pending: usize,

    /// Total duration of the run
    pub duration: Duration,
}

impl PipelineStats {
    /// Records received by the dispatcher per second
    pub fn records_per_sec(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.dispatch.records_received as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                     Dispatch Statistics                      ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");

        println!("📊 Overview");
        println!("   ├─ Outcome: {:?}", self.outcome);
        println!("   ├─ Duration: {:.2}s", self.duration.as_secs_f64());
        println!("   ├─ Lines read: {}", self.input.lines_read);
        println!("   ├─ Lines skipped: {}", self.input.lines_skipped);
        println!("   └─ Records/s: {:.2}", self.records_per_sec());

        println!("\n📤 Dispatcher");
        println!("   ├─ Records received: {}", self.dispatch.records_received);
        println!("   ├─ Records written: {}", self.dispatch.records_written);
        println!("   ├─ Records rejected: {}", self.dispatch.record_failures);
        println!(
            "   ├─ Flushes: {} (threshold {}, drain {})",
            self.dispatch.flushes(),
            self.dispatch.threshold_flushes,
            self.dispatch.drain_flushes
        );
        println!("   ├─ Failed drain flushes: {}", self.dispatch.drain_failures);
        println!("   └─ Records left pending: {}", self.pending);

        println!();
    }
}
