//! # Dispatcher
//!
//! Batch output dispatcher.
//!
//! - Pops records from a bounded inbound queue
//! - Routes each record to a destination and buffers it per operation
//! - Writes a buffer to the write sink once it reaches its batch size
//! - Drains every remaining buffer when the stream finishes
//! - Stops without draining when the producing task is cancelled

pub mod buffer;
pub mod dispatcher;
pub mod error;
pub mod metrics;
pub mod queue;
pub mod resolver;
pub mod sinks;
pub mod task_log;

pub use contracts::{InboundRecord, OperationKind, WriteResult, WriteSink};
pub use dispatcher::{
    create_dispatcher, create_sink, BatchDispatcher, ConfiguredSink, FlushReport, RunOutcome,
    RunSummary, DEFAULT_POLL_TIMEOUT,
};
pub use error::DispatcherError;
pub use metrics::{DispatchMetrics, MetricsSnapshot};
pub use observability::FlushPhase;
pub use queue::{bounded, InboundQueue, QueueClosed, RecordProducer};
pub use resolver::{Destination, DestinationTable};
pub use sinks::{FileSink, LogSink, NetworkSink};
pub use task_log::{FileTaskLogs, TaskLogScope, TaskLogs, TracingTaskLogs};
