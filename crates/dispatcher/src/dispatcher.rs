//! BatchDispatcher - main loop from the inbound queue to the write sink

use std::time::Duration;

use serde_json::Value;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};

use contracts::{
    write_batch, CancellationSource, ContractError, DestinationId, DispatchBlueprint,
    OperationKind, SinkConfig, SinkType, TaskLog, TaskLogFactory, TaskParams, WriteResult,
    WriteSink,
};
use observability::FlushPhase;

use crate::buffer::PendingBuffers;
use crate::error::DispatcherError;
use crate::metrics::{DispatchMetrics, MetricsSnapshot};
use crate::queue::InboundQueue;
use crate::resolver::DestinationTable;
use crate::sinks::{FileSink, LogSink, NetworkSink};
use crate::task_log::TaskLogScope;

/// Default wait of one poll on the inbound queue
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_secs(1);

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Stream finished and every buffer was drained
    Completed,
    /// Cancellation observed; pending buffers were abandoned
    Cancelled,
}

/// Result of a run that did not fail fatally
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub outcome: RunOutcome,
    pub metrics: MetricsSnapshot,
    /// Records still buffered when the run returned
    pub pending: usize,
}

impl RunSummary {
    pub fn is_cancelled(&self) -> bool {
        self.outcome == RunOutcome::Cancelled
    }
}

/// Outcome of a single sink call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushReport {
    pub written: usize,
    pub failed: usize,
}

/// Buffers records per (destination, operation) and writes them in batches
///
/// A batch leaves its buffer only after the sink call returned; a failed
/// call keeps it buffered, observable through [`BatchDispatcher::pending`].
pub struct BatchDispatcher<S: WriteSink> {
    sink: S,
    poll_timeout: Duration,
    buffers: PendingBuffers,
    metrics: DispatchMetrics,
}

impl<S: WriteSink> BatchDispatcher<S> {
    /// Create a dispatcher writing to `sink`
    pub fn with_sink(sink: S) -> Self {
        Self {
            sink,
            poll_timeout: DEFAULT_POLL_TIMEOUT,
            buffers: PendingBuffers::new(),
            metrics: DispatchMetrics::new(),
        }
    }

    /// Set the per-poll wait on the inbound queue
    pub fn poll_timeout(mut self, timeout: Duration) -> Self {
        self.poll_timeout = timeout;
        self
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Records not yet accepted by the sink
    pub fn pending(&self) -> &PendingBuffers {
        &self.buffers
    }

    /// Consume `queue` until the stream finishes or `cancel` is observed
    ///
    /// Opens the task log for `params` and closes it on every exit path.
    /// Returns `Err` on an unknown routing key or a failed sink call while
    /// the stream is live; buffers of other destinations are left as they
    /// are in that case. Sink failures during the final drain are logged
    /// and counted instead.
    #[instrument(
        name = "dispatcher_run",
        skip_all,
        fields(task = %params, sink = %self.sink.name(), destinations = destinations.len())
    )]
    pub async fn run<C, L>(
        &mut self,
        destinations: &DestinationTable,
        queue: &mut InboundQueue,
        cancel: &C,
        params: &TaskParams,
        logs: &L,
    ) -> Result<RunSummary, DispatcherError>
    where
        C: CancellationSource + ?Sized,
        L: TaskLogFactory + ?Sized,
    {
        let mut log = TaskLogScope::open(logs, params).map_err(DispatcherError::TaskLog)?;
        info!(poll_timeout = ?self.poll_timeout, "Dispatcher started");

        while !queue.is_finished() || !queue.is_empty() {
            if cancel.is_cancelled() {
                return Ok(self.cancelled(params, &mut log));
            }

            let Some(record) = queue.try_pop(self.poll_timeout).await else {
                continue;
            };
            self.metrics.inc_records_received();
            observability::record_record_received();

            let destination = match destinations.resolve(&record.routing_key) {
                Ok(id) => id.clone(),
                Err(e) => {
                    error!(routing_key = %record.routing_key, "Unknown routing key");
                    log.error(&format!("task {params} aborted: {e}"));
                    return Err(e);
                }
            };

            self.classify(&destination, record.operation, record.payload);

            let batch_size = destinations.batch_size(&destination);
            for operation in OperationKind::ALL {
                if !self.buffers.is_due(&destination, operation, batch_size) {
                    continue;
                }
                if let Err(e) = self
                    .flush(&destination, operation, FlushPhase::Threshold, &mut log)
                    .await
                {
                    error!(
                        destination = %destination,
                        operation = %operation,
                        pending = self.buffers.total_pending(),
                        "Flush failed, aborting run"
                    );
                    log.error(&format!("task {params} aborted: {}", e.trace()));
                    return Err(e);
                }
            }

            let received = self.metrics.records_received();
            if received.is_multiple_of(1000) {
                debug!(
                    received,
                    pending = self.buffers.total_pending(),
                    "Dispatcher progress"
                );
            }
        }

        // A kill observed after the stream ended still skips the drain
        if cancel.is_cancelled() {
            return Ok(self.cancelled(params, &mut log));
        }

        info!(
            received = self.metrics.records_received(),
            pending = self.buffers.total_pending(),
            "Inbound stream finished, draining"
        );
        let drain_failures = self.drain_all(destinations, &mut log).await;
        if drain_failures > 0 {
            log.warn(&format!(
                "task {params} finished with {drain_failures} failed drain flush(es)"
            ));
        }

        let summary = self.summary(RunOutcome::Completed);
        info!(
            records_written = summary.metrics.records_written,
            record_failures = summary.metrics.record_failures,
            flushes = summary.metrics.flushes(),
            "Dispatcher finished"
        );
        Ok(summary)
    }

    /// Spawn the run as a background task
    ///
    /// The dispatcher is handed back together with the result so the caller
    /// can inspect pending buffers or the sink afterwards.
    pub fn spawn<C, L>(
        mut self,
        destinations: DestinationTable,
        mut queue: InboundQueue,
        cancel: C,
        params: TaskParams,
        logs: L,
    ) -> JoinHandle<(Self, Result<RunSummary, DispatcherError>)>
    where
        S: Send + 'static,
        C: CancellationSource + Send + Sync + 'static,
        L: TaskLogFactory + Send + Sync + 'static,
        L::Handle: Send,
    {
        tokio::spawn(async move {
            let result = self
                .run(&destinations, &mut queue, &cancel, &params, &logs)
                .await;
            (self, result)
        })
    }

    /// Append a payload to its (destination, operation) buffer
    pub fn classify(
        &mut self,
        destination: &DestinationId,
        operation: OperationKind,
        payload: Value,
    ) {
        self.buffers.classify(destination, operation, payload);
    }

    /// Write one buffer to the sink and empty it
    ///
    /// Every failed [`WriteResult`] is written to the task log with its
    /// error and payload. An empty buffer is not sent.
    ///
    /// # Errors
    /// [`DispatcherError::Flush`] when the sink call itself fails; the
    /// buffer keeps its records.
    #[instrument(
        name = "dispatcher_flush",
        skip(self, log),
        fields(records = self.buffers.len(destination, operation))
    )]
    pub async fn flush<H: TaskLog>(
        &mut self,
        destination: &DestinationId,
        operation: OperationKind,
        phase: FlushPhase,
        log: &mut TaskLogScope<H>,
    ) -> Result<FlushReport, DispatcherError> {
        let batch = self.buffers.peek(destination, operation);
        if batch.is_empty() {
            return Ok(FlushReport::default());
        }
        let records = batch.len();

        let results = match write_batch(&mut self.sink, operation, destination, batch).await {
            Ok(results) => results,
            Err(source) => {
                observability::record_flush_error(destination, operation, phase);
                return Err(flush_error(destination, operation, records, source));
            }
        };

        if results.len() != records {
            warn!(
                expected = records,
                returned = results.len(),
                "Sink returned a different number of results than records sent"
            );
        }

        let mut report = FlushReport::default();
        for result in &results {
            if result.success {
                report.written += 1;
            } else {
                report.failed += 1;
                log_failure(log, destination, operation, result);
            }
        }
        // Records the sink did not answer for count as failed
        for payload in batch.iter().skip(results.len()) {
            report.failed += 1;
            let missing = WriteResult::failed(payload.clone(), "no result returned by sink");
            log_failure(log, destination, operation, &missing);
        }

        self.buffers.clear(destination, operation);
        match phase {
            FlushPhase::Threshold => self.metrics.inc_threshold_flushes(),
            FlushPhase::Drain => self.metrics.inc_drain_flushes(),
        }
        self.metrics.add_records_written(report.written as u64);
        self.metrics.add_record_failures(report.failed as u64);
        observability::record_flush(destination, operation, phase, report.written, report.failed);

        debug!(
            written = report.written,
            failed = report.failed,
            phase = %phase,
            "Batch flushed"
        );
        Ok(report)
    }

    /// Flush every non-empty buffer, one sink call per (destination, operation)
    ///
    /// A failing sink call is logged and the sweep moves on. Returns the
    /// number of failed calls.
    #[instrument(name = "dispatcher_drain", skip_all, fields(pending = self.buffers.total_pending()))]
    pub async fn drain_all<H: TaskLog>(
        &mut self,
        destinations: &DestinationTable,
        log: &mut TaskLogScope<H>,
    ) -> usize {
        let mut keys: Vec<(DestinationId, OperationKind)> = destinations
            .destinations()
            .iter()
            .flat_map(|d| OperationKind::ALL.into_iter().map(move |op| (d.id.clone(), op)))
            .filter(|(id, op)| self.buffers.len(id, *op) > 0)
            .collect();
        // Buffers of destinations missing from the table are swept last
        for key in self.buffers.non_empty() {
            if !keys.contains(&key) {
                keys.push(key);
            }
        }

        let mut failures = 0;
        for (destination, operation) in keys {
            if let Err(e) = self
                .flush(&destination, operation, FlushPhase::Drain, log)
                .await
            {
                failures += 1;
                self.metrics.inc_drain_failures();
                error!(
                    destination = %destination,
                    operation = %operation,
                    error = %e,
                    "Drain flush failed, continuing"
                );
                log.error(&e.trace());
            }
        }
        failures
    }

    fn cancelled<H: TaskLog>(&self, params: &TaskParams, log: &mut TaskLogScope<H>) -> RunSummary {
        let summary = self.summary(RunOutcome::Cancelled);
        warn!(pending = summary.pending, "Cancellation observed, stopping without drain");
        log.warn(&format!(
            "task {params} was killed; {} buffered record(s) not written",
            summary.pending
        ));
        summary
    }

    fn summary(&self, outcome: RunOutcome) -> RunSummary {
        RunSummary {
            outcome,
            metrics: self.metrics.snapshot(),
            pending: self.buffers.total_pending(),
        }
    }
}

fn flush_error(
    destination: &DestinationId,
    operation: OperationKind,
    records: usize,
    source: ContractError,
) -> DispatcherError {
    DispatcherError::Flush {
        destination: destination.clone(),
        operation,
        records,
        source,
    }
}

fn log_failure<H: TaskLog>(
    log: &mut TaskLogScope<H>,
    destination: &DestinationId,
    operation: OperationKind,
    result: &WriteResult,
) {
    let reason = result.error.as_deref().unwrap_or("unknown error");
    warn!(
        destination = %destination,
        operation = %operation,
        error = reason,
        "Record rejected by sink"
    );
    log.error(&format!(
        "failed to {operation} record into {destination}: {reason}; payload: {}",
        result.payload
    ));
}

// ===== configuration-driven construction =====

/// Write sink chosen from configuration
pub enum ConfiguredSink {
    Log(LogSink),
    File(FileSink),
    Network(NetworkSink),
}

impl WriteSink for ConfiguredSink {
    fn name(&self) -> &str {
        match self {
            Self::Log(sink) => sink.name(),
            Self::File(sink) => sink.name(),
            Self::Network(sink) => sink.name(),
        }
    }

    async fn insert(
        &mut self,
        destination: &DestinationId,
        records: &[Value],
    ) -> Result<Vec<WriteResult>, ContractError> {
        match self {
            Self::Log(sink) => sink.insert(destination, records).await,
            Self::File(sink) => sink.insert(destination, records).await,
            Self::Network(sink) => sink.insert(destination, records).await,
        }
    }

    async fn update(
        &mut self,
        destination: &DestinationId,
        records: &[Value],
    ) -> Result<Vec<WriteResult>, ContractError> {
        match self {
            Self::Log(sink) => sink.update(destination, records).await,
            Self::File(sink) => sink.update(destination, records).await,
            Self::Network(sink) => sink.update(destination, records).await,
        }
    }

    async fn upsert(
        &mut self,
        destination: &DestinationId,
        records: &[Value],
    ) -> Result<Vec<WriteResult>, ContractError> {
        match self {
            Self::Log(sink) => sink.upsert(destination, records).await,
            Self::File(sink) => sink.upsert(destination, records).await,
            Self::Network(sink) => sink.upsert(destination, records).await,
        }
    }
}

/// Create the write sink described by `config`
#[instrument(
    name = "dispatcher_create_sink",
    skip(config),
    fields(sink = %config.name, sink_type = ?config.sink_type)
)]
pub async fn create_sink(config: &SinkConfig) -> Result<ConfiguredSink, DispatcherError> {
    match config.sink_type {
        SinkType::Log => Ok(ConfiguredSink::Log(LogSink::new(&config.name))),
        SinkType::File => FileSink::from_params(&config.name, &config.params)
            .map(ConfiguredSink::File)
            .map_err(|e| DispatcherError::sink_creation(&config.name, e.to_string())),
        SinkType::Network => NetworkSink::from_params(&config.name, &config.params)
            .await
            .map(ConfiguredSink::Network)
            .map_err(|e| DispatcherError::sink_creation(&config.name, e.to_string())),
    }
}

/// Build a dispatcher and its destination table from a validated blueprint
#[instrument(name = "dispatcher_create", skip(blueprint))]
pub async fn create_dispatcher(
    blueprint: &DispatchBlueprint,
) -> Result<(BatchDispatcher<ConfiguredSink>, DestinationTable), DispatcherError> {
    let sink = create_sink(&blueprint.sink).await?;
    let destinations = DestinationTable::from_blueprint(blueprint);
    let dispatcher =
        BatchDispatcher::with_sink(sink).poll_timeout(blueprint.dispatcher.poll_timeout());

    info!(
        destinations = destinations.len(),
        sink = %blueprint.sink.name,
        "Dispatcher created"
    );
    Ok((dispatcher, destinations))
}
