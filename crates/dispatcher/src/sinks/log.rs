//! LogSink - logs batch summaries via tracing

use contracts::{ContractError, DestinationId, OperationKind, WriteResult, WriteSink};
use serde_json::Value;
use tracing::{info, instrument};

/// Sink that accepts every record and logs a summary per batch
pub struct LogSink {
    name: String,
    batches: u64,
}

impl LogSink {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            batches: 0,
        }
    }

    /// Batches accepted so far
    pub fn batches(&self) -> u64 {
        self.batches
    }

    fn accept(
        &mut self,
        operation: OperationKind,
        destination: &DestinationId,
        records: &[Value],
    ) -> Vec<WriteResult> {
        self.batches += 1;
        info!(
            sink = %self.name,
            destination = %destination,
            operation = %operation,
            records = records.len(),
            batch = self.batches,
            "Batch received"
        );
        records.iter().cloned().map(WriteResult::ok).collect()
    }
}

impl WriteSink for LogSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(name = "log_sink_insert", skip_all, fields(sink = %self.name))]
    async fn insert(
        &mut self,
        destination: &DestinationId,
        records: &[Value],
    ) -> Result<Vec<WriteResult>, ContractError> {
        Ok(self.accept(OperationKind::Insert, destination, records))
    }

    #[instrument(name = "log_sink_update", skip_all, fields(sink = %self.name))]
    async fn update(
        &mut self,
        destination: &DestinationId,
        records: &[Value],
    ) -> Result<Vec<WriteResult>, ContractError> {
        Ok(self.accept(OperationKind::Update, destination, records))
    }

    #[instrument(name = "log_sink_upsert", skip_all, fields(sink = %self.name))]
    async fn upsert(
        &mut self,
        destination: &DestinationId,
        records: &[Value],
    ) -> Result<Vec<WriteResult>, ContractError> {
        Ok(self.accept(OperationKind::Upsert, destination, records))
    }
}
