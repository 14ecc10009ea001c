//! WriteSink trait - Dispatcher output interface
//!
//! The remote collaborator that persists a batch and reports per-record
//! outcomes. The dispatcher never calls a sink concurrently with itself.

use serde_json::Value;

use crate::{ContractError, DestinationId, OperationKind, WriteResult};

/// Batch write trait
///
/// All sink implementations must implement this trait.
/// Records are borrowed, a sink can never mutate the caller's batch.
#[trait_variant::make(WriteSink: Send)]
pub trait LocalWriteSink {
    /// Sink name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Insert a batch of records into `destination`
    ///
    /// # Errors
    /// Returns an error only when the call as a whole failed (connection,
    /// IO). Per-record rejections are reported as failed [`WriteResult`]s.
    async fn insert(
        &mut self,
        destination: &DestinationId,
        records: &[Value],
    ) -> Result<Vec<WriteResult>, ContractError>;

    /// Update a batch of records in `destination`
    async fn update(
        &mut self,
        destination: &DestinationId,
        records: &[Value],
    ) -> Result<Vec<WriteResult>, ContractError>;

    /// Upsert a batch of records into `destination`
    async fn upsert(
        &mut self,
        destination: &DestinationId,
        records: &[Value],
    ) -> Result<Vec<WriteResult>, ContractError>;
}

/// Dispatch a batch to the sink method matching `operation`.
pub async fn write_batch<S: WriteSink>(
    sink: &mut S,
    operation: OperationKind,
    destination: &DestinationId,
    records: &[Value],
) -> Result<Vec<WriteResult>, ContractError> {
    match operation {
        OperationKind::Insert => sink.insert(destination, records).await,
        OperationKind::Update => sink.update(destination, records).await,
        OperationKind::Upsert => sink.upsert(destination, records).await,
    }
}
