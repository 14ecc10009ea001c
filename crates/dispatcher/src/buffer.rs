//! Pending buffers keyed by (destination, operation).
//!
//! Each destination owns one `Vec` per [`OperationKind`]. A payload is
//! appended to exactly one of them and leaves it only through
//! [`PendingBuffers::clear`], which the flush path calls once the write
//! sink accepted the batch. No size limit is enforced here; the caller
//! checks the threshold after every classification.

use std::collections::HashMap;
use std::fmt;

use contracts::{DestinationId, OperationKind};
use serde_json::Value;

/// The three buffers of one destination
#[derive(Default)]
pub struct OperationBuffers {
    slots: [Vec<Value>; 3],
}

impl OperationBuffers {
    #[inline]
    pub fn get(&self, operation: OperationKind) -> &[Value] {
        &self.slots[operation.index()]
    }

    #[inline]
    fn get_mut(&mut self, operation: OperationKind) -> &mut Vec<Value> {
        &mut self.slots[operation.index()]
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Vec::is_empty)
    }

    pub fn total_len(&self) -> usize {
        self.slots.iter().map(Vec::len).sum()
    }
}

impl fmt::Debug for OperationBuffers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("OperationBuffers");
        for op in OperationKind::ALL {
            s.field(op.as_str(), &self.get(op).len());
        }
        s.finish()
    }
}

/// All pending buffers of a run
#[derive(Debug, Default)]
pub struct PendingBuffers {
    by_destination: HashMap<DestinationId, OperationBuffers>,
}

impl PendingBuffers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a payload to its (destination, operation) buffer, creating it on first use
    pub fn classify(
        &mut self,
        destination: &DestinationId,
        operation: OperationKind,
        payload: Value,
    ) {
        self.by_destination
            .entry(destination.clone())
            .or_default()
            .get_mut(operation)
            .push(payload);
    }

    pub fn len(&self, destination: &DestinationId, operation: OperationKind) -> usize {
        self.by_destination
            .get(destination)
            .map_or(0, |buffers| buffers.get(operation).len())
    }

    /// Borrow a buffer's current contents
    pub fn peek(&self, destination: &DestinationId, operation: OperationKind) -> &[Value] {
        self.by_destination
            .get(destination)
            .map(|buffers| buffers.get(operation))
            .unwrap_or(&[])
    }

    /// Whether the buffer has reached `batch_size`
    #[inline]
    pub fn is_due(
        &self,
        destination: &DestinationId,
        operation: OperationKind,
        batch_size: usize,
    ) -> bool {
        self.len(destination, operation) >= batch_size
    }

    /// Empty a buffer, returning how many payloads it held
    pub fn clear(&mut self, destination: &DestinationId, operation: OperationKind) -> usize {
        match self.by_destination.get_mut(destination) {
            Some(buffers) => {
                let slot = buffers.get_mut(operation);
                let cleared = slot.len();
                slot.clear();
                cleared
            }
            None => 0,
        }
    }

    /// Records waiting across every buffer
    pub fn total_pending(&self) -> usize {
        self.by_destination
            .values()
            .map(OperationBuffers::total_len)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_destination.values().all(OperationBuffers::is_empty)
    }

    /// Non-empty (destination, operation) pairs, sorted for a stable sweep order
    pub fn non_empty(&self) -> Vec<(DestinationId, OperationKind)> {
        let mut keys: Vec<_> = self
            .by_destination
            .iter()
            .flat_map(|(id, buffers)| {
                OperationKind::ALL
                    .into_iter()
                    .filter(|op| !buffers.get(*op).is_empty())
                    .map(move |op| (id.clone(), op))
            })
            .collect();
        keys.sort_by(|a, b| a.0.cmp(&b.0).then(a.1.index().cmp(&b.1.index())));
        keys
    }
}
