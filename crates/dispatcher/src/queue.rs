//! Bounded inbound queue between a producing task and the dispatch loop.
//!
//! `send` waits while the queue is full, which is how a slow write sink
//! pushes back on the producer. The stream counts as finished once the
//! producer calls [`RecordProducer::finish`] or every producer is dropped.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use contracts::InboundRecord;
use tokio::sync::mpsc;

/// Create a bounded queue with room for `capacity` records
pub fn bounded(capacity: usize) -> (RecordProducer, InboundQueue) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    let finished = Arc::new(AtomicBool::new(false));
    (
        RecordProducer {
            tx,
            finished: Arc::clone(&finished),
        },
        InboundQueue { rx, finished },
    )
}

/// Producer half
#[derive(Debug, Clone)]
pub struct RecordProducer {
    tx: mpsc::Sender<InboundRecord>,
    finished: Arc<AtomicBool>,
}

/// Returned when the consumer is gone
#[derive(Debug, thiserror::Error)]
#[error("inbound queue closed")]
pub struct QueueClosed(pub InboundRecord);

impl RecordProducer {
    /// Enqueue a record, waiting for space
    pub async fn send(&self, record: InboundRecord) -> Result<(), QueueClosed> {
        self.tx.send(record).await.map_err(|e| QueueClosed(e.0))
    }

    /// Resolves once the consumer half has been dropped
    pub async fn closed(&self) {
        self.tx.closed().await
    }

    /// Signal that no more records will arrive
    pub fn finish(&self) {
        self.finished.store(true, Ordering::Release);
    }
}

/// Consumer half, polled by the dispatch loop
#[derive(Debug)]
pub struct InboundQueue {
    rx: mpsc::Receiver<InboundRecord>,
    finished: Arc<AtomicBool>,
}

impl InboundQueue {
    /// Pop one record, waiting at most `timeout`
    ///
    /// `None` means the wait elapsed (or the stream is closed and empty).
    pub async fn try_pop(&mut self, timeout: Duration) -> Option<InboundRecord> {
        match tokio::time::timeout(timeout, self.rx.recv()).await {
            Ok(record) => record,
            Err(_elapsed) => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rx.len()
    }

    /// Whether the producer side will push nothing more
    pub fn is_finished(&self) -> bool {
        self.finished.load(Ordering::Acquire) || self.rx.is_closed()
    }
}
