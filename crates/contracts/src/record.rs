//! Records taken off the inbound queue and the per-record outcome of a write.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Write operation a record was produced for.
///
/// Closed set: every destination has exactly one pending buffer per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    #[default]
    Insert,
    Update,
    Upsert,
}

impl OperationKind {
    /// All kinds, in flush/drain sweep order
    pub const ALL: [OperationKind; 3] = [Self::Insert, Self::Update, Self::Upsert];

    /// Stable position of this kind inside `ALL`
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            Self::Insert => 0,
            Self::Update => 1,
            Self::Upsert => 2,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Insert => "insert",
            Self::Update => "update",
            Self::Upsert => "upsert",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One item produced by a running task.
///
/// Created by the producer, consumed exactly once by the dispatch loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InboundRecord {
    /// Key looked up in the destination table
    pub routing_key: String,

    /// Pending buffer the payload accumulates in
    #[serde(default)]
    pub operation: OperationKind,

    /// Opaque row data handed to the write sink
    pub payload: Value,
}

impl InboundRecord {
    pub fn new(routing_key: impl Into<String>, operation: OperationKind, payload: Value) -> Self {
        Self {
            routing_key: routing_key.into(),
            operation,
            payload,
        }
    }

    pub fn insert(routing_key: impl Into<String>, payload: Value) -> Self {
        Self::new(routing_key, OperationKind::Insert, payload)
    }

    pub fn update(routing_key: impl Into<String>, payload: Value) -> Self {
        Self::new(routing_key, OperationKind::Update, payload)
    }

    pub fn upsert(routing_key: impl Into<String>, payload: Value) -> Self {
        Self::new(routing_key, OperationKind::Upsert, payload)
    }
}

/// Outcome of writing a single payload, one per payload in a sink call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WriteResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Echo of the payload this result is about
    pub payload: Value,
}

impl WriteResult {
    pub fn ok(payload: Value) -> Self {
        Self {
            success: true,
            error: None,
            payload,
        }
    }

    pub fn failed(payload: Value, error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            payload,
        }
    }
}
