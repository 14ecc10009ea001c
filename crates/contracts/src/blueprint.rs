//! DispatchBlueprint - Config Loader output
//!
//! Describes one dispatcher deployment: batching thresholds, the routing
//! table, the write sink, and where task logs go.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;
use validator::Validate;

use crate::DestinationId;

/// Config version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Complete dispatcher configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DispatchBlueprint {
    #[serde(default)]
    pub version: ConfigVersion,

    /// Batching and polling settings
    #[serde(default)]
    #[validate(nested)]
    pub dispatcher: DispatcherSettings,

    /// Routing table: which routing keys land in which destination
    #[validate(nested)]
    pub destinations: Vec<DestinationConfig>,

    /// Write sink all destinations are flushed through
    pub sink: SinkConfig,

    /// Task log location
    #[serde(default)]
    pub task_log: TaskLogConfig,
}

impl DispatchBlueprint {
    /// Effective batch size of a destination
    pub fn batch_size_for(&self, destination: &DestinationConfig) -> usize {
        destination
            .batch_size
            .unwrap_or(self.dispatcher.default_batch_size)
    }
}

/// Batching and polling settings
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DispatcherSettings {
    /// Flush threshold for destinations without their own `batch_size`
    #[serde(default = "default_batch_size")]
    #[validate(range(min = 1))]
    pub default_batch_size: usize,

    /// Bounded wait of a single queue pop (milliseconds)
    #[serde(default = "default_poll_timeout_ms")]
    #[validate(range(min = 1))]
    pub poll_timeout_ms: u64,

    /// Inbound queue capacity
    #[serde(default = "default_queue_capacity")]
    #[validate(range(min = 1))]
    pub queue_capacity: usize,
}

impl DispatcherSettings {
    pub fn poll_timeout(&self) -> Duration {
        Duration::from_millis(self.poll_timeout_ms)
    }
}

impl Default for DispatcherSettings {
    fn default() -> Self {
        Self {
            default_batch_size: default_batch_size(),
            poll_timeout_ms: default_poll_timeout_ms(),
            queue_capacity: default_queue_capacity(),
        }
    }
}

fn default_batch_size() -> usize {
    100
}

fn default_poll_timeout_ms() -> u64 {
    1000
}

fn default_queue_capacity() -> usize {
    1024
}

/// One destination and the routing keys that resolve to it
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DestinationConfig {
    pub id: DestinationId,

    #[validate(length(min = 1))]
    pub routing_keys: Vec<String>,

    /// Overrides `dispatcher.default_batch_size`
    #[serde(default)]
    #[validate(range(min = 1))]
    pub batch_size: Option<usize>,
}

/// Sink output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SinkConfig {
    /// Sink name
    #[serde(default = "default_sink_name")]
    pub name: String,

    /// Sink type
    pub sink_type: SinkType,

    /// Type-specific parameters
    #[serde(default)]
    pub params: HashMap<String, String>,
}

fn default_sink_name() -> String {
    "sink".to_string()
}

/// Sink type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SinkType {
    /// Log batch summaries only
    Log,
    /// Append JSON lines per destination
    File,
    /// UDP datagrams
    Network,
}

/// Task log location
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskLogConfig {
    /// Directory for per-task log files; `None` logs through tracing only
    #[serde(default)]
    pub dir: Option<PathBuf>,
}
