//! Pipeline orchestration module.

mod orchestrator;
mod reader;
mod stats;

pub use orchestrator::{Pipeline, PipelineConfig};
pub use stats::PipelineStats;
