//! Pipeline orchestrator - wires input, dispatcher, sink and task log.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use contracts::{DispatchBlueprint, TaskParams};
use dispatcher::{RunOutcome, TaskLogs};
use observability::RunLabel;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use super::reader::{open_input, read_records, InputReader, InputStats};
use super::PipelineStats;
use crate::error::CliError;

/// Pipeline configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Validated dispatcher configuration
    pub blueprint: DispatchBlueprint,

    /// JSON-lines input (None = stdin)
    pub input: Option<PathBuf>,

    /// Task the records belong to
    pub params: TaskParams,

    /// Metrics server port (None = disabled)
    pub metrics_port: Option<u16>,
}

/// Main pipeline orchestrator
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Create a new pipeline with the given configuration
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Run until the input is exhausted or `cancel` fires
    pub async fn run(self, cancel: CancellationToken) -> Result<PipelineStats> {
        let input = open_input(self.config.input.as_deref())
            .await
            .context("Failed to open input")?;
        self.run_with_input(input, cancel).await
    }

    /// Run over an already opened line source
    ///
    /// Returns as soon as the dispatcher does; a reader still waiting on
    /// `input` is stopped rather than awaited to its next line.
    async fn run_with_input(
        self,
        input: InputReader,
        cancel: CancellationToken,
    ) -> Result<PipelineStats> {
        let start_time = Instant::now();
        let blueprint = &self.config.blueprint;

        if let Some(port) = self.config.metrics_port {
            observability::init_metrics_only(port)?;
            info!("Metrics endpoint available on port {}", port);
        }

        let (mut dispatcher, destinations) = dispatcher::create_dispatcher(blueprint)
            .await
            .context("Failed to create dispatcher")?;
        let logs = TaskLogs::from_config(&blueprint.task_log);
        let (producer, mut queue) = dispatcher::bounded(blueprint.dispatcher.queue_capacity);

        info!(
            destinations = destinations.len(),
            queue_capacity = blueprint.dispatcher.queue_capacity,
            task = %self.config.params,
            "Pipeline running"
        );

        let input_cancel = cancel.child_token();
        let reader = tokio::spawn(read_records(input, producer, input_cancel.clone()));

        let result = dispatcher
            .run(&destinations, &mut queue, &cancel, &self.config.params, &logs)
            .await;
        input_cancel.cancel();
        drop(queue);

        let input = match reader.await {
            Ok(Ok(stats)) => Ok(stats),
            Ok(Err(e)) => Err(e),
            Err(e) => Err(CliError::dispatch(format!("input reader panicked: {e}"))),
        };

        let summary = match result {
            Ok(summary) => summary,
            Err(e) => {
                observability::record_run(RunLabel::Failed);
                error!(error = %e.trace(), "Dispatch aborted");
                return Err(e).context("Dispatch aborted");
            }
        };

        let label = match summary.outcome {
            RunOutcome::Completed => RunLabel::Completed,
            RunOutcome::Cancelled => RunLabel::Cancelled,
        };
        observability::record_run(label);

        let input: InputStats = input.context("Failed to read input")?;
        if summary.outcome == RunOutcome::Cancelled {
            warn!(pending = summary.pending, "Pipeline cancelled");
        }

        let stats = PipelineStats {
            outcome: summary.outcome,
            input,
            dispatch: summary.metrics,
            pending: summary.pending,
            duration: start_time.elapsed(),
        };

        info!(
            duration_secs = stats.duration.as_secs_f64(),
            records_per_sec = format!("{:.2}", stats.records_per_sec()),
            "Pipeline shutdown complete"
        );

        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config_loader::{ConfigFormat, ConfigLoader};
    use std::io::Write;
    use std::time::Duration;
    use tokio::io::AsyncWriteExt;

    fn blueprint(output: &std::path::Path, logs: &std::path::Path) -> DispatchBlueprint {
        let content = format!(
            r#"
[dispatcher]
default_batch_size = 2
poll_timeout_ms = 20

[[destinations]]
id = "orders"
routing_keys = ["o"]

[[destinations]]
id = "customers"
routing_keys = ["c"]

[sink]
name = "files"
sink_type = "file"
params = {{ base_path = "{}" }}

[task_log]
dir = "{}"
"#,
            output.display(),
            logs.display()
        );
        ConfigLoader::load_from_str(&content, ConfigFormat::Toml).unwrap()
    }

    #[tokio::test]
    async fn test_pipeline_writes_every_record() {
        let out = tempfile::tempdir().unwrap();
        let logs = tempfile::tempdir().unwrap();
        let mut input = tempfile::NamedTempFile::new().unwrap();
        for i in 0..3 {
            writeln!(input, r#"{{"routing_key": "o", "payload": {{"id": {i}}}}}"#).unwrap();
        }
        writeln!(input, r#"{{"routing_key": "c", "operation": "update", "payload": null}}"#)
            .unwrap();

        let pipeline = Pipeline::new(PipelineConfig {
            blueprint: blueprint(out.path(), logs.path()),
            input: Some(input.path().to_path_buf()),
            params: TaskParams::now("cli-test"),
            metrics_port: None,
        });
        let stats = pipeline.run(CancellationToken::new()).await.unwrap();

        assert_eq!(stats.outcome, RunOutcome::Completed);
        assert_eq!(stats.input.records_sent, 4);
        assert_eq!(stats.dispatch.records_written, 3);
        assert_eq!(stats.dispatch.record_failures, 1);
        assert_eq!(stats.pending, 0);

        let orders = std::fs::read_to_string(out.path().join("orders.jsonl")).unwrap();
        assert_eq!(orders.lines().count(), 3);

        // The null payload is rejected by the file sink and lands in the task log
        let task_dir = logs.path().join("cli-test");
        let log_file = std::fs::read_dir(&task_dir)
            .unwrap()
            .next()
            .unwrap()
            .unwrap()
            .path();
        let content = std::fs::read_to_string(log_file).unwrap();
        assert!(content.contains("null payload"));
    }

    #[tokio::test]
    async fn test_pipeline_fails_on_unknown_routing_key() {
        let out = tempfile::tempdir().unwrap();
        let logs = tempfile::tempdir().unwrap();
        let mut input = tempfile::NamedTempFile::new().unwrap();
        writeln!(input, r#"{{"routing_key": "unknown", "payload": 1}}"#).unwrap();

        let pipeline = Pipeline::new(PipelineConfig {
            blueprint: blueprint(out.path(), logs.path()),
            input: Some(input.path().to_path_buf()),
            params: TaskParams::now("cli-test"),
            metrics_port: None,
        });
        let err = pipeline.run(CancellationToken::new()).await.unwrap_err();
        assert!(format!("{err:#}").contains("unknown"));
    }

    #[tokio::test]
    async fn test_pipeline_fails_fast_while_input_stays_open() {
        let out = tempfile::tempdir().unwrap();
        let logs = tempfile::tempdir().unwrap();
        let (mut writer, input) = tokio::io::duplex(1024);
        writer
            .write_all(b"{\"routing_key\": \"unknown\", \"payload\": 1}\n")
            .await
            .unwrap();

        let pipeline = Pipeline::new(PipelineConfig {
            blueprint: blueprint(out.path(), logs.path()),
            input: None,
            params: TaskParams::now("cli-test"),
            metrics_port: None,
        });
        let input: InputReader = Box::new(tokio::io::BufReader::new(input));
        let result = tokio::time::timeout(
            Duration::from_secs(2),
            pipeline.run_with_input(input, CancellationToken::new()),
        )
        .await
        .expect("pipeline kept waiting on open input after a fatal error");

        let err = result.unwrap_err();
        assert!(format!("{err:#}").contains("unknown"));
        // Writer is still open here
        drop(writer);
    }

    #[tokio::test]
    async fn test_pipeline_cancelled_before_start() {
        let out = tempfile::tempdir().unwrap();
        let logs = tempfile::tempdir().unwrap();
        let mut input = tempfile::NamedTempFile::new().unwrap();
        writeln!(input, r#"{{"routing_key": "o", "payload": 1}}"#).unwrap();

        let cancel = CancellationToken::new();
        cancel.cancel();
        let pipeline = Pipeline::new(PipelineConfig {
            blueprint: blueprint(out.path(), logs.path()),
            input: Some(input.path().to_path_buf()),
            params: TaskParams::now("cli-test"),
            metrics_port: None,
        });
        let stats = pipeline.run(cancel).await.unwrap();

        assert_eq!(stats.outcome, RunOutcome::Cancelled);
        assert!(!out.path().join("orders.jsonl").exists());
    }
}
