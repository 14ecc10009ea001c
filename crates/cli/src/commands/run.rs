//! `run` command implementation.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use contracts::{DispatchBlueprint, TaskParams};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::cli::RunArgs;
use crate::error::CliError;
use crate::pipeline::{Pipeline, PipelineConfig};

/// Execute the `run` command
pub async fn run_pipeline(args: &RunArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration");

    if !args.config.exists() {
        return Err(CliError::config_not_found(args.config.display().to_string()).into());
    }

    let mut blueprint = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    // Apply CLI overrides
    if let Some(capacity) = args.queue_capacity {
        info!(capacity, "Overriding queue capacity from CLI");
        blueprint.dispatcher.queue_capacity = capacity.max(1);
    }
    if let Some(timeout_ms) = args.poll_timeout_ms {
        info!(timeout_ms, "Overriding poll timeout from CLI");
        blueprint.dispatcher.poll_timeout_ms = timeout_ms.max(1);
    }

    info!(
        destinations = blueprint.destinations.len(),
        sink = %blueprint.sink.name,
        sink_type = ?blueprint.sink.sink_type,
        "Configuration loaded"
    );

    if args.dry_run {
        info!("Dry run mode - configuration is valid, exiting");
        print_config_summary(&blueprint);
        return Ok(());
    }

    let params = TaskParams::new(trigger_time(args.trigger_time.as_deref())?, &args.log_id);

    let pipeline = Pipeline::new(PipelineConfig {
        blueprint,
        input: args.input.clone(),
        params,
        metrics_port: (args.metrics_port != 0).then_some(args.metrics_port),
    });

    // Ctrl+C / SIGTERM kill the task; the dispatcher stops at its next poll
    let cancel = CancellationToken::new();
    let signal_cancel = cancel.clone();
    let signal_task = tokio::spawn(async move {
        shutdown_signal().await;
        warn!("Received shutdown signal, cancelling dispatch...");
        signal_cancel.cancel();
    });

    info!("Starting dispatch...");
    let result = pipeline.run(cancel).await;
    signal_task.abort();

    let stats = result.context("Pipeline execution failed")?;
    info!(
        outcome = ?stats.outcome,
        records_written = stats.dispatch.records_written,
        record_failures = stats.dispatch.record_failures,
        duration_secs = stats.duration.as_secs_f64(),
        "Dispatch finished"
    );
    stats.print_summary();

    Ok(())
}

fn trigger_time(value: Option<&str>) -> Result<DateTime<Utc>, CliError> {
    match value {
        None => Ok(Utc::now()),
        Some(raw) => DateTime::parse_from_rfc3339(raw)
            .map(|t| t.with_timezone(&Utc))
            .map_err(|e| CliError::invalid_trigger_time(raw, e.to_string())),
    }
}

/// Wait for Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Print configuration summary for dry-run mode
fn print_config_summary(blueprint: &DispatchBlueprint) {
    println!("\n=== Configuration Summary ===\n");
    println!("Dispatcher:");
    println!("  Default batch size: {}", blueprint.dispatcher.default_batch_size);
    println!("  Poll timeout: {} ms", blueprint.dispatcher.poll_timeout_ms);
    println!("  Queue capacity: {}", blueprint.dispatcher.queue_capacity);

    println!("\nDestinations ({}):", blueprint.destinations.len());
    for destination in &blueprint.destinations {
        println!(
            "  - {} (batch {}) <- {}",
            destination.id,
            blueprint.batch_size_for(destination),
            destination.routing_keys.join(", ")
        );
    }

    println!(
        "\nSink: {} ({:?})",
        blueprint.sink.name, blueprint.sink.sink_type
    );
    match &blueprint.task_log.dir {
        Some(dir) => println!("Task logs: {}", dir.display()),
        None => println!("Task logs: tracing only"),
    }

    println!();
}
