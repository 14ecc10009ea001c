//! `validate` command implementation.

use anyhow::{Context, Result};
use contracts::{DispatchBlueprint, SinkType};
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    version: String,
    destination_count: usize,
    routing_key_count: usize,
    default_batch_size: usize,
    sink: String,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    if !args.config.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("File not found: {}", args.config.display())),
            warnings: None,
            summary: None,
        };
    }

    match config_loader::ConfigLoader::load_from_path(&args.config) {
        Ok(blueprint) => {
            let warnings = collect_warnings(&blueprint);
            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: (!warnings.is_empty()).then_some(warnings),
                summary: Some(ConfigSummary {
                    version: format!("{:?}", blueprint.version),
                    destination_count: blueprint.destinations.len(),
                    routing_key_count: blueprint
                        .destinations
                        .iter()
                        .map(|d| d.routing_keys.len())
                        .sum(),
                    default_batch_size: blueprint.dispatcher.default_batch_size,
                    sink: format!("{} ({:?})", blueprint.sink.name, blueprint.sink.sink_type),
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(blueprint: &DispatchBlueprint) -> Vec<String> {
    let mut warnings = Vec::new();

    if blueprint.sink.sink_type == SinkType::Log {
        warnings.push("Log sink only logs batch summaries - records are not persisted".to_string());
    }

    for destination in &blueprint.destinations {
        if blueprint.batch_size_for(destination) == 1 {
            warnings.push(format!(
                "Destination '{}' has batch size 1 - every record is a separate sink call",
                destination.id
            ));
        }
    }

    if blueprint.task_log.dir.is_none() {
        warnings.push("task_log.dir is not set - task logs go to tracing only".to_string());
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Version: {}", summary.version);
            println!("  Destinations: {}", summary.destination_count);
            println!("  Routing keys: {}", summary.routing_key_count);
            println!("  Default batch size: {}", summary.default_batch_size);
            println!("  Sink: {}", summary.sink);
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}
