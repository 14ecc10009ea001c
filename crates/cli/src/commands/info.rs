//! `info` command implementation.

use anyhow::{Context, Result};
use contracts::DispatchBlueprint;
use serde::Serialize;
use std::collections::HashMap;
use tracing::info;

use crate::cli::InfoArgs;

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    version: String,
    dispatcher: DispatcherInfo,
    destinations: Vec<DestinationInfo>,
    sink: SinkInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    task_log_dir: Option<String>,
}

#[derive(Serialize)]
struct DispatcherInfo {
    default_batch_size: usize,
    poll_timeout_ms: u64,
    queue_capacity: usize,
}

#[derive(Serialize)]
struct DestinationInfo {
    id: String,
    batch_size: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    routing_keys: Vec<String>,
}

#[derive(Serialize)]
struct SinkInfo {
    name: String,
    sink_type: String,
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    params: HashMap<String, String>,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration info");

    if !args.config.exists() {
        anyhow::bail!("Configuration file not found: {}", args.config.display());
    }

    let blueprint = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    if args.json {
        let info = build_config_info(&blueprint, args);
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize config info")?;
        println!("{}", json);
    } else {
        print_config_info(&blueprint, args);
    }

    Ok(())
}

fn build_config_info(blueprint: &DispatchBlueprint, args: &InfoArgs) -> ConfigInfo {
    let destinations = blueprint
        .destinations
        .iter()
        .map(|d| DestinationInfo {
            id: d.id.to_string(),
            batch_size: blueprint.batch_size_for(d),
            routing_keys: if args.destinations {
                d.routing_keys.clone()
            } else {
                Vec::new()
            },
        })
        .collect();

    ConfigInfo {
        version: format!("{:?}", blueprint.version),
        dispatcher: DispatcherInfo {
            default_batch_size: blueprint.dispatcher.default_batch_size,
            poll_timeout_ms: blueprint.dispatcher.poll_timeout_ms,
            queue_capacity: blueprint.dispatcher.queue_capacity,
        },
        destinations,
        sink: SinkInfo {
            name: blueprint.sink.name.clone(),
            sink_type: format!("{:?}", blueprint.sink.sink_type),
            params: blueprint.sink.params.clone(),
        },
        task_log_dir: blueprint
            .task_log
            .dir
            .as_ref()
            .map(|d| d.display().to_string()),
    }
}

fn print_config_info(blueprint: &DispatchBlueprint, args: &InfoArgs) {
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║                  Dispatcher Configuration                    ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    let settings = &blueprint.dispatcher;
    println!("⚙️  Dispatcher");
    println!("   ├─ Version: {:?}", blueprint.version);
    println!("   ├─ Default batch size: {}", settings.default_batch_size);
    println!("   ├─ Poll timeout: {} ms", settings.poll_timeout_ms);
    println!("   └─ Queue capacity: {}", settings.queue_capacity);

    println!("\n🎯 Destinations ({})", blueprint.destinations.len());
    for (i, destination) in blueprint.destinations.iter().enumerate() {
        let is_last = i == blueprint.destinations.len() - 1;
        let prefix = if is_last { "└─" } else { "├─" };
        let child_prefix = if is_last { "   " } else { "│  " };

        println!(
            "   {} {} (batch {})",
            prefix,
            destination.id,
            blueprint.batch_size_for(destination)
        );

        if args.destinations {
            for (j, key) in destination.routing_keys.iter().enumerate() {
                let key_prefix = if j == destination.routing_keys.len() - 1 {
                    "└─"
                } else {
                    "├─"
                };
                println!("   {}  {} {}", child_prefix, key_prefix, key);
            }
        } else {
            println!(
                "   {}  └─ {} routing keys",
                child_prefix,
                destination.routing_keys.len()
            );
        }
    }

    println!("\n📤 Sink");
    println!("   ├─ Name: {}", blueprint.sink.name);
    println!("   └─ Type: {:?}", blueprint.sink.sink_type);

    println!("\n📝 Task Log");
    match &blueprint.task_log.dir {
        Some(dir) => println!("   └─ Directory: {}", dir.display()),
        None => println!("   └─ Tracing only"),
    }

    println!();
}
