//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Dispatch CLI - batch output dispatcher
#[derive(Parser, Debug)]
#[command(
    name = "dispatch-cli",
    author,
    version,
    about = "Batch output dispatcher",
    long_about = "Reads routed records (JSON lines), groups them per destination and \n\
                  operation, and writes them to the configured sink in batches."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "DISPATCH_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "DISPATCH_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Dispatch records from a JSON-lines input
    Run(RunArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),

    /// Display configuration information
    Info(InfoArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to configuration file (TOML or JSON)
    #[arg(short, long, default_value = "dispatch.toml", env = "DISPATCH_CONFIG")]
    pub config: PathBuf,

    /// JSON-lines input, one record per line (stdin when omitted)
    #[arg(short, long, env = "DISPATCH_INPUT")]
    pub input: Option<PathBuf>,

    /// Task log identifier
    #[arg(long, default_value = "dispatch", env = "DISPATCH_LOG_ID")]
    pub log_id: String,

    /// Task trigger time (RFC 3339, defaults to now)
    #[arg(long)]
    pub trigger_time: Option<String>,

    /// Override the inbound queue capacity from configuration
    #[arg(long, env = "DISPATCH_QUEUE_CAPACITY")]
    pub queue_capacity: Option<usize>,

    /// Override the poll timeout (milliseconds) from configuration
    #[arg(long, env = "DISPATCH_POLL_TIMEOUT_MS")]
    pub poll_timeout_ms: Option<u64>,

    /// Validate configuration and exit without dispatching
    #[arg(long)]
    pub dry_run: bool,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "0", env = "DISPATCH_METRICS_PORT")]
    pub metrics_port: u16,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "dispatch.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "dispatch.toml")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// List routing keys of every destination
    #[arg(long)]
    pub destinations: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => Self::Json,
            LogFormat::Pretty => Self::Pretty,
            LogFormat::Compact => Self::Compact,
        }
    }
}
