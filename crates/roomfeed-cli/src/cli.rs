//! Command-line interface definition.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use roomfeed_core::TracingConfig;
use tracing::Level;

/// roomfeed - Upcoming meetings across room calendars
#[derive(Debug, Parser)]
#[command(name = "roomfeed")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, short, env = "ROOMFEED_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, short = 'v')]
    pub debug: bool,

    /// Write logs as JSON lines (for collected, unattended runs)
    #[arg(long, env = "ROOMFEED_LOG_JSON")]
    pub log_json: bool,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,

    /// Maximum number of events to show (overrides the configured cap)
    #[arg(long)]
    pub limit: Option<usize>,

    /// Number of days to look ahead, starting today
    #[arg(long)]
    pub window_days: Option<u32>,

    /// Show events from reachable rooms even if some rooms fail
    #[arg(long)]
    pub best_effort: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Cli {
    /// Picks the logging preset. `config_debug` is the `debug` key of the
    /// configuration file and is OR-ed with `--debug`.
    pub fn tracing_config(&self, config_debug: bool) -> TracingConfig {
        match (self.debug || config_debug, self.log_json) {
            (true, false) => TracingConfig::cli_debug(),
            (true, true) => TracingConfig::service().with_level(Level::DEBUG),
            (false, true) => TracingConfig::service(),
            (false, false) => TracingConfig::default(),
        }
    }
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configuration commands
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Dump current configuration, with secrets redacted
    Dump,

    /// Validate configuration
    Validate,

    /// Show configuration file path
    Path,
}
