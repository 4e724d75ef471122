//! roomfeed CLI entry point.

use std::process::ExitCode;

use clap::Parser;
use roomfeed_core::init_tracing;
use tracing::debug;

use roomfeed_cli::cli::{Cli, Command, ConfigAction};
use roomfeed_cli::commands;
use roomfeed_cli::config::RoomfeedConfig;
use roomfeed_cli::error::{ClientError, ClientResult};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Configuration is read before logging starts so its `debug` key can
    // pick the log level. Errors are reported once logging is up.
    let env_file = load_env_file();
    let config = env_file.and_then(|()| load_config(&cli));

    let config_debug = config.as_ref().is_ok_and(|config| config.debug);
    if let Err(e) = init_tracing(cli.tracing_config(config_debug)) {
        eprintln!("warning: failed to initialize logging: {}", e);
    }

    match run(&cli, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn load_env_file() -> ClientResult<()> {
    match dotenvy::dotenv() {
        Ok(_) => Ok(()),
        Err(e) if e.not_found() => Ok(()),
        Err(e) => Err(ClientError::Config(format!("invalid .env: {}", e))),
    }
}

fn load_config(cli: &Cli) -> ClientResult<RoomfeedConfig> {
    let mut config = RoomfeedConfig::load(cli.config.as_deref())?;
    config.apply_process_env()?;
    config.apply_flags(cli.limit, cli.window_days);
    Ok(config)
}

async fn run(cli: &Cli, config: ClientResult<RoomfeedConfig>) -> ClientResult<()> {
    let config = config?;
    debug!(debug = config.debug, "configuration loaded");

    match cli.command.as_ref() {
        Some(Command::Config { action }) => match action {
            ConfigAction::Dump => commands::config::dump(&config),
            ConfigAction::Validate => commands::config::validate(&config),
            ConfigAction::Path => commands::config::path(),
        },
        None => commands::feed::run(cli, &config).await,
    }
}
