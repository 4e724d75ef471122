//! Configuration commands.

use crate::config::RoomfeedConfig;
use crate::error::{ClientError, ClientResult};

/// Dump the effective configuration to stdout, with literal passwords
/// redacted.
pub fn dump(config: &RoomfeedConfig) -> ClientResult<()> {
    let toml_str = toml::to_string_pretty(&config.redacted())
        .map_err(|e| ClientError::Config(format!("failed to serialize config: {}", e)))?;
    println!("# config.toml ({})", RoomfeedConfig::default_path().display());
    println!("{}", toml_str);

    Ok(())
}

/// Validate the configuration.
pub fn validate(config: &RoomfeedConfig) -> ClientResult<()> {
    let aggregation = config.aggregation_config()?;
    println!(
        "Feed: {} room(s), {} event(s), {} day window.",
        aggregation.sources().len(),
        aggregation.result_cap(),
        aggregation.window_days()
    );

    config.graph_config()?;
    println!("Graph credentials are complete.");

    println!("Configuration is valid.");
    Ok(())
}

/// Show the configuration file path.
pub fn path() -> ClientResult<()> {
    let config_path = RoomfeedConfig::default_path();
    println!("config: {}", config_path.display());
    Ok(())
}
