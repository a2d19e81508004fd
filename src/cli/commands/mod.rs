//! CLI command implementations.

pub mod init;
pub mod optimize;
pub mod schedule;

use anyhow::{Context, Result};
use std::path::Path;

use crate::domain::models::{Config, InputDeck};
use crate::infrastructure::config::ConfigLoader;
use crate::infrastructure::logging::{LogConfig, LoggerImpl};

/// Load the configuration from `--config` or the project directory.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => ConfigLoader::load_from_file(path),
        None => ConfigLoader::load(),
    }
}

/// Install the global subscriber, with a log file in the run directory if enabled.
pub fn init_logging(config: &Config, to_file: bool) -> Result<LoggerImpl> {
    let mut log_config = LogConfig::from_settings(&config.logging, &config.run.run_path);
    if !to_file {
        log_config.log_dir = None;
    }
    LoggerImpl::init(&log_config)
}

/// Read the base input deck named by the configuration.
pub async fn read_deck(config: &Config) -> Result<InputDeck> {
    InputDeck::read(&config.run.input_path)
        .await
        .with_context(|| {
            format!(
                "Failed to read input deck {}",
                config.run.input_path.display()
            )
        })
}
