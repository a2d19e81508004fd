use std::path::Path;

use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use thiserror::Error;

use crate::domain::models::config::Config;

/// Directory holding the project configuration.
pub const CONFIG_DIR: &str = ".rtstep";

/// Prefix of environment variable overrides.
pub const ENV_PREFIX: &str = "RTSTEP_";

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid time step schedule: {0}")]
    InvalidSchedule(String),

    #[error("Invalid tolerance {name}: {value}. Must be positive")]
    InvalidTolerance { name: &'static str, value: f64 },

    #[error("Invalid required_streak: {0}. Must be at least 1")]
    InvalidRequiredStreak(u32),

    #[error("Invalid cores: {0}. Must be at least 1")]
    InvalidCores(u32),

    #[error("Engine executable cannot be empty")]
    EmptyEngine,

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from the current directory.
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .rtstep/config.yaml (project config, created by init)
    /// 3. .rtstep/local.yaml (local overrides, optional)
    /// 4. Environment variables (RTSTEP_* prefix, `__` separates sections)
    pub fn load() -> Result<Config> {
        Self::load_in(Path::new("."))
    }

    /// Same as [`ConfigLoader::load`], rooted at `project_dir`.
    pub fn load_in(project_dir: &Path) -> Result<Config> {
        let config_dir = project_dir.join(CONFIG_DIR);
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(config_dir.join("config.yaml")))
            .merge(Yaml::file(config_dir.join("local.yaml")))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Config> {
        let path = path.as_ref();
        if !path.is_file() {
            anyhow::bail!("Config file not found: {}", path.display());
        }
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .with_context(|| format!("Failed to load config from {}", path.display()))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        let schedule = &config.schedule;
        if schedule.max_time_step == 0 {
            return Err(ConfigError::InvalidSchedule(
                "max_time_step must be positive".to_string(),
            ));
        }
        if schedule.decrement == 0 {
            return Err(ConfigError::InvalidSchedule(
                "decrement must be positive".to_string(),
            ));
        }
        if schedule.count == 0 {
            return Err(ConfigError::InvalidSchedule(
                "count must be at least 1".to_string(),
            ));
        }
        if schedule.reference_duration_fs.is_nan() || schedule.reference_duration_fs <= 0.0 {
            return Err(ConfigError::InvalidSchedule(format!(
                "reference_duration_fs must be positive, got {}",
                schedule.reference_duration_fs
            )));
        }

        let tolerances = &config.tolerances;
        for (name, value) in [
            ("electron", tolerances.electron),
            ("polarization", tolerances.polarization),
            ("overflow", tolerances.overflow),
        ] {
            if value.is_nan() || value <= 0.0 {
                return Err(ConfigError::InvalidTolerance { name, value });
            }
        }
        if tolerances.required_streak == 0 {
            return Err(ConfigError::InvalidRequiredStreak(
                tolerances.required_streak,
            ));
        }

        if config.run.cores == 0 {
            return Err(ConfigError::InvalidCores(config.run.cores));
        }
        if config.run.engine.trim().is_empty() {
            return Err(ConfigError::EmptyEngine);
        }
        if config.run.dipoles_folder.trim().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "dipoles_folder cannot be empty".to_string(),
            ));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        Ok(())
    }
}
