use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::domain::models::LoggingConfig;

/// File name of the log written into the run directory.
pub const LOG_FILE: &str = "rtstep.log";

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format (json, pretty)
    #[serde(default = "default_format")]
    pub format: LogFormat,

    /// Directory for the log file (optional, if None logs only to stderr)
    pub log_dir: Option<PathBuf>,

    /// Enable stderr logging
    #[serde(default = "default_true")]
    pub enable_stderr: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
}

impl LogConfig {
    /// Build from the `logging` section, logging to file under `run_path` if enabled.
    pub fn from_settings(settings: &LoggingConfig, run_path: &Path) -> Self {
        let format = if settings.format == "json" {
            LogFormat::Json
        } else {
            LogFormat::Pretty
        };
        Self {
            level: settings.level.clone(),
            format,
            log_dir: settings.log_to_file.then(|| run_path.to_path_buf()),
            enable_stderr: true,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_format(),
            log_dir: None,
            enable_stderr: true,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

const fn default_format() -> LogFormat {
    LogFormat::Pretty
}

const fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_map_to_log_config() {
        let settings = LoggingConfig {
            level: "debug".to_string(),
            format: "json".to_string(),
            log_to_file: true,
        };
        let config = LogConfig::from_settings(&settings, Path::new("/tmp/run"));
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.log_dir, Some(PathBuf::from("/tmp/run")));

        let settings = LoggingConfig {
            log_to_file: false,
            ..LoggingConfig::default()
        };
        let config = LogConfig::from_settings(&settings, Path::new("/tmp/run"));
        assert_eq!(config.format, LogFormat::Pretty);
        assert!(config.log_dir.is_none());
    }
}
