//! Logging infrastructure
//!
//! Structured logging using tracing and tracing-subscriber:
//! - Pretty or JSON formatting on stderr
//! - Optional JSON log file in the run directory

pub mod config;
pub mod logger;

pub use config::{LogConfig, LogFormat, LOG_FILE};
pub use logger::LoggerImpl;
