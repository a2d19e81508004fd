//! Port trait definitions (Hexagonal Architecture)
//!
//! This module defines the async trait interfaces that adapters implement:
//! - Scheduler: submission of shell-level commands to the engine's host
//! - RunOutputReader: parsing of a run's output directory
//!
//! These traits keep the controller and the analyzers independent of any
//! installed engine.

pub mod run_output;
pub mod scheduler;

pub use run_output::{RunOutput, RunOutputReader};
pub use scheduler::{shell_quote, ExitStatus, Scheduler};
