//! rtstep - Real-time time-step convergence controller
//!
//! Finds the largest integration time step of a real-time propagation engine
//! whose polarization response agrees with the next finer steps. Candidates
//! are run from the coarsest step down and the procedure stops once two
//! consecutive comparisons pass.
//!
//! # Architecture
//!
//! This crate follows Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): models, errors and the ports to the engine
//! - **Service Layer** (`services`): generator, validator, analyzer, driver, controller
//! - **Adapters** (`adapters`): shell and mock schedulers, text and mock output readers
//! - **Infrastructure Layer** (`infrastructure`): configuration and logging
//! - **CLI Layer** (`cli`): command-line interface
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use rtstep::adapters::{output::TextOutputReader, scheduler::ShellScheduler};
//! use rtstep::domain::models::{Config, InputDeck};
//! use rtstep::services::{ConvergenceController, RunDriver};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::default();
//!     let deck = InputDeck::read(&config.run.input_path).await?;
//!     let driver = RunDriver::new(
//!         Arc::new(ShellScheduler::default()),
//!         Arc::new(TextOutputReader::new(None)),
//!         deck,
//!         config.run.clone(),
//!     );
//!     let report = ConvergenceController::new(
//!         driver,
//!         config.schedule.params(),
//!         config.tolerances.policy(),
//!     )
//!     .run()
//!     .await?;
//!     println!("{:?}", report.recommended());
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::errors::{ConfigurationError, DomainError, DomainResult};
pub use domain::models::{
    CandidateSchedule, Config, FieldAxis, FieldEnvelope, InputDeck, Outcome, RunResult, RunSpec,
    TimeStep,
};
pub use domain::ports::{RunOutputReader, Scheduler};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{ConvergenceController, ConvergenceReport, RunDriver};
