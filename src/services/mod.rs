//! Services for the time-step convergence procedure.
//!
//! Leaves first: the candidate generator and the per-run validator are pure,
//! the pairwise analyzer compares validated runs, the run driver talks to the
//! ports and the convergence controller ties everything together.

pub mod candidate_generator;
pub mod convergence_controller;
pub mod pairwise_analyzer;
pub mod run_driver;
pub mod run_validator;

pub use candidate_generator::CandidateGenerator;
pub use convergence_controller::{ConvergenceController, ConvergenceReport, REPORT_FILE};
pub use pairwise_analyzer::{electron_conservation_test, field_axis, PairwiseAnalyzer};
pub use run_driver::{DipolesStatus, RunDriver};
pub use run_validator::RunValidator;
