//! Domain layer for the time-step convergence controller
//!
//! This module contains the data model, the error taxonomy and the ports
//! through which the engine and the scheduler are reached.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{ConfigurationError, DomainError, DomainResult};
