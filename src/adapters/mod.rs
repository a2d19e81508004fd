//! Adapters implementing the domain ports.

pub mod output;
pub mod scheduler;
