//! Convergence domain models: policy, verdicts and the state machine.

pub mod policy;
pub mod state;
pub mod verdict;

pub use policy::*;
pub use state::*;
pub use verdict::*;
