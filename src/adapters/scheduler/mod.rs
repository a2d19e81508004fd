//! Scheduler adapters.

pub mod mock;
pub mod shell;

pub use mock::MockScheduler;
pub use shell::ShellScheduler;
