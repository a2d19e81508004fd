//! Run output adapters.

pub mod mock;
pub mod text;

pub use mock::MockOutputReader;
pub use text::TextOutputReader;
