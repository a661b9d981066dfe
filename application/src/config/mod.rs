//! Application-level configuration.
//!
//! - [`ExecutionParams`] — bounded executor control (default deadline)

pub mod execution_params;

pub use execution_params::{DEFAULT_TIMEOUT_MS, ExecutionParams};
