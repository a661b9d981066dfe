//! Application layer for toolgate
//!
//! This crate contains the bounded executor, the dispatch use case, and the
//! ports they depend on. It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::{DEFAULT_TIMEOUT_MS, ExecutionParams};
pub use ports::{
    failure_log::{FailureLog, FailureLogEntry, NoFailureLog},
    tool_catalog::ToolCatalog,
};
pub use use_cases::call_tool::CallToolUseCase;
pub use use_cases::execute_tool::{
    ExecuteOptions, ExecuteToolUseCase, ExecutionError, UNKNOWN_ERROR,
};
