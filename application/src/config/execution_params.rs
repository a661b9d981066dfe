//! Execution parameters — bounded executor control.
//!
//! [`ExecutionParams`] groups the static parameters that control the
//! [`ExecuteToolUseCase`](crate::use_cases::execute_tool::ExecuteToolUseCase).

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default deadline for a single tool execution.
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Bounded executor parameters.
///
/// `default_timeout` applies to every call that does not carry its own
/// timeout in [`ExecuteOptions`](crate::use_cases::execute_tool::ExecuteOptions).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionParams {
    /// Deadline applied when a call does not specify one.
    pub default_timeout: Duration,
}

impl Default for ExecutionParams {
    fn default() -> Self {
        Self {
            default_timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
        }
    }
}

impl ExecutionParams {
    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    pub fn with_default_timeout_ms(self, timeout_ms: u64) -> Self {
        self.with_default_timeout(Duration::from_millis(timeout_ms))
    }
}
