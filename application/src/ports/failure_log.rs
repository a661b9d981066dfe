//! Port for the durable failure log.
//!
//! Defines the [`FailureLog`] trait that receives one [`FailureLogEntry`] per
//! failed tool execution.
//!
//! This is separate from `tracing`-based operation logs: tracing handles
//! human-readable diagnostics, while this port captures failures in a
//! machine-readable, append-only record (JSONL) for operators.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Level recorded on every failure entry.
pub const ERROR_LEVEL: &str = "error";

/// One failed tool execution.
///
/// Serialized with camelCase keys; `stack` and `args` are omitted when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailureLogEntry {
    /// RFC 3339 UTC timestamp with millisecond precision
    pub timestamp: String,
    /// Always `"error"`
    pub level: String,
    /// Name of the failed tool
    pub tool: String,
    /// Time from invocation start to failure
    pub duration_ms: u64,
    /// Normalized failure message
    pub message: String,
    /// Rendered error chain, when the failure was error-like
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
    /// Arguments echoed by the caller
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub args: Option<Value>,
}

impl FailureLogEntry {
    /// Create an entry stamped with the current UTC time.
    pub fn new(
        tool: impl Into<String>,
        duration_ms: u64,
        message: impl Into<String>,
        stack: Option<String>,
        args: Option<Value>,
    ) -> Self {
        Self {
            timestamp: chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
            level: ERROR_LEVEL.to_string(),
            tool: tool.into(),
            duration_ms,
            message: message.into(),
            stack,
            args,
        }
    }
}

/// Port for recording failed executions.
///
/// The `append` method is intentionally synchronous and non-fallible:
/// implementations swallow their own I/O errors (reporting them only to
/// diagnostics), so a broken log can never fail a tool call.
pub trait FailureLog: Send + Sync {
    /// Record a failure.
    fn append(&self, entry: FailureLogEntry);
}

/// No-op implementation for tests and when failure logging is disabled.
pub struct NoFailureLog;

impl FailureLog for NoFailureLog {
    fn append(&self, _entry: FailureLogEntry) {}
}
