//! Logging infrastructure — the durable failure log.
//!
//! Provides [`JsonlFailureLog`], a JSONL file writer that implements
//! the [`FailureLog`](toolgate_application::FailureLog) port.

mod jsonl_logger;

pub use jsonl_logger::{DEFAULT_LOG_FILE, JsonlFailureLog, LOG_FILE_ENV};
