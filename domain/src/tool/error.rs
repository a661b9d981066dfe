//! Handler error type

use std::error::Error as StdError;
use thiserror::Error;

/// Error returned by a [`ToolHandler`](super::ToolHandler).
///
/// The bounded executor normalizes any of these into
/// `"Tool execution failed: <message>"` for the caller, and records the
/// rendered [`chain`](Self::chain) as the failure log's `stack`.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// Handler-reported failure
    #[error("{0}")]
    Failed(String),

    /// Arguments did not match what the handler expects
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// The handler observed its cancellation token and stopped
    #[error("Operation cancelled")]
    Cancelled,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] Box<dyn StdError + Send + Sync>),
}

impl HandlerError {
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }

    pub fn invalid_arguments(message: impl Into<String>) -> Self {
        Self::InvalidArguments(message.into())
    }

    /// Check if this error represents a cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, HandlerError::Cancelled)
    }

    /// Render the error followed by its source chain, one cause per line.
    pub fn chain(&self) -> String {
        render_chain(self)
    }
}

/// Render any error followed by its `source()` chain.
pub fn render_chain(error: &(dyn StdError + 'static)) -> String {
    let mut rendered = format!("{error}");
    let mut source = error.source();
    while let Some(cause) = source {
        rendered.push_str(&format!("\n  caused by: {cause}"));
        source = cause.source();
    }
    rendered
}
