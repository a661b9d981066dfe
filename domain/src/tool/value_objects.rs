//! Tool domain value objects — the uniform result shape
//!
//! Every path through the bounded executor produces a [`ToolResult`]:
//! a handler's own result on success, or an error result built from the
//! normalized failure message.
//!
//! ```json
//! { "content": [{ "type": "text", "text": "..." }], "isError": true }
//! ```

use serde::{Deserialize, Serialize};

/// Prefix of every caller-visible failure text.
pub const FAILURE_PREFIX: &str = "Tool execution failed: ";

/// A single item of tool output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentItem {
    /// Content type (e.g., "text")
    #[serde(rename = "type")]
    pub kind: String,
    /// Content payload
    pub text: String,
}

impl ContentItem {
    /// Create a `text` content item
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            kind: "text".to_string(),
            text: text.into(),
        }
    }
}

/// Result of a tool execution.
///
/// `is_error` is omitted from the serialized form when unset, matching
/// results returned by handlers that never set it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolResult {
    /// Ordered output items
    pub content: Vec<ContentItem>,
    /// Whether the result represents a failure
    #[serde(rename = "isError", default, skip_serializing_if = "Option::is_none")]
    pub is_error: Option<bool>,
}

impl ToolResult {
    /// Create a successful result with a single text item
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ContentItem::text(text)],
            is_error: None,
        }
    }

    /// Create an error result with a single text item
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            content: vec![ContentItem::text(text)],
            is_error: Some(true),
        }
    }

    /// Create the caller-visible result for a failed execution.
    ///
    /// Only the normalized message is exposed; stack traces and raw
    /// arguments stay in the failure log.
    pub fn execution_failed(message: &str) -> Self {
        Self::error(format!("{FAILURE_PREFIX}{message}"))
    }

    /// Check if the result is an error
    pub fn is_error(&self) -> bool {
        self.is_error.unwrap_or(false)
    }

    /// Concatenate all text items, separated by newlines
    pub fn joined_text(&self) -> String {
        self.content
            .iter()
            .map(|item| item.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}
