//! Domain layer for toolgate
//!
//! This crate contains the tool contract: entities, result value objects,
//! the handler trait and the contract validator. It has no dependencies on
//! infrastructure or presentation concerns.

pub mod tool;

// Re-export commonly used types
pub use tool::{
    ContentItem, FAILURE_PREFIX, FnHandler, HandlerError, HandlerResolver, Provenance, Tool,
    ToolArguments, ToolHandler, ToolInfo, ToolResult, admit_tool, candidate_label, is_tool,
    render_chain,
};

// Handlers receive this token; re-exported so plugin authors need no extra dependency.
pub use tokio_util::sync::CancellationToken;
