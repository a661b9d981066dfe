//! Tool domain module
//!
//! This module defines the tool contract: what a dispatchable tool is, what
//! its handler receives, what every execution returns, and how untrusted
//! plugin exports are admitted.
//!
//! ```text
//! ┌──────────────┐  admit_tool  ┌──────────────┐  call   ┌──────────────┐
//! │ candidate    │─────────────▶│ Tool         │────────▶│ ToolResult   │
//! │ (JSON value) │              │ + handler    │         │ (uniform)    │
//! └──────────────┘              └──────────────┘         └──────────────┘
//! ```
//!
//! # Key Types
//!
//! - [`Tool`] — name, description, opaque input schema, handler
//! - [`ToolInfo`] — the listing projection (no handler)
//! - [`ToolHandler`] — async callable receiving arguments + a cancellation token
//! - [`HandlerResolver`] — turns a manifest handler spec into a handler
//! - [`ToolResult`] — `{ content: [{ type, text }], isError? }`
//! - [`HandlerError`] — what a handler returns on failure
//! - [`Provenance`] — where a registered tool came from
//!
//! # Architecture
//!
//! - **Domain** (this module): contract and validation, no I/O
//! - **Application**: bounded execution and dispatch use cases
//! - **Infrastructure**: plugin registry, handler kinds, failure log

pub mod contract;
pub mod entities;
pub mod error;
pub mod traits;
pub mod value_objects;

pub use contract::{admit_tool, candidate_label, is_tool};
pub use entities::{Provenance, Tool, ToolArguments, ToolInfo};
pub use error::{HandlerError, render_chain};
pub use traits::{FnHandler, HandlerResolver, ToolHandler};
pub use value_objects::{ContentItem, FAILURE_PREFIX, ToolResult};
