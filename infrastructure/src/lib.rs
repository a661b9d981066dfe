//! Infrastructure layer for toolgate
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer: the plugin registry (`ToolCatalog`), the JSONL
//! failure log (`FailureLog`), the built-in handler kinds, and configuration
//! file loading.

pub mod config;
pub mod handlers;
pub mod logging;
pub mod plugins;

// Re-export commonly used types
pub use config::{ConfigLoader, FileConfig};
pub use handlers::{CommandHandler, HandlerCatalog, HandlerFactory, TextHandler};
pub use logging::JsonlFailureLog;
pub use plugins::{
    ManifestLoader, PluginLoader, PluginRegistry, REFRESH_TOOL_NAME, RegistryError, ReloadScope,
    ReloadSummary,
};
