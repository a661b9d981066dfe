//! Tool catalog port
//!
//! Defines the lookup interface the dispatch use case needs from a registry.

use std::sync::Arc;

use toolgate_domain::tool::{Tool, ToolInfo};

/// Port for tool lookup
///
/// Implementations (the plugin registry) live in the infrastructure layer.
/// Both methods answer from the current table without triggering discovery.
pub trait ToolCatalog: Send + Sync {
    /// Public projection of every registered tool, in registration order
    fn list_tools(&self) -> Vec<ToolInfo>;

    /// Exact-match lookup
    fn get_tool(&self, name: &str) -> Option<Arc<Tool>>;

    /// Check if a tool is registered
    fn has_tool(&self, name: &str) -> bool {
        self.get_tool(name).is_some()
    }
}
