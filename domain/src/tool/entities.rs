//! Tool domain entities

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use super::traits::ToolHandler;

/// Arguments passed to a tool handler (a JSON object).
pub type ToolArguments = serde_json::Map<String, serde_json::Value>;

/// The unit of dispatch: a named, schema-described operation.
///
/// Tools are only constructed through [`admit_tool`](super::contract::admit_tool)
/// (for plugin candidates) or [`Tool::new`] (for built-ins). A live tool is
/// never edited in place; reloads replace whole `Arc<Tool>` values.
#[derive(Clone)]
pub struct Tool {
    /// Unique name within a registry
    pub name: String,
    /// Informational description
    pub description: String,
    /// Opaque input schema, passed through to listings
    pub input_schema: serde_json::Value,
    /// The callable behind the tool
    pub handler: Arc<dyn ToolHandler>,
}

impl Tool {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        input_schema: serde_json::Value,
        handler: Arc<dyn ToolHandler>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema,
            handler,
        }
    }

    /// Public projection used for listings
    pub fn info(&self) -> ToolInfo {
        ToolInfo {
            name: self.name.clone(),
            description: self.description.clone(),
            input_schema: self.input_schema.clone(),
        }
    }
}

impl fmt::Debug for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tool")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("input_schema", &self.input_schema)
            .finish_non_exhaustive()
    }
}

/// Listing view of a tool: everything except the handler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolInfo {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: serde_json::Value,
}

/// Where a registered tool came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "dir", rename_all = "lowercase")]
pub enum Provenance {
    /// Registered in code by the host (e.g. `refresh_plugins`)
    Builtin,
    /// Discovered in the named directory under the plugin root
    Plugin(String),
}

impl Provenance {
    /// Directory name for plugin tools
    pub fn plugin_dir(&self) -> Option<&str> {
        match self {
            Provenance::Builtin => None,
            Provenance::Plugin(dir) => Some(dir),
        }
    }

    pub fn is_builtin(&self) -> bool {
        matches!(self, Provenance::Builtin)
    }
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provenance::Builtin => write!(f, "builtin"),
            Provenance::Plugin(dir) => write!(f, "plugin:{}", dir),
        }
    }
}
