//! Handler kinds for plugin-declared tools
//!
//! A plugin manifest cannot carry code, so each tool names a handler *kind*
//! and its options:
//!
//! ```toml
//! [tools.handler]
//! kind = "command"
//! command = "convert {input} {output}"
//! ```
//!
//! [`HandlerCatalog`] maps kind names to factories and implements
//! [`HandlerResolver`], which is how the contract validator decides whether a
//! candidate's handler is invocable.
//!
//! | Kind | Options | Behavior |
//! |------|---------|----------|
//! | `command` | `command`, `working_dir?` | Shell command, args shell-escaped, killed on cancel |
//! | `text` | `text` | Static text with `{param}` substitution |
//!
//! Hosts add their own compiled-in kinds with [`HandlerCatalog::register_kind`].

pub mod command;
pub mod template;
pub mod text;

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use toolgate_domain::tool::{HandlerResolver, ToolHandler};

pub use command::{COMMAND_KIND, CommandHandler};
pub use text::{TEXT_KIND, TextHandler};

/// Builds a handler from a spec; `None` when the options are malformed.
pub type HandlerFactory = Arc<dyn Fn(&Value) -> Option<Arc<dyn ToolHandler>> + Send + Sync>;

/// Registry of handler kinds.
#[derive(Clone)]
pub struct HandlerCatalog {
    kinds: HashMap<String, HandlerFactory>,
}

impl HandlerCatalog {
    /// Create a catalog with no kinds
    pub fn empty() -> Self {
        Self {
            kinds: HashMap::new(),
        }
    }

    /// Create a catalog with the built-in `command` and `text` kinds
    pub fn new() -> Self {
        Self::empty()
            .register_kind(COMMAND_KIND, |spec| {
                CommandHandler::from_spec(spec).map(|h| Arc::new(h) as Arc<dyn ToolHandler>)
            })
            .register_kind(TEXT_KIND, |spec| {
                TextHandler::from_spec(spec).map(|h| Arc::new(h) as Arc<dyn ToolHandler>)
            })
    }

    /// Register a handler kind (replaces an existing kind of the same name)
    pub fn register_kind<F>(mut self, kind: impl Into<String>, factory: F) -> Self
    where
        F: Fn(&Value) -> Option<Arc<dyn ToolHandler>> + Send + Sync + 'static,
    {
        self.kinds.insert(kind.into(), Arc::new(factory));
        self
    }

    /// Registered kind names, sorted
    pub fn kinds(&self) -> Vec<&str> {
        let mut kinds: Vec<&str> = self.kinds.keys().map(|k| k.as_str()).collect();
        kinds.sort_unstable();
        kinds
    }
}

impl Default for HandlerCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl HandlerResolver for HandlerCatalog {
    fn resolve(&self, spec: &Value) -> Option<Arc<dyn ToolHandler>> {
        let kind = spec.as_object()?.get("kind")?.as_str()?;
        let factory = self.kinds.get(kind)?;
        factory(spec)
    }
}
