//! The `refresh_plugins` management tool.
//!
//! | Arguments | Effect | Result text |
//! |-----------|--------|-------------|
//! | `{}` | full reload | `Reloaded all plugins. N tools available: ...` |
//! | `{ "plugin": "x" }` | scoped reload | `Reloaded plugin D. N tools available: ...` |
//! | unknown `x` | nothing | `Plugin not found: x` (isError) |
//!
//! Reload failures come back as error results, not handler errors, so they
//! are not written to the failure log.

use std::sync::{Arc, Weak};

use async_trait::async_trait;
use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;
use toolgate_domain::tool::{HandlerError, Tool, ToolArguments, ToolHandler, ToolResult};

use super::registry::{PluginRegistry, ReloadScope, ReloadSummary};

/// Name of the management tool
pub const REFRESH_TOOL_NAME: &str = "refresh_plugins";

const PLUGIN_ARG: &str = "plugin";

pub(crate) fn refresh_tool(registry: Weak<PluginRegistry>) -> Tool {
    Tool::new(
        REFRESH_TOOL_NAME,
        "Reload plugin tools from disk. Without arguments every plugin directory \
         is rediscovered; with `plugin` only the directory owning that tool \
         (or the directory of that name) is reloaded.",
        json!({
            "type": "object",
            "properties": {
                "plugin": {
                    "type": "string",
                    "description": "Tool name or plugin directory name to reload"
                }
            }
        }),
        Arc::new(RefreshPluginsHandler { registry }),
    )
}

struct RefreshPluginsHandler {
    registry: Weak<PluginRegistry>,
}

#[async_trait]
impl ToolHandler for RefreshPluginsHandler {
    async fn call(
        &self,
        arguments: ToolArguments,
        _cancellation: CancellationToken,
    ) -> Result<ToolResult, HandlerError> {
        let registry = self
            .registry
            .upgrade()
            .ok_or_else(|| HandlerError::failed("Plugin registry is no longer available"))?;

        match arguments.get(PLUGIN_ARG) {
            None | Some(Value::Null) => {
                let summary = registry.reload_all().await;
                Ok(ToolResult::text(describe(&summary)))
            }
            Some(Value::String(target)) => match registry.reload_plugin(target).await {
                Ok(summary) => Ok(ToolResult::text(describe(&summary))),
                Err(e) => Ok(ToolResult::error(e.to_string())),
            },
            Some(_) => Ok(ToolResult::error(format!(
                "Invalid argument: {PLUGIN_ARG} must be a string"
            ))),
        }
    }
}

fn describe(summary: &ReloadSummary) -> String {
    let head = match &summary.scope {
        ReloadScope::All => "Reloaded all plugins.".to_string(),
        ReloadScope::Plugin(dir) => format!("Reloaded plugin {dir}."),
    };
    format!(
        "{head} {} tools available: {}",
        summary.tool_count(),
        summary.tool_names.join(", ")
    )
}
