//! Tool dispatch
//!
//! [`CallToolUseCase`] resolves a tool by name through the [`ToolCatalog`]
//! port and runs it under the bounded executor.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use toolgate_domain::tool::{ToolArguments, ToolResult};
use tracing::debug;

use super::execute_tool::{ExecuteOptions, ExecuteToolUseCase};
use crate::ports::tool_catalog::ToolCatalog;

/// Use case for calling a registered tool.
#[derive(Clone)]
pub struct CallToolUseCase {
    catalog: Arc<dyn ToolCatalog>,
    executor: ExecuteToolUseCase,
}

impl CallToolUseCase {
    pub fn new(catalog: Arc<dyn ToolCatalog>, executor: ExecuteToolUseCase) -> Self {
        Self { catalog, executor }
    }

    /// Call `name` with the executor's default timeout.
    pub async fn call(&self, name: &str, arguments: ToolArguments) -> ToolResult {
        self.call_with_timeout(name, arguments, None).await
    }

    /// Call `name`, optionally overriding the deadline for this call.
    ///
    /// Unknown tools produce an `isError` result; arguments are echoed into
    /// the failure log if the call fails.
    pub async fn call_with_timeout(
        &self,
        name: &str,
        arguments: ToolArguments,
        timeout: Option<Duration>,
    ) -> ToolResult {
        let Some(tool) = self.catalog.get_tool(name) else {
            debug!(tool = name, "Call for unknown tool");
            return ToolResult::error(format!("Tool not found: {}", name));
        };

        let mut options = ExecuteOptions::new().with_args(Value::Object(arguments.clone()));
        if let Some(timeout) = timeout {
            options = options.with_timeout(timeout);
        }

        self.executor
            .execute(&tool.name, Arc::clone(&tool.handler), arguments, options)
            .await
    }
}
