//! `text` handler kind — a static response with `{param}` substitution.
//!
//! ```toml
//! [tools.handler]
//! kind = "text"
//! text = "Hello, {name}!"
//! ```

use async_trait::async_trait;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use toolgate_domain::tool::{HandlerError, ToolArguments, ToolHandler, ToolResult};

use super::template::{Escaping, render};

/// Handler kind name
pub const TEXT_KIND: &str = "text";

#[derive(Debug, Clone)]
pub struct TextHandler {
    template: String,
}

impl TextHandler {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    pub fn from_spec(spec: &Value) -> Option<Self> {
        spec.get("text")?.as_str().map(Self::new)
    }
}

#[async_trait]
impl ToolHandler for TextHandler {
    async fn call(
        &self,
        arguments: ToolArguments,
        _cancellation: CancellationToken,
    ) -> Result<ToolResult, HandlerError> {
        Ok(ToolResult::text(render(
            &self.template,
            &arguments,
            Escaping::None,
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_renders_arguments() {
        let handler = TextHandler::from_spec(&serde_json::json!({
            "kind": "text",
            "text": "Hello, {name}!"
        }))
        .unwrap();

        let mut args = ToolArguments::new();
        args.insert("name".into(), Value::from("Ada"));

        let result = handler.call(args, CancellationToken::new()).await.unwrap();
        assert_eq!(result, ToolResult::text("Hello, Ada!"));
    }

    #[test]
    fn test_from_spec_requires_text_string() {
        assert!(TextHandler::from_spec(&serde_json::json!({ "kind": "text" })).is_none());
        assert!(TextHandler::from_spec(&serde_json::json!({ "kind": "text", "text": 1 })).is_none());
    }
}
