//! Tool contract validation
//!
//! Plugin manifests export untyped candidate records. A candidate is only
//! trusted as a [`Tool`] once it satisfies the minimal contract:
//!
//! | Field | Requirement |
//! |-------|-------------|
//! | (value) | a record: not null, not an array, not a scalar |
//! | `name` | non-empty string |
//! | `description` | string |
//! | `inputSchema` | record |
//! | `handler` | resolves to an invocable [`ToolHandler`](super::ToolHandler) |
//!
//! Validation never errors: a failing candidate is simply filtered, and the
//! caller decides how to report it.

use serde_json::Value;

use super::entities::Tool;
use super::traits::HandlerResolver;

pub const NAME_FIELD: &str = "name";
pub const DESCRIPTION_FIELD: &str = "description";
pub const INPUT_SCHEMA_FIELD: &str = "inputSchema";
pub const HANDLER_FIELD: &str = "handler";

/// Check whether `value` satisfies the tool contract.
pub fn is_tool(value: &Value, resolver: &dyn HandlerResolver) -> bool {
    admit_tool(value, resolver).is_some()
}

/// Validate `value` and build a [`Tool`] from it.
pub fn admit_tool(value: &Value, resolver: &dyn HandlerResolver) -> Option<Tool> {
    let record = value.as_object()?;

    let name = record.get(NAME_FIELD)?.as_str()?;
    if name.is_empty() {
        return None;
    }
    let description = record.get(DESCRIPTION_FIELD)?.as_str()?;

    let input_schema = record.get(INPUT_SCHEMA_FIELD)?;
    if !input_schema.is_object() {
        return None;
    }

    let handler = resolver.resolve(record.get(HANDLER_FIELD)?)?;

    Some(Tool::new(name, description, input_schema.clone(), handler))
}

/// Best-effort label for diagnostics about a rejected candidate.
pub fn candidate_label(value: &Value) -> String {
    match value.get(NAME_FIELD).and_then(Value::as_str) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => "<unnamed>".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool::entities::ToolArguments;
    use crate::tool::traits::{FnHandler, ToolHandler};
    use crate::tool::value_objects::ToolResult;
    use serde_json::json;
    use std::sync::Arc;
    use tokio_util::sync::CancellationToken;

    /// Resolves any spec with `kind = "ok"`.
    struct OkResolver;

    impl HandlerResolver for OkResolver {
        fn resolve(&self, spec: &Value) -> Option<Arc<dyn ToolHandler>> {
            if spec.get("kind").and_then(Value::as_str) != Some("ok") {
                return None;
            }
            let handler = FnHandler::new(|_args: ToolArguments, _cancel: CancellationToken| async {
                Ok(ToolResult::text("ok"))
            });
            Some(Arc::new(handler))
        }
    }

    fn valid() -> Value {
        json!({
            "name": "echo",
            "description": "Echo input",
            "inputSchema": { "type": "object" },
            "handler": { "kind": "ok" }
        })
    }

    #[test]
    fn test_accepts_valid_candidate() {
        assert!(is_tool(&valid(), &OkResolver));

        let tool = admit_tool(&valid(), &OkResolver).unwrap();
        assert_eq!(tool.name, "echo");
        assert_eq!(tool.input_schema, json!({ "type": "object" }));
    }

    #[test]
    fn test_rejects_non_records() {
        for value in [json!(null), json!([valid()]), json!("echo"), json!(42)] {
            assert!(!is_tool(&value, &OkResolver), "accepted {value}");
        }
    }

    #[test]
    fn test_rejects_empty_or_missing_name() {
        let mut candidate = valid();
        candidate["name"] = json!("");
        assert!(!is_tool(&candidate, &OkResolver));

        candidate.as_object_mut().unwrap().remove("name");
        assert!(!is_tool(&candidate, &OkResolver));

        candidate["name"] = json!(7);
        assert!(!is_tool(&candidate, &OkResolver));
    }

    #[test]
    fn test_accepts_empty_description_but_not_missing() {
        let mut candidate = valid();
        candidate["description"] = json!("");
        assert!(is_tool(&candidate, &OkResolver));

        candidate.as_object_mut().unwrap().remove("description");
        assert!(!is_tool(&candidate, &OkResolver));
    }

    #[test]
    fn test_rejects_non_record_schema() {
        let mut candidate = valid();
        candidate["inputSchema"] = json!(["type", "object"]);
        assert!(!is_tool(&candidate, &OkResolver));

        candidate["inputSchema"] = json!(null);
        assert!(!is_tool(&candidate, &OkResolver));
    }

    #[test]
    fn test_rejects_uninvocable_handler() {
        let mut candidate = valid();
        candidate["handler"] = json!({ "kind": "missing" });
        assert!(!is_tool(&candidate, &OkResolver));

        candidate.as_object_mut().unwrap().remove("handler");
        assert!(!is_tool(&candidate, &OkResolver));
    }

    #[test]
    fn test_candidate_label() {
        assert_eq!(candidate_label(&valid()), "echo");
        assert_eq!(candidate_label(&json!({ "name": "" })), "<unnamed>");
        assert_eq!(candidate_label(&json!(3)), "<unnamed>");
    }
}
