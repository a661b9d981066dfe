//! `{param}` placeholder rendering shared by the built-in handler kinds.

use serde_json::Value;
use toolgate_domain::tool::ToolArguments;

/// How substituted values are written into the template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Escaping {
    /// Insert values verbatim
    None,
    /// Quote values for the platform shell
    Shell,
}

/// Replace `{name}` placeholders with argument values.
///
/// String arguments are inserted as-is, other JSON values in their JSON form.
/// Placeholders without a matching argument are dropped. Braces that do not
/// enclose a `[A-Za-z0-9_]+` name are kept literally, as is an unclosed brace.
pub fn render(template: &str, arguments: &ToolArguments, escaping: Escaping) -> String {
    let mut result = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        result.push_str(&rest[..open]);
        let after = &rest[open + 1..];

        let name_len = after
            .find(|c: char| !(c.is_alphanumeric() || c == '_'))
            .unwrap_or(after.len());
        if name_len == 0 || !after[name_len..].starts_with('}') {
            // Not a placeholder: keep the brace and rescan right after it
            result.push('{');
            rest = after;
            continue;
        }

        if let Some(value) = arguments.get(&after[..name_len]) {
            let value = value_to_string(value);
            match escaping {
                Escaping::None => result.push_str(&value),
                Escaping::Shell => result.push_str(&shell_escape(&value)),
            }
        }
        rest = &after[name_len + 1..];
    }

    result.push_str(rest);
    result
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Escape a string for safe shell substitution.
///
/// Uses OS-appropriate escaping:
/// - **Unix**: Single-quote wrapping (`it's` → `'it'\''s'`)
/// - **Windows**: Double-quote wrapping with `"` → `\"`, `%` → `%%`, `!` → `^!`
pub fn shell_escape(s: &str) -> String {
    if !s.is_empty()
        && s.chars()
            .all(|c| c.is_alphanumeric() || c == '-' || c == '_' || c == '.' || c == '/')
    {
        return s.to_string();
    }

    if cfg!(target_os = "windows") {
        shell_escape_windows(s)
    } else {
        shell_escape_unix(s)
    }
}

fn shell_escape_unix(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len() + 4);
    escaped.push('\'');
    for ch in s.chars() {
        if ch == '\'' {
            escaped.push_str("'\\''");
        } else {
            escaped.push(ch);
        }
    }
    escaped.push('\'');
    escaped
}

fn shell_escape_windows(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len() + 4);
    escaped.push('"');
    for ch in s.chars() {
        match ch {
            '"' => escaped.push_str("\\\""),
            '%' => escaped.push_str("%%"),
            '!' => escaped.push_str("^!"),
            _ => escaped.push(ch),
        }
    }
    escaped.push('"');
    escaped
}
