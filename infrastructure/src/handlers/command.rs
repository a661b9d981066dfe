//! `command` handler kind — a shell command template as a tool.
//!
//! ```toml
//! [tools.handler]
//! kind = "command"
//! command = "git -C {path} status --porcelain"
//! working_dir = "."   # optional
//! ```
//!
//! Argument values are shell-escaped before substitution. The child process
//! is killed when the cancellation token fires, and on Linux it also receives
//! SIGTERM if the host dies.

use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use serde_json::Value;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use toolgate_domain::tool::{HandlerError, ToolArguments, ToolHandler, ToolResult};
use tracing::debug;

use super::template::{Escaping, render};

/// Handler kind name
pub const COMMAND_KIND: &str = "command";

/// Maximum output size per stream (1 MB)
const MAX_OUTPUT_SIZE: usize = 1024 * 1024;

/// Runs a rendered command template through the platform shell.
#[derive(Debug, Clone)]
pub struct CommandHandler {
    command: String,
    working_dir: Option<PathBuf>,
}

impl CommandHandler {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            working_dir: None,
        }
    }

    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Build from a handler spec; `None` if `command` is missing or empty,
    /// or `working_dir` is present but not a string.
    pub fn from_spec(spec: &Value) -> Option<Self> {
        let command = spec.get("command")?.as_str()?;
        if command.trim().is_empty() {
            return None;
        }

        let mut handler = Self::new(command);
        match spec.get("working_dir") {
            None | Some(Value::Null) => {}
            Some(dir) => handler = handler.with_working_dir(dir.as_str()?),
        }
        Some(handler)
    }

    fn shell(command_str: &str) -> Command {
        if cfg!(target_os = "windows") {
            let mut c = Command::new("cmd");
            c.args(["/C", command_str]);
            c
        } else {
            let mut c = Command::new("sh");
            c.args(["-c", command_str]);
            c
        }
    }
}

#[async_trait]
impl ToolHandler for CommandHandler {
    async fn call(
        &self,
        arguments: ToolArguments,
        cancellation: CancellationToken,
    ) -> Result<ToolResult, HandlerError> {
        let command_str = render(&self.command, &arguments, Escaping::Shell);
        let mut cmd = Self::shell(&command_str);

        if let Some(dir) = &self.working_dir {
            if !dir.is_dir() {
                return Err(HandlerError::failed(format!(
                    "Working directory does not exist: {}",
                    dir.display()
                )));
            }
            cmd.current_dir(dir);
        }

        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        // Linux: request kernel to send SIGTERM to child when parent dies.
        #[cfg(target_os = "linux")]
        unsafe {
            cmd.pre_exec(|| {
                libc::prctl(libc::PR_SET_PDEATHSIG, libc::SIGTERM);
                Ok(())
            });
        }

        debug!(command = %command_str, "Spawning command handler");
        let child = cmd.spawn()?;

        let output = tokio::select! {
            output = child.wait_with_output() => output?,
            _ = cancellation.cancelled() => {
                debug!(command = %command_str, "Command cancelled, killing child");
                return Err(HandlerError::Cancelled);
            }
        };

        let text = combine_output(&output.stdout, &output.stderr);
        if output.status.success() {
            let text = if text.is_empty() {
                "Command completed successfully (no output)".to_string()
            } else {
                text
            };
            Ok(ToolResult::text(text))
        } else {
            let status = match output.status.code() {
                Some(code) => format!("exit code {}", code),
                None => "a signal".to_string(),
            };
            let mut message = format!("Command failed with {}", status);
            if !text.is_empty() {
                message.push_str(": ");
                message.push_str(&text);
            }
            Err(HandlerError::failed(message))
        }
    }
}

fn combine_output(stdout: &[u8], stderr: &[u8]) -> String {
    let stdout = String::from_utf8_lossy(stdout);
    let stderr = String::from_utf8_lossy(stderr);

    let mut combined = String::new();
    if !stdout.is_empty() {
        combined.push_str(truncate(&stdout, MAX_OUTPUT_SIZE));
    }
    if !stderr.is_empty() {
        if !combined.is_empty() {
            combined.push_str("\n--- stderr ---\n");
        }
        combined.push_str(truncate(&stderr, MAX_OUTPUT_SIZE));
    }
    combined.trim_end().to_string()
}

fn truncate(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}
