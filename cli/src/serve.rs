//! Line-oriented JSON serving over stdin/stdout
//!
//! ```text
//! stdin  {"id": 1, "name": "greet", "arguments": {"name": "Ada"}}
//! stdout {"id": 1, "result": {"content": [{"type": "text", "text": "Hello, Ada!"}]}}
//! ```
//!
//! Each request runs on its own task, so responses may come back out of
//! order; callers match them by `id`. A single writer task owns stdout.

use std::sync::Arc;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use toolgate_application::CallToolUseCase;
use toolgate_domain::tool::{ToolArguments, ToolResult};
use tracing::{debug, warn};

#[derive(Debug, Deserialize)]
struct Request {
    #[serde(default)]
    id: Value,
    name: String,
    #[serde(default)]
    arguments: Value,
}

#[derive(Debug, Serialize)]
struct Response {
    id: Value,
    result: ToolResult,
}

/// A request that could be dispatched.
#[derive(Debug, PartialEq)]
struct Call {
    id: Value,
    name: String,
    arguments: ToolArguments,
}

/// Parse one input line. On failure, returns the response to send instead.
fn parse_request(line: &str) -> Result<Call, Response> {
    let value: Value = serde_json::from_str(line).map_err(|e| Response {
        id: Value::Null,
        result: ToolResult::error(format!("Invalid request: {e}")),
    })?;

    let id = value.get("id").cloned().unwrap_or(Value::Null);
    let request: Request = serde_json::from_value(value).map_err(|e| Response {
        id: id.clone(),
        result: ToolResult::error(format!("Invalid request: {e}")),
    })?;

    let arguments = match request.arguments {
        Value::Null => ToolArguments::new(),
        Value::Object(map) => map,
        _ => {
            return Err(Response {
                id,
                result: ToolResult::error("Invalid request: arguments must be an object"),
            });
        }
    };

    Ok(Call {
        id: request.id,
        name: request.name,
        arguments,
    })
}

async fn handle_line(calls: &CallToolUseCase, line: &str) -> Response {
    match parse_request(line) {
        Ok(call) => {
            debug!(tool = %call.name, "Dispatching request");
            let result = calls.call(&call.name, call.arguments).await;
            Response {
                id: call.id,
                result,
            }
        }
        Err(response) => response,
    }
}

/// Serve requests from stdin until EOF, then wait for in-flight requests.
pub async fn run(calls: Arc<CallToolUseCase>) -> Result<()> {
    let stdin = BufReader::new(tokio::io::stdin());
    serve(calls, stdin, tokio::io::stdout()).await?;
    Ok(())
}

/// Serve JSON-line requests from `input` until EOF, writing responses to
/// `output`. Returns the writer once every response has been written.
///
/// A line that is not valid UTF-8 gets an `Invalid request` response; a read
/// error ends the input but still drains in-flight requests.
async fn serve<R, W>(calls: Arc<CallToolUseCase>, mut input: R, output: W) -> Result<W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();

    let writer = tokio::spawn(async move {
        let mut output = output;
        while let Some(line) = rx.recv().await {
            if let Err(e) = output.write_all(line.as_bytes()).await {
                warn!(error = %e, "Could not write response");
                break;
            }
            if let Err(e) = output.flush().await {
                warn!(error = %e, "Could not flush output");
                break;
            }
        }
        output
    });

    let mut buf = Vec::new();
    loop {
        buf.clear();
        match input.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) => {
                warn!(error = %e, "Could not read request, stopping");
                break;
            }
        }

        let line = match String::from_utf8(std::mem::take(&mut buf)) {
            Ok(line) => line,
            Err(e) => {
                send_response(
                    &tx,
                    &Response {
                        id: Value::Null,
                        result: ToolResult::error(format!("Invalid request: {e}")),
                    },
                );
                continue;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let calls = Arc::clone(&calls);
        let tx = tx.clone();
        tokio::spawn(async move {
            let response = handle_line(&calls, line.trim_end()).await;
            send_response(&tx, &response);
        });
    }

    // The writer finishes once every request task has dropped its sender
    drop(tx);
    Ok(writer.await?)
}

fn send_response(tx: &mpsc::UnboundedSender<String>, response: &Response) {
    match serde_json::to_string(response) {
        Ok(mut json) => {
            json.push('\n');
            let _ = tx.send(json);
        }
        Err(e) => warn!(error = %e, "Could not serialize response"),
    }
}
