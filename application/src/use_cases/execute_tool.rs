//! Bounded tool execution
//!
//! [`ExecuteToolUseCase`] wraps one handler invocation with a cancellation
//! token and a deadline, and turns every way a handler can fail into the
//! same [`ToolResult`] shape.
//!
//! ```text
//! spawn(handler.call(args, token)) ──┐
//!                                    ├─ select! (first to settle wins)
//! sleep(timeout) ────────────────────┘
//!    │                                 │
//!    ▼ deadline first                  ▼ handler first
//! token.cancel()                     Ok  → result returned unchanged
//! Timeout error ──┐                  Err → HandlerError
//!                 │                  panic → "Unknown error"
//!                 ▼                    │
//!        failure path ◀────────────────┘
//!        (error result now, log entry deferred)
//! ```
//!
//! The handler runs in its own task. When the deadline wins, the task is
//! detached rather than aborted: cancellation is advisory, and whatever the
//! handler eventually returns is discarded. A handler that ignores its token
//! keeps running until it finishes on its own.

use std::any::Any;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use thiserror::Error;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use toolgate_domain::tool::{HandlerError, ToolArguments, ToolHandler, ToolResult, render_chain};
use tracing::{debug, warn};

use crate::config::ExecutionParams;
use crate::ports::failure_log::{FailureLog, FailureLogEntry};

/// Message used for failures that carry no error value.
pub const UNKNOWN_ERROR: &str = "Unknown error";

/// Why a bounded execution failed.
#[derive(Debug, Error)]
pub enum ExecutionError {
    /// The handler did not settle before the deadline
    #[error("Tool {tool_name} timed out after {timeout_ms} ms")]
    Timeout { tool_name: String, timeout_ms: u64 },

    /// The handler returned an error
    #[error(transparent)]
    Handler(#[from] HandlerError),

    /// The handler panicked (or its task was torn down) without an error value
    #[error("Unknown error")]
    Panicked,
}

impl ExecutionError {
    /// Check if this error is a deadline expiry
    pub fn is_timeout(&self) -> bool {
        matches!(self, ExecutionError::Timeout { .. })
    }

    /// Rendered error chain, absent for failures without an error value
    pub fn stack(&self) -> Option<String> {
        match self {
            ExecutionError::Timeout { .. } => Some(render_chain(self)),
            ExecutionError::Handler(e) => Some(e.chain()),
            ExecutionError::Panicked => None,
        }
    }
}

/// Per-call options for [`ExecuteToolUseCase::execute`].
#[derive(Clone, Default)]
pub struct ExecuteOptions {
    /// Deadline for this call (defaults to [`ExecutionParams::default_timeout`])
    pub timeout: Option<Duration>,
    /// Arguments to echo into the failure log
    pub args: Option<Value>,
    /// Failure log for this call (defaults to the use case's log)
    pub logger: Option<Arc<dyn FailureLog>>,
}

impl ExecuteOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_args(mut self, args: Value) -> Self {
        self.args = Some(args);
        self
    }

    pub fn with_logger(mut self, logger: Arc<dyn FailureLog>) -> Self {
        self.logger = Some(logger);
        self
    }
}

/// Bounded executor: runs one handler under a deadline.
#[derive(Clone)]
pub struct ExecuteToolUseCase {
    params: ExecutionParams,
    failure_log: Arc<dyn FailureLog>,
    log_writes: TaskTracker,
}

impl ExecuteToolUseCase {
    pub fn new(failure_log: Arc<dyn FailureLog>) -> Self {
        Self {
            params: ExecutionParams::default(),
            failure_log,
            log_writes: TaskTracker::new(),
        }
    }

    pub fn with_params(mut self, params: ExecutionParams) -> Self {
        self.params = params;
        self
    }

    pub fn params(&self) -> &ExecutionParams {
        &self.params
    }

    /// Wait for every failure log write scheduled so far.
    ///
    /// Used before process exit; the request path never waits on logging.
    pub async fn flush_failure_logs(&self) {
        self.log_writes.close();
        self.log_writes.wait().await;
        self.log_writes.reopen();
    }

    /// Execute `handler` with `arguments` under a deadline.
    ///
    /// Never fails: success returns the handler's result unchanged, every
    /// failure returns an `isError` result whose text is
    /// `"Tool execution failed: <message>"`. Failures are written to the
    /// failure log after this method has returned.
    pub async fn execute(
        &self,
        tool_name: &str,
        handler: Arc<dyn ToolHandler>,
        arguments: ToolArguments,
        options: ExecuteOptions,
    ) -> ToolResult {
        let timeout = options.timeout.unwrap_or(self.params.default_timeout);
        let cancellation = CancellationToken::new();
        let started = Instant::now();

        let invocation = tokio::spawn({
            let token = cancellation.clone();
            async move { handler.call(arguments, token).await }
        });

        let error = tokio::select! {
            biased;
            joined = invocation => match joined {
                Ok(Ok(result)) => return result,
                Ok(Err(e)) => ExecutionError::Handler(e),
                Err(join_error) => {
                    if join_error.is_panic() {
                        debug!(
                            tool = tool_name,
                            panic = %panic_message(join_error.into_panic().as_ref()),
                            "Tool handler panicked"
                        );
                    }
                    ExecutionError::Panicked
                }
            },
            _ = tokio::time::sleep(timeout) => {
                cancellation.cancel();
                ExecutionError::Timeout {
                    tool_name: tool_name.to_string(),
                    timeout_ms: timeout.as_millis() as u64,
                }
            }
        };

        let logger = options
            .logger
            .unwrap_or_else(|| Arc::clone(&self.failure_log));
        self.fail(tool_name, started, error, options.args, logger)
    }

    fn fail(
        &self,
        tool_name: &str,
        started: Instant,
        error: ExecutionError,
        args: Option<Value>,
        logger: Arc<dyn FailureLog>,
    ) -> ToolResult {
        let duration_ms = started.elapsed().as_millis() as u64;
        let message = error.to_string();

        warn!(
            tool = tool_name,
            duration_ms,
            timeout = error.is_timeout(),
            error = %message,
            "Tool execution failed"
        );

        let entry = FailureLogEntry::new(tool_name, duration_ms, message.as_str(), error.stack(), args);
        schedule_log(&self.log_writes, logger, entry);

        ToolResult::execution_failed(&message)
    }
}

/// Write `entry` on a detached task that first yields, so the caller gets
/// its result before the write starts. The write itself runs on the
/// blocking pool.
fn schedule_log(tracker: &TaskTracker, logger: Arc<dyn FailureLog>, entry: FailureLogEntry) {
    let runtime = match tokio::runtime::Handle::try_current() {
        Ok(runtime) => runtime,
        Err(e) => {
            warn!(tool = %entry.tool, error = %e, "Could not schedule failure log write");
            return;
        }
    };

    tracker.spawn_on(
        async move {
            tokio::task::yield_now().await;
            let tool = entry.tool.clone();
            if let Err(e) = tokio::task::spawn_blocking(move || logger.append(entry)).await {
                warn!(tool = %tool, error = %e, "Failure log write did not complete");
            }
        },
        &runtime,
    );
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "<non-string panic payload>"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tokio::sync::mpsc;
    use toolgate_domain::tool::FnHandler;

    /// Failure log that forwards entries to a channel.
    struct ChannelLog(mpsc::UnboundedSender<FailureLogEntry>);

    impl FailureLog for ChannelLog {
        fn append(&self, entry: FailureLogEntry) {
            let _ = self.0.send(entry);
        }
    }

    fn channel_log() -> (Arc<dyn FailureLog>, mpsc::UnboundedReceiver<FailureLogEntry>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Arc::new(ChannelLog(tx)), rx)
    }

    async fn next_entry(rx: &mut mpsc::UnboundedReceiver<FailureLogEntry>) -> FailureLogEntry {
        tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("no failure log entry")
            .expect("log channel closed")
    }

    fn handler<F, Fut>(f: F) -> Arc<dyn ToolHandler>
    where
        F: Fn(ToolArguments, CancellationToken) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = Result<ToolResult, HandlerError>> + Send + 'static,
    {
        Arc::new(FnHandler::new(f))
    }

    fn sleeper(delay: Duration) -> Arc<dyn ToolHandler> {
        handler(move |_args: ToolArguments, _cancel: CancellationToken| async move {
            tokio::time::sleep(delay).await;
            Ok(ToolResult::text("late"))
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_returns_result_unchanged_without_logging() {
        let (log, mut rx) = channel_log();
        let executor = ExecuteToolUseCase::new(log);

        let expected = ToolResult {
            content: vec![
                toolgate_domain::ContentItem::text("one"),
                toolgate_domain::ContentItem {
                    kind: "image".into(),
                    text: "data".into(),
                },
            ],
            is_error: None,
        };
        let returned = expected.clone();
        let ok = handler(move |_args: ToolArguments, _cancel: CancellationToken| {
            let returned = returned.clone();
            async move { Ok(returned) }
        });

        let result = executor
            .execute("ok", ok, ToolArguments::new(), ExecuteOptions::new())
            .await;
        assert_eq!(result, expected);

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_returns_uniform_error_and_logs_once() {
        let (log, mut rx) = channel_log();
        let executor = ExecuteToolUseCase::new(log);

        let started = Instant::now();
        let result = executor
            .execute(
                "slow",
                sleeper(Duration::from_millis(100)),
                ToolArguments::new(),
                ExecuteOptions::new().with_timeout(Duration::from_millis(10)),
            )
            .await;
        let elapsed = started.elapsed();

        assert_eq!(
            result,
            ToolResult::error("Tool execution failed: Tool slow timed out after 10 ms")
        );
        assert!(elapsed >= Duration::from_millis(10));
        assert!(elapsed < Duration::from_millis(20));

        let entry = next_entry(&mut rx).await;
        assert_eq!(entry.tool, "slow");
        assert_eq!(entry.level, "error");
        assert_eq!(entry.message, "Tool slow timed out after 10 ms");
        assert!(entry.duration_ms >= 10);

        // The abandoned handler finishing later produces nothing further.
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_signals_cancellation_token() {
        let (log, _rx) = channel_log();
        let executor = ExecuteToolUseCase::new(log);

        let observed = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&observed);
        let cooperative = handler(move |_args: ToolArguments, cancel: CancellationToken| {
            let flag = Arc::clone(&flag);
            async move {
                cancel.cancelled().await;
                flag.store(true, Ordering::SeqCst);
                Err(HandlerError::Cancelled)
            }
        });

        let result = executor
            .execute(
                "coop",
                cooperative,
                ToolArguments::new(),
                ExecuteOptions::new().with_timeout(Duration::from_millis(5)),
            )
            .await;
        assert!(result.is_error());

        tokio::time::sleep(Duration::from_millis(1)).await;
        assert!(observed.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timed_out_handler_keeps_running_to_completion() {
        let (log, _rx) = channel_log();
        let executor = ExecuteToolUseCase::new(log);

        let finished = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&finished);
        let stubborn = handler(move |_args: ToolArguments, _cancel: CancellationToken| {
            let flag = Arc::clone(&flag);
            async move {
                tokio::time::sleep(Duration::from_millis(100)).await;
                flag.store(true, Ordering::SeqCst);
                Ok(ToolResult::text("too late"))
            }
        });

        let result = executor
            .execute(
                "stubborn",
                stubborn,
                ToolArguments::new(),
                ExecuteOptions::new().with_timeout(Duration::from_millis(10)),
            )
            .await;
        assert!(result.is_error());
        assert!(!finished.load(Ordering::SeqCst));

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert!(finished.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_handler_error_exposes_message_and_logs_stack() {
        let (log, mut rx) = channel_log();
        let executor = ExecuteToolUseCase::new(log);

        let failing = handler(|_args: ToolArguments, _cancel: CancellationToken| async {
            Err(HandlerError::failed("render failed"))
        });

        let mut args = ToolArguments::new();
        args.insert("path".into(), Value::from("a.png"));
        let result = executor
            .execute(
                "render",
                failing,
                args.clone(),
                ExecuteOptions::new().with_args(Value::Object(args)),
            )
            .await;

        assert_eq!(result, ToolResult::error("Tool execution failed: render failed"));

        let entry = next_entry(&mut rx).await;
        assert_eq!(entry.message, "render failed");
        assert!(entry.stack.as_deref().is_some_and(|s| !s.is_empty()));
        assert_eq!(entry.args.unwrap()["path"], "a.png");
    }

    #[tokio::test]
    async fn test_panic_is_unknown_error_without_stack() {
        let (log, mut rx) = channel_log();
        let executor = ExecuteToolUseCase::new(log);

        let panicking = handler(|_args: ToolArguments, _cancel: CancellationToken| async {
            if true {
                panic!("handler exploded");
            }
            Ok(ToolResult::text("unreachable"))
        });

        let result = executor
            .execute("panicky", panicking, ToolArguments::new(), ExecuteOptions::new())
            .await;
        assert_eq!(result, ToolResult::error("Tool execution failed: Unknown error"));

        let entry = next_entry(&mut rx).await;
        assert_eq!(entry.message, UNKNOWN_ERROR);
        assert_eq!(entry.stack, None);
    }

    #[tokio::test]
    async fn test_log_write_is_deferred_until_caller_yields() {
        let (log, mut rx) = channel_log();
        let executor = ExecuteToolUseCase::new(log);

        let failing = handler(|_args: ToolArguments, _cancel: CancellationToken| async {
            Err(HandlerError::failed("nope"))
        });

        let result = executor
            .execute("f", failing, ToolArguments::new(), ExecuteOptions::new())
            .await;
        assert!(result.is_error());
        // Single-threaded test runtime: the log task cannot have run yet.
        assert!(rx.try_recv().is_err());

        let entry = next_entry(&mut rx).await;
        assert_eq!(entry.message, "nope");
    }

    #[tokio::test]
    async fn test_per_call_logger_overrides_default() {
        let (default_log, mut default_rx) = channel_log();
        let (override_log, mut override_rx) = channel_log();
        let executor = ExecuteToolUseCase::new(default_log);

        let failing = handler(|_args: ToolArguments, _cancel: CancellationToken| async {
            Err(HandlerError::failed("x"))
        });

        executor
            .execute(
                "f",
                failing,
                ToolArguments::new(),
                ExecuteOptions::new().with_logger(override_log),
            )
            .await;

        let entry = next_entry(&mut override_rx).await;
        assert_eq!(entry.tool, "f");
        tokio::task::yield_now().await;
        assert!(default_rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_default_timeout_comes_from_params() {
        let (log, _rx) = channel_log();
        let executor = ExecuteToolUseCase::new(log)
            .with_params(ExecutionParams::default().with_default_timeout_ms(30));

        let result = executor
            .execute(
                "slow",
                sleeper(Duration::from_secs(60)),
                ToolArguments::new(),
                ExecuteOptions::new(),
            )
            .await;

        assert_eq!(
            result.joined_text(),
            "Tool execution failed: Tool slow timed out after 30 ms"
        );
    }

    #[tokio::test]
    async fn test_flush_waits_for_pending_log_writes() {
        let (log, mut rx) = channel_log();
        let executor = ExecuteToolUseCase::new(log);
        let failing = handler(|_args: ToolArguments, _cancel: CancellationToken| async {
            Err(HandlerError::failed("boom"))
        });

        let result = executor
            .execute("bad", failing, ToolArguments::new(), ExecuteOptions::new())
            .await;
        assert!(result.is_error());

        executor.flush_failure_logs().await;
        let entry = rx.try_recv().expect("write finished before flush returned");
        assert_eq!(entry.message, "boom");

        // Still usable after a flush
        executor.flush_failure_logs().await;
    }

    #[test]
    fn test_timeout_error_is_distinguishable() {
        let timeout = ExecutionError::Timeout {
            tool_name: "t".into(),
            timeout_ms: 5,
        };
        assert!(timeout.is_timeout());
        assert_eq!(timeout.to_string(), "Tool t timed out after 5 ms");
        assert!(timeout.stack().is_some());

        let handler_error = ExecutionError::from(HandlerError::failed("t timed out"));
        assert!(!handler_error.is_timeout());
        assert!(!ExecutionError::Panicked.is_timeout());
        assert_eq!(ExecutionError::Panicked.to_string(), UNKNOWN_ERROR);
    }
}
