//! Tool domain traits
//!
//! [`ToolHandler`] is the callable half of the tool contract.
//! [`HandlerResolver`] turns a handler spec from a plugin manifest into a
//! handler, which is what makes a candidate "invocable".

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use super::entities::ToolArguments;
use super::error::HandlerError;
use super::value_objects::ToolResult;

/// The function behind a tool.
///
/// Handlers receive the call arguments and a cancellation token. The token is
/// advisory: the executor signals it on timeout but never aborts the
/// handler's task, so long-running handlers should poll
/// [`CancellationToken::is_cancelled`] or race their work against
/// [`CancellationToken::cancelled`].
#[async_trait]
pub trait ToolHandler: Send + Sync {
    async fn call(
        &self,
        arguments: ToolArguments,
        cancellation: CancellationToken,
    ) -> Result<ToolResult, HandlerError>;
}

/// Resolves a handler spec (the `handler` field of a tool candidate).
///
/// Returns `None` when the spec does not describe an invocable handler.
pub trait HandlerResolver: Send + Sync {
    fn resolve(&self, spec: &Value) -> Option<Arc<dyn ToolHandler>>;
}

/// Adapter that lets an async closure act as a handler.
///
/// ```ignore
/// let handler = FnHandler::new(|args, _cancel| async move {
///     Ok(ToolResult::text(format!("{args:?}")))
/// });
/// ```
pub struct FnHandler<F> {
    f: F,
}

impl<F> FnHandler<F> {
    pub fn new<Fut>(f: F) -> Self
    where
        F: Fn(ToolArguments, CancellationToken) -> Fut + Send + Sync,
        Fut: std::future::Future<Output = Result<ToolResult, HandlerError>> + Send + 'static,
    {
        Self { f }
    }
}

#[async_trait]
impl<F, Fut> ToolHandler for FnHandler<F>
where
    F: Fn(ToolArguments, CancellationToken) -> Fut + Send + Sync,
    Fut: std::future::Future<Output = Result<ToolResult, HandlerError>> + Send + 'static,
{
    async fn call(
        &self,
        arguments: ToolArguments,
        cancellation: CancellationToken,
    ) -> Result<ToolResult, HandlerError> {
        (self.f)(arguments, cancellation).await
    }
}
