use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};

use crate::error::ToolError;

/// Per-invocation context handed to every tool handler.
///
/// Cloning is cheap; clones share the same cancellation token. Nothing here
/// forces a handler to stop: long-running handlers should call [`check`]
/// or race their work against [`cancelled`].
///
/// [`check`]: ToolContext::check
/// [`cancelled`]: ToolContext::cancelled
#[derive(Debug, Clone, Default)]
pub struct ToolContext {
    cancel: CancellationToken,
    call_id: Option<String>,
}

impl ToolContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind the context to an existing token, e.g. the one driving an agent run.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Attach the id the model assigned to this tool call.
    pub fn with_call_id(mut self, id: impl Into<String>) -> Self {
        self.call_id = Some(id.into());
        self
    }

    pub fn call_id(&self) -> Option<&str> {
        self.call_id.as_deref()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Resolves once the context is cancelled.
    pub fn cancelled(&self) -> WaitForCancellationFuture<'_> {
        self.cancel.cancelled()
    }

    /// `Err(ToolError::Cancelled)` if the context has been cancelled.
    pub fn check(&self) -> Result<(), ToolError> {
        if self.cancel.is_cancelled() {
            Err(ToolError::Cancelled)
        } else {
            Ok(())
        }
    }

    /// Context whose token is cancelled with this one but can also be
    /// cancelled on its own.
    pub fn child(&self) -> Self {
        Self {
            cancel: self.cancel.child_token(),
            call_id: self.call_id.clone(),
        }
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_context_is_not_cancelled() {
        let ctx = ToolContext::new();
        assert!(!ctx.is_cancelled());
        assert!(ctx.check().is_ok());
        assert!(ctx.call_id().is_none());
    }

    #[test]
    fn check_reports_cancellation() {
        let token = CancellationToken::new();
        let ctx = ToolContext::new().with_cancellation(token.clone());
        token.cancel();
        assert!(matches!(ctx.check(), Err(ToolError::Cancelled)));
    }

    #[test]
    fn child_follows_parent_but_not_the_reverse() {
        let parent = ToolContext::new().with_call_id("call_1");
        let child = parent.child();
        assert_eq!(child.call_id(), Some("call_1"));

        child.cancellation_token().cancel();
        assert!(child.is_cancelled());
        assert!(!parent.is_cancelled());

        let child = parent.child();
        parent.cancellation_token().cancel();
        assert!(child.is_cancelled());
    }

    #[tokio::test]
    async fn cancelled_future_resolves() {
        let ctx = ToolContext::new();
        let clone = ctx.clone();
        tokio::spawn(async move { clone.cancellation_token().cancel() });
        ctx.cancelled().await;
        assert!(ctx.is_cancelled());
    }
}
