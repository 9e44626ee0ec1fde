/// Failure of a tool invocation.
///
/// Adapters never wrap or rewrite errors coming out of a handler: whatever
/// variant the handler returns is what the caller sees.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("failed to decode tool input: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("failed to encode tool output: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("{0}")]
    Handler(Box<dyn std::error::Error + Send + Sync>),
    #[error("tool call cancelled")]
    Cancelled,
    #[error("unknown tool: {0}")]
    NotFound(String),
}

impl ToolError {
    /// Error raised by a handler's own logic.
    pub fn handler(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Handler(err.into())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum InferenceError {
    #[error("request failed: {0}")]
    Request(String),
    #[error("API returned {status}: {body}")]
    Api { status: u16, body: String },
    #[error("failed to parse response: {0}")]
    Parse(String),
}
