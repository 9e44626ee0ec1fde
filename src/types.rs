use serde_json::Value;

/// Fully-formed request. The provider just sends it.
#[derive(Debug, Clone, Default)]
pub struct InferenceRequest {
    pub model: String,
    pub max_tokens: Option<u32>,
    pub system: Option<String>,
    /// Tool definitions as produced by `Tool::definition`.
    pub tools: Vec<Value>,
    /// Chat messages in the provider's wire format.
    pub messages: Vec<Value>,
}

/// What came back from the LLM.
#[derive(Debug, Clone)]
pub struct InferenceResponse {
    pub stop_reason: StopReason,
    pub content: Vec<ContentBlock>,
    pub usage: Usage,
}

impl InferenceResponse {
    /// Text blocks joined by newlines.
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|b| match b {
                ContentBlock::Text(t) => Some(t.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Why the model stopped generating.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    EndTurn,
    ToolUse,
    MaxTokens,
}

/// A content block in the model's response.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentBlock {
    Text(String),
    /// `arguments` is the raw JSON text the model produced, ready to hand
    /// to a tool handler.
    ToolUse {
        id: String,
        name: String,
        arguments: String,
    },
}

/// Token usage for a single inference call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}
