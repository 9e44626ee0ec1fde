//! Tools for LLM agents behind a single JSON-in, JSON-out contract, plus a
//! provider configuration layer for OpenAI-compatible endpoints.
//!
//! ```no_run
//! use agent_tools::{Tool, ToolContext, ToolError, ToolHandler};
//! use serde::{Deserialize, Serialize};
//! use serde_json::json;
//!
//! #[derive(Deserialize)]
//! struct Input { name: String }
//!
//! #[derive(Serialize)]
//! struct Output { message: String }
//!
//! # async fn run() -> Result<(), ToolError> {
//! let tool = Tool::typed(
//!     "greet",
//!     "Greet someone by name",
//!     json!({ "type": "object", "properties": { "name": { "type": "string" } } }),
//!     |_ctx, input: Input| async move {
//!         Ok::<_, ToolError>(Output { message: format!("Hello {}", input.name) })
//!     },
//! );
//! let out = tool.handle(&ToolContext::new(), r#"{"name":"Ada"}"#).await?;
//! assert_eq!(out, r#"{"message":"Hello Ada"}"#);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod context;
pub mod error;
pub mod inference;
pub mod tools;
pub mod types;

pub use config::ProviderConfig;
pub use context::ToolContext;
pub use error::{InferenceError, ToolError};
pub use inference::{InferenceProvider, OpenAiProvider, RequestOption};
pub use tools::{FuncHandler, Tool, ToolHandler, ToolRegistry, TypedHandler};
pub use types::{ContentBlock, InferenceRequest, InferenceResponse, StopReason, Usage};
