use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::debug;

use super::handler::{FuncHandler, ToolHandler, TypedHandler};
use crate::context::ToolContext;
use crate::error::ToolError;

/// A named capability an agent can invoke.
///
/// `input_schema` is advertised to the model as-is. It is not checked
/// against incoming input, nor against the types of a [`Tool::typed`]
/// handler: keeping the two in sync is the caller's job.
#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tool {
    name: String,
    description: String,
    input_schema: Value,
    #[serde(skip)]
    handler: Arc<dyn ToolHandler>,
}

impl Tool {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        input_schema: Value,
        handler: impl ToolHandler + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema,
            handler: Arc::new(handler),
        }
    }

    /// Tool backed by a function over raw JSON text.
    pub fn from_fn<F, Fut>(
        name: impl Into<String>,
        description: impl Into<String>,
        input_schema: Value,
        func: F,
    ) -> Self
    where
        F: Fn(ToolContext, String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<String, ToolError>> + Send + 'static,
    {
        Self::new(name, description, input_schema, FuncHandler::new(func))
    }

    /// Tool backed by a function over typed values; see [`TypedHandler`].
    pub fn typed<I, O, F, Fut>(
        name: impl Into<String>,
        description: impl Into<String>,
        input_schema: Value,
        func: F,
    ) -> Self
    where
        I: DeserializeOwned + Send + 'static,
        O: Serialize + Send + 'static,
        F: Fn(ToolContext, I) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<O, ToolError>> + Send + 'static,
    {
        Self::new(name, description, input_schema, TypedHandler::new(func))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn input_schema(&self) -> &Value {
        &self.input_schema
    }

    pub fn handler(&self) -> &Arc<dyn ToolHandler> {
        &self.handler
    }

    /// Definition sent to the model alongside a request.
    pub fn definition(&self) -> Value {
        json!({
            "name": self.name,
            "description": self.description,
            "input_schema": self.input_schema,
        })
    }
}

#[async_trait]
impl ToolHandler for Tool {
    async fn handle(&self, ctx: &ToolContext, input: &str) -> Result<String, ToolError> {
        debug!(
            tool = %self.name,
            call_id = ctx.call_id().unwrap_or("-"),
            input_len = input.len(),
            "invoking tool"
        );
        self.handler.handle(ctx, input).await
    }
}

impl fmt::Debug for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tool")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("input_schema", &self.input_schema)
            .finish_non_exhaustive()
    }
}
