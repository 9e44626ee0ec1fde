use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use super::handler::ToolHandler;
use super::tool::Tool;
use crate::context::ToolContext;
use crate::error::ToolError;

/// Catalog of tools an agent can call. Holds shared references, hands out
/// definitions for the model and routes invocations by name.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self { tools: Vec::new() }
    }

    /// Register a tool. A tool already registered under the same name is
    /// replaced in place.
    pub fn add(mut self, tool: impl Into<Arc<Tool>>) -> Self {
        self.register(tool);
        self
    }

    /// Register a tool, returning the one it replaced, if any.
    pub fn register(&mut self, tool: impl Into<Arc<Tool>>) -> Option<Arc<Tool>> {
        let tool = tool.into();
        match self.tools.iter_mut().find(|t| t.name() == tool.name()) {
            Some(slot) => {
                warn!(tool = tool.name(), "replacing previously registered tool");
                Some(std::mem::replace(slot, tool))
            }
            None => {
                self.tools.push(tool);
                None
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&Arc<Tool>> {
        self.tools.iter().find(|t| t.name() == name)
    }

    /// Model-facing definitions of every tool, in registration order.
    pub fn definitions(&self) -> Vec<Value> {
        self.tools.iter().map(|t| t.definition()).collect()
    }

    /// Invoke a tool by name.
    pub async fn execute(
        &self,
        ctx: &ToolContext,
        name: &str,
        input: &str,
    ) -> Result<String, ToolError> {
        let tool = self
            .get(name)
            .ok_or_else(|| ToolError::NotFound(name.to_string()))?;
        debug!(tool = name, "routing tool call");
        tool.handle(ctx, input).await
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Tool>> {
        self.tools.iter()
    }

    pub fn tool_names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }
}

impl FromIterator<Tool> for ToolRegistry {
    fn from_iter<T: IntoIterator<Item = Tool>>(iter: T) -> Self {
        iter.into_iter().fold(Self::new(), |reg, tool| reg.add(tool))
    }
}
