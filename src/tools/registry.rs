//! Tool registry for managing available tools

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde_json::Value;

use super::tool::{Tool, ToolResult};
use crate::llm::ToolDefinition;

/// Registry that holds all available tools
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Register a tool, replacing any tool with the same name
    pub fn register<T: Tool + 'static>(&mut self, tool: T) {
        let name = tool.name().to_string();
        tracing::debug!("Registering tool: {}", name);
        if self.tools.insert(name.clone(), Arc::new(tool)).is_some() {
            tracing::warn!("Tool '{}' was registered twice; keeping the latest", name);
        }
    }

    /// All tool definitions, sorted by name so requests are stable
    pub fn get_definitions(&self) -> Vec<ToolDefinition> {
        let mut definitions: Vec<ToolDefinition> = self.tools.values().map(|t| t.definition()).collect();
        definitions.sort_by(|a, b| a.name.cmp(&b.name));
        definitions
    }

    /// Execute a tool by name
    pub async fn execute(&self, name: &str, input: &Value) -> Result<ToolResult> {
        let tool = self
            .tools
            .get(name)
            .with_context(|| format!("Tool not found: {}", name))?;

        tracing::info!("Executing tool: {}", name);
        tracing::debug!("Input: {:?}", input);

        let result = tool.execute(input).await?;

        tracing::debug!("Tool {} completed. Is error: {}", name, result.is_error);

        Ok(result)
    }

    /// Tool names, sorted
    pub fn tool_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tools.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.tool_names())
            .finish()
    }
}
