//! Agent Configuration
//!
//! Configuration options for the StandardAgent.

use std::sync::Arc;

use crate::llm::{ThinkingConfig, ToolDefinition};
use crate::tools::ToolRegistry;

/// Configuration for a StandardAgent
///
/// Use the builder pattern to configure the agent:
///
/// ```ignore
/// let config = AgentConfig::new("You analyze agent sessions")
///     .with_tools(tools)
///     .with_max_tool_iterations(10)
///     .with_thinking(1024);
/// ```
pub struct AgentConfig {
    /// System prompt for the LLM
    pub system_prompt: String,

    /// Tool registry (optional - agent can work without tools)
    pub tools: Option<Arc<ToolRegistry>>,

    /// Maximum number of model calls per run (prevents infinite tool loops)
    pub max_tool_iterations: usize,

    /// Extended thinking configuration (optional)
    pub thinking: Option<ThinkingConfig>,
}

impl AgentConfig {
    pub fn new(system_prompt: impl Into<String>) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            tools: None,
            max_tool_iterations: 20,
            thinking: None,
        }
    }

    pub fn with_tools(mut self, tools: Arc<ToolRegistry>) -> Self {
        self.tools = Some(tools);
        self
    }

    pub fn with_max_tool_iterations(mut self, max: usize) -> Self {
        self.max_tool_iterations = max;
        self
    }

    /// Enable extended thinking with a token budget
    ///
    /// Only Anthropic models use this; other providers ignore it.
    pub fn with_thinking(mut self, budget_tokens: u32) -> Self {
        self.thinking = Some(ThinkingConfig::enabled(budget_tokens));
        self
    }

    /// Get tool definitions (empty vec if no tools)
    pub fn tool_definitions(&self) -> Vec<ToolDefinition> {
        self.tools
            .as_ref()
            .map(|t| t.get_definitions())
            .unwrap_or_default()
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self::new("You are a helpful assistant.")
    }
}

impl std::fmt::Debug for AgentConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentConfig")
            .field("system_prompt", &format!("{}...", &self.system_prompt.chars().take(50).collect::<String>()))
            .field("tools", &self.tools.as_ref().map(|t| t.tool_names()))
            .field("max_tool_iterations", &self.max_tool_iterations)
            .field("thinking", &self.thinking)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agent_config_defaults() {
        let config = AgentConfig::default();
        assert_eq!(config.max_tool_iterations, 20);
        assert!(config.thinking.is_none());
        assert!(config.tool_definitions().is_empty());
    }

    #[test]
    fn test_agent_config_with_thinking() {
        let config = AgentConfig::new("Test").with_thinking(1024);
        assert_eq!(config.thinking, Some(ThinkingConfig::enabled(1024)));
    }
}
