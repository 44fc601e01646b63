//! Tool trait definition
//!
//! All tools implement this trait to provide a consistent interface.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::llm::ToolDefinition;

/// Result of executing a tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    /// The output of the tool
    pub output: String,
    /// Whether the tool execution resulted in an error
    pub is_error: bool,
}

impl ToolResult {
    pub fn success(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            is_error: false,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            output: message.into(),
            is_error: true,
        }
    }
}

/// Trait for tools that the agent can use
///
/// Tools are read-only; none of them touch the filesystem or the network.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// Get the tool definition offered to the model
    fn definition(&self) -> ToolDefinition;

    /// Execute the tool with the given input
    ///
    /// The input is a JSON value that should match the tool's input schema.
    /// Bad input is reported as an error `ToolResult`, not as `Err`.
    async fn execute(&self, input: &Value) -> Result<ToolResult>;
}
