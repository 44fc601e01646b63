//! LLM Provider trait
//!
//! Abstracts the model interface so that different providers (Anthropic,
//! OpenAI-compatible servers) can be used interchangeably with the
//! StandardAgent.

use anyhow::Result;

use super::types::{Message, MessageResponse, ThinkingConfig, ToolDefinition};

/// Trait for LLM providers that can be used with StandardAgent.
///
/// All providers work with the same internal message types (which follow
/// Anthropic's format). Providers that use a different wire format handle
/// translation internally.
#[async_trait::async_trait]
pub trait LlmProvider: Send + Sync {
    /// Send a request with tools and system prompt, returning the full response.
    ///
    /// This is the method used by the agent loop.
    async fn send_with_tools_and_system(
        &self,
        messages: Vec<Message>,
        system: Option<String>,
        tools: Vec<ToolDefinition>,
        thinking: Option<ThinkingConfig>,
    ) -> Result<MessageResponse>;

    /// Get the current model name.
    fn model(&self) -> String;

    /// Get the provider name (e.g., "anthropic", "openai").
    fn provider_name(&self) -> &str;
}
