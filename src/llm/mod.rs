pub mod anthropic;
pub mod openai;
pub mod provider;
pub mod types;

use std::sync::Arc;

use anyhow::Result;

use crate::config::{ModelConfig, ProviderKind};

pub use anthropic::AnthropicProvider;
pub use openai::OpenAiCompatProvider;
pub use provider::LlmProvider;
pub use types::{
    ContentBlock, Message, MessageContent, MessageRequest, MessageResponse, StopReason,
    ThinkingConfig, ToolDefinition, ToolInputSchema, Usage,
};

/// Build the provider a model configuration calls for
pub fn provider_from_config(config: &ModelConfig) -> Result<Arc<dyn LlmProvider>> {
    Ok(match config.provider {
        ProviderKind::Anthropic => Arc::new(AnthropicProvider::from_config(config)?),
        ProviderKind::OpenAi | ProviderKind::Ollama => Arc::new(OpenAiCompatProvider::from_config(config)?),
    })
}
