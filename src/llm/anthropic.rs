//! Anthropic Messages API client
//!
//! A direct HTTP client for `POST /v1/messages`. The internal message types
//! already match this wire format, so no translation is needed.

use anyhow::{Context, Result};
use reqwest::Client;

use super::provider::LlmProvider;
use super::types::{ApiError, Message, MessageRequest, MessageResponse, ThinkingConfig, ToolDefinition};
use crate::config::ModelConfig;

const DEFAULT_API_BASE: &str = "https://api.anthropic.com";
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Claude models via the Anthropic API
pub struct AnthropicProvider {
    client: Client,
    api_key: String,
    model: String,
    max_tokens: u32,
    temperature: Option<f32>,
    api_base: String,
}

impl AnthropicProvider {
    /// Create a new provider with an explicit API key
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: String::new(),
            max_tokens: 4000,
            temperature: None,
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }

    /// Create a provider from a validated model configuration
    pub fn from_config(config: &ModelConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .context("Anthropic provider requires an API key")?;

        tracing::info!(model = %config.model_id, max_tokens = config.max_tokens, "Creating Anthropic provider");

        Ok(Self::new(api_key)
            .with_model(config.model_id.clone())
            .with_max_tokens(config.max_tokens)
            .with_temperature(config.temperature)
            .with_api_base(config.base_url.clone()))
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    fn messages_url(&self) -> String {
        format!("{}/v1/messages", self.api_base.trim_end_matches('/'))
    }

    async fn send_request(&self, request: &MessageRequest) -> Result<MessageResponse> {
        let request_json =
            serde_json::to_string(request).context("Failed to serialize Anthropic request")?;
        tracing::debug!("[Anthropic] Request JSON: {}", request_json);

        let response = self
            .client
            .post(self.messages_url())
            .header("Content-Type", "application/json")
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .body(request_json)
            .send()
            .await
            .context("Failed to send request to Anthropic API")?;

        let status = response.status();
        let response_text = response
            .text()
            .await
            .context("Failed to read Anthropic response body")?;

        tracing::debug!("[Anthropic] Response status: {}", status);

        if !status.is_success() {
            let message = serde_json::from_str::<ApiError>(&response_text)
                .map(|e| format!("{}: {}", e.error.error_type, e.error.message))
                .unwrap_or(response_text);
            tracing::error!("[Anthropic] API error: {} - {}", status, message);
            anyhow::bail!("Anthropic API error ({}): {}", status, message);
        }

        serde_json::from_str(&response_text).context("Failed to parse Anthropic API response")
    }
}

#[async_trait::async_trait]
impl LlmProvider for AnthropicProvider {
    async fn send_with_tools_and_system(
        &self,
        messages: Vec<Message>,
        system: Option<String>,
        tools: Vec<ToolDefinition>,
        thinking: Option<ThinkingConfig>,
    ) -> Result<MessageResponse> {
        // The API rejects any temperature other than 1 while thinking
        let temperature = if thinking.is_some() {
            Some(1.0)
        } else {
            self.temperature
        };

        let request = MessageRequest {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            messages,
            system,
            tools: if tools.is_empty() { None } else { Some(tools) },
            thinking,
            temperature,
        };

        self.send_request(&request).await
    }

    fn model(&self) -> String {
        self.model.clone()
    }

    fn provider_name(&self) -> &str {
        "anthropic"
    }
}
