//! OpenAI-compatible chat-completions client
//!
//! Serves both the OpenAI API and local Ollama servers, which expose the same
//! `/chat/completions` endpoint. Requests and responses are translated
//! between the internal (Anthropic-format) types and the chat-completions
//! wire format.

use anyhow::{Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::provider::LlmProvider;
use super::types::{
    ContentBlock, Message, MessageContent, MessageResponse, StopReason, ThinkingConfig,
    ToolDefinition, Usage,
};
use crate::config::{ModelConfig, ProviderKind};

// ============================================================================
// Chat-completions request/response types
// ============================================================================

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<ChatTool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_completion_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reasoning_effort: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<ChatToolCall>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

impl ChatMessage {
    fn new(role: &str, content: impl Into<String>) -> Self {
        Self {
            role: role.to_string(),
            content: Some(content.into()),
            tool_calls: None,
            tool_call_id: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct ChatToolCall {
    id: String,
    #[serde(rename = "type", default = "function_type")]
    call_type: String,
    function: ChatFunctionCall,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct ChatFunctionCall {
    name: String,
    /// JSON-encoded arguments
    #[serde(default)]
    arguments: String,
}

fn function_type() -> String {
    "function".to_string()
}

#[derive(Debug, Serialize)]
struct ChatTool {
    #[serde(rename = "type")]
    tool_type: String,
    function: ChatFunctionDefinition,
}

#[derive(Debug, Serialize)]
struct ChatFunctionDefinition {
    name: String,
    description: String,
    parameters: Value,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
}

// ============================================================================
// Provider
// ============================================================================

/// OpenAI or Ollama models via chat completions
pub struct OpenAiCompatProvider {
    client: Client,
    kind: ProviderKind,
    api_key: Option<String>,
    model: String,
    max_tokens: u32,
    reasoning_effort: Option<String>,
    temperature: Option<f32>,
    api_base: String,
}

impl OpenAiCompatProvider {
    /// Create a provider from a validated model configuration
    pub fn from_config(config: &ModelConfig) -> Result<Self> {
        if config.provider == ProviderKind::Anthropic {
            anyhow::bail!("OpenAI-compatible provider cannot serve Anthropic models");
        }

        tracing::info!(
            provider = %config.provider,
            model = %config.model_id,
            base_url = %config.base_url,
            "Creating chat-completions provider"
        );

        Ok(Self {
            client: Client::new(),
            kind: config.provider,
            api_key: config.api_key.clone(),
            model: config.model_id.clone(),
            max_tokens: config.max_tokens,
            reasoning_effort: config.reasoning_effort.clone(),
            temperature: config.temperature,
            api_base: config.base_url.clone(),
        })
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.api_base.trim_end_matches('/'))
    }

    fn build_request(
        &self,
        messages: &[Message],
        system: Option<&str>,
        tools: &[ToolDefinition],
    ) -> ChatRequest {
        // OpenAI's reasoning models only accept max_completion_tokens
        let (max_completion_tokens, max_tokens) = match self.kind {
            ProviderKind::OpenAi => (Some(self.max_tokens), None),
            _ => (None, Some(self.max_tokens)),
        };

        ChatRequest {
            model: self.model.clone(),
            messages: convert_messages(messages, system),
            tools: convert_tools(tools),
            max_completion_tokens,
            max_tokens,
            reasoning_effort: self.reasoning_effort.clone(),
            temperature: self.temperature,
        }
    }

    async fn send_request(&self, request: &ChatRequest) -> Result<ChatResponse> {
        let request_json =
            serde_json::to_string(request).context("Failed to serialize chat request")?;
        tracing::debug!("[{}] Request JSON: {}", self.kind, request_json);

        let mut request_builder = self
            .client
            .post(self.completions_url())
            .header("Content-Type", "application/json");

        if let Some(key) = &self.api_key {
            request_builder = request_builder.bearer_auth(key);
        }

        let response = request_builder
            .body(request_json)
            .send()
            .await
            .with_context(|| format!("Failed to send request to {} API", self.kind))?;

        let status = response.status();
        let response_text = response
            .text()
            .await
            .context("Failed to read chat response body")?;

        tracing::debug!("[{}] Response status: {}", self.kind, status);

        if !status.is_success() {
            tracing::error!("[{}] API error: {} - {}", self.kind, status, response_text);
            anyhow::bail!("{} API error ({}): {}", self.kind, status, response_text);
        }

        serde_json::from_str(&response_text).context("Failed to parse chat completions response")
    }

    fn convert_response(&self, response: ChatResponse) -> Result<MessageResponse> {
        let choice = response
            .choices
            .into_iter()
            .next()
            .context("No choices in chat completions response")?;

        let mut content = Vec::new();
        if let Some(text) = choice.message.content.filter(|t| !t.is_empty()) {
            content.push(ContentBlock::text(text));
        }
        for call in choice.message.tool_calls.unwrap_or_default() {
            let input = if call.function.arguments.trim().is_empty() {
                Value::Object(Default::default())
            } else {
                serde_json::from_str(&call.function.arguments).unwrap_or_else(|e| {
                    tracing::warn!(tool = %call.function.name, "Tool arguments are not JSON: {}", e);
                    Value::Object(Default::default())
                })
            };
            content.push(ContentBlock::tool_use(call.id, call.function.name, input));
        }

        let has_tool_use = content
            .iter()
            .any(|b| matches!(b, ContentBlock::ToolUse { .. }));
        let stop_reason = if has_tool_use {
            Some(StopReason::ToolUse)
        } else {
            choice.finish_reason.as_deref().map(|reason| match reason {
                "length" => StopReason::MaxTokens,
                "content_filter" => StopReason::Refusal,
                "tool_calls" => StopReason::ToolUse,
                _ => StopReason::EndTurn,
            })
        };

        let usage = response
            .usage
            .map(|u| Usage {
                input_tokens: u.prompt_tokens,
                output_tokens: u.completion_tokens,
            })
            .unwrap_or_default();

        Ok(MessageResponse {
            id: response.id.unwrap_or_default(),
            response_type: "message".to_string(),
            role: "assistant".to_string(),
            content,
            model: response.model.unwrap_or_else(|| self.model.clone()),
            stop_reason,
            stop_sequence: None,
            usage,
        })
    }
}

#[async_trait::async_trait]
impl LlmProvider for OpenAiCompatProvider {
    async fn send_with_tools_and_system(
        &self,
        messages: Vec<Message>,
        system: Option<String>,
        tools: Vec<ToolDefinition>,
        _thinking: Option<ThinkingConfig>,
    ) -> Result<MessageResponse> {
        let request = self.build_request(&messages, system.as_deref(), &tools);
        let response = self.send_request(&request).await?;
        self.convert_response(response)
    }

    fn model(&self) -> String {
        self.model.clone()
    }

    fn provider_name(&self) -> &str {
        self.kind.name()
    }
}

// ============================================================================
// Format conversion: Internal (Anthropic) -> chat completions
// ============================================================================

fn convert_messages(messages: &[Message], system: Option<&str>) -> Vec<ChatMessage> {
    let mut chat = Vec::with_capacity(messages.len() + 1);

    if let Some(system) = system {
        chat.push(ChatMessage::new("system", system));
    }

    for msg in messages {
        let blocks = match &msg.content {
            MessageContent::Text(text) => {
                chat.push(ChatMessage::new(&msg.role, text.clone()));
                continue;
            }
            MessageContent::Blocks(blocks) => blocks,
        };

        let mut texts = Vec::new();
        let mut tool_calls = Vec::new();

        for block in blocks {
            match block {
                ContentBlock::Text { text } => texts.push(text.as_str()),
                ContentBlock::ToolUse { id, name, input } => tool_calls.push(ChatToolCall {
                    id: id.clone(),
                    call_type: function_type(),
                    function: ChatFunctionCall {
                        name: name.clone(),
                        arguments: input.to_string(),
                    },
                }),
                ContentBlock::ToolResult {
                    tool_use_id,
                    content,
                    ..
                } => chat.push(ChatMessage {
                    role: "tool".to_string(),
                    content: Some(content.clone().unwrap_or_default()),
                    tool_calls: None,
                    tool_call_id: Some(tool_use_id.clone()),
                }),
                ContentBlock::Thinking { .. } | ContentBlock::RedactedThinking { .. } => {}
            }
        }

        if texts.is_empty() && tool_calls.is_empty() {
            continue;
        }

        chat.push(ChatMessage {
            role: msg.role.clone(),
            content: if texts.is_empty() { None } else { Some(texts.join("")) },
            tool_calls: if tool_calls.is_empty() { None } else { Some(tool_calls) },
            tool_call_id: None,
        });
    }

    chat
}

fn convert_tools(tools: &[ToolDefinition]) -> Option<Vec<ChatTool>> {
    if tools.is_empty() {
        return None;
    }

    Some(
        tools
            .iter()
            .map(|tool| ChatTool {
                tool_type: function_type(),
                function: ChatFunctionDefinition {
                    name: tool.name.clone(),
                    description: tool.description.clone(),
                    parameters: tool.input_schema.to_json_schema(),
                },
            })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::types::ToolInputSchema;
    use serde_json::json;

    fn provider(kind: ProviderKind) -> OpenAiCompatProvider {
        let config = match kind {
            ProviderKind::Ollama => ModelConfig::ollama(None, None).unwrap(),
            _ => ModelConfig::openai("key", None).unwrap(),
        };
        OpenAiCompatProvider::from_config(&config).unwrap()
    }

    #[test]
    fn test_rejects_anthropic_config() {
        let config = ModelConfig::anthropic("key", None).unwrap();
        assert!(OpenAiCompatProvider::from_config(&config).is_err());
    }

    #[test]
    fn test_tool_round_trip_conversion() {
        let messages = vec![
            Message::user("Summarize"),
            Message::assistant_with_blocks(vec![
                ContentBlock::Thinking {
                    thinking: "hmm".into(),
                    signature: "sig".into(),
                },
                ContentBlock::tool_use("call_1", "get_session_summary", json!({})),
            ]),
            Message::user_with_blocks(vec![ContentBlock::tool_result("call_1", "Session ID: s", false)]),
        ];

        let chat = convert_messages(&messages, Some("Be brief"));
        assert_eq!(chat.len(), 4);
        assert_eq!(chat[0], ChatMessage::new("system", "Be brief"));
        assert_eq!(chat[1], ChatMessage::new("user", "Summarize"));

        let calls = chat[2].tool_calls.as_ref().unwrap();
        assert_eq!(calls[0].function.name, "get_session_summary");
        assert_eq!(calls[0].function.arguments, "{}");
        assert!(chat[2].content.is_none());

        assert_eq!(chat[3].role, "tool");
        assert_eq!(chat[3].tool_call_id.as_deref(), Some("call_1"));
        assert_eq!(chat[3].content.as_deref(), Some("Session ID: s"));
    }

    #[test]
    fn test_token_field_per_provider() {
        let tools = vec![ToolDefinition {
            name: "search_session_content".into(),
            description: "Search".into(),
            input_schema: ToolInputSchema::new(),
        }];

        let openai = serde_json::to_value(provider(ProviderKind::OpenAi).build_request(&[], None, &tools)).unwrap();
        assert_eq!(openai["max_completion_tokens"], 16000);
        assert_eq!(openai["reasoning_effort"], "medium");
        assert!(openai.get("max_tokens").is_none());
        assert_eq!(openai["tools"][0]["function"]["parameters"]["type"], "object");

        let ollama = serde_json::to_value(provider(ProviderKind::Ollama).build_request(&[], None, &[])).unwrap();
        assert_eq!(ollama["max_tokens"], 128000);
        assert!(ollama.get("tools").is_none());
    }

    #[test]
    fn test_convert_response_with_tool_calls() {
        let raw: ChatResponse = serde_json::from_value(json!({
            "id": "chatcmpl-1",
            "model": "gpt-5-mini",
            "choices": [{
                "message": {
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [{
                        "id": "call_9",
                        "type": "function",
                        "function": {"name": "search_session_content", "arguments": "{\"query\":\"error\"}"}
                    }]
                },
                "finish_reason": "tool_calls"
            }],
            "usage": {"prompt_tokens": 12, "completion_tokens": 3}
        }))
        .unwrap();

        let response = provider(ProviderKind::OpenAi).convert_response(raw).unwrap();
        assert_eq!(response.stop_reason, Some(StopReason::ToolUse));
        let (id, name, input) = response.tool_uses()[0];
        assert_eq!(id, "call_9");
        assert_eq!(name, "search_session_content");
        assert_eq!(input, &json!({"query": "error"}));
        assert_eq!(response.usage.input_tokens, 12);
    }

    #[test]
    fn test_convert_response_text() {
        let raw: ChatResponse = serde_json::from_value(json!({
            "choices": [{"message": {"role": "assistant", "content": "Done."}, "finish_reason": "stop"}]
        }))
        .unwrap();

        let response = provider(ProviderKind::Ollama).convert_response(raw).unwrap();
        assert_eq!(response.stop_reason, Some(StopReason::EndTurn));
        assert_eq!(response.text(), "Done.");
        assert_eq!(response.model, "qwen3:4b");
    }

    #[test]
    fn test_convert_response_without_choices() {
        let raw: ChatResponse = serde_json::from_value(json!({"choices": []})).unwrap();
        assert!(provider(ProviderKind::OpenAi).convert_response(raw).is_err());
    }
}
