//! Standard Agent Loop
//!
//! One-shot agent that handles the prompt → LLM → tools → answer cycle:
//! the model is called with the tool definitions, any requested tools are
//! executed and their results fed back, until the model stops asking for
//! tools.

use std::sync::Arc;

use anyhow::Result;

use crate::llm::{ContentBlock, LlmProvider, Message, StopReason};
use crate::tools::ToolResult;

use super::config::AgentConfig;

/// Standard agent that runs the full tool-calling loop
///
/// # Example
///
/// ```ignore
/// let config = AgentConfig::new("You analyze sessions").with_tools(tools);
/// let agent = StandardAgent::new(config, llm);
/// let answer = agent.run("Summarize this session").await?;
/// ```
pub struct StandardAgent {
    config: AgentConfig,
    llm: Arc<dyn LlmProvider>,
}

impl StandardAgent {
    pub fn new(config: AgentConfig, llm: Arc<dyn LlmProvider>) -> Self {
        Self { config, llm }
    }

    /// Run one prompt to completion and return the final assistant text
    pub async fn run(&self, prompt: &str) -> Result<String> {
        let tool_definitions = self.config.tool_definitions();
        let mut history = vec![Message::user(prompt)];
        let mut iterations = 0;

        loop {
            iterations += 1;
            if iterations > self.config.max_tool_iterations {
                tracing::warn!(
                    "[StandardAgent] Max tool iterations ({}) reached",
                    self.config.max_tool_iterations
                );
                anyhow::bail!(
                    "Max tool iterations ({}) reached without a final answer",
                    self.config.max_tool_iterations
                );
            }

            tracing::info!(
                "[StandardAgent] Calling LLM with {} messages (iteration {})",
                history.len(),
                iterations
            );

            let response = self
                .llm
                .send_with_tools_and_system(
                    history.clone(),
                    Some(self.config.system_prompt.clone()),
                    tool_definitions.clone(),
                    self.config.thinking.clone(),
                )
                .await?;

            tracing::info!(
                "[StandardAgent] LLM response: stop_reason={:?}",
                response.stop_reason
            );

            let mut tool_results: Vec<(String, ToolResult)> = Vec::new();
            for block in &response.content {
                if let ContentBlock::ToolUse { id, name, input } = block {
                    tracing::info!("[StandardAgent] Tool use: {} ({})", name, id);
                    tool_results.push((id.clone(), self.execute_tool(name, input).await));
                }
            }

            let text = response.text();
            history.push(Message::assistant_with_blocks(response.content));

            if !tool_results.is_empty() {
                let tool_result_blocks: Vec<ContentBlock> = tool_results
                    .into_iter()
                    .map(|(id, result)| ContentBlock::tool_result(id, result.output, result.is_error))
                    .collect();
                history.push(Message::user_with_blocks(tool_result_blocks));
                continue;
            }

            match response.stop_reason {
                Some(StopReason::MaxTokens) => {
                    tracing::warn!("[StandardAgent] Response truncated (max tokens)");
                }
                Some(StopReason::Refusal) => {
                    tracing::warn!("[StandardAgent] Model refused to respond");
                }
                _ => {}
            }

            return Ok(text);
        }
    }

    async fn execute_tool(&self, name: &str, input: &serde_json::Value) -> ToolResult {
        let Some(tools) = self.config.tools.as_ref() else {
            return ToolResult::error(format!("No tools configured, cannot execute: {}", name));
        };

        match tools.execute(name, input).await {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!("[StandardAgent] Tool {} failed: {}", name, e);
                ToolResult::error(format!("Error: {}", e))
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use super::testing::{response, text_response, ScriptedProvider};
    use super::*;
    use crate::session::testing::sample_record;
    use crate::tools::session_tool_registry;
    use serde_json::json;

    fn agent(provider: Arc<ScriptedProvider>, max_iterations: usize) -> StandardAgent {
        let tools = Arc::new(session_tool_registry(Arc::new(sample_record())));
        let config = AgentConfig::new("system")
            .with_tools(tools)
            .with_max_tool_iterations(max_iterations);
        StandardAgent::new(config, provider)
    }

    #[tokio::test]
    async fn test_plain_answer() {
        let provider = Arc::new(ScriptedProvider::new(vec![text_response("All good.")]));
        let answer = agent(provider.clone(), 20).run("How did it go?").await.unwrap();

        assert_eq!(answer, "All good.");
        assert_eq!(provider.request_count(), 1);

        let requests = provider.requests.lock().unwrap();
        let (messages, system, tools) = &requests[0];
        assert_eq!(messages[0].text(), Some("How did it go?"));
        assert_eq!(system.as_deref(), Some("system"));
        assert_eq!(tools.len(), 5);
    }

    #[tokio::test]
    async fn test_tool_round_trip() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            response(
                vec![
                    ContentBlock::text("Checking errors."),
                    ContentBlock::tool_use("call_1", "extract_session_errors", json!({})),
                ],
                StopReason::ToolUse,
            ),
            text_response("One permission error."),
        ]));

        let answer = agent(provider.clone(), 20).run("Any errors?").await.unwrap();
        assert_eq!(answer, "One permission error.");

        let requests = provider.requests.lock().unwrap();
        let (messages, _, _) = &requests[1];
        assert_eq!(messages.len(), 3);

        match &messages[2].to_blocks()[0] {
            ContentBlock::ToolResult {
                tool_use_id,
                content,
                is_error,
            } => {
                assert_eq!(tool_use_id, "call_1");
                assert!(content.as_deref().unwrap().contains("Found 1 error(s)"));
                assert!(is_error.is_none());
            }
            other => panic!("expected tool result, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unknown_tool_reported_to_model() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            response(
                vec![ContentBlock::tool_use("call_1", "delete_everything", json!({}))],
                StopReason::ToolUse,
            ),
            text_response("Sorry."),
        ]));

        agent(provider.clone(), 20).run("Go").await.unwrap();

        let requests = provider.requests.lock().unwrap();
        let blocks = requests[1].0[2].to_blocks();
        assert!(matches!(
            &blocks[0],
            ContentBlock::ToolResult { is_error: Some(true), .. }
        ));
    }

    #[tokio::test]
    async fn test_max_iterations() {
        let looping = || {
            response(
                vec![ContentBlock::tool_use("call", "get_session_summary", json!({}))],
                StopReason::ToolUse,
            )
        };
        let provider = Arc::new(ScriptedProvider::new(vec![looping(), looping(), looping()]));

        let err = agent(provider.clone(), 2).run("Loop").await.unwrap_err();
        assert!(err.to_string().contains("Max tool iterations (2)"));
        assert_eq!(provider.request_count(), 2);
    }

    #[tokio::test]
    async fn test_provider_error_propagates() {
        let provider = Arc::new(ScriptedProvider::new(Vec::new()));
        let err = agent(provider, 20).run("Hi").await.unwrap_err();
        assert!(err.to_string().contains("script exhausted"));
    }
}
