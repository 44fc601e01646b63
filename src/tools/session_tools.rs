//! Read-only tools over one loaded session
//!
//! Each tool holds a shared handle to the session being analyzed and
//! answers with the text produced by `analysis::insights`.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use super::registry::ToolRegistry;
use super::tool::{Tool, ToolResult};
use crate::analysis::insights;
use crate::llm::{ToolDefinition, ToolInputSchema};
use crate::session::SessionRecord;

fn definition(tool: &dyn Tool, schema: ToolInputSchema) -> ToolDefinition {
    ToolDefinition {
        name: tool.name().to_string(),
        description: tool.description().to_string(),
        input_schema: schema,
    }
}

/// Basic information and statistics
pub struct SessionSummaryTool {
    session: Arc<SessionRecord>,
}

impl SessionSummaryTool {
    pub fn new(session: Arc<SessionRecord>) -> Self {
        Self { session }
    }
}

#[async_trait]
impl Tool for SessionSummaryTool {
    fn name(&self) -> &str {
        "get_session_summary"
    }

    fn description(&self) -> &str {
        "Get a summary of the session's basic information and statistics: \
         session ID, type, message counts by role, creation date and tool activity."
    }

    fn definition(&self) -> ToolDefinition {
        definition(self, ToolInputSchema::new())
    }

    async fn execute(&self, _input: &Value) -> Result<ToolResult> {
        Ok(ToolResult::success(insights::session_summary(&self.session)))
    }
}

/// Failed tool results with context
pub struct ExtractErrorsTool {
    session: Arc<SessionRecord>,
}

impl ExtractErrorsTool {
    pub fn new(session: Arc<SessionRecord>) -> Self {
        Self { session }
    }
}

#[async_trait]
impl Tool for ExtractErrorsTool {
    fn name(&self) -> &str {
        "extract_session_errors"
    }

    fn description(&self) -> &str {
        "Find and extract all errors that occurred in the session. Returns a detailed \
         list of all errors with context, or a message if no errors were found."
    }

    fn definition(&self) -> ToolDefinition {
        definition(self, ToolInputSchema::new())
    }

    async fn execute(&self, _input: &Value) -> Result<ToolResult> {
        let errors = insights::extract_errors(&self.session);
        Ok(ToolResult::success(insights::format_errors(&errors)))
    }
}

/// Per-tool call counts
pub struct ToolUsageTool {
    session: Arc<SessionRecord>,
}

impl ToolUsageTool {
    pub fn new(session: Arc<SessionRecord>) -> Self {
        Self { session }
    }
}

#[async_trait]
impl Tool for ToolUsageTool {
    fn name(&self) -> &str {
        "analyze_tool_usage"
    }

    fn description(&self) -> &str {
        "Analyze which tools were used in the session and how often."
    }

    fn definition(&self) -> ToolDefinition {
        definition(self, ToolInputSchema::new())
    }

    async fn execute(&self, _input: &Value) -> Result<ToolResult> {
        let usage = insights::tool_usage(&self.session);
        Ok(ToolResult::success(insights::format_tool_usage(&usage)))
    }
}

/// The full conversation flow
pub struct ConversationTool {
    session: Arc<SessionRecord>,
}

impl ConversationTool {
    pub fn new(session: Arc<SessionRecord>) -> Self {
        Self { session }
    }
}

#[async_trait]
impl Tool for ConversationTool {
    fn name(&self) -> &str {
        "get_conversation_messages"
    }

    fn description(&self) -> &str {
        "Get the full conversation flow with all messages: user prompts, assistant \
         responses, tool calls and tool result statuses. Very long texts are truncated."
    }

    fn definition(&self) -> ToolDefinition {
        definition(self, ToolInputSchema::new())
    }

    async fn execute(&self, _input: &Value) -> Result<ToolResult> {
        Ok(ToolResult::success(insights::conversation_dump(&self.session)))
    }
}

/// Case-insensitive text search
pub struct SearchContentTool {
    session: Arc<SessionRecord>,
}

#[derive(Debug, Deserialize)]
struct SearchInput {
    query: String,
}

impl SearchContentTool {
    pub fn new(session: Arc<SessionRecord>) -> Self {
        Self { session }
    }
}

#[async_trait]
impl Tool for SearchContentTool {
    fn name(&self) -> &str {
        "search_session_content"
    }

    fn description(&self) -> &str {
        "Search for specific text in the session messages (case-insensitive). \
         Returns every matching message with surrounding context."
    }

    fn definition(&self) -> ToolDefinition {
        definition(
            self,
            ToolInputSchema::new()
                .with_properties(json!({
                    "query": {
                        "type": "string",
                        "description": "Text to search for (case-insensitive)"
                    }
                }))
                .with_required(vec!["query".to_string()]),
        )
    }

    async fn execute(&self, input: &Value) -> Result<ToolResult> {
        let input: SearchInput = match serde_json::from_value(input.clone()) {
            Ok(input) => input,
            Err(e) => return Ok(ToolResult::error(format!("Invalid input: {}", e))),
        };

        if input.query.trim().is_empty() {
            return Ok(ToolResult::error("Search query must not be empty"));
        }

        let matches = insights::search(&self.session, &input.query);
        Ok(ToolResult::success(insights::format_search(&input.query, &matches)))
    }
}

/// Registry with every session tool bound to `session`
pub fn session_tool_registry(session: Arc<SessionRecord>) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(SessionSummaryTool::new(session.clone()));
    registry.register(ExtractErrorsTool::new(session.clone()));
    registry.register(ToolUsageTool::new(session.clone()));
    registry.register(ConversationTool::new(session.clone()));
    registry.register(SearchContentTool::new(session));
    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::testing::sample_record;

    fn registry() -> ToolRegistry {
        session_tool_registry(Arc::new(sample_record()))
    }

    #[test]
    fn test_registry_contents() {
        let registry = registry();
        assert_eq!(
            registry.tool_names(),
            vec![
                "analyze_tool_usage",
                "extract_session_errors",
                "get_conversation_messages",
                "get_session_summary",
                "search_session_content",
            ]
        );

        let search = registry
            .get_definitions()
            .into_iter()
            .find(|d| d.name == "search_session_content")
            .unwrap();
        assert_eq!(search.input_schema.required, Some(vec!["query".to_string()]));
    }

    #[tokio::test]
    async fn test_summary_tool() {
        let result = registry().execute("get_session_summary", &json!({})).await.unwrap();
        assert!(!result.is_error);
        assert!(result.output.contains("Session ID: test_session"));
    }

    #[tokio::test]
    async fn test_errors_tool() {
        let result = registry().execute("extract_session_errors", &json!({})).await.unwrap();
        assert!(result.output.contains("Found 1 error(s)"));
    }

    #[tokio::test]
    async fn test_search_tool() {
        let result = registry()
            .execute("search_session_content", &json!({"query": "files"}))
            .await
            .unwrap();
        assert!(result.output.starts_with("Found 1 match(es) for 'files':"));
    }

    #[tokio::test]
    async fn test_search_tool_bad_input() {
        let registry = registry();

        let missing = registry.execute("search_session_content", &json!({})).await.unwrap();
        assert!(missing.is_error);

        let blank = registry
            .execute("search_session_content", &json!({"query": "  "}))
            .await
            .unwrap();
        assert!(blank.is_error);
    }
}
