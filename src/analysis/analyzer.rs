//! AI session analysis
//!
//! Each operation builds a fresh `StandardAgent` whose tools are bound to the
//! session under analysis, then runs one prompt through it.

use std::sync::Arc;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::insights;
use crate::agent::{AgentConfig, StandardAgent};
use crate::config::ModelConfig;
use crate::llm::{self, LlmProvider};
use crate::session::SessionRecord;
use crate::tools::session_tool_registry;

const SYSTEM_PROMPT: &str = "You are an expert at reviewing AI agent sessions. \
Inspect the session with the available tools before answering, \
and base every statement on what the session actually contains.";

const SUMMARIZE_PROMPT: &str = "Analyze this agent session and provide a concise summary.

Use the available tools to gather information about the session, then provide:
1. Brief overview of what the agent did
2. Key tools used and their purposes
3. Any errors or failures that occurred
4. Overall assessment of the session

Keep the summary clear and actionable.";

const ERRORS_PROMPT: &str = "Analyze the errors in this agent session and provide debugging help.

Use the available tools to gather information about the errors, then provide:
1. Identification of all errors that occurred
2. Likely causes of each error
3. Specific suggestions for fixing the issues
4. Best practices to avoid similar errors

Be specific and actionable in your recommendations.";

const IMPROVEMENTS_PROMPT: &str = "Analyze this agent session and suggest improvements.

Use the available tools to understand the session, then provide:
1. Opportunities to optimize tool usage
2. Suggestions for better prompting or configuration
3. Ways to improve efficiency or reduce token usage
4. Any patterns that could be improved

Focus on actionable, specific recommendations.";

const QUESTION_SUFFIX: &str =
    "Use the available tools to analyze the session and answer the user's question accurately.";

/// Chat history entries embedded in a question prompt
const HISTORY_WINDOW: usize = 3;

/// One earlier exchange in an analysis chat
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatTurn {
    #[serde(default = "default_role")]
    pub role: String,
    #[serde(default)]
    pub content: String,
}

fn default_role() -> String {
    "user".to_string()
}

/// Runs analysis prompts against one model
pub struct SessionAnalyzer {
    llm: Arc<dyn LlmProvider>,
    thinking_budget: Option<u32>,
    supports_tools: bool,
}

impl SessionAnalyzer {
    pub fn new(llm: Arc<dyn LlmProvider>) -> Self {
        Self {
            llm,
            thinking_budget: None,
            supports_tools: true,
        }
    }

    /// Build the provider and analyzer a model configuration describes
    pub fn from_config(config: &ModelConfig) -> Result<Self> {
        let llm = llm::provider_from_config(config)?;
        Ok(Self::new(llm)
            .with_thinking_budget(config.thinking_budget)
            .with_tool_support(config.supports_tools))
    }

    pub fn with_thinking_budget(mut self, budget: Option<u32>) -> Self {
        self.thinking_budget = budget;
        self
    }

    /// Models without tool calling get the session inlined into the prompt
    pub fn with_tool_support(mut self, supports_tools: bool) -> Self {
        self.supports_tools = supports_tools;
        self
    }

    pub fn provider_name(&self) -> &str {
        self.llm.provider_name()
    }

    pub fn model(&self) -> String {
        self.llm.model()
    }

    /// Overview, tools used, failures and an overall assessment
    pub async fn summarize_session(&self, session: Arc<SessionRecord>) -> Result<String> {
        self.run(session, SUMMARIZE_PROMPT).await
    }

    /// Debugging help for failed tool results
    ///
    /// Returns `None` without calling the model when no tool result failed.
    pub async fn analyze_errors(&self, session: Arc<SessionRecord>) -> Result<Option<String>> {
        if insights::extract_errors(&session).is_empty() {
            tracing::debug!(session_id = %session.session_id, "No errors to analyze");
            return Ok(None);
        }
        self.run(session, ERRORS_PROMPT).await.map(Some)
    }

    pub async fn suggest_improvements(&self, session: Arc<SessionRecord>) -> Result<String> {
        self.run(session, IMPROVEMENTS_PROMPT).await
    }

    /// Answer a free-form question, with the last few chat turns as context
    pub async fn answer_question(
        &self,
        session: Arc<SessionRecord>,
        question: &str,
        history: &[ChatTurn],
    ) -> Result<String> {
        let prompt = question_prompt(question, history);
        self.run(session, &prompt).await
    }

    async fn run(&self, session: Arc<SessionRecord>, prompt: &str) -> Result<String> {
        tracing::info!(
            session_id = %session.session_id,
            provider = self.llm.provider_name(),
            "Running session analysis"
        );

        let mut config = AgentConfig::new(SYSTEM_PROMPT);
        if let Some(budget) = self.thinking_budget {
            config = config.with_thinking(budget);
        }

        let prompt = if self.supports_tools {
            config = config.with_tools(Arc::new(session_tool_registry(session)));
            prompt.to_string()
        } else {
            inline_session(&session, prompt)
        };

        StandardAgent::new(config, self.llm.clone()).run(&prompt).await
    }
}

fn question_prompt(question: &str, history: &[ChatTurn]) -> String {
    if history.is_empty() {
        return format!("User Question: {}\n\n{}", question, QUESTION_SUFFIX);
    }

    let start = history.len().saturating_sub(HISTORY_WINDOW);
    let mut context = String::from("\nPrevious conversation:\n");
    for turn in &history[start..] {
        context.push_str(&format!("{}: {}\n", turn.role, turn.content));
    }

    format!("{}\n\nUser Question: {}\n\n{}", context, question, QUESTION_SUFFIX)
}

fn inline_session(session: &SessionRecord, prompt: &str) -> String {
    format!(
        "{}\n\n{}\n\n{}\n\n{}\n\n{}",
        insights::session_summary(session),
        insights::format_errors(&insights::extract_errors(session)),
        insights::format_tool_usage(&insights::tool_usage(session)),
        insights::conversation_dump(session),
        prompt.replace("Use the available tools to", "Using the session data above,"),
    )
}
