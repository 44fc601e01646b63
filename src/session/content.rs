//! Message content blocks
//!
//! Each block on disk is a single-key object: `{"text": ...}`, `{"toolUse": ...}`
//! or `{"toolResult": ...}`. Anything else (images, reasoning, raw json
//! payloads) is kept verbatim as `ContentBlock::Other` so re-serialization
//! never drops data.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::metadata::null_as_default;

/// One unit of message content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ContentBlock {
    /// Plain text
    #[serde(rename = "text")]
    Text(String),

    /// Tool invocation requested by the model
    #[serde(rename = "toolUse")]
    ToolUse(ToolUse),

    /// Result of a tool invocation
    #[serde(rename = "toolResult")]
    ToolResult(ToolResult),

    /// Any block shape this viewer does not model
    #[serde(untagged)]
    Other(Value),
}

impl ContentBlock {
    /// Create a text block
    pub fn text(text: impl Into<String>) -> Self {
        ContentBlock::Text(text.into())
    }

    /// Create a tool use block
    pub fn tool_use(tool_use_id: impl Into<String>, name: impl Into<String>, input: Value) -> Self {
        ContentBlock::ToolUse(ToolUse {
            tool_use_id: tool_use_id.into(),
            name: name.into(),
            input,
        })
    }

    /// Create a tool result block with a single text entry
    pub fn tool_result(
        tool_use_id: impl Into<String>,
        status: ToolResultStatus,
        text: impl Into<String>,
    ) -> Self {
        ContentBlock::ToolResult(ToolResult {
            tool_use_id: tool_use_id.into(),
            status,
            content: vec![ContentBlock::Text(text.into())],
        })
    }

    /// Get the text if this is a text block
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ContentBlock::Text(text) => Some(text),
            _ => None,
        }
    }
}

/// A tool invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolUse {
    /// Correlation id echoed by the matching result
    #[serde(default, deserialize_with = "null_as_default")]
    pub tool_use_id: String,

    /// Tool name
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,

    /// Arbitrary input payload
    #[serde(default = "empty_object")]
    pub input: Value,
}

/// A tool invocation result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolResult {
    /// Id of the originating tool use (advisory, never validated)
    #[serde(default, deserialize_with = "null_as_default")]
    pub tool_use_id: String,

    /// Outcome reported by the tool
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: ToolResultStatus,

    /// Result content, typically text blocks
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: Vec<ContentBlock>,
}

impl ToolResult {
    /// Whether the tool reported an error
    pub fn is_error(&self) -> bool {
        self.status == ToolResultStatus::Error
    }

    /// Iterate over the text entries of the result
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.content.iter().filter_map(ContentBlock::as_text)
    }
}

/// Tool result status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolResultStatus {
    Success,
    Error,
    #[serde(untagged)]
    Other(String),
}

impl ToolResultStatus {
    pub fn as_str(&self) -> &str {
        match self {
            ToolResultStatus::Success => "success",
            ToolResultStatus::Error => "error",
            ToolResultStatus::Other(status) => status,
        }
    }
}

impl Default for ToolResultStatus {
    fn default() -> Self {
        ToolResultStatus::Other("unknown".to_string())
    }
}

impl fmt::Display for ToolResultStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn empty_object() -> Value {
    Value::Object(Default::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_text_block() {
        let block: ContentBlock = serde_json::from_value(json!({"text": "Hello"})).unwrap();
        assert_eq!(block, ContentBlock::text("Hello"));
    }

    #[test]
    fn test_decode_tool_use_block() {
        let block: ContentBlock = serde_json::from_value(json!({
            "toolUse": {"toolUseId": "shell_1", "name": "shell", "input": {"command": "ls -la"}}
        }))
        .unwrap();

        match block {
            ContentBlock::ToolUse(tool) => {
                assert_eq!(tool.tool_use_id, "shell_1");
                assert_eq!(tool.name, "shell");
                assert_eq!(tool.input["command"], "ls -la");
            }
            other => panic!("Expected ToolUse, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_error_tool_result() {
        let block: ContentBlock = serde_json::from_value(json!({
            "toolResult": {
                "status": "error",
                "content": [{"text": "Command failed with error"}],
                "toolUseId": "shell_2"
            }
        }))
        .unwrap();

        match block {
            ContentBlock::ToolResult(result) => {
                assert!(result.is_error());
                assert_eq!(result.texts().collect::<Vec<_>>(), vec!["Command failed with error"]);
            }
            other => panic!("Expected ToolResult, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_status_is_preserved() {
        let block: ContentBlock = serde_json::from_value(json!({
            "toolResult": {"status": "timeout", "content": [], "toolUseId": "t"}
        }))
        .unwrap();

        let encoded = serde_json::to_value(&block).unwrap();
        assert_eq!(encoded["toolResult"]["status"], "timeout");
    }

    #[test]
    fn test_unknown_block_kept_verbatim() {
        let raw = json!({"image": {"format": "png", "source": {"bytes": "AAAA"}}});
        let block: ContentBlock = serde_json::from_value(raw.clone()).unwrap();

        assert!(matches!(block, ContentBlock::Other(_)));
        assert_eq!(serde_json::to_value(&block).unwrap(), raw);
    }

    #[test]
    fn test_text_block_encodes_as_single_key() {
        let encoded = serde_json::to_value(ContentBlock::text("hi")).unwrap();
        assert_eq!(encoded, json!({"text": "hi"}));
    }
}
