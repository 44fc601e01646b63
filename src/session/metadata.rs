//! Session, agent and message records
//!
//! These mirror the JSON files written by the agent runtime. The viewer only
//! ever reads them.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use super::content::ContentBlock;

/// Contents of a `session.json` file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionMetadata {
    /// Unique session ID; filled from the directory name when absent
    #[serde(default, deserialize_with = "null_as_default")]
    pub session_id: String,

    /// Session type tag (e.g. "AGENT")
    #[serde(default, deserialize_with = "null_as_default")]
    pub session_type: String,

    /// When the session was created (ISO-8601)
    #[serde(default, deserialize_with = "null_as_default")]
    pub created_at: String,

    /// When the session was last updated (ISO-8601)
    #[serde(default, deserialize_with = "null_as_default")]
    pub updated_at: String,
}

/// Listing entry for a session, built without parsing message bodies
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: String,
    pub session_type: String,
    pub created_at: String,
    pub updated_at: String,
    /// Number of message files across all agents
    pub message_count: usize,
    /// Session directory on disk
    pub path: String,
}

impl SessionSummary {
    pub(crate) fn new(metadata: SessionMetadata, message_count: usize, path: String) -> Self {
        Self {
            session_id: metadata.session_id,
            session_type: metadata.session_type,
            created_at: metadata.created_at,
            updated_at: metadata.updated_at,
            message_count,
            path,
        }
    }
}

/// A fully loaded session: metadata, agents and the merged message timeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub session_id: String,
    pub session_type: String,
    pub created_at: String,
    pub updated_at: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub agents: Vec<AgentRecord>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub messages: Vec<SessionMessage>,
}

impl SessionRecord {
    pub(crate) fn new(
        metadata: SessionMetadata,
        agents: Vec<AgentRecord>,
        messages: Vec<SessionMessage>,
    ) -> Self {
        Self {
            session_id: metadata.session_id,
            session_type: metadata.session_type,
            created_at: metadata.created_at,
            updated_at: metadata.updated_at,
            agents,
            messages,
        }
    }

    /// Number of messages in the merged timeline
    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    /// Iterate over every content block of every message, in timeline order
    pub fn content_blocks(&self) -> impl Iterator<Item = &ContentBlock> {
        self.messages.iter().flat_map(|m| m.message.content.iter())
    }
}

/// Contents of an `agent.json` file
///
/// Fields beyond the identifier and creation time (agent state, conversation
/// manager state, ...) are carried through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentRecord {
    /// Agent ID, equal to its storage subdirectory name
    #[serde(default, deserialize_with = "null_as_default")]
    pub agent_id: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub created_at: String,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One message file, stamped with the agent it was read from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionMessage {
    /// The conversational payload
    #[serde(default, deserialize_with = "null_as_default")]
    pub message: MessageBody,

    /// Writer-assigned id, unique only within one agent's stream
    #[serde(default, deserialize_with = "null_as_default")]
    pub message_id: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redact_message: Option<Value>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub created_at: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,

    /// Owning agent; display only
    #[serde(default, deserialize_with = "null_as_default")]
    pub agent_id: String,
}

impl SessionMessage {
    pub fn role(&self) -> &Role {
        &self.message.role
    }

    pub fn content(&self) -> &[ContentBlock] {
        &self.message.content
    }
}

/// Role plus ordered content blocks
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MessageBody {
    #[serde(default, deserialize_with = "null_as_default")]
    pub role: Role,

    #[serde(default, deserialize_with = "null_as_default")]
    pub content: Vec<ContentBlock>,
}

/// Author of a message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
    #[serde(untagged)]
    Other(String),
}

impl Role {
    pub fn as_str(&self) -> &str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => "system",
            Role::Other(role) => role,
        }
    }
}

impl Default for Role {
    fn default() -> Self {
        Role::Other("unknown".to_string())
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Treat an explicit JSON `null` like a missing field
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
