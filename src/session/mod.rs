//! Session storage access
//!
//! This module reads agent sessions persisted as a directory tree of JSON
//! files and turns them into `SessionRecord`s with a single merged,
//! chronologically ordered message timeline.
//!
//! Sessions are read-only: nothing here writes, renames or deletes files.

pub mod content;
pub mod metadata;
pub mod repository;

#[cfg(test)]
pub(crate) mod testing;

pub use content::{ContentBlock, ToolResult, ToolResultStatus, ToolUse};
pub use metadata::{
    AgentRecord, MessageBody, Role, SessionMessage, SessionMetadata, SessionRecord, SessionSummary,
};
pub use repository::{MessagePage, SessionRepository};
