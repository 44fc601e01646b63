//! Session repository
//!
//! Reads the on-disk session tree into in-memory records:
//!
//! ```text
//! <root>/session_<id>/session.json
//! <root>/session_<id>/agents/<agent_id>/agent.json
//! <root>/session_<id>/agents/<agent_id>/messages/message_<n>.json
//! ```
//!
//! Every multi-item scan tolerates individual bad files: they are logged and
//! skipped so one corrupt message cannot hide the rest of a session.

use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

use glob::Pattern;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::core::{ViewerError, ViewerResult};

use super::metadata::{AgentRecord, SessionMetadata, SessionMessage, SessionRecord, SessionSummary};

const SESSION_DIR_PATTERN: &str = "session_*";
const MESSAGE_FILE_PATTERN: &str = "message_*.json";
const SESSION_FILE: &str = "session.json";
const AGENT_FILE: &str = "agent.json";
const AGENTS_DIR: &str = "agents";
const MESSAGES_DIR: &str = "messages";

/// Offset/limit slice over a message timeline
///
/// An offset of zero and a missing or zero limit leave the timeline untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct MessagePage {
    #[serde(default)]
    pub offset: usize,
    #[serde(default)]
    pub limit: Option<usize>,
}

impl MessagePage {
    pub fn new(offset: usize, limit: Option<usize>) -> Self {
        Self { offset, limit }
    }

    /// Skip `offset` items, then keep at most `limit`
    pub fn apply<T>(&self, items: Vec<T>) -> Vec<T> {
        let rest = items.into_iter().skip(self.offset);
        match self.limit {
            Some(limit) if limit > 0 => rest.take(limit).collect(),
            _ => rest.collect(),
        }
    }
}

/// Read-only access to a session storage root
#[derive(Debug, Clone)]
pub struct SessionRepository {
    root: PathBuf,
    session_dirs: Pattern,
    message_files: Pattern,
}

impl SessionRepository {
    /// Open a storage root
    ///
    /// Fails if the root does not exist or is not a directory.
    pub fn open(root: impl Into<PathBuf>) -> ViewerResult<Self> {
        let root = root.into();

        if !root.exists() {
            return Err(ViewerError::StorageNotFound(root));
        }
        if !root.is_dir() {
            return Err(ViewerError::NotADirectory(root));
        }

        let session_dirs = Pattern::new(SESSION_DIR_PATTERN)
            .map_err(|e| ViewerError::other(format!("Bad session pattern: {}", e)))?;
        let message_files = Pattern::new(MESSAGE_FILE_PATTERN)
            .map_err(|e| ViewerError::other(format!("Bad message pattern: {}", e)))?;

        tracing::debug!("Opened session storage at {:?}", root);

        Ok(Self {
            root,
            session_dirs,
            message_files,
        })
    }

    /// Get the storage root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the directory path for a session
    pub fn session_dir(&self, session_id: &str) -> PathBuf {
        self.root.join(format!("session_{}", session_id))
    }

    /// List all sessions, most recently updated first
    ///
    /// Directories without a `session.json` are ignored; unreadable metadata
    /// is logged and skipped.
    pub fn list_sessions(&self) -> Vec<SessionSummary> {
        let mut sessions = Vec::new();

        for session_dir in self.matching_dirs(&self.root, &self.session_dirs) {
            let session_file = session_dir.join(SESSION_FILE);
            if !session_file.is_file() {
                continue;
            }

            match read_json::<SessionMetadata>(&session_file) {
                Ok(mut metadata) => {
                    if metadata.session_id.is_empty() {
                        metadata.session_id = session_id_from_dir(&session_dir);
                    }
                    let message_count = self.count_messages(&session_dir);
                    sessions.push(SessionSummary::new(
                        metadata,
                        message_count,
                        session_dir.display().to_string(),
                    ));
                }
                Err(e) => {
                    tracing::warn!("Error reading session {:?}: {}", session_dir, e);
                }
            }
        }

        // ISO-8601 strings sort chronologically
        sessions.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        sessions
    }

    /// Load a session with its agents and merged message timeline
    ///
    /// Returns `None` if the session directory or its metadata is missing or
    /// cannot be parsed.
    pub fn get_session(&self, session_id: &str) -> Option<SessionRecord> {
        if !is_safe_session_id(session_id) {
            tracing::warn!("Rejected session id {:?}", session_id);
            return None;
        }

        let session_dir = self.session_dir(session_id);
        let session_file = session_dir.join(SESSION_FILE);
        if !session_dir.is_dir() || !session_file.is_file() {
            return None;
        }

        let mut metadata = match read_json::<SessionMetadata>(&session_file) {
            Ok(metadata) => metadata,
            Err(e) => {
                tracing::warn!("Error reading session {}: {}", session_id, e);
                return None;
            }
        };

        if metadata.session_id.is_empty() {
            metadata.session_id = session_id.to_string();
        }

        let agents = self.load_agents(&session_dir);
        let messages = self.merge_messages(&session_dir);

        tracing::debug!(
            "Loaded session {} ({} agents, {} messages)",
            session_id,
            agents.len(),
            messages.len()
        );

        Some(SessionRecord::new(metadata, agents, messages))
    }

    /// Load the agents of a session; empty if the session is unknown
    pub fn agents(&self, session_id: &str) -> Vec<AgentRecord> {
        if !is_safe_session_id(session_id) {
            return Vec::new();
        }
        self.load_agents(&self.session_dir(session_id))
    }

    /// Get a slice of a session's merged timeline
    ///
    /// An unknown session yields an empty list rather than an error.
    pub fn get_messages(&self, session_id: &str, page: MessagePage) -> Vec<SessionMessage> {
        match self.get_session(session_id) {
            Some(session) => page.apply(session.messages),
            None => Vec::new(),
        }
    }

    /// Count message files across all agents without parsing them
    fn count_messages(&self, session_dir: &Path) -> usize {
        self.agent_dirs(session_dir)
            .iter()
            .map(|agent_dir| {
                self.matching_files(&agent_dir.join(MESSAGES_DIR), &self.message_files)
                    .len()
            })
            .sum()
    }

    fn load_agents(&self, session_dir: &Path) -> Vec<AgentRecord> {
        let mut agents = Vec::new();

        for agent_dir in self.agent_dirs(session_dir) {
            let agent_file = agent_dir.join(AGENT_FILE);
            if !agent_file.is_file() {
                continue;
            }

            match read_json::<AgentRecord>(&agent_file) {
                Ok(mut agent) => {
                    if agent.agent_id.is_empty() {
                        agent.agent_id = dir_name(&agent_dir);
                    }
                    agents.push(agent);
                }
                Err(e) => {
                    tracing::warn!("Error reading agent {:?}: {}", agent_dir, e);
                }
            }
        }

        agents
    }

    /// Merge every agent's message stream into one timeline
    ///
    /// Sorted by `message_id` with a stable sort. Ids are only unique per
    /// agent, so equal ids keep discovery order: agent directory name, then
    /// message file name.
    fn merge_messages(&self, session_dir: &Path) -> Vec<SessionMessage> {
        let mut messages = Vec::new();

        for agent_dir in self.agent_dirs(session_dir) {
            let agent_id = dir_name(&agent_dir);

            for message_file in self.matching_files(&agent_dir.join(MESSAGES_DIR), &self.message_files)
            {
                match read_json::<SessionMessage>(&message_file) {
                    Ok(mut message) => {
                        message.agent_id = agent_id.clone();
                        messages.push(message);
                    }
                    Err(e) => {
                        tracing::warn!("Error reading message {:?}: {}", message_file, e);
                    }
                }
            }
        }

        messages.sort_by_key(|m| m.message_id);
        messages
    }

    fn agent_dirs(&self, session_dir: &Path) -> Vec<PathBuf> {
        sorted_entries(&session_dir.join(AGENTS_DIR))
            .into_iter()
            .filter(|path| path.is_dir())
            .collect()
    }

    fn matching_dirs(&self, dir: &Path, pattern: &Pattern) -> Vec<PathBuf> {
        sorted_entries(dir)
            .into_iter()
            .filter(|path| path.is_dir() && name_matches(path, pattern))
            .collect()
    }

    fn matching_files(&self, dir: &Path, pattern: &Pattern) -> Vec<PathBuf> {
        sorted_entries(dir)
            .into_iter()
            .filter(|path| path.is_file() && name_matches(path, pattern))
            .collect()
    }
}

/// Directory entries in file-name order; empty if the directory is unreadable
fn sorted_entries(dir: &Path) -> Vec<PathBuf> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            if dir.exists() {
                tracing::warn!("Error listing {:?}: {}", dir, e);
            }
            return Vec::new();
        }
    };

    let mut paths: Vec<PathBuf> = entries
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry.path()),
            Err(e) => {
                tracing::warn!("Error reading entry in {:?}: {}", dir, e);
                None
            }
        })
        .collect();
    paths.sort();
    paths
}

fn name_matches(path: &Path, pattern: &Pattern) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| pattern.matches(name))
        .unwrap_or(false)
}

fn dir_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// `session_<id>` -> `<id>`
fn session_id_from_dir(session_dir: &Path) -> String {
    let name = dir_name(session_dir);
    match name.strip_prefix("session_") {
        Some(id) => id.to_string(),
        None => name,
    }
}

/// Session ids map straight to a directory name, so they must not escape the root
fn is_safe_session_id(session_id: &str) -> bool {
    !session_id.is_empty()
        && session_id != "."
        && session_id != ".."
        && !session_id.contains(['/', '\\'])
}

fn read_json<T: DeserializeOwned>(path: &Path) -> ViewerResult<T> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    Ok(serde_json::from_reader(reader)?)
}
