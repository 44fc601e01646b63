//! Fixtures shared by unit tests

use std::fs;
use std::path::Path;

use serde_json::{json, Value};

use super::content::{ContentBlock, ToolResultStatus};
use super::metadata::{MessageBody, Role, SessionMessage, SessionRecord};

/// Write one message file into an agent's `messages/` directory
pub fn write_message(messages_dir: &Path, message_id: i64, role: &str, content: Value) {
    let message = json!({
        "message": {"role": role, "content": content},
        "message_id": message_id,
        "redact_message": null,
        "created_at": format!("2025-11-05T10:00:{:02}.000000+00:00", message_id),
        "updated_at": format!("2025-11-05T10:00:{:02}.000000+00:00", message_id),
    });
    fs::write(
        messages_dir.join(format!("message_{}.json", message_id)),
        serde_json::to_string_pretty(&message).unwrap(),
    )
    .unwrap();
}

fn write_session(root: &Path, session_id: &str, created_at: &str, updated_at: &str) -> std::path::PathBuf {
    let session_dir = root.join(format!("session_{}", session_id));
    let agent_dir = session_dir.join("agents").join("agent_default");
    fs::create_dir_all(agent_dir.join("messages")).unwrap();

    fs::write(
        session_dir.join("session.json"),
        json!({
            "session_id": session_id,
            "session_type": "AGENT",
            "created_at": created_at,
            "updated_at": updated_at,
        })
        .to_string(),
    )
    .unwrap();
    fs::write(
        agent_dir.join("agent.json"),
        json!({"agent_id": "agent_default", "created_at": created_at}).to_string(),
    )
    .unwrap();

    agent_dir.join("messages")
}

/// Two sessions: `test_1` with four messages (one error result), `test_2` with one
pub fn write_sample_sessions(root: &Path) {
    let messages = write_session(
        root,
        "test_1",
        "2025-11-05T10:00:00.000000+00:00",
        "2025-11-05T10:05:00.000000+00:00",
    );
    write_message(&messages, 1, "user", json!([{"text": "Hello, agent!"}]));
    write_message(
        &messages,
        2,
        "assistant",
        json!([{"toolUse": {"toolUseId": "shell_1", "name": "shell", "input": {"command": "ls -la"}}}]),
    );
    write_message(
        &messages,
        3,
        "user",
        json!([{"toolResult": {
            "status": "success",
            "content": [{"text": "total 0\ndrwxr-xr-x 2 user user 4096 Nov 5 10:00 ."}],
            "toolUseId": "shell_1"
        }}]),
    );
    write_message(
        &messages,
        4,
        "user",
        json!([{"toolResult": {
            "status": "error",
            "content": [{"text": "Command failed with error"}],
            "toolUseId": "shell_2"
        }}]),
    );

    let messages = write_session(
        root,
        "test_2",
        "2025-11-05T11:00:00.000000+00:00",
        "2025-11-05T11:00:00.000000+00:00",
    );
    write_message(&messages, 1, "user", json!([{"text": "Simple message"}]));
}

pub fn message(message_id: i64, role: Role, content: Vec<ContentBlock>) -> SessionMessage {
    SessionMessage {
        message: MessageBody { role, content },
        message_id,
        redact_message: None,
        created_at: format!("2025-11-05T10:00:{:02}.000000+00:00", message_id),
        updated_at: None,
        agent_id: "agent_default".to_string(),
    }
}

/// In-memory session covering every content kind
pub fn sample_record() -> SessionRecord {
    SessionRecord {
        session_id: "test_session".to_string(),
        session_type: "AGENT".to_string(),
        created_at: "2025-11-05T10:00:00.000000+00:00".to_string(),
        updated_at: "2025-11-05T10:05:00.000000+00:00".to_string(),
        agents: Vec::new(),
        messages: vec![
            message(1, Role::User, vec![ContentBlock::text("Hello! Please list the files.")]),
            message(
                2,
                Role::Assistant,
                vec![
                    ContentBlock::text("Sure, running a command."),
                    ContentBlock::tool_use("test_1", "test_tool", json!({"arg": "value"})),
                ],
            ),
            message(
                3,
                Role::User,
                vec![ContentBlock::tool_result(
                    "test_1",
                    ToolResultStatus::Success,
                    "file_a.txt\nfile_b.txt",
                )],
            ),
            message(
                4,
                Role::Assistant,
                vec![ContentBlock::tool_use("test_2", "test_tool", json!({"arg": "other"}))],
            ),
            message(
                5,
                Role::User,
                vec![ContentBlock::tool_result(
                    "test_2",
                    ToolResultStatus::Error,
                    "Permission denied: /root/secret",
                )],
            ),
            message(6, Role::Assistant, vec![ContentBlock::text("The listing failed, café ☕.")]),
        ],
    }
}
