//! On-disk session fixtures for integration tests

use std::fs;
use std::path::Path;

use serde_json::{json, Value};
use tempfile::TempDir;

fn write_session(root: &Path, session_id: &str, updated_at: &str, messages: &[(i64, &str, Value)]) {
    let session_dir = root.join(format!("session_{}", session_id));
    let messages_dir = session_dir.join("agents/agent_default/messages");
    fs::create_dir_all(&messages_dir).unwrap();

    fs::write(
        session_dir.join("session.json"),
        json!({
            "session_id": session_id,
            "session_type": "AGENT",
            "created_at": "2025-11-05T10:00:00.000000+00:00",
            "updated_at": updated_at,
        })
        .to_string(),
    )
    .unwrap();
    fs::write(
        session_dir.join("agents/agent_default/agent.json"),
        json!({"agent_id": "agent_default", "created_at": "2025-11-05T10:00:00.000000+00:00"})
            .to_string(),
    )
    .unwrap();

    for (message_id, role, content) in messages {
        let message = json!({
            "message": {"role": role, "content": content},
            "message_id": message_id,
            "created_at": format!("2025-11-05T10:00:{:02}.000000+00:00", message_id),
        });
        fs::write(
            messages_dir.join(format!("message_{}.json", message_id)),
            message.to_string(),
        )
        .unwrap();
    }
}

/// `test_1` has four messages ending in a failed tool result; `test_2` has one.
pub fn sample_storage() -> TempDir {
    let temp = TempDir::new().unwrap();

    write_session(
        temp.path(),
        "test_1",
        "2025-11-05T10:05:00.000000+00:00",
        &[
            (1, "user", json!([{"text": "Hello, agent!"}])),
            (
                2,
                "assistant",
                json!([{"toolUse": {"toolUseId": "shell_1", "name": "shell", "input": {"command": "ls -la"}}}]),
            ),
            (
                3,
                "user",
                json!([{"toolResult": {"toolUseId": "shell_1", "status": "success", "content": [{"text": "total 0"}]}}]),
            ),
            (
                4,
                "user",
                json!([{"toolResult": {"toolUseId": "shell_2", "status": "error", "content": [{"text": "Command failed with error"}]}}]),
            ),
        ],
    );
    write_session(
        temp.path(),
        "test_2",
        "2025-11-05T11:00:00.000000+00:00",
        &[(1, "user", json!([{"text": "Simple message"}]))],
    );

    temp
}
