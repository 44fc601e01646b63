//! Plain-text export

use crate::session::{ContentBlock, SessionMessage, SessionRecord};

use super::timestamp::format_timestamp;
use super::{or_placeholder, pretty_json};

const RULE_WIDTH: usize = 80;

/// Render a session as plain text with fixed-width rules
pub fn format_text(session: &SessionRecord) -> String {
    let heavy = "=".repeat(RULE_WIDTH);
    let mut lines: Vec<String> = Vec::new();

    lines.push(heavy.clone());
    lines.push(format!("Session: {}", or_placeholder(&session.session_id, "Unknown")));
    lines.push(heavy.clone());
    lines.push(String::new());
    lines.push(format!("Type:     {}", or_placeholder(&session.session_type, "N/A")));
    lines.push(format!("Created:  {}", format_timestamp(&session.created_at)));
    lines.push(format!("Updated:  {}", format_timestamp(&session.updated_at)));
    lines.push(format!("Messages: {}", session.message_count()));
    lines.push(String::new());
    lines.push(heavy);
    lines.push(String::new());

    for message in &session.messages {
        push_message(&mut lines, message);
    }

    lines.join("\n")
}

fn push_message(lines: &mut Vec<String>, message: &SessionMessage) {
    let light = "-".repeat(RULE_WIDTH);

    lines.push(light.clone());
    lines.push(format!(
        "[{} #{}] - {}",
        message.role().as_str().to_uppercase(),
        message.message_id,
        format_timestamp(&message.created_at)
    ));
    lines.push(light);
    lines.push(String::new());

    for block in message.content() {
        match block {
            ContentBlock::Text(text) => {
                if !text.is_empty() {
                    lines.push(text.clone());
                    lines.push(String::new());
                }
            }
            ContentBlock::ToolUse(tool) => {
                lines.push(format!("[TOOL CALL: {}]", or_placeholder(&tool.name, "unknown")));
                lines.push(pretty_json(&tool.input));
                lines.push(String::new());
            }
            ContentBlock::ToolResult(result) => {
                lines.push(format!(
                    "[TOOL RESULT: {} - {}]",
                    or_placeholder(&result.tool_use_id, "unknown"),
                    result.status.as_str().to_uppercase()
                ));

                for nested in &result.content {
                    match nested {
                        ContentBlock::Text(text) if text.is_empty() => {}
                        ContentBlock::Text(text) => {
                            lines.push(text.clone());
                            lines.push(String::new());
                        }
                        other => {
                            lines.push(pretty_json(other));
                            lines.push(String::new());
                        }
                    }
                }
            }
            ContentBlock::Other(raw) => {
                lines.push("[CONTENT]".to_string());
                lines.push(pretty_json(raw));
                lines.push(String::new());
            }
        }
    }

    lines.push(String::new());
}
