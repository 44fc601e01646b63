//! Markdown export

use crate::session::{ContentBlock, Role, SessionMessage, SessionRecord, ToolResultStatus};

use super::timestamp::format_timestamp;
use super::{or_placeholder, pretty_json, title_case};

/// Render a session as a Markdown document
pub fn format_markdown(session: &SessionRecord) -> String {
    let mut lines: Vec<String> = Vec::new();

    lines.push(format!("# Session: {}", or_placeholder(&session.session_id, "Unknown")));
    lines.push(String::new());
    lines.push(format!("**Type:** {}", or_placeholder(&session.session_type, "N/A")));
    lines.push(format!("**Created:** {}", format_timestamp(&session.created_at)));
    lines.push(format!("**Updated:** {}", format_timestamp(&session.updated_at)));
    lines.push(format!("**Messages:** {}", session.message_count()));
    lines.push(String::new());
    lines.push("---".to_string());
    lines.push(String::new());

    lines.push("## Messages".to_string());
    lines.push(String::new());

    for message in &session.messages {
        push_message(&mut lines, message);
    }

    lines.join("\n")
}

fn role_icon(role: &Role) -> &'static str {
    match role {
        Role::User => "👤",
        Role::Assistant => "🤖",
        Role::System => "⚙️",
        Role::Other(_) => "💬",
    }
}

fn push_message(lines: &mut Vec<String>, message: &SessionMessage) {
    let role = message.role();

    lines.push(format!(
        "### {} {} #{}",
        role_icon(role),
        title_case(role.as_str()),
        message.message_id
    ));
    lines.push(format!("*{}*", format_timestamp(&message.created_at)));
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
                lines.push(format!(
                    "**🔧 Tool Call:** `{}`",
                    or_placeholder(&tool.name, "unknown")
                ));
                lines.push(String::new());
                push_fenced(lines, "json", &pretty_json(&tool.input));
            }
            ContentBlock::ToolResult(result) => {
                let emoji = if result.status == ToolResultStatus::Success {
                    "✅"
                } else {
                    "❌"
                };
                lines.push(format!(
                    "**{} Tool Result:** `{}`",
                    emoji,
                    or_placeholder(&result.tool_use_id, "unknown")
                ));
                lines.push(format!("*Status: {}*", result.status));
                lines.push(String::new());

                for nested in &result.content {
                    match nested {
                        ContentBlock::Text(text) if text.is_empty() => {}
                        ContentBlock::Text(text) => push_fenced(lines, "", text),
                        other => push_fenced(lines, "json", &pretty_json(other)),
                    }
                }
            }
            ContentBlock::Other(raw) => {
                lines.push("**📎 Content:**".to_string());
                lines.push(String::new());
                push_fenced(lines, "json", &pretty_json(raw));
            }
        }
    }

    lines.push("---".to_string());
    lines.push(String::new());
}

fn push_fenced(lines: &mut Vec<String>, language: &str, body: &str) {
    lines.push(format!("```{}", language));
    lines.push(body.to_string());
    lines.push("```".to_string());
    lines.push(String::new());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::testing::sample_record;

    #[test]
    fn test_format_markdown() {
        let result = format_markdown(&sample_record());

        assert!(result.contains("# Session: test_session"));
        assert!(result.contains("## Messages"));
        assert!(result.contains("**Type:** AGENT"));
        assert!(result.contains("**Created:** 2025-11-05 10:00 AM"));
        assert!(result.contains("**Messages:** 6"));
        assert!(result.contains("👤 User #1"));
        assert!(result.contains("🤖 Assistant #2"));
        assert!(result.contains("Hello! Please list the files."));
        assert!(result.contains("**🔧 Tool Call:** `test_tool`"));
    }

    #[test]
    fn test_tool_input_is_pretty_printed() {
        let result = format_markdown(&sample_record());
        assert!(result.contains("```json\n{\n  \"arg\": \"value\"\n}\n```"));
    }

    #[test]
    fn test_tool_results_labeled_by_status() {
        let result = format_markdown(&sample_record());

        assert!(result.contains("**✅ Tool Result:** `test_1`"));
        assert!(result.contains("*Status: success*"));
        assert!(result.contains("**❌ Tool Result:** `test_2`"));
        assert!(result.contains("*Status: error*"));
        assert!(result.contains("```\nPermission denied: /root/secret\n```"));
    }

    #[test]
    fn test_unknown_blocks_are_not_dropped() {
        let mut session = sample_record();
        session.messages[0]
            .message
            .content
            .push(ContentBlock::Other(serde_json::json!({"image": {"format": "png"}})));

        let result = format_markdown(&session);
        assert!(result.contains("\"format\": \"png\""));
    }

    #[test]
    fn test_messages_separated_by_rules() {
        let session = sample_record();
        let result = format_markdown(&session);
        // One rule after the header plus one per message
        assert_eq!(
            result.lines().filter(|l| *l == "---").count(),
            session.messages.len() + 1
        );
    }
}
