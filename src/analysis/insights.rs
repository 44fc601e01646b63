//! Deterministic session insights
//!
//! Plain functions over a loaded `SessionRecord`. The analysis tools hand
//! their output to the model verbatim, and `analyze_errors` uses
//! `extract_errors` to skip the model entirely when nothing failed.

use std::collections::HashMap;

use crate::session::{ContentBlock, Role, SessionRecord};

const ERROR_TEXT_LIMIT: usize = 500;
const MESSAGE_TEXT_LIMIT: usize = 1000;
const SEARCH_CONTEXT: usize = 100;

pub const NO_ERRORS: &str = "No errors found in this session.";

/// A failed tool result
#[derive(Debug, Clone, PartialEq)]
pub struct SessionError {
    /// 1-based position in the merged timeline
    pub message_number: usize,
    pub tool_use_id: String,
    /// First text of the result, at most 500 characters
    pub error_text: String,
}

/// A search hit with surrounding text
#[derive(Debug, Clone, PartialEq)]
pub struct SearchMatch {
    pub message_number: usize,
    pub role: String,
    pub context: String,
}

/// Identity, message counts and tool activity
pub fn session_summary(session: &SessionRecord) -> String {
    let count_role = |role: Role| session.messages.iter().filter(|m| *m.role() == role).count();
    let user_msgs = count_role(Role::User);
    let assistant_msgs = count_role(Role::Assistant);

    let (tool_calls, tool_results) =
        session
            .content_blocks()
            .fold((0, 0), |(calls, results), block| match block {
                ContentBlock::ToolUse(_) => (calls + 1, results),
                ContentBlock::ToolResult(_) => (calls, results + 1),
                _ => (calls, results),
            });

    format!(
        "Session Summary:\n\
         - Session ID: {}\n\
         - Type: {}\n\
         - Created: {}\n\
         - Updated: {}\n\
         - Total Messages: {}\n\
         \x20 - User messages: {}\n\
         \x20 - Assistant messages: {}\n\
         - Tool Activity:\n\
         \x20 - Tool calls made: {}\n\
         \x20 - Tool results received: {}\n",
        or_unknown(&session.session_id),
        or_unknown(&session.session_type),
        or_unknown(&session.created_at),
        or_unknown(&session.updated_at),
        session.message_count(),
        user_msgs,
        assistant_msgs,
        tool_calls,
        tool_results,
    )
}

/// Every tool result with status `error`, in timeline order
pub fn extract_errors(session: &SessionRecord) -> Vec<SessionError> {
    let mut errors = Vec::new();

    for (index, message) in session.messages.iter().enumerate() {
        for block in message.content() {
            if let ContentBlock::ToolResult(result) = block {
                if result.is_error() {
                    let error_text = result.texts().next().unwrap_or_default();
                    errors.push(SessionError {
                        message_number: index + 1,
                        tool_use_id: if result.tool_use_id.is_empty() {
                            "unknown".to_string()
                        } else {
                            result.tool_use_id.clone()
                        },
                        error_text: truncate_chars(error_text, ERROR_TEXT_LIMIT).to_string(),
                    });
                }
            }
        }
    }

    errors
}

pub fn format_errors(errors: &[SessionError]) -> String {
    if errors.is_empty() {
        return NO_ERRORS.to_string();
    }

    let mut lines = vec![format!("Found {} error(s) in the session:\n", errors.len())];
    for (i, error) in errors.iter().enumerate() {
        lines.push(format!(
            "\nError #{}:\n- Message: #{}\n- Tool Use ID: {}\n- Error: {}",
            i + 1,
            error.message_number,
            error.tool_use_id,
            error.error_text
        ));
    }
    lines.join("\n")
}

/// Tool-use counts per tool name, most used first
pub fn tool_usage(session: &SessionRecord) -> Vec<(String, usize)> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for block in session.content_blocks() {
        if let ContentBlock::ToolUse(tool) = block {
            let name = if tool.name.is_empty() { "unknown" } else { &tool.name };
            *counts.entry(name).or_default() += 1;
        }
    }

    let mut usage: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(name, count)| (name.to_string(), count))
        .collect();
    usage.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    usage
}

pub fn format_tool_usage(usage: &[(String, usize)]) -> String {
    if usage.is_empty() {
        return "No tools were used in this session.".to_string();
    }

    let mut lines = vec!["Tool Usage Analysis:\n".to_string()];
    lines.extend(
        usage
            .iter()
            .map(|(name, count)| format!("- {}: {} call(s)", name, count)),
    );
    lines.join("\n")
}

/// Whole conversation as compact text, long texts clipped
pub fn conversation_dump(session: &SessionRecord) -> String {
    let mut lines = vec!["Complete Conversation:\n".to_string()];

    for (index, message) in session.messages.iter().enumerate() {
        lines.push(format!(
            "\nMessage #{} ({}):",
            index + 1,
            message.role().as_str().to_uppercase()
        ));

        for block in message.content() {
            match block {
                ContentBlock::Text(text) => {
                    let clipped = truncate_chars(text, MESSAGE_TEXT_LIMIT);
                    if clipped.len() < text.len() {
                        lines.push(format!("  {}... (truncated)", clipped));
                    } else {
                        lines.push(format!("  {}", text));
                    }
                }
                ContentBlock::ToolUse(tool) => {
                    let name = if tool.name.is_empty() { "unknown" } else { &tool.name };
                    lines.push(format!("  [Tool Call: {}]", name));
                }
                ContentBlock::ToolResult(result) => {
                    lines.push(format!("  [Tool Result: {}]", result.status));
                }
                ContentBlock::Other(_) => {}
            }
        }
    }

    lines.join("\n")
}

/// Case-insensitive search over message text and tool-result text
///
/// Every occurrence is reported with up to 100 characters of context on each
/// side; `...` marks a clipped end. An empty query matches nothing.
pub fn search(session: &SessionRecord, query: &str) -> Vec<SearchMatch> {
    let needle: Vec<char> = query.chars().map(fold_case).collect();
    if needle.is_empty() {
        return Vec::new();
    }

    let mut matches = Vec::new();
    for (index, message) in session.messages.iter().enumerate() {
        for block in message.content() {
            let texts: Vec<&str> = match block {
                ContentBlock::Text(text) => vec![text.as_str()],
                ContentBlock::ToolResult(result) => result.texts().collect(),
                _ => continue,
            };

            for text in texts {
                for context in match_contexts(text, &needle) {
                    matches.push(SearchMatch {
                        message_number: index + 1,
                        role: message.role().as_str().to_string(),
                        context,
                    });
                }
            }
        }
    }

    matches
}

pub fn format_search(query: &str, matches: &[SearchMatch]) -> String {
    if matches.is_empty() {
        return format!("No matches found for '{}' in session messages.", query);
    }

    let mut lines = vec![format!("Found {} match(es) for '{}':\n", matches.len(), query)];
    for m in matches {
        lines.push(format!(
            "\nMessage #{} ({}):\n  {}",
            m.message_number, m.role, m.context
        ));
    }
    lines.join("\n")
}

fn match_contexts(text: &str, needle: &[char]) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let folded: Vec<char> = chars.iter().copied().map(fold_case).collect();

    let mut contexts = Vec::new();
    let mut pos = 0;
    while pos + needle.len() <= folded.len() {
        if folded[pos..pos + needle.len()] != *needle {
            pos += 1;
            continue;
        }

        let start = pos.saturating_sub(SEARCH_CONTEXT);
        let end = (pos + needle.len() + SEARCH_CONTEXT).min(chars.len());
        let mut context: String = chars[start..end].iter().collect();
        if start > 0 {
            context.insert_str(0, "...");
        }
        if end < chars.len() {
            context.push_str("...");
        }
        contexts.push(context);

        pos += needle.len();
    }

    contexts
}

/// Single-char lowercase so folded text stays index-aligned with the original
fn fold_case(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}

fn truncate_chars(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}

fn or_unknown(value: &str) -> &str {
    if value.is_empty() {
        "Unknown"
    } else {
        value
    }
}
