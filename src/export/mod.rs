//! Session export
//!
//! Pure rendering of a `SessionRecord` into Markdown, JSON or plain text,
//! plus the download filename and content type for each format.
//!
//! Format names are parsed once into `ExportFormat`; both rendering and
//! filename generation take the parsed value, so an unknown name is rejected
//! the same way everywhere.

mod markdown;
mod text;
mod timestamp;

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::core::{ViewerError, ViewerResult};
use crate::session::SessionRecord;

pub use markdown::format_markdown;
pub use text::format_text;
pub use timestamp::format_timestamp;

/// Supported export formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    Markdown,
    Json,
    Text,
}

impl ExportFormat {
    /// All formats, in the order they are offered to users
    pub const ALL: [ExportFormat; 3] = [ExportFormat::Markdown, ExportFormat::Json, ExportFormat::Text];

    /// Name used in URLs and on the command line
    pub fn name(self) -> &'static str {
        match self {
            ExportFormat::Markdown => "markdown",
            ExportFormat::Json => "json",
            ExportFormat::Text => "text",
        }
    }

    /// File extension for downloads
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Markdown => "md",
            ExportFormat::Json => "json",
            ExportFormat::Text => "txt",
        }
    }

    /// HTTP content type
    pub fn content_type(self) -> &'static str {
        match self {
            ExportFormat::Markdown => "text/markdown; charset=utf-8",
            ExportFormat::Json => "application/json",
            ExportFormat::Text => "text/plain; charset=utf-8",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ViewerError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        ExportFormat::ALL
            .into_iter()
            .find(|format| format.name() == name)
            .ok_or_else(|| ViewerError::UnsupportedFormat(name.to_string()))
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Render a session in the given format
pub fn format_session(session: &SessionRecord, format: ExportFormat) -> ViewerResult<String> {
    match format {
        ExportFormat::Markdown => Ok(format_markdown(session)),
        ExportFormat::Json => format_json(session),
        ExportFormat::Text => Ok(format_text(session)),
    }
}

/// Render a session by format name
///
/// Fails with `ViewerError::UnsupportedFormat` for unknown names.
pub fn render(session: &SessionRecord, format_name: &str) -> ViewerResult<String> {
    format_session(session, format_name.parse()?)
}

/// Pretty-printed JSON with two-space indent; non-ASCII is written as-is
pub fn format_json(session: &SessionRecord) -> ViewerResult<String> {
    Ok(serde_json::to_string_pretty(session)?)
}

/// Download filename: `session_<id>.<ext>`
pub fn export_filename(session_id: &str, format: ExportFormat) -> String {
    format!("session_{}.{}", session_id, format.extension())
}

pub(crate) fn pretty_json<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| format!("<unserializable: {}>", e))
}

pub(crate) fn or_placeholder<'a>(value: &'a str, placeholder: &'a str) -> &'a str {
    if value.is_empty() {
        placeholder
    } else {
        value
    }
}

/// Capitalize the first letter of every alphabetic run ("tool_call" -> "Tool_Call")
pub(crate) fn title_case(value: &str) -> String {
    let mut titled = String::with_capacity(value.len());
    let mut at_word_start = true;

    for c in value.chars() {
        if c.is_alphabetic() {
            if at_word_start {
                titled.extend(c.to_uppercase());
            } else {
                titled.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            titled.push(c);
            at_word_start = true;
        }
    }

    titled
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::testing::sample_record;

    #[test]
    fn test_format_json_round_trip() {
        let session = sample_record();
        let result = format_session(&session, ExportFormat::Json).unwrap();

        let parsed: SessionRecord = serde_json::from_str(&result).unwrap();
        assert_eq!(parsed, session);
    }

    #[test]
    fn test_format_json_layout() {
        let result = format_json(&sample_record()).unwrap();

        assert!(result.starts_with("{\n  \"session_id\": \"test_session\""));
        assert!(result.contains("café ☕"));
    }

    #[test]
    fn test_every_text_block_survives() {
        let session = sample_record();

        for format in [ExportFormat::Markdown, ExportFormat::Text] {
            let rendered = format_session(&session, format).unwrap();
            assert!(rendered.contains(&session.session_id));
            assert!(rendered.contains(&session.message_count().to_string()));

            for block in session.content_blocks() {
                if let Some(text) = block.as_text() {
                    assert!(rendered.contains(text), "{} missing {:?}", format, text);
                }
            }
        }
    }

    #[test]
    fn test_render_by_name() {
        let session = sample_record();
        assert!(render(&session, "markdown").unwrap().contains("# Session: test_session"));
        assert!(render(&session, "text").unwrap().contains("Session: test_session"));
    }

    #[test]
    fn test_invalid_format() {
        let err = render(&sample_record(), "bogus").unwrap_err();
        assert!(matches!(err, ViewerError::UnsupportedFormat(ref name) if name == "bogus"));
        assert!(err.to_string().contains("Unsupported format"));
    }

    #[test]
    fn test_get_filename() {
        assert_eq!(export_filename("test", ExportFormat::Markdown), "session_test.md");
        assert_eq!(export_filename("test", ExportFormat::Json), "session_test.json");
        assert_eq!(export_filename("test", ExportFormat::Text), "session_test.txt");
        assert!("invalid".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("user"), "User");
        assert_eq!(title_case("tool_call"), "Tool_Call");
        assert_eq!(title_case("ASSISTANT"), "Assistant");
    }
}
