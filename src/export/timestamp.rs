//! Human-readable timestamps for exports

use chrono::{DateTime, NaiveDate, NaiveDateTime};

const DISPLAY_FORMAT: &str = "%Y-%m-%d %I:%M %p";

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Format an ISO-8601 timestamp as `YYYY-MM-DD hh:mm AM/PM`
///
/// Timestamps with an offset (including a trailing `Z`) are shown in their own
/// offset. Anything that does not parse is returned unchanged.
pub fn format_timestamp(timestamp: &str) -> String {
    match parse_timestamp(timestamp) {
        Some(parsed) => parsed.format(DISPLAY_FORMAT).to_string(),
        None => timestamp.to_string(),
    }
}

fn parse_timestamp(timestamp: &str) -> Option<NaiveDateTime> {
    let timestamp = timestamp.trim();
    if timestamp.is_empty() {
        return None;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(timestamp) {
        return Some(parsed.naive_local());
    }

    // RFC 3339 requires the `T`; ISO-8601 also allows a space
    let offset_form = match timestamp.strip_suffix('Z') {
        Some(rest) => format!("{}+00:00", rest),
        None => timestamp.to_string(),
    };
    if let Ok(parsed) = DateTime::parse_from_str(&offset_form, "%Y-%m-%d %H:%M:%S%.f%:z") {
        return Some(parsed.naive_local());
    }

    for format in NAIVE_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(timestamp, format) {
            return Some(parsed);
        }
    }

    NaiveDate::parse_from_str(timestamp, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}
