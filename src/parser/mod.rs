//! Line parser for log input.
//!
//! Converts one input line into a [`LogRow`]. JSON object lines are read
//! field by field with common aliases; anything else is kept as a plain
//! text row. Parsing never fails: a line the JSON path rejects falls back
//! to plain text.

use crate::model::LogRow;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::trace;

/// Raw JSON structure for a structured log line.
#[derive(Debug, Deserialize)]
struct RawLogLine {
    #[serde(default, alias = "id")]
    uid: Option<String>,
    #[serde(default, alias = "line", alias = "message", alias = "msg")]
    raw: Option<String>,
    #[serde(default, alias = "time", alias = "ts", alias = "@timestamp")]
    timestamp: Option<String>,
    #[serde(default, rename = "refId", alias = "ref_id")]
    ref_id: Option<String>,
}

/// Assigns arrival sequence numbers while parsing a stream.
///
/// Sequence numbers break timestamp ties when sorting and name plain-text
/// rows that carry no uid of their own.
#[derive(Debug, Default, Clone)]
pub struct LineParser {
    next_sequence: u64,
}

impl LineParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the next line. Blank lines yield `None` and consume no number.
    pub fn parse(&mut self, line: &str) -> Option<LogRow> {
        let row = parse_line(line, self.next_sequence)?;
        self.next_sequence += 1;
        Some(row)
    }

    /// Rows parsed so far.
    pub fn parsed(&self) -> u64 {
        self.next_sequence
    }
}

/// Parse a single line with the given arrival sequence number.
///
/// # Examples
///
/// ```
/// use logrows::parser::parse_line;
///
/// let row = parse_line(r#"{"id":"a1","msg":"started","refId":"A"}"#, 0).unwrap();
/// assert_eq!(row.uid(), "a1");
/// assert_eq!(row.raw(), "started");
/// assert_eq!(row.ref_id(), Some("A"));
///
/// let plain = parse_line("2024-05-01T10:00:00Z boot ok", 7).unwrap();
/// assert_eq!(plain.uid(), "line-7");
/// assert!(plain.timestamp().is_some());
///
/// assert!(parse_line("   ", 0).is_none());
/// ```
pub fn parse_line(line: &str, sequence: u64) -> Option<LogRow> {
    let line = line.trim_end_matches(['\r', '\n']);
    if line.trim().is_empty() {
        return None;
    }

    if line.trim_start().starts_with('{') {
        match serde_json::from_str::<RawLogLine>(line) {
            Ok(raw) => return Some(from_json(raw, line, sequence)),
            Err(err) => trace!(sequence, error = %err, "Line is not a JSON row, keeping as text"),
        }
    }

    Some(from_text(line, sequence))
}

fn from_json(raw: RawLogLine, line: &str, sequence: u64) -> LogRow {
    let uid = raw
        .uid
        .filter(|uid| !uid.is_empty())
        .unwrap_or_else(|| default_uid(sequence));
    let message = raw.raw.unwrap_or_else(|| line.to_string());

    let mut row = LogRow::new(uid, message).with_sequence(sequence);
    if let Some(timestamp) = raw.timestamp.as_deref().and_then(parse_timestamp) {
        row = row.with_timestamp(timestamp);
    }
    if let Some(ref_id) = raw.ref_id {
        row = row.with_ref_id(ref_id);
    }
    row
}

fn from_text(line: &str, sequence: u64) -> LogRow {
    let mut row = LogRow::new(default_uid(sequence), line).with_sequence(sequence);
    let leading = line.split_whitespace().next().and_then(parse_timestamp);
    if let Some(timestamp) = leading {
        row = row.with_timestamp(timestamp);
    }
    row
}

fn default_uid(sequence: u64) -> String {
    format!("line-{sequence}")
}

/// RFC 3339 timestamp, normalized to UTC.
fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|ts| ts.with_timezone(&Utc))
}
