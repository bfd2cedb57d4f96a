//! Log row value type and the selectors that drive the row pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One log entry as delivered by the upstream data source.
///
/// Rows are immutable once built. The pipeline produces copies with an
/// updated `duplicates` count rather than mutating the caller's batch.
///
/// `uid` is the logical identity and is NOT guaranteed unique within a
/// batch; render keys are derived separately (see `engine::key_maker`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRow {
    uid: String,
    raw: String,
    #[serde(default)]
    timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    sequence: u64,
    #[serde(default)]
    duplicates: usize,
    #[serde(default)]
    ref_id: Option<String>,
}

impl LogRow {
    /// Create a row with no timestamp and sequence 0.
    pub fn new(uid: impl Into<String>, raw: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            raw: raw.into(),
            timestamp: None,
            sequence: 0,
            duplicates: 0,
            ref_id: None,
        }
    }

    /// Builder: set the row timestamp.
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Builder: set the arrival sequence number (sort tie-breaker).
    pub fn with_sequence(mut self, sequence: u64) -> Self {
        self.sequence = sequence;
        self
    }

    /// Builder: set the id of the query that produced this row.
    pub fn with_ref_id(mut self, ref_id: impl Into<String>) -> Self {
        self.ref_id = Some(ref_id.into());
        self
    }

    pub(crate) fn with_duplicates(mut self, duplicates: usize) -> Self {
        self.duplicates = duplicates;
        self
    }

    pub fn uid(&self) -> &str {
        &self.uid
    }

    /// Raw message text.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.timestamp
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Number of following rows collapsed into this one by dedup.
    pub fn duplicates(&self) -> usize {
        self.duplicates
    }

    pub fn ref_id(&self) -> Option<&str> {
        self.ref_id.as_deref()
    }
}

/// Error returned when parsing one of the selector enums from text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} '{value}' (expected one of: {expected})")]
pub struct UnknownVariant {
    kind: &'static str,
    value: String,
    expected: &'static str,
}

/// Policy for collapsing consecutive repeated rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DedupStrategy {
    /// Rows are shown as delivered.
    #[default]
    None,
    /// Messages equal once ISO-8601 timestamps are removed.
    Exact,
    /// Messages equal once all digits are removed.
    Numbers,
    /// Messages equal once all word characters are removed.
    Signature,
}

impl DedupStrategy {
    pub const ALL: [DedupStrategy; 4] = [
        DedupStrategy::None,
        DedupStrategy::Exact,
        DedupStrategy::Numbers,
        DedupStrategy::Signature,
    ];

    /// Next strategy in display order, wrapping around.
    pub fn cycle(self) -> Self {
        match self {
            DedupStrategy::None => DedupStrategy::Exact,
            DedupStrategy::Exact => DedupStrategy::Numbers,
            DedupStrategy::Numbers => DedupStrategy::Signature,
            DedupStrategy::Signature => DedupStrategy::None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DedupStrategy::None => "none",
            DedupStrategy::Exact => "exact",
            DedupStrategy::Numbers => "numbers",
            DedupStrategy::Signature => "signature",
        }
    }
}

impl fmt::Display for DedupStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DedupStrategy {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|strategy| strategy.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownVariant {
                kind: "dedup strategy",
                value: s.to_string(),
                expected: "none, exact, numbers, signature",
            })
    }
}

/// Chronological ordering of the rendered sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl SortOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::Ascending => "ascending",
            SortOrder::Descending => "descending",
        }
    }

    pub fn reversed(self) -> Self {
        match self {
            SortOrder::Ascending => SortOrder::Descending,
            SortOrder::Descending => SortOrder::Ascending,
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOrder {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ascending" | "asc" => Ok(SortOrder::Ascending),
            "descending" | "desc" => Ok(SortOrder::Descending),
            _ => Err(UnknownVariant {
                kind: "sort order",
                value: s.to_string(),
                expected: "ascending, descending",
            }),
        }
    }
}

/// Execution context the rows are rendered in.
///
/// The selection popover is only offered in `Explore`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CoreApp {
    #[default]
    Explore,
    Dashboard,
    PanelEditor,
    Unknown,
}

impl FromStr for CoreApp {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "explore" => Ok(CoreApp::Explore),
            "dashboard" => Ok(CoreApp::Dashboard),
            "panel-editor" => Ok(CoreApp::PanelEditor),
            "unknown" => Ok(CoreApp::Unknown),
            _ => Err(UnknownVariant {
                kind: "app",
                value: s.to_string(),
                expected: "explore, dashboard, panel-editor, unknown",
            }),
        }
    }
}
