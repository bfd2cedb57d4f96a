//! Line filters fed by the popover actions.
//!
//! The host stands in for the data layer: "filter for value" and "filter
//! out value" narrow the batch it hands to the rows component.

use crate::engine::RowBatch;
use crate::model::LogRow;
use std::sync::Arc;

/// Substring filters over row messages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowFilter {
    include: Vec<String>,
    exclude: Vec<String>,
}

impl RowFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep only rows whose message contains `value`. Returns false if the
    /// filter was already present.
    pub fn include(&mut self, value: &str) -> bool {
        push_unique(&mut self.include, value)
    }

    /// Drop rows whose message contains `value`.
    pub fn exclude(&mut self, value: &str) -> bool {
        push_unique(&mut self.exclude, value)
    }

    pub fn clear(&mut self) {
        self.include.clear();
        self.exclude.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.include.is_empty() && self.exclude.is_empty()
    }

    pub fn matches(&self, row: &LogRow) -> bool {
        let raw = row.raw();
        self.include.iter().all(|value| raw.contains(value.as_str()))
            && !self.exclude.iter().any(|value| raw.contains(value.as_str()))
    }

    /// A fresh batch with the matching rows, in input order.
    pub fn apply(&self, rows: &[LogRow]) -> RowBatch {
        if self.is_empty() {
            return Arc::from(rows);
        }
        rows.iter()
            .filter(|row| self.matches(row))
            .cloned()
            .collect::<Vec<_>>()
            .into()
    }

    /// Short form for the status line, e.g. `+"disk" -"retry"`.
    pub fn summary(&self) -> String {
        let include = self.include.iter().map(|value| format!("+{value:?}"));
        let exclude = self.exclude.iter().map(|value| format!("-{value:?}"));
        include.chain(exclude).collect::<Vec<_>>().join(" ")
    }
}

fn push_unique(values: &mut Vec<String>, value: &str) -> bool {
    if value.is_empty() || values.iter().any(|existing| existing == value) {
        return false;
    }
    values.push(value.to_string());
    true
}
