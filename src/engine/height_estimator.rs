//! Heuristic row-height estimation.
//!
//! Estimates how many visual lines a row's message wraps to without
//! inspecting rendered layout. O(1) per row; may under- or over-estimate.

use super::types::RowHeight;
use crate::model::LogRow;
use unicode_width::UnicodeWidthStr;

/// Layout inputs shared by every row of one pass.
///
/// Used for invalidation: when these change, cached estimates may be stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LayoutParams {
    /// Viewport width in pixels.
    pub width: u32,
    /// Whether long messages wrap.
    pub wrap: bool,
}

impl LayoutParams {
    pub fn new(width: u32, wrap: bool) -> Self {
        Self { width, wrap }
    }

    /// Whether estimates made under `self` may differ under `next`.
    ///
    /// With wrapping off on both sides every row is one baseline line,
    /// regardless of width.
    pub fn invalidated_by(&self, next: &LayoutParams) -> bool {
        if !self.wrap && !next.wrap {
            return false;
        }
        self != next
    }
}

/// Pixel metrics the estimator works from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EstimatorMetrics {
    /// Height of one visual line.
    pub line_height: u32,
    /// Average width of one character column.
    pub char_width: f64,
    /// Horizontal space taken by everything but the message.
    pub margins: u32,
}

impl EstimatorMetrics {
    /// Metrics for a character grid: one cell per pixel, `gutter` cells of
    /// row decoration before the message.
    pub fn terminal(gutter: u32) -> Self {
        Self {
            line_height: 1,
            char_width: 1.0,
            margins: gutter,
        }
    }
}

impl Default for EstimatorMetrics {
    /// Browser-like defaults for a monospace log table.
    fn default() -> Self {
        Self {
            line_height: 20,
            char_width: 7.34,
            margins: 310,
        }
    }
}

/// Estimates row heights from message length and viewport width.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HeightEstimator {
    metrics: EstimatorMetrics,
}

impl HeightEstimator {
    pub fn new(metrics: EstimatorMetrics) -> Self {
        Self { metrics }
    }

    pub fn metrics(&self) -> &EstimatorMetrics {
        &self.metrics
    }

    /// Height of one unwrapped row.
    pub fn baseline(&self) -> RowHeight {
        RowHeight::new(self.metrics.line_height)
    }

    /// Estimated height of `row` under `params`.
    ///
    /// Without wrapping, or when the margins leave no usable width, this is
    /// the baseline. Otherwise `ceil(columns * char_width / usable_width)`
    /// lines, at least one.
    pub fn estimate(&self, row: &LogRow, params: LayoutParams) -> RowHeight {
        if !params.wrap {
            return self.baseline();
        }

        let usable = params.width.saturating_sub(self.metrics.margins);
        if usable == 0 {
            return self.baseline();
        }

        let columns = row.raw().width() as f64;
        let lines = ((columns * self.metrics.char_width) / f64::from(usable)).ceil();
        let lines = (lines as u32).max(1);
        RowHeight::new(lines.saturating_mul(self.metrics.line_height))
    }
}
