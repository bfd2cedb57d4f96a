//! WindowEngine - maps a scroll offset to the slice of rows to render
//!
//! Heights come from the [`HeightEstimator`] and are measured lazily: the
//! cumulative-height table only grows as far as the viewport (plus
//! overscan) has ever reached. Render keys are assigned along the same
//! frontier by one [`KeyMaker`] per sequence.
//!
//! # Invalidation
//! - New sequence: table, keys and key counters are replaced wholesale.
//! - Layout change (width / wrap): heights are dropped, keys survive.
//! - Observed height differing from the estimate: that one row is updated
//!   in place; the Fenwick tree shifts every later offset.

use super::height_estimator::{HeightEstimator, LayoutParams};
use super::height_index::HeightIndex;
use super::key_maker::KeyMaker;
use super::pipeline::OrderedSequence;
use super::types::{RenderKey, RowHeight, RowIndex};
use super::visible_range::{VirtualItem, VisibleRange};
use tracing::debug;

/// Rows rendered above and below the visible range by default.
pub const DEFAULT_OVERSCAN: usize = 2;

/// Virtualized windowing over one ordered sequence.
#[derive(Debug)]
pub struct WindowEngine {
    estimator: HeightEstimator,
    overscan: usize,
    sequence: OrderedSequence,
    params: LayoutParams,
    heights: HeightIndex,
    keys: Vec<RenderKey>,
    key_maker: KeyMaker,
}

impl WindowEngine {
    pub fn new(estimator: HeightEstimator, overscan: usize) -> Self {
        Self {
            estimator,
            overscan,
            sequence: OrderedSequence::empty(),
            params: LayoutParams::default(),
            heights: HeightIndex::default(),
            keys: Vec::new(),
            key_maker: KeyMaker::new(),
        }
    }

    pub fn sequence(&self) -> &OrderedSequence {
        &self.sequence
    }

    pub fn params(&self) -> LayoutParams {
        self.params
    }

    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    /// Rows whose height has been estimated so far.
    pub fn measured_len(&self) -> usize {
        self.heights.len()
    }

    /// Install the sequence to render.
    ///
    /// Returns `false` (and keeps all cached state) when it is the same
    /// sequence as before.
    pub fn set_sequence(&mut self, sequence: OrderedSequence) -> bool {
        if self.sequence.same_as(&sequence) {
            return false;
        }

        debug!(
            old_len = self.sequence.len(),
            new_len = sequence.len(),
            "Replacing window sequence"
        );
        self.sequence = sequence;
        self.heights.clear();
        self.keys.clear();
        self.key_maker.clear();
        true
    }

    /// Update width / wrap. Returns whether estimates were invalidated.
    pub fn set_layout(&mut self, params: LayoutParams) -> bool {
        let invalidated = self.params.invalidated_by(&params);
        self.params = params;
        if invalidated {
            debug!(
                width = params.width,
                wrap = params.wrap,
                measured = self.heights.len(),
                "Layout changed, invalidating height table"
            );
            self.heights.clear();
        }
        invalidated
    }

    /// Drop estimates from `index` onward; they are re-estimated on demand.
    pub fn invalidate_from(&mut self, index: RowIndex) {
        self.heights.truncate(index.get());
    }

    /// Feed back a height measured by the renderer.
    ///
    /// Returns whether the table changed. Rows not yet estimated are
    /// measured first so the correction lands on the right offset.
    pub fn observe_height(&mut self, index: RowIndex, height: RowHeight) -> bool {
        let idx = index.get();
        if idx >= self.len() {
            return false;
        }
        self.measure_until(idx + 1);
        if self.heights.height(idx) == height.get() {
            return false;
        }
        self.heights.set(idx, height.get());
        true
    }

    /// Estimated height of a row.
    pub fn row_height(&mut self, index: RowIndex) -> Option<RowHeight> {
        let idx = index.get();
        if idx >= self.len() {
            return None;
        }
        self.measure_until(idx + 1);
        Some(RowHeight::new(self.heights.height(idx)))
    }

    /// Render key of a row.
    pub fn item_key(&mut self, index: RowIndex) -> Option<RenderKey> {
        let idx = index.get();
        if idx >= self.len() {
            return None;
        }
        self.key_until(idx + 1);
        self.keys.get(idx).cloned()
    }

    /// Top offset of a row in pixels.
    pub fn offset_of(&mut self, index: RowIndex) -> Option<usize> {
        let idx = index.get();
        if idx >= self.len() {
            return None;
        }
        self.measure_until(idx + 1);
        Some(self.heights.offset_of(idx))
    }

    /// First row whose uid matches, for scrolling a permalinked row into view.
    pub fn find_uid(&self, uid: &str) -> Option<RowIndex> {
        self.sequence
            .rows()
            .iter()
            .position(|row| row.uid() == uid)
            .map(RowIndex::new)
    }

    /// Average measured height, or the baseline before anything is measured.
    pub fn estimated_row_height(&self) -> usize {
        if self.heights.is_empty() {
            self.estimator.baseline().get() as usize
        } else {
            self.heights.total().div_ceil(self.heights.len())
        }
    }

    /// Content height: measured rows exactly, the rest at the running average.
    pub fn total_height(&self) -> usize {
        let unmeasured = self.len() - self.heights.len();
        self.heights.total() + unmeasured * self.estimated_row_height()
    }

    /// Compute the visible and overscanned ranges for a scroll position.
    ///
    /// The scroll offset is clamped once the content is known to end inside
    /// the viewport, so a viewport taller than the content shows every row
    /// from the top.
    pub fn compute_visible_range(&mut self, scroll_offset: usize, viewport_height: u32) -> VisibleRange {
        if self.is_empty() || viewport_height == 0 {
            return VisibleRange {
                viewport_height,
                ..VisibleRange::default()
            };
        }

        let viewport = viewport_height as usize;
        let mut scroll = scroll_offset;
        self.measure_covering(scroll.saturating_add(viewport));

        if self.heights.len() == self.len() {
            let max_scroll = self.heights.total().saturating_sub(viewport);
            scroll = scroll.min(max_scroll);
        }
        let bottom = scroll.saturating_add(viewport);

        let len = self.len();
        let start = self.heights.lower_bound(scroll).unwrap_or(len);
        let end = self
            .heights
            .lower_bound(bottom - 1)
            .map_or(len, |last| last + 1);

        let overscan_start = start.saturating_sub(self.overscan);
        let overscan_end = (end + self.overscan).min(len);
        self.measure_until(overscan_end);
        self.key_until(overscan_end);

        let items = (overscan_start..overscan_end)
            .map(|idx| VirtualItem {
                index: RowIndex::new(idx),
                key: self.keys[idx].clone(),
                offset: self.heights.offset_of(idx),
                height: RowHeight::new(self.heights.height(idx)),
            })
            .collect();

        VisibleRange {
            start_index: RowIndex::new(start),
            end_index: RowIndex::new(end),
            overscan_start: RowIndex::new(overscan_start),
            overscan_end: RowIndex::new(overscan_end),
            scroll_offset: scroll,
            viewport_height,
            items,
        }
    }

    /// Estimate rows until `[0, upto)` is in the table.
    fn measure_until(&mut self, upto: usize) {
        let upto = upto.min(self.len());
        while self.heights.len() < upto {
            let idx = self.heights.len();
            let height = self.estimator.estimate(&self.sequence.rows()[idx], self.params);
            self.heights.push(height.get());
        }
    }

    /// Estimate rows until the table extends past pixel `offset` (or ends).
    fn measure_covering(&mut self, offset: usize) {
        while self.heights.len() < self.len() && self.heights.total() <= offset {
            let idx = self.heights.len();
            let height = self.estimator.estimate(&self.sequence.rows()[idx], self.params);
            self.heights.push(height.get());
        }
    }

    /// Assign keys until `[0, upto)` is keyed.
    fn key_until(&mut self, upto: usize) {
        let upto = upto.min(self.len());
        while self.keys.len() < upto {
            let key = self.key_maker.get_key(self.sequence.rows()[self.keys.len()].uid());
            self.keys.push(key);
        }
    }
}

#[cfg(test)]
#[path = "window_tests.rs"]
mod tests;
