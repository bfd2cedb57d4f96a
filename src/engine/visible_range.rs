//! Visible range calculation result

use super::types::{RenderKey, RowHeight, RowIndex};

/// One row the renderer should paint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualItem {
    pub index: RowIndex,
    pub key: RenderKey,
    /// Top edge, in pixels from the start of the content.
    pub offset: usize,
    pub height: RowHeight,
}

impl VirtualItem {
    /// Bottom edge (exclusive).
    pub fn end(&self) -> usize {
        self.offset + self.height.get() as usize
    }
}

/// Rows visible in the current viewport, plus the overscanned slice to paint.
///
/// # Invariants
/// - `overscan_start <= start_index <= end_index <= overscan_end <= len`
/// - `items` holds exactly the rows in `[overscan_start, overscan_end)`, in
///   order, with non-decreasing offsets
/// - rows in `[start_index, end_index)` cover
///   `[scroll_offset, scroll_offset + viewport_height)` (or all content,
///   when it is shorter than the viewport)
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VisibleRange {
    /// First visible row (inclusive).
    pub start_index: RowIndex,
    /// Last visible row (exclusive).
    pub end_index: RowIndex,
    /// First rendered row, including overscan.
    pub overscan_start: RowIndex,
    /// Last rendered row (exclusive), including overscan.
    pub overscan_end: RowIndex,
    /// Scroll offset actually used, after clamping.
    pub scroll_offset: usize,
    pub viewport_height: u32,
    /// Rendered rows with keys and positions.
    pub items: Vec<VirtualItem>,
}

impl VisibleRange {
    /// Number of visible rows (without overscan).
    pub fn len(&self) -> usize {
        self.end_index.get() - self.start_index.get()
    }

    pub fn is_empty(&self) -> bool {
        self.start_index == self.end_index
    }

    /// Visible row indices (without overscan).
    pub fn indices(&self) -> impl Iterator<Item = RowIndex> {
        (self.start_index.get()..self.end_index.get()).map(RowIndex::new)
    }

    /// Whether a row is visible (overscan rows are not).
    pub fn contains(&self, index: RowIndex) -> bool {
        index >= self.start_index && index < self.end_index
    }

    /// Rendered item for a row, if it is in the painted slice.
    pub fn item(&self, index: RowIndex) -> Option<&VirtualItem> {
        let first = self.overscan_start.get();
        index
            .get()
            .checked_sub(first)
            .and_then(|pos| self.items.get(pos))
    }

    /// Rendered item covering content pixel `y`.
    pub fn item_at(&self, y: usize) -> Option<&VirtualItem> {
        let pos = self.items.partition_point(|item| item.end() <= y);
        self.items.get(pos).filter(|item| item.offset <= y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(index: usize, offset: usize, height: u32) -> VirtualItem {
        VirtualItem {
            index: RowIndex::new(index),
            key: RenderKey::new(format!("k{index}")),
            offset,
            height: RowHeight::new(height),
        }
    }

    fn range(start: usize, end: usize) -> VisibleRange {
        VisibleRange {
            start_index: RowIndex::new(start),
            end_index: RowIndex::new(end),
            overscan_start: RowIndex::new(start.saturating_sub(1)),
            overscan_end: RowIndex::new(end + 1),
            scroll_offset: 0,
            viewport_height: 24,
            items: (start.saturating_sub(1)..end + 1)
                .map(|i| item(i, i * 10, 10))
                .collect(),
        }
    }

    #[test]
    fn default_is_empty_at_zero() {
        let range = VisibleRange::default();
        assert!(range.is_empty());
        assert_eq!(range.len(), 0);
        assert!(range.items.is_empty());
    }

    #[test]
    fn len_and_indices_exclude_overscan() {
        let range = range(5, 8);
        assert_eq!(range.len(), 3);
        let indices: Vec<_> = range.indices().map(|i| i.get()).collect();
        assert_eq!(indices, vec![5, 6, 7]);
        assert_eq!(range.items.len(), 5);
    }

    #[test]
    fn contains_is_end_exclusive() {
        let range = range(5, 8);
        assert!(range.contains(RowIndex::new(5)));
        assert!(range.contains(RowIndex::new(7)));
        assert!(!range.contains(RowIndex::new(8)));
        assert!(!range.contains(RowIndex::new(4)));
    }

    #[test]
    fn item_looks_up_overscanned_rows() {
        let range = range(5, 8);
        assert_eq!(range.item(RowIndex::new(4)).map(|i| i.offset), Some(40));
        assert_eq!(range.item(RowIndex::new(8)).map(|i| i.offset), Some(80));
        assert!(range.item(RowIndex::new(3)).is_none());
        assert!(range.item(RowIndex::new(9)).is_none());
    }

    #[test]
    fn item_at_finds_row_by_pixel() {
        let range = range(5, 8);
        assert_eq!(range.item_at(40).map(|i| i.index.get()), Some(4));
        assert_eq!(range.item_at(59).map(|i| i.index.get()), Some(5));
        assert_eq!(range.item_at(60).map(|i| i.index.get()), Some(6));
        assert!(range.item_at(39).is_none());
        assert!(range.item_at(90).is_none());
    }
}
