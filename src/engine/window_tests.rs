//! Tests for the window engine.

use super::*;
use crate::engine::height_estimator::EstimatorMetrics;
use crate::engine::pipeline::DedupSortPipeline;
use crate::model::{DedupStrategy, LogRow};
use proptest::prelude::*;
use std::sync::Arc;

fn sequence_of(messages: &[&str]) -> OrderedSequence {
    let rows: Vec<LogRow> = messages
        .iter()
        .enumerate()
        .map(|(i, msg)| LogRow::new(format!("row-{i}"), *msg))
        .collect();
    DedupSortPipeline::new().process(&Arc::from(rows), DedupStrategy::None, None)
}

fn uniform(count: usize) -> OrderedSequence {
    let messages = vec!["line"; count];
    sequence_of(&messages)
}

/// Terminal metrics: one line per row when not wrapping.
fn engine(overscan: usize) -> WindowEngine {
    WindowEngine::new(HeightEstimator::new(EstimatorMetrics::terminal(0)), overscan)
}

// ===== compute_visible_range =====

#[test]
fn empty_sequence_yields_empty_range() {
    let mut window = engine(2);
    let range = window.compute_visible_range(0, 10);
    assert!(range.is_empty());
    assert!(range.items.is_empty());
    assert_eq!(window.total_height(), 0);
}

#[test]
fn zero_viewport_yields_empty_range() {
    let mut window = engine(2);
    window.set_sequence(uniform(10));
    let range = window.compute_visible_range(0, 0);
    assert!(range.items.is_empty());
    assert_eq!(window.measured_len(), 0);
}

#[test]
fn top_of_list_with_overscan() {
    let mut window = engine(2);
    window.set_sequence(uniform(100));

    let range = window.compute_visible_range(0, 10);

    assert_eq!(range.start_index.get(), 0);
    assert_eq!(range.end_index.get(), 10);
    assert_eq!(range.overscan_start.get(), 0);
    assert_eq!(range.overscan_end.get(), 12);
    assert_eq!(range.items.len(), 12);
}

#[test]
fn middle_of_list_overscans_both_sides() {
    let mut window = engine(2);
    window.set_sequence(uniform(100));

    let range = window.compute_visible_range(50, 10);

    assert_eq!(range.start_index.get(), 50);
    assert_eq!(range.end_index.get(), 60);
    assert_eq!(range.overscan_start.get(), 48);
    assert_eq!(range.overscan_end.get(), 62);
    assert_eq!(range.items[0].offset, 48);
}

#[test]
fn partial_row_at_top_is_visible() {
    let mut window = engine(0);
    let long = "x".repeat(30);
    window.set_sequence(sequence_of(&[&long, &long, &long]));
    window.set_layout(LayoutParams::new(10, true));

    // Rows are 3 lines tall; scrolling 4 cuts into row 1.
    let range = window.compute_visible_range(4, 3);

    assert_eq!(range.start_index.get(), 1);
    assert_eq!(range.end_index.get(), 3);
}

#[test]
fn viewport_taller_than_content_shows_everything() {
    let mut window = engine(2);
    window.set_sequence(uniform(5));

    let range = window.compute_visible_range(0, 50);

    assert_eq!(range.start_index.get(), 0);
    assert_eq!(range.end_index.get(), 5);
    assert_eq!(range.overscan_end.get(), 5);
    assert_eq!(window.total_height(), 5);
}

#[test]
fn scroll_past_end_is_clamped() {
    let mut window = engine(0);
    window.set_sequence(uniform(20));

    let range = window.compute_visible_range(10_000, 5);

    assert_eq!(range.scroll_offset, 15);
    assert_eq!(range.start_index.get(), 15);
    assert_eq!(range.end_index.get(), 20);
}

#[test]
fn huge_scroll_offset_does_not_overflow() {
    let mut window = engine(1);
    window.set_sequence(uniform(3));
    let range = window.compute_visible_range(usize::MAX, u32::MAX);
    assert_eq!(range.scroll_offset, 0);
    assert_eq!(range.end_index.get(), 3);
}

#[test]
fn items_carry_keys_offsets_and_heights() {
    let mut window = engine(0);
    window.set_sequence(sequence_of(&["a", "b", "c"]));

    let range = window.compute_visible_range(0, 3);

    let keys: Vec<_> = range.items.iter().map(|item| item.key.as_str()).collect();
    assert_eq!(keys, vec!["row-0", "row-1", "row-2"]);
    let offsets: Vec<_> = range.items.iter().map(|item| item.offset).collect();
    assert_eq!(offsets, vec![0, 1, 2]);
    assert!(range.items.iter().all(|item| item.height.get() == 1));
}

// ===== Lazy measurement =====

#[test]
fn only_reached_rows_are_measured() {
    let mut window = engine(2);
    window.set_sequence(uniform(10_000));

    window.compute_visible_range(0, 20);

    assert!(window.measured_len() <= 23);
    assert!(window.measured_len() >= 22);
}

#[test]
fn total_height_extrapolates_average() {
    let mut window = engine(0);
    let long = "x".repeat(20);
    // Alternating 1- and 2-line rows at width 10.
    let messages: Vec<&str> = (0..100)
        .map(|i| if i % 2 == 0 { "short" } else { long.as_str() })
        .collect();
    window.set_sequence(sequence_of(&messages));
    window.set_layout(LayoutParams::new(10, true));

    window.compute_visible_range(0, 6);
    let measured = window.measured_len();
    assert!(measured < 100);

    // Measured prefix averages 1.5 lines, rounded up.
    let total = window.total_height();
    assert!(total >= 150);
    assert!(total <= 200);
}

#[test]
fn total_height_is_exact_once_fully_measured() {
    let mut window = engine(0);
    window.set_sequence(uniform(40));
    window.compute_visible_range(usize::MAX, 10);
    assert_eq!(window.measured_len(), 40);
    assert_eq!(window.total_height(), 40);
}

#[test]
fn offset_of_measures_on_demand() {
    let mut window = engine(0);
    window.set_sequence(uniform(50));
    assert_eq!(window.offset_of(RowIndex::new(30)), Some(30));
    assert_eq!(window.measured_len(), 31);
    assert_eq!(window.offset_of(RowIndex::new(50)), None);
}

// ===== Keys =====

#[test]
fn repeated_uids_get_suffixed_keys() {
    let rows: Vec<LogRow> = ["same", "same", "other", "same"]
        .iter()
        .map(|uid| LogRow::new(*uid, "msg"))
        .collect();
    let sequence = DedupSortPipeline::new().process(&Arc::from(rows), DedupStrategy::None, None);
    let mut window = engine(0);
    window.set_sequence(sequence);

    let keys: Vec<_> = (0..4)
        .filter_map(|i| window.item_key(RowIndex::new(i)))
        .map(|key| key.as_str().to_string())
        .collect();
    assert_eq!(keys, vec!["same", "same_1", "other", "same_2"]);
}

#[test]
fn keys_are_stable_across_scrolls() {
    let mut window = engine(2);
    window.set_sequence(uniform(100));

    let first = window.compute_visible_range(40, 10);
    window.compute_visible_range(0, 10);
    let again = window.compute_visible_range(40, 10);

    assert_eq!(first.items, again.items);
}

#[test]
fn keys_survive_layout_change() {
    let mut window = engine(0);
    window.set_sequence(uniform(10));
    let before = window.item_key(RowIndex::new(3));

    window.set_layout(LayoutParams::new(4, true));

    assert_eq!(window.item_key(RowIndex::new(3)), before);
}

#[test]
fn item_key_out_of_range_is_none() {
    let mut window = engine(0);
    window.set_sequence(uniform(2));
    assert!(window.item_key(RowIndex::new(2)).is_none());
}

// ===== Invalidation =====

#[test]
fn same_sequence_keeps_table() {
    let mut window = engine(0);
    let sequence = uniform(30);
    window.set_sequence(sequence.clone());
    window.compute_visible_range(0, 10);
    let measured = window.measured_len();

    assert!(!window.set_sequence(sequence));
    assert_eq!(window.measured_len(), measured);
}

#[test]
fn new_sequence_resets_table_and_keys() {
    let mut window = engine(0);
    window.set_sequence(uniform(30));
    window.compute_visible_range(0, 10);

    assert!(window.set_sequence(uniform(30)));
    assert_eq!(window.measured_len(), 0);
    assert_eq!(
        window.item_key(RowIndex::new(0)).map(|k| k.as_str().to_string()),
        Some("row-0".to_string())
    );
}

#[test]
fn width_change_with_wrap_recomputes_heights() {
    let mut window = engine(0);
    let long = "x".repeat(40);
    window.set_sequence(sequence_of(&[&long, &long]));
    window.set_layout(LayoutParams::new(20, true));
    assert_eq!(window.row_height(RowIndex::new(0)).map(|h| h.get()), Some(2));

    assert!(window.set_layout(LayoutParams::new(10, true)));
    assert_eq!(window.measured_len(), 0);
    assert_eq!(window.row_height(RowIndex::new(0)).map(|h| h.get()), Some(4));
}

#[test]
fn width_change_without_wrap_keeps_heights() {
    let mut window = engine(0);
    window.set_sequence(uniform(10));
    window.set_layout(LayoutParams::new(80, false));
    window.compute_visible_range(0, 5);
    let measured = window.measured_len();

    assert!(!window.set_layout(LayoutParams::new(120, false)));
    assert_eq!(window.measured_len(), measured);
}

#[test]
fn invalidate_from_drops_suffix() {
    let mut window = engine(0);
    window.set_sequence(uniform(30));
    window.compute_visible_range(0, 20);

    window.invalidate_from(RowIndex::new(5));

    assert_eq!(window.measured_len(), 5);
    assert_eq!(window.offset_of(RowIndex::new(10)), Some(10));
}

#[test]
fn observed_height_shifts_later_offsets() {
    let mut window = engine(0);
    window.set_sequence(uniform(10));

    assert!(window.observe_height(RowIndex::new(2), RowHeight::new(5)));
    assert!(!window.observe_height(RowIndex::new(2), RowHeight::new(5)));
    assert!(!window.observe_height(RowIndex::new(99), RowHeight::new(5)));

    assert_eq!(window.offset_of(RowIndex::new(3)), Some(7));
    let range = window.compute_visible_range(3, 2);
    assert_eq!(range.start_index.get(), 2);
}

#[test]
fn find_uid_locates_first_match() {
    let mut window = engine(0);
    window.set_sequence(uniform(5));
    assert_eq!(window.find_uid("row-3"), Some(RowIndex::new(3)));
    assert_eq!(window.find_uid("missing"), None);
}

// ===== Properties =====

proptest! {
    #[test]
    fn prop_range_bounds_are_ordered(
        lengths in prop::collection::vec(0usize..60, 1..80),
        width in 1u32..40,
        wrap in any::<bool>(),
        scroll in 0usize..400,
        viewport in 1u32..60,
        overscan in 0usize..4,
    ) {
        let messages: Vec<String> = lengths.iter().map(|&n| "w".repeat(n)).collect();
        let refs: Vec<&str> = messages.iter().map(String::as_str).collect();
        let mut window = engine(overscan);
        window.set_sequence(sequence_of(&refs));
        window.set_layout(LayoutParams::new(width, wrap));

        let range = window.compute_visible_range(scroll, viewport);
        let len = refs.len();

        prop_assert!(range.overscan_start <= range.start_index);
        prop_assert!(range.start_index <= range.end_index);
        prop_assert!(range.end_index <= range.overscan_end);
        prop_assert!(range.overscan_end.get() <= len);
        prop_assert_eq!(
            range.items.len(),
            range.overscan_end.get() - range.overscan_start.get()
        );
        prop_assert!(range.start_index.get() - range.overscan_start.get() <= overscan);
        prop_assert!(range.overscan_end.get() - range.end_index.get() <= overscan);
    }

    #[test]
    fn prop_visible_rows_cover_viewport(
        lengths in prop::collection::vec(0usize..60, 1..80),
        width in 1u32..40,
        scroll in 0usize..400,
        viewport in 1u32..60,
    ) {
        let messages: Vec<String> = lengths.iter().map(|&n| "w".repeat(n)).collect();
        let refs: Vec<&str> = messages.iter().map(String::as_str).collect();
        let mut window = engine(0);
        window.set_sequence(sequence_of(&refs));
        window.set_layout(LayoutParams::new(width, true));

        let range = window.compute_visible_range(scroll, viewport);
        let first = &range.items[0];
        let last = &range.items[range.items.len() - 1];
        let bottom = range.scroll_offset + viewport as usize;

        prop_assert!(first.offset <= range.scroll_offset);
        if range.end_index.get() < refs.len() {
            prop_assert!(last.end() >= bottom);
        }
        for pair in range.items.windows(2) {
            prop_assert_eq!(pair[0].end(), pair[1].offset);
        }
    }
}
