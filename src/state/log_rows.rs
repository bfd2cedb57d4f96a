//! LogRowsView - the composed log-rows component.
//!
//! Wires the dedup/sort pipeline, the window engine and the selection
//! controller behind one surface the host drives: push props, render a
//! frame for a scroll position, forward pointer events and per-row
//! callbacks.

use super::listeners::{GlobalEvent, ListenerHub};
use super::selection::{PointerUp, PopoverSize, SelectionController, SelectionGate, SelectionState};
use crate::engine::{
    Bounds, DedupSortPipeline, HeightEstimator, LayoutParams, OrderedSequence, Point, RenderKey,
    RowBatch, RowHeight, RowIndex, Viewport, VisibleRange, WindowEngine,
};
use crate::model::{CoreApp, DedupStrategy, LogRow, SortOrder};
use tracing::debug;

/// Callback receiving one row.
pub type RowCallback = Box<dyn Fn(&LogRow)>;
/// Hover callback; `None` when the pointer leaves the rows.
pub type HoverCallback = Box<dyn Fn(Option<&LogRow>)>;
/// Popover action callback: selected text and the row's query ref id.
pub type ValueCallback = Box<dyn Fn(&str, Option<&str>)>;

/// Per-row handlers, forwarded unmodified.
#[derive(Default)]
pub struct RowCallbacks {
    pub on_hover: Option<HoverCallback>,
    pub on_pin: Option<RowCallback>,
    pub on_unpin: Option<RowCallback>,
    pub on_open_context: Option<RowCallback>,
    pub on_permalink: Option<RowCallback>,
}

/// Popover actions. Their presence gates the selection feature.
#[derive(Default)]
pub struct PopoverActions {
    pub on_filter_value: Option<ValueCallback>,
    pub on_filter_out_value: Option<ValueCallback>,
}

impl PopoverActions {
    pub fn is_empty(&self) -> bool {
        self.on_filter_value.is_none() && self.on_filter_out_value.is_none()
    }
}

/// Which popover action to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopoverAction {
    FilterValue,
    FilterOutValue,
}

/// Inputs supplied by the host on every update.
#[derive(Debug, Clone)]
pub struct LogRowsProps {
    pub rows: RowBatch,
    pub dedup: DedupStrategy,
    pub sort_order: Option<SortOrder>,
    pub wrap: bool,
    /// Width available to rows, in pixels.
    pub width: u32,
    pub popover_menu: bool,
    pub app: CoreApp,
    pub pinned_row_id: Option<String>,
    pub permalinked_row_id: Option<String>,
}

impl LogRowsProps {
    pub fn new(rows: RowBatch) -> Self {
        Self {
            rows,
            dedup: DedupStrategy::None,
            sort_order: None,
            wrap: false,
            width: 0,
            popover_menu: false,
            app: CoreApp::Explore,
            pinned_row_id: None,
            permalinked_row_id: None,
        }
    }
}

/// Fixed construction-time options.
#[derive(Debug, Clone, Copy)]
pub struct LogRowsOptions {
    pub estimator: HeightEstimator,
    pub overscan: usize,
    pub popover: PopoverSize,
}

impl Default for LogRowsOptions {
    fn default() -> Self {
        Self {
            estimator: HeightEstimator::default(),
            overscan: crate::engine::DEFAULT_OVERSCAN,
            popover: PopoverSize::default(),
        }
    }
}

/// One row to paint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedRow {
    pub key: RenderKey,
    pub index: RowIndex,
    pub offset: usize,
    pub height: RowHeight,
    pub row: LogRow,
    pub pinned: bool,
    pub permalinked: bool,
}

/// Everything the renderer needs for one paint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRowsFrame {
    pub range: VisibleRange,
    pub rows: Vec<RenderedRow>,
    pub total_height: usize,
    pub show_duplicates: bool,
    pub selection: Option<SelectionState>,
}

/// Stateful log-rows component.
pub struct LogRowsView {
    pipeline: DedupSortPipeline,
    window: WindowEngine,
    selection: SelectionController,
    callbacks: RowCallbacks,
    actions: PopoverActions,
    gate: SelectionGate,
    pinned_row_id: Option<String>,
    permalinked_row_id: Option<String>,
}

impl LogRowsView {
    pub fn new(options: LogRowsOptions, hub: ListenerHub) -> Self {
        Self {
            pipeline: DedupSortPipeline::new(),
            window: WindowEngine::new(options.estimator, options.overscan),
            selection: SelectionController::new(hub, options.popover),
            callbacks: RowCallbacks::default(),
            actions: PopoverActions::default(),
            gate: SelectionGate::default(),
            pinned_row_id: None,
            permalinked_row_id: None,
        }
    }

    pub fn with_callbacks(mut self, callbacks: RowCallbacks) -> Self {
        self.callbacks = callbacks;
        self
    }

    pub fn with_actions(mut self, actions: PopoverActions) -> Self {
        self.gate.has_actions = !actions.is_empty();
        self.actions = actions;
        self
    }

    /// Apply new props. Returns whether the ordered sequence changed.
    pub fn update(&mut self, props: &LogRowsProps) -> bool {
        let sequence = self.pipeline.process(&props.rows, props.dedup, props.sort_order);
        let changed = self.window.set_sequence(sequence);
        self.window.set_layout(LayoutParams::new(props.width, props.wrap));

        self.gate.popover_menu = props.popover_menu;
        self.gate.app = props.app;
        self.pinned_row_id.clone_from(&props.pinned_row_id);
        self.permalinked_row_id.clone_from(&props.permalinked_row_id);
        changed
    }

    pub fn sequence(&self) -> &OrderedSequence {
        self.window.sequence()
    }

    pub fn pipeline(&self) -> &DedupSortPipeline {
        &self.pipeline
    }

    pub fn total_height(&self) -> usize {
        self.window.total_height()
    }

    pub fn gate(&self) -> SelectionGate {
        self.gate
    }

    pub fn selection(&self) -> Option<&SelectionState> {
        self.selection.state()
    }

    pub fn popover_size(&self) -> PopoverSize {
        self.selection.popover_size()
    }

    /// Compute the slice to paint at `scroll_offset`.
    pub fn render(&mut self, scroll_offset: usize, viewport_height: u32) -> LogRowsFrame {
        let range = self.window.compute_visible_range(scroll_offset, viewport_height);
        let sequence = self.window.sequence();

        let rows = range
            .items
            .iter()
            .filter_map(|item| {
                let row = sequence.get(item.index.get())?;
                Some(RenderedRow {
                    key: item.key.clone(),
                    index: item.index,
                    offset: item.offset,
                    height: item.height,
                    pinned: self.pinned_row_id.as_deref() == Some(row.uid()),
                    permalinked: self.permalinked_row_id.as_deref() == Some(row.uid()),
                    row: row.clone(),
                })
            })
            .collect();

        LogRowsFrame {
            total_height: self.window.total_height(),
            show_duplicates: sequence.show_duplicates(),
            selection: self.selection.state().cloned(),
            range,
            rows,
        }
    }

    /// Offset that brings the row with `uid` to the top of the viewport.
    pub fn scroll_offset_for_uid(&mut self, uid: &str) -> Option<usize> {
        let index = self.window.find_uid(uid)?;
        self.window.offset_of(index)
    }

    /// Offset of the permalinked row, if it is in the sequence.
    pub fn permalink_offset(&mut self) -> Option<usize> {
        let uid = self.permalinked_row_id.clone()?;
        self.scroll_offset_for_uid(&uid)
    }

    /// Replace a row's estimated height with a measured one.
    pub fn observe_height(&mut self, index: RowIndex, height: RowHeight) -> bool {
        self.window.observe_height(index, height)
    }

    fn row(&self, index: RowIndex) -> Option<&LogRow> {
        self.window.sequence().get(index.get())
    }

    /// Forward a hover. Returns whether a handler ran.
    pub fn hover(&self, index: Option<RowIndex>) -> bool {
        let Some(handler) = &self.callbacks.on_hover else {
            return false;
        };
        handler(index.and_then(|index| self.row(index)));
        true
    }

    pub fn pin(&self, index: RowIndex) -> bool {
        self.forward(&self.callbacks.on_pin, index)
    }

    pub fn unpin(&self, index: RowIndex) -> bool {
        self.forward(&self.callbacks.on_unpin, index)
    }

    pub fn open_context(&self, index: RowIndex) -> bool {
        self.forward(&self.callbacks.on_open_context, index)
    }

    pub fn permalink(&self, index: RowIndex) -> bool {
        self.forward(&self.callbacks.on_permalink, index)
    }

    fn forward(&self, handler: &Option<RowCallback>, index: RowIndex) -> bool {
        match (handler, self.row(index)) {
            (Some(handler), Some(row)) => {
                handler(row);
                true
            }
            _ => false,
        }
    }

    /// Pointer released over row `index` with `selected_text` selected.
    pub fn handle_pointer_up(
        &mut self,
        position: Point,
        index: RowIndex,
        selected_text: Option<&str>,
        component: Bounds,
        viewport: Viewport,
    ) -> bool {
        let Some(row) = self.window.sequence().get(index.get()) else {
            return false;
        };
        let event = PointerUp {
            position,
            row_index: index,
            row,
            selected_text,
        };
        self.selection
            .handle_pointer_up(&self.gate, event, component, viewport)
    }

    pub fn handle_global_event(&mut self, event: &GlobalEvent, component: Bounds) -> bool {
        self.selection.handle_global_event(event, component)
    }

    /// Run a popover action on the current selection, then close it.
    pub fn invoke_action(&mut self, action: PopoverAction) -> bool {
        let handler = match action {
            PopoverAction::FilterValue => &self.actions.on_filter_value,
            PopoverAction::FilterOutValue => &self.actions.on_filter_out_value,
        };
        let (Some(handler), Some(state)) = (handler, self.selection.state()) else {
            return false;
        };
        debug!(?action, "Running popover action");
        handler(&state.text, state.ref_id.as_deref());
        self.selection.close();
        true
    }

    pub fn close_popover(&mut self) -> bool {
        self.selection.close().is_some()
    }

    /// Release everything held across events.
    pub fn teardown(&mut self) {
        self.selection.teardown();
        self.pipeline.clear();
    }
}

#[cfg(test)]
#[path = "log_rows_tests.rs"]
mod tests;
