//! TUI rendering and terminal management (impure shell)
//!
//! `TuiApp` plays the roles around the rows component: it is the data
//! layer (input source plus popover-driven filters), the window (global
//! pointer events through a [`ListenerHub`]) and the platform selection
//! API (a mouse drag inside one row becomes the selected text).

pub mod filter;
mod popover;
pub mod rows;
mod styles;

pub use filter::RowFilter;
pub use styles::{ColorConfig, RowStyles};

use crate::config::ResolvedConfig;
use crate::engine::{Bounds, Point, RowBatch, RowHeight, RowIndex, Viewport};
use crate::model::{InputError, LogRow, SortOrder};
use crate::source::InputSource;
use crate::state::{
    GlobalEvent, ListenerHub, LogRowsFrame, LogRowsProps, LogRowsView, PopoverAction,
    PopoverActions, RowCallbacks,
};
use crossterm::{
    event::{
        self, Event, KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
    },
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::layout::Rect;
use ratatui::text::Line;
use ratatui::widgets::Paragraph;
use ratatui::Terminal;
use rows::TextPosition;
use std::cell::RefCell;
use std::io::{self, Stdout};
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

/// Cells reserved before each message: marker, duplicate badge, gap.
pub const GUTTER_WIDTH: u32 = 8;

/// Rows reserved at the bottom for the status line.
const STATUS_HEIGHT: u16 = 1;

/// How long to wait for terminal events before polling the input source.
const TIMER_INTERVAL: Duration = Duration::from_millis(250);

/// Errors that can occur during TUI operations
#[derive(Debug, Error)]
pub enum TuiError {
    /// IO error during terminal operations
    #[error("Terminal IO error: {0}")]
    Io(#[from] io::Error),

    /// Input source error
    #[error("Input error: {0}")]
    Input(#[from] InputError),
}

/// Host-side state written by the component's callbacks.
#[derive(Debug, Default)]
struct HostState {
    filter: RowFilter,
    filters_changed: bool,
    pinned: Option<String>,
    permalinked: Option<String>,
    hovered: Option<String>,
    notice: Option<String>,
}

type SharedHost = Rc<RefCell<HostState>>;

/// A left-button drag in progress, anchored in one row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Drag {
    row: RowIndex,
    anchor: TextPosition,
}

/// Where a terminal cell falls relative to the painted rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RowHit {
    index: RowIndex,
    /// Inside the gutter rather than the message.
    gutter: bool,
    position: TextPosition,
}

/// Main TUI application
///
/// Generic over backend to support testing with TestBackend
pub struct TuiApp<B>
where
    B: Backend,
{
    terminal: Terminal<B>,
    view: LogRowsView,
    hub: ListenerHub,
    input_source: InputSource,
    /// Every row received so far, in arrival order.
    rows: Vec<LogRow>,
    host: SharedHost,
    props: LogRowsProps,
    scroll_offset: usize,
    /// Stick to the bottom as rows stream in.
    follow: bool,
    drag: Option<Drag>,
    hovered_index: Option<RowIndex>,
    last_frame: Option<LogRowsFrame>,
    last_rows_area: Rect,
    styles: RowStyles,
}

impl TuiApp<CrosstermBackend<Stdout>> {
    /// Create and initialize a new TUI application
    ///
    /// Sets up terminal in raw mode with alternate screen
    pub fn new(
        input_source: InputSource,
        config: &ResolvedConfig,
        styles: RowStyles,
    ) -> Result<Self, TuiError> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        stdout.execute(EnterAlternateScreen)?;
        stdout.execute(crossterm::event::EnableMouseCapture)?;
        let terminal = Terminal::new(CrosstermBackend::new(stdout))?;

        Self::with_terminal(terminal, input_source, config, styles)
    }
}

impl<B> TuiApp<B>
where
    B: Backend,
{
    /// Build the app around an existing terminal and load the first rows.
    pub fn with_terminal(
        terminal: Terminal<B>,
        input_source: InputSource,
        config: &ResolvedConfig,
        styles: RowStyles,
    ) -> Result<Self, TuiError> {
        let hub = ListenerHub::new();
        let host = SharedHost::default();
        let view = LogRowsView::new(config.log_rows_options(), hub.clone())
            .with_callbacks(row_callbacks(&host))
            .with_actions(popover_actions(&host));

        let follow = input_source.is_live();
        let mut props = LogRowsProps::new(Arc::from(Vec::new()));
        props.dedup = config.dedup;
        props.sort_order = config.sort_order;
        props.wrap = config.wrap_lines;
        props.popover_menu = config.popover_menu;
        props.app = config.app;

        let mut app = Self {
            terminal,
            view,
            hub,
            input_source,
            rows: Vec::new(),
            host,
            props,
            scroll_offset: 0,
            follow,
            drag: None,
            hovered_index: None,
            last_frame: None,
            last_rows_area: Rect::default(),
            styles,
        };

        let size = app.terminal.size()?;
        app.handle_resize(size.width, size.height);
        app.poll_input()?;
        Ok(app)
    }

    /// Run the main event loop
    ///
    /// Returns when user quits (q or Ctrl+C). Redraws on input, on resize
    /// and when new rows arrive; otherwise idles on the poll timeout.
    pub fn run(&mut self) -> Result<(), TuiError> {
        self.draw()?;

        loop {
            if event::poll(TIMER_INTERVAL)? {
                match event::read()? {
                    Event::Key(key) => {
                        if self.handle_key(key) {
                            return Ok(());
                        }
                    }
                    Event::Mouse(mouse) => self.handle_mouse(mouse),
                    Event::Resize(width, height) => self.handle_resize(width, height),
                    _ => continue,
                }
                self.draw()?;
                continue;
            }

            if self.poll_input()? {
                self.draw()?;
            }
        }
    }

    /// Fetch rows that arrived since the last poll. Returns whether any did.
    fn poll_input(&mut self) -> Result<bool, TuiError> {
        let new_rows = self.input_source.poll()?;
        if new_rows.is_empty() {
            return Ok(false);
        }

        debug!(count = new_rows.len(), total = self.rows.len() + new_rows.len(), "Received rows");
        self.rows.extend(new_rows);
        self.refresh_batch();
        if self.follow {
            self.scroll_offset = usize::MAX;
        }
        Ok(true)
    }

    /// Hand the component a fresh batch built from all rows and the
    /// current filters.
    fn refresh_batch(&mut self) {
        let batch: RowBatch = self.host.borrow().filter.apply(&self.rows);
        self.props.rows = batch;
        self.push_props();
    }

    fn push_props(&mut self) {
        {
            let host = self.host.borrow();
            self.props.pinned_row_id.clone_from(&host.pinned);
            self.props.permalinked_row_id.clone_from(&host.permalinked);
        }
        if self.view.update(&self.props) {
            self.hovered_index = None;
        }
    }

    /// Apply anything the callbacks recorded since the last event.
    fn sync_host(&mut self) {
        let filters_changed = std::mem::take(&mut self.host.borrow_mut().filters_changed);
        if filters_changed {
            self.refresh_batch();
        } else {
            self.push_props();
        }
    }

    /// Handle a single keyboard event
    ///
    /// Returns true if app should quit
    fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return true;
        }

        let page = usize::from(self.last_rows_area.height.max(1));
        match key.code {
            KeyCode::Char('q') => return true,
            KeyCode::Char('j') | KeyCode::Down => self.scroll_by(1),
            KeyCode::Char('k') | KeyCode::Up => self.scroll_by(-1),
            KeyCode::PageDown | KeyCode::Char(' ') => self.scroll_by(page as isize),
            KeyCode::PageUp => self.scroll_by(-(page as isize)),
            KeyCode::Char('g') | KeyCode::Home => {
                self.follow = false;
                self.scroll_offset = 0;
            }
            KeyCode::Char('G') | KeyCode::End => {
                self.follow = self.input_source.is_live();
                self.scroll_offset = usize::MAX;
            }
            KeyCode::Char('w') => {
                self.props.wrap = !self.props.wrap;
                self.push_props();
            }
            KeyCode::Char('d') => {
                self.props.dedup = self.props.dedup.cycle();
                self.push_props();
            }
            KeyCode::Char('s') => {
                self.props.sort_order = next_sort_order(self.props.sort_order);
                self.push_props();
            }
            KeyCode::Char('f') => self.run_action(PopoverAction::FilterValue),
            KeyCode::Char('F') => self.run_action(PopoverAction::FilterOutValue),
            KeyCode::Char('c') => {
                self.host.borrow_mut().filter.clear();
                self.refresh_batch();
            }
            KeyCode::Char('p') => {
                if let Some(index) = self.hovered_index {
                    self.view.permalink(index);
                    self.sync_host();
                }
            }
            KeyCode::Char('P') => {
                if let Some(offset) = self.view.permalink_offset() {
                    self.follow = false;
                    self.scroll_offset = offset;
                }
            }
            KeyCode::Esc => {
                self.view.close_popover();
            }
            _ => {}
        }
        false
    }

    fn scroll_by(&mut self, delta: isize) {
        if delta < 0 {
            self.follow = false;
        }
        self.scroll_offset = self.scroll_offset.saturating_add_signed(delta);
    }

    fn run_action(&mut self, action: PopoverAction) {
        if self.view.invoke_action(action) {
            self.sync_host();
        }
    }

    fn component_bounds(&self) -> Bounds {
        let area = self.last_rows_area;
        Bounds::new(
            u32::from(area.x),
            u32::from(area.y),
            u32::from(area.width),
            u32::from(area.height),
        )
    }

    fn window_viewport(&self) -> Viewport {
        let size = self.terminal.size().unwrap_or_default();
        Viewport::new(u32::from(size.width), u32::from(size.height))
    }

    /// Map a terminal cell to the painted row under it.
    fn hit_test(&self, column: u16, row: u16) -> Option<RowHit> {
        let area = self.last_rows_area;
        if !area.contains(ratatui::layout::Position::new(column, row)) {
            return None;
        }
        let frame = self.last_frame.as_ref()?;
        let y = frame.range.scroll_offset + usize::from(row - area.y);
        let item = frame.range.item_at(y)?;

        let local_column = usize::from(column - area.x);
        let gutter = GUTTER_WIDTH as usize;
        Some(RowHit {
            index: item.index,
            gutter: local_column < gutter,
            position: TextPosition::new(y - item.offset, local_column.saturating_sub(gutter)),
        })
    }

    /// Visual lines of a row as currently painted.
    fn row_lines(&self, index: RowIndex) -> Vec<String> {
        let width = usize::from(self.last_rows_area.width).saturating_sub(GUTTER_WIDTH as usize);
        self.view
            .sequence()
            .get(index.get())
            .map(|row| rows::message_lines(row.raw(), self.props.wrap, width))
            .unwrap_or_default()
    }

    /// Deliver a window-scope event to whoever listens for it.
    fn dispatch_global(&mut self, event: GlobalEvent) {
        if self.hub.recipients(&event).is_empty() {
            return;
        }
        let bounds = self.component_bounds();
        self.view.handle_global_event(&event, bounds);
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        let point = Point::new(u32::from(mouse.column), u32::from(mouse.row));
        match mouse.kind {
            MouseEventKind::ScrollUp => self.scroll_by(-3),
            MouseEventKind::ScrollDown => self.scroll_by(3),
            MouseEventKind::Moved => self.handle_hover(mouse.column, mouse.row),
            MouseEventKind::Down(MouseButton::Left) => {
                if let Some(action) = self.popover_action_at(mouse.column, mouse.row) {
                    self.run_action(action);
                    return;
                }
                self.dispatch_global(GlobalEvent::Click(point));
                self.drag = None;

                let Some(hit) = self.hit_test(mouse.column, mouse.row) else {
                    return;
                };
                if hit.gutter {
                    self.toggle_pin(hit.index);
                } else {
                    self.drag = Some(Drag {
                        row: hit.index,
                        anchor: hit.position,
                    });
                }
            }
            MouseEventKind::Up(MouseButton::Left) => {
                let Some(drag) = self.drag.take() else {
                    return;
                };
                let selected = self
                    .hit_test(mouse.column, mouse.row)
                    .filter(|hit| hit.index == drag.row && hit.position != drag.anchor)
                    .map(|hit| rows::selected_text(&self.row_lines(drag.row), drag.anchor, hit.position));
                let bounds = self.component_bounds();
                let viewport = self.window_viewport();
                self.view
                    .handle_pointer_up(point, drag.row, selected.as_deref(), bounds, viewport);
            }
            MouseEventKind::Down(MouseButton::Right) => {
                self.dispatch_global(GlobalEvent::ContextMenu(point));
                if let Some(hit) = self.hit_test(mouse.column, mouse.row) {
                    self.view.open_context(hit.index);
                    self.sync_host();
                }
            }
            _ => {}
        }
    }

    fn popover_action_at(&self, column: u16, row: u16) -> Option<PopoverAction> {
        let selection = self.view.selection()?;
        let area = self
            .terminal
            .size()
            .map(|size| Rect::new(0, 0, size.width, size.height))
            .unwrap_or_default();
        let rect = popover::popover_rect(selection.popover_position, self.view.popover_size(), area);
        popover::action_at(rect, column, row)
    }

    fn handle_hover(&mut self, column: u16, row: u16) {
        let index = self.hit_test(column, row).map(|hit| hit.index);
        if index != self.hovered_index {
            self.hovered_index = index;
            self.view.hover(index);
        }
    }

    fn toggle_pin(&mut self, index: RowIndex) {
        let pinned = self.view.sequence().get(index.get()).is_some_and(|row| {
            self.host.borrow().pinned.as_deref() == Some(row.uid())
        });
        if pinned {
            self.view.unpin(index);
        } else {
            self.view.pin(index);
        }
        self.sync_host();
    }

    /// Handle a terminal resize event
    fn handle_resize(&mut self, width: u16, height: u16) {
        debug!(width, height, "Handling resize");
        let width = width.max(1);
        self.last_rows_area = Rect::new(0, 0, width, height.saturating_sub(STATUS_HEIGHT));
        self.props.width = u32::from(width);
        self.push_props();
    }

    /// Render the current frame
    ///
    /// Computes the visible slice, paints it, then feeds back the real
    /// line counts of wrapped rows whose estimate was off.
    fn draw(&mut self) -> Result<(), TuiError> {
        let area = self.last_rows_area;
        let frame_data = self.view.render(self.scroll_offset, u32::from(area.height));
        self.scroll_offset = frame_data.range.scroll_offset;

        let message_width = usize::from(area.width).saturating_sub(GUTTER_WIDTH as usize);
        let corrections: Vec<(RowIndex, RowHeight)> = frame_data
            .rows
            .iter()
            .filter_map(|row| {
                let lines = rows::measured_lines(row, self.props.wrap, message_width);
                let lines = u32::try_from(lines).unwrap_or(u32::MAX);
                (lines != row.height.get()).then(|| (row.index, RowHeight::new(lines)))
            })
            .collect();

        let status = self.status_line(&frame_data);
        let hovered = self.host.borrow().hovered.clone();
        let popover_size = self.view.popover_size();
        let styles = self.styles;
        let wrap = self.props.wrap;

        self.terminal.draw(|frame| {
            let status_area = Rect::new(
                0,
                area.bottom(),
                frame.area().width,
                frame.area().height.saturating_sub(area.height),
            );
            rows::render_rows(frame, area, &frame_data, wrap, hovered.as_deref(), &styles);
            frame.render_widget(
                Paragraph::new(Line::from(status)).style(styles.status),
                status_area,
            );
            if let Some(selection) = &frame_data.selection {
                popover::render_popover(frame, selection, popover_size, &styles);
            }
        })?;

        for (index, height) in corrections {
            self.view.observe_height(index, height);
        }
        self.last_frame = Some(frame_data);
        Ok(())
    }

    fn status_line(&self, frame: &LogRowsFrame) -> String {
        let host = self.host.borrow();
        let mut parts = vec![format!(
            "{} rows ({} shown)",
            self.rows.len(),
            self.view.sequence().len()
        )];
        parts.push(format!("dedup: {}", self.props.dedup));
        if frame.show_duplicates {
            parts.push(format!("{} duplicates", self.view.sequence().duplicate_total()));
        }
        parts.push(format!(
            "sort: {}",
            self.props.sort_order.map_or("arrival", SortOrder::as_str)
        ));
        parts.push(format!("wrap: {}", if self.props.wrap { "on" } else { "off" }));
        if !host.filter.is_empty() {
            parts.push(format!("filters: {}", host.filter.summary()));
        }
        if let Some(notice) = &host.notice {
            parts.push(notice.clone());
        }
        if self.input_source.is_live() {
            parts.push("LIVE".to_string());
        }
        format!(" {}", parts.join(" | "))
    }

    /// Release the component's window-scope registrations.
    fn shutdown(&mut self) {
        self.view.teardown();
        debug!(listeners = self.hub.listener_count(), "Rows component torn down");
    }
}

/// Sort order after `current`: arrival, ascending, descending, arrival.
fn next_sort_order(current: Option<SortOrder>) -> Option<SortOrder> {
    match current {
        None => Some(SortOrder::Ascending),
        Some(SortOrder::Ascending) => Some(SortOrder::Descending),
        Some(SortOrder::Descending) => None,
    }
}

fn row_callbacks(host: &SharedHost) -> RowCallbacks {
    let hover = Rc::clone(host);
    let pin = Rc::clone(host);
    let unpin = Rc::clone(host);
    let context = Rc::clone(host);
    let permalink = Rc::clone(host);
    RowCallbacks {
        on_hover: Some(Box::new(move |row: Option<&LogRow>| {
            hover.borrow_mut().hovered = row.map(|row| row.uid().to_string());
        })),
        on_pin: Some(Box::new(move |row: &LogRow| {
            pin.borrow_mut().pinned = Some(row.uid().to_string());
        })),
        on_unpin: Some(Box::new(move |_: &LogRow| {
            unpin.borrow_mut().pinned = None;
        })),
        on_open_context: Some(Box::new(move |row: &LogRow| {
            let sequence = row.sequence();
            context.borrow_mut().notice = Some(format!("row {} (line {sequence})", row.uid()));
        })),
        on_permalink: Some(Box::new(move |row: &LogRow| {
            let mut host = permalink.borrow_mut();
            host.notice = Some(format!("permalink: {}", row.uid()));
            host.permalinked = Some(row.uid().to_string());
        })),
    }
}

fn popover_actions(host: &SharedHost) -> PopoverActions {
    let include = Rc::clone(host);
    let exclude = Rc::clone(host);
    PopoverActions {
        on_filter_value: Some(Box::new(move |value: &str, ref_id: Option<&str>| {
            let mut host = include.borrow_mut();
            debug!(value, ?ref_id, "Filter for value");
            let added = host.filter.include(value);
            host.filters_changed |= added;
        })),
        on_filter_out_value: Some(Box::new(move |value: &str, ref_id: Option<&str>| {
            let mut host = exclude.borrow_mut();
            debug!(value, ?ref_id, "Filter out value");
            let added = host.filter.exclude(value);
            host.filters_changed |= added;
        })),
    }
}

/// Initialize and run the TUI application with input source and config
///
/// Handles terminal setup, runs the event loop, and restores the terminal
/// even when the loop fails.
///
/// Note: Logging must be initialized by caller before calling this function.
pub fn run_with_source(
    input_source: InputSource,
    config: &ResolvedConfig,
    styles: RowStyles,
) -> Result<(), TuiError> {
    info!(live = input_source.is_live(), "Starting viewer");
    let result = TuiApp::new(input_source, config, styles).and_then(|mut app| {
        let result = app.run();
        app.shutdown();
        result
    });

    restore_terminal()?;
    result
}

/// Restore terminal to normal state
///
/// Disables raw mode, mouse capture, and leaves alternate screen
fn restore_terminal() -> Result<(), TuiError> {
    disable_raw_mode()?;
    io::stdout().execute(crossterm::event::DisableMouseCapture)?;
    io::stdout().execute(LeaveAlternateScreen)?;
    Ok(())
}

#[cfg(test)]
#[path = "view_tests.rs"]
mod tests;
