//! Text-selection popover state machine.
//!
//! `Idle` until a qualifying pointer-up inside a row, then `Selected` with
//! a clamped popover position and one window-scope [`Subscription`] for
//! click and context-menu events. Every way out of `Selected` drops that
//! subscription with the state it belongs to.

use super::listeners::{GlobalEvent, GlobalEventKind, ListenerHub, ListenerId, Subscription};
use crate::engine::{Bounds, Point, RowIndex, Viewport};
use crate::model::{CoreApp, LogRow};
use tracing::debug;

/// Global events that dismiss an open popover when they land outside.
const DISMISS_EVENTS: [GlobalEventKind; 2] = [GlobalEventKind::Click, GlobalEventKind::ContextMenu];

/// Fixed popover dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PopoverSize {
    pub width: u32,
    pub height: u32,
}

impl PopoverSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl Default for PopoverSize {
    fn default() -> Self {
        Self {
            width: 270,
            height: 105,
        }
    }
}

/// Everything that decides whether the popover feature is active at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SelectionGate {
    /// Capability flag (`popover_menu` in config).
    pub popover_menu: bool,
    /// Execution context the rows are shown in.
    pub app: CoreApp,
    /// At least one popover action handler is configured.
    pub has_actions: bool,
}

impl SelectionGate {
    /// Feature flag on, running in Explore, and something to offer.
    pub fn popover_menu_supported(&self) -> bool {
        self.popover_menu && self.app == CoreApp::Explore && self.has_actions
    }
}

/// Popover top-left corner for a pointer position, kept inside the viewport.
///
/// Each axis is shifted back only when the popover would overflow the right
/// or bottom edge; a popover larger than the viewport pins to 0.
pub fn popover_position(pointer: Point, size: PopoverSize, viewport: Viewport) -> Point {
    let clamp = |pos: u32, extent: u32, limit: u32| {
        if pos.saturating_add(extent) > limit {
            limit.saturating_sub(extent)
        } else {
            pos
        }
    };
    Point::new(
        clamp(pointer.x, size.width, viewport.width),
        clamp(pointer.y, size.height, viewport.height),
    )
}

/// Pointer released over a row, with whatever text the platform reports
/// as selected.
#[derive(Debug, Clone, Copy)]
pub struct PointerUp<'a> {
    pub position: Point,
    pub row_index: RowIndex,
    pub row: &'a LogRow,
    pub selected_text: Option<&'a str>,
}

/// One active selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionState {
    pub text: String,
    pub anchor_row: RowIndex,
    pub row_uid: String,
    pub ref_id: Option<String>,
    pub popover_position: Point,
}

#[derive(Debug)]
enum Phase {
    Idle,
    Selected {
        state: SelectionState,
        subscription: Subscription,
    },
}

/// Owns the current selection and its dismissal listeners.
#[derive(Debug)]
pub struct SelectionController {
    hub: ListenerHub,
    popover: PopoverSize,
    phase: Phase,
}

impl SelectionController {
    pub fn new(hub: ListenerHub, popover: PopoverSize) -> Self {
        Self {
            hub,
            popover,
            phase: Phase::Idle,
        }
    }

    pub fn hub(&self) -> &ListenerHub {
        &self.hub
    }

    pub fn popover_size(&self) -> PopoverSize {
        self.popover
    }

    pub fn state(&self) -> Option<&SelectionState> {
        match &self.phase {
            Phase::Idle => None,
            Phase::Selected { state, .. } => Some(state),
        }
    }

    pub fn is_selected(&self) -> bool {
        matches!(self.phase, Phase::Selected { .. })
    }

    /// Registration held while selected.
    pub fn listener_id(&self) -> Option<ListenerId> {
        match &self.phase {
            Phase::Idle => None,
            Phase::Selected { subscription, .. } => Some(subscription.id()),
        }
    }

    /// Pointer-up inside a row.
    ///
    /// Enters (or replaces) the selection when the gate is open, the
    /// selected text is non-empty and the pointer is inside `component`.
    /// Otherwise nothing changes. Returns whether a selection was made.
    pub fn handle_pointer_up(
        &mut self,
        gate: &SelectionGate,
        event: PointerUp<'_>,
        component: Bounds,
        viewport: Viewport,
    ) -> bool {
        if !gate.popover_menu_supported() {
            return false;
        }
        let Some(text) = event.selected_text.filter(|text| !text.is_empty()) else {
            return false;
        };
        if !component.contains(event.position) {
            return false;
        }

        let state = SelectionState {
            text: text.to_string(),
            anchor_row: event.row_index,
            row_uid: event.row.uid().to_string(),
            ref_id: event.row.ref_id().map(str::to_string),
            popover_position: popover_position(event.position, self.popover, viewport),
        };
        debug!(
            row = state.anchor_row.get(),
            chars = state.text.chars().count(),
            x = state.popover_position.x,
            y = state.popover_position.y,
            "Text selected"
        );

        match &mut self.phase {
            // Keep the registration; swap the payload in one step.
            Phase::Selected { state: current, .. } => *current = state,
            Phase::Idle => {
                let subscription = self.hub.subscribe(&DISMISS_EVENTS);
                self.phase = Phase::Selected {
                    state,
                    subscription,
                };
            }
        }
        true
    }

    /// A window-scope event delivered through the hub.
    ///
    /// Dismisses when the event is one we listen for and its target lies
    /// outside `component`. Returns whether the selection was dismissed.
    pub fn handle_global_event(&mut self, event: &GlobalEvent, component: Bounds) -> bool {
        let Some(id) = self.listener_id() else {
            return false;
        };
        if !self.hub.is_listening(id, event.kind()) || component.contains(event.target()) {
            return false;
        }
        debug!(kind = ?event.kind(), "Pointer event outside rows, dismissing selection");
        self.close().is_some()
    }

    /// Explicit close from the popover. Returns the dismissed selection.
    pub fn close(&mut self) -> Option<SelectionState> {
        match std::mem::replace(&mut self.phase, Phase::Idle) {
            Phase::Idle => None,
            Phase::Selected {
                state,
                subscription,
            } => {
                drop(subscription);
                Some(state)
            }
        }
    }

    /// Component teardown, possibly mid-interaction.
    pub fn teardown(&mut self) {
        if self.close().is_some() {
            debug!("Selection released on teardown");
        }
    }
}
