//! Interaction state (pure).
//!
//! The selection state machine, its window-scope listener registry, and
//! the composed log-rows component. No terminal types appear here; the
//! view layer translates crossterm events into these calls.

pub mod listeners;
pub mod log_rows;
pub mod selection;

// Re-export for convenience
pub use listeners::{GlobalEvent, GlobalEventKind, ListenerHub, ListenerId, Subscription};
pub use log_rows::{
    HoverCallback, LogRowsFrame, LogRowsOptions, LogRowsProps, LogRowsView, PopoverAction,
    PopoverActions, RenderedRow, RowCallback, RowCallbacks, ValueCallback,
};
pub use selection::{
    popover_position, PointerUp, PopoverSize, SelectionController, SelectionGate, SelectionState,
};
