//! Window-scope listener registry.
//!
//! Global pointer events are observed for the whole window, not one row.
//! Interested parties subscribe and get back a [`Subscription`] handle;
//! dropping the handle unregisters every kind it covers, so no exit path
//! can leave a listener behind.

use crate::engine::Point;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};

/// Kinds of global input events a listener can register for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GlobalEventKind {
    /// Plain (left) click anywhere in the window.
    Click,
    /// Context-menu (right) click anywhere in the window.
    ContextMenu,
}

/// A global input event with its target position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlobalEvent {
    Click(Point),
    ContextMenu(Point),
}

impl GlobalEvent {
    pub fn kind(&self) -> GlobalEventKind {
        match self {
            GlobalEvent::Click(_) => GlobalEventKind::Click,
            GlobalEvent::ContextMenu(_) => GlobalEventKind::ContextMenu,
        }
    }

    pub fn target(&self) -> Point {
        match self {
            GlobalEvent::Click(point) | GlobalEvent::ContextMenu(point) => *point,
        }
    }
}

/// Identifier of one registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerId(u64);

#[derive(Debug, Default)]
struct HubInner {
    next_id: u64,
    registrations: BTreeMap<ListenerId, Vec<GlobalEventKind>>,
}

/// Shared registry of global listeners.
///
/// Cloning yields another handle to the same registry. Single-threaded:
/// all registration happens on the UI thread.
#[derive(Debug, Clone, Default)]
pub struct ListenerHub {
    inner: Rc<RefCell<HubInner>>,
}

impl ListenerHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register one listener per kind, released together on drop.
    pub fn subscribe(&self, kinds: &[GlobalEventKind]) -> Subscription {
        let mut inner = self.inner.borrow_mut();
        let id = ListenerId(inner.next_id);
        inner.next_id += 1;

        let mut kinds = kinds.to_vec();
        kinds.sort();
        kinds.dedup();
        inner.registrations.insert(id, kinds);

        Subscription {
            id,
            hub: Rc::downgrade(&self.inner),
        }
    }

    /// Live listeners, counting each registered kind separately.
    pub fn listener_count(&self) -> usize {
        self.inner
            .borrow()
            .registrations
            .values()
            .map(Vec::len)
            .sum()
    }

    /// Live listeners for one kind.
    pub fn listener_count_for(&self, kind: GlobalEventKind) -> usize {
        self.inner
            .borrow()
            .registrations
            .values()
            .filter(|kinds| kinds.contains(&kind))
            .count()
    }

    /// Whether `id` is registered for `kind`.
    pub fn is_listening(&self, id: ListenerId, kind: GlobalEventKind) -> bool {
        self.inner
            .borrow()
            .registrations
            .get(&id)
            .is_some_and(|kinds| kinds.contains(&kind))
    }

    /// Listeners an event should be delivered to, in registration order.
    pub fn recipients(&self, event: &GlobalEvent) -> Vec<ListenerId> {
        let kind = event.kind();
        self.inner
            .borrow()
            .registrations
            .iter()
            .filter(|(_, kinds)| kinds.contains(&kind))
            .map(|(id, _)| *id)
            .collect()
    }
}

/// Registration handle. Unregisters on drop.
#[derive(Debug)]
#[must_use = "dropping a Subscription unregisters its listeners immediately"]
pub struct Subscription {
    id: ListenerId,
    hub: Weak<RefCell<HubInner>>,
}

impl Subscription {
    pub fn id(&self) -> ListenerId {
        self.id
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.hub.upgrade() {
            inner.borrow_mut().registrations.remove(&self.id);
        }
    }
}
