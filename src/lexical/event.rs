//! Index mutation notifications.

use std::fmt;

use crate::data::Document;

/// Kind of mutation an index reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Add,
    Remove,
    Update,
}

/// Notification passed to listeners.
#[derive(Debug, Clone, Copy)]
pub struct IndexEvent<'a> {
    pub kind: EventKind,
    pub doc_ref: &'a str,
    pub document: &'a Document,
}

/// Handle returned by [`EventEmitter::add_listener`], used to remove it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Box<dyn Fn(&IndexEvent<'_>) + Send + Sync>;

/// Registry of event listeners keyed by event kind.
#[derive(Default)]
pub struct EventEmitter {
    listeners: Vec<(ListenerId, Vec<EventKind>, Listener)>,
    next_id: u64,
}

impl fmt::Debug for EventEmitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventEmitter")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl EventEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Call `listener` for every event whose kind is in `kinds`.
    pub fn add_listener<F>(&mut self, kinds: &[EventKind], listener: F) -> ListenerId
    where
        F: Fn(&IndexEvent<'_>) + Send + Sync + 'static,
    {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners
            .push((id, kinds.to_vec(), Box::new(listener)));
        id
    }

    /// Remove a listener. Returns whether it was registered.
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _, _)| *listener_id != id);
        self.listeners.len() != before
    }

    pub fn has_handler(&self, kind: EventKind) -> bool {
        self.listeners
            .iter()
            .any(|(_, kinds, _)| kinds.contains(&kind))
    }

    /// Deliver `event` to the listeners registered for its kind, in
    /// registration order.
    pub fn emit(&self, event: &IndexEvent<'_>) {
        for (_, kinds, listener) in &self.listeners {
            if kinds.contains(&event.kind) {
                listener(event);
            }
        }
    }
}
