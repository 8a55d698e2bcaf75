//! Publish-on-mutation notifications for board hosts.
//!
//! # Responsibility
//! - Keep the set of subscribed listeners and deliver events in order.
//!
//! # Invariants
//! - Listeners are called in subscription order.
//! - Events are published only after the in-memory mutation is applied and
//!   its durable write was attempted.

use crate::model::note::{NoteColor, NoteId, Position};
use std::collections::BTreeMap;

/// Change notification published by `NoteStore`.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreEvent {
    NoteCreated { id: NoteId },
    TextChanged { id: NoteId },
    Moved { id: NoteId, position: Position },
    ColorChanged { id: NoteId, color: NoteColor },
    Deleted { id: NoteId },
    DarkModeChanged { dark_mode: bool },
    /// A durable write was rejected; in-memory state already changed.
    PersistFailed { key: &'static str, message: String },
}

/// Handle returned by `subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

pub type Listener = Box<dyn FnMut(&StoreEvent)>;

#[derive(Default)]
pub(crate) struct ListenerRegistry {
    listeners: BTreeMap<SubscriptionId, Listener>,
    next_id: u64,
}

impl ListenerRegistry {
    pub(crate) fn subscribe(&mut self, listener: Listener) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners.insert(id, listener);
        id
    }

    pub(crate) fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.listeners.remove(&id).is_some()
    }

    pub(crate) fn len(&self) -> usize {
        self.listeners.len()
    }

    /// Builds the event only when somebody listens.
    pub(crate) fn publish_with(&mut self, build: impl FnOnce() -> StoreEvent) {
        if self.listeners.is_empty() {
            return;
        }
        let event = build();
        for listener in self.listeners.values_mut() {
            listener(&event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ListenerRegistry, StoreEvent};
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn listeners_receive_events_until_unsubscribed() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut registry = ListenerRegistry::default();
        let sink = Rc::clone(&seen);
        let id = registry.subscribe(Box::new(move |event: &StoreEvent| {
            sink.borrow_mut().push(event.clone())
        }));

        registry.publish_with(|| StoreEvent::DarkModeChanged { dark_mode: true });
        assert!(registry.unsubscribe(id));
        assert!(!registry.unsubscribe(id));
        registry.publish_with(|| StoreEvent::DarkModeChanged { dark_mode: false });

        assert_eq!(
            *seen.borrow(),
            vec![StoreEvent::DarkModeChanged { dark_mode: true }]
        );
    }

    #[test]
    fn publish_without_listeners_skips_event_construction() {
        let mut registry = ListenerRegistry::default();
        registry.publish_with(|| unreachable!("no listener is subscribed"));
        assert_eq!(registry.len(), 0);
    }
}
