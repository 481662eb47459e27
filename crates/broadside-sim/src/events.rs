//! Event bus between the targeting core and its consumers.
//!
//! Managers push events into a pending queue during a tick. At the end of the
//! tick the bus hands each event to every subscriber in subscription order and
//! keeps a copy for `drain`.

use std::collections::BTreeMap;

use broadside_core::events::CombatEvent;

/// Handle returned by [`EventBus::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriberId(u64);

type Handler = Box<dyn FnMut(&CombatEvent)>;

#[derive(Default)]
pub struct EventBus {
    subscribers: BTreeMap<SubscriberId, Handler>,
    next_id: u64,
    pending: Vec<CombatEvent>,
    delivered: Vec<CombatEvent>,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscribers.len())
            .field("pending", &self.pending.len())
            .field("delivered", &self.delivered.len())
            .finish()
    }
}

impl EventBus {
    pub fn subscribe(&mut self, handler: impl FnMut(&CombatEvent) + 'static) -> SubscriberId {
        let id = SubscriberId(self.next_id);
        self.next_id += 1;
        self.subscribers.insert(id, Box::new(handler));
        id
    }

    /// Remove a subscriber. Returns false if it was already gone.
    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        self.subscribers.remove(&id).is_some()
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Scratch queue managers push into during a tick.
    pub fn pending_mut(&mut self) -> &mut Vec<CombatEvent> {
        &mut self.pending
    }

    /// Queue one event for the next flush.
    pub fn publish(&mut self, event: CombatEvent) {
        self.pending.push(event);
    }

    /// Deliver every pending event to subscribers, then keep it for `drain`.
    pub fn flush(&mut self) {
        for event in self.pending.drain(..) {
            for handler in self.subscribers.values_mut() {
                handler(&event);
            }
            self.delivered.push(event);
        }
    }

    /// Take every delivered event since the last drain.
    pub fn drain(&mut self) -> Vec<CombatEvent> {
        std::mem::take(&mut self.delivered)
    }
}
