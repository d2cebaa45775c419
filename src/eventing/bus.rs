//! Event Bus
//!
//! Fans every [`AppEvent`] out to all live subscribers over unbounded
//! crossbeam channels. Subscribers whose receiver was dropped are pruned on
//! the next emit.

use crate::eventing::AppEvent;
use crossbeam_channel::{Receiver, Sender};
use parking_lot::Mutex;
use std::sync::Arc;

/// Multi-subscriber change notification bus
#[derive(Clone, Default)]
pub struct EventBus {
    subscribers: Arc<Mutex<Vec<Sender<AppEvent>>>>,
}

impl EventBus {
    /// Create a bus with no subscribers
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new subscriber
    ///
    /// The subscriber only receives events emitted after this call.
    pub fn subscribe(&self) -> Receiver<AppEvent> {
        let (tx, rx) = crossbeam_channel::unbounded();
        self.subscribers.lock().push(tx);
        rx
    }

    /// Send an event to every subscriber
    pub fn emit(&self, event: AppEvent) {
        let mut subscribers = self.subscribers.lock();
        subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }

    /// Number of live subscribers
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().len()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_subscriber_receives_events() {
        let bus = EventBus::new();
        let first = bus.subscribe();
        let second = bus.subscribe();

        bus.emit(AppEvent::ConfigReplaced { profiles: 2 });

        assert_eq!(first.try_recv().ok(), Some(AppEvent::ConfigReplaced { profiles: 2 }));
        assert_eq!(second.try_recv().ok(), Some(AppEvent::ConfigReplaced { profiles: 2 }));
    }

    #[test]
    fn dropped_subscribers_are_pruned() {
        let bus = EventBus::new();
        let kept = bus.subscribe();
        drop(bus.subscribe());

        bus.emit(AppEvent::active_profile(Some("p1")));

        assert_eq!(bus.subscriber_count(), 1);
        assert!(kept.try_recv().is_ok());
    }
}
