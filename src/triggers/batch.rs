//! Event batches and the store that owns their events.
//!
//! One triggering action produces one [`EventBatch`]: the set of events
//! that happened simultaneously. The events themselves live in the
//! context's [`EventStore`] for as long as the batch is open, so windows
//! read them and effects cancel them through the same context every step
//! receives.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::core::EventId;

use super::event::{EventTypeConfig, EventTypeId, GameEvent};

/// The events produced by one triggering action.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EventBatch {
    events: SmallVec<[EventId; 4]>,
}

impl EventBatch {
    /// Event IDs in the order they were opened.
    #[must_use]
    pub fn events(&self) -> &[EventId] {
        &self.events
    }

    /// Number of events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Is the batch empty?
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Does the batch contain this event?
    #[must_use]
    pub fn contains(&self, id: EventId) -> bool {
        self.events.contains(&id)
    }
}

/// Owns every event of every open batch, plus the event type configs.
#[derive(Clone, Debug, Default)]
pub struct EventStore {
    events: FxHashMap<EventId, GameEvent>,
    types: FxHashMap<EventTypeId, EventTypeConfig>,
    next_id: u32,
}

impl EventStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) an event type config.
    pub fn register_type(&mut self, config: EventTypeConfig) {
        self.types.insert(config.id, config);
    }

    /// Look up an event type config.
    #[must_use]
    pub fn type_config(&self, id: EventTypeId) -> Option<&EventTypeConfig> {
        self.types.get(&id)
    }

    /// Store a set of simultaneous events and return their batch.
    pub fn open_batch(&mut self, events: impl IntoIterator<Item = GameEvent>) -> EventBatch {
        let mut batch = EventBatch::default();
        for mut event in events {
            self.next_id += 1;
            let id = EventId::new(self.next_id);
            event.id = id;
            self.events.insert(id, event);
            batch.events.push(id);
        }
        batch
    }

    /// Look up an event.
    #[must_use]
    pub fn get(&self, id: EventId) -> Option<&GameEvent> {
        self.events.get(&id)
    }

    /// Cancel an event. Returns `false` if it is unknown.
    pub fn cancel(&mut self, id: EventId) -> bool {
        match self.events.get_mut(&id) {
            Some(event) => {
                event.cancelled = true;
                true
            }
            None => false,
        }
    }

    /// Is the event live (known and not cancelled)?
    #[must_use]
    pub fn is_live(&self, id: EventId) -> bool {
        self.get(id).is_some_and(|event| !event.cancelled)
    }

    /// Live events of a batch, in batch order.
    pub fn live<'a>(&'a self, batch: &'a EventBatch) -> impl Iterator<Item = &'a GameEvent> + 'a {
        batch
            .events()
            .iter()
            .filter_map(|id| self.get(*id))
            .filter(|event| !event.cancelled)
    }

    /// Has every event in the batch been cancelled?
    #[must_use]
    pub fn all_cancelled(&self, batch: &EventBatch) -> bool {
        self.live(batch).next().is_none()
    }

    /// Drop a closed batch's events.
    pub fn retire(&mut self, batch: &EventBatch) {
        for id in batch.events() {
            self.events.remove(id);
        }
    }

    /// Number of stored events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Is the store empty?
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::CardId;

    const CARD_PLAYED: EventTypeId = EventTypeId::new(1);

    #[test]
    fn test_open_batch_assigns_ids_in_order() {
        let mut store = EventStore::new();
        let batch = store.open_batch([
            GameEvent::for_card(CARD_PLAYED, CardId::new(1)),
            GameEvent::for_card(CARD_PLAYED, CardId::new(2)),
        ]);

        assert_eq!(batch.len(), 2);
        let cards: Vec<_> = store.live(&batch).map(|event| event.card).collect();
        assert_eq!(cards, vec![Some(CardId::new(1)), Some(CardId::new(2))]);
        for id in batch.events() {
            assert_eq!(store.get(*id).unwrap().id, *id);
        }
    }

    #[test]
    fn test_cancelled_events_are_not_live() {
        let mut store = EventStore::new();
        let batch = store.open_batch([
            GameEvent::new(CARD_PLAYED),
            GameEvent::new(CARD_PLAYED),
        ]);
        let first = batch.events()[0];

        assert!(store.cancel(first));
        assert!(!store.is_live(first));
        assert_eq!(store.live(&batch).count(), 1);
        assert!(!store.all_cancelled(&batch));

        store.cancel(batch.events()[1]);
        assert!(store.all_cancelled(&batch));
    }

    #[test]
    fn test_retire_drops_events() {
        let mut store = EventStore::new();
        let kept = store.open_batch([GameEvent::new(CARD_PLAYED)]);
        let retired = store.open_batch([GameEvent::new(CARD_PLAYED)]);

        store.retire(&retired);
        assert_eq!(store.len(), 1);
        assert!(store.is_live(kept.events()[0]));
        assert!(!store.cancel(retired.events()[0]));
    }

    #[test]
    fn test_type_configs() {
        let mut store = EventStore::new();
        store.register_type(EventTypeConfig::new(CARD_PLAYED, "onCardPlayed"));
        assert_eq!(store.type_config(CARD_PLAYED).unwrap().name, "onCardPlayed");
        assert!(store.type_config(EventTypeId::new(99)).is_none());
    }
}
