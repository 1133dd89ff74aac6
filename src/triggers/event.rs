//! Game event types.
//!
//! Events record things that happened during a game. The core provides the
//! event infrastructure; games define what events exist via `EventTypeId`
//! and describe them with an `EventTypeConfig` for prompt titles.
//!
//! ## Design Philosophy
//!
//! The core doesn't know about "card played" or "ring claimed". Games
//! register event types and open batches of events; abilities listen for
//! event types.

use serde::{Deserialize, Serialize};

use crate::core::{CardId, EventId, PhaseId, PlayerId, RingId};

/// Event type identifier. Games define what event types exist.
///
/// ## Example Event Types
///
/// A typical game might define:
/// - `CARD_PLAYED` - a card was played from hand
/// - `CARD_LEAVES_PLAY` - a card is about to leave play
/// - `ABILITY_INITIATED` - an ability's effects are about to resolve
/// - `PHASE_STARTED` - a phase begins
/// - `RING_CLAIMED` - a ring was claimed
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventTypeId(pub u32);

impl EventTypeId {
    /// Create a new event type ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for EventTypeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EventType({})", self.0)
    }
}

/// A game event with contextual data.
///
/// Events are immutable records except for `cancelled`, which any effect
/// resolving before the reaction windows may set. Cancelled events are
/// invisible to ability collection.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameEvent {
    /// Assigned by the [`EventStore`](super::EventStore) when the batch opens.
    pub id: EventId,

    /// The type of event.
    pub event_type: EventTypeId,

    /// The card the event happened to.
    pub card: Option<CardId>,

    /// The ring the event concerns.
    pub ring: Option<RingId>,

    /// The phase the event concerns.
    pub phase: Option<PhaseId>,

    /// The player who initiated the event.
    pub player: Option<PlayerId>,

    /// The card whose ability caused the event.
    pub source: Option<CardId>,

    /// Did the event come out of hidden information (a card from hand)?
    pub from_hidden: bool,

    /// Has the event been cancelled?
    pub cancelled: bool,

    /// String keys for game-specific filtering.
    pub tags: Vec<String>,
}

impl GameEvent {
    /// Create a new event with just a type.
    pub fn new(event_type: EventTypeId) -> Self {
        Self {
            id: EventId::new(0),
            event_type,
            card: None,
            ring: None,
            phase: None,
            player: None,
            source: None,
            from_hidden: false,
            cancelled: false,
            tags: Vec::new(),
        }
    }

    /// Create an event that happened to a card.
    pub fn for_card(event_type: EventTypeId, card: CardId) -> Self {
        Self::new(event_type).with_card(card)
    }

    /// Set the card (builder pattern).
    #[must_use]
    pub fn with_card(mut self, card: CardId) -> Self {
        self.card = Some(card);
        self
    }

    /// Set the ring (builder pattern).
    #[must_use]
    pub fn with_ring(mut self, ring: RingId) -> Self {
        self.ring = Some(ring);
        self
    }

    /// Set the phase (builder pattern).
    #[must_use]
    pub fn with_phase(mut self, phase: PhaseId) -> Self {
        self.phase = Some(phase);
        self
    }

    /// Set the initiating player (builder pattern).
    #[must_use]
    pub fn with_player(mut self, player: PlayerId) -> Self {
        self.player = Some(player);
        self
    }

    /// Set the source card (builder pattern).
    #[must_use]
    pub fn with_source(mut self, source: CardId) -> Self {
        self.source = Some(source);
        self
    }

    /// Mark the event as coming from hidden information (builder pattern).
    #[must_use]
    pub fn hidden(mut self) -> Self {
        self.from_hidden = true;
        self
    }

    /// Add a tag (builder pattern).
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Check if the event has a tag.
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

/// Configuration for an event type.
///
/// `title` and `action` are templates used in prompts. They may contain
/// `{card}`, `{player}`, `{ring}` and `{phase}` placeholders.
///
/// ```
/// use ccg_resolve::triggers::{EventTypeConfig, EventTypeId};
///
/// let played = EventTypeConfig::new(EventTypeId::new(1), "onCardPlayed")
///     .with_title("{card} being played")
///     .with_action("{card} played");
/// assert_eq!(played.title.as_deref(), Some("{card} being played"));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventTypeConfig {
    /// Unique identifier for this event type.
    pub id: EventTypeId,

    /// Human-readable name (for debugging/display).
    pub name: String,

    /// How the event reads inside a window title ("X being played").
    pub title: Option<String>,

    /// How the event reads on an event-choice button.
    pub action: Option<String>,
}

impl EventTypeConfig {
    /// Create a new event type configuration.
    pub fn new(id: EventTypeId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            title: None,
            action: None,
        }
    }

    /// Add a title template (builder pattern).
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Add an action template (builder pattern).
    #[must_use]
    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_type_id() {
        let id = EventTypeId::new(5);
        assert_eq!(id.raw(), 5);
        assert_eq!(format!("{}", id), "EventType(5)");
    }

    #[test]
    fn test_game_event_builder() {
        let event = GameEvent::new(EventTypeId::new(1))
            .with_card(CardId::new(10))
            .with_ring(RingId::new(2))
            .with_phase(PhaseId::new(3))
            .with_player(PlayerId::new(1))
            .with_source(CardId::new(11))
            .hidden()
            .with_tag("conflict");

        assert_eq!(event.card, Some(CardId::new(10)));
        assert_eq!(event.ring, Some(RingId::new(2)));
        assert_eq!(event.phase, Some(PhaseId::new(3)));
        assert_eq!(event.player, Some(PlayerId::new(1)));
        assert_eq!(event.source, Some(CardId::new(11)));
        assert!(event.from_hidden);
        assert!(!event.cancelled);
        assert!(event.has_tag("conflict"));
        assert!(!event.has_tag("duel"));
    }

    #[test]
    fn test_for_card() {
        let event = GameEvent::for_card(EventTypeId::new(2), CardId::new(4));
        assert_eq!(event.event_type, EventTypeId::new(2));
        assert_eq!(event.card, Some(CardId::new(4)));
    }

    #[test]
    fn test_event_serialization() {
        let event =
            GameEvent::for_card(EventTypeId::new(1), CardId::new(10)).with_player(PlayerId::new(0));
        let json = serde_json::to_string(&event).unwrap();
        let deserialized: GameEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(event, deserialized);
    }
}
