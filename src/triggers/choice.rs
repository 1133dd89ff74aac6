//! Resolvable candidates and the record of what a window has resolved.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use smallvec::{smallvec, SmallVec};

use crate::core::{AbilityId, CardId, EventId, PlayerId};

use super::ability::AbilityClass;

/// One way a player could respond: this ability, from this source, to this
/// event.
///
/// Choices are rebuilt every time a window re-evaluates and never outlive
/// it. Several choices may share a source, an ability or an event; the
/// window's prompts narrow them down.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilityChoice {
    pub ability: AbilityId,
    pub source: CardId,
    /// The triggering event. For collective abilities, the first one matched.
    pub event: EventId,
    /// The card the triggering event happened to.
    pub event_card: Option<CardId>,
    /// The player who would respond (the source's controller).
    pub player: PlayerId,
    pub class: AbilityClass,
    /// Resolves once for the whole batch.
    pub collective: bool,
    /// Every event of the batch this choice covers.
    pub batch_events: SmallVec<[EventId; 4]>,
}

impl AbilityChoice {
    /// Create a per-event choice.
    pub fn new(
        ability: AbilityId,
        source: CardId,
        event: EventId,
        player: PlayerId,
        class: AbilityClass,
    ) -> Self {
        Self {
            ability,
            source,
            event,
            event_card: None,
            player,
            class,
            collective: false,
            batch_events: smallvec![event],
        }
    }

    /// Set the card the event happened to (builder pattern).
    #[must_use]
    pub fn with_event_card(mut self, card: Option<CardId>) -> Self {
        self.event_card = card;
        self
    }

    /// Mark the choice as collective (builder pattern).
    #[must_use]
    pub fn collective(mut self) -> Self {
        self.collective = true;
        self
    }

    /// Add another event the collective choice covers.
    pub fn cover_event(&mut self, event: EventId) {
        if !self.batch_events.contains(&event) {
            self.batch_events.push(event);
        }
    }
}

/// (ability, event) pairs already resolved inside one window.
///
/// Collective abilities are recorded against the batch as a whole, so they
/// cannot fire again for a second event of the same batch.
#[derive(Clone, Debug, Default)]
pub struct ResolvedAbilityRecord {
    resolved: FxHashSet<(AbilityId, Option<EventId>)>,
}

impl ResolvedAbilityRecord {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a resolved choice. Returns `false` if it was already recorded.
    pub fn record(&mut self, choice: &AbilityChoice) -> bool {
        let event = if choice.collective { None } else { Some(choice.event) };
        self.resolved.insert((choice.ability, event))
    }

    /// Has this ability resolved for this event (or for the whole batch)?
    #[must_use]
    pub fn contains(&self, ability: AbilityId, event: EventId) -> bool {
        self.resolved.contains(&(ability, Some(event))) || self.contains_collective(ability)
    }

    /// Has this collective ability resolved for the batch?
    #[must_use]
    pub fn contains_collective(&self, ability: AbilityId) -> bool {
        self.resolved.contains(&(ability, None))
    }

    /// Number of recorded resolutions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.resolved.len()
    }

    /// Is the record empty?
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.resolved.is_empty()
    }

    /// Forget everything.
    pub fn clear(&mut self) {
        self.resolved.clear();
    }
}
