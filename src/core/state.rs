//! Game state read and written by steps.
//!
//! ## GameState
//!
//! The part of the surrounding game the resolution core needs:
//! - Player count, first player and round number
//! - Per-player settings and bluff-prompt pause flags
//! - Cards with their controller and location
//! - The clock that step deadlines are measured against
//! - A history of every ability resolution, for diagnostics
//!
//! Cards and history use `im` persistent structures so the whole state can
//! be snapshotted in O(1), which is how tests and replays compare a state
//! before and after a window.

use im::{HashMap as ImHashMap, Vector};
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::card::{Card, Location};
use super::config::PlayerSettings;
use super::entity::{AbilityId, CardId, EventId};
use super::player::{PlayerId, PlayerMap};

/// Millisecond clock that step deadlines are measured against.
///
/// The clock only moves when the game driver says so, which keeps
/// timeouts deterministic.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameClock {
    now_ms: u64,
}

impl GameClock {
    /// Current time in milliseconds.
    #[must_use]
    pub const fn now(self) -> u64 {
        self.now_ms
    }

    /// Move the clock forward.
    pub fn advance(&mut self, millis: u64) {
        self.now_ms = self.now_ms.saturating_add(millis);
    }
}

/// One resolved ability, as recorded in the state history.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResolutionEntry {
    /// The ability that resolved.
    pub ability: AbilityId,
    /// The event it responded to (the first event for collective abilities).
    pub event: EventId,
    /// The player who resolved it.
    pub player: PlayerId,
}

/// Game state shared by every step through the context.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GameState {
    player_count: usize,

    /// Player who holds priority first in every window.
    ///
    /// Should be a seat below `player_count`. A seat outside the game reads
    /// default settings and has no opponent, so its windows close on its
    /// first pass.
    pub first_player: PlayerId,

    /// Round number (starts at 1).
    pub round: u32,

    /// Step deadline clock.
    pub clock: GameClock,

    settings: PlayerMap<PlayerSettings>,
    bluff_paused: PlayerMap<bool>,
    cards: ImHashMap<CardId, Card>,
    next_card_id: u32,
    history: Vector<ResolutionEntry>,
}

impl GameState {
    /// Create a new state for one or two players with default settings.
    #[must_use]
    pub fn new(player_count: usize) -> Self {
        Self {
            player_count,
            first_player: PlayerId::new(0),
            round: 1,
            clock: GameClock::default(),
            settings: PlayerMap::with_default(player_count),
            bluff_paused: PlayerMap::with_value(player_count, false),
            cards: ImHashMap::new(),
            next_card_id: 1,
            history: Vector::new(),
        }
    }

    /// Get player count.
    #[must_use]
    pub fn player_count(&self) -> usize {
        self.player_count
    }

    /// The other player, if there is one.
    #[must_use]
    pub fn opponent_of(&self, player: PlayerId) -> Option<PlayerId> {
        player.opponent(self.player_count)
    }

    // === Settings ===

    /// A player's option settings. Seats outside the game read defaults.
    #[must_use]
    pub fn settings(&self, player: PlayerId) -> &PlayerSettings {
        self.settings.try_get(player).unwrap_or(&PlayerSettings::DEFAULT)
    }

    /// Replace a player's option settings.
    pub fn set_settings(&mut self, player: PlayerId, settings: PlayerSettings) {
        match self.settings.try_get_mut(player) {
            Some(slot) => *slot = settings,
            None => warn!(player = %player, "settings for a seat outside the game ignored"),
        }
    }

    /// Has this player asked not to see bluff prompts until the round ends?
    #[must_use]
    pub fn bluff_paused(&self, player: PlayerId) -> bool {
        self.bluff_paused.try_get(player).copied().unwrap_or(false)
    }

    /// Suppress bluff prompts for a player until the end of the round.
    pub fn pause_bluff_prompts(&mut self, player: PlayerId) {
        if let Some(paused) = self.bluff_paused.try_get_mut(player) {
            *paused = true;
        }
    }

    /// End the current round, lifting any bluff-prompt pauses.
    pub fn end_round(&mut self) {
        self.round += 1;
        for (_, paused) in self.bluff_paused.iter_mut() {
            *paused = false;
        }
    }

    // === Cards ===

    /// Allocate a fresh card ID.
    pub fn alloc_card(&mut self) -> CardId {
        let id = CardId::new(self.next_card_id);
        self.next_card_id += 1;
        id
    }

    /// Add a card to the state.
    pub fn add_card(&mut self, card: Card) {
        self.cards.insert(card.id, card);
    }

    /// Allocate an ID and add a plain card in one go.
    pub fn create_card(
        &mut self,
        name: impl Into<String>,
        controller: PlayerId,
        location: Location,
    ) -> CardId {
        let id = self.alloc_card();
        self.add_card(Card::new(id, name, controller, location));
        id
    }

    /// Look up a card.
    #[must_use]
    pub fn card(&self, id: CardId) -> Option<&Card> {
        self.cards.get(&id)
    }

    /// Move a card to a new location. Returns `false` for unknown cards.
    pub fn move_card(&mut self, id: CardId, location: Location) -> bool {
        match self.cards.get_mut(&id) {
            Some(card) => {
                card.location = location;
                true
            }
            None => false,
        }
    }

    /// Remove a card from the state entirely.
    pub fn remove_card(&mut self, id: CardId) -> Option<Card> {
        self.cards.remove(&id)
    }

    /// Every card, in no particular order.
    pub fn cards(&self) -> impl Iterator<Item = &Card> {
        self.cards.values()
    }

    /// Cards controlled by `player` in `location`.
    pub fn cards_in(&self, player: PlayerId, location: Location) -> impl Iterator<Item = &Card> {
        self.cards
            .values()
            .filter(move |card| card.controller == player && card.location == location)
    }

    /// Is the card present and in one of the given locations?
    #[must_use]
    pub fn is_in_location(&self, id: CardId, locations: &[Location]) -> bool {
        self.card(id)
            .is_some_and(|card| locations.contains(&card.location))
    }

    // === History ===

    /// Record a completed ability resolution.
    pub fn record_resolution(&mut self, entry: ResolutionEntry) {
        self.history.push_back(entry);
    }

    /// Every ability resolution so far, oldest first.
    #[must_use]
    pub fn history(&self) -> &Vector<ResolutionEntry> {
        &self.history
    }
}
