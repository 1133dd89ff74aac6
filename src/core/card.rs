//! Card instances as the resolution core sees them.
//!
//! The core needs very little about a card: who controls it, where it is
//! (abilities only trigger from valid locations, and a source that leaves
//! its location makes its pending choices stale), a name for prompt
//! titles, and whether it can respond straight from hand (the private
//! information bluff prompts protect).

use serde::{Deserialize, Serialize};

use super::entity::CardId;
use super::player::PlayerId;

/// Where a card currently is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Location {
    /// In its controller's hand (hidden from the opponent).
    Hand,
    /// In its controller's deck.
    Deck,
    /// Face-down or face-up in a province.
    Province,
    /// In play.
    Play,
    /// In the discard pile.
    Discard,
    /// Removed from the game.
    RemovedFromGame,
}

impl Location {
    /// Is this a location hidden from the opponent?
    #[must_use]
    pub const fn is_hidden(self) -> bool {
        matches!(self, Location::Hand | Location::Deck)
    }
}

/// A card in the game state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    /// Unique handle for this card.
    pub id: CardId,

    /// Display name, used in prompt titles.
    pub name: String,

    /// Current controller.
    pub controller: PlayerId,

    /// Current location.
    pub location: Location,

    /// Can this card be played as a response while it sits in hand?
    pub responds_from_hand: bool,
}

impl Card {
    /// Create a card.
    pub fn new(
        id: CardId,
        name: impl Into<String>,
        controller: PlayerId,
        location: Location,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            controller,
            location,
            responds_from_hand: false,
        }
    }

    /// Mark the card as playable in response from hand (builder pattern).
    #[must_use]
    pub fn responding_from_hand(mut self) -> Self {
        self.responds_from_hand = true;
        self
    }

    /// Is this card in play?
    #[must_use]
    pub fn in_play(&self) -> bool {
        self.location == Location::Play
    }
}
