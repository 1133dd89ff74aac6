//! Identifiers for the objects the resolution core talks about.
//!
//! The core never looks inside cards, rings or abilities. It only needs
//! stable, copyable handles it can compare, hash and print:
//!
//! - [`CardId`]: a card the game has put into the state
//! - [`RingId`]: a ring an event may refer to
//! - [`EventId`]: an event stored in the [`EventStore`](crate::triggers::EventStore)
//! - [`AbilityId`]: a triggered ability registered with the
//!   [`AbilityRegistry`](crate::triggers::AbilityRegistry)
//!
//! ```
//! use ccg_resolve::core::{CardId, EventId};
//!
//! let card = CardId::new(7);
//! assert_eq!(card.raw(), 7);
//! assert_eq!(format!("{}", EventId::new(3)), "Event(3)");
//! ```

use serde::{Deserialize, Serialize};

/// Handle for a card in the game state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CardId(pub u32);

impl CardId {
    /// Create a new card ID.
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

impl std::fmt::Display for CardId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Card({})", self.0)
    }
}

/// Handle for a ring. Games decide what each ring means.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RingId(pub u8);

impl RingId {
    /// Create a new ring ID.
    #[must_use]
    pub const fn new(id: u8) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u8 {
        self.0
    }
}

impl std::fmt::Display for RingId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ring {}", self.0)
    }
}

/// Handle for an event held by the event store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EventId(pub u32);

impl EventId {
    /// Create a new event ID.
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

impl std::fmt::Display for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Event({})", self.0)
    }
}

/// Handle for a registered triggered ability.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AbilityId(pub u32);

impl AbilityId {
    /// Create a new ability ID.
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

impl std::fmt::Display for AbilityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Ability({})", self.0)
    }
}
