//! Configuration consulted by the resolution core.
//!
//! - `PlayerSettings`: per-player toggles that change when the windows
//!   prompt, what they filter, and how long bluff timers run
//! - `PhaseId`: opaque phase identifier carried by events
//!
//! Games own the values; the core only reads them.

use serde::{Deserialize, Serialize};

/// Default bluff prompt timer, in milliseconds.
pub const DEFAULT_BLUFF_TIMER_MS: u64 = 10_000;

/// Per-player option settings.
///
/// ## Example
///
/// ```
/// use ccg_resolve::core::PlayerSettings;
///
/// let settings = PlayerSettings::default()
///     .ordering_forced_abilities()
///     .with_bluff_timer(5_000);
///
/// assert!(settings.order_forced_abilities);
/// assert!(!settings.cancel_own_abilities);
/// assert_eq!(settings.bluff_timer_ms, 5_000);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSettings {
    /// Prompt to order simultaneous forced abilities instead of resolving
    /// them in collection order.
    pub order_forced_abilities: bool,

    /// Allow cancel-interrupts against abilities this player initiated.
    pub cancel_own_abilities: bool,

    /// Show bluff prompts while holding a card that can respond from hand.
    pub bluff_with_events_in_hand: bool,

    /// Show bluff prompts in cancel-interrupt windows for hidden events the
    /// opponent initiated.
    pub bluff_on_opponent_events: bool,

    /// Bluff prompt timer. `0` means no timer.
    pub bluff_timer_ms: u64,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl PlayerSettings {
    /// Settings for a player who changed nothing.
    pub const DEFAULT: Self = Self {
        order_forced_abilities: false,
        cancel_own_abilities: false,
        bluff_with_events_in_hand: false,
        bluff_on_opponent_events: false,
        bluff_timer_ms: DEFAULT_BLUFF_TIMER_MS,
    };

    /// Enable manual ordering of forced abilities.
    #[must_use]
    pub fn ordering_forced_abilities(mut self) -> Self {
        self.order_forced_abilities = true;
        self
    }

    /// Allow cancelling this player's own abilities.
    #[must_use]
    pub fn cancelling_own_abilities(mut self) -> Self {
        self.cancel_own_abilities = true;
        self
    }

    /// Opt into bluff prompts while holding responses in hand.
    #[must_use]
    pub fn bluffing_with_hand(mut self) -> Self {
        self.bluff_with_events_in_hand = true;
        self
    }

    /// Opt into bluff prompts for hidden opponent-initiated events.
    #[must_use]
    pub fn bluffing_on_opponent_events(mut self) -> Self {
        self.bluff_on_opponent_events = true;
        self
    }

    /// Set the bluff prompt timer.
    #[must_use]
    pub fn with_bluff_timer(mut self, millis: u64) -> Self {
        self.bluff_timer_ms = millis;
        self
    }
}

/// Opaque phase identifier. Games define their own phases.
///
/// The core doesn't interpret phase IDs. They only show up in event
/// descriptions and trigger conditions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PhaseId(pub u32);

impl PhaseId {
    /// Create a new phase ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for PhaseId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "phase {}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = PlayerSettings::default();
        assert!(!settings.order_forced_abilities);
        assert!(!settings.cancel_own_abilities);
        assert!(!settings.bluff_with_events_in_hand);
        assert!(!settings.bluff_on_opponent_events);
        assert_eq!(settings.bluff_timer_ms, DEFAULT_BLUFF_TIMER_MS);
    }

    #[test]
    fn test_settings_builders() {
        let settings = PlayerSettings::default()
            .cancelling_own_abilities()
            .bluffing_with_hand()
            .bluffing_on_opponent_events()
            .with_bluff_timer(0);

        assert!(settings.cancel_own_abilities);
        assert!(settings.bluff_with_events_in_hand);
        assert!(settings.bluff_on_opponent_events);
        assert_eq!(settings.bluff_timer_ms, 0);
    }

    #[test]
    fn test_settings_serialization() {
        let settings = PlayerSettings::default().ordering_forced_abilities();
        let json = serde_json::to_string(&settings).unwrap();
        let back: PlayerSettings = serde_json::from_str(&json).unwrap();
        assert_eq!(settings, back);
    }

    #[test]
    fn test_phase_display() {
        assert_eq!(format!("{}", PhaseId::new(3)), "phase 3");
    }
}
