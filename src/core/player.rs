//! Player identification and per-player data storage.
//!
//! ## PlayerId
//!
//! Type-safe player identifier. The resolution core negotiates between at
//! most two players: priority alternates between a player and their
//! opponent, and a solo game simply has no opponent.
//!
//! ## PlayerMap
//!
//! Per-player data storage backed by `Vec` for O(1) access.

use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

/// Most players a priority window can negotiate between.
pub const MAX_PLAYERS: usize = 2;

/// Player identifier.
///
/// Player indices are 0-based: the first seat is `PlayerId(0)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub u8);

impl PlayerId {
    /// Create a new player ID.
    #[must_use]
    pub const fn new(id: u8) -> Self {
        Self(id)
    }

    /// Get the raw player index (0-based).
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// The other seat in a game of `player_count` players.
    ///
    /// Seats outside the game have no opponent.
    ///
    /// ```
    /// use ccg_resolve::core::PlayerId;
    ///
    /// assert_eq!(PlayerId::new(0).opponent(2), Some(PlayerId::new(1)));
    /// assert_eq!(PlayerId::new(1).opponent(2), Some(PlayerId::new(0)));
    /// assert_eq!(PlayerId::new(0).opponent(1), None);
    /// ```
    #[must_use]
    pub const fn opponent(self, player_count: usize) -> Option<PlayerId> {
        match self.0 {
            _ if player_count < 2 => None,
            0 => Some(PlayerId(1)),
            1 => Some(PlayerId(0)),
            _ => None,
        }
    }

    /// Iterate over all player IDs for a game with `player_count` players.
    pub fn all(player_count: usize) -> impl Iterator<Item = PlayerId> {
        (0..player_count as u8).map(PlayerId)
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Player {}", self.0)
    }
}

/// Per-player data storage with O(1) access.
///
/// ```
/// use ccg_resolve::core::{PlayerId, PlayerMap};
///
/// let mut passed: PlayerMap<bool> = PlayerMap::with_value(2, false);
/// passed[PlayerId::new(1)] = true;
/// assert!(!passed[PlayerId::new(0)]);
/// assert!(passed[PlayerId::new(1)]);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerMap<T> {
    data: Vec<T>,
}

impl<T> PlayerMap<T> {
    /// Create a new PlayerMap with values from a factory function.
    pub fn new(player_count: usize, factory: impl Fn(PlayerId) -> T) -> Self {
        assert!(player_count > 0, "Must have at least 1 player");
        assert!(
            player_count <= MAX_PLAYERS,
            "At most {MAX_PLAYERS} players supported"
        );

        let data = (0..player_count as u8)
            .map(|i| factory(PlayerId(i)))
            .collect();

        Self { data }
    }

    /// Create a new PlayerMap with all entries set to the same value.
    pub fn with_value(player_count: usize, value: T) -> Self
    where
        T: Clone,
    {
        Self::new(player_count, |_| value.clone())
    }

    /// Create a new PlayerMap with default values.
    pub fn with_default(player_count: usize) -> Self
    where
        T: Default,
    {
        Self::new(player_count, |_| T::default())
    }

    /// Get the number of players.
    #[must_use]
    pub fn player_count(&self) -> usize {
        self.data.len()
    }

    /// Get a reference to a player's data.
    #[must_use]
    pub fn get(&self, player: PlayerId) -> &T {
        &self.data[player.index()]
    }

    /// A player's data, or `None` for a seat outside the map.
    #[must_use]
    pub fn try_get(&self, player: PlayerId) -> Option<&T> {
        self.data.get(player.index())
    }

    /// Mutable access to a player's data, or `None` for a seat outside the map.
    pub fn try_get_mut(&mut self, player: PlayerId) -> Option<&mut T> {
        self.data.get_mut(player.index())
    }

    /// Get a mutable reference to a player's data.
    pub fn get_mut(&mut self, player: PlayerId) -> &mut T {
        &mut self.data[player.index()]
    }

    /// Iterate over (PlayerId, &T) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (PlayerId, &T)> {
        self.data
            .iter()
            .enumerate()
            .map(|(i, v)| (PlayerId(i as u8), v))
    }

    /// Iterate over (PlayerId, &mut T) pairs.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (PlayerId, &mut T)> {
        self.data
            .iter_mut()
            .enumerate()
            .map(|(i, v)| (PlayerId(i as u8), v))
    }
}

impl<T> Index<PlayerId> for PlayerMap<T> {
    type Output = T;

    fn index(&self, player: PlayerId) -> &Self::Output {
        self.get(player)
    }
}

impl<T> IndexMut<PlayerId> for PlayerMap<T> {
    fn index_mut(&mut self, player: PlayerId) -> &mut Self::Output {
        self.get_mut(player)
    }
}
