//! Core types: identifiers, players, settings, state and the step context.
//!
//! Everything here is a leaf the pipeline and the windows build on. Steps
//! see the game only through [`GameContext`].

pub mod entity;
pub mod player;
pub mod config;
pub mod card;
pub mod state;
pub mod error;
pub mod context;

pub use entity::{AbilityId, CardId, EventId, RingId};
pub use player::{PlayerId, PlayerMap, MAX_PLAYERS};
pub use config::{PhaseId, PlayerSettings, DEFAULT_BLUFF_TIMER_MS};
pub use card::{Card, Location};
pub use state::{GameClock, GameState, ResolutionEntry};
pub use error::StepError;
pub use context::GameContext;
