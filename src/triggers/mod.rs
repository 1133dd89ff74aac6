//! Events and the triggered abilities that respond to them.
//!
//! The system is game-agnostic: games define their own event types and
//! register abilities against them.
//!
//! ## Key Components
//!
//! - [`GameEvent`]: something that happened, with its card, ring, phase
//!   and initiating player
//! - [`EventStore`] / [`EventBatch`]: the events of one triggering action
//! - [`TriggerCondition`]: rules narrowing which events an ability sees
//! - [`TriggeredAbility`] / [`AbilityRegistry`]: abilities and their lookup
//! - [`AbilityChoice`] / [`ResolvedAbilityRecord`]: what a window offers,
//!   and what it has already resolved
//!
//! ## Example Usage
//!
//! ```
//! use ccg_resolve::core::{GameState, Location, PlayerId};
//! use ccg_resolve::triggers::{
//!     AbilityClass, AbilityRegistry, EventStore, EventTypeId, GameEvent,
//!     ResolvedAbilityRecord, TriggerCondition, TriggeredAbility,
//! };
//!
//! const CARD_PLAYED: EventTypeId = EventTypeId::new(1);
//!
//! let mut state = GameState::new(2);
//! let envoy = state.create_card("Kaiu Envoy", PlayerId::new(0), Location::Play);
//!
//! // "Reaction: after your opponent plays a card, draw a card."
//! let mut registry = AbilityRegistry::new();
//! registry.register(
//!     TriggeredAbility::new("Draw", envoy, AbilityClass::Reaction, CARD_PLAYED)
//!         .with_condition(TriggerCondition::InitiatedByOpponent),
//! );
//!
//! let mut events = EventStore::new();
//! let batch = events.open_batch([GameEvent::new(CARD_PLAYED).with_player(PlayerId::new(1))]);
//!
//! let choices = registry.collect(
//!     &events,
//!     &batch,
//!     AbilityClass::Reaction,
//!     &ResolvedAbilityRecord::new(),
//!     &state,
//! );
//! assert_eq!(choices.len(), 1);
//! assert_eq!(choices[0].player, PlayerId::new(0));
//! ```

mod ability;
mod batch;
mod choice;
mod condition;
mod event;

pub use ability::{AbilityClass, AbilityRegistry, TriggeredAbility};
pub use batch::{EventBatch, EventStore};
pub use choice::{AbilityChoice, ResolvedAbilityRecord};
pub use condition::{ConditionContext, ConditionEvaluator, CustomEval, TriggerCondition};
pub use event::{EventTypeConfig, EventTypeId, GameEvent};
