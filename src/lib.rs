//! # ccg-resolve
//!
//! The rules-resolution core of a two-player trading-card game: a
//! cooperative step pipeline, triggered-ability windows with priority
//! passing, and simultaneous-effect ordering.
//!
//! ## Design Principles
//!
//! 1. **Card-Agnostic**: No card text lives here. Games register triggered
//!    abilities against their own event types and resolve them through an
//!    [`AbilityResolver`].
//!
//! 2. **Suspension Is a Return Value**: A step waiting on a decision returns
//!    [`StepStatus::Suspended`]. Nothing blocks; the game advances the
//!    pipeline again after every external action.
//!
//! 3. **One Context**: Every step receives the same [`GameContext`], so a
//!    test builds one, drives a pipeline and inspects the result.
//!
//! ## Modules
//!
//! - `core`: IDs, players, settings, game state, the step context
//! - `pipeline`: Steps, the pipeline, composite steps, error reporting
//! - `prompts`: Pending-decision descriptions and the prompt steps
//! - `triggers`: Events, batches, conditions and triggered abilities
//! - `windows`: Triggered-ability, simultaneous-effect and event windows
//! - `rules`: The game driver and the ability resolver trait

pub mod core;
pub mod pipeline;
pub mod prompts;
pub mod rules;
pub mod triggers;
pub mod windows;

#[cfg(test)]
mod testing;

// Re-export commonly used types
pub use crate::core::{
    AbilityId, CardId, EventId, GameContext, GameState, Location, PlayerId, PlayerMap,
    PlayerSettings, StepError,
};

pub use crate::pipeline::{CompositeStep, Pipeline, SimpleStep, Step, StepInput, StepStatus};

pub use crate::prompts::{MenuPrompt, Prompt, SelectCardPrompt};

pub use crate::rules::{AbilityResolver, Game};

pub use crate::triggers::{
    AbilityChoice, AbilityClass, AbilityRegistry, EventBatch, EventStore, EventTypeConfig,
    EventTypeId, GameEvent, TriggerCondition, TriggeredAbility,
};

pub use crate::windows::{
    BluffPolicy, EventWindow, SimultaneousEffectWindow, TriggeredAbilityWindow,
};
