//! Shared fixtures for unit tests.

use std::rc::Rc;

use crate::core::{GameContext, GameState};
use crate::pipeline::{SimpleStep, Step};
use crate::rules::AbilityResolver;
use crate::triggers::AbilityChoice;

/// Resolves every ability with a step that does nothing.
pub struct NoopResolver;

impl AbilityResolver for NoopResolver {
    fn resolve(&self, choice: &AbilityChoice, _ctx: &GameContext) -> Box<dyn Step> {
        Box::new(SimpleStep::new(format!("resolve {}", choice.ability), |_| Ok(())))
    }
}

/// A context with default settings and a no-op resolver.
pub fn test_context(player_count: usize) -> GameContext {
    GameContext::new(GameState::new(player_count), Rc::new(NoopResolver))
}
