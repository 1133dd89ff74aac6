//! The game driver and the ability resolution service.
//!
//! The core never interprets card text. When a window resolves an ability
//! it asks the [`AbilityResolver`] for a step that carries out the effect,
//! and runs that step in its own sub-pipeline.

use std::rc::Rc;

use tracing::{debug, trace};

use crate::core::{CardId, GameContext, GameState, PlayerId};
use crate::pipeline::{Pipeline, Step, StepId, StepInput};
use crate::prompts::Prompt;
use crate::triggers::{AbilityChoice, EventBatch, GameEvent};
use crate::windows::EventWindow;

/// Turns a chosen ability into the step that resolves it.
///
/// Games implement this trait to attach card-specific behavior. The
/// returned step may itself prompt, open nested windows or fail; the
/// window treats it like any other step.
pub trait AbilityResolver {
    /// Build the resolution step for `choice`.
    fn resolve(&self, choice: &AbilityChoice, ctx: &GameContext) -> Box<dyn Step>;
}

/// Owns the root pipeline and the context it runs against.
///
/// Every external action goes through the game: it routes the input to the
/// active step, then advances the pipeline until something suspends.
///
/// ```
/// use ccg_resolve::core::{GameContext, GameState, Location, PlayerId};
/// use ccg_resolve::pipeline::{SimpleStep, Step};
/// use ccg_resolve::rules::{AbilityResolver, Game};
/// use ccg_resolve::triggers::{
///     AbilityChoice, AbilityClass, EventTypeId, GameEvent, TriggeredAbility,
/// };
/// use std::rc::Rc;
///
/// struct Noop;
///
/// impl AbilityResolver for Noop {
///     fn resolve(&self, _: &AbilityChoice, _: &GameContext) -> Box<dyn Step> {
///         Box::new(SimpleStep::new("noop", |_| Ok(())))
///     }
/// }
///
/// const CARD_PLAYED: EventTypeId = EventTypeId::new(1);
///
/// let mut game = Game::new(GameState::new(2), Rc::new(Noop));
/// let ctx = game.context_mut();
/// let envoy = ctx.state.create_card("Kaiu Envoy", PlayerId::new(0), Location::Play);
/// ctx.abilities
///     .register(TriggeredAbility::new("Draw", envoy, AbilityClass::Reaction, CARD_PLAYED));
///
/// game.open_event_window([GameEvent::new(CARD_PLAYED)]);
/// assert!(!game.continue_game());
/// assert!(game.active_prompt(PlayerId::new(0)).is_some());
///
/// assert!(game.card_clicked(PlayerId::new(0), envoy));
/// assert_eq!(game.state().history().len(), 1);
/// ```
pub struct Game {
    ctx: GameContext,
    pipeline: Pipeline,
}

impl Game {
    /// Create a game around a state and an ability resolver.
    pub fn new(state: GameState, resolver: Rc<dyn AbilityResolver>) -> Self {
        Self::from_context(GameContext::new(state, resolver))
    }

    /// Create a game around an already configured context.
    pub fn from_context(ctx: GameContext) -> Self {
        Self {
            ctx,
            pipeline: Pipeline::new(),
        }
    }

    /// The context steps run against.
    #[must_use]
    pub fn context(&self) -> &GameContext {
        &self.ctx
    }

    /// Mutable access to the context, for setup between actions.
    pub fn context_mut(&mut self) -> &mut GameContext {
        &mut self.ctx
    }

    /// The game state.
    #[must_use]
    pub fn state(&self) -> &GameState {
        &self.ctx.state
    }

    /// The root pipeline.
    #[must_use]
    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Queue a step at the tail of the root pipeline.
    pub fn queue_step(&mut self, step: impl Step + 'static) -> StepId {
        self.pipeline.queue_tail(step)
    }

    /// Open a batch and queue an [`EventWindow`] for it.
    ///
    /// Use [`EventStore::open_batch`](crate::triggers::EventStore::open_batch)
    /// and [`queue_step`](Game::queue_step) instead when the events need
    /// handlers.
    pub fn open_event_window(&mut self, events: impl IntoIterator<Item = GameEvent>) -> EventBatch {
        let batch = self.ctx.events.open_batch(events);
        debug!(events = batch.len(), "opening event window");
        self.pipeline.queue_tail(EventWindow::new(batch.clone()));
        batch
    }

    /// Advance the root pipeline.
    ///
    /// Returns `true` when there is nothing left to run.
    pub fn continue_game(&mut self) -> bool {
        self.pipeline.advance(&mut self.ctx)
    }

    /// A player clicked a card. Returns whether the click was used.
    pub fn card_clicked(&mut self, player: PlayerId, card: CardId) -> bool {
        self.input(&StepInput::card(player, card))
    }

    /// A player pressed a prompt button. Returns whether the press was used.
    pub fn menu_button(&mut self, player: PlayerId, arg: impl Into<String>) -> bool {
        self.input(&StepInput::button(player, arg))
    }

    /// Move the clock forward, then advance so expired deadlines fire.
    pub fn tick(&mut self, millis: u64) -> bool {
        self.ctx.state.clock.advance(millis);
        trace!(now = self.ctx.now(), "clock tick");
        self.continue_game()
    }

    /// End the round, lifting bluff-prompt pauses.
    pub fn end_round(&mut self) {
        self.ctx.state.end_round();
        debug!(round = self.ctx.state.round, "round ended");
    }

    /// The decision waiting on `player`, if any.
    #[must_use]
    pub fn active_prompt(&self, player: PlayerId) -> Option<&Prompt> {
        self.pipeline
            .active_prompt()
            .filter(|prompt| prompt.player == player)
    }

    /// The decision the game is waiting on, whoever makes it.
    #[must_use]
    pub fn pending_prompt(&self) -> Option<&Prompt> {
        self.pipeline.active_prompt()
    }

    /// When the active step times out, if it has a timer running.
    #[must_use]
    pub fn next_deadline(&self) -> Option<u64> {
        self.pipeline.active_deadline()
    }

    fn input(&mut self, input: &StepInput) -> bool {
        let consumed = self.pipeline.dispatch_input(input, &mut self.ctx);
        if consumed {
            self.continue_game();
        } else {
            trace!(player = %input.player(), "input ignored");
        }
        consumed
    }
}

impl std::fmt::Debug for Game {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Game")
            .field("pipeline", &self.pipeline)
            .field("ctx", &self.ctx)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Location, PlayerSettings};
    use crate::testing::NoopResolver;
    use crate::triggers::{AbilityClass, EventTypeId, TriggeredAbility};

    const PLAYED: EventTypeId = EventTypeId::new(1);

    fn game() -> Game {
        Game::new(GameState::new(2), Rc::new(NoopResolver))
    }

    #[test]
    fn test_empty_game_is_idle() {
        let mut game = game();
        assert!(game.continue_game());
        assert!(game.pending_prompt().is_none());
        assert_eq!(game.next_deadline(), None);
    }

    #[test]
    fn test_prompt_only_visible_to_its_player() {
        let mut game = game();
        let ctx = game.context_mut();
        let card = ctx.state.create_card("Watcher", PlayerId::new(1), Location::Play);
        ctx.abilities
            .register(TriggeredAbility::new("Watch", card, AbilityClass::Interrupt, PLAYED));

        game.open_event_window([GameEvent::new(PLAYED)]);
        assert!(!game.continue_game());
        assert!(game.active_prompt(PlayerId::new(0)).is_none());
        assert!(game.active_prompt(PlayerId::new(1)).is_some());

        assert!(!game.card_clicked(PlayerId::new(0), card));
        assert!(game.menu_button(PlayerId::new(1), "pass"));
        assert!(game.pending_prompt().is_none());
        assert!(game.context().events.is_empty());
    }

    #[test]
    fn test_tick_fires_bluff_timeout() {
        let mut game = game();
        let ctx = game.context_mut();
        let id = ctx.state.alloc_card();
        ctx.state.add_card(
            crate::core::Card::new(id, "Banzai!", PlayerId::new(0), Location::Hand)
                .responding_from_hand(),
        );
        ctx.state.set_settings(
            PlayerId::new(0),
            PlayerSettings::default().bluffing_with_hand().with_bluff_timer(1_000),
        );

        game.open_event_window([GameEvent::new(PLAYED)]);
        assert!(!game.continue_game());
        assert_eq!(game.next_deadline(), Some(1_000));

        // The cancel-interrupt bluff times out; the interrupt window asks again.
        assert!(!game.tick(500));
        assert!(!game.tick(500));
        assert_eq!(game.next_deadline(), Some(2_000));

        assert!(game.menu_button(PlayerId::new(0), "pause-round"));
        assert!(game.pending_prompt().is_none());
        assert!(game.continue_game());
    }
}
