//! Bluff prompts.
//!
//! When a player has nothing to respond with, passing silently would tell
//! the opponent so. A [`BluffPolicy`] decides when to show a decision
//! anyway; the [`BluffPrompt`] is that decision: a timer, a pass button,
//! a button that stops the timer, and a button that passes and suppresses
//! bluff prompts until the round ends. None of it changes what resolves.

use crate::core::{GameContext, Location, PlayerId};
use crate::pipeline::StepInput;
use crate::prompts::Prompt;
use crate::triggers::{AbilityClass, EventBatch};

const PASS: &str = "pass";
const MORE_TIME: &str = "more-time";
const PAUSE_ROUND: &str = "pause-round";

/// Decides whether a player with no legal choices is shown a prompt.
pub trait BluffPolicy {
    fn should_prompt(
        &self,
        player: PlayerId,
        class: AbilityClass,
        batch: &EventBatch,
        ctx: &GameContext,
    ) -> bool;
}

/// Prompts according to the player's bluff settings.
///
/// A player is prompted while holding a card that can respond from hand,
/// if they opted into that, or in a cancel-interrupt window over a hidden
/// event their opponent initiated, if they opted into that. Never while
/// their bluff prompts are paused for the round.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultBluffPolicy;

impl BluffPolicy for DefaultBluffPolicy {
    fn should_prompt(
        &self,
        player: PlayerId,
        class: AbilityClass,
        batch: &EventBatch,
        ctx: &GameContext,
    ) -> bool {
        if class.is_forced() || ctx.state.bluff_paused(player) {
            return false;
        }
        let settings = ctx.state.settings(player);

        if settings.bluff_with_events_in_hand
            && ctx
                .state
                .cards_in(player, Location::Hand)
                .any(|card| card.responds_from_hand)
        {
            return true;
        }

        if class == AbilityClass::CancelInterrupt && settings.bluff_on_opponent_events {
            let opponent = ctx.state.opponent_of(player);
            return opponent.is_some()
                && ctx
                    .events
                    .live(batch)
                    .any(|event| event.from_hidden && event.player == opponent);
        }

        false
    }
}

/// Never shows bluff prompts.
#[derive(Clone, Copy, Debug, Default)]
pub struct NeverBluff;

impl BluffPolicy for NeverBluff {
    fn should_prompt(&self, _: PlayerId, _: AbilityClass, _: &EventBatch, _: &GameContext) -> bool {
        false
    }
}

/// A player's answer to a bluff prompt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BluffAnswer {
    Pass,
    /// Keep the prompt but stop its timer.
    MoreTime,
    /// Pass, and skip bluff prompts until the round ends.
    PauseRound,
}

/// The pass-or-wait decision shown to a player with nothing to do.
#[derive(Clone, Debug)]
pub struct BluffPrompt {
    prompt: Prompt,
}

impl BluffPrompt {
    /// Create the prompt, starting its timer from the player's settings.
    pub fn new(player: PlayerId, title: impl Into<String>, ctx: &GameContext) -> Self {
        let timer = ctx.state.settings(player).bluff_timer_ms;
        let deadline = (timer > 0).then(|| ctx.now().saturating_add(timer));
        let prompt = Prompt::menu(player, title)
            .with_source("Triggered Abilities")
            .with_button("Pass", PASS)
            .with_button("I need more time", MORE_TIME)
            .with_button("Don't ask again until end of round", PAUSE_ROUND)
            .with_deadline(deadline);
        Self { prompt }
    }

    /// The deciding player.
    #[must_use]
    pub fn player(&self) -> PlayerId {
        self.prompt.player
    }

    /// The prompt to show.
    #[must_use]
    pub fn prompt(&self) -> &Prompt {
        &self.prompt
    }

    /// When the timer runs out, if it is running.
    #[must_use]
    pub fn deadline(&self) -> Option<u64> {
        self.prompt.deadline
    }

    /// Interpret input. `None` for anything that isn't one of our buttons
    /// pressed by the deciding player.
    #[must_use]
    pub fn answer(&self, input: &StepInput) -> Option<BluffAnswer> {
        let StepInput::MenuButton { player, arg } = input else {
            return None;
        };
        if *player != self.prompt.player || !self.prompt.has_button(arg) {
            return None;
        }
        match arg.as_str() {
            PASS => Some(BluffAnswer::Pass),
            MORE_TIME => Some(BluffAnswer::MoreTime),
            PAUSE_ROUND => Some(BluffAnswer::PauseRound),
            _ => None,
        }
    }

    /// Stop the timer and drop the more-time button.
    pub fn stop_timer(&mut self) {
        self.prompt.deadline = None;
        self.prompt.buttons.retain(|button| button.arg != MORE_TIME);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Card, PlayerSettings};
    use crate::testing::test_context;
    use crate::triggers::{EventTypeId, GameEvent};

    const PLAYED: EventTypeId = EventTypeId::new(1);

    #[test]
    fn test_default_policy_needs_opt_in() {
        let mut ctx = test_context(2);
        let p0 = PlayerId::new(0);
        let id = ctx.state.alloc_card();
        ctx.state
            .add_card(Card::new(id, "Banzai!", p0, Location::Hand).responding_from_hand());
        let batch = ctx.events.open_batch([GameEvent::new(PLAYED)]);

        assert!(!DefaultBluffPolicy.should_prompt(p0, AbilityClass::Reaction, &batch, &ctx));

        ctx.state.set_settings(p0, PlayerSettings::default().bluffing_with_hand());
        assert!(DefaultBluffPolicy.should_prompt(p0, AbilityClass::Reaction, &batch, &ctx));
        assert!(!DefaultBluffPolicy.should_prompt(p0, AbilityClass::ForcedReaction, &batch, &ctx));

        ctx.state.pause_bluff_prompts(p0);
        assert!(!DefaultBluffPolicy.should_prompt(p0, AbilityClass::Reaction, &batch, &ctx));
    }

    #[test]
    fn test_default_policy_hidden_opponent_events() {
        let mut ctx = test_context(2);
        let p0 = PlayerId::new(0);
        ctx.state
            .set_settings(p0, PlayerSettings::default().bluffing_on_opponent_events());
        let hidden = ctx
            .events
            .open_batch([GameEvent::new(PLAYED).with_player(PlayerId::new(1)).hidden()]);
        let own = ctx.events.open_batch([GameEvent::new(PLAYED).with_player(p0).hidden()]);

        assert!(DefaultBluffPolicy.should_prompt(p0, AbilityClass::CancelInterrupt, &hidden, &ctx));
        assert!(!DefaultBluffPolicy.should_prompt(p0, AbilityClass::Interrupt, &hidden, &ctx));
        assert!(!DefaultBluffPolicy.should_prompt(p0, AbilityClass::CancelInterrupt, &own, &ctx));
        assert!(!NeverBluff.should_prompt(p0, AbilityClass::CancelInterrupt, &hidden, &ctx));
    }

    #[test]
    fn test_prompt_timer_and_answers() {
        let mut ctx = test_context(2);
        let p1 = PlayerId::new(1);
        ctx.state.clock.advance(500);
        ctx.state.set_settings(p1, PlayerSettings::default().with_bluff_timer(3_000));

        let mut bluff = BluffPrompt::new(p1, "Any reactions?", &ctx);
        assert_eq!(bluff.deadline(), Some(3_500));
        assert_eq!(bluff.prompt().source, "Triggered Abilities");
        assert_eq!(bluff.answer(&StepInput::button(p1, "pass")), Some(BluffAnswer::Pass));
        assert_eq!(bluff.answer(&StepInput::button(PlayerId::new(0), "pass")), None);
        let pause = StepInput::button(p1, "pause-round");
        assert_eq!(bluff.answer(&pause), Some(BluffAnswer::PauseRound));
        assert_eq!(bluff.answer(&StepInput::button(p1, "more-time")), Some(BluffAnswer::MoreTime));

        bluff.stop_timer();
        assert_eq!(bluff.deadline(), None);
        assert_eq!(bluff.answer(&StepInput::button(p1, "more-time")), None);
        assert_eq!(
            bluff.prompt().button_texts(),
            vec!["Pass", "Don't ask again until end of round"]
        );
    }

    #[test]
    fn test_zero_timer_means_no_deadline() {
        let mut ctx = test_context(2);
        let p0 = PlayerId::new(0);
        ctx.state.set_settings(p0, PlayerSettings::default().with_bluff_timer(0));
        assert_eq!(BluffPrompt::new(p0, "Any interrupts?", &ctx).deadline(), None);
    }
}
