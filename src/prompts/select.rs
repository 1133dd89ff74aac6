//! Choose-a-card prompt step.

use tracing::debug;

use crate::core::{Card, CardId, GameContext, PlayerId, StepError};
use crate::pipeline::{Step, StepInput, StepResult, StepStatus};

use super::prompt::Prompt;

type CardCondition = Box<dyn Fn(&Card, &GameContext) -> bool>;
type SelectHandler = Box<dyn FnOnce(&mut GameContext, CardId) -> Result<(), StepError>>;

/// Suspends until the player clicks a card matching the condition.
///
/// The selectable set is recomputed on every execute, so a card that stops
/// matching (it left play, say) can no longer be picked. A prompt with
/// nothing selectable completes without calling the handler.
pub struct SelectCardPrompt {
    prompt: Prompt,
    condition: CardCondition,
    on_select: Option<SelectHandler>,
    outcome: Option<Result<(), StepError>>,
}

impl SelectCardPrompt {
    /// Create a prompt for `player` to pick a card matching `condition`.
    pub fn new(
        player: PlayerId,
        title: impl Into<String>,
        condition: impl Fn(&Card, &GameContext) -> bool + 'static,
        on_select: impl FnOnce(&mut GameContext, CardId) -> Result<(), StepError> + 'static,
    ) -> Self {
        Self {
            prompt: Prompt::select_card(player, title, Vec::new()),
            condition: Box::new(condition),
            on_select: Some(Box::new(on_select)),
            outcome: None,
        }
    }

    fn matching_cards(&self, ctx: &GameContext) -> Vec<CardId> {
        let mut cards: Vec<CardId> = ctx
            .state
            .cards()
            .filter(|card| (self.condition)(card, ctx))
            .map(|card| card.id)
            .collect();
        cards.sort();
        cards
    }
}

impl Step for SelectCardPrompt {
    fn name(&self) -> &str {
        &self.prompt.title
    }

    fn execute(&mut self, ctx: &mut GameContext) -> StepResult {
        if let Some(outcome) = self.outcome.take() {
            outcome?;
            return Ok(StepStatus::Complete);
        }

        let cards = self.matching_cards(ctx);
        if cards.is_empty() {
            debug!(title = %self.prompt.title, "nothing selectable, skipping prompt");
            return Ok(StepStatus::Complete);
        }
        self.prompt = Prompt::select_card(self.prompt.player, self.prompt.title.clone(), cards)
            .with_source(self.prompt.source.clone());
        Ok(StepStatus::Suspended)
    }

    fn dispatch_input(&mut self, input: &StepInput, ctx: &mut GameContext) -> bool {
        let StepInput::CardClicked { player, card } = input else {
            return false;
        };
        if *player != self.prompt.player || !self.prompt.is_selectable(*card) {
            return false;
        }
        let still_matches = ctx
            .state
            .card(*card)
            .is_some_and(|c| (self.condition)(c, ctx));
        if !still_matches {
            return false;
        }
        let Some(handler) = self.on_select.take() else {
            return false;
        };

        debug!(player = %player, card = %card, "card selected");
        self.outcome = Some(handler(ctx, *card));
        true
    }

    fn prompt(&self) -> Option<&Prompt> {
        if self.on_select.is_some() && !self.prompt.selectable().is_empty() {
            Some(&self.prompt)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;
    use crate::core::Location;
    use crate::pipeline::Pipeline;
    use crate::testing::test_context;

    #[test]
    fn test_select_matching_card() {
        let mut ctx = test_context(2);
        let p0 = PlayerId::new(0);
        let ally = ctx.state.create_card("Ally", p0, Location::Play);
        let enemy = ctx.state.create_card("Enemy", PlayerId::new(1), Location::Play);

        let picked = Rc::new(Cell::new(None));
        let record = Rc::clone(&picked);
        let mut pipeline = Pipeline::new();
        pipeline.queue_tail(SelectCardPrompt::new(
            p0,
            "Choose a character",
            move |card, _| card.controller == PlayerId::new(0),
            move |_, card| {
                record.set(Some(card));
                Ok(())
            },
        ));

        assert!(!pipeline.advance(&mut ctx));
        assert_eq!(pipeline.active_prompt().unwrap().selectable(), &[ally]);

        assert!(!pipeline.dispatch_input(&StepInput::card(p0, enemy), &mut ctx));
        assert!(pipeline.dispatch_input(&StepInput::card(p0, ally), &mut ctx));
        assert!(pipeline.advance(&mut ctx));
        assert_eq!(picked.get(), Some(ally));
    }

    #[test]
    fn test_card_leaving_play_is_no_longer_selectable() {
        let mut ctx = test_context(2);
        let p0 = PlayerId::new(0);
        let card = ctx.state.create_card("Ally", p0, Location::Play);

        let mut pipeline = Pipeline::new();
        pipeline.queue_tail(SelectCardPrompt::new(
            p0,
            "Choose a character",
            |card, _| card.in_play(),
            |_, _| Ok(()),
        ));
        assert!(!pipeline.advance(&mut ctx));

        ctx.state.move_card(card, Location::Discard);
        assert!(!pipeline.dispatch_input(&StepInput::card(p0, card), &mut ctx));
        assert!(pipeline.advance(&mut ctx));
    }
}
