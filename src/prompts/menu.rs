//! Choose-from-menu prompt step.

use tracing::debug;

use crate::core::{GameContext, PlayerId, StepError};
use crate::pipeline::{Step, StepInput, StepResult, StepStatus};

use super::prompt::Prompt;

type MenuHandler = Box<dyn FnOnce(&mut GameContext) -> Result<(), StepError>>;

/// Suspends until the player presses one of its buttons, then runs the
/// handler bound to that button.
///
/// Each button's arg is its text. A handler failure surfaces on the next
/// execute, so the pipeline reports it like any other step failure.
pub struct MenuPrompt {
    prompt: Prompt,
    handlers: Vec<(String, MenuHandler)>,
    outcome: Option<Result<(), StepError>>,
}

impl MenuPrompt {
    /// Create a menu with no buttons yet.
    pub fn new(player: PlayerId, title: impl Into<String>) -> Self {
        Self {
            prompt: Prompt::menu(player, title),
            handlers: Vec::new(),
            outcome: None,
        }
    }

    /// Set the prompt source (builder pattern).
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.prompt = self.prompt.with_source(source);
        self
    }

    /// Add a button and its handler (builder pattern).
    #[must_use]
    pub fn with_choice(
        mut self,
        text: impl Into<String>,
        handler: impl FnOnce(&mut GameContext) -> Result<(), StepError> + 'static,
    ) -> Self {
        let text = text.into();
        self.prompt = self.prompt.with_button(text.clone(), text.clone());
        self.handlers.push((text, Box::new(handler)));
        self
    }
}

impl Step for MenuPrompt {
    fn name(&self) -> &str {
        &self.prompt.title
    }

    fn execute(&mut self, _ctx: &mut GameContext) -> StepResult {
        match self.outcome.take() {
            None => Ok(StepStatus::Suspended),
            Some(Ok(())) => Ok(StepStatus::Complete),
            Some(Err(err)) => Err(err),
        }
    }

    fn dispatch_input(&mut self, input: &StepInput, ctx: &mut GameContext) -> bool {
        if self.outcome.is_some() {
            return false;
        }
        let StepInput::MenuButton { player, arg } = input else {
            return false;
        };
        if *player != self.prompt.player {
            return false;
        }
        let Some(index) = self.handlers.iter().position(|(text, _)| text == arg) else {
            return false;
        };

        debug!(player = %player, choice = %arg, "menu choice");
        let (_, handler) = self.handlers.swap_remove(index);
        self.outcome = Some(handler(ctx));
        true
    }

    fn prompt(&self) -> Option<&Prompt> {
        if self.outcome.is_some() {
            None
        } else {
            Some(&self.prompt)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;
    use crate::pipeline::{CollectingReporter, Pipeline};
    use crate::testing::test_context;

    #[test]
    fn test_menu_runs_chosen_handler() {
        let mut ctx = test_context(2);
        let picked = Rc::new(Cell::new(0));
        let mut pipeline = Pipeline::new();

        let (one, two) = (Rc::clone(&picked), Rc::clone(&picked));
        pipeline.queue_tail(
            MenuPrompt::new(PlayerId::new(0), "Pick")
                .with_choice("One", move |_| {
                    one.set(1);
                    Ok(())
                })
                .with_choice("Two", move |_| {
                    two.set(2);
                    Ok(())
                }),
        );

        assert!(!pipeline.advance(&mut ctx));
        assert_eq!(pipeline.active_prompt().unwrap().button_texts(), vec!["One", "Two"]);

        assert!(pipeline.dispatch_input(&StepInput::button(PlayerId::new(0), "Two"), &mut ctx));
        assert!(pipeline.advance(&mut ctx));
        assert_eq!(picked.get(), 2);
    }

    #[test]
    fn test_menu_ignores_other_player_and_unknown_buttons() {
        let mut ctx = test_context(2);
        let mut pipeline = Pipeline::new();
        pipeline
            .queue_tail(MenuPrompt::new(PlayerId::new(0), "Pick").with_choice("Yes", |_| Ok(())));
        assert!(!pipeline.advance(&mut ctx));

        assert!(!pipeline.dispatch_input(&StepInput::button(PlayerId::new(1), "Yes"), &mut ctx));
        assert!(!pipeline.dispatch_input(&StepInput::button(PlayerId::new(0), "No"), &mut ctx));
        assert!(!pipeline.advance(&mut ctx));
    }

    #[test]
    fn test_failing_handler_is_reported() {
        let reporter = Rc::new(CollectingReporter::new());
        let mut ctx = test_context(2).with_reporter(reporter.clone());
        let mut pipeline = Pipeline::new();
        pipeline.queue_tail(
            MenuPrompt::new(PlayerId::new(0), "Pick")
                .with_choice("Boom", |_| Err(StepError::failed("handler exploded"))),
        );

        assert!(!pipeline.advance(&mut ctx));
        assert!(pipeline.dispatch_input(&StepInput::button(PlayerId::new(0), "Boom"), &mut ctx));
        assert!(pipeline.advance(&mut ctx));
        assert_eq!(reporter.len(), 1);
    }
}
