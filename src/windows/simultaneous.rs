//! The simultaneous-effect window.

use tracing::debug;

use crate::core::{GameContext, PlayerId};
use crate::pipeline::{Pipeline, Step, StepInput, StepResult, StepStatus};
use crate::prompts::Prompt;

const SOURCE_LABEL: &str = "Order Simultaneous effects";
const EFFECT_PREFIX: &str = "effect:";

type Condition = Box<dyn Fn(&GameContext) -> bool>;

struct Entry {
    id: u32,
    title: String,
    condition: Condition,
    action: Box<dyn Step>,
}

enum WindowState {
    Evaluate,
    Choosing(Prompt),
    Resolving,
    Closed,
}

/// Orders a set of effects that take place at the same time.
///
/// Effects are registered before the window runs, each with a condition
/// that must still hold when it comes up. The first player chooses the
/// order if they asked to order forced effects and more than one applies;
/// otherwise effects resolve in registration order.
///
/// ```
/// use ccg_resolve::pipeline::{Pipeline, SimpleStep};
/// use ccg_resolve::windows::SimultaneousEffectWindow;
/// # use std::rc::Rc;
/// # use ccg_resolve::core::{GameContext, GameState};
/// # use ccg_resolve::pipeline::Step;
/// # use ccg_resolve::rules::AbilityResolver;
/// # use ccg_resolve::triggers::AbilityChoice;
/// # struct Noop;
/// # impl AbilityResolver for Noop {
/// #     fn resolve(&self, _: &AbilityChoice, _: &GameContext) -> Box<dyn Step> {
/// #         Box::new(SimpleStep::new("noop", |_| Ok(())))
/// #     }
/// # }
/// # let mut ctx = GameContext::new(GameState::new(2), Rc::new(Noop));
///
/// let mut window = SimultaneousEffectWindow::new();
/// window.add_effect("Gain 1 honor", |_| true, SimpleStep::new("gain honor", |_| Ok(())));
/// window.add_effect("Never", |_| false, SimpleStep::new("skipped", |_| Ok(())));
///
/// let mut pipeline = Pipeline::new();
/// pipeline.queue_tail(window);
/// assert!(pipeline.advance(&mut ctx));
/// ```
pub struct SimultaneousEffectWindow {
    entries: Vec<Entry>,
    next_id: u32,
    chooser: Option<PlayerId>,
    pipeline: Pipeline,
    state: WindowState,
}

impl SimultaneousEffectWindow {
    /// Create an empty window.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 0,
            chooser: None,
            pipeline: Pipeline::new(),
            state: WindowState::Evaluate,
        }
    }

    /// Register an effect.
    pub fn add_effect(
        &mut self,
        title: impl Into<String>,
        condition: impl Fn(&GameContext) -> bool + 'static,
        action: impl Step + 'static,
    ) {
        self.entries.push(Entry {
            id: self.next_id,
            title: title.into(),
            condition: Box::new(condition),
            action: Box::new(action),
        });
        self.next_id += 1;
    }

    /// Register an effect (builder pattern).
    #[must_use]
    pub fn with_effect(
        mut self,
        title: impl Into<String>,
        condition: impl Fn(&GameContext) -> bool + 'static,
        action: impl Step + 'static,
    ) -> Self {
        self.add_effect(title, condition, action);
        self
    }

    /// Number of effects not yet resolved or dropped.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Has every effect resolved or been dropped?
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn evaluate(&mut self, ctx: &GameContext) {
        self.entries.retain(|entry| {
            let holds = (entry.condition)(ctx);
            if !holds {
                debug!(effect = %entry.title, "effect no longer applies");
            }
            holds
        });

        let Some(first) = self.entries.first() else {
            self.state = WindowState::Closed;
            return;
        };
        let chooser = *self.chooser.get_or_insert(ctx.state.first_player);

        if self.entries.len() == 1 || !ctx.state.settings(chooser).order_forced_abilities {
            let id = first.id;
            self.resolve(id);
            return;
        }

        let menu =
            Prompt::menu(chooser, "Choose an effect to be resolved").with_source(SOURCE_LABEL);
        let prompt = self.entries.iter().fold(menu, |prompt, entry| {
            prompt.with_button(entry.title.clone(), format!("{EFFECT_PREFIX}{}", entry.id))
        });
        self.state = WindowState::Choosing(prompt);
    }

    fn resolve(&mut self, id: u32) -> bool {
        let Some(index) = self.entries.iter().position(|entry| entry.id == id) else {
            return false;
        };
        let entry = self.entries.remove(index);
        debug!(effect = %entry.title, "resolving simultaneous effect");
        self.pipeline.queue_boxed_tail(entry.action);
        self.state = WindowState::Resolving;
        true
    }
}

impl Default for SimultaneousEffectWindow {
    fn default() -> Self {
        Self::new()
    }
}

impl Step for SimultaneousEffectWindow {
    fn name(&self) -> &str {
        "simultaneous effects"
    }

    fn execute(&mut self, ctx: &mut GameContext) -> StepResult {
        loop {
            match self.state {
                WindowState::Closed => return Ok(StepStatus::Complete),
                WindowState::Choosing(_) => {
                    if self.entries.iter().all(|entry| (entry.condition)(ctx)) {
                        return Ok(StepStatus::Suspended);
                    }
                    debug!("offered effect no longer applies, re-evaluating");
                    self.state = WindowState::Evaluate;
                }
                WindowState::Evaluate => self.evaluate(ctx),
                WindowState::Resolving => {
                    if !self.pipeline.advance(ctx) {
                        return Ok(StepStatus::Suspended);
                    }
                    self.state = WindowState::Evaluate;
                }
            }
        }
    }

    fn dispatch_input(&mut self, input: &StepInput, ctx: &mut GameContext) -> bool {
        let prompt = match &self.state {
            WindowState::Resolving => return self.pipeline.dispatch_input(input, ctx),
            WindowState::Choosing(prompt) => prompt,
            _ => return false,
        };
        let StepInput::MenuButton { player, arg } = input else {
            return false;
        };
        if *player != prompt.player || !prompt.has_button(arg) {
            return false;
        }

        let Some(id) = arg.strip_prefix(EFFECT_PREFIX).and_then(|raw| raw.parse().ok()) else {
            return false;
        };
        let holds = self
            .entries
            .iter()
            .find(|entry| entry.id == id)
            .map(|entry| (entry.condition)(ctx));
        match holds {
            Some(true) => self.resolve(id),
            // Stale pick: rebuild the menu from what still applies
            Some(false) => {
                self.evaluate(ctx);
                true
            }
            None => false,
        }
    }

    fn prompt(&self) -> Option<&Prompt> {
        match &self.state {
            WindowState::Choosing(prompt) => Some(prompt),
            WindowState::Resolving => self.pipeline.active_prompt(),
            _ => None,
        }
    }

    fn deadline(&self) -> Option<u64> {
        match self.state {
            WindowState::Resolving => self.pipeline.active_deadline(),
            _ => None,
        }
    }

    fn cancel(&mut self, ctx: &mut GameContext) {
        self.pipeline.clear(ctx);
        self.entries.clear();
        self.state = WindowState::Closed;
    }
}

impl std::fmt::Debug for SimultaneousEffectWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let titles: Vec<&str> = self.entries.iter().map(|entry| entry.title.as_str()).collect();
        f.debug_struct("SimultaneousEffectWindow")
            .field("effects", &titles)
            .field("chooser", &self.chooser)
            .field("pipeline", &self.pipeline)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::core::PlayerSettings;
    use crate::pipeline::SimpleStep;
    use crate::testing::test_context;

    type Log = Rc<RefCell<Vec<&'static str>>>;

    fn logging(log: &Log, name: &'static str) -> SimpleStep {
        let log = Rc::clone(log);
        SimpleStep::new(name, move |_| {
            log.borrow_mut().push(name);
            Ok(())
        })
    }

    #[test]
    fn test_registration_order_without_ordering() {
        let mut ctx = test_context(2);
        let log: Log = Rc::default();
        let window = SimultaneousEffectWindow::new()
            .with_effect("Air", |_| true, logging(&log, "air"))
            .with_effect("Fire", |_| true, logging(&log, "fire"));

        let mut pipeline = Pipeline::new();
        pipeline.queue_tail(window);
        assert!(pipeline.advance(&mut ctx));
        assert_eq!(*log.borrow(), vec!["air", "fire"]);
    }

    #[test]
    fn test_first_player_orders_effects() {
        let mut ctx = test_context(2);
        ctx.state.first_player = PlayerId::new(1);
        ctx.state
            .set_settings(PlayerId::new(1), PlayerSettings::default().ordering_forced_abilities());
        let log: Log = Rc::default();
        let window = SimultaneousEffectWindow::new()
            .with_effect("Air", |_| true, logging(&log, "air"))
            .with_effect("Fire", |_| true, logging(&log, "fire"))
            .with_effect("Void", |_| true, logging(&log, "void"));

        let mut pipeline = Pipeline::new();
        pipeline.queue_tail(window);
        assert!(!pipeline.advance(&mut ctx));

        let prompt = pipeline.active_prompt().unwrap();
        assert_eq!(prompt.player, PlayerId::new(1));
        assert_eq!(prompt.title, "Choose an effect to be resolved");
        assert_eq!(prompt.source, "Order Simultaneous effects");
        assert_eq!(prompt.button_texts(), vec!["Air", "Fire", "Void"]);

        let pick = StepInput::button(PlayerId::new(0), "effect:2");
        assert!(!pipeline.dispatch_input(&pick, &mut ctx));
        let pick = StepInput::button(PlayerId::new(1), "effect:2");
        assert!(pipeline.dispatch_input(&pick, &mut ctx));
        assert!(!pipeline.advance(&mut ctx));
        assert_eq!(pipeline.active_prompt().unwrap().button_texts(), vec!["Air", "Fire"]);

        let pick = StepInput::button(PlayerId::new(1), "effect:1");
        assert!(pipeline.dispatch_input(&pick, &mut ctx));
        assert!(pipeline.advance(&mut ctx));
        assert_eq!(*log.borrow(), vec!["void", "fire", "air"]);
    }

    #[test]
    fn test_conditions_rechecked_between_effects() {
        let mut ctx = test_context(2);
        let log: Log = Rc::default();
        let window = SimultaneousEffectWindow::new()
            .with_effect(
                "End the round",
                |_| true,
                SimpleStep::new("end round", |ctx| {
                    ctx.state.end_round();
                    Ok(())
                }),
            )
            .with_effect("Only in round 1", |ctx| ctx.state.round == 1, logging(&log, "late"));

        let mut pipeline = Pipeline::new();
        pipeline.queue_tail(window);
        assert!(pipeline.advance(&mut ctx));
        assert!(log.borrow().is_empty());
    }

    fn ordering_context() -> GameContext {
        let mut ctx = test_context(2);
        ctx.state
            .set_settings(PlayerId::new(0), PlayerSettings::default().ordering_forced_abilities());
        ctx
    }

    #[test]
    fn test_stale_pick_does_not_resolve() {
        let mut ctx = ordering_context();
        let log: Log = Rc::default();
        let window = SimultaneousEffectWindow::new()
            .with_effect("Round 1 only", |ctx| ctx.state.round == 1, logging(&log, "round 1"))
            .with_effect("Other", |_| true, logging(&log, "other"));

        let mut pipeline = Pipeline::new();
        pipeline.queue_tail(window);
        assert!(!pipeline.advance(&mut ctx));
        let offered = pipeline.active_prompt().unwrap().button_texts();
        assert_eq!(offered, vec!["Round 1 only", "Other"]);

        ctx.state.end_round();
        let pick = StepInput::button(PlayerId::new(0), "effect:0");
        assert!(pipeline.dispatch_input(&pick, &mut ctx));
        assert!(pipeline.advance(&mut ctx));
        assert_eq!(*log.borrow(), vec!["other"]);
    }

    #[test]
    fn test_menu_rebuilt_when_offered_effect_lapses() {
        let mut ctx = ordering_context();
        let log: Log = Rc::default();
        let window = SimultaneousEffectWindow::new()
            .with_effect("Round 1 only", |ctx| ctx.state.round == 1, logging(&log, "round 1"))
            .with_effect("Air", |_| true, logging(&log, "air"))
            .with_effect("Fire", |_| true, logging(&log, "fire"));

        let mut pipeline = Pipeline::new();
        pipeline.queue_tail(window);
        assert!(!pipeline.advance(&mut ctx));

        ctx.state.end_round();
        assert!(!pipeline.advance(&mut ctx));
        assert_eq!(pipeline.active_prompt().unwrap().button_texts(), vec!["Air", "Fire"]);
        let lapsed = StepInput::button(PlayerId::new(0), "effect:0");
        assert!(!pipeline.dispatch_input(&lapsed, &mut ctx));
    }

    #[test]
    fn test_cancel_drops_pending_effects() {
        let mut ctx = test_context(2);
        ctx.state
            .set_settings(PlayerId::new(0), PlayerSettings::default().ordering_forced_abilities());
        let log: Log = Rc::default();
        let window = SimultaneousEffectWindow::new()
            .with_effect("Air", |_| true, logging(&log, "air"))
            .with_effect("Fire", |_| true, logging(&log, "fire"));

        let mut pipeline = Pipeline::new();
        pipeline.queue_tail(window);
        assert!(!pipeline.advance(&mut ctx));
        assert!(pipeline.cancel_active(&mut ctx));
        assert!(pipeline.advance(&mut ctx));
        assert!(log.borrow().is_empty());
    }
}
