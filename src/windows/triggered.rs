//! The triggered-ability window.
//!
//! One window negotiates every ability of one class that can respond to a
//! batch. It collects the eligible choices, narrows them down one decision
//! at a time (source, then ability, then event card, then event), resolves
//! the chosen one in its own sub-pipeline and starts over, until both
//! players pass back to back or, for forced classes, nothing is left.
//!
//! ## Optional vs forced
//!
//! The same state machine serves every class:
//!
//! - Optional classes (cancel-interrupt, interrupt, reaction) only offer
//!   the priority holder their own choices, always allow passing, and hand
//!   priority to the opponent after each resolution. A priority holder with
//!   nothing to do either sees a bluff prompt or passes automatically.
//! - Forced classes never allow passing. The first player orders every
//!   outstanding choice, but only when there is a real decision and they
//!   opted into ordering; otherwise choices resolve in collection order.
//!
//! ## Stale choices
//!
//! Choices on offer are re-validated every time the window executes. If one
//! went stale (its source left play, its event was cancelled) the window
//! re-evaluates from scratch, so the player never picks a dead choice.

use tracing::{debug, trace};

use crate::core::{AbilityId, CardId, EventId, GameContext, PlayerId, ResolutionEntry};
use crate::pipeline::{Pipeline, Step, StepInput, StepResult, StepStatus};
use crate::prompts::Prompt;
use crate::triggers::{AbilityChoice, AbilityClass, EventBatch, ResolvedAbilityRecord};

use super::bluff::{BluffAnswer, BluffPrompt};
use super::titles;

const SOURCE_LABEL: &str = "Triggered Abilities";
const PASS: &str = "pass";
const BACK: &str = "back";
const ABILITY_PREFIX: &str = "ability:";
const EVENT_PREFIX: &str = "event:";

/// Where the window is in its negotiation.
#[derive(Debug)]
enum WindowState {
    /// Collect and filter choices, then decide what happens next.
    Evaluate,
    /// Click the source card to use.
    ChooseSource {
        choices: Vec<AbilityChoice>,
        prompt: Prompt,
    },
    /// Pick one of the source's abilities.
    ChooseAbility {
        choices: Vec<AbilityChoice>,
        prompt: Prompt,
    },
    /// Click the card the chosen ability should respond about.
    ChooseEventCard {
        choices: Vec<AbilityChoice>,
        prompt: Prompt,
    },
    /// Pick the event to respond to.
    ChooseEvent {
        choices: Vec<AbilityChoice>,
        prompt: Prompt,
    },
    /// Nothing to do, but the player is shown a decision anyway.
    Bluff(BluffPrompt),
    /// The resolver's step is running in the sub-pipeline.
    Resolving(AbilityChoice),
    Closed,
}

impl WindowState {
    fn offered(&self) -> Option<(&[AbilityChoice], &Prompt)> {
        match self {
            WindowState::ChooseSource { choices, prompt }
            | WindowState::ChooseAbility { choices, prompt }
            | WindowState::ChooseEventCard { choices, prompt }
            | WindowState::ChooseEvent { choices, prompt } => Some((choices, prompt)),
            _ => None,
        }
    }
}

/// Composite step negotiating one class of triggered abilities over one
/// event batch.
///
/// The window only reads its batch. Queue it inside an [`EventWindow`],
/// which retires the batch once every class has run; a window queued on
/// its own leaves the batch open until the caller passes it to
/// [`EventStore::retire`].
///
/// [`EventWindow`]: crate::windows::EventWindow
/// [`EventStore::retire`]: crate::triggers::EventStore::retire
#[derive(Debug)]
pub struct TriggeredAbilityWindow {
    name: String,
    class: AbilityClass,
    batch: EventBatch,
    pipeline: Pipeline,
    resolved: ResolvedAbilityRecord,
    chooser: Option<PlayerId>,
    prev_player_passed: bool,
    state: WindowState,
}

impl TriggeredAbilityWindow {
    /// Create a window for `class` over `batch`.
    pub fn new(batch: EventBatch, class: AbilityClass) -> Self {
        Self {
            name: format!("{class} window"),
            class,
            batch,
            pipeline: Pipeline::new(),
            resolved: ResolvedAbilityRecord::new(),
            chooser: None,
            prev_player_passed: false,
            state: WindowState::Evaluate,
        }
    }

    /// The class of abilities this window negotiates.
    #[must_use]
    pub fn class(&self) -> AbilityClass {
        self.class
    }

    /// The player holding priority, once the window has started.
    #[must_use]
    pub fn chooser(&self) -> Option<PlayerId> {
        self.chooser
    }

    /// What the window has resolved so far.
    #[must_use]
    pub fn resolved(&self) -> &ResolvedAbilityRecord {
        &self.resolved
    }

    /// Has the window closed?
    #[must_use]
    pub fn is_closed(&self) -> bool {
        matches!(self.state, WindowState::Closed)
    }

    // === Evaluation ===

    fn evaluate(&mut self, ctx: &mut GameContext) {
        let Some(chooser) = self.chooser else {
            self.close();
            return;
        };
        let choices = self.collect_choices(chooser, ctx);
        trace!(window = %self.name, player = %chooser, count = choices.len(), "evaluating");

        if self.class.is_forced() {
            let single_ability = choices.windows(2).all(|pair| pair[0].ability == pair[1].ability);
            let ordering = ctx.state.settings(chooser).order_forced_abilities;
            if choices.is_empty() {
                self.close();
            } else if single_ability || !ordering {
                if let Some(first) = choices.into_iter().next() {
                    self.begin_resolution(first, ctx);
                }
            } else {
                self.offer_sources(chooser, choices, ctx);
            }
            return;
        }

        if !choices.is_empty() {
            self.offer_sources(chooser, choices, ctx);
        } else if ctx.bluff_policy().should_prompt(chooser, self.class, &self.batch, ctx) {
            debug!(window = %self.name, player = %chooser, "showing bluff prompt");
            let title = titles::batch_title(self.class, &self.batch, &ctx.events, &ctx.state);
            self.state = WindowState::Bluff(BluffPrompt::new(chooser, title, ctx));
        } else {
            trace!(window = %self.name, player = %chooser, "nothing to do, passing");
            self.pass(ctx);
        }
    }

    /// Eligible choices, filtered to what `chooser` may pick.
    ///
    /// Forced windows offer everything to the chooser, optional ones only
    /// the chooser's own abilities. Cancel-interrupts against an event the
    /// chooser initiated are dropped unless they allow cancelling their own.
    fn collect_choices(&self, chooser: PlayerId, ctx: &GameContext) -> Vec<AbilityChoice> {
        let mut choices = ctx.abilities.collect(
            &ctx.events,
            &self.batch,
            self.class,
            &self.resolved,
            &ctx.state,
        );
        if self.class.is_forced() {
            return choices;
        }

        let may_cancel_own = ctx.state.settings(chooser).cancel_own_abilities;
        choices.retain(|choice| {
            if choice.player != chooser {
                return false;
            }
            if self.class == AbilityClass::CancelInterrupt && !may_cancel_own {
                let initiator = ctx.events.get(choice.event).and_then(|event| event.player);
                return initiator != Some(chooser);
            }
            true
        });
        choices
    }

    fn still_valid(choices: Vec<AbilityChoice>, ctx: &GameContext) -> Vec<AbilityChoice> {
        choices
            .into_iter()
            .filter(|choice| ctx.abilities.validate(choice, &ctx.events, &ctx.state).is_ok())
            .collect()
    }

    // === Narrowing ===

    fn offer_sources(
        &mut self,
        chooser: PlayerId,
        choices: Vec<AbilityChoice>,
        ctx: &mut GameContext,
    ) {
        let sources = distinct(choices.iter().map(|choice| choice.source));
        let optional = !self.class.is_forced();

        // Optional windows always ask, since passing must stay possible.
        if sources.len() == 1 && !optional {
            self.offer_abilities(chooser, choices, false, ctx);
            return;
        }

        let title = titles::batch_title(self.class, &self.batch, &ctx.events, &ctx.state);
        let mut prompt = Prompt::select_card(chooser, title, sources).with_source(SOURCE_LABEL);
        if optional {
            prompt = prompt.with_button("Pass", PASS);
        }
        self.state = WindowState::ChooseSource { choices, prompt };
    }

    fn offer_abilities(
        &mut self,
        chooser: PlayerId,
        choices: Vec<AbilityChoice>,
        can_go_back: bool,
        ctx: &mut GameContext,
    ) {
        let abilities = distinct(choices.iter().map(|choice| choice.ability));
        if abilities.len() < 2 {
            self.offer_event_cards(chooser, choices, ctx);
            return;
        }

        let mut prompt =
            Prompt::menu(chooser, "Which ability would you like to use?").with_source(SOURCE_LABEL);
        for id in abilities {
            let title = ctx
                .abilities
                .get(id)
                .map_or_else(|| id.to_string(), |ability| ability.title.clone());
            prompt = prompt.with_button(title, format!("{ABILITY_PREFIX}{}", id.raw()));
        }
        if can_go_back {
            prompt = prompt.with_button("Back", BACK);
        }
        self.state = WindowState::ChooseAbility { choices, prompt };
    }

    fn offer_event_cards(
        &mut self,
        chooser: PlayerId,
        choices: Vec<AbilityChoice>,
        ctx: &mut GameContext,
    ) {
        let Some(first) = choices.first() else {
            self.state = WindowState::Evaluate;
            return;
        };
        if first.collective {
            let first = first.clone();
            self.begin_resolution(first, ctx);
            return;
        }

        let all_carded = choices.iter().all(|choice| choice.event_card.is_some());
        let cards = distinct(choices.iter().filter_map(|choice| choice.event_card));
        if !all_carded || cards.len() < 2 {
            self.offer_events(chooser, choices, ctx);
            return;
        }

        let prompt = Prompt::select_card(chooser, "Select a card to affect", cards)
            .with_source(SOURCE_LABEL);
        self.state = WindowState::ChooseEventCard { choices, prompt };
    }

    fn offer_events(
        &mut self,
        chooser: PlayerId,
        choices: Vec<AbilityChoice>,
        ctx: &mut GameContext,
    ) {
        if choices.len() == 1 {
            if let Some(choice) = choices.into_iter().next() {
                self.begin_resolution(choice, ctx);
            }
            return;
        }

        let mut prompt =
            Prompt::menu(chooser, "Choose an event to respond to").with_source(SOURCE_LABEL);
        for choice in &choices {
            let text = match ctx.events.get(choice.event) {
                Some(event) => titles::event_action(event, &ctx.events, &ctx.state),
                None => choice.event.to_string(),
            };
            prompt = prompt.with_button(text, format!("{EVENT_PREFIX}{}", choice.event.raw()));
        }
        self.state = WindowState::ChooseEvent { choices, prompt };
    }

    // === Resolution and priority ===

    fn begin_resolution(&mut self, choice: AbilityChoice, ctx: &mut GameContext) {
        if let Err(err) = ctx.abilities.validate(&choice, &ctx.events, &ctx.state) {
            debug!(window = %self.name, error = %err, "dropping stale choice");
            self.state = WindowState::Evaluate;
            return;
        }

        debug!(
            window = %self.name,
            ability = %choice.ability,
            event = %choice.event,
            player = %choice.player,
            "resolving ability"
        );
        let step = ctx.resolver().resolve(&choice, ctx);
        self.pipeline.queue_boxed_tail(step);
        self.state = WindowState::Resolving(choice);
    }

    fn finish_resolution(&mut self, choice: AbilityChoice, ctx: &mut GameContext) {
        self.resolved.record(&choice);
        ctx.state.record_resolution(ResolutionEntry {
            ability: choice.ability,
            event: choice.event,
            player: choice.player,
        });

        if !self.class.is_forced() {
            self.prev_player_passed = false;
            if let Some(opponent) = ctx.state.opponent_of(choice.player) {
                self.chooser = Some(opponent);
            }
        }
        self.state = WindowState::Evaluate;
    }

    fn pass(&mut self, ctx: &GameContext) {
        let opponent = self.chooser.and_then(|chooser| ctx.state.opponent_of(chooser));
        match opponent {
            Some(opponent) if !self.prev_player_passed => {
                debug!(window = %self.name, next = %opponent, "priority passed");
                self.prev_player_passed = true;
                self.chooser = Some(opponent);
                self.state = WindowState::Evaluate;
            }
            _ => self.close(),
        }
    }

    fn close(&mut self) {
        debug!(window = %self.name, resolved = self.resolved.len(), "window closed");
        self.resolved.clear();
        self.state = WindowState::Closed;
    }

    // === Input ===

    fn select_source(&mut self, input: &StepInput, ctx: &mut GameContext) -> bool {
        let state = std::mem::replace(&mut self.state, WindowState::Evaluate);
        let WindowState::ChooseSource { choices, prompt } = state else {
            return false;
        };
        let chooser = prompt.player;
        if input.player() != chooser {
            self.state = WindowState::ChooseSource { choices, prompt };
            return false;
        }

        match input {
            StepInput::MenuButton { arg, .. } if arg == PASS && prompt.has_button(PASS) => {
                debug!(window = %self.name, player = %chooser, "passed");
                self.pass(ctx);
                true
            }
            StepInput::CardClicked { card, .. } if prompt.is_selectable(*card) => {
                let picked = Self::still_valid(filter(&choices, |c| c.source == *card), ctx);
                if picked.is_empty() {
                    self.state = WindowState::ChooseSource { choices, prompt };
                    return false;
                }
                self.offer_abilities(chooser, picked, true, ctx);
                true
            }
            _ => {
                self.state = WindowState::ChooseSource { choices, prompt };
                false
            }
        }
    }

    fn select_ability(&mut self, input: &StepInput, ctx: &mut GameContext) -> bool {
        let state = std::mem::replace(&mut self.state, WindowState::Evaluate);
        let WindowState::ChooseAbility { choices, prompt } = state else {
            return false;
        };
        let chooser = prompt.player;
        let picked = match input {
            StepInput::MenuButton { player, arg }
                if *player == chooser && prompt.has_button(arg) =>
            {
                if arg == BACK {
                    return true;
                }
                parse_id(arg, ABILITY_PREFIX)
                    .map(AbilityId::new)
                    .map(|ability| {
                        Self::still_valid(filter(&choices, |c| c.ability == ability), ctx)
                    })
            }
            _ => None,
        };

        match picked {
            Some(picked) if !picked.is_empty() => {
                self.offer_event_cards(chooser, picked, ctx);
                true
            }
            _ => {
                self.state = WindowState::ChooseAbility { choices, prompt };
                false
            }
        }
    }

    fn select_event_card(&mut self, input: &StepInput, ctx: &mut GameContext) -> bool {
        let state = std::mem::replace(&mut self.state, WindowState::Evaluate);
        let WindowState::ChooseEventCard { choices, prompt } = state else {
            return false;
        };
        let chooser = prompt.player;
        let picked = match input {
            StepInput::CardClicked { player, card }
                if *player == chooser && prompt.is_selectable(*card) =>
            {
                let card: CardId = *card;
                Self::still_valid(filter(&choices, |c| c.event_card == Some(card)), ctx)
            }
            _ => Vec::new(),
        };

        if picked.is_empty() {
            self.state = WindowState::ChooseEventCard { choices, prompt };
            return false;
        }
        self.offer_events(chooser, picked, ctx);
        true
    }

    fn select_event(&mut self, input: &StepInput, ctx: &mut GameContext) -> bool {
        let state = std::mem::replace(&mut self.state, WindowState::Evaluate);
        let WindowState::ChooseEvent { choices, prompt } = state else {
            return false;
        };
        let picked = match input {
            StepInput::MenuButton { player, arg }
                if *player == prompt.player && prompt.has_button(arg) =>
            {
                parse_id(arg, EVENT_PREFIX)
                    .map(EventId::new)
                    .and_then(|event| choices.iter().find(|c| c.event == event).cloned())
                    .filter(|choice| {
                        ctx.abilities.validate(choice, &ctx.events, &ctx.state).is_ok()
                    })
            }
            _ => None,
        };

        match picked {
            Some(choice) => {
                self.begin_resolution(choice, ctx);
                true
            }
            None => {
                self.state = WindowState::ChooseEvent { choices, prompt };
                false
            }
        }
    }

    fn answer_bluff(&mut self, input: &StepInput, ctx: &mut GameContext) -> bool {
        let WindowState::Bluff(bluff) = &mut self.state else {
            return false;
        };
        let player = bluff.player();
        match bluff.answer(input) {
            None => false,
            Some(BluffAnswer::MoreTime) => {
                debug!(window = %self.name, player = %player, "bluff timer stopped");
                bluff.stop_timer();
                true
            }
            Some(BluffAnswer::Pass) => {
                self.pass(ctx);
                true
            }
            Some(BluffAnswer::PauseRound) => {
                debug!(player = %player, "bluff prompts paused until end of round");
                ctx.state.pause_bluff_prompts(player);
                self.pass(ctx);
                true
            }
        }
    }
}

impl Step for TriggeredAbilityWindow {
    fn name(&self) -> &str {
        &self.name
    }

    fn execute(&mut self, ctx: &mut GameContext) -> StepResult {
        if self.chooser.is_none() {
            let first = ctx.state.first_player;
            debug!(window = %self.name, events = self.batch.len(), first = %first, "window opened");
            self.chooser = Some(first);
        }

        loop {
            match &self.state {
                WindowState::Closed => return Ok(StepStatus::Complete),
                WindowState::Evaluate => self.evaluate(ctx),
                WindowState::Bluff(_) => return Ok(StepStatus::Suspended),
                WindowState::Resolving(_) => {
                    if !self.pipeline.advance(ctx) {
                        return Ok(StepStatus::Suspended);
                    }
                    if let WindowState::Resolving(choice) =
                        std::mem::replace(&mut self.state, WindowState::Evaluate)
                    {
                        self.finish_resolution(choice, ctx);
                    }
                }
                state => {
                    let fresh = state.offered().is_some_and(|(choices, _)| {
                        choices
                            .iter()
                            .all(|choice| {
                                ctx.abilities.validate(choice, &ctx.events, &ctx.state).is_ok()
                            })
                    });
                    if fresh {
                        return Ok(StepStatus::Suspended);
                    }
                    debug!(window = %self.name, "offered choice went stale, re-evaluating");
                    self.state = WindowState::Evaluate;
                }
            }
        }
    }

    fn dispatch_input(&mut self, input: &StepInput, ctx: &mut GameContext) -> bool {
        match self.state {
            WindowState::Evaluate | WindowState::Closed => false,
            WindowState::Resolving(_) => self.pipeline.dispatch_input(input, ctx),
            WindowState::Bluff(_) => self.answer_bluff(input, ctx),
            WindowState::ChooseSource { .. } => self.select_source(input, ctx),
            WindowState::ChooseAbility { .. } => self.select_ability(input, ctx),
            WindowState::ChooseEventCard { .. } => self.select_event_card(input, ctx),
            WindowState::ChooseEvent { .. } => self.select_event(input, ctx),
        }
    }

    fn prompt(&self) -> Option<&Prompt> {
        match &self.state {
            WindowState::Bluff(bluff) => Some(bluff.prompt()),
            WindowState::Resolving(_) => self.pipeline.active_prompt(),
            state => state.offered().map(|(_, prompt)| prompt),
        }
    }

    fn deadline(&self) -> Option<u64> {
        match &self.state {
            WindowState::Bluff(bluff) => bluff.deadline(),
            WindowState::Resolving(_) => self.pipeline.active_deadline(),
            _ => None,
        }
    }

    fn on_timeout(&mut self, ctx: &mut GameContext) {
        if matches!(self.state, WindowState::Bluff(_)) {
            debug!(window = %self.name, "bluff timer ran out");
            self.pass(ctx);
        }
    }

    fn cancel(&mut self, ctx: &mut GameContext) {
        debug!(window = %self.name, "window cancelled");
        self.pipeline.clear(ctx);
        self.resolved.clear();
        self.state = WindowState::Closed;
    }
}

/// Unique items, in first-seen order.
fn distinct<T: PartialEq>(items: impl Iterator<Item = T>) -> Vec<T> {
    let mut unique = Vec::new();
    for item in items {
        if !unique.contains(&item) {
            unique.push(item);
        }
    }
    unique
}

fn filter(choices: &[AbilityChoice], keep: impl Fn(&AbilityChoice) -> bool) -> Vec<AbilityChoice> {
    choices.iter().filter(|choice| keep(choice)).cloned().collect()
}

fn parse_id(arg: &str, prefix: &str) -> Option<u32> {
    arg.strip_prefix(prefix)?.parse().ok()
}
