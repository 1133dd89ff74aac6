//! The context object handed to every step.
//!
//! Everything a step may read or mutate is reachable from [`GameContext`]:
//! the game state, the events of open batches, the registered abilities,
//! and the collaborators the core calls out to (ability resolution, error
//! reporting, the bluff policy). Nothing is captured ambiently, so a test
//! builds one context, drives a pipeline against it and inspects the result.

use std::rc::Rc;

use crate::pipeline::{ErrorReporter, Step, TracingReporter};
use crate::rules::AbilityResolver;
use crate::triggers::{AbilityRegistry, EventStore};
use crate::windows::{BluffPolicy, DefaultBluffPolicy};

use super::error::StepError;
use super::state::GameState;

/// Context passed explicitly to every step's execute and input handlers.
pub struct GameContext {
    /// Game state.
    pub state: GameState,

    /// Events of every open batch.
    pub events: EventStore,

    /// Registered triggered abilities.
    pub abilities: AbilityRegistry,

    resolver: Rc<dyn AbilityResolver>,
    reporter: Rc<dyn ErrorReporter>,
    bluff_policy: Rc<dyn BluffPolicy>,

    /// Steps queued by the step currently executing.
    queued: Vec<Box<dyn Step>>,
}

impl GameContext {
    /// Create a context around a state and an ability resolver.
    ///
    /// Errors are reported through `tracing` and the default bluff policy
    /// is used until replaced.
    pub fn new(state: GameState, resolver: Rc<dyn AbilityResolver>) -> Self {
        Self {
            state,
            events: EventStore::new(),
            abilities: AbilityRegistry::new(),
            resolver,
            reporter: Rc::new(TracingReporter),
            bluff_policy: Rc::new(DefaultBluffPolicy),
            queued: Vec::new(),
        }
    }

    /// Replace the error reporter (builder pattern).
    #[must_use]
    pub fn with_reporter(mut self, reporter: Rc<dyn ErrorReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Replace the bluff policy (builder pattern).
    #[must_use]
    pub fn with_bluff_policy(mut self, policy: Rc<dyn BluffPolicy>) -> Self {
        self.bluff_policy = policy;
        self
    }

    /// Current clock time in milliseconds.
    #[must_use]
    pub fn now(&self) -> u64 {
        self.state.clock.now()
    }

    /// The ability resolution service.
    #[must_use]
    pub fn resolver(&self) -> Rc<dyn AbilityResolver> {
        Rc::clone(&self.resolver)
    }

    /// The bluff policy.
    #[must_use]
    pub fn bluff_policy(&self) -> Rc<dyn BluffPolicy> {
        Rc::clone(&self.bluff_policy)
    }

    /// Report a step failure that the pipeline swallowed.
    pub fn report(&self, step: &str, error: &StepError) {
        self.reporter.report(step, error);
    }

    /// Queue a step to run right after the step currently executing.
    ///
    /// The innermost pipeline that is executing picks the step up when the
    /// current step yields, so follow-up work stays nested under it.
    pub fn queue_step(&mut self, step: impl Step + 'static) {
        self.queued.push(Box::new(step));
    }

    /// Queue an already boxed step.
    pub fn queue_boxed_step(&mut self, step: Box<dyn Step>) {
        self.queued.push(step);
    }

    /// Take every step queued since the last call, in queue order.
    pub fn take_queued_steps(&mut self) -> Vec<Box<dyn Step>> {
        std::mem::take(&mut self.queued)
    }
}

impl std::fmt::Debug for GameContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameContext")
            .field("state", &self.state)
            .field("events", &self.events)
            .field("abilities", &self.abilities.len())
            .field("queued", &self.queued.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{AbilityId, CardId, EventId, PlayerId};
    use crate::pipeline::{CollectingReporter, SimpleStep};
    use crate::triggers::{AbilityChoice, AbilityClass};

    struct NoopResolver;

    impl AbilityResolver for NoopResolver {
        fn resolve(&self, _choice: &AbilityChoice, _ctx: &GameContext) -> Box<dyn Step> {
            Box::new(SimpleStep::new("noop", |_| Ok(())))
        }
    }

    fn context() -> GameContext {
        GameContext::new(GameState::new(2), Rc::new(NoopResolver))
    }

    #[test]
    fn test_queue_and_take_steps() {
        let mut ctx = context();
        ctx.queue_step(SimpleStep::new("first", |_| Ok(())));
        ctx.queue_step(SimpleStep::new("second", |_| Ok(())));

        let steps = ctx.take_queued_steps();
        let names: Vec<_> = steps.iter().map(|s| s.name().to_string()).collect();
        assert_eq!(names, vec!["first", "second"]);
        assert!(ctx.take_queued_steps().is_empty());
    }

    #[test]
    fn test_report_goes_to_reporter() {
        let reporter = Rc::new(CollectingReporter::new());
        let ctx = context().with_reporter(reporter.clone());

        ctx.report("resolve", &StepError::failed("boom"));
        assert_eq!(reporter.len(), 1);
    }

    #[test]
    fn test_resolver_is_shared() {
        let ctx = context();
        let choice = AbilityChoice::new(
            AbilityId::new(1),
            CardId::new(1),
            EventId::new(1),
            PlayerId::new(0),
            AbilityClass::Reaction,
        );
        let step = ctx.resolver().resolve(&choice, &ctx);
        assert_eq!(step.name(), "noop");
    }
}
