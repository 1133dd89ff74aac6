//! Ordered queue of steps with a single active cursor.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::core::GameContext;
use crate::prompts::Prompt;

use super::step::{Step, StepInput, StepStatus};

/// Identity of a step within its pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StepId(pub u32);

impl std::fmt::Display for StepId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Step({})", self.0)
    }
}

/// A queued step plus the bookkeeping the pipeline keeps for it.
struct Slot {
    id: StepId,
    started: bool,
    step: Box<dyn Step>,
}

/// Ordered, mutable queue of steps.
///
/// The front step is the active one once it has started executing. At most
/// one step is active at a time, and queueing never displaces it: steps
/// queued at the head while a step is active go right behind it, in the
/// order they were queued.
///
/// ## Driving
///
/// [`advance`](Pipeline::advance) is the only driving primitive. The game
/// loop calls it after every externally observable action:
///
/// ```
/// # use std::rc::Rc;
/// # use ccg_resolve::core::{GameContext, GameState};
/// # use ccg_resolve::pipeline::{Pipeline, SimpleStep, Step};
/// # use ccg_resolve::rules::AbilityResolver;
/// # use ccg_resolve::triggers::AbilityChoice;
/// # struct Noop;
/// # impl AbilityResolver for Noop {
/// #     fn resolve(&self, _: &AbilityChoice, _: &GameContext) -> Box<dyn Step> {
/// #         Box::new(SimpleStep::new("noop", |_| Ok(())))
/// #     }
/// # }
/// let mut ctx = GameContext::new(GameState::new(2), Rc::new(Noop));
/// let mut pipeline = Pipeline::new();
///
/// pipeline.queue_tail(SimpleStep::new("draw", |ctx| {
///     ctx.state.round += 1;
///     Ok(())
/// }));
///
/// assert!(pipeline.advance(&mut ctx));
/// assert!(pipeline.is_empty());
/// assert_eq!(ctx.state.round, 2);
/// ```
#[derive(Default)]
pub struct Pipeline {
    slots: VecDeque<Slot>,

    /// Steps inserted behind the active step since it started.
    inserted_behind_active: usize,

    next_id: u32,
}

impl Pipeline {
    /// Create an empty pipeline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of queued steps, the active one included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Is the pipeline empty?
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Is a step currently active?
    #[must_use]
    pub fn has_active_step(&self) -> bool {
        self.slots.front().is_some_and(|slot| slot.started)
    }

    /// Name of the front step.
    #[must_use]
    pub fn current_step_name(&self) -> Option<&str> {
        self.slots.front().map(|slot| slot.step.name())
    }

    /// Names of all queued steps, front first.
    #[must_use]
    pub fn step_names(&self) -> Vec<&str> {
        self.slots.iter().map(|slot| slot.step.name()).collect()
    }

    /// Queue a step at the tail.
    pub fn queue_tail(&mut self, step: impl Step + 'static) -> StepId {
        self.queue_boxed_tail(Box::new(step))
    }

    /// Queue a boxed step at the tail.
    pub fn queue_boxed_tail(&mut self, step: Box<dyn Step>) -> StepId {
        let id = self.alloc_id();
        self.slots.push_back(Slot {
            id,
            started: false,
            step,
        });
        id
    }

    /// Queue a step at the head, behind the active step if there is one.
    pub fn queue_head(&mut self, step: impl Step + 'static) -> StepId {
        self.queue_boxed_head(Box::new(step))
    }

    /// Queue a boxed step at the head, behind the active step if there is one.
    pub fn queue_boxed_head(&mut self, step: Box<dyn Step>) -> StepId {
        let id = self.alloc_id();
        let slot = Slot {
            id,
            started: false,
            step,
        };

        if self.has_active_step() {
            self.inserted_behind_active += 1;
            self.slots.insert(self.inserted_behind_active, slot);
        } else {
            self.slots.push_front(slot);
        }
        id
    }

    /// Run steps until one suspends or the pipeline empties.
    ///
    /// Returns `true` once the pipeline is empty and `false` as soon as a
    /// step suspends. A step whose deadline has passed gets its timeout
    /// handler called before it executes. A step that fails is reported
    /// through the context and treated as complete.
    pub fn advance(&mut self, ctx: &mut GameContext) -> bool {
        loop {
            let now = ctx.now();
            let Some(slot) = self.slots.front_mut() else {
                return true;
            };

            if slot.step.deadline().is_some_and(|deadline| now >= deadline) {
                debug!(step = slot.step.name(), now, "step deadline passed");
                slot.step.on_timeout(ctx);
            }

            if !slot.started {
                trace!(step = slot.step.name(), id = %slot.id, "starting step");
                slot.started = true;
            }

            let status = match slot.step.execute(ctx) {
                Ok(status) => status,
                Err(err) => {
                    ctx.report(slot.step.name(), &err);
                    StepStatus::Complete
                }
            };

            self.absorb_queued(ctx);

            match status {
                StepStatus::Complete => self.pop_front(),
                StepStatus::Suspended => return false,
            }
        }
    }

    /// Route input to the front step.
    ///
    /// Returns whether some step consumed it. Input with nobody to receive
    /// it is a no-op.
    pub fn dispatch_input(&mut self, input: &StepInput, ctx: &mut GameContext) -> bool {
        let Some(slot) = self.slots.front_mut() else {
            return false;
        };

        let consumed = slot.step.dispatch_input(input, ctx);
        self.absorb_queued(ctx);
        consumed
    }

    /// The decision the front step is waiting on.
    #[must_use]
    pub fn active_prompt(&self) -> Option<&Prompt> {
        self.slots.front().and_then(|slot| slot.step.prompt())
    }

    /// Deadline of the front step, if it has one.
    #[must_use]
    pub fn active_deadline(&self) -> Option<u64> {
        self.slots.front().and_then(|slot| slot.step.deadline())
    }

    /// Cancel and drop the front step.
    ///
    /// Returns `false` if there is no step or it refuses cancellation.
    pub fn cancel_active(&mut self, ctx: &mut GameContext) -> bool {
        let Some(slot) = self.slots.front_mut() else {
            return false;
        };
        if !slot.step.is_cancellable() {
            return false;
        }

        debug!(step = slot.step.name(), "cancelling step");
        slot.step.cancel(ctx);
        self.pop_front();
        true
    }

    /// Cancel and drop every queued step.
    pub fn clear(&mut self, ctx: &mut GameContext) {
        for mut slot in self.slots.drain(..) {
            slot.step.cancel(ctx);
        }
        self.inserted_behind_active = 0;
    }

    fn pop_front(&mut self) {
        self.slots.pop_front();
        self.inserted_behind_active = 0;
    }

    /// Move steps queued through the context in behind the active step.
    fn absorb_queued(&mut self, ctx: &mut GameContext) {
        for step in ctx.take_queued_steps() {
            self.queue_boxed_head(step);
        }
    }

    fn alloc_id(&mut self) -> StepId {
        let id = StepId(self.next_id);
        self.next_id += 1;
        id
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("steps", &self.step_names())
            .field("active", &self.has_active_step())
            .finish()
    }
}
