//! The full timing sequence around one event batch.

use tracing::{debug, trace};

use crate::core::{EventId, GameContext};
use crate::pipeline::{Pipeline, Step, StepInput, StepResult, StepStatus};
use crate::prompts::Prompt;
use crate::triggers::{AbilityClass, EventBatch};

use super::triggered::TriggeredAbilityWindow;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Stage {
    Interrupts,
    Handlers,
    Reactions,
    Done,
}

/// Drives one event batch through interrupts, its own handlers and
/// reactions.
///
/// Cancel-interrupts go first, then forced interrupts, then interrupts.
/// Handlers run for the events that survived, then forced reactions and
/// reactions follow unless every event was cancelled. The batch is retired
/// from the event store once the window completes or is cancelled.
pub struct EventWindow {
    name: String,
    batch: EventBatch,
    handlers: Vec<(EventId, Box<dyn Step>)>,
    pipeline: Pipeline,
    stage: Option<Stage>,
}

impl EventWindow {
    /// Create a window for `batch`.
    pub fn new(batch: EventBatch) -> Self {
        Self {
            name: format!("event window ({} events)", batch.len()),
            batch,
            handlers: Vec::new(),
            pipeline: Pipeline::new(),
            stage: None,
        }
    }

    /// Run `handler` for `event` between interrupts and reactions, if the
    /// event has not been cancelled by then (builder pattern).
    #[must_use]
    pub fn with_handler(mut self, event: EventId, handler: impl Step + 'static) -> Self {
        self.handlers.push((event, Box::new(handler)));
        self
    }

    /// The batch this window drives.
    #[must_use]
    pub fn batch(&self) -> &EventBatch {
        &self.batch
    }

    fn queue_windows(&mut self, classes: &[AbilityClass]) {
        for &class in classes {
            self.pipeline
                .queue_tail(TriggeredAbilityWindow::new(self.batch.clone(), class));
        }
    }

    /// Queue the next stage's steps and return it.
    fn next_stage(&mut self, ctx: &mut GameContext) -> Stage {
        match self.stage {
            None => {
                self.queue_windows(&[
                    AbilityClass::CancelInterrupt,
                    AbilityClass::ForcedInterrupt,
                    AbilityClass::Interrupt,
                ]);
                Stage::Interrupts
            }
            Some(Stage::Interrupts) => {
                for (event, handler) in self.handlers.drain(..) {
                    if ctx.events.is_live(event) {
                        self.pipeline.queue_boxed_tail(handler);
                    } else {
                        trace!(event = %event, "skipping handler of cancelled event");
                    }
                }
                Stage::Handlers
            }
            Some(Stage::Handlers) => {
                if ctx.events.all_cancelled(&self.batch) {
                    debug!(window = %self.name, "every event cancelled, skipping reactions");
                } else {
                    self.queue_windows(&[AbilityClass::ForcedReaction, AbilityClass::Reaction]);
                }
                Stage::Reactions
            }
            Some(Stage::Reactions | Stage::Done) => Stage::Done,
        }
    }
}

impl Step for EventWindow {
    fn name(&self) -> &str {
        &self.name
    }

    fn execute(&mut self, ctx: &mut GameContext) -> StepResult {
        loop {
            if !self.pipeline.advance(ctx) {
                return Ok(StepStatus::Suspended);
            }
            let stage = self.next_stage(ctx);
            self.stage = Some(stage);
            if stage == Stage::Done {
                debug!(window = %self.name, "batch retired");
                ctx.events.retire(&self.batch);
                return Ok(StepStatus::Complete);
            }
        }
    }

    fn dispatch_input(&mut self, input: &StepInput, ctx: &mut GameContext) -> bool {
        self.pipeline.dispatch_input(input, ctx)
    }

    fn prompt(&self) -> Option<&Prompt> {
        self.pipeline.active_prompt()
    }

    fn deadline(&self) -> Option<u64> {
        self.pipeline.active_deadline()
    }

    fn cancel(&mut self, ctx: &mut GameContext) {
        self.pipeline.clear(ctx);
        self.handlers.clear();
        ctx.events.retire(&self.batch);
        self.stage = Some(Stage::Done);
    }
}

impl std::fmt::Debug for EventWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventWindow")
            .field("batch", &self.batch)
            .field("stage", &self.stage)
            .field("handlers", &self.handlers.len())
            .field("pipeline", &self.pipeline)
            .finish()
    }
}
