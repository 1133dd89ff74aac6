//! The unit of resumable work.

use serde::{Deserialize, Serialize};

use crate::core::{CardId, GameContext, PlayerId, StepError};
use crate::prompts::Prompt;

/// What a step reports after executing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepStatus {
    /// The step has nothing left to do and can be popped.
    Complete,

    /// The step is waiting for input (or a deadline) and must be executed
    /// again later.
    Suspended,
}

impl StepStatus {
    /// Is this `Complete`?
    #[must_use]
    pub const fn is_complete(self) -> bool {
        matches!(self, StepStatus::Complete)
    }
}

/// Result of executing a step.
pub type StepResult = Result<StepStatus, StepError>;

/// External input routed to the active step.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepInput {
    /// A player clicked a card.
    CardClicked { player: PlayerId, card: CardId },

    /// A player pressed a prompt button.
    MenuButton { player: PlayerId, arg: String },
}

impl StepInput {
    /// Build a card click.
    #[must_use]
    pub fn card(player: PlayerId, card: CardId) -> Self {
        Self::CardClicked { player, card }
    }

    /// Build a button press.
    pub fn button(player: PlayerId, arg: impl Into<String>) -> Self {
        Self::MenuButton {
            player,
            arg: arg.into(),
        }
    }

    /// The player who sent the input.
    #[must_use]
    pub fn player(&self) -> PlayerId {
        match self {
            StepInput::CardClicked { player, .. } | StepInput::MenuButton { player, .. } => *player,
        }
    }
}

/// A resumable unit of game progress.
///
/// The owning [`Pipeline`](super::Pipeline) calls [`execute`](Step::execute)
/// every time it advances while this step is at the front, until the step
/// reports [`StepStatus::Complete`]. Suspending is just returning
/// [`StepStatus::Suspended`]; the step picks up where it left off on the
/// next call.
///
/// Everything except `name` and `execute` has a default, so a plain step
/// only implements those two.
pub trait Step {
    /// Short name for logs and error reports.
    fn name(&self) -> &str;

    /// Do as much work as possible.
    fn execute(&mut self, ctx: &mut GameContext) -> StepResult;

    /// Offer external input to this step.
    ///
    /// Returns `true` if the input was consumed. Input that matches nothing
    /// on offer is ignored.
    fn dispatch_input(&mut self, _input: &StepInput, _ctx: &mut GameContext) -> bool {
        false
    }

    /// The decision this step is waiting on, if any.
    fn prompt(&self) -> Option<&Prompt> {
        None
    }

    /// Clock time after which [`on_timeout`](Step::on_timeout) fires.
    fn deadline(&self) -> Option<u64> {
        None
    }

    /// Called by the pipeline, before executing, once the deadline passed.
    fn on_timeout(&mut self, _ctx: &mut GameContext) {}

    /// Can this step be cancelled?
    fn is_cancellable(&self) -> bool {
        true
    }

    /// Abandon the step. Steps owning a pipeline must clear it.
    fn cancel(&mut self, _ctx: &mut GameContext) {}
}
