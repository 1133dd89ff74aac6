//! A step that runs one closure once.

use crate::core::{GameContext, StepError};

use super::step::{Step, StepResult, StepStatus};

type Handler = Box<dyn FnOnce(&mut GameContext) -> Result<(), StepError>>;

/// Runs a closure the first time it executes, then completes.
///
/// ```
/// use ccg_resolve::pipeline::{SimpleStep, Step};
///
/// let step = SimpleStep::new("draw a card", |_ctx| Ok(()));
/// assert_eq!(step.name(), "draw a card");
/// ```
pub struct SimpleStep {
    name: String,
    handler: Option<Handler>,
}

impl SimpleStep {
    /// Create a step from a name and a closure.
    pub fn new(
        name: impl Into<String>,
        handler: impl FnOnce(&mut GameContext) -> Result<(), StepError> + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            handler: Some(Box::new(handler)),
        }
    }
}

impl Step for SimpleStep {
    fn name(&self) -> &str {
        &self.name
    }

    fn execute(&mut self, ctx: &mut GameContext) -> StepResult {
        if let Some(handler) = self.handler.take() {
            handler(ctx)?;
        }
        Ok(StepStatus::Complete)
    }

    fn cancel(&mut self, _ctx: &mut GameContext) {
        self.handler = None;
    }
}

impl std::fmt::Debug for SimpleStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimpleStep")
            .field("name", &self.name)
            .field("pending", &self.handler.is_some())
            .finish()
    }
}
