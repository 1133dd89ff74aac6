//! A step that owns a nested pipeline.

use crate::core::GameContext;
use crate::prompts::Prompt;

use super::queue::Pipeline;
use super::step::{Step, StepInput, StepResult, StepStatus};

/// A step whose work is a private sub-pipeline.
///
/// Executing the step advances the sub-pipeline; input and prompts are
/// forwarded to its active step; cancelling clears it. The step is
/// complete exactly when its sub-pipeline is empty, so resolution trees
/// nest to any depth and every level behaves the same.
///
/// ```
/// use ccg_resolve::pipeline::{CompositeStep, SimpleStep, Step};
///
/// let step = CompositeStep::new("pay costs then resolve")
///     .with_step(SimpleStep::new("pay costs", |_| Ok(())))
///     .with_step(SimpleStep::new("apply effect", |_| Ok(())));
///
/// assert_eq!(step.pipeline().len(), 2);
/// ```
#[derive(Debug)]
pub struct CompositeStep {
    name: String,
    pipeline: Pipeline,
}

impl CompositeStep {
    /// Create an empty composite step.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pipeline: Pipeline::new(),
        }
    }

    /// Add a step to the sub-pipeline (builder pattern).
    #[must_use]
    pub fn with_step(mut self, step: impl Step + 'static) -> Self {
        self.pipeline.queue_tail(step);
        self
    }

    /// Queue a step at the tail of the sub-pipeline.
    pub fn queue_step(&mut self, step: impl Step + 'static) {
        self.pipeline.queue_tail(step);
    }

    /// The sub-pipeline.
    #[must_use]
    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }
}

impl Step for CompositeStep {
    fn name(&self) -> &str {
        &self.name
    }

    fn execute(&mut self, ctx: &mut GameContext) -> StepResult {
        if self.pipeline.advance(ctx) {
            Ok(StepStatus::Complete)
        } else {
            Ok(StepStatus::Suspended)
        }
    }

    fn dispatch_input(&mut self, input: &StepInput, ctx: &mut GameContext) -> bool {
        self.pipeline.dispatch_input(input, ctx)
    }

    fn prompt(&self) -> Option<&Prompt> {
        self.pipeline.active_prompt()
    }

    // The sub-pipeline runs the nested timeout handler when it advances.
    fn deadline(&self) -> Option<u64> {
        self.pipeline.active_deadline()
    }

    fn cancel(&mut self, ctx: &mut GameContext) {
        self.pipeline.clear(ctx);
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::core::PlayerId;
    use crate::pipeline::SimpleStep;
    use crate::prompts::MenuPrompt;
    use crate::testing::test_context;

    #[test]
    fn test_composite_runs_children_before_completing() {
        let mut ctx = test_context(2);
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut outer = Pipeline::new();

        let (a, b, c) = (Rc::clone(&log), Rc::clone(&log), Rc::clone(&log));
        outer.queue_tail(
            CompositeStep::new("nested")
                .with_step(SimpleStep::new("a", move |_| {
                    a.borrow_mut().push("a");
                    Ok(())
                }))
                .with_step(SimpleStep::new("b", move |_| {
                    b.borrow_mut().push("b");
                    Ok(())
                })),
        );
        outer.queue_tail(SimpleStep::new("c", move |_| {
            c.borrow_mut().push("c");
            Ok(())
        }));

        assert!(outer.advance(&mut ctx));
        assert_eq!(*log.borrow(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_input_and_prompt_reach_nested_leaf() {
        let mut ctx = test_context(2);
        let chosen = Rc::new(RefCell::new(None));
        let mut outer = Pipeline::new();

        let record = Rc::clone(&chosen);
        let inner = CompositeStep::new("level 1").with_step(
            CompositeStep::new("level 2").with_step(
                MenuPrompt::new(PlayerId::new(1), "Pick one").with_choice("Left", move |_| {
                    *record.borrow_mut() = Some("left");
                    Ok(())
                }),
            ),
        );
        outer.queue_tail(inner);

        assert!(!outer.advance(&mut ctx));
        let prompt = outer.active_prompt().unwrap();
        assert_eq!(prompt.player, PlayerId::new(1));
        assert_eq!(prompt.title, "Pick one");

        let press = crate::pipeline::StepInput::button(PlayerId::new(1), "Left");
        assert!(outer.dispatch_input(&press, &mut ctx));
        assert!(outer.advance(&mut ctx));
        assert_eq!(*chosen.borrow(), Some("left"));
    }

    #[test]
    fn test_cancel_clears_sub_pipeline_transitively() {
        let mut ctx = test_context(2);
        let ran = Rc::new(RefCell::new(false));
        let mut outer = Pipeline::new();

        let flag = Rc::clone(&ran);
        outer.queue_tail(
            CompositeStep::new("outer")
                .with_step(CompositeStep::new("inner").with_step(
                    MenuPrompt::new(PlayerId::new(0), "Wait").with_choice("Go", |_| Ok(())),
                ))
                .with_step(SimpleStep::new("never", move |_| {
                    *flag.borrow_mut() = true;
                    Ok(())
                })),
        );

        assert!(!outer.advance(&mut ctx));
        assert!(outer.cancel_active(&mut ctx));
        assert!(outer.is_empty());
        assert!(outer.active_prompt().is_none());
        assert!(outer.advance(&mut ctx));
        assert!(!*ran.borrow());
    }
}
