//! Cooperative step-execution pipeline.
//!
//! All game progress is a tree of [`Step`]s. A [`Pipeline`] holds an ordered
//! queue of steps and runs them one at a time; a [`CompositeStep`] owns a
//! pipeline of its own, so a sub-resolution is just another step.
//!
//! ## Scheduling Model
//!
//! Single-threaded and cooperative. A step never blocks: when it needs a
//! decision it returns [`StepStatus::Suspended`] and the pipeline stops.
//! The surrounding game calls [`Pipeline::advance`] again after every
//! external action (a click, a button press, a clock tick), and input
//! reaches the waiting step through [`Pipeline::dispatch_input`].
//!
//! ## Failures
//!
//! A step returning an error is reported to the context's
//! [`ErrorReporter`] and treated as complete. Forward progress wins over
//! finishing a half-applied effect.
//!
//! ## Example Usage
//!
//! ```
//! use std::rc::Rc;
//! use ccg_resolve::core::{GameContext, GameState};
//! use ccg_resolve::pipeline::{CompositeStep, Pipeline, SimpleStep, Step};
//! use ccg_resolve::rules::AbilityResolver;
//! use ccg_resolve::triggers::AbilityChoice;
//!
//! struct Noop;
//!
//! impl AbilityResolver for Noop {
//!     fn resolve(&self, _: &AbilityChoice, _: &GameContext) -> Box<dyn Step> {
//!         Box::new(SimpleStep::new("noop", |_| Ok(())))
//!     }
//! }
//!
//! let mut ctx = GameContext::new(GameState::new(2), Rc::new(Noop));
//! let mut pipeline = Pipeline::new();
//!
//! pipeline.queue_tail(
//!     CompositeStep::new("end of round")
//!         .with_step(SimpleStep::new("discard", |_| Ok(())))
//!         .with_step(SimpleStep::new("next round", |ctx| {
//!             ctx.state.end_round();
//!             Ok(())
//!         })),
//! );
//!
//! assert!(pipeline.advance(&mut ctx));
//! assert_eq!(ctx.state.round, 2);
//! ```

mod composite;
mod queue;
mod report;
mod simple;
mod step;

pub use composite::CompositeStep;
pub use queue::{Pipeline, StepId};
pub use report::{CollectingReporter, ErrorReporter, TracingReporter};
pub use simple::SimpleStep;
pub use step::{Step, StepInput, StepResult, StepStatus};
