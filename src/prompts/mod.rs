//! Prompt service: decisions that suspend the calling step.
//!
//! - [`Prompt`]: a renderable description of a pending decision
//! - [`MenuPrompt`]: choose one of several buttons, each with a handler
//! - [`SelectCardPrompt`]: choose a card matching a condition
//!
//! The triggered-ability windows build their own prompts from the same
//! [`Prompt`] type, so the surrounding game renders every decision the
//! same way and answers with a [`StepInput`](crate::pipeline::StepInput).

mod menu;
mod prompt;
mod select;

pub use menu::MenuPrompt;
pub use prompt::{MenuButton, Prompt, PromptKind};
pub use select::SelectCardPrompt;
