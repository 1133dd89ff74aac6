//! The game driver and the collaborator games plug card behavior into.
//!
//! [`Game`] owns the root pipeline and routes every external action into
//! it. Games implement [`AbilityResolver`] to turn a chosen ability into
//! the step that resolves it; the core never interprets card text.

pub mod engine;

pub use engine::{AbilityResolver, Game};
