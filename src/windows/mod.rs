//! Resolution windows.
//!
//! A window is a composite step that gives players the chance to respond
//! before play continues:
//!
//! - [`TriggeredAbilityWindow`]: one class of triggered abilities over one
//!   event batch, with priority passing between players
//! - [`SimultaneousEffectWindow`]: effects that happen at the same time,
//!   ordered by the first player
//! - [`EventWindow`]: an event batch's full timing sequence, built from
//!   triggered-ability windows
//!
//! Players with nothing to do may still see a [`BluffPrompt`], so that
//! passing doesn't give their hand away. Whether they do is up to the
//! context's [`BluffPolicy`].

mod bluff;
mod event_window;
mod simultaneous;
pub mod titles;
mod triggered;

pub use bluff::{BluffAnswer, BluffPolicy, BluffPrompt, DefaultBluffPolicy, NeverBluff};
pub use event_window::EventWindow;
pub use simultaneous::SimultaneousEffectWindow;
pub use triggered::TriggeredAbilityWindow;
