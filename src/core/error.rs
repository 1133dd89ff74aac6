//! Errors raised while a step executes.
//!
//! A step error never escapes the pipeline: the pipeline reports it to the
//! context's [`ErrorReporter`](crate::pipeline::ErrorReporter) and treats
//! the step as complete so the game keeps moving.

use thiserror::Error;

use super::entity::{AbilityId, CardId, EventId};

/// Failure inside a step's execution.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum StepError {
    /// Game-specific failure with a message.
    #[error("step failed: {0}")]
    Failed(String),

    /// A card the step relied on has left its valid location.
    #[error("{0} is no longer where the step expected it")]
    StaleReference(CardId),

    /// An event was cancelled or its batch has been retired.
    #[error("{0} was cancelled or is no longer open")]
    MissingEvent(EventId),

    /// An ability is not registered.
    #[error("{0} is not registered")]
    UnknownAbility(AbilityId),
}

impl StepError {
    /// Create a game-specific failure.
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}
