//! Sinks for step failures the pipeline swallows.

use std::cell::RefCell;

use tracing::error;

use crate::core::StepError;

/// Receives every step error caught at a pipeline boundary.
pub trait ErrorReporter {
    /// Record a failure of the step named `step`.
    fn report(&self, step: &str, error: &StepError);
}

/// Reports step failures as `tracing` errors.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingReporter;

impl ErrorReporter for TracingReporter {
    fn report(&self, step: &str, err: &StepError) {
        error!(step, error = %err, "step failed, forcing completion");
    }
}

/// Keeps every reported failure in memory.
///
/// Useful for diagnostics screens and tests that assert a failure was
/// swallowed rather than lost.
#[derive(Debug, Default)]
pub struct CollectingReporter {
    errors: RefCell<Vec<(String, StepError)>>,
}

impl CollectingReporter {
    /// Create an empty reporter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of failures reported.
    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.borrow().len()
    }

    /// Were no failures reported?
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.borrow().is_empty()
    }

    /// Copy of every (step name, error) pair, oldest first.
    #[must_use]
    pub fn errors(&self) -> Vec<(String, StepError)> {
        self.errors.borrow().clone()
    }
}

impl ErrorReporter for CollectingReporter {
    fn report(&self, step: &str, err: &StepError) {
        self.errors.borrow_mut().push((step.to_string(), err.clone()));
    }
}
