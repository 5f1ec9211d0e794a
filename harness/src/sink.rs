//! In-memory progress sink.

use std::sync::{Mutex, PoisonError};

use thicket_search::{ProgressSink, SearchStep};

/// Keeps every step it is given, in arrival order.
#[derive(Debug, Default)]
pub struct RecordingSink {
    steps: Mutex<Vec<SearchStep>>,
}

impl RecordingSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the steps received so far.
    #[must_use]
    pub fn steps(&self) -> Vec<SearchStep> {
        self.steps
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ProgressSink for RecordingSink {
    fn emit(&self, step: &SearchStep) {
        self.steps
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(step.clone());
    }
}
