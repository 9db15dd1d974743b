use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::outcome::Outcome;

/// Append-only, thread-safe sink for outcomes. Clones share the same list.
///
/// The lock is held only for the push itself; workers never hold it across a
/// network call.
#[derive(Debug, Clone, Default)]
pub struct Collector {
    outcomes: Arc<Mutex<Vec<Outcome>>>,
}

impl Collector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self { outcomes: Arc::new(Mutex::new(Vec::with_capacity(capacity))) }
    }

    pub fn record(&self, outcome: Outcome) {
        self.lock().push(outcome);
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Move every recorded outcome out, leaving the collector empty.
    pub fn take(&self) -> Vec<Outcome> {
        std::mem::take(&mut *self.lock())
    }

    // A worker that panicked mid-push cannot leave a half-written Vec behind,
    // so a poisoned lock still guards consistent data.
    fn lock(&self) -> MutexGuard<'_, Vec<Outcome>> {
        self.outcomes.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
