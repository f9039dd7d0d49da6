//! Hand-written cursors for source tests.
//!
//! These only depend on `typeflow-core`, so they implement their own
//! stepping. Stream crates wrap them in local newtypes that implement the
//! `Cursor` traits.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use typeflow_core::Value;

/// Steps through values and counts how often it was advanced.
#[derive(Debug)]
pub struct CountingSteps {
    values: Vec<Value>,
    position: Option<usize>,
    advances: Arc<AtomicUsize>,
}

impl CountingSteps {
    pub fn new(values: Vec<Value>) -> (Self, Arc<AtomicUsize>) {
        let advances = Arc::new(AtomicUsize::new(0));
        let steps = Self {
            values,
            position: None,
            advances: Arc::clone(&advances),
        };
        (steps, advances)
    }

    /// Moves forward; false once past the end, and on every call after.
    pub fn step(&mut self) -> bool {
        self.advances.fetch_add(1, Ordering::SeqCst);
        let next = self.position.map_or(0, |p| p + 1).min(self.values.len());
        self.position = Some(next);
        next < self.values.len()
    }

    pub fn current(&self) -> Option<Value> {
        self.position.and_then(|p| self.values.get(p).cloned())
    }
}

/// Shared call counter for projector and predicate tests.
#[derive(Debug, Clone, Default)]
pub struct CallCounter(Arc<AtomicUsize>);

impl CallCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hit(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }

    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}
