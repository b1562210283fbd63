//! # Snapshot sharing
//!
//! The control loop exchanges state with other threads in a few
//! single-writer/single-reader pairs: module telemetry flowing into the
//! loop, module targets flowing out, and the latest pose flowing to whoever
//! wants it. Each pair is its own [`SnapshotCell`], an independent critical
//! section: the writer publishes a complete immutable snapshot, readers take
//! a copy of the latest one. Grouping unrelated state under one lock would
//! serialise independent producers and consumers, so each logical state
//! group gets its own cell.
//!
//! The lock inside a cell is only ever held for a clone, so critical
//! sections stay short and bounded.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::sync::{Arc, Mutex};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A latest-value cell: one writer publishes snapshots, readers get the most
/// recently published one.
pub struct SnapshotCell<T> {
    latest: Arc<Mutex<Option<T>>>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl<T: Clone> SnapshotCell<T> {
    pub fn new() -> Self {
        Self {
            latest: Arc::new(Mutex::new(None)),
        }
    }

    /// Create a cell holding an initial snapshot.
    pub fn with_initial(initial: T) -> Self {
        Self {
            latest: Arc::new(Mutex::new(Some(initial))),
        }
    }

    /// Publish a new snapshot, replacing any previous one.
    pub fn publish(&self, snapshot: T) {
        // Lock poisoning means a writer panicked mid-store; the value is a
        // plain replace so the cell contents are still whole
        let mut latest = match self.latest.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *latest = Some(snapshot);
    }

    /// Get a copy of the latest published snapshot.
    pub fn latest(&self) -> Option<T> {
        let latest = match self.latest.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        latest.clone()
    }
}

impl<T: Clone> Default for SnapshotCell<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for SnapshotCell<T> {
    fn clone(&self) -> Self {
        Self {
            latest: Arc::clone(&self.latest),
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use std::thread;

    #[test]
    fn test_latest_wins() {
        let cell = SnapshotCell::new();

        assert_eq!(cell.latest(), None);

        cell.publish(1);
        cell.publish(2);
        assert_eq!(cell.latest(), Some(2));
    }

    #[test]
    fn test_initial_value() {
        let cell = SnapshotCell::with_initial(42);
        assert_eq!(cell.latest(), Some(42));
    }

    #[test]
    fn test_cross_thread_publish() {
        let cell = SnapshotCell::new();
        let writer_cell = cell.clone();

        let writer = thread::spawn(move || {
            for i in 0..100 {
                writer_cell.publish(i);
            }
        });

        writer.join().unwrap();
        assert_eq!(cell.latest(), Some(99));
    }
}
