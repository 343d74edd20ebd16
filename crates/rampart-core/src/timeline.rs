//! Simulation-time scheduled actions.
//!
//! Delayed work (reload completion, the next wave) is queued here keyed by
//! absolute simulation time and drained once per step. Nothing fires off the
//! simulation thread, and ordering is fully determined by `(at, sequence)`.
//!
//! Cancellation is implicit: handlers re-check the state they act on, so an
//! action whose subject has since been destroyed or changed is a no-op.

use serde::{Deserialize, Serialize};

use crate::entity::EntityId;

/// A deferred action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScheduledAction {
    /// Finish a reload on `weapon`.
    ReloadComplete {
        /// Weapon being reloaded.
        weapon: EntityId,
    },
    /// Start wave `wave`.
    StartWave {
        /// Wave number to start.
        wave: u32,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Entry {
    at: f64,
    sequence: u64,
    action: ScheduledAction,
}

/// Time-ordered queue of [`ScheduledAction`]s.
///
/// # Example
///
/// ```
/// use rampart_core::timeline::{ScheduledAction, Timeline};
///
/// let mut timeline = Timeline::new();
/// timeline.schedule(2.0, ScheduledAction::StartWave { wave: 2 });
/// timeline.schedule(1.0, ScheduledAction::StartWave { wave: 1 });
///
/// assert!(timeline.drain_due(0.5).is_empty());
/// assert_eq!(timeline.drain_due(1.0), vec![ScheduledAction::StartWave { wave: 1 }]);
/// assert_eq!(timeline.len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Timeline {
    entries: Vec<Entry>,
    next_sequence: u64,
}

impl Timeline {
    /// Creates an empty timeline.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues `action` to fire at simulation time `at`.
    ///
    /// Actions scheduled for the same instant fire in scheduling order.
    pub fn schedule(&mut self, at: f64, action: ScheduledAction) {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        let index = self
            .entries
            .partition_point(|e| e.at < at || (e.at == at && e.sequence < sequence));
        self.entries.insert(index, Entry { at, sequence, action });
    }

    /// Removes and returns every action due at or before `time`, in order.
    pub fn drain_due(&mut self, time: f64) -> Vec<ScheduledAction> {
        let due = self.entries.partition_point(|e| e.at <= time);
        self.entries.drain(..due).map(|e| e.action).collect()
    }

    /// Time of the earliest pending action.
    #[must_use]
    pub fn next_due(&self) -> Option<f64> {
        self.entries.first().map(|e| e.at)
    }

    /// Whether any pending action matches `predicate`.
    pub fn contains(&self, mut predicate: impl FnMut(&ScheduledAction) -> bool) -> bool {
        self.entries.iter().any(|e| predicate(&e.action))
    }

    /// Drops every pending action.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of pending actions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
