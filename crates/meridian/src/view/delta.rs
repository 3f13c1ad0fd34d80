//! Pending item-delta tracker.
//!
//! Between two reconciliation passes, the view accumulates the store keys
//! reported added or removed by its collection. A pass consumes the whole
//! accumulation at its start and uses it only to classify view creation and
//! destruction as genuine insertion/removal (for transition styling) versus
//! window movement. The tracker is a hint, never a source of truth: an
//! empty tracker degrades to "no transition hint".

use std::collections::HashSet;

use crate::model::{ListDelta, StoreKey};

/// Accumulates add/remove store keys between reconciliation passes.
#[derive(Debug, Default)]
pub struct PendingDelta {
    added: HashSet<StoreKey>,
    removed: HashSet<StoreKey>,
}

impl PendingDelta {
    /// Creates an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Merges an item-level delta into the running sets.
    ///
    /// Callers only record while the list is attached to a live visual
    /// tree; an unattached list has no per-item transitions to hint, so its
    /// deltas are simply not recorded.
    pub fn record(&mut self, delta: &ListDelta) {
        self.added.extend(delta.added.iter().cloned());
        self.removed.extend(delta.removed.iter().cloned());
    }

    /// Returns `true` if nothing has been recorded since the last consume.
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }

    /// Takes the accumulated sets, leaving the tracker empty.
    ///
    /// Called exactly once per reconciliation pass, at its start; the
    /// tracker is emptied whether or not the pass uses the values, so no
    /// delta leaks into unrelated future passes.
    pub fn consume_and_clear(&mut self) -> ConsumedDelta {
        ConsumedDelta {
            added: std::mem::take(&mut self.added),
            removed: std::mem::take(&mut self.removed),
        }
    }
}

/// The delta snapshot a single reconciliation pass classifies against.
#[derive(Debug, Default)]
pub struct ConsumedDelta {
    added: HashSet<StoreKey>,
    removed: HashSet<StoreKey>,
}

impl ConsumedDelta {
    /// Was this store key reported added since the last pass?
    pub fn was_added(&self, key: &str) -> bool {
        self.added.contains(key)
    }

    /// Was this store key reported removed since the last pass?
    pub fn was_removed(&self, key: &str) -> bool {
        self.removed.contains(key)
    }
}
