//! The observable ordered-collection contract consumed by list views.
//!
//! This module defines the narrow interface a collection must expose for a
//! view to stay synchronized with it: indexed random access, a length, and
//! change notifications. The collection is owned and mutated by the
//! application; views only read from it and subscribe to its signals.

use std::sync::Arc;

use meridian_core::Signal;

/// External correlation key for a record.
///
/// Store keys come from whatever datastore owns the records. They are used
/// for selection lookups and for classifying add/remove deltas; they are
/// *not* the identity used by reconciliation (see `view::identity`).
pub type StoreKey = String;

/// Trait for application objects that can appear in an observable list.
///
/// Records are opaque to the view layer: identity is the heap allocation
/// (the `Arc` pointer), never value equality. A record may expose a store
/// key; one that does not is still displayable, it just never participates
/// in selection or transition classification.
pub trait StoreRecord: Send + Sync {
    /// Returns the external correlation key for this record, if it has one.
    fn store_key(&self) -> Option<StoreKey> {
        None
    }
}

/// A shared handle to a record. Reference identity is item identity.
pub type Record = Arc<dyn StoreRecord>;

/// Item-level change description carried by [`ListSignals::updated`].
///
/// The sets name records by store key. Records without store keys never
/// appear here; consumers treat their absence as "no transition hint".
#[derive(Debug, Clone, Default)]
pub struct ListDelta {
    /// Store keys of records added to the collection.
    pub added: Vec<StoreKey>,
    /// Store keys of records removed from the collection.
    pub removed: Vec<StoreKey>,
}

impl ListDelta {
    /// Creates a delta for a single added record key.
    pub fn added(key: StoreKey) -> Self {
        Self {
            added: vec![key],
            removed: Vec::new(),
        }
    }

    /// Creates a delta for a single removed record key.
    pub fn removed(key: StoreKey) -> Self {
        Self {
            added: Vec::new(),
            removed: vec![key],
        }
    }

    /// Returns `true` if the delta carries no keys at all.
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Collection of signals emitted by observable lists.
///
/// Views connect to these to stay synchronized with the collection.
pub struct ListSignals {
    /// Emitted after any mutation, with the half-open index range whose
    /// values changed (including positions shifted by an insert/remove, and
    /// positions vacated by a length shrink). Views filter the range against
    /// their current render window.
    pub range_changed: Signal<(usize, usize)>,

    /// Emitted with the item-level add/remove delta of a mutation, before
    /// the corresponding `range_changed`. Hint only: a view that is not
    /// live simply drops it.
    pub updated: Signal<ListDelta>,
}

impl Default for ListSignals {
    fn default() -> Self {
        Self::new()
    }
}

impl ListSignals {
    /// Creates a new set of list signals.
    pub fn new() -> Self {
        Self {
            range_changed: Signal::new(),
            updated: Signal::new(),
        }
    }

    /// Emits `updated` (if the delta is non-empty) followed by
    /// `range_changed` for the given range.
    ///
    /// The delta goes out first so observers have recorded the hint by the
    /// time the range notification schedules a pass.
    pub fn emit_mutation(&self, start: usize, end: usize, delta: ListDelta) {
        if !delta.is_empty() {
            self.updated.emit(delta);
        }
        self.range_changed.emit((start, end));
    }
}

/// The ordered-collection interface consumed by list views.
///
/// Implementations expose indexed access over a stable snapshot of state:
/// between two of its own notifications, `len` and `get` must agree. A
/// sparse collection (e.g. a paged remote query) may return `None` for a
/// slot that is within bounds but not yet loaded; the view materializes a
/// placeholder policy for such holes.
pub trait ObservableList: Send + Sync {
    /// Returns the number of slots in the collection.
    fn len(&self) -> usize;

    /// Returns `true` if the collection has no slots.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the record at `index`, or `None` for an out-of-bounds index
    /// or an unloaded (sparse) slot.
    fn get(&self, index: usize) -> Option<Record>;

    /// Returns the signals for this collection.
    fn signals(&self) -> &ListSignals;
}
