//! In-memory observable record list.
//!
//! `RecordList` is the concrete [`ObservableList`] used when the
//! application owns its records directly (as opposed to a remote query or
//! proxy). Every mutation emits the item-level delta followed by the
//! changed index range, so connected views can classify transitions and
//! schedule a reconciliation pass.

use std::sync::Arc;

use parking_lot::RwLock;

use super::collection::{ListDelta, ListSignals, ObservableList, Record};

/// A mutable, observable, ordered list of records.
///
/// # Example
///
/// ```ignore
/// use std::sync::Arc;
/// use meridian::model::{RecordList, StoreRecord, StoreKey};
///
/// struct Contact { key: String }
/// impl StoreRecord for Contact {
///     fn store_key(&self) -> Option<StoreKey> { Some(self.key.clone()) }
/// }
///
/// let list = Arc::new(RecordList::new());
/// list.push(Arc::new(Contact { key: "c1".into() }));
/// assert_eq!(list.len(), 1);
/// ```
pub struct RecordList {
    records: RwLock<Vec<Record>>,
    signals: ListSignals,
}

impl Default for RecordList {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordList {
    /// Creates an empty record list.
    pub fn new() -> Self {
        Self {
            records: RwLock::new(Vec::new()),
            signals: ListSignals::new(),
        }
    }

    /// Creates a record list with initial contents. No signals are emitted.
    pub fn with_records(records: Vec<Record>) -> Self {
        Self {
            records: RwLock::new(records),
            signals: ListSignals::new(),
        }
    }

    /// Appends a record to the end of the list.
    pub fn push(&self, record: Record) {
        let delta = record
            .store_key()
            .map(ListDelta::added)
            .unwrap_or_default();
        let index = {
            let mut records = self.records.write();
            records.push(record);
            records.len() - 1
        };
        tracing::trace!(target: "meridian::model", index, "record pushed");
        self.signals.emit_mutation(index, index + 1, delta);
    }

    /// Inserts a record at the specified index.
    ///
    /// Every position from `index` to the new end shifts, so the changed
    /// range covers the tail of the list.
    ///
    /// # Panics
    ///
    /// Panics if `index > len()`.
    pub fn insert(&self, index: usize, record: Record) {
        let delta = record
            .store_key()
            .map(ListDelta::added)
            .unwrap_or_default();
        let new_len = {
            let mut records = self.records.write();
            records.insert(index, record);
            records.len()
        };
        tracing::trace!(target: "meridian::model", index, "record inserted");
        self.signals.emit_mutation(index, new_len, delta);
    }

    /// Removes and returns the record at the specified index.
    ///
    /// The changed range covers every shifted position plus the vacated
    /// slot at the old end.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`.
    pub fn remove(&self, index: usize) -> Record {
        let (record, old_len) = {
            let mut records = self.records.write();
            let old_len = records.len();
            (records.remove(index), old_len)
        };
        let delta = record
            .store_key()
            .map(ListDelta::removed)
            .unwrap_or_default();
        tracing::trace!(target: "meridian::model", index, "record removed");
        self.signals.emit_mutation(index, old_len, delta);
        record
    }

    /// Replaces the record at `index`, returning the old one.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`.
    pub fn replace(&self, index: usize, record: Record) -> Record {
        let mut delta = ListDelta::default();
        if let Some(key) = record.store_key() {
            delta.added.push(key);
        }
        let old = {
            let mut records = self.records.write();
            std::mem::replace(&mut records[index], record)
        };
        if let Some(key) = old.store_key() {
            delta.removed.push(key);
        }
        self.signals.emit_mutation(index, index + 1, delta);
        old
    }

    /// Replaces the entire contents of the list.
    ///
    /// This is a reset: no item-level delta is produced (connected views
    /// fall back to "no transition hint"), and the changed range covers
    /// both the old and the new extent.
    pub fn set_records(&self, records: Vec<Record>) {
        let (old_len, new_len) = {
            let mut guard = self.records.write();
            let old_len = guard.len();
            *guard = records;
            (old_len, guard.len())
        };
        self.signals
            .emit_mutation(0, old_len.max(new_len), ListDelta::default());
    }

    /// Removes all records.
    pub fn clear(&self) {
        self.set_records(Vec::new());
    }

    /// Returns the index of a record by reference identity.
    pub fn index_of(&self, record: &Record) -> Option<usize> {
        self.records.read().iter().position(|r| Arc::ptr_eq(r, record))
    }
}

impl ObservableList for RecordList {
    fn len(&self) -> usize {
        self.records.read().len()
    }

    fn get(&self, index: usize) -> Option<Record> {
        self.records.read().get(index).cloned()
    }

    fn signals(&self) -> &ListSignals {
        &self.signals
    }
}
