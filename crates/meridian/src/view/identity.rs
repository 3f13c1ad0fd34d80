//! Stable identity keys for records and sparse slots.
//!
//! Reconciliation reuses views by *identity*, never by value equality: two
//! records with identical contents are still two records. Identity is
//! resolved to a small copyable key so it can index the rendered-set map
//! across passes.
//!
//! A record's id is assigned lazily on first use from a process-wide
//! monotonic counter and is associated with the record's allocation through
//! a weak reference, so it lives exactly as long as the record itself: once
//! the record is dropped, a new allocation reusing the same address gets a
//! fresh id.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, LazyLock, Weak};

use parking_lot::Mutex;

use crate::model::{Record, StoreRecord};

/// A global counter for generating unique record ids.
static GUID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// A registry entry: the weak back-reference proves the id still belongs to
/// the allocation it was assigned for.
struct GuidEntry {
    record: Weak<dyn StoreRecord>,
    id: u64,
}

struct GuidRegistry {
    by_addr: HashMap<usize, GuidEntry>,
    /// Registry size at which the next dead-entry sweep runs.
    sweep_at: usize,
}

static GUID_REGISTRY: LazyLock<Mutex<GuidRegistry>> = LazyLock::new(|| {
    Mutex::new(GuidRegistry {
        by_addr: HashMap::new(),
        sweep_at: 64,
    })
});

/// Identity key for one slot of an observable collection.
///
/// A present record resolves to its process-unique id; an absent (sparse or
/// out-of-data) slot resolves to a synthetic key embedding its index, so
/// holes never alias each other or real records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemKey {
    /// A real record, by process-unique id.
    Record(u64),
    /// An absent slot, by index.
    Hole(usize),
}

/// Returns the process-unique id for a record, assigning one on first use.
///
/// Stable across repeated calls for the same allocation, distinct for
/// distinct allocations, and independent of value equality. Pure with
/// respect to the record: no ownership is taken and the record is never
/// touched, only its address.
pub fn record_guid(record: &Record) -> u64 {
    let addr = Arc::as_ptr(record) as *const () as usize;
    let mut registry = GUID_REGISTRY.lock();

    if let Some(entry) = registry.by_addr.get(&addr) {
        // The entry is only valid while the original allocation is alive;
        // a dead weak here means the address was reused.
        if let Some(live) = entry.record.upgrade() {
            if Arc::ptr_eq(&live, record) {
                return entry.id;
            }
        }
    }

    let id = GUID_COUNTER.fetch_add(1, Ordering::Relaxed);
    registry.by_addr.insert(
        addr,
        GuidEntry {
            record: Arc::downgrade(record),
            id,
        },
    );

    if registry.by_addr.len() >= registry.sweep_at {
        registry.by_addr.retain(|_, e| e.record.strong_count() > 0);
        registry.sweep_at = (registry.by_addr.len() * 2).max(64);
    }

    id
}

/// Resolves the identity key for the slot at `index`.
pub fn identity_key(record: Option<&Record>, index: usize) -> ItemKey {
    match record {
        Some(record) => ItemKey::Record(record_guid(record)),
        None => ItemKey::Hole(index),
    }
}
