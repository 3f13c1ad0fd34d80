//! Selection service for list views.
//!
//! The selection service owns *which* records are selected, keyed by store
//! key. It is deliberately independent of any view or collection: views
//! mirror its state onto their materialized item views (see the selection
//! synchronizer in `view::list_view`) but never drive reconciliation from
//! it, and records without store keys simply never participate.
//!
//! # Example
//!
//! ```
//! use meridian::model::SelectionService;
//!
//! let selection = SelectionService::new();
//! selection.select("contact-7".to_string());
//!
//! assert!(selection.is_selected("contact-7"));
//!
//! selection.selection_changed.connect(|_| {
//!     println!("Selection changed");
//! });
//! ```

use std::collections::HashSet;

use meridian_core::Signal;
use parking_lot::RwLock;

use super::collection::StoreKey;

/// Tracks the set of selected store keys.
///
/// All mutators emit [`selection_changed`](Self::selection_changed) only
/// when the set actually changed, so views can resync unconditionally on
/// the signal without redundant work.
pub struct SelectionService {
    selected: RwLock<HashSet<StoreKey>>,

    /// Emitted after the selected set changes.
    pub selection_changed: Signal<()>,
}

impl Default for SelectionService {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectionService {
    /// Creates an empty selection.
    pub fn new() -> Self {
        Self {
            selected: RwLock::new(HashSet::new()),
            selection_changed: Signal::new(),
        }
    }

    /// Checks whether a store key is selected.
    pub fn is_selected(&self, key: &str) -> bool {
        self.selected.read().contains(key)
    }

    /// Returns the number of selected keys.
    pub fn selected_count(&self) -> usize {
        self.selected.read().len()
    }

    /// Adds a key to the selection.
    pub fn select(&self, key: StoreKey) {
        let changed = self.selected.write().insert(key);
        if changed {
            self.selection_changed.emit(());
        }
    }

    /// Removes a key from the selection.
    pub fn deselect(&self, key: &str) {
        let changed = self.selected.write().remove(key);
        if changed {
            self.selection_changed.emit(());
        }
    }

    /// Toggles a key's selection state.
    pub fn toggle(&self, key: StoreKey) {
        {
            let mut selected = self.selected.write();
            if !selected.remove(key.as_str()) {
                selected.insert(key);
            }
        }
        self.selection_changed.emit(());
    }

    /// Clears the selection.
    pub fn clear(&self) {
        let changed = {
            let mut selected = self.selected.write();
            let had_any = !selected.is_empty();
            selected.clear();
            had_any
        };
        if changed {
            self.selection_changed.emit(());
        }
    }

    /// Replaces the selection wholesale.
    pub fn set_selected(&self, keys: impl IntoIterator<Item = StoreKey>) {
        let new: HashSet<StoreKey> = keys.into_iter().collect();
        let changed = {
            let mut selected = self.selected.write();
            if *selected == new {
                false
            } else {
                *selected = new;
                true
            }
        };
        if changed {
            self.selection_changed.emit(());
        }
    }
}
