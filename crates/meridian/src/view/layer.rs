//! The visual layer: an ordered child list with batched mutation.
//!
//! This is the structure the reconciliation engine actually mutates. It
//! stands in for a retained render tree's child list and is deliberately
//! minimal: ordered nodes, idempotent removal, batch insertion, and a
//! stable sort used as the ordering backstop at the end of every pass.
//!
//! Every structural call counts as one mutation, whatever its size — a
//! batch of five views inserted together is one mutation, which is the
//! whole point of the engine's contiguous-run batching.

use std::sync::Arc;

use super::item_view::ItemView;

/// An ordered list of attached item views.
#[derive(Default)]
pub struct Layer {
    children: Vec<Arc<ItemView>>,
    mutations: u64,
}

impl Layer {
    /// Creates an empty layer.
    pub fn new() -> Self {
        Self::default()
    }

    /// The attached views, in visual order.
    pub fn children(&self) -> &[Arc<ItemView>] {
        &self.children
    }

    /// The number of attached views.
    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// Returns `true` if no views are attached.
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// The number of structural mutations performed so far.
    ///
    /// Insertion batching bounds this to the number of discontiguous
    /// insertion runs per pass, not the number of inserted views.
    pub fn mutation_count(&self) -> u64 {
        self.mutations
    }

    /// The position of a view in the child list, by reference identity.
    pub fn position_of(&self, view: &Arc<ItemView>) -> Option<usize> {
        self.children.iter().position(|c| Arc::ptr_eq(c, view))
    }

    /// Removes a view from the layer.
    ///
    /// Removing a view that is not attached is already satisfied, not an
    /// error: reconciliation stays idempotent against external tampering
    /// with the tree. Returns whether the view was present.
    pub fn remove(&mut self, view: &Arc<ItemView>) -> bool {
        match self.position_of(view) {
            Some(position) => {
                self.children.remove(position);
                self.mutations += 1;
                true
            }
            None => false,
        }
    }

    /// Inserts a batch of views immediately before `anchor`, as a single
    /// structural mutation.
    ///
    /// If the anchor is not attached (external tampering), the batch is
    /// appended instead; the end-of-pass sort restores order.
    pub fn insert_before(&mut self, batch: Vec<Arc<ItemView>>, anchor: &Arc<ItemView>) {
        if batch.is_empty() {
            return;
        }
        let position = self.position_of(anchor).unwrap_or(self.children.len());
        self.children.splice(position..position, batch);
        self.mutations += 1;
    }

    /// Appends a batch of views at the end, as a single structural mutation.
    pub fn append(&mut self, batch: Vec<Arc<ItemView>>) {
        if batch.is_empty() {
            return;
        }
        self.children.extend(batch);
        self.mutations += 1;
    }

    /// Stable-sorts the children by bound index ascending.
    ///
    /// The ordering backstop run at the end of every pass: incremental
    /// placement already linearizes in-window views, and the stable sort
    /// guarantees order even where it cannot (views interleaved by other
    /// mechanisms keep their relative position at equal indices).
    pub fn sort_by_index(&mut self) {
        self.children.sort_by_key(|view| view.index());
    }
}
