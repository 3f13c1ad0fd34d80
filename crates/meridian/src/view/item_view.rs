//! Item views: the visual-tree nodes a list view materializes per record.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use meridian_core::Signal;
use parking_lot::Mutex;

use crate::model::{ObservableList, Record};

/// Lifecycle notifications emitted by an item view as reconciliation moves
/// it in and out of the live visual tree.
///
/// `WillEnter` fires immediately before the view's batch is inserted and
/// `DidEnter` after the pass has flushed, in index order. The `removed`
/// flag on the leave events classifies the departure: `true` for a genuine
/// removal from the collection (exit transitions apply), `false` for a
/// silent window-shift eviction or a repositioning detach.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewLifecycle {
    WillEnter,
    DidEnter,
    WillLeave { removed: bool },
    DidLeave { removed: bool },
}

/// A visual-tree node bound to exactly one collection slot at a time.
///
/// Item views are created through the view factory, owned by the
/// reconciliation engine once created, and destroyed only by it. The bound
/// content and index are updated in place as the collection changes
/// underneath; pooling factories may rebind content wholesale.
pub struct ItemView {
    /// The bound record; `None` for a placeholder over a sparse slot.
    content: Mutex<Option<Record>>,
    /// The view's current index within the collection.
    index: AtomicUsize,
    /// Back-reference to the collection this view renders from.
    list: Mutex<Option<Arc<dyn ObservableList>>>,
    /// Whether the view was materialized as part of a genuine insertion.
    is_insertion: AtomicBool,
    /// Mirrors the selection service; flipped only by the selection
    /// synchronizer.
    is_selected: AtomicBool,
    /// Whether the view is currently attached to the visual tree.
    in_tree: AtomicBool,

    /// Lifecycle notifications, emitted by the reconciliation engine.
    pub lifecycle: Signal<ViewLifecycle>,
}

impl ItemView {
    /// Creates a view bound to `content` at `index`.
    pub fn new(
        content: Option<Record>,
        index: usize,
        list: Option<Arc<dyn ObservableList>>,
        is_insertion: bool,
    ) -> Arc<Self> {
        Arc::new(Self {
            content: Mutex::new(content),
            index: AtomicUsize::new(index),
            list: Mutex::new(list),
            is_insertion: AtomicBool::new(is_insertion),
            is_selected: AtomicBool::new(false),
            in_tree: AtomicBool::new(false),
            lifecycle: Signal::new(),
        })
    }

    /// Returns the bound record, or `None` for a placeholder view.
    pub fn content(&self) -> Option<Record> {
        self.content.lock().clone()
    }

    /// Rebinds the view to different content.
    ///
    /// Only pooling factories do this; the engine's default correctness
    /// check is reference identity of the bound content, so a rebound view
    /// is correct exactly for its new record.
    pub fn bind_content(&self, content: Option<Record>) {
        *self.content.lock() = content;
    }

    /// The view's current index within the collection.
    pub fn index(&self) -> usize {
        self.index.load(Ordering::Relaxed)
    }

    pub(crate) fn set_index(&self, index: usize) {
        self.index.store(index, Ordering::Relaxed);
    }

    /// The collection this view renders from.
    pub fn list(&self) -> Option<Arc<dyn ObservableList>> {
        self.list.lock().clone()
    }

    pub(crate) fn set_list(&self, list: Option<Arc<dyn ObservableList>>) {
        *self.list.lock() = list;
    }

    /// Whether the view was materialized as part of a genuine insertion
    /// (as opposed to scrolling into the window). Entry transitions key off
    /// this.
    pub fn is_insertion(&self) -> bool {
        self.is_insertion.load(Ordering::Relaxed)
    }

    pub(crate) fn set_insertion(&self, is_insertion: bool) {
        self.is_insertion.store(is_insertion, Ordering::Relaxed);
    }

    /// Whether the view currently renders as selected.
    pub fn is_selected(&self) -> bool {
        self.is_selected.load(Ordering::Relaxed)
    }

    /// Sets the selection flag. Called by the selection synchronizer; has
    /// no structural effect.
    pub fn set_selected(&self, selected: bool) {
        self.is_selected.store(selected, Ordering::Relaxed);
    }

    /// Whether the view is currently attached to the visual tree.
    pub fn in_tree(&self) -> bool {
        self.in_tree.load(Ordering::Relaxed)
    }

    pub(crate) fn set_in_tree(&self, in_tree: bool) {
        self.in_tree.store(in_tree, Ordering::Relaxed);
    }
}

impl std::fmt::Debug for ItemView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ItemView")
            .field("index", &self.index())
            .field("has_content", &self.content.lock().is_some())
            .field("is_insertion", &self.is_insertion())
            .field("is_selected", &self.is_selected())
            .field("in_tree", &self.in_tree())
            .finish()
    }
}
