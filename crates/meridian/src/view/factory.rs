//! View creation/destruction hooks.
//!
//! The reconciliation engine is polymorphic over how item views come into
//! and go out of existence: it asks an injected [`ViewFactory`] to create,
//! destroy, and validate views, and never constructs one itself. The
//! default factory covers the common case; [`PoolingViewFactory`] shows the
//! keep-alive scheme where destruction is a deferral.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::model::{ObservableList, Record};

use super::identity::record_guid;
use super::item_view::ItemView;

/// Strategy interface for materializing and releasing item views.
///
/// Implementations must uphold one rule: a destroyed-and-pooled view may
/// only be considered correct again (via [`is_correct_view`]) if it has
/// been explicitly re-bound to the record in question.
///
/// [`is_correct_view`]: ViewFactory::is_correct_view
pub trait ViewFactory: Send + Sync {
    /// Creates a view bound to `content` at `index`, or `None` to leave the
    /// slot unmaterialized for this pass (placeholder policy). `content` is
    /// `None` for a sparse slot.
    ///
    /// `is_insertion` is `true` when the record was reported added since
    /// the last pass (entry transitions apply), `false` for views
    /// materialized by window movement.
    fn create_item_view(
        &self,
        content: Option<Record>,
        index: usize,
        list: &Arc<dyn ObservableList>,
        is_insertion: bool,
    ) -> Option<Arc<ItemView>>;

    /// Releases a view evicted from the rendered set.
    ///
    /// May be a no-op deferral (pooling); the view has already been
    /// detached from the visual tree when this is called.
    fn destroy_item_view(&self, view: &Arc<ItemView>);

    /// Is `view` still the right view for `content`?
    ///
    /// The default is reference identity of the bound content (a
    /// placeholder view is correct for a hole). Pooling schemes that rebind
    /// content without destroying can override this.
    fn is_correct_view(&self, view: &ItemView, content: Option<&Record>) -> bool {
        match (view.content(), content) {
            (Some(bound), Some(record)) => Arc::ptr_eq(&bound, record),
            (None, None) => true,
            _ => false,
        }
    }
}

/// The default factory: one fresh view per record, dropped on destruction.
///
/// Sparse slots are declined, so holes stay unmaterialized.
#[derive(Default)]
pub struct RecordViewFactory;

impl RecordViewFactory {
    pub fn new() -> Self {
        Self
    }
}

impl ViewFactory for RecordViewFactory {
    fn create_item_view(
        &self,
        content: Option<Record>,
        index: usize,
        list: &Arc<dyn ObservableList>,
        is_insertion: bool,
    ) -> Option<Arc<ItemView>> {
        let content = content?;
        Some(ItemView::new(
            Some(content),
            index,
            Some(list.clone()),
            is_insertion,
        ))
    }

    fn destroy_item_view(&self, _view: &Arc<ItemView>) {
        // Dropping the engine's references releases the view.
    }
}

/// A keep-alive factory that caches views by record identity.
///
/// Views scrolled out of the window are parked in the pool rather than
/// dropped, and handed back re-indexed when their record scrolls into view
/// again. A pooled view keeps its record bound, so the default correctness
/// check still recognizes it; the pool entry is released only through
/// [`evict`](Self::evict), when the record has left the store for good.
pub struct PoolingViewFactory {
    pool: Mutex<HashMap<u64, Arc<ItemView>>>,
}

impl Default for PoolingViewFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl PoolingViewFactory {
    pub fn new() -> Self {
        Self {
            pool: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the cached view for a record, pooled or live.
    pub fn view_for(&self, record: &Record) -> Option<Arc<ItemView>> {
        self.pool.lock().get(&record_guid(record)).cloned()
    }

    /// Drops the pool entry for a record, actually releasing its view.
    pub fn evict(&self, record: &Record) -> Option<Arc<ItemView>> {
        self.pool.lock().remove(&record_guid(record))
    }

    /// The number of views currently cached.
    pub fn pooled_count(&self) -> usize {
        self.pool.lock().len()
    }
}

impl ViewFactory for PoolingViewFactory {
    fn create_item_view(
        &self,
        content: Option<Record>,
        index: usize,
        list: &Arc<dyn ObservableList>,
        is_insertion: bool,
    ) -> Option<Arc<ItemView>> {
        let content = content?;
        let mut pool = self.pool.lock();

        if let Some(view) = pool.get(&record_guid(&content)) {
            // Reuse: same record, new position.
            view.set_index(index);
            view.set_list(Some(list.clone()));
            view.set_insertion(is_insertion);
            return Some(view.clone());
        }

        let view = ItemView::new(Some(content.clone()), index, Some(list.clone()), is_insertion);
        pool.insert(record_guid(&content), view.clone());
        Some(view)
    }

    fn destroy_item_view(&self, _view: &Arc<ItemView>) {
        // Deferral: the view stays pooled until its record is evicted.
    }
}
