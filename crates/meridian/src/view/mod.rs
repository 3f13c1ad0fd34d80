//! View layer for Meridian.
//!
//! Everything needed to keep a window of materialized item views
//! synchronized with an observable collection:
//!
//! - [`ListView`]: the list widget hosting the reconciliation engine
//! - [`ItemView`] / [`ViewLifecycle`]: the per-record visual-tree nodes and
//!   their enter/leave notifications
//! - [`ViewFactory`]: the injected creation/destruction strategy, with
//!   [`RecordViewFactory`] as the default and [`PoolingViewFactory`] as a
//!   keep-alive variant
//! - [`RenderWindow`]: the index interval to materialize
//! - [`ItemKey`] / [`identity_key`]: stable identity resolution for records
//!   and sparse slots
//! - [`Layer`]: the ordered child list with batched mutation
//! - [`PendingDelta`]: the between-passes add/remove hint tracker
//!
//! # Reconciliation at a glance
//!
//! ```text
//! collection mutation ──> range/delta signals ──> dirty mark
//!                                                    │
//!                              UpdateScheduler tick  ▼
//! ┌──────────────────────── one reconciliation pass ────────────────────┐
//! │ clip window → carry forward → evict → position/batch → sort → commit│
//! └─────────────────────────────────────────────────────────────────────┘
//!                                                    │
//!                         children_changed (once) ◀──┘
//! ```

mod delta;
mod factory;
mod identity;
mod item_view;
mod layer;
mod list_view;
mod window;

pub use delta::{ConsumedDelta, PendingDelta};
pub use factory::{PoolingViewFactory, RecordViewFactory, ViewFactory};
pub use identity::{ItemKey, identity_key, record_guid};
pub use item_view::{ItemView, ViewLifecycle};
pub use layer::Layer;
pub use list_view::{ListView, PassStats};
pub use window::RenderWindow;
