//! Meridian: model/view reconciliation for virtualized list views.
//!
//! Meridian keeps a bounded window of materialized item views synchronized
//! with a live, mutable, observable collection. Views are reused by record
//! identity wherever possible, visual-tree mutation is batched and
//! minimized, strict index ordering is maintained, and enter/leave
//! lifecycle notifications are sequenced correctly through batched inserts
//! and removals.
//!
//! # Architecture Overview
//!
//! ```text
//! ┌────────────────┐   signals    ┌──────────────────┐
//! │ ObservableList │─────────────>│     ListView     │
//! │  (RecordList)  │              │  rendered set +  │
//! └────────────────┘              │  reconciliation  │
//!          │                      └──────────────────┘
//!          │ get / len                  │        ▲
//!          ▼                            ▼        │ tick
//! ┌────────────────┐   creates   ┌───────────┐ ┌─────────────────┐
//! │   ViewFactory  │────────────>│ ItemView* │ │ UpdateScheduler │
//! └────────────────┘             └───────────┘ └─────────────────┘
//! ```
//!
//! The collection is owned and mutated by the application; the view only
//! reads it and subscribes to its change signals. Mutations never redraw
//! inline: the view marks itself dirty on a coalescing scheduler and a
//! single pass runs on the next tick, over the latest state.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use meridian::model::{ObservableList, RecordList, StoreKey, StoreRecord};
//! use meridian::view::ListView;
//! use meridian_core::UpdateScheduler;
//!
//! struct Message(String);
//! impl StoreRecord for Message {
//!     fn store_key(&self) -> Option<StoreKey> {
//!         Some(self.0.clone())
//!     }
//! }
//!
//! let inbox = Arc::new(RecordList::new());
//! let scheduler = Arc::new(UpdateScheduler::new());
//!
//! let list_view = ListView::new();
//! list_view.bind_scheduler(&scheduler);
//! list_view.set_content(Some(inbox.clone() as Arc<dyn ObservableList>));
//! list_view.attach();
//!
//! inbox.push(Arc::new(Message("m1".into())));
//! inbox.push(Arc::new(Message("m2".into())));
//!
//! // However many mutations happened, the next tick runs one pass.
//! scheduler.run_tick();
//! assert_eq!(list_view.children().len(), 2);
//! ```

pub mod model;
pub mod prelude;
pub mod view;
