//! Prelude module for Meridian.
//!
//! This module re-exports the most commonly used types for convenient
//! importing:
//!
//! ```ignore
//! use meridian::prelude::*;
//! ```
//!
//! This provides access to:
//! - The signal/slot system (`Signal`, `ConnectionId`)
//! - The coalescing scheduler (`UpdateScheduler`)
//! - The model layer (`ObservableList`, `RecordList`, `SelectionService`)
//! - The view layer (`ListView`, `ItemView`, `ViewFactory`, `RenderWindow`)

// ============================================================================
// Core (signals and scheduling)
// ============================================================================

pub use meridian_core::{ConnectionId, Signal, UpdateScheduler};

// ============================================================================
// Model Layer
// ============================================================================

pub use crate::model::{
    ListDelta, ListSignals, ObservableList, Record, RecordList, SelectionService, StoreKey,
    StoreRecord,
};

// ============================================================================
// View Layer
// ============================================================================

pub use crate::view::{
    ItemView, ListView, PassStats, PoolingViewFactory, RecordViewFactory, RenderWindow,
    ViewFactory, ViewLifecycle,
};
