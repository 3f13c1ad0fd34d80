//! Core systems for Meridian.
//!
//! This crate provides the foundational components of the Meridian toolkit:
//!
//! - **Signal/Slot System**: Type-safe inter-object communication
//! - **Update Scheduler**: Coalescing, tick-driven deferral of view work
//! - **Logging**: `tracing` targets for per-subsystem filtering
//!
//! # Signal/Slot Example
//!
//! ```
//! use meridian_core::Signal;
//!
//! // Create a signal that notifies when a value changes
//! let value_changed = Signal::<i32>::new();
//!
//! // Connect a slot to handle the signal
//! let conn_id = value_changed.connect(|value| {
//!     println!("Value changed to: {}", value);
//! });
//!
//! // Emit the signal
//! value_changed.emit(42);
//!
//! // Disconnect when done
//! value_changed.disconnect(conn_id);
//! ```
//!
//! # Scheduler Example
//!
//! ```
//! use meridian_core::UpdateScheduler;
//!
//! let scheduler = UpdateScheduler::new();
//! let source = scheduler.register(|| println!("coalesced update"));
//!
//! // Mark dirty any number of times between ticks...
//! scheduler.mark_dirty(source).unwrap();
//! scheduler.mark_dirty(source).unwrap();
//!
//! // ...the callback runs once per tick.
//! assert_eq!(scheduler.run_tick(), 1);
//! ```

mod error;
pub mod logging;
mod scheduler;
pub mod signal;

pub use error::{CoreError, Result, SchedulerError, SignalError};
pub use scheduler::{ScheduleSourceId, UpdateScheduler};
pub use signal::{ConnectionGuard, ConnectionId, Signal};
