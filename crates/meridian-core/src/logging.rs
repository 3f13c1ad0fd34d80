//! Logging facilities for Meridian.
//!
//! Meridian uses the `tracing` crate for instrumentation. To see logs,
//! install a tracing subscriber in your application:
//!
//! ```ignore
//! tracing_subscriber::fmt::init();
//! ```
//!
//! The constants below can be combined with `tracing` directives to filter
//! logs for specific subsystems, e.g. `RUST_LOG=meridian::reconcile=trace`.

/// Target names for log filtering.
pub mod targets {
    /// Core crate target.
    pub const CORE: &str = "meridian_core";
    /// Signal/slot system target.
    pub const SIGNAL: &str = "meridian_core::signal";
    /// Update scheduler target.
    pub const SCHEDULER: &str = "meridian_core::scheduler";
    /// Reconciliation engine target (emitted by the view crate).
    pub const RECONCILE: &str = "meridian::reconcile";
    /// Model layer target (emitted by the view crate).
    pub const MODEL: &str = "meridian::model";
}
