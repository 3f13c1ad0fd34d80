//! Error types for Meridian core systems.

use thiserror::Error;

/// The main error type for Meridian core operations.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Update scheduler error.
    #[error("scheduler error: {0}")]
    Scheduler(#[from] SchedulerError),

    /// Signal-related error.
    #[error("signal error: {0}")]
    Signal(#[from] SignalError),
}

/// Errors from the coalescing update scheduler.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchedulerError {
    /// The source ID is invalid or has already been unregistered.
    #[error("invalid or unregistered schedule source ID")]
    InvalidSource,
}

/// Signal-specific errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SignalError {
    /// The connection ID is invalid or has already been disconnected.
    #[error("invalid or disconnected connection ID")]
    InvalidConnection,
}

/// A specialized Result type for Meridian core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
