//! Coalescing update scheduler for deferred, tick-driven work.
//!
//! Views do not redraw inline with the mutation that triggered them.
//! Instead, each view registers itself as a *schedule source* with a
//! callback, and marks itself dirty when it needs work. The host drains the
//! scheduler once per animation/layout tick; however many times a source was
//! marked dirty between two ticks, its callback runs exactly once.
//!
//! Unregistering a source drops any pending work for it, which is how a
//! destroyed view cancels its scheduled update.
//!
//! # Example
//!
//! ```
//! use meridian_core::UpdateScheduler;
//!
//! let scheduler = UpdateScheduler::new();
//! let id = scheduler.register(|| {
//!     println!("update pass");
//! });
//!
//! // Multiple dirty marks between ticks coalesce into one callback run.
//! scheduler.mark_dirty(id).unwrap();
//! scheduler.mark_dirty(id).unwrap();
//! assert_eq!(scheduler.run_tick(), 1);
//! ```

use parking_lot::Mutex;
use slotmap::{SlotMap, new_key_type};

use crate::error::{Result, SchedulerError};

new_key_type! {
    /// A unique identifier for a registered schedule source.
    pub struct ScheduleSourceId;
}

/// A boxed source callback.
type BoxedUpdateFn = Box<dyn FnMut() + Send + 'static>;

/// Internal per-source data.
struct ScheduleSource {
    /// Whether this source has been marked dirty since it last ran.
    dirty: bool,
    /// The callback to run on the next tick while dirty. `None` only while
    /// the callback is executing (it is taken out so the scheduler lock is
    /// not held across user code).
    update: Option<BoxedUpdateFn>,
}

/// Internal scheduler state behind the lock.
struct SchedulerState {
    /// All registered sources.
    sources: SlotMap<ScheduleSourceId, ScheduleSource>,
    /// Sources marked dirty since the last tick, in mark order.
    queue: Vec<ScheduleSourceId>,
}

/// A coalescing, tick-driven scheduler for view updates.
///
/// Each source carries a dirty flag and a single callback. [`mark_dirty`]
/// is idempotent between ticks: the callback is enqueued at most once no
/// matter how many times the source is marked. [`run_tick`] drains the
/// queue in mark order; marks made *during* a tick (including by a running
/// callback) land in the next tick.
///
/// The scheduler is shared (`Arc<UpdateScheduler>`) between the host tick
/// driver and the views that mark themselves dirty.
///
/// [`mark_dirty`]: UpdateScheduler::mark_dirty
/// [`run_tick`]: UpdateScheduler::run_tick
pub struct UpdateScheduler {
    inner: Mutex<SchedulerState>,
}

impl Default for UpdateScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl UpdateScheduler {
    /// Create a new scheduler with no sources.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(SchedulerState {
                sources: SlotMap::with_key(),
                queue: Vec::new(),
            }),
        }
    }

    /// Register a new schedule source with its update callback.
    ///
    /// The source starts clean; nothing runs until it is marked dirty.
    /// Returns the ID used to mark the source dirty or unregister it.
    pub fn register<F>(&self, update: F) -> ScheduleSourceId
    where
        F: FnMut() + Send + 'static,
    {
        self.inner.lock().sources.insert(ScheduleSource {
            dirty: false,
            update: Some(Box::new(update)),
        })
    }

    /// Unregister a source, dropping any pending work for it.
    ///
    /// Returns an error if the ID is unknown or already unregistered.
    pub fn unregister(&self, id: ScheduleSourceId) -> Result<()> {
        if self.inner.lock().sources.remove(id).is_some() {
            Ok(())
        } else {
            Err(SchedulerError::InvalidSource.into())
        }
    }

    /// Mark a source dirty, enqueueing its callback for the next tick.
    ///
    /// Idempotent: marking an already-dirty source is a no-op, so any number
    /// of marks between two ticks collapse into a single callback run.
    ///
    /// Returns an error if the ID is unknown.
    pub fn mark_dirty(&self, id: ScheduleSourceId) -> Result<()> {
        let mut state = self.inner.lock();
        let Some(source) = state.sources.get_mut(id) else {
            return Err(SchedulerError::InvalidSource.into());
        };
        if !source.dirty {
            source.dirty = true;
            state.queue.push(id);
        }
        Ok(())
    }

    /// Check whether a source is currently marked dirty.
    pub fn is_dirty(&self, id: ScheduleSourceId) -> bool {
        self.inner.lock().sources.get(id).is_some_and(|s| s.dirty)
    }

    /// Get the number of sources waiting to run on the next tick.
    pub fn pending_count(&self) -> usize {
        self.inner.lock().queue.len()
    }

    /// Get the number of registered sources.
    pub fn source_count(&self) -> usize {
        self.inner.lock().sources.len()
    }

    /// Drain all sources marked dirty before this call, in mark order.
    ///
    /// Each dirty source's callback runs exactly once. The dirty flag is
    /// cleared *before* the callback is invoked, and the scheduler lock is
    /// not held while it runs, so a callback may mark sources dirty
    /// (including its own) for the following tick.
    ///
    /// Returns the number of callbacks that ran.
    #[tracing::instrument(skip(self), target = "meridian_core::scheduler", level = "trace")]
    pub fn run_tick(&self) -> usize {
        let due = std::mem::take(&mut self.inner.lock().queue);
        let mut executed = 0;

        for id in due {
            // Take the callback out so user code runs without the lock.
            let taken = {
                let mut state = self.inner.lock();
                match state.sources.get_mut(id) {
                    // A source unregistered after being queued is skipped.
                    None => None,
                    Some(source) if source.dirty => {
                        source.dirty = false;
                        source.update.take()
                    }
                    Some(_) => None,
                }
            };

            let Some(mut update) = taken else { continue };
            tracing::trace!(target: "meridian_core::scheduler", ?id, "running update source");
            update();
            executed += 1;

            // Put the callback back unless the source was unregistered
            // while it ran.
            let mut state = self.inner.lock();
            if let Some(source) = state.sources.get_mut(id) {
                source.update = Some(update);
            }
        }

        executed
    }
}
