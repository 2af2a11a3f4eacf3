//! GPU synchronization primitives.
//!
//! A [`Fence`] is a monotonic 64-bit counter advanced by the GPU queue as it
//! retires work: each submission is followed by a queue-side signal of the
//! next fence value, and the CPU compares the fence's completed value against
//! the value it recorded for a frame slot to know whether the GPU is done with
//! that slot's resources.
//!
//! A [`FenceEvent`] is a manual-reset event the CPU blocks on. Arming it with
//! [`Fence::set_event_on_completion`] sets it once the fence reaches the
//! requested value.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

/// Status of a fence value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FenceStatus {
    /// The fence has not yet reached the value.
    Unsignaled,
    /// The fence has reached the value (GPU work complete).
    Signaled,
}

/// Manual-reset event used to block the CPU until a fence value is reached.
///
/// Clones share the same event.
#[derive(Debug, Clone, Default)]
pub struct FenceEvent {
    inner: Arc<EventInner>,
}

#[derive(Debug, Default)]
struct EventInner {
    set: Mutex<bool>,
    condvar: Condvar,
}

impl FenceEvent {
    /// Create an unset event.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the event, waking every waiter. Stays set until [`reset`](Self::reset).
    pub fn set(&self) {
        let mut set = self.inner.set.lock();
        *set = true;
        self.inner.condvar.notify_all();
    }

    /// Clear the event.
    pub fn reset(&self) {
        *self.inner.set.lock() = false;
    }

    /// Whether the event is set.
    pub fn is_set(&self) -> bool {
        *self.inner.set.lock()
    }

    /// Block until the event is set or `timeout` elapses.
    ///
    /// Returns `true` if the event was set, `false` on timeout.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut set = self.inner.set.lock();
        while !*set {
            if self.inner.condvar.wait_until(&mut set, deadline).timed_out() {
                return *set;
            }
        }
        true
    }

    fn same_as(&self, other: &FenceEvent) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

/// CPU-GPU synchronization primitive with a monotonic completed value.
///
/// Clones share the same fence.
///
/// # Example
///
/// ```
/// use ripple_graphics::scheduler::{Fence, FenceEvent, FenceStatus};
///
/// let fence = Fence::new(0);
/// assert_eq!(fence.status(1), FenceStatus::Unsignaled);
///
/// let event = FenceEvent::new();
/// fence.set_event_on_completion(0, &event);
/// assert!(event.is_set());
/// ```
#[derive(Debug, Clone)]
pub struct Fence {
    inner: Arc<FenceInner>,
}

#[derive(Debug)]
struct FenceInner {
    completed: AtomicU64,
    /// Events armed for values not yet reached.
    waiters: Mutex<Vec<(u64, FenceEvent)>>,
}

impl Fence {
    /// Create a fence whose completed value starts at `initial`.
    pub fn new(initial: u64) -> Self {
        Self {
            inner: Arc::new(FenceInner {
                completed: AtomicU64::new(initial),
                waiters: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Highest value the GPU has signaled so far.
    pub fn completed_value(&self) -> u64 {
        self.inner.completed.load(Ordering::Acquire)
    }

    /// Status of `value` relative to the completed counter.
    pub fn status(&self, value: u64) -> FenceStatus {
        if self.completed_value() >= value {
            FenceStatus::Signaled
        } else {
            FenceStatus::Unsignaled
        }
    }

    /// Whether the fence has reached `value`.
    pub fn is_signaled(&self, value: u64) -> bool {
        self.status(value) == FenceStatus::Signaled
    }

    /// Arrange for `event` to be set once the fence reaches `value`.
    ///
    /// Sets the event immediately if the value is already reached.
    pub fn set_event_on_completion(&self, value: u64, event: &FenceEvent) {
        let mut waiters = self.inner.waiters.lock();
        if self.completed_value() >= value {
            event.set();
            return;
        }
        waiters.push((value, event.clone()));
    }

    /// Disarm every pending completion armed for `event`.
    pub fn cancel_event(&self, event: &FenceEvent) {
        self.inner
            .waiters
            .lock()
            .retain(|(_, armed)| !armed.same_as(event));
    }

    #[cfg(test)]
    pub(crate) fn armed_count(&self) -> usize {
        self.inner.waiters.lock().len()
    }

    /// Advance the completed value to `value` and set any armed events.
    ///
    /// Called by queue backends as they retire work. Values at or below the
    /// current completed value leave the counter unchanged.
    pub(crate) fn signal(&self, value: u64) {
        let previous = self.inner.completed.fetch_max(value, Ordering::AcqRel);
        if value <= previous {
            log::warn!(
                "Fence: ignoring signal of {} (already at {})",
                value,
                previous
            );
            return;
        }

        let mut waiters = self.inner.waiters.lock();
        waiters.retain(|(awaited, event)| {
            if *awaited <= value {
                event.set();
                false
            } else {
                true
            }
        });
    }
}

impl Default for Fence {
    fn default() -> Self {
        Self::new(0)
    }
}

static_assertions::assert_impl_all!(Fence: Send, Sync);
static_assertions::assert_impl_all!(FenceEvent: Send, Sync);
