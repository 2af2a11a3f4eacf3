//! Manually retired GPU queue.
//!
//! [`ManualQueue`] accepts submissions but leaves every fence signal pending
//! until the caller retires it. Tests use it to hold the GPU back at an exact
//! fence value and observe how the CPU side reacts.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use parking_lot::Mutex;

use crate::command::CommandList;
use crate::error::GraphicsError;
use crate::scheduler::Fence;

use super::{GpuQueue, validate_lists};

/// A queue whose work completes only when retired by the caller.
#[derive(Debug, Default)]
pub struct ManualQueue {
    /// Signals not yet retired, in submission order.
    pending: Mutex<VecDeque<(Fence, u64)>>,
    submissions: AtomicU64,
    lost: AtomicBool,
}

impl ManualQueue {
    /// Create a queue with nothing pending.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of signals waiting to be retired.
    pub fn pending(&self) -> usize {
        self.pending.lock().len()
    }

    /// Fence values waiting to be retired, oldest first.
    pub fn pending_values(&self) -> Vec<u64> {
        self.pending.lock().iter().map(|(_, value)| *value).collect()
    }

    /// Number of `execute_command_lists` calls.
    pub fn submission_count(&self) -> u64 {
        self.submissions.load(Ordering::Relaxed)
    }

    /// Retire the oldest pending signal. Returns the value signaled.
    pub fn retire_next(&self) -> Option<u64> {
        let (fence, value) = self.pending.lock().pop_front()?;
        log::trace!("ManualQueue: retiring fence value {}", value);
        fence.signal(value);
        Some(value)
    }

    /// Retire pending signals up to and including `value`.
    ///
    /// Returns the number retired.
    pub fn retire_through(&self, value: u64) -> usize {
        let mut retired = 0;
        loop {
            let next = {
                let mut pending = self.pending.lock();
                match pending.front() {
                    Some((_, front)) if *front <= value => pending.pop_front(),
                    _ => None,
                }
            };
            let Some((fence, v)) = next else {
                return retired;
            };
            fence.signal(v);
            retired += 1;
        }
    }

    /// Retire everything pending. Returns the number retired.
    pub fn retire_all(&self) -> usize {
        let mut retired = 0;
        while self.retire_next().is_some() {
            retired += 1;
        }
        retired
    }

    /// Make every later submission fail with [`GraphicsError::DeviceLost`].
    pub fn lose_device(&self) {
        log::warn!("ManualQueue: device lost");
        self.lost.store(true, Ordering::Release);
    }

    fn check_lost(&self) -> Result<(), GraphicsError> {
        if self.lost.load(Ordering::Acquire) {
            return Err(GraphicsError::DeviceLost);
        }
        Ok(())
    }
}

impl GpuQueue for ManualQueue {
    fn name(&self) -> &'static str {
        "Manual"
    }

    fn execute_command_lists(&self, lists: &[&CommandList]) -> Result<(), GraphicsError> {
        self.check_lost()?;
        let draws = validate_lists(lists)?;
        self.submissions.fetch_add(1, Ordering::Relaxed);
        log::trace!(
            "ManualQueue: queued {} command lists ({} draws)",
            lists.len(),
            draws
        );
        Ok(())
    }

    fn signal(&self, fence: &Fence, value: u64) -> Result<(), GraphicsError> {
        self.check_lost()?;
        self.pending.lock().push_back((fence.clone(), value));
        Ok(())
    }
}
