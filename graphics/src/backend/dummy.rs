//! Dummy GPU queue for testing and development.
//!
//! This queue doesn't perform actual GPU work. Submitted lists retire
//! immediately and signals complete before `signal` returns, so the CPU never
//! waits on it.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::command::CommandList;
use crate::error::GraphicsError;
use crate::scheduler::Fence;

use super::{GpuQueue, validate_lists};

/// Dummy GPU queue.
#[derive(Debug, Default)]
pub struct DummyQueue {
    submissions: AtomicU64,
    draws: AtomicU64,
}

impl DummyQueue {
    /// Create a new dummy queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `execute_command_lists` calls.
    pub fn submission_count(&self) -> u64 {
        self.submissions.load(Ordering::Relaxed)
    }

    /// Total draws executed.
    pub fn draw_count(&self) -> u64 {
        self.draws.load(Ordering::Relaxed)
    }
}

impl GpuQueue for DummyQueue {
    fn name(&self) -> &'static str {
        "Dummy"
    }

    fn execute_command_lists(&self, lists: &[&CommandList]) -> Result<(), GraphicsError> {
        let draws = validate_lists(lists)?;
        self.submissions.fetch_add(1, Ordering::Relaxed);
        self.draws.fetch_add(draws as u64, Ordering::Relaxed);
        log::trace!(
            "DummyQueue: executing {} command lists ({} draws)",
            lists.len(),
            draws
        );
        Ok(())
    }

    fn signal(&self, fence: &Fence, value: u64) -> Result<(), GraphicsError> {
        log::trace!("DummyQueue: signaling fence to {}", value);
        fence.signal(value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::CommandAllocator;

    #[test]
    fn test_dummy_signals_immediately() {
        let queue = DummyQueue::new();
        let fence = Fence::new(0);
        queue.signal(&fence, 1).unwrap();
        assert_eq!(fence.completed_value(), 1);
    }

    #[test]
    fn test_dummy_counts_draws() {
        let queue = DummyQueue::new();
        let allocator = CommandAllocator::new(0);
        let mut list = CommandList::new();
        list.reset(&allocator);
        list.draw_indexed(6, 0, 0).unwrap();
        list.draw_indexed(6, 6, 0).unwrap();
        list.close();

        queue.execute_command_lists(&[&list]).unwrap();
        assert_eq!(queue.submission_count(), 1);
        assert_eq!(queue.draw_count(), 2);
    }
}
