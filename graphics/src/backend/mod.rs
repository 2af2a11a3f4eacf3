//! GPU queue backends.
//!
//! Command submission goes through the [`GpuQueue`] trait. A queue executes
//! closed command lists and signals fences strictly in submission order: a
//! fence value signaled after a batch of lists is only reached once that
//! batch and everything submitted earlier has retired.
//!
//! # Available Backends
//!
//! - [`DummyQueue`]: retires everything at submission time
//! - [`ManualQueue`]: holds work until the caller retires it, for tests that
//!   need to hold the GPU back
//! - [`SimulatedQueue`]: a worker thread that retires each signal after a
//!   fixed latency, standing in for a GPU running behind the CPU

mod dummy;
mod manual;
mod simulated;

use std::sync::Arc;
use std::time::Duration;

use crate::command::CommandList;
use crate::error::GraphicsError;
use crate::scheduler::Fence;

pub use dummy::DummyQueue;
pub use manual::ManualQueue;
pub use simulated::SimulatedQueue;

/// A GPU command queue.
pub trait GpuQueue: Send + Sync + std::fmt::Debug {
    /// Backend name for logging.
    fn name(&self) -> &'static str;

    /// Submit closed command lists for execution.
    ///
    /// # Errors
    ///
    /// Returns [`GraphicsError::CommandListNotClosed`] if any list is still
    /// open, or [`GraphicsError::DeviceLost`] if the queue stopped.
    fn execute_command_lists(&self, lists: &[&CommandList]) -> Result<(), GraphicsError>;

    /// Set `fence` to `value` once all previously submitted work retires.
    fn signal(&self, fence: &Fence, value: u64) -> Result<(), GraphicsError>;
}

/// Queue backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendType {
    /// Work completes at submission.
    #[default]
    Dummy,
    /// Work completes when the caller retires it.
    Manual,
    /// Work completes `latency` after each signal is submitted.
    Simulated { latency: Duration },
}

/// Create a queue for the selected backend.
pub fn create_queue(backend: BackendType) -> Result<Arc<dyn GpuQueue>, GraphicsError> {
    let queue: Arc<dyn GpuQueue> = match backend {
        BackendType::Dummy => Arc::new(DummyQueue::new()),
        BackendType::Manual => Arc::new(ManualQueue::new()),
        BackendType::Simulated { latency } => Arc::new(SimulatedQueue::new(latency)?),
    };
    log::info!("Created GPU queue: {}", queue.name());
    Ok(queue)
}

/// Total draws across `lists`, after checking every list is closed.
pub(crate) fn validate_lists(lists: &[&CommandList]) -> Result<usize, GraphicsError> {
    if lists.iter().any(|list| !list.is_closed()) {
        return Err(GraphicsError::CommandListNotClosed);
    }
    Ok(lists.iter().map(|list| list.draw_count()).sum())
}
