//! Frame scheduling.
//!
//! [`FrameScheduler`] drives one frame at a time through the ring of frame
//! slots. Every [`render_frame`](FrameScheduler::render_frame) call runs the
//! same fixed sequence:
//!
//! 1. Advance the ring cursor to the next slot.
//! 2. If the GPU has not reached the fence value recorded for that slot,
//!    block on a [`FenceEvent`] until it does. A wait that exceeds
//!    [`SchedulerConfig::fence_timeout`] is fatal.
//! 3. Let the scene write its changed per-frame data into the slot
//!    ([`FrameScene::refresh_dirty_state`]).
//! 4. Reset the slot's command allocator and the shared command list, then
//!    let the scene record draws ([`FrameScene::record_draws`]).
//! 5. Submit the command list.
//! 6. Increment the fence value, store it in the slot, and signal it on the
//!    queue after the submitted work.
//!
//! # Synchronization Model
//!
//! | Level | Primitive | Purpose |
//! |-------|-----------|---------|
//! | Frame → Frame | [`Fence`] | CPU-GPU sync across frame slots |
//! | CPU blocking | [`FenceEvent`] | Sleep until a fence value is reached |
//!
//! # Graceful Shutdown
//!
//! Call [`FrameScheduler::shutdown`] before destroying resources the GPU may
//! still read. Dropping the scheduler without it flushes as well, logging any
//! failure.
//!
//! # Example
//!
//! ```
//! use ripple_core::time::FrameTime;
//! use ripple_graphics::backend::{BackendType, create_queue};
//! use ripple_graphics::command::CommandList;
//! use ripple_graphics::device::{DeviceCapabilities, GraphicsDevice};
//! use ripple_graphics::pipeline::{FrameResource, FrameResourceDesc};
//! use ripple_graphics::scheduler::{FrameScene, FrameScheduler, SchedulerConfig};
//! use ripple_graphics::GraphicsError;
//!
//! struct Empty;
//!
//! impl FrameScene for Empty {
//!     fn refresh_dirty_state(
//!         &mut self,
//!         _frame: &mut FrameResource,
//!         _time: &FrameTime,
//!     ) -> Result<(), GraphicsError> {
//!         Ok(())
//!     }
//!
//!     fn record_draws(
//!         &self,
//!         _frame: &FrameResource,
//!         _list: &mut CommandList,
//!     ) -> Result<(), GraphicsError> {
//!         Ok(())
//!     }
//! }
//!
//! let device = GraphicsDevice::new(DeviceCapabilities::default());
//! let queue = create_queue(BackendType::Dummy).unwrap();
//! let mut scheduler = FrameScheduler::new(
//!     device,
//!     queue,
//!     SchedulerConfig::default(),
//!     FrameResourceDesc::default(),
//! )
//! .unwrap();
//!
//! let report = scheduler.render_frame(&mut Empty, &FrameTime::fixed(0.016, 0)).unwrap();
//! assert_eq!(report.fence_value, 1);
//! scheduler.shutdown().unwrap();
//! ```

mod sync;

pub use sync::{Fence, FenceEvent, FenceStatus};

use std::sync::Arc;
use std::time::{Duration, Instant};

use ripple_core::time::FrameTime;

use crate::backend::GpuQueue;
use crate::command::CommandList;
use crate::device::GraphicsDevice;
use crate::error::GraphicsError;
use crate::pipeline::{DEFAULT_FRAME_COUNT, FrameResource, FrameResourceDesc, FrameRing};

/// Scheduler configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// Number of frame slots (frames in flight). Default: 3.
    pub frame_count: usize,
    /// Longest the CPU waits for a fence value before giving up. Default: 5 s.
    pub fence_timeout: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            frame_count: DEFAULT_FRAME_COUNT,
            fence_timeout: Duration::from_secs(5),
        }
    }
}

/// The per-frame CPU work a scene plugs into the scheduler.
pub trait FrameScene {
    /// Write changed constants (objects, materials, pass data, dynamic
    /// geometry) into `frame`, the slot the GPU has finished with.
    fn refresh_dirty_state(
        &mut self,
        frame: &mut FrameResource,
        time: &FrameTime,
    ) -> Result<(), GraphicsError>;

    /// Record this frame's draws into `list`, reading bindings from `frame`.
    fn record_draws(&self, frame: &FrameResource, list: &mut CommandList)
    -> Result<(), GraphicsError>;
}

/// Outcome of one [`FrameScheduler::render_frame`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameReport {
    /// Zero-based frame number.
    pub frame: u64,
    /// Slot the frame was built in.
    pub slot: usize,
    /// Fence value signaled after the frame's work.
    pub fence_value: u64,
    /// Whether the CPU had to wait for the GPU before reusing the slot.
    pub waited: bool,
}

/// Running totals across frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameStats {
    /// Frames submitted.
    pub frames: u64,
    /// Frames that blocked on the GPU before reusing their slot.
    pub waits: u64,
    /// Total time spent blocked.
    pub wait_time: Duration,
}

/// Drives frames through a [`FrameRing`] and a [`GpuQueue`].
///
/// # Thread Safety
///
/// `FrameScheduler` is owned by a single thread (typically the main/render
/// thread). Only the queue backend runs concurrently with it.
pub struct FrameScheduler {
    device: Arc<GraphicsDevice>,
    queue: Arc<dyn GpuQueue>,
    ring: FrameRing,
    fence: Fence,
    event: FenceEvent,
    command_list: CommandList,
    /// Last fence value handed to the queue.
    current_fence: u64,
    config: SchedulerConfig,
    stats: FrameStats,
    /// Set once a frame fails; every later frame is refused.
    failed: bool,
    shut_down: bool,
}

impl FrameScheduler {
    /// Create a scheduler with `config.frame_count` slots sized by `desc`.
    ///
    /// # Errors
    ///
    /// Returns an error if the ring cannot be allocated.
    pub fn new(
        device: Arc<GraphicsDevice>,
        queue: Arc<dyn GpuQueue>,
        config: SchedulerConfig,
        desc: FrameResourceDesc,
    ) -> Result<Self, GraphicsError> {
        let ring = FrameRing::new(&device, config.frame_count, &desc)?;
        let fence = device.create_fence(0);

        log::info!(
            "FrameScheduler: {} frames in flight on {} queue",
            config.frame_count,
            queue.name()
        );

        Ok(Self {
            device,
            queue,
            ring,
            fence,
            event: FenceEvent::new(),
            command_list: CommandList::new(),
            current_fence: 0,
            config,
            stats: FrameStats::default(),
            failed: false,
            shut_down: false,
        })
    }

    /// Build and submit one frame.
    ///
    /// # Errors
    ///
    /// Every error is fatal: the scheduler refuses further frames after one.
    pub fn render_frame<S: FrameScene + ?Sized>(
        &mut self,
        scene: &mut S,
        time: &FrameTime,
    ) -> Result<FrameReport, GraphicsError> {
        if self.failed {
            return Err(GraphicsError::Internal(
                "frame scheduler stopped after an earlier failure".to_string(),
            ));
        }

        let result = self.run_frame(scene, time);
        if let Err(e) = &result {
            log::error!("FrameScheduler: frame {} failed: {}", self.stats.frames, e);
            self.failed = true;
        }
        result
    }

    fn run_frame<S: FrameScene + ?Sized>(
        &mut self,
        scene: &mut S,
        time: &FrameTime,
    ) -> Result<FrameReport, GraphicsError> {
        self.ring.advance();
        let slot = self.ring.cursor();

        let recorded = self.ring.current().recorded_fence();
        let waited = !self.ring.current().is_ready(&self.fence);
        if waited {
            let start = Instant::now();
            self.wait_for_fence(recorded)?;
            self.stats.waits += 1;
            self.stats.wait_time += start.elapsed();
        }

        scene.refresh_dirty_state(self.ring.current_mut(), time)?;

        let frame = self.ring.current_mut();
        frame.allocator_mut().reset(&self.fence)?;
        self.command_list.reset(frame.allocator());
        scene.record_draws(self.ring.current(), &mut self.command_list)?;
        self.command_list.close();

        self.queue.execute_command_lists(&[&self.command_list])?;

        self.current_fence += 1;
        self.ring.current_mut().stamp(self.current_fence);
        self.queue.signal(&self.fence, self.current_fence)?;

        let report = FrameReport {
            frame: self.stats.frames,
            slot,
            fence_value: self.current_fence,
            waited,
        };
        self.stats.frames += 1;

        log::trace!(
            "FrameScheduler: frame {} in slot {} -> fence {} ({} draws{})",
            report.frame,
            slot,
            report.fence_value,
            self.command_list.draw_count(),
            if waited { ", waited" } else { "" }
        );

        Ok(report)
    }

    /// Block until the GPU reaches the most recent fence value.
    ///
    /// # Errors
    ///
    /// Returns [`GraphicsError::FenceTimeout`] if the wait exceeds the
    /// configured timeout.
    pub fn flush(&self) -> Result<(), GraphicsError> {
        log::debug!(
            "FrameScheduler: flushing to fence {} (completed {})",
            self.current_fence,
            self.fence.completed_value()
        );
        self.wait_for_fence(self.current_fence)
    }

    /// Flush and consume the scheduler.
    pub fn shutdown(mut self) -> Result<(), GraphicsError> {
        self.shut_down = true;
        let result = self.flush();
        log::info!(
            "FrameScheduler: shut down after {} frames ({} waits, {:?} waiting)",
            self.stats.frames,
            self.stats.waits,
            self.stats.wait_time
        );
        result
    }

    fn wait_for_fence(&self, value: u64) -> Result<(), GraphicsError> {
        if self.fence.is_signaled(value) {
            return Ok(());
        }

        log::debug!(
            "FrameScheduler: waiting for fence {} (completed {})",
            value,
            self.fence.completed_value()
        );

        // The event may still be set by a completion armed for another
        // value, so only the fence itself ends the wait.
        let deadline = Instant::now() + self.config.fence_timeout;
        loop {
            self.event.reset();
            self.fence.set_event_on_completion(value, &self.event);
            let remaining = deadline.saturating_duration_since(Instant::now());
            let woke = self.event.wait_timeout(remaining);
            if self.fence.is_signaled(value) {
                return Ok(());
            }

            self.fence.cancel_event(&self.event);
            if !woke || Instant::now() >= deadline {
                return Err(GraphicsError::FenceTimeout {
                    value,
                    completed: self.fence.completed_value(),
                });
            }
        }
    }

    /// The frame ring.
    pub fn ring(&self) -> &FrameRing {
        &self.ring
    }

    /// The frame fence.
    pub fn fence(&self) -> &Fence {
        &self.fence
    }

    /// Last fence value handed to the queue (0 before the first frame).
    pub fn current_fence_value(&self) -> u64 {
        self.current_fence
    }

    /// The device the ring was allocated from.
    pub fn device(&self) -> &Arc<GraphicsDevice> {
        &self.device
    }

    /// The scheduler configuration.
    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Running totals.
    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    /// The command list as recorded for the most recent frame.
    pub fn last_command_list(&self) -> &CommandList {
        &self.command_list
    }
}

impl Drop for FrameScheduler {
    fn drop(&mut self) {
        if self.shut_down {
            return;
        }
        if self.failed {
            log::warn!("FrameScheduler: dropped after a failure, skipping flush");
            return;
        }
        if let Err(e) = self.flush() {
            log::error!("FrameScheduler: flush on drop failed: {}", e);
        }
    }
}

impl std::fmt::Debug for FrameScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameScheduler")
            .field("queue", &self.queue.name())
            .field("frame_count", &self.ring.len())
            .field("cursor", &self.ring.cursor())
            .field("current_fence", &self.current_fence)
            .field("completed_fence", &self.fence.completed_value())
            .finish()
    }
}
