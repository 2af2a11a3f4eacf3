//! Common utilities for frame pipeline integration tests.
//!
//! This module provides shared test infrastructure that can be reused
//! across different queue backends.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use ripple_core::mesh::create_grid;
use ripple_core::time::FrameTime;
use ripple_graphics::{
    BackendType, CommandList, DeviceCapabilities, Fence, FrameResource, FrameResourceDesc,
    FrameScene, FrameScheduler, GpuQueue, GraphicsDevice, GraphicsError, Handle, ManualQueue,
    MaterialDesc, MeshGeometry, PassConstants, RenderItem, RenderItemDesc, RenderLayer,
    SceneRegistry, SchedulerConfig, create_queue,
};

/// Frame slots used by every test.
pub const FRAME_COUNT: usize = 3;

/// Initialize logging for test output.
pub fn init_logging() {
    let _ = env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .is_test(true)
        .try_init();
}

// ============================================================================
// Backend Enumeration
// ============================================================================

/// Queue backends exercised by the tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Backend {
    /// Work retires at submission.
    Dummy,
    /// Work retires on a worker thread after a short latency.
    Simulated,
}

impl Backend {
    pub fn backend_type(self) -> BackendType {
        match self {
            Backend::Dummy => BackendType::Dummy,
            Backend::Simulated => BackendType::Simulated {
                latency: Duration::from_millis(2),
            },
        }
    }
}

// ============================================================================
// Schedulers
// ============================================================================

pub fn device() -> Arc<GraphicsDevice> {
    GraphicsDevice::new(DeviceCapabilities::default())
}

pub fn scene_desc() -> FrameResourceDesc {
    FrameResourceDesc {
        pass_count: 1,
        max_objects: 4,
        max_materials: 4,
        max_dynamic_vertices: 0,
    }
}

/// Scheduler on the given backend with the default 5 second timeout.
pub fn scheduler_for(backend: Backend) -> FrameScheduler {
    let queue = create_queue(backend.backend_type()).expect("queue");
    FrameScheduler::new(device(), queue, SchedulerConfig::default(), scene_desc())
        .expect("scheduler")
}

/// Scheduler on a [`ManualQueue`] the test retires by hand.
pub fn manual_scheduler(timeout: Duration) -> (FrameScheduler, Arc<ManualQueue>) {
    let queue = Arc::new(ManualQueue::new());
    let scheduler = FrameScheduler::new(
        device(),
        queue.clone() as Arc<dyn GpuQueue>,
        SchedulerConfig {
            frame_count: FRAME_COUNT,
            fence_timeout: timeout,
        },
        scene_desc(),
    )
    .expect("scheduler");
    (scheduler, queue)
}

// ============================================================================
// Test Scene
// ============================================================================

/// One slot write observed by [`TrackingScene`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotWrite {
    pub slot: usize,
    pub recorded_fence: u64,
    pub completed_at_write: u64,
}

/// A scene that records every slot write together with the GPU progress at
/// the time of the write, and draws a fixed set of render items.
pub struct TrackingScene {
    pub registry: SceneRegistry,
    pub items: Vec<Handle<RenderItem>>,
    pub writes: Vec<SlotWrite>,
    fence: Fence,
    /// Frames refreshed so far; written into each slot's pass constants.
    pub frames_written: u64,
}

impl TrackingScene {
    /// Build a scene with `item_count` land grids sharing one material.
    pub fn new(scheduler: &FrameScheduler, item_count: usize) -> Result<Self, GraphicsError> {
        let mut registry = SceneRegistry::new(scheduler.ring().len());
        let mesh = create_grid(8.0, 8.0, 5, 5);
        let geometry = MeshGeometry::from_mesh(scheduler.device(), "grid", "grid", &mesh)?;
        let submesh = *geometry
            .submesh("grid")
            .ok_or_else(|| GraphicsError::Internal("missing submesh".to_string()))?;
        let geometry = registry.add_geometry("grid", geometry)?;
        let material = registry.add_material("grass", MaterialDesc::default())?;

        let items = (0..item_count)
            .map(|i| {
                registry.add_render_item(
                    format!("item{i}"),
                    RenderItemDesc::new(geometry, material, submesh),
                )
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            registry,
            items,
            writes: Vec::new(),
            fence: scheduler.fence().clone(),
            frames_written: 0,
        })
    }

    /// Whether every recorded write happened after the GPU released the slot.
    pub fn all_writes_safe(&self) -> bool {
        self.writes
            .iter()
            .all(|w| w.recorded_fence == 0 || w.completed_at_write >= w.recorded_fence)
    }
}

impl FrameScene for TrackingScene {
    fn refresh_dirty_state(
        &mut self,
        frame: &mut FrameResource,
        time: &FrameTime,
    ) -> Result<(), GraphicsError> {
        self.writes.push(SlotWrite {
            slot: frame.index(),
            recorded_fence: frame.recorded_fence(),
            completed_at_write: self.fence.completed_value(),
        });

        self.registry.refresh_object_constants(frame)?;
        self.registry.refresh_material_constants(frame)?;

        let pass = PassConstants {
            total_time: time.total,
            delta_time: time.delta,
            near_z: self.frames_written as f32,
            ..Default::default()
        };
        self.frames_written += 1;
        frame.pass_constants.copy_data(0, &pass)
    }

    fn record_draws(
        &self,
        frame: &FrameResource,
        list: &mut CommandList,
    ) -> Result<(), GraphicsError> {
        list.set_pass_constants(frame.pass_constants.id(), 0)?;
        self.registry.record_layer(RenderLayer::Opaque, frame, list)?;
        Ok(())
    }
}
