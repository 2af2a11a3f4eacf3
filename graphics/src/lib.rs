//! # Ripple Graphics
//!
//! Frame-resource pipelining for a CPU that builds frames while the GPU
//! executes earlier ones.
//!
//! ## Overview
//!
//! This crate provides:
//! - [`FrameScheduler`] - Runs one frame through the ring of frame slots
//! - [`FrameRing`] / [`FrameResource`] - Per-slot command allocators and upload buffers
//! - [`Fence`] / [`FenceEvent`] - Monotonic CPU-GPU synchronization
//! - [`GpuQueue`] - Trait for queue backends (Dummy, Manual, Simulated)
//! - [`scene`] - Named registry of geometry, materials and render items
//! - [`types`] - Shader constant layouts
//!
//! ## Example
//!
//! ```ignore
//! let device = GraphicsDevice::new(DeviceCapabilities::default());
//! let queue = create_queue(BackendType::Simulated { latency })?;
//! let mut scheduler = FrameScheduler::new(device, queue, SchedulerConfig::default(), desc)?;
//!
//! while running {
//!     timer.tick();
//!     scheduler.render_frame(&mut scene, &timer.frame_time())?;
//! }
//!
//! scheduler.shutdown()?;
//! ```

pub mod backend;
pub mod command;
pub mod device;
pub mod error;
pub mod pipeline;
pub mod resources;
pub mod scene;
pub mod scheduler;
pub mod types;

// Re-export main types for convenience
pub use backend::{BackendType, DummyQueue, GpuQueue, ManualQueue, SimulatedQueue, create_queue};
pub use command::{Command, CommandAllocator, CommandList};
pub use device::{DeviceCapabilities, GraphicsDevice};
pub use error::GraphicsError;
pub use pipeline::{DirtyCountdown, FrameResource, FrameResourceDesc, FrameRing};
pub use resources::{Buffer, UploadBuffer};
pub use scene::{
    Handle, Material, MaterialDesc, MeshGeometry, Registry, RenderItem, RenderItemDesc,
    RenderLayer, SceneRegistry, SubmeshGeometry, VertexSource,
};
pub use scheduler::{
    Fence, FenceEvent, FenceStatus, FrameReport, FrameScene, FrameScheduler, FrameStats,
    SchedulerConfig,
};
pub use types::{
    BufferDescriptor, BufferId, BufferUsage, Light, MaterialConstants, ObjectConstants,
    PassConstants,
};

/// Graphics library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Log the graphics library version.
pub fn init() {
    log::info!("Ripple Graphics v{} initialized", VERSION);
}
