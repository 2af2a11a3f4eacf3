//! Frame resource ring for managing multiple frames in flight.
//!
//! This module provides [`FrameRing`], a fixed ring of [`FrameResource`]
//! slots. Each slot owns everything the CPU writes while building one frame:
//! a command allocator, upload buffers for pass, object and material
//! constants, and optionally a dynamic vertex buffer. The GPU reads a slot's
//! buffers while executing the frame recorded from it, so the CPU may only
//! touch a slot again once the fence value recorded for it has been reached.
//!
//! # Frame Overlap (Pipelining)
//!
//! With 3 frames in flight, the CPU can run up to two frames ahead:
//!
//! ```text
//! Slot 1: [CPU build F0] [submit] ──────────── [wait F0] [CPU build F3] ──►
//!                                 [GPU execute F0] ─────►
//! Slot 2:                [CPU build F1] [submit] ──────────────────────────►
//!                                                 [GPU execute F1] ───────►
//! Slot 0:                               [CPU build F2] [submit] ──────────►
//!
//! Time ──────────────────────────────────────────────────────────────────►
//! ```
//!
//! - The CPU doesn't wait for the GPU unless it's reusing a slot
//! - The GPU retires frames in submission order
//! - Recorded fence values ensure we don't overwrite in-use resources
//!
//! # Choosing Frames in Flight
//!
//! | Count | Behavior |
//! |-------|----------|
//! | 1 | CPU waits for GPU every frame. Simple but slow. |
//! | 2 | CPU can work on N+1 while GPU renders N. |
//! | 3 | More overlap, higher latency. The default. |
//!
//! More frames means more throughput but higher input latency and memory
//! usage, since each slot has its own copy of every per-frame buffer.

mod dirty;

pub use dirty::DirtyCountdown;

use std::sync::Arc;

use ripple_core::mesh::Vertex;

use crate::command::CommandAllocator;
use crate::device::GraphicsDevice;
use crate::error::GraphicsError;
use crate::resources::UploadBuffer;
use crate::scheduler::Fence;
use crate::types::{MaterialConstants, ObjectConstants, PassConstants};

/// Default number of frame slots.
pub const DEFAULT_FRAME_COUNT: usize = 3;

/// Sizes of the per-slot upload buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameResourceDesc {
    /// Number of pass constant elements.
    pub pass_count: usize,
    /// Number of object constant elements.
    pub max_objects: usize,
    /// Number of material constant elements.
    pub max_materials: usize,
    /// Dynamic vertex buffer size; 0 for no dynamic vertex buffer.
    pub max_dynamic_vertices: usize,
}

impl Default for FrameResourceDesc {
    fn default() -> Self {
        Self {
            pass_count: 1,
            max_objects: 1,
            max_materials: 1,
            max_dynamic_vertices: 0,
        }
    }
}

/// Resources owned by one frame slot.
///
/// # Invariant
///
/// The CPU writes a slot's buffers and resets its allocator only when
/// [`recorded_fence`](Self::recorded_fence) is 0 (never submitted) or the
/// fence's completed value has reached it.
#[derive(Debug)]
pub struct FrameResource {
    index: usize,
    allocator: CommandAllocator,
    /// Pass constants, one element per render pass.
    pub pass_constants: UploadBuffer<PassConstants>,
    /// Object constants, indexed by render item constant-buffer index.
    pub object_constants: UploadBuffer<ObjectConstants>,
    /// Material constants, indexed by material constant-buffer index.
    pub material_constants: UploadBuffer<MaterialConstants>,
    /// Per-frame vertices for geometry regenerated every frame.
    pub dynamic_vertices: Option<UploadBuffer<Vertex>>,
    recorded_fence: u64,
}

impl FrameResource {
    /// Allocate one slot's resources.
    pub fn new(
        device: &Arc<GraphicsDevice>,
        index: usize,
        desc: &FrameResourceDesc,
    ) -> Result<Self, GraphicsError> {
        let pass_constants =
            device.create_upload_buffer(&format!("frame{index}_pass"), desc.pass_count, true)?;
        let object_constants = device.create_upload_buffer(
            &format!("frame{index}_objects"),
            desc.max_objects,
            true,
        )?;
        let material_constants = device.create_upload_buffer(
            &format!("frame{index}_materials"),
            desc.max_materials,
            true,
        )?;
        let dynamic_vertices = match desc.max_dynamic_vertices {
            0 => None,
            count => Some(device.create_upload_buffer(
                &format!("frame{index}_vertices"),
                count,
                false,
            )?),
        };

        Ok(Self {
            index,
            allocator: device.create_command_allocator(),
            pass_constants,
            object_constants,
            material_constants,
            dynamic_vertices,
            recorded_fence: 0,
        })
    }

    /// Position of this slot in the ring.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Fence value of the last frame recorded from this slot (0 if never used).
    pub fn recorded_fence(&self) -> u64 {
        self.recorded_fence
    }

    /// Whether the GPU is done with this slot.
    pub fn is_ready(&self, fence: &Fence) -> bool {
        self.recorded_fence == 0 || fence.completed_value() >= self.recorded_fence
    }

    /// The slot's command allocator.
    pub fn allocator(&self) -> &CommandAllocator {
        &self.allocator
    }

    pub(crate) fn allocator_mut(&mut self) -> &mut CommandAllocator {
        &mut self.allocator
    }

    /// Record the fence value that retires this slot's latest frame.
    pub(crate) fn stamp(&mut self, value: u64) {
        self.recorded_fence = value;
        self.allocator.mark_submitted(value);
    }
}

/// Fixed ring of frame slots with a cursor.
///
/// The ring itself never blocks: [`advance`](Self::advance) only moves the
/// cursor. Waiting for the slot at the cursor is the scheduler's job.
#[derive(Debug)]
pub struct FrameRing {
    slots: Vec<FrameResource>,
    cursor: usize,
}

impl FrameRing {
    /// Allocate `count` slots.
    ///
    /// # Errors
    ///
    /// Returns [`GraphicsError::InvalidParameter`] if `count` is 0, or the
    /// device's error if any slot's buffers cannot be allocated.
    pub fn new(
        device: &Arc<GraphicsDevice>,
        count: usize,
        desc: &FrameResourceDesc,
    ) -> Result<Self, GraphicsError> {
        if count == 0 {
            return Err(GraphicsError::InvalidParameter(
                "frame ring needs at least one slot".to_string(),
            ));
        }

        let slots = (0..count)
            .map(|index| FrameResource::new(device, index, desc))
            .collect::<Result<Vec<_>, _>>()?;

        log::debug!(
            "FrameRing: allocated {} slots ({} bytes in use)",
            count,
            device.allocated_bytes()
        );

        Ok(Self { slots, cursor: 0 })
    }

    /// Number of slots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the ring has no slots. `new` rejects a count of zero, so
    /// this is `false` for every constructed ring.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Index of the current slot.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// The slot at the cursor.
    pub fn current(&self) -> &FrameResource {
        &self.slots[self.cursor]
    }

    /// The slot at the cursor, mutably.
    pub fn current_mut(&mut self) -> &mut FrameResource {
        &mut self.slots[self.cursor]
    }

    /// Move the cursor to the next slot, wrapping around.
    pub fn advance(&mut self) {
        self.cursor = (self.cursor + 1) % self.slots.len();
    }

    /// Slot `index`, if it exists.
    pub fn get(&self, index: usize) -> Option<&FrameResource> {
        self.slots.get(index)
    }

    /// Iterate over all slots in index order.
    pub fn iter(&self) -> impl Iterator<Item = &FrameResource> {
        self.slots.iter()
    }

    /// Whether the GPU is done with slot `index`.
    pub fn is_slot_ready(&self, index: usize, fence: &Fence) -> bool {
        self.slots.get(index).is_some_and(|slot| slot.is_ready(fence))
    }
}
