//! Command allocators and command lists.
//!
//! A [`CommandAllocator`] owns the memory backing recorded commands. It may
//! only be reset once the GPU has finished executing everything recorded from
//! it, which is why every frame slot owns its own allocator. A
//! [`CommandList`] records [`Command`]s using an allocator's memory and is
//! reused every frame after being reset against the current slot's allocator.

use crate::error::GraphicsError;
use crate::scheduler::Fence;
use crate::types::BufferId;

/// Memory backing recorded GPU commands.
#[derive(Debug)]
pub struct CommandAllocator {
    id: u64,
    /// Fence value of the last submission recorded from this allocator.
    last_submitted: u64,
    reset_count: u64,
}

impl CommandAllocator {
    pub(crate) fn new(id: u64) -> Self {
        Self {
            id,
            last_submitted: 0,
            reset_count: 0,
        }
    }

    /// Allocator id, unique per device.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Fence value of the last submission recorded from this allocator.
    pub fn last_submitted(&self) -> u64 {
        self.last_submitted
    }

    /// Number of successful resets.
    pub fn reset_count(&self) -> u64 {
        self.reset_count
    }

    /// Reclaim the allocator's memory for new recording.
    ///
    /// # Errors
    ///
    /// Returns [`GraphicsError::AllocatorInUse`] if `fence` has not yet
    /// reached the last submission recorded from this allocator.
    pub fn reset(&mut self, fence: &Fence) -> Result<(), GraphicsError> {
        let completed = fence.completed_value();
        if completed < self.last_submitted {
            return Err(GraphicsError::AllocatorInUse {
                allocator: self.id,
                submitted: self.last_submitted,
                completed,
            });
        }
        self.reset_count += 1;
        log::trace!("CommandAllocator {}: reset #{}", self.id, self.reset_count);
        Ok(())
    }

    /// Record that work from this allocator is retired at fence `value`.
    pub fn mark_submitted(&mut self, value: u64) {
        self.last_submitted = value;
    }
}

/// A recorded GPU command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Bind the pass constant buffer element at `offset`.
    SetPassConstants { buffer: BufferId, offset: u64 },
    /// Bind a vertex buffer.
    SetVertexBuffer { buffer: BufferId, stride: u32 },
    /// Bind an index buffer of `u32` indices.
    SetIndexBuffer { buffer: BufferId },
    /// Bind the object constant buffer element at `offset`.
    SetObjectConstants { buffer: BufferId, offset: u64 },
    /// Bind the material constant buffer element at `offset`.
    SetMaterialConstants { buffer: BufferId, offset: u64 },
    /// Draw indexed triangles.
    DrawIndexed {
        index_count: u32,
        start_index: u32,
        base_vertex: i32,
    },
}

/// A list of commands recorded for one submission.
#[derive(Debug)]
pub struct CommandList {
    commands: Vec<Command>,
    allocator: Option<u64>,
    closed: bool,
}

impl CommandList {
    /// Create a closed, empty command list.
    pub fn new() -> Self {
        Self {
            commands: Vec::new(),
            allocator: None,
            closed: true,
        }
    }

    /// Clear the list and reopen it for recording into `allocator`.
    pub fn reset(&mut self, allocator: &CommandAllocator) {
        self.commands.clear();
        self.allocator = Some(allocator.id());
        self.closed = false;
    }

    /// Finish recording.
    pub fn close(&mut self) {
        self.closed = true;
    }

    /// Whether recording has finished.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Id of the allocator this list last recorded into.
    pub fn allocator(&self) -> Option<u64> {
        self.allocator
    }

    /// Recorded commands, in order.
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Number of draw commands recorded.
    pub fn draw_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, Command::DrawIndexed { .. }))
            .count()
    }

    /// Append a command.
    ///
    /// # Errors
    ///
    /// Returns [`GraphicsError::CommandListClosed`] if the list is closed.
    pub fn record(&mut self, command: Command) -> Result<(), GraphicsError> {
        if self.closed {
            return Err(GraphicsError::CommandListClosed);
        }
        self.commands.push(command);
        Ok(())
    }

    /// Bind the pass constants at `offset` in `buffer`.
    pub fn set_pass_constants(&mut self, buffer: BufferId, offset: u64) -> Result<(), GraphicsError> {
        self.record(Command::SetPassConstants { buffer, offset })
    }

    /// Bind a vertex buffer with `stride` bytes per vertex.
    pub fn set_vertex_buffer(&mut self, buffer: BufferId, stride: u32) -> Result<(), GraphicsError> {
        self.record(Command::SetVertexBuffer { buffer, stride })
    }

    /// Bind a 32-bit index buffer.
    pub fn set_index_buffer(&mut self, buffer: BufferId) -> Result<(), GraphicsError> {
        self.record(Command::SetIndexBuffer { buffer })
    }

    /// Bind the object constants at `offset` in `buffer`.
    pub fn set_object_constants(
        &mut self,
        buffer: BufferId,
        offset: u64,
    ) -> Result<(), GraphicsError> {
        self.record(Command::SetObjectConstants { buffer, offset })
    }

    /// Bind the material constants at `offset` in `buffer`.
    pub fn set_material_constants(
        &mut self,
        buffer: BufferId,
        offset: u64,
    ) -> Result<(), GraphicsError> {
        self.record(Command::SetMaterialConstants { buffer, offset })
    }

    /// Draw `index_count` indices from `start_index`, offset by `base_vertex`.
    pub fn draw_indexed(
        &mut self,
        index_count: u32,
        start_index: u32,
        base_vertex: i32,
    ) -> Result<(), GraphicsError> {
        self.record(Command::DrawIndexed {
            index_count,
            start_index,
            base_vertex,
        })
    }
}

impl Default for CommandList {
    fn default() -> Self {
        Self::new()
    }
}
