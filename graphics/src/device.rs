//! Graphics device.
//!
//! The [`GraphicsDevice`] creates GPU resources: fences, command allocators,
//! upload buffers and static geometry buffers. Buffer memory is accounted
//! against [`DeviceCapabilities::memory_budget`], so running out of memory
//! surfaces as [`GraphicsError::OutOfMemory`] at creation time.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use bytemuck::Pod;

use crate::command::CommandAllocator;
use crate::error::GraphicsError;
use crate::resources::{Buffer, UploadBuffer};
use crate::scheduler::Fence;
use crate::types::{BufferDescriptor, BufferId, BufferUsage};

/// Capabilities of a graphics device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceCapabilities {
    /// Maximum buffer size.
    pub max_buffer_size: u64,
    /// Total bytes of buffer memory available.
    pub memory_budget: u64,
}

impl Default for DeviceCapabilities {
    fn default() -> Self {
        Self {
            max_buffer_size: 256 << 20, // 256 MB
            memory_budget: 1 << 30,     // 1 GB
        }
    }
}

/// A graphics device for creating GPU resources.
///
/// # Thread Safety
///
/// `GraphicsDevice` is `Send + Sync` and can be safely shared across threads.
/// Allocation bookkeeping uses atomics.
///
/// # Example
///
/// ```
/// use ripple_graphics::device::{DeviceCapabilities, GraphicsDevice};
/// use ripple_graphics::types::ObjectConstants;
///
/// let device = GraphicsDevice::new(DeviceCapabilities::default());
/// let objects = device
///     .create_upload_buffer::<ObjectConstants>("objects", 8, true)
///     .unwrap();
/// assert_eq!(objects.byte_size(), 8 * 256);
/// ```
#[derive(Debug)]
pub struct GraphicsDevice {
    capabilities: DeviceCapabilities,
    allocated: AtomicU64,
    next_id: AtomicU64,
}

impl GraphicsDevice {
    /// Create a device with the given capabilities.
    pub fn new(capabilities: DeviceCapabilities) -> Arc<Self> {
        log::debug!(
            "GraphicsDevice: created (budget={} bytes, max buffer={} bytes)",
            capabilities.memory_budget,
            capabilities.max_buffer_size
        );
        Arc::new(Self {
            capabilities,
            allocated: AtomicU64::new(0),
            next_id: AtomicU64::new(1),
        })
    }

    /// Get the device capabilities.
    pub fn capabilities(&self) -> &DeviceCapabilities {
        &self.capabilities
    }

    /// Bytes of buffer memory currently allocated.
    pub fn allocated_bytes(&self) -> u64 {
        self.allocated.load(Ordering::Acquire)
    }

    /// Create a fence whose completed value starts at `initial`.
    pub fn create_fence(&self, initial: u64) -> Fence {
        Fence::new(initial)
    }

    /// Create a command allocator.
    pub fn create_command_allocator(&self) -> CommandAllocator {
        let id = self.next_id();
        log::trace!("GraphicsDevice: created command allocator {}", id);
        CommandAllocator::new(id)
    }

    /// Create a GPU buffer.
    ///
    /// # Errors
    ///
    /// Returns [`GraphicsError::InvalidParameter`] for empty buffers or sizes
    /// above the device limit, and [`GraphicsError::OutOfMemory`] when the
    /// memory budget is exhausted.
    pub fn create_buffer(
        self: &Arc<Self>,
        descriptor: &BufferDescriptor,
    ) -> Result<Buffer, GraphicsError> {
        if descriptor.size > self.capabilities.max_buffer_size {
            return Err(GraphicsError::InvalidParameter(format!(
                "buffer size {} exceeds maximum {}",
                descriptor.size, self.capabilities.max_buffer_size
            )));
        }

        if descriptor.size == 0 {
            return Err(GraphicsError::InvalidParameter(
                "buffer size cannot be zero".to_string(),
            ));
        }

        self.reserve(descriptor.size)?;
        let id = BufferId(self.next_id());

        log::trace!(
            "GraphicsDevice: created buffer {:?} {:?}, size={}",
            id,
            descriptor.label,
            descriptor.size
        );

        Ok(Buffer::new(Arc::downgrade(self), id, descriptor.clone()))
    }

    /// Create a CPU-writable upload buffer of `element_count` elements of `T`.
    ///
    /// Constant buffers round each element up to 256 bytes; other upload
    /// buffers pack elements tightly.
    pub fn create_upload_buffer<T: Pod>(
        self: &Arc<Self>,
        label: &str,
        element_count: usize,
        is_constant_buffer: bool,
    ) -> Result<UploadBuffer<T>, GraphicsError> {
        let stride = UploadBuffer::<T>::stride(is_constant_buffer);
        let usage = if is_constant_buffer {
            BufferUsage::UPLOAD | BufferUsage::CONSTANT
        } else {
            BufferUsage::UPLOAD | BufferUsage::STRUCTURED | BufferUsage::VERTEX
        };
        let descriptor =
            BufferDescriptor::new(stride * element_count as u64, usage).with_label(label);
        let buffer = self.create_buffer(&descriptor)?;
        Ok(UploadBuffer::new(buffer, element_count, stride))
    }

    /// Create an immutable buffer initialized with `data`.
    pub fn create_static_buffer(
        self: &Arc<Self>,
        label: &str,
        usage: BufferUsage,
        data: &[u8],
    ) -> Result<Arc<Buffer>, GraphicsError> {
        let descriptor = BufferDescriptor::new(data.len() as u64, usage | BufferUsage::COPY_DST)
            .with_label(label);
        let buffer = self.create_buffer(&descriptor)?;
        Ok(Arc::new(buffer))
    }

    fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    fn reserve(&self, bytes: u64) -> Result<(), GraphicsError> {
        let budget = self.capabilities.memory_budget;
        self.allocated
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |allocated| {
                allocated.checked_add(bytes).filter(|&total| total <= budget)
            })
            .map(|_| ())
            .map_err(|allocated| {
                log::error!(
                    "GraphicsDevice: out of memory allocating {} bytes ({} of {} in use)",
                    bytes,
                    allocated,
                    budget
                );
                GraphicsError::OutOfMemory {
                    requested: bytes,
                    available: budget.saturating_sub(allocated),
                }
            })
    }

    pub(crate) fn release(&self, bytes: u64) {
        self.allocated.fetch_sub(bytes, Ordering::AcqRel);
    }
}

// Ensure GraphicsDevice is Send + Sync
static_assertions::assert_impl_all!(GraphicsDevice: Send, Sync);
