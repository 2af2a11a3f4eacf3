//! CPU-writable upload buffers.
//!
//! An [`UploadBuffer`] is a persistently mapped array of `T` elements. The
//! CPU writes elements with [`copy_data`](UploadBuffer::copy_data) while the
//! GPU reads them from the same memory, so callers must not write an element
//! the GPU may still be reading. Frame slots guarantee this by only touching
//! their own buffers after the slot's fence value has been reached.
//!
//! # Alignment
//!
//! Constant buffers place elements at 256-byte boundaries; this matches the
//! minimum constant buffer view granularity. Structured and vertex upload
//! buffers pack elements at `size_of::<T>()`.

use std::marker::PhantomData;

use bytemuck::Pod;

use super::Buffer;
use crate::error::GraphicsError;
use crate::types::{BufferId, constant_buffer_size};

/// A mapped buffer of `len` elements of `T`.
pub struct UploadBuffer<T: Pod> {
    buffer: Buffer,
    /// Mapped contents, `len * stride` bytes.
    mapped: Vec<u8>,
    len: usize,
    stride: u64,
    _marker: PhantomData<T>,
}

impl<T: Pod> UploadBuffer<T> {
    pub(crate) fn new(buffer: Buffer, len: usize, stride: u64) -> Self {
        Self {
            mapped: vec![0; buffer.size() as usize],
            buffer,
            len,
            stride,
            _marker: PhantomData,
        }
    }

    /// Element stride for a buffer of `T`.
    pub(crate) fn stride(is_constant_buffer: bool) -> u64 {
        let size = std::mem::size_of::<T>() as u64;
        if is_constant_buffer {
            constant_buffer_size(size)
        } else {
            size
        }
    }

    /// Id of the underlying GPU buffer.
    pub fn id(&self) -> BufferId {
        self.buffer.id()
    }

    /// Underlying GPU buffer.
    pub fn buffer(&self) -> &Buffer {
        &self.buffer
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the buffer has no elements.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Byte distance between consecutive elements.
    pub fn element_byte_size(&self) -> u64 {
        self.stride
    }

    /// Total size in bytes.
    pub fn byte_size(&self) -> u64 {
        self.buffer.size()
    }

    /// Byte offset of element `index`, as bound by commands.
    pub fn offset_of(&self, index: usize) -> u64 {
        index as u64 * self.stride
    }

    /// Write `value` into element `index`.
    ///
    /// # Errors
    ///
    /// Returns [`GraphicsError::IndexOutOfRange`] if `index >= len`.
    pub fn copy_data(&mut self, index: usize, value: &T) -> Result<(), GraphicsError> {
        let range = self.element_range(index)?;
        self.mapped[range].copy_from_slice(bytemuck::bytes_of(value));
        Ok(())
    }

    /// Read back element `index` as last written.
    ///
    /// # Errors
    ///
    /// Returns [`GraphicsError::IndexOutOfRange`] if `index >= len`.
    pub fn read(&self, index: usize) -> Result<T, GraphicsError> {
        let range = self.element_range(index)?;
        Ok(bytemuck::pod_read_unaligned(&self.mapped[range]))
    }

    fn element_range(&self, index: usize) -> Result<std::ops::Range<usize>, GraphicsError> {
        if index >= self.len {
            return Err(GraphicsError::IndexOutOfRange {
                index,
                len: self.len,
            });
        }
        let start = self.offset_of(index) as usize;
        Ok(start..start + std::mem::size_of::<T>())
    }
}

impl<T: Pod> std::fmt::Debug for UploadBuffer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadBuffer")
            .field("id", &self.buffer.id())
            .field("len", &self.len)
            .field("stride", &self.stride)
            .finish()
    }
}
