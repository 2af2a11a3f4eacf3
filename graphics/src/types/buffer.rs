//! Buffer types and descriptors.

use bitflags::bitflags;

bitflags! {
    /// Usage flags for buffers.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct BufferUsage: u32 {
        /// Buffer can be used as a vertex buffer.
        const VERTEX = 1 << 0;
        /// Buffer can be used as an index buffer.
        const INDEX = 1 << 1;
        /// Buffer holds constant-buffer elements, each padded to 256 bytes.
        const CONSTANT = 1 << 2;
        /// Buffer holds tightly packed structured elements.
        const STRUCTURED = 1 << 3;
        /// Buffer lives in CPU-visible upload memory.
        const UPLOAD = 1 << 4;
        /// Buffer can be copied to.
        const COPY_DST = 1 << 5;
    }
}

impl Default for BufferUsage {
    fn default() -> Self {
        Self::empty()
    }
}

/// Device-unique buffer identifier, referenced by recorded commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BufferId(pub(crate) u64);

impl BufferId {
    /// Raw id value.
    pub fn raw(self) -> u64 {
        self.0
    }
}

/// Descriptor for creating a buffer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct BufferDescriptor {
    /// Debug label for the buffer.
    pub label: Option<String>,
    /// Size in bytes.
    pub size: u64,
    /// Usage flags.
    pub usage: BufferUsage,
}

impl BufferDescriptor {
    /// Create a new buffer descriptor.
    pub fn new(size: u64, usage: BufferUsage) -> Self {
        Self {
            label: None,
            size,
            usage,
        }
    }

    /// Set the debug label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_usage_flags() {
        let usage = BufferUsage::CONSTANT | BufferUsage::UPLOAD;
        assert!(usage.contains(BufferUsage::CONSTANT));
        assert!(usage.contains(BufferUsage::UPLOAD));
        assert!(!usage.contains(BufferUsage::VERTEX));
    }

    #[test]
    fn test_buffer_descriptor() {
        let desc = BufferDescriptor::new(1024, BufferUsage::VERTEX).with_label("land_vb");
        assert_eq!(desc.size, 1024);
        assert_eq!(desc.label.as_deref(), Some("land_vb"));
    }
}
