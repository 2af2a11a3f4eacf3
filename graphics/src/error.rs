//! Graphics error types.

/// Errors that can occur in the graphics system.
///
/// Every variant except [`IndexOutOfRange`](Self::IndexOutOfRange) and
/// [`DuplicateName`](Self::DuplicateName) is fatal to the frame loop: the
/// scheduler never retries, it hands the error back to the caller.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphicsError {
    /// Out of GPU memory.
    #[error("out of GPU memory: requested {requested} bytes, {available} available")]
    OutOfMemory { requested: u64, available: u64 },
    /// An invalid parameter was provided.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    /// An element index past the end of a buffer.
    #[error("index {index} out of range for buffer with {len} elements")]
    IndexOutOfRange { index: usize, len: usize },
    /// A fence did not reach the awaited value in time.
    #[error("timed out waiting for fence value {value} (completed {completed})")]
    FenceTimeout { value: u64, completed: u64 },
    /// A command allocator was reset while the GPU may still read from it.
    #[error("command allocator {allocator} still in use: submitted at {submitted}, completed {completed}")]
    AllocatorInUse {
        allocator: u64,
        submitted: u64,
        completed: u64,
    },
    /// A command was recorded into a closed command list.
    #[error("command list is closed")]
    CommandListClosed,
    /// An open command list was submitted for execution.
    #[error("command list must be closed before execution")]
    CommandListNotClosed,
    /// A scene entity name was registered twice.
    #[error("duplicate name: {0}")]
    DuplicateName(String),
    /// The GPU device was lost.
    #[error("GPU device lost")]
    DeviceLost,
    /// An internal error occurred.
    #[error("internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = GraphicsError::DeviceLost;
        assert_eq!(err.to_string(), "GPU device lost");

        let err = GraphicsError::FenceTimeout {
            value: 7,
            completed: 5,
        };
        assert_eq!(
            err.to_string(),
            "timed out waiting for fence value 7 (completed 5)"
        );
    }

    #[test]
    fn test_out_of_memory_display() {
        let err = GraphicsError::OutOfMemory {
            requested: 512,
            available: 256,
        };
        assert!(err.to_string().contains("512"));
    }
}
