//! GPU resource types.
//!
//! Resources are created through [`GraphicsDevice`](crate::device::GraphicsDevice)
//! and return their memory to the device's budget when dropped.

mod buffer;
mod upload_buffer;

pub use buffer::Buffer;
pub use upload_buffer::UploadBuffer;
