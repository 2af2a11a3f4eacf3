//! Common types and descriptors for graphics resources.
//!
//! This module contains usage flags, buffer descriptors, and the
//! `#[repr(C)]` constant layouts shared with shaders.

mod buffer;
mod constants;

pub use buffer::{BufferDescriptor, BufferId, BufferUsage};
pub use constants::{
    Light, MAX_LIGHTS, MaterialConstants, ObjectConstants, PassConstants, constant_buffer_size,
};
