//! CPU-side mesh types and generators.
//!
//! - [`Vertex`] - Position, normal and texture coordinate, GPU layout
//! - [`MeshData`] - CPU-side vertex and index lists
//! - [`generators`] - Grid generation and grid triangulation

mod data;
pub mod generators;

pub use data::{MeshData, Vertex};
pub use generators::{create_grid, grid_indices};
