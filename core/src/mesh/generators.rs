//! Mesh generators.
//!
//! Grids are laid out row-major in the xz-plane, centered on the origin, with
//! row 0 at `+depth/2` and column 0 at `-width/2`. The same vertex order is
//! used by [`Waves`](crate::waves::Waves), so [`grid_indices`] triangulates
//! both.

use super::data::{MeshData, Vertex};
use crate::math::{Vec2, Vec3};

/// Generate a flat `rows x columns` vertex grid of size `width x depth`.
///
/// Normals point up. Texture coordinates span `[0, 1]` across the grid.
///
/// # Panics
///
/// Panics if `rows` or `columns` is less than 2.
pub fn create_grid(width: f32, depth: f32, rows: u32, columns: u32) -> MeshData {
    assert!(rows >= 2 && columns >= 2, "grid needs at least 2x2 vertices");

    let half_width = 0.5 * width;
    let half_depth = 0.5 * depth;
    let dx = width / (columns - 1) as f32;
    let dz = depth / (rows - 1) as f32;
    let du = 1.0 / (columns - 1) as f32;
    let dv = 1.0 / (rows - 1) as f32;

    let mut vertices = Vec::with_capacity((rows * columns) as usize);
    for i in 0..rows {
        let z = half_depth - i as f32 * dz;
        for j in 0..columns {
            let x = -half_width + j as f32 * dx;
            vertices.push(Vertex::new(
                Vec3::new(x, 0.0, z),
                Vec3::Y,
                Vec2::new(j as f32 * du, i as f32 * dv),
            ));
        }
    }

    MeshData {
        vertices,
        indices: grid_indices(rows, columns),
    }
}

/// Triangle-list indices for a row-major `rows x columns` vertex grid.
///
/// Each quad emits two triangles with clockwise winding when viewed from +y.
pub fn grid_indices(rows: u32, columns: u32) -> Vec<u32> {
    if rows < 2 || columns < 2 {
        return Vec::new();
    }

    let quads = ((rows - 1) * (columns - 1)) as usize;
    let mut indices = Vec::with_capacity(quads * 6);

    for i in 0..rows - 1 {
        for j in 0..columns - 1 {
            let current = i * columns + j;
            let below = current + columns;

            indices.push(current);
            indices.push(current + 1);
            indices.push(below);

            indices.push(below);
            indices.push(current + 1);
            indices.push(below + 1);
        }
    }

    indices
}
