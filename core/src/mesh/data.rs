//! CPU-side mesh data structures.

use crate::math::{Vec2, Vec3};

/// Vertex with position, normal and texture coordinate.
///
/// The struct is `#[repr(C)]` with no padding (32 bytes) so slices of it can
/// be copied straight into vertex buffers.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    /// Object-space position.
    pub position: Vec3,
    /// Unit surface normal.
    pub normal: Vec3,
    /// Texture coordinate.
    pub tex_c: Vec2,
}

impl Vertex {
    /// Create a new vertex.
    pub fn new(position: Vec3, normal: Vec3, tex_c: Vec2) -> Self {
        Self {
            position,
            normal,
            tex_c,
        }
    }
}

/// CPU-side mesh holding vertices and 32-bit triangle-list indices.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    /// Vertex data.
    pub vertices: Vec<Vertex>,
    /// Triangle-list indices into `vertices`.
    pub indices: Vec<u32>,
}

impl MeshData {
    /// Number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of indices.
    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    /// Number of triangles.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

static_assertions::const_assert_eq!(std::mem::size_of::<Vertex>(), 32);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_bytes() {
        let v = Vertex::new(Vec3::new(1.0, 2.0, 3.0), Vec3::Y, Vec2::new(0.5, 0.25));
        let bytes: &[u8] = bytemuck::bytes_of(&v);
        assert_eq!(bytes.len(), 32);
        let back: Vertex = bytemuck::pod_read_unaligned(bytes);
        assert_eq!(back, v);
    }

    #[test]
    fn test_mesh_counts() {
        let mesh = MeshData {
            vertices: vec![Vertex::default(); 4],
            indices: vec![0, 1, 2, 2, 1, 3],
        };
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.index_count(), 6);
        assert_eq!(mesh.triangle_count(), 2);
    }
}
