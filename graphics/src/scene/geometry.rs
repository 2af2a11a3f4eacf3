//! Mesh geometry and materials.

use std::collections::HashMap;
use std::sync::Arc;

use glam::{Mat4, Vec3, Vec4};
use ripple_core::mesh::{MeshData, Vertex};

use crate::device::GraphicsDevice;
use crate::error::GraphicsError;
use crate::pipeline::DirtyCountdown;
use crate::resources::Buffer;
use crate::types::{BufferId, BufferUsage, MaterialConstants};

/// A range of a [`MeshGeometry`]'s index buffer drawn as one unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SubmeshGeometry {
    pub index_count: u32,
    pub start_index: u32,
    pub base_vertex: i32,
}

/// Vertex and index buffers shared by one or more submeshes.
///
/// Geometry whose vertices change every frame has no static vertex buffer;
/// its render items draw from the frame slot's dynamic vertex buffer instead.
#[derive(Debug)]
pub struct MeshGeometry {
    vertex_buffer: Option<Arc<Buffer>>,
    index_buffer: Arc<Buffer>,
    vertex_count: u32,
    submeshes: HashMap<String, SubmeshGeometry>,
}

impl MeshGeometry {
    /// Upload `mesh` into static vertex and index buffers with one submesh
    /// named `submesh` covering every index.
    pub fn from_mesh(
        device: &Arc<GraphicsDevice>,
        label: &str,
        submesh: &str,
        mesh: &MeshData,
    ) -> Result<Self, GraphicsError> {
        let vertex_buffer = device.create_static_buffer(
            &format!("{label}_vb"),
            BufferUsage::VERTEX,
            bytemuck::cast_slice(&mesh.vertices),
        )?;
        Self::with_indices(device, label, Some(vertex_buffer), mesh.vertex_count(), submesh, &mesh.indices)
    }

    /// Static index buffer only, for vertices supplied per frame.
    pub fn dynamic(
        device: &Arc<GraphicsDevice>,
        label: &str,
        vertex_count: usize,
        submesh: &str,
        indices: &[u32],
    ) -> Result<Self, GraphicsError> {
        Self::with_indices(device, label, None, vertex_count, submesh, indices)
    }

    fn with_indices(
        device: &Arc<GraphicsDevice>,
        label: &str,
        vertex_buffer: Option<Arc<Buffer>>,
        vertex_count: usize,
        submesh: &str,
        indices: &[u32],
    ) -> Result<Self, GraphicsError> {
        let index_buffer = device.create_static_buffer(
            &format!("{label}_ib"),
            BufferUsage::INDEX,
            bytemuck::cast_slice(indices),
        )?;
        let index_count = u32::try_from(indices.len()).map_err(|_| {
            GraphicsError::InvalidParameter(format!("{} indices exceed u32", indices.len()))
        })?;
        let vertex_count = u32::try_from(vertex_count).map_err(|_| {
            GraphicsError::InvalidParameter(format!("{vertex_count} vertices exceed u32"))
        })?;

        let mut submeshes = HashMap::new();
        submeshes.insert(
            submesh.to_string(),
            SubmeshGeometry {
                index_count,
                start_index: 0,
                base_vertex: 0,
            },
        );

        Ok(Self {
            vertex_buffer,
            index_buffer,
            vertex_count,
            submeshes,
        })
    }

    /// Static vertex buffer id, if the geometry has one.
    pub fn vertex_buffer(&self) -> Option<BufferId> {
        self.vertex_buffer.as_ref().map(|buffer| buffer.id())
    }

    pub fn index_buffer(&self) -> BufferId {
        self.index_buffer.id()
    }

    pub fn vertex_stride(&self) -> u32 {
        std::mem::size_of::<Vertex>() as u32
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    /// Add or replace a named submesh.
    pub fn insert_submesh(&mut self, name: impl Into<String>, submesh: SubmeshGeometry) {
        self.submeshes.insert(name.into(), submesh);
    }

    pub fn submesh(&self, name: &str) -> Option<&SubmeshGeometry> {
        self.submeshes.get(name)
    }
}

/// Surface parameters of a material.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaterialDesc {
    pub diffuse_albedo: Vec4,
    pub fresnel_r0: Vec3,
    pub roughness: f32,
    pub mat_transform: Mat4,
    pub diffuse_map_index: u32,
}

impl Default for MaterialDesc {
    fn default() -> Self {
        let defaults = MaterialConstants::default();
        Self {
            diffuse_albedo: defaults.diffuse_albedo,
            fresnel_r0: defaults.fresnel_r0,
            roughness: defaults.roughness,
            mat_transform: defaults.mat_transform,
            diffuse_map_index: defaults.diffuse_map_index,
        }
    }
}

/// A material and its slot in the per-frame material constant buffer.
#[derive(Debug, Clone)]
pub struct Material {
    pub desc: MaterialDesc,
    cb_index: usize,
    pub(crate) dirty: DirtyCountdown,
}

impl Material {
    pub(crate) fn new(desc: MaterialDesc, cb_index: usize, frame_count: usize) -> Self {
        Self {
            desc,
            cb_index,
            dirty: DirtyCountdown::new(frame_count),
        }
    }

    /// Element index in the material constant buffer.
    pub fn cb_index(&self) -> usize {
        self.cb_index
    }

    /// Slots still holding stale constants.
    pub fn dirty(&self) -> DirtyCountdown {
        self.dirty
    }

    /// Constants as laid out for shaders.
    pub fn constants(&self) -> MaterialConstants {
        MaterialConstants {
            diffuse_albedo: self.desc.diffuse_albedo,
            fresnel_r0: self.desc.fresnel_r0,
            roughness: self.desc.roughness,
            mat_transform: ripple_core::math::to_gpu_matrix(self.desc.mat_transform),
            diffuse_map_index: self.desc.diffuse_map_index,
            _pad: [0; 3],
        }
    }
}
