//! Render items.

use glam::Mat4;

use super::Handle;
use super::geometry::{Material, MeshGeometry, SubmeshGeometry};
use crate::pipeline::DirtyCountdown;
use crate::types::ObjectConstants;

/// Where a render item's vertices come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VertexSource {
    /// The geometry's static vertex buffer.
    #[default]
    Static,
    /// The current frame slot's dynamic vertex buffer.
    FrameDynamic,
}

/// Draw-order bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum RenderLayer {
    #[default]
    Opaque,
    Transparent,
}

/// Parameters for a new render item.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderItemDesc {
    pub world: Mat4,
    pub tex_transform: Mat4,
    pub geometry: Handle<MeshGeometry>,
    pub material: Handle<Material>,
    pub submesh: SubmeshGeometry,
    pub vertex_source: VertexSource,
    pub layer: RenderLayer,
}

impl RenderItemDesc {
    /// Item drawing `submesh` of `geometry` with `material` at the origin.
    pub fn new(
        geometry: Handle<MeshGeometry>,
        material: Handle<Material>,
        submesh: SubmeshGeometry,
    ) -> Self {
        Self {
            world: Mat4::IDENTITY,
            tex_transform: Mat4::IDENTITY,
            geometry,
            material,
            submesh,
            vertex_source: VertexSource::Static,
            layer: RenderLayer::Opaque,
        }
    }

    pub fn with_world(mut self, world: Mat4) -> Self {
        self.world = world;
        self
    }

    pub fn with_tex_transform(mut self, tex_transform: Mat4) -> Self {
        self.tex_transform = tex_transform;
        self
    }

    pub fn with_vertex_source(mut self, vertex_source: VertexSource) -> Self {
        self.vertex_source = vertex_source;
        self
    }

    pub fn with_layer(mut self, layer: RenderLayer) -> Self {
        self.layer = layer;
        self
    }
}

/// A drawable instance and its slot in the per-frame object constant buffer.
#[derive(Debug, Clone)]
pub struct RenderItem {
    pub desc: RenderItemDesc,
    obj_cb_index: usize,
    pub(crate) dirty: DirtyCountdown,
}

impl RenderItem {
    pub(crate) fn new(desc: RenderItemDesc, obj_cb_index: usize, frame_count: usize) -> Self {
        Self {
            desc,
            obj_cb_index,
            dirty: DirtyCountdown::new(frame_count),
        }
    }

    /// Element index in the object constant buffer.
    pub fn obj_cb_index(&self) -> usize {
        self.obj_cb_index
    }

    /// Slots still holding stale constants.
    pub fn dirty(&self) -> DirtyCountdown {
        self.dirty
    }

    /// Constants as laid out for shaders.
    pub fn constants(&self, material_index: u32) -> ObjectConstants {
        ObjectConstants {
            world: ripple_core::math::to_gpu_matrix(self.desc.world),
            tex_transform: ripple_core::math::to_gpu_matrix(self.desc.tex_transform),
            material_index,
            _pad: [0; 3],
        }
    }
}
