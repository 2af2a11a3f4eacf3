//! Scene registry: geometry, materials and render items.
//!
//! A [`SceneRegistry`] is built once at startup. Every entity gets a unique
//! name and a typed [`Handle`]; cross references (an item's geometry and
//! material) are handles, never names. Materials and render items each own an
//! element of the per-frame constant buffers and a [`DirtyCountdown`]
//! tracking how many frame slots still hold a stale copy.
//!
//! # Refresh
//!
//! [`refresh_object_constants`](SceneRegistry::refresh_object_constants) and
//! [`refresh_material_constants`](SceneRegistry::refresh_material_constants)
//! are called once per frame with the slot the scheduler has made current.
//! They write every entity whose countdown is non-zero into that slot and
//! decrement the countdown by one, so a change reaches all N slots over the
//! next N frames.

mod geometry;
mod item;
mod registry;

pub use geometry::{Material, MaterialDesc, MeshGeometry, SubmeshGeometry};
pub use item::{RenderItem, RenderItemDesc, RenderLayer, VertexSource};
pub use registry::{Handle, Registry};

use crate::command::CommandList;
use crate::error::GraphicsError;
use crate::pipeline::FrameResource;

/// All entities of one scene.
#[derive(Debug)]
pub struct SceneRegistry {
    frame_count: usize,
    geometries: Registry<MeshGeometry>,
    materials: Registry<Material>,
    items: Registry<RenderItem>,
}

impl SceneRegistry {
    /// Create an empty scene for a ring of `frame_count` slots.
    pub fn new(frame_count: usize) -> Self {
        Self {
            frame_count,
            geometries: Registry::new(),
            materials: Registry::new(),
            items: Registry::new(),
        }
    }

    /// Number of frame slots new entities are dirty in.
    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    /// Registered mesh geometry.
    pub fn geometries(&self) -> &Registry<MeshGeometry> {
        &self.geometries
    }

    /// Registered materials.
    pub fn materials(&self) -> &Registry<Material> {
        &self.materials
    }

    /// Registered render items.
    pub fn items(&self) -> &Registry<RenderItem> {
        &self.items
    }

    /// Add mesh geometry under `name`.
    pub fn add_geometry(
        &mut self,
        name: impl Into<String>,
        geometry: MeshGeometry,
    ) -> Result<Handle<MeshGeometry>, GraphicsError> {
        self.geometries.insert(name, geometry)
    }

    /// Add a material. Its constant-buffer index is its insertion order.
    pub fn add_material(
        &mut self,
        name: impl Into<String>,
        desc: MaterialDesc,
    ) -> Result<Handle<Material>, GraphicsError> {
        let cb_index = self.materials.len();
        self.materials
            .insert(name, Material::new(desc, cb_index, self.frame_count))
    }

    /// Add a render item. Its constant-buffer index is its insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`GraphicsError::InvalidParameter`] if the geometry or
    /// material handle is not registered.
    pub fn add_render_item(
        &mut self,
        name: impl Into<String>,
        desc: RenderItemDesc,
    ) -> Result<Handle<RenderItem>, GraphicsError> {
        if self.geometries.get(desc.geometry).is_none() {
            return Err(GraphicsError::InvalidParameter(format!(
                "unknown geometry {:?}",
                desc.geometry
            )));
        }
        if self.materials.get(desc.material).is_none() {
            return Err(GraphicsError::InvalidParameter(format!(
                "unknown material {:?}",
                desc.material
            )));
        }
        let cb_index = self.items.len();
        self.items
            .insert(name, RenderItem::new(desc, cb_index, self.frame_count))
    }

    /// Mutate a material and mark it dirty in every slot.
    pub fn update_material(
        &mut self,
        handle: Handle<Material>,
        f: impl FnOnce(&mut MaterialDesc),
    ) -> Result<(), GraphicsError> {
        let material = self.materials.get_mut(handle).ok_or_else(|| {
            GraphicsError::InvalidParameter(format!("unknown material {handle:?}"))
        })?;
        f(&mut material.desc);
        material.dirty.mark_dirty();
        Ok(())
    }

    /// Mutate a render item and mark it dirty in every slot.
    pub fn update_item(
        &mut self,
        handle: Handle<RenderItem>,
        f: impl FnOnce(&mut RenderItemDesc),
    ) -> Result<(), GraphicsError> {
        let item = self.items.get_mut(handle).ok_or_else(|| {
            GraphicsError::InvalidParameter(format!("unknown render item {handle:?}"))
        })?;
        f(&mut item.desc);
        item.dirty.mark_dirty();
        Ok(())
    }

    /// Write dirty render items into `frame`'s object constants.
    ///
    /// Returns the number of items written.
    pub fn refresh_object_constants(
        &mut self,
        frame: &mut FrameResource,
    ) -> Result<usize, GraphicsError> {
        let mut written = 0;
        for (_, item) in self.items.iter_mut() {
            if !item.dirty.is_dirty() {
                continue;
            }
            let material_index = self
                .materials
                .get(item.desc.material)
                .map_or(0, |material| material.cb_index() as u32);
            frame
                .object_constants
                .copy_data(item.obj_cb_index(), &item.constants(material_index))?;
            item.dirty.consume();
            written += 1;
        }
        Ok(written)
    }

    /// Write dirty materials into `frame`'s material constants.
    ///
    /// Returns the number of materials written.
    pub fn refresh_material_constants(
        &mut self,
        frame: &mut FrameResource,
    ) -> Result<usize, GraphicsError> {
        let mut written = 0;
        for (_, material) in self.materials.iter_mut() {
            if !material.dirty.is_dirty() {
                continue;
            }
            frame
                .material_constants
                .copy_data(material.cb_index(), &material.constants())?;
            material.dirty.consume();
            written += 1;
        }
        Ok(written)
    }

    /// Record draws for every item in `layer`, in handle order.
    ///
    /// Returns the number of draws recorded.
    pub fn record_layer(
        &self,
        layer: RenderLayer,
        frame: &FrameResource,
        list: &mut CommandList,
    ) -> Result<usize, GraphicsError> {
        let mut draws = 0;
        for (handle, item) in self.items.iter() {
            if item.desc.layer != layer {
                continue;
            }

            let geometry = self.geometries.get(item.desc.geometry).ok_or_else(|| {
                GraphicsError::Internal(format!("render item {handle:?} lost its geometry"))
            })?;
            let material = self.materials.get(item.desc.material).ok_or_else(|| {
                GraphicsError::Internal(format!("render item {handle:?} lost its material"))
            })?;

            let vertex_buffer = match item.desc.vertex_source {
                VertexSource::Static => geometry.vertex_buffer(),
                VertexSource::FrameDynamic => {
                    frame.dynamic_vertices.as_ref().map(|vertices| vertices.id())
                }
            }
            .ok_or_else(|| {
                GraphicsError::InvalidParameter(format!(
                    "render item {:?} has no {:?} vertex buffer",
                    self.items.name(handle),
                    item.desc.vertex_source
                ))
            })?;

            list.set_vertex_buffer(vertex_buffer, geometry.vertex_stride())?;
            list.set_index_buffer(geometry.index_buffer())?;
            list.set_object_constants(
                frame.object_constants.id(),
                frame.object_constants.offset_of(item.obj_cb_index()),
            )?;
            list.set_material_constants(
                frame.material_constants.id(),
                frame.material_constants.offset_of(material.cb_index()),
            )?;
            list.draw_indexed(
                item.desc.submesh.index_count,
                item.desc.submesh.start_index,
                item.desc.submesh.base_vertex,
            )?;
            draws += 1;
        }
        Ok(draws)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use glam::{Mat4, Vec3};
    use ripple_core::mesh::create_grid;

    use super::*;
    use crate::command::{Command, CommandAllocator};
    use crate::device::{DeviceCapabilities, GraphicsDevice};
    use crate::pipeline::{FrameResourceDesc, FrameRing};

    struct Fixture {
        ring: FrameRing,
        scene: SceneRegistry,
        land: Handle<RenderItem>,
        grass: Handle<Material>,
    }

    fn fixture() -> Fixture {
        let device: Arc<GraphicsDevice> = GraphicsDevice::new(DeviceCapabilities::default());
        let ring = FrameRing::new(
            &device,
            3,
            &FrameResourceDesc {
                max_objects: 2,
                max_materials: 2,
                max_dynamic_vertices: 4,
                ..Default::default()
            },
        )
        .unwrap();

        let mut scene = SceneRegistry::new(3);
        let mesh = create_grid(4.0, 4.0, 3, 3);
        let land_geo = MeshGeometry::from_mesh(&device, "land", "grid", &mesh).unwrap();
        let submesh = *land_geo.submesh("grid").unwrap();
        let land_geo = scene.add_geometry("land", land_geo).unwrap();
        let water_geo = MeshGeometry::dynamic(&device, "water", 4, "grid", &[0, 1, 2, 2, 1, 3]).unwrap();
        let water_sub = *water_geo.submesh("grid").unwrap();
        let water_geo = scene.add_geometry("water", water_geo).unwrap();

        let grass = scene.add_material("grass", MaterialDesc::default()).unwrap();
        let water = scene.add_material("water", MaterialDesc::default()).unwrap();

        let land = scene
            .add_render_item("land", RenderItemDesc::new(land_geo, grass, submesh))
            .unwrap();
        scene
            .add_render_item(
                "water",
                RenderItemDesc::new(water_geo, water, water_sub)
                    .with_vertex_source(VertexSource::FrameDynamic)
                    .with_layer(RenderLayer::Transparent),
            )
            .unwrap();

        Fixture {
            ring,
            scene,
            land,
            grass,
        }
    }

    #[test]
    fn test_refresh_counts_down_once_per_frame() {
        let mut f = fixture();
        let mut writes = Vec::new();
        for _ in 0..4 {
            f.ring.advance();
            writes.push(f.scene.refresh_object_constants(f.ring.current_mut()).unwrap());
        }
        assert_eq!(writes, vec![2, 2, 2, 0]);
    }

    #[test]
    fn test_mutation_reaches_every_slot() {
        let mut f = fixture();
        for _ in 0..3 {
            f.ring.advance();
            f.scene.refresh_object_constants(f.ring.current_mut()).unwrap();
        }

        let world = Mat4::from_translation(Vec3::new(0.0, 5.0, 0.0));
        f.scene.update_item(f.land, |desc| desc.world = world).unwrap();
        assert_eq!(f.scene.items().get(f.land).unwrap().dirty().remaining(), 3);

        for _ in 0..3 {
            f.ring.advance();
            f.scene.refresh_object_constants(f.ring.current_mut()).unwrap();
        }
        for slot in f.ring.iter() {
            let constants = slot.object_constants.read(0).unwrap();
            assert_eq!(constants.world, world.transpose());
        }
        assert!(!f.scene.items().get(f.land).unwrap().dirty().is_dirty());
    }

    #[test]
    fn test_material_refresh() {
        let mut f = fixture();
        f.ring.advance();
        assert_eq!(f.scene.refresh_material_constants(f.ring.current_mut()).unwrap(), 2);

        f.scene.update_material(f.grass, |desc| desc.roughness = 0.9).unwrap();
        f.ring.advance();
        assert_eq!(f.scene.refresh_material_constants(f.ring.current_mut()).unwrap(), 2);
        f.ring.advance();
        assert_eq!(f.scene.refresh_material_constants(f.ring.current_mut()).unwrap(), 2);
        f.ring.advance();
        assert_eq!(f.scene.refresh_material_constants(f.ring.current_mut()).unwrap(), 1);
        f.ring.advance();
        assert_eq!(f.scene.refresh_material_constants(f.ring.current_mut()).unwrap(), 0);
    }

    #[test]
    fn test_record_layers() {
        let f = fixture();
        let mut list = CommandList::new();
        list.reset(&CommandAllocator::new(0));

        let frame = f.ring.current();
        assert_eq!(f.scene.record_layer(RenderLayer::Opaque, frame, &mut list).unwrap(), 1);
        assert_eq!(
            f.scene
                .record_layer(RenderLayer::Transparent, frame, &mut list)
                .unwrap(),
            1
        );

        let dynamic_id = frame.dynamic_vertices.as_ref().unwrap().id();
        assert!(list.commands().contains(&Command::SetVertexBuffer {
            buffer: dynamic_id,
            stride: 32
        }));
        assert!(list.commands().contains(&Command::SetMaterialConstants {
            buffer: frame.material_constants.id(),
            offset: 256
        }));
        assert_eq!(list.draw_count(), 2);
    }

    #[test]
    fn test_unknown_handles_rejected() {
        let mut f = fixture();
        let mut other = SceneRegistry::new(3);
        let material = other.add_material("a", MaterialDesc::default()).unwrap();
        other.add_material("b", MaterialDesc::default()).unwrap();
        let stray = other.add_material("c", MaterialDesc::default()).unwrap();
        assert_eq!(material.index(), 0);
        assert!(f.scene.update_material(stray, |_| {}).is_err());
    }
}
