//! Land and waves scene.
//!
//! A static hilly land grid plus a water surface whose vertices are rebuilt
//! every frame from a [`Waves`] simulation and written into the current frame
//! slot's dynamic vertex buffer. The water material's texture transform
//! scrolls over time, so its constants go dirty every frame.

use std::f32::consts::PI;
use std::sync::Arc;

use glam::{Mat4, Vec2, Vec3, Vec4};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use ripple_core::Waves;
use ripple_core::math::{hills_height, hills_normal, spherical_to_cartesian, to_gpu_matrix};
use ripple_core::mesh::{MeshData, Vertex, create_grid};
use ripple_core::time::FrameTime;
use ripple_graphics::{
    CommandList, FrameResource, FrameResourceDesc, FrameScene, GraphicsDevice, GraphicsError,
    Handle, Light, Material, MaterialDesc, MeshGeometry, PassConstants, RenderItem,
    RenderItemDesc, RenderLayer, SceneRegistry, SubmeshGeometry, VertexSource,
};

const LAND_SIZE: f32 = 160.0;
const LAND_GRID: u32 = 50;

/// Seconds between random disturbances.
const DISTURB_INTERVAL: f32 = 0.25;

const RENDER_TARGET_SIZE: Vec2 = Vec2::new(1280.0, 720.0);
const NEAR_Z: f32 = 1.0;
const FAR_Z: f32 = 1000.0;

/// Camera orbiting the origin on a sphere, y up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitCamera {
    pub radius: f32,
    /// Azimuth around +y in radians.
    pub theta: f32,
    /// Polar angle from +y in radians.
    pub phi: f32,
    /// Azimuth change per second.
    pub orbit_speed: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self {
            radius: 50.0,
            theta: 1.5 * PI,
            phi: 0.2 * PI,
            orbit_speed: 0.1,
        }
    }
}

impl OrbitCamera {
    /// World-space eye position.
    pub fn eye(&self) -> Vec3 {
        spherical_to_cartesian(self.radius, self.theta, self.phi)
    }

    /// Left-handed view matrix looking at the origin.
    pub fn view(&self) -> Mat4 {
        Mat4::look_at_lh(self.eye(), Vec3::ZERO, Vec3::Y)
    }

    pub fn advance(&mut self, dt: f32) {
        self.theta = (self.theta + self.orbit_speed * dt).rem_euclid(2.0 * PI);
    }
}

/// Running totals for the scene.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LandAndWavesStats {
    pub disturbances: u64,
    pub wave_steps: u64,
    pub water_uploads: u64,
}

/// The land and waves sample scene.
pub struct LandAndWaves {
    registry: SceneRegistry,
    waves: Waves,
    land: Handle<RenderItem>,
    water: Handle<RenderItem>,
    water_material: Handle<Material>,
    camera: OrbitCamera,
    rng: StdRng,
    /// Total time at which the last disturbance was due.
    disturb_base: f32,
    water_scroll: Vec2,
    stats: LandAndWavesStats,
}

impl LandAndWaves {
    /// Build the scene for a scheduler with `frame_count` slots.
    ///
    /// `seed` fixes the disturbance sequence; `None` seeds from entropy.
    pub fn new(
        device: &Arc<GraphicsDevice>,
        frame_count: usize,
        waves: Waves,
        seed: Option<u64>,
    ) -> Result<Self, GraphicsError> {
        let mut registry = SceneRegistry::new(frame_count);

        let land_mesh = land_mesh();
        let land_geometry = MeshGeometry::from_mesh(device, "land", "grid", &land_mesh)?;
        let land_submesh = submesh(&land_geometry, "grid")?;
        let land_geometry = registry.add_geometry("land", land_geometry)?;

        let water_geometry = MeshGeometry::dynamic(
            device,
            "water",
            waves.vertex_count(),
            "grid",
            &waves.indices(),
        )?;
        let water_submesh = submesh(&water_geometry, "grid")?;
        let water_geometry = registry.add_geometry("water", water_geometry)?;

        let grass = registry.add_material(
            "grass",
            MaterialDesc {
                diffuse_albedo: Vec4::new(0.2, 0.6, 0.2, 1.0),
                fresnel_r0: Vec3::splat(0.01),
                roughness: 0.125,
                ..Default::default()
            },
        )?;
        let water_material = registry.add_material(
            "water",
            MaterialDesc {
                diffuse_albedo: Vec4::new(0.0, 0.2, 0.6, 0.5),
                fresnel_r0: Vec3::splat(0.1),
                roughness: 0.0,
                ..Default::default()
            },
        )?;

        let tex_scale = Mat4::from_scale(Vec3::new(5.0, 5.0, 1.0));
        let land = registry.add_render_item(
            "land",
            RenderItemDesc::new(land_geometry, grass, land_submesh).with_tex_transform(tex_scale),
        )?;
        let water = registry.add_render_item(
            "water",
            RenderItemDesc::new(water_geometry, water_material, water_submesh)
                .with_tex_transform(tex_scale)
                .with_vertex_source(VertexSource::FrameDynamic)
                .with_layer(RenderLayer::Transparent),
        )?;

        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        log::info!(
            "LandAndWaves: {}x{} water grid ({} triangles), {} land vertices",
            waves.rows(),
            waves.columns(),
            waves.triangle_count(),
            land_mesh.vertex_count()
        );

        Ok(Self {
            registry,
            waves,
            land,
            water,
            water_material,
            camera: OrbitCamera::default(),
            rng,
            disturb_base: 0.0,
            water_scroll: Vec2::ZERO,
            stats: LandAndWavesStats::default(),
        })
    }

    /// Slot sizes this scene needs from the frame ring.
    pub fn frame_resource_desc(&self) -> FrameResourceDesc {
        FrameResourceDesc {
            pass_count: 1,
            max_objects: self.registry.items().len(),
            max_materials: self.registry.materials().len(),
            max_dynamic_vertices: self.waves.vertex_count(),
        }
    }

    pub fn registry(&self) -> &SceneRegistry {
        &self.registry
    }

    pub fn waves(&self) -> &Waves {
        &self.waves
    }

    pub fn land(&self) -> Handle<RenderItem> {
        self.land
    }

    pub fn water(&self) -> Handle<RenderItem> {
        self.water
    }

    pub fn camera(&self) -> &OrbitCamera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut OrbitCamera {
        &mut self.camera
    }

    pub fn stats(&self) -> LandAndWavesStats {
        self.stats
    }

    fn animate_water_material(&mut self, dt: f32) -> Result<(), GraphicsError> {
        if dt <= 0.0 {
            return Ok(());
        }

        let mut scroll = self.water_scroll + Vec2::new(0.1 * dt, 0.02 * dt);
        if scroll.x >= 1.0 {
            scroll.x -= 1.0;
        }
        if scroll.y >= 1.0 {
            scroll.y -= 1.0;
        }
        self.water_scroll = scroll;

        self.registry.update_material(self.water_material, |desc| {
            desc.mat_transform = Mat4::from_translation(scroll.extend(0.0));
        })
    }

    fn update_waves(&mut self, time: &FrameTime) -> Result<(), GraphicsError> {
        if time.total - self.disturb_base >= DISTURB_INTERVAL {
            self.disturb_base += DISTURB_INTERVAL;
            self.disturb_random()?;
        }

        if self.waves.update(time.delta) {
            self.stats.wave_steps += 1;
        }
        Ok(())
    }

    fn disturb_random(&mut self) -> Result<(), GraphicsError> {
        let (rows, columns) = (self.waves.rows(), self.waves.columns());
        // Too small to keep the disturbance clear of the boundary.
        if rows < 9 || columns < 9 {
            return Ok(());
        }

        let row = self.rng.gen_range(4..=rows - 5);
        let column = self.rng.gen_range(4..=columns - 5);
        let magnitude = self.rng.gen_range(0.2f32..0.5);
        self.waves
            .try_disturb(row, column, magnitude)
            .map_err(|e| GraphicsError::InvalidParameter(e.to_string()))?;

        self.stats.disturbances += 1;
        log::trace!(
            "LandAndWaves: disturb ({}, {}) by {:.3}",
            row,
            column,
            magnitude
        );
        Ok(())
    }

    fn upload_water(&mut self, frame: &mut FrameResource) -> Result<(), GraphicsError> {
        let Some(vertices) = frame.dynamic_vertices.as_mut() else {
            return Err(GraphicsError::InvalidParameter(format!(
                "frame slot {} has no dynamic vertex buffer",
                frame.index()
            )));
        };

        let (width, depth) = (self.waves.width(), self.waves.depth());
        for i in 0..self.waves.vertex_count() {
            let position = self.waves.position(i);
            let tex_c = Vec2::new(0.5 + position.x / width, 0.5 - position.z / depth);
            vertices.copy_data(i, &Vertex::new(position, self.waves.normal(i), tex_c))?;
        }

        self.stats.water_uploads += 1;
        Ok(())
    }

    fn pass_constants(&self, time: &FrameTime) -> PassConstants {
        let view = self.camera.view();
        let proj = Mat4::perspective_lh(
            0.25 * PI,
            RENDER_TARGET_SIZE.x / RENDER_TARGET_SIZE.y,
            NEAR_Z,
            FAR_Z,
        );
        let view_proj = proj * view;

        let mut lights = [Light::default(); ripple_graphics::types::MAX_LIGHTS];
        lights[0] = Light {
            direction: Vec3::new(0.57735, -0.57735, 0.57735),
            strength: Vec3::splat(0.9),
            ..Default::default()
        };
        lights[1] = Light {
            direction: Vec3::new(-0.57735, -0.57735, 0.57735),
            strength: Vec3::splat(0.5),
            ..Default::default()
        };
        lights[2] = Light {
            direction: Vec3::new(0.0, -0.707, -0.707),
            strength: Vec3::splat(0.2),
            ..Default::default()
        };

        PassConstants {
            view: to_gpu_matrix(view),
            inv_view: to_gpu_matrix(view.inverse()),
            proj: to_gpu_matrix(proj),
            inv_proj: to_gpu_matrix(proj.inverse()),
            view_proj: to_gpu_matrix(view_proj),
            inv_view_proj: to_gpu_matrix(view_proj.inverse()),
            eye_pos_w: self.camera.eye(),
            render_target_size: RENDER_TARGET_SIZE,
            inv_render_target_size: RENDER_TARGET_SIZE.recip(),
            near_z: NEAR_Z,
            far_z: FAR_Z,
            total_time: time.total,
            delta_time: time.delta,
            ambient_light: Vec4::new(0.25, 0.25, 0.35, 1.0),
            lights,
            ..Default::default()
        }
    }
}

impl FrameScene for LandAndWaves {
    fn refresh_dirty_state(
        &mut self,
        frame: &mut FrameResource,
        time: &FrameTime,
    ) -> Result<(), GraphicsError> {
        self.camera.advance(time.delta);
        self.animate_water_material(time.delta)?;
        self.update_waves(time)?;

        let objects = self.registry.refresh_object_constants(frame)?;
        let materials = self.registry.refresh_material_constants(frame)?;
        log::trace!(
            "LandAndWaves: slot {} refreshed {} objects, {} materials",
            frame.index(),
            objects,
            materials
        );

        frame.pass_constants.copy_data(0, &self.pass_constants(time))?;
        self.upload_water(frame)
    }

    fn record_draws(
        &self,
        frame: &FrameResource,
        list: &mut CommandList,
    ) -> Result<(), GraphicsError> {
        list.set_pass_constants(frame.pass_constants.id(), 0)?;
        self.registry.record_layer(RenderLayer::Opaque, frame, list)?;
        self.registry
            .record_layer(RenderLayer::Transparent, frame, list)?;
        Ok(())
    }
}

fn land_mesh() -> MeshData {
    let mut mesh = create_grid(LAND_SIZE, LAND_SIZE, LAND_GRID, LAND_GRID);
    for vertex in &mut mesh.vertices {
        let (x, z) = (vertex.position.x, vertex.position.z);
        vertex.position.y = hills_height(x, z);
        vertex.normal = hills_normal(x, z);
    }
    mesh
}

fn submesh(geometry: &MeshGeometry, name: &str) -> Result<SubmeshGeometry, GraphicsError> {
    geometry
        .submesh(name)
        .copied()
        .ok_or_else(|| GraphicsError::Internal(format!("missing submesh {name}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ripple_graphics::{
        BackendType, DeviceCapabilities, FrameScheduler, SchedulerConfig, create_queue,
    };

    fn scheduler_and_scene(seed: u64) -> (FrameScheduler, LandAndWaves) {
        let device = GraphicsDevice::new(DeviceCapabilities::default());
        let waves = Waves::new(16, 16, 1.0, 0.03, 4.0, 0.2).unwrap();
        let config = SchedulerConfig::default();
        let scene = LandAndWaves::new(&device, config.frame_count, waves, Some(seed)).unwrap();
        let queue = create_queue(BackendType::Dummy).unwrap();
        let scheduler =
            FrameScheduler::new(device, queue, config, scene.frame_resource_desc()).unwrap();
        (scheduler, scene)
    }

    fn run(scheduler: &mut FrameScheduler, scene: &mut LandAndWaves, frames: u64) {
        for frame in 0..frames {
            scheduler
                .render_frame(scene, &FrameTime::fixed(0.05, frame))
                .unwrap();
        }
    }

    #[test]
    fn test_frame_resource_desc() {
        let (_, scene) = scheduler_and_scene(1);
        let desc = scene.frame_resource_desc();
        assert_eq!(desc.max_objects, 2);
        assert_eq!(desc.max_materials, 2);
        assert_eq!(desc.max_dynamic_vertices, 256);
    }

    #[test]
    fn test_frames_draw_land_then_water() {
        let (mut scheduler, mut scene) = scheduler_and_scene(1);
        run(&mut scheduler, &mut scene, 4);
        assert_eq!(scheduler.last_command_list().draw_count(), 2);
    }

    #[test]
    fn test_water_vertices_follow_simulation() {
        let (mut scheduler, mut scene) = scheduler_and_scene(7);
        run(&mut scheduler, &mut scene, 20);

        let stats = scene.stats();
        assert!(stats.disturbances >= 3);
        assert_eq!(stats.wave_steps, scene.waves().step_count());
        assert_eq!(stats.water_uploads, 20);

        let vertices = scheduler.ring().current().dynamic_vertices.as_ref().unwrap();
        for i in [0, 17, 100, 255] {
            let vertex = vertices.read(i).unwrap();
            assert_eq!(vertex.position, scene.waves().position(i));
            assert_eq!(vertex.normal, scene.waves().normal(i));
        }
    }

    #[test]
    fn test_seed_fixes_disturbances() {
        let (mut scheduler_a, mut a) = scheduler_and_scene(42);
        let (mut scheduler_b, mut b) = scheduler_and_scene(42);
        run(&mut scheduler_a, &mut a, 12);
        run(&mut scheduler_b, &mut b, 12);

        for row in 0..16 {
            for column in 0..16 {
                assert_eq!(a.waves().height(row, column), b.waves().height(row, column));
            }
        }
    }

    #[test]
    fn test_water_material_scrolls() {
        let (mut scheduler, mut scene) = scheduler_and_scene(3);
        run(&mut scheduler, &mut scene, 5);

        let water = scene.registry().items().get(scene.water()).unwrap();
        let material = scene.registry().materials().get(water.desc.material).unwrap();
        let translation = material.desc.mat_transform.w_axis;
        assert!(translation.x > 0.0);
        assert!(translation.y > 0.0);
        // Scrolled this frame, so the remaining slots are still stale.
        assert!(material.dirty().is_dirty());
    }

    #[test]
    fn test_camera_orbits_at_radius() {
        let mut camera = OrbitCamera::default();
        let before = camera.eye();
        camera.advance(1.0);
        let after = camera.eye();
        assert!((before.length() - camera.radius).abs() < 1e-3);
        assert!((after.length() - camera.radius).abs() < 1e-3);
        assert!((before.y - after.y).abs() < 1e-4);
        assert!(before.distance(after) > 0.0);
    }

    #[test]
    fn test_land_follows_hills() {
        let mesh = land_mesh();
        let v = mesh.vertices[mesh.vertices.len() / 3];
        assert_eq!(v.position.y, hills_height(v.position.x, v.position.z));
    }
}
