//! Shader constant layouts.
//!
//! These structs are copied byte-for-byte into upload buffers, so they are
//! `#[repr(C)]` and [`bytemuck::Pod`]. Matrices are stored transposed (see
//! [`ripple_core::math::to_gpu_matrix`]) to match column-vector shaders
//! reading row-major data.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec2, Vec3, Vec4};

/// Number of light slots in [`PassConstants`].
pub const MAX_LIGHTS: usize = 16;

/// Constant buffer element alignment in bytes.
pub(crate) const CONSTANT_BUFFER_ALIGNMENT: u64 = 256;

/// Size of one constant-buffer element holding `byte_size` bytes.
///
/// Constant buffer views address memory in 256-byte units, so every element
/// is rounded up to the next multiple of 256.
pub const fn constant_buffer_size(byte_size: u64) -> u64 {
    (byte_size + CONSTANT_BUFFER_ALIGNMENT - 1) & !(CONSTANT_BUFFER_ALIGNMENT - 1)
}

/// A light source. Directional, point and spot lights share this layout and
/// ignore the fields they do not use.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Light {
    pub strength: Vec3,
    /// Point/spot only.
    pub falloff_start: f32,
    /// Directional/spot only.
    pub direction: Vec3,
    /// Point/spot only.
    pub falloff_end: f32,
    /// Point/spot only.
    pub position: Vec3,
    /// Spot only.
    pub spot_power: f32,
}

impl Default for Light {
    fn default() -> Self {
        Self {
            strength: Vec3::splat(0.5),
            falloff_start: 1.0,
            direction: Vec3::new(0.0, -1.0, 0.0),
            falloff_end: 10.0,
            position: Vec3::ZERO,
            spot_power: 64.0,
        }
    }
}

/// Per-object constants.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct ObjectConstants {
    pub world: Mat4,
    pub tex_transform: Mat4,
    pub material_index: u32,
    pub _pad: [u32; 3],
}

impl Default for ObjectConstants {
    fn default() -> Self {
        Self {
            world: Mat4::IDENTITY,
            tex_transform: Mat4::IDENTITY,
            material_index: 0,
            _pad: [0; 3],
        }
    }
}

/// Per-material constants.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct MaterialConstants {
    pub diffuse_albedo: Vec4,
    pub fresnel_r0: Vec3,
    pub roughness: f32,
    pub mat_transform: Mat4,
    pub diffuse_map_index: u32,
    pub _pad: [u32; 3],
}

impl Default for MaterialConstants {
    fn default() -> Self {
        Self {
            diffuse_albedo: Vec4::ONE,
            fresnel_r0: Vec3::splat(0.01),
            roughness: 0.25,
            mat_transform: Mat4::IDENTITY,
            diffuse_map_index: 0,
            _pad: [0; 3],
        }
    }
}

/// Per-pass constants: camera, timing and lights.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct PassConstants {
    pub view: Mat4,
    pub inv_view: Mat4,
    pub proj: Mat4,
    pub inv_proj: Mat4,
    pub view_proj: Mat4,
    pub inv_view_proj: Mat4,
    pub eye_pos_w: Vec3,
    pub _pad0: f32,
    pub render_target_size: Vec2,
    pub inv_render_target_size: Vec2,
    pub near_z: f32,
    pub far_z: f32,
    pub total_time: f32,
    pub delta_time: f32,
    pub ambient_light: Vec4,
    pub lights: [Light; MAX_LIGHTS],
}

impl Default for PassConstants {
    fn default() -> Self {
        Self {
            view: Mat4::IDENTITY,
            inv_view: Mat4::IDENTITY,
            proj: Mat4::IDENTITY,
            inv_proj: Mat4::IDENTITY,
            view_proj: Mat4::IDENTITY,
            inv_view_proj: Mat4::IDENTITY,
            eye_pos_w: Vec3::ZERO,
            _pad0: 0.0,
            render_target_size: Vec2::ZERO,
            inv_render_target_size: Vec2::ZERO,
            near_z: 0.0,
            far_z: 0.0,
            total_time: 0.0,
            delta_time: 0.0,
            ambient_light: Vec4::new(0.0, 0.0, 0.0, 1.0),
            lights: [Light::default(); MAX_LIGHTS],
        }
    }
}

static_assertions::const_assert_eq!(std::mem::size_of::<Light>(), 48);
static_assertions::const_assert_eq!(std::mem::size_of::<ObjectConstants>(), 144);
static_assertions::const_assert_eq!(std::mem::size_of::<MaterialConstants>(), 112);
static_assertions::const_assert_eq!(std::mem::size_of::<PassConstants>(), 1216);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_buffer_size_rounds_to_256() {
        assert_eq!(constant_buffer_size(1), 256);
        assert_eq!(constant_buffer_size(144), 256);
        assert_eq!(constant_buffer_size(256), 256);
        assert_eq!(constant_buffer_size(1216), 1280);
    }

    #[test]
    fn test_pass_constants_bytes() {
        let pass = PassConstants::default();
        let bytes = bytemuck::bytes_of(&pass);
        assert_eq!(bytes.len(), 1216);
    }

    #[test]
    fn test_object_constants_default_identity() {
        let object = ObjectConstants::default();
        assert_eq!(object.world, Mat4::IDENTITY);
        assert_eq!(object.material_index, 0);
    }
}
