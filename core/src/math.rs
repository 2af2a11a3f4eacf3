//! Math type aliases and helper functions.
//!
//! Rendering math is always f32 and comes from `glam`. Matrices uploaded to
//! constant buffers are stored transposed (row-major on the GPU side).

pub use glam;

/// 2D vector (f32).
pub type Vec2 = glam::Vec2;

/// 3D vector (f32).
pub type Vec3 = glam::Vec3;

/// 4D vector (f32).
pub type Vec4 = glam::Vec4;

/// 4x4 matrix (f32).
pub type Mat4 = glam::Mat4;

/// Convert spherical coordinates to a cartesian point, y up.
///
/// `theta` is the azimuth around the y axis and `phi` the polar angle
/// measured from +y.
pub fn spherical_to_cartesian(radius: f32, theta: f32, phi: f32) -> Vec3 {
    Vec3::new(
        radius * phi.sin() * theta.cos(),
        radius * phi.cos(),
        radius * phi.sin() * theta.sin(),
    )
}

/// Transpose `m` for upload into a row-major constant buffer.
#[inline]
pub fn to_gpu_matrix(m: Mat4) -> Mat4 {
    m.transpose()
}

/// Height of the rolling hills used by the land grid in the samples.
pub fn hills_height(x: f32, z: f32) -> f32 {
    0.3 * (z * (0.1 * x).sin() + x * (0.1 * z).cos())
}

/// Analytic unit normal of [`hills_height`] at `(x, z)`.
pub fn hills_normal(x: f32, z: f32) -> Vec3 {
    let n = Vec3::new(
        -0.03 * z * (0.1 * x).cos() - 0.3 * (0.1 * z).cos(),
        1.0,
        -0.3 * (0.1 * x).sin() + 0.03 * x * (0.1 * z).sin(),
    );
    n.normalize()
}
