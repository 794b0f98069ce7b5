//! Small fixed-size linear algebra used by scene traversal and the GPU uniforms.
//!
//! Matrices are column-major so [`Matrix::as_slice`] matches the layout WGSL
//! expects for `mat4x4<f32>`.

pub mod mat;
pub mod ops;
pub mod transform;
pub mod vec;

pub use mat::{Mat3d, Mat3f, Mat4d, Mat4f, Matrix};
pub use ops::{cross, dot};
pub use transform::{
    deg_to_rad, infinite_perspective, ortho, perspective, quat_to_rotation, rad_to_deg, scale,
    translate,
};
pub use vec::{Vec2d, Vec2f, Vec3d, Vec3f, Vec4d, Vec4f, Vector};
