//! Homogeneous transform builders.
//!
//! All projections follow the OpenGL clip convention (z in `[-1, 1]`, camera
//! looking down `-z`). Field-of-view arguments are in **degrees**; convert glTF
//! radians with [`rad_to_deg`] first. Degenerate input (zero aspect, `znear ==
//! zfar`) yields non-finite entries rather than an error.

use cgmath::BaseFloat;

use super::mat::Matrix;

fn two<T: BaseFloat>() -> T {
    T::one() + T::one()
}

pub fn deg_to_rad<T: BaseFloat>(deg: T) -> T {
    deg.to_radians()
}

pub fn rad_to_deg<T: BaseFloat>(rad: T) -> T {
    rad.to_degrees()
}

/// Identity with the translation column set to `(dx, dy, dz)`.
pub fn translate<T: BaseFloat>(dx: T, dy: T, dz: T) -> Matrix<4, 4, T> {
    let mut mat = Matrix::identity();
    mat[(0, 3)] = dx;
    mat[(1, 3)] = dy;
    mat[(2, 3)] = dz;
    mat
}

pub fn scale<T: BaseFloat>(sx: T, sy: T, sz: T) -> Matrix<4, 4, T> {
    let mut mat = Matrix::identity();
    mat[(0, 0)] = sx;
    mat[(1, 1)] = sy;
    mat[(2, 2)] = sz;
    mat
}

/// Rotation matrix of the quaternion `(x, y, z, w)`.
///
/// The input is not normalized; a non-unit quaternion gives a
/// non-orthonormal upper 3x3 block. Row and column 3 are zero apart from
/// `(3, 3) = 1`.
pub fn quat_to_rotation<T: BaseFloat>(x: T, y: T, z: T, w: T) -> Matrix<4, 4, T> {
    let (one, two) = (T::one(), two::<T>());
    let (xx, xy, xz, xw) = (x * x, x * y, x * z, x * w);
    let (yy, yz, yw) = (y * y, y * z, y * w);
    let (zz, zw) = (z * z, z * w);

    let mut rot = Matrix::zero();
    rot[(0, 0)] = one - two * (yy + zz);
    rot[(0, 1)] = two * (xy - zw);
    rot[(0, 2)] = two * (xz + yw);

    rot[(1, 0)] = two * (xy + zw);
    rot[(1, 1)] = one - two * (xx + zz);
    rot[(1, 2)] = two * (yz - xw);

    rot[(2, 0)] = two * (xz - yw);
    rot[(2, 1)] = two * (yz + xw);
    rot[(2, 2)] = one - two * (xx + yy);

    rot[(3, 3)] = one;
    rot
}

/// Symmetric perspective frustum. `fovy` is the full vertical angle in degrees.
pub fn perspective<T: BaseFloat>(fovy: T, aspect: T, znear: T, zfar: T) -> Matrix<4, 4, T> {
    let two = two::<T>();
    let f = T::one() / (deg_to_rad(fovy) / two).tan();

    let mut mat = Matrix::zero();
    mat[(0, 0)] = f / aspect;
    mat[(1, 1)] = f;
    mat[(2, 2)] = (zfar + znear) / (znear - zfar);
    mat[(2, 3)] = two * zfar * znear / (znear - zfar);
    mat[(3, 2)] = -T::one();
    mat
}

/// [`perspective`] with the far plane at infinity.
pub fn infinite_perspective<T: BaseFloat>(fovy: T, aspect: T, znear: T) -> Matrix<4, 4, T> {
    let two = two::<T>();
    let f = T::one() / (deg_to_rad(fovy) / two).tan();

    let mut mat = Matrix::zero();
    mat[(0, 0)] = f / aspect;
    mat[(1, 1)] = f;
    mat[(2, 2)] = -T::one();
    mat[(2, 3)] = -two * znear;
    mat[(3, 2)] = -T::one();
    mat
}

pub fn ortho<T: BaseFloat>(
    left: T,
    right: T,
    bottom: T,
    top: T,
    znear: T,
    zfar: T,
) -> Matrix<4, 4, T> {
    let two = two::<T>();

    let mut mat = Matrix::identity();
    mat[(0, 0)] = two / (right - left);
    mat[(1, 1)] = two / (top - bottom);
    mat[(2, 2)] = -two / (zfar - znear);
    mat[(0, 3)] = -(right + left) / (right - left);
    mat[(1, 3)] = -(top + bottom) / (top - bottom);
    mat[(2, 3)] = -(zfar + znear) / (zfar - znear);
    mat
}
