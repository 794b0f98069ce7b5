//! Fixed-size vectors.
//!
//! [`Vector<N, T>`] is a plain value type over `[T; N]`. The dimension is a
//! const generic, so adding a 3-vector to a 4-vector does not compile.

use std::ops::{Index, IndexMut};

use cgmath::BaseFloat;

/// An N-element numeric tuple with value semantics.
///
/// The components are laid out contiguously; [`Vector::as_slice`] exposes them
/// as a flat buffer ready for uniform uploads.
#[derive(Clone, Copy, Debug, PartialEq)]
#[repr(transparent)]
pub struct Vector<const N: usize, T> {
    val: [T; N],
}

pub type Vec2f = Vector<2, f32>;
pub type Vec2d = Vector<2, f64>;
pub type Vec3f = Vector<3, f32>;
pub type Vec3d = Vector<3, f64>;
pub type Vec4f = Vector<4, f32>;
pub type Vec4d = Vector<4, f64>;

impl<const N: usize, T: BaseFloat> Vector<N, T> {
    pub fn zero() -> Self {
        Self { val: [T::zero(); N] }
    }

    /// Every component set to `elem`.
    pub fn splat(elem: T) -> Self {
        Self { val: [elem; N] }
    }

    pub const fn from_array(val: [T; N]) -> Self {
        Self { val }
    }

    pub fn set_to_zero(&mut self) {
        self.val = [T::zero(); N];
    }

    /// Sum of the componentwise products.
    pub fn dot(&self, other: &Self) -> T {
        let mut sum = T::zero();
        for i in 0..N {
            sum += self.val[i] * other.val[i];
        }
        sum
    }

    pub const fn dim(&self) -> usize {
        N
    }

    pub fn as_array(&self) -> &[T; N] {
        &self.val
    }

    /// Read-only flat view of the components, in order.
    pub fn as_slice(&self) -> &[T] {
        &self.val
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.val.iter()
    }
}

impl<T: BaseFloat> Vector<2, T> {
    pub const fn new(x: T, y: T) -> Self {
        Self { val: [x, y] }
    }
}

impl<T: BaseFloat> Vector<3, T> {
    pub const fn new(x: T, y: T, z: T) -> Self {
        Self { val: [x, y, z] }
    }

    pub fn cross(&self, other: &Self) -> Self {
        let (u, v) = (&self.val, &other.val);
        Self {
            val: [
                u[1] * v[2] - u[2] * v[1],
                u[2] * v[0] - u[0] * v[2],
                u[0] * v[1] - u[1] * v[0],
            ],
        }
    }
}

impl<T: BaseFloat> Vector<4, T> {
    pub const fn new(x: T, y: T, z: T, w: T) -> Self {
        Self { val: [x, y, z, w] }
    }
}

impl<const N: usize, T: BaseFloat> Default for Vector<N, T> {
    fn default() -> Self {
        Self::zero()
    }
}

impl<const N: usize, T: BaseFloat> From<[T; N]> for Vector<N, T> {
    fn from(val: [T; N]) -> Self {
        Self { val }
    }
}

impl<const N: usize, T> From<Vector<N, T>> for [T; N] {
    fn from(v: Vector<N, T>) -> Self {
        v.val
    }
}

impl<const N: usize, T> Index<usize> for Vector<N, T> {
    type Output = T;

    fn index(&self, i: usize) -> &T {
        &self.val[i]
    }
}

impl<const N: usize, T> IndexMut<usize> for Vector<N, T> {
    fn index_mut(&mut self, i: usize) -> &mut T {
        &mut self.val[i]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-5;

    #[test]
    fn default_is_zero() {
        let v = Vec4f::default();
        assert_eq!(v.as_slice(), &[0.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn dot_is_symmetric() {
        let u = Vec3f::new(1.0, -2.0, 3.5);
        let v = Vec3f::new(0.25, 4.0, -1.0);
        assert_eq!(u.dot(&v), v.dot(&u));
        assert_eq!(u.dot(&v), 0.25 - 8.0 - 3.5);
    }

    #[test]
    fn cross_follows_right_hand_rule() {
        let x = Vec3f::new(1.0, 0.0, 0.0);
        let y = Vec3f::new(0.0, 1.0, 0.0);
        assert_eq!(x.cross(&y), Vec3f::new(0.0, 0.0, 1.0));
        assert_eq!(y.cross(&x), Vec3f::new(0.0, 0.0, -1.0));
    }

    #[test]
    fn cross_is_orthogonal_to_operands() {
        let u = Vec3f::new(0.3, -1.2, 2.0);
        let v = Vec3f::new(4.0, 0.5, -0.7);
        let w = u.cross(&v);
        assert!(u.dot(&w).abs() < EPSILON);
        assert!(v.dot(&w).abs() < EPSILON);
    }

    #[test]
    fn splat_and_index() {
        let mut v = Vec2d::splat(3.0);
        v[1] = -1.0;
        assert_eq!(v[0], 3.0);
        assert_eq!(<[f64; 2]>::from(v), [3.0, -1.0]);
    }
}
