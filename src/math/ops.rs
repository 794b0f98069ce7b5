//! Arithmetic operators and formatting for [`Vector`] and [`Matrix`].

use std::fmt;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

use cgmath::BaseFloat;

use super::{mat::Matrix, vec::Vector};

impl<const N: usize, T: BaseFloat> Add for Vector<N, T> {
    type Output = Self;

    fn add(mut self, rhs: Self) -> Self {
        self += rhs;
        self
    }
}

impl<const N: usize, T: BaseFloat> AddAssign for Vector<N, T> {
    fn add_assign(&mut self, rhs: Self) {
        for i in 0..N {
            self[i] += rhs[i];
        }
    }
}

impl<const N: usize, T: BaseFloat> Sub for Vector<N, T> {
    type Output = Self;

    fn sub(mut self, rhs: Self) -> Self {
        self -= rhs;
        self
    }
}

impl<const N: usize, T: BaseFloat> SubAssign for Vector<N, T> {
    fn sub_assign(&mut self, rhs: Self) {
        for i in 0..N {
            self[i] -= rhs[i];
        }
    }
}

impl<const N: usize, T: BaseFloat> Neg for Vector<N, T> {
    type Output = Self;

    fn neg(mut self) -> Self {
        for i in 0..N {
            self[i] = -self[i];
        }
        self
    }
}

// Concrete scalar types keep `f32 * Vector` from overlapping the vector products.
macro_rules! impl_scalar_mul {
    ($($t:ty),*) => {$(
        impl<const N: usize> Mul<Vector<N, $t>> for $t {
            type Output = Vector<N, $t>;

            fn mul(self, mut rhs: Vector<N, $t>) -> Vector<N, $t> {
                for i in 0..N {
                    rhs[i] *= self;
                }
                rhs
            }
        }

        impl<const N: usize> Mul<$t> for Vector<N, $t> {
            type Output = Vector<N, $t>;

            fn mul(self, rhs: $t) -> Vector<N, $t> {
                rhs * self
            }
        }
    )*};
}

impl_scalar_mul!(f32, f64);

/// `y = sum_j x[j] * column_j`
impl<const M: usize, const N: usize, T: BaseFloat> Mul<Vector<N, T>> for Matrix<M, N, T> {
    type Output = Vector<M, T>;

    fn mul(self, x: Vector<N, T>) -> Vector<M, T> {
        let mut y = Vector::zero();
        for j in 0..N {
            let col = self.columns()[j];
            for i in 0..M {
                y[i] += x[j] * col[i];
            }
        }
        y
    }
}

/// Row-vector product: `y[j] = dot(x, column_j)`.
impl<const M: usize, const N: usize, T: BaseFloat> Mul<Matrix<M, N, T>> for Vector<M, T> {
    type Output = Vector<N, T>;

    fn mul(self, a: Matrix<M, N, T>) -> Vector<N, T> {
        let mut y = Vector::zero();
        for j in 0..N {
            y[j] = self.dot(&a.column(j));
        }
        y
    }
}

impl<const M: usize, const N: usize, const L: usize, T: BaseFloat> Mul<Matrix<N, L, T>>
    for Matrix<M, N, T>
{
    type Output = Matrix<M, L, T>;

    fn mul(self, b: Matrix<N, L, T>) -> Matrix<M, L, T> {
        let mut c = Matrix::zero();
        for i in 0..M {
            let row = self.row(i);
            for j in 0..L {
                c[(i, j)] = row.dot(&b.column(j));
            }
        }
        c
    }
}

pub fn dot<const N: usize, T: BaseFloat>(u: &Vector<N, T>, v: &Vector<N, T>) -> T {
    u.dot(v)
}

pub fn cross<T: BaseFloat>(u: &Vector<3, T>, v: &Vector<3, T>) -> Vector<3, T> {
    u.cross(v)
}

fn write_row<T: fmt::Display>(
    f: &mut fmt::Formatter<'_>,
    row: impl Iterator<Item = T>,
) -> fmt::Result {
    f.write_str("[")?;
    for (i, value) in row.enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{value}")?;
    }
    f.write_str("]")
}

impl<const N: usize, T> fmt::Display for Vector<N, T>
where
    T: BaseFloat + fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_row(f, self.iter())
    }
}

/// One bracketed row per line.
impl<const M: usize, const N: usize, T> fmt::Display for Matrix<M, N, T>
where
    T: BaseFloat + fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for r in 0..M {
            if r > 0 {
                writeln!(f)?;
            }
            write_row(f, (0..N).map(|c| self[(r, c)]))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{Mat3f, Mat4d, Mat4f, Vec3d, Vec3f, Vec4f};

    const EPSILON: f64 = 1e-9;

    fn sample(seed: f64) -> Mat4d {
        let mut m = Mat4d::zero();
        for r in 0..4 {
            for c in 0..4 {
                m[(r, c)] = (seed + (r * 4 + c) as f64 * 0.37).sin() * 3.0;
            }
        }
        m
    }

    fn assert_near(a: &Mat4d, b: &Mat4d) {
        for (x, y) in a.as_slice().iter().zip(b.as_slice()) {
            assert!((x - y).abs() < EPSILON, "\n{a}\n!=\n{b}");
        }
    }

    #[test]
    fn add_then_sub_round_trips() {
        let u = Vec3d::new(0.1, 0.2, 0.3);
        let v = Vec3d::new(-4.0, 1e3, 0.5);
        let w = u + v - v;
        for i in 0..3 {
            assert!((w[i] - u[i]).abs() < EPSILON);
        }
    }

    #[test]
    fn scalar_mul_both_orders() {
        let v = Vec3f::new(1.0, -2.0, 0.5);
        assert_eq!(2.0 * v, Vec3f::new(2.0, -4.0, 1.0));
        assert_eq!(v * 2.0, 2.0 * v);
        assert_eq!(-v, Vec3f::new(-1.0, 2.0, -0.5));
    }

    #[test]
    fn cross_is_anticommutative() {
        let u = Vec3d::new(1.5, -0.5, 2.0);
        let v = Vec3d::new(-3.0, 0.25, 1.0);
        assert_eq!(cross(&u, &v), -cross(&v, &u));
        assert!(dot(&u, &cross(&u, &v)).abs() < EPSILON);
    }

    #[test]
    fn matrix_vector_uses_columns() {
        let a = Matrix::<2, 3, f32>::from_rows([[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]);
        let x = Vector::<3, f32>::new(1.0, 0.0, -1.0);
        assert_eq!((a * x).as_slice(), &[-2.0, -2.0]);
    }

    #[test]
    fn vector_matrix_is_row_vector_product() {
        let a = Matrix::<2, 3, f32>::from_rows([[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]);
        let x = Vector::<2, f32>::new(1.0, -1.0);
        assert_eq!((x * a).as_slice(), &[-3.0, -3.0, -3.0]);
        assert_eq!(x * a, a.transpose() * x);
    }

    #[test]
    fn matrix_product_dimensions_chain() {
        let a = Matrix::<2, 3, f32>::from_rows([[1.0, 0.0, 2.0], [0.0, 1.0, 0.0]]);
        let b = Matrix::<3, 2, f32>::from_rows([[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]]);
        let c: Matrix<2, 2, f32> = a * b;
        assert_eq!(c, Matrix::from_rows([[11.0, 14.0], [3.0, 4.0]]));
    }

    #[test]
    fn product_is_associative() {
        let (a, b, c) = (sample(0.0), sample(1.3), sample(-2.1));
        assert_near(&((a * b) * c), &(a * (b * c)));
    }

    #[test]
    fn identity_is_neutral() {
        let a = sample(0.7);
        let i = Mat4d::identity();
        assert_eq!(a * i, a);
        assert_eq!(i * a, a);
        let x = Vec4f::new(1.0, 2.0, 3.0, 4.0);
        assert_eq!(Mat4f::identity() * x, x);
    }

    #[test]
    fn display_formats_rows() {
        let v = Vec3f::new(1.0, 2.5, -3.0);
        assert_eq!(v.to_string(), "[1, 2.5, -3]");
        let m = Mat3f::identity();
        assert_eq!(m.to_string(), "[1, 0, 0]\n[0, 1, 0]\n[0, 0, 1]");
    }
}
