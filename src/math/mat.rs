//! Fixed-size matrices stored column-major.
//!
//! The storage order is the one GPU uniform uploads expect for `mat4x4<f32>`,
//! so [`Matrix::as_slice`] can be handed to a buffer write as-is.

use std::ops::{Index, IndexMut};

use cgmath::BaseFloat;

use super::vec::Vector;

/// An M x N matrix (M rows, N columns).
///
/// Element `(r, c)` lives at flat offset `r + c * M`.
#[derive(Clone, Copy, Debug, PartialEq)]
#[repr(transparent)]
pub struct Matrix<const M: usize, const N: usize, T> {
    cols: [[T; M]; N],
}

pub type Mat3f = Matrix<3, 3, f32>;
pub type Mat3d = Matrix<3, 3, f64>;
pub type Mat4f = Matrix<4, 4, f32>;
pub type Mat4d = Matrix<4, 4, f64>;

impl<const M: usize, const N: usize, T: BaseFloat> Matrix<M, N, T> {
    pub fn zero() -> Self {
        Self {
            cols: [[T::zero(); M]; N],
        }
    }

    pub fn splat(elem: T) -> Self {
        Self {
            cols: [[elem; M]; N],
        }
    }

    pub const fn from_columns(cols: [[T; M]; N]) -> Self {
        Self { cols }
    }

    pub fn from_rows(rows: [[T; N]; M]) -> Self {
        let mut mat = Self::zero();
        for (r, row) in rows.iter().enumerate() {
            for (c, value) in row.iter().enumerate() {
                mat.cols[c][r] = *value;
            }
        }
        mat
    }

    pub fn set_to_zero(&mut self) {
        self.cols = [[T::zero(); M]; N];
    }

    pub fn get(&self, row: usize, col: usize) -> T {
        self.cols[col][row]
    }

    pub fn column(&self, i: usize) -> Vector<M, T> {
        Vector::from_array(self.cols[i])
    }

    pub fn set_column(&mut self, i: usize, col: &Vector<M, T>) {
        self.cols[i] = *col.as_array();
    }

    pub fn row(&self, i: usize) -> Vector<N, T> {
        let mut row = Vector::zero();
        for c in 0..N {
            row[c] = self.cols[c][i];
        }
        row
    }

    pub fn set_row(&mut self, i: usize, row: &Vector<N, T>) {
        for c in 0..N {
            self.cols[c][i] = row[c];
        }
    }

    /// Returns the N x M transpose: row `i` of `self` becomes column `i`.
    pub fn transpose(&self) -> Matrix<N, M, T> {
        let mut trans = Matrix::<N, M, T>::zero();
        for i in 0..M {
            trans.set_column(i, &self.row(i));
        }
        trans
    }

    pub fn columns(&self) -> &[[T; M]; N] {
        &self.cols
    }

    /// Read-only flat view in column-major order.
    pub fn as_slice(&self) -> &[T] {
        self.cols.as_flattened()
    }
}

impl<const N: usize, T: BaseFloat> Matrix<N, N, T> {
    pub fn identity() -> Self {
        let mut mat = Self::zero();
        mat.set_to_identity();
        mat
    }

    pub fn set_to_identity(&mut self) {
        self.set_to_zero();
        for i in 0..N {
            self.cols[i][i] = T::one();
        }
    }
}

impl<const M: usize, const N: usize, T: BaseFloat> Default for Matrix<M, N, T> {
    fn default() -> Self {
        Self::zero()
    }
}

impl<const M: usize, const N: usize, T> Index<(usize, usize)> for Matrix<M, N, T> {
    type Output = T;

    fn index(&self, (row, col): (usize, usize)) -> &T {
        &self.cols[col][row]
    }
}

impl<const M: usize, const N: usize, T> IndexMut<(usize, usize)> for Matrix<M, N, T> {
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut T {
        &mut self.cols[col][row]
    }
}

impl From<Mat4f> for [[f32; 4]; 4] {
    fn from(mat: Mat4f) -> Self {
        mat.cols
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_is_column_major() {
        let mut m = Matrix::<2, 3, f32>::zero();
        m[(0, 1)] = 5.0;
        m[(1, 2)] = 7.0;
        assert_eq!(m.as_slice(), &[0.0, 0.0, 5.0, 0.0, 0.0, 7.0]);
    }

    #[test]
    fn from_rows_matches_indexing() {
        let m = Matrix::<2, 3, f64>::from_rows([[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]);
        assert_eq!(m.get(0, 2), 3.0);
        assert_eq!(m.get(1, 0), 4.0);
        assert_eq!(m.row(1).as_slice(), &[4.0, 5.0, 6.0]);
        assert_eq!(m.column(1).as_slice(), &[2.0, 5.0]);
    }

    #[test]
    fn transpose_swaps_dimensions() {
        let m = Matrix::<2, 3, f32>::from_rows([[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]);
        let t: Matrix<3, 2, f32> = m.transpose();
        assert_eq!(t, Matrix::from_rows([[1.0, 4.0], [2.0, 5.0], [3.0, 6.0]]));
        assert_eq!(t.transpose(), m);
    }

    #[test]
    fn identity_has_unit_diagonal() {
        let i = Mat4f::identity();
        for r in 0..4 {
            for c in 0..4 {
                assert_eq!(i[(r, c)], if r == c { 1.0 } else { 0.0 });
            }
        }
    }

    #[test]
    fn set_row_and_column() {
        let mut m = Mat3f::zero();
        m.set_row(0, &Vector::<3, f32>::new(1.0, 2.0, 3.0));
        m.set_column(2, &Vector::<3, f32>::new(9.0, 8.0, 7.0));
        assert_eq!(m.row(0).as_slice(), &[1.0, 2.0, 9.0]);
        assert_eq!(m.column(2).as_slice(), &[9.0, 8.0, 7.0]);
    }
}
