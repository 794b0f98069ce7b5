//! Local transform of a scene node and its composition onto a parent matrix.

use crate::math::{self, Mat4f};

/// The optional transform components a glTF node may declare.
///
/// Each absent component counts as identity. When several are present they
/// compose as `parent * S * R * T * M`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct NodeTransform {
    pub scale: Option<[f32; 3]>,
    /// Quaternion as `(x, y, z, w)`.
    pub rotation: Option<[f32; 4]>,
    pub translation: Option<[f32; 3]>,
    /// 16 values read row-major: element `k` lands at `(k / 4, k % 4)`.
    pub matrix: Option<[f32; 16]>,
}

impl NodeTransform {
    pub fn from_matrix(matrix: [f32; 16]) -> Self {
        Self {
            matrix: Some(matrix),
            ..Default::default()
        }
    }

    pub fn from_trs(
        translation: Option<[f32; 3]>,
        rotation: Option<[f32; 4]>,
        scale: Option<[f32; 3]>,
    ) -> Self {
        Self {
            scale,
            rotation,
            translation,
            matrix: None,
        }
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::default()
    }

    /// Composes this transform onto the inherited `parent` matrix.
    pub fn apply(&self, parent: &Mat4f) -> Mat4f {
        let mut model = *parent;
        if let Some([sx, sy, sz]) = self.scale {
            model = model * math::scale(sx, sy, sz);
        }
        if let Some([x, y, z, w]) = self.rotation {
            model = model * math::quat_to_rotation(x, y, z, w);
        }
        if let Some([dx, dy, dz]) = self.translation {
            model = model * math::translate(dx, dy, dz);
        }
        if let Some(values) = &self.matrix {
            model = model * explicit_matrix(values);
        }
        model
    }

    pub fn local_matrix(&self) -> Mat4f {
        self.apply(&Mat4f::identity())
    }

    /// View matrix for a camera sitting at this transform.
    ///
    /// Built from reciprocal scale, transposed rotation and negated
    /// translation, multiplied in that order. Only the TRS components take
    /// part; an explicit matrix is ignored.
    pub fn view_matrix(&self) -> Mat4f {
        let mut view = Mat4f::identity();
        if let Some([sx, sy, sz]) = self.scale {
            view = view * math::scale(1.0 / sx, 1.0 / sy, 1.0 / sz);
        }
        if let Some([x, y, z, w]) = self.rotation {
            view = view * math::quat_to_rotation(x, y, z, w).transpose();
        }
        if let Some([dx, dy, dz]) = self.translation {
            view = view * math::translate(-dx, -dy, -dz);
        }
        view
    }
}

pub fn explicit_matrix(values: &[f32; 16]) -> Mat4f {
    let mut mat = Mat4f::zero();
    for (k, value) in values.iter().enumerate() {
        mat[(k / 4, k % 4)] = *value;
    }
    mat
}
