//! Scene cameras and per-frame camera resolution.

use log::warn;
use serde::{Deserialize, Serialize};

use crate::{
    data_structures::scene_graph::SceneDocument,
    error::{SceneError, SceneResult},
    math::{self, Mat4f, Vec3f},
};

/// Projection parameters as glTF stores them. `yfov` is in radians.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CameraProjection {
    Perspective {
        yfov: f32,
        aspect_ratio: Option<f32>,
        znear: f32,
        /// `None` means an infinite far plane.
        zfar: Option<f32>,
    },
    Orthographic {
        xmag: f32,
        ymag: f32,
        znear: f32,
        zfar: f32,
    },
}

impl CameraProjection {
    /// Projection matrix. `viewport_aspect` is used when the camera leaves the
    /// aspect ratio open.
    pub fn matrix(&self, viewport_aspect: f32) -> Mat4f {
        match *self {
            CameraProjection::Perspective {
                yfov,
                aspect_ratio,
                znear,
                zfar,
            } => {
                let fovy = math::rad_to_deg(yfov);
                let aspect = aspect_ratio.unwrap_or(viewport_aspect);
                match zfar {
                    Some(zfar) => math::perspective(fovy, aspect, znear, zfar),
                    None => math::infinite_perspective(fovy, aspect, znear),
                }
            }
            CameraProjection::Orthographic {
                xmag,
                ymag,
                znear,
                zfar,
            } => math::ortho(-xmag, xmag, -ymag, ymag, znear, zfar),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Camera {
    pub name: Option<String>,
    pub projection: CameraProjection,
}

/// View and projection used when the scene defines no camera.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FallbackCamera {
    /// Applied as the whole view matrix, so `(0, 0, -2)` pulls the scene two
    /// units away from the eye.
    pub translation: [f32; 3],
    pub fovy_degrees: f32,
    pub aspect: f32,
    pub znear: f32,
    pub zfar: f32,
}

impl Default for FallbackCamera {
    fn default() -> Self {
        Self {
            translation: [0.0, 0.0, -2.0],
            fovy_degrees: 70.0,
            aspect: 1.0,
            znear: 0.01,
            zfar: 100.0,
        }
    }
}

impl FallbackCamera {
    pub fn resolve(&self) -> ResolvedCamera {
        let [dx, dy, dz] = self.translation;
        ResolvedCamera {
            view: math::translate(dx, dy, dz),
            projection: math::perspective(self.fovy_degrees, self.aspect, self.znear, self.zfar),
        }
    }
}

/// The camera state a frame is drawn with.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResolvedCamera {
    pub view: Mat4f,
    pub projection: Mat4f,
}

impl Default for ResolvedCamera {
    fn default() -> Self {
        FallbackCamera::default().resolve()
    }
}

impl ResolvedCamera {
    /// Translation column of the view matrix, uploaded as the eye position.
    pub fn view_position(&self) -> Vec3f {
        Vec3f::new(self.view[(0, 3)], self.view[(1, 3)], self.view[(2, 3)])
    }

    /// `P * V * M` for one model matrix.
    pub fn pvm(&self, model: &Mat4f) -> Mat4f {
        self.projection * self.view * *model
    }
}

impl SceneDocument {
    /// Last node that references `camera`.
    pub fn camera_node(&self, camera: usize) -> Option<usize> {
        self.nodes.iter().rposition(|node| node.camera == Some(camera))
    }

    /// Resolves view and projection for the camera at `index`.
    ///
    /// A document without cameras yields `fallback`. A camera no node
    /// references gets an identity view.
    pub fn resolve_camera(
        &self,
        index: usize,
        viewport_aspect: f32,
        fallback: &FallbackCamera,
    ) -> SceneResult<ResolvedCamera> {
        if self.cameras.is_empty() {
            return Ok(fallback.resolve());
        }
        let camera = self
            .cameras
            .get(index)
            .ok_or_else(|| SceneError::InvalidReference {
                owner: "active camera".to_string(),
                kind: "camera",
                index,
                len: self.cameras.len(),
            })?;

        let projection = camera.projection.matrix(viewport_aspect);
        let view = match self.camera_node(index) {
            Some(node) => self.nodes[node].transform.view_matrix(),
            None => {
                warn!("No node references camera {index}, using an identity view");
                Mat4f::identity()
            }
        };
        Ok(ResolvedCamera { view, projection })
    }
}
