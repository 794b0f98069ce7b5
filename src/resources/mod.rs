//! Loading glTF files into an owned [`SceneDocument`].
//!
//! Parsing, buffer resolution and image decoding are done by `gltf::import`.
//! This module converts the result into the flat tables traversal and GPU
//! upload work from, then validates every cross reference.

use std::path::Path;

use anyhow::Context;
use log::info;

use crate::data_structures::{
    camera::{Camera, CameraProjection},
    node_transform::NodeTransform,
    scene_graph::{Material, Node, Scene, SceneDocument},
};

pub mod mesh;
pub mod texture;

/// Loads and validates a `.gltf` or `.glb` file.
pub fn load_gltf(path: impl AsRef<Path>) -> anyhow::Result<SceneDocument> {
    let path = path.as_ref();
    let (document, buffers, images) = gltf::import(path)
        .with_context(|| format!("Failed to load glTF: {}", path.display()))?;

    let scene = from_gltf(&document, &buffers, images);
    scene
        .validate()
        .with_context(|| format!("Invalid glTF scene: {}", path.display()))?;

    info!(
        "Loaded glTF: {} ({} nodes, {} meshes, {} cameras, {} textures)",
        path.display(),
        scene.nodes.len(),
        scene.meshes.len(),
        scene.cameras.len(),
        scene.textures.len(),
    );
    Ok(scene)
}

/// Converts an imported glTF document. The result is not validated yet.
pub fn from_gltf(
    document: &gltf::Document,
    buffers: &[gltf::buffer::Data],
    images: Vec<gltf::image::Data>,
) -> SceneDocument {
    let (meshes, accessors) = mesh::load_meshes(document, buffers);

    SceneDocument {
        nodes: document.nodes().map(|node| load_node(&node)).collect(),
        meshes,
        accessors,
        cameras: document.cameras().map(|camera| load_camera(&camera)).collect(),
        materials: document
            .materials()
            .map(|material| Material {
                name: material.name().map(str::to_string),
                base_color_texture: material
                    .pbr_metallic_roughness()
                    .base_color_texture()
                    .map(|info| info.texture().index()),
            })
            .collect(),
        textures: texture::load_textures(document),
        images: texture::load_images(images),
        scenes: document
            .scenes()
            .map(|scene| Scene {
                name: scene.name().map(str::to_string),
                nodes: scene.nodes().map(|node| node.index()).collect(),
            })
            .collect(),
        default_scene: document.default_scene().map(|scene| scene.index()),
    }
}

fn load_node(node: &gltf::Node) -> Node {
    let transform = match node.transform() {
        // glTF stores the matrix column-major, `NodeTransform` reads it row-major.
        gltf::scene::Transform::Matrix { matrix } => {
            let mut values = [0.0; 16];
            for (c, column) in matrix.iter().enumerate() {
                for (r, value) in column.iter().enumerate() {
                    values[r * 4 + c] = *value;
                }
            }
            NodeTransform::from_matrix(values)
        }
        gltf::scene::Transform::Decomposed {
            translation,
            rotation,
            scale,
        } => NodeTransform::from_trs(
            (translation != [0.0; 3]).then_some(translation),
            (rotation != [0.0, 0.0, 0.0, 1.0]).then_some(rotation),
            (scale != [1.0; 3]).then_some(scale),
        ),
    };
    Node {
        name: node.name().map(str::to_string),
        transform,
        mesh: node.mesh().map(|mesh| mesh.index()),
        camera: node.camera().map(|camera| camera.index()),
        children: node.children().map(|child| child.index()).collect(),
    }
}

fn load_camera(camera: &gltf::Camera) -> Camera {
    let projection = match camera.projection() {
        gltf::camera::Projection::Perspective(p) => CameraProjection::Perspective {
            yfov: p.yfov(),
            aspect_ratio: p.aspect_ratio(),
            znear: p.znear(),
            zfar: p.zfar(),
        },
        gltf::camera::Projection::Orthographic(o) => CameraProjection::Orthographic {
            xmag: o.xmag(),
            ymag: o.ymag(),
            znear: o.znear(),
            zfar: o.zfar(),
        },
    };
    Camera {
        name: camera.name().map(str::to_string),
        projection,
    }
}
