//! phong-gltf
//!
//! Renders a single glTF 2.0 scene with per-fragment Phong lighting and the
//! material's base-color texture as diffuse term. The scene is loaded into an
//! owned document, uploaded once, and redrawn every frame from its node
//! hierarchy and the active camera.
//!
//! High-level modules
//! - `math`: fixed-size vectors, matrices and transform builders
//! - `data_structures`: scene document, node transforms, cameras, GPU textures
//! - `resources`: glTF loading into the scene document
//! - `render`: renderer interface, uniform block and mesh drawing
//! - `context`: wgpu device/surface and the `Renderer` implementation
//! - `pipelines`: the Phong render pipeline
//! - `flow`: frame driver and the winit event loop
//! - `config`: JSON settings
//! - `error`: scene error taxonomy
//!

pub mod config;
pub mod context;
pub mod data_structures;
pub mod error;
pub mod flow;
pub mod math;
pub mod pipelines;
pub mod render;
pub mod resources;

pub use error::{SceneError, SceneResult};
