//! Scene data: the owned glTF document, node transforms, cameras and GPU textures.
//!
//! - `scene_graph` holds the flat document tables and the depth-first traversal
//! - `node_transform` composes a node's scale/rotation/translation/matrix
//! - `camera` turns camera parameters and camera nodes into view/projection
//! - `texture` wraps GPU textures, samplers and the depth buffer

pub mod camera;
pub mod node_transform;
pub mod scene_graph;
pub mod texture;
