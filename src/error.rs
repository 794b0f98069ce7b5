//! Error types for scene validation and traversal.

use thiserror::Error;

/// Structural problem in a scene document.
///
/// Application edges (file loading, GPU setup) report through `anyhow`; this
/// type covers what the scene document itself can get wrong.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SceneError {
    /// An index points outside the table it refers to.
    #[error("{owner} references {kind} {index}, but only {len} exist")]
    InvalidReference {
        /// Human-readable owner, e.g. `node 3` or `mesh 0 primitive 1`.
        owner: String,
        /// Table being indexed (`node`, `mesh`, `accessor`, ...).
        kind: &'static str,
        index: usize,
        len: usize,
    },

    /// A node was reached again while it was still on the traversal path.
    #[error("node {node} is its own ancestor")]
    Cycle { node: usize },

    /// A primitive lacks an attribute that drawing cannot do without.
    #[error("mesh {mesh} primitive {primitive} has no {semantic} attribute")]
    MissingAttribute {
        mesh: usize,
        primitive: usize,
        semantic: &'static str,
    },

    /// An accessor holds a different element type than its use requires.
    #[error("accessor {accessor} holds {found} data, expected {expected}")]
    AccessorKind {
        accessor: usize,
        expected: &'static str,
        found: &'static str,
    },

    #[error("image {image} has {channels} channels at {bits} bits, which cannot be uploaded")]
    UnsupportedImage { image: usize, channels: u8, bits: u8 },
}

pub type SceneResult<T> = Result<T, SceneError>;
