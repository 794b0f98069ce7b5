//! Owned scene document and hierarchical traversal.
//!
//! A [`SceneDocument`] is a set of flat tables. Nodes refer to meshes, cameras
//! and child nodes by index, scenes list their root nodes. Traversal walks
//! each scene depth-first, composes every node's [`NodeTransform`] onto the
//! matrix inherited from its parent and hands meshes to a [`SceneVisitor`].

use std::{collections::BTreeMap, fmt};

use log::debug;

use crate::{
    data_structures::{camera::Camera, node_transform::NodeTransform},
    error::{SceneError, SceneResult},
    math::Mat4f,
};

/// Vertex attribute streams the Phong pipeline consumes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Semantic {
    Position,
    Normal,
    TexCoord0,
}

impl Semantic {
    pub fn as_str(&self) -> &'static str {
        match self {
            Semantic::Position => "POSITION",
            Semantic::Normal => "NORMAL",
            Semantic::TexCoord0 => "TEXCOORD_0",
        }
    }

    /// Shader input location and vertex buffer slot.
    pub fn location(&self) -> u32 {
        match self {
            Semantic::Position => 0,
            Semantic::Normal => 1,
            Semantic::TexCoord0 => 2,
        }
    }

    /// Number of `f32` components per vertex.
    pub fn components(&self) -> usize {
        match self {
            Semantic::Position | Semantic::Normal => 3,
            Semantic::TexCoord0 => 2,
        }
    }
}

impl fmt::Display for Semantic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Topology {
    Points,
    Lines,
    LineLoop,
    LineStrip,
    #[default]
    Triangles,
    TriangleStrip,
    TriangleFan,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IndexFormat {
    U16,
    U32,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Indices {
    U16(Vec<u16>),
    U32(Vec<u32>),
}

impl Indices {
    pub fn format(&self) -> IndexFormat {
        match self {
            Indices::U16(_) => IndexFormat::U16,
            Indices::U32(_) => IndexFormat::U32,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Indices::U16(v) => v.len(),
            Indices::U32(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Indices::U16(v) => bytemuck::cast_slice(v),
            Indices::U32(v) => bytemuck::cast_slice(v),
        }
    }
}

/// Decoded accessor contents.
#[derive(Clone, Debug, PartialEq)]
pub enum Accessor {
    Vec2(Vec<[f32; 2]>),
    Vec3(Vec<[f32; 3]>),
    Indices(Indices),
}

impl Accessor {
    pub fn kind(&self) -> &'static str {
        match self {
            Accessor::Vec2(_) => "VEC2",
            Accessor::Vec3(_) => "VEC3",
            Accessor::Indices(_) => "SCALAR",
        }
    }

    pub fn count(&self) -> usize {
        match self {
            Accessor::Vec2(v) => v.len(),
            Accessor::Vec3(v) => v.len(),
            Accessor::Indices(i) => i.len(),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Accessor::Vec2(v) => bytemuck::cast_slice(v),
            Accessor::Vec3(v) => bytemuck::cast_slice(v),
            Accessor::Indices(i) => i.as_bytes(),
        }
    }

    pub fn as_indices(&self) -> Option<&Indices> {
        match self {
            Accessor::Indices(i) => Some(i),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Primitive {
    pub attributes: BTreeMap<Semantic, usize>,
    pub indices: Option<usize>,
    pub mode: Topology,
    pub material: Option<usize>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Mesh {
    pub name: Option<String>,
    pub primitives: Vec<Primitive>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WrapMode {
    ClampToEdge,
    MirroredRepeat,
    #[default]
    Repeat,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SamplerDesc {
    pub wrap_s: WrapMode,
    pub wrap_t: WrapMode,
}

/// Raw decoded image: `channels` of `bits` each, rows top to bottom.
#[derive(Clone, Debug, PartialEq)]
pub struct Image {
    pub width: u32,
    pub height: u32,
    pub channels: u8,
    pub bits: u8,
    pub pixels: Vec<u8>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Texture {
    pub image: usize,
    pub sampler: SamplerDesc,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Material {
    pub name: Option<String>,
    pub base_color_texture: Option<usize>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Node {
    pub name: Option<String>,
    pub transform: NodeTransform,
    pub mesh: Option<usize>,
    pub camera: Option<usize>,
    pub children: Vec<usize>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Scene {
    pub name: Option<String>,
    pub nodes: Vec<usize>,
}

/// The loaded glTF content the renderer works from. Read-only after loading.
#[derive(Clone, Debug, Default)]
pub struct SceneDocument {
    pub nodes: Vec<Node>,
    pub meshes: Vec<Mesh>,
    pub accessors: Vec<Accessor>,
    pub cameras: Vec<Camera>,
    pub materials: Vec<Material>,
    pub textures: Vec<Texture>,
    pub images: Vec<Image>,
    pub scenes: Vec<Scene>,
    pub default_scene: Option<usize>,
}

/// Receives nodes and meshes during [`SceneDocument::traverse`].
pub trait SceneVisitor {
    type Error: From<SceneError>;

    /// Called on entering every node with its composed world matrix.
    fn visit_node(
        &mut self,
        _index: usize,
        _node: &Node,
        _world: &Mat4f,
    ) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Called for each node that owns a mesh, right after [`Self::visit_node`].
    fn draw_mesh(&mut self, index: usize, mesh: &Mesh, model: &Mat4f) -> Result<(), Self::Error>;
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unseen,
    OnPath,
    Done,
}

#[derive(Clone, Copy)]
enum Owner {
    Scene(usize),
    Node(usize),
}

impl fmt::Display for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Owner::Scene(i) => write!(f, "scene {i}"),
            Owner::Node(i) => write!(f, "node {i}"),
        }
    }
}

fn check(
    owner: impl fmt::Display,
    kind: &'static str,
    index: usize,
    len: usize,
) -> SceneResult<()> {
    if index < len {
        Ok(())
    } else {
        Err(SceneError::InvalidReference {
            owner: owner.to_string(),
            kind,
            index,
            len,
        })
    }
}

impl SceneDocument {
    /// Walks every scene in declaration order.
    pub fn traverse<V: SceneVisitor>(&self, visitor: &mut V) -> Result<(), V::Error> {
        for scene in 0..self.scenes.len() {
            self.traverse_scene(scene, visitor)?;
        }
        Ok(())
    }

    /// Walks the roots of one scene, each starting from the identity matrix.
    pub fn traverse_scene<V: SceneVisitor>(
        &self,
        scene: usize,
        visitor: &mut V,
    ) -> Result<(), V::Error> {
        check("document", "scene", scene, self.scenes.len())?;
        let mut on_path = vec![false; self.nodes.len()];
        let identity = Mat4f::identity();
        for &root in &self.scenes[scene].nodes {
            self.visit(Owner::Scene(scene), root, &identity, &mut on_path, visitor)?;
        }
        Ok(())
    }

    fn visit<V: SceneVisitor>(
        &self,
        owner: Owner,
        index: usize,
        parent: &Mat4f,
        on_path: &mut [bool],
        visitor: &mut V,
    ) -> Result<(), V::Error> {
        check(owner, "node", index, self.nodes.len())?;
        if on_path[index] {
            return Err(SceneError::Cycle { node: index }.into());
        }
        let node = &self.nodes[index];
        let world = node.transform.apply(parent);

        visitor.visit_node(index, node, &world)?;
        if let Some(mesh) = node.mesh {
            check(Owner::Node(index), "mesh", mesh, self.meshes.len())?;
            visitor.draw_mesh(mesh, &self.meshes[mesh], &world)?;
        }

        on_path[index] = true;
        for &child in &node.children {
            self.visit(Owner::Node(index), child, &world, on_path, visitor)?;
        }
        on_path[index] = false;
        Ok(())
    }

    /// `(node, world matrix)` for every node reached, in visit order.
    pub fn world_transforms(&self) -> SceneResult<Vec<(usize, Mat4f)>> {
        let mut collector = WorldCollector::default();
        self.traverse(&mut collector)?;
        Ok(collector.worlds)
    }

    /// Checks every cross-table reference, the accessor types each use
    /// requires, image formats and the absence of cycles.
    pub fn validate(&self) -> SceneResult<()> {
        for (i, node) in self.nodes.iter().enumerate() {
            let owner = Owner::Node(i);
            if let Some(mesh) = node.mesh {
                check(owner, "mesh", mesh, self.meshes.len())?;
            }
            if let Some(camera) = node.camera {
                check(owner, "camera", camera, self.cameras.len())?;
            }
            for &child in &node.children {
                check(owner, "node", child, self.nodes.len())?;
            }
        }

        for (m, mesh) in self.meshes.iter().enumerate() {
            for (p, primitive) in mesh.primitives.iter().enumerate() {
                self.validate_primitive(m, p, primitive)?;
            }
        }

        for (i, material) in self.materials.iter().enumerate() {
            if let Some(texture) = material.base_color_texture {
                check(format_args!("material {i}"), "texture", texture, self.textures.len())?;
            }
        }
        for (i, texture) in self.textures.iter().enumerate() {
            check(format_args!("texture {i}"), "image", texture.image, self.images.len())?;
        }
        for (i, image) in self.images.iter().enumerate() {
            let supported = ((1..=4).contains(&image.channels) && matches!(image.bits, 8 | 16))
                || matches!((image.channels, image.bits), (3 | 4, 32));
            if !supported {
                return Err(SceneError::UnsupportedImage {
                    image: i,
                    channels: image.channels,
                    bits: image.bits,
                });
            }
        }

        for (s, scene) in self.scenes.iter().enumerate() {
            for &root in &scene.nodes {
                check(Owner::Scene(s), "node", root, self.nodes.len())?;
            }
        }
        if let Some(scene) = self.default_scene {
            check("document", "scene", scene, self.scenes.len())?;
        }

        let mut marks = vec![Mark::Unseen; self.nodes.len()];
        for scene in &self.scenes {
            for &root in &scene.nodes {
                self.check_acyclic(root, &mut marks)?;
            }
        }
        debug!("scene document validated, {} nodes", self.nodes.len());
        Ok(())
    }

    /// Depth-first colouring. Each node is expanded once, however many
    /// parents share it.
    fn check_acyclic(&self, index: usize, marks: &mut [Mark]) -> SceneResult<()> {
        match marks[index] {
            Mark::Done => return Ok(()),
            Mark::OnPath => return Err(SceneError::Cycle { node: index }),
            Mark::Unseen => {}
        }
        marks[index] = Mark::OnPath;
        for &child in &self.nodes[index].children {
            self.check_acyclic(child, marks)?;
        }
        marks[index] = Mark::Done;
        Ok(())
    }

    fn validate_primitive(
        &self,
        mesh: usize,
        index: usize,
        primitive: &Primitive,
    ) -> SceneResult<()> {
        let owner = format!("mesh {mesh} primitive {index}");
        if !primitive.attributes.contains_key(&Semantic::Position) {
            return Err(SceneError::MissingAttribute {
                mesh,
                primitive: index,
                semantic: Semantic::Position.as_str(),
            });
        }
        for (semantic, &accessor) in &primitive.attributes {
            check(&owner, "accessor", accessor, self.accessors.len())?;
            let found = &self.accessors[accessor];
            let expected = if semantic.components() == 3 { "VEC3" } else { "VEC2" };
            if found.kind() != expected {
                return Err(SceneError::AccessorKind {
                    accessor,
                    expected,
                    found: found.kind(),
                });
            }
        }
        if let Some(accessor) = primitive.indices {
            check(&owner, "accessor", accessor, self.accessors.len())?;
            let found = &self.accessors[accessor];
            if found.as_indices().is_none() {
                return Err(SceneError::AccessorKind {
                    accessor,
                    expected: "SCALAR",
                    found: found.kind(),
                });
            }
        }
        if let Some(material) = primitive.material {
            check(&owner, "material", material, self.materials.len())?;
        }
        Ok(())
    }

    /// Vertex count of a primitive, taken from its POSITION stream.
    pub fn vertex_count(&self, primitive: &Primitive) -> usize {
        primitive
            .attributes
            .get(&Semantic::Position)
            .and_then(|&a| self.accessors.get(a))
            .map_or(0, Accessor::count)
    }
}

#[derive(Default)]
struct WorldCollector {
    worlds: Vec<(usize, Mat4f)>,
}

impl SceneVisitor for WorldCollector {
    type Error = SceneError;

    fn visit_node(&mut self, index: usize, _node: &Node, world: &Mat4f) -> SceneResult<()> {
        self.worlds.push((index, *world));
        Ok(())
    }

    fn draw_mesh(&mut self, _index: usize, _mesh: &Mesh, _model: &Mat4f) -> SceneResult<()> {
        Ok(())
    }
}
