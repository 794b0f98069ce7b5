#![allow(dead_code)]

use std::collections::BTreeMap;

use phong_gltf::{
    data_structures::{
        camera::{Camera, CameraProjection},
        node_transform::NodeTransform,
        scene_graph::{
            Accessor, Image, IndexFormat, Indices, Material, Mesh, Node, Primitive, SamplerDesc,
            Scene, SceneDocument, Semantic, Texture, Topology,
        },
    },
    render::{BufferId, DrawCall, PhongUniforms, Renderer, TextureId},
};

#[derive(Debug, Clone, PartialEq)]
pub enum Upload {
    Vertex(Semantic, Vec<u8>),
    Index(IndexFormat, Vec<u8>),
}

/// Renderer that keeps every upload and every frame call in memory.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    pub buffers: Vec<Upload>,
    pub textures: Vec<(Image, SamplerDesc)>,
    pub frames_begun: u32,
    pub frames_ended: u32,
    /// Uniform block in effect for each draw of the current frame.
    pub draws: Vec<(PhongUniforms, DrawCall)>,
    pub uniforms: Vec<PhongUniforms>,
    pub released: bool,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vertex_data(&self, id: BufferId) -> (Semantic, &[u8]) {
        match &self.buffers[id.0] {
            Upload::Vertex(semantic, data) => (*semantic, data),
            other => panic!("buffer {} is not a vertex stream: {other:?}", id.0),
        }
    }

    pub fn vertex_floats(&self, id: BufferId) -> Vec<f32> {
        let (_, data) = self.vertex_data(id);
        data.chunks_exact(4)
            .map(|b| f32::from_ne_bytes([b[0], b[1], b[2], b[3]]))
            .collect()
    }
}

impl Renderer for RecordingRenderer {
    fn upload_vertex_stream(&mut self, semantic: Semantic, data: &[u8]) -> anyhow::Result<BufferId> {
        self.buffers.push(Upload::Vertex(semantic, data.to_vec()));
        Ok(BufferId(self.buffers.len() - 1))
    }

    fn upload_index_stream(&mut self, format: IndexFormat, data: &[u8]) -> anyhow::Result<BufferId> {
        self.buffers.push(Upload::Index(format, data.to_vec()));
        Ok(BufferId(self.buffers.len() - 1))
    }

    fn upload_texture(&mut self, image: &Image, sampler: &SamplerDesc) -> anyhow::Result<TextureId> {
        self.textures.push((image.clone(), *sampler));
        Ok(TextureId(self.textures.len() - 1))
    }

    fn begin_frame(&mut self) {
        self.frames_begun += 1;
        self.draws.clear();
        self.uniforms.clear();
    }

    fn set_uniforms(&mut self, uniforms: &PhongUniforms) {
        self.uniforms.push(*uniforms);
    }

    fn draw(&mut self, call: &DrawCall) -> anyhow::Result<()> {
        let uniforms = *self
            .uniforms
            .last()
            .ok_or_else(|| anyhow::anyhow!("draw before set_uniforms"))?;
        self.draws.push((uniforms, *call));
        Ok(())
    }

    fn end_frame(&mut self) -> anyhow::Result<()> {
        self.frames_ended += 1;
        Ok(())
    }

    fn release(&mut self) {
        self.buffers.clear();
        self.textures.clear();
        self.released = true;
    }
}

pub fn node(transform: NodeTransform, mesh: Option<usize>, children: Vec<usize>) -> Node {
    Node {
        name: None,
        transform,
        mesh,
        camera: None,
        children,
    }
}

pub fn camera_node(transform: NodeTransform, camera: usize) -> Node {
    Node {
        camera: Some(camera),
        ..node(transform, None, vec![])
    }
}

pub fn perspective_camera(yfov: f32, aspect_ratio: f32, znear: f32, zfar: f32) -> Camera {
    Camera {
        name: None,
        projection: CameraProjection::Perspective {
            yfov,
            aspect_ratio: Some(aspect_ratio),
            znear,
            zfar: Some(zfar),
        },
    }
}

pub fn scene(roots: Vec<usize>) -> Scene {
    Scene {
        name: None,
        nodes: roots,
    }
}

/// Single triangle in the z = 0 plane, facing +z.
pub fn triangle_accessors(with_normals: bool, with_tex_coords: bool) -> Vec<Accessor> {
    let mut accessors = vec![
        Accessor::Vec3(vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]),
        Accessor::Indices(Indices::U16(vec![0, 1, 2])),
    ];
    if with_normals {
        accessors.push(Accessor::Vec3(vec![[0.0, 0.0, 1.0]; 3]));
    }
    if with_tex_coords {
        accessors.push(Accessor::Vec2(vec![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]]));
    }
    accessors
}

/// Primitive over [`triangle_accessors`] laid out from index 0.
pub fn triangle_primitive(
    with_normals: bool,
    with_tex_coords: bool,
    material: Option<usize>,
) -> Primitive {
    let mut attributes = BTreeMap::new();
    attributes.insert(Semantic::Position, 0);
    let mut next = 2;
    if with_normals {
        attributes.insert(Semantic::Normal, next);
        next += 1;
    }
    if with_tex_coords {
        attributes.insert(Semantic::TexCoord0, next);
    }
    Primitive {
        attributes,
        indices: Some(1),
        mode: Topology::Triangles,
        material,
    }
}

pub fn mesh(primitives: Vec<Primitive>) -> Mesh {
    Mesh {
        name: None,
        primitives,
    }
}

pub fn rgba_image(rgba: [u8; 4]) -> Image {
    Image {
        width: 1,
        height: 1,
        channels: 4,
        bits: 8,
        pixels: rgba.to_vec(),
    }
}

pub fn material(texture: Option<usize>) -> Material {
    Material {
        name: None,
        base_color_texture: texture,
    }
}

pub fn texture(image: usize) -> Texture {
    Texture {
        image,
        sampler: SamplerDesc::default(),
    }
}

/// One triangle mesh under a single root node with the given transform.
pub fn single_mesh_document(transform: NodeTransform) -> SceneDocument {
    SceneDocument {
        nodes: vec![node(transform, Some(0), vec![])],
        meshes: vec![mesh(vec![triangle_primitive(true, true, None)])],
        accessors: triangle_accessors(true, true),
        scenes: vec![scene(vec![0])],
        default_scene: Some(0),
        ..Default::default()
    }
}

pub fn assert_mat_eq(actual: &[f32], expected: &[f32]) {
    assert_eq!(actual.len(), expected.len());
    for (i, (a, e)) in actual.iter().zip(expected).enumerate() {
        assert!(
            (a - e).abs() < 1e-5,
            "element {i}: {a} != {e}\nactual: {actual:?}\nexpected: {expected:?}"
        );
    }
}
