//! GPU-facing interface of the scene renderer.
//!
//! The scene code never touches wgpu directly. It uploads vertex, index and
//! texture data through a [`Renderer`] once at load time and, every frame,
//! issues uniform blocks and [`DrawCall`]s against the handles it got back.
//!
//! # Key types
//!
//! - [`Renderer`] is the upload/draw interface; `context::WgpuRenderer` implements it
//! - [`PhongUniforms`] is the per-draw uniform block, laid out for WGSL
//! - [`GpuScene`] maps meshes, primitives and materials to uploaded handles
//! - [`MeshDrawer`] is the [`SceneVisitor`] that turns traversal into draws

use log::warn;

use crate::{
    config::{LightParams, MaterialParams},
    data_structures::{
        camera::ResolvedCamera,
        scene_graph::{
            Image, IndexFormat, Mesh, SamplerDesc, SceneDocument, SceneVisitor, Semantic, Topology,
        },
    },
    math::Mat4f,
};

/// Handle to an uploaded vertex or index stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BufferId(pub usize);

/// Handle to an uploaded texture.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextureId(pub usize);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IndexedDraw {
    pub buffer: BufferId,
    pub format: IndexFormat,
    pub count: u32,
}

/// One primitive's worth of bound state plus the draw itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DrawCall {
    pub topology: Topology,
    pub positions: BufferId,
    pub normals: BufferId,
    pub tex_coords: BufferId,
    /// `None` draws `vertex_count` vertices in order.
    pub indices: Option<IndexedDraw>,
    pub vertex_count: u32,
    /// `None` binds the renderer's default white texture.
    pub texture: Option<TextureId>,
}

/// Upload and draw operations the scene needs from a GPU backend.
///
/// Handles stay valid until [`Renderer::release`]. A frame is
/// `begin_frame`, any number of `set_uniforms`/`draw` pairs, then
/// `end_frame`. Each draw uses the block from the latest `set_uniforms`.
pub trait Renderer {
    fn upload_vertex_stream(&mut self, semantic: Semantic, data: &[u8]) -> anyhow::Result<BufferId>;

    fn upload_index_stream(&mut self, format: IndexFormat, data: &[u8]) -> anyhow::Result<BufferId>;

    fn upload_texture(&mut self, image: &Image, sampler: &SamplerDesc) -> anyhow::Result<TextureId>;

    fn begin_frame(&mut self);

    fn set_uniforms(&mut self, uniforms: &PhongUniforms);

    fn draw(&mut self, call: &DrawCall) -> anyhow::Result<()>;

    fn end_frame(&mut self) -> anyhow::Result<()>;

    /// Drops every uploaded resource. Handles issued before are invalid after.
    fn release(&mut self);
}

/// Per-draw uniform block. Matches `Uniforms` in `phong.wgsl`, 256 bytes.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PhongUniforms {
    pub pvm: [[f32; 4]; 4],
    pub model: [[f32; 4]; 4],
    pub view_position: [f32; 3],
    // Due to uniforms requiring 16 byte (4 float) spacing, we need to use a padding field here
    _padding: f32,
    pub light_position: [f32; 3],
    _padding2: f32,
    pub light_ambient: [f32; 4],
    pub light_diffuse: [f32; 4],
    pub light_specular: [f32; 4],
    pub material_ambient: [f32; 4],
    pub material_specular: [f32; 4],
    pub material_shininess: f32,
    _padding3: [f32; 3],
}

impl PhongUniforms {
    pub fn new(
        camera: &ResolvedCamera,
        model: &Mat4f,
        light: &LightParams,
        material: &MaterialParams,
    ) -> Self {
        Self {
            pvm: camera.pvm(model).into(),
            model: (*model).into(),
            view_position: camera.view_position().into(),
            _padding: 0.0,
            light_position: light.position,
            _padding2: 0.0,
            light_ambient: light.ambient,
            light_diffuse: light.diffuse,
            light_specular: light.specular,
            material_ambient: material.ambient,
            material_specular: material.specular,
            material_shininess: material.shininess,
            _padding3: [0.0; 3],
        }
    }
}

/// Handles of one uploaded primitive.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GpuPrimitive {
    pub draw: DrawCall,
}

/// Everything [`GpuScene::upload`] put on the GPU, indexed like the document.
#[derive(Clone, Debug, Default)]
pub struct GpuScene {
    /// `primitives[mesh][primitive]`
    pub primitives: Vec<Vec<GpuPrimitive>>,
    /// One entry per glTF texture.
    pub textures: Vec<TextureId>,
    /// Base-color texture per material.
    pub material_textures: Vec<Option<TextureId>>,
}

impl GpuScene {
    /// Uploads every primitive's streams and every texture once.
    ///
    /// Missing NORMAL or TEXCOORD_0 streams are uploaded zero-filled with the
    /// POSITION vertex count. The document is validated first, so a broken
    /// reference fails before anything reaches the renderer.
    pub fn upload<R: Renderer>(document: &SceneDocument, renderer: &mut R) -> anyhow::Result<Self> {
        document.validate()?;

        let textures = document
            .textures
            .iter()
            .map(|texture| renderer.upload_texture(&document.images[texture.image], &texture.sampler))
            .collect::<anyhow::Result<Vec<_>>>()?;

        let material_textures: Vec<Option<TextureId>> = document
            .materials
            .iter()
            .map(|material| material.base_color_texture.map(|t| textures[t]))
            .collect();

        let mut primitives = Vec::with_capacity(document.meshes.len());
        for mesh in &document.meshes {
            let mut uploaded = Vec::with_capacity(mesh.primitives.len());
            for primitive in &mesh.primitives {
                let vertex_count = document.vertex_count(primitive);
                let mut stream = |semantic: Semantic| -> anyhow::Result<BufferId> {
                    match primitive.attributes.get(&semantic) {
                        Some(&accessor) => renderer
                            .upload_vertex_stream(semantic, document.accessors[accessor].as_bytes()),
                        None => {
                            let zeros = vec![0.0f32; vertex_count * semantic.components()];
                            renderer.upload_vertex_stream(semantic, bytemuck::cast_slice(&zeros))
                        }
                    }
                };
                let positions = stream(Semantic::Position)?;
                let normals = stream(Semantic::Normal)?;
                let tex_coords = stream(Semantic::TexCoord0)?;

                let indices = match primitive
                    .indices
                    .and_then(|i| document.accessors[i].as_indices())
                {
                    Some(indices) => Some(IndexedDraw {
                        buffer: renderer.upload_index_stream(indices.format(), indices.as_bytes())?,
                        format: indices.format(),
                        count: indices.len() as u32,
                    }),
                    None => None,
                };

                uploaded.push(GpuPrimitive {
                    draw: DrawCall {
                        topology: primitive.mode,
                        positions,
                        normals,
                        tex_coords,
                        indices,
                        vertex_count: vertex_count as u32,
                        texture: primitive.material.and_then(|m| material_textures[m]),
                    },
                });
            }
            primitives.push(uploaded);
        }

        Ok(Self {
            primitives,
            textures,
            material_textures,
        })
    }
}

/// Issues the uniforms and draw calls for every mesh a traversal reaches.
pub struct MeshDrawer<'a, R: Renderer> {
    pub renderer: &'a mut R,
    pub gpu: &'a GpuScene,
    pub camera: &'a ResolvedCamera,
    pub light: &'a LightParams,
    pub material: &'a MaterialParams,
}

impl<R: Renderer> SceneVisitor for MeshDrawer<'_, R> {
    type Error = anyhow::Error;

    fn draw_mesh(&mut self, index: usize, mesh: &Mesh, model: &Mat4f) -> anyhow::Result<()> {
        let Some(uploaded) = self.gpu.primitives.get(index) else {
            warn!("Mesh {index} was never uploaded, skipping");
            return Ok(());
        };
        debug_assert_eq!(uploaded.len(), mesh.primitives.len());

        let uniforms = PhongUniforms::new(self.camera, model, self.light, self.material);
        self.renderer.set_uniforms(&uniforms);
        for primitive in uploaded {
            self.renderer.draw(&primitive.draw)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_block_is_256_bytes() {
        assert_eq!(std::mem::size_of::<PhongUniforms>(), 256);
        assert_eq!(std::mem::offset_of!(PhongUniforms, view_position), 128);
        assert_eq!(std::mem::offset_of!(PhongUniforms, light_position), 144);
        assert_eq!(std::mem::offset_of!(PhongUniforms, light_ambient), 160);
        assert_eq!(std::mem::offset_of!(PhongUniforms, material_shininess), 240);
    }
}
