//! wgpu device/surface ownership and the [`Renderer`] implementation on top.
//!
//! [`Context`] owns the window surface, device, queue and depth buffer.
//! [`WgpuRenderer`] keeps every uploaded stream and texture in index-addressed
//! tables, records one frame's draws, and encodes them into a single render
//! pass in [`Renderer::end_frame`].

use std::{collections::HashMap, iter, sync::Arc};

use anyhow::{Context as _, bail};
use log::{info, warn};
use wgpu::util::DeviceExt;
use winit::window::Window;

use crate::{
    data_structures::{
        scene_graph::{Image, IndexFormat, SamplerDesc, Semantic},
        texture::Texture,
    },
    pipelines::phong,
    render::{BufferId, DrawCall, PhongUniforms, Renderer, TextureId},
    resources::texture::to_rgba8,
};

#[derive(Debug)]
pub struct Context {
    pub window: Arc<Window>,
    pub depth_texture: Texture,
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
}

impl Context {
    pub async fn new(window: Arc<Window>) -> anyhow::Result<Self> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .context("Failed to create the window surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("No suitable GPU adapter")?;
        info!("Using adapter {}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: None,
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::Off,
            })
            .await
            .context("Failed to create the GPU device")?;

        let surface_caps = surface.get_capabilities(&adapter);
        // Textures are uploaded as sRGB, so the surface has to be sRGB too or
        // every colour comes out darker.
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .context("Surface supports no formats")?;
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let depth_texture =
            Texture::create_depth_texture(&device, [config.width, config.height], "depth_texture");

        Ok(Self {
            window,
            depth_texture,
            surface,
            device,
            queue,
            config,
        })
    }

    /// Reconfigures the surface and depth buffer. Zero sizes are ignored.
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        if width == 0 || height == 0 {
            return false;
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        self.depth_texture =
            Texture::create_depth_texture(&self.device, [width, height], "depth_texture");
        true
    }
}

struct GpuTexture {
    #[allow(unused)]
    texture: Texture,
    bind_group: wgpu::BindGroup,
}

type PipelineKey = (wgpu::PrimitiveTopology, Option<wgpu::IndexFormat>);

/// Records draws between `begin_frame` and `end_frame` and replays them in
/// one render pass.
pub struct WgpuRenderer {
    pub ctx: Context,
    clear_colour: wgpu::Color,
    uniform_layout: wgpu::BindGroupLayout,
    diffuse_layout: wgpu::BindGroupLayout,
    buffers: Vec<wgpu::Buffer>,
    textures: Vec<GpuTexture>,
    default_texture: GpuTexture,
    pipelines: HashMap<PipelineKey, wgpu::RenderPipeline>,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    uniform_capacity: usize,
    uniform_stride: u64,
    frame_uniforms: Vec<PhongUniforms>,
    frame_draws: Vec<(usize, DrawCall)>,
}

impl WgpuRenderer {
    pub fn new(ctx: Context, clear_colour: wgpu::Color) -> Self {
        let uniform_layout = phong::uniform_layout(&ctx.device);
        let diffuse_layout = phong::diffuse_layout(&ctx.device);

        let alignment = ctx.device.limits().min_uniform_buffer_offset_alignment as u64;
        let size = std::mem::size_of::<PhongUniforms>() as u64;
        let uniform_stride = size.div_ceil(alignment) * alignment;

        let uniform_capacity = 16;
        let (uniform_buffer, uniform_bind_group) =
            create_uniform_buffer(&ctx.device, &uniform_layout, uniform_stride, uniform_capacity);

        let white = Texture::create_default_white(&ctx.device, &ctx.queue);
        let default_texture = GpuTexture {
            bind_group: diffuse_bind_group(&ctx.device, &diffuse_layout, &white),
            texture: white,
        };

        Self {
            ctx,
            clear_colour,
            uniform_layout,
            diffuse_layout,
            buffers: Vec::new(),
            textures: Vec::new(),
            default_texture,
            pipelines: HashMap::new(),
            uniform_buffer,
            uniform_bind_group,
            uniform_capacity,
            uniform_stride,
            frame_uniforms: Vec::new(),
            frame_draws: Vec::new(),
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        self.ctx.resize(width, height)
    }

    fn buffer(&self, id: BufferId) -> anyhow::Result<&wgpu::Buffer> {
        self.buffers
            .get(id.0)
            .with_context(|| format!("Unknown buffer handle {}", id.0))
    }

    fn reserve_uniforms(&mut self, count: usize) {
        if count <= self.uniform_capacity {
            return;
        }
        let capacity = count.next_power_of_two();
        let (buffer, bind_group) = create_uniform_buffer(
            &self.ctx.device,
            &self.uniform_layout,
            self.uniform_stride,
            capacity,
        );
        self.uniform_buffer = buffer;
        self.uniform_bind_group = bind_group;
        self.uniform_capacity = capacity;
    }

    fn pipeline_key(call: &DrawCall) -> Option<PipelineKey> {
        let topology = phong::primitive_topology(call.topology)?;
        let strip_format = match (topology.is_strip(), call.indices) {
            (true, Some(indexed)) => Some(phong::index_format(indexed.format)),
            _ => None,
        };
        Some((topology, strip_format))
    }

    fn write_uniforms(&mut self) {
        self.reserve_uniforms(self.frame_uniforms.len());
        let stride = self.uniform_stride as usize;
        let mut staging = vec![0u8; stride * self.frame_uniforms.len()];
        for (slot, uniforms) in self.frame_uniforms.iter().enumerate() {
            let bytes = bytemuck::bytes_of(uniforms);
            staging[slot * stride..slot * stride + bytes.len()].copy_from_slice(bytes);
        }
        if !staging.is_empty() {
            self.ctx.queue.write_buffer(&self.uniform_buffer, 0, &staging);
        }
    }

    fn encode(&self, encoder: &mut wgpu::CommandEncoder, view: &wgpu::TextureView) -> anyhow::Result<()> {
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Render Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(self.clear_colour),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.ctx.depth_texture.view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            occlusion_query_set: None,
            timestamp_writes: None,
            multiview_mask: None,
        });

        for (slot, call) in &self.frame_draws {
            let Some(pipeline) = Self::pipeline_key(call).and_then(|key| self.pipelines.get(&key))
            else {
                continue;
            };
            render_pass.set_pipeline(pipeline);
            let offset = (*slot as u64 * self.uniform_stride) as wgpu::DynamicOffset;
            render_pass.set_bind_group(0, &self.uniform_bind_group, &[offset]);

            let texture = match call.texture {
                Some(id) => self
                    .textures
                    .get(id.0)
                    .with_context(|| format!("Unknown texture handle {}", id.0))?,
                None => &self.default_texture,
            };
            render_pass.set_bind_group(1, &texture.bind_group, &[]);

            for (semantic, id) in [
                (Semantic::Position, call.positions),
                (Semantic::Normal, call.normals),
                (Semantic::TexCoord0, call.tex_coords),
            ] {
                render_pass.set_vertex_buffer(semantic.location(), self.buffer(id)?.slice(..));
            }

            match call.indices {
                Some(indexed) => {
                    render_pass.set_index_buffer(
                        self.buffer(indexed.buffer)?.slice(..),
                        phong::index_format(indexed.format),
                    );
                    render_pass.draw_indexed(0..indexed.count, 0, 0..1);
                }
                None => render_pass.draw(0..call.vertex_count, 0..1),
            }
        }
        Ok(())
    }
}

impl Renderer for WgpuRenderer {
    fn upload_vertex_stream(&mut self, semantic: Semantic, data: &[u8]) -> anyhow::Result<BufferId> {
        let buffer = self
            .ctx
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(semantic.as_str()),
                contents: data,
                usage: wgpu::BufferUsages::VERTEX,
            });
        self.buffers.push(buffer);
        Ok(BufferId(self.buffers.len() - 1))
    }

    fn upload_index_stream(&mut self, _format: IndexFormat, data: &[u8]) -> anyhow::Result<BufferId> {
        let buffer = self
            .ctx
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Index Buffer"),
                contents: data,
                usage: wgpu::BufferUsages::INDEX,
            });
        self.buffers.push(buffer);
        Ok(BufferId(self.buffers.len() - 1))
    }

    fn upload_texture(&mut self, image: &Image, sampler: &SamplerDesc) -> anyhow::Result<TextureId> {
        let id = self.textures.len();
        let rgba = to_rgba8(id, image)?;
        let texture = Texture::from_rgba8(
            &self.ctx.device,
            &self.ctx.queue,
            &rgba,
            [image.width, image.height],
            sampler,
            "diffuse_texture",
        );
        let bind_group = diffuse_bind_group(&self.ctx.device, &self.diffuse_layout, &texture);
        self.textures.push(GpuTexture {
            texture,
            bind_group,
        });
        Ok(TextureId(id))
    }

    fn begin_frame(&mut self) {
        self.frame_uniforms.clear();
        self.frame_draws.clear();
    }

    fn set_uniforms(&mut self, uniforms: &PhongUniforms) {
        self.frame_uniforms.push(*uniforms);
    }

    fn draw(&mut self, call: &DrawCall) -> anyhow::Result<()> {
        let Some(slot) = self.frame_uniforms.len().checked_sub(1) else {
            bail!("draw issued before any uniforms were set this frame");
        };
        let Some(key) = Self::pipeline_key(call) else {
            warn!("{:?} primitives are not supported by wgpu, skipping draw", call.topology);
            return Ok(());
        };
        if !self.pipelines.contains_key(&key) {
            let pipeline = phong::mk_phong_pipeline(
                &self.ctx.device,
                self.ctx.config.format,
                &self.uniform_layout,
                &self.diffuse_layout,
                key.0,
                key.1,
            );
            self.pipelines.insert(key, pipeline);
        }
        self.frame_draws.push((slot, *call));
        Ok(())
    }

    fn end_frame(&mut self) -> anyhow::Result<()> {
        let output = match self.ctx.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                let size = self.ctx.window.inner_size();
                warn!("Surface lost or outdated, reconfiguring and skipping the frame");
                if !self.ctx.resize(size.width, size.height) {
                    self.ctx.surface.configure(&self.ctx.device, &self.ctx.config);
                }
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => {
                warn!("Surface timed out, skipping the frame");
                return Ok(());
            }
            Err(e) => return Err(e).context("Unable to acquire the next frame"),
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        self.write_uniforms();

        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });
        self.encode(&mut encoder, &view)?;

        self.ctx.queue.submit(iter::once(encoder.finish()));
        self.ctx.window.pre_present_notify();
        output.present();
        Ok(())
    }

    fn release(&mut self) {
        self.frame_draws.clear();
        self.frame_uniforms.clear();
        self.buffers.clear();
        self.textures.clear();
    }
}

fn create_uniform_buffer(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    stride: u64,
    capacity: usize,
) -> (wgpu::Buffer, wgpu::BindGroup) {
    let buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Phong Uniform Buffer"),
        size: stride * capacity as u64,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });
    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                buffer: &buffer,
                offset: 0,
                size: wgpu::BufferSize::new(std::mem::size_of::<PhongUniforms>() as u64),
            }),
        }],
        label: Some("phong_uniform_bind_group"),
    });
    (buffer, bind_group)
}

fn diffuse_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    texture: &Texture,
) -> wgpu::BindGroup {
    let mut entries = vec![wgpu::BindGroupEntry {
        binding: 0,
        resource: wgpu::BindingResource::TextureView(&texture.view),
    }];
    if let Some(sampler) = &texture.sampler {
        entries.push(wgpu::BindGroupEntry {
            binding: 1,
            resource: wgpu::BindingResource::Sampler(sampler),
        });
    }
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        layout,
        entries: &entries,
        label: Some("diffuse_bind_group"),
    })
}
