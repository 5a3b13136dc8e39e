//! [`GraphicsDevice`] implementation on top of wgpu.
//!
//! Draws are queued between `begin_frame` and `end_frame` and replayed in a
//! single render pass. Each program keeps one pipeline per [`RenderState`]
//! it has been drawn with, built on first use. Uniforms for all draws of a
//! frame live in one buffer addressed with dynamic offsets.

use super::context::Context;
use super::device::{DrawCall, DrawUniforms, FrameError, GraphicsDevice, RenderState};
use super::handle::{BufferHandle, HandleAllocator, ProgramHandle, TextureHandle};
use crate::shader::{ShaderError, ShaderVariant};
use crate::texture::{GpuTexture, Image, Sampler};
use std::collections::HashMap;
use std::num::NonZeroU64;
use wgpu::util::DeviceExt;

/// Byte distance between consecutive uniform slots.
const UNIFORM_STRIDE: u64 = 256;

/// Minimum number of uniform slots allocated.
const MIN_UNIFORM_SLOTS: usize = 64;

struct GpuProgram {
    variant: ShaderVariant,
    module: wgpu::ShaderModule,
    pipelines: HashMap<RenderState, wgpu::RenderPipeline>,
}

struct UniformRing {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    slots: usize,
}

impl UniformRing {
    fn new(device: &wgpu::Device, layout: &wgpu::BindGroupLayout, slots: usize) -> Self {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Draw Uniforms"),
            size: slots as u64 * UNIFORM_STRIDE,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Draw Uniforms Bind Group"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &buffer,
                    offset: 0,
                    size: NonZeroU64::new(std::mem::size_of::<DrawUniforms>() as u64),
                }),
            }],
        });
        Self {
            buffer,
            bind_group,
            slots,
        }
    }
}

/// Pipeline layout shared by every program.
struct Layouts {
    uniforms: wgpu::BindGroupLayout,
    texture: wgpu::BindGroupLayout,
    pipeline: wgpu::PipelineLayout,
}

impl Layouts {
    fn new(device: &wgpu::Device) -> Self {
        let uniforms = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Uniforms Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: NonZeroU64::new(std::mem::size_of::<DrawUniforms>() as u64),
                },
                count: None,
            }],
        });
        let texture = GpuTexture::bind_group_layout(device);
        let pipeline = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Orrery Pipeline Layout"),
            bind_group_layouts: &[&uniforms, &texture],
            push_constant_ranges: &[],
        });
        Self {
            uniforms,
            texture,
            pipeline,
        }
    }
}

/// A [`GraphicsDevice`] that renders to a wgpu surface.
pub struct WgpuDevice {
    context: Context,
    layouts: Layouts,
    sampler: Sampler,
    uniforms: UniformRing,
    white: GpuTexture,
    depth_view: wgpu::TextureView,
    handles: HandleAllocator,
    programs: HashMap<ProgramHandle, GpuProgram>,
    buffers: HashMap<BufferHandle, wgpu::Buffer>,
    textures: HashMap<TextureHandle, GpuTexture>,
    state: RenderState,
    clear_color: wgpu::Color,
    pending: Vec<(DrawCall, RenderState)>,
    frame_open: bool,
}

impl WgpuDevice {
    /// Wrap a ready context.
    pub fn new(context: Context) -> Self {
        let layouts = Layouts::new(&context.device);
        let sampler = Sampler::linear(&context.device);
        let uniforms = UniformRing::new(&context.device, &layouts.uniforms, MIN_UNIFORM_SLOTS);
        let white = GpuTexture::from_image(
            &context.device,
            &context.queue,
            &Image::solid(1, 1, [255; 4]),
            &layouts.texture,
            &sampler,
            Some("White Texture"),
        );
        let depth_view = context
            .create_depth_texture()
            .create_view(&wgpu::TextureViewDescriptor::default());

        Self {
            context,
            layouts,
            sampler,
            uniforms,
            white,
            depth_view,
            handles: HandleAllocator::new(),
            programs: HashMap::new(),
            buffers: HashMap::new(),
            textures: HashMap::new(),
            state: RenderState::default(),
            clear_color: wgpu::Color::BLACK,
            pending: Vec::new(),
            frame_open: false,
        }
    }

    /// Get the underlying context.
    #[inline]
    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Whether the device was lost. Every handle is invalid once this is set.
    #[inline]
    pub fn is_lost(&self) -> bool {
        self.context.is_lost()
    }

    fn ensure_uniform_slots(&mut self, draws: usize) {
        if draws <= self.uniforms.slots {
            return;
        }
        let slots = draws.next_power_of_two().max(MIN_UNIFORM_SLOTS);
        log::debug!("Growing uniform buffer to {slots} slots");
        self.uniforms = UniformRing::new(&self.context.device, &self.layouts.uniforms, slots);
    }

    fn ensure_pipeline(&mut self, program: ProgramHandle, state: RenderState) {
        let Some(entry) = self.programs.get_mut(&program) else {
            return;
        };
        if entry.pipelines.contains_key(&state) {
            return;
        }
        let pipeline = build_pipeline(
            &self.context,
            &self.layouts.pipeline,
            &entry.module,
            entry.variant,
            state,
        );
        entry.pipelines.insert(state, pipeline);
    }

    fn create_buffer(&mut self, contents: &[u8], usage: wgpu::BufferUsages, label: &str) -> BufferHandle {
        if contents.is_empty() {
            log::warn!("Refusing to create an empty {label}");
            return BufferHandle::NONE;
        }
        if self.is_lost() {
            return BufferHandle::NONE;
        }
        let buffer = self.context.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents,
            usage,
        });
        let handle = BufferHandle::from_raw(self.handles.next());
        self.buffers.insert(handle, buffer);
        handle
    }

    fn is_drawable(&self, call: &DrawCall) -> bool {
        match self.programs.get(&call.program) {
            Some(program) if program.variant.vertex_layout() == call.layout => {
                self.buffers.contains_key(&call.vertex_buffer) && self.buffers.contains_key(&call.index_buffer)
            }
            _ => false,
        }
    }

    fn present(&mut self) -> Result<(), FrameError> {
        let draws = std::mem::take(&mut self.pending);
        self.ensure_uniform_slots(draws.len());
        for (call, state) in &draws {
            self.ensure_pipeline(call.program, *state);
        }

        if !draws.is_empty() {
            let mut staging = vec![0u8; draws.len() * UNIFORM_STRIDE as usize];
            for (slot, (call, _)) in draws.iter().enumerate() {
                let start = slot * UNIFORM_STRIDE as usize;
                let bytes = bytemuck::bytes_of(&call.uniforms);
                staging[start..start + bytes.len()].copy_from_slice(bytes);
            }
            self.context.queue.write_buffer(&self.uniforms.buffer, 0, &staging);
        }

        let output = match self.context.get_current_texture() {
            Ok(output) => output,
            Err(err @ (wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated)) => {
                self.context.reconfigure();
                return Err(err.into());
            }
            Err(err) => return Err(err.into()),
        };
        let view = output.texture.create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self.context.create_command_encoder();

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Orrery Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            for (slot, (call, state)) in draws.iter().enumerate() {
                let (Some(program), Some(vertices), Some(indices)) = (
                    self.programs.get(&call.program),
                    self.buffers.get(&call.vertex_buffer),
                    self.buffers.get(&call.index_buffer),
                ) else {
                    continue;
                };
                let Some(pipeline) = program.pipelines.get(state) else {
                    continue;
                };
                let texture = self.textures.get(&call.texture).unwrap_or(&self.white);
                let offset = (slot as u64 * UNIFORM_STRIDE) as u32;

                pass.set_pipeline(pipeline);
                pass.set_bind_group(0, &self.uniforms.bind_group, &[offset]);
                pass.set_bind_group(1, texture.bind_group(), &[]);
                pass.set_vertex_buffer(0, vertices.slice(..));
                pass.set_index_buffer(indices.slice(..), wgpu::IndexFormat::Uint16);
                pass.draw_indexed(0..call.index_count, 0, 0..1);
            }
        }

        self.context.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}

fn build_pipeline(
    context: &Context,
    layout: &wgpu::PipelineLayout,
    module: &wgpu::ShaderModule,
    variant: ShaderVariant,
    state: RenderState,
) -> wgpu::RenderPipeline {
    context.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(variant.label()),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module,
            entry_point: Some("vs_main"),
            buffers: &[variant.vertex_layout().wgpu_layout()],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format: context.surface_format,
                blend: state.blend.then_some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            unclipped_depth: false,
            polygon_mode: wgpu::PolygonMode::Fill,
            conservative: false,
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: context.depth_format,
            depth_write_enabled: state.depth_write,
            depth_compare: if state.depth_test {
                wgpu::CompareFunction::Less
            } else {
                wgpu::CompareFunction::Always
            },
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}

impl GraphicsDevice for WgpuDevice {
    fn compile_program(&mut self, variant: ShaderVariant) -> Result<ProgramHandle, ShaderError> {
        if self.is_lost() {
            return Err(ShaderError::ContextLost);
        }
        let device = &self.context.device;

        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(variant.label()),
            source: wgpu::ShaderSource::Wgsl(variant.source().into()),
        });
        if let Some(error) = pollster::block_on(device.pop_error_scope()) {
            return Err(ShaderError::Compile {
                variant,
                log: error.to_string(),
            });
        }

        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let pipeline = build_pipeline(
            &self.context,
            &self.layouts.pipeline,
            &module,
            variant,
            RenderState::default(),
        );
        if let Some(error) = pollster::block_on(device.pop_error_scope()) {
            return Err(ShaderError::Link {
                variant,
                log: error.to_string(),
            });
        }

        let handle = ProgramHandle::from_raw(self.handles.next());
        let mut pipelines = HashMap::new();
        pipelines.insert(RenderState::default(), pipeline);
        self.programs.insert(
            handle,
            GpuProgram {
                variant,
                module,
                pipelines,
            },
        );
        Ok(handle)
    }

    fn is_program(&self, program: ProgramHandle) -> bool {
        !self.is_lost() && self.programs.contains_key(&program)
    }

    fn delete_program(&mut self, program: ProgramHandle) {
        self.programs.remove(&program);
    }

    fn create_vertex_buffer(&mut self, data: &[f32]) -> BufferHandle {
        self.create_buffer(bytemuck::cast_slice(data), wgpu::BufferUsages::VERTEX, "Vertex Buffer")
    }

    fn create_index_buffer(&mut self, data: &[u16]) -> BufferHandle {
        self.create_buffer(bytemuck::cast_slice(data), wgpu::BufferUsages::INDEX, "Index Buffer")
    }

    fn is_buffer(&self, buffer: BufferHandle) -> bool {
        !self.is_lost() && self.buffers.contains_key(&buffer)
    }

    fn delete_buffer(&mut self, buffer: BufferHandle) {
        if let Some(buffer) = self.buffers.remove(&buffer) {
            buffer.destroy();
        }
    }

    fn upload_texture(&mut self, image: &Image) -> TextureHandle {
        if !image.is_well_formed() {
            log::warn!("Rejecting malformed {}x{} image", image.width(), image.height());
            return TextureHandle::NONE;
        }
        let max = self.context.device.limits().max_texture_dimension_2d;
        if image.width() > max || image.height() > max {
            log::warn!(
                "Rejecting {}x{} image, device maximum is {max}",
                image.width(),
                image.height()
            );
            return TextureHandle::NONE;
        }
        if self.is_lost() {
            return TextureHandle::NONE;
        }
        let texture = GpuTexture::from_image(
            &self.context.device,
            &self.context.queue,
            image,
            &self.layouts.texture,
            &self.sampler,
            Some("Body Texture"),
        );
        let handle = TextureHandle::from_raw(self.handles.next());
        self.textures.insert(handle, texture);
        handle
    }

    fn is_texture(&self, texture: TextureHandle) -> bool {
        !self.is_lost() && self.textures.contains_key(&texture)
    }

    fn delete_texture(&mut self, texture: TextureHandle) {
        if let Some(texture) = self.textures.remove(&texture) {
            texture.destroy();
        }
    }

    fn set_viewport(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 || (width, height) == (self.context.width, self.context.height) {
            return;
        }
        self.context.resize(width, height);
        self.depth_view = self
            .context
            .create_depth_texture()
            .create_view(&wgpu::TextureViewDescriptor::default());
    }

    fn render_state(&self) -> RenderState {
        self.state
    }

    fn set_render_state(&mut self, state: RenderState) {
        self.state = state;
    }

    fn begin_frame(&mut self, clear_color: [f32; 4]) {
        let [r, g, b, a] = clear_color.map(f64::from);
        self.clear_color = wgpu::Color { r, g, b, a };
        self.pending.clear();
        self.frame_open = true;
    }

    fn draw_indexed(&mut self, call: &DrawCall) {
        if !self.frame_open {
            log::warn!("draw_indexed outside of a frame");
            return;
        }
        if !self.is_drawable(call) {
            log::warn!("Skipping draw with dead or mismatched handles (program {})", call.program);
            return;
        }
        self.pending.push((*call, self.state));
    }

    fn end_frame(&mut self) -> Result<(), FrameError> {
        self.frame_open = false;
        if self.is_lost() {
            self.pending.clear();
            self.programs.clear();
            self.buffers.clear();
            self.textures.clear();
            return Err(FrameError::ContextLost);
        }
        self.present()
    }
}
