//! wgpu implementation of [`RenderDevice`].
//!
//! Calls made while a frame is being built are recorded; [`WgpuDevice::encode`]
//! turns them into render passes at the end of the frame. Every
//! [`RenderDevice::clear_mask`] starts a new pass whose stencil attachment is
//! cleared while the color target is loaded. The stencil attachment is owned
//! here and follows the target size.

use std::collections::HashMap;

use bytemuck::{Pod, Zeroable};
use image::RgbaImage;
use wgpu::util::DeviceExt;

use crate::coords::{Rgb, Viewport};

use super::backend::{
    DeviceError, DrawCall, DrawMode, GeometryHandle, GeometryUpload, MaskPhase, RenderDevice,
    ShaderHandle, TextureHandle, TexturedDrawCall,
};
use super::vertex::{TexturedVertex, Vertex, VertexKind};

const STENCIL_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Stencil8;
const MASK_REFERENCE: u32 = 1;

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct FlagUniform {
    time: f32,
    half_width: f32,
    amplitude: f32,
    _pad: f32,
}

struct GpuGeometry {
    kind: VertexKind,
    vbo: wgpu::Buffer,
    ibo: Option<wgpu::Buffer>,
}

struct GpuTexture {
    _texture: wgpu::Texture,
    bind_group: wgpu::BindGroup,
}

struct FlagPipelines {
    plain: wgpu::RenderPipeline,
    mark: wgpu::RenderPipeline,
    exclude: wgpu::RenderPipeline,
}

impl FlagPipelines {
    fn get(&self, phase: MaskPhase) -> &wgpu::RenderPipeline {
        match phase {
            MaskPhase::Plain => &self.plain,
            MaskPhase::Mark => &self.mark,
            MaskPhase::Exclude => &self.exclude,
        }
    }
}

// Buffers and pipelines are cloned into the op so that releasing a handle
// mid-frame does not invalidate draws already recorded.
struct ColoredOp {
    phase: MaskPhase,
    vbo: wgpu::Buffer,
    ibo: Option<wgpu::Buffer>,
    count: u32,
    viewport: Viewport,
    uniform_slot: u32,
}

struct TexturedOp {
    pipeline: wgpu::RenderPipeline,
    bind_group: wgpu::BindGroup,
    vbo: wgpu::Buffer,
    ibo: Option<wgpu::Buffer>,
    count: u32,
    viewport: Viewport,
}

enum Op {
    Colored(ColoredOp),
    Textured(TexturedOp),
    ClearMask,
}

struct StencilTarget {
    size: (u32, u32),
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
}

/// Records draws for one frame and encodes them with stencil masking.
pub struct WgpuDevice {
    device: wgpu::Device,
    queue: wgpu::Queue,
    format: wgpu::TextureFormat,

    next_id: u32,
    geometry: HashMap<u32, GpuGeometry>,
    shaders: HashMap<u32, wgpu::RenderPipeline>,
    textures: HashMap<u32, GpuTexture>,

    phase: MaskPhase,
    ops: Vec<Op>,
    uniforms: Vec<FlagUniform>,

    flag_pipelines: Option<FlagPipelines>,
    uniform_bgl: Option<wgpu::BindGroupLayout>,
    uniform_buffer: Option<wgpu::Buffer>,
    uniform_bind_group: Option<wgpu::BindGroup>,
    uniform_capacity: usize,
    uniform_stride: u64,

    textured_bgl: Option<wgpu::BindGroupLayout>,
    sampler: Option<wgpu::Sampler>,

    stencil: Option<StencilTarget>,
}

impl WgpuDevice {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue, format: wgpu::TextureFormat) -> Self {
        let align = device.limits().min_uniform_buffer_offset_alignment.max(1) as u64;
        let size = std::mem::size_of::<FlagUniform>() as u64;
        let uniform_stride = size.div_ceil(align) * align;

        Self {
            device: device.clone(),
            queue: queue.clone(),
            format,
            next_id: 1,
            geometry: HashMap::new(),
            shaders: HashMap::new(),
            textures: HashMap::new(),
            phase: MaskPhase::Plain,
            ops: Vec::new(),
            uniforms: Vec::new(),
            flag_pipelines: None,
            uniform_bgl: None,
            uniform_buffer: None,
            uniform_bind_group: None,
            uniform_capacity: 0,
            uniform_stride,
            textured_bgl: None,
            sampler: None,
            stencil: None,
        }
    }

    /// Surface format the pipelines are built for.
    pub fn format(&self) -> wgpu::TextureFormat {
        self.format
    }

    #[inline]
    pub fn live_geometry(&self) -> usize {
        self.geometry.len()
    }

    /// Drops anything recorded but not encoded and resets the mask phase.
    pub fn begin_frame(&mut self) {
        self.ops.clear();
        self.uniforms.clear();
        self.phase = MaskPhase::Plain;
    }

    /// Encodes the recorded frame into `encoder`, targeting `view`.
    ///
    /// The first pass clears the color target to `clear`; every pass clears
    /// the stencil attachment.
    pub fn encode(
        &mut self,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        size: (u32, u32),
        clear: Rgb,
    ) {
        let size = (size.0.max(1), size.1.max(1));
        self.ensure_flag_pipelines();
        self.ensure_stencil(size);
        self.write_uniforms();

        let ops = std::mem::take(&mut self.ops);
        self.uniforms.clear();
        self.phase = MaskPhase::Plain;

        let Some(pipelines) = self.flag_pipelines.as_ref() else { return };
        let Some(stencil) = self.stencil.as_ref() else { return };
        let uniform_bind_group = self.uniform_bind_group.as_ref();

        for (pass_index, segment) in ops.split(|op| matches!(op, Op::ClearMask)).enumerate() {
            let load = if pass_index == 0 {
                wgpu::LoadOp::Clear(wgpu::Color {
                    r: clear.r as f64,
                    g: clear.g as f64,
                    b: clear.b as f64,
                    a: 1.0,
                })
            } else {
                wgpu::LoadOp::Load
            };

            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("vexillo frame pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &stencil.view,
                    depth_ops: None,
                    stencil_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(0),
                        store: wgpu::StoreOp::Store,
                    }),
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });
            rpass.set_stencil_reference(MASK_REFERENCE);

            for op in segment {
                match op {
                    Op::Colored(d) => {
                        let Some(bind_group) = uniform_bind_group else { continue };
                        let Some(vp) = d.viewport.clamped_to(size.0, size.1) else { continue };
                        let offset = (d.uniform_slot as u64 * self.uniform_stride) as u32;

                        rpass.set_pipeline(pipelines.get(d.phase));
                        rpass.set_bind_group(0, bind_group, &[offset]);
                        set_viewport(&mut rpass, vp);
                        rpass.set_vertex_buffer(0, d.vbo.slice(..));
                        match &d.ibo {
                            Some(ibo) => {
                                rpass.set_index_buffer(ibo.slice(..), wgpu::IndexFormat::Uint32);
                                rpass.draw_indexed(0..d.count, 0, 0..1);
                            }
                            None => rpass.draw(0..d.count, 0..1),
                        }
                    }
                    Op::Textured(d) => {
                        let Some(vp) = d.viewport.clamped_to(size.0, size.1) else { continue };

                        rpass.set_pipeline(&d.pipeline);
                        rpass.set_bind_group(0, &d.bind_group, &[]);
                        set_viewport(&mut rpass, vp);
                        rpass.set_vertex_buffer(0, d.vbo.slice(..));
                        match &d.ibo {
                            Some(ibo) => {
                                rpass.set_index_buffer(ibo.slice(..), wgpu::IndexFormat::Uint32);
                                rpass.draw_indexed(0..d.count, 0, 0..1);
                            }
                            None => rpass.draw(0..d.count, 0..1),
                        }
                    }
                    Op::ClearMask => {}
                }
            }
        }
    }

    fn alloc_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1).max(1);
        id
    }

    fn ensure_uniform_layout(&mut self) {
        if self.uniform_bgl.is_some() {
            return;
        }
        self.uniform_bgl = Some(self.device.create_bind_group_layout(
            &wgpu::BindGroupLayoutDescriptor {
                label: Some("vexillo flag uniform bgl"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: true,
                        min_binding_size: wgpu::BufferSize::new(
                            std::mem::size_of::<FlagUniform>() as u64,
                        ),
                    },
                    count: None,
                }],
            },
        ));
    }

    fn ensure_flag_pipelines(&mut self) {
        if self.flag_pipelines.is_some() {
            return;
        }
        self.ensure_uniform_layout();
        let Some(bgl) = self.uniform_bgl.as_ref() else { return };

        let shader = self.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("vexillo flag shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/flag.wgsl").into()),
        });

        let layout = self.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("vexillo flag pipeline layout"),
            bind_group_layouts: &[bgl],
            immediate_size: 0,
        });

        let build = |label: &str, phase: MaskPhase| {
            let (stencil, color_writes) = match phase {
                MaskPhase::Plain => (stencil_state(wgpu::CompareFunction::Always, wgpu::StencilOperation::Keep, 0), wgpu::ColorWrites::ALL),
                MaskPhase::Mark => (stencil_state(wgpu::CompareFunction::Always, wgpu::StencilOperation::Replace, 0xFF), wgpu::ColorWrites::empty()),
                MaskPhase::Exclude => (stencil_state(wgpu::CompareFunction::NotEqual, wgpu::StencilOperation::Keep, 0), wgpu::ColorWrites::ALL),
            };
            self.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(&layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some("vs_main"),
                    compilation_options: Default::default(),
                    buffers: &[Vertex::layout()],
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some("fs_main"),
                    compilation_options: Default::default(),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: self.format,
                        blend: Some(wgpu::BlendState::REPLACE),
                        write_mask: color_writes,
                    })],
                }),
                primitive: triangle_list(),
                depth_stencil: Some(stencil),
                multisample: wgpu::MultisampleState::default(),
                multiview_mask: None,
                cache: None,
            })
        };

        self.flag_pipelines = Some(FlagPipelines {
            plain: build("vexillo flag pipeline (plain)", MaskPhase::Plain),
            mark: build("vexillo flag pipeline (mark)", MaskPhase::Mark),
            exclude: build("vexillo flag pipeline (exclude)", MaskPhase::Exclude),
        });
    }

    fn ensure_uniform_capacity(&mut self, required: usize) {
        if required <= self.uniform_capacity && self.uniform_buffer.is_some() {
            return;
        }
        self.ensure_uniform_layout();
        let Some(bgl) = self.uniform_bgl.as_ref() else { return };

        let new_cap = required.next_power_of_two().max(64);
        let buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("vexillo flag uniform buffer"),
            size: new_cap as u64 * self.uniform_stride,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("vexillo flag uniform bind group"),
            layout: bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(std::mem::size_of::<FlagUniform>() as u64),
                }),
            }],
        });

        self.uniform_buffer = Some(buffer);
        self.uniform_bind_group = Some(bind_group);
        self.uniform_capacity = new_cap;
    }

    fn write_uniforms(&mut self) {
        if self.uniforms.is_empty() {
            return;
        }
        self.ensure_uniform_capacity(self.uniforms.len());
        let Some(buffer) = self.uniform_buffer.as_ref() else { return };

        let stride = self.uniform_stride as usize;
        let mut bytes = vec![0u8; stride * self.uniforms.len()];
        for (slot, u) in self.uniforms.iter().enumerate() {
            let at = slot * stride;
            bytes[at..at + std::mem::size_of::<FlagUniform>()].copy_from_slice(bytemuck::bytes_of(u));
        }
        self.queue.write_buffer(buffer, 0, &bytes);
    }

    fn ensure_stencil(&mut self, size: (u32, u32)) {
        if self.stencil.as_ref().is_some_and(|s| s.size == size) {
            return;
        }
        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("vexillo stencil"),
            size: wgpu::Extent3d {
                width: size.0,
                height: size.1,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: STENCIL_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        self.stencil = Some(StencilTarget { size, _texture: texture, view });
    }

    fn ensure_textured_layout(&mut self) {
        if self.textured_bgl.is_none() {
            self.textured_bgl = Some(self.device.create_bind_group_layout(
                &wgpu::BindGroupLayoutDescriptor {
                    label: Some("vexillo textured bgl"),
                    entries: &[
                        wgpu::BindGroupLayoutEntry {
                            binding: 0,
                            visibility: wgpu::ShaderStages::FRAGMENT,
                            ty: wgpu::BindingType::Texture {
                                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                                view_dimension: wgpu::TextureViewDimension::D2,
                                multisampled: false,
                            },
                            count: None,
                        },
                        wgpu::BindGroupLayoutEntry {
                            binding: 1,
                            visibility: wgpu::ShaderStages::FRAGMENT,
                            ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                            count: None,
                        },
                    ],
                },
            ));
        }
        if self.sampler.is_none() {
            self.sampler = Some(self.device.create_sampler(&wgpu::SamplerDescriptor {
                label: Some("vexillo textured sampler"),
                address_mode_u: wgpu::AddressMode::ClampToEdge,
                address_mode_v: wgpu::AddressMode::ClampToEdge,
                address_mode_w: wgpu::AddressMode::ClampToEdge,
                mag_filter: wgpu::FilterMode::Linear,
                min_filter: wgpu::FilterMode::Linear,
                mipmap_filter: wgpu::MipmapFilterMode::Nearest,
                ..Default::default()
            }));
        }
    }

    fn buffers_for(&self, handle: GeometryHandle, kind: VertexKind) -> Option<(wgpu::Buffer, Option<wgpu::Buffer>)> {
        let g = self.geometry.get(&handle.0)?;
        if g.kind != kind {
            log::warn!("wgpu device: geometry {handle:?} has kind {:?}, expected {kind:?}", g.kind);
            return None;
        }
        Some((g.vbo.clone(), g.ibo.clone()))
    }
}

impl RenderDevice for WgpuDevice {
    fn upload_geometry(&mut self, upload: GeometryUpload<'_>) -> Result<GeometryHandle, DeviceError> {
        let stride = match upload.kind {
            VertexKind::Colored => std::mem::size_of::<Vertex>(),
            VertexKind::Textured => std::mem::size_of::<TexturedVertex>(),
        };
        if upload.vertex_bytes.len() != stride * upload.vertex_count as usize {
            return Err(DeviceError::Geometry {
                label: upload.label.to_string(),
                message: format!(
                    "expected {} bytes for {} vertices, got {}",
                    stride * upload.vertex_count as usize,
                    upload.vertex_count,
                    upload.vertex_bytes.len()
                ),
            });
        }

        let vbo = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(upload.label),
            contents: upload.vertex_bytes,
            usage: wgpu::BufferUsages::VERTEX,
        });
        let ibo = (!upload.indices.is_empty()).then(|| {
            self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(upload.label),
                contents: bytemuck::cast_slice(upload.indices),
                usage: wgpu::BufferUsages::INDEX,
            })
        });

        let id = self.alloc_id();
        self.geometry.insert(id, GpuGeometry { kind: upload.kind, vbo, ibo });
        Ok(GeometryHandle(id))
    }

    fn release_geometry(&mut self, handle: GeometryHandle) {
        self.geometry.remove(&handle.0);
    }

    fn draw(&mut self, call: DrawCall) {
        let Some((vbo, ibo)) = self.buffers_for(call.geometry, VertexKind::Colored) else {
            log::warn!("wgpu device: draw with unknown geometry {:?}", call.geometry);
            return;
        };
        let ibo = match call.mode {
            DrawMode::Indexed => ibo,
            DrawMode::NonIndexed => None,
        };

        let uniform_slot = self.uniforms.len() as u32;
        self.uniforms.push(FlagUniform {
            time: call.params.time,
            half_width: call.params.half_width,
            amplitude: call.params.amplitude,
            _pad: 0.0,
        });
        self.ops.push(Op::Colored(ColoredOp {
            phase: self.phase,
            vbo,
            ibo,
            count: call.count,
            viewport: call.params.viewport,
            uniform_slot,
        }));
    }

    fn set_mask_phase(&mut self, phase: MaskPhase) {
        self.phase = phase;
    }

    fn mask_phase(&self) -> MaskPhase {
        self.phase
    }

    fn clear_mask(&mut self) {
        // Consecutive clears collapse into one pass break.
        if !matches!(self.ops.last(), Some(Op::ClearMask)) {
            self.ops.push(Op::ClearMask);
        }
    }

    fn compile_shader(&mut self, label: &str, wgsl: &str) -> Result<ShaderHandle, DeviceError> {
        self.ensure_textured_layout();
        let Some(bgl) = self.textured_bgl.as_ref() else {
            return Err(DeviceError::Shader {
                label: label.to_string(),
                message: "textured bind group layout unavailable".to_string(),
            });
        };

        // Validation errors land in this scope instead of the uncaptured handler.
        let scope = self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let module = self.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(label),
            source: wgpu::ShaderSource::Wgsl(wgsl.into()),
        });
        let layout = self.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(label),
            bind_group_layouts: &[bgl],
            immediate_size: 0,
        });
        let pipeline = self.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(label),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: &module,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[TexturedVertex::layout()],
            },
            fragment: Some(wgpu::FragmentState {
                module: &module,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: self.format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: triangle_list(),
            depth_stencil: Some(stencil_state(
                wgpu::CompareFunction::Always,
                wgpu::StencilOperation::Keep,
                0,
            )),
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        if let Some(err) = pollster::block_on(scope.pop()) {
            return Err(DeviceError::Shader {
                label: label.to_string(),
                message: err.to_string(),
            });
        }

        let id = self.alloc_id();
        self.shaders.insert(id, pipeline);
        Ok(ShaderHandle(id))
    }

    fn release_shader(&mut self, handle: ShaderHandle) {
        self.shaders.remove(&handle.0);
    }

    fn upload_texture(&mut self, label: &str, image: &RgbaImage) -> Result<TextureHandle, DeviceError> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(DeviceError::Texture {
                label: label.to_string(),
                message: "zero-sized image".to_string(),
            });
        }
        let max = self.device.limits().max_texture_dimension_2d;
        if width > max || height > max {
            return Err(DeviceError::Texture {
                label: label.to_string(),
                message: format!("{width}x{height} exceeds the {max} texel limit"),
            });
        }
        self.ensure_textured_layout();
        let (Some(bgl), Some(sampler)) = (self.textured_bgl.as_ref(), self.sampler.as_ref()) else {
            return Err(DeviceError::Texture {
                label: label.to_string(),
                message: "textured bind group layout unavailable".to_string(),
            });
        };

        let size = wgpu::Extent3d { width, height, depth_or_array_layers: 1 };
        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        self.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            image.as_raw(),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout: bgl,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        });

        let id = self.alloc_id();
        self.textures.insert(id, GpuTexture { _texture: texture, bind_group });
        Ok(TextureHandle(id))
    }

    fn release_texture(&mut self, handle: TextureHandle) {
        self.textures.remove(&handle.0);
    }

    fn draw_textured(&mut self, call: TexturedDrawCall) {
        let Some(pipeline) = self.shaders.get(&call.shader.0).cloned() else {
            log::warn!("wgpu device: textured draw with unknown shader {:?}", call.shader);
            return;
        };
        let Some(bind_group) = self.textures.get(&call.texture.0).map(|t| t.bind_group.clone()) else {
            log::warn!("wgpu device: textured draw with unknown texture {:?}", call.texture);
            return;
        };
        let Some((vbo, ibo)) = self.buffers_for(call.geometry, VertexKind::Textured) else { return };
        let ibo = match call.mode {
            DrawMode::Indexed => ibo,
            DrawMode::NonIndexed => None,
        };

        self.ops.push(Op::Textured(TexturedOp {
            pipeline,
            bind_group,
            vbo,
            ibo,
            count: call.count,
            viewport: call.viewport,
        }));
    }
}

fn set_viewport(rpass: &mut wgpu::RenderPass<'_>, vp: Viewport) {
    rpass.set_viewport(
        vp.x as f32,
        vp.y as f32,
        vp.width as f32,
        vp.height as f32,
        0.0,
        1.0,
    );
}

fn triangle_list() -> wgpu::PrimitiveState {
    wgpu::PrimitiveState {
        topology: wgpu::PrimitiveTopology::TriangleList,
        strip_index_format: None,
        front_face: wgpu::FrontFace::Ccw,
        cull_mode: None,
        polygon_mode: wgpu::PolygonMode::Fill,
        unclipped_depth: false,
        conservative: false,
    }
}

fn stencil_state(
    compare: wgpu::CompareFunction,
    pass_op: wgpu::StencilOperation,
    write_mask: u32,
) -> wgpu::DepthStencilState {
    let face = wgpu::StencilFaceState {
        compare,
        fail_op: wgpu::StencilOperation::Keep,
        depth_fail_op: wgpu::StencilOperation::Keep,
        pass_op,
    };
    wgpu::DepthStencilState {
        format: STENCIL_FORMAT,
        depth_write_enabled: false,
        depth_compare: wgpu::CompareFunction::Always,
        stencil: wgpu::StencilState {
            front: face,
            back: face,
            read_mask: 0xFF,
            write_mask,
        },
        bias: wgpu::DepthBiasState::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::TEXTURED_SHADER;

    /// Headless device, `None` on machines without a usable adapter.
    fn headless() -> Option<WgpuDevice> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions::default())).ok()?;
        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor::default())).ok()?;
        Some(WgpuDevice::new(&device, &queue, wgpu::TextureFormat::Rgba8Unorm))
    }

    #[test]
    fn invalid_wgsl_becomes_a_shader_error() {
        let Some(mut device) = headless() else {
            eprintln!("no adapter, skipping");
            return;
        };
        let err = device.compile_shader("broken", "fn vs_main( {").unwrap_err();
        assert!(matches!(err, DeviceError::Shader { .. }), "{err}");
        assert!(device.shaders.is_empty());

        // the device is still usable afterwards
        let ok = device.compile_shader("textured", TEXTURED_SHADER).unwrap();
        device.release_shader(ok);
        assert!(device.shaders.is_empty());
    }

    #[test]
    fn oversized_texture_is_refused() {
        let Some(mut device) = headless() else {
            eprintln!("no adapter, skipping");
            return;
        };
        let side = device.device.limits().max_texture_dimension_2d + 1;
        let image = RgbaImage::new(side, 1);
        let err = device.upload_texture("wide", &image).unwrap_err();
        assert!(matches!(err, DeviceError::Texture { .. }), "{err}");
        assert!(device.textures.is_empty());
    }
}
