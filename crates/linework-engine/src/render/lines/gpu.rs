use std::collections::HashMap;
use std::num::NonZeroU64;

use bytemuck::{Pod, Zeroable};

use crate::render::RenderCtx;

use super::device::{BlendFactor, BlendState, LineDevice, RenderState};
use super::effect::{EffectParams, LineEffect};
use super::error::DeviceError;
use super::vertex::{LineVertex, VertexLayout};

/// The wgpu effect has a single pass.
const PASS_COUNT: usize = 1;

/// Smallest vertex buffer allocated for a flush slot.
const MIN_SLOT_VERTICES: usize = 64;

// ── blend ─────────────────────────────────────────────────────────────────

fn wgpu_blend_factor(factor: BlendFactor) -> wgpu::BlendFactor {
    match factor {
        BlendFactor::Zero => wgpu::BlendFactor::Zero,
        BlendFactor::One => wgpu::BlendFactor::One,
        BlendFactor::SrcAlpha => wgpu::BlendFactor::SrcAlpha,
        BlendFactor::OneMinusSrcAlpha => wgpu::BlendFactor::OneMinusSrcAlpha,
    }
}

fn wgpu_blend(blend: BlendState) -> wgpu::BlendState {
    let component = wgpu::BlendComponent {
        src_factor: wgpu_blend_factor(blend.src_factor),
        dst_factor: wgpu_blend_factor(blend.dst_factor),
        operation: wgpu::BlendOperation::Add,
    };
    wgpu::BlendState {
        color: component,
        alpha: component,
    }
}

// ── uniform ───────────────────────────────────────────────────────────────

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct LineUniform {
    world_view_proj: [[f32; 4]; 4], // column-major, like WGSL
    vertex_color: u32,
    _pad: [u32; 3], // 16-byte alignment
}

impl LineUniform {
    fn from_params(params: &EffectParams) -> Self {
        Self {
            world_view_proj: params.world_view_projection().into(),
            vertex_color: params.vertex_color_enabled as u32,
            _pad: [0; 3],
        }
    }
}

fn uniform_min_binding_size() -> Result<NonZeroU64, DeviceError> {
    NonZeroU64::new(std::mem::size_of::<LineUniform>() as u64)
        .ok_or_else(|| DeviceError::Backend("line uniform has zero size".into()))
}

// ── flush slots ───────────────────────────────────────────────────────────

/// GPU storage for one flush of a frame.
///
/// `queue.write_buffer` calls all land before the frame's command buffer is
/// submitted, so every flush in a frame needs its own buffers.
struct FlushSlot {
    vbo: wgpu::Buffer,
    vbo_capacity: usize, // vertices
    ubo: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

impl FlushSlot {
    fn new(device: &wgpu::Device, bgl: &wgpu::BindGroupLayout, vertices: usize) -> Self {
        let ubo = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("linework line ubo"),
            size: std::mem::size_of::<LineUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("linework line bind group"),
            layout: bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: ubo.as_entire_binding(),
            }],
        });

        Self {
            vbo: create_vbo(device, vertices),
            vbo_capacity: vertices,
            ubo,
            bind_group,
        }
    }
}

fn create_vbo(device: &wgpu::Device, vertices: usize) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("linework line vbo"),
        size: (vertices * std::mem::size_of::<LineVertex>()) as u64,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

// ── effect ────────────────────────────────────────────────────────────────

/// Color-only line effect backed by a WGSL shader.
///
/// Owns the shader, its pipelines (one per blend state) and the per-flush
/// buffers. Dropping it frees all of them.
pub struct WgpuEffect {
    params: EffectParams,
    uniform: LineUniform,

    format: wgpu::TextureFormat,
    shader: wgpu::ShaderModule,
    bind_group_layout: wgpu::BindGroupLayout,
    pipeline_layout: wgpu::PipelineLayout,
    pipelines: HashMap<BlendState, wgpu::RenderPipeline>,

    slots: Vec<FlushSlot>,
}

impl WgpuEffect {
    fn new(device: &wgpu::Device, format: wgpu::TextureFormat) -> Result<Self, DeviceError> {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("linework line shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/line.wgsl").into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("linework line bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: Some(uniform_min_binding_size()?),
                },
                count: None,
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("linework line pipeline layout"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let params = EffectParams::default();
        Ok(Self {
            uniform: LineUniform::from_params(&params),
            params,
            format,
            shader,
            bind_group_layout,
            pipeline_layout,
            pipelines: HashMap::new(),
            slots: Vec::new(),
        })
    }

    fn ensure_pipeline(&mut self, device: &wgpu::Device, state: &RenderState<'_>) {
        if self.pipelines.contains_key(&state.blend) {
            return;
        }

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("linework line pipeline"),
            layout: Some(&self.pipeline_layout),

            vertex: wgpu::VertexState {
                module: &self.shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[state.layout.to_wgpu()],
            },

            fragment: Some(wgpu::FragmentState {
                module: &self.shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: self.format,
                    blend: Some(wgpu_blend(state.blend)),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),

            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::LineList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },

            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        self.pipelines.insert(state.blend, pipeline);
    }

    /// Uploads vertices and the packed uniform into slot `index`.
    fn upload(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        index: usize,
        vertices: &[LineVertex],
    ) {
        let wanted = vertices.len().next_power_of_two().max(MIN_SLOT_VERTICES);
        while self.slots.len() <= index {
            self.slots
                .push(FlushSlot::new(device, &self.bind_group_layout, wanted));
        }

        let slot = &mut self.slots[index];
        if slot.vbo_capacity < vertices.len() {
            slot.vbo = create_vbo(device, wanted);
            slot.vbo_capacity = wanted;
        }

        queue.write_buffer(&slot.vbo, 0, bytemuck::cast_slice(vertices));
        queue.write_buffer(&slot.ubo, 0, bytemuck::bytes_of(&self.uniform));
    }
}

impl LineEffect for WgpuEffect {
    fn params(&self) -> &EffectParams {
        &self.params
    }

    fn params_mut(&mut self) -> &mut EffectParams {
        &mut self.params
    }

    fn pass_count(&self) -> usize {
        PASS_COUNT
    }

    fn begin(&mut self) {
        if self.params.texture_enabled || self.params.lighting_enabled {
            log::trace!("WgpuEffect: texturing/lighting requested but not supported; ignored");
        }
        self.uniform = LineUniform::from_params(&self.params);
    }
}

// ── device ────────────────────────────────────────────────────────────────

/// [`LineDevice`] drawing into a wgpu texture view.
///
/// Per frame: [`begin_frame`](Self::begin_frame) with the target view, run
/// line batches, then submit the buffer from
/// [`finish_frame`](Self::finish_frame) after the frame's clear pass.
pub struct WgpuLineDevice {
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface_format: wgpu::TextureFormat,

    target: Option<wgpu::TextureView>,
    encoder: Option<wgpu::CommandEncoder>,
    flush_index: usize,
}

impl WgpuLineDevice {
    pub fn new(ctx: &RenderCtx<'_>) -> Self {
        Self {
            device: ctx.device.clone(),
            queue: ctx.queue.clone(),
            surface_format: ctx.target_format,
            target: None,
            encoder: None,
            flush_index: 0,
        }
    }

    #[inline]
    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.surface_format
    }

    /// Binds `view` as the target of subsequent draws.
    ///
    /// Any commands recorded since the last `finish_frame` are dropped.
    pub fn begin_frame(&mut self, view: &wgpu::TextureView) {
        if self.encoder.take().is_some() {
            log::warn!("WgpuLineDevice: unfinished frame discarded");
        }
        self.target = Some(view.clone());
        self.flush_index = 0;
    }

    /// Unbinds the target and returns the recorded commands, if any draw happened.
    pub fn finish_frame(&mut self) -> Option<wgpu::CommandBuffer> {
        self.target = None;
        self.encoder.take().map(|encoder| encoder.finish())
    }
}

impl LineDevice for WgpuLineDevice {
    type Effect = WgpuEffect;

    fn create_effect(&mut self, layout: &VertexLayout) -> Result<WgpuEffect, DeviceError> {
        if layout.stride() as usize != std::mem::size_of::<LineVertex>() {
            return Err(DeviceError::Backend(format!(
                "vertex stride {} does not match LineVertex",
                layout.stride()
            )));
        }
        WgpuEffect::new(&self.device, self.surface_format)
    }

    fn draw_line_list(
        &mut self,
        effect: &mut WgpuEffect,
        pass: usize,
        state: &RenderState<'_>,
        vertices: &[LineVertex],
        primitive_count: usize,
    ) -> Result<(), DeviceError> {
        let count = effect.pass_count();
        if pass >= count {
            return Err(DeviceError::InvalidPass { pass, count });
        }
        let Some(view) = self.target.as_ref() else {
            return Err(DeviceError::NoTarget);
        };

        let vertex_count = (primitive_count * 2).min(vertices.len() & !1);
        if vertex_count == 0 {
            return Ok(());
        }
        let vertices = &vertices[..vertex_count];

        // Mutating methods must happen before borrowing pipeline/slot immutably.
        effect.ensure_pipeline(&self.device, state);
        if pass == 0 {
            effect.upload(&self.device, &self.queue, self.flush_index, vertices);
        }

        let Some(pipeline) = effect.pipelines.get(&state.blend) else {
            return Err(DeviceError::Backend("line pipeline missing".into()));
        };
        let Some(slot) = effect.slots.get(self.flush_index) else {
            return Err(DeviceError::Backend("flush slot missing".into()));
        };

        let encoder = self.encoder.get_or_insert_with(|| {
            self.device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("linework line encoder"),
                })
        });

        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("linework line pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            let bytes = (vertex_count * std::mem::size_of::<LineVertex>()) as u64;
            rpass.set_pipeline(pipeline);
            rpass.set_bind_group(0, &slot.bind_group, &[]);
            rpass.set_vertex_buffer(0, slot.vbo.slice(..bytes));
            rpass.draw(0..vertex_count as u32, 0..1);
        }

        if pass + 1 == count {
            self.flush_index += 1;
        }
        Ok(())
    }
}
