use std::collections::HashMap;
use std::num::NonZeroU64;
use std::ops::Range;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::coords::CanvasSize;
use crate::device::Gpu;
use crate::paint::Color;

use super::graphics::GraphicsDevice;
use super::reflect::{self, CompiledStage, MAT4_UNIFORM_SIZE, ProgramInterface};
use super::types::{
    AttributeLocation, BufferId, BufferKind, DepthFunc, DeviceStatus, PrimitiveTopology,
    ProgramId, ShaderStage, StageId, UniformLocation, VertexAttributeLayout,
};

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// wgpu backend of [`GraphicsDevice`].
///
/// Immediate-mode calls are recorded into a per-frame op list; [`encode`](Self::encode)
/// replays them into render passes on the frame's encoder. A `clear` ends the
/// current pass and starts a new one that clears on load.
///
/// Buffer uploads reach the queue immediately, so every draw of a frame sees
/// the last contents uploaded before the frame is submitted.
pub struct WgpuDevice {
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface_format: wgpu::TextureFormat,
    lost: Arc<AtomicBool>,
    canvas: CanvasSize,
    next_id: u32,

    stages: HashMap<StageId, GpuStage>,
    programs: HashMap<ProgramId, GpuProgram>,
    buffers: HashMap<BufferId, GpuBuffer>,
    pipelines: HashMap<PipelineKey, wgpu::RenderPipeline>,

    depth: Option<DepthTarget>,

    /// Uniform slot size; every matrix starts on this alignment.
    uniform_stride: u64,
    uniform_ubo: Option<wgpu::Buffer>,
    uniform_capacity: u64,

    state: BindState,
    ops: Vec<FrameOp>,
    uniform_bytes: Vec<u8>,
}

struct GpuStage {
    compiled: CompiledStage,
    module: wgpu::ShaderModule,
}

struct GpuProgram {
    interface: ProgramInterface,
    vertex_module: wgpu::ShaderModule,
    fragment_module: wgpu::ShaderModule,
    bind_group_layout: Option<wgpu::BindGroupLayout>,
    pipeline_layout: wgpu::PipelineLayout,
    /// Current uniform values, in `interface.uniforms` order.
    values: Vec<[f32; 16]>,
}

struct GpuBuffer {
    kind: BufferKind,
    buffer: Option<wgpu::Buffer>,
    capacity: u64,
    /// Bytes uploaded by the last `upload_buffer`.
    len: u64,
}

struct DepthTarget {
    size: CanvasSize,
    view: wgpu::TextureView,
}

#[derive(Default)]
struct BindState {
    program: Option<ProgramId>,
    depth: Option<DepthFunc>,
    attributes: HashMap<AttributeLocation, (BufferId, VertexAttributeLayout)>,
    index_buffer: Option<BufferId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct PipelineKey {
    program: ProgramId,
    topology: PrimitiveTopology,
    depth: Option<DepthFunc>,
    /// One vertex buffer slot per program attribute, in attribute order.
    vertex: Vec<VertexSlot>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
struct VertexSlot {
    location: u32,
    components: u8,
    stride: u32,
}

#[derive(Debug)]
enum FrameOp {
    Clear { color: wgpu::Color, depth: f32 },
    Draw(DrawOp),
}

#[derive(Debug)]
struct DrawOp {
    key: PipelineKey,
    /// (buffer, byte offset) per slot of `key.vertex`.
    vertex_buffers: Vec<(BufferId, u64)>,
    index_buffer: BufferId,
    indices: Range<u32>,
    /// Start of this draw's uniform block in the frame uniform buffer.
    uniform_offset: u64,
}

/// One render pass: how it loads its targets and what it draws.
struct PassPlan<'a> {
    color_load: wgpu::LoadOp<wgpu::Color>,
    depth_load: wgpu::LoadOp<f32>,
    draws: Vec<&'a DrawOp>,
}

impl PassPlan<'_> {
    fn cleared(color: wgpu::Color, depth: f32) -> Self {
        Self {
            color_load: wgpu::LoadOp::Clear(color),
            depth_load: wgpu::LoadOp::Clear(depth),
            draws: Vec::new(),
        }
    }
}

/// Groups recorded ops into passes. The first pass always clears since the
/// surface texture starts undefined.
fn plan_passes(ops: &[FrameOp]) -> Vec<PassPlan<'_>> {
    let mut passes = Vec::new();
    let mut current = PassPlan::cleared(wgpu::Color::BLACK, 1.0);

    for op in ops {
        match op {
            FrameOp::Clear { color, depth } => {
                if current.draws.is_empty() {
                    current.color_load = wgpu::LoadOp::Clear(*color);
                    current.depth_load = wgpu::LoadOp::Clear(*depth);
                } else {
                    passes.push(std::mem::replace(
                        &mut current,
                        PassPlan::cleared(*color, *depth),
                    ));
                }
            }
            FrameOp::Draw(draw) => current.draws.push(draw),
        }
    }

    passes.push(current);
    passes
}

fn float_format(components: u8) -> Option<wgpu::VertexFormat> {
    match components {
        1 => Some(wgpu::VertexFormat::Float32),
        2 => Some(wgpu::VertexFormat::Float32x2),
        3 => Some(wgpu::VertexFormat::Float32x3),
        4 => Some(wgpu::VertexFormat::Float32x4),
        _ => None,
    }
}

fn padded_size(len: u64) -> u64 {
    len.next_multiple_of(wgpu::COPY_BUFFER_ALIGNMENT)
        .max(wgpu::COPY_BUFFER_ALIGNMENT)
}

impl WgpuDevice {
    pub fn new(gpu: &Gpu<'_>) -> Self {
        let device = gpu.device().clone();
        let alignment = u64::from(device.limits().min_uniform_buffer_offset_alignment);

        Self {
            queue: gpu.queue().clone(),
            device,
            surface_format: gpu.surface_format(),
            lost: gpu.lost_flag(),
            canvas: CanvasSize::from(gpu.size()),
            next_id: 1,
            stages: HashMap::new(),
            programs: HashMap::new(),
            buffers: HashMap::new(),
            pipelines: HashMap::new(),
            depth: None,
            uniform_stride: MAT4_UNIFORM_SIZE.next_multiple_of(alignment.max(1)),
            uniform_ubo: None,
            uniform_capacity: 0,
            state: BindState::default(),
            ops: Vec::new(),
            uniform_bytes: Vec::new(),
        }
    }

    /// Tracks the drawable size; the depth target follows on the next `encode`.
    pub fn set_canvas_size(&mut self, canvas: CanvasSize) {
        self.canvas = canvas;
    }

    /// Drops the ops and uniforms recorded for a frame that will not be presented.
    pub fn discard_pending(&mut self) {
        self.ops.clear();
        self.uniform_bytes.clear();
    }

    /// Replays the recorded frame into `encoder`, drawing into `view`.
    pub fn encode(&mut self, encoder: &mut wgpu::CommandEncoder, view: &wgpu::TextureView) {
        let ops = std::mem::take(&mut self.ops);
        let uniform_bytes = std::mem::take(&mut self.uniform_bytes);

        self.ensure_depth_target();
        self.ensure_uniform_capacity(uniform_bytes.len() as u64);
        if let Some(ubo) = self.uniform_ubo.as_ref() {
            if !uniform_bytes.is_empty() {
                self.queue.write_buffer(ubo, 0, &uniform_bytes);
            }
        }

        for op in &ops {
            if let FrameOp::Draw(draw) = op {
                self.ensure_pipeline(&draw.key);
            }
        }

        let Some(depth) = self.depth.as_ref() else { return };

        for plan in plan_passes(&ops) {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("gridvis diagram pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: plan.color_load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &depth.view,
                    depth_ops: Some(wgpu::Operations {
                        load: plan.depth_load,
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            for draw in plan.draws {
                self.replay_draw(&mut rpass, draw);
            }
        }
    }

    fn replay_draw(&self, rpass: &mut wgpu::RenderPass<'_>, draw: &DrawOp) {
        let Some(pipeline) = self.pipelines.get(&draw.key) else { return };
        let Some(program) = self.programs.get(&draw.key.program) else { return };

        let Some(index) = self.live_buffer(draw.index_buffer) else {
            log::warn!("index buffer {:?} released before encode; draw skipped", draw.index_buffer);
            return;
        };

        let mut vertex = Vec::with_capacity(draw.vertex_buffers.len());
        for &(id, offset) in &draw.vertex_buffers {
            match self.buffers.get(&id) {
                Some(GpuBuffer { buffer: Some(buffer), len, .. }) if offset < *len => {
                    vertex.push((buffer, offset));
                }
                _ => {
                    log::warn!("vertex buffer {id:?} missing or too short; draw skipped");
                    return;
                }
            }
        }

        let bind_group = match (program.bind_group_layout.as_ref(), self.uniform_ubo.as_ref()) {
            (Some(layout), Some(ubo)) => Some(self.uniform_bind_group(layout, ubo, program, draw)),
            (Some(_), None) => return,
            (None, _) => None,
        };

        rpass.set_pipeline(pipeline);
        if let Some(bind_group) = bind_group.as_ref() {
            rpass.set_bind_group(0, bind_group, &[]);
        }
        for (slot, (buffer, offset)) in vertex.into_iter().enumerate() {
            rpass.set_vertex_buffer(slot as u32, buffer.slice(offset..));
        }
        rpass.set_index_buffer(index.slice(..), wgpu::IndexFormat::Uint16);
        rpass.draw_indexed(draw.indices.clone(), 0, 0..1);
    }

    fn uniform_bind_group(
        &self,
        layout: &wgpu::BindGroupLayout,
        ubo: &wgpu::Buffer,
        program: &GpuProgram,
        draw: &DrawOp,
    ) -> wgpu::BindGroup {
        let entries: Vec<wgpu::BindGroupEntry<'_>> = program
            .interface
            .uniforms
            .iter()
            .enumerate()
            .map(|(i, u)| wgpu::BindGroupEntry {
                binding: u.location.binding,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: ubo,
                    offset: draw.uniform_offset + i as u64 * self.uniform_stride,
                    size: NonZeroU64::new(MAT4_UNIFORM_SIZE),
                }),
            })
            .collect();

        self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("gridvis uniform bind group"),
            layout,
            entries: &entries,
        })
    }

    fn live_buffer(&self, id: BufferId) -> Option<&wgpu::Buffer> {
        self.buffers.get(&id).and_then(|b| b.buffer.as_ref())
    }

    fn ensure_depth_target(&mut self) {
        let size = CanvasSize::new(self.canvas.width.max(1), self.canvas.height.max(1));
        if self.depth.as_ref().is_some_and(|d| d.size == size) {
            return;
        }

        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("gridvis depth texture"),
            size: wgpu::Extent3d {
                width: size.width,
                height: size.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        log::debug!("depth target {}x{}", size.width, size.height);
        self.depth = Some(DepthTarget { size, view });
    }

    fn ensure_uniform_capacity(&mut self, required: u64) {
        if required == 0 || (required <= self.uniform_capacity && self.uniform_ubo.is_some()) {
            return;
        }

        let new_cap = required.next_power_of_two().max(self.uniform_stride * 8);
        self.uniform_ubo = Some(self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("gridvis uniform ubo"),
            size: new_cap,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        }));
        self.uniform_capacity = new_cap;
    }

    fn ensure_pipeline(&mut self, key: &PipelineKey) {
        if self.pipelines.contains_key(key) {
            return;
        }
        let Some(program) = self.programs.get(&key.program) else { return };

        let mut attributes = Vec::with_capacity(key.vertex.len());
        for slot in &key.vertex {
            let Some(format) = float_format(slot.components) else {
                log::warn!("unsupported component count {}; pipeline not built", slot.components);
                return;
            };
            attributes.push([wgpu::VertexAttribute {
                format,
                offset: 0,
                shader_location: slot.location,
            }]);
        }
        let buffers: Vec<wgpu::VertexBufferLayout<'_>> = key
            .vertex
            .iter()
            .zip(&attributes)
            .map(|(slot, attrs)| wgpu::VertexBufferLayout {
                array_stride: u64::from(slot.stride),
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: attrs,
            })
            .collect();

        let pipeline = self.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("gridvis flat pipeline"),
            layout: Some(&program.pipeline_layout),

            vertex: wgpu::VertexState {
                module: &program.vertex_module,
                entry_point: Some(program.interface.vertex_entry.as_str()),
                compilation_options: Default::default(),
                buffers: &buffers,
            },

            fragment: Some(wgpu::FragmentState {
                module: &program.fragment_module,
                entry_point: Some(program.interface.fragment_entry.as_str()),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: self.surface_format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),

            primitive: wgpu::PrimitiveState {
                topology: key.topology.into(),
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },

            // Disabled depth testing keeps the attachment but never rejects or writes.
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: key.depth.is_some(),
                depth_compare: key.depth.map_or(wgpu::CompareFunction::Always, Into::into),
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),

            multiview_mask: None,
            cache: None,
        });

        log::debug!(
            "pipeline built: {:?} {} depth {:?}",
            key.program,
            key.topology,
            key.depth
        );
        self.pipelines.insert(key.clone(), pipeline);
    }

    fn next_handle(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

impl GraphicsDevice for WgpuDevice {
    fn status(&self) -> DeviceStatus {
        if self.lost.load(Ordering::Acquire) {
            DeviceStatus::Unavailable
        } else {
            DeviceStatus::Ready
        }
    }

    fn canvas_size(&self) -> CanvasSize {
        self.canvas
    }

    fn compile_stage(&mut self, stage: ShaderStage, source: &str) -> Result<StageId, String> {
        let compiled = reflect::compile(stage, source)?;
        let module = self.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(match stage {
                ShaderStage::Vertex => "gridvis vertex stage",
                ShaderStage::Fragment => "gridvis fragment stage",
            }),
            source: wgpu::ShaderSource::Wgsl(compiled.source.as_str().into()),
        });

        let id = StageId(self.next_handle());
        self.stages.insert(id, GpuStage { compiled, module });
        Ok(id)
    }

    fn link_program(&mut self, vertex: StageId, fragment: StageId) -> Result<ProgramId, String> {
        let (Some(vs), Some(fs)) = (self.stages.get(&vertex), self.stages.get(&fragment)) else {
            return Err(format!("unknown shader stage {vertex:?} or {fragment:?}"));
        };
        let interface = reflect::link(&vs.compiled, &fs.compiled)?;

        let bind_group_layout = if interface.uniforms.is_empty() {
            None
        } else {
            let entries: Vec<wgpu::BindGroupLayoutEntry> = interface
                .uniforms
                .iter()
                .map(|u| wgpu::BindGroupLayoutEntry {
                    binding: u.location.binding,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: NonZeroU64::new(MAT4_UNIFORM_SIZE),
                    },
                    count: None,
                })
                .collect();
            Some(
                self.device
                    .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                        label: Some("gridvis uniform bgl"),
                        entries: &entries,
                    }),
            )
        };

        let layouts: Vec<&wgpu::BindGroupLayout> = bind_group_layout.iter().collect();
        let pipeline_layout = self
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("gridvis pipeline layout"),
                bind_group_layouts: &layouts,
                immediate_size: 0,
            });

        let program = GpuProgram {
            values: vec![[0.0; 16]; interface.uniforms.len()],
            vertex_module: vs.module.clone(),
            fragment_module: fs.module.clone(),
            interface,
            bind_group_layout,
            pipeline_layout,
        };

        let id = ProgramId(self.next_handle());
        self.programs.insert(id, program);
        Ok(id)
    }

    fn delete_stage(&mut self, stage: StageId) {
        self.stages.remove(&stage);
    }

    fn delete_program(&mut self, program: ProgramId) {
        self.programs.remove(&program);
        self.pipelines.retain(|key, _| key.program != program);
        if self.state.program == Some(program) {
            self.state.program = None;
        }
    }

    fn attribute_location(&self, program: ProgramId, name: &str) -> Option<AttributeLocation> {
        self.programs
            .get(&program)?
            .interface
            .attribute(name)
            .map(|a| a.location)
    }

    fn uniform_location(&self, program: ProgramId, name: &str) -> Option<UniformLocation> {
        self.programs
            .get(&program)?
            .interface
            .uniform(name)
            .map(|u| u.location)
    }

    fn create_buffer(&mut self, kind: BufferKind) -> BufferId {
        let id = BufferId(self.next_handle());
        self.buffers.insert(
            id,
            GpuBuffer {
                kind,
                buffer: None,
                capacity: 0,
                len: 0,
            },
        );
        id
    }

    fn upload_buffer(&mut self, buffer: BufferId, data: &[u8]) {
        let Some(slot) = self.buffers.get_mut(&buffer) else {
            log::warn!("upload to unknown buffer {buffer:?} ignored");
            return;
        };

        let padded = padded_size(data.len() as u64);
        if slot.buffer.is_none() || slot.capacity < padded {
            let usage = match slot.kind {
                BufferKind::Vertex => wgpu::BufferUsages::VERTEX,
                BufferKind::Index => wgpu::BufferUsages::INDEX,
            };
            slot.buffer = Some(self.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(match slot.kind {
                    BufferKind::Vertex => "gridvis vertex buffer",
                    BufferKind::Index => "gridvis index buffer",
                }),
                size: padded,
                usage: usage | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            }));
            slot.capacity = padded;
        }
        slot.len = data.len() as u64;

        let Some(gpu_buffer) = slot.buffer.as_ref() else { return };
        if data.is_empty() {
            return;
        }
        if data.len() as u64 == padded {
            self.queue.write_buffer(gpu_buffer, 0, data);
        } else {
            let mut bytes = data.to_vec();
            bytes.resize(padded as usize, 0);
            self.queue.write_buffer(gpu_buffer, 0, &bytes);
        }
    }

    fn delete_buffer(&mut self, buffer: BufferId) {
        self.buffers.remove(&buffer);
        self.state.attributes.retain(|_, (b, _)| *b != buffer);
        if self.state.index_buffer == Some(buffer) {
            self.state.index_buffer = None;
        }
    }

    fn clear(&mut self, color: Color, depth: f32) {
        self.ops.push(FrameOp::Clear {
            color: color.into(),
            depth,
        });
    }

    fn set_depth_test(&mut self, func: Option<DepthFunc>) {
        self.state.depth = func;
    }

    fn bind_vertex_attribute(
        &mut self,
        location: AttributeLocation,
        buffer: BufferId,
        layout: VertexAttributeLayout,
    ) {
        if self.buffers.get(&buffer).map(|b| b.kind) != Some(BufferKind::Vertex) {
            log::warn!("{buffer:?} is not a live vertex buffer; attribute binding ignored");
            return;
        }
        if layout.offset % 4 != 0 {
            log::warn!("attribute offset {} is not 4-byte aligned; binding ignored", layout.offset);
            return;
        }
        self.state.attributes.insert(location, (buffer, layout));
    }

    fn use_program(&mut self, program: ProgramId) {
        if !self.programs.contains_key(&program) {
            log::warn!("unknown program {program:?} ignored");
            return;
        }
        self.state.program = Some(program);
    }

    fn set_uniform_mat4(&mut self, location: UniformLocation, value: &[f32; 16]) {
        let Some(program) = self.state.program.and_then(|id| self.programs.get_mut(&id)) else {
            log::warn!("uniform {location:?} set with no active program; ignored");
            return;
        };
        match program
            .interface
            .uniforms
            .iter()
            .position(|u| u.location == location)
        {
            Some(i) => program.values[i] = *value,
            None => log::warn!("active program has no uniform at {location:?}"),
        }
    }

    fn bind_index_buffer(&mut self, buffer: BufferId) {
        if self.buffers.get(&buffer).map(|b| b.kind) != Some(BufferKind::Index) {
            log::warn!("{buffer:?} is not a live index buffer; binding ignored");
            return;
        }
        self.state.index_buffer = Some(buffer);
    }

    fn draw_indexed(&mut self, topology: PrimitiveTopology, count: u32, first_index: u32) {
        if count == 0 {
            return;
        }
        let Some(program_id) = self.state.program else {
            log::warn!("draw with no active program skipped");
            return;
        };
        let Some(program) = self.programs.get(&program_id) else { return };
        let Some(index_buffer) = self.state.index_buffer else {
            log::warn!("draw with no index buffer skipped");
            return;
        };

        let available = self.buffers.get(&index_buffer).map_or(0, |b| b.len / 2);
        if u64::from(first_index) + u64::from(count) > available {
            log::warn!(
                "draw of {count} indices from {first_index} exceeds index buffer ({available}); skipped"
            );
            return;
        }

        let mut vertex = Vec::with_capacity(program.interface.attributes.len());
        let mut vertex_buffers = Vec::with_capacity(program.interface.attributes.len());
        for attr in &program.interface.attributes {
            let Some(&(buffer, layout)) = self.state.attributes.get(&attr.location) else {
                log::warn!("attribute `{}` has no bound buffer; draw skipped", attr.name);
                return;
            };
            vertex.push(VertexSlot {
                location: attr.location.0,
                components: layout.components,
                stride: layout.effective_stride(),
            });
            vertex_buffers.push((buffer, u64::from(layout.offset)));
        }

        let uniform_offset = self.uniform_bytes.len() as u64;
        for value in &program.values {
            let start = self.uniform_bytes.len();
            self.uniform_bytes.extend_from_slice(bytemuck::cast_slice(value));
            self.uniform_bytes.resize(start + self.uniform_stride as usize, 0);
        }

        self.ops.push(FrameOp::Draw(DrawOp {
            key: PipelineKey {
                program: program_id,
                topology,
                depth: self.state.depth,
                vertex,
            },
            vertex_buffers,
            index_buffer,
            indices: first_index..first_index + count,
            uniform_offset,
        }));
    }
}
