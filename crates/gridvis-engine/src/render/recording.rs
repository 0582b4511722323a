use std::collections::HashMap;

use crate::coords::CanvasSize;
use crate::paint::Color;

use super::graphics::GraphicsDevice;
use super::reflect::{self, CompiledStage, ProgramInterface};
use super::types::{
    AttributeLocation, BufferId, BufferKind, DepthFunc, DeviceStatus, PrimitiveTopology,
    ProgramId, ShaderStage, StageId, UniformLocation, VertexAttributeLayout,
};

/// One call made against a [`RecordingDevice`].
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceCommand {
    CreateBuffer { buffer: BufferId, kind: BufferKind },
    UploadBuffer { buffer: BufferId, len: usize },
    DeleteBuffer(BufferId),
    Clear { color: Color, depth: f32 },
    SetDepthTest(Option<DepthFunc>),
    BindVertexAttribute {
        location: AttributeLocation,
        buffer: BufferId,
        layout: VertexAttributeLayout,
    },
    UseProgram(ProgramId),
    SetUniformMat4 { location: UniformLocation, value: [f32; 16] },
    BindIndexBuffer(BufferId),
    DrawIndexed {
        topology: PrimitiveTopology,
        count: u32,
        first_index: u32,
    },
}

/// A draw-indexed call as seen by the device.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct DrawCall {
    pub topology: PrimitiveTopology,
    pub count: u32,
    pub first_index: u32,
}

#[derive(Debug)]
struct RecordedBuffer {
    kind: BufferKind,
    data: Vec<u8>,
}

/// Headless device: keeps buffer contents in memory and records every call.
///
/// Shaders go through the same naga front-end as the wgpu backend, so compile
/// and link results match what a GPU run would report.
#[derive(Debug)]
pub struct RecordingDevice {
    status: DeviceStatus,
    canvas: CanvasSize,
    next_id: u32,

    stages: HashMap<StageId, CompiledStage>,
    programs: HashMap<ProgramId, ProgramInterface>,
    buffers: HashMap<BufferId, RecordedBuffer>,

    active_program: Option<ProgramId>,
    commands: Vec<DeviceCommand>,
}

impl RecordingDevice {
    pub fn new(canvas: CanvasSize) -> Self {
        Self {
            status: DeviceStatus::Ready,
            canvas,
            next_id: 1,
            stages: HashMap::new(),
            programs: HashMap::new(),
            buffers: HashMap::new(),
            active_program: None,
            commands: Vec::new(),
        }
    }

    /// A device that reports no graphics context.
    pub fn unavailable() -> Self {
        Self {
            status: DeviceStatus::Unavailable,
            ..Self::new(CanvasSize::default())
        }
    }

    pub fn set_canvas_size(&mut self, canvas: CanvasSize) {
        self.canvas = canvas;
    }

    pub fn commands(&self) -> &[DeviceCommand] {
        &self.commands
    }

    /// Returns and forgets the commands recorded so far.
    pub fn take_commands(&mut self) -> Vec<DeviceCommand> {
        std::mem::take(&mut self.commands)
    }

    pub fn draw_calls(&self) -> Vec<DrawCall> {
        self.commands
            .iter()
            .filter_map(|c| match *c {
                DeviceCommand::DrawIndexed {
                    topology,
                    count,
                    first_index,
                } => Some(DrawCall {
                    topology,
                    count,
                    first_index,
                }),
                _ => None,
            })
            .collect()
    }

    /// Every value uploaded to `location`, in call order.
    pub fn uniform_uploads(&self, location: UniformLocation) -> Vec<[f32; 16]> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DeviceCommand::SetUniformMat4 { location: l, value } if *l == location => {
                    Some(*value)
                }
                _ => None,
            })
            .collect()
    }

    /// Current contents of a live buffer.
    pub fn buffer_data(&self, buffer: BufferId) -> Option<&[u8]> {
        self.buffers.get(&buffer).map(|b| b.data.as_slice())
    }

    pub fn buffer_kind(&self, buffer: BufferId) -> Option<BufferKind> {
        self.buffers.get(&buffer).map(|b| b.kind)
    }

    /// Number of buffers created and not yet deleted.
    pub fn live_buffers(&self) -> usize {
        self.buffers.len()
    }

    pub fn live_programs(&self) -> usize {
        self.programs.len()
    }

    pub fn live_stages(&self) -> usize {
        self.stages.len()
    }

    fn next_handle(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

impl GraphicsDevice for RecordingDevice {
    fn status(&self) -> DeviceStatus {
        self.status
    }

    fn canvas_size(&self) -> CanvasSize {
        self.canvas
    }

    fn compile_stage(&mut self, stage: ShaderStage, source: &str) -> Result<StageId, String> {
        let compiled = reflect::compile(stage, source)?;
        let id = StageId(self.next_handle());
        self.stages.insert(id, compiled);
        Ok(id)
    }

    fn link_program(&mut self, vertex: StageId, fragment: StageId) -> Result<ProgramId, String> {
        let (Some(vs), Some(fs)) = (self.stages.get(&vertex), self.stages.get(&fragment)) else {
            return Err(format!("unknown shader stage {vertex:?} or {fragment:?}"));
        };
        let interface = reflect::link(vs, fs)?;
        let id = ProgramId(self.next_handle());
        self.programs.insert(id, interface);
        Ok(id)
    }

    fn delete_stage(&mut self, stage: StageId) {
        self.stages.remove(&stage);
    }

    fn delete_program(&mut self, program: ProgramId) {
        self.programs.remove(&program);
        if self.active_program == Some(program) {
            self.active_program = None;
        }
    }

    fn attribute_location(&self, program: ProgramId, name: &str) -> Option<AttributeLocation> {
        self.programs.get(&program)?.attribute(name).map(|a| a.location)
    }

    fn uniform_location(&self, program: ProgramId, name: &str) -> Option<UniformLocation> {
        self.programs.get(&program)?.uniform(name).map(|u| u.location)
    }

    fn create_buffer(&mut self, kind: BufferKind) -> BufferId {
        let buffer = BufferId(self.next_handle());
        self.buffers.insert(
            buffer,
            RecordedBuffer {
                kind,
                data: Vec::new(),
            },
        );
        self.commands.push(DeviceCommand::CreateBuffer { buffer, kind });
        buffer
    }

    fn upload_buffer(&mut self, buffer: BufferId, data: &[u8]) {
        let Some(slot) = self.buffers.get_mut(&buffer) else {
            log::warn!("upload to unknown buffer {buffer:?} ignored");
            return;
        };
        slot.data.clear();
        slot.data.extend_from_slice(data);
        self.commands.push(DeviceCommand::UploadBuffer {
            buffer,
            len: data.len(),
        });
    }

    fn delete_buffer(&mut self, buffer: BufferId) {
        if self.buffers.remove(&buffer).is_some() {
            self.commands.push(DeviceCommand::DeleteBuffer(buffer));
        }
    }

    fn clear(&mut self, color: Color, depth: f32) {
        self.commands.push(DeviceCommand::Clear { color, depth });
    }

    fn set_depth_test(&mut self, func: Option<DepthFunc>) {
        self.commands.push(DeviceCommand::SetDepthTest(func));
    }

    fn bind_vertex_attribute(
        &mut self,
        location: AttributeLocation,
        buffer: BufferId,
        layout: VertexAttributeLayout,
    ) {
        if self.buffer_kind(buffer) != Some(BufferKind::Vertex) {
            log::warn!("{buffer:?} is not a live vertex buffer; attribute binding ignored");
            return;
        }
        self.commands.push(DeviceCommand::BindVertexAttribute {
            location,
            buffer,
            layout,
        });
    }

    fn use_program(&mut self, program: ProgramId) {
        if !self.programs.contains_key(&program) {
            log::warn!("unknown program {program:?} ignored");
            return;
        }
        self.active_program = Some(program);
        self.commands.push(DeviceCommand::UseProgram(program));
    }

    fn set_uniform_mat4(&mut self, location: UniformLocation, value: &[f32; 16]) {
        if self.active_program.is_none() {
            log::warn!("uniform {location:?} set with no active program; ignored");
            return;
        }
        self.commands.push(DeviceCommand::SetUniformMat4 {
            location,
            value: *value,
        });
    }

    fn bind_index_buffer(&mut self, buffer: BufferId) {
        if self.buffer_kind(buffer) != Some(BufferKind::Index) {
            log::warn!("{buffer:?} is not a live index buffer; binding ignored");
            return;
        }
        self.commands.push(DeviceCommand::BindIndexBuffer(buffer));
    }

    fn draw_indexed(&mut self, topology: PrimitiveTopology, count: u32, first_index: u32) {
        self.commands.push(DeviceCommand::DrawIndexed {
            topology,
            count,
            first_index,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VS: &str = include_str!("shaders/flat_color.vert.wgsl");
    const FS: &str = include_str!("shaders/flat_color.frag.wgsl");

    fn device() -> RecordingDevice {
        RecordingDevice::new(CanvasSize::new(960, 540))
    }

    // ── buffers ───────────────────────────────────────────────────────────

    #[test]
    fn upload_replaces_contents() {
        let mut dev = device();
        let buf = dev.create_buffer(BufferKind::Vertex);
        dev.upload_buffer(buf, &[1, 2, 3, 4]);
        dev.upload_buffer(buf, &[9, 9]);
        assert_eq!(dev.buffer_data(buf), Some(&[9u8, 9][..]));
    }

    #[test]
    fn deleted_buffer_is_gone() {
        let mut dev = device();
        let buf = dev.create_buffer(BufferKind::Index);
        assert_eq!(dev.live_buffers(), 1);
        dev.delete_buffer(buf);
        assert_eq!(dev.live_buffers(), 0);
        assert_eq!(dev.buffer_data(buf), None);
        assert_eq!(dev.commands().last(), Some(&DeviceCommand::DeleteBuffer(buf)));
    }

    #[test]
    fn index_buffer_cannot_feed_an_attribute() {
        let mut dev = device();
        let buf = dev.create_buffer(BufferKind::Index);
        dev.take_commands();
        dev.bind_vertex_attribute(AttributeLocation(0), buf, VertexAttributeLayout::packed_f32(3));
        assert!(dev.commands().is_empty());
    }

    // ── programs ──────────────────────────────────────────────────────────

    #[test]
    fn linked_program_resolves_locations() {
        let mut dev = device();
        let vs = dev.compile_stage(ShaderStage::Vertex, VS).unwrap();
        let fs = dev.compile_stage(ShaderStage::Fragment, FS).unwrap();
        let program = dev.link_program(vs, fs).unwrap();

        assert_eq!(dev.attribute_location(program, "vertexColor"), Some(AttributeLocation(1)));
        assert_eq!(
            dev.uniform_location(program, "projectionMatrix"),
            Some(UniformLocation { group: 0, binding: 0 })
        );
        assert_eq!(dev.attribute_location(program, "vertexNormal"), None);
    }

    #[test]
    fn uniform_without_program_is_ignored() {
        let mut dev = device();
        dev.set_uniform_mat4(UniformLocation { group: 0, binding: 0 }, &[0.0; 16]);
        assert!(dev.commands().is_empty());
    }

    #[test]
    fn draw_calls_filters_commands() {
        let mut dev = device();
        dev.clear(Color::BLACK, 1.0);
        dev.draw_indexed(PrimitiveTopology::LineList, 16, 0);
        assert_eq!(
            dev.draw_calls(),
            vec![DrawCall {
                topology: PrimitiveTopology::LineList,
                count: 16,
                first_index: 0
            }]
        );
    }
}
