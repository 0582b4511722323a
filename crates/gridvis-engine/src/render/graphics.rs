use crate::coords::CanvasSize;
use crate::paint::Color;

use super::types::{
    AttributeLocation, BufferId, BufferKind, DepthFunc, DeviceStatus, PrimitiveTopology,
    ProgramId, ShaderStage, StageId, UniformLocation, VertexAttributeLayout,
};

/// The graphics device boundary consumed by the drawing core.
///
/// Calls follow an immediate-mode model: bind state, then `draw_indexed`.
/// Backends decide when the recorded work reaches the GPU.
///
/// Handles passed in must have been created by the same device. Passing a
/// foreign or deleted handle is a programming error; backends log and ignore it.
pub trait GraphicsDevice {
    fn status(&self) -> DeviceStatus;

    /// Drawable size in physical pixels.
    fn canvas_size(&self) -> CanvasSize;

    /// Compiles one WGSL stage. `Err` carries the compiler log.
    fn compile_stage(&mut self, stage: ShaderStage, source: &str) -> Result<StageId, String>;

    /// Links a vertex and a fragment stage. `Err` carries the link log.
    fn link_program(&mut self, vertex: StageId, fragment: StageId) -> Result<ProgramId, String>;

    fn delete_stage(&mut self, stage: StageId);

    fn delete_program(&mut self, program: ProgramId);

    /// `None` when the program has no input with this name.
    fn attribute_location(&self, program: ProgramId, name: &str) -> Option<AttributeLocation>;

    /// `None` when the program has no uniform with this name.
    fn uniform_location(&self, program: ProgramId, name: &str) -> Option<UniformLocation>;

    /// Creates an empty buffer.
    fn create_buffer(&mut self, kind: BufferKind) -> BufferId;

    /// Replaces the whole buffer contents.
    fn upload_buffer(&mut self, buffer: BufferId, data: &[u8]);

    fn delete_buffer(&mut self, buffer: BufferId);

    /// Clears the color target to `color` and the depth target to `depth`.
    fn clear(&mut self, color: Color, depth: f32);

    /// `Some` enables depth testing with the given comparison; `None` disables it.
    fn set_depth_test(&mut self, func: Option<DepthFunc>);

    fn bind_vertex_attribute(
        &mut self,
        location: AttributeLocation,
        buffer: BufferId,
        layout: VertexAttributeLayout,
    );

    fn use_program(&mut self, program: ProgramId);

    /// Sets a `mat4x4<f32>` uniform of the active program (column-major).
    fn set_uniform_mat4(&mut self, location: UniformLocation, value: &[f32; 16]);

    /// Binds a buffer of 16-bit indices.
    fn bind_index_buffer(&mut self, buffer: BufferId);

    /// Draws `count` indices starting at index `first_index` of the bound index buffer.
    fn draw_indexed(&mut self, topology: PrimitiveTopology, count: u32, first_index: u32);
}

impl<T: GraphicsDevice + ?Sized> GraphicsDevice for &mut T {
    fn status(&self) -> DeviceStatus {
        (**self).status()
    }

    fn canvas_size(&self) -> CanvasSize {
        (**self).canvas_size()
    }

    fn compile_stage(&mut self, stage: ShaderStage, source: &str) -> Result<StageId, String> {
        (**self).compile_stage(stage, source)
    }

    fn link_program(&mut self, vertex: StageId, fragment: StageId) -> Result<ProgramId, String> {
        (**self).link_program(vertex, fragment)
    }

    fn delete_stage(&mut self, stage: StageId) {
        (**self).delete_stage(stage)
    }

    fn delete_program(&mut self, program: ProgramId) {
        (**self).delete_program(program)
    }

    fn attribute_location(&self, program: ProgramId, name: &str) -> Option<AttributeLocation> {
        (**self).attribute_location(program, name)
    }

    fn uniform_location(&self, program: ProgramId, name: &str) -> Option<UniformLocation> {
        (**self).uniform_location(program, name)
    }

    fn create_buffer(&mut self, kind: BufferKind) -> BufferId {
        (**self).create_buffer(kind)
    }

    fn upload_buffer(&mut self, buffer: BufferId, data: &[u8]) {
        (**self).upload_buffer(buffer, data)
    }

    fn delete_buffer(&mut self, buffer: BufferId) {
        (**self).delete_buffer(buffer)
    }

    fn clear(&mut self, color: Color, depth: f32) {
        (**self).clear(color, depth)
    }

    fn set_depth_test(&mut self, func: Option<DepthFunc>) {
        (**self).set_depth_test(func)
    }

    fn bind_vertex_attribute(
        &mut self,
        location: AttributeLocation,
        buffer: BufferId,
        layout: VertexAttributeLayout,
    ) {
        (**self).bind_vertex_attribute(location, buffer, layout)
    }

    fn use_program(&mut self, program: ProgramId) {
        (**self).use_program(program)
    }

    fn set_uniform_mat4(&mut self, location: UniformLocation, value: &[f32; 16]) {
        (**self).set_uniform_mat4(location, value)
    }

    fn bind_index_buffer(&mut self, buffer: BufferId) {
        (**self).bind_index_buffer(buffer)
    }

    fn draw_indexed(&mut self, topology: PrimitiveTopology, count: u32, first_index: u32) {
        (**self).draw_indexed(topology, count, first_index)
    }
}
