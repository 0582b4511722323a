use crate::render::{GraphicsDevice, PrimitiveTopology};

use super::geometry::{GeometryBuffers, GeometryError};

/// Per-object draw callback: the object's buffers, its topology, and the object itself.
pub type DrawFn<'a> = dyn FnMut(&GeometryBuffers, PrimitiveTopology, &dyn DrawableObject) + 'a;

/// Something the diagram can draw.
///
/// An object owns its geometry and keeps it uploaded; it never binds shader
/// state. `draw` hands the buffers back to the diagram, which issues the GPU
/// call. Invisible objects are filtered out by the diagram before `draw`.
pub trait DrawableObject {
    /// Short name used in logs.
    fn label(&self) -> &str;

    fn buffers(&self) -> &GeometryBuffers;

    fn buffers_mut(&mut self) -> &mut GeometryBuffers;

    fn topology(&self) -> PrimitiveTopology;

    fn is_visible(&self) -> bool;

    fn set_visible(&mut self, visible: bool);

    /// Allocates buffers and uploads the initial geometry.
    fn init(&mut self, device: &mut dyn GraphicsDevice) -> Result<(), GeometryError>;

    /// Recomputes geometry and re-uploads it if anything changed.
    fn update(&mut self, device: &mut dyn GraphicsDevice) -> Result<(), GeometryError>;

    /// Calls `callback` once with this object's buffers and topology.
    fn draw(&self, callback: &mut DrawFn<'_>);

    fn index_count(&self) -> u32 {
        self.buffers().index_count() as u32
    }

    fn release(&mut self, device: &mut dyn GraphicsDevice) {
        self.buffers_mut().release(device);
    }
}
