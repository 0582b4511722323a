use crate::paint::Color;
use crate::render::{GraphicsDevice, PrimitiveTopology};

use super::drawable::{DrawFn, DrawableObject};
use super::geometry::{GeometryBuffers, GeometryError, Point3};

/// Front quad at z = 0, then a smaller quad shifted +2 on x and +1 on z.
const POINTS: [Point3; 8] = [
    Point3::new(1.0, 1.0, 0.0),
    Point3::new(-1.0, 1.0, 0.0),
    Point3::new(-1.0, -1.0, 0.0),
    Point3::new(1.0, -1.0, 0.0),
    Point3::new(2.5, 0.5, 1.0),
    Point3::new(1.5, 0.5, 1.0),
    Point3::new(1.5, -0.5, 1.0),
    Point3::new(2.5, -0.5, 1.0),
];

/// Each quad's outline; no segment joins the two quads.
const INDICES: [u16; 16] = [0, 1, 1, 2, 2, 3, 3, 0, 4, 5, 5, 6, 6, 7, 7, 4];

/// Two white wireframe quads with fixed geometry.
#[derive(Debug)]
pub struct LinesObject {
    buffers: GeometryBuffers,
    visible: bool,
}

impl LinesObject {
    pub fn new() -> Self {
        Self {
            buffers: GeometryBuffers::new(),
            visible: true,
        }
    }
}

impl Default for LinesObject {
    fn default() -> Self {
        Self::new()
    }
}

impl DrawableObject for LinesObject {
    fn label(&self) -> &str {
        "lines"
    }

    fn buffers(&self) -> &GeometryBuffers {
        &self.buffers
    }

    fn buffers_mut(&mut self) -> &mut GeometryBuffers {
        &mut self.buffers
    }

    fn topology(&self) -> PrimitiveTopology {
        PrimitiveTopology::LineList
    }

    fn is_visible(&self) -> bool {
        self.visible
    }

    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    fn init(&mut self, device: &mut dyn GraphicsDevice) -> Result<(), GeometryError> {
        self.buffers.allocate(device)?;
        self.buffers.upload(
            device,
            PrimitiveTopology::LineList,
            &POINTS,
            &[Color::WHITE; POINTS.len()],
            &INDICES,
        )
    }

    // Fixed geometry.
    fn update(&mut self, _device: &mut dyn GraphicsDevice) -> Result<(), GeometryError> {
        Ok(())
    }

    fn draw(&self, callback: &mut DrawFn<'_>) {
        callback(&self.buffers, self.topology(), self);
    }
}
