use glam::Vec3;

use crate::paint::Color;
use crate::render::{GraphicsDevice, PrimitiveTopology};

use super::drawable::{DrawFn, DrawableObject};
use super::geometry::{GeometryBuffers, GeometryError, Point3};

/// Corner `i` takes the max extent on x when bit 0 is set, y for bit 1, z for bit 2,
/// so every edge joins two corners that differ in exactly one bit.
const EDGES: [u16; 24] = [
    0, 1, 2, 3, 4, 5, 6, 7, // along x
    0, 2, 1, 3, 4, 6, 5, 7, // along y
    0, 4, 1, 5, 2, 6, 3, 7, // along z
];

/// Axis-aligned wireframe box.
///
/// Setters only mark the box dirty; the new geometry is uploaded on the next
/// `update`.
#[derive(Debug)]
pub struct WireBoxObject {
    buffers: GeometryBuffers,
    visible: bool,
    center: Vec3,
    size: Vec3,
    color: Color,
    dirty: bool,
}

impl WireBoxObject {
    /// `size` is the full extent along each axis; negative extents are mirrored.
    pub fn new(center: Vec3, size: Vec3, color: Color) -> Self {
        Self {
            buffers: GeometryBuffers::new(),
            visible: true,
            center,
            size: size.abs(),
            color,
            dirty: true,
        }
    }

    /// Unit cube at the origin.
    pub fn unit(color: Color) -> Self {
        Self::new(Vec3::ZERO, Vec3::ONE, color)
    }

    pub fn center(&self) -> Vec3 {
        self.center
    }

    pub fn size(&self) -> Vec3 {
        self.size
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn set_center(&mut self, center: Vec3) {
        if center != self.center {
            self.center = center;
            self.dirty = true;
        }
    }

    pub fn set_size(&mut self, size: Vec3) {
        let size = size.abs();
        if size != self.size {
            self.size = size;
            self.dirty = true;
        }
    }

    pub fn set_color(&mut self, color: Color) {
        if color != self.color {
            self.color = color;
            self.dirty = true;
        }
    }

    fn corners(&self) -> [Point3; 8] {
        let half = self.size * 0.5;
        let min = self.center - half;
        let max = self.center + half;
        std::array::from_fn(|i| {
            Point3::new(
                if i & 1 == 0 { min.x } else { max.x },
                if i & 2 == 0 { min.y } else { max.y },
                if i & 4 == 0 { min.z } else { max.z },
            )
        })
    }

    fn upload(&mut self, device: &mut dyn GraphicsDevice) -> Result<(), GeometryError> {
        let corners = self.corners();
        self.buffers.upload(
            device,
            PrimitiveTopology::LineList,
            &corners,
            &[self.color; 8],
            &EDGES,
        )?;
        self.dirty = false;
        Ok(())
    }
}

impl DrawableObject for WireBoxObject {
    fn label(&self) -> &str {
        "wire-box"
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
        self.upload(device)
    }

    fn update(&mut self, device: &mut dyn GraphicsDevice) -> Result<(), GeometryError> {
        if !self.dirty {
            return Ok(());
        }
        self.upload(device)
    }

    fn draw(&self, callback: &mut DrawFn<'_>) {
        callback(&self.buffers, self.topology(), self);
    }
}
