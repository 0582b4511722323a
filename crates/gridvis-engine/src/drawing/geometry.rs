use std::fmt;

use bytemuck::{Pod, Zeroable};

use crate::paint::Color;
use crate::render::{BufferId, BufferKind, GraphicsDevice, PrimitiveTopology};

/// A vertex position, laid out as three packed `f32`s.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct Point3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Point3 {
    #[inline]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    #[inline]
    pub fn to_vec3(self) -> glam::Vec3 {
        glam::Vec3::new(self.x, self.y, self.z)
    }
}

impl From<glam::Vec3> for Point3 {
    fn from(v: glam::Vec3) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

/// The three GPU buffers behind one object.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct GeometryHandles {
    pub positions: BufferId,
    pub colors: BufferId,
    pub indices: BufferId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeometryError {
    /// Buffers were never allocated, or have been released.
    NotAllocated,
    AlreadyAllocated,
    LengthMismatch { positions: usize, colors: usize },
    /// First index that does not name a vertex.
    IndexOutOfRange { index: u16, vertex_count: usize },
    /// Index count is not a multiple of the topology arity.
    IncompleteTopology {
        topology: PrimitiveTopology,
        count: usize,
    },
}

impl fmt::Display for GeometryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotAllocated => write!(f, "geometry buffers are not allocated"),
            Self::AlreadyAllocated => write!(f, "geometry buffers are already allocated"),
            Self::LengthMismatch { positions, colors } => {
                write!(f, "{positions} positions but {colors} colors")
            }
            Self::IndexOutOfRange {
                index,
                vertex_count,
            } => write!(f, "index {index} out of range for {vertex_count} vertices"),
            Self::IncompleteTopology { topology, count } => write!(
                f,
                "{count} indices do not form whole {topology} primitives ({} per primitive)",
                topology.arity()
            ),
        }
    }
}

impl std::error::Error for GeometryError {}

/// Host copies of an object's vertex data plus the GPU buffers they live in.
///
/// Positions and colors are index-parallel: vertex `i` is `points[i]` colored
/// `colors[i]`. Every upload replaces all three buffers.
#[derive(Debug, Default)]
pub struct GeometryBuffers {
    points: Vec<Point3>,
    colors: Vec<Color>,
    indices: Vec<u16>,
    handles: Option<GeometryHandles>,
}

impl GeometryBuffers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the three empty GPU buffers. Call once before the first upload.
    pub fn allocate(&mut self, device: &mut dyn GraphicsDevice) -> Result<(), GeometryError> {
        if self.handles.is_some() {
            return Err(GeometryError::AlreadyAllocated);
        }

        let handles = GeometryHandles {
            positions: device.create_buffer(BufferKind::Vertex),
            colors: device.create_buffer(BufferKind::Vertex),
            indices: device.create_buffer(BufferKind::Index),
        };
        log::debug!("geometry buffers allocated: {handles:?}");
        self.handles = Some(handles);
        Ok(())
    }

    /// Validates and uploads a full replacement of the geometry.
    ///
    /// Nothing reaches the device unless every check passes.
    pub fn upload(
        &mut self,
        device: &mut dyn GraphicsDevice,
        topology: PrimitiveTopology,
        points: &[Point3],
        colors: &[Color],
        indices: &[u16],
    ) -> Result<(), GeometryError> {
        let handles = self.handles.ok_or(GeometryError::NotAllocated)?;
        validate(topology, points, colors, indices)?;

        device.upload_buffer(handles.positions, bytemuck::cast_slice(points));
        device.upload_buffer(handles.colors, bytemuck::cast_slice(colors));
        device.upload_buffer(handles.indices, bytemuck::cast_slice(indices));

        self.points.clear();
        self.points.extend_from_slice(points);
        self.colors.clear();
        self.colors.extend_from_slice(colors);
        self.indices.clear();
        self.indices.extend_from_slice(indices);

        log::debug!(
            "geometry uploaded: {} vertices, {} indices ({topology})",
            points.len(),
            indices.len()
        );
        Ok(())
    }

    /// Deletes the GPU buffers. Host copies are kept.
    pub fn release(&mut self, device: &mut dyn GraphicsDevice) {
        if let Some(handles) = self.handles.take() {
            device.delete_buffer(handles.positions);
            device.delete_buffer(handles.colors);
            device.delete_buffer(handles.indices);
        }
    }

    pub fn points(&self) -> &[Point3] {
        &self.points
    }

    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    pub fn indices(&self) -> &[u16] {
        &self.indices
    }

    pub fn vertex_count(&self) -> usize {
        self.points.len()
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    pub fn handles(&self) -> Option<GeometryHandles> {
        self.handles
    }

    pub fn is_allocated(&self) -> bool {
        self.handles.is_some()
    }
}

fn validate(
    topology: PrimitiveTopology,
    points: &[Point3],
    colors: &[Color],
    indices: &[u16],
) -> Result<(), GeometryError> {
    if points.len() != colors.len() {
        return Err(GeometryError::LengthMismatch {
            positions: points.len(),
            colors: colors.len(),
        });
    }

    let vertex_count = points.len();
    if let Some(&index) = indices.iter().find(|&&i| usize::from(i) >= vertex_count) {
        return Err(GeometryError::IndexOutOfRange {
            index,
            vertex_count,
        });
    }

    if indices.len() % topology.arity() != 0 {
        return Err(GeometryError::IncompleteTopology {
            topology,
            count: indices.len(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::CanvasSize;
    use crate::render::{DeviceCommand, RecordingDevice};

    fn device() -> RecordingDevice {
        RecordingDevice::new(CanvasSize::new(960, 540))
    }

    fn segment() -> ([Point3; 2], [Color; 2], [u16; 2]) {
        (
            [Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0)],
            [Color::WHITE; 2],
            [0, 1],
        )
    }

    fn uploads(dev: &RecordingDevice) -> usize {
        dev.commands()
            .iter()
            .filter(|c| matches!(c, DeviceCommand::UploadBuffer { .. }))
            .count()
    }

    // ── allocation ────────────────────────────────────────────────────────

    #[test]
    fn allocate_creates_three_buffers() {
        let mut dev = device();
        let mut geo = GeometryBuffers::new();
        geo.allocate(&mut dev).unwrap();

        let handles = geo.handles().unwrap();
        assert_eq!(dev.live_buffers(), 3);
        assert_eq!(dev.buffer_kind(handles.positions), Some(BufferKind::Vertex));
        assert_eq!(dev.buffer_kind(handles.indices), Some(BufferKind::Index));
    }

    #[test]
    fn second_allocate_is_rejected() {
        let mut dev = device();
        let mut geo = GeometryBuffers::new();
        geo.allocate(&mut dev).unwrap();
        assert_eq!(geo.allocate(&mut dev), Err(GeometryError::AlreadyAllocated));
        assert_eq!(dev.live_buffers(), 3);
    }

    #[test]
    fn upload_before_allocate_fails() {
        let mut dev = device();
        let mut geo = GeometryBuffers::new();
        let (p, c, i) = segment();
        assert_eq!(
            geo.upload(&mut dev, PrimitiveTopology::LineList, &p, &c, &i),
            Err(GeometryError::NotAllocated)
        );
    }

    // ── upload ────────────────────────────────────────────────────────────

    #[test]
    fn upload_flattens_into_device_buffers() {
        let mut dev = device();
        let mut geo = GeometryBuffers::new();
        geo.allocate(&mut dev).unwrap();
        let (p, c, i) = segment();
        geo.upload(&mut dev, PrimitiveTopology::LineList, &p, &c, &i).unwrap();

        let handles = geo.handles().unwrap();
        let positions: Vec<f32> =
            bytemuck::pod_collect_to_vec(dev.buffer_data(handles.positions).unwrap());
        assert_eq!(positions, vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0]);
        assert_eq!(dev.buffer_data(handles.colors).unwrap().len(), 2 * 16);
        assert_eq!(dev.buffer_data(handles.indices).unwrap(), &[0, 0, 1, 0]);
        assert_eq!(geo.vertex_count(), 2);
        assert_eq!(geo.index_count(), 2);
    }

    #[test]
    fn length_mismatch_keeps_previous_contents() {
        let mut dev = device();
        let mut geo = GeometryBuffers::new();
        geo.allocate(&mut dev).unwrap();
        let (p, c, i) = segment();
        geo.upload(&mut dev, PrimitiveTopology::LineList, &p, &c, &i).unwrap();

        let handles = geo.handles().unwrap();
        let before = dev.buffer_data(handles.positions).unwrap().to_vec();

        let err = geo
            .upload(&mut dev, PrimitiveTopology::LineList, &p, &c[..1], &i)
            .unwrap_err();
        assert_eq!(
            err,
            GeometryError::LengthMismatch {
                positions: 2,
                colors: 1
            }
        );
        assert_eq!(dev.buffer_data(handles.positions).unwrap(), before.as_slice());
        assert_eq!(geo.colors().len(), 2);
    }

    #[test]
    fn out_of_range_index_uploads_nothing() {
        let mut dev = device();
        let mut geo = GeometryBuffers::new();
        geo.allocate(&mut dev).unwrap();
        let (p, c, _) = segment();

        let err = geo
            .upload(&mut dev, PrimitiveTopology::LineList, &p, &c, &[0, 1, 1, 2])
            .unwrap_err();
        assert_eq!(
            err,
            GeometryError::IndexOutOfRange {
                index: 2,
                vertex_count: 2
            }
        );
        assert_eq!(uploads(&dev), 0);
    }

    #[test]
    fn odd_line_index_count_is_incomplete() {
        let mut dev = device();
        let mut geo = GeometryBuffers::new();
        geo.allocate(&mut dev).unwrap();
        let (p, c, _) = segment();

        let err = geo
            .upload(&mut dev, PrimitiveTopology::LineList, &p, &c, &[0, 1, 1])
            .unwrap_err();
        assert_eq!(
            err,
            GeometryError::IncompleteTopology {
                topology: PrimitiveTopology::LineList,
                count: 3
            }
        );
        assert_eq!(uploads(&dev), 0);
    }

    #[test]
    fn triangle_list_needs_triples() {
        let mut dev = device();
        let mut geo = GeometryBuffers::new();
        geo.allocate(&mut dev).unwrap();
        let p = [Point3::default(); 3];
        let c = [Color::WHITE; 3];

        assert!(
            geo.upload(&mut dev, PrimitiveTopology::TriangleList, &p, &c, &[0, 1, 2])
                .is_ok()
        );
        assert!(
            geo.upload(&mut dev, PrimitiveTopology::TriangleList, &p, &c, &[0, 1])
                .is_err()
        );
    }

    // ── release ───────────────────────────────────────────────────────────

    #[test]
    fn release_deletes_buffers_and_blocks_uploads() {
        let mut dev = device();
        let mut geo = GeometryBuffers::new();
        geo.allocate(&mut dev).unwrap();
        geo.release(&mut dev);

        assert_eq!(dev.live_buffers(), 0);
        assert!(!geo.is_allocated());
        let (p, c, i) = segment();
        assert_eq!(
            geo.upload(&mut dev, PrimitiveTopology::LineList, &p, &c, &i),
            Err(GeometryError::NotAllocated)
        );
    }
}
