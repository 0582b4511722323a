use std::fmt;

use glam::Mat4;

use crate::render::shaders::{FLAT_COLOR_FRAGMENT, FLAT_COLOR_VERTEX};
use crate::render::{DeviceStatus, GraphicsDevice, PrimitiveTopology, VertexAttributeLayout};

use super::config::DiagramConfig;
use super::drawable::{DrawFn, DrawableObject};
use super::geometry::{GeometryBuffers, GeometryError};
use super::shader_program::{ShaderError, ShaderProgram};

/// Stable handle to an object owned by a [`Diagram`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct ObjectId(u32);

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum DiagramState {
    /// Objects have not been initialized; drawing is refused.
    Uninitialized,
    Ready,
    /// Inside `draw`.
    Drawing,
}

#[derive(Debug)]
pub enum DiagramError {
    /// The device has no graphics context.
    DeviceUnavailable,
    Shader(ShaderError),
    Geometry(GeometryError),
    /// `draw` or `update` was called before `init`.
    NotInitialized,
}

impl fmt::Display for DiagramError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DeviceUnavailable => write!(f, "graphics device unavailable"),
            Self::Shader(e) => write!(f, "shader program: {e}"),
            Self::Geometry(e) => write!(f, "object geometry: {e}"),
            Self::NotInitialized => write!(f, "diagram used before init()"),
        }
    }
}

impl std::error::Error for DiagramError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Shader(e) => Some(e),
            Self::Geometry(e) => Some(e),
            Self::DeviceUnavailable | Self::NotInitialized => None,
        }
    }
}

impl From<ShaderError> for DiagramError {
    fn from(e: ShaderError) -> Self {
        Self::Shader(e)
    }
}

impl From<GeometryError> for DiagramError {
    fn from(e: GeometryError) -> Self {
        Self::Geometry(e)
    }
}

/// Owns the device, the shader program, the camera matrices and the objects.
///
/// Objects are drawn in insertion order. Each frame the projection is rebuilt
/// from the canvas aspect; the view keeps the offset applied at construction.
pub struct Diagram<D: GraphicsDevice> {
    device: D,
    config: DiagramConfig,
    program: ShaderProgram,

    projection: Mat4,
    view: Mat4,

    objects: Vec<(ObjectId, Box<dyn DrawableObject>)>,
    next_object: u32,

    state: DiagramState,
    frame_index: u64,
}

impl<D: GraphicsDevice> Diagram<D> {
    /// Creates a diagram drawing with the built-in flat-color program.
    pub fn new(device: D, config: DiagramConfig) -> Result<Self, DiagramError> {
        Self::with_shaders(device, config, FLAT_COLOR_VERTEX, FLAT_COLOR_FRAGMENT)
    }

    /// Creates a diagram drawing with the given WGSL stages.
    pub fn with_shaders(
        mut device: D,
        config: DiagramConfig,
        vertex_source: &str,
        fragment_source: &str,
    ) -> Result<Self, DiagramError> {
        if device.status() == DeviceStatus::Unavailable {
            log::error!("no graphics context; diagram not created");
            return Err(DiagramError::DeviceUnavailable);
        }

        let program = ShaderProgram::compile(&mut device, vertex_source, fragment_source)
            .inspect_err(|e| log::error!("{e}"))?;

        let projection = config.projection(device.canvas_size());
        let view = Mat4::from_translation(config.view_offset);

        Ok(Self {
            device,
            config,
            program,
            projection,
            view,
            objects: Vec::new(),
            next_object: 1,
            state: DiagramState::Uninitialized,
            frame_index: 0,
        })
    }

    /// Initializes every object added so far.
    ///
    /// On the first failure every object's buffers are released and the
    /// diagram stays uninitialized.
    pub fn init(&mut self) -> Result<(), DiagramError> {
        if self.state != DiagramState::Uninitialized {
            log::warn!("Diagram::init called again; ignored");
            return Ok(());
        }

        let mut failure = None;
        for (_, object) in &mut self.objects {
            if let Err(e) = object.init(&mut self.device) {
                log::error!("`{}` failed to initialize: {e}", object.label());
                failure = Some(e);
                break;
            }
        }
        if let Some(e) = failure {
            for (_, object) in &mut self.objects {
                object.release(&mut self.device);
            }
            return Err(e.into());
        }

        self.state = DiagramState::Ready;
        log::debug!("diagram initialized with {} objects", self.objects.len());
        Ok(())
    }

    /// Appends an object; it is drawn after every object added before it.
    ///
    /// Once the diagram is initialized the object is initialized here, and
    /// dropped again if that fails.
    pub fn add_object(&mut self, mut object: Box<dyn DrawableObject>) -> Result<ObjectId, DiagramError> {
        if self.state != DiagramState::Uninitialized {
            if let Err(e) = object.init(&mut self.device) {
                log::warn!("`{}` rejected: {e}", object.label());
                object.release(&mut self.device);
                return Err(e.into());
            }
        }

        let id = ObjectId(self.next_object);
        self.next_object += 1;
        log::debug!("object added: {id:?} `{}`", object.label());
        self.objects.push((id, object));
        Ok(id)
    }

    /// Removes an object and releases its GPU buffers.
    pub fn remove_object(&mut self, id: ObjectId) -> Option<Box<dyn DrawableObject>> {
        let index = self.objects.iter().position(|(oid, _)| *oid == id)?;
        let (_, mut object) = self.objects.remove(index);
        object.release(&mut self.device);
        log::debug!("object removed: {id:?} `{}`", object.label());
        Some(object)
    }

    pub fn object(&self, id: ObjectId) -> Option<&dyn DrawableObject> {
        self.objects
            .iter()
            .find(|(oid, _)| *oid == id)
            .map(|(_, o)| o.as_ref())
    }

    pub fn object_mut(&mut self, id: ObjectId) -> Option<&mut (dyn DrawableObject + 'static)> {
        self.objects
            .iter_mut()
            .find(|(oid, _)| *oid == id)
            .map(|(_, o)| o.as_mut())
    }

    /// Object ids in draw order.
    pub fn object_ids(&self) -> Vec<ObjectId> {
        self.objects.iter().map(|(id, _)| *id).collect()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Lets every object refresh its geometry.
    pub fn update(&mut self) -> Result<(), DiagramError> {
        if self.state == DiagramState::Uninitialized {
            log::error!("Diagram::update called before init");
            return Err(DiagramError::NotInitialized);
        }
        for (_, object) in &mut self.objects {
            object.update(&mut self.device)?;
        }
        Ok(())
    }

    /// Clears the target and draws every visible object.
    pub fn draw(&mut self) -> Result<(), DiagramError> {
        if self.state == DiagramState::Uninitialized {
            log::error!("Diagram::draw called before init");
            return Err(DiagramError::NotInitialized);
        }
        if self.device.status() == DeviceStatus::Unavailable {
            log::warn!("graphics device lost; frame {} skipped", self.frame_index);
            return Err(DiagramError::DeviceUnavailable);
        }

        self.state = DiagramState::Drawing;

        self.device.clear(self.config.clear_color, 1.0);
        self.device.set_depth_test(Some(self.config.depth_func));

        self.projection = self.config.projection(self.device.canvas_size());

        let Self {
            device,
            program,
            projection,
            view,
            objects,
            ..
        } = self;
        let projection = projection.to_cols_array();
        let view = view.to_cols_array();

        let callback: &mut DrawFn<'_> = &mut |buffers, topology, object| {
            draw_object(&mut *device, program, &projection, &view, buffers, topology, object);
        };
        for (_, object) in objects.iter().filter(|(_, o)| o.is_visible()) {
            object.draw(callback);
        }

        self.state = DiagramState::Ready;
        self.frame_index += 1;
        Ok(())
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    pub fn config(&self) -> &DiagramConfig {
        &self.config
    }

    pub fn program(&self) -> &ShaderProgram {
        &self.program
    }

    pub fn projection(&self) -> Mat4 {
        self.projection
    }

    pub fn view(&self) -> Mat4 {
        self.view
    }

    pub fn state(&self) -> DiagramState {
        self.state
    }

    /// Number of frames drawn so far.
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }
}

impl<D: GraphicsDevice> Drop for Diagram<D> {
    fn drop(&mut self) {
        for (_, object) in &mut self.objects {
            object.release(&mut self.device);
        }
        self.program.release(&mut self.device);
    }
}

/// Binds one object's buffers and the camera uniforms, then draws it.
fn draw_object(
    device: &mut dyn GraphicsDevice,
    program: &ShaderProgram,
    projection: &[f32; 16],
    view: &[f32; 16],
    buffers: &GeometryBuffers,
    topology: PrimitiveTopology,
    object: &dyn DrawableObject,
) {
    let Some(handles) = buffers.handles() else {
        log::warn!("`{}` has no GPU buffers; skipped", object.label());
        return;
    };

    if let Some(location) = program.position_location() {
        device.bind_vertex_attribute(location, handles.positions, VertexAttributeLayout::packed_f32(3));
    }
    if let Some(location) = program.color_location() {
        device.bind_vertex_attribute(location, handles.colors, VertexAttributeLayout::packed_f32(4));
    }

    device.use_program(program.id());
    if let Some(location) = program.projection_location() {
        device.set_uniform_mat4(location, projection);
    }
    if let Some(location) = program.model_view_location() {
        device.set_uniform_mat4(location, view);
    }

    device.bind_index_buffer(handles.indices);
    device.draw_indexed(topology, object.index_count(), 0);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::CanvasSize;
    use crate::drawing::{LinesObject, Point3, WireBoxObject};
    use crate::paint::Color;
    use crate::render::{DeviceCommand, RecordingDevice, UniformLocation};

    fn device() -> RecordingDevice {
        RecordingDevice::new(CanvasSize::new(960, 540))
    }

    fn diagram() -> Diagram<RecordingDevice> {
        Diagram::new(device(), DiagramConfig::default()).unwrap()
    }

    /// Uploads mismatched positions and colors.
    struct BrokenObject {
        buffers: GeometryBuffers,
    }

    impl DrawableObject for BrokenObject {
        fn label(&self) -> &str {
            "broken"
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
            true
        }
        fn set_visible(&mut self, _visible: bool) {}
        fn init(&mut self, device: &mut dyn GraphicsDevice) -> Result<(), GeometryError> {
            self.buffers.allocate(device)?;
            self.buffers.upload(
                device,
                PrimitiveTopology::LineList,
                &[Point3::default(); 2],
                &[Color::WHITE],
                &[0, 1],
            )
        }
        fn update(&mut self, _device: &mut dyn GraphicsDevice) -> Result<(), GeometryError> {
            Ok(())
        }
        fn draw(&self, callback: &mut DrawFn<'_>) {
            callback(&self.buffers, self.topology(), self);
        }
    }

    /// Never allocates its buffers.
    #[derive(Default)]
    struct HollowObject {
        buffers: GeometryBuffers,
    }

    impl DrawableObject for HollowObject {
        fn label(&self) -> &str {
            "hollow"
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
            true
        }
        fn set_visible(&mut self, _visible: bool) {}
        fn init(&mut self, _device: &mut dyn GraphicsDevice) -> Result<(), GeometryError> {
            Ok(())
        }
        fn update(&mut self, _device: &mut dyn GraphicsDevice) -> Result<(), GeometryError> {
            Ok(())
        }
        fn draw(&self, callback: &mut DrawFn<'_>) {
            callback(&self.buffers, self.topology(), self);
        }
    }

    fn location(d: &Diagram<RecordingDevice>, projection: bool) -> UniformLocation {
        let p = d.program();
        if projection {
            p.projection_location().unwrap()
        } else {
            p.model_view_location().unwrap()
        }
    }

    // ── construction ──────────────────────────────────────────────────────

    #[test]
    fn unavailable_device_is_rejected_first() {
        let err = Diagram::new(RecordingDevice::unavailable(), DiagramConfig::default()).err();
        assert!(matches!(err, Some(DiagramError::DeviceUnavailable)));
    }

    #[test]
    fn malformed_shader_yields_no_diagram() {
        let broken = FLAT_COLOR_VERTEX.replacen('}', "", 1);
        let result = Diagram::with_shaders(
            device(),
            DiagramConfig::default(),
            &broken,
            FLAT_COLOR_FRAGMENT,
        );
        match result {
            Err(DiagramError::Shader(ShaderError::CompileFailed { stage, .. })) => {
                assert_eq!(stage, crate::render::ShaderStage::Vertex);
            }
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("malformed shader produced a diagram"),
        }
    }

    #[test]
    fn view_offset_is_applied_at_construction() {
        let d = diagram();
        assert_eq!(d.view(), Mat4::from_translation(glam::Vec3::new(0.0, 0.0, -5.0)));
        assert_eq!(d.state(), DiagramState::Uninitialized);
    }

    // ── lifecycle ─────────────────────────────────────────────────────────

    #[test]
    fn draw_before_init_issues_nothing() {
        let mut d = diagram();
        d.add_object(Box::new(LinesObject::new())).unwrap();

        assert!(matches!(d.draw(), Err(DiagramError::NotInitialized)));
        assert!(d.device().commands().is_empty());
        assert_eq!(d.frame_index(), 0);
    }

    #[test]
    fn update_before_init_is_refused() {
        let mut d = diagram();
        assert!(matches!(d.update(), Err(DiagramError::NotInitialized)));
    }

    #[test]
    fn init_gives_every_variant_consistent_geometry() {
        let mut d = diagram();
        d.add_object(Box::new(LinesObject::new())).unwrap();
        d.add_object(Box::new(WireBoxObject::unit(Color::WHITE))).unwrap();
        d.init().unwrap();

        for id in d.object_ids() {
            let geo = d.object(id).unwrap().buffers();
            assert_eq!(geo.points().len(), geo.colors().len());
            assert!(geo.indices().iter().all(|&i| usize::from(i) < geo.vertex_count()));
        }
        assert_eq!(d.state(), DiagramState::Ready);
    }

    #[test]
    fn second_init_is_a_no_op() {
        let mut d = diagram();
        d.add_object(Box::new(LinesObject::new())).unwrap();
        d.init().unwrap();
        let buffers = d.device().live_buffers();

        d.init().unwrap();
        assert_eq!(d.device().live_buffers(), buffers);
    }

    #[test]
    fn failed_init_releases_everything() {
        let mut d = diagram();
        d.add_object(Box::new(LinesObject::new())).unwrap();
        d.add_object(Box::new(BrokenObject { buffers: GeometryBuffers::new() }))
            .unwrap();

        assert!(matches!(
            d.init(),
            Err(DiagramError::Geometry(GeometryError::LengthMismatch { .. }))
        ));
        assert_eq!(d.device().live_buffers(), 0);
        assert_eq!(d.state(), DiagramState::Uninitialized);
    }

    #[test]
    fn object_added_after_init_is_initialized() {
        let mut d = diagram();
        d.init().unwrap();
        let id = d.add_object(Box::new(LinesObject::new())).unwrap();
        assert!(d.object(id).unwrap().buffers().is_allocated());
    }

    #[test]
    fn broken_object_added_after_init_is_rejected() {
        let mut d = diagram();
        d.init().unwrap();
        let result = d.add_object(Box::new(BrokenObject { buffers: GeometryBuffers::new() }));

        assert!(result.is_err());
        assert!(d.is_empty());
        assert_eq!(d.device().live_buffers(), 0);
    }

    #[test]
    fn remove_releases_buffers() {
        let mut d = diagram();
        let lines = d.add_object(Box::new(LinesObject::new())).unwrap();
        let cube = d.add_object(Box::new(WireBoxObject::unit(Color::WHITE))).unwrap();
        d.init().unwrap();
        assert_eq!(d.device().live_buffers(), 6);

        let removed = d.remove_object(lines).unwrap();
        assert_eq!(removed.label(), "lines");
        assert_eq!(d.device().live_buffers(), 3);
        assert_eq!(d.object_ids(), vec![cube]);
        assert!(d.remove_object(lines).is_none());
    }

    #[test]
    fn drop_releases_objects_and_program() {
        let mut dev = device();
        {
            let mut d = Diagram::new(&mut dev, DiagramConfig::default()).unwrap();
            d.add_object(Box::new(LinesObject::new())).unwrap();
            d.init().unwrap();
        }
        assert_eq!(dev.live_buffers(), 0);
        assert_eq!(dev.live_programs(), 0);
    }

    // ── drawing ───────────────────────────────────────────────────────────

    #[test]
    fn one_lines_object_issues_one_line_draw() {
        let mut d = diagram();
        d.add_object(Box::new(LinesObject::new())).unwrap();
        d.init().unwrap();
        d.device_mut().take_commands();

        d.draw().unwrap();
        let calls = d.device().draw_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].topology, PrimitiveTopology::LineList);
        assert_eq!(calls[0].count, 16);
        assert_eq!(calls[0].first_index, 0);
        assert_eq!(d.frame_index(), 1);
    }

    #[test]
    fn frame_starts_with_clear_and_depth_test() {
        let mut d = diagram();
        d.add_object(Box::new(LinesObject::new())).unwrap();
        d.init().unwrap();
        d.device_mut().take_commands();
        d.draw().unwrap();

        let commands = d.device().commands();
        assert_eq!(
            commands[0],
            DeviceCommand::Clear {
                color: Color::BLACK,
                depth: 1.0
            }
        );
        assert_eq!(
            commands[1],
            DeviceCommand::SetDepthTest(Some(crate::render::DepthFunc::LessEqual))
        );
        assert!(matches!(commands.last(), Some(DeviceCommand::DrawIndexed { .. })));
    }

    #[test]
    fn draw_binds_attributes_then_program_uniforms_and_indices() {
        let mut d = diagram();
        let id = d.add_object(Box::new(LinesObject::new())).unwrap();
        d.init().unwrap();
        d.device_mut().take_commands();
        d.draw().unwrap();

        let handles = d.object(id).unwrap().buffers().handles().unwrap();
        let program = d.program();
        let expected = vec![
            DeviceCommand::Clear {
                color: Color::BLACK,
                depth: 1.0,
            },
            DeviceCommand::SetDepthTest(Some(crate::render::DepthFunc::LessEqual)),
            DeviceCommand::BindVertexAttribute {
                location: program.position_location().unwrap(),
                buffer: handles.positions,
                layout: VertexAttributeLayout::packed_f32(3),
            },
            DeviceCommand::BindVertexAttribute {
                location: program.color_location().unwrap(),
                buffer: handles.colors,
                layout: VertexAttributeLayout::packed_f32(4),
            },
            DeviceCommand::UseProgram(program.id()),
            DeviceCommand::SetUniformMat4 {
                location: program.projection_location().unwrap(),
                value: d.projection().to_cols_array(),
            },
            DeviceCommand::SetUniformMat4 {
                location: program.model_view_location().unwrap(),
                value: Mat4::from_translation(glam::Vec3::new(0.0, 0.0, -5.0)).to_cols_array(),
            },
            DeviceCommand::BindIndexBuffer(handles.indices),
            DeviceCommand::DrawIndexed {
                topology: PrimitiveTopology::LineList,
                count: 16,
                first_index: 0,
            },
        ];
        assert_eq!(d.device().commands(), expected.as_slice());
    }

    #[test]
    fn invisible_objects_are_skipped() {
        let mut d = diagram();
        d.add_object(Box::new(LinesObject::new())).unwrap();
        let hidden = d.add_object(Box::new(WireBoxObject::unit(Color::WHITE))).unwrap();
        d.init().unwrap();
        d.object_mut(hidden).unwrap().set_visible(false);
        d.device_mut().take_commands();

        d.draw().unwrap();
        assert_eq!(d.device().draw_calls().len(), 1);
    }

    #[test]
    fn objects_without_buffers_are_skipped() {
        let mut d = diagram();
        d.add_object(Box::new(HollowObject::default())).unwrap();
        d.add_object(Box::new(LinesObject::new())).unwrap();
        d.init().unwrap();
        d.device_mut().take_commands();

        d.draw().unwrap();
        assert_eq!(d.device().draw_calls().len(), 1);
    }

    #[test]
    fn aspect_change_updates_projection_only() {
        let mut d = diagram();
        d.add_object(Box::new(LinesObject::new())).unwrap();
        d.init().unwrap();

        d.draw().unwrap();
        d.device_mut().set_canvas_size(CanvasSize::new(540, 540));
        d.draw().unwrap();

        let projections = d.device().uniform_uploads(location(&d, true));
        let views = d.device().uniform_uploads(location(&d, false));
        assert_eq!(projections.len(), 2);
        assert_ne!(projections[0], projections[1]);
        assert_eq!(views.len(), 2);
        assert_eq!(views[0], views[1]);
    }

    #[test]
    fn view_is_not_reset_between_frames() {
        let mut d = diagram();
        d.init().unwrap();
        let before = d.view();
        d.draw().unwrap();
        d.draw().unwrap();
        assert_eq!(d.view(), before);
    }

    #[test]
    fn clean_objects_upload_nothing_on_update() {
        let mut d = diagram();
        d.add_object(Box::new(LinesObject::new())).unwrap();
        d.add_object(Box::new(WireBoxObject::unit(Color::WHITE))).unwrap();
        d.init().unwrap();
        d.device_mut().take_commands();

        d.update().unwrap();
        assert!(d.device().commands().is_empty());
    }
}
