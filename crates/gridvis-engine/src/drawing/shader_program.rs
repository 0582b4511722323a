use std::fmt;

use crate::render::shaders::{FLAT_COLOR_FRAGMENT, FLAT_COLOR_VERTEX};
use crate::render::{AttributeLocation, GraphicsDevice, ProgramId, ShaderStage, UniformLocation};

pub const POSITION_ATTRIBUTE: &str = "vertexPosition";
pub const COLOR_ATTRIBUTE: &str = "vertexColor";
pub const PROJECTION_UNIFORM: &str = "projectionMatrix";
pub const MODEL_VIEW_UNIFORM: &str = "modelViewMatrix";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShaderError {
    CompileFailed { stage: ShaderStage, log: String },
    LinkFailed { log: String },
}

impl fmt::Display for ShaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CompileFailed { stage, log } => {
                write!(f, "{stage} shader failed to compile:\n{log}")
            }
            Self::LinkFailed { log } => write!(f, "shader program failed to link:\n{log}"),
        }
    }
}

impl std::error::Error for ShaderError {}

/// A linked vertex + fragment program with its resolved locations.
///
/// Locations the program does not expose are `None`; draws skip them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderProgram {
    id: ProgramId,
    position: Option<AttributeLocation>,
    color: Option<AttributeLocation>,
    projection: Option<UniformLocation>,
    model_view: Option<UniformLocation>,
}

impl ShaderProgram {
    /// Compiles both stages, links them and resolves the four known names.
    ///
    /// Stage objects are deleted once linking has been attempted.
    pub fn compile(
        device: &mut dyn GraphicsDevice,
        vertex_source: &str,
        fragment_source: &str,
    ) -> Result<Self, ShaderError> {
        let vs = device
            .compile_stage(ShaderStage::Vertex, vertex_source)
            .map_err(|log| ShaderError::CompileFailed {
                stage: ShaderStage::Vertex,
                log,
            })?;

        let fs = match device.compile_stage(ShaderStage::Fragment, fragment_source) {
            Ok(fs) => fs,
            Err(log) => {
                device.delete_stage(vs);
                return Err(ShaderError::CompileFailed {
                    stage: ShaderStage::Fragment,
                    log,
                });
            }
        };

        let linked = device.link_program(vs, fs);
        device.delete_stage(vs);
        device.delete_stage(fs);
        let id = linked.map_err(|log| ShaderError::LinkFailed { log })?;

        let program = Self {
            id,
            position: device.attribute_location(id, POSITION_ATTRIBUTE),
            color: device.attribute_location(id, COLOR_ATTRIBUTE),
            projection: device.uniform_location(id, PROJECTION_UNIFORM),
            model_view: device.uniform_location(id, MODEL_VIEW_UNIFORM),
        };
        program.log_missing();
        log::debug!("shader program linked: {id:?}");

        Ok(program)
    }

    /// The built-in flat-color program.
    pub fn flat_color(device: &mut dyn GraphicsDevice) -> Result<Self, ShaderError> {
        Self::compile(device, FLAT_COLOR_VERTEX, FLAT_COLOR_FRAGMENT)
    }

    pub fn release(&self, device: &mut dyn GraphicsDevice) {
        device.delete_program(self.id);
    }

    pub fn id(&self) -> ProgramId {
        self.id
    }

    pub fn position_location(&self) -> Option<AttributeLocation> {
        self.position
    }

    pub fn color_location(&self) -> Option<AttributeLocation> {
        self.color
    }

    pub fn projection_location(&self) -> Option<UniformLocation> {
        self.projection
    }

    pub fn model_view_location(&self) -> Option<UniformLocation> {
        self.model_view
    }

    fn log_missing(&self) {
        let missing = [
            (POSITION_ATTRIBUTE, self.position.is_none()),
            (COLOR_ATTRIBUTE, self.color.is_none()),
            (PROJECTION_UNIFORM, self.projection.is_none()),
            (MODEL_VIEW_UNIFORM, self.model_view.is_none()),
        ];
        for (name, absent) in missing {
            if absent {
                log::debug!("program {:?} has no `{name}`", self.id);
            }
        }
    }
}
