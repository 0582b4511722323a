//! Drawing core: shader program, per-object geometry, and the diagram that
//! draws them.
//!
//! Objects own their GPU buffers and never touch shader state; the diagram
//! owns the program and the camera and issues every draw call through the
//! callback it hands to each object.

mod config;
mod diagram;
mod drawable;
mod geometry;
mod lines;
mod shader_program;
mod wire_box;

pub use config::DiagramConfig;
pub use diagram::{Diagram, DiagramError, DiagramState, ObjectId};
pub use drawable::{DrawFn, DrawableObject};
pub use geometry::{GeometryBuffers, GeometryError, GeometryHandles, Point3};
pub use lines::LinesObject;
pub use shader_program::{
    COLOR_ATTRIBUTE, MODEL_VIEW_UNIFORM, POSITION_ATTRIBUTE, PROJECTION_UNIFORM, ShaderError,
    ShaderProgram,
};
pub use wire_box::WireBoxObject;
