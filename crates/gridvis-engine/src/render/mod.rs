//! Graphics device boundary and its backends.
//!
//! The drawing core talks to the GPU only through [`GraphicsDevice`], an
//! immediate-mode interface (bind, set uniforms, draw). Two backends ship:
//! - [`WgpuDevice`] records calls per frame and replays them into wgpu passes
//! - [`RecordingDevice`] keeps everything on the host for headless use
//!
//! Shader sources are WGSL. Both backends share the naga front-end in
//! [`reflect`], so shader errors read the same everywhere.

mod graphics;
mod recording;
pub mod reflect;
mod types;
mod wgpu_device;

pub use graphics::GraphicsDevice;
pub use recording::{DeviceCommand, DrawCall, RecordingDevice};
pub use types::{
    AttributeLocation, BufferId, BufferKind, DepthFunc, DeviceStatus, PrimitiveTopology,
    ProgramId, ShaderStage, StageId, UniformLocation, VertexAttributeLayout,
};
pub use wgpu_device::WgpuDevice;

/// WGSL sources of the flat-color program.
pub mod shaders {
    pub const FLAT_COLOR_VERTEX: &str = include_str!("shaders/flat_color.vert.wgsl");
    pub const FLAT_COLOR_FRAGMENT: &str = include_str!("shaders/flat_color.frag.wgsl");
}
