use std::fmt;

/// High-level response after a surface error.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SurfaceErrorAction {
    /// Surface was reconfigured; rendering may resume next frame.
    Reconfigured,
    /// Transient error; skip the current frame.
    SkipFrame,
    /// Fatal error (commonly OOM); terminate gracefully.
    Fatal,
}

/// Failure to bring up a GPU context for a window.
///
/// Every variant means "no device": nothing may be drawn and no buffer may be
/// created.
#[derive(Debug)]
pub enum DeviceError {
    /// The window reported a 0x0 drawable size.
    ZeroSize,
    Surface(wgpu::CreateSurfaceError),
    AdapterUnavailable(wgpu::RequestAdapterError),
    DeviceRequest(wgpu::RequestDeviceError),
    /// The surface reported no usable texture format for this adapter.
    NoSurfaceFormat,
}

impl fmt::Display for DeviceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroSize => write!(f, "window has zero size"),
            Self::Surface(e) => write!(f, "failed to create wgpu surface: {e}"),
            Self::AdapterUnavailable(e) => write!(f, "no suitable GPU adapter: {e}"),
            Self::DeviceRequest(e) => write!(f, "failed to create wgpu device/queue: {e}"),
            Self::NoSurfaceFormat => write!(f, "no supported surface formats"),
        }
    }
}

impl std::error::Error for DeviceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Surface(e) => Some(e),
            Self::AdapterUnavailable(e) => Some(e),
            Self::DeviceRequest(e) => Some(e),
            Self::ZeroSize | Self::NoSurfaceFormat => None,
        }
    }
}
