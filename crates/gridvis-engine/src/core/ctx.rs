use winit::window::Window;

use crate::coords::CanvasSize;
use crate::device::{Gpu, SurfaceErrorAction};
use crate::input::{InputFrame, InputState};
use crate::render::WgpuDevice;

use super::app::AppControl;

/// Window handle and immutable window metadata.
pub struct WindowCtx<'a> {
    pub window: &'a Window,
}

/// Per-frame context passed to `core::App::on_frame`.
///
/// Lifetimes:
/// - `'a` is the duration of the callback invocation
/// - `'w` is the window-borrow lifetime carried by `Gpu<'w>`
pub struct FrameCtx<'a, 'w> {
    pub window: WindowCtx<'a>,
    pub gpu: &'a mut Gpu<'w>,
    pub input: &'a InputState,
    pub input_frame: &'a InputFrame,
    /// Frames rendered before this one.
    pub frame_index: u64,
}

impl<'a, 'w> FrameCtx<'a, 'w> {
    /// Current surface size in physical pixels.
    pub fn canvas_size(&self) -> CanvasSize {
        CanvasSize::from(self.gpu.size())
    }

    /// Creates a graphics device recording against this window's GPU context.
    pub fn create_device(&self) -> WgpuDevice {
        WgpuDevice::new(&*self.gpu)
    }

    /// Acquires the surface frame, replays the commands `device` recorded
    /// since the last present, and presents.
    ///
    /// A minimized window or a failed acquisition drops the recorded commands
    /// for this frame.
    pub fn present(&mut self, device: &mut WgpuDevice) -> AppControl {
        let canvas = self.canvas_size();
        if canvas.is_empty() {
            // Minimized: nothing to present into.
            device.discard_pending();
            return AppControl::Continue;
        }
        device.set_canvas_size(canvas);

        let mut frame = match self.gpu.begin_frame() {
            Ok(f) => f,
            Err(err) => {
                device.discard_pending();
                let action = self.gpu.handle_surface_error(err);
                if action == SurfaceErrorAction::Fatal {
                    return AppControl::Exit;
                }
                return AppControl::Continue;
            }
        };

        device.encode(&mut frame.encoder, &frame.view);

        self.window.window.pre_present_notify();
        self.gpu.submit(frame);

        AppControl::Continue
    }
}
