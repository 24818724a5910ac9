use winit::window::{Window, WindowId};

use crate::coords::{Rgb, Viewport};
use crate::device::{Gpu, SurfaceErrorAction};
use crate::render::WgpuDevice;
use crate::time::FrameTime;

use super::app::AppControl;

/// The window as seen by app callbacks.
pub struct WindowCtx<'a> {
    pub id: WindowId,
    pub window: &'a Window,
}

impl WindowCtx<'_> {
    /// Physical size in pixels.
    pub fn size(&self) -> (u32, u32) {
        let s = self.window.inner_size();
        (s.width, s.height)
    }

    pub fn set_title(&self, title: &str) {
        self.window.set_title(title);
    }
}

/// Passed to [`App::on_start`](super::App::on_start).
pub struct StartCtx<'a> {
    pub window: WindowCtx<'a>,
    pub device: &'a mut WgpuDevice,
}

/// Per-frame context.
///
/// Lifetimes:
/// - `'a` is the duration of the callback invocation
/// - `'w` is the window borrow carried by `Gpu<'w>`
pub struct FrameCtx<'a, 'w> {
    pub window: WindowCtx<'a>,
    pub gpu: &'a mut Gpu<'w>,
    pub device: &'a mut WgpuDevice,
    pub time: FrameTime,
}

impl FrameCtx<'_, '_> {
    /// Records one frame through `draw`, clears to `clear`, encodes and presents.
    ///
    /// `draw` receives the device and a viewport covering the whole surface.
    pub fn render<F>(&mut self, clear: Rgb, draw: F) -> AppControl
    where
        F: FnOnce(&mut WgpuDevice, Viewport),
    {
        let size = self.gpu.size();
        if size.width == 0 || size.height == 0 {
            return AppControl::Continue;
        }

        let mut frame = match self.gpu.begin_frame() {
            Ok(f) => f,
            Err(err) => {
                log::debug!("surface error: {err}");
                return match self.gpu.handle_surface_error(err) {
                    SurfaceErrorAction::Fatal => {
                        log::error!("unrecoverable surface error");
                        AppControl::Exit
                    }
                    _ => AppControl::Continue,
                };
            }
        };

        self.device.begin_frame();
        draw(self.device, Viewport::full(size.width, size.height));
        self.device
            .encode(&mut frame.encoder, &frame.view, (size.width, size.height), clear);

        self.window.window.pre_present_notify();
        self.gpu.submit(frame);

        AppControl::Continue
    }
}
