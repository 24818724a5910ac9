use winit::event::WindowEvent;

use crate::render::RenderDevice;

use super::ctx::{FrameCtx, StartCtx, WindowCtx};

/// Control directive returned by app callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// Application contract driven by the [`Runtime`](crate::window::Runtime).
///
/// Call order: `on_start` once the window and device exist, then
/// `on_window_event`/`on_frame` as events arrive, then `on_shutdown` once
/// before the device is dropped.
pub trait App {
    /// Builds device resources. Returning an error stops the runtime.
    fn on_start(&mut self, ctx: &mut StartCtx<'_>) -> anyhow::Result<()>;

    fn on_window_event(&mut self, ctx: &mut WindowCtx<'_>, event: &WindowEvent) -> AppControl {
        let _ = (ctx, event);
        AppControl::Continue
    }

    /// Called once per redraw.
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl;

    /// Releases device resources.
    fn on_shutdown(&mut self, device: &mut dyn RenderDevice) {
        let _ = device;
    }
}
