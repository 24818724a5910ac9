use anyhow::{Context, Result};
use ouroboros::self_referencing;

use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::core::{App, AppControl, FrameCtx, StartCtx, WindowCtx};
use crate::device::{Gpu, GpuInit};
use crate::render::WgpuDevice;
use crate::time::FrameClock;

/// Window configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "vexillo".to_string(),
            initial_size: LogicalSize::new(1280.0, 720.0),
        }
    }
}

/// Single-window event loop driving an [`App`].
pub struct Runtime;

impl Runtime {
    /// Runs until the window closes or the app asks to exit.
    ///
    /// Returns the error that stopped startup, if any.
    pub fn run<A>(config: RuntimeConfig, gpu_init: GpuInit, app: A) -> Result<()>
    where
        A: App + 'static,
    {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = AppState::new(config, gpu_init, app);

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        match state.error.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[self_referencing]
struct WindowEntry {
    clock: FrameClock,

    window: Window,

    #[borrows(window)]
    #[covariant]
    gpu: Gpu<'this>,
}

/// The window, its surface and the device recording into it.
struct Active {
    id: WindowId,
    entry: WindowEntry,
    device: WgpuDevice,
}

struct AppState<A> {
    config: RuntimeConfig,
    gpu_init: GpuInit,
    app: A,

    active: Option<Active>,
    exit_requested: bool,
    error: Option<anyhow::Error>,
}

impl<A: App + 'static> AppState<A> {
    fn new(config: RuntimeConfig, gpu_init: GpuInit, app: A) -> Self {
        Self {
            config,
            gpu_init,
            app,
            active: None,
            exit_requested: false,
            error: None,
        }
    }

    fn start(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size);

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;
        let id = window.id();
        let gpu_init = self.gpu_init.clone();

        let entry = WindowEntryTryBuilder {
            clock: FrameClock::default(),
            window,
            gpu_builder: |w| pollster::block_on(Gpu::new(w, gpu_init)),
        }
        .try_build()
        .context("GPU initialization failed")?;

        let mut device = entry.with_gpu(|gpu| {
            WgpuDevice::new(gpu.device(), gpu.queue(), gpu.surface_format())
        });
        log::debug!("render device ready ({:?})", device.format());

        let app = &mut self.app;
        entry.with_window(|window| {
            let mut ctx = StartCtx {
                window: WindowCtx { id, window },
                device: &mut device,
            };
            app.on_start(&mut ctx)
        })?;

        entry.with_window(|w| w.request_redraw());
        self.active = Some(Active { id, entry, device });
        Ok(())
    }

    /// Lets the app release its resources, then drops the window and device.
    fn shutdown(&mut self, event_loop: &ActiveEventLoop) {
        self.exit_requested = true;
        if let Some(mut active) = self.active.take() {
            self.app.on_shutdown(&mut active.device);
            let leaked = active.device.live_geometry();
            if leaked > 0 {
                log::warn!("{leaked} geometry buffers still live after shutdown");
            }
            log::debug!("window {:?} closed", active.id);
        }
        event_loop.exit();
    }
}

impl<A: App + 'static> ApplicationHandler for AppState<A> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.active.is_some() || self.exit_requested {
            return;
        }
        if let Err(err) = self.start(event_loop) {
            log::error!("startup failed: {err:#}");
            self.error = Some(err);
            self.shutdown(event_loop);
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        // Sleep until the next event; the redraw request below is that event,
        // so the wave still animates every frame.
        event_loop.set_control_flow(ControlFlow::Wait);
        if let Some(active) = &self.active {
            active.entry.with_window(|w| w.request_redraw());
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, window_id: WindowId, event: WindowEvent) {
        let app = &mut self.app;
        let Some(active) = self.active.as_mut().filter(|a| a.id == window_id) else {
            return;
        };

        let control = active.entry.with_window(|window| {
            let mut ctx = WindowCtx { id: window_id, window };
            app.on_window_event(&mut ctx, &event)
        });
        if control == AppControl::Exit {
            self.shutdown(event_loop);
            return;
        }

        match &event {
            WindowEvent::CloseRequested => {
                self.shutdown(event_loop);
            }

            WindowEvent::Resized(new_size) => {
                active.entry.with_gpu_mut(|gpu| gpu.resize(*new_size));
                active.entry.with_window(|w| w.request_redraw());
            }

            WindowEvent::ScaleFactorChanged { .. } => {
                let new_size = active.entry.with_window(|w| w.inner_size());
                active.entry.with_gpu_mut(|gpu| gpu.resize(new_size));
            }

            WindowEvent::RedrawRequested => {
                let device = &mut active.device;
                let control = active.entry.with_mut(|fields| {
                    let time = fields.clock.tick();
                    let mut ctx = FrameCtx {
                        window: WindowCtx { id: window_id, window: fields.window },
                        gpu: fields.gpu,
                        device,
                        time,
                    };
                    app.on_frame(&mut ctx)
                });
                if control == AppControl::Exit {
                    self.shutdown(event_loop);
                }
            }

            _ => {}
        }
    }

    fn exiting(&mut self, event_loop: &ActiveEventLoop) {
        if self.active.is_some() {
            self.shutdown(event_loop);
        }
    }
}
