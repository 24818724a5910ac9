//! Drawable contract, emblem strategies and the name-keyed registry.
//!
//! A drawable is built once against a device, rendered any number of times
//! and torn down once. Emblems only describe geometry; [`SolidDrawable`] and
//! [`MaskedDrawable`] own the buffers and drive the device.

mod masked;
mod registry;
mod solid;

pub use masked::{MaskedDrawable, MaskedEmblem};
pub use registry::{Registry, RegistryError};
pub use solid::{Emblem, SolidDrawable};

use crate::coords::Viewport;
use crate::render::{DrawParams, RenderDevice, WAVE_AMPLITUDE};

/// Per-frame inputs handed to [`Drawable::render`].
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RenderArgs {
    pub viewport: Viewport,
    /// Seconds since the gallery started.
    pub time: f32,
}

impl RenderArgs {
    #[inline]
    pub fn new(viewport: Viewport, time: f32) -> Self {
        Self { viewport, time }
    }

    /// Flag-pipeline parameters for geometry whose wave fades out at `half_width`.
    #[inline]
    pub fn params(&self, half_width: f32) -> DrawParams {
        DrawParams {
            viewport: self.viewport,
            time: self.time,
            half_width,
            amplitude: WAVE_AMPLITUDE,
        }
    }
}

/// A named renderable entity owned by the [`Registry`].
pub trait Drawable {
    fn name(&self) -> &str;

    /// One-paragraph text shown next to the selection.
    fn description(&self) -> &str {
        ""
    }

    /// Builds geometry and acquires device resources. Called once.
    ///
    /// Missing optional inputs should leave the drawable inert rather than
    /// fail; an error means the drawable must not be kept.
    fn build(&mut self, device: &mut dyn RenderDevice) -> anyhow::Result<()>;

    /// Issues this frame's draws. No-op when nothing was built.
    fn render(&self, device: &mut dyn RenderDevice, args: &RenderArgs);

    /// Releases every device resource. Safe to call more than once.
    fn teardown(&mut self, device: &mut dyn RenderDevice);
}
