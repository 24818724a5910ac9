//! Three-phase mask compositing.
//!
//! ```text
//! StencilCompositor::begin ─► MaskStage ─► BodyStage ─► OverlayStage ─► finish
//!   clear mask, color off      mask == 0 only     mask ignored
//! ```
//!
//! The phases can only be entered in order. Dropping any stage, including on
//! an early return, puts the device back into [`MaskPhase::Plain`].

use super::backend::{DrawParams, MaskPhase, RenderDevice};
use super::geometry_buffer::GeometryBuffer;

/// Entry point of the masking protocol.
pub struct StencilCompositor;

impl StencilCompositor {
    /// Clears the mask and enters the mask phase.
    pub fn begin(device: &mut dyn RenderDevice) -> MaskStage<'_> {
        device.clear_mask();
        device.set_mask_phase(MaskPhase::Mark);
        MaskStage { pass: Pass { device } }
    }
}

struct Pass<'d> {
    device: &'d mut dyn RenderDevice,
}

impl Pass<'_> {
    fn enter(&mut self, phase: MaskPhase) {
        self.device.set_mask_phase(phase);
    }
}

impl Drop for Pass<'_> {
    fn drop(&mut self) {
        self.device.set_mask_phase(MaskPhase::Plain);
    }
}

/// Color writes off; covered pixels are marked.
pub struct MaskStage<'d> {
    pass: Pass<'d>,
}

impl<'d> MaskStage<'d> {
    pub fn draw(&mut self, geometry: &GeometryBuffer, params: DrawParams) -> &mut Self {
        geometry.draw(&mut *self.pass.device, params);
        self
    }

    /// Direct access for draws that do not go through a [`GeometryBuffer`].
    pub fn device(&mut self) -> &mut dyn RenderDevice {
        &mut *self.pass.device
    }

    pub fn into_body(mut self) -> BodyStage<'d> {
        self.pass.enter(MaskPhase::Exclude);
        BodyStage { pass: self.pass }
    }
}

/// Color on, written only where the mask is unmarked.
pub struct BodyStage<'d> {
    pass: Pass<'d>,
}

impl<'d> BodyStage<'d> {
    pub fn draw(&mut self, geometry: &GeometryBuffer, params: DrawParams) -> &mut Self {
        geometry.draw(&mut *self.pass.device, params);
        self
    }

    pub fn device(&mut self) -> &mut dyn RenderDevice {
        &mut *self.pass.device
    }

    pub fn into_overlay(mut self) -> OverlayStage<'d> {
        self.pass.enter(MaskPhase::Plain);
        OverlayStage { pass: self.pass }
    }
}

/// Mask test off; draws land on top of body and holes alike.
pub struct OverlayStage<'d> {
    pass: Pass<'d>,
}

impl OverlayStage<'_> {
    pub fn draw(&mut self, geometry: &GeometryBuffer, params: DrawParams) -> &mut Self {
        geometry.draw(&mut *self.pass.device, params);
        self
    }

    pub fn device(&mut self) -> &mut dyn RenderDevice {
        &mut *self.pass.device
    }

    /// Ends the protocol in the plain phase.
    pub fn finish(self) {}
}
