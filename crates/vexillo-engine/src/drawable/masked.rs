use anyhow::Context;

use crate::coords::Bounds;
use crate::geometry::MeshBuilder;
use crate::render::{GeometryBuffer, RenderDevice, StencilCompositor};

use super::{Drawable, RenderArgs};

/// An emblem with holes: a body, mask geometry cut out of it, and an overlay
/// drawn on top of both.
pub trait MaskedEmblem {
    fn name(&self) -> &str;

    fn description(&self) -> &str {
        ""
    }

    fn build_body(&self, mesh: &mut MeshBuilder);

    /// `body` is the extent of the finished body mesh.
    fn build_mask(&self, body: Bounds, mesh: &mut MeshBuilder);

    fn build_overlay(&self, body: Bounds, mesh: &mut MeshBuilder);
}

/// Owns the three buffers of a [`MaskedEmblem`] and composites them through
/// the [`StencilCompositor`].
pub struct MaskedDrawable<E> {
    emblem: E,
    mask: GeometryBuffer,
    body: GeometryBuffer,
    overlay: GeometryBuffer,
    body_bounds: Option<Bounds>,
}

impl<E: MaskedEmblem> MaskedDrawable<E> {
    pub fn new(emblem: E) -> Self {
        let name = emblem.name().to_string();
        Self {
            emblem,
            mask: GeometryBuffer::new(format!("{name} mask")),
            body: GeometryBuffer::new(format!("{name} body")),
            overlay: GeometryBuffer::new(format!("{name} overlay")),
            body_bounds: None,
        }
    }

    /// Cached extent of the body, available after a successful build.
    #[inline]
    pub fn body_bounds(&self) -> Option<Bounds> {
        self.body_bounds
    }
}

impl<E: MaskedEmblem> Drawable for MaskedDrawable<E> {
    fn name(&self) -> &str {
        self.emblem.name()
    }

    fn description(&self) -> &str {
        self.emblem.description()
    }

    fn build(&mut self, device: &mut dyn RenderDevice) -> anyhow::Result<()> {
        let name = self.emblem.name().to_string();

        let mut body = MeshBuilder::new();
        self.emblem.build_body(&mut body);
        let bounds = body
            .bounds()
            .with_context(|| format!("'{name}' has an empty body"))?;

        let mut mask = MeshBuilder::new();
        self.emblem.build_mask(bounds, &mut mask);
        let mut overlay = MeshBuilder::new();
        self.emblem.build_overlay(bounds, &mut overlay);

        let meshes = [
            (&mut self.body, body),
            (&mut self.mask, mask),
            (&mut self.overlay, overlay),
        ];
        for (buf, mesh) in meshes {
            let (vertices, indices) = mesh.finish();
            buf.set_geometry(vertices, indices);
        }

        for buf in [&mut self.body, &mut self.mask, &mut self.overlay] {
            buf.upload(device)
                .with_context(|| format!("uploading '{}'", buf.label()))?;
        }

        self.body_bounds = Some(bounds);
        log::debug!(
            "built '{name}': body {} / mask {} / overlay {} triangles",
            self.body.triangle_count(),
            self.mask.triangle_count(),
            self.overlay.triangle_count()
        );
        Ok(())
    }

    fn render(&self, device: &mut dyn RenderDevice, args: &RenderArgs) {
        let Some(bounds) = self.body_bounds else { return };
        let params = args.params(bounds.half_width());

        let mut mask = StencilCompositor::begin(device);
        mask.draw(&self.mask, params);
        let mut body = mask.into_body();
        body.draw(&self.body, params);
        let mut overlay = body.into_overlay();
        overlay.draw(&self.overlay, params);
        overlay.finish();
    }

    fn teardown(&mut self, device: &mut dyn RenderDevice) {
        self.mask.teardown(device);
        self.body.teardown(device);
        self.overlay.teardown(device);
        self.body_bounds = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::{Edge, Rgb, Vec2};
    use crate::geometry::{edge_wedges, Rectangle};
    use crate::render::{MaskPhase, SoftwareDevice};

    const BODY: Rgb = Rgb { r: 0.0, g: 0.0, b: 1.0 };
    const OVERLAY: Rgb = Rgb { r: 1.0, g: 1.0, b: 0.0 };

    /// Full-target body, three wedges on the right edge, a bar across the middle.
    struct Notched;

    impl MaskedEmblem for Notched {
        fn name(&self) -> &str {
            "Notched"
        }

        fn build_body(&self, mesh: &mut MeshBuilder) {
            mesh.add_rectangle(&Rectangle::new(Vec2::new(-1.0, -1.0), Vec2::new(1.0, 1.0), BODY));
        }

        fn build_mask(&self, body: Bounds, mesh: &mut MeshBuilder) {
            for w in edge_wedges(body, Edge::Right, 3, 0.5) {
                mesh.add_cutout_wedge(&w);
            }
        }

        fn build_overlay(&self, _body: Bounds, mesh: &mut MeshBuilder) {
            mesh.add_rectangle(&Rectangle::new(Vec2::new(-1.0, -0.0625), Vec2::new(1.0, 0.0625), OVERLAY));
        }
    }

    fn render(device: &mut SoftwareDevice, d: &MaskedDrawable<Notched>) {
        let args = RenderArgs::new(device.viewport(), 0.0);
        d.render(device, &args);
    }

    #[test]
    fn wedges_cut_body_and_overlay_covers_them() {
        let mut device = SoftwareDevice::new(48, 48);
        let mut d = MaskedDrawable::new(Notched);
        d.build(&mut device).unwrap();
        assert_eq!(d.body_bounds(), Some(Bounds::new(-1.0, 1.0, 1.0, -1.0)));
        render(&mut device, &d);

        // Wedge bases span the right edge in thirds; the middle wedge's
        // deepest point sits at x = 0.5, y = 0.
        // inside the top wedge, near the edge
        assert_eq!(device.pixel(46, 8), [0, 0, 0, 255]);
        // body, left half
        assert_eq!(device.pixel(8, 8), [0, 0, 255, 255]);
        // overlay over the middle wedge
        assert_eq!(device.pixel(44, 24), [255, 255, 0, 255]);
        // overlay over the body
        assert_eq!(device.pixel(8, 24), [255, 255, 0, 255]);
        assert_eq!(device.mask_phase(), MaskPhase::Plain);
    }

    #[test]
    fn rendering_after_another_masked_drawable_matches_fresh() {
        let mut fresh = SoftwareDevice::new(32, 32);
        let mut a = MaskedDrawable::new(Notched);
        a.build(&mut fresh).unwrap();
        render(&mut fresh, &a);

        let mut busy = SoftwareDevice::new(32, 32);
        let mut b = MaskedDrawable::new(Notched);
        let mut c = MaskedDrawable::new(Notched);
        b.build(&mut busy).unwrap();
        c.build(&mut busy).unwrap();
        render(&mut busy, &b);
        busy.clear(Rgb::black());
        render(&mut busy, &c);

        assert_eq!(busy.image(), fresh.image());
    }

    #[test]
    fn teardown_releases_all_three_buffers() {
        let mut device = SoftwareDevice::new(8, 8);
        let mut d = MaskedDrawable::new(Notched);
        d.build(&mut device).unwrap();
        assert_eq!(device.live_geometry(), 3);
        d.teardown(&mut device);
        d.teardown(&mut device);
        assert_eq!(device.live_geometry(), 0);
        assert_eq!(device.released_geometry(), 3);

        render(&mut device, &d);
        assert_eq!(device.draw_calls(), 0);
    }

    #[test]
    fn rebuild_replaces_buffers_in_place() {
        let mut device = SoftwareDevice::new(8, 8);
        let mut d = MaskedDrawable::new(Notched);
        d.build(&mut device).unwrap();
        d.build(&mut device).unwrap();
        assert_eq!(device.live_geometry(), 3);
        assert_eq!(device.released_geometry(), 3);

        d.teardown(&mut device);
        assert_eq!(device.live_geometry(), 0);
    }
}
