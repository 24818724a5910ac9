use vexillo_engine::coords::{Bounds, Edge, Rgb, Vec2};
use vexillo_engine::drawable::MaskedEmblem;
use vexillo_engine::geometry::{edge_wedges, profile, Fan, MeshBuilder, Rectangle, TaperingStrip};

pub const BODY: Rgb = Rgb::black();
pub const BONE: Rgb = Rgb::new(0.95, 0.95, 0.9);

/// Black flag with a torn fly edge, a skull and crossed bones.
///
/// The tears are cut out of the body through the mask; the skull and bones
/// are drawn on top and never masked.
#[derive(Debug, Clone, Copy)]
pub struct Pirates {
    /// Number of notches torn into the fly edge.
    pub tears: u32,
    pub tear_depth: f32,
}

impl Default for Pirates {
    fn default() -> Self {
        Self { tears: 6, tear_depth: 0.14 }
    }
}

impl Pirates {
    const BODY_BOUNDS: Bounds = Bounds::centered(0.8, 0.6);

    fn add_bones(center: Vec2, mesh: &mut MeshBuilder) {
        let reach = Vec2::new(0.35, 0.25);
        let cross = center + Vec2::new(0.0, -0.2);
        let angle = reach.y.atan2(reach.x);
        let thickness = profile::bone(0.022, 0.05, 0.12);

        for (start, angle, bulge) in [
            (cross - reach, angle, 0.03),
            (cross + Vec2::new(reach.x, -reach.y), std::f32::consts::PI - angle, -0.03),
        ] {
            let strip = TaperingStrip {
                start,
                angle,
                length: reach.length() * 2.0,
                bulge,
                segments: 16,
                color: BONE,
            };
            mesh.add_tapering_strip(&strip, thickness);
        }
    }

    fn add_skull(center: Vec2, mesh: &mut MeshBuilder) {
        let at = |x: f32, y: f32| center + Vec2::new(x, y);
        let hollow = Rgb::black();

        mesh.add_regular_fan(&Fan::new(at(0.0, 0.18), 0.2, 32, BONE));
        mesh.add_rectangle(&Rectangle::new(at(-0.11, -0.06), at(0.11, 0.02), BONE));

        for x in [-0.075, 0.075] {
            mesh.add_regular_fan(&Fan::new(at(x, 0.2), 0.05, 16, hollow));
        }
        mesh.add_triangle(at(-0.025, 0.08), at(0.025, 0.08), at(0.0, 0.13), hollow);

        // gaps between the teeth
        for x in [-0.05, 0.0, 0.05] {
            mesh.add_rectangle(&Rectangle::new(at(x - 0.006, -0.06), at(x + 0.006, -0.01), hollow));
        }
    }
}

impl MaskedEmblem for Pirates {
    fn name(&self) -> &str {
        "Pirates"
    }

    fn description(&self) -> &str {
        "Pirate flag: black background with skull and crossbones, the fly edge torn away."
    }

    fn build_body(&self, mesh: &mut MeshBuilder) {
        mesh.add_rectangle(&Rectangle::from_bounds(Self::BODY_BOUNDS, BODY));
    }

    fn build_mask(&self, body: Bounds, mesh: &mut MeshBuilder) {
        for wedge in edge_wedges(body, Edge::Right, self.tears, self.tear_depth) {
            mesh.add_cutout_wedge(&wedge);
        }
    }

    fn build_overlay(&self, body: Bounds, mesh: &mut MeshBuilder) {
        let center = body.center();
        mesh.set_layer(0.1);
        Self::add_bones(center, mesh);
        Self::add_skull(center, mesh);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vexillo_engine::drawable::{Drawable, MaskedDrawable, RenderArgs};
    use vexillo_engine::render::{MaskPhase, RenderDevice, SoftwareDevice};

    const SEA: Rgb = Rgb::new(0.0, 0.0, 1.0);

    fn near(px: [u8; 4], rgb: Rgb) -> bool {
        let want = rgb.to_u8();
        (0..3).all(|c| px[c].abs_diff(want[c]) <= 1)
    }

    fn rendered() -> SoftwareDevice {
        let mut device = SoftwareDevice::new(160, 120);
        device.clear(SEA);
        let mut flag = MaskedDrawable::new(Pirates::default());
        flag.build(&mut device).unwrap();
        let args = RenderArgs::new(device.viewport(), 0.0);
        flag.render(&mut device, &args);
        flag.teardown(&mut device);
        device
    }

    // ── geometry ──────────────────────────────────────────────────────────

    #[test]
    fn tears_point_into_the_body() {
        let p = Pirates::default();
        let mut mesh = MeshBuilder::new();
        p.build_mask(Pirates::BODY_BOUNDS, &mut mesh);
        assert_eq!(mesh.triangle_count(), p.tears as usize);
        for t in mesh.vertices().chunks(3) {
            let apex = t[2].xy();
            assert!((apex.x - (0.8 - p.tear_depth)).abs() < 1e-5);
        }
    }

    #[test]
    fn overlay_stays_inside_the_body() {
        let mut mesh = MeshBuilder::new();
        Pirates::default().build_overlay(Pirates::BODY_BOUNDS, &mut mesh);
        let b = mesh.bounds().unwrap();
        let body = Pirates::BODY_BOUNDS;
        assert!(b.left > body.left && b.right < body.right);
        assert!(b.top < body.top && b.bottom > body.bottom);
    }

    #[test]
    fn bones_cross_below_the_skull() {
        let mut mesh = MeshBuilder::new();
        Pirates::add_bones(Vec2::zero(), &mut mesh);
        let b = mesh.bounds().unwrap();
        assert!((b.left + b.right).abs() < 1e-4);
        assert!(b.top < 0.2);
    }

    // ── pixels ────────────────────────────────────────────────────────────

    #[test]
    fn torn_edge_shows_the_background() {
        let device = rendered();
        // deep inside the lowest tear, next to the fly edge
        assert!(near(device.pixel(142, 90), SEA));
        // plain body
        assert!(near(device.pixel(32, 36), BODY));
        // outside the flag
        assert!(near(device.pixel(2, 2), SEA));
    }

    #[test]
    fn skull_is_drawn_over_the_body() {
        let device = rendered();
        assert!(near(device.pixel(80, 42), BONE));
        assert_eq!(device.mask_phase(), MaskPhase::Plain);
        assert_eq!(device.live_geometry(), 0);
    }
}
