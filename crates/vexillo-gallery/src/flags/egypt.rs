use vexillo_engine::coords::{Bounds, Rgb, Vec2};
use vexillo_engine::drawable::Emblem;
use vexillo_engine::geometry::{MeshBuilder, Rectangle};

const GOLD: Rgb = Rgb::new(0.95, 0.85, 0.25);
const GOLD_SHADE: Rgb = Rgb::new(0.92, 0.80, 0.20);
const EYE: Rgb = Rgb::new(0.15, 0.12, 0.05);

/// Red, white and black bands with a golden eagle built from rectangles and
/// triangles in the middle.
#[derive(Debug, Default, Clone, Copy)]
pub struct Egypt;

impl Egypt {
    const BOUNDS: Bounds = Bounds::centered(0.8, 0.55);
    /// The white band is narrower than the outer two.
    const WHITE_TOP: f32 = 0.15;
}

fn rect(mesh: &mut MeshBuilder, left: f32, bottom: f32, right: f32, top: f32, color: Rgb) {
    mesh.add_rectangle(&Rectangle::new(Vec2::new(left, bottom), Vec2::new(right, top), color));
}

/// Adds `a, b, c` with counter-clockwise winding whatever their input order.
fn tri(mesh: &mut MeshBuilder, a: (f32, f32), b: (f32, f32), c: (f32, f32), color: Rgb) {
    let (a, b, c) = (Vec2::new(a.0, a.1), Vec2::new(b.0, b.1), Vec2::new(c.0, c.1));
    if (b - a).cross(c - a) < 0.0 {
        mesh.add_triangle(a, c, b, color);
    } else {
        mesh.add_triangle(a, b, c, color);
    }
}

impl Egypt {
    fn add_eagle(mesh: &mut MeshBuilder) {
        // body with three breast stripes
        let (bx_l, bx_r, by_t, by_b) = (-0.12, 0.12, 0.16, -0.06);
        rect(mesh, bx_l, by_b, bx_r, by_t, GOLD);
        let stripe = 0.02;
        rect(mesh, bx_l + stripe * 0.5, by_b, bx_l + stripe * 1.5, by_t, GOLD_SHADE);
        rect(mesh, -stripe * 0.5, by_b, stripe * 0.5, by_t, GOLD_SHADE);
        rect(mesh, bx_r - stripe * 1.5, by_b, bx_r - stripe * 0.5, by_t, GOLD_SHADE);

        // wings, mirrored
        let (wy_t, wy_b) = (0.18, -0.04);
        for (root, dir) in [(bx_l, -1.0), (bx_r, 1.0)] {
            tri(mesh, (root, wy_t), (root + dir * 0.26, wy_t - 0.03), (root, wy_b), GOLD);
            tri(
                mesh,
                (root, wy_b),
                (root + dir * 0.26, wy_t - 0.03),
                (root + dir * 0.22, wy_b - 0.06),
                GOLD,
            );
        }

        // tail feathers
        let (tx_l, tx_r) = (-0.09, 0.09);
        let (ty_t, ty_b) = (by_b - 0.02, by_b - 0.16);
        rect(mesh, tx_l, ty_b, tx_r, ty_t, GOLD);
        let seg = (tx_r - tx_l) / 3.0;
        rect(mesh, tx_l, ty_b, tx_l + seg * 0.8, ty_t, GOLD_SHADE);
        rect(mesh, tx_l + seg * 1.1, ty_b, tx_l + seg * 1.9, ty_t, GOLD_SHADE);
        rect(mesh, tx_l + seg * 2.2, ty_b, tx_r, ty_t, GOLD_SHADE);

        // neck, head, eye, beak
        rect(mesh, -0.03, 0.16, 0.03, 0.28, GOLD);
        let (hx_l, hx_r, hy_t, hy_b) = (0.0, 0.09, 0.33, 0.26);
        rect(mesh, hx_l, hy_b, hx_r, hy_t, GOLD);
        rect(mesh, 0.06, 0.30, 0.075, 0.315, EYE);
        tri(mesh, (hx_r, (hy_t + hy_b) * 0.5), (hx_r + 0.06, hy_b + 0.01), (hx_r, hy_b), GOLD);

        // shield under the body
        let (sx_l, sx_r, sy_t, sy_b) = (-0.07, 0.07, -0.02, -0.14);
        rect(mesh, sx_l, sy_b, sx_r, sy_t, GOLD_SHADE);
        tri(mesh, (sx_l, sy_b), (sx_r, sy_b), (0.0, sy_b - 0.06), GOLD_SHADE);

        // shading where the wings meet the body
        for (root, dir) in [(bx_l, -1.0), (bx_r, 1.0)] {
            tri(mesh, (root, by_t), (root + dir * 0.08, by_t - 0.02), (root, by_t - 0.06), GOLD_SHADE);
        }
    }
}

impl Emblem for Egypt {
    fn name(&self) -> &str {
        "Egypt"
    }

    fn description(&self) -> &str {
        "Egypt flag with eagle, drawn fully from geometry (no textures)."
    }

    fn build_mesh(&self, mesh: &mut MeshBuilder) {
        let b = Self::BOUNDS;
        rect(mesh, b.left, Self::WHITE_TOP, b.right, b.top, Rgb::new(0.7, 0.0, 0.0));
        rect(mesh, b.left, -Self::WHITE_TOP, b.right, Self::WHITE_TOP, Rgb::white());
        rect(mesh, b.left, b.bottom, b.right, -Self::WHITE_TOP, Rgb::black());
        Self::add_eagle(mesh);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build() -> MeshBuilder {
        let mut mesh = MeshBuilder::new();
        Egypt.build_mesh(&mut mesh);
        mesh
    }

    #[test]
    fn bands_span_the_flag_and_eagle_stays_inside() {
        let mesh = build();
        assert_eq!(mesh.bounds(), Some(Egypt::BOUNDS));

        let eagle = Bounds::from_points(
            mesh.vertices()
                .iter()
                .filter(|v| v.rgb() == GOLD || v.rgb() == GOLD_SHADE)
                .map(|v| v.xy()),
        )
        .unwrap();
        assert!(eagle.left > -0.45 && eagle.right < 0.45);
        assert!(eagle.top < 0.55 && eagle.bottom > -0.55);
    }

    #[test]
    fn every_triangle_is_counter_clockwise() {
        let mesh = build();
        for t in mesh.vertices().chunks(3) {
            let (a, b, c) = (t[0].xy(), t[1].xy(), t[2].xy());
            assert!((b - a).cross(c - a) > 0.0);
        }
    }

    #[test]
    fn white_band_is_narrower_than_the_red() {
        let mesh = build();
        let white = mesh.vertices().iter().filter(|v| v.rgb() == Rgb::white());
        assert!(white.map(|v| v.xy().y.abs()).all(|y| y == 0.15));
    }
}
