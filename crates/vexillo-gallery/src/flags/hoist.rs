//! Flags with a distinct shape at the hoist (pole side).

use vexillo_engine::coords::{Bounds, Rgb, Vec2};
use vexillo_engine::drawable::Emblem;
use vexillo_engine::geometry::{Axis, MeshBuilder, Rectangle};

/// Red vertical hoist bar, then green, white and black bands across the fly.
#[derive(Debug, Default, Clone, Copy)]
pub struct Uae;

impl Uae {
    const BOUNDS: Bounds = Bounds::centered(0.8, 0.75);
    const HOIST_RIGHT: f32 = -0.3;
}

impl Emblem for Uae {
    fn name(&self) -> &str {
        "UAE"
    }

    fn description(&self) -> &str {
        "Showing flag: UAE"
    }

    fn build_mesh(&self, mesh: &mut MeshBuilder) {
        let b = Self::BOUNDS;
        mesh.add_rectangle(&Rectangle::new(
            Vec2::new(b.left, b.bottom),
            Vec2::new(Self::HOIST_RIGHT, b.top),
            Rgb::new(0.8, 0.0, 0.0),
        ));
        mesh.add_bands(
            Bounds::new(Self::HOIST_RIGHT, b.right, b.top, b.bottom),
            Axis::Horizontal,
            &[Rgb::new(0.0, 0.6, 0.3), Rgb::white(), Rgb::black()],
        );
    }
}

/// Teal, gold and teal bands with a black triangle pointing in from the hoist.
#[derive(Debug, Default, Clone, Copy)]
pub struct Bahamas;

impl Bahamas {
    const BOUNDS: Bounds = Bounds::centered(0.8, 0.6);
    const TRIANGLE_REACH: f32 = 0.45;
}

impl Emblem for Bahamas {
    fn name(&self) -> &str {
        "Bahamas"
    }

    fn description(&self) -> &str {
        "Showing flag: Bahamas"
    }

    fn build_mesh(&self, mesh: &mut MeshBuilder) {
        let b = Self::BOUNDS;
        let teal = Rgb::new(0.0, 0.73, 0.67);

        mesh.add_bands(b, Axis::Horizontal, &[teal, Rgb::new(1.0, 0.84, 0.0), teal]);
        mesh.add_triangle(
            Vec2::new(b.left, b.bottom),
            Vec2::new(b.left + Self::TRIANGLE_REACH, 0.0),
            Vec2::new(b.left, b.top),
            Rgb::new(0.02, 0.02, 0.02),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(e: &impl Emblem) -> MeshBuilder {
        let mut mesh = MeshBuilder::new();
        e.build_mesh(&mut mesh);
        mesh
    }

    #[test]
    fn uae_hoist_stops_where_bands_start() {
        let mesh = build(&Uae);
        assert_eq!(mesh.triangle_count(), 8);
        let red: Vec<_> = mesh
            .vertices()
            .iter()
            .filter(|v| v.rgb() == Rgb::new(0.8, 0.0, 0.0))
            .map(|v| v.xy().x)
            .collect();
        assert_eq!(red.len(), 6);
        assert!(red.iter().all(|&x| x == -0.8 || x == -0.3));
        assert_eq!(mesh.bounds(), Some(Uae::BOUNDS));
    }

    #[test]
    fn bahamas_triangle_is_drawn_last_and_counter_clockwise() {
        let mesh = build(&Bahamas);
        let v = mesh.vertices();
        let n = v.len();
        let (a, b, c) = (v[n - 3].xy(), v[n - 2].xy(), v[n - 1].xy());
        assert!((b - a).cross(c - a) > 0.0);
        assert!(b.distance(Vec2::new(-0.35, 0.0)) < 1e-6);
    }

    #[test]
    fn bahamas_gold_band_is_a_third_of_the_height() {
        let mesh = build(&Bahamas);
        let gold = mesh.vertices().iter().filter(|v| v.rgb() == Rgb::new(1.0, 0.84, 0.0));
        assert!(gold.map(|v| v.xy().y.abs()).all(|y| (y - 0.2).abs() < 1e-5));
    }
}
