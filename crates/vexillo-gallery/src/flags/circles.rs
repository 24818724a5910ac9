//! Flags built around a disc.

use vexillo_engine::coords::{Bounds, Rgb, Vec2};
use vexillo_engine::drawable::Emblem;
use vexillo_engine::geometry::{Fan, MeshBuilder, Rectangle, RotatedBand};

/// White field with a red sun.
#[derive(Debug, Default, Clone, Copy)]
pub struct Japan;

impl Japan {
    pub const SUN_RADIUS: f32 = 0.25;
    pub const SUN_SEGMENTS: u32 = 64;
    pub const SUN: Rgb = Rgb::new(0.85, 0.1, 0.15);
}

impl Emblem for Japan {
    fn name(&self) -> &str {
        "Japan"
    }

    fn description(&self) -> &str {
        "Showing flag: Japan"
    }

    fn build_mesh(&self, mesh: &mut MeshBuilder) {
        mesh.add_rectangle(&Rectangle::from_bounds(Bounds::centered(0.8, 0.5), Rgb::white()));
        mesh.set_layer(0.01).add_regular_fan(&Fan::new(
            Vec2::zero(),
            Self::SUN_RADIUS,
            Self::SUN_SEGMENTS,
            Self::SUN,
        ));
    }
}

/// Green field, yellow rhombus, blue globe crossed by a tilted white band,
/// and a few stars.
#[derive(Debug, Default, Clone, Copy)]
pub struct Brazil;

impl Brazil {
    const GLOBE_RADIUS: f32 = 0.25;
    const GLOBE_SEGMENTS: u32 = 48;
    const STARS: [Vec2; 3] = [Vec2::new(-0.05, 0.05), Vec2::new(0.12, 0.0), Vec2::new(-0.12, -0.05)];
    const STAR_SIZE: f32 = 0.02;
}

impl Emblem for Brazil {
    fn name(&self) -> &str {
        "Brazil"
    }

    fn description(&self) -> &str {
        "Showing flag: Brazil"
    }

    fn build_mesh(&self, mesh: &mut MeshBuilder) {
        let yellow = Rgb::new(1.0, 0.85, 0.0);
        let (rx, ry) = (0.5, 0.35);

        mesh.add_rectangle(&Rectangle::from_bounds(Bounds::centered(0.9, 0.7), Rgb::new(0.0, 0.45, 0.2)));
        mesh.add_quad(
            [Vec2::new(0.0, -ry), Vec2::new(rx, 0.0), Vec2::new(0.0, ry), Vec2::new(-rx, 0.0)],
            yellow,
        );

        mesh.set_layer(0.01).add_regular_fan(&Fan::new(
            Vec2::zero(),
            Self::GLOBE_RADIUS,
            Self::GLOBE_SEGMENTS,
            Rgb::new(0.06, 0.39, 0.64),
        ));

        mesh.set_layer(0.02).add_rotated_band(&RotatedBand {
            center: Vec2::zero(),
            half_width: 0.45,
            half_height: 0.04,
            angle: (-15.0f32).to_radians(),
            offset: 0.06,
            color: Rgb::white(),
        });

        mesh.set_layer(0.03);
        let s = Self::STAR_SIZE;
        for c in Self::STARS {
            mesh.add_triangle(
                c + Vec2::new(0.0, -s),
                c + Vec2::new(s, s),
                c + Vec2::new(-s, s),
                Rgb::white(),
            );
        }
    }
}
