use crate::coords::{Bounds, Edge, Rgb, Vec2};

/// Axis-aligned rectangle between two corners.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Rectangle {
    pub min: Vec2,
    pub max: Vec2,
    pub color: Rgb,
}

impl Rectangle {
    /// Corners may be given in any order.
    pub fn new(a: Vec2, b: Vec2, color: Rgb) -> Self {
        Self {
            min: Vec2::new(a.x.min(b.x), a.y.min(b.y)),
            max: Vec2::new(a.x.max(b.x), a.y.max(b.y)),
            color,
        }
    }

    #[inline]
    pub fn from_bounds(bounds: Bounds, color: Rgb) -> Self {
        Self::new(bounds.bottom_left(), bounds.top_right(), color)
    }

    #[inline]
    pub fn bounds(&self) -> Bounds {
        Bounds::new(self.min.x, self.max.x, self.max.y, self.min.y)
    }

    /// Corners counter-clockwise from bottom-left.
    #[inline]
    pub fn corners(&self) -> [Vec2; 4] {
        [
            self.min,
            Vec2::new(self.max.x, self.min.y),
            self.max,
            Vec2::new(self.min.x, self.max.y),
        ]
    }

    #[inline]
    pub fn area(&self) -> f32 {
        (self.max.x - self.min.x) * (self.max.y - self.min.y)
    }
}

/// Regular polygon approximating a disc.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Fan {
    pub center: Vec2,
    pub radius: f32,
    pub segments: u32,
    pub color: Rgb,
}

impl Fan {
    pub const MIN_SEGMENTS: u32 = 3;

    #[inline]
    pub fn new(center: Vec2, radius: f32, segments: u32, color: Rgb) -> Self {
        Self { center, radius, segments, color }
    }

    /// Segment count actually emitted.
    #[inline]
    pub fn effective_segments(&self) -> u32 {
        self.segments.max(Self::MIN_SEGMENTS)
    }

    /// Boundary point `i`; `point(effective_segments())` is exactly `point(0)`.
    pub fn point(&self, i: u32) -> Vec2 {
        let n = self.effective_segments();
        let i = i % n;
        let theta = std::f32::consts::TAU * i as f32 / n as f32;
        self.center + Vec2::from_angle(theta) * self.radius
    }
}

/// Rectangle rotated about a center, optionally shifted along its local Y.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RotatedBand {
    pub center: Vec2,
    pub half_width: f32,
    pub half_height: f32,
    /// Radians, counter-clockwise.
    pub angle: f32,
    /// Local vertical shift applied before rotation.
    pub offset: f32,
    pub color: Rgb,
}

impl RotatedBand {
    /// Corners counter-clockwise from local bottom-left, in world space.
    pub fn corners(&self) -> [Vec2; 4] {
        let (hw, hh, o) = (self.half_width, self.half_height, self.offset);
        [
            Vec2::new(-hw, -hh + o),
            Vec2::new(hw, -hh + o),
            Vec2::new(hw, hh + o),
            Vec2::new(-hw, hh + o),
        ]
        .map(|p| self.center + p.rotated(self.angle))
    }
}

/// Curved strip swept along a sine-bulged centerline.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TaperingStrip {
    pub start: Vec2,
    /// Direction of travel, radians.
    pub angle: f32,
    pub length: f32,
    /// Peak sideways displacement of the centerline at `t = 0.5`.
    pub bulge: f32,
    pub segments: u32,
    pub color: Rgb,
}

impl TaperingStrip {
    /// Number of centerline samples (at least two).
    #[inline]
    pub fn samples(&self) -> u32 {
        self.segments.max(1) + 1
    }

    /// Centerline point and tangent at `t` in `[0, 1]`.
    pub fn frame(&self, t: f32) -> (Vec2, Vec2) {
        use std::f32::consts::PI;

        let dir = Vec2::from_angle(self.angle);
        let perp = dir.perp();
        let center = self.start + dir * (t * self.length) + perp * (self.bulge * (PI * t).sin());
        let tangent = dir * self.length + perp * (self.bulge * PI * (PI * t).cos());
        (center, tangent)
    }

    #[inline]
    pub fn end(&self) -> Vec2 {
        self.frame(1.0).0
    }
}

/// Triangular notch pointing into a shape from one of its edges.
///
/// `p0 -> p1` must follow the counter-clockwise boundary of the shape so the
/// apex lands inside it.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CutoutWedge {
    pub p0: Vec2,
    pub p1: Vec2,
    pub depth: f32,
}

impl CutoutWedge {
    #[inline]
    pub fn new(p0: Vec2, p1: Vec2, depth: f32) -> Self {
        Self { p0, p1, depth }
    }

    pub fn apex(&self) -> Vec2 {
        let mid = self.p0.lerp(self.p1, 0.5);
        mid + (self.p1 - self.p0).normalized().perp() * self.depth
    }
}

/// `count` equal wedges side by side along one edge of `bounds`.
pub fn edge_wedges(bounds: Bounds, edge: Edge, count: u32, depth: f32) -> Vec<CutoutWedge> {
    let (a, b) = bounds.edge_points(edge);
    (0..count)
        .map(|i| {
            let t0 = i as f32 / count as f32;
            let t1 = (i + 1) as f32 / count as f32;
            CutoutWedge::new(a.lerp(b, t0), a.lerp(b, t1), depth)
        })
        .collect()
}
