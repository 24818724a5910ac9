use super::Vec2;

/// One side of a [`Bounds`] box.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Edge {
    Left,
    Right,
    Top,
    Bottom,
}

/// Axis-aligned extents in NDC (+Y up, so `top >= bottom`).
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Bounds {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
}

impl Bounds {
    #[inline]
    pub const fn new(left: f32, right: f32, top: f32, bottom: f32) -> Self {
        Self { left, right, top, bottom }
    }

    /// Bounds centered on the origin.
    #[inline]
    pub const fn centered(half_width: f32, half_height: f32) -> Self {
        Self::new(-half_width, half_width, half_height, -half_height)
    }

    /// Smallest bounds containing every point, or `None` for an empty iterator.
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = Vec2>,
    {
        let mut it = points.into_iter();
        let first = it.next()?;
        let mut b = Bounds::new(first.x, first.x, first.y, first.y);
        for p in it {
            b.left = b.left.min(p.x);
            b.right = b.right.max(p.x);
            b.top = b.top.max(p.y);
            b.bottom = b.bottom.min(p.y);
        }
        Some(b)
    }

    #[inline]
    pub fn width(self) -> f32 {
        self.right - self.left
    }

    #[inline]
    pub fn height(self) -> f32 {
        self.top - self.bottom
    }

    #[inline]
    pub fn center(self) -> Vec2 {
        Vec2::new((self.left + self.right) * 0.5, (self.top + self.bottom) * 0.5)
    }

    #[inline]
    pub fn bottom_left(self) -> Vec2 {
        Vec2::new(self.left, self.bottom)
    }

    #[inline]
    pub fn top_right(self) -> Vec2 {
        Vec2::new(self.right, self.top)
    }

    /// Largest horizontal distance from the vertical axis; used as the wave
    /// attenuation width.
    #[inline]
    pub fn half_width(self) -> f32 {
        self.left.abs().max(self.right.abs())
    }

    /// Closed containment test.
    #[inline]
    pub fn contains(self, p: Vec2) -> bool {
        p.x >= self.left && p.x <= self.right && p.y >= self.bottom && p.y <= self.top
    }

    /// Endpoints of `edge`, ordered so the box interior is on their left
    /// (counter-clockwise boundary traversal).
    pub fn edge_points(self, edge: Edge) -> (Vec2, Vec2) {
        let bl = Vec2::new(self.left, self.bottom);
        let br = Vec2::new(self.right, self.bottom);
        let tr = Vec2::new(self.right, self.top);
        let tl = Vec2::new(self.left, self.top);
        match edge {
            Edge::Bottom => (bl, br),
            Edge::Right => (br, tr),
            Edge::Top => (tr, tl),
            Edge::Left => (tl, bl),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_points_spans_extremes() {
        let b = Bounds::from_points([
            Vec2::new(-0.5, 0.2),
            Vec2::new(0.3, -0.7),
            Vec2::new(0.1, 0.9),
        ])
        .unwrap();
        assert_eq!(b, Bounds::new(-0.5, 0.3, 0.9, -0.7));
    }

    #[test]
    fn from_points_empty_is_none() {
        assert!(Bounds::from_points(std::iter::empty()).is_none());
    }

    #[test]
    fn edge_points_keep_interior_on_the_left() {
        let b = Bounds::centered(0.8, 0.6);
        for edge in [Edge::Left, Edge::Right, Edge::Top, Edge::Bottom] {
            let (p0, p1) = b.edge_points(edge);
            let to_center = b.center() - p0;
            assert!((p1 - p0).cross(to_center) > 0.0, "{edge:?}");
        }
    }

    #[test]
    fn half_width_uses_farthest_side() {
        assert_eq!(Bounds::new(-0.9, 0.4, 0.5, -0.5).half_width(), 0.9);
    }
}
