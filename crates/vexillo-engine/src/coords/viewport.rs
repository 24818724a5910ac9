use super::Vec2;

/// Render region in device pixels (top-left origin).
///
/// Emblem geometry lives in NDC; a viewport decides which part of the target
/// the `[-1, 1]` square maps onto.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct Viewport {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    #[inline]
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// Viewport covering a whole `width` x `height` target.
    #[inline]
    pub const fn full(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }

    #[inline]
    pub fn is_valid(self) -> bool {
        self.width > 0 && self.height > 0
    }

    /// Clamps the viewport so it lies inside a `width` x `height` target.
    ///
    /// Returns `None` when nothing of the viewport remains visible.
    pub fn clamped_to(self, width: u32, height: u32) -> Option<Viewport> {
        let x0 = self.x.min(width);
        let y0 = self.y.min(height);
        let x1 = self.x.saturating_add(self.width).min(width);
        let y1 = self.y.saturating_add(self.height).min(height);
        let v = Viewport::new(x0, y0, x1 - x0, y1 - y0);
        v.is_valid().then_some(v)
    }

    /// Maps an NDC point to continuous pixel coordinates (+Y down).
    #[inline]
    pub fn ndc_to_pixel(self, p: Vec2) -> Vec2 {
        Vec2::new(
            self.x as f32 + (p.x + 1.0) * 0.5 * self.width as f32,
            self.y as f32 + (1.0 - p.y) * 0.5 * self.height as f32,
        )
    }

    /// Maps the center of pixel `(px, py)` back to NDC.
    #[inline]
    pub fn pixel_to_ndc(self, px: u32, py: u32) -> Vec2 {
        let fx = (px as f32 + 0.5 - self.x as f32) / self.width.max(1) as f32;
        let fy = (py as f32 + 0.5 - self.y as f32) / self.height.max(1) as f32;
        Vec2::new(fx * 2.0 - 1.0, 1.0 - fy * 2.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ndc_corners_map_to_viewport_corners() {
        let vp = Viewport::new(10, 20, 100, 50);
        assert_eq!(vp.ndc_to_pixel(Vec2::new(-1.0, 1.0)), Vec2::new(10.0, 20.0));
        assert_eq!(vp.ndc_to_pixel(Vec2::new(1.0, -1.0)), Vec2::new(110.0, 70.0));
    }

    #[test]
    fn pixel_center_round_trips_through_ndc() {
        let vp = Viewport::full(64, 32);
        let p = vp.ndc_to_pixel(vp.pixel_to_ndc(7, 9));
        assert!((p.x - 7.5).abs() < 1e-4);
        assert!((p.y - 9.5).abs() < 1e-4);
    }

    #[test]
    fn clamped_outside_target_is_none() {
        assert!(Viewport::new(200, 0, 50, 50).clamped_to(100, 100).is_none());
        assert_eq!(
            Viewport::new(80, 0, 50, 50).clamped_to(100, 100),
            Some(Viewport::new(80, 0, 20, 50))
        );
    }
}
