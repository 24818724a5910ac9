use crate::coords::{Bounds, Rgb, Vec2};
use crate::render::Vertex;

use super::shapes::{CutoutWedge, Fan, Rectangle, RotatedBand, TaperingStrip};

/// Band direction for [`MeshBuilder::add_bands`].
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Axis {
    /// Stacked top to bottom.
    Horizontal,
    /// Side by side, left to right.
    Vertical,
}

/// Accumulates triangle-list geometry for one mesh.
///
/// Unless noted otherwise, every triangle gets three fresh vertices and the
/// next three sequential indices, so the index list of a mesh built only from
/// unshared primitives is `0..vertex_count`. All primitives are emitted
/// counter-clockwise. Output depends only on the inputs and call order.
#[derive(Debug, Default, Clone)]
pub struct MeshBuilder {
    vertices: Vec<Vertex>,
    indices: Vec<u32>,
    layer: f32,
}

impl MeshBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the `z` paint-order hint for vertices emitted from now on.
    pub fn set_layer(&mut self, z: f32) -> &mut Self {
        self.layer = z;
        self
    }

    #[inline]
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    #[inline]
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::from_points(self.vertices.iter().map(Vertex::xy))
    }

    pub fn add_triangle(&mut self, a: Vec2, b: Vec2, c: Vec2, color: Rgb) -> &mut Self {
        let base = self.vertices.len() as u32;
        let z = self.layer;
        self.vertices.extend([a, b, c].map(|p| Vertex::new(p, z, color)));
        self.indices.extend([base, base + 1, base + 2]);
        self
    }

    /// Two triangles split along the bottom-left to top-right diagonal.
    pub fn add_rectangle(&mut self, rect: &Rectangle) -> &mut Self {
        self.add_quad(rect.corners(), rect.color)
    }

    /// Convex quad given counter-clockwise from its bottom-left corner.
    pub fn add_quad(&mut self, corners: [Vec2; 4], color: Rgb) -> &mut Self {
        let [bl, br, tr, tl] = corners;
        self.add_triangle(bl, br, tr, color);
        self.add_triangle(bl, tr, tl, color)
    }

    /// `segments` triangles around the center, closing exactly on the first
    /// boundary point.
    pub fn add_regular_fan(&mut self, fan: &Fan) -> &mut Self {
        let n = fan.effective_segments();
        let first = fan.point(0);
        let mut prev = first;
        for i in 1..=n {
            let next = if i == n { first } else { fan.point(i) };
            self.add_triangle(fan.center, prev, next, fan.color);
            prev = next;
        }
        self
    }

    pub fn add_rotated_band(&mut self, band: &RotatedBand) -> &mut Self {
        self.add_quad(band.corners(), band.color)
    }

    /// Sweeps `thickness(t)` either side of the strip's curved centerline.
    ///
    /// Offsets follow the normal of the local tangent, so the strip keeps its
    /// width through the bulge.
    pub fn add_tapering_strip<F>(&mut self, strip: &TaperingStrip, thickness: F) -> &mut Self
    where
        F: Fn(f32) -> f32,
    {
        let samples = strip.samples();
        let rails: Vec<(Vec2, Vec2)> = (0..samples)
            .map(|i| {
                let t = i as f32 / (samples - 1) as f32;
                let (center, tangent) = strip.frame(t);
                let normal = tangent.normalized().perp() * thickness(t).max(0.0);
                (center - normal, center + normal)
            })
            .collect();

        for pair in rails.windows(2) {
            let (right0, left0) = pair[0];
            let (right1, left1) = pair[1];
            self.add_quad([right0, right1, left1, left0], strip.color);
        }
        self
    }

    /// Mask-only triangle; its color never reaches the target.
    pub fn add_cutout_wedge(&mut self, wedge: &CutoutWedge) -> &mut Self {
        self.add_triangle(wedge.p0, wedge.p1, wedge.apex(), Rgb::white())
    }

    /// Equal bands filling `bounds`, one per color.
    ///
    /// The last band ends exactly on the far side of `bounds`.
    pub fn add_bands(&mut self, bounds: Bounds, axis: Axis, colors: &[Rgb]) -> &mut Self {
        for rect in band_rectangles(bounds, axis, colors) {
            self.add_rectangle(&rect);
        }
        self
    }

    /// `cols` x `rows` grid of cells over the rectangle sharing their corner
    /// vertices, so a vertex-stage deformation stays seamless.
    pub fn add_tessellated_rectangle(&mut self, rect: &Rectangle, cols: u32, rows: u32) -> &mut Self {
        let (cols, rows) = (cols.max(1), rows.max(1));
        let base = self.vertices.len() as u32;
        let z = self.layer;

        for r in 0..=rows {
            let y = if r == rows { rect.max.y } else { rect.min.y + (rect.max.y - rect.min.y) * r as f32 / rows as f32 };
            for c in 0..=cols {
                let x = if c == cols { rect.max.x } else { rect.min.x + (rect.max.x - rect.min.x) * c as f32 / cols as f32 };
                self.vertices.push(Vertex::new(Vec2::new(x, y), z, rect.color));
            }
        }

        let stride = cols + 1;
        for r in 0..rows {
            for c in 0..cols {
                let bl = base + r * stride + c;
                let br = bl + 1;
                let tl = bl + stride;
                let tr = tl + 1;
                self.indices.extend([bl, br, tr, bl, tr, tl]);
            }
        }
        self
    }

    /// Returns `(vertices, indices)`.
    pub fn finish(self) -> (Vec<Vertex>, Vec<u32>) {
        (self.vertices, self.indices)
    }
}

/// Splits `bounds` into one equal band per color, top to bottom or left to right.
///
/// The last band is snapped to the far edge so no sliver is left uncovered.
pub fn band_rectangles(bounds: Bounds, axis: Axis, colors: &[Rgb]) -> Vec<Rectangle> {
    let n = colors.len();
    colors
        .iter()
        .enumerate()
        .map(|(i, &color)| match axis {
            Axis::Horizontal => {
                let step = bounds.height() / n as f32;
                let top = bounds.top - step * i as f32;
                let bottom = if i + 1 == n { bounds.bottom } else { bounds.top - step * (i + 1) as f32 };
                Rectangle::new(Vec2::new(bounds.left, bottom), Vec2::new(bounds.right, top), color)
            }
            Axis::Vertical => {
                let step = bounds.width() / n as f32;
                let left = bounds.left + step * i as f32;
                let right = if i + 1 == n { bounds.right } else { bounds.left + step * (i + 1) as f32 };
                Rectangle::new(Vec2::new(left, bounds.bottom), Vec2::new(right, bounds.top), color)
            }
        })
        .collect()
}
