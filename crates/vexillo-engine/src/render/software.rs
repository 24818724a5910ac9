//! CPU rasterizer implementing [`RenderDevice`].
//!
//! Used for headless snapshots and for pixel-level tests. It keeps a color
//! target and a one-byte-per-pixel mask buffer with the same semantics as the
//! stencil attachment of the wgpu device. Custom shaders are checked for their
//! entry points only; textured draws sample the texture unshaded (nearest),
//! which matches the pass-through textured shader. The wave displacement is
//! not applied.

use std::collections::HashMap;

use image::{Rgba, RgbaImage};

use crate::coords::{Rgb, Vec2, Viewport};

use super::backend::{
    DeviceError, DrawCall, DrawMode, GeometryHandle, GeometryUpload, MaskPhase, RenderDevice,
    ShaderHandle, TextureHandle, TexturedDrawCall,
};
use super::vertex::{TexturedVertex, Vertex, VertexKind};

const MARKED: u8 = 1;

enum StoredVertices {
    Colored(Vec<Vertex>),
    Textured(Vec<TexturedVertex>),
}

struct StoredGeometry {
    label: String,
    vertices: StoredVertices,
    indices: Vec<u32>,
}

/// Software render target with a color buffer and a mask buffer.
pub struct SoftwareDevice {
    color: RgbaImage,
    mask: Vec<u8>,
    phase: MaskPhase,

    next_id: u32,
    geometry: HashMap<u32, StoredGeometry>,
    shaders: HashMap<u32, String>,
    textures: HashMap<u32, RgbaImage>,

    released: usize,
    draws: usize,
}

impl SoftwareDevice {
    /// Creates a `width` x `height` target cleared to opaque black.
    pub fn new(width: u32, height: u32) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        Self {
            color: RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 255])),
            mask: vec![0; pixel_count(width, height)],
            phase: MaskPhase::Plain,
            next_id: 1,
            geometry: HashMap::new(),
            shaders: HashMap::new(),
            textures: HashMap::new(),
            released: 0,
            draws: 0,
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.color.width()
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.color.height()
    }

    /// Viewport covering the whole target.
    #[inline]
    pub fn viewport(&self) -> Viewport {
        Viewport::full(self.width(), self.height())
    }

    /// Fills the color buffer. The mask is left untouched.
    pub fn clear(&mut self, color: Rgb) {
        let [r, g, b] = color.to_u8();
        for px in self.color.pixels_mut() {
            *px = Rgba([r, g, b, 255]);
        }
    }

    /// RGBA value at `(x, y)`; out-of-range reads return transparent black.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        self.color.get_pixel_checked(x, y).map_or([0; 4], |p| p.0)
    }

    /// Mask value at `(x, y)`.
    pub fn mask_value(&self, x: u32, y: u32) -> u8 {
        if x >= self.width() || y >= self.height() {
            return 0;
        }
        self.mask[self.mask_index(x, y)]
    }

    #[inline]
    pub fn image(&self) -> &RgbaImage {
        &self.color
    }

    /// Geometry allocations currently alive.
    #[inline]
    pub fn live_geometry(&self) -> usize {
        self.geometry.len()
    }

    /// Geometry allocations released so far.
    #[inline]
    pub fn released_geometry(&self) -> usize {
        self.released
    }

    #[inline]
    pub fn live_textures(&self) -> usize {
        self.textures.len()
    }

    #[inline]
    pub fn live_shaders(&self) -> usize {
        self.shaders.len()
    }

    /// Draw calls (colored and textured) issued so far.
    #[inline]
    pub fn draw_calls(&self) -> usize {
        self.draws
    }

    fn mask_index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width() as usize + x as usize
    }

    fn alloc_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1).max(1);
        id
    }

    fn shade(&mut self, x: u32, y: u32, src: [f32; 4]) {
        let idx = self.mask_index(x, y);
        match self.phase {
            MaskPhase::Mark => {
                self.mask[idx] = MARKED;
                return;
            }
            MaskPhase::Exclude if self.mask[idx] == MARKED => return,
            MaskPhase::Exclude | MaskPhase::Plain => {}
        }

        let dst = self.color.get_pixel_mut(x, y);
        let a = src[3].clamp(0.0, 1.0);
        for c in 0..3 {
            let d = dst.0[c] as f32 / 255.0;
            let out = src[c].clamp(0.0, 1.0) * a + d * (1.0 - a);
            dst.0[c] = (out * 255.0).round() as u8;
        }
        dst.0[3] = 255;
    }

    /// Scan-converts one triangle inside `region`, calling `fragment` with the
    /// barycentric weights of every covered pixel center.
    fn raster_triangle<F>(&mut self, region: Viewport, ndc: [Vec2; 3], mut fragment: F)
    where
        F: FnMut(&mut Self, u32, u32, [f32; 3]),
    {
        let p = ndc.map(|v| region.ndc_to_pixel(v));
        let area = (p[1] - p[0]).cross(p[2] - p[0]);
        if area.abs() <= f32::EPSILON {
            return;
        }

        let Some(clip) = region.clamped_to(self.width(), self.height()) else { return };
        let min_x = p.iter().map(|v| v.x).fold(f32::INFINITY, f32::min).floor().max(clip.x as f32);
        let max_x = p.iter().map(|v| v.x).fold(f32::NEG_INFINITY, f32::max).ceil().min((clip.x + clip.width) as f32);
        let min_y = p.iter().map(|v| v.y).fold(f32::INFINITY, f32::min).floor().max(clip.y as f32);
        let max_y = p.iter().map(|v| v.y).fold(f32::NEG_INFINITY, f32::max).ceil().min((clip.y + clip.height) as f32);
        if min_x >= max_x || min_y >= max_y {
            return;
        }

        for y in min_y as u32..max_y as u32 {
            for x in min_x as u32..max_x as u32 {
                let c = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                let w0 = (p[2] - p[1]).cross(c - p[1]) / area;
                let w1 = (p[0] - p[2]).cross(c - p[2]) / area;
                let w2 = 1.0 - w0 - w1;
                if w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0 {
                    fragment(self, x, y, [w0, w1, w2]);
                }
            }
        }
    }
}

/// Copies vertex bytes into typed storage; the byte slice need not be aligned.
fn collect_vertices<V: bytemuck::Pod>(upload: &GeometryUpload<'_>) -> Result<Vec<V>, DeviceError> {
    let stride = std::mem::size_of::<V>();
    if upload.vertex_bytes.len() % stride != 0 {
        return Err(DeviceError::Geometry {
            label: upload.label.to_string(),
            message: format!(
                "{} vertex bytes is not a multiple of the {stride}-byte stride",
                upload.vertex_bytes.len()
            ),
        });
    }
    Ok(bytemuck::pod_collect_to_vec(upload.vertex_bytes))
}

/// Vertex indices of the first `count` elements of a draw, grouped by triangle.
/// `width * height` without `u32` overflow.
fn pixel_count(width: u32, height: u32) -> usize {
    width as usize * height as usize
}

fn triangle_indices(mode: DrawMode, indices: &[u32], count: u32) -> Vec<[usize; 3]> {
    match mode {
        DrawMode::Indexed => indices
            .iter()
            .take(count as usize)
            .map(|&i| i as usize)
            .collect::<Vec<_>>()
            .chunks_exact(3)
            .map(|t| [t[0], t[1], t[2]])
            .collect(),
        DrawMode::NonIndexed => (0..count as usize / 3).map(|t| [t * 3, t * 3 + 1, t * 3 + 2]).collect(),
    }
}

impl RenderDevice for SoftwareDevice {
    fn upload_geometry(&mut self, upload: GeometryUpload<'_>) -> Result<GeometryHandle, DeviceError> {
        let vertices = match upload.kind {
            VertexKind::Colored => StoredVertices::Colored(collect_vertices(&upload)?),
            VertexKind::Textured => StoredVertices::Textured(collect_vertices(&upload)?),
        };

        let id = self.alloc_id();
        self.geometry.insert(
            id,
            StoredGeometry {
                label: upload.label.to_string(),
                vertices,
                indices: upload.indices.to_vec(),
            },
        );
        Ok(GeometryHandle(id))
    }

    fn release_geometry(&mut self, handle: GeometryHandle) {
        if self.geometry.remove(&handle.0).is_some() {
            self.released += 1;
        }
    }

    fn draw(&mut self, call: DrawCall) {
        let Some(stored) = self.geometry.get(&call.geometry.0) else {
            log::warn!("software device: draw with released geometry {:?}", call.geometry);
            return;
        };
        let StoredVertices::Colored(vertices) = &stored.vertices else {
            log::warn!("software device: '{}' is not colored geometry", stored.label);
            return;
        };

        self.draws += 1;
        let vertices = vertices.clone();
        let tris = triangle_indices(call.mode, &stored.indices, call.count);

        for [a, b, c] in tris {
            let (Some(va), Some(vb), Some(vc)) = (vertices.get(a), vertices.get(b), vertices.get(c)) else {
                continue;
            };
            let (va, vb, vc) = (*va, *vb, *vc);
            self.raster_triangle(call.params.viewport, [va.xy(), vb.xy(), vc.xy()], |dev, x, y, w| {
                let mut rgba = [0.0, 0.0, 0.0, 1.0];
                for ch in 0..3 {
                    rgba[ch] = va.color[ch] * w[0] + vb.color[ch] * w[1] + vc.color[ch] * w[2];
                }
                dev.shade(x, y, rgba);
            });
        }
    }

    fn set_mask_phase(&mut self, phase: MaskPhase) {
        self.phase = phase;
    }

    fn mask_phase(&self) -> MaskPhase {
        self.phase
    }

    fn clear_mask(&mut self) {
        self.mask.fill(0);
    }

    fn compile_shader(&mut self, label: &str, wgsl: &str) -> Result<ShaderHandle, DeviceError> {
        let missing: Vec<&str> = ["vs_main", "fs_main"]
            .into_iter()
            .filter(|entry| !wgsl.contains(entry))
            .collect();
        if !missing.is_empty() {
            return Err(DeviceError::Shader {
                label: label.to_string(),
                message: format!("missing entry point(s): {}", missing.join(", ")),
            });
        }
        let id = self.alloc_id();
        self.shaders.insert(id, label.to_string());
        Ok(ShaderHandle(id))
    }

    fn release_shader(&mut self, handle: ShaderHandle) {
        self.shaders.remove(&handle.0);
    }

    fn upload_texture(&mut self, label: &str, image: &RgbaImage) -> Result<TextureHandle, DeviceError> {
        if image.width() == 0 || image.height() == 0 {
            return Err(DeviceError::Texture {
                label: label.to_string(),
                message: "zero-sized image".to_string(),
            });
        }
        let id = self.alloc_id();
        self.textures.insert(id, image.clone());
        Ok(TextureHandle(id))
    }

    fn release_texture(&mut self, handle: TextureHandle) {
        self.textures.remove(&handle.0);
    }

    fn draw_textured(&mut self, call: TexturedDrawCall) {
        if !self.shaders.contains_key(&call.shader.0) {
            log::warn!("software device: textured draw with unknown shader {:?}", call.shader);
            return;
        }
        let Some(texture) = self.textures.get(&call.texture.0).cloned() else {
            log::warn!("software device: textured draw with unknown texture {:?}", call.texture);
            return;
        };
        let Some(stored) = self.geometry.get(&call.geometry.0) else { return };
        let StoredVertices::Textured(vertices) = &stored.vertices else {
            log::warn!("software device: '{}' is not textured geometry", stored.label);
            return;
        };

        self.draws += 1;
        let vertices = vertices.clone();
        let tris = triangle_indices(call.mode, &stored.indices, call.count);
        let (tw, th) = texture.dimensions();

        // Textured draws ignore the mask, matching the wgpu textured pipeline.
        let phase = std::mem::replace(&mut self.phase, MaskPhase::Plain);
        for [a, b, c] in tris {
            let (Some(va), Some(vb), Some(vc)) = (vertices.get(a), vertices.get(b), vertices.get(c)) else {
                continue;
            };
            let (va, vb, vc) = (*va, *vb, *vc);
            let ndc = [va, vb, vc].map(|v| Vec2::new(v.position[0], v.position[1]));
            self.raster_triangle(call.viewport, ndc, |dev, x, y, w| {
                let u = va.uv[0] * w[0] + vb.uv[0] * w[1] + vc.uv[0] * w[2];
                let v = va.uv[1] * w[0] + vb.uv[1] * w[1] + vc.uv[1] * w[2];
                let tx = ((u * tw as f32) as u32).min(tw - 1);
                let ty = ((v * th as f32) as u32).min(th - 1);
                let texel = texture.get_pixel(tx, ty).0;
                dev.shade(x, y, texel.map(|c| c as f32 / 255.0));
            });
        }
        self.phase = phase;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{DrawParams, GeometryBuffer};

    fn params(device: &SoftwareDevice) -> DrawParams {
        DrawParams {
            viewport: device.viewport(),
            time: 0.0,
            half_width: 1.0,
            amplitude: 0.0,
        }
    }

    fn quad(label: &str, half: f32, color: Rgb) -> GeometryBuffer {
        let corners = [
            Vec2::new(-half, -half),
            Vec2::new(half, -half),
            Vec2::new(half, half),
            Vec2::new(-half, half),
        ];
        let mut buf = GeometryBuffer::new(label);
        buf.set_geometry(corners.map(|p| Vertex::new(p, 0.0, color)).to_vec(), vec![0, 1, 2, 0, 2, 3]);
        buf
    }

    #[test]
    fn full_screen_quad_covers_every_pixel() {
        let mut device = SoftwareDevice::new(8, 8);
        let mut buf = quad("full", 1.0, Rgb::white());
        buf.upload(&mut device).unwrap();
        let p = params(&device);
        buf.draw(&mut device, p);
        for y in 0..8 {
            for x in 0..8 {
                assert_eq!(device.pixel(x, y), [255, 255, 255, 255], "({x}, {y})");
            }
        }
    }

    #[test]
    fn mark_phase_writes_mask_not_color() {
        let mut device = SoftwareDevice::new(8, 8);
        let mut buf = quad("mask", 1.0, Rgb::white());
        buf.upload(&mut device).unwrap();
        device.set_mask_phase(MaskPhase::Mark);
        let p = params(&device);
        buf.draw(&mut device, p);
        assert_eq!(device.pixel(3, 3), [0, 0, 0, 255]);
        assert_eq!(device.mask_value(3, 3), MARKED);

        device.clear_mask();
        assert_eq!(device.mask_value(3, 3), 0);
    }

    #[test]
    fn exclude_phase_skips_marked_pixels() {
        let mut device = SoftwareDevice::new(8, 8);
        let mut hole = quad("hole", 0.5, Rgb::black());
        let mut body = quad("body", 1.0, Rgb::new(1.0, 0.0, 0.0));
        hole.upload(&mut device).unwrap();
        body.upload(&mut device).unwrap();

        device.set_mask_phase(MaskPhase::Mark);
        let p = params(&device);
        hole.draw(&mut device, p);
        device.set_mask_phase(MaskPhase::Exclude);
        let p = params(&device);
        body.draw(&mut device, p);

        assert_eq!(device.pixel(4, 4), [0, 0, 0, 255]);
        assert_eq!(device.pixel(0, 0), [255, 0, 0, 255]);
    }

    #[test]
    fn viewport_limits_coverage() {
        let mut device = SoftwareDevice::new(8, 8);
        let mut buf = quad("full", 1.0, Rgb::white());
        buf.upload(&mut device).unwrap();
        let mut p = params(&device);
        p.viewport = Viewport::new(4, 0, 4, 8);
        buf.draw(&mut device, p);
        assert_eq!(device.pixel(1, 1), [0, 0, 0, 255]);
        assert_eq!(device.pixel(6, 1), [255, 255, 255, 255]);
    }

    #[test]
    fn shader_without_entry_points_is_rejected() {
        let mut device = SoftwareDevice::new(4, 4);
        let err = device.compile_shader("broken", "fn main() {}").unwrap_err();
        assert!(matches!(err, DeviceError::Shader { .. }));
        assert_eq!(device.live_shaders(), 0);
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn pixel_count_does_not_wrap_in_u32() {
        assert_eq!(pixel_count(70_000, 70_000) as u64, 4_900_000_000);
    }

    #[test]
    fn mask_is_row_major() {
        let mut device = SoftwareDevice::new(3, 2);
        device.set_mask_phase(MaskPhase::Mark);
        device.shade(2, 1, [1.0; 4]);
        assert_eq!(device.mask_value(2, 1), MARKED);
        assert_eq!(device.mask_value(1, 2), 0);
        assert_eq!(device.mask_value(0, 1), 0);
    }
}
