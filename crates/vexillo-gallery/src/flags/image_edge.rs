use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use image::{Rgba, RgbaImage};
use vexillo_engine::drawable::{Drawable, RenderArgs};
use vexillo_engine::render::{
    GeometryBuffer, RenderDevice, ShaderHandle, TextureHandle, TexturedVertex, TEXTURED_SHADER,
};

pub const NAME: &str = "ImageEdges";

/// Sobel magnitude above which a texel counts as an edge.
pub const EDGE_THRESHOLD: f32 = 0.2;

const HALF_WIDTH: f32 = 0.6;
const HALF_HEIGHT: f32 = 0.5;

const EDGE: Rgba<u8> = Rgba([255, 255, 255, 255]);
const EMPTY: Rgba<u8> = Rgba([0, 0, 0, 0]);

#[inline]
fn luminance([r, g, b, _]: [u8; 4]) -> f32 {
    (0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32) / 255.0
}

/// White opaque texels where the luminance gradient exceeds `threshold`,
/// transparent elsewhere. Samples past the border repeat the edge pixel.
pub fn edge_mask(image: &RgbaImage, threshold: f32) -> RgbaImage {
    let (w, h) = image.dimensions();
    let lum: Vec<f32> = image.pixels().map(|p| luminance(p.0)).collect();
    let at = |x: i64, y: i64| {
        let x = x.clamp(0, w as i64 - 1) as usize;
        let y = y.clamp(0, h as i64 - 1) as usize;
        lum[y * w as usize + x]
    };

    RgbaImage::from_fn(w, h, |x, y| {
        let (x, y) = (x as i64, y as i64);
        let gx = (at(x + 1, y - 1) + 2.0 * at(x + 1, y) + at(x + 1, y + 1))
            - (at(x - 1, y - 1) + 2.0 * at(x - 1, y) + at(x - 1, y + 1));
        let gy = (at(x - 1, y + 1) + 2.0 * at(x, y + 1) + at(x + 1, y + 1))
            - (at(x - 1, y - 1) + 2.0 * at(x, y - 1) + at(x + 1, y - 1));
        if (gx * gx + gy * gy).sqrt() > threshold { EDGE } else { EMPTY }
    })
}

/// Decodes `path`, flipped so row 0 is the bottom of the picture.
pub fn load_flipped(path: &Path) -> Result<RgbaImage> {
    let image = image::open(path).with_context(|| format!("failed to load image {}", path.display()))?;
    Ok(image.flipv().to_rgba8())
}

#[derive(Debug)]
enum Source {
    File(PathBuf),
    /// Already decoded, row 0 at the bottom.
    Pixels(RgbaImage),
}

/// Edge outline of an image drawn on a textured quad.
///
/// If the image or any device resource cannot be acquired the drawable stays
/// inert: `build` still succeeds and `render` draws nothing.
#[derive(Debug)]
pub struct ImageEdges {
    source: Source,
    quad: GeometryBuffer<TexturedVertex>,
    texture: Option<TextureHandle>,
    shader: Option<ShaderHandle>,
}

impl ImageEdges {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self::with_source(Source::File(path.into()))
    }

    pub fn from_image(image: RgbaImage) -> Self {
        Self::with_source(Source::Pixels(image))
    }

    fn with_source(source: Source) -> Self {
        Self {
            source,
            quad: GeometryBuffer::new(NAME),
            texture: None,
            shader: None,
        }
    }

    /// `true` once the texture, shader and quad are all on the device.
    pub fn is_ready(&self) -> bool {
        self.texture.is_some() && self.shader.is_some() && self.quad.is_uploaded()
    }

    fn acquire(&mut self, device: &mut dyn RenderDevice) -> Result<()> {
        let pixels = match &self.source {
            Source::File(path) => load_flipped(path)?,
            Source::Pixels(image) => image.clone(),
        };
        let mask = edge_mask(&pixels, EDGE_THRESHOLD);

        self.texture = Some(device.upload_texture(NAME, &mask)?);
        self.shader = Some(device.compile_shader(NAME, TEXTURED_SHADER)?);

        let (sx, sy) = (HALF_WIDTH, HALF_HEIGHT);
        self.quad.set_geometry(
            vec![
                TexturedVertex::new(-sx, -sy, 0.0, 0.0),
                TexturedVertex::new(sx, -sy, 1.0, 0.0),
                TexturedVertex::new(sx, sy, 1.0, 1.0),
                TexturedVertex::new(-sx, sy, 0.0, 1.0),
            ],
            vec![0, 1, 2, 2, 3, 0],
        );
        self.quad.upload(device)?;
        Ok(())
    }
}

impl Drawable for ImageEdges {
    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        "Edges of an image file, found with a Sobel filter and drawn as white lines."
    }

    fn build(&mut self, device: &mut dyn RenderDevice) -> Result<()> {
        self.teardown(device);
        if let Err(err) = self.acquire(device) {
            log::warn!("'{NAME}' stays inert: {err:#}");
            self.teardown(device);
        } else {
            log::debug!("built '{NAME}'");
        }
        Ok(())
    }

    fn render(&self, device: &mut dyn RenderDevice, args: &RenderArgs) {
        if !self.is_ready() {
            return;
        }
        if let (Some(shader), Some(texture)) = (self.shader, self.texture) {
            self.quad.draw_textured(device, shader, texture, args.viewport);
        }
    }

    fn teardown(&mut self, device: &mut dyn RenderDevice) {
        if let Some(texture) = self.texture.take() {
            device.release_texture(texture);
        }
        if let Some(shader) = self.shader.take() {
            device.release_shader(shader);
        }
        self.quad.teardown(device);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vexillo_engine::coords::Rgb;
    use vexillo_engine::render::{
        DeviceError, DrawCall, GeometryHandle, GeometryUpload, MaskPhase, SoftwareDevice,
        TexturedDrawCall,
    };

    #[derive(Debug, Copy, Clone, Eq, PartialEq)]
    enum Fail {
        Texture,
        Shader,
        Geometry,
    }

    /// Software device that refuses one kind of resource.
    struct Refusing {
        inner: SoftwareDevice,
        fail: Fail,
    }

    impl Refusing {
        fn new(fail: Fail) -> Self {
            Self { inner: SoftwareDevice::new(16, 16), fail }
        }

        fn live(&self) -> (usize, usize, usize) {
            (self.inner.live_textures(), self.inner.live_shaders(), self.inner.live_geometry())
        }
    }

    impl RenderDevice for Refusing {
        fn upload_geometry(&mut self, upload: GeometryUpload<'_>) -> Result<GeometryHandle, DeviceError> {
            if self.fail == Fail::Geometry {
                return Err(DeviceError::Geometry {
                    label: upload.label.to_string(),
                    message: "out of memory".to_string(),
                });
            }
            self.inner.upload_geometry(upload)
        }

        fn release_geometry(&mut self, handle: GeometryHandle) {
            self.inner.release_geometry(handle);
        }

        fn draw(&mut self, call: DrawCall) {
            self.inner.draw(call);
        }

        fn set_mask_phase(&mut self, phase: MaskPhase) {
            self.inner.set_mask_phase(phase);
        }

        fn mask_phase(&self) -> MaskPhase {
            self.inner.mask_phase()
        }

        fn clear_mask(&mut self) {
            self.inner.clear_mask();
        }

        fn compile_shader(&mut self, label: &str, wgsl: &str) -> Result<ShaderHandle, DeviceError> {
            if self.fail == Fail::Shader {
                return Err(DeviceError::Shader {
                    label: label.to_string(),
                    message: "validation error".to_string(),
                });
            }
            self.inner.compile_shader(label, wgsl)
        }

        fn release_shader(&mut self, handle: ShaderHandle) {
            self.inner.release_shader(handle);
        }

        fn upload_texture(&mut self, label: &str, image: &RgbaImage) -> Result<TextureHandle, DeviceError> {
            if self.fail == Fail::Texture {
                return Err(DeviceError::Texture {
                    label: label.to_string(),
                    message: "too large".to_string(),
                });
            }
            self.inner.upload_texture(label, image)
        }

        fn release_texture(&mut self, handle: TextureHandle) {
            self.inner.release_texture(handle);
        }

        fn draw_textured(&mut self, call: TexturedDrawCall) {
            self.inner.draw_textured(call);
        }
    }

    /// Black left half, white right half.
    fn split(w: u32, h: u32) -> RgbaImage {
        RgbaImage::from_fn(w, h, |x, _| {
            if x < w / 2 { Rgba([0, 0, 0, 255]) } else { Rgba([255, 255, 255, 255]) }
        })
    }

    // ── sobel ─────────────────────────────────────────────────────────────

    #[test]
    fn flat_image_has_no_edges() {
        let flat = RgbaImage::from_pixel(8, 8, Rgba([120, 40, 200, 255]));
        assert!(edge_mask(&flat, EDGE_THRESHOLD).pixels().all(|p| *p == EMPTY));
    }

    #[test]
    fn step_is_marked_on_both_sides() {
        let mask = edge_mask(&split(16, 4), EDGE_THRESHOLD);
        for y in 0..4 {
            assert_eq!(*mask.get_pixel(7, y), EDGE);
            assert_eq!(*mask.get_pixel(8, y), EDGE);
            assert_eq!(*mask.get_pixel(2, y), EMPTY);
            assert_eq!(*mask.get_pixel(13, y), EMPTY);
        }
    }

    #[test]
    fn faint_gradient_stays_below_threshold() {
        let ramp = RgbaImage::from_fn(16, 4, |x, _| {
            let v = (x * 2) as u8;
            Rgba([v, v, v, 255])
        });
        assert!(edge_mask(&ramp, EDGE_THRESHOLD).pixels().all(|p| *p == EMPTY));
    }

    #[test]
    fn luminance_weights_sum_to_one() {
        assert!((luminance([255, 255, 255, 255]) - 1.0).abs() < 1e-5);
        assert_eq!(luminance([0, 0, 0, 0]), 0.0);
    }

    // ── lifecycle ─────────────────────────────────────────────────────────

    #[test]
    fn missing_file_leaves_drawable_inert() {
        let mut device = SoftwareDevice::new(16, 16);
        let mut d = ImageEdges::from_path("does/not/exist.png");
        assert!(d.build(&mut device).is_ok());
        assert!(!d.is_ready());

        let args = RenderArgs::new(device.viewport(), 0.0);
        d.render(&mut device, &args);
        assert_eq!(device.draw_calls(), 0);
        assert_eq!(device.live_textures(), 0);
        assert_eq!(device.live_shaders(), 0);
    }

    #[test]
    fn draws_edges_over_the_background() {
        let mut device = SoftwareDevice::new(100, 100);
        device.clear(Rgb::new(0.0, 0.0, 1.0));
        let mut d = ImageEdges::from_image(split(16, 16));
        d.build(&mut device).unwrap();
        assert!(d.is_ready());

        let args = RenderArgs::new(device.viewport(), 0.0);
        d.render(&mut device, &args);
        assert_eq!(device.draw_calls(), 1);
        // the step sits in the middle of the quad
        assert_eq!(device.pixel(50, 50), [255, 255, 255, 255]);
        // flat region is transparent
        assert_eq!(device.pixel(30, 50), [0, 0, 255, 255]);
        // outside the quad
        assert_eq!(device.pixel(5, 50), [0, 0, 255, 255]);
    }

    #[test]
    fn teardown_releases_everything_once() {
        let mut device = SoftwareDevice::new(16, 16);
        let mut d = ImageEdges::from_image(split(8, 8));
        d.build(&mut device).unwrap();
        assert_eq!((device.live_textures(), device.live_shaders(), device.live_geometry()), (1, 1, 1));

        d.teardown(&mut device);
        d.teardown(&mut device);
        assert_eq!((device.live_textures(), device.live_shaders(), device.live_geometry()), (0, 0, 0));
        assert!(!d.is_ready());
    }

    #[test]
    fn refused_resources_leave_drawable_inert() {
        for fail in [Fail::Texture, Fail::Shader, Fail::Geometry] {
            let mut device = Refusing::new(fail);
            let mut d = ImageEdges::from_image(split(8, 8));
            assert!(d.build(&mut device).is_ok(), "{fail:?}");
            assert!(!d.is_ready(), "{fail:?}");
            assert_eq!(device.live(), (0, 0, 0), "{fail:?}");

            let args = RenderArgs::new(device.inner.viewport(), 0.0);
            d.render(&mut device, &args);
            assert_eq!(device.inner.draw_calls(), 0, "{fail:?}");
        }
    }

    #[test]
    fn rebuild_does_not_leak_device_resources() {
        let mut device = SoftwareDevice::new(16, 16);
        let mut d = ImageEdges::from_image(split(8, 8));
        d.build(&mut device).unwrap();
        d.build(&mut device).unwrap();
        assert!(d.is_ready());
        assert_eq!((device.live_textures(), device.live_shaders(), device.live_geometry()), (1, 1, 1));

        d.teardown(&mut device);
        assert_eq!((device.live_textures(), device.live_shaders(), device.live_geometry()), (0, 0, 0));
    }
}
