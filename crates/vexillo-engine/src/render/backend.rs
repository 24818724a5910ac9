//! The device seam every buffer, drawable and compositor talks to.

use std::fmt;

use image::RgbaImage;

use crate::coords::Viewport;

use super::vertex::VertexKind;

/// Default horizontal wave amplitude in NDC.
pub const WAVE_AMPLITUDE: f32 = 0.03;

/// Device-side geometry allocation.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct GeometryHandle(pub(crate) u32);

/// Compiled shader program.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct ShaderHandle(pub(crate) u32);

/// Sampled RGBA texture.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct TextureHandle(pub(crate) u32);

/// How a geometry buffer's vertices are assembled into triangles.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum DrawMode {
    /// Triangle list through the index buffer.
    #[default]
    Indexed,
    /// Raw triangle list, every three vertices form a triangle.
    NonIndexed,
}

/// Mask (stencil) configuration applied to colored draws.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum MaskPhase {
    /// Color on, mask ignored.
    #[default]
    Plain,
    /// Color off, covered pixels get marked.
    Mark,
    /// Color on, written only where the mask is unmarked.
    Exclude,
}

/// Raw data for one geometry upload.
#[derive(Debug, Copy, Clone)]
pub struct GeometryUpload<'a> {
    pub label: &'a str,
    pub kind: VertexKind,
    pub vertex_bytes: &'a [u8],
    pub vertex_count: u32,
    /// Empty for [`DrawMode::NonIndexed`] geometry.
    pub indices: &'a [u32],
}

/// Per-draw shading inputs for the flag pipeline.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DrawParams {
    pub viewport: Viewport,
    /// Elapsed seconds, drives the wave.
    pub time: f32,
    /// Horizontal extent used to attenuate the wave towards the edges.
    pub half_width: f32,
    pub amplitude: f32,
}

/// One colored draw.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DrawCall {
    pub geometry: GeometryHandle,
    pub mode: DrawMode,
    /// Index count for indexed draws, vertex count otherwise.
    pub count: u32,
    pub params: DrawParams,
}

/// One textured draw through a custom shader.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TexturedDrawCall {
    pub geometry: GeometryHandle,
    pub mode: DrawMode,
    pub count: u32,
    pub shader: ShaderHandle,
    pub texture: TextureHandle,
    pub viewport: Viewport,
}

/// Failures reported by a [`RenderDevice`].
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceError {
    /// The upload does not describe valid geometry for this device.
    Geometry { label: String, message: String },
    /// Shader compilation or validation failed.
    Shader { label: String, message: String },
    /// The texture could not be created.
    Texture { label: String, message: String },
}

impl fmt::Display for DeviceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceError::Geometry { label, message } => {
                write!(f, "geometry upload '{label}' failed: {message}")
            }
            DeviceError::Shader { label, message } => {
                write!(f, "shader '{label}' failed to compile: {message}")
            }
            DeviceError::Texture { label, message } => {
                write!(f, "texture '{label}' could not be created: {message}")
            }
        }
    }
}

impl std::error::Error for DeviceError {}

/// Graphics device contract.
///
/// Implementations own every device resource behind the handles they return.
/// All calls happen on the thread that owns the device; draws are issued in
/// paint order.
pub trait RenderDevice {
    fn upload_geometry(&mut self, upload: GeometryUpload<'_>) -> Result<GeometryHandle, DeviceError>;

    /// Frees a geometry allocation. Unknown handles are ignored.
    fn release_geometry(&mut self, handle: GeometryHandle);

    fn draw(&mut self, call: DrawCall);

    fn set_mask_phase(&mut self, phase: MaskPhase);

    fn mask_phase(&self) -> MaskPhase;

    /// Resets every mask value to unmarked.
    fn clear_mask(&mut self);

    /// Compiles a WGSL program exposing `vs_main` / `fs_main` over
    /// [`TexturedVertex`](super::TexturedVertex) input, a texture at binding 0
    /// and a sampler at binding 1.
    fn compile_shader(&mut self, label: &str, wgsl: &str) -> Result<ShaderHandle, DeviceError>;

    fn release_shader(&mut self, handle: ShaderHandle);

    fn upload_texture(&mut self, label: &str, image: &RgbaImage) -> Result<TextureHandle, DeviceError>;

    fn release_texture(&mut self, handle: TextureHandle);

    fn draw_textured(&mut self, call: TexturedDrawCall);
}
