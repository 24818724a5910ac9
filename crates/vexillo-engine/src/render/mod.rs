//! Rendering subsystem.
//!
//! Everything above this module talks to a [`RenderDevice`]. Two devices exist:
//! [`WgpuDevice`] records a frame and encodes it into wgpu render passes, and
//! [`SoftwareDevice`] rasterizes on the CPU for snapshots and tests.
//!
//! Convention:
//! - Geometry is in NDC (+Y up), placed on the target by a [`Viewport`](crate::coords::Viewport).
//! - Triangles are counter-clockwise; culling is off.

mod backend;
mod geometry_buffer;
mod software;
mod stencil;
mod vertex;
mod wgpu_device;

pub use backend::{
    DeviceError, DrawCall, DrawMode, DrawParams, GeometryHandle, GeometryUpload, MaskPhase,
    RenderDevice, ShaderHandle, TextureHandle, TexturedDrawCall, WAVE_AMPLITUDE,
};
pub use geometry_buffer::{GeometryBuffer, GeometryError};
pub use software::SoftwareDevice;
pub use stencil::{BodyStage, MaskStage, OverlayStage, StencilCompositor};
pub use vertex::{TexturedVertex, Vertex, VertexFormat, VertexKind};
pub use wgpu_device::WgpuDevice;

/// WGSL source of the pass-through textured shader.
pub const TEXTURED_SHADER: &str = include_str!("shaders/textured.wgsl");
