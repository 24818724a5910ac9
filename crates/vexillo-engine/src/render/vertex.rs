use bytemuck::{Pod, Zeroable};

use crate::coords::{Rgb, Vec2};

/// Flag pipeline vertex: position (x, y, z) + color (r, g, b).
///
/// `z` is a paint-order hint only. No depth test runs; later draws cover
/// earlier ones.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub color: [f32; 3],
}

impl Vertex {
    const ATTRS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
        0 => Float32x3, // position
        1 => Float32x3  // color
    ];

    #[inline]
    pub fn new(p: Vec2, z: f32, color: Rgb) -> Self {
        Self {
            position: [p.x, p.y, z],
            color: color.to_array(),
        }
    }

    #[inline]
    pub fn xy(&self) -> Vec2 {
        Vec2::new(self.position[0], self.position[1])
    }

    #[inline]
    pub fn rgb(&self) -> Rgb {
        Rgb::from(self.color)
    }

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

/// Textured pipeline vertex: NDC position (x, y) + texture coordinate (u, v).
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct TexturedVertex {
    pub position: [f32; 2],
    pub uv: [f32; 2],
}

impl TexturedVertex {
    const ATTRS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
        0 => Float32x2, // position
        1 => Float32x2  // uv
    ];

    #[inline]
    pub const fn new(x: f32, y: f32, u: f32, v: f32) -> Self {
        Self { position: [x, y], uv: [u, v] }
    }

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<TexturedVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

/// Vertex formats a [`RenderDevice`](super::RenderDevice) knows how to draw.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum VertexKind {
    Colored,
    Textured,
}

/// Implemented by the vertex types a [`GeometryBuffer`](super::GeometryBuffer) can hold.
pub trait VertexFormat: Pod {
    const KIND: VertexKind;

    /// Position in NDC, used for bounds and validation.
    fn ndc(&self) -> Vec2;
}

impl VertexFormat for Vertex {
    const KIND: VertexKind = VertexKind::Colored;

    #[inline]
    fn ndc(&self) -> Vec2 {
        self.xy()
    }
}

impl VertexFormat for TexturedVertex {
    const KIND: VertexKind = VertexKind::Textured;

    #[inline]
    fn ndc(&self) -> Vec2 {
        Vec2::new(self.position[0], self.position[1])
    }
}
