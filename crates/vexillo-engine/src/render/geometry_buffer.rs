use std::fmt;

use crate::coords::{Bounds, Viewport};

use super::backend::{
    DeviceError, DrawCall, DrawMode, DrawParams, GeometryHandle, GeometryUpload, RenderDevice,
    ShaderHandle, TextureHandle, TexturedDrawCall,
};
use super::vertex::{TexturedVertex, Vertex, VertexFormat};

/// Geometry that violates the triangle-list invariants, or that the device refused.
#[derive(Debug, Clone, PartialEq)]
pub enum GeometryError {
    /// Indexed geometry whose index count is not a multiple of three.
    IndexCount { label: String, count: usize },
    /// An index points past the end of the vertex list.
    IndexOutOfRange { label: String, index: u32, vertex_count: usize },
    /// Non-indexed geometry whose vertex count is not a multiple of three.
    VertexCount { label: String, count: usize },
    Device(DeviceError),
}

impl fmt::Display for GeometryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeometryError::IndexCount { label, count } => {
                write!(f, "'{label}': {count} indices do not form whole triangles")
            }
            GeometryError::IndexOutOfRange { label, index, vertex_count } => {
                write!(f, "'{label}': index {index} out of range for {vertex_count} vertices")
            }
            GeometryError::VertexCount { label, count } => {
                write!(f, "'{label}': {count} raw vertices do not form whole triangles")
            }
            GeometryError::Device(e) => e.fmt(f),
        }
    }
}

impl std::error::Error for GeometryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GeometryError::Device(e) => Some(e),
            _ => None,
        }
    }
}

impl From<DeviceError> for GeometryError {
    fn from(e: DeviceError) -> Self {
        GeometryError::Device(e)
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
struct Uploaded {
    handle: GeometryHandle,
    mode: DrawMode,
    count: u32,
}

/// CPU vertex/index lists plus the device allocation mirroring them.
///
/// Lifecycle: fill with [`set_geometry`](Self::set_geometry) or
/// [`set_triangles`](Self::set_triangles), [`upload`](Self::upload), draw any
/// number of times, [`teardown`](Self::teardown). Replacing the data after an
/// upload marks the buffer stale; the next `upload` releases the old
/// allocation before creating the new one. Teardown is idempotent.
#[derive(Debug)]
pub struct GeometryBuffer<V: VertexFormat = Vertex> {
    label: String,
    vertices: Vec<V>,
    indices: Vec<u32>,
    mode: DrawMode,
    uploaded: Option<Uploaded>,
    stale: bool,
}

impl<V: VertexFormat> GeometryBuffer<V> {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            vertices: Vec::new(),
            indices: Vec::new(),
            mode: DrawMode::Indexed,
            uploaded: None,
            stale: false,
        }
    }

    /// Replaces the CPU data with an indexed triangle list.
    pub fn set_geometry(&mut self, vertices: Vec<V>, indices: Vec<u32>) {
        self.vertices = vertices;
        self.indices = indices;
        self.mode = DrawMode::Indexed;
        self.stale = self.uploaded.is_some();
    }

    /// Replaces the CPU data with raw triangles (no index buffer).
    pub fn set_triangles(&mut self, vertices: Vec<V>) {
        self.vertices = vertices;
        self.indices.clear();
        self.mode = DrawMode::NonIndexed;
        self.stale = self.uploaded.is_some();
    }

    #[inline]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[inline]
    pub fn vertices(&self) -> &[V] {
        &self.vertices
    }

    #[inline]
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    #[inline]
    pub fn mode(&self) -> DrawMode {
        self.mode
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    #[inline]
    pub fn is_uploaded(&self) -> bool {
        self.uploaded.is_some()
    }

    /// `true` when the CPU data changed since the last upload.
    #[inline]
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    pub fn triangle_count(&self) -> usize {
        match self.mode {
            DrawMode::Indexed => self.indices.len() / 3,
            DrawMode::NonIndexed => self.vertices.len() / 3,
        }
    }

    /// Extents of the CPU vertices, `None` when empty.
    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::from_points(self.vertices.iter().map(VertexFormat::ndc))
    }

    /// Live device allocation as `(handle, mode, count)`.
    pub fn handle(&self) -> Option<(GeometryHandle, DrawMode, u32)> {
        self.uploaded.map(|u| (u.handle, u.mode, u.count))
    }

    /// Checks the triangle-list invariants for the current mode.
    pub fn validate(&self) -> Result<(), GeometryError> {
        match self.mode {
            DrawMode::Indexed => {
                if self.indices.len() % 3 != 0 {
                    return Err(GeometryError::IndexCount {
                        label: self.label.clone(),
                        count: self.indices.len(),
                    });
                }
                if let Some(&index) = self
                    .indices
                    .iter()
                    .find(|&&i| i as usize >= self.vertices.len())
                {
                    return Err(GeometryError::IndexOutOfRange {
                        label: self.label.clone(),
                        index,
                        vertex_count: self.vertices.len(),
                    });
                }
            }
            DrawMode::NonIndexed => {
                if self.vertices.len() % 3 != 0 {
                    return Err(GeometryError::VertexCount {
                        label: self.label.clone(),
                        count: self.vertices.len(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Copies the CPU data into a fresh device allocation.
    ///
    /// A live allocation is released first, so repeated uploads never leak.
    /// Empty geometry uploads nothing and leaves the buffer undrawable.
    pub fn upload(&mut self, device: &mut dyn RenderDevice) -> Result<(), GeometryError> {
        self.validate()?;

        if let Some(prev) = self.uploaded.take() {
            log::debug!("'{}': re-uploading, releasing previous allocation", self.label);
            device.release_geometry(prev.handle);
        }
        self.stale = false;

        if self.vertices.is_empty() {
            log::debug!("'{}': nothing to upload", self.label);
            return Ok(());
        }

        let handle = device.upload_geometry(GeometryUpload {
            label: &self.label,
            kind: V::KIND,
            vertex_bytes: bytemuck::cast_slice(&self.vertices),
            vertex_count: self.vertices.len() as u32,
            indices: &self.indices,
        })?;

        let count = match self.mode {
            DrawMode::Indexed => self.indices.len(),
            DrawMode::NonIndexed => self.vertices.len(),
        } as u32;

        self.uploaded = Some(Uploaded { handle, mode: self.mode, count });
        Ok(())
    }

    /// Releases the device allocation. Safe to call at any time, any number of times.
    pub fn teardown(&mut self, device: &mut dyn RenderDevice) {
        if let Some(u) = self.uploaded.take() {
            device.release_geometry(u.handle);
        }
        self.stale = false;
    }
}

impl GeometryBuffer<Vertex> {
    /// Draws the uploaded triangles through the flag pipeline.
    ///
    /// No-op when nothing is uploaded.
    pub fn draw(&self, device: &mut dyn RenderDevice, params: DrawParams) {
        let Some(u) = self.uploaded else {
            log::trace!("'{}': draw skipped, not uploaded", self.label);
            return;
        };
        if u.count == 0 {
            return;
        }
        device.draw(DrawCall {
            geometry: u.handle,
            mode: u.mode,
            count: u.count,
            params,
        });
    }
}

impl GeometryBuffer<TexturedVertex> {
    /// Draws the uploaded quad(s) through a compiled textured shader.
    pub fn draw_textured(
        &self,
        device: &mut dyn RenderDevice,
        shader: ShaderHandle,
        texture: TextureHandle,
        viewport: Viewport,
    ) {
        let Some(u) = self.uploaded else {
            return;
        };
        if u.count == 0 {
            return;
        }
        device.draw_textured(TexturedDrawCall {
            geometry: u.handle,
            mode: u.mode,
            count: u.count,
            shader,
            texture,
            viewport,
        });
    }
}
