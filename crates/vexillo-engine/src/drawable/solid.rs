use anyhow::Context;

use crate::geometry::MeshBuilder;
use crate::render::{GeometryBuffer, RenderDevice};

use super::{Drawable, RenderArgs};

/// An emblem drawn as one flat mesh.
pub trait Emblem {
    fn name(&self) -> &str;

    fn description(&self) -> &str {
        ""
    }

    fn build_mesh(&self, mesh: &mut MeshBuilder);
}

/// Owns the single buffer of an [`Emblem`].
pub struct SolidDrawable<E> {
    emblem: E,
    geometry: GeometryBuffer,
    half_width: f32,
}

impl<E: Emblem> SolidDrawable<E> {
    pub fn new(emblem: E) -> Self {
        let geometry = GeometryBuffer::new(emblem.name());
        Self { emblem, geometry, half_width: 1.0 }
    }

    #[inline]
    pub fn geometry(&self) -> &GeometryBuffer {
        &self.geometry
    }
}

impl<E: Emblem> Drawable for SolidDrawable<E> {
    fn name(&self) -> &str {
        self.emblem.name()
    }

    fn description(&self) -> &str {
        self.emblem.description()
    }

    fn build(&mut self, device: &mut dyn RenderDevice) -> anyhow::Result<()> {
        let mut mesh = MeshBuilder::new();
        self.emblem.build_mesh(&mut mesh);
        self.half_width = mesh.bounds().map_or(1.0, |b| b.half_width());

        let (vertices, indices) = mesh.finish();
        self.geometry.set_geometry(vertices, indices);
        self.geometry
            .upload(device)
            .with_context(|| format!("uploading '{}'", self.emblem.name()))?;

        log::debug!(
            "built '{}': {} triangles",
            self.emblem.name(),
            self.geometry.triangle_count()
        );
        Ok(())
    }

    fn render(&self, device: &mut dyn RenderDevice, args: &RenderArgs) {
        self.geometry.draw(device, args.params(self.half_width));
    }

    fn teardown(&mut self, device: &mut dyn RenderDevice) {
        self.geometry.teardown(device);
    }
}
