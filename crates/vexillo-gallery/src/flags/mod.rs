//! The emblem catalog.

mod circles;
mod egypt;
mod hoist;
mod image_edge;
mod pirates;
mod stripes;

use std::path::Path;

use anyhow::{Context, Result};
use vexillo_engine::drawable::{Drawable, MaskedDrawable, Registry, SolidDrawable};
use vexillo_engine::render::RenderDevice;

use circles::{Brazil, Japan};
use egypt::Egypt;
use hoist::{Bahamas, Uae};
use image_edge::ImageEdges;
use pirates::Pirates;

/// Every drawable the gallery knows, in menu order.
pub fn catalog(image_path: &Path) -> Vec<Box<dyn Drawable>> {
    vec![
        Box::new(SolidDrawable::new(Egypt)),
        Box::new(MaskedDrawable::new(Pirates::default())),
        Box::new(SolidDrawable::new(stripes::gabon())),
        Box::new(SolidDrawable::new(stripes::france())),
        Box::new(SolidDrawable::new(Japan)),
        Box::new(SolidDrawable::new(stripes::germany())),
        Box::new(SolidDrawable::new(stripes::austria())),
        Box::new(SolidDrawable::new(stripes::romania())),
        Box::new(SolidDrawable::new(Uae)),
        Box::new(SolidDrawable::new(Bahamas)),
        Box::new(SolidDrawable::new(Brazil)),
        Box::new(ImageEdges::from_path(image_path)),
    ]
}

/// Builds and registers the whole catalog.
pub fn register_catalog(
    registry: &mut Registry,
    device: &mut dyn RenderDevice,
    image_path: &Path,
) -> Result<()> {
    for drawable in catalog(image_path) {
        let name = drawable.name().to_string();
        registry
            .register_boxed(device, drawable)
            .with_context(|| format!("registering '{name}'"))?;
    }
    log::info!("catalog ready: {} drawables", registry.len());
    Ok(())
}

/// Info text for a menu entry that has no drawable behind it.
pub fn placeholder_description(name: &str) -> String {
    format!("Mode: {name} (placeholder, coming soon)")
}

#[cfg(test)]
mod tests {
    use super::*;
    use vexillo_engine::drawable::RenderArgs;
    use vexillo_engine::render::SoftwareDevice;

    use crate::config::GalleryConfig;

    #[test]
    fn catalog_names_are_unique_and_in_the_default_menu() {
        let config = GalleryConfig::default();
        let drawables = catalog(&config.image_path);
        let mut names: Vec<&str> = drawables.iter().map(|d| d.name()).collect();
        for name in &names {
            assert!(config.menu.iter().any(|m| m == name), "{name} missing from menu");
        }
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), drawables.len());
    }

    #[test]
    fn whole_catalog_builds_renders_and_tears_down() {
        let mut device = SoftwareDevice::new(64, 48);
        let mut registry = Registry::new();
        register_catalog(&mut registry, &mut device, Path::new("no/such/image.png")).unwrap();
        assert_eq!(registry.len(), 12);

        let args = RenderArgs::new(device.viewport(), 0.5);
        for name in registry.names().map(str::to_owned).collect::<Vec<_>>() {
            assert!(registry.render(&mut device, &name, &args));
        }
        // ten solid flags and three passes for the masked one; the image-edge
        // entry is inert without its file
        assert_eq!(device.draw_calls(), 10 + 3);

        registry.teardown(&mut device);
        assert!(registry.get("Egypt").is_none());
        assert_eq!(device.live_geometry(), 0);
    }

    #[test]
    fn registering_twice_is_rejected() {
        let mut device = SoftwareDevice::new(8, 8);
        let mut registry = Registry::new();
        register_catalog(&mut registry, &mut device, Path::new("none.png")).unwrap();
        assert!(register_catalog(&mut registry, &mut device, Path::new("none.png")).is_err());
        registry.teardown(&mut device);
    }
}
