//! Headless rendering of the catalog into PNG files.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use vexillo_engine::coords::Rgb;
use vexillo_engine::drawable::{Registry, RenderArgs};
use vexillo_engine::render::{RenderDevice, SoftwareDevice};

use crate::config::GalleryConfig;
use crate::flags;

/// Elapsed time passed to every drawable. The software device ignores the
/// wave, so any value gives the same picture.
const SNAPSHOT_TIME: f32 = 0.0;

/// `"Mother of world"` -> `"mother-of-world"`.
pub fn file_stem(name: &str) -> String {
    let mut stem = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            stem.push(c.to_ascii_lowercase());
        } else if !stem.ends_with('-') {
            stem.push('-');
        }
    }
    stem.trim_matches('-').to_string()
}

/// Renders every registered drawable into `<dir>/<stem>.png`.
///
/// Returns the written paths in name order.
pub fn write_all(
    registry: &Registry,
    device: &mut SoftwareDevice,
    clear: Rgb,
    dir: &Path,
) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create snapshot directory {}", dir.display()))?;

    let args = RenderArgs::new(device.viewport(), SNAPSHOT_TIME);
    let mut written = Vec::with_capacity(registry.len());

    for name in registry.names() {
        device.clear(clear);
        device.clear_mask();
        registry.render(&mut *device, name, &args);

        let path = dir.join(format!("{}.png", file_stem(name)));
        device
            .image()
            .save(&path)
            .with_context(|| format!("failed to write {}", path.display()))?;
        log::info!("wrote {}", path.display());
        written.push(path);
    }
    Ok(written)
}

/// Builds the catalog on a [`SoftwareDevice`], writes one PNG per drawable
/// and tears everything down.
pub fn run(config: &GalleryConfig, dir: &Path) -> Result<Vec<PathBuf>> {
    let (w, h) = config.snapshot_size;
    let mut device = SoftwareDevice::new(w, h);
    let mut registry = Registry::new();

    let result = flags::register_catalog(&mut registry, &mut device, &config.image_path)
        .and_then(|()| write_all(&registry, &mut device, config.clear_color, dir));

    registry.teardown(&mut device);
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("vexillo-snapshot-{tag}-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn stems_are_lowercase_and_dashed() {
        assert_eq!(file_stem("Mother of world"), "mother-of-world");
        assert_eq!(file_stem("ImageEdges"), "imageedges");
        assert_eq!(file_stem("  UAE!"), "uae");
    }

    #[test]
    fn writes_one_png_per_drawable() {
        let dir = scratch_dir("all");
        let config = GalleryConfig {
            snapshot_size: (64, 48),
            image_path: PathBuf::from("no/such/image.png"),
            ..GalleryConfig::default()
        };

        let written = run(&config, &dir).unwrap();
        assert_eq!(written.len(), 12);

        let japan = image::open(dir.join("japan.png")).unwrap().to_rgba8();
        assert_eq!(japan.dimensions(), (64, 48));
        // sun in the middle, clear color in the corner
        let sun = japan.get_pixel(32, 24).0;
        let want = [217, 26, 38, 255];
        assert!((0..4).all(|c| sun[c].abs_diff(want[c]) <= 1), "{sun:?}");
        let [r, g, b] = config.clear_color.to_u8();
        assert_eq!(japan.get_pixel(0, 0).0, [r, g, b, 255]);

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
