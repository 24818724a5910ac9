use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use vexillo_engine::coords::Rgb;

/// Overrides the image-edge source file.
pub const ENV_IMAGE: &str = "VEXILLO_IMAGE";
/// Overrides the entry selected at startup.
pub const ENV_SELECT: &str = "VEXILLO_SELECT";

/// Largest accepted snapshot side, in pixels.
const MAX_SNAPSHOT_SIDE: u32 = 16_384;

/// Gallery settings.
///
/// Built from [`Default`], then environment overrides, then command-line
/// arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct GalleryConfig {
    pub title: String,
    /// Logical window size.
    pub initial_size: (f64, f64),
    pub clear_color: Rgb,
    /// Source of the image-edge drawable.
    pub image_path: PathBuf,
    pub initial_selection: String,
    /// Menu entries in display order. Names with no drawable are placeholders.
    pub menu: Vec<String>,
    /// Headless mode: render every drawable into this directory and exit.
    pub snapshot_dir: Option<PathBuf>,
    pub snapshot_size: (u32, u32),
}

impl Default for GalleryConfig {
    fn default() -> Self {
        let menu = [
            "Egypt",
            "Pirates",
            "Gabon",
            "France",
            "Japan",
            "Germany",
            "Austria",
            "Romania",
            "UAE",
            "Bahamas",
            "Brazil",
            "ImageEdges",
            "Mother of world",
            "Sopngbob",
            "isreal boom",
        ];

        Self {
            title: "Vexillo".to_string(),
            initial_size: (1280.0, 720.0),
            clear_color: Rgb::new(0.02, 0.02, 0.03),
            image_path: PathBuf::from("assets/image.png"),
            initial_selection: "Egypt".to_string(),
            menu: menu.iter().map(|s| s.to_string()).collect(),
            snapshot_dir: None,
            snapshot_size: (800, 600),
        }
    }
}

impl GalleryConfig {
    /// Defaults plus the process environment and arguments.
    pub fn load() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env(|key| std::env::var(key).ok());
        config.apply_args(std::env::args().skip(1))?;
        Ok(config)
    }

    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup(ENV_IMAGE).filter(|s| !s.is_empty()) {
            self.image_path = PathBuf::from(path);
        }
        if let Some(name) = lookup(ENV_SELECT).filter(|s| !s.is_empty()) {
            self.initial_selection = name;
        }
    }

    /// Accepts `--snapshot <dir>`, `--size <w>x<h>`, `--image <path>` and
    /// `--select <name>`.
    pub fn apply_args<I>(&mut self, args: I) -> Result<()>
    where
        I: IntoIterator<Item = String>,
    {
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            let mut value = |flag: &str| {
                args.next()
                    .with_context(|| format!("{flag} expects a value"))
            };
            match arg.as_str() {
                "--snapshot" => self.snapshot_dir = Some(PathBuf::from(value("--snapshot")?)),
                "--size" => self.snapshot_size = parse_size(&value("--size")?)?,
                "--image" => self.image_path = PathBuf::from(value("--image")?),
                "--select" => self.initial_selection = value("--select")?,
                other => bail!("unknown argument '{other}'"),
            }
        }
        Ok(())
    }
}

fn parse_size(s: &str) -> Result<(u32, u32)> {
    let (w, h) = s
        .split_once('x')
        .with_context(|| format!("size '{s}' is not <width>x<height>"))?;
    let w: u32 = w.trim().parse().with_context(|| format!("bad width in '{s}'"))?;
    let h: u32 = h.trim().parse().with_context(|| format!("bad height in '{s}'"))?;
    if w == 0 || h == 0 {
        bail!("size '{s}' must be non-zero");
    }
    if w > MAX_SNAPSHOT_SIDE || h > MAX_SNAPSHOT_SIDE {
        bail!("size '{s}' exceeds {MAX_SNAPSHOT_SIDE} pixels per side");
    }
    Ok((w, h))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    // ── defaults ──────────────────────────────────────────────────────────

    #[test]
    fn default_menu_starts_with_egypt_and_ends_with_placeholders() {
        let c = GalleryConfig::default();
        assert_eq!(c.menu.first().map(String::as_str), Some("Egypt"));
        assert_eq!(c.menu.last().map(String::as_str), Some("isreal boom"));
        assert!(c.menu.contains(&c.initial_selection));
        assert!(c.snapshot_dir.is_none());
    }

    // ── environment ───────────────────────────────────────────────────────

    #[test]
    fn env_overrides_image_and_selection() {
        let mut c = GalleryConfig::default();
        c.apply_env(|key| match key {
            ENV_IMAGE => Some("cat.jpg".to_string()),
            ENV_SELECT => Some("Japan".to_string()),
            _ => None,
        });
        assert_eq!(c.image_path, PathBuf::from("cat.jpg"));
        assert_eq!(c.initial_selection, "Japan");
    }

    #[test]
    fn empty_env_values_are_ignored() {
        let mut c = GalleryConfig::default();
        c.apply_env(|_| Some(String::new()));
        assert_eq!(c, GalleryConfig::default());
    }

    // ── arguments ─────────────────────────────────────────────────────────

    #[test]
    fn snapshot_and_size_arguments() {
        let mut c = GalleryConfig::default();
        c.apply_args(args(&["--snapshot", "out", "--size", "320x200"])).unwrap();
        assert_eq!(c.snapshot_dir, Some(PathBuf::from("out")));
        assert_eq!(c.snapshot_size, (320, 200));
    }

    #[test]
    fn missing_value_is_an_error() {
        let mut c = GalleryConfig::default();
        assert!(c.apply_args(args(&["--snapshot"])).is_err());
    }

    #[test]
    fn unknown_argument_is_an_error() {
        let mut c = GalleryConfig::default();
        assert!(c.apply_args(args(&["--fullscreen"])).is_err());
    }

    #[test]
    fn bad_sizes_are_rejected() {
        assert!(parse_size("320").is_err());
        assert!(parse_size("0x10").is_err());
        assert!(parse_size("ax10").is_err());
        assert!(parse_size("70000x70000").is_err());
        assert_eq!(parse_size("64 x 32").unwrap(), (64, 32));
    }
}
