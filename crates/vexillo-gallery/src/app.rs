use winit::event::{ElementState, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

use vexillo_engine::core::{App, AppControl, FrameCtx, StartCtx, WindowCtx};
use vexillo_engine::drawable::{Registry, RenderArgs};
use vexillo_engine::render::RenderDevice;

use crate::config::GalleryConfig;
use crate::flags;
use crate::menu::Menu;

/// What a key press does to the gallery.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum Command {
    Next,
    Prev,
    Quit,
}

fn map_key(key: PhysicalKey) -> Option<Command> {
    match key {
        PhysicalKey::Code(KeyCode::ArrowDown | KeyCode::ArrowRight | KeyCode::Tab) => Some(Command::Next),
        PhysicalKey::Code(KeyCode::ArrowUp | KeyCode::ArrowLeft) => Some(Command::Prev),
        PhysicalKey::Code(KeyCode::Escape) => Some(Command::Quit),
        _ => None,
    }
}

/// Interactive gallery: arrow keys walk the menu, the window title shows
/// the selection and its description.
pub struct GalleryApp {
    config: GalleryConfig,
    registry: Registry,
    menu: Menu,
}

impl GalleryApp {
    pub fn new(config: GalleryConfig) -> Self {
        let menu = Menu::new(config.menu.clone(), &config.initial_selection);
        Self { config, registry: Registry::new(), menu }
    }

    /// `"<title> | <entry>: <description>"`, the title alone on an empty menu.
    fn info_line(&self) -> String {
        let Some(name) = self.menu.selected() else {
            return self.config.title.clone();
        };
        let text = match self.registry.get(name) {
            Some(d) if !d.description().is_empty() => d.description().to_string(),
            Some(_) => format!("Showing flag: {name}"),
            None => flags::placeholder_description(name),
        };
        format!("{} | {name}: {text}", self.config.title)
    }
}

impl App for GalleryApp {
    fn on_start(&mut self, ctx: &mut StartCtx<'_>) -> anyhow::Result<()> {
        flags::register_catalog(&mut self.registry, &mut *ctx.device, &self.config.image_path)?;
        ctx.window.set_title(&self.info_line());
        log::info!("selected '{}'", self.menu.selected().unwrap_or("-"));
        Ok(())
    }

    fn on_window_event(&mut self, ctx: &mut WindowCtx<'_>, event: &WindowEvent) -> AppControl {
        let WindowEvent::KeyboardInput { event: key, .. } = event else {
            return AppControl::Continue;
        };
        if key.state != ElementState::Pressed {
            return AppControl::Continue;
        }

        match map_key(key.physical_key) {
            Some(Command::Next) => self.menu.next(),
            Some(Command::Prev) => self.menu.prev(),
            Some(Command::Quit) => return AppControl::Exit,
            None => return AppControl::Continue,
        }

        log::debug!("selected '{}'", self.menu.selected().unwrap_or("-"));
        ctx.set_title(&self.info_line());
        AppControl::Continue
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        let time = ctx.time.elapsed;
        let registry = &self.registry;
        let selected = self.menu.selected();

        ctx.render(self.config.clear_color, |device, viewport| {
            if let Some(name) = selected {
                registry.render(device, name, &RenderArgs::new(viewport, time));
            }
        })
    }

    fn on_shutdown(&mut self, device: &mut dyn RenderDevice) {
        self.registry.teardown(device);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vexillo_engine::render::SoftwareDevice;

    fn started(config: GalleryConfig) -> (GalleryApp, SoftwareDevice) {
        let mut device = SoftwareDevice::new(32, 32);
        let mut app = GalleryApp::new(config);
        flags::register_catalog(&mut app.registry, &mut device, &app.config.image_path).unwrap();
        (app, device)
    }

    #[test]
    fn arrows_and_escape_map_to_commands() {
        assert_eq!(map_key(PhysicalKey::Code(KeyCode::ArrowRight)), Some(Command::Next));
        assert_eq!(map_key(PhysicalKey::Code(KeyCode::ArrowUp)), Some(Command::Prev));
        assert_eq!(map_key(PhysicalKey::Code(KeyCode::Escape)), Some(Command::Quit));
        assert_eq!(map_key(PhysicalKey::Code(KeyCode::KeyA)), None);
    }

    #[test]
    fn info_line_uses_the_drawable_description() {
        let (mut app, mut device) = started(GalleryConfig::default());
        assert_eq!(
            app.info_line(),
            "Vexillo | Egypt: Egypt flag with eagle, drawn fully from geometry (no textures)."
        );
        app.on_shutdown(&mut device);
        assert!(app.registry.is_empty());
    }

    #[test]
    fn placeholder_entries_say_so() {
        let config = GalleryConfig {
            initial_selection: "Sopngbob".to_string(),
            ..GalleryConfig::default()
        };
        let (mut app, mut device) = started(config);
        assert!(app.info_line().ends_with("Sopngbob: Mode: Sopngbob (placeholder, coming soon)"));
        app.on_shutdown(&mut device);
    }

    #[test]
    fn empty_menu_shows_only_the_title() {
        let config = GalleryConfig { menu: Vec::new(), ..GalleryConfig::default() };
        let app = GalleryApp::new(config);
        assert_eq!(app.info_line(), "Vexillo");
    }
}
