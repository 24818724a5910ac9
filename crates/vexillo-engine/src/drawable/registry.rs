use std::collections::BTreeMap;
use std::fmt;

use crate::render::RenderDevice;

use super::{Drawable, RenderArgs};

/// Why a drawable was not added to the [`Registry`].
#[derive(Debug)]
pub enum RegistryError {
    /// Another drawable already uses this name.
    Duplicate { name: String },
    /// `build` failed; the drawable was torn down and dropped.
    Build { name: String, source: anyhow::Error },
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::Duplicate { name } => write!(f, "drawable '{name}' is already registered"),
            RegistryError::Build { name, source } => write!(f, "drawable '{name}' failed to build: {source:#}"),
        }
    }
}

impl std::error::Error for RegistryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RegistryError::Duplicate { .. } => None,
            RegistryError::Build { source, .. } => Some(source.as_ref()),
        }
    }
}

/// Name-keyed owner of every drawable.
///
/// Registering builds the drawable; [`teardown`](Self::teardown) tears every
/// entry down exactly once and empties the registry. Names iterate in sorted
/// order.
#[derive(Default)]
pub struct Registry {
    entries: BTreeMap<String, Box<dyn Drawable>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds and stores `drawable`. Fails on a duplicate name or a failed build.
    pub fn register<D>(&mut self, device: &mut dyn RenderDevice, drawable: D) -> Result<(), RegistryError>
    where
        D: Drawable + 'static,
    {
        self.register_boxed(device, Box::new(drawable))
    }

    pub fn register_boxed(
        &mut self,
        device: &mut dyn RenderDevice,
        mut drawable: Box<dyn Drawable>,
    ) -> Result<(), RegistryError> {
        let name = drawable.name().to_string();
        if self.entries.contains_key(&name) {
            return Err(RegistryError::Duplicate { name });
        }

        if let Err(source) = drawable.build(device) {
            drawable.teardown(device);
            return Err(RegistryError::Build { name, source });
        }

        log::debug!("registered '{name}'");
        self.entries.insert(name, drawable);
        Ok(())
    }

    /// Tears down any entry with the same name, then registers `drawable`.
    pub fn replace<D>(&mut self, device: &mut dyn RenderDevice, drawable: D) -> Result<(), RegistryError>
    where
        D: Drawable + 'static,
    {
        if let Some(mut old) = self.entries.remove(drawable.name()) {
            log::debug!("replacing '{}'", old.name());
            old.teardown(device);
        }
        self.register(device, drawable)
    }

    pub fn get(&self, name: &str) -> Option<&dyn Drawable> {
        self.entries.get(name).map(|d| d.as_ref())
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Renders `name` if present. Returns whether anything was rendered.
    pub fn render(&self, device: &mut dyn RenderDevice, name: &str, args: &RenderArgs) -> bool {
        match self.entries.get(name) {
            Some(d) => {
                d.render(device, args);
                true
            }
            None => false,
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Tears down and drops every entry. Safe on an empty registry.
    pub fn teardown(&mut self, device: &mut dyn RenderDevice) {
        let entries = std::mem::take(&mut self.entries);
        let count = entries.len();
        for (_, mut drawable) in entries {
            drawable.teardown(device);
        }
        if count > 0 {
            log::debug!("registry torn down ({count} drawables)");
        }
    }
}

impl Drop for Registry {
    fn drop(&mut self) {
        if !self.entries.is_empty() {
            log::warn!(
                "registry dropped with {} drawables not torn down; device resources leak",
                self.entries.len()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::SoftwareDevice;
    use std::cell::Cell;
    use std::rc::Rc;

    #[derive(Default)]
    struct Counters {
        builds: Cell<u32>,
        renders: Cell<u32>,
        teardowns: Cell<u32>,
    }

    struct Counting {
        name: &'static str,
        fail: bool,
        counters: Rc<Counters>,
    }

    impl Counting {
        fn new(name: &'static str, counters: &Rc<Counters>) -> Self {
            Self { name, fail: false, counters: Rc::clone(counters) }
        }

        fn failing(name: &'static str, counters: &Rc<Counters>) -> Self {
            Self { name, fail: true, counters: Rc::clone(counters) }
        }
    }

    impl Drawable for Counting {
        fn name(&self) -> &str {
            self.name
        }

        fn build(&mut self, _device: &mut dyn RenderDevice) -> anyhow::Result<()> {
            self.counters.builds.set(self.counters.builds.get() + 1);
            anyhow::ensure!(!self.fail, "no resources for {}", self.name);
            Ok(())
        }

        fn render(&self, _device: &mut dyn RenderDevice, _args: &RenderArgs) {
            self.counters.renders.set(self.counters.renders.get() + 1);
        }

        fn teardown(&mut self, _device: &mut dyn RenderDevice) {
            self.counters.teardowns.set(self.counters.teardowns.get() + 1);
        }
    }

    fn args(device: &SoftwareDevice) -> RenderArgs {
        RenderArgs::new(device.viewport(), 0.0)
    }

    // ── registration ─────────────────────────────────────────────────────

    #[test]
    fn register_builds_once() {
        let c = Rc::new(Counters::default());
        let mut device = SoftwareDevice::new(4, 4);
        let mut reg = Registry::new();
        reg.register(&mut device, Counting::new("Gabon", &c)).unwrap();

        assert_eq!(c.builds.get(), 1);
        assert_eq!(reg.get("Gabon").map(|d| d.name()), Some("Gabon"));
        assert!(reg.get("Atlantis").is_none());
        reg.teardown(&mut device);
    }

    #[test]
    fn duplicate_name_is_rejected() {
        let c = Rc::new(Counters::default());
        let mut device = SoftwareDevice::new(4, 4);
        let mut reg = Registry::new();
        reg.register(&mut device, Counting::new("Japan", &c)).unwrap();

        let err = reg.register(&mut device, Counting::new("Japan", &c)).unwrap_err();
        assert!(matches!(err, RegistryError::Duplicate { ref name } if name == "Japan"));
        assert_eq!(c.builds.get(), 1);
        assert_eq!(reg.len(), 1);
        reg.teardown(&mut device);
    }

    #[test]
    fn failed_build_is_torn_down_and_dropped() {
        let c = Rc::new(Counters::default());
        let mut device = SoftwareDevice::new(4, 4);
        let mut reg = Registry::new();

        let err = reg.register(&mut device, Counting::failing("ImageEdges", &c)).unwrap_err();
        assert!(matches!(err, RegistryError::Build { .. }));
        assert!(err.to_string().contains("no resources"));
        assert_eq!(c.teardowns.get(), 1);
        assert!(reg.is_empty());
    }

    #[test]
    fn replace_tears_down_previous_entry() {
        let old = Rc::new(Counters::default());
        let new = Rc::new(Counters::default());
        let mut device = SoftwareDevice::new(4, 4);
        let mut reg = Registry::new();
        reg.register(&mut device, Counting::new("Brazil", &old)).unwrap();
        reg.replace(&mut device, Counting::new("Brazil", &new)).unwrap();

        assert_eq!(old.teardowns.get(), 1);
        assert_eq!(new.builds.get(), 1);
        assert_eq!(reg.len(), 1);
        reg.teardown(&mut device);
        assert_eq!(old.teardowns.get(), 1);
        assert_eq!(new.teardowns.get(), 1);
    }

    // ── rendering and teardown ───────────────────────────────────────────

    #[test]
    fn render_by_name() {
        let c = Rc::new(Counters::default());
        let mut device = SoftwareDevice::new(4, 4);
        let mut reg = Registry::new();
        reg.register(&mut device, Counting::new("Egypt", &c)).unwrap();

        let a = args(&device);
        assert!(reg.render(&mut device, "Egypt", &a));
        assert!(!reg.render(&mut device, "Mother of world", &a));
        assert_eq!(c.renders.get(), 1);
        reg.teardown(&mut device);
    }

    #[test]
    fn teardown_releases_each_entry_once() {
        let c = Rc::new(Counters::default());
        let mut device = SoftwareDevice::new(4, 4);
        let mut reg = Registry::new();
        for name in ["Austria", "Germany", "Romania"] {
            reg.register(&mut device, Counting::new(name, &c)).unwrap();
        }
        assert_eq!(reg.names().collect::<Vec<_>>(), ["Austria", "Germany", "Romania"]);

        reg.teardown(&mut device);
        reg.teardown(&mut device);
        assert_eq!(c.teardowns.get(), 3);
        assert!(reg.get("Austria").is_none());
        assert!(reg.is_empty());
    }

    #[test]
    fn teardown_on_empty_registry_is_noop() {
        let mut device = SoftwareDevice::new(4, 4);
        let mut reg = Registry::new();
        reg.teardown(&mut device);
        assert_eq!(reg.len(), 0);
    }
}
