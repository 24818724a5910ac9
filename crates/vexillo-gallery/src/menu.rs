/// Ordered list of entry names with one selected at a time.
///
/// Selection wraps at both ends. An empty menu has no selection.
#[derive(Debug, Clone)]
pub struct Menu {
    items: Vec<String>,
    index: usize,
}

impl Menu {
    /// Starts on `initial`, or on the first entry when `initial` is not listed.
    pub fn new(items: Vec<String>, initial: &str) -> Self {
        let index = items.iter().position(|s| s == initial).unwrap_or_else(|| {
            if !items.is_empty() {
                log::warn!("'{initial}' is not in the menu, starting at the first entry");
            }
            0
        });
        Self { items, index }
    }

    pub fn selected(&self) -> Option<&str> {
        self.items.get(self.index).map(String::as_str)
    }

    pub fn next(&mut self) {
        if !self.items.is_empty() {
            self.index = (self.index + 1) % self.items.len();
        }
    }

    pub fn prev(&mut self) {
        if !self.items.is_empty() {
            self.index = (self.index + self.items.len() - 1) % self.items.len();
        }
    }
}
