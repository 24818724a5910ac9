//! winit event loop and the window it owns.

mod runtime;

pub use runtime::{Runtime, RuntimeConfig};
