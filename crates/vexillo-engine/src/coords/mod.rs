//! Coordinate and geometry types shared by the kit, the devices and the emblems.
//!
//! Canonical emblem space:
//! - Normalized device coordinates, `[-1, 1]` on both axes
//! - Origin at the center of the viewport
//! - +X right, +Y up
//!
//! Viewports are expressed in device pixels (top-left origin) and only used to
//! place NDC geometry on a render target.

mod bounds;
mod color;
mod vec2;
mod viewport;

pub use bounds::{Bounds, Edge};
pub use color::Rgb;
pub use vec2::Vec2;
pub use viewport::Viewport;
