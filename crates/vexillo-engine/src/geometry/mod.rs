//! Procedural geometry kit.
//!
//! Shape descriptors are plain values; [`MeshBuilder`] turns them into
//! triangle lists ready for a [`GeometryBuffer`](crate::render::GeometryBuffer).

mod builder;
pub mod profile;
mod shapes;

pub use builder::{band_rectangles, Axis, MeshBuilder};
pub use shapes::{edge_wedges, CutoutWedge, Fan, Rectangle, RotatedBand, TaperingStrip};
