//! Vexillo engine crate.
//!
//! Geometry kit, drawable contract, registry and stencil compositing for the
//! emblem gallery, plus the wgpu/winit runtime that hosts them. Everything
//! that draws goes through [`render::RenderDevice`], so the whole pipeline
//! also runs on the CPU via [`render::SoftwareDevice`].

pub mod coords;
pub mod core;
pub mod device;
pub mod drawable;
pub mod geometry;
pub mod logging;
pub mod render;
pub mod time;
pub mod window;
