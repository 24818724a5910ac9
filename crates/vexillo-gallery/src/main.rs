mod app;
mod config;
mod flags;
mod menu;
mod snapshot;

use anyhow::Result;
use winit::dpi::LogicalSize;

use vexillo_engine::device::GpuInit;
use vexillo_engine::logging::{init_logging, LoggingConfig};
use vexillo_engine::window::{Runtime, RuntimeConfig};

use crate::app::GalleryApp;
use crate::config::GalleryConfig;

fn main() -> Result<()> {
    let config = GalleryConfig::load()?;

    init_logging(LoggingConfig {
        timestamps: config.snapshot_dir.is_none(),
        ..LoggingConfig::default()
    });

    if let Some(dir) = config.snapshot_dir.clone() {
        let written = snapshot::run(&config, &dir)?;
        log::info!("{} snapshots in {}", written.len(), dir.display());
        return Ok(());
    }

    let (w, h) = config.initial_size;
    let runtime = RuntimeConfig {
        title: config.title.clone(),
        initial_size: LogicalSize::new(w, h),
    };
    Runtime::run(runtime, GpuInit::default(), GalleryApp::new(config))
}
