use log::{error, info, warn};
use objview::app::start_gui;
use objview::io::asset_loader::{load_asset, validate_asset};
use objview::io::cli::Cli;
use objview::io::config::ViewerConfig;
use objview::io::image::save_buffer_to_image;
use objview::pipeline::renderer::Renderer;
use objview::scene::Scene;
use std::fs;
use std::path::PathBuf;
use std::time::Instant;

fn main() -> Result<(), String> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .filter_module("eframe", log::LevelFilter::Warn)
        .filter_module("egui_glow", log::LevelFilter::Warn)
        .filter_module("egui_winit", log::LevelFilter::Warn)
        .filter_module("winit", log::LevelFilter::Warn)
        .filter_module("wgpu", log::LevelFilter::Warn)
        .filter_module("glutin", log::LevelFilter::Warn)
        .filter_module("sctk", log::LevelFilter::Warn)
        .format_timestamp(None)
        .format_level(true)
        .init();

    info!("🔍 OBJ viewer starting");

    let (config, should_start_gui) = Cli::process()?;

    if should_start_gui {
        if let Err(err) = start_gui(config) {
            error!("Failed to start the viewer window: {err}");
            return Err("GUI startup failed".to_string());
        }
        return Ok(());
    }

    run_headless(&config)
}

/// Renders a single frame of the configured scene to a PNG, without a
/// window. A failed asset load still produces a frame (camera, lights,
/// background only).
fn run_headless(config: &ViewerConfig) -> Result<(), String> {
    let start_time = Instant::now();
    let width = config.window.width.max(1);
    let height = config.window.height.max(1);

    info!("Headless render ({}x{})", width, height);

    let mut scene = Scene::from_config(config, width as f32 / height as f32);

    match validate_asset(&config.asset).and_then(|_| load_asset(&config.asset)) {
        Ok(asset) => scene.attach_model(asset.model),
        Err(e) => {
            error!("Asset load failed: {e}");
            warn!("Rendering without the model");
        }
    }

    let mut renderer = Renderer::new(width, height);
    renderer.render_scene(&scene);

    fs::create_dir_all(&config.output.dir)
        .map_err(|e| format!("Failed to create output directory '{}': {}", config.output.dir, e))?;

    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    let output_path: PathBuf = PathBuf::from(&config.output.dir)
        .join(format!("{}_{}.png", config.output.name, timestamp));

    save_buffer_to_image(
        &renderer.framebuffer.to_packed(),
        width,
        height,
        &output_path,
    )?;

    info!(
        "Frame saved to {} in {:.2?}",
        output_path.display(),
        start_time.elapsed()
    );
    Ok(())
}
