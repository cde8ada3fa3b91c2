// rust8 - Main Entry Point
//
// Usage: rust8 [IMAGE]
//
// IMAGE is a file holding a base64-encoded program. Without it, the image
// named in rust8.toml is used, falling back to the bundled demo.

use rust8::config::{HostConfig, CONFIG_FILE};
use rust8::display::{run_window, RenderConfig};
use rust8::driver::FrameDriver;
use rust8::image::{self, ProgramImage};
use rust8::input::KeypadMapping;
use rust8::logging;
use rust8::vm::Chip8;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Bundled demo program (base64)
const DEMO_IMAGE: &str = include_str!("../assets/demo.b64");

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = Path::new(CONFIG_FILE);
    let config_missing = !config_path.exists();
    let config = HostConfig::load_or_default(config_path)
        .map_err(|e| format!("Failed to load {}: {}", config_path.display(), e))?;

    if let Err(e) = logging::init(&config.logging.level) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    info!("rust8 v{}", env!("CARGO_PKG_VERSION"));

    if config_missing {
        match config.save(config_path) {
            Ok(()) => info!(path = %config_path.display(), "wrote default configuration"),
            Err(e) => warn!(
                path = %config_path.display(),
                error = %e,
                "could not write default configuration"
            ),
        }
    }

    let image_path = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .or_else(|| config.image.path.clone());

    let program = match image_path {
        Some(path) => {
            info!(path = %path.display(), "loading image");
            ProgramImage::from_file(&path)?
        }
        None => {
            info!("no image given, running bundled demo");
            image::decode(DEMO_IMAGE)?
        }
    };

    let render_config = RenderConfig::new(
        config.video.width,
        config.video.height,
        config.video.render_mode,
    );
    info!(
        width = render_config.surface_width(),
        height = render_config.surface_height(),
        cell_width = render_config.cell_width(),
        cell_height = render_config.cell_height(),
        mode = ?render_config.mode(),
        "render configuration"
    );

    let mut driver =
        FrameDriver::new(Chip8::new(), render_config).with_frame_cap(config.video.frame_cap);
    driver.start(program)?;

    run_window(driver, KeypadMapping::default(), config.screenshot)?;

    Ok(())
}
