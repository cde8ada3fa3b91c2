// rust8 Library
// Host driver for a 64x32 monochrome virtual machine: image decoding,
// glow rendering, and the frame loop

// Public modules
pub mod config;
pub mod display;
pub mod driver;
pub mod image;
pub mod input;
pub mod logging;
pub mod screenshot;
pub mod vm;

// Re-export main types for convenience
pub use config::{HostConfig, ImageConfig, LoggingConfig, ScreenshotConfig, VideoConfig};
pub use display::{
    run_window, Color, FrameBuffer, FrameStats, GradientCache, HostError, Paint, RadialGradient,
    Rect, RenderConfig, RenderMode, Renderer, Surface, SurfaceError,
};
pub use driver::{
    CancellationToken, Clock, DriverError, DriverState, FrameDriver, ManualClock, Reschedule,
    SystemClock,
};
pub use image::{DecodeError, ImageError, ProgramImage};
pub use input::KeypadMapping;
pub use vm::{Chip8, LoadError, StepError, VmHandle, DISPLAY_HEIGHT, DISPLAY_WIDTH};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_components() {
        let config = HostConfig::default();
        let render_config = RenderConfig::new(
            config.video.width,
            config.video.height,
            config.video.render_mode,
        );
        let mut surface = FrameBuffer::new(config.video.width, config.video.height);
        let mut driver = FrameDriver::new(Chip8::with_seed(0), render_config);

        // 00E0 CLS; 1200 JP 0x200
        driver
            .start(ProgramImage::new(vec![0x00, 0xE0, 0x12, 0x00]))
            .unwrap();
        assert_eq!(driver.frame(&mut surface).unwrap(), Reschedule::Next);
        assert_eq!(driver.frames(), 1);
        assert_eq!(driver.last_stats().cells_lit, 0);
    }
}
