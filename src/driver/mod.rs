// Driver module - The frame loop
//
// One frame is: step the VM once, render its display, advance its timers by
// the measured wall-clock delta, then hand control back to the host. The
// host decides when the next frame runs (an event loop redraw, or `run`).
//
// The loop has no frame-rate cap unless one is configured, and no skip or
// coalesce policy. A `CancellationToken` is checked at the end of every
// frame so owners can stop it.

mod clock;

pub use clock::{Clock, FrameClock, ManualClock, SystemClock};

use crate::display::{FrameStats, RenderConfig, Renderer, Surface, SurfaceError};
use crate::image::{self, DecodeError, ProgramImage};
use crate::vm::{LoadError, StepError, VmHandle};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{error, info, trace};

/// Errors surfaced by the frame driver
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriverError {
    /// The encoded image could not be decoded; the VM was not touched
    Decode(DecodeError),

    /// The VM rejected the image; the driver stays idle
    Load(LoadError),

    /// The VM failed to step; no further frames run
    Step(StepError),

    /// The surface failed to paint; no further frames run
    Render(SurfaceError),

    /// `frame` called while idle or stopped
    NotRunning(DriverState),
}

impl std::fmt::Display for DriverError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DriverError::Decode(e) => write!(f, "Decode error: {}", e),
            DriverError::Load(e) => write!(f, "Load error: {}", e),
            DriverError::Step(e) => write!(f, "Step error: {}", e),
            DriverError::Render(e) => write!(f, "Render error: {}", e),
            DriverError::NotRunning(state) => write!(f, "Driver is not running ({:?})", state),
        }
    }
}

impl std::error::Error for DriverError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DriverError::Decode(e) => Some(e),
            DriverError::Load(e) => Some(e),
            DriverError::Step(e) => Some(e),
            DriverError::Render(e) => Some(e),
            DriverError::NotRunning(_) => None,
        }
    }
}

impl From<DecodeError> for DriverError {
    fn from(e: DecodeError) -> Self {
        DriverError::Decode(e)
    }
}

impl From<LoadError> for DriverError {
    fn from(e: LoadError) -> Self {
        DriverError::Load(e)
    }
}

impl From<StepError> for DriverError {
    fn from(e: StepError) -> Self {
        DriverError::Step(e)
    }
}

impl From<SurfaceError> for DriverError {
    fn from(e: SurfaceError) -> Self {
        DriverError::Render(e)
    }
}

/// Driver lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    /// Constructed, no image loaded
    Idle,

    /// Image loaded, frames may run
    Running,

    /// Cancelled or failed; no more frames
    Stopped,
}

/// What the host should do after a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reschedule {
    /// Schedule the next frame
    Next,

    /// Cancellation was observed; do not schedule again
    Stop,
}

/// Shared stop flag checked at the end of every frame
///
/// Cloning yields a handle to the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request that the loop stop after the current frame
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Owns the VM, renderer, and clocks, and runs frames
pub struct FrameDriver<V, C = SystemClock> {
    vm: V,
    renderer: Renderer,
    clock: C,
    frame_clock: Option<FrameClock>,
    state: DriverState,
    cancel: CancellationToken,
    frame_interval: Option<Duration>,
    frames: u64,
    last_dt: f64,
    last_stats: FrameStats,
}

impl<V: VmHandle> FrameDriver<V, SystemClock> {
    /// Create an idle driver on the wall clock
    ///
    /// # Example
    ///
    /// ```
    /// use rust8::display::{FrameBuffer, RenderConfig, RenderMode};
    /// use rust8::driver::{FrameDriver, Reschedule};
    /// use rust8::vm::Chip8;
    ///
    /// let config = RenderConfig::new(640, 320, RenderMode::WindowGradient);
    /// let mut surface = FrameBuffer::new(640, 320);
    /// let mut driver = FrameDriver::new(Chip8::new(), config);
    ///
    /// driver.start_encoded("AOA=").unwrap(); // 00E0: clear screen
    /// assert_eq!(driver.frame(&mut surface).unwrap(), Reschedule::Next);
    /// ```
    pub fn new(vm: V, config: RenderConfig) -> Self {
        Self::with_clock(vm, config, SystemClock)
    }
}

impl<V: VmHandle, C: Clock> FrameDriver<V, C> {
    /// Create an idle driver reading time from `clock`
    pub fn with_clock(vm: V, config: RenderConfig, clock: C) -> Self {
        Self {
            vm,
            renderer: Renderer::new(config),
            clock,
            frame_clock: None,
            state: DriverState::Idle,
            cancel: CancellationToken::new(),
            frame_interval: None,
            frames: 0,
            last_dt: 0.0,
            last_stats: FrameStats::default(),
        }
    }

    /// Limit `run` to `fps` frames per second; `None` runs uncapped
    pub fn with_frame_cap(mut self, fps: Option<u32>) -> Self {
        self.frame_interval = fps
            .filter(|&fps| fps > 0)
            .map(|fps| Duration::from_secs_f64(1.0 / f64::from(fps)));
        self
    }

    /// Load `image` and enter Running
    ///
    /// On failure the driver stays where it was and the VM is never stepped.
    pub fn start(&mut self, image: ProgramImage) -> Result<(), DriverError> {
        if self.state != DriverState::Idle {
            return Err(DriverError::NotRunning(self.state));
        }

        let size = image.len();
        if let Err(e) = self.vm.load(image) {
            error!(error = %e, "failed to load program image");
            return Err(e.into());
        }

        self.frame_clock = Some(FrameClock::new(self.clock.now()));
        self.state = DriverState::Running;
        info!(bytes = size, "driver running");
        Ok(())
    }

    /// Decode a base64 image and start with it
    pub fn start_encoded(&mut self, encoded: &str) -> Result<(), DriverError> {
        let image = image::decode(encoded)?;
        self.start(image)
    }

    /// Run one frame: step, render, advance time, check cancellation
    ///
    /// Any error stops the driver; later calls return `NotRunning`.
    pub fn frame<S: Surface + ?Sized>(
        &mut self,
        surface: &mut S,
    ) -> Result<Reschedule, DriverError> {
        if self.state != DriverState::Running {
            return Err(DriverError::NotRunning(self.state));
        }

        if let Err(e) = self.advance(surface) {
            self.state = DriverState::Stopped;
            error!(error = %e, frame = self.frames, "frame failed, stopping");
            return Err(e);
        }
        self.frames += 1;

        if self.cancel.is_cancelled() {
            self.state = DriverState::Stopped;
            info!(frames = self.frames, "driver cancelled");
            return Ok(Reschedule::Stop);
        }

        Ok(Reschedule::Next)
    }

    fn advance<S: Surface + ?Sized>(&mut self, surface: &mut S) -> Result<(), DriverError> {
        self.vm.step()?;
        self.last_stats = self.renderer.render(&self.vm, surface)?;

        let now = self.clock.now();
        let dt = match self.frame_clock.as_mut() {
            Some(frame_clock) => frame_clock.tick(now),
            None => 0.0,
        };
        self.vm.advance_time(dt);
        self.last_dt = dt;

        trace!(
            frame = self.frames,
            dt,
            cells_lit = self.last_stats.cells_lit,
            "frame"
        );
        Ok(())
    }

    /// Run frames back to back until cancelled or an error occurs
    ///
    /// Yields the thread between frames, or sleeps out the remainder of the
    /// frame interval when a cap is set. Returns the total frame count.
    pub fn run<S: Surface + ?Sized>(&mut self, surface: &mut S) -> Result<u64, DriverError> {
        loop {
            let started = Instant::now();

            if self.frame(surface)? == Reschedule::Stop {
                return Ok(self.frames);
            }

            match self.frame_interval {
                Some(interval) => {
                    if let Some(remaining) = interval.checked_sub(started.elapsed()) {
                        thread::sleep(remaining);
                    }
                }
                None => thread::yield_now(),
            }
        }
    }

    /// Forward a keypad transition to the VM between frames
    pub fn set_key(&mut self, key: u8, pressed: bool) {
        self.vm.set_key(key, pressed);
    }

    /// A handle that stops the loop at the next frame boundary
    pub fn cancellation(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    /// Completed frames
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Seconds passed to the VM on the last frame
    pub fn last_dt(&self) -> f64 {
        self.last_dt
    }

    pub fn last_stats(&self) -> FrameStats {
        self.last_stats
    }

    pub fn frame_interval(&self) -> Option<Duration> {
        self.frame_interval
    }

    pub fn render_config(&self) -> &RenderConfig {
        self.renderer.config()
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    pub fn vm(&self) -> &V {
        &self.vm
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::{FrameBuffer, RenderMode};
    use crate::vm::Chip8;

    fn driver() -> FrameDriver<Chip8, ManualClock> {
        let config = RenderConfig::new(640, 320, RenderMode::WindowGradient);
        FrameDriver::with_clock(Chip8::with_seed(3), config, ManualClock::new())
    }

    #[test]
    fn test_new_driver_is_idle() {
        let driver = driver();
        assert_eq!(driver.state(), DriverState::Idle);
        assert_eq!(driver.frames(), 0);
        assert!(driver.frame_interval().is_none());
    }

    #[test]
    fn test_frame_before_start() {
        let mut driver = driver();
        let mut surface = FrameBuffer::new(640, 320);
        assert_eq!(
            driver.frame(&mut surface),
            Err(DriverError::NotRunning(DriverState::Idle))
        );
    }

    #[test]
    fn test_start_encoded_decode_error() {
        let mut driver = driver();
        let result = driver.start_encoded("not base64!");
        assert!(matches!(result, Err(DriverError::Decode(_))));
        assert_eq!(driver.state(), DriverState::Idle);
        assert!(!driver.vm().is_loaded());
    }

    #[test]
    fn test_start_twice() {
        let mut driver = driver();
        driver.start(ProgramImage::new(vec![0x12, 0x00])).unwrap();
        assert_eq!(
            driver.start(ProgramImage::new(vec![0x12, 0x00])),
            Err(DriverError::NotRunning(DriverState::Running))
        );
    }

    #[test]
    fn test_frames_run_chip8_program() {
        let mut driver = driver();
        let mut surface = FrameBuffer::new(640, 320);
        // V0 = 0; I = glyph 0; draw at (V0, V0) height 5; loop
        driver
            .start(ProgramImage::new(vec![
                0x60, 0x00, 0xF0, 0x29, 0xD0, 0x05, 0x12, 0x06,
            ]))
            .unwrap();

        for _ in 0..3 {
            assert_eq!(driver.frame(&mut surface).unwrap(), Reschedule::Next);
        }

        // Glyph '0' lights 14 cells
        assert_eq!(driver.last_stats().cells_lit, 14);
        assert_eq!(driver.frames(), 3);
        assert_ne!(surface.pixel(5, 5), crate::display::Color::BLACK);
    }

    #[test]
    fn test_cancel_stops_after_current_frame() {
        let mut driver = driver();
        let mut surface = FrameBuffer::new(640, 320);
        driver.start(ProgramImage::new(vec![0x12, 0x00])).unwrap();

        driver.cancellation().cancel();
        assert_eq!(driver.frame(&mut surface).unwrap(), Reschedule::Stop);
        assert_eq!(driver.state(), DriverState::Stopped);
        assert_eq!(driver.frames(), 1);
        assert!(driver.frame(&mut surface).is_err());
    }

    #[test]
    fn test_run_returns_on_cancel() {
        let mut driver = driver();
        let mut surface = FrameBuffer::new(640, 320);
        driver.start(ProgramImage::new(vec![0x12, 0x00])).unwrap();
        driver.cancellation().cancel();

        assert_eq!(driver.run(&mut surface), Ok(1));
    }

    #[test]
    fn test_run_surfaces_step_error() {
        let mut driver = driver();
        let mut surface = FrameBuffer::new(640, 320);
        // 0x200: V0 = 1; 0x202: unknown opcode
        driver
            .start(ProgramImage::new(vec![0x60, 0x01, 0xE0, 0xFF]))
            .unwrap();

        let result = driver.run(&mut surface);
        assert!(matches!(
            result,
            Err(DriverError::Step(StepError::UnknownOpcode { opcode: 0xE0FF, .. }))
        ));
        assert_eq!(driver.frames(), 1);
        assert_eq!(driver.state(), DriverState::Stopped);
    }

    #[test]
    fn test_render_error_stops_driver() {
        let mut driver = driver();
        // Surface smaller than the configured geometry
        let mut surface = FrameBuffer::new(64, 32);
        driver.start(ProgramImage::new(vec![0x12, 0x00])).unwrap();

        assert!(matches!(
            driver.frame(&mut surface),
            Err(DriverError::Render(SurfaceError::OutOfBounds { .. }))
        ));
        assert_eq!(driver.state(), DriverState::Stopped);
    }

    #[test]
    fn test_frame_cap() {
        let driver = driver().with_frame_cap(Some(50));
        assert_eq!(driver.frame_interval(), Some(Duration::from_millis(20)));

        let driver = self::driver().with_frame_cap(Some(0));
        assert!(driver.frame_interval().is_none());
    }

    #[test]
    fn test_error_display() {
        let err = DriverError::Step(StepError::NotLoaded);
        assert_eq!(err.to_string(), "Step error: No program loaded");
        assert!(std::error::Error::source(&err).is_some());
    }
}
