// Window module - Hosts the frame loop in a winit event loop
//
// Each `RedrawRequested` runs one driver frame into a software frame buffer,
// which is then presented through `pixels`. Requesting the next redraw is
// the reschedule step; the event loop polls, so frames run back to back
// unless the driver has a frame cap.

use super::framebuffer::FrameBuffer;
use super::surface::Surface;
use crate::config::ScreenshotConfig;
use crate::driver::{DriverError, DriverState, FrameDriver, Reschedule};
use crate::input::KeypadMapping;
use crate::screenshot::save_screenshot;
use crate::vm::VmHandle;
use pixels::{Pixels, SurfaceTexture};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::error::{EventLoopError, OsError};
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

/// Errors that end the windowed host
#[derive(Debug)]
pub enum HostError {
    /// Event loop creation or execution failed
    EventLoop(EventLoopError),

    /// The window could not be created
    Window(OsError),

    /// Presentation surface error
    Pixels(pixels::Error),

    /// The frame driver failed
    Driver(DriverError),
}

impl std::fmt::Display for HostError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HostError::EventLoop(e) => write!(f, "Event loop error: {}", e),
            HostError::Window(e) => write!(f, "Window error: {}", e),
            HostError::Pixels(e) => write!(f, "Pixels error: {}", e),
            HostError::Driver(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for HostError {}

impl From<EventLoopError> for HostError {
    fn from(e: EventLoopError) -> Self {
        HostError::EventLoop(e)
    }
}

impl From<OsError> for HostError {
    fn from(e: OsError) -> Self {
        HostError::Window(e)
    }
}

impl From<pixels::Error> for HostError {
    fn from(e: pixels::Error) -> Self {
        HostError::Pixels(e)
    }
}

impl From<DriverError> for HostError {
    fn from(e: DriverError) -> Self {
        HostError::Driver(e)
    }
}

/// Window that owns the driver and its surface
pub struct GlowWindow<V: VmHandle> {
    window: Option<Arc<Window>>,
    pixels: Option<Pixels<'static>>,
    surface: FrameBuffer,
    driver: FrameDriver<V>,
    keypad: KeypadMapping,
    screenshot: ScreenshotConfig,
    last_frame_time: Instant,
    closing: bool,
    error: Option<HostError>,
}

impl<V: VmHandle> GlowWindow<V> {
    /// Create a window host (the OS window is created when the event loop
    /// resumes)
    pub fn new(
        driver: FrameDriver<V>,
        keypad: KeypadMapping,
        screenshot: ScreenshotConfig,
    ) -> Self {
        let config = driver.render_config();
        let surface = FrameBuffer::new(config.surface_width(), config.surface_height());

        Self {
            window: None,
            pixels: None,
            surface,
            driver,
            keypad,
            screenshot,
            last_frame_time: Instant::now(),
            closing: false,
            error: None,
        }
    }

    /// Get a reference to the driver
    pub fn driver(&self) -> &FrameDriver<V> {
        &self.driver
    }

    /// Whether a stop was requested; no frames run after this
    pub fn is_closing(&self) -> bool {
        self.closing
    }

    /// Take the error that ended the event loop, if any
    pub fn take_error(&mut self) -> Option<HostError> {
        self.error.take()
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: HostError) {
        self.error = Some(error);
        event_loop.exit();
    }

    /// Check if enough time has passed for the next frame
    fn should_run_frame(&mut self) -> bool {
        match self.driver.frame_interval() {
            None => true,
            Some(interval) => {
                if self.last_frame_time.elapsed() >= interval {
                    self.last_frame_time = Instant::now();
                    true
                } else {
                    false
                }
            }
        }
    }

    /// Run one frame and present it
    fn run_frame(&mut self, event_loop: &ActiveEventLoop) {
        match self.driver.frame(&mut self.surface) {
            Ok(Reschedule::Next) => {
                if let Err(e) = self.present() {
                    self.fail(event_loop, e);
                }
            }
            Ok(Reschedule::Stop) => event_loop.exit(),
            Err(e) => self.fail(event_loop, e.into()),
        }
    }

    fn present(&mut self) -> Result<(), HostError> {
        if let Some(pixels) = &mut self.pixels {
            self.surface.copy_to_rgba(pixels.frame_mut());
            pixels.render()?;
        }
        Ok(())
    }

    /// Cancel the driver and stop scheduling frames
    ///
    /// Frames run to completion inside `RedrawRequested`, so any other event
    /// arrives on a frame boundary.
    fn begin_shutdown(&mut self) {
        self.driver.cancellation().cancel();
        self.closing = true;
    }

    /// Stop now instead of waiting for another redraw, which a minimized
    /// window may never get
    fn request_stop(&mut self, event_loop: &ActiveEventLoop) {
        self.begin_shutdown();
        event_loop.exit();
    }

    fn handle_key(
        &mut self,
        event_loop: &ActiveEventLoop,
        key: PhysicalKey,
        state: ElementState,
        repeat: bool,
    ) {
        let pressed = state == ElementState::Pressed;

        match key {
            PhysicalKey::Code(KeyCode::Escape) if pressed => self.request_stop(event_loop),
            PhysicalKey::Code(KeyCode::F9) if pressed && !repeat => {
                if let Err(e) = save_screenshot(&self.surface, &self.screenshot) {
                    warn!(error = %e, "failed to save screenshot");
                }
            }
            _ => {
                if let Some(keypad_key) = self.keypad.key_for_physical(key) {
                    self.driver.set_key(keypad_key, pressed);
                }
            }
        }
    }
}

impl<V: VmHandle> ApplicationHandler for GlowWindow<V> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let (width, height) = (self.surface.width(), self.surface.height());
        let window_attributes = Window::default_attributes()
            .with_title(format!("rust8 - {}x{}", width, height))
            .with_inner_size(LogicalSize::new(width, height))
            .with_resizable(false);

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => return self.fail(event_loop, e.into()),
        };
        let window_size = window.inner_size();

        // Arc<Window> gives the surface texture a 'static window handle
        let surface_texture =
            SurfaceTexture::new(window_size.width, window_size.height, window.clone());

        let pixels = match Pixels::new(width, height, surface_texture) {
            Ok(pixels) => pixels,
            Err(e) => return self.fail(event_loop, e.into()),
        };

        info!(width, height, "window created");
        self.window = Some(window);
        self.pixels = Some(pixels);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                info!("close requested");
                self.request_stop(event_loop);
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key,
                        state,
                        repeat,
                        ..
                    },
                ..
            } => self.handle_key(event_loop, physical_key, state, repeat),
            WindowEvent::RedrawRequested => {
                if self.closing {
                    return;
                }

                if self.driver.state() == DriverState::Running && self.should_run_frame() {
                    self.run_frame(event_loop);
                }

                // Reschedule
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if self.closing {
            return;
        }

        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

/// Run the driver in a window until it is cancelled or fails
///
/// The driver should already be started. Returns the error that ended the
/// loop, if any.
pub fn run_window<V: VmHandle>(
    driver: FrameDriver<V>,
    keypad: KeypadMapping,
    screenshot: ScreenshotConfig,
) -> Result<(), HostError> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut host = GlowWindow::new(driver, keypad, screenshot);
    event_loop.run_app(&mut host)?;

    match host.take_error() {
        Some(e) => Err(e),
        None => {
            info!(frames = host.driver().frames(), "window closed");
            Ok(())
        }
    }
}
