// Display module - Surfaces, gradients, and grid rendering
//
// This module provides:
// - The `Surface` drawing contract (rectangle fills with solid or gradient paint)
// - A software RGBA frame buffer implementing it
// - Radial glow gradients and the window-gradient cache
// - The renderer mapping the 64x32 grid onto a surface
// - The winit + pixels window hosting the frame loop

pub mod framebuffer;
pub mod gradient;
pub mod renderer;
pub mod surface;
pub mod window;

pub use framebuffer::FrameBuffer;
pub use gradient::RadialGradient;
pub use renderer::{FrameStats, GradientCache, RenderConfig, RenderMode, Renderer};
pub use surface::{Color, Paint, Rect, Surface, SurfaceError};
pub use window::{run_window, GlowWindow, HostError};
