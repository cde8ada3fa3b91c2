// Surface - The drawing target the renderer paints into
//
// The renderer only needs one primitive: fill a rectangle with a paint.

use super::gradient::RadialGradient;
use std::rc::Rc;

/// 24-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    /// Background color
    pub const BLACK: Color = Color::from_rgb(0x000000);

    /// Inner stop of the glow gradient
    pub const GLOW_GREEN: Color = Color::from_rgb(0x00F200);

    /// Build a color from a 0xRRGGBB value
    pub const fn from_rgb(rgb: u32) -> Self {
        Self {
            r: ((rgb >> 16) & 0xFF) as u8,
            g: ((rgb >> 8) & 0xFF) as u8,
            b: (rgb & 0xFF) as u8,
        }
    }

    /// Linear interpolation towards `other`, `t` clamped to [0, 1]
    pub fn lerp(self, other: Color, t: f64) -> Color {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (f64::from(a) + (f64::from(b) - f64::from(a)) * t).round() as u8;
        Color {
            r: mix(self.r, other.r),
            g: mix(self.g, other.g),
            b: mix(self.b, other.b),
        }
    }

    /// [R, G, B, A] bytes, fully opaque
    #[inline]
    pub fn to_rgba(self) -> [u8; 4] {
        [self.r, self.g, self.b, 0xFF]
    }
}

/// Integer rectangle in surface pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// One past the right-most column
    pub fn right(&self) -> u64 {
        u64::from(self.x) + u64::from(self.width)
    }

    /// One past the bottom-most row
    pub fn bottom(&self) -> u64 {
        u64::from(self.y) + u64::from(self.height)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Geometric center
    pub fn center(&self) -> (f64, f64) {
        (
            f64::from(self.x) + f64::from(self.width) / 2.0,
            f64::from(self.y) + f64::from(self.height) / 2.0,
        )
    }
}

/// What a rectangle is filled with
///
/// Gradients are shared through `Rc` so the cached window gradient is one
/// object no matter how many cells use it.
#[derive(Debug, Clone, PartialEq)]
pub enum Paint {
    Solid(Color),
    Gradient(Rc<RadialGradient>),
}

/// Errors a surface can report while painting
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceError {
    /// The rectangle does not fit inside the surface
    OutOfBounds {
        rect: Rect,
        surface_width: u32,
        surface_height: u32,
    },
}

impl std::fmt::Display for SurfaceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SurfaceError::OutOfBounds {
                rect,
                surface_width,
                surface_height,
            } => write!(
                f,
                "Rectangle {}x{} at ({}, {}) outside {}x{} surface",
                rect.width, rect.height, rect.x, rect.y, surface_width, surface_height
            ),
        }
    }
}

impl std::error::Error for SurfaceError {}

/// Fixed-size, pixel-addressable drawing target
pub trait Surface {
    /// Width in pixels
    fn width(&self) -> u32;

    /// Height in pixels
    fn height(&self) -> u32;

    /// Fill `rect` with `paint`
    fn fill_rect(&mut self, rect: Rect, paint: &Paint) -> Result<(), SurfaceError>;

    /// Check that `rect` lies inside the surface
    fn check_bounds(&self, rect: Rect) -> Result<(), SurfaceError> {
        if rect.right() > u64::from(self.width()) || rect.bottom() > u64::from(self.height()) {
            return Err(SurfaceError::OutOfBounds {
                rect,
                surface_width: self.width(),
                surface_height: self.height(),
            });
        }
        Ok(())
    }
}
