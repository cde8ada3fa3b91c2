// Frame Buffer - Software RGBA surface
//
// Stores one RGBA pixel per surface pixel. Gradient fills are shaded per
// pixel at the pixel center, in surface coordinates.

use super::surface::{Color, Paint, Rect, Surface, SurfaceError};

/// Bytes per RGBA pixel
const BYTES_PER_PIXEL: usize = 4;

/// Frame buffer backing the window and screenshots
pub struct FrameBuffer {
    width: u32,
    height: u32,
    /// Pixel data, row-major RGBA
    pixels: Vec<u8>,
}

impl FrameBuffer {
    /// Create a frame buffer of the given size initialized to black
    pub fn new(width: u32, height: u32) -> Self {
        let mut pixels = vec![0; width as usize * height as usize * BYTES_PER_PIXEL];
        for chunk in pixels.chunks_exact_mut(BYTES_PER_PIXEL) {
            chunk.copy_from_slice(&Color::BLACK.to_rgba());
        }

        Self {
            width,
            height,
            pixels,
        }
    }

    /// Get a pixel at the given coordinates
    ///
    /// # Panics
    /// Panics if coordinates are out of bounds
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> Color {
        assert!(x < self.width, "X coordinate {} out of bounds", x);
        assert!(y < self.height, "Y coordinate {} out of bounds", y);

        let offset = self.offset(x, y);
        Color {
            r: self.pixels[offset],
            g: self.pixels[offset + 1],
            b: self.pixels[offset + 2],
        }
    }

    /// Fill the whole buffer with one color
    pub fn clear(&mut self, color: Color) {
        let rgba = color.to_rgba();
        for chunk in self.pixels.chunks_exact_mut(BYTES_PER_PIXEL) {
            chunk.copy_from_slice(&rgba);
        }
    }

    /// Raw RGBA bytes
    pub fn as_rgba(&self) -> &[u8] {
        &self.pixels
    }

    /// Copy the buffer into an RGBA output (e.g. a `pixels` frame)
    ///
    /// # Panics
    /// Panics if output buffer is too small
    pub fn copy_to_rgba(&self, output: &mut [u8]) {
        assert!(
            output.len() >= self.pixels.len(),
            "Output buffer too small for RGBA copy"
        );
        output[..self.pixels.len()].copy_from_slice(&self.pixels);
    }

    /// RGB888 bytes, alpha dropped
    pub fn to_rgb(&self) -> Vec<u8> {
        self.pixels
            .chunks_exact(BYTES_PER_PIXEL)
            .flat_map(|px| [px[0], px[1], px[2]])
            .collect()
    }

    #[inline]
    fn offset(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * BYTES_PER_PIXEL
    }

    #[inline]
    fn put(&mut self, x: u32, y: u32, color: Color) {
        let offset = self.offset(x, y);
        self.pixels[offset..offset + BYTES_PER_PIXEL].copy_from_slice(&color.to_rgba());
    }
}

impl Surface for FrameBuffer {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn fill_rect(&mut self, rect: Rect, paint: &Paint) -> Result<(), SurfaceError> {
        self.check_bounds(rect)?;

        for y in rect.y..rect.y + rect.height {
            for x in rect.x..rect.x + rect.width {
                let color = match paint {
                    Paint::Solid(color) => *color,
                    Paint::Gradient(gradient) => {
                        gradient.color_at(f64::from(x) + 0.5, f64::from(y) + 0.5)
                    }
                };
                self.put(x, y, color);
            }
        }

        Ok(())
    }
}
