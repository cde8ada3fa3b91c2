// Renderer - Paints the 64x32 display grid onto a surface
//
// Each logical cell becomes a `cell_width` x `cell_height` rectangle. The grid
// is centered on the surface; any remainder becomes padding.

use super::gradient::RadialGradient;
use super::surface::{Color, Paint, Rect, Surface, SurfaceError};
use crate::vm::{VmHandle, DISPLAY_HEIGHT, DISPLAY_WIDTH};
use serde::{Deserialize, Serialize};
use std::rc::Rc;

/// How lit cells are filled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderMode {
    /// One gradient for the whole surface, built once
    #[default]
    WindowGradient,

    /// A fresh gradient centered on every lit cell, every frame
    PerCellGradient,
}

/// Grid-to-surface geometry, fixed for the lifetime of the driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderConfig {
    surface_width: u32,
    surface_height: u32,
    cell_width: u32,
    cell_height: u32,
    pad_x: u32,
    pad_y: u32,
    mode: RenderMode,
}

impl RenderConfig {
    /// Derive cell size and padding for a surface
    ///
    /// # Example
    ///
    /// ```
    /// use rust8::display::{RenderConfig, RenderMode};
    ///
    /// let config = RenderConfig::new(800, 400, RenderMode::WindowGradient);
    /// assert_eq!(config.cell_width(), 12);
    /// assert_eq!(config.pad_x(), 16);
    /// ```
    pub fn new(surface_width: u32, surface_height: u32, mode: RenderMode) -> Self {
        let cell_width = surface_width / DISPLAY_WIDTH as u32;
        let cell_height = surface_height / DISPLAY_HEIGHT as u32;

        Self {
            surface_width,
            surface_height,
            cell_width,
            cell_height,
            pad_x: (surface_width - cell_width * DISPLAY_WIDTH as u32) / 2,
            pad_y: (surface_height - cell_height * DISPLAY_HEIGHT as u32) / 2,
            mode,
        }
    }

    pub fn surface_width(&self) -> u32 {
        self.surface_width
    }

    pub fn surface_height(&self) -> u32 {
        self.surface_height
    }

    pub fn cell_width(&self) -> u32 {
        self.cell_width
    }

    pub fn cell_height(&self) -> u32 {
        self.cell_height
    }

    pub fn pad_x(&self) -> u32 {
        self.pad_x
    }

    pub fn pad_y(&self) -> u32 {
        self.pad_y
    }

    pub fn mode(&self) -> RenderMode {
        self.mode
    }

    /// Surface rectangle for logical cell `(x, y)`
    #[inline]
    pub fn cell_rect(&self, x: usize, y: usize) -> Rect {
        Rect::new(
            self.pad_x + x as u32 * self.cell_width,
            self.pad_y + y as u32 * self.cell_height,
            self.cell_width,
            self.cell_height,
        )
    }

    /// Surface rectangle covering the whole grid
    pub fn grid_rect(&self) -> Rect {
        Rect::new(
            self.pad_x,
            self.pad_y,
            self.cell_width * DISPLAY_WIDTH as u32,
            self.cell_height * DISPLAY_HEIGHT as u32,
        )
    }

    /// The whole-surface glow: centered, radius from the larger dimension
    pub fn window_gradient(&self) -> RadialGradient {
        RadialGradient::glow(
            f64::from(self.surface_width) / 2.0,
            f64::from(self.surface_height) / 2.0,
            f64::from(self.surface_width.max(self.surface_height)),
        )
    }

    /// Glow centered on one cell, radius from the cell width
    pub fn cell_gradient(&self, cell: Rect) -> RadialGradient {
        let (x, y) = cell.center();
        RadialGradient::glow(x, y, f64::from(self.cell_width))
    }
}

/// Holds the window gradient once it has been built
///
/// Surface dimensions never change, so the entry lives as long as the
/// renderer. Per-cell gradients never go through here.
#[derive(Debug, Default)]
pub struct GradientCache {
    window: Option<Rc<RadialGradient>>,
    builds: u64,
}

impl GradientCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The window gradient, built on first use
    pub fn window_gradient(&mut self, config: &RenderConfig) -> Rc<RadialGradient> {
        if let Some(gradient) = &self.window {
            return Rc::clone(gradient);
        }

        let gradient = Rc::new(config.window_gradient());
        self.builds += 1;
        self.window = Some(Rc::clone(&gradient));
        gradient
    }

    /// Whether the window gradient has been built
    pub fn is_populated(&self) -> bool {
        self.window.is_some()
    }

    /// How many times the window gradient was built (0 or 1)
    pub fn builds(&self) -> u64 {
        self.builds
    }
}

/// Per-frame render statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Cells reported lit by the VM
    pub cells_lit: usize,

    /// Gradients constructed during the frame
    pub gradients_built: usize,
}

/// Paints the VM display onto a surface
pub struct Renderer {
    config: RenderConfig,
    cache: GradientCache,
}

impl Renderer {
    pub fn new(config: RenderConfig) -> Self {
        Self {
            config,
            cache: GradientCache::new(),
        }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn cache(&self) -> &GradientCache {
        &self.cache
    }

    /// Clear the grid and paint every lit cell, row-major
    ///
    /// The bitmap is read from the VM cell by cell; nothing is kept between
    /// frames except the window gradient.
    pub fn render<V, S>(&mut self, vm: &V, surface: &mut S) -> Result<FrameStats, SurfaceError>
    where
        V: VmHandle + ?Sized,
        S: Surface + ?Sized,
    {
        let mut stats = FrameStats::default();
        let cached_builds = self.cache.builds();

        surface.fill_rect(self.config.grid_rect(), &Paint::Solid(Color::BLACK))?;

        for y in 0..DISPLAY_HEIGHT {
            for x in 0..DISPLAY_WIDTH {
                if !vm.is_pixel_set(x, y) {
                    continue;
                }

                let cell = self.config.cell_rect(x, y);
                let paint = match self.config.mode {
                    RenderMode::WindowGradient => {
                        Paint::Gradient(self.cache.window_gradient(&self.config))
                    }
                    RenderMode::PerCellGradient => {
                        stats.gradients_built += 1;
                        Paint::Gradient(Rc::new(self.config.cell_gradient(cell)))
                    }
                };

                surface.fill_rect(cell, &paint)?;
                stats.cells_lit += 1;
            }
        }

        stats.gradients_built += (self.cache.builds() - cached_builds) as usize;
        Ok(stats)
    }
}
