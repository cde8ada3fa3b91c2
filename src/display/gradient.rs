// Radial gradient - Two-stop glow between concentric circles
//
// Inside the inner circle the inner color is used, outside the outer circle
// the outer color, and in between the two are blended linearly by distance.

use super::surface::Color;

/// Inner radius as a fraction of the gradient radius
pub const INNER_RADIUS_FACTOR: f64 = 0.03;

/// Outer radius as a fraction of the gradient radius
pub const OUTER_RADIUS_FACTOR: f64 = 0.9;

/// Concentric two-stop radial gradient in surface coordinates
#[derive(Debug, Clone, PartialEq)]
pub struct RadialGradient {
    pub center_x: f64,
    pub center_y: f64,
    pub inner_radius: f64,
    pub outer_radius: f64,
    pub inner_color: Color,
    pub outer_color: Color,
}

impl RadialGradient {
    /// Green-to-black glow centered at `(x, y)`
    ///
    /// The color ramp runs from 3% to 90% of `radius`.
    pub fn glow(x: f64, y: f64, radius: f64) -> Self {
        Self {
            center_x: x,
            center_y: y,
            inner_radius: radius * INNER_RADIUS_FACTOR,
            outer_radius: radius * OUTER_RADIUS_FACTOR,
            inner_color: Color::GLOW_GREEN,
            outer_color: Color::BLACK,
        }
    }

    /// Color at surface point `(x, y)`
    pub fn color_at(&self, x: f64, y: f64) -> Color {
        let distance = (x - self.center_x).hypot(y - self.center_y);

        if distance <= self.inner_radius {
            self.inner_color
        } else if distance >= self.outer_radius {
            self.outer_color
        } else {
            let t = (distance - self.inner_radius) / (self.outer_radius - self.inner_radius);
            self.inner_color.lerp(self.outer_color, t)
        }
    }
}
