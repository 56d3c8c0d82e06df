//! Brightness response curve.
//!
//! Gradient values from the authoring tool are perceptually linear; the
//! fixture is not. Brightness is shaped with a fixed cubic Bezier with
//! control points (0,0), (x,0), (y,1), (1,1).

use glam::DVec2;
use serde::{Deserialize, Serialize};

/// Cubic Bezier brightness curve
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradientCurve {
    /// x coordinate of the second control point
    pub x: f64,
    /// x coordinate of the third control point
    pub y: f64,
}

impl Default for GradientCurve {
    fn default() -> Self {
        Self { x: 1.0, y: 1.0 }
    }
}

impl GradientCurve {
    fn control_points(&self) -> [DVec2; 4] {
        [
            DVec2::new(0.0, 0.0),
            DVec2::new(self.x, 0.0),
            DVec2::new(self.y, 1.0),
            DVec2::new(1.0, 1.0),
        ]
    }

    /// Point on the curve at parameter `t`, clamped to [0, 1].
    pub fn point(&self, t: f64) -> DVec2 {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let u = 1.0 - t;
        let [p0, p1, p2, p3] = self.control_points();
        p0 * (u * u * u) + p1 * (3.0 * u * u * t) + p2 * (3.0 * u * t * t) + p3 * (t * t * t)
    }

    /// Remapped intensity (0-1) for a scaled gradient value.
    pub fn remap(&self, value: f64) -> f64 {
        self.point(value).y
    }

    /// Fixture brightness (0-255) for a gradient value and multiplier.
    pub fn brightness(&self, gradient: f64, multiplier: f64) -> u8 {
        (255.0 * self.remap(gradient * multiplier))
            .round()
            .clamp(0.0, 255.0) as u8
    }
}
