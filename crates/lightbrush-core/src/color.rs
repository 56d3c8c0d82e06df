//! Per-waypoint colors and the scale they are authored in.

use serde::{Deserialize, Serialize};

/// RGB triple as authored, either in unit (0-1) or byte (0-255) scale.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rgb(pub [f64; 3]);

impl Rgb {
    /// Black, used for transitions and padding
    pub const BLACK: Rgb = Rgb([0.0, 0.0, 0.0]);

    /// Create a color from components
    pub fn new(r: f64, g: f64, b: f64) -> Self {
        Self([r, g, b])
    }

    /// Largest component
    pub fn max_component(&self) -> f64 {
        self.0.iter().copied().fold(f64::MIN, f64::max)
    }
}

/// Scale of the color components of a run. Fixed for the whole trajectory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorScale {
    /// Components in 0.0-1.0
    #[default]
    Unit,
    /// Components in 0-255
    Byte,
}

impl ColorScale {
    /// Guess the scale from the data: any component above 1 means byte scale.
    pub fn detect(colors: &[Rgb]) -> Self {
        if colors.iter().any(|c| c.max_component() > 1.0) {
            ColorScale::Byte
        } else {
            ColorScale::Unit
        }
    }

    /// Convert to the bytes sent to the fixture.
    pub fn to_bytes(self, color: Rgb) -> [u8; 3] {
        let factor = match self {
            ColorScale::Unit => 255.0,
            ColorScale::Byte => 1.0,
        };
        color.0.map(|c| (c * factor).round().clamp(0.0, 255.0) as u8)
    }
}
