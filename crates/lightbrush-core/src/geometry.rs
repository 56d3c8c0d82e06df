//! Rigid-body frames in the robot's reference frame.

use glam::DVec3;
use serde::{Deserialize, Serialize};

/// Rigid-body frame: origin plus orthonormal x/y axes (z is derived).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    /// Frame origin
    pub point: DVec3,
    /// Unit x axis
    pub xaxis: DVec3,
    /// Unit y axis, orthogonal to `xaxis`
    pub yaxis: DVec3,
}

impl Pose {
    /// Build a frame from an origin and two (not necessarily orthonormal) axes.
    ///
    /// The y axis is re-orthogonalized against x, so any non-parallel pair
    /// yields a valid right-handed frame.
    pub fn from_axes(point: DVec3, xaxis: DVec3, yaxis: DVec3) -> Self {
        let x = xaxis.normalize_or_zero();
        let z = x.cross(yaxis).normalize_or_zero();
        let y = z.cross(x);
        Self {
            point,
            xaxis: x,
            yaxis: y,
        }
    }

    /// Build a frame whose z axis points along `normal`.
    pub fn from_normal(point: DVec3, normal: DVec3) -> Self {
        let z = normal.normalize_or_zero();
        if z == DVec3::ZERO {
            return Self::world(point);
        }
        let (x, _) = z.any_orthonormal_pair();
        let y = z.cross(x);
        Self {
            point,
            xaxis: x,
            yaxis: y,
        }
    }

    /// Frame aligned with the world axes.
    pub fn world(point: DVec3) -> Self {
        Self {
            point,
            xaxis: DVec3::X,
            yaxis: DVec3::Y,
        }
    }

    /// Derived z axis (frame normal)
    pub fn zaxis(&self) -> DVec3 {
        self.xaxis.cross(self.yaxis)
    }
}
