//! Path segments and the flattened playback trajectory.

use crate::{color::Rgb, geometry::Pose, joint::JointConfiguration, CoreError, Result};
use serde::{Deserialize, Serialize};

/// One pose of a stroke with its paint data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    /// Tool frame
    pub pose: Pose,
    /// IK solution, `None` when the pose is unsolved or unreachable
    #[serde(default)]
    pub config: Option<JointConfiguration>,
    /// Color emitted at this pose
    pub color: Rgb,
    /// Brightness gradient (0-1)
    pub gradient: f64,
}

impl Waypoint {
    /// Create an unsolved waypoint
    pub fn new(pose: Pose, color: Rgb, gradient: f64) -> Self {
        Self {
            pose,
            config: None,
            color,
            gradient,
        }
    }

    /// Attach an IK solution
    pub fn with_config(mut self, config: JointConfiguration) -> Self {
        self.config = Some(config);
        self
    }
}

/// One continuous stroke of the painting.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PathSegment {
    /// Ordered waypoints
    pub waypoints: Vec<Waypoint>,
}

impl PathSegment {
    /// Create a segment from waypoints
    pub fn new(waypoints: Vec<Waypoint>) -> Self {
        Self { waypoints }
    }

    /// Build a segment from parallel per-pose sequences.
    pub fn from_parts(poses: Vec<Pose>, colors: Vec<Rgb>, gradients: Vec<f64>) -> Result<Self> {
        if poses.len() != colors.len() || poses.len() != gradients.len() {
            return Err(CoreError::LengthMismatch(format!(
                "segment poses: {}, colors: {}, gradients: {}",
                poses.len(),
                colors.len(),
                gradients.len()
            )));
        }
        let waypoints = poses
            .into_iter()
            .zip(colors)
            .zip(gradients)
            .map(|((pose, color), gradient)| Waypoint::new(pose, color, gradient))
            .collect();
        Ok(Self { waypoints })
    }

    /// Number of waypoints
    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    /// True if the segment has no waypoints
    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }
}

/// Playback-ready trajectory: five index-aligned sequences of equal length.
///
/// Only constructible through [`Trajectory::new`], which rejects mismatched
/// lengths, so a compiled program always matches the LED data.
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    poses: Vec<Pose>,
    joint_configs: Vec<JointConfiguration>,
    colors: Vec<Rgb>,
    gradients: Vec<f64>,
    boundaries: Vec<bool>,
}

impl Trajectory {
    /// Validate lengths and build the trajectory
    pub fn new(
        poses: Vec<Pose>,
        joint_configs: Vec<JointConfiguration>,
        colors: Vec<Rgb>,
        gradients: Vec<f64>,
        boundaries: Vec<bool>,
    ) -> Result<Self> {
        let n = poses.len();
        if joint_configs.len() != n
            || colors.len() != n
            || gradients.len() != n
            || boundaries.len() != n
        {
            return Err(CoreError::LengthMismatch(format!(
                "poses: {}, configurations: {}, colors: {}, gradients: {}, boundaries: {}",
                n,
                joint_configs.len(),
                colors.len(),
                gradients.len(),
                boundaries.len()
            )));
        }
        Ok(Self {
            poses,
            joint_configs,
            colors,
            gradients,
            boundaries,
        })
    }

    /// Number of waypoints
    pub fn len(&self) -> usize {
        self.poses.len()
    }

    /// True if there are no waypoints
    pub fn is_empty(&self) -> bool {
        self.poses.is_empty()
    }

    /// Tool frames
    pub fn poses(&self) -> &[Pose] {
        &self.poses
    }

    /// Joint configurations
    pub fn joint_configs(&self) -> &[JointConfiguration] {
        &self.joint_configs
    }

    /// Colors
    pub fn colors(&self) -> &[Rgb] {
        &self.colors
    }

    /// Gradient values
    pub fn gradients(&self) -> &[f64] {
        &self.gradients
    }

    /// Start/end flags of the original segments
    pub fn boundaries(&self) -> &[bool] {
        &self.boundaries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec3;

    fn poses(n: usize) -> Vec<Pose> {
        (0..n)
            .map(|i| Pose::world(DVec3::new(i as f64, 0.0, 0.0)))
            .collect()
    }

    #[test]
    fn test_trajectory_accepts_equal_lengths() {
        let t = Trajectory::new(
            poses(3),
            vec![JointConfiguration::default(); 3],
            vec![Rgb::BLACK; 3],
            vec![0.0; 3],
            vec![true, false, true],
        )
        .unwrap();
        assert_eq!(t.len(), 3);
        assert_eq!(t.boundaries(), &[true, false, true]);
    }

    #[test]
    fn test_trajectory_rejects_mismatch() {
        let result = Trajectory::new(
            poses(3),
            vec![JointConfiguration::default(); 3],
            vec![Rgb::BLACK; 2],
            vec![0.0; 3],
            vec![false; 3],
        );
        assert!(matches!(result, Err(CoreError::LengthMismatch(_))));
    }

    #[test]
    fn test_segment_from_parts() {
        let segment =
            PathSegment::from_parts(poses(2), vec![Rgb::BLACK; 2], vec![0.5, 1.0]).unwrap();
        assert_eq!(segment.len(), 2);
        assert!(segment.waypoints.iter().all(|w| w.config.is_none()));

        let bad = PathSegment::from_parts(poses(2), vec![Rgb::BLACK; 1], vec![0.5, 1.0]);
        assert!(bad.is_err());
    }
}
