//! Trajectory conditioning
//!
//! Turns IK-solved path segments into one flat, playback-ready trajectory:
//!
//! 1. unreachable waypoints (or whole paths) are removed,
//! 2. consecutive segments are joined by arcs on the painting sphere,
//! 3. the ends are padded with dwell waypoints,
//! 4. joint angles are re-branched for continuity and recentered.
//!
//! IK itself is not solved here; it is consumed through [`InverseKinematics`].

use crate::{
    color::Rgb,
    geometry::Pose,
    joint::{JointConfiguration, JOINT_COUNT},
    settings::ConditioningSettings,
    trajectory::{PathSegment, Trajectory},
    CoreError, Result,
};
use glam::{DQuat, DVec3};
use serde::{Deserialize, Serialize};
use std::f64::consts::{PI, TAU};

/// Boundary to the external kinematics solver.
pub trait InverseKinematics {
    /// Joint configuration reaching `pose`, or `None` if unreachable or colliding.
    fn solve(&self, pose: &Pose) -> Option<JointConfiguration>;
}

impl<F> InverseKinematics for F
where
    F: Fn(&Pose) -> Option<JointConfiguration>,
{
    fn solve(&self, pose: &Pose) -> Option<JointConfiguration> {
        self(pose)
    }
}

/// What to drop when a waypoint has no IK solution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnreachablePolicy {
    /// Drop only the unreachable waypoint
    #[default]
    DropPose,
    /// Drop the whole path containing it
    DropPath,
}

/// Upper bound on the poses of one transition arc
pub const MAX_TRANSITION_POSES: usize = 10_000;

/// Poses along the great-circle arc between two poses on a sphere.
///
/// Returns `[start, end]` when the arc needs fewer than two subdivisions at
/// `max_arc_step` spacing, otherwise `ceil(arc_length / max_arc_step)` poses
/// from the start origin to the end origin, each with its normal pointing
/// away from `center`. A step that is not positive, or one so small that the
/// arc would exceed [`MAX_TRANSITION_POSES`], is rejected.
pub fn synthesize_transition(
    start: &Pose,
    end: &Pose,
    center: DVec3,
    radius: f64,
    max_arc_step: f64,
) -> Result<Vec<Pose>> {
    if !(max_arc_step > 0.0) || !max_arc_step.is_finite() {
        return Err(CoreError::InvalidParameter(format!(
            "max_arc_step must be positive, got {}",
            max_arc_step
        )));
    }

    let a = start.point - center;
    let b = end.point - center;
    let axis = a.cross(b);
    let arc_angle = a.angle_between(b);
    let arc_length = arc_angle * radius;
    let num = (arc_length / max_arc_step).ceil();

    // Coincident or antipodal origins have no unique arc plane.
    if num.is_nan() || num < 2.0 || axis.length_squared() < 1e-18 {
        return Ok(vec![*start, *end]);
    }
    if num > MAX_TRANSITION_POSES as f64 {
        return Err(CoreError::InvalidParameter(format!(
            "transition of {:.4} m at step {} needs more than {} poses",
            arc_length, max_arc_step, MAX_TRANSITION_POSES
        )));
    }

    let num = num as usize;
    let axis = axis.normalize();
    let angle_step = arc_angle / (num - 1) as f64;
    Ok((0..num)
        .map(|i| {
            let rotation = DQuat::from_axis_angle(axis, angle_step * i as f64);
            let point = center + rotation * a;
            Pose::from_normal(point, point - center)
        })
        .collect())
}

/// Re-branch and recenter joint angles.
///
/// Every axis value is replaced by the 2π-equivalent closest to the previous
/// waypoint, the wrist roll is pinned to 0, and each axis is then shifted by
/// a whole turn if that brings its excursion closer to being centered on 0.
pub fn smooth(configs: &[JointConfiguration]) -> Vec<JointConfiguration> {
    let mut rows: Vec<[f64; JOINT_COUNT]> = Vec::with_capacity(configs.len());

    for config in configs {
        let mut values = *config.values();
        if let Some(prev) = rows.last() {
            for (value, &p) in values.iter_mut().zip(prev.iter()) {
                *value = closest_branch(p, *value);
            }
        }
        values[JOINT_COUNT - 1] = 0.0;
        rows.push(values);
    }

    for axis in 0..JOINT_COUNT {
        let (lo, hi) = rows
            .iter()
            .map(|row| row[axis])
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(v), hi.max(v))
            });
        let shift = recenter_shift(lo + hi);
        if shift != 0.0 {
            for row in rows.iter_mut() {
                row[axis] += shift;
            }
        }
    }

    rows.into_iter().map(JointConfiguration::new).collect()
}

/// Equivalent of `raw` (mod 2π) closest to `prev`.
fn closest_branch(prev: f64, raw: f64) -> f64 {
    let candidates = [raw, raw - TAU, raw + TAU];
    let mut best = raw;
    let mut best_diff = f64::INFINITY;
    for c in candidates {
        let diff = (prev - c).abs();
        if diff < best_diff {
            best = c;
            best_diff = diff;
        }
    }
    // prev has wound more than a turn away from the solver's range
    if best_diff > PI {
        best += TAU * ((prev - best) / TAU).round();
    }
    best
}

/// Whole-turn shift minimizing |lo + hi| of an axis.
fn recenter_shift(sum: f64) -> f64 {
    let options = [
        (sum.abs(), 0.0),
        ((sum - 2.0 * TAU).abs(), -TAU),
        ((sum + 2.0 * TAU).abs(), TAU),
    ];
    let mut best = options[0];
    for option in &options[1..] {
        if option.0 < best.0 {
            best = *option;
        }
    }
    best.1
}

/// Place authoring points (relative to the sphere center) into the robot
/// frame, each oriented with its normal pointing away from the center.
pub fn frames_on_sphere(points: &[DVec3], center: DVec3) -> Vec<Pose> {
    points
        .iter()
        .map(|p| {
            let point = *p + center;
            Pose::from_normal(point, point - center)
        })
        .collect()
}

#[derive(Debug, Clone)]
struct SolvedWaypoint {
    pose: Pose,
    config: JointConfiguration,
    color: Rgb,
    gradient: f64,
}

#[derive(Default)]
struct Flattened {
    poses: Vec<Pose>,
    configs: Vec<JointConfiguration>,
    colors: Vec<Rgb>,
    gradients: Vec<f64>,
    boundaries: Vec<bool>,
}

impl Flattened {
    fn push(
        &mut self,
        pose: Pose,
        config: JointConfiguration,
        color: Rgb,
        gradient: f64,
        boundary: bool,
    ) {
        self.poses.push(pose);
        self.configs.push(config);
        self.colors.push(color);
        self.gradients.push(gradient);
        self.boundaries.push(boundary);
    }
}

/// Builds playback-ready trajectories from path segments.
#[derive(Debug, Clone, Default)]
pub struct TrajectoryConditioner {
    settings: ConditioningSettings,
}

impl TrajectoryConditioner {
    /// Create a conditioner
    pub fn new(settings: ConditioningSettings) -> Self {
        Self { settings }
    }

    /// Conditioning settings
    pub fn settings(&self) -> &ConditioningSettings {
        &self.settings
    }

    /// Transition arc between two poses on the configured sphere
    pub fn transition(&self, start: &Pose, end: &Pose) -> Result<Vec<Pose>> {
        synthesize_transition(
            start,
            end,
            self.settings.center(),
            self.settings.sphere_radius,
            self.settings.max_arc_step,
        )
    }

    /// Run the full pipeline: reachability, transitions, padding, smoothing.
    pub fn condition<K>(&self, paths: Vec<PathSegment>, ik: &K) -> Result<Trajectory>
    where
        K: InverseKinematics + ?Sized,
    {
        self.settings.validate()?;

        let segments = self.reduce_to_reachable(paths, ik);
        if segments.is_empty() {
            return Err(CoreError::EmptyTrajectory);
        }

        let mut flat = Flattened::default();
        for (i, segment) in segments.iter().enumerate() {
            if i > 0 {
                let prev = &segments[i - 1][segments[i - 1].len() - 1];
                let next = &segment[0];
                let arc = self.transition(&prev.pose, &next.pose)?;
                for (k, pose) in arc.into_iter().enumerate() {
                    let config = ik.solve(&pose).ok_or(CoreError::UnsolvableTransition {
                        segment: i,
                        waypoint: k,
                    })?;
                    flat.push(pose, config, Rgb::BLACK, 0.0, false);
                }
            }

            let last = segment.len() - 1;
            for (k, w) in segment.iter().enumerate() {
                flat.push(w.pose, w.config, w.color, w.gradient, k == 0 || k == last);
            }
        }
        tracing::info!("Now {} waypoints with transitions", flat.poses.len());

        let padded = self.pad(flat);
        let configs = smooth(&padded.configs);
        Trajectory::new(
            padded.poses,
            configs,
            padded.colors,
            padded.gradients,
            padded.boundaries,
        )
    }

    /// Resolve joint configurations and drop what cannot be reached.
    fn reduce_to_reachable<K>(&self, paths: Vec<PathSegment>, ik: &K) -> Vec<Vec<SolvedWaypoint>>
    where
        K: InverseKinematics + ?Sized,
    {
        let total: usize = paths.iter().map(PathSegment::len).sum();
        let mut segments = Vec::with_capacity(paths.len());

        for (index, path) in paths.into_iter().enumerate() {
            let mut solved = Vec::with_capacity(path.len());
            let mut complete = true;
            for w in path.waypoints {
                match w.config.or_else(|| ik.solve(&w.pose)) {
                    Some(config) => solved.push(SolvedWaypoint {
                        pose: w.pose,
                        config,
                        color: w.color,
                        gradient: w.gradient,
                    }),
                    None => {
                        complete = false;
                        if self.settings.unreachable_policy == UnreachablePolicy::DropPath {
                            tracing::debug!("Dropping path {}: unreachable waypoint", index);
                            break;
                        }
                    }
                }
            }

            let keep = match self.settings.unreachable_policy {
                UnreachablePolicy::DropPose => !solved.is_empty(),
                UnreachablePolicy::DropPath => complete && !solved.is_empty(),
            };
            if keep {
                segments.push(solved);
            }
        }

        let kept: usize = segments.iter().map(Vec::len).sum();
        tracing::info!(
            "Removing {} of {} waypoints, since they are not reachable",
            total - kept,
            total
        );
        segments
    }

    /// Dwell at the first and last waypoint, dark.
    fn pad(&self, flat: Flattened) -> Flattened {
        let n = self.settings.pad_count;
        if n == 0 || flat.poses.is_empty() {
            return flat;
        }
        let first = (flat.poses[0], flat.configs[0]);
        let last_index = flat.poses.len() - 1;
        let last = (flat.poses[last_index], flat.configs[last_index]);

        let mut out = Flattened::default();
        for _ in 0..n {
            out.push(first.0, first.1, Rgb::BLACK, 0.0, false);
        }
        for i in 0..flat.poses.len() {
            out.push(
                flat.poses[i],
                flat.configs[i],
                flat.colors[i],
                flat.gradients[i],
                flat.boundaries[i],
            );
        }
        for _ in 0..n {
            out.push(last.0, last.1, Rgb::BLACK, 0.0, false);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closest_branch() {
        assert!((closest_branch(3.0, -3.0) - (TAU - 3.0)).abs() < 1e-12);
        assert!((closest_branch(-3.0, 3.0) - (3.0 - TAU)).abs() < 1e-12);
        assert_eq!(closest_branch(0.1, 0.2), 0.2);
    }

    #[test]
    fn test_closest_branch_unwinds_multiple_turns() {
        let prev = 3.0 * PI;
        let chosen = closest_branch(prev, -PI + 0.1);
        assert!((chosen - prev).abs() <= PI);
    }

    #[test]
    fn test_recenter_shift() {
        assert_eq!(recenter_shift(0.5), 0.0);
        assert_eq!(recenter_shift(4.0 * PI - 0.1), -TAU);
        assert_eq!(recenter_shift(-4.0 * PI + 0.1), TAU);
    }

    #[test]
    fn test_smooth_empty() {
        assert!(smooth(&[]).is_empty());
    }

    #[test]
    fn test_smooth_keeps_first_waypoint() {
        let configs = [
            JointConfiguration::new([0.5, -0.5, 1.0, -1.0, 0.2, 2.0]),
            JointConfiguration::new([0.6, -0.4, 1.1, -0.9, 0.3, -2.0]),
        ];
        let smoothed = smooth(&configs);
        assert_eq!(smoothed[0].values()[..5], configs[0].values()[..5]);
        assert_eq!(smoothed[0].values()[5], 0.0);
        assert_eq!(smoothed[1].values()[5], 0.0);
    }
}
