use lightbrush_core::{
    frames_on_sphere, smooth, synthesize_transition, ConditioningSettings, CoreError, DVec3,
    JointConfiguration, PathSegment, Pose, Rgb, TrajectoryConditioner, UnreachablePolicy,
    Waypoint,
};
use proptest::prelude::*;
use std::f64::consts::{PI, TAU};

const RADIUS: f64 = 0.15;

fn center() -> DVec3 {
    DVec3::new(0.417292, 0.0, 0.252544)
}

/// Pose on the sphere at polar angle `theta` in the xz-plane.
fn pose_on_sphere(theta: f64) -> Pose {
    let dir = DVec3::new(theta.sin(), 0.0, theta.cos());
    Pose::from_normal(center() + dir * RADIUS, dir)
}

/// IK stand-in: deterministic joint values derived from the pose origin.
fn fake_ik(pose: &Pose) -> Option<JointConfiguration> {
    let p = pose.point;
    Some(JointConfiguration::new([p.x, p.y, p.z, p.x - p.z, 0.5, 1.0]))
}

fn segment(thetas: &[f64], color: Rgb) -> PathSegment {
    PathSegment::new(
        thetas
            .iter()
            .map(|&t| Waypoint::new(pose_on_sphere(t), color, 0.5))
            .collect(),
    )
}

#[test]
fn test_short_transition_returns_endpoints() {
    // 0.1 rad at r=0.15 is 0.015 m: ceil(0.75) = 1 subdivision
    let start = pose_on_sphere(0.0);
    let end = pose_on_sphere(0.1);
    let arc = synthesize_transition(&start, &end, center(), RADIUS, 0.02).unwrap();
    assert_eq!(arc, vec![start, end]);
}

#[test]
fn test_long_transition_point_count_and_endpoints() {
    // 1.0 rad at r=0.15 is 0.15 m: ceil(7.5) = 8 points
    let start = pose_on_sphere(0.0);
    let end = pose_on_sphere(1.0);
    let arc = synthesize_transition(&start, &end, center(), RADIUS, 0.02).unwrap();
    assert_eq!(arc.len(), (1.0_f64 * RADIUS / 0.02).ceil() as usize);

    assert!(arc[0].point.distance(start.point) < 1e-9);
    assert!(arc[arc.len() - 1].point.distance(end.point) < 1e-9);

    for pose in &arc {
        let radial = pose.point - center();
        assert!((radial.length() - RADIUS).abs() < 1e-9);
        // Normal points away from the sphere center
        assert!(pose.zaxis().distance(radial.normalize()) < 1e-9);
    }

    // Evenly spaced
    let spacing: Vec<f64> = arc.windows(2).map(|w| w[0].point.distance(w[1].point)).collect();
    for d in &spacing {
        assert!((d - spacing[0]).abs() < 1e-9);
    }
}

#[test]
fn test_coincident_transition() {
    let pose = pose_on_sphere(0.4);
    let arc = synthesize_transition(&pose, &pose, center(), RADIUS, 0.02).unwrap();
    assert_eq!(arc.len(), 2);
}

#[test]
fn test_transition_rejects_degenerate_step() {
    let start = pose_on_sphere(0.0);
    let end = pose_on_sphere(1.0);
    for step in [0.0, -0.02, f64::NAN, f64::INFINITY] {
        assert!(matches!(
            synthesize_transition(&start, &end, center(), RADIUS, step),
            Err(CoreError::InvalidParameter(_))
        ));
    }
    // 0.15 m at 1 µm would be 150000 poses
    assert!(matches!(
        synthesize_transition(&start, &end, center(), RADIUS, 1e-6),
        Err(CoreError::InvalidParameter(_))
    ));
}

#[test]
fn test_frames_on_sphere() {
    let points = [DVec3::new(0.0, 0.0, RADIUS), DVec3::new(RADIUS, 0.0, 0.0)];
    let frames = frames_on_sphere(&points, center());
    assert!(frames[0].point.distance(center() + points[0]) < 1e-12);
    assert!(frames[0].zaxis().distance(DVec3::Z) < 1e-9);
    assert!(frames[1].zaxis().distance(DVec3::X) < 1e-9);
}

#[test]
fn test_smooth_rebranches_across_pi() {
    let configs = [
        JointConfiguration::new([3.0, 0.0, 0.0, 0.0, 0.0, 0.0]),
        JointConfiguration::new([-3.0, 0.0, 0.0, 0.0, 0.0, 0.0]),
    ];
    let smoothed = smooth(&configs);
    let a = smoothed[0].values()[0];
    let b = smoothed[1].values()[0];
    assert!((b - a).abs() < PI);
    assert!(((b - a) - (TAU - 6.0)).abs() < 1e-12);
}

#[test]
fn test_smooth_recenters_axis() {
    // All values near +2π: recentering should bring them near 0
    let configs: Vec<JointConfiguration> = (0..4)
        .map(|i| JointConfiguration::new([TAU + 0.1 * i as f64, 0.0, 0.0, 0.0, 0.0, 0.0]))
        .collect();
    let smoothed = smooth(&configs);
    for (raw, s) in configs.iter().zip(&smoothed) {
        assert!((s.values()[0] - (raw.values()[0] - TAU)).abs() < 1e-12);
    }
}

#[test]
fn test_condition_inserts_transitions_and_pads() {
    let settings = ConditioningSettings::default();
    let pad = settings.pad_count;
    let conditioner = TrajectoryConditioner::new(settings);

    let red = Rgb::new(1.0, 0.0, 0.0);
    let paths = vec![segment(&[0.0, 0.05, 0.1], red), segment(&[1.0, 1.05], red)];
    let transition_len = conditioner
        .transition(&pose_on_sphere(0.1), &pose_on_sphere(1.0))
        .unwrap()
        .len();

    let trajectory = conditioner.condition(paths, &fake_ik).unwrap();
    assert_eq!(trajectory.len(), 2 * pad + 3 + transition_len + 2);

    // Padding and transitions are dark
    assert_eq!(trajectory.colors()[0], Rgb::BLACK);
    assert_eq!(trajectory.gradients()[0], 0.0);
    assert_eq!(trajectory.colors()[pad], red);
    assert_eq!(trajectory.colors()[pad + 3], Rgb::BLACK);

    // Boundaries only at segment ends
    let flags = trajectory.boundaries();
    assert!(!flags[0]);
    assert!(flags[pad]);
    assert!(!flags[pad + 1]);
    assert!(flags[pad + 2]);
    assert!(flags[pad + 3 + transition_len]);
    assert!(flags[pad + 3 + transition_len + 1]);
    assert_eq!(flags.iter().filter(|&&f| f).count(), 4);

    // Wrist roll pinned
    assert!(trajectory.joint_configs().iter().all(|c| c.values()[5] == 0.0));
}

#[test]
fn test_condition_drop_pose_policy() {
    let conditioner = TrajectoryConditioner::new(ConditioningSettings {
        pad_count: 0,
        ..Default::default()
    });
    let unreachable = pose_on_sphere(0.05).point;
    let ik = move |pose: &Pose| {
        if pose.point.distance(unreachable) < 1e-9 {
            None
        } else {
            fake_ik(pose)
        }
    };

    let trajectory = conditioner
        .condition(vec![segment(&[0.0, 0.05, 0.1], Rgb::BLACK)], &ik)
        .unwrap();
    assert_eq!(trajectory.len(), 2);
    assert_eq!(trajectory.boundaries(), &[true, true]);
}

#[test]
fn test_condition_drop_path_policy() {
    let conditioner = TrajectoryConditioner::new(ConditioningSettings {
        pad_count: 0,
        unreachable_policy: UnreachablePolicy::DropPath,
        ..Default::default()
    });
    let unreachable = pose_on_sphere(0.05).point;
    let ik = move |pose: &Pose| {
        if pose.point.distance(unreachable) < 1e-9 {
            None
        } else {
            fake_ik(pose)
        }
    };

    let paths = vec![
        segment(&[0.0, 0.05, 0.1], Rgb::BLACK),
        segment(&[0.12, 0.15], Rgb::BLACK),
    ];
    let trajectory = conditioner.condition(paths, &ik).unwrap();
    assert_eq!(trajectory.len(), 2);

    let none = |_: &Pose| -> Option<JointConfiguration> { None };
    let result = conditioner.condition(vec![segment(&[0.0], Rgb::BLACK)], &none);
    assert_eq!(result, Err(CoreError::EmptyTrajectory));
}

#[test]
fn test_condition_uses_presolved_configs() {
    let conditioner = TrajectoryConditioner::new(ConditioningSettings {
        pad_count: 0,
        ..Default::default()
    });
    let config = JointConfiguration::new([0.1, 0.2, 0.3, 0.4, 0.5, 0.6]);
    let path = PathSegment::new(vec![
        Waypoint::new(pose_on_sphere(0.0), Rgb::BLACK, 1.0).with_config(config)
    ]);
    let no_ik = |_: &Pose| -> Option<JointConfiguration> { None };

    let trajectory = conditioner.condition(vec![path], &no_ik).unwrap();
    assert_eq!(trajectory.joint_configs()[0].values()[..5], config.values()[..5]);
}

#[test]
fn test_unsolvable_transition_is_an_error() {
    let conditioner = TrajectoryConditioner::new(ConditioningSettings::default());
    let config = JointConfiguration::default();
    let paths = vec![
        PathSegment::new(vec![
            Waypoint::new(pose_on_sphere(0.0), Rgb::BLACK, 0.0).with_config(config)
        ]),
        PathSegment::new(vec![
            Waypoint::new(pose_on_sphere(1.0), Rgb::BLACK, 0.0).with_config(config)
        ]),
    ];
    let no_ik = |_: &Pose| -> Option<JointConfiguration> { None };
    let result = conditioner.condition(paths, &no_ik);
    assert!(matches!(
        result,
        Err(CoreError::UnsolvableTransition { segment: 1, waypoint: 0 })
    ));
}

fn joint_sequence() -> impl Strategy<Value = Vec<JointConfiguration>> {
    prop::collection::vec(prop::array::uniform6(-TAU..TAU), 2..64)
        .prop_map(|rows| rows.into_iter().map(JointConfiguration::new).collect())
}

proptest! {
    #[test]
    fn prop_smooth_is_continuous(configs in joint_sequence()) {
        let smoothed = smooth(&configs);
        prop_assert_eq!(smoothed.len(), configs.len());

        for pair in smoothed.windows(2) {
            for axis in 0..5 {
                let step = (pair[1].values()[axis] - pair[0].values()[axis]).abs();
                prop_assert!(step <= PI + 1e-9, "axis {} jumped {}", axis, step);
            }
        }
        for config in &smoothed {
            prop_assert_eq!(config.values()[5], 0.0);
        }
    }

    #[test]
    fn prop_smooth_preserves_angles_mod_two_pi(configs in joint_sequence()) {
        let smoothed = smooth(&configs);
        for (raw, s) in configs.iter().zip(&smoothed) {
            for axis in 0..5 {
                let turns = (s.values()[axis] - raw.values()[axis]) / TAU;
                prop_assert!((turns - turns.round()).abs() < 1e-6);
            }
        }
    }
}
