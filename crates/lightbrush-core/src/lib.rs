//! Lightbrush Core - Domain Model and Choreography Algorithms
//!
//! This crate contains the core domain model for Lightbrush, including:
//! - Pose and joint configuration primitives
//! - Path segments and the flattened, index-aligned trajectory
//! - Trajectory conditioning (transition arcs, joint continuity)
//! - Motion program compilation
//! - The beacon wire codec shared by robot and playback side
//! - Brightness curve and color handling
//! - Settings and logging configuration

#![warn(missing_docs)]

pub use glam::DVec3;
use thiserror::Error;

pub mod beacon;
pub mod color;
pub mod conditioner;
pub mod geometry;
pub mod gradient;
pub mod joint;
pub mod logging;
pub mod script;
pub mod settings;
pub mod trajectory;

// --- Re-exports grouped by category ---

// Geometry & Kinematics
pub use geometry::Pose;
pub use joint::{JointConfiguration, JOINT_COUNT};

// Trajectory
pub use trajectory::{PathSegment, Trajectory, Waypoint};

// Conditioning
pub use conditioner::{
    frames_on_sphere, smooth, synthesize_transition, InverseKinematics, TrajectoryConditioner,
    UnreachablePolicy, MAX_TRANSITION_POSES,
};

// Playback
pub use beacon::{BeaconFrame, MalformedFrame, BEACON_LEN};
pub use color::{ColorScale, Rgb};
pub use gradient::GradientCurve;

// Motion program
pub use script::{MotionParameters, MotionProgram, MotionScriptCompiler};

// Settings & Logging
pub use logging::LogConfig;
pub use settings::{
    ConditioningSettings, LightbrushSettings, MotionSettings, MultiplierRefresh, PlaybackSettings,
    WatcherSettings,
};

/// Core error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    /// Index-aligned sequences disagree in length
    #[error("Length mismatch: {0}")]
    LengthMismatch(String),

    /// Invalid geometry configuration
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    /// A synthesized transition waypoint has no IK solution
    #[error("No IK solution for transition waypoint {waypoint} before segment {segment}")]
    UnsolvableTransition {
        /// Index of the segment the transition leads into
        segment: usize,
        /// Index of the waypoint inside the transition arc
        waypoint: usize,
    },

    /// Nothing left to play after conditioning
    #[error("Trajectory is empty")]
    EmptyTrajectory,

    /// Invalid parameter value
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;
