//! Six-axis joint configurations.

use serde::{Deserialize, Serialize};

/// Number of revolute joints on the arm
pub const JOINT_COUNT: usize = 6;

/// Revolute joint angles in radians, base first, wrist roll last.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JointConfiguration([f64; JOINT_COUNT]);

impl JointConfiguration {
    /// Create a configuration from joint values
    pub fn new(values: [f64; JOINT_COUNT]) -> Self {
        Self(values)
    }

    /// Build from a slice; `None` unless it holds exactly six values.
    pub fn from_slice(values: &[f64]) -> Option<Self> {
        <[f64; JOINT_COUNT]>::try_from(values).ok().map(Self)
    }

    /// Joint values
    pub fn values(&self) -> &[f64; JOINT_COUNT] {
        &self.0
    }

    /// Mutable joint values
    pub fn values_mut(&mut self) -> &mut [f64; JOINT_COUNT] {
        &mut self.0
    }
}

impl From<[f64; JOINT_COUNT]> for JointConfiguration {
    fn from(values: [f64; JOINT_COUNT]) -> Self {
        Self(values)
    }
}
