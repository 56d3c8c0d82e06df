//! On-disk record types for trajectory documents.
//!
//! Documents come from the authoring toolchain, which wraps some values as
//! `{"dtype": "...", "value": {...}}`. The records here accept the wrapped
//! and the plain form; documents are always written in the plain form.

use crate::error::{IoError, Result};
use lightbrush_core::{CoreError, DVec3, JointConfiguration, Pose, Rgb};
use serde::{Deserialize, Serialize};

/// Maximum accepted document size (64 MB).
pub const MAX_DOCUMENT_SIZE: u64 = 64 * 1024 * 1024;

/// A frame as stored on disk.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameData {
    /// Origin
    pub point: [f64; 3],
    /// X axis
    pub xaxis: [f64; 3],
    /// Y axis
    pub yaxis: [f64; 3],
}

impl FrameData {
    /// Orthonormalized pose
    pub fn to_pose(&self) -> Pose {
        Pose::from_axes(
            DVec3::from_array(self.point),
            DVec3::from_array(self.xaxis),
            DVec3::from_array(self.yaxis),
        )
    }
}

impl From<&Pose> for FrameData {
    fn from(pose: &Pose) -> Self {
        Self {
            point: pose.point.to_array(),
            xaxis: pose.xaxis.to_array(),
            yaxis: pose.yaxis.to_array(),
        }
    }
}

/// One entry of `frames` or `points3d`.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum PoseRecord {
    /// Bare point; orientation is the world frame
    Point([f64; 3]),
    /// Plain frame
    Frame(FrameData),
    /// Frame inside a `{dtype, value}` wrapper
    Wrapped {
        /// Wrapped frame
        value: FrameData,
    },
}

impl PoseRecord {
    /// Origin of the record
    pub fn origin(&self) -> DVec3 {
        match self {
            PoseRecord::Point(p) => DVec3::from_array(*p),
            PoseRecord::Frame(frame) | PoseRecord::Wrapped { value: frame } => {
                DVec3::from_array(frame.point)
            }
        }
    }

    /// Convert to a pose
    pub fn to_pose(&self) -> Pose {
        match self {
            PoseRecord::Point(p) => Pose::world(DVec3::from_array(*p)),
            PoseRecord::Frame(frame) | PoseRecord::Wrapped { value: frame } => frame.to_pose(),
        }
    }
}

/// Joint values of a wrapped configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct JointValues {
    /// Joint angles in radians
    pub joint_values: Vec<f64>,
}

/// One entry of `configurations`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ConfigRecord {
    /// Plain array of joint angles
    Values(Vec<f64>),
    /// Object carrying `joint_values`
    Object(JointValues),
    /// Configuration inside a `{dtype, value}` wrapper
    Wrapped {
        /// Wrapped configuration
        value: JointValues,
    },
}

impl ConfigRecord {
    /// Convert to a joint configuration; `index` is used for diagnostics.
    pub fn to_config(&self, index: usize) -> Result<JointConfiguration> {
        let values = match self {
            ConfigRecord::Values(values) => values,
            ConfigRecord::Object(inner) | ConfigRecord::Wrapped { value: inner } => {
                &inner.joint_values
            }
        };
        JointConfiguration::from_slice(values).ok_or_else(|| {
            IoError::Malformed(format!(
                "configuration {} has {} joint values, expected {}",
                index,
                values.len(),
                lightbrush_core::JOINT_COUNT
            ))
        })
    }
}

/// One entry of `startends`: a boolean or 0/1.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum FlagRecord {
    /// `true`/`false`
    Bool(bool),
    /// Nonzero is `true`
    Int(i64),
}

impl FlagRecord {
    /// Flag value
    pub fn is_set(self) -> bool {
        match self {
            FlagRecord::Bool(b) => b,
            FlagRecord::Int(i) => i != 0,
        }
    }
}

/// Flat layout: one entry per waypoint.
#[derive(Debug, Clone, Deserialize)]
pub struct FlatRecords {
    /// Poses
    pub frames: Vec<PoseRecord>,
    /// Colors
    pub colors: Vec<Rgb>,
    /// Gradients
    pub gradients: Vec<f64>,
    /// Joint configurations
    #[serde(default)]
    pub configurations: Option<Vec<ConfigRecord>>,
    /// Boundary flags
    #[serde(default)]
    pub startends: Option<Vec<FlagRecord>>,
}

/// Per-path layout, as authored: one inner list per path.
#[derive(Debug, Clone, Deserialize)]
pub struct NestedRecords {
    /// Points or frames per path
    pub points3d: Vec<Vec<PoseRecord>>,
    /// Colors per path
    pub colors: Vec<Vec<Rgb>>,
    /// Gradients per path
    pub gradients: Vec<Vec<f64>>,
    /// Joint configurations per path
    #[serde(default)]
    pub configurations: Option<Vec<Vec<ConfigRecord>>>,
    /// Boundary flags per path
    #[serde(default)]
    pub startends: Option<Vec<Vec<FlagRecord>>>,
}

impl NestedRecords {
    /// Check that every key has the same paths with the same lengths.
    pub fn validate(&self) -> Result<()> {
        let paths = self.points3d.len();
        let configs = self.configurations.as_ref().map_or(paths, Vec::len);
        let flags = self.startends.as_ref().map_or(paths, Vec::len);
        if self.colors.len() != paths
            || self.gradients.len() != paths
            || configs != paths
            || flags != paths
        {
            return Err(CoreError::LengthMismatch(format!(
                "path counts differ: points3d: {}, colors: {}, gradients: {}, \
                 configurations: {}, startends: {}",
                paths,
                self.colors.len(),
                self.gradients.len(),
                configs,
                flags
            ))
            .into());
        }

        for (index, points) in self.points3d.iter().enumerate() {
            let n = points.len();
            let configs = self.configurations.as_ref().map_or(n, |c| c[index].len());
            let flags = self.startends.as_ref().map_or(n, |s| s[index].len());
            if self.colors[index].len() != n
                || self.gradients[index].len() != n
                || configs != n
                || flags != n
            {
                return Err(CoreError::LengthMismatch(format!(
                    "path {}: points3d: {}, colors: {}, gradients: {}, \
                     configurations: {}, startends: {}",
                    index,
                    n,
                    self.colors[index].len(),
                    self.gradients[index].len(),
                    configs,
                    flags
                ))
                .into());
            }
        }
        Ok(())
    }

    /// Concatenate all paths into the flat layout, after checking that the
    /// paths line up.
    pub fn flatten(self) -> Result<FlatRecords> {
        self.validate()?;
        Ok(FlatRecords {
            frames: self.points3d.into_iter().flatten().collect(),
            colors: self.colors.into_iter().flatten().collect(),
            gradients: self.gradients.into_iter().flatten().collect(),
            configurations: self
                .configurations
                .map(|c| c.into_iter().flatten().collect()),
            startends: self.startends.map(|s| s.into_iter().flatten().collect()),
        })
    }
}

/// Flat layout as written to disk.
#[derive(Debug, Clone, Serialize)]
pub struct FlatOutput {
    /// Poses
    pub frames: Vec<FrameData>,
    /// Colors
    pub colors: Vec<Rgb>,
    /// Gradients
    pub gradients: Vec<f64>,
    /// Joint configurations
    #[serde(skip_serializing_if = "Option::is_none")]
    pub configurations: Option<Vec<JointConfiguration>>,
    /// Boundary flags
    #[serde(skip_serializing_if = "Option::is_none")]
    pub startends: Option<Vec<bool>>,
}
