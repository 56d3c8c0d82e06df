//! Trajectory documents - High-level API
//!
//! A document is either flat (`frames`, one entry per waypoint) or per-path
//! (`points3d`, one inner list per path). Per-path documents are flattened on
//! load, so everything downstream sees one index-aligned sequence.

use crate::error::{IoError, Result};
use crate::format::{
    FlagRecord, FlatOutput, FlatRecords, FrameData, NestedRecords, MAX_DOCUMENT_SIZE,
};
use lightbrush_core::{ColorScale, CoreError, JointConfiguration, Pose, Rgb, Trajectory};
use std::path::Path;
use tracing::{debug, info};

/// A loaded trajectory document, flattened and length-checked.
#[derive(Debug, Clone, PartialEq)]
pub struct TrajectoryDocument {
    /// Waypoint poses
    pub poses: Vec<Pose>,
    /// Waypoint colors
    pub colors: Vec<Rgb>,
    /// Waypoint gradients
    pub gradients: Vec<f64>,
    /// Joint configurations, present once the document has been conditioned
    pub configurations: Option<Vec<JointConfiguration>>,
    /// Boundary flags, present once the document has been conditioned
    pub boundaries: Option<Vec<bool>>,
}

impl TrajectoryDocument {
    /// Parse a document from JSON text.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(text)?;
        let records = if value.get("points3d").is_some() {
            serde_json::from_value::<NestedRecords>(value)?.flatten()?
        } else {
            serde_json::from_value::<FlatRecords>(value)?
        };
        Self::from_records(records)
    }

    fn from_records(records: FlatRecords) -> Result<Self> {
        let configurations = records
            .configurations
            .map(|configs| {
                configs
                    .iter()
                    .enumerate()
                    .map(|(i, c)| c.to_config(i))
                    .collect::<Result<Vec<_>>>()
            })
            .transpose()?;

        let document = Self {
            poses: records.frames.iter().map(|r| r.to_pose()).collect(),
            colors: records.colors,
            gradients: records.gradients,
            configurations,
            boundaries: records
                .startends
                .map(|flags| flags.into_iter().map(FlagRecord::is_set).collect()),
        };
        document.validate()?;
        Ok(document)
    }

    /// Build a document from a conditioned trajectory.
    pub fn from_trajectory(trajectory: &Trajectory) -> Self {
        Self {
            poses: trajectory.poses().to_vec(),
            colors: trajectory.colors().to_vec(),
            gradients: trajectory.gradients().to_vec(),
            configurations: Some(trajectory.joint_configs().to_vec()),
            boundaries: Some(trajectory.boundaries().to_vec()),
        }
    }

    /// Number of waypoints
    pub fn len(&self) -> usize {
        self.poses.len()
    }

    /// True if the document has no waypoints
    pub fn is_empty(&self) -> bool {
        self.poses.is_empty()
    }

    /// Check that all present sequences have the same length.
    pub fn validate(&self) -> Result<()> {
        let n = self.poses.len();
        let configs = self.configurations.as_ref().map_or(n, Vec::len);
        let flags = self.boundaries.as_ref().map_or(n, Vec::len);
        if self.colors.len() != n || self.gradients.len() != n || configs != n || flags != n {
            return Err(CoreError::LengthMismatch(format!(
                "colors: {}, gradients: {}, frames: {}, configurations: {}, startends: {}",
                self.colors.len(),
                self.gradients.len(),
                n,
                configs,
                flags
            ))
            .into());
        }
        Ok(())
    }

    /// Color scale detected from the stored colors
    pub fn color_scale(&self) -> ColorScale {
        ColorScale::detect(&self.colors)
    }

    /// Convert to an executable trajectory. Joint configurations are
    /// required; missing boundary flags are treated as all interior.
    pub fn into_trajectory(self) -> Result<Trajectory> {
        let configurations = self.configurations.ok_or_else(|| {
            IoError::Malformed("document has no joint configurations".to_string())
        })?;
        let boundaries = self.boundaries.unwrap_or_else(|| {
            debug!("Document has no startends, treating all waypoints as interior");
            vec![false; configurations.len()]
        });
        Ok(Trajectory::new(
            self.poses,
            configurations,
            self.colors,
            self.gradients,
            boundaries,
        )?)
    }

    /// Serialize in the flat layout.
    pub fn to_json_string(&self) -> Result<String> {
        let output = FlatOutput {
            frames: self.poses.iter().map(FrameData::from).collect(),
            colors: self.colors.clone(),
            gradients: self.gradients.clone(),
            configurations: self.configurations.clone(),
            startends: self.boundaries.clone(),
        };
        Ok(serde_json::to_string_pretty(&output)?)
    }
}

/// Loads a trajectory document from disk.
pub fn load_document(path: &Path) -> Result<TrajectoryDocument> {
    load_document_with_limit(path, MAX_DOCUMENT_SIZE)
}

fn load_document_with_limit(path: &Path, limit: u64) -> Result<TrajectoryDocument> {
    if !path.exists() {
        return Err(IoError::NotFound(path.to_path_buf()));
    }
    let size = std::fs::metadata(path)?.len();
    if size > limit {
        return Err(IoError::FileTooLarge { size, limit });
    }

    let text = std::fs::read_to_string(path)?;
    let document = TrajectoryDocument::from_json_str(&text)?;
    debug!("Loaded {} waypoints from {}", document.len(), path.display());
    Ok(document)
}

/// Writes a document in the flat layout.
pub fn save_document(document: &TrajectoryDocument, path: &Path) -> Result<()> {
    std::fs::write(path, document.to_json_string()?)?;
    Ok(())
}

/// Writes a conditioned trajectory in the flat layout.
pub fn save_trajectory(trajectory: &Trajectory, path: &Path) -> Result<()> {
    save_document(&TrajectoryDocument::from_trajectory(trajectory), path)?;
    info!("Saved {} waypoints to {}", trajectory.len(), path.display());
    Ok(())
}
