//! Authored drawings as path segments
//!
//! An authored drawing is a per-path document whose `points3d` are relative
//! to the painting sphere's center. Loading it keeps the paths apart, moves
//! every point into the robot frame and orients it away from the center, so
//! the result can go straight into trajectory conditioning.

use crate::error::{IoError, Result};
use crate::format::{NestedRecords, MAX_DOCUMENT_SIZE};
use lightbrush_core::{frames_on_sphere, DVec3, PathSegment, Waypoint};
use std::path::Path;
use tracing::info;

/// Parse an authored drawing into one segment per path.
///
/// Joint configurations stored in the document are attached to their
/// waypoints; waypoints without one are left for the IK solver.
pub fn segments_from_json_str(text: &str, center: DVec3) -> Result<Vec<PathSegment>> {
    let value: serde_json::Value = serde_json::from_str(text)?;
    if value.get("points3d").is_none() {
        return Err(IoError::Malformed(
            "drawing has no per-path points3d".to_string(),
        ));
    }
    let records = serde_json::from_value::<NestedRecords>(value)?;
    records.validate()?;

    let mut segments = Vec::with_capacity(records.points3d.len());
    for (index, points) in records.points3d.iter().enumerate() {
        let origins: Vec<DVec3> = points.iter().map(|p| p.origin()).collect();
        let poses = frames_on_sphere(&origins, center);
        let configs = records.configurations.as_ref().map(|c| &c[index]);

        let mut waypoints = Vec::with_capacity(poses.len());
        for (k, pose) in poses.into_iter().enumerate() {
            let mut waypoint = Waypoint::new(
                pose,
                records.colors[index][k],
                records.gradients[index][k],
            );
            if let Some(configs) = configs {
                waypoint = waypoint.with_config(configs[k].to_config(k)?);
            }
            waypoints.push(waypoint);
        }
        segments.push(PathSegment::new(waypoints));
    }
    Ok(segments)
}

/// Load an authored drawing from disk, one segment per path.
pub fn load_segments(path: &Path, center: DVec3) -> Result<Vec<PathSegment>> {
    if !path.exists() {
        return Err(IoError::NotFound(path.to_path_buf()));
    }
    let size = std::fs::metadata(path)?.len();
    if size > MAX_DOCUMENT_SIZE {
        return Err(IoError::FileTooLarge {
            size,
            limit: MAX_DOCUMENT_SIZE,
        });
    }

    let text = std::fs::read_to_string(path)?;
    let segments = segments_from_json_str(&text, center)?;
    info!(
        "Loaded {} paths with {} points from {}",
        segments.len(),
        segments.iter().map(PathSegment::len).sum::<usize>(),
        path.display()
    );
    Ok(segments)
}
