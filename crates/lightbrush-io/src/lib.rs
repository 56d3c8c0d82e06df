//! Lightbrush I/O - persisted state
//!
//! - [`document`] - trajectory documents (flat and per-path layouts)
//! - [`pointer`] - the "current trajectory" indirection file and the
//!   brightness multiplier file
//! - [`segments`] - authored drawings as path segments for conditioning
//! - [`split`] - splitting long paths of a per-path document
//! - [`error`] - error types

pub mod document;
pub mod error;
pub mod format;
pub mod pointer;
pub mod segments;
pub mod split;

pub use document::{load_document, save_trajectory, TrajectoryDocument};
pub use error::{IoError, Result};
pub use pointer::{read_current_file, read_multiplier};
pub use segments::{load_segments, segments_from_json_str};
pub use split::{split_file, split_path};
