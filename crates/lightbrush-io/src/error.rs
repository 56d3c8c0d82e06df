//! Error types for persisted state.

use lightbrush_core::CoreError;
use std::path::PathBuf;

/// Result type alias for I/O operations.
pub type Result<T> = std::result::Result<T, IoError>;

/// Errors reading or writing trajectory, pointer and multiplier files.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    /// Generic I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// File does not exist
    #[error("Cannot find file {0:?}")]
    NotFound(PathBuf),

    /// File parsed but its contents are unusable
    #[error("Malformed document: {0}")]
    Malformed(String),

    /// File exceeds the load limit
    #[error("File too large: {size} bytes (limit {limit})")]
    FileTooLarge {
        /// Actual size
        size: u64,
        /// Allowed size
        limit: u64,
    },

    /// Multiplier file does not hold a number
    #[error("Invalid multiplier: {0}")]
    InvalidMultiplier(String),

    /// Path index outside a per-path document
    #[error("Invalid path index {index}: must be smaller than {count}")]
    InvalidPathIndex {
        /// Requested index
        index: usize,
        /// Number of paths
        count: usize,
    },

    /// Domain validation failed
    #[error(transparent)]
    Core(#[from] CoreError),
}
