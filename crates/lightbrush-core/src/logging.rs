//! Logging configuration
//!
//! The subscriber itself is installed by the binary; this module only holds
//! the persisted settings and the log file housekeeping.

use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};
use tracing::level_filters::LevelFilter;

const LOG_FILE_PREFIX: &str = "lightbrush_";
const LOG_FILE_EXTENSION: &str = "log";

/// Logging settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Level filter (`error`, `warn`, `info`, `debug`, `trace`)
    pub level: String,
    /// Directory for log files
    pub log_dir: PathBuf,
    /// Write to stderr
    pub console_output: bool,
    /// Write to a log file
    pub file_output: bool,
    /// Log files kept in `log_dir`
    pub max_files: usize,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            log_dir: PathBuf::from("logs"),
            console_output: true,
            file_output: false,
            max_files: 10,
        }
    }
}

impl LogConfig {
    /// Parsed level; falls back to INFO on unknown strings.
    pub fn parse_level(&self) -> LevelFilter {
        self.level.parse().unwrap_or(LevelFilter::INFO)
    }

    /// Create the log directory if file output is enabled
    pub fn ensure_log_directory(&self) -> io::Result<()> {
        if self.file_output {
            std::fs::create_dir_all(&self.log_dir)?;
        }
        Ok(())
    }

    /// Path of today's log file
    pub fn current_log_path(&self) -> PathBuf {
        let date = chrono::Local::now().format("%Y-%m-%d");
        self.log_dir
            .join(format!("{}{}.{}", LOG_FILE_PREFIX, date, LOG_FILE_EXTENSION))
    }

    /// Remove the oldest log files beyond `max_files`.
    pub fn cleanup_old_logs(&self) -> io::Result<usize> {
        if !self.log_dir.exists() {
            return Ok(0);
        }
        let mut logs: Vec<PathBuf> = std::fs::read_dir(&self.log_dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| is_log_file(path))
            .collect();

        if logs.len() <= self.max_files {
            return Ok(0);
        }

        // Date-stamped names sort chronologically
        logs.sort();
        let excess = logs.len() - self.max_files;
        for path in &logs[..excess] {
            std::fs::remove_file(path)?;
        }
        Ok(excess)
    }
}

fn is_log_file(path: &Path) -> bool {
    let name_matches = path
        .file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with(LOG_FILE_PREFIX));
    name_matches && path.extension().is_some_and(|e| e == LOG_FILE_EXTENSION)
}
