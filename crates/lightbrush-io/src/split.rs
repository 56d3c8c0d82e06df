//! Splitting long paths of a per-path document
//!
//! Every top-level key of a per-path document holds one list per path. A
//! split replaces the list at `index` under every key with consecutive
//! chunks of `ceil(len / segments)` items, leaving the other paths in place.

use crate::error::{IoError, Result};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tracing::info;

/// Split path `index` of every key of `document` into `segments` chunks.
pub fn split_path(document: &mut Map<String, Value>, index: usize, segments: usize) -> Result<()> {
    if segments == 0 {
        return Err(IoError::Malformed("segment count must be at least 1".to_string()));
    }

    // Check every key before touching any of them
    for (key, value) in document.iter() {
        let paths = value
            .as_array()
            .ok_or_else(|| IoError::Malformed(format!("{} is not a list of paths", key)))?;
        if index >= paths.len() {
            return Err(IoError::InvalidPathIndex {
                index,
                count: paths.len(),
            });
        }
        if !paths[index].is_array() {
            return Err(IoError::Malformed(format!("{}[{}] is not a list", key, index)));
        }
    }

    for (key, value) in document.iter_mut() {
        let Some(paths) = value.as_array_mut() else {
            continue;
        };
        let Value::Array(items) = paths.remove(index) else {
            continue;
        };
        let chunk = items.len().div_ceil(segments).max(1);
        info!(
            "Splitting {} in {} segments of {} items each",
            key, segments, chunk
        );
        let chunks: Vec<Value> = items
            .chunks(chunk)
            .map(|c| Value::Array(c.to_vec()))
            .collect();
        for (offset, c) in chunks.into_iter().enumerate() {
            paths.insert(index + offset, c);
        }
    }
    Ok(())
}

/// Split a document on disk, writing `<file>-split.json` next to it.
pub fn split_file(path: &Path, index: usize, segments: usize) -> Result<PathBuf> {
    if !path.exists() {
        return Err(IoError::NotFound(path.to_path_buf()));
    }
    let text = std::fs::read_to_string(path)?;
    let Value::Object(mut document) = serde_json::from_str::<Value>(&text)? else {
        return Err(IoError::Malformed(format!(
            "{} is not a JSON object",
            path.display()
        )));
    };

    split_path(&mut document, index, segments)?;

    let mut output = path.as_os_str().to_owned();
    output.push("-split.json");
    let output = PathBuf::from(output);
    std::fs::write(&output, serde_json::to_string_pretty(&Value::Object(document))?)?;
    Ok(output)
}
