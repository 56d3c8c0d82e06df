//! Configuration file loading

use anyhow::{Context, Result};
use lightbrush_core::LightbrushSettings;
use std::path::Path;

/// Read when no `--config` is given, if present
pub const DEFAULT_CONFIG_FILE: &str = "lightbrush.toml";

/// Load settings from `path`, or from [`DEFAULT_CONFIG_FILE`] when it exists,
/// or fall back to defaults.
pub fn load(path: Option<&Path>) -> Result<LightbrushSettings> {
    match path {
        Some(path) => read(path),
        None if Path::new(DEFAULT_CONFIG_FILE).exists() => read(Path::new(DEFAULT_CONFIG_FILE)),
        None => Ok(LightbrushSettings::default()),
    }
}

fn read(path: &Path) -> Result<LightbrushSettings> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {:?}", path))?;
    let settings: LightbrushSettings = toml::from_str(&text)
        .with_context(|| format!("Failed to parse config file {:?}", path))?;
    settings
        .conditioning
        .validate()
        .with_context(|| format!("Invalid [conditioning] section in {:?}", path))?;
    Ok(settings)
}
