//! Settings definitions
//!
//! Everything here is persisted in `lightbrush.toml`. Every section and field
//! has a default, so a partial (or empty) file is valid.

use crate::{
    color::ColorScale, conditioner::UnreachablePolicy, gradient::GradientCurve,
    logging::LogConfig, script::MotionParameters, CoreError, Result,
};
use glam::DVec3;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightbrushSettings {
    /// Playback service
    pub playback: PlaybackSettings,
    /// File polling
    pub watcher: WatcherSettings,
    /// Robot controller and motion program
    pub motion: MotionSettings,
    /// Trajectory conditioning
    pub conditioning: ConditioningSettings,
    /// Logging configuration
    pub logging: LogConfig,
}

/// Playback service settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackSettings {
    /// Address the beacon listener binds to
    pub host: String,
    /// Beacon listener port
    pub port: u16,
    /// LED fixture address (`ip` or `ip:port`); discovered when empty
    pub fixture: Option<String>,
    /// Greeting the fixture answers on `/hi`
    pub fixture_greeting: String,
    /// Global brightness set once at startup
    pub initial_brightness: u8,
    /// Pending LED commands before new ones are dropped
    pub dispatch_queue: usize,
    /// Color scale; detected from the trajectory when unset
    pub color_scale: Option<ColorScale>,
    /// Brightness response curve
    pub curve: GradientCurve,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 9111,
            fixture: None,
            fixture_greeting: "Hello SJSU".to_string(),
            initial_brightness: 255,
            dispatch_queue: 256,
            color_scale: None,
            curve: GradientCurve::default(),
        }
    }
}

/// How often the multiplier file is re-read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MultiplierRefresh {
    /// Re-read on every watcher tick
    #[default]
    EveryTick,
    /// Read once at startup
    LoadOnce,
}

/// File polling settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatcherSettings {
    /// Poll interval in milliseconds
    pub interval_ms: u64,
    /// File holding the brightness multiplier
    pub multiplier_path: PathBuf,
    /// File naming the active trajectory
    pub current_file_path: PathBuf,
    /// Multiplier refresh mode
    pub multiplier_refresh: MultiplierRefresh,
}

impl Default for WatcherSettings {
    fn default() -> Self {
        Self {
            interval_ms: 1000,
            multiplier_path: PathBuf::from("data/current_multiplier.txt"),
            current_file_path: PathBuf::from("data/current_file.txt"),
            multiplier_refresh: MultiplierRefresh::default(),
        }
    }
}

/// Robot controller settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionSettings {
    /// Robot controller host
    pub robot_host: String,
    /// Robot controller script port
    pub robot_port: u16,
    /// Connect timeout for the liveness check, in milliseconds
    pub connect_timeout_ms: u64,
    /// Motion program parameters
    #[serde(flatten)]
    pub parameters: MotionParameters,
}

impl Default for MotionSettings {
    fn default() -> Self {
        Self {
            robot_host: "10.0.0.10".to_string(),
            robot_port: 30002,
            connect_timeout_ms: 2000,
            parameters: MotionParameters::default(),
        }
    }
}

/// Trajectory conditioning settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConditioningSettings {
    /// Center of the painting sphere in the robot frame (m)
    pub sphere_center: [f64; 3],
    /// Radius of the painting sphere (m)
    pub sphere_radius: f64,
    /// Maximum spacing of transition waypoints along the arc (m)
    pub max_arc_step: f64,
    /// Dwell waypoints added at each end
    pub pad_count: usize,
    /// Unreachable waypoint handling
    pub unreachable_policy: UnreachablePolicy,
}

impl Default for ConditioningSettings {
    fn default() -> Self {
        Self {
            sphere_center: [0.417292, 0.0, 0.252544],
            sphere_radius: 0.15,
            max_arc_step: 0.02,
            pad_count: 2,
            unreachable_policy: UnreachablePolicy::default(),
        }
    }
}

impl ConditioningSettings {
    /// Sphere center as a vector
    pub fn center(&self) -> DVec3 {
        DVec3::from_array(self.sphere_center)
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<()> {
        if !(self.sphere_radius > 0.0) {
            return Err(CoreError::InvalidParameter(format!(
                "sphere_radius must be positive, got {}",
                self.sphere_radius
            )));
        }
        if !(self.max_arc_step > 0.0) {
            return Err(CoreError::InvalidParameter(format!(
                "max_arc_step must be positive, got {}",
                self.max_arc_step
            )));
        }
        Ok(())
    }
}
