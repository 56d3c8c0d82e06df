//! Lightbrush Control - Robot and Fixture Integration
//!
//! This crate connects the robot controller and the LED fixture:
//! - **Motion**: program upload and acknowledgement tracking
//! - **Playback**: beacon listener driving the LED fixture
//! - **Watcher**: hot reload of the multiplier and the active trajectory
//! - **LED**: HTTP fixture client, dispatch queue and discovery
//! - **Simulators**: localhost stand-ins for controller and fixture
//!
//! ## Feature Flags
//!
//! - `simulator` (default): robot and fixture simulators (requires `axum`)
//!
//! ## Modules
//!
//! - [`motion`] - robot controller channel
//! - [`playback`] - beacon-driven LED playback
//! - [`watcher`] - file polling
//! - [`led`] - LED fixture client
//! - `simulator` - simulators (requires `simulator` feature)
//! - [`error`] - Error types

/// Error types
pub mod error;
/// LED fixture client and dispatch queue
pub mod led;
/// Robot controller channel
pub mod motion;
/// Beacon listener and playback state
pub mod playback;
/// Multiplier and trajectory file polling
pub mod watcher;

#[cfg(feature = "simulator")]
/// Robot controller and LED fixture simulators
pub mod simulator;

mod wire;

// Re-exports
pub use error::{ControlError, Result};
pub use led::{discover_fixture, local_ipv4, LedClient, LedCommand, LedDispatcher, LedSink};
pub use motion::{AckStream, MotionChannel};
pub use playback::{
    BeaconHandler, ConnectionEnd, MultiplierState, PlaybackService, PlaybackSession,
    SessionHandle,
};
pub use watcher::{MultiplierWatcher, TickOutcome};

#[cfg(feature = "simulator")]
pub use simulator::{FixtureEvent, FixtureLog, FixtureSimulator, RobotSimulator};
