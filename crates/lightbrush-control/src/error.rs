//! Error types for the playback and motion services
use lightbrush_io::IoError;
use thiserror::Error;

/// Control errors
#[derive(Error, Debug)]
pub enum ControlError {
    /// I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request to the LED fixture failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Peer did not accept a connection
    #[error("Unreachable: {0}")]
    Unreachable(String),

    /// Host answered `/hi` with something other than the greeting
    #[error("{address} is not a lightbrush fixture (answered {reply:?})")]
    NotAFixture {
        /// Address that was checked
        address: String,
        /// Body of the `/hi` response
        reply: String,
    },

    /// Controller closed the connection before the final acknowledgement
    #[error("Program stopped early: last acknowledged waypoint {last_ack:?} of {expected}")]
    PartialExecution {
        /// Last acknowledged waypoint index
        last_ack: Option<u32>,
        /// Waypoints in the program
        expected: usize,
    },

    /// Peer sent bytes that do not form a beacon
    #[error("Protocol violation: {0}")]
    ProtocolViolation(String),

    /// Trajectory, pointer or multiplier file error
    #[error(transparent)]
    Data(#[from] IoError),

    /// Address cannot be parsed
    #[error("Invalid address: {0}")]
    InvalidAddress(String),
}

/// Result type for control operations
pub type Result<T> = std::result::Result<T, ControlError>;
