//! Robot controller channel
//!
//! A compiled program is sent as plain text to the controller's script port.
//! While it runs, the controller writes one beacon per completed move back
//! on the same connection.

use crate::error::{ControlError, Result};
use crate::wire::read_frame;
use lightbrush_core::{BeaconFrame, MotionProgram, MotionSettings};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tracing::{debug, info};

/// Connection settings for one controller.
#[derive(Debug, Clone)]
pub struct MotionChannel {
    address: String,
    connect_timeout: Duration,
}

impl MotionChannel {
    /// Channel to `host:port`
    pub fn new(host: &str, port: u16, connect_timeout: Duration) -> Self {
        Self {
            address: format!("{}:{}", host, port),
            connect_timeout,
        }
    }

    /// Channel described by the motion settings
    pub fn from_settings(settings: &MotionSettings) -> Self {
        Self::new(
            &settings.robot_host,
            settings.robot_port,
            Duration::from_millis(settings.connect_timeout_ms),
        )
    }

    /// Controller address
    pub fn address(&self) -> &str {
        &self.address
    }

    async fn connect(&self) -> Result<TcpStream> {
        let connect = TcpStream::connect(self.address.as_str());
        match tokio::time::timeout(self.connect_timeout, connect).await {
            Ok(Ok(stream)) => Ok(stream),
            Ok(Err(e)) => Err(ControlError::Unreachable(format!("{}: {}", self.address, e))),
            Err(_) => Err(ControlError::Unreachable(format!(
                "{}: no answer within {:?}",
                self.address, self.connect_timeout
            ))),
        }
    }

    /// Check that the controller accepts connections.
    pub async fn check_alive(&self) -> Result<()> {
        drop(self.connect().await?);
        debug!("Controller {} is reachable", self.address);
        Ok(())
    }

    /// Send `program` and return the stream of acknowledgements.
    pub async fn execute(&self, program: &MotionProgram) -> Result<AckStream> {
        let mut stream = self.connect().await?;
        stream.write_all(program.as_bytes()).await?;
        stream.flush().await?;
        info!(
            "Sent program with {} waypoints to {}",
            program.waypoint_count(),
            self.address
        );
        Ok(AckStream {
            stream,
            last_ack: None,
        })
    }
}

/// Acknowledgements of a running program.
#[derive(Debug)]
pub struct AckStream {
    stream: TcpStream,
    last_ack: Option<u32>,
}

impl AckStream {
    /// Next acknowledged waypoint index, or `None` once the controller
    /// closes the connection.
    pub async fn next_ack(&mut self) -> Result<Option<u32>> {
        let Some(bytes) = read_frame(&mut self.stream).await? else {
            return Ok(None);
        };
        match BeaconFrame::decode(&bytes) {
            BeaconFrame::MotionComplete(index) => {
                self.last_ack = Some(index);
                Ok(Some(index))
            }
            BeaconFrame::Malformed(reason) => {
                Err(ControlError::ProtocolViolation(reason.to_string()))
            }
        }
    }

    /// Last index seen so far
    pub fn last_ack(&self) -> Option<u32> {
        self.last_ack
    }

    /// Wait until waypoint `waypoint_count - 1` is acknowledged.
    pub async fn run_to_completion(mut self, waypoint_count: usize) -> Result<()> {
        if waypoint_count == 0 {
            return Ok(());
        }
        while let Some(index) = self.next_ack().await? {
            debug!("Waypoint {} of {} done", index + 1, waypoint_count);
            if index as usize + 1 == waypoint_count {
                info!("Program complete");
                return Ok(());
            }
        }
        Err(ControlError::PartialExecution {
            last_ack: self.last_ack,
            expected: waypoint_count,
        })
    }
}
