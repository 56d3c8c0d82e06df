//! Beacon-driven LED playback
//!
//! The robot sends the index of every waypoint it reaches. For each index
//! the service looks up the waypoint's color and gradient in the active
//! session, applies the brightness multiplier and queues an LED command.

use crate::error::Result;
use crate::led::{LedCommand, LedDispatcher, LedSink};
use crate::wire::read_frame;
use arc_swap::ArcSwap;
use lightbrush_core::{BeaconFrame, ColorScale, GradientCurve, MalformedFrame, PlaybackSettings};
use lightbrush_io::{load_document, read_current_file, TrajectoryDocument};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, info, warn};

/// Colors and gradients of the trajectory being played.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackSession {
    source: PathBuf,
    colors: Vec<[u8; 3]>,
    gradients: Vec<f64>,
}

impl PlaybackSession {
    /// Build from a loaded document. The color scale is detected from the
    /// document unless given.
    pub fn from_document(
        document: &TrajectoryDocument,
        scale: Option<ColorScale>,
        source: impl Into<PathBuf>,
    ) -> Self {
        let scale = scale.unwrap_or_else(|| document.color_scale());
        Self {
            source: source.into(),
            colors: document.colors.iter().map(|&c| scale.to_bytes(c)).collect(),
            gradients: document.gradients.clone(),
        }
    }

    /// Load the trajectory named by the indirection file.
    pub fn load(current_file: &Path, scale: Option<ColorScale>) -> Result<Self> {
        let target = read_current_file(current_file)?;
        let document = load_document(&target)?;
        info!(
            "Loaded {} waypoints from {}",
            document.len(),
            target.display()
        );
        Ok(Self::from_document(&document, scale, target))
    }

    /// File the session was loaded from
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Number of waypoints
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// True if the session has no waypoints
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// LED command for waypoint `index`
    pub fn command(
        &self,
        index: usize,
        multiplier: f64,
        curve: &GradientCurve,
    ) -> Option<LedCommand> {
        let rgb = *self.colors.get(index)?;
        let gradient = *self.gradients.get(index)?;
        Some(LedCommand {
            rgb,
            brightness: curve.brightness(gradient, multiplier),
        })
    }
}

/// Shared, atomically replaceable session.
#[derive(Debug, Clone)]
pub struct SessionHandle(Arc<ArcSwap<PlaybackSession>>);

impl SessionHandle {
    /// Wrap an initial session
    pub fn new(session: PlaybackSession) -> Self {
        Self(Arc::new(ArcSwap::from_pointee(session)))
    }

    /// Current session
    pub fn load(&self) -> Arc<PlaybackSession> {
        self.0.load_full()
    }

    /// Replace the session; beacons already being handled keep the old one.
    pub fn swap(&self, session: PlaybackSession) {
        self.0.store(Arc::new(session));
    }
}

/// Brightness multiplier shared between the watcher and the service.
#[derive(Debug)]
pub struct MultiplierState(AtomicU64);

impl MultiplierState {
    /// Initial value
    pub fn new(value: f64) -> Self {
        Self(AtomicU64::new(value.to_bits()))
    }

    /// Current value
    pub fn get(&self) -> f64 {
        f64::from_bits(self.0.load(Ordering::Acquire))
    }

    /// Store a new value
    pub fn set(&self, value: f64) {
        self.0.store(value.to_bits(), Ordering::Release);
    }
}

impl Default for MultiplierState {
    fn default() -> Self {
        Self::new(1.0)
    }
}

/// Why a beacon connection ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionEnd {
    /// Peer closed the stream between frames
    Closed,
    /// A frame could not be acted on
    Rejected(MalformedFrame),
}

/// Turns the beacons of one connection into LED commands.
#[derive(Debug, Clone)]
pub struct BeaconHandler {
    session: SessionHandle,
    multiplier: Arc<MultiplierState>,
    curve: GradientCurve,
    dispatcher: LedDispatcher,
}

impl BeaconHandler {
    /// Handle beacons until the stream closes or sends a bad frame.
    pub async fn serve_connection(&self, mut stream: TcpStream) -> Result<ConnectionEnd> {
        loop {
            let Some(bytes) = read_frame(&mut stream).await? else {
                return Ok(ConnectionEnd::Closed);
            };

            // Snapshot per beacon; a swap only affects later beacons
            let session = self.session.load();
            let index = match BeaconFrame::decode(&bytes).within(session.len()) {
                BeaconFrame::MotionComplete(index) => index as usize,
                BeaconFrame::Malformed(reason) => return Ok(ConnectionEnd::Rejected(reason)),
            };

            let multiplier = self.multiplier.get();
            if let Some(command) = session.command(index, multiplier, &self.curve) {
                debug!(
                    "Beacon {}: rgb {:?} brightness {}",
                    index, command.rgb, command.brightness
                );
                self.dispatcher.dispatch(command);
            }
        }
    }
}

/// TCP service turning beacons into LED commands.
pub struct PlaybackService {
    listener: TcpListener,
    handler: BeaconHandler,
}

impl PlaybackService {
    /// Set the fixture's initial brightness, start the LED dispatcher and
    /// bind the beacon listener.
    pub async fn bind(
        settings: &PlaybackSettings,
        session: SessionHandle,
        multiplier: Arc<MultiplierState>,
        sink: Arc<dyn LedSink>,
    ) -> Result<Self> {
        sink.set_brightness(settings.initial_brightness).await?;
        info!("Set fixture brightness to {}", settings.initial_brightness);

        let (dispatcher, _) = LedDispatcher::spawn(sink, settings.dispatch_queue);
        let listener = TcpListener::bind((settings.host.as_str(), settings.port)).await?;
        info!("Beacon listener on {}", listener.local_addr()?);

        Ok(Self {
            listener,
            handler: BeaconHandler {
                session,
                multiplier,
                curve: settings.curve,
                dispatcher,
            },
        })
    }

    /// Bound address
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept connections forever, serving one at a time.
    ///
    /// A second robot connection waits in the backlog until the current one
    /// ends, so beacons from different connections never interleave.
    pub async fn run(self) -> Result<()> {
        loop {
            let (stream, peer) = self.listener.accept().await?;
            info!("Robot connected from {}", peer);
            match self.handler.serve_connection(stream).await {
                Ok(ConnectionEnd::Closed) => info!("Robot {} disconnected", peer),
                Ok(ConnectionEnd::Rejected(reason)) => {
                    warn!("Closing connection from {}: {}", peer, reason)
                }
                Err(e) => warn!("Connection from {} failed: {}", peer, e),
            }
        }
    }
}
