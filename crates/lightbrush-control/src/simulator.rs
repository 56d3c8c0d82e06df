//! Stand-ins for the robot controller and the LED fixture.
//!
//! Both run on localhost and make the whole chain testable without
//! hardware: the robot simulator answers every `socket_send_int(i)` line of
//! a program with the matching beacon, and the fixture simulator records the
//! HTTP commands it receives.

use crate::error::Result;
use crate::led::LedCommand;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use lightbrush_core::beacon;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

#[derive(Debug, PartialEq, Eq)]
enum ScriptLine<'a> {
    Message(&'a str),
    Beacon(u32),
    SocketOpen,
    SocketClose,
    Other,
}

fn parse_line(line: &str) -> ScriptLine<'_> {
    let line = line.trim();
    if let Some(text) = line
        .strip_prefix("textmsg(\"")
        .and_then(|rest| rest.strip_suffix("\")"))
    {
        return ScriptLine::Message(text);
    }
    if let Some(index) = line
        .strip_prefix("socket_send_int(")
        .and_then(|rest| rest.strip_suffix(')'))
        .and_then(|n| n.trim().parse().ok())
    {
        return ScriptLine::Beacon(index);
    }
    if line.starts_with("socket_open(") {
        return ScriptLine::SocketOpen;
    }
    if line.starts_with("socket_close(") {
        return ScriptLine::SocketClose;
    }
    ScriptLine::Other
}

/// Simulated robot controller.
///
/// Beacons go back to the sender and, with a relay address, to the playback
/// service as well, between the program's `socket_open` and `socket_close`.
pub struct RobotSimulator {
    listener: TcpListener,
    relay: Option<String>,
    stop_after: Option<usize>,
}

impl RobotSimulator {
    /// Listen on `addr`
    pub async fn bind(addr: &str) -> Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        info!("Robot simulator listening on {}", listener.local_addr()?);
        Ok(Self {
            listener,
            relay: None,
            stop_after: None,
        })
    }

    /// Also send beacons to a playback service
    pub fn with_relay(mut self, addr: impl Into<String>) -> Self {
        self.relay = Some(addr.into());
        self
    }

    /// Drop the connection after `beacons` beacons, like an aborted program
    pub fn stop_after(mut self, beacons: usize) -> Self {
        self.stop_after = Some(beacons);
        self
    }

    /// Bound address
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Serve programs forever, one connection at a time.
    pub async fn run(self) -> Result<()> {
        loop {
            let (stream, peer) = self.listener.accept().await?;
            info!("Program upload from {}", peer);
            if let Err(e) = self.serve(stream).await {
                warn!("Program from {} failed: {}", peer, e);
            }
        }
    }

    async fn serve(&self, stream: TcpStream) -> Result<()> {
        let (reader, mut writer) = stream.into_split();
        let mut lines = BufReader::new(reader).lines();
        let mut relay: Option<TcpStream> = None;
        let mut sent = 0usize;

        while let Some(line) = lines.next_line().await? {
            match parse_line(&line) {
                ScriptLine::Message(text) => info!("| {}", text),
                ScriptLine::SocketOpen => {
                    if let Some(addr) = &self.relay {
                        match TcpStream::connect(addr.as_str()).await {
                            Ok(stream) => relay = Some(stream),
                            Err(e) => warn!("Relay {} unavailable: {}", addr, e),
                        }
                    }
                }
                ScriptLine::SocketClose => relay = None,
                ScriptLine::Beacon(index) => {
                    let frame = beacon::encode(index);
                    writer.write_all(&frame).await?;
                    if let Some(stream) = relay.as_mut() {
                        stream.write_all(&frame).await?;
                    }
                    sent += 1;
                    if self.stop_after == Some(sent) {
                        info!("Stopping program after {} beacons", sent);
                        writer.shutdown().await?;
                        // Drain the rest so the close is orderly
                        while lines.next_line().await?.is_some() {}
                        return Ok(());
                    }
                }
                ScriptLine::Other => debug!("{}", line.trim()),
            }
        }
        Ok(())
    }
}

/// A request received by the fixture simulator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixtureEvent {
    /// `/brightness?value=`
    Brightness(u8),
    /// `/leds?rgb=[r,g,b]&brightness=`
    Leds(LedCommand),
}

/// Requests received by a fixture simulator, in arrival order.
#[derive(Debug, Clone, Default)]
pub struct FixtureLog(Arc<Mutex<Vec<FixtureEvent>>>);

impl FixtureLog {
    async fn push(&self, event: FixtureEvent) {
        self.0.lock().await.push(event);
    }

    /// All events so far
    pub async fn events(&self) -> Vec<FixtureEvent> {
        self.0.lock().await.clone()
    }

    /// LED commands so far
    pub async fn led_commands(&self) -> Vec<LedCommand> {
        self.0
            .lock()
            .await
            .iter()
            .filter_map(|e| match e {
                FixtureEvent::Leds(command) => Some(*command),
                FixtureEvent::Brightness(_) => None,
            })
            .collect()
    }
}

#[derive(Clone)]
struct FixtureState {
    greeting: Arc<str>,
    log: FixtureLog,
}

/// Simulated LED fixture.
pub struct FixtureSimulator {
    listener: TcpListener,
    state: FixtureState,
}

impl FixtureSimulator {
    /// Listen on `addr`, answering `/hi` with `greeting`
    pub async fn bind(addr: &str, greeting: &str) -> Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        info!("Fixture simulator listening on {}", listener.local_addr()?);
        Ok(Self {
            listener,
            state: FixtureState {
                greeting: Arc::from(greeting),
                log: FixtureLog::default(),
            },
        })
    }

    /// Bound address
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Handle on the request log
    pub fn log(&self) -> FixtureLog {
        self.state.log.clone()
    }

    /// Serve until the process ends.
    pub async fn run(self) -> Result<()> {
        let app = Router::new()
            .route("/hi", get(hi))
            .route("/brightness", get(brightness))
            .route("/leds", get(leds))
            .with_state(self.state);
        axum::serve(self.listener, app).await?;
        Ok(())
    }
}

async fn hi(State(state): State<FixtureState>) -> String {
    state.greeting.to_string()
}

async fn brightness(
    State(state): State<FixtureState>,
    Query(params): Query<HashMap<String, String>>,
) -> StatusCode {
    match params.get("value").and_then(|v| v.trim().parse::<u8>().ok()) {
        Some(value) => {
            info!("Brightness {}", value);
            state.log.push(FixtureEvent::Brightness(value)).await;
            StatusCode::OK
        }
        None => StatusCode::BAD_REQUEST,
    }
}

async fn leds(
    State(state): State<FixtureState>,
    Query(params): Query<HashMap<String, String>>,
) -> StatusCode {
    let rgb = params.get("rgb").and_then(|v| parse_rgb(v));
    let brightness = params
        .get("brightness")
        .and_then(|v| v.trim().parse::<u8>().ok());
    match (rgb, brightness) {
        (Some(rgb), Some(brightness)) => {
            debug!("LEDs {:?} at {}", rgb, brightness);
            state
                .log
                .push(FixtureEvent::Leds(LedCommand { rgb, brightness }))
                .await;
            StatusCode::OK
        }
        _ => StatusCode::BAD_REQUEST,
    }
}

fn parse_rgb(text: &str) -> Option<[u8; 3]> {
    let inner = text.trim().strip_prefix('[')?.strip_suffix(']')?;
    let values = inner
        .split(',')
        .map(|v| v.trim().parse::<u8>().ok())
        .collect::<Option<Vec<u8>>>()?;
    values.try_into().ok()
}
