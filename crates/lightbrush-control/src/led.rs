//! LED fixture client
//!
//! The fixture is a small HTTP server on the light brush. It answers
//! `GET /hi` with a fixed greeting, sets its global brightness with
//! `GET /brightness?value=N` and shows a color with
//! `GET /leds?rgb=[r,g,b]&brightness=N`.

use crate::error::{ControlError, Result};
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpStream, UdpSocket};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(2);
const SCAN_CONNECT_TIMEOUT: Duration = Duration::from_millis(300);
const SCAN_CONCURRENCY: usize = 32;

/// One color update for the fixture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedCommand {
    /// Color bytes
    pub rgb: [u8; 3],
    /// Brightness for this color
    pub brightness: u8,
}

/// Something that accepts LED commands.
#[async_trait]
pub trait LedSink: Send + Sync {
    /// Set the fixture's global brightness
    async fn set_brightness(&self, value: u8) -> Result<()>;

    /// Show a color
    async fn set_leds(&self, command: LedCommand) -> Result<()>;
}

/// HTTP client for one fixture.
#[derive(Debug, Clone)]
pub struct LedClient {
    http: Client,
    base_url: String,
}

impl LedClient {
    /// Client for `address` (`host` or `host:port`).
    pub fn new(address: &str) -> Result<Self> {
        let base_url = format!("http://{}", address.trim_end_matches('/'));
        reqwest::Url::parse(&base_url)
            .map_err(|e| ControlError::InvalidAddress(format!("{}: {}", address, e)))?;
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self { http, base_url })
    }

    /// Base URL of the fixture
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Check that the host is a fixture answering `greeting` on `/hi`.
    pub async fn check_alive(&self, greeting: &str) -> Result<()> {
        let reply = self
            .http
            .get(format!("{}/hi", self.base_url))
            .send()
            .await?
            .text()
            .await?;
        if reply.trim() != greeting {
            return Err(ControlError::NotAFixture {
                address: self.base_url.clone(),
                reply,
            });
        }
        Ok(())
    }

    async fn get(&self, url: String) -> Result<()> {
        self.http.get(url).send().await?.error_for_status()?;
        Ok(())
    }
}

#[async_trait]
impl LedSink for LedClient {
    async fn set_brightness(&self, value: u8) -> Result<()> {
        self.get(format!("{}/brightness?value={}", self.base_url, value))
            .await
    }

    async fn set_leds(&self, command: LedCommand) -> Result<()> {
        let [r, g, b] = command.rgb;
        // The fixture parses the bracketed list verbatim
        self.get(format!(
            "{}/leds?rgb=[{},{},{}]&brightness={}",
            self.base_url, r, g, b, command.brightness
        ))
        .await
    }
}

/// Queue between the beacon reader and the fixture.
///
/// A single task drains the queue, so commands reach the sink in the order
/// they were dispatched. When the queue is full new commands are dropped.
#[derive(Debug, Clone)]
pub struct LedDispatcher {
    tx: mpsc::Sender<LedCommand>,
}

impl LedDispatcher {
    /// Spawn the draining task.
    pub fn spawn(sink: Arc<dyn LedSink>, capacity: usize) -> (Self, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::channel::<LedCommand>(capacity.max(1));
        let handle = tokio::spawn(async move {
            while let Some(command) = rx.recv().await {
                if let Err(e) = sink.set_leds(command).await {
                    warn!("LED command {:?} failed: {}", command, e);
                }
            }
            debug!("LED dispatcher stopped");
        });
        (Self { tx }, handle)
    }

    /// Queue a command. Returns `false` if it was dropped.
    pub fn dispatch(&self, command: LedCommand) -> bool {
        match self.tx.try_send(command) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(command)) => {
                warn!("LED queue full, dropping {:?}", command);
                false
            }
            Err(mpsc::error::TrySendError::Closed(command)) => {
                warn!("LED dispatcher gone, dropping {:?}", command);
                false
            }
        }
    }
}

/// Address of the default route's interface.
pub async fn local_ipv4() -> Result<Ipv4Addr> {
    let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0)).await?;
    socket.connect(("10.255.255.255", 1)).await?;
    match socket.local_addr()?.ip() {
        IpAddr::V4(ip) => Ok(ip),
        IpAddr::V6(ip) => Err(ControlError::InvalidAddress(format!(
            "local address {} is not IPv4",
            ip
        ))),
    }
}

/// Scan `a.b.c.1..=255` of `local` for a fixture answering `greeting` on
/// `port`. Returns the first fixture found.
pub async fn discover_fixture(local: Ipv4Addr, port: u16, greeting: &str) -> Result<String> {
    let [a, b, c, _] = local.octets();
    info!("Scanning {}.{}.{}.1/255 for a fixture", a, b, c);

    let mut candidates = futures::stream::iter(1..=255u8)
        .map(|d| {
            let addr = SocketAddr::from((Ipv4Addr::new(a, b, c, d), port));
            async move { is_fixture(addr, greeting).await.then_some(addr) }
        })
        .buffer_unordered(SCAN_CONCURRENCY);

    while let Some(found) = candidates.next().await {
        if let Some(addr) = found {
            info!("Fixture found at {}", addr);
            return Ok(addr.to_string());
        }
    }
    Err(ControlError::Unreachable(format!(
        "no fixture on {}.{}.{}.0/24 port {}",
        a, b, c, port
    )))
}

async fn is_fixture(addr: SocketAddr, greeting: &str) -> bool {
    let open = matches!(
        tokio::time::timeout(SCAN_CONNECT_TIMEOUT, TcpStream::connect(addr)).await,
        Ok(Ok(_))
    );
    if !open {
        return false;
    }
    match LedClient::new(&addr.to_string()) {
        Ok(client) => client.check_alive(greeting).await.is_ok(),
        Err(_) => false,
    }
}
