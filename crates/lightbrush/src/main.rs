//! Lightbrush - robot light painting
//!
//! Command line entry point: the playback proxy, program execution and the
//! tools around them.

#![warn(missing_docs)]

mod commands;
mod config;
mod logging_setup;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use lightbrush_core::LightbrushSettings;
use std::path::PathBuf;

/// Lightbrush - robot light painting with index-synchronized LED playback
#[derive(Parser, Debug)]
#[command(name = "lightbrush", version, long_about = None)]
struct Cli {
    /// Configuration file (default: ./lightbrush.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the playback proxy: beacons in, LED commands out
    Proxy(ProxyArgs),
    /// Compile a conditioned trajectory and run it on the robot
    Execute(ExecuteArgs),
    /// Split one path of a per-path document into shorter paths
    Split(SplitArgs),
    /// Send beacons to a playback proxy by hand
    Beacon(BeaconArgs),
    /// Show a color on the LED fixture
    Leds(LedsArgs),
    /// Run the robot controller simulator
    SimulateRobot(SimulateRobotArgs),
    /// Run the LED fixture simulator
    SimulateFixture(SimulateFixtureArgs),
}

#[derive(Args, Debug)]
struct ProxyArgs {
    /// File whose first line names the active trajectory
    file: Option<PathBuf>,

    /// Fixture address; scanned for on the local subnet when omitted
    #[arg(long)]
    ip: Option<String>,

    /// Global LED brightness set at startup (0-255)
    #[arg(long)]
    brightness: Option<u8>,

    /// Beacon listener port
    #[arg(long)]
    port: Option<u16>,

    /// Brightness multiplier file
    #[arg(long)]
    multiplier: Option<PathBuf>,
}

impl ProxyArgs {
    fn apply(&self, settings: &mut LightbrushSettings) {
        if let Some(file) = &self.file {
            settings.watcher.current_file_path = file.clone();
        }
        if let Some(ip) = &self.ip {
            settings.playback.fixture = Some(ip.clone());
        }
        if let Some(brightness) = self.brightness {
            settings.playback.initial_brightness = brightness;
        }
        if let Some(port) = self.port {
            settings.playback.port = port;
        }
        if let Some(multiplier) = &self.multiplier {
            settings.watcher.multiplier_path = multiplier.clone();
        }
    }
}

#[derive(Args, Debug)]
struct ExecuteArgs {
    /// Conditioned trajectory document
    file: PathBuf,

    /// Robot controller address
    #[arg(long)]
    ur: Option<String>,

    /// Address of the playback proxy as seen from the robot
    #[arg(long)]
    proxy_ip: Option<String>,

    /// Port of the playback proxy
    #[arg(long)]
    proxy_port: Option<u16>,

    /// Print the program instead of sending it
    #[arg(long, default_value_t = false)]
    dry_run: bool,
}

impl ExecuteArgs {
    fn apply(&self, settings: &mut LightbrushSettings) {
        if let Some(ur) = &self.ur {
            settings.motion.robot_host = ur.clone();
        }
        if let Some(ip) = &self.proxy_ip {
            settings.motion.parameters.proxy_host = ip.clone();
        }
        if let Some(port) = self.proxy_port {
            settings.motion.parameters.proxy_port = port;
        }
    }
}

#[derive(Args, Debug)]
struct SplitArgs {
    /// Per-path document; the result is written to `<file>-split.json`
    file: PathBuf,

    /// Path to split
    #[arg(long, default_value_t = 0)]
    path_index: usize,

    /// Number of pieces
    #[arg(long, default_value_t = 2)]
    segments: usize,
}

#[derive(Args, Debug)]
struct BeaconArgs {
    /// Waypoint indices to send, in order
    #[arg(required = true)]
    indices: Vec<u32>,

    /// Playback proxy address
    #[arg(long, default_value = "127.0.0.1:9111")]
    to: String,

    /// Pause between beacons in milliseconds
    #[arg(long, default_value_t = 0)]
    interval_ms: u64,
}

#[derive(Args, Debug)]
struct LedsArgs {
    /// Color as `r,g,b` bytes
    #[arg(long, value_parser = parse_rgb)]
    rgb: [u8; 3],

    /// Brightness (0-255)
    #[arg(long, default_value_t = 255)]
    brightness: u8,

    /// Fixture address (default: from the configuration)
    #[arg(long)]
    ip: Option<String>,
}

#[derive(Args, Debug)]
struct SimulateRobotArgs {
    /// Listen address
    #[arg(long, default_value = "0.0.0.0:30002")]
    listen: String,

    /// Also forward beacons to this playback proxy
    #[arg(long)]
    relay: Option<String>,
}

#[derive(Args, Debug)]
struct SimulateFixtureArgs {
    /// Listen address
    #[arg(long, default_value = "0.0.0.0:80")]
    listen: String,
}

fn parse_rgb(text: &str) -> std::result::Result<[u8; 3], String> {
    let values = text
        .trim_matches(|c| c == '[' || c == ']')
        .split(',')
        .map(|v| v.trim().parse::<u8>().map_err(|e| format!("{:?}: {}", v, e)))
        .collect::<std::result::Result<Vec<u8>, String>>()?;
    values
        .try_into()
        .map_err(|v: Vec<u8>| format!("expected 3 components, got {}", v.len()))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut settings = config::load(cli.config.as_deref())?;
    if let Some(level) = &cli.log_level {
        settings.logging.level = level.clone();
    }
    let _log_guard = logging_setup::init(&settings.logging)?;

    match cli.command {
        Command::Proxy(args) => {
            args.apply(&mut settings);
            commands::proxy(&settings).await
        }
        Command::Execute(args) => {
            args.apply(&mut settings);
            commands::execute(&settings, &args.file, args.dry_run).await
        }
        Command::Split(args) => commands::split(&args.file, args.path_index, args.segments),
        Command::Beacon(args) => commands::beacon(&args.to, &args.indices, args.interval_ms).await,
        Command::Leds(args) => {
            if let Some(ip) = args.ip {
                settings.playback.fixture = Some(ip);
            }
            commands::leds(&settings, args.rgb, args.brightness).await
        }
        Command::SimulateRobot(args) => {
            commands::simulate_robot(&args.listen, args.relay.as_deref()).await
        }
        Command::SimulateFixture(args) => {
            commands::simulate_fixture(&args.listen, &settings.playback.fixture_greeting).await
        }
    }
}
