//! Subcommand implementations

use anyhow::{Context, Result};
use lightbrush_control::{
    discover_fixture, local_ipv4, FixtureSimulator, LedClient, LedCommand, LedSink, MotionChannel,
    MultiplierState, MultiplierWatcher, PlaybackService, PlaybackSession, RobotSimulator,
    SessionHandle,
};
use lightbrush_core::{beacon, LightbrushSettings, MotionScriptCompiler};
use lightbrush_io::{load_document, read_multiplier, split_file};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tracing::info;

const FIXTURE_PORT: u16 = 80;

/// Check the configured fixture, or find one on the local subnet.
async fn connect_fixture(settings: &LightbrushSettings) -> Result<LedClient> {
    let greeting = &settings.playback.fixture_greeting;
    let address = match &settings.playback.fixture {
        Some(address) => address.clone(),
        None => {
            let local = local_ipv4().await.context("Cannot determine local address")?;
            info!("Local IP address: {}", local);
            discover_fixture(local, FIXTURE_PORT, greeting)
                .await
                .context("No lightbrush fixture found; is it on the same network?")?
        }
    };

    let client = LedClient::new(&address)?;
    client
        .check_alive(greeting)
        .await
        .with_context(|| format!("{} does not look like a lightbrush fixture", address))?;
    info!("Lightbrush fixture found: {}", address);
    Ok(client)
}

/// Run the playback proxy until interrupted or until a reload fails.
pub async fn proxy(settings: &LightbrushSettings) -> Result<()> {
    let watcher_settings = &settings.watcher;
    let scale = settings.playback.color_scale;

    let session = PlaybackSession::load(&watcher_settings.current_file_path, scale)
        .context("Failed to load the active trajectory")?;
    let multiplier = read_multiplier(&watcher_settings.multiplier_path)
        .context("Failed to read the brightness multiplier")?;
    info!("Multiplier set to {}", multiplier);

    let client = connect_fixture(settings).await?;

    let session = SessionHandle::new(session);
    let multiplier = Arc::new(MultiplierState::new(multiplier));
    let service = PlaybackService::bind(
        &settings.playback,
        session.clone(),
        multiplier.clone(),
        Arc::new(client) as Arc<dyn LedSink>,
    )
    .await
    .context("Failed to start the playback service")?;
    let watcher = MultiplierWatcher::new(watcher_settings.clone(), scale, session, multiplier);

    tokio::select! {
        result = service.run() => result.context("Playback service stopped")?,
        result = watcher.run() => result.context("Trajectory reload failed")?,
        _ = tokio::signal::ctrl_c() => info!("Shutting down"),
    }
    Ok(())
}

/// Compile a conditioned trajectory and run it to completion on the robot.
pub async fn execute(settings: &LightbrushSettings, file: &Path, dry_run: bool) -> Result<()> {
    let trajectory = load_document(file)
        .and_then(|document| document.into_trajectory())
        .with_context(|| format!("Failed to load trajectory {:?}", file))?;
    info!("Loaded {} configurations", trajectory.len());

    let program =
        MotionScriptCompiler::new(settings.motion.parameters.clone()).compile(&trajectory);
    if dry_run {
        print!("{}", program.as_str());
        return Ok(());
    }

    let channel = MotionChannel::from_settings(&settings.motion);
    channel
        .check_alive()
        .await
        .with_context(|| format!("Robot at {} not connected", channel.address()))?;

    let acks = channel.execute(&program).await?;
    acks.run_to_completion(program.waypoint_count()).await?;
    info!("Done");
    Ok(())
}

/// Split a path of a per-path document.
pub fn split(file: &Path, path_index: usize, segments: usize) -> Result<()> {
    let output = split_file(file, path_index, segments)
        .with_context(|| format!("Failed to split {:?}", file))?;
    info!("Wrote {:?}", output);
    Ok(())
}

/// Send beacons to a playback proxy on one connection.
pub async fn beacon(to: &str, indices: &[u32], interval_ms: u64) -> Result<()> {
    let mut stream = TcpStream::connect(to)
        .await
        .with_context(|| format!("Cannot connect to {}", to))?;
    for (n, &index) in indices.iter().enumerate() {
        if n > 0 && interval_ms > 0 {
            tokio::time::sleep(Duration::from_millis(interval_ms)).await;
        }
        stream.write_all(&beacon::encode(index)).await?;
        info!("Sent {}", index);
    }
    stream.shutdown().await?;
    Ok(())
}

/// Show one color on the fixture.
pub async fn leds(settings: &LightbrushSettings, rgb: [u8; 3], brightness: u8) -> Result<()> {
    let client = connect_fixture(settings).await?;
    client.set_leds(LedCommand { rgb, brightness }).await?;
    info!("RGB: {:?}, Brightness: {}", rgb, brightness);
    Ok(())
}

/// Run the robot controller simulator.
pub async fn simulate_robot(listen: &str, relay: Option<&str>) -> Result<()> {
    let mut simulator = RobotSimulator::bind(listen)
        .await
        .with_context(|| format!("Cannot listen on {}", listen))?;
    if let Some(relay) = relay {
        info!("Relaying beacons to {}", relay);
        simulator = simulator.with_relay(relay);
    }
    simulator.run().await?;
    Ok(())
}

/// Run the LED fixture simulator.
pub async fn simulate_fixture(listen: &str, greeting: &str) -> Result<()> {
    FixtureSimulator::bind(listen, greeting)
        .await
        .with_context(|| format!("Cannot listen on {}", listen))?
        .run()
        .await?;
    Ok(())
}
