#![allow(dead_code)]

use async_trait::async_trait;
use lightbrush_control::{LedCommand, LedSink, Result};
use serde_json::{json, Value};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// LED sink that records everything it is asked to do.
#[derive(Default)]
pub struct RecordingSink {
    pub commands: Mutex<Vec<LedCommand>>,
    pub brightness: Mutex<Vec<u8>>,
    pub delay: Option<Duration>,
}

impl RecordingSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn slow(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            delay: Some(delay),
            ..Default::default()
        })
    }

    pub async fn commands(&self) -> Vec<LedCommand> {
        self.commands.lock().await.clone()
    }
}

#[async_trait]
impl LedSink for RecordingSink {
    async fn set_brightness(&self, value: u8) -> Result<()> {
        self.brightness.lock().await.push(value);
        Ok(())
    }

    async fn set_leds(&self, command: LedCommand) -> Result<()> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.commands.lock().await.push(command);
        Ok(())
    }
}

/// Poll `check` until it holds or two seconds pass.
pub async fn wait_until<F, Fut>(mut check: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    for _ in 0..200 {
        if check().await {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    false
}

/// Flat trajectory document with one pose per color.
pub fn document(colors: &[[f64; 3]], gradients: &[f64]) -> Value {
    let frames: Vec<Value> = (0..colors.len())
        .map(|i| json!([0.4 + 0.01 * i as f64, 0.0, 0.3]))
        .collect();
    let configurations: Vec<Value> = (0..colors.len())
        .map(|i| json!([0.01 * i as f64, -1.5, 1.5, -1.5, -1.5, 0.0]))
        .collect();
    let startends: Vec<bool> = (0..colors.len())
        .map(|i| i == 0 || i + 1 == colors.len())
        .collect();
    json!({
        "frames": frames,
        "colors": colors,
        "gradients": gradients,
        "configurations": configurations,
        "startends": startends,
    })
}

pub fn write_json(dir: &Path, name: &str, value: &Value) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, serde_json::to_string(value).unwrap()).unwrap();
    path
}

/// Point the indirection file at `target`.
pub fn point_to(dir: &Path, target: &str) -> PathBuf {
    let path = dir.join("current_file.txt");
    std::fs::write(&path, format!("{}\n", target)).unwrap();
    path
}

/// Wait until `sink` has recorded `n` LED commands.
pub async fn wait_for_commands(sink: &Arc<RecordingSink>, n: usize) -> bool {
    wait_until(|| {
        let sink = sink.clone();
        async move { sink.commands().await.len() == n }
    })
    .await
}
