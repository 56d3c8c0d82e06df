//! Polling of the multiplier and indirection files.
//!
//! Operators change brightness and the active trajectory by editing two
//! small files. The watcher re-reads them on a fixed interval and publishes
//! changes to the playback service.

use crate::error::Result;
use crate::playback::{MultiplierState, PlaybackSession, SessionHandle};
use lightbrush_core::{ColorScale, MultiplierRefresh, WatcherSettings};
use lightbrush_io::{load_document, read_current_file, read_multiplier};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// What a single poll changed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickOutcome {
    /// The multiplier changed
    pub multiplier_changed: bool,
    /// The session was replaced
    pub session_swapped: bool,
}

/// Periodic file poller.
pub struct MultiplierWatcher {
    settings: WatcherSettings,
    color_scale: Option<ColorScale>,
    session: SessionHandle,
    multiplier: Arc<MultiplierState>,
    current: PathBuf,
}

impl MultiplierWatcher {
    /// Create a watcher publishing to `session` and `multiplier`.
    pub fn new(
        settings: WatcherSettings,
        color_scale: Option<ColorScale>,
        session: SessionHandle,
        multiplier: Arc<MultiplierState>,
    ) -> Self {
        let current = session.load().source().to_path_buf();
        Self {
            settings,
            color_scale,
            session,
            multiplier,
            current,
        }
    }

    /// Poll both files once.
    ///
    /// A multiplier that fails to parse keeps the previous value. A
    /// trajectory that fails to load is returned as an error.
    pub fn tick(&mut self) -> Result<TickOutcome> {
        let mut outcome = TickOutcome::default();

        if self.settings.multiplier_refresh == MultiplierRefresh::EveryTick {
            match read_multiplier(&self.settings.multiplier_path) {
                Ok(value) if value != self.multiplier.get() => {
                    info!("Multiplier set to {}", value);
                    self.multiplier.set(value);
                    outcome.multiplier_changed = true;
                }
                Ok(_) => {}
                Err(e) => warn!("Keeping multiplier {}: {}", self.multiplier.get(), e),
            }
        }

        let target = read_current_file(&self.settings.current_file_path)?;
        if target != self.current {
            info!("Active trajectory changed to {}", target.display());
            let document = load_document(&target)?;
            let session =
                PlaybackSession::from_document(&document, self.color_scale, target.clone());
            info!("Swapping in {} waypoints", session.len());
            self.session.swap(session);
            self.current = target;
            outcome.session_swapped = true;
        }

        Ok(outcome)
    }

    /// Poll forever. Returns only when a tick fails.
    pub async fn run(mut self) -> Result<()> {
        let period = Duration::from_millis(self.settings.interval_ms.max(1));
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately; startup already read both files
        interval.tick().await;

        loop {
            interval.tick().await;
            let outcome = self.tick()?;
            debug!("Watcher tick: {:?}", outcome);
        }
    }
}
