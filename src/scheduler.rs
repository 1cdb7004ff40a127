//! Per-source auto-switch timers
//!
//! While enabled, a source runs one periodic task that asks the host to
//! fetch and apply the next wallpaper. Enabling always cancels any
//! previous timer for the source before starting a new one, so at most
//! one timer exists per source; disabling cancels outright and is safe
//! to repeat. Tick failures are logged and never stop the schedule.
//!
//! The scheduler holds no cross-restart state. On process start a source
//! stays stopped until the application re-reads the host's stored
//! configuration and enables it again explicitly.

use crate::error::{Result, WallpaperError};
use crate::host::Host;
use crate::types::{AutoSwitchSettings, WallpaperSource};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant};
use tracing::{debug, warn};

#[derive(Debug)]
struct TimerHandle {
    interval_seconds: u64,
    task: JoinHandle<()>,
}

/// Cancellable per-source timers driving the auto-switch feature.
pub struct AutoSwitchScheduler<H: Host> {
    host: Arc<H>,
    timers: HashMap<WallpaperSource, TimerHandle>,
}

impl<H: Host> AutoSwitchScheduler<H> {
    pub fn new(host: Arc<H>) -> Self {
        Self {
            host,
            timers: HashMap::new(),
        }
    }

    /// Start (or restart) the periodic switch for a source.
    ///
    /// The configuration is persisted through the host first; the timer
    /// only starts once that succeeded. The first tick fires after one
    /// full interval, not immediately. Calling `enable` on an already
    /// running source restarts its timer with the new interval; the
    /// old timer is always cancelled before the new one exists.
    pub async fn enable(
        &mut self,
        source: WallpaperSource,
        interval_seconds: u64,
        api_key: Option<String>,
    ) -> Result<()> {
        if interval_seconds == 0 {
            return Err(WallpaperError::InvalidInterval(interval_seconds));
        }

        self.cancel(source);
        self.host
            .set_auto_switch_config(source, true, interval_seconds)
            .await?;

        let host = self.host.clone();
        let period = Duration::from_secs(interval_seconds);
        let task = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            loop {
                ticker.tick().await;
                // Fire-and-forget: a slow or failing tick never delays
                // the next one, and cancelling the timer leaves an
                // in-flight tick to finish on its own.
                tokio::spawn(run_tick(host.clone(), source, api_key.clone()));
            }
        });

        self.timers.insert(
            source,
            TimerHandle {
                interval_seconds,
                task,
            },
        );
        debug!(source = %source, interval_seconds, "auto-switch enabled");
        Ok(())
    }

    /// Stop the periodic switch for a source. Idempotent: disabling a
    /// stopped source only re-persists the disabled state.
    pub async fn disable(&mut self, source: WallpaperSource) -> Result<()> {
        let interval_seconds = match self.cancel(source) {
            Some(secs) => secs,
            None => self
                .host
                .get_auto_switch_config(source)
                .await?
                .map(|settings| settings.interval_seconds)
                .unwrap_or(AutoSwitchSettings::default().interval_seconds),
        };

        self.host
            .set_auto_switch_config(source, false, interval_seconds)
            .await?;
        debug!(source = %source, "auto-switch disabled");
        Ok(())
    }

    /// Whether a timer is currently running for the source.
    pub fn is_running(&self, source: WallpaperSource) -> bool {
        self.timers.contains_key(&source)
    }

    /// The running timer's interval, if any.
    pub fn interval(&self, source: WallpaperSource) -> Option<u64> {
        self.timers.get(&source).map(|t| t.interval_seconds)
    }

    /// Cancel every timer (process shutdown / session teardown).
    pub fn shutdown(&mut self) {
        for (_, handle) in self.timers.drain() {
            handle.task.abort();
        }
    }

    /// Abort the timer task for a source, returning its interval if one
    /// was running. Aborting takes effect before any later start, so
    /// two timers for one source can never overlap.
    fn cancel(&mut self, source: WallpaperSource) -> Option<u64> {
        let handle = self.timers.remove(&source)?;
        handle.task.abort();
        Some(handle.interval_seconds)
    }
}

impl<H: Host> Drop for AutoSwitchScheduler<H> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// One scheduled "fetch and apply the next wallpaper" action.
async fn run_tick<H: Host>(host: Arc<H>, source: WallpaperSource, api_key: Option<String>) {
    match host.fetch_next_wallpaper(source, api_key).await {
        Ok(record) => {
            debug!(source = %source, id = %record.id, "auto-switch fetched next wallpaper");
            if let Err(err) = host.set_wallpaper(&record).await {
                warn!(source = %source, "auto-switch could not apply wallpaper: {err}");
            }
        }
        Err(err) => {
            warn!(source = %source, "auto-switch tick failed: {err}");
        }
    }
}
