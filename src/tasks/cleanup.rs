//! Expired Entry Sweep Task
//!
//! Periodically removes expired entries from both storage scopes.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::cache::ExpiringCache;

// == Sweep Task ==
/// Owns the periodic sweep timer.
///
/// At most one sweep loop runs per handle: starting again replaces the
/// previous loop, and dropping the handle stops it.
#[derive(Debug)]
pub struct SweepTask {
    interval: Duration,
    handle: Option<JoinHandle<()>>,
}

impl SweepTask {
    /// Creates a stopped task that sweeps every `interval` once started.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            handle: None,
        }
    }

    /// Starts sweeping `cache`. The first sweep runs one interval from now.
    ///
    /// Each sweep runs on the blocking pool since backends may do file I/O.
    /// Must be called from within a tokio runtime.
    pub fn start(&mut self, cache: Arc<ExpiringCache>) {
        self.stop();

        let period = self.interval;
        info!("Starting cache sweep task with interval of {:?}", period);

        self.handle = Some(tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;

                let sweeper = cache.clone();
                let report = match tokio::task::spawn_blocking(move || sweeper.sweep_all()).await {
                    Ok(report) => report,
                    Err(e) => {
                        warn!("Cache sweep failed: {}", e);
                        continue;
                    }
                };

                if report.total() > 0 {
                    info!(
                        session = report.session,
                        persistent = report.persistent,
                        "Cache sweep: removed {} expired entries",
                        report.total()
                    );
                } else {
                    debug!("Cache sweep: no expired entries found");
                }
            }
        }));
    }

    /// Stops the sweep loop if one is running.
    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            debug!("Cache sweep task stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }
}

impl Drop for SweepTask {
    fn drop(&mut self) {
        self.stop();
    }
}
