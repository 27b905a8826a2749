use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::StoreError;
use crate::fetch::RefreshOutcome;
use crate::store::NotificationStore;

/// Background refresh of page 1, owned by whichever view keeps the
/// collection fresh. Dropping the poller stops it.
pub struct Poller {
    store: NotificationStore,
    interval: Duration,
    running: Mutex<Option<PollTask>>,
}

struct PollTask {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

impl Poller {
    pub fn new(store: NotificationStore, interval: Duration) -> Self {
        Self { store, interval, running: Mutex::new(None) }
    }

    /// Poller using the store's configured interval.
    pub fn from_config(store: NotificationStore) -> Self {
        let interval = store.config().poll_interval;
        Self::new(store, interval)
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Spawn the refresh loop on the current tokio runtime. The first tick
    /// fires right away. Returns `false` if a loop is already running.
    pub fn start(&self) -> bool {
        let mut running = self.running.lock().unwrap_or_else(PoisonError::into_inner);
        if running.as_ref().is_some_and(|task| !task.handle.is_finished()) {
            return false;
        }

        let token = CancellationToken::new();
        let handle = tokio::spawn(run_poll_loop(self.store.clone(), self.interval, token.clone()));
        *running = Some(PollTask { token, handle });
        info!("Notification poller started (every {:?})", self.interval);
        true
    }

    /// Stop the loop. No tick runs after this returns; a refresh that was
    /// mid-flight is abandoned.
    pub fn stop(&self) {
        let task = self.running.lock().unwrap_or_else(PoisonError::into_inner).take();
        if let Some(task) = task {
            task.token.cancel();
            task.handle.abort();
            info!("Notification poller stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|task| !task.handle.is_finished())
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn run_poll_loop(store: NotificationStore, period: Duration, token: CancellationToken) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = token.cancelled() => break,
            _ = interval.tick() => {}
        }

        tokio::select! {
            _ = token.cancelled() => break,
            result = store.refresh() => match result {
                Ok(RefreshOutcome::Refreshed(page)) => {
                    debug!("Poll refreshed page 1: {} items, total {}", page.items.len(), page.total);
                }
                Ok(RefreshOutcome::Skipped) => {
                    debug!("Poll tick skipped, a refresh is already running");
                }
                Err(StoreError::Closed) => break,
                Err(e) => {
                    // Keep the schedule; the next tick retries.
                    warn!("Poll refresh failed: {}", e);
                }
            }
        }
    }

    debug!("Poll loop exited");
}
