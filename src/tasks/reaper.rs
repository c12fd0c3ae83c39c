//! TTL Reaper Task
//!
//! Background task that periodically removes expired cache entries, so that
//! entries nobody reads again stop occupying capacity once their TTL elapses.

use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::{self, JoinHandle};
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

// == Expiry Sweep ==
/// A structure the reaper can purge of expired entries.
///
/// Implementations must take the same lock their readers take, so that a
/// sweep and a lazy expiry check never disagree about what is present.
pub trait ExpirySweep: Send + Sync + 'static {
    /// Removes every expired entry and returns how many were removed.
    fn sweep_expired(&self) -> usize;
}

// == Reaper ==
/// Handle to a running reaper task.
///
/// The task stops when [`Reaper::stop`] is awaited or the handle is dropped.
#[derive(Debug)]
pub struct Reaper {
    token: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl Reaper {
    /// Spawns a reaper on `runtime` that sweeps `target` every `period`.
    ///
    /// The first pass runs one full period after spawning. The period is
    /// clamped to between 1 ms and one year. Passes run on the
    /// blocking pool; a pass that panics is logged and retried on the next
    /// tick, it never ends the task.
    ///
    /// # Example
    /// ```ignore
    /// let reaper = Reaper::spawn(target, Duration::from_secs(1), &Handle::current());
    /// // Later, during shutdown:
    /// reaper.stop().await;
    /// ```
    pub fn spawn<S: ExpirySweep>(target: Arc<S>, period: Duration, runtime: &Handle) -> Self {
        let token = CancellationToken::new();
        let handle = runtime.spawn(run(target, period, token.clone()));

        Self {
            token,
            handle: Some(handle),
        }
    }

    /// Returns true while the background task is alive.
    pub fn is_running(&self) -> bool {
        self.handle
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Cancels the task and waits for it to finish.
    pub async fn stop(mut self) {
        self.token.cancel();
        if let Some(handle) = self.handle.take() {
            if let Err(err) = handle.await {
                warn!(error = %err, "TTL reaper task ended abnormally");
            }
        }
    }
}

impl Drop for Reaper {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

/// Shortest period between passes; tokio rejects a zero interval
const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Longest period between passes
const MAX_PERIOD: Duration = Duration::from_secs(365 * 24 * 60 * 60);

async fn run<S: ExpirySweep>(target: Arc<S>, period: Duration, token: CancellationToken) {
    let period = period.clamp(MIN_PERIOD, MAX_PERIOD);
    info!(interval = ?period, "Starting TTL reaper");

    let start = Instant::now()
        .checked_add(period)
        .unwrap_or_else(Instant::now);
    let mut ticker = time::interval_at(start, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;

            _ = token.cancelled() => break,

            _ = ticker.tick() => reap_once(&target).await,
        }
    }

    info!("TTL reaper stopped");
}

// The scan is O(n) under the cache lock, so it runs off the async workers.
async fn reap_once<S: ExpirySweep>(target: &Arc<S>) {
    let target = Arc::clone(target);

    match task::spawn_blocking(move || target.sweep_expired()).await {
        Ok(0) => debug!("TTL reaper: no expired entries found"),
        Ok(removed) => info!("TTL reaper: removed {} expired entries", removed),
        Err(err) => warn!(error = %err, "TTL reaper pass failed, retrying on next tick"),
    }
}
