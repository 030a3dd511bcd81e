//! Background sweeper
//!
//! Small purpose-built loop for the process-local stores (token
//! revocation set, MFA challenge map): run a sweep on a fixed interval
//! until stopped. Stopping is idempotent; dropping the handle without
//! calling stop leaves the task running for the process lifetime, which
//! is the normal server case.

use std::time::Duration;
use tokio::sync::watch;

/// Handle to a running sweeper task
pub struct SweeperHandle {
    stop: watch::Sender<bool>,
}

impl SweeperHandle {
    /// Signal the sweeper to stop. Safe to call any number of times.
    pub fn stop(&self) {
        let _ = self.stop.send(true);
    }
}

/// Spawn a sweeper task calling `sweep` every `every`.
///
/// `sweep` returns the number of entries it removed, which is logged
/// when non-zero.
pub fn spawn_sweeper<F>(name: &'static str, every: Duration, mut sweep: F) -> SweeperHandle
where
    F: FnMut() -> usize + Send + 'static,
{
    let (stop_tx, mut stop_rx) = watch::channel(false);

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // interval fires immediately on the first tick; consume it so the
        // first sweep happens one full period after startup
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let removed = sweep();
                    if removed > 0 {
                        tracing::debug!(sweeper = name, removed, "Swept expired entries");
                    }
                }
                changed = stop_rx.changed() => {
                    if changed.is_err() || *stop_rx.borrow() {
                        break;
                    }
                }
            }
        }

        tracing::debug!(sweeper = name, "Sweeper stopped");
    });

    SweeperHandle { stop: stop_tx }
}
