//! Recomputation driver.
//!
//! Keeps the derived priority fields fresh. [`RefreshDriver`] is the
//! tick-based core: the caller ticks it on whatever cadence it has, and the
//! driver decides whether a full scoring pass is due. [`run_periodic`] wraps
//! it in an async loop for shells that want the cadence handled for them.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::Mutex;

use crate::notify::{Notifier, ReminderEngine};
use crate::state::AppState;
use crate::storage::AssignmentStore;

/// Tick-based recomputation scheduler. Serialized by `&mut self`, so a pass
/// can never run concurrently with itself.
pub struct RefreshDriver {
    interval: Duration,
    last_run: Option<DateTime<Utc>>,
}

impl RefreshDriver {
    pub fn new(interval_secs: u64) -> Self {
        Self {
            interval: Duration::seconds(interval_secs as i64),
            last_run: None,
        }
    }

    pub fn last_run(&self) -> Option<DateTime<Utc>> {
        self.last_run
    }

    /// Run a scoring pass if the interval has elapsed since the last one.
    /// Returns whether a pass ran. Ticking twice at the same `now` runs at
    /// most one pass.
    pub fn tick(&mut self, state: &mut AppState, now: DateTime<Utc>) -> bool {
        if let Some(last) = self.last_run {
            if now - last < self.interval {
                return false;
            }
        }
        self.force(state, now);
        true
    }

    /// Run a scoring pass unconditionally, resetting the interval. Used
    /// after mutations and on load.
    pub fn force(&mut self, state: &mut AppState, now: DateTime<Utc>) {
        state.recompute_all(now);
        self.last_run = Some(now);
    }
}

/// Periodic loop for async shells: every `interval_secs`, rescore the
/// collection, dispatch due reminders, and flush to storage.
///
/// Notification and save failures do not stop the loop. The in-memory state
/// stays authoritative over storage; the next pass rewrites the full
/// collection, which retries a failed save.
pub async fn run_periodic<S, N>(
    state: Arc<Mutex<AppState>>,
    mut store: S,
    notifier: N,
    mut reminders: ReminderEngine,
    interval_secs: u64,
) where
    S: AssignmentStore,
    N: Notifier,
{
    let mut ticker = tokio::time::interval(std::time::Duration::from_secs(interval_secs.max(1)));
    loop {
        ticker.tick().await;
        let now = Utc::now();
        let mut state = state.lock().await;
        state.recompute_all(now);
        for reminder in reminders.due_reminders(state.assignments(), now) {
            let _ = notifier.notify(&reminder);
        }
        let _ = store.save(state.assignments());
    }
}
