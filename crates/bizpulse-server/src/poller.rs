//! Background live-presence poller.
//!
//! The console's live card re-pulls on a fixed interval. Instead of letting
//! every browser tab hit DuckDB, one task refreshes a shared snapshot and
//! handlers serve that. Results are applied last-write-wins: whichever
//! refresh completes most recently owns the snapshot, so a slow earlier
//! fetch can never clobber a newer one after it. Cancellation is by
//! aborting the task handle on teardown; an in-flight store call simply
//! completes and is discarded.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::state::AppState;

/// Rows in the recent-visits feed.
pub const RECENT_VISITS_LIMIT: usize = 20;

#[derive(Debug, Clone, Serialize)]
pub struct LiveSnapshot {
    pub live_count: i64,
    pub recent_visits: Vec<bizpulse_core::event::VisitEvent>,
    /// `None` until the first refresh completes.
    pub refreshed_at: Option<DateTime<Utc>>,
}

impl LiveSnapshot {
    pub fn empty() -> Self {
        Self {
            live_count: 0,
            recent_visits: Vec::new(),
            refreshed_at: None,
        }
    }
}

/// Fetch a fresh snapshot and install it. The presence count degrades to 0
/// inside the backend; the feed degrades to empty here, so a store outage
/// leaves the card blank rather than stale forever or erroring.
pub async fn refresh_once(state: &Arc<AppState>) {
    let live_count = state.analytics.live_count().await;
    let recent_visits = match state.analytics.recent_visits(RECENT_VISITS_LIMIT).await {
        Ok(visits) => visits,
        Err(e) => {
            warn!(error = %e, "recent visits read failed, serving empty feed");
            Vec::new()
        }
    };

    let snapshot = LiveSnapshot {
        live_count,
        recent_visits,
        refreshed_at: Some(Utc::now()),
    };
    *state.live.write().await = snapshot;
}

/// Owning handle for the poller task. Dropping (or calling
/// [`PollerHandle::shutdown`]) aborts the loop, which is the teardown
/// contract: the timer is cleared, in-flight work is discarded.
pub struct PollerHandle {
    handle: JoinHandle<()>,
}

impl PollerHandle {
    pub fn shutdown(&self) {
        self.handle.abort();
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Spawn the fixed-interval refresh loop (period from
/// `Config.poll_seconds`).
pub fn spawn(state: Arc<AppState>) -> PollerHandle {
    let period = state.config.poll_interval();
    info!(poll_seconds = period.as_secs(), "Live poller started");
    let handle = tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            refresh_once(&state).await;
        }
    });
    PollerHandle { handle }
}
