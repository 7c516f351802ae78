use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::RwLock;

use bizpulse_core::analytics::AnalyticsBackend;
use bizpulse_core::config::Config;
use bizpulse_duckdb::DuckDbBackend;

use crate::poller::LiveSnapshot;

/// Shared application state injected into every Axum handler via
/// [`axum::extract::State`].
pub struct AppState {
    /// Concrete backend, kept for store-level calls the analytics trait
    /// does not cover (health ping).
    pub db: Arc<DuckDbBackend>,

    /// The analytics engine behind its trait; everything the console
    /// renders goes through here.
    pub analytics: Arc<dyn AnalyticsBackend>,

    /// Parsed configuration, loaded once at startup from environment
    /// variables.
    pub config: Arc<Config>,

    /// Latest completed live-presence snapshot, refreshed by the poller.
    /// Writers simply overwrite: the most recently completed refresh wins.
    pub live: Arc<RwLock<LiveSnapshot>>,

    /// One cleanup in flight at a time, enforced at the process level.
    /// The store is trusted to serialize the deletes it receives; this
    /// flag only prevents a second operator trigger while one run is
    /// outstanding.
    cleanup_in_flight: Arc<AtomicBool>,
}

impl AppState {
    pub fn new(db: DuckDbBackend, config: Config) -> Self {
        let db = Arc::new(db);
        Self {
            analytics: db.clone(),
            db,
            config: Arc::new(config),
            live: Arc::new(RwLock::new(LiveSnapshot::empty())),
            cleanup_in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Try to claim the cleanup slot. Returns `None` while another run is
    /// outstanding; the returned guard releases the slot on drop, including
    /// on the error path.
    pub fn try_begin_cleanup(&self) -> Option<CleanupGuard> {
        self.cleanup_in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| CleanupGuard {
                flag: Arc::clone(&self.cleanup_in_flight),
            })
    }
}

pub struct CleanupGuard {
    flag: Arc<AtomicBool>,
}

impl Drop for CleanupGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}
