use anyhow::Result;
use chrono::{Duration, Utc};
use tracing::warn;

use bizpulse_core::event::VisitEvent;

use crate::backend::{parse_sql_timestamp, sql_timestamp};
use crate::filters::{Filter, Table};
use crate::DuckDbBackend;

impl DuckDbBackend {
    /// Devices considered online right now: active heartbeats no older than
    /// the freshness window. Stateless — every call re-derives from current
    /// ping rows, so silent devices age out without a mark-offline step.
    ///
    /// Degraded mode: presence is best-effort and must never block the rest
    /// of the dashboard, so a store error yields 0, logged as a warning.
    pub async fn live_count(&self) -> i64 {
        let cutoff = Utc::now() - Duration::seconds(self.freshness_seconds as i64);
        let filters = [
            Filter::eq("is_active", true),
            Filter::gte("last_ping", sql_timestamp(&cutoff)),
        ];
        match self.count_where(Table::LiveUsers, &filters).await {
            Ok(count) => count,
            Err(e) => {
                warn!(error = %e, "live count read failed, serving 0");
                0
            }
        }
    }

    /// Latest visit rows, newest first, for the live feed.
    pub async fn recent_visits(&self, limit: usize) -> Result<Vec<VisitEvent>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(
            "SELECT id, device_id, user_name, page_path, CAST(visited_at AS VARCHAR) \
             FROM visit_logs \
             ORDER BY visited_at DESC \
             LIMIT ?1",
        )?;
        let rows = stmt.query_map(duckdb::params![limit as i64], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, Option<String>>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
            ))
        })?;

        let mut visits = Vec::new();
        for row in rows {
            let (id, device_id, user_name, page_path, raw_ts) = row?;
            if let Some(visited_at) = parse_sql_timestamp(&raw_ts) {
                visits.push(VisitEvent {
                    id,
                    device_id,
                    user_name,
                    page_path,
                    visited_at,
                });
            }
        }
        Ok(visits)
    }
}
