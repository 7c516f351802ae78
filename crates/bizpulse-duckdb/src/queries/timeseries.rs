use anyhow::Result;
use chrono::{DateTime, Utc};
use tracing::warn;

use bizpulse_core::buckets::{
    self, zero_hourly_series, zero_weekday_series, BucketPoint,
};

use crate::backend::{parse_sql_timestamp, sql_timestamp};
use crate::DuckDbBackend;

impl DuckDbBackend {
    /// Visit timestamps at or after `cutoff`, oldest first. Malformed rows
    /// are skipped.
    pub(crate) async fn fetch_visit_timestamps_since(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<DateTime<Utc>>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(
            "SELECT CAST(visited_at AS VARCHAR) FROM visit_logs \
             WHERE visited_at >= ?1 ORDER BY visited_at",
        )?;
        let rows = stmt.query_map(duckdb::params![sql_timestamp(&cutoff)], |row| {
            row.get::<_, String>(0)
        })?;

        let mut timestamps = Vec::new();
        for row in rows {
            if let Some(ts) = parse_sql_timestamp(&row?) {
                timestamps.push(ts);
            }
        }
        Ok(timestamps)
    }

    /// Dense weekday series over the trailing 7 calendar days ending today.
    ///
    /// Degraded mode: a failed store read serves the all-zero series so the
    /// chart stays renderable; the failure is logged, not propagated.
    pub async fn weekday_visits(&self) -> Vec<BucketPoint> {
        let today = Utc::now().date_naive();
        let window_start = buckets::weekday_window_start(today)
            .and_hms_opt(0, 0, 0)
            .unwrap_or_default()
            .and_utc();

        match self.fetch_visit_timestamps_since(window_start).await {
            Ok(timestamps) => buckets::weekday_series(today, &timestamps),
            Err(e) => {
                warn!(error = %e, "weekday visits read failed, serving zero series");
                zero_weekday_series(today)
            }
        }
    }

    /// Dense hour-of-day series for today (UTC). Same degraded mode as
    /// [`DuckDbBackend::weekday_visits`].
    pub async fn hourly_visits(&self) -> Vec<BucketPoint> {
        let today = Utc::now().date_naive();
        let midnight = today.and_hms_opt(0, 0, 0).unwrap_or_default().and_utc();

        match self.fetch_visit_timestamps_since(midnight).await {
            Ok(timestamps) => buckets::hourly_series(today, &timestamps),
            Err(e) => {
                warn!(error = %e, "hourly visits read failed, serving zero series");
                zero_hourly_series(today)
            }
        }
    }
}
