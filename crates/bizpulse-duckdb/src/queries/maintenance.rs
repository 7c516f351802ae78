use anyhow::{anyhow, Result};
use chrono::{Months, Utc};
use tracing::info;

use bizpulse_core::analytics::{validate_retention_months, CleanupReport, DatabaseUsage};

use crate::backend::sql_timestamp;
use crate::filters::Table;
use crate::DuckDbBackend;

impl DuckDbBackend {
    /// Age-based log pruning. Deletes rows strictly older than
    /// `now - retention_months` from the three event-log tables and reports
    /// the exact count removed from each.
    ///
    /// The window is validated before any delete is issued, and all three
    /// deletes run in a single transaction: the caller gets either a full
    /// report or a whole-operation failure, never a partial commit reported
    /// as success.
    ///
    /// `user_tracking` (cumulative reach) and `live_users` (ephemeral
    /// presence) are never touched here.
    pub async fn cleanup(&self, retention_months: u32) -> Result<CleanupReport> {
        validate_retention_months(retention_months)?;

        let cutoff = Utc::now()
            .checked_sub_months(Months::new(retention_months))
            .ok_or_else(|| anyhow!("retention cutoff out of range: {retention_months} months"))?;
        let cutoff_str = sql_timestamp(&cutoff);

        let mut conn = self.conn.lock().await;
        let tx = conn.transaction()?;
        let visits_deleted = tx.execute(
            "DELETE FROM visit_logs WHERE visited_at < ?1",
            duckdb::params![cutoff_str],
        )? as u64;
        let interactions_deleted = tx.execute(
            "DELETE FROM business_interactions WHERE occurred_at < ?1",
            duckdb::params![cutoff_str],
        )? as u64;
        let search_logs_deleted = tx.execute(
            "DELETE FROM ai_search_logs WHERE searched_at < ?1",
            duckdb::params![cutoff_str],
        )? as u64;
        tx.commit()?;

        info!(
            retention_months,
            visits_deleted, interactions_deleted, search_logs_deleted, "Log cleanup completed"
        );

        Ok(CleanupReport {
            visits_deleted,
            interactions_deleted,
            search_logs_deleted,
        })
    }

    /// Row counts per log table plus the immutable unique-user count.
    /// Read-only; shown to the operator before they pick a retention window.
    pub async fn database_usage(&self) -> Result<DatabaseUsage> {
        Ok(DatabaseUsage {
            visit_logs: self.count_where(Table::VisitLogs, &[]).await?,
            business_interactions: self.count_where(Table::BusinessInteractions, &[]).await?,
            ai_search_logs: self.count_where(Table::AiSearchLogs, &[]).await?,
            unique_users: self.count_where(Table::UserTracking, &[]).await?,
        })
    }
}
