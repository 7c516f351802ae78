//! Analytics backend abstraction and the flat view-model objects the
//! console renders.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::buckets::BucketPoint;
use crate::error::CoreError;
use crate::event::{
    HeartbeatPayload, InteractionEvent, SearchEvent, VisitEvent,
};
use crate::ranking::{BusinessRank, DeliverySplit, DistributionSlice, QueryRank};

/// Default K for the dashboard's top-businesses card.
pub const DEFAULT_TOP_K: usize = 10;

/// K for the dedicated business-performance view.
pub const PERFORMANCE_TOP_K: usize = 15;

/// Upper bound accepted from callers of top-K endpoints.
pub const MAX_TOP_K: usize = 50;

/// Retention selector offers {1, 3, 6, 12}; anything in this range is
/// accepted at the API boundary, anything outside is rejected before a
/// single delete is issued.
pub const MAX_RETENTION_MONTHS: u32 = 60;

pub fn validate_retention_months(months: u32) -> Result<(), CoreError> {
    if months == 0 || months > MAX_RETENTION_MONTHS {
        return Err(CoreError::InvalidRetentionWindow(months));
    }
    Ok(())
}

/// Aggregate search figures for the search card.
#[derive(Debug, Clone, Serialize)]
pub struct SearchStats {
    pub total_searches: i64,
    pub successful_searches: i64,
    /// Rounded percent in [0, 100]; 0 when there are no searches.
    pub success_rate: i64,
    pub avg_response_time_ms: i64,
}

impl SearchStats {
    pub fn empty() -> Self {
        Self {
            total_searches: 0,
            successful_searches: 0,
            success_rate: 0,
            avg_response_time_ms: 0,
        }
    }
}

/// One row of the top-users card, read straight off the materialized
/// `user_tracking` counters.
#[derive(Debug, Clone, Serialize)]
pub struct UserRank {
    pub device_id: String,
    pub user_name: Option<String>,
    pub total_visits: i64,
    pub last_visit_at: String,
}

/// Exact per-table deletion counts from one cleanup run. Either all three
/// are reported or the whole operation fails; partial success is never
/// reported silently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CleanupReport {
    pub visits_deleted: u64,
    pub interactions_deleted: u64,
    pub search_logs_deleted: u64,
}

/// Read-only storage report shown before the operator picks a retention
/// window. `unique_users` comes from the cumulative-reach table that
/// cleanup never touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DatabaseUsage {
    pub visit_logs: i64,
    pub business_interactions: i64,
    pub ai_search_logs: i64,
    pub unique_users: i64,
}

/// The merged dashboard response — one flat object per pull, assembled by
/// the server facade from independently fetched (and independently
/// degradable) parts.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSummary {
    pub generated_at: DateTime<Utc>,
    pub live_count: i64,
    pub weekday_visits: Vec<BucketPoint>,
    pub hourly_visits: Vec<BucketPoint>,
    pub top_businesses: Vec<BusinessRank>,
    pub top_queries: Vec<QueryRank>,
    pub failed_queries: Vec<QueryRank>,
    pub search_stats: SearchStats,
    pub top_users: Vec<UserRank>,
    pub categories: Vec<DistributionSlice>,
    pub payments: Vec<DistributionSlice>,
    pub delivery: DeliverySplit,
}

/// Tables the operator can download as CSV from the retention screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportTable {
    VisitLogs,
    BusinessInteractions,
    AiSearchLogs,
    UserTracking,
}

impl ExportTable {
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        match raw {
            "visit_logs" => Ok(ExportTable::VisitLogs),
            "business_interactions" => Ok(ExportTable::BusinessInteractions),
            "ai_search_logs" => Ok(ExportTable::AiSearchLogs),
            "user_tracking" => Ok(ExportTable::UserTracking),
            other => Err(CoreError::UnknownExportTable(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ExportTable::VisitLogs => "visit_logs",
            ExportTable::BusinessInteractions => "business_interactions",
            ExportTable::AiSearchLogs => "ai_search_logs",
            ExportTable::UserTracking => "user_tracking",
        }
    }
}

/// Raw table dump for CSV export; a pass-through of store reads with no
/// aggregation.
#[derive(Debug, Clone)]
pub struct ExportData {
    pub headers: Vec<&'static str>,
    pub rows: Vec<Vec<String>>,
}

/// Storage-facing contract of the analytics engine.
///
/// All read methods are idempotent projections of current table contents.
/// The chart and presence reads degrade internally (all-zero series, zero
/// count) on store failure so one broken card never takes the dashboard
/// down; `cleanup` is the only destructive call and always propagates
/// failure instead.
#[async_trait::async_trait]
pub trait AnalyticsBackend: Send + Sync + 'static {
    async fn record_visit(&self, visit: &VisitEvent) -> anyhow::Result<()>;
    async fn record_interaction(&self, event: &InteractionEvent) -> anyhow::Result<()>;
    async fn record_search(&self, event: &SearchEvent) -> anyhow::Result<()>;
    async fn record_heartbeat(&self, ping: &HeartbeatPayload) -> anyhow::Result<()>;

    /// Trailing 7-day weekday series; degrades to all zeros on store error.
    async fn weekday_visits(&self) -> Vec<BucketPoint>;
    /// Today's hour-of-day series; degrades to all zeros on store error.
    async fn hourly_visits(&self) -> Vec<BucketPoint>;

    async fn top_businesses(&self, k: usize) -> anyhow::Result<Vec<BusinessRank>>;
    async fn top_queries(&self, k: usize) -> anyhow::Result<Vec<QueryRank>>;
    async fn failed_queries(&self, k: usize) -> anyhow::Result<Vec<QueryRank>>;
    async fn search_stats(&self) -> anyhow::Result<SearchStats>;
    async fn top_users(&self, k: usize) -> anyhow::Result<Vec<UserRank>>;

    async fn category_distribution(&self) -> anyhow::Result<Vec<DistributionSlice>>;
    async fn payment_distribution(&self) -> anyhow::Result<Vec<DistributionSlice>>;
    async fn delivery_split(&self) -> anyhow::Result<DeliverySplit>;

    /// Freshness-windowed presence count; degrades to 0 on store error.
    async fn live_count(&self) -> i64;
    async fn recent_visits(&self, limit: usize) -> anyhow::Result<Vec<VisitEvent>>;

    /// Destructive, operator-confirmed, never auto-invoked. Validates the
    /// window before touching the store and fails whole on any error.
    async fn cleanup(&self, retention_months: u32) -> anyhow::Result<CleanupReport>;
    async fn database_usage(&self) -> anyhow::Result<DatabaseUsage>;

    async fn export_rows(&self, table: ExportTable) -> anyhow::Result<ExportData>;
}
