use async_trait::async_trait;

use bizpulse_core::analytics::{
    AnalyticsBackend, CleanupReport, DatabaseUsage, ExportData, ExportTable, SearchStats, UserRank,
};
use bizpulse_core::buckets::BucketPoint;
use bizpulse_core::event::{HeartbeatPayload, InteractionEvent, SearchEvent, VisitEvent};
use bizpulse_core::ranking::{BusinessRank, DeliverySplit, DistributionSlice, QueryRank};

use crate::DuckDbBackend;

#[async_trait]
impl AnalyticsBackend for DuckDbBackend {
    async fn record_visit(&self, visit: &VisitEvent) -> anyhow::Result<()> {
        DuckDbBackend::record_visit(self, visit).await
    }

    async fn record_interaction(&self, event: &InteractionEvent) -> anyhow::Result<()> {
        DuckDbBackend::record_interaction(self, event).await
    }

    async fn record_search(&self, event: &SearchEvent) -> anyhow::Result<()> {
        DuckDbBackend::record_search(self, event).await
    }

    async fn record_heartbeat(&self, ping: &HeartbeatPayload) -> anyhow::Result<()> {
        DuckDbBackend::record_heartbeat(self, ping).await
    }

    async fn weekday_visits(&self) -> Vec<BucketPoint> {
        DuckDbBackend::weekday_visits(self).await
    }

    async fn hourly_visits(&self) -> Vec<BucketPoint> {
        DuckDbBackend::hourly_visits(self).await
    }

    async fn top_businesses(&self, k: usize) -> anyhow::Result<Vec<BusinessRank>> {
        DuckDbBackend::top_businesses(self, k).await
    }

    async fn top_queries(&self, k: usize) -> anyhow::Result<Vec<QueryRank>> {
        DuckDbBackend::top_queries(self, k).await
    }

    async fn failed_queries(&self, k: usize) -> anyhow::Result<Vec<QueryRank>> {
        DuckDbBackend::failed_queries(self, k).await
    }

    async fn search_stats(&self) -> anyhow::Result<SearchStats> {
        DuckDbBackend::search_stats(self).await
    }

    async fn top_users(&self, k: usize) -> anyhow::Result<Vec<UserRank>> {
        DuckDbBackend::top_users(self, k).await
    }

    async fn category_distribution(&self) -> anyhow::Result<Vec<DistributionSlice>> {
        DuckDbBackend::category_distribution(self).await
    }

    async fn payment_distribution(&self) -> anyhow::Result<Vec<DistributionSlice>> {
        DuckDbBackend::payment_distribution(self).await
    }

    async fn delivery_split(&self) -> anyhow::Result<DeliverySplit> {
        DuckDbBackend::delivery_split(self).await
    }

    async fn live_count(&self) -> i64 {
        DuckDbBackend::live_count(self).await
    }

    async fn recent_visits(&self, limit: usize) -> anyhow::Result<Vec<VisitEvent>> {
        DuckDbBackend::recent_visits(self, limit).await
    }

    async fn cleanup(&self, retention_months: u32) -> anyhow::Result<CleanupReport> {
        DuckDbBackend::cleanup(self, retention_months).await
    }

    async fn database_usage(&self) -> anyhow::Result<DatabaseUsage> {
        DuckDbBackend::database_usage(self).await
    }

    async fn export_rows(&self, table: ExportTable) -> anyhow::Result<ExportData> {
        DuckDbBackend::export_rows(self, table).await
    }
}
