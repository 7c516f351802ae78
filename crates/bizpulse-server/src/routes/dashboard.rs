//! The merged dashboard pull.
//!
//! Every card is fetched independently and in parallel; a failed card logs
//! a warning and falls back to its empty shape, so one broken aggregation
//! never blanks the whole console.

use std::sync::Arc;

use axum::{extract::State, Json};
use chrono::Utc;
use serde_json::{json, Value};
use tracing::warn;

use bizpulse_core::analytics::{DashboardSummary, SearchStats, DEFAULT_TOP_K};
use bizpulse_core::ranking::DeliverySplit;

use crate::state::AppState;

fn degrade<T>(card: &str, result: anyhow::Result<T>, fallback: T) -> T {
    match result {
        Ok(value) => value,
        Err(e) => {
            warn!(card, error = %e, "dashboard card failed, serving fallback");
            fallback
        }
    }
}

pub async fn dashboard(State(state): State<Arc<AppState>>) -> Json<Value> {
    let analytics = &state.analytics;

    let (
        live_count,
        weekday_visits,
        hourly_visits,
        top_businesses,
        top_queries,
        failed_queries,
        search_stats,
        top_users,
        categories,
        payments,
        delivery,
    ) = tokio::join!(
        analytics.live_count(),
        analytics.weekday_visits(),
        analytics.hourly_visits(),
        analytics.top_businesses(DEFAULT_TOP_K),
        analytics.top_queries(DEFAULT_TOP_K),
        analytics.failed_queries(DEFAULT_TOP_K),
        analytics.search_stats(),
        analytics.top_users(DEFAULT_TOP_K),
        analytics.category_distribution(),
        analytics.payment_distribution(),
        analytics.delivery_split(),
    );

    let summary = DashboardSummary {
        generated_at: Utc::now(),
        live_count,
        weekday_visits,
        hourly_visits,
        top_businesses: degrade("top_businesses", top_businesses, Vec::new()),
        top_queries: degrade("top_queries", top_queries, Vec::new()),
        failed_queries: degrade("failed_queries", failed_queries, Vec::new()),
        search_stats: degrade("search_stats", search_stats, SearchStats::empty()),
        top_users: degrade("top_users", top_users, Vec::new()),
        categories: degrade("categories", categories, Vec::new()),
        payments: degrade("payments", payments, Vec::new()),
        delivery: degrade("delivery", delivery, DeliverySplit::empty()),
    };

    Json(json!({ "data": summary }))
}
