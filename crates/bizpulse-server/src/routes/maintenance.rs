//! Retention screen: storage report plus the operator-confirmed cleanup
//! trigger. Cleanup is the one destructive route; it is validated before
//! any delete runs and guarded so only one run can be in flight.

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use bizpulse_core::analytics::validate_retention_months;

use crate::{error::AppError, state::AppState};

pub async fn usage(State(state): State<Arc<AppState>>) -> Result<Json<Value>, AppError> {
    let usage = state.analytics.database_usage().await?;
    Ok(Json(json!({ "data": usage })))
}

#[derive(Debug, Deserialize)]
pub struct CleanupRequest {
    pub retention_months: u32,
}

pub async fn cleanup(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CleanupRequest>,
) -> Result<Json<Value>, AppError> {
    validate_retention_months(req.retention_months)
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let _guard = state
        .try_begin_cleanup()
        .ok_or(AppError::CleanupInFlight)?;

    info!(retention_months = req.retention_months, "cleanup requested");
    let report = state.analytics.cleanup(req.retention_months).await?;
    Ok(Json(json!({ "data": report })))
}
