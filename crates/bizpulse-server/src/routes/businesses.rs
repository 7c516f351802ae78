use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use bizpulse_core::analytics::{MAX_TOP_K, PERFORMANCE_TOP_K};

use crate::{error::AppError, state::AppState};

#[derive(Debug, Deserialize)]
pub struct TopParams {
    pub limit: Option<usize>,
}

/// `GET /api/businesses/top?limit=K`: the dedicated performance view,
/// ranked by total interactions with deterministic tie-breaking.
pub async fn top_businesses(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TopParams>,
) -> Result<Json<Value>, AppError> {
    let limit = params.limit.unwrap_or(PERFORMANCE_TOP_K);
    if limit == 0 || limit > MAX_TOP_K {
        return Err(AppError::BadRequest(format!(
            "limit must be between 1 and {MAX_TOP_K}"
        )));
    }

    let ranks = state.analytics.top_businesses(limit).await?;
    Ok(Json(json!({ "data": ranks })))
}
