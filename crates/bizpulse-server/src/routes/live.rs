use std::sync::Arc;

use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::{poller, state::AppState};

/// `GET /api/live`: serve the poller's snapshot. If the poller has not
/// completed a refresh yet (first request racing startup), fetch one
/// inline so the card never renders a fake zero.
pub async fn live(State(state): State<Arc<AppState>>) -> Json<Value> {
    let needs_refresh = state.live.read().await.refreshed_at.is_none();
    if needs_refresh {
        poller::refresh_once(&state).await;
    }

    let snapshot = state.live.read().await.clone();
    Json(json!({ "data": snapshot }))
}
