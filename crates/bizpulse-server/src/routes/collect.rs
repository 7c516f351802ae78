//! Event ingestion. Each handler stamps the event server-side (id and
//! timestamp are never client-supplied) and appends it through the
//! analytics backend.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use serde_json::{json, Value};

use bizpulse_core::event::{
    new_event_id, HeartbeatPayload, InteractionEvent, InteractionKind, InteractionPayload,
    SearchEvent, SearchPayload, VisitEvent, VisitPayload,
};

use crate::{error::AppError, state::AppState};

pub async fn record_visit(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<VisitPayload>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    if payload.device_id.trim().is_empty() {
        return Err(AppError::BadRequest("device_id must not be empty".into()));
    }

    let visit = VisitEvent {
        id: new_event_id(),
        device_id: payload.device_id,
        user_name: payload.user_name,
        page_path: payload.page_path,
        visited_at: Utc::now(),
    };
    state.analytics.record_visit(&visit).await?;
    Ok((StatusCode::CREATED, Json(json!({ "id": visit.id }))))
}

pub async fn record_interaction(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<InteractionPayload>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let kind = InteractionKind::parse(&payload.kind)
        .ok_or_else(|| AppError::BadRequest(format!("unknown interaction type: {}", payload.kind)))?;

    let event = InteractionEvent {
        id: new_event_id(),
        business_id: payload.business_id,
        kind,
        occurred_at: Utc::now(),
    };
    state.analytics.record_interaction(&event).await?;
    Ok((StatusCode::CREATED, Json(json!({ "id": event.id }))))
}

pub async fn record_search(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SearchPayload>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let event = SearchEvent {
        id: new_event_id(),
        query: payload.query,
        succeeded: payload.succeeded,
        result_count: payload.result_count,
        response_time_ms: payload.response_time_ms,
        user_name: payload.user_name,
        searched_at: Utc::now(),
    };
    state.analytics.record_search(&event).await?;
    Ok((StatusCode::CREATED, Json(json!({ "id": event.id }))))
}

pub async fn record_heartbeat(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<HeartbeatPayload>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    if payload.device_id.trim().is_empty() {
        return Err(AppError::BadRequest("device_id must not be empty".into()));
    }
    state.analytics.record_heartbeat(&payload).await?;
    Ok((StatusCode::OK, Json(json!({ "status": "ok" }))))
}
