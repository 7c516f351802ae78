//! Minimal console gate.
//!
//! Auth only fences off the operator console as a whole; it has no bearing
//! on aggregation correctness. `BIZPULSE_AUTH=password` requires
//! `Authorization: Bearer <BIZPULSE_PASSWORD>` on the console routes;
//! collect and health stay open (heartbeats and probes carry no secrets).

use std::sync::Arc;

use axum::{extract::State, http::Request, middleware::Next, response::Response};

use bizpulse_core::config::AuthMode;

use crate::{error::AppError, state::AppState};

pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    request: Request<axum::body::Body>,
    next: Next,
) -> Result<Response, AppError> {
    if let AuthMode::Password(expected) = &state.config.auth_mode {
        let authorized = request
            .headers()
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .is_some_and(|token| token == expected);
        if !authorized {
            return Err(AppError::Unauthorized);
        }
    }
    Ok(next.run(request).await)
}
