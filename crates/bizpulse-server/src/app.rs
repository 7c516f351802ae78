use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{auth, routes, state::AppState};

/// Construct the Axum [`Router`] with all routes and middleware attached.
///
/// Collect endpoints and the health probe stay open: the tracking snippet
/// runs in visitor browsers and carries no secrets. Console routes sit
/// behind the auth middleware, which is a no-op when `BIZPULSE_AUTH=none`.
///
/// Middleware is applied in outer-to-inner order (outermost runs first on
/// request, last on response):
///
/// 1. `TraceLayer` — structured request/response logging via `tracing`.
/// 2. `CorsLayer` — the directory frontend posts collect events cross-origin;
///    origins come from `BIZPULSE_CORS_ORIGINS`, falling back to permissive.
pub fn build_app(state: Arc<AppState>) -> Router {
    let open = Router::new()
        .route("/health", get(routes::health::health))
        .route("/api/collect/visit", post(routes::collect::record_visit))
        .route(
            "/api/collect/interaction",
            post(routes::collect::record_interaction),
        )
        .route("/api/collect/search", post(routes::collect::record_search))
        .route(
            "/api/collect/heartbeat",
            post(routes::collect::record_heartbeat),
        );

    let console = Router::new()
        .route("/api/dashboard", get(routes::dashboard::dashboard))
        .route("/api/businesses/top", get(routes::businesses::top_businesses))
        .route("/api/live", get(routes::live::live))
        .route("/api/maintenance/usage", get(routes::maintenance::usage))
        .route("/api/maintenance/cleanup", post(routes::maintenance::cleanup))
        .route("/api/export/{table}", get(routes::export::export_table))
        .layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            auth::require_auth,
        ));

    open.merge(console)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&state))
        .with_state(state)
}

fn cors_layer(state: &Arc<AppState>) -> CorsLayer {
    let origins = &state.config.cors_origins;
    let allow_origin = if origins.is_empty() {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(origins.iter().filter_map(|o| o.parse().ok()))
    };
    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(Any)
        .allow_headers(Any)
}
