use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use bizpulse_server::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialise structured JSON logging. Level controlled via RUST_LOG env var.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("bizpulse=info".parse()?),
        )
        .json()
        .init();

    let cfg = bizpulse_core::config::Config::from_env().map_err(|e| anyhow::anyhow!(e))?;

    // Ensure data directory exists before opening DuckDB.
    std::fs::create_dir_all(&cfg.data_dir)?;
    let db_path = format!("{}/bizpulse.db", cfg.data_dir);

    // Open DuckDB — initialises the schema idempotently.
    let db = bizpulse_duckdb::DuckDbBackend::open(
        &db_path,
        &cfg.duckdb_memory_limit,
        cfg.freshness_seconds,
    )?;

    match &cfg.auth_mode {
        bizpulse_core::config::AuthMode::Password(_) => {
            info!("Auth enabled (BIZPULSE_AUTH=password) — console routes gated");
        }
        bizpulse_core::config::AuthMode::None => {
            info!("Auth disabled (BIZPULSE_AUTH=none) — all routes open");
        }
    }

    let state = Arc::new(AppState::new(db, cfg.clone()));

    // Warm the live snapshot before accepting traffic, then keep it fresh.
    bizpulse_server::poller::refresh_once(&state).await;
    let poller = bizpulse_server::poller::spawn(Arc::clone(&state));

    let addr = format!("0.0.0.0:{}", cfg.port);
    let app = bizpulse_server::app::build_app(Arc::clone(&state));

    info!(port = cfg.port, "Bizpulse listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            tokio::signal::ctrl_c().await.ok();
        })
        .await?;

    poller.shutdown();

    Ok(())
}
