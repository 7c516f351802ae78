/// DuckDB initialization SQL.
///
/// Executed once at database open time via `Connection::execute_batch`.
/// All statements use `IF NOT EXISTS` so they are safe to re-run on every
/// startup (idempotent).
///
/// `memory_limit` is passed at runtime from `Config.duckdb_memory_limit`
/// (env `BIZPULSE_DUCKDB_MEMORY`, default `"1GB"`). An explicit limit is
/// always set — the DuckDB default of 80% of system RAM is not acceptable
/// for a server process. `threads = 2` keeps the background pool small for
/// single-writer embedded use.
pub fn init_sql(memory_limit: &str) -> String {
    format!(
        r#"SET memory_limit = '{memory_limit}';
SET threads = 2;

-- ===========================================
-- REFERENCE DATA (owned by the directory CRUD, read-only here)
-- ===========================================
CREATE TABLE IF NOT EXISTS categories (
    id              VARCHAR PRIMARY KEY,           -- 'cat_' + hex(5)
    name            VARCHAR NOT NULL
);

CREATE TABLE IF NOT EXISTS businesses (
    id                 VARCHAR PRIMARY KEY,        -- 'biz_' + hex(5)
    name               VARCHAR NOT NULL,
    category_id        VARCHAR,
    payment_methods    VARCHAR NOT NULL DEFAULT '[]',  -- JSON array of method names
    delivery_available BOOLEAN NOT NULL DEFAULT FALSE,
    created_at         TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
);
CREATE INDEX IF NOT EXISTS idx_businesses_category ON businesses(category_id);

-- ===========================================
-- EVENT LOGS (append-only; pruned by retention cleanup)
-- ===========================================
CREATE TABLE IF NOT EXISTS visit_logs (
    id              VARCHAR PRIMARY KEY,           -- UUID v4
    device_id       VARCHAR NOT NULL,
    user_name       VARCHAR,
    page_path       VARCHAR NOT NULL,
    visited_at      TIMESTAMP NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_visit_logs_visited_at ON visit_logs(visited_at);

CREATE TABLE IF NOT EXISTS business_interactions (
    id              VARCHAR PRIMARY KEY,           -- UUID v4
    business_id     VARCHAR NOT NULL,
    event_type      VARCHAR NOT NULL,              -- 'view' | 'call' | 'whatsapp' | 'share'
    occurred_at     TIMESTAMP NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_interactions_business ON business_interactions(business_id);
CREATE INDEX IF NOT EXISTS idx_interactions_occurred ON business_interactions(occurred_at);

CREATE TABLE IF NOT EXISTS ai_search_logs (
    id               VARCHAR PRIMARY KEY,          -- UUID v4
    query            VARCHAR NOT NULL,
    succeeded        BOOLEAN NOT NULL,
    result_count     INTEGER NOT NULL DEFAULT 0,
    response_time_ms INTEGER NOT NULL DEFAULT 0,
    user_name        VARCHAR,
    searched_at      TIMESTAMP NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_search_logs_searched ON ai_search_logs(searched_at);

-- ===========================================
-- PRESENCE (ephemeral; excluded from retention cleanup)
-- ===========================================
CREATE TABLE IF NOT EXISTS live_users (
    device_id       VARCHAR PRIMARY KEY,
    is_active       BOOLEAN NOT NULL DEFAULT TRUE,
    last_ping       TIMESTAMP NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_live_users_ping ON live_users(last_ping DESC);

-- ===========================================
-- CUMULATIVE REACH (never deleted — survives log cleanup)
-- ===========================================
CREATE TABLE IF NOT EXISTS user_tracking (
    device_id       VARCHAR PRIMARY KEY,
    user_name       VARCHAR,
    total_visits    INTEGER NOT NULL DEFAULT 1,
    last_visit_at   TIMESTAMP NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_user_tracking_visits ON user_tracking(total_visits DESC);
"#
    )
}
