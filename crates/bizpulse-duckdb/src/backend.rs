use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, NaiveDateTime, Utc};
use duckdb::Connection;
use tokio::sync::Mutex;
use tracing::info;

use bizpulse_core::event::{
    Business, Category, HeartbeatPayload, InteractionEvent, SearchEvent, VisitEvent,
};

use crate::filters::{where_clause, Filter, Table};
use crate::schema::init_sql;

/// Format a timestamp the way it is stored and compared in SQL.
///
/// All timestamps are naive UTC inside DuckDB; one format for inserts and
/// window cutoffs keeps comparisons exact.
pub(crate) fn sql_timestamp(ts: &DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M:%S%.f").to_string()
}

/// Parse a `CAST(ts AS VARCHAR)` value back into UTC. Malformed rows yield
/// `None` and are skipped by callers rather than failing a whole series.
pub(crate) fn parse_sql_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S"))
        .ok()
        .map(|naive| naive.and_utc())
}

/// A DuckDB event store for BizPulse.
///
/// DuckDB is single-writer: concurrent reads are fine, but concurrent
/// writes cause contention. The connection lives behind
/// `Arc<tokio::sync::Mutex<_>>` so the async runtime serialises access
/// while the struct stays cheap to clone into Axum handlers and the
/// background poller.
pub struct DuckDbBackend {
    pub(crate) conn: Arc<Mutex<Connection>>,
    /// Presence freshness window in seconds (config default 60).
    pub(crate) freshness_seconds: u64,
}

impl DuckDbBackend {
    /// Open (or create) a DuckDB database file at `path`.
    ///
    /// `memory_limit` is a DuckDB size string such as `"1GB"` or `"512MB"`,
    /// read from `Config.duckdb_memory_limit` at the call site. Schema init
    /// is idempotent, so re-running on every startup is safe.
    pub fn open(path: &str, memory_limit: &str, freshness_seconds: u64) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch(&init_sql(memory_limit))?;
        info!(
            "DuckDB opened at {} with memory_limit={}, threads=2",
            path, memory_limit
        );
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            freshness_seconds,
        })
    }

    /// Open an **in-memory** database with the default 60 s freshness
    /// window. Intended for tests — data is discarded on drop.
    pub fn open_in_memory() -> Result<Self> {
        Self::open_in_memory_with_freshness(60)
    }

    /// In-memory database with an explicit freshness window, for presence
    /// boundary tests.
    pub fn open_in_memory_with_freshness(freshness_seconds: u64) -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(&init_sql("1GB"))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            freshness_seconds,
        })
    }

    /// Execute `SELECT 1` as a lightweight liveness check.
    ///
    /// Called by the `/health` endpoint. Returns an error if the connection
    /// is unavailable (file locked, disk full, etc.).
    pub async fn ping(&self) -> Result<()> {
        let conn = self.conn.lock().await;
        conn.execute_batch("SELECT 1")?;
        Ok(())
    }

    /// Acquire the connection lock for direct queries.
    ///
    /// Intended for integration tests that need to verify or seed stored
    /// data. Production code uses the typed methods.
    pub async fn conn_for_test(&self) -> tokio::sync::MutexGuard<'_, Connection> {
        self.conn.lock().await
    }

    // ---- generic filtered operations ----

    /// `COUNT(*)` over `table` under a filter conjunction.
    pub async fn count_where(&self, table: Table, filters: &[Filter]) -> Result<i64> {
        let (clause, params) = where_clause(filters);
        let sql = format!("SELECT COUNT(*) FROM {}{}", table.name(), clause);
        let conn = self.conn.lock().await;
        let param_refs: Vec<&dyn duckdb::types::ToSql> =
            params.iter().map(|p| p.as_ref() as &dyn duckdb::types::ToSql).collect();
        let count: i64 = conn
            .prepare(&sql)?
            .query_row(param_refs.as_slice(), |row| row.get(0))?;
        Ok(count)
    }

    /// Delete rows matching the filter conjunction; returns rows removed.
    pub async fn delete_where(&self, table: Table, filters: &[Filter]) -> Result<u64> {
        let (clause, params) = where_clause(filters);
        let sql = format!("DELETE FROM {}{}", table.name(), clause);
        let conn = self.conn.lock().await;
        let param_refs: Vec<&dyn duckdb::types::ToSql> =
            params.iter().map(|p| p.as_ref() as &dyn duckdb::types::ToSql).collect();
        let removed = conn.execute(&sql, param_refs.as_slice())?;
        Ok(removed as u64)
    }

    // ---- event writes (fire-and-forget with error propagation) ----

    /// Append one visit row and bump the cumulative-reach counter for the
    /// device, in a single transaction. `total_visits` only ever grows;
    /// retention cleanup never rolls it back.
    pub async fn record_visit(&self, visit: &VisitEvent) -> Result<()> {
        let mut conn = self.conn.lock().await;
        let tx = conn.transaction()?;
        tx.execute(
            "INSERT INTO visit_logs (id, device_id, user_name, page_path, visited_at) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
            duckdb::params![
                visit.id,
                visit.device_id,
                visit.user_name,
                visit.page_path,
                sql_timestamp(&visit.visited_at),
            ],
        )?;
        tx.execute(
            "INSERT INTO user_tracking (device_id, user_name, total_visits, last_visit_at) \
             VALUES (?1, ?2, 1, ?3) \
             ON CONFLICT (device_id) DO UPDATE SET \
                 total_visits = user_tracking.total_visits + 1, \
                 last_visit_at = EXCLUDED.last_visit_at, \
                 user_name = COALESCE(EXCLUDED.user_name, user_tracking.user_name)",
            duckdb::params![
                visit.device_id,
                visit.user_name,
                sql_timestamp(&visit.visited_at),
            ],
        )?;
        tx.commit()?;
        Ok(())
    }

    pub async fn record_interaction(&self, event: &InteractionEvent) -> Result<()> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO business_interactions (id, business_id, event_type, occurred_at) \
             VALUES (?1, ?2, ?3, ?4)",
            duckdb::params![
                event.id,
                event.business_id,
                event.kind.as_str(),
                sql_timestamp(&event.occurred_at),
            ],
        )?;
        Ok(())
    }

    pub async fn record_search(&self, event: &SearchEvent) -> Result<()> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO ai_search_logs \
             (id, query, succeeded, result_count, response_time_ms, user_name, searched_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            duckdb::params![
                event.id,
                event.query,
                event.succeeded,
                event.result_count,
                event.response_time_ms,
                event.user_name,
                sql_timestamp(&event.searched_at),
            ],
        )?;
        Ok(())
    }

    /// Upsert the presence ping for a device. A device that stops pinging
    /// simply ages out of the freshness window; there is no explicit
    /// mark-offline step.
    pub async fn record_heartbeat(&self, ping: &HeartbeatPayload) -> Result<()> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO live_users (device_id, is_active, last_ping) VALUES (?1, ?2, ?3) \
             ON CONFLICT (device_id) DO UPDATE SET \
                 is_active = EXCLUDED.is_active, last_ping = EXCLUDED.last_ping",
            duckdb::params![ping.device_id, ping.is_active, sql_timestamp(&Utc::now())],
        )?;
        Ok(())
    }

    // ---- reference-data seeding (first run and test fixtures) ----

    /// Insert or replace a category row. Safe to call repeatedly.
    pub async fn seed_category(&self, category: &Category) -> Result<()> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO categories (id, name) VALUES (?1, ?2) \
             ON CONFLICT (id) DO UPDATE SET name = EXCLUDED.name",
            duckdb::params![category.id, category.name],
        )?;
        Ok(())
    }

    /// Insert or replace a listing row. Payment methods are stored as a
    /// JSON array of method names.
    pub async fn seed_business(&self, business: &Business) -> Result<()> {
        let methods: Vec<&str> = business.payment_methods.iter().map(|m| m.as_str()).collect();
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO businesses (id, name, category_id, payment_methods, delivery_available) \
             VALUES (?1, ?2, ?3, ?4, ?5) \
             ON CONFLICT (id) DO UPDATE SET \
                 name = EXCLUDED.name, category_id = EXCLUDED.category_id, \
                 payment_methods = EXCLUDED.payment_methods, \
                 delivery_available = EXCLUDED.delivery_available",
            duckdb::params![
                business.id,
                business.name,
                business.category_id,
                serde_json::to_string(&methods)?,
                business.delivery_available,
            ],
        )?;
        Ok(())
    }
}
