use std::collections::HashMap;

use anyhow::Result;

use bizpulse_core::analytics::UserRank;
use bizpulse_core::event::InteractionKind;
use bizpulse_core::ranking::{self, BusinessRank};

use crate::DuckDbBackend;

impl DuckDbBackend {
    /// id → display-name map over all listings, fetched once per ranking
    /// call so the aggregation stays O(events + listings).
    pub(crate) async fn business_names(&self) -> Result<HashMap<String, String>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare("SELECT id, name FROM businesses")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut names = HashMap::new();
        for row in rows {
            let (id, name) = row?;
            names.insert(id, name);
        }
        Ok(names)
    }

    /// All interaction rows as (business_id, kind) pairs. Rows with an
    /// unknown event type are skipped.
    pub(crate) async fn fetch_interaction_rows(&self) -> Result<Vec<(String, InteractionKind)>> {
        let conn = self.conn.lock().await;
        let mut stmt =
            conn.prepare("SELECT business_id, event_type FROM business_interactions")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut pairs = Vec::new();
        for row in rows {
            let (business_id, raw_kind) = row?;
            if let Some(kind) = InteractionKind::parse(&raw_kind) {
                pairs.push((business_id, kind));
            }
        }
        Ok(pairs)
    }

    /// Top-K businesses by total interactions, per-kind counters included.
    /// Ordering is total descending, business id ascending on ties.
    pub async fn top_businesses(&self, k: usize) -> Result<Vec<BusinessRank>> {
        let rows = self.fetch_interaction_rows().await?;
        let names = self.business_names().await?;
        Ok(ranking::rank_businesses(&rows, &names, k))
    }

    /// Top-K users straight off the materialized `user_tracking` counters.
    /// No client-side aggregation: the counter is already cumulative. Same
    /// deterministic order contract as the other rankings.
    pub async fn top_users(&self, k: usize) -> Result<Vec<UserRank>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(
            "SELECT device_id, user_name, total_visits, CAST(last_visit_at AS VARCHAR) \
             FROM user_tracking \
             ORDER BY total_visits DESC, device_id ASC \
             LIMIT ?1",
        )?;
        let rows = stmt.query_map(duckdb::params![k as i64], |row| {
            Ok(UserRank {
                device_id: row.get(0)?,
                user_name: row.get(1)?,
                total_visits: row.get(2)?,
                last_visit_at: row.get(3)?,
            })
        })?;

        let mut ranked = Vec::new();
        for row in rows {
            ranked.push(row?);
        }
        Ok(ranked)
    }
}
