use anyhow::Result;

use bizpulse_core::analytics::SearchStats;
use bizpulse_core::ranking::{self, QueryRank};

use crate::DuckDbBackend;

impl DuckDbBackend {
    /// All search rows as (query, succeeded) pairs, exactly as stored
    /// (case-sensitive).
    pub(crate) async fn fetch_search_rows(&self) -> Result<Vec<(String, bool)>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare("SELECT query, succeeded FROM ai_search_logs")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, bool>(1)?))
        })?;

        let mut pairs = Vec::new();
        for row in rows {
            pairs.push(row?);
        }
        Ok(pairs)
    }

    /// Most frequent queries overall.
    pub async fn top_queries(&self, k: usize) -> Result<Vec<QueryRank>> {
        let rows = self.fetch_search_rows().await?;
        Ok(ranking::rank_queries(&rows, k))
    }

    /// Most frequent queries among `succeeded = false` rows.
    pub async fn failed_queries(&self, k: usize) -> Result<Vec<QueryRank>> {
        let rows = self.fetch_search_rows().await?;
        Ok(ranking::rank_failed_queries(&rows, k))
    }

    /// Aggregate search figures. Success rate is computed in the pure
    /// ranking layer and is 0 (not an error) when no searches exist.
    pub async fn search_stats(&self) -> Result<SearchStats> {
        let conn = self.conn.lock().await;
        let (total, successful, avg_ms): (i64, i64, f64) = conn
            .prepare(
                "SELECT COUNT(*), \
                        COALESCE(SUM(CASE WHEN succeeded THEN 1 ELSE 0 END), 0), \
                        COALESCE(AVG(response_time_ms), 0) \
                 FROM ai_search_logs",
            )?
            .query_row([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))?;

        Ok(SearchStats {
            total_searches: total,
            successful_searches: successful,
            success_rate: ranking::success_rate(successful, total),
            avg_response_time_ms: avg_ms.round() as i64,
        })
    }
}
