use anyhow::Result;

use bizpulse_core::analytics::{ExportData, ExportTable};

use crate::DuckDbBackend;

impl DuckDbBackend {
    /// Dump one exportable table as stringly rows for CSV download. Plain
    /// pass-through of a store read; no aggregation.
    pub async fn export_rows(&self, table: ExportTable) -> Result<ExportData> {
        let (headers, sql): (Vec<&'static str>, &str) = match table {
            ExportTable::VisitLogs => (
                vec!["id", "device_id", "user_name", "page_path", "visited_at"],
                "SELECT id, device_id, COALESCE(user_name, ''), page_path, \
                        CAST(visited_at AS VARCHAR) \
                 FROM visit_logs ORDER BY visited_at",
            ),
            ExportTable::BusinessInteractions => (
                vec!["id", "business_id", "event_type", "occurred_at"],
                "SELECT id, business_id, event_type, CAST(occurred_at AS VARCHAR) \
                 FROM business_interactions ORDER BY occurred_at",
            ),
            ExportTable::AiSearchLogs => (
                vec![
                    "id",
                    "query",
                    "succeeded",
                    "result_count",
                    "response_time_ms",
                    "user_name",
                    "searched_at",
                ],
                "SELECT id, query, CAST(succeeded AS VARCHAR), \
                        CAST(result_count AS VARCHAR), CAST(response_time_ms AS VARCHAR), \
                        COALESCE(user_name, ''), CAST(searched_at AS VARCHAR) \
                 FROM ai_search_logs ORDER BY searched_at",
            ),
            ExportTable::UserTracking => (
                vec!["device_id", "user_name", "total_visits", "last_visit_at"],
                "SELECT device_id, COALESCE(user_name, ''), \
                        CAST(total_visits AS VARCHAR), CAST(last_visit_at AS VARCHAR) \
                 FROM user_tracking ORDER BY total_visits DESC",
            ),
        };

        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(sql)?;
        let column_count = headers.len();
        let mapped = stmt.query_map([], |row| {
            let mut fields = Vec::with_capacity(column_count);
            for i in 0..column_count {
                fields.push(row.get::<_, String>(i)?);
            }
            Ok(fields)
        })?;

        let mut rows = Vec::new();
        for row in mapped {
            rows.push(row?);
        }
        Ok(ExportData { headers, rows })
    }
}
