use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, StatusCode},
    response::Response,
};
use chrono::Utc;

use bizpulse_core::analytics::{ExportData, ExportTable};

use crate::{error::AppError, state::AppState};

/// `GET /api/export/{table}`: download one log table as CSV.
///
/// Only the four retention-screen tables are exportable; `live_users` is
/// transient plumbing and is rejected along with unknown names.
#[tracing::instrument(skip(state))]
pub async fn export_table(
    State(state): State<Arc<AppState>>,
    Path(table): Path<String>,
) -> Result<Response, AppError> {
    let table = ExportTable::parse(&table).map_err(|e| AppError::BadRequest(e.to_string()))?;

    let data = state.analytics.export_rows(table).await?;
    let filename = format!(
        "{}-{}.csv",
        table.as_str(),
        Utc::now().format("%Y-%m-%d")
    );
    let csv_bytes =
        Bytes::from(build_csv(&data).map_err(|e| AppError::Internal(anyhow::anyhow!(e)))?);
    build_csv_response(&filename, csv_bytes)
}

/// Sanitize a CSV field value against formula injection.
///
/// Spreadsheet apps (Excel, Google Sheets, LibreOffice) interpret values that
/// begin with `=`, `+`, `-`, `@`, TAB, or CR as formula expressions. Prepending
/// a single quote (`'`) causes them to treat the value as a literal string.
fn sanitize_csv_field(val: &str) -> std::borrow::Cow<'_, str> {
    if val.starts_with(['=', '+', '-', '@', '\t', '\r']) {
        std::borrow::Cow::Owned(format!("'{val}"))
    } else {
        std::borrow::Cow::Borrowed(val)
    }
}

fn build_csv(data: &ExportData) -> anyhow::Result<Vec<u8>> {
    let mut wtr =
        csv::Writer::from_writer(Vec::with_capacity(data.rows.len().saturating_mul(128)));

    wtr.write_record(&data.headers)
        .map_err(|e| anyhow::anyhow!("csv write_record failed: {e}"))?;

    for row in &data.rows {
        let fields: Vec<_> = row.iter().map(|f| sanitize_csv_field(f)).collect();
        wtr.write_record(fields.iter().map(|f| f.as_ref()))
            .map_err(|e| anyhow::anyhow!("csv write_record failed: {e}"))?;
    }

    wtr.into_inner()
        .map_err(|e| anyhow::anyhow!("csv flush failed: {e}"))
}

fn build_csv_response(filename: &str, csv_bytes: Bytes) -> Result<Response, AppError> {
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/csv; charset=utf-8")
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{filename}\""),
        )
        .body(axum::body::Body::from(csv_bytes))
        .map_err(|e| AppError::Internal(anyhow::anyhow!("response build failed: {e}")))
}
