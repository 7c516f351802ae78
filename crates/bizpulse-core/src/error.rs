use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    /// Rejected before any delete is issued.
    #[error("invalid retention window: {0} months (allowed 1..={max})", max = crate::analytics::MAX_RETENTION_MONTHS)]
    InvalidRetentionWindow(u32),

    #[error("unknown export table: {0}")]
    UnknownExportTable(String),
}
