//! Error taxonomy for report generation.
//!
//! Recoverable conditions (missing data, missing markers, short tables) are
//! handled where they occur and only logged; the variants still exist so the
//! logs and per-table outcomes carry a typed reason.

use std::path::PathBuf;

use polars::prelude::PolarsError;

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("no data available for section '{section}': {reason}")]
    DataUnavailable { section: String, reason: String },

    #[error("marker '{0}' not found in any table")]
    MarkerNotFound(String),

    #[error("table for '{marker}' has {available} columns, mapping needs column {required}")]
    ColumnMismatch {
        marker: String,
        available: usize,
        required: usize,
    },

    #[error("table has no header row")]
    MissingHeader,

    #[error("table ended with {actual} rows, expected {expected}")]
    RowCountMismatch { expected: usize, actual: usize },

    #[error("{field} = {value} is outside the 1-5 scale")]
    ScoreOutOfRange { field: &'static str, value: i64 },

    #[error("invalid value for field '{field}': {value}")]
    InvalidField { field: String, value: String },

    #[error("injection into table '{marker}' failed: {reason}")]
    InjectionFailure { marker: String, reason: String },

    #[error("template not found: {}", path.display())]
    TemplateMissing { path: PathBuf },

    #[error("template syntax error: {0}")]
    TemplateSyntax(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] PolarsError),
}

pub type ReportResult<T> = Result<T, ReportError>;

impl ReportError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ReportError::Io {
            path: path.into(),
            source,
        }
    }
}
