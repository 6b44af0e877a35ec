use thiserror::Error;

/// Errors that can abort report generation.
///
/// Only data-shape problems are fatal. Selection edge cases (empty region
/// set, inverted or incomplete date ranges, zero-confirmed mortality rows)
/// are not errors: they degrade to empty output or non-finite values.
#[derive(Debug, Error)]
pub enum ReportError {
    /// A non-identity column in a source table could not be parsed as a
    /// calendar date.
    #[error("column {column:?} is not a valid date column")]
    MalformedDateColumn { column: String },

    /// A source table is missing the four identity columns.
    #[error("{path}: expected at least {expected} identity columns, found {found}")]
    MissingIdentityColumns {
        path: String,
        expected: usize,
        found: usize,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ReportError>;
