//! Error types for data operations.

use thiserror::Error;

/// Result type for data operations.
pub type Result<T> = std::result::Result<T, DataError>;

/// Errors that can occur during data operations.
#[derive(Debug, Error)]
pub enum DataError {
    /// Not enough valid rows to compute the requested quantity
    #[error("Insufficient data: need at least {required} rows, got {actual}")]
    InsufficientData {
        /// Minimum number of rows required
        required: usize,
        /// Rows actually available
        actual: usize,
    },

    /// Panel shape does not match its labels
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected dimension
        expected: usize,
        /// Actual dimension
        actual: usize,
    },

    /// Asset identifier appears more than once
    #[error("Duplicate asset: {0}")]
    DuplicateAsset(String),

    /// Asset identifier is empty
    #[error("Empty asset identifier in column {0}")]
    EmptyAsset(usize),

    /// Asset identifier not present in the panel
    #[error("Unknown asset: {0}")]
    UnknownAsset(String),

    /// The same date appears on more than one row
    #[error("Duplicate date: {0}")]
    DuplicateDate(chrono::NaiveDate),

    /// Dates are not strictly increasing
    #[error("Dates out of order: {previous} is not before {next}")]
    UnorderedDates {
        /// Earlier row's date
        previous: chrono::NaiveDate,
        /// Later row's date
        next: chrono::NaiveDate,
    },

    /// Data parsing error
    #[error("Data parsing error on line {line}: {reason}")]
    Parse {
        /// 1-based line number in the source file
        line: u64,
        /// What went wrong
        reason: String,
    },

    /// CSV reader error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
