//! Parsing of user-typed numeric fields.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a numeric field was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum ScalarError {
    /// The field was empty or whitespace only
    #[error("value is empty")]
    Empty,

    /// The text is not a number
    #[error("'{0}' is not a number")]
    NotANumber(String),

    /// The number is infinite or NaN
    #[error("'{0}' is not a finite number")]
    NotFinite(String),
}

/// Parse a finite real number from user input.
///
/// Surrounding whitespace is ignored. `inf`, `NaN` and anything else that does
/// not denote a finite `f64` is rejected.
///
/// # Examples
///
/// ```
/// use frontier_inputs::{ScalarError, parse_scalar};
///
/// assert_eq!(parse_scalar(" 0.05 "), Ok(0.05));
/// assert_eq!(parse_scalar(""), Err(ScalarError::Empty));
/// assert!(parse_scalar("five").is_err());
/// ```
pub fn parse_scalar(text: &str) -> Result<f64, ScalarError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ScalarError::Empty);
    }

    let value: f64 = trimmed
        .parse()
        .map_err(|_| ScalarError::NotANumber(trimmed.to_string()))?;

    if value.is_finite() {
        Ok(value)
    } else {
        Err(ScalarError::NotFinite(trimmed.to_string()))
    }
}
