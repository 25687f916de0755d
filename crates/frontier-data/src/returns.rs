//! Log-return computation.
//!
//! For consecutive rows t-1 and t of a [`PricePanel`] the return of asset d is
//!
//! r[t, d] = ln(p[t, d] / p[t-1, d])
//!
//! The return is undefined when either price is missing or non-positive,
//! even when both are negative and their ratio is positive. A date is kept
//! only when every asset's return on it is defined, so all assets are always
//! compared over the same set of dates.

use crate::error::{DataError, Result};
use crate::panel::PricePanel;
use chrono::NaiveDate;
use ndarray::{Array2, ArrayView1};
use serde::{Deserialize, Deserializer, Serialize};

/// Log returns with one row per kept date and one column per asset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReturnMatrix {
    dates: Vec<NaiveDate>,
    assets: Vec<String>,
    values: Array2<f64>,
}

impl ReturnMatrix {
    /// Build a return matrix from already computed values.
    ///
    /// # Errors
    /// Returns an error if the shape disagrees with the labels or any entry
    /// is not finite.
    pub fn new(dates: Vec<NaiveDate>, assets: Vec<String>, values: Array2<f64>) -> Result<Self> {
        let (n_rows, n_cols) = values.dim();
        if n_rows != dates.len() {
            return Err(DataError::DimensionMismatch {
                expected: dates.len(),
                actual: n_rows,
            });
        }
        if n_cols != assets.len() {
            return Err(DataError::DimensionMismatch {
                expected: assets.len(),
                actual: n_cols,
            });
        }
        if let Some(((row, col), value)) = values.indexed_iter().find(|(_, v)| !v.is_finite()) {
            return Err(DataError::Parse {
                line: row as u64 + 1,
                reason: format!("non-finite return {value} for {}", assets[col]),
            });
        }

        Ok(Self {
            dates,
            assets,
            values,
        })
    }

    /// Date of the later price for each row.
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Asset identifiers in column order.
    pub fn assets(&self) -> &[String] {
        &self.assets
    }

    /// The `rows x assets` matrix of log returns.
    pub const fn values(&self) -> &Array2<f64> {
        &self.values
    }

    /// Number of return rows.
    pub fn n_rows(&self) -> usize {
        self.values.nrows()
    }

    /// Number of assets.
    pub fn n_assets(&self) -> usize {
        self.values.ncols()
    }

    /// Return history of a single asset.
    pub fn column(&self, asset: &str) -> Option<ArrayView1<'_, f64>> {
        self.assets
            .iter()
            .position(|a| a == asset)
            .map(|idx| self.values.column(idx))
    }

    /// Consume the matrix, returning the raw values.
    pub fn into_values(self) -> Array2<f64> {
        self.values
    }
}

#[derive(Deserialize)]
struct ReturnMatrixFields {
    dates: Vec<NaiveDate>,
    assets: Vec<String>,
    values: Array2<f64>,
}

impl<'de> Deserialize<'de> for ReturnMatrix {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let fields = ReturnMatrixFields::deserialize(deserializer)?;
        Self::new(fields.dates, fields.assets, fields.values).map_err(serde::de::Error::custom)
    }
}

/// Compute log returns from a price panel.
///
/// Rows with any undefined return are dropped as a whole.
///
/// # Errors
/// Returns [`DataError::InsufficientData`] if no valid return row remains.
pub fn compute_log_returns(panel: &PricePanel) -> Result<ReturnMatrix> {
    let prices = panel.prices();
    let n_assets = panel.n_assets();

    let mut dates = Vec::with_capacity(panel.n_rows().saturating_sub(1));
    let mut flat = Vec::with_capacity(dates.capacity() * n_assets);
    let mut dropped = 0usize;

    for t in 1..panel.n_rows() {
        let row: Option<Vec<f64>> = prices
            .row(t)
            .iter()
            .zip(prices.row(t - 1).iter())
            .map(|(&curr, &prev)| log_return(prev, curr))
            .collect();

        if let Some(row) = row {
            dates.push(panel.dates()[t]);
            flat.extend(row);
        } else {
            dropped += 1;
            tracing::debug!(date = %panel.dates()[t], "dropping return row with undefined values");
        }
    }

    if dropped > 0 {
        tracing::warn!(
            dropped,
            kept = dates.len(),
            "dropped return rows with missing or non-positive prices"
        );
    }

    if dates.is_empty() {
        return Err(DataError::InsufficientData {
            required: 1,
            actual: 0,
        });
    }

    let values = Array2::from_shape_vec((dates.len(), n_assets), flat).map_err(|e| {
        DataError::Parse {
            line: 0,
            reason: e.to_string(),
        }
    })?;

    Ok(ReturnMatrix {
        dates,
        assets: panel.assets().to_vec(),
        values,
    })
}

/// `ln(curr / prev)`, or `None` unless both prices are positive and the
/// result is finite. `NaN` fails the positivity checks.
fn log_return(prev: f64, curr: f64) -> Option<f64> {
    if prev > 0.0 && curr > 0.0 {
        Some((curr / prev).ln()).filter(|r| r.is_finite())
    } else {
        None
    }
}
