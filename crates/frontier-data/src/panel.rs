//! Dated price panels.

use crate::error::{DataError, Result};
use chrono::NaiveDate;
use ndarray::{Array2, ArrayView1, Axis};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;

/// A dense panel of asset prices keyed by date.
///
/// Rows are dates in strictly increasing order, columns are assets. A missing
/// price is stored as `NaN`. Missing and non-positive prices are accepted here;
/// they only make the affected log returns undefined.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PricePanel {
    dates: Vec<NaiveDate>,
    assets: Vec<String>,
    prices: Array2<f64>,
}

impl PricePanel {
    /// Minimum number of rows a panel must hold (one return needs two prices).
    pub const MIN_ROWS: usize = 2;

    /// Create a panel from its dates, asset identifiers and a `dates x assets` price matrix.
    ///
    /// # Errors
    /// Returns an error if the panel has fewer than two rows, the matrix shape
    /// disagrees with the labels, an asset identifier is empty or repeated, or
    /// the dates are not strictly increasing.
    pub fn new(dates: Vec<NaiveDate>, assets: Vec<String>, prices: Array2<f64>) -> Result<Self> {
        let (n_rows, n_cols) = prices.dim();

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
        if n_rows < Self::MIN_ROWS {
            return Err(DataError::InsufficientData {
                required: Self::MIN_ROWS,
                actual: n_rows,
            });
        }

        let mut seen = HashSet::with_capacity(assets.len());
        for (idx, asset) in assets.iter().enumerate() {
            if asset.trim().is_empty() {
                return Err(DataError::EmptyAsset(idx));
            }
            if !seen.insert(asset.as_str()) {
                return Err(DataError::DuplicateAsset(asset.clone()));
            }
        }

        for pair in dates.windows(2) {
            if pair[0] == pair[1] {
                return Err(DataError::DuplicateDate(pair[0]));
            }
            if pair[0] > pair[1] {
                return Err(DataError::UnorderedDates {
                    previous: pair[0],
                    next: pair[1],
                });
            }
        }

        Ok(Self {
            dates,
            assets,
            prices,
        })
    }

    /// Dates, oldest first.
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Asset identifiers in column order.
    pub fn assets(&self) -> &[String] {
        &self.assets
    }

    /// The `dates x assets` price matrix.
    pub const fn prices(&self) -> &Array2<f64> {
        &self.prices
    }

    /// Number of dated rows.
    pub fn n_rows(&self) -> usize {
        self.dates.len()
    }

    /// Number of assets.
    pub fn n_assets(&self) -> usize {
        self.assets.len()
    }

    /// First and last date covered by the panel.
    pub fn date_range(&self) -> (NaiveDate, NaiveDate) {
        // MIN_ROWS guarantees both ends exist
        (self.dates[0], self.dates[self.dates.len() - 1])
    }

    /// Column index of an asset, if present.
    pub fn position(&self, asset: &str) -> Option<usize> {
        self.assets.iter().position(|a| a == asset)
    }

    /// Whether the panel carries a column for `asset`.
    pub fn contains(&self, asset: &str) -> bool {
        self.position(asset).is_some()
    }

    /// Price history of a single asset.
    pub fn column(&self, asset: &str) -> Option<ArrayView1<'_, f64>> {
        self.position(asset).map(|idx| self.prices.column(idx))
    }

    /// Restrict the panel to `assets`, in the given order.
    ///
    /// # Errors
    /// Returns [`DataError::UnknownAsset`] for an identifier with no column,
    /// and the usual construction errors for an empty or repeated selection.
    pub fn select<S: AsRef<str>>(&self, assets: &[S]) -> Result<Self> {
        let indices = assets
            .iter()
            .map(|asset| {
                let asset = asset.as_ref();
                self.position(asset)
                    .ok_or_else(|| DataError::UnknownAsset(asset.to_string()))
            })
            .collect::<Result<Vec<_>>>()?;

        let prices = self.prices.select(Axis(1), &indices);
        let names = indices.iter().map(|&i| self.assets[i].clone()).collect();

        Self::new(self.dates.clone(), names, prices)
    }
}

#[derive(Deserialize)]
struct PricePanelFields {
    dates: Vec<NaiveDate>,
    assets: Vec<String>,
    prices: Array2<f64>,
}

impl<'de> Deserialize<'de> for PricePanel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let fields = PricePanelFields::deserialize(deserializer)?;
        Self::new(fields.dates, fields.assets, fields.prices).map_err(serde::de::Error::custom)
    }
}
