//! Per-asset expected returns entered by the user.

use crate::scalar::{ScalarError, parse_scalar};
use crate::selection::AssetSelection;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use thiserror::Error;

/// Problems found in a set of expected-return fields.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExpectedReturnError {
    /// The field for an asset is not a finite number
    #[error("invalid expected return for {asset}: {source}")]
    Invalid {
        /// Asset whose field was rejected
        asset: String,
        /// Why it was rejected
        #[source]
        source: ScalarError,
    },

    /// A value was given for an asset that is not selected
    #[error("expected return given for unselected asset {0}")]
    UnselectedAsset(String),

    /// The same asset was given twice
    #[error("expected return for {0} given more than once")]
    DuplicateAsset(String),

    /// A selected asset has no value
    #[error("no expected return for {0}")]
    Missing(String),
}

/// An expected return for every selected asset, in selection order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpectedReturnMap {
    entries: Vec<(String, f64)>,
}

impl ExpectedReturnMap {
    /// Parse raw text fields, one per asset.
    ///
    /// Every field is checked with [`parse_scalar`]; all invalid fields and
    /// all coverage problems are returned together.
    ///
    /// # Errors
    /// Returns the full list of [`ExpectedReturnError`]s if anything is wrong.
    pub fn parse<I, K, V>(
        fields: I,
        selected: &AssetSelection,
    ) -> Result<Self, Vec<ExpectedReturnError>>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: AsRef<str>,
    {
        Self::collect(
            fields
                .into_iter()
                .map(|(asset, text)| (asset.into(), parse_scalar(text.as_ref()))),
            selected,
        )
    }

    /// Build from already numeric values.
    ///
    /// # Errors
    /// Returns the full list of [`ExpectedReturnError`]s if a value is not
    /// finite or coverage of `selected` is not exact.
    pub fn new<I, K>(values: I, selected: &AssetSelection) -> Result<Self, Vec<ExpectedReturnError>>
    where
        I: IntoIterator<Item = (K, f64)>,
        K: Into<String>,
    {
        Self::collect(
            values.into_iter().map(|(asset, value)| {
                let checked = if value.is_finite() {
                    Ok(value)
                } else {
                    Err(ScalarError::NotFinite(value.to_string()))
                };
                (asset.into(), checked)
            }),
            selected,
        )
    }

    fn collect<I>(fields: I, selected: &AssetSelection) -> Result<Self, Vec<ExpectedReturnError>>
    where
        I: Iterator<Item = (String, Result<f64, ScalarError>)>,
    {
        let mut errors = Vec::new();
        let mut seen = HashSet::new();
        let mut values = BTreeMap::new();

        for (asset, parsed) in fields {
            if !selected.contains(&asset) {
                errors.push(ExpectedReturnError::UnselectedAsset(asset));
                continue;
            }
            if !seen.insert(asset.clone()) {
                errors.push(ExpectedReturnError::DuplicateAsset(asset));
                continue;
            }
            match parsed {
                Ok(value) => {
                    values.insert(asset, value);
                }
                Err(source) => errors.push(ExpectedReturnError::Invalid { asset, source }),
            }
        }

        let mut entries = Vec::with_capacity(selected.len());
        for asset in selected {
            if let Some(&value) = values.get(asset) {
                entries.push((asset.clone(), value));
            } else if !seen.contains(asset) {
                errors.push(ExpectedReturnError::Missing(asset.clone()));
            }
        }

        if errors.is_empty() {
            Ok(Self { entries })
        } else {
            tracing::debug!(count = errors.len(), "rejected expected returns");
            Err(errors)
        }
    }

    /// Expected return of an asset.
    pub fn get(&self, asset: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(a, _)| a == asset)
            .map(|&(_, v)| v)
    }

    /// `(asset, expected return)` pairs in selection order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(a, v)| (a.as_str(), *v))
    }

    /// Expected returns in selection order.
    pub fn values(&self) -> Vec<f64> {
        self.entries.iter().map(|&(_, v)| v).collect()
    }

    /// Number of assets.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
