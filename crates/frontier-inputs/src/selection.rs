//! The set of assets chosen for an optimization run.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// Errors raised when building an [`AssetSelection`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    /// Nothing was selected
    #[error("please select at least one asset")]
    Empty,

    /// An identifier was blank
    #[error("asset identifier at position {0} is empty")]
    BlankIdentifier(usize),

    /// An identifier was selected twice
    #[error("asset selected more than once: {0}")]
    Duplicate(String),

    /// Selected identifiers that are not available
    #[error("unknown assets: {}", .0.join(", "))]
    Unknown(Vec<String>),
}

/// An ordered, duplicate-free, non-empty list of asset identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct AssetSelection {
    assets: Vec<String>,
}

impl AssetSelection {
    /// Build a selection, keeping the given order.
    ///
    /// # Errors
    /// Returns an error if the selection is empty, contains a blank
    /// identifier, or names an asset twice.
    pub fn new<I, S>(assets: I) -> Result<Self, SelectionError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let assets: Vec<String> = assets.into_iter().map(Into::into).collect();
        if assets.is_empty() {
            return Err(SelectionError::Empty);
        }

        let mut seen = HashSet::with_capacity(assets.len());
        for (idx, asset) in assets.iter().enumerate() {
            if asset.trim().is_empty() {
                return Err(SelectionError::BlankIdentifier(idx));
            }
            if !seen.insert(asset.as_str()) {
                return Err(SelectionError::Duplicate(asset.clone()));
            }
        }

        Ok(Self { assets })
    }

    /// Build a selection whose every asset must appear in `available`.
    ///
    /// # Errors
    /// Returns [`SelectionError::Unknown`] listing every unavailable asset, or
    /// any error of [`AssetSelection::new`].
    pub fn from_available<I, S>(assets: I, available: &[String]) -> Result<Self, SelectionError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let selection = Self::new(assets)?;
        let unknown: Vec<String> = selection
            .assets
            .iter()
            .filter(|a| !available.contains(a))
            .cloned()
            .collect();

        if unknown.is_empty() {
            Ok(selection)
        } else {
            Err(SelectionError::Unknown(unknown))
        }
    }

    /// Whether `asset` is selected.
    pub fn contains(&self, asset: &str) -> bool {
        self.assets.iter().any(|a| a == asset)
    }

    /// Selected identifiers in selection order.
    pub fn assets(&self) -> &[String] {
        &self.assets
    }

    /// Iterate over the selected identifiers.
    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.assets.iter()
    }

    /// Number of selected assets (never zero).
    pub fn len(&self) -> usize {
        self.assets.len()
    }

    /// Always `false`; a selection holds at least one asset.
    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}

impl<'a> IntoIterator for &'a AssetSelection {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl TryFrom<Vec<String>> for AssetSelection {
    type Error = SelectionError;

    fn try_from(assets: Vec<String>) -> Result<Self, Self::Error> {
        Self::new(assets)
    }
}

impl From<AssetSelection> for Vec<String> {
    fn from(selection: AssetSelection) -> Self {
        selection.assets
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_keeps_order() {
        let s = AssetSelection::new(["MSFT", "AAPL"]).unwrap();
        assert_eq!(s.assets(), ["MSFT".to_string(), "AAPL".to_string()]);
        assert!(s.contains("AAPL"));
        assert!(!s.contains("TSLA"));
        assert_eq!(s.len(), 2);
    }

    #[test]
    fn test_empty_selection() {
        let err = AssetSelection::new(Vec::<String>::new()).unwrap_err();
        assert_eq!(err, SelectionError::Empty);
        assert_eq!(err.to_string(), "please select at least one asset");
    }

    #[test]
    fn test_duplicate_and_blank() {
        assert_eq!(
            AssetSelection::new(["A", "B", "A"]).unwrap_err(),
            SelectionError::Duplicate("A".to_string())
        );
        assert_eq!(
            AssetSelection::new(["A", " "]).unwrap_err(),
            SelectionError::BlankIdentifier(1)
        );
    }

    #[test]
    fn test_from_available_lists_all_unknown() {
        let available = vec!["A".to_string(), "B".to_string()];
        let err = AssetSelection::from_available(["A", "X", "Y"], &available).unwrap_err();
        assert_eq!(
            err,
            SelectionError::Unknown(vec!["X".to_string(), "Y".to_string()])
        );
        assert_eq!(err.to_string(), "unknown assets: X, Y");
    }

    #[test]
    fn test_serde_validates() {
        let ok: AssetSelection = serde_json::from_str(r#"["A","B"]"#).unwrap();
        assert_eq!(ok.len(), 2);
        assert!(serde_json::from_str::<AssetSelection>("[]").is_err());
    }
}
