//! Sector classification of selected assets.

use crate::selection::AssetSelection;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Sector labels an asset can be assigned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Sector {
    /// Equities
    #[serde(rename = "Equities")]
    Equities,

    /// Corporate Bonds
    #[serde(rename = "Corporate Bonds")]
    CorporateBonds,

    /// High Yield
    #[serde(rename = "High Yield")]
    HighYield,

    /// Euro Government Core
    #[serde(rename = "Euro Government Core")]
    EuroGovernmentCore,

    /// Cash
    #[serde(rename = "Cash")]
    Cash,
}

impl Sector {
    /// Returns all sectors.
    pub const fn all() -> [Self; 5] {
        [
            Self::Equities,
            Self::CorporateBonds,
            Self::HighYield,
            Self::EuroGovernmentCore,
            Self::Cash,
        ]
    }

    /// Returns the full sector name.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Equities => "Equities",
            Self::CorporateBonds => "Corporate Bonds",
            Self::HighYield => "High Yield",
            Self::EuroGovernmentCore => "Euro Government Core",
            Self::Cash => "Cash",
        }
    }
}

impl fmt::Display for Sector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Sector {
    type Err = SectorError;

    /// Parse a sector from its name, ignoring case and surrounding whitespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::all()
            .into_iter()
            .find(|sector| sector.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| SectorError::UnknownLabel {
                asset: None,
                label: wanted.to_string(),
            })
    }
}

/// Problems found in a sector assignment.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SectorError {
    /// Label does not name a sector
    #[error("unknown sector '{label}'{}", asset_suffix(.asset))]
    UnknownLabel {
        /// Asset the label was given for, if known
        asset: Option<String>,
        /// Offending label
        label: String,
    },

    /// A sector was given for an asset that is not selected
    #[error("sector assigned to unselected asset {0}")]
    UnselectedAsset(String),

    /// The same asset was assigned twice
    #[error("asset {0} assigned more than once")]
    DuplicateAsset(String),

    /// A selected asset has no sector
    #[error("no sector assigned to {0}")]
    Missing(String),
}

fn asset_suffix(asset: &Option<String>) -> String {
    asset
        .as_ref()
        .map_or_else(String::new, |a| format!(" for {a}"))
}

/// A sector for every selected asset, in selection order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectorMap {
    assignments: Vec<(String, Sector)>,
}

impl SectorMap {
    /// Build a map from typed assignments.
    ///
    /// Every problem is reported: unselected assets, repeated assets and
    /// selected assets left without a sector.
    ///
    /// # Errors
    /// Returns the full list of [`SectorError`]s when coverage is not exact.
    pub fn new<I, K>(assignments: I, selected: &AssetSelection) -> Result<Self, Vec<SectorError>>
    where
        I: IntoIterator<Item = (K, Sector)>,
        K: Into<String>,
    {
        let mut errors = Vec::new();
        let mut by_asset: BTreeMap<String, Sector> = BTreeMap::new();

        for (asset, sector) in assignments {
            let asset = asset.into();
            if !selected.contains(&asset) {
                errors.push(SectorError::UnselectedAsset(asset));
            } else if by_asset.insert(asset.clone(), sector).is_some() {
                errors.push(SectorError::DuplicateAsset(asset));
            }
        }

        Self::finish(by_asset, selected, errors)
    }

    /// Build a map from free-text sector labels.
    ///
    /// # Errors
    /// Returns every unknown label together with every coverage problem.
    pub fn from_labels<I, K, V>(
        labels: I,
        selected: &AssetSelection,
    ) -> Result<Self, Vec<SectorError>>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: AsRef<str>,
    {
        let mut errors = Vec::new();
        let mut by_asset: BTreeMap<String, Sector> = BTreeMap::new();
        let mut seen = HashSet::new();

        for (asset, label) in labels {
            let asset = asset.into();
            if !selected.contains(&asset) {
                errors.push(SectorError::UnselectedAsset(asset));
                continue;
            }
            if !seen.insert(asset.clone()) {
                errors.push(SectorError::DuplicateAsset(asset));
                continue;
            }
            match label.as_ref().parse::<Sector>() {
                Ok(sector) => {
                    by_asset.insert(asset, sector);
                }
                Err(_) => errors.push(SectorError::UnknownLabel {
                    label: label.as_ref().trim().to_string(),
                    asset: Some(asset),
                }),
            }
        }

        // Assets with an unknown label were reported already
        let reported: HashSet<String> = seen;
        errors.extend(
            selected
                .iter()
                .filter(|a| !reported.contains(*a))
                .map(|a| SectorError::Missing(a.clone())),
        );

        if errors.is_empty() {
            Self::finish(by_asset, selected, errors)
        } else {
            Err(errors)
        }
    }

    fn finish(
        by_asset: BTreeMap<String, Sector>,
        selected: &AssetSelection,
        mut errors: Vec<SectorError>,
    ) -> Result<Self, Vec<SectorError>> {
        let mut assignments = Vec::with_capacity(selected.len());
        for asset in selected {
            match by_asset.get(asset) {
                Some(&sector) => assignments.push((asset.clone(), sector)),
                None => errors.push(SectorError::Missing(asset.clone())),
            }
        }

        if errors.is_empty() {
            Ok(Self { assignments })
        } else {
            Err(errors)
        }
    }

    /// Sector of an asset.
    pub fn get(&self, asset: &str) -> Option<Sector> {
        self.assignments
            .iter()
            .find(|(a, _)| a == asset)
            .map(|&(_, sector)| sector)
    }

    /// `(asset, sector)` pairs in selection order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Sector)> {
        self.assignments.iter().map(|(a, s)| (a.as_str(), *s))
    }

    /// Number of assets.
    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    /// Whether the map has no entries.
    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    /// Number of assets in each sector, omitting empty sectors.
    pub fn counts(&self) -> BTreeMap<Sector, usize> {
        let mut counts = BTreeMap::new();
        for (_, sector) in &self.assignments {
            *counts.entry(*sector).or_insert(0) += 1;
        }
        counts
    }

    /// Assets belonging to `sector`, in selection order.
    pub fn members(&self, sector: Sector) -> Vec<&str> {
        self.iter()
            .filter(|&(_, s)| s == sector)
            .map(|(a, _)| a)
            .collect()
    }
}
