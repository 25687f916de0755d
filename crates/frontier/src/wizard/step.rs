//! Steps of the input wizard.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A step of the wizard, in the order the user goes through them.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    /// Waiting for a price history
    #[default]
    Upload,
    /// Choosing assets from the loaded history
    SelectAssets,
    /// Entering an expected return per asset
    ExpectedReturns,
    /// Confirming the expected returns
    ExpectedReturnsSummary,
    /// Assigning a sector to each asset
    SectorMapping,
    /// Confirming the sector assignment
    SectorSummary,
    /// Declaring linear constraints
    Constraints,
    /// Reviewing everything before finishing
    Review,
    /// Optimizer inputs have been produced
    Complete,
}

impl WizardStep {
    /// Returns all steps in order.
    pub const fn all() -> [Self; 9] {
        [
            Self::Upload,
            Self::SelectAssets,
            Self::ExpectedReturns,
            Self::ExpectedReturnsSummary,
            Self::SectorMapping,
            Self::SectorSummary,
            Self::Constraints,
            Self::Review,
            Self::Complete,
        ]
    }

    /// The step that follows this one, if any.
    pub const fn next(&self) -> Option<Self> {
        match self {
            Self::Upload => Some(Self::SelectAssets),
            Self::SelectAssets => Some(Self::ExpectedReturns),
            Self::ExpectedReturns => Some(Self::ExpectedReturnsSummary),
            Self::ExpectedReturnsSummary => Some(Self::SectorMapping),
            Self::SectorMapping => Some(Self::SectorSummary),
            Self::SectorSummary => Some(Self::Constraints),
            Self::Constraints => Some(Self::Review),
            Self::Review => Some(Self::Complete),
            Self::Complete => None,
        }
    }

    /// Human-readable step title.
    pub const fn title(&self) -> &'static str {
        match self {
            Self::Upload => "Upload prices",
            Self::SelectAssets => "Select assets",
            Self::ExpectedReturns => "Expected returns",
            Self::ExpectedReturnsSummary => "Expected returns summary",
            Self::SectorMapping => "Sector mapping",
            Self::SectorSummary => "Sector summary",
            Self::Constraints => "Constraints",
            Self::Review => "Review and confirm",
            Self::Complete => "Complete",
        }
    }

    /// One-based position in the sequence.
    pub const fn number(&self) -> usize {
        *self as usize + 1
    }
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}
