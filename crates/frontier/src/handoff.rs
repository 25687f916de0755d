//! The finished set of optimizer inputs.

use crate::error::WizardError;
use chrono::NaiveDate;
use frontier_inputs::{AssetSelection, Constraint, ExpectedReturnMap, Sector, SectorMap};
use frontier_output::{ExportError, ExportFormat, Exporter, MatrixExport, to_json_string};
use frontier_risk::CovarianceMatrix;
use serde::Serialize;

/// Everything a mean-variance optimizer needs, aligned on one asset order.
///
/// Row and column `i` of the covariance, element `i` of the expected returns
/// and sector `i` all refer to asset `i`.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizationInputs {
    selection: AssetSelection,
    expected_returns: ExpectedReturnMap,
    covariance: CovarianceMatrix,
    sectors: SectorMap,
    constraints: Vec<Constraint>,
    decay: f64,
    observations: usize,
    period: (NaiveDate, NaiveDate),
}

impl OptimizationInputs {
    /// Bundle validated pieces into optimizer inputs.
    ///
    /// # Errors
    /// Returns [`WizardError::Inconsistent`] if the covariance, expected
    /// returns or sectors are not laid out on the selection's asset order.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        selection: AssetSelection,
        expected_returns: ExpectedReturnMap,
        covariance: CovarianceMatrix,
        sectors: SectorMap,
        constraints: Vec<Constraint>,
        decay: f64,
        observations: usize,
        period: (NaiveDate, NaiveDate),
    ) -> Result<Self, WizardError> {
        let order = selection.assets();
        if covariance.assets() != order {
            return Err(WizardError::Inconsistent(
                "covariance assets differ from the selection".to_string(),
            ));
        }
        if !expected_returns.iter().map(|(a, _)| a).eq(order.iter().map(String::as_str)) {
            return Err(WizardError::Inconsistent(
                "expected returns do not follow the selection".to_string(),
            ));
        }
        if !sectors.iter().map(|(a, _)| a).eq(order.iter().map(String::as_str)) {
            return Err(WizardError::Inconsistent(
                "sectors do not follow the selection".to_string(),
            ));
        }

        Ok(Self {
            selection,
            expected_returns,
            covariance,
            sectors,
            constraints,
            decay,
            observations,
            period,
        })
    }

    /// Asset identifiers in optimizer order.
    pub fn assets(&self) -> &[String] {
        self.selection.assets()
    }

    /// Expected returns in asset order.
    pub fn expected_returns(&self) -> Vec<f64> {
        self.expected_returns.values()
    }

    /// Expected returns keyed by asset.
    pub const fn expected_return_map(&self) -> &ExpectedReturnMap {
        &self.expected_returns
    }

    /// EWMA covariance of log returns.
    pub const fn covariance(&self) -> &CovarianceMatrix {
        &self.covariance
    }

    /// Sector of every asset.
    pub const fn sectors(&self) -> &SectorMap {
        &self.sectors
    }

    /// Validated linear constraints.
    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// Decay factor the covariance was estimated with.
    pub const fn decay(&self) -> f64 {
        self.decay
    }

    /// Number of return observations behind the covariance.
    pub const fn observations(&self) -> usize {
        self.observations
    }

    /// First and last price date.
    pub const fn period(&self) -> (NaiveDate, NaiveDate) {
        self.period
    }
}

/// Serialized form of [`OptimizationInputs`].
#[derive(Debug, Serialize)]
struct Handoff<'a> {
    assets: &'a [String],
    expected_returns: Vec<f64>,
    covariance: Vec<Vec<f64>>,
    sectors: Vec<Sector>,
    constraints: &'a [Constraint],
    decay: f64,
    observations: usize,
    start: NaiveDate,
    end: NaiveDate,
}

impl Exporter for OptimizationInputs {
    /// JSON only; the covariance and expected returns have their own CSV
    /// exporters.
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        if !format.is_json() {
            return Err(ExportError::InvalidFormat(
                "optimizer inputs export as json or pretty-json; \
                 export the covariance or expected returns for CSV"
                    .to_string(),
            ));
        }

        let handoff = Handoff {
            assets: self.assets(),
            expected_returns: self.expected_returns(),
            covariance: MatrixExport::covariance(&self.covariance).rows,
            sectors: self.sectors.iter().map(|(_, s)| s).collect(),
            constraints: &self.constraints,
            decay: self.decay,
            observations: self.observations,
            start: self.period.0,
            end: self.period.1,
        };
        to_json_string(&handoff, format)
    }
}
