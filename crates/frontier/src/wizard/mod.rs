//! The step-by-step input wizard.
//!
//! [`WizardState`] carries everything entered so far. Each operation belongs
//! to exactly one [`WizardStep`]; calling it in another step fails with
//! [`WizardError::OutOfOrder`]. A rejected submission leaves the wizard on the
//! same step so the input can be corrected and submitted again.

pub mod step;

pub use step::WizardStep;

use crate::error::WizardError;
use crate::handoff::OptimizationInputs;
use frontier_data::{PricePanel, compute_log_returns, load_prices_csv};
use frontier_inputs::{
    AssetSelection, Constraint, ConstraintDraft, ConstraintSet, ConstraintSetState,
    ExpectedReturnMap, SectorMap,
};
use frontier_output::ReviewSummary;
use frontier_risk::{EwmaConfig, EwmaCovarianceEstimator};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default number of constraint slots offered to the user.
pub const DEFAULT_MAX_CONSTRAINTS: usize = 3;

const fn default_max_constraints() -> usize {
    DEFAULT_MAX_CONSTRAINTS
}

const fn default_min_observations() -> usize {
    1
}

/// Wizard settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WizardConfig {
    /// Largest number of constraint drafts accepted in one submission
    #[serde(default = "default_max_constraints")]
    pub max_constraints: usize,

    /// Fewest return rows the covariance may be estimated from
    #[serde(default = "default_min_observations")]
    pub min_observations: usize,
}

impl Default for WizardConfig {
    fn default() -> Self {
        Self {
            max_constraints: default_max_constraints(),
            min_observations: default_min_observations(),
        }
    }
}

/// State of one run through the wizard.
#[derive(Debug, Clone, Default)]
pub struct WizardState {
    config: WizardConfig,
    step: WizardStep,
    panel: Option<PricePanel>,
    selection: Option<AssetSelection>,
    expected_returns: Option<ExpectedReturnMap>,
    sectors: Option<SectorMap>,
    constraints: ConstraintSet,
    inputs: Option<OptimizationInputs>,
}

impl WizardState {
    /// A fresh wizard waiting for prices.
    pub fn new(config: WizardConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Current step.
    pub const fn step(&self) -> WizardStep {
        self.step
    }

    /// Settings in use.
    pub const fn config(&self) -> &WizardConfig {
        &self.config
    }

    /// Loaded price history.
    pub const fn panel(&self) -> Option<&PricePanel> {
        self.panel.as_ref()
    }

    /// Selected assets.
    pub const fn selection(&self) -> Option<&AssetSelection> {
        self.selection.as_ref()
    }

    /// Accepted expected returns.
    pub const fn expected_returns(&self) -> Option<&ExpectedReturnMap> {
        self.expected_returns.as_ref()
    }

    /// Accepted sector mapping.
    pub const fn sectors(&self) -> Option<&SectorMap> {
        self.sectors.as_ref()
    }

    /// Constraint drafts and their validation state.
    pub const fn constraint_set(&self) -> &ConstraintSet {
        &self.constraints
    }

    /// Optimizer inputs, once the wizard is complete.
    pub const fn inputs(&self) -> Option<&OptimizationInputs> {
        self.inputs.as_ref()
    }

    /// Consume the wizard, returning the optimizer inputs if it completed.
    pub fn into_inputs(self) -> Option<OptimizationInputs> {
        self.inputs
    }

    fn ensure_step(&self, expected: WizardStep) -> Result<(), WizardError> {
        if self.step == expected {
            Ok(())
        } else {
            Err(WizardError::OutOfOrder {
                expected,
                actual: self.step,
            })
        }
    }

    fn advance(&mut self) {
        if let Some(next) = self.step.next() {
            tracing::debug!(from = %self.step, to = %next, "wizard step");
            self.step = next;
        }
    }

    fn missing(what: &str) -> WizardError {
        WizardError::Inconsistent(format!("{what} missing at this step"))
    }

    /// Step 1: accept a price history.
    ///
    /// # Errors
    /// Returns [`WizardError::OutOfOrder`] outside [`WizardStep::Upload`].
    pub fn load_panel(&mut self, panel: PricePanel) -> Result<(), WizardError> {
        self.ensure_step(WizardStep::Upload)?;
        tracing::info!(
            rows = panel.n_rows(),
            assets = panel.n_assets(),
            "price history loaded"
        );
        self.panel = Some(panel);
        self.advance();
        Ok(())
    }

    /// Step 1, reading the price history from a CSV file.
    ///
    /// # Errors
    /// Returns [`WizardError::Data`] if the file cannot be loaded; the wizard
    /// stays on [`WizardStep::Upload`].
    pub fn load_csv(&mut self, path: impl AsRef<Path>) -> Result<(), WizardError> {
        self.ensure_step(WizardStep::Upload)?;
        let panel = load_prices_csv(path)?;
        self.load_panel(panel)
    }

    /// Step 2: choose assets from the loaded history, in the order given.
    ///
    /// # Errors
    /// Returns [`WizardError::Selection`] if the selection is empty, repeats
    /// an asset or names an asset not in the history.
    pub fn select_assets<I, S>(&mut self, assets: I) -> Result<&AssetSelection, WizardError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ensure_step(WizardStep::SelectAssets)?;
        let panel = self.panel.as_ref().ok_or_else(|| Self::missing("price history"))?;
        let selection = AssetSelection::from_available(assets, panel.assets())?;

        tracing::debug!(assets = ?selection.assets(), "assets selected");
        self.advance();
        Ok(self.selection.insert(selection))
    }

    /// Step 3: enter one expected return per selected asset as text.
    ///
    /// # Errors
    /// Returns [`WizardError::ExpectedReturns`] listing every invalid or
    /// missing field.
    pub fn submit_expected_returns<I, K, V>(
        &mut self,
        fields: I,
    ) -> Result<&ExpectedReturnMap, WizardError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: AsRef<str>,
    {
        self.ensure_step(WizardStep::ExpectedReturns)?;
        let selection = self.selection.as_ref().ok_or_else(|| Self::missing("selection"))?;
        let map =
            ExpectedReturnMap::parse(fields, selection).map_err(WizardError::ExpectedReturns)?;

        self.advance();
        Ok(self.expected_returns.insert(map))
    }

    /// Step 4: confirm the expected returns summary.
    ///
    /// # Errors
    /// Returns [`WizardError::OutOfOrder`] outside
    /// [`WizardStep::ExpectedReturnsSummary`].
    pub fn confirm_expected_returns(&mut self) -> Result<(), WizardError> {
        self.ensure_step(WizardStep::ExpectedReturnsSummary)?;
        self.advance();
        Ok(())
    }

    /// Step 5: assign a sector label to every selected asset.
    ///
    /// # Errors
    /// Returns [`WizardError::Sectors`] listing every unknown label and every
    /// asset left unassigned.
    pub fn submit_sectors<I, K, V>(&mut self, labels: I) -> Result<&SectorMap, WizardError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: AsRef<str>,
    {
        self.ensure_step(WizardStep::SectorMapping)?;
        let selection = self.selection.as_ref().ok_or_else(|| Self::missing("selection"))?;
        let map = SectorMap::from_labels(labels, selection).map_err(WizardError::Sectors)?;

        self.advance();
        Ok(self.sectors.insert(map))
    }

    /// Step 6: confirm the sector summary.
    ///
    /// # Errors
    /// Returns [`WizardError::OutOfOrder`] outside [`WizardStep::SectorSummary`].
    pub fn confirm_sectors(&mut self) -> Result<(), WizardError> {
        self.ensure_step(WizardStep::SectorSummary)?;
        self.advance();
        Ok(())
    }

    /// Step 7: declare constraints. Blank drafts are ignored.
    ///
    /// All drafts are validated together.
    ///
    /// # Errors
    /// Returns [`WizardError::TooManyConstraints`] if more drafts than
    /// [`WizardConfig::max_constraints`] are given, or
    /// [`WizardError::Constraints`] with every invalid draft.
    pub fn submit_constraints(
        &mut self,
        drafts: Vec<ConstraintDraft>,
    ) -> Result<&[Constraint], WizardError> {
        self.ensure_step(WizardStep::Constraints)?;
        if drafts.len() > self.config.max_constraints {
            return Err(WizardError::TooManyConstraints {
                max: self.config.max_constraints,
                given: drafts.len(),
            });
        }
        let selection = self.selection.as_ref().ok_or_else(|| Self::missing("selection"))?;

        let mut set = ConstraintSet::with_drafts(drafts);
        if let ConstraintSetState::Invalid(errors) = set.validate(selection) {
            let errors = errors.clone();
            self.constraints = set;
            return Err(WizardError::Constraints(errors));
        }

        self.constraints = set;
        self.advance();
        Ok(self.constraints.constraints().unwrap_or_default())
    }

    /// Step 8: summarize everything entered.
    ///
    /// # Errors
    /// Returns [`WizardError::OutOfOrder`] outside [`WizardStep::Review`].
    pub fn review(&self) -> Result<ReviewSummary, WizardError> {
        self.ensure_step(WizardStep::Review)?;
        let (selection, expected_returns, sectors) = self.accepted()?;
        let mut summary = ReviewSummary::new(
            selection,
            expected_returns,
            sectors,
            self.constraints.constraints().unwrap_or_default(),
        );
        if let Some(panel) = &self.panel {
            summary.period = Some(panel.date_range());
        }
        Ok(summary)
    }

    /// Step 8: estimate the covariance with `decay` and produce the
    /// optimizer inputs.
    ///
    /// Log returns are computed over the selected assets only, so a gap in an
    /// unselected column does not cost any rows.
    ///
    /// # Errors
    /// Returns [`WizardError::Covariance`] for a decay outside (0, 1) or too
    /// few return rows, and [`WizardError::Data`] if no return row is usable.
    /// The wizard stays on [`WizardStep::Review`] on error.
    pub fn finish(&mut self, decay: f64) -> Result<&OptimizationInputs, WizardError> {
        self.ensure_step(WizardStep::Review)?;
        let (selection, expected_returns, sectors) = self.accepted()?;
        let panel = self.panel.as_ref().ok_or_else(|| Self::missing("price history"))?;

        let estimator = EwmaCovarianceEstimator::new(
            EwmaConfig::new(decay).with_min_observations(self.config.min_observations),
        )?;
        let returns = compute_log_returns(&panel.select(selection.assets())?)?;
        let covariance = estimator.estimate_returns(&returns)?;

        tracing::info!(
            assets = selection.len(),
            observations = returns.n_rows(),
            decay,
            half_life = estimator.half_life(),
            "optimizer inputs ready"
        );

        let inputs = OptimizationInputs::new(
            selection.clone(),
            expected_returns.clone(),
            covariance,
            sectors.clone(),
            self.constraints.constraints().unwrap_or_default().to_vec(),
            decay,
            returns.n_rows(),
            panel.date_range(),
        )?;

        self.advance();
        Ok(self.inputs.insert(inputs))
    }

    fn accepted(&self) -> Result<(&AssetSelection, &ExpectedReturnMap, &SectorMap), WizardError> {
        Ok((
            self.selection.as_ref().ok_or_else(|| Self::missing("selection"))?,
            self.expected_returns
                .as_ref()
                .ok_or_else(|| Self::missing("expected returns"))?,
            self.sectors.as_ref().ok_or_else(|| Self::missing("sector mapping"))?,
        ))
    }
}
