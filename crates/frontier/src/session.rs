//! Non-interactive wizard runs described by a JSON session file.
//!
//! A session records the answers a user would give at each step:
//!
//! ```json
//! {
//!   "prices": "prices.csv",
//!   "assets": ["SPY", "LQD"],
//!   "expected_returns": { "SPY": "0.07", "LQD": 0.04 },
//!   "sectors": { "SPY": "Equities", "LQD": "Corporate Bonds" },
//!   "constraints": [{ "left": "LQD", "relation": ">=", "right": "SPY" }],
//!   "decay": 0.94
//! }
//! ```
//!
//! A relative `prices` path is resolved against the session file's directory.

use crate::error::WizardError;
use crate::handoff::OptimizationInputs;
use crate::wizard::{WizardConfig, WizardState};
use frontier_inputs::ConstraintDraft;
use frontier_output::ReviewSummary;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while loading or running a session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The session file could not be read
    #[error("cannot read session {path}: {source}")]
    Io {
        /// Session file path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// The session file is not valid JSON for a session
    #[error("invalid session file: {0}")]
    Json(#[from] serde_json::Error),

    /// A wizard step rejected the session's answers
    #[error(transparent)]
    Wizard(#[from] WizardError),
}

/// A field typed by the user, given either as text or as a JSON number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawField {
    /// Number written as JSON number
    Number(f64),
    /// Free text, parsed by the wizard
    Text(String),
}

impl fmt::Display for RawField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(value) => write!(f, "{value}"),
            Self::Text(text) => f.write_str(text),
        }
    }
}

/// Answers for every wizard step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Price history CSV
    pub prices: PathBuf,

    /// Selected assets, in optimizer order
    pub assets: Vec<String>,

    /// Expected return per asset
    pub expected_returns: BTreeMap<String, RawField>,

    /// Sector label per asset
    pub sectors: BTreeMap<String, String>,

    /// Constraint drafts; blank ones are ignored
    #[serde(default)]
    pub constraints: Vec<ConstraintDraft>,

    /// EWMA decay factor λ
    pub decay: f64,

    /// Wizard settings
    #[serde(default)]
    pub config: WizardConfig,
}

/// What a completed session produced.
#[derive(Debug, Clone)]
pub struct SessionOutcome {
    /// Summary confirmed at the review step
    pub review: ReviewSummary,
    /// Inputs for the optimizer
    pub inputs: OptimizationInputs,
}

impl Session {
    /// Read a session file.
    ///
    /// # Errors
    /// Returns [`SessionError::Io`] if the file cannot be read and
    /// [`SessionError::Json`] if it does not describe a session.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SessionError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| SessionError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut session: Self = serde_json::from_str(&text)?;

        if session.prices.is_relative()
            && let Some(dir) = path.parent()
        {
            session.prices = dir.join(&session.prices);
        }
        tracing::debug!(
            session = %path.display(),
            prices = %session.prices.display(),
            "session loaded"
        );
        Ok(session)
    }

    /// Drive a wizard through every step with this session's answers.
    ///
    /// # Errors
    /// Returns the first step's [`WizardError`] that rejects an answer.
    pub fn run(&self) -> Result<SessionOutcome, SessionError> {
        let mut wizard = WizardState::new(self.config);

        wizard.load_csv(&self.prices)?;
        wizard.select_assets(self.assets.iter().cloned())?;
        wizard.submit_expected_returns(
            self.expected_returns
                .iter()
                .map(|(asset, field)| (asset.clone(), field.to_string())),
        )?;
        wizard.confirm_expected_returns()?;
        wizard.submit_sectors(&self.sectors)?;
        wizard.confirm_sectors()?;
        wizard.submit_constraints(self.constraints.clone())?;

        let review = wizard.review()?;
        wizard.finish(self.decay)?;
        let inputs = wizard
            .into_inputs()
            .ok_or_else(|| WizardError::Inconsistent("wizard did not complete".to_string()))?;

        Ok(SessionOutcome { review, inputs })
    }
}
