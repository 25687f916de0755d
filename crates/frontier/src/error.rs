//! Error types for the input wizard.

use crate::wizard::WizardStep;
use frontier_data::DataError;
use frontier_inputs::{ExpectedReturnError, SectorError, SelectionError, ValidationError};
use frontier_risk::CovarianceError;
use std::fmt::Display;
use thiserror::Error;

/// Errors raised while driving a [`crate::WizardState`].
///
/// Submission errors carry every problem found, so a caller can show them all
/// at once and let the user resubmit.
#[derive(Debug, Error)]
pub enum WizardError {
    /// An operation was called in the wrong step
    #[error("cannot do that during '{actual}', expected step '{expected}'")]
    OutOfOrder {
        /// Step the operation belongs to
        expected: WizardStep,
        /// Step the wizard is in
        actual: WizardStep,
    },

    /// Asset selection was rejected
    #[error("invalid asset selection: {0}")]
    Selection(#[from] SelectionError),

    /// Expected returns were rejected
    #[error("invalid expected returns: {}", join(.0))]
    ExpectedReturns(Vec<ExpectedReturnError>),

    /// Sector mapping was rejected
    #[error("invalid sector mapping: {}", join(.0))]
    Sectors(Vec<SectorError>),

    /// One or more constraints were rejected
    #[error("invalid constraints: {}", join(.0))]
    Constraints(Vec<ValidationError>),

    /// More constraint drafts than the configured number of slots
    #[error("at most {max} constraints can be declared, got {given}")]
    TooManyConstraints {
        /// Configured limit
        max: usize,
        /// Number submitted
        given: usize,
    },

    /// Price data problem
    #[error("data error: {0}")]
    Data(#[from] DataError),

    /// Covariance estimation failed
    #[error("covariance error: {0}")]
    Covariance(#[from] CovarianceError),

    /// Pieces of the optimizer inputs do not describe the same assets
    #[error("inconsistent inputs: {0}")]
    Inconsistent(String),
}

impl WizardError {
    /// Number of individual problems carried by this error.
    pub fn problem_count(&self) -> usize {
        match self {
            Self::ExpectedReturns(errors) => errors.len(),
            Self::Sectors(errors) => errors.len(),
            Self::Constraints(errors) => errors.len(),
            _ => 1,
        }
    }
}

fn join<E: Display>(errors: &[E]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
