//! Batch validation of constraint sets.
//!
//! Constraints are validated together and every failure is collected, so a
//! user who declared several constraints sees all problems in one pass.

use crate::constraint::{Constraint, ConstraintDraft, ConstraintError};
use crate::selection::AssetSelection;
use thiserror::Error;

/// A failure of one constraint within a batch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("constraint #{position}: {error}", position = .index + 1)]
pub struct ValidationError {
    /// Zero-based position of the constraint in the batch
    pub index: usize,
    /// What is wrong with it
    #[source]
    pub error: ConstraintError,
}

/// Check every constraint independently against `selected`.
///
/// Never stops at the first failure; the returned list is empty when the
/// whole set is valid.
pub fn validate_constraint_set(
    constraints: &[Constraint],
    selected: &AssetSelection,
) -> Vec<ValidationError> {
    constraints
        .iter()
        .enumerate()
        .filter_map(|(index, constraint)| {
            constraint
                .check(selected)
                .err()
                .map(|error| ValidationError { index, error })
        })
        .collect()
}

/// Build every non-blank draft, collecting all failures.
///
/// Blank drafts are unused form slots and are skipped; indices in errors
/// still refer to positions in `drafts`.
///
/// # Errors
/// Returns every [`ValidationError`] if any draft fails to build.
pub fn validate_drafts(
    drafts: &[ConstraintDraft],
    selected: &AssetSelection,
) -> Result<Vec<Constraint>, Vec<ValidationError>> {
    let mut constraints = Vec::with_capacity(drafts.len());
    let mut errors = Vec::new();

    for (index, draft) in drafts.iter().enumerate() {
        if draft.is_blank() {
            continue;
        }
        match draft.build(selected) {
            Ok(constraint) => constraints.push(constraint),
            Err(error) => errors.push(ValidationError { index, error }),
        }
    }

    if errors.is_empty() {
        Ok(constraints)
    } else {
        Err(errors)
    }
}

/// Validation status of a [`ConstraintSet`].
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ConstraintSetState {
    /// Drafts were edited and have not been validated since
    #[default]
    Incomplete,
    /// Every draft built into a valid constraint
    Valid(Vec<Constraint>),
    /// At least one draft failed
    Invalid(Vec<ValidationError>),
}

/// Editable constraint drafts plus their last validation result.
///
/// Editing never revalidates; the state only leaves
/// [`ConstraintSetState::Incomplete`] through [`ConstraintSet::validate`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConstraintSet {
    drafts: Vec<ConstraintDraft>,
    state: ConstraintSetState,
}

impl ConstraintSet {
    /// An empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// A set holding `drafts`, not yet validated.
    pub fn with_drafts(drafts: Vec<ConstraintDraft>) -> Self {
        Self {
            drafts,
            state: ConstraintSetState::Incomplete,
        }
    }

    /// Append a draft.
    pub fn push(&mut self, draft: ConstraintDraft) {
        self.drafts.push(draft);
        self.state = ConstraintSetState::Incomplete;
    }

    /// Replace the draft at `index`, returning the previous one.
    pub fn replace(&mut self, index: usize, draft: ConstraintDraft) -> Option<ConstraintDraft> {
        let slot = self.drafts.get_mut(index)?;
        self.state = ConstraintSetState::Incomplete;
        Some(std::mem::replace(slot, draft))
    }

    /// Remove the draft at `index`.
    pub fn remove(&mut self, index: usize) -> Option<ConstraintDraft> {
        if index >= self.drafts.len() {
            return None;
        }
        self.state = ConstraintSetState::Incomplete;
        Some(self.drafts.remove(index))
    }

    /// Current drafts.
    pub fn drafts(&self) -> &[ConstraintDraft] {
        &self.drafts
    }

    /// Last validation result.
    pub const fn state(&self) -> &ConstraintSetState {
        &self.state
    }

    /// Validate all drafts against `selected` and record the outcome.
    pub fn validate(&mut self, selected: &AssetSelection) -> &ConstraintSetState {
        self.state = match validate_drafts(&self.drafts, selected) {
            Ok(constraints) => ConstraintSetState::Valid(constraints),
            Err(errors) => {
                tracing::debug!(count = errors.len(), "constraint set failed validation");
                ConstraintSetState::Invalid(errors)
            }
        };
        &self.state
    }

    /// Validated constraints, if the last validation succeeded.
    pub fn constraints(&self) -> Option<&[Constraint]> {
        match &self.state {
            ConstraintSetState::Valid(constraints) => Some(constraints),
            _ => None,
        }
    }

    /// Errors from the last validation, empty unless it failed.
    pub fn errors(&self) -> &[ValidationError] {
        match &self.state {
            ConstraintSetState::Invalid(errors) => errors,
            _ => &[],
        }
    }

    /// Whether the last validation succeeded.
    pub const fn is_valid(&self) -> bool {
        matches!(self.state, ConstraintSetState::Valid(_))
    }
}
