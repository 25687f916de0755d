//! Linear constraints between assets, or between an asset and a scalar.
//!
//! A constraint reads `left relation right`, for instance `AAPL <= MSFT` or
//! `TLT == 0.1`. On input forms the right-hand side is either an asset
//! identifier or the [`SCALAR_MARKER`], in which case a separate numeric
//! field carries the bound.

use crate::scalar::{ScalarError, parse_scalar};
use crate::selection::AssetSelection;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Right-hand side choice meaning "compare against the numeric value field".
pub const SCALAR_MARKER: &str = "Value";

/// Comparison between the two sides of a constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Relation {
    /// Left equals right
    #[serde(rename = "==")]
    Eq,
    /// Left is at most right
    #[serde(rename = "<=")]
    Le,
    /// Left is at least right
    #[serde(rename = ">=")]
    Ge,
}

impl Relation {
    /// Operator symbol.
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::Eq => "==",
            Self::Le => "<=",
            Self::Ge => ">=",
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Relation {
    type Err = ConstraintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "==" | "=" => Ok(Self::Eq),
            "<=" => Ok(Self::Le),
            ">=" => Ok(Self::Ge),
            other => Err(ConstraintError::UnknownRelation(other.to_string())),
        }
    }
}

/// Right-hand side of a constraint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operand {
    /// Another selected asset
    Asset(String),
    /// A literal bound
    Scalar(f64),
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Asset(asset) => f.write_str(asset),
            Self::Scalar(value) => write!(f, "{value}"),
        }
    }
}

/// Which side of a constraint an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    /// The left-hand asset
    Left,
    /// The right-hand asset or value
    Right,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Left => "left",
            Self::Right => "right",
        })
    }
}

/// Form field of a constraint draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    /// Left-hand asset
    Left,
    /// Relation operator
    Relation,
    /// Right-hand asset or scalar marker
    Right,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Left => "left asset",
            Self::Relation => "relation",
            Self::Right => "right asset or value",
        })
    }
}

/// Errors raised for a single constraint.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConstraintError {
    /// An asset outside the selection is referenced
    #[error("{side} side references unselected asset {asset}")]
    UnknownAsset {
        /// Offending identifier
        asset: String,
        /// Side it appears on
        side: Side,
    },

    /// The scalar bound is missing or not a finite number
    #[error("invalid scalar value: {source}")]
    InvalidScalar {
        /// Why the value was rejected
        #[source]
        source: ScalarError,
    },

    /// The relation operator is not one of `==`, `<=`, `>=`
    #[error("unknown relation '{0}' (expected ==, <= or >=)")]
    UnknownRelation(String),

    /// A required form field was left empty
    #[error("missing {0}")]
    MissingField(Field),
}

/// A validated linear constraint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    left: String,
    relation: Relation,
    right: Operand,
}

impl Constraint {
    /// Assemble a constraint without checking it against a selection.
    ///
    /// Use [`build_constraint`] for user input, or check a batch afterwards
    /// with [`crate::validate_constraint_set`].
    pub fn new(left: impl Into<String>, relation: Relation, right: Operand) -> Self {
        Self {
            left: left.into(),
            relation,
            right,
        }
    }

    /// Left-hand asset.
    pub fn left(&self) -> &str {
        &self.left
    }

    /// Relation operator.
    pub const fn relation(&self) -> Relation {
        self.relation
    }

    /// Right-hand side.
    pub const fn right(&self) -> &Operand {
        &self.right
    }

    /// Whether the right-hand side is a literal bound.
    pub const fn is_scalar(&self) -> bool {
        matches!(self.right, Operand::Scalar(_))
    }

    /// Check the constraint against a selection.
    ///
    /// # Errors
    /// Returns the first problem found: an unselected left asset, an
    /// unselected right asset, or a non-finite bound.
    pub fn check(&self, selected: &AssetSelection) -> Result<(), ConstraintError> {
        if !selected.contains(&self.left) {
            return Err(ConstraintError::UnknownAsset {
                asset: self.left.clone(),
                side: Side::Left,
            });
        }
        match &self.right {
            Operand::Asset(asset) if !selected.contains(asset) => {
                Err(ConstraintError::UnknownAsset {
                    asset: asset.clone(),
                    side: Side::Right,
                })
            }
            Operand::Scalar(value) if !value.is_finite() => Err(ConstraintError::InvalidScalar {
                source: ScalarError::NotFinite(value.to_string()),
            }),
            _ => Ok(()),
        }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.left, self.relation, self.right)
    }
}

/// Build a constraint from form input.
///
/// `right` is either an asset identifier or [`SCALAR_MARKER`]; with the
/// marker, `value` must hold a finite number.
///
/// # Errors
/// Returns [`ConstraintError::UnknownAsset`] if `left` or an asset `right` is
/// not selected, and [`ConstraintError::InvalidScalar`] if a required value
/// is missing or does not parse as a finite number.
pub fn build_constraint(
    left: &str,
    relation: Relation,
    right: &str,
    value: Option<&str>,
    selected: &AssetSelection,
) -> Result<Constraint, ConstraintError> {
    let left = left.trim();
    if !selected.contains(left) {
        return Err(ConstraintError::UnknownAsset {
            asset: left.to_string(),
            side: Side::Left,
        });
    }

    let right = right.trim();
    let operand = if right == SCALAR_MARKER {
        let value = parse_scalar(value.unwrap_or_default())
            .map_err(|source| ConstraintError::InvalidScalar { source })?;
        Operand::Scalar(value)
    } else if selected.contains(right) {
        Operand::Asset(right.to_string())
    } else {
        return Err(ConstraintError::UnknownAsset {
            asset: right.to_string(),
            side: Side::Right,
        });
    };

    Ok(Constraint::new(left, relation, operand))
}

/// Raw, possibly incomplete, constraint form fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstraintDraft {
    /// Left-hand asset
    #[serde(default)]
    pub left: Option<String>,
    /// Relation symbol (`==`, `<=`, `>=`)
    #[serde(default)]
    pub relation: Option<String>,
    /// Right-hand asset or [`SCALAR_MARKER`]
    #[serde(default)]
    pub right: Option<String>,
    /// Numeric bound used when `right` is [`SCALAR_MARKER`]
    #[serde(default)]
    pub value: Option<String>,
}

impl ConstraintDraft {
    /// Draft comparing two assets.
    pub fn assets(left: &str, relation: Relation, right: &str) -> Self {
        Self {
            left: Some(left.to_string()),
            relation: Some(relation.symbol().to_string()),
            right: Some(right.to_string()),
            value: None,
        }
    }

    /// Draft bounding an asset by a typed value.
    pub fn scalar(left: &str, relation: Relation, value: &str) -> Self {
        Self {
            left: Some(left.to_string()),
            relation: Some(relation.symbol().to_string()),
            right: Some(SCALAR_MARKER.to_string()),
            value: Some(value.to_string()),
        }
    }

    /// Whether every field is empty, i.e. the form slot is unused.
    pub fn is_blank(&self) -> bool {
        [&self.left, &self.relation, &self.right, &self.value]
            .into_iter()
            .all(|field| field.as_deref().is_none_or(|s| s.trim().is_empty()))
    }

    /// Validate the draft and turn it into a [`Constraint`].
    ///
    /// # Errors
    /// Returns [`ConstraintError::MissingField`] for an empty required field,
    /// [`ConstraintError::UnknownRelation`] for a bad operator, or any error
    /// of [`build_constraint`].
    pub fn build(&self, selected: &AssetSelection) -> Result<Constraint, ConstraintError> {
        let left = required(&self.left, Field::Left)?;
        let relation: Relation = required(&self.relation, Field::Relation)?.parse()?;
        let right = required(&self.right, Field::Right)?;
        build_constraint(left, relation, right, self.value.as_deref(), selected)
    }
}

fn required(field: &Option<String>, which: Field) -> Result<&str, ConstraintError> {
    field
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(ConstraintError::MissingField(which))
}
