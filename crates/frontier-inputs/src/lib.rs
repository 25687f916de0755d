#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/frontier/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod constraint;
pub mod expected_returns;
pub mod scalar;
pub mod sector;
pub mod selection;
pub mod validation;

pub use constraint::{
    Constraint, ConstraintDraft, ConstraintError, Field, Operand, Relation, SCALAR_MARKER, Side,
    build_constraint,
};
pub use expected_returns::{ExpectedReturnError, ExpectedReturnMap};
pub use scalar::{ScalarError, parse_scalar};
pub use sector::{Sector, SectorError, SectorMap};
pub use selection::{AssetSelection, SelectionError};
pub use validation::{
    ConstraintSet, ConstraintSetState, ValidationError, validate_constraint_set, validate_drafts,
};
