#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/frontier/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod handoff;
pub mod session;
pub mod wizard;

// Re-export main types from sub-crates
pub use frontier_data as data;
pub use frontier_inputs as inputs;
pub use frontier_output as output;
pub use frontier_risk as risk;

pub use error::WizardError;
pub use handoff::OptimizationInputs;
pub use session::{RawField, Session, SessionError, SessionOutcome};
pub use wizard::{DEFAULT_MAX_CONSTRAINTS, WizardConfig, WizardState, WizardStep};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
