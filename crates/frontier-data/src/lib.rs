#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/frontier/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod loader;
pub mod panel;
pub mod returns;

pub use error::{DataError, Result};
pub use loader::{DATE_FORMAT, load_prices_csv, read_prices_csv};
pub use panel::PricePanel;
pub use returns::{ReturnMatrix, compute_log_returns};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
