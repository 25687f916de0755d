//! Export of optimizer inputs.
//!
//! This module provides CSV and JSON export for the labelled covariance matrix,
//! the expected returns and the review summary. The complete optimizer
//! hand-off implements the same [`Exporter`] trait in the `frontier` crate.

use frontier_inputs::ExpectedReturnMap;
use frontier_risk::CovarianceMatrix;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use thiserror::Error;

use crate::review::ReviewSummary;

/// Errors that can occur during export operations.
#[derive(Debug, Error)]
pub enum ExportError {
    /// CSV serialization error.
    #[error("CSV serialization error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV output was not valid UTF-8.
    #[error("CSV output is not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// The data has no representation in the requested format.
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

/// Export format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExportFormat {
    /// Comma-separated values format.
    Csv,

    /// Compact JSON format.
    Json,

    /// Pretty-printed JSON format.
    PrettyJson,
}

impl ExportFormat {
    /// Get the file extension for this format.
    pub const fn extension(&self) -> &str {
        match self {
            Self::Csv => "csv",
            Self::Json | Self::PrettyJson => "json",
        }
    }

    /// Whether this is one of the JSON formats.
    pub const fn is_json(&self) -> bool {
        matches!(self, Self::Json | Self::PrettyJson)
    }
}

/// Trait for exporting data in various formats.
pub trait Exporter {
    /// Export data to a string in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails or the format is not supported.
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError>;

    /// Export data to a file in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or file writing fails.
    fn export_to_file(&self, path: &Path, format: ExportFormat) -> Result<(), ExportError> {
        let content = self.export_to_string(format)?;
        let mut file = File::create(path)?;
        file.write_all(content.as_bytes())?;
        tracing::debug!(path = %path.display(), ?format, bytes = content.len(), "exported");
        Ok(())
    }
}

/// Serialize `value` as compact or pretty JSON.
///
/// # Errors
///
/// Returns [`ExportError::InvalidFormat`] for [`ExportFormat::Csv`].
pub fn to_json_string<T: Serialize>(
    value: &T,
    format: ExportFormat,
) -> Result<String, ExportError> {
    match format {
        ExportFormat::Json => Ok(serde_json::to_string(value)?),
        ExportFormat::PrettyJson => Ok(serde_json::to_string_pretty(value)?),
        ExportFormat::Csv => Err(ExportError::InvalidFormat(
            "CSV is not supported here, use json or pretty-json".to_string(),
        )),
    }
}

fn finish_csv(wtr: csv::Writer<Vec<u8>>) -> Result<String, ExportError> {
    let bytes = wtr.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8(bytes)?)
}

/// A square matrix with asset labels on both axes, laid out row by row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatrixExport {
    /// Labels of rows and columns.
    pub assets: Vec<String>,

    /// Matrix rows in asset order.
    pub rows: Vec<Vec<f64>>,
}

impl MatrixExport {
    /// Covariance values of `matrix`.
    pub fn covariance(matrix: &CovarianceMatrix) -> Self {
        Self {
            assets: matrix.assets().to_vec(),
            rows: matrix
                .values()
                .outer_iter()
                .map(|row| row.to_vec())
                .collect(),
        }
    }

    /// Correlations implied by `matrix`.
    pub fn correlation(matrix: &CovarianceMatrix) -> Self {
        Self {
            assets: matrix.assets().to_vec(),
            rows: matrix
                .correlation()
                .outer_iter()
                .map(|row| row.to_vec())
                .collect(),
        }
    }
}

impl Exporter for MatrixExport {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => {
                let mut wtr = csv::Writer::from_writer(vec![]);
                let mut header = Vec::with_capacity(self.assets.len() + 1);
                header.push("asset".to_string());
                header.extend(self.assets.iter().cloned());
                wtr.write_record(&header)?;

                for (asset, row) in self.assets.iter().zip(&self.rows) {
                    let mut record = Vec::with_capacity(row.len() + 1);
                    record.push(asset.clone());
                    record.extend(row.iter().map(|v| v.to_string()));
                    wtr.write_record(&record)?;
                }
                finish_csv(wtr)
            }
            _ => to_json_string(self, format),
        }
    }
}

impl Exporter for CovarianceMatrix {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        MatrixExport::covariance(self).export_to_string(format)
    }
}

/// Expected return of one asset, flattened for CSV export.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExpectedReturnRecord {
    /// Asset identifier.
    pub asset: String,

    /// Expected return.
    pub expected_return: f64,
}

impl ExpectedReturnRecord {
    /// One record per asset in selection order.
    pub fn from_map(map: &ExpectedReturnMap) -> Vec<Self> {
        map.iter()
            .map(|(asset, expected_return)| Self {
                asset: asset.to_string(),
                expected_return,
            })
            .collect()
    }
}

impl Exporter for ExpectedReturnMap {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        let records = ExpectedReturnRecord::from_map(self);
        match format {
            ExportFormat::Csv => {
                let mut wtr = csv::Writer::from_writer(vec![]);
                for record in &records {
                    wtr.serialize(record)?;
                }
                finish_csv(wtr)
            }
            _ => to_json_string(&records, format),
        }
    }
}

impl Exporter for ReviewSummary {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => {
                let mut wtr = csv::Writer::from_writer(vec![]);
                wtr.write_record(["asset", "expected_return", "sector"])?;
                for row in &self.rows {
                    let expected_return = row
                        .expected_return
                        .map(|v| v.to_string())
                        .unwrap_or_default();
                    let sector = row.sector.map(|s| s.name()).unwrap_or_default();
                    wtr.write_record([row.asset.as_str(), expected_return.as_str(), sector])?;
                }
                finish_csv(wtr)
            }
            _ => to_json_string(self, format),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use frontier_inputs::{AssetSelection, SectorMap};
    use ndarray::array;

    fn covariance() -> CovarianceMatrix {
        CovarianceMatrix::new(
            vec!["SPY".to_string(), "LQD".to_string()],
            array![[0.04, 0.01], [0.01, 0.01]],
        )
        .unwrap()
    }

    fn returns() -> ExpectedReturnMap {
        let selected = AssetSelection::new(["SPY", "LQD"]).unwrap();
        ExpectedReturnMap::parse([("LQD", "0.04"), ("SPY", "0.07")], &selected).unwrap()
    }

    #[test]
    fn test_covariance_csv() {
        let csv = covariance().export_to_string(ExportFormat::Csv).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines, ["asset,SPY,LQD", "SPY,0.04,0.01", "LQD,0.01,0.01"]);
    }

    #[test]
    fn test_covariance_json() {
        let json = covariance().export_to_string(ExportFormat::Json).unwrap();
        let back: MatrixExport = serde_json::from_str(&json).unwrap();
        assert_eq!(back.assets, ["SPY", "LQD"]);
        assert_eq!(back.rows[0], [0.04, 0.01]);
    }

    #[test]
    fn test_correlation_export() {
        let corr = MatrixExport::correlation(&covariance());
        assert_eq!(corr.rows[0][0], 1.0);
        assert!((corr.rows[0][1] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_expected_returns_csv() {
        let csv = returns().export_to_string(ExportFormat::Csv).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines, ["asset,expected_return", "SPY,0.07", "LQD,0.04"]);
    }

    #[test]
    fn test_expected_returns_pretty_json() {
        let json = returns().export_to_string(ExportFormat::PrettyJson).unwrap();
        assert!(json.contains("\"expected_return\": 0.07"));
        assert!(json.contains("  ")); // Indentation indicates pretty format
    }

    #[test]
    fn test_review_csv() {
        let selected = AssetSelection::new(["SPY", "LQD"]).unwrap();
        let sectors =
            SectorMap::from_labels([("SPY", "Equities"), ("LQD", "Cash")], &selected).unwrap();
        let review = ReviewSummary::new(&selected, &returns(), &sectors, &[]);

        let csv = review.export_to_string(ExportFormat::Csv).unwrap();
        assert!(csv.starts_with("asset,expected_return,sector\n"));
        assert!(csv.contains("LQD,0.04,Cash"));
    }

    #[test]
    fn test_json_helper_rejects_csv() {
        let err = to_json_string(&1, ExportFormat::Csv).unwrap_err();
        assert!(matches!(err, ExportError::InvalidFormat(_)));
    }

    #[test]
    fn test_export_to_file() {
        let path = std::env::temp_dir().join("frontier_export_test.csv");
        covariance()
            .export_to_file(&path, ExportFormat::Csv)
            .unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("asset,SPY,LQD"));

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_export_format_extension() {
        assert_eq!(ExportFormat::Csv.extension(), "csv");
        assert_eq!(ExportFormat::Json.extension(), "json");
        assert_eq!(ExportFormat::PrettyJson.extension(), "json");
        assert!(ExportFormat::PrettyJson.is_json());
    }
}
