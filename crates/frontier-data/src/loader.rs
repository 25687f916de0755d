//! CSV price loading.
//!
//! The first column holds the date, every other column one asset's prices.
//! Empty cells are treated as missing prices.

use crate::error::{DataError, Result};
use crate::panel::PricePanel;
use chrono::NaiveDate;
use ndarray::Array2;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Date format expected in the first column.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Load a price panel from a CSV file on disk.
///
/// # Errors
/// Returns an error if the file cannot be opened or its contents do not form
/// a valid [`PricePanel`].
pub fn load_prices_csv(path: impl AsRef<Path>) -> Result<PricePanel> {
    let path = path.as_ref();
    tracing::debug!(path = %path.display(), "loading price panel");
    let file = File::open(path)?;
    read_prices_csv(file)
}

/// Read a price panel from any CSV source.
///
/// Rows may appear in any order; they are sorted by date before the panel is
/// built. A date appearing twice is an error.
///
/// # Errors
/// Returns an error on malformed CSV, an unparsable date or price, a row
/// with the wrong number of cells, or an invalid resulting panel.
pub fn read_prices_csv<R: Read>(reader: R) -> Result<PricePanel> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    if headers.len() < 2 {
        return Err(DataError::Parse {
            line: 1,
            reason: "expected a date column followed by at least one asset column".to_string(),
        });
    }
    let assets: Vec<String> = headers.iter().skip(1).map(str::to_string).collect();

    let mut rows: Vec<(NaiveDate, Vec<f64>)> = Vec::new();
    for record in rdr.records() {
        let record = record?;
        let line = record.position().map_or(0, |p| p.line());

        if record.len() != headers.len() {
            return Err(DataError::Parse {
                line,
                reason: format!("expected {} cells, found {}", headers.len(), record.len()),
            });
        }

        let date = NaiveDate::parse_from_str(&record[0], DATE_FORMAT).map_err(|e| {
            DataError::Parse {
                line,
                reason: format!("invalid date '{}': {e}", &record[0]),
            }
        })?;

        let prices = record
            .iter()
            .skip(1)
            .zip(&assets)
            .map(|(cell, asset)| parse_price(cell, asset, line))
            .collect::<Result<Vec<_>>>()?;

        rows.push((date, prices));
    }

    rows.sort_by_key(|(date, _)| *date);

    let n_rows = rows.len();
    let mut dates = Vec::with_capacity(n_rows);
    let mut flat = Vec::with_capacity(n_rows * assets.len());
    for (date, prices) in rows {
        dates.push(date);
        flat.extend(prices);
    }

    let prices = Array2::from_shape_vec((n_rows, assets.len()), flat).map_err(|e| {
        DataError::Parse {
            line: 0,
            reason: e.to_string(),
        }
    })?;

    let panel = PricePanel::new(dates, assets, prices)?;
    tracing::debug!(
        rows = panel.n_rows(),
        assets = panel.n_assets(),
        "loaded price panel"
    );
    Ok(panel)
}

fn parse_price(cell: &str, asset: &str, line: u64) -> Result<f64> {
    if cell.is_empty() {
        return Ok(f64::NAN);
    }
    cell.parse::<f64>().map_err(|e| DataError::Parse {
        line,
        reason: format!("invalid price '{cell}' for {asset}: {e}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_sorts_rows() {
        let data = "date,A,B\n2024-01-03,121,60.5\n2024-01-01,100,50\n2024-01-02,110,55\n";
        let panel = read_prices_csv(data.as_bytes()).unwrap();

        assert_eq!(panel.assets(), ["A".to_string(), "B".to_string()]);
        assert_eq!(panel.n_rows(), 3);
        assert_eq!(panel.prices()[[0, 0]], 100.0);
        assert_eq!(panel.prices()[[2, 1]], 60.5);
    }

    #[test]
    fn test_empty_cell_is_missing() {
        let data = "date,A,B\n2024-01-01,100,\n2024-01-02,110,55\n";
        let panel = read_prices_csv(data.as_bytes()).unwrap();
        assert!(panel.prices()[[0, 1]].is_nan());
    }

    #[test]
    fn test_duplicate_date_rejected() {
        let data = "date,A\n2024-01-01,100\n2024-01-01,101\n2024-01-02,102\n";
        let err = read_prices_csv(data.as_bytes());
        assert!(matches!(err, Err(DataError::DuplicateDate(_))));
    }

    #[test]
    fn test_bad_date_rejected() {
        let data = "date,A\n01/02/2024,100\n2024-01-03,101\n";
        let err = read_prices_csv(data.as_bytes());
        assert!(matches!(err, Err(DataError::Parse { line: 2, .. })));
    }

    #[test]
    fn test_bad_price_rejected() {
        let data = "date,A\n2024-01-01,abc\n2024-01-02,101\n";
        assert!(matches!(
            read_prices_csv(data.as_bytes()),
            Err(DataError::Parse { .. })
        ));
    }

    #[test]
    fn test_missing_asset_columns() {
        let data = "date\n2024-01-01\n2024-01-02\n";
        assert!(read_prices_csv(data.as_bytes()).is_err());
    }
}
