//! Review summary shown before the optimizer inputs are finalized.
//!
//! This module gathers the selected assets, their expected returns and sectors,
//! the sector allocation and the validated constraints into one structure that
//! can be rendered for a terminal or as Markdown.

use chrono::NaiveDate;
use frontier_inputs::{AssetSelection, Constraint, ExpectedReturnMap, Sector, SectorMap};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

const RULE_WIDTH: usize = 72;

/// One selected asset as it appears on the review screen.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReviewRow {
    /// Asset identifier.
    pub asset: String,

    /// Expected return entered for the asset.
    pub expected_return: Option<f64>,

    /// Sector the asset was mapped to.
    pub sector: Option<Sector>,
}

/// Everything the user entered, ready to be confirmed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReviewSummary {
    /// Per-asset rows in selection order.
    pub rows: Vec<ReviewRow>,

    /// Number of assets per sector.
    pub sector_counts: BTreeMap<Sector, usize>,

    /// Validated constraints.
    pub constraints: Vec<Constraint>,

    /// First and last date of the price history, when known.
    pub period: Option<(NaiveDate, NaiveDate)>,
}

impl ReviewSummary {
    /// Create a review summary.
    ///
    /// # Arguments
    ///
    /// * `selected` - Selected assets; fixes the row order
    /// * `expected_returns` - Expected return per asset
    /// * `sectors` - Sector per asset
    /// * `constraints` - Validated constraints
    ///
    /// # Examples
    ///
    /// ```
    /// use frontier_inputs::{AssetSelection, ExpectedReturnMap, SectorMap};
    /// use frontier_output::ReviewSummary;
    ///
    /// let selected = AssetSelection::new(["SPY", "LQD"]).unwrap();
    /// let returns =
    ///     ExpectedReturnMap::parse([("SPY", "0.07"), ("LQD", "0.04")], &selected).unwrap();
    /// let sectors = SectorMap::from_labels(
    ///     [("SPY", "Equities"), ("LQD", "Corporate Bonds")],
    ///     &selected,
    /// )
    /// .unwrap();
    ///
    /// let review = ReviewSummary::new(&selected, &returns, &sectors, &[]);
    /// assert_eq!(review.rows.len(), 2);
    /// ```
    pub fn new(
        selected: &AssetSelection,
        expected_returns: &ExpectedReturnMap,
        sectors: &SectorMap,
        constraints: &[Constraint],
    ) -> Self {
        let rows = selected
            .iter()
            .map(|asset| ReviewRow {
                asset: asset.clone(),
                expected_return: expected_returns.get(asset),
                sector: sectors.get(asset),
            })
            .collect();

        Self {
            rows,
            sector_counts: sectors.counts(),
            constraints: constraints.to_vec(),
            period: None,
        }
    }

    /// Attach the date range of the price history.
    pub const fn with_period(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.period = Some((start, end));
        self
    }

    /// Number of selected assets.
    pub fn n_assets(&self) -> usize {
        self.rows.len()
    }

    /// Format as ASCII table for terminal display.
    pub fn to_ascii_table(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("\nReview: {} assets\n", self.n_assets()));
        if let Some((start, end)) = self.period {
            output.push_str(&format!("Period: {} to {}\n", start, end));
        }
        output.push_str(&"=".repeat(RULE_WIDTH));
        output.push('\n');

        output.push_str(&format!(
            "{:<16} {:>16}   {:<24}\n",
            "Asset", "Expected Return", "Sector"
        ));
        output.push_str(&"-".repeat(RULE_WIDTH));
        output.push('\n');
        for row in &self.rows {
            output.push_str(&format!(
                "{:<16} {:>16}   {:<24}\n",
                row.asset,
                format_return(row.expected_return),
                format_sector(row.sector)
            ));
        }

        output.push_str("\nSector Allocation:\n");
        output.push_str(&"-".repeat(RULE_WIDTH));
        output.push('\n');
        for (sector, count) in &self.sector_counts {
            output.push_str(&format!("  {:<24} {:>4}\n", sector.name(), count));
        }

        output.push_str("\nConstraints:\n");
        output.push_str(&"-".repeat(RULE_WIDTH));
        output.push('\n');
        if self.constraints.is_empty() {
            output.push_str("  (none)\n");
        }
        for (i, constraint) in self.constraints.iter().enumerate() {
            output.push_str(&format!("  {}. {}\n", i + 1, constraint));
        }

        output.push_str(&"=".repeat(RULE_WIDTH));
        output.push('\n');

        output
    }

    /// Format as Markdown for documentation.
    pub fn to_markdown(&self) -> String {
        let mut output = String::new();

        output.push_str("# Optimization Inputs Review\n\n");
        if let Some((start, end)) = self.period {
            output.push_str(&format!("**Period:** {} to {}\n\n", start, end));
        }

        output.push_str("## Assets\n\n");
        output.push_str("| Asset | Expected Return | Sector |\n");
        output.push_str("|-------|-----------------|--------|\n");
        for row in &self.rows {
            output.push_str(&format!(
                "| {} | {} | {} |\n",
                row.asset,
                format_return(row.expected_return),
                format_sector(row.sector)
            ));
        }

        output.push_str("\n## Sector Allocation\n\n");
        for (sector, count) in &self.sector_counts {
            output.push_str(&format!("- **{}:** {}\n", sector.name(), count));
        }

        output.push_str("\n## Constraints\n\n");
        if self.constraints.is_empty() {
            output.push_str("_None._\n");
        }
        for constraint in &self.constraints {
            output.push_str(&format!("- `{}`\n", constraint));
        }

        output
    }
}

fn format_return(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{:.2}%", v * 100.0))
}

fn format_sector(sector: Option<Sector>) -> &'static str {
    sector.map_or("n/a", |s| s.name())
}

impl fmt::Display for ReviewSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Review: {} assets", self.n_assets())?;
        for row in &self.rows {
            writeln!(
                f,
                "  {}: {} ({})",
                row.asset,
                format_return(row.expected_return),
                format_sector(row.sector)
            )?;
        }
        writeln!(f, "  Constraints: {}", self.constraints.len())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use frontier_inputs::{Operand, Relation};

    fn sample() -> ReviewSummary {
        let selected = AssetSelection::new(["SPY", "LQD", "HYG"]).unwrap();
        let returns = ExpectedReturnMap::parse(
            [("SPY", "0.07"), ("LQD", "0.04"), ("HYG", "0.05")],
            &selected,
        )
        .unwrap();
        let sectors = SectorMap::from_labels(
            [
                ("SPY", "Equities"),
                ("LQD", "Corporate Bonds"),
                ("HYG", "Corporate Bonds"),
            ],
            &selected,
        )
        .unwrap();
        let constraints = vec![
            Constraint::new("HYG", Relation::Le, Operand::Asset("LQD".to_string())),
            Constraint::new("SPY", Relation::Le, Operand::Scalar(0.6)),
        ];
        ReviewSummary::new(&selected, &returns, &sectors, &constraints)
    }

    #[test]
    fn test_rows_follow_selection() {
        let review = sample();
        let assets: Vec<&str> = review.rows.iter().map(|r| r.asset.as_str()).collect();
        assert_eq!(assets, ["SPY", "LQD", "HYG"]);
        assert_eq!(review.rows[1].expected_return, Some(0.04));
        assert_eq!(review.rows[2].sector, Some(Sector::CorporateBonds));
    }

    #[test]
    fn test_sector_counts() {
        let review = sample();
        assert_eq!(review.sector_counts.get(&Sector::CorporateBonds), Some(&2));
        assert_eq!(review.sector_counts.get(&Sector::Equities), Some(&1));
        assert!(!review.sector_counts.contains_key(&Sector::Cash));
    }

    #[test]
    fn test_ascii_table() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
        let table = sample().with_period(start, end).to_ascii_table();

        assert!(table.contains("Review: 3 assets"));
        assert!(table.contains("Period: 2024-01-02 to 2024-12-31"));
        assert!(table.contains("7.00%"));
        assert!(table.contains("Corporate Bonds"));
        assert!(table.contains("1. HYG <= LQD"));
        assert!(table.contains("2. SPY <= 0.6"));
    }

    #[test]
    fn test_ascii_table_without_constraints() {
        let mut review = sample();
        review.constraints.clear();
        assert!(review.to_ascii_table().contains("(none)"));
    }

    #[test]
    fn test_markdown() {
        let md = sample().to_markdown();
        assert!(md.contains("# Optimization Inputs Review"));
        assert!(md.contains("| SPY | 7.00% | Equities |"));
        assert!(md.contains("- **Corporate Bonds:** 2"));
        assert!(md.contains("- `SPY <= 0.6`"));
    }

    #[test]
    fn test_display() {
        let display = format!("{}", sample());
        assert!(display.contains("LQD: 4.00% (Corporate Bonds)"));
        assert!(display.contains("Constraints: 2"));
    }

    #[test]
    fn test_json_sector_keys() {
        let json = serde_json::to_string(&sample()).unwrap();
        assert!(json.contains("\"Corporate Bonds\":2"));
    }
}
