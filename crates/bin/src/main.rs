//! Frontier CLI binary.
//!
//! Provides a command-line interface for preparing mean-variance optimizer
//! inputs from a CSV price history.

use clap::{Parser, Subcommand, ValueEnum};
use frontier::data::{PricePanel, ReturnMatrix, compute_log_returns, load_prices_csv};
use frontier::inputs::Sector;
use frontier::output::{ExportFormat, Exporter, MatrixExport};
use frontier::risk::{CovarianceMatrix, EwmaCovarianceEstimator};
use frontier::{OptimizationInputs, Session};
use serde_json::json;
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "frontier")]
#[command(about = "Frontier: prepare inputs for mean-variance portfolio optimization", long_about = None)]
#[command(version)]
struct Cli {
    /// Log filter used when RUST_LOG is not set (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the sector labels assets can be mapped to
    Sectors,

    /// Show the assets and date range of a price file
    Assets {
        /// Price history CSV (first column dates, one column per asset)
        prices: PathBuf,
    },

    /// Compute daily log returns
    Returns {
        /// Price history CSV
        prices: PathBuf,

        /// Comma-separated assets to keep, in order (default: all)
        #[arg(long, value_delimiter = ',')]
        assets: Vec<String>,

        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: ReturnsFormat,
    },

    /// Estimate the EWMA covariance of log returns
    Covariance {
        /// Price history CSV
        prices: PathBuf,

        /// Decay factor λ, strictly between 0 and 1
        #[arg(long)]
        decay: f64,

        /// Comma-separated assets to keep, in order (default: all)
        #[arg(long, value_delimiter = ',')]
        assets: Vec<String>,

        /// Report correlations instead of covariances
        #[arg(long)]
        correlation: bool,

        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: MatrixFormat,
    },

    /// Run the whole wizard from a session file and write the optimizer inputs
    Prepare {
        /// Session JSON file
        session: PathBuf,

        /// Where to write the optimizer inputs (default: stdout)
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Format of the optimizer inputs
        #[arg(long, value_enum, default_value = "pretty-json")]
        format: HandoffFormat,

        /// Print the review as Markdown instead of a table
        #[arg(long)]
        markdown: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ReturnsFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum MatrixFormat {
    Text,
    Json,
    Csv,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum HandoffFormat {
    Json,
    PrettyJson,
}

impl From<HandoffFormat> for ExportFormat {
    fn from(format: HandoffFormat) -> Self {
        match format {
            HandoffFormat::Json => Self::Json,
            HandoffFormat::PrettyJson => Self::PrettyJson,
        }
    }
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    match cli.command {
        Commands::Sectors => list_all_sectors(),
        Commands::Assets { prices } => show_assets(&prices)?,
        Commands::Returns {
            prices,
            assets,
            format,
        } => {
            let returns = load_returns(&prices, &assets)?;
            match format {
                ReturnsFormat::Text => output_returns_text(&returns),
                ReturnsFormat::Json => output_returns_json(&returns)?,
            }
        }
        Commands::Covariance {
            prices,
            decay,
            assets,
            correlation,
            format,
        } => {
            let estimator = EwmaCovarianceEstimator::with_decay(decay)?;
            let returns = load_returns(&prices, &assets)?;
            let cov = estimator.estimate_returns(&returns)?;
            let matrix = if correlation {
                MatrixExport::correlation(&cov)
            } else {
                MatrixExport::covariance(&cov)
            };

            match format {
                MatrixFormat::Text => {
                    output_matrix_text(&matrix, &cov, &estimator, returns.n_rows(), correlation);
                }
                MatrixFormat::Json => {
                    println!("{}", matrix.export_to_string(ExportFormat::PrettyJson)?);
                }
                MatrixFormat::Csv => print!("{}", matrix.export_to_string(ExportFormat::Csv)?),
            }
        }
        Commands::Prepare {
            session,
            output,
            format,
            markdown,
        } => prepare(&session, output.as_deref(), format.into(), markdown)?,
    }

    Ok(())
}

fn init_tracing(level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn list_all_sectors() {
    println!("Sectors:");
    println!("========\n");

    for sector in Sector::all() {
        println!("  {}", sector.name());
    }
}

fn show_assets(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let panel = load_prices_csv(path)?;
    let (start, end) = panel.date_range();

    println!("Price history: {}", path.display());
    println!("Period: {} to {} ({} rows)\n", start, end, panel.n_rows());
    println!("Assets ({}):", panel.n_assets());
    for asset in panel.assets() {
        let missing = panel
            .column(asset)
            .map_or(0, |col| col.iter().filter(|p| p.is_nan()).count());
        if missing > 0 {
            println!("  {:<16} ({} missing prices)", asset, missing);
        } else {
            println!("  {}", asset);
        }
    }
    Ok(())
}

fn load_returns(
    path: &Path,
    assets: &[String],
) -> Result<ReturnMatrix, Box<dyn std::error::Error>> {
    let panel: PricePanel = load_prices_csv(path)?;
    let panel = if assets.is_empty() {
        panel
    } else {
        panel.select(assets)?
    };
    Ok(compute_log_returns(&panel)?)
}

fn output_returns_text(returns: &ReturnMatrix) {
    print!("{:<12}", "date");
    for asset in returns.assets() {
        print!("{:>14}", asset);
    }
    println!();

    for (date, row) in returns.dates().iter().zip(returns.values().rows()) {
        print!("{:<12}", date.to_string());
        for value in row {
            print!("{:>14.6}", value);
        }
        println!();
    }
}

fn output_returns_json(returns: &ReturnMatrix) -> Result<(), Box<dyn std::error::Error>> {
    let rows: Vec<_> = returns
        .dates()
        .iter()
        .zip(returns.values().rows())
        .map(|(date, row)| json!({ "date": date, "returns": row.to_vec() }))
        .collect();

    let output = json!({
        "assets": returns.assets(),
        "observations": returns.n_rows(),
        "rows": rows,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn output_matrix_text(
    matrix: &MatrixExport,
    cov: &CovarianceMatrix,
    estimator: &EwmaCovarianceEstimator,
    observations: usize,
    correlation: bool,
) {
    let title = if correlation {
        "EWMA CORRELATION MATRIX"
    } else {
        "EWMA COVARIANCE MATRIX"
    };
    println!("\n{}", title);
    println!("{}", "=".repeat(60));
    println!(
        "Decay: {} (half-life {:.1} periods), {} observations\n",
        estimator.config().decay,
        estimator.half_life(),
        observations
    );

    print!("{:<12}", "");
    for asset in &matrix.assets {
        print!("{:>12}", truncate(asset, 11));
    }
    println!();

    for (asset, row) in matrix.assets.iter().zip(&matrix.rows) {
        print!("{:<12}", truncate(asset, 11));
        for value in row {
            if correlation {
                print!("{:>12.3}", value);
            } else {
                print!("{:>12.3e}", value);
            }
        }
        println!();
    }

    println!("\nVolatilities:");
    let vols = cov.volatilities();
    for (asset, vol) in cov.assets().iter().zip(vols.iter()) {
        println!("  {:<16} {:.4}%", asset, vol * 100.0);
    }
}

fn truncate(s: &str, max: usize) -> &str {
    s.char_indices().nth(max).map_or(s, |(i, _)| &s[..i])
}

fn prepare(
    session_path: &Path,
    output: Option<&Path>,
    format: ExportFormat,
    markdown: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let session = Session::load(session_path)?;
    let outcome = session.run()?;

    if markdown {
        println!("{}", outcome.review.to_markdown());
    } else {
        println!("{}", outcome.review.to_ascii_table());
    }

    write_inputs(&outcome.inputs, output, format)
}

fn write_inputs(
    inputs: &OptimizationInputs,
    output: Option<&Path>,
    format: ExportFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    match output {
        Some(path) => {
            inputs.export_to_file(path, format)?;
            println!(
                "Optimizer inputs for {} assets written to {}",
                inputs.assets().len(),
                path.display()
            );
        }
        None => println!("{}", inputs.export_to_string(format)?),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_decay_is_required() {
        let result = Cli::try_parse_from(["frontier", "covariance", "prices.csv"]);
        assert!(result.is_err());

        let cli =
            Cli::try_parse_from(["frontier", "covariance", "prices.csv", "--decay", "0.94"])
                .unwrap();
        assert!(matches!(
            cli.command,
            Commands::Covariance { decay, .. } if decay == 0.94
        ));
    }

    #[test]
    fn test_assets_list() {
        let cli = Cli::try_parse_from([
            "frontier",
            "returns",
            "prices.csv",
            "--assets",
            "SPY,LQD",
            "--format",
            "json",
        ])
        .unwrap();
        match cli.command {
            Commands::Returns { assets, format, .. } => {
                assert_eq!(assets, ["SPY", "LQD"]);
                assert!(matches!(format, ReturnsFormat::Json));
            }
            _ => panic!("expected returns command"),
        }
        assert_eq!(cli.log_level, "warn");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("EuroGovernmentCore", 4), "Euro");
        assert_eq!(truncate("SPY", 11), "SPY");
    }
}
