//! HiLo Trend CLI: analyze a CSV of daily bars for one instrument.
//!
//! Commands:
//! - `analyze`: pick the best HiLo window (or use `--period`) and report the
//!   current trend
//! - `scan`: print the payoff of every candidate window
//! - `classify`: show how a symbol is classified and normalized

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use hilotrend_core::domain::classify;
use hilotrend_runner::export::{caption, export_json, format_payoff, save_artifacts};
use hilotrend_runner::{
    load_csv, run_analysis_from_file, scan_candidates, AnalysisConfig, CandidateRow,
};

#[derive(Parser)]
#[command(
    name = "hilotrend",
    about = "HiLo Trend: oscillator trend detection with payoff-optimized lookback"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Choose the best lookback window and report the current trend.
    Analyze {
        /// CSV file with Date, High, Low and Close columns.
        #[arg(long)]
        csv: PathBuf,

        /// Instrument symbol (e.g., PETR4, BTC).
        #[arg(long)]
        symbol: String,

        /// Path to a TOML config file. Defaults are used when omitted.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Report the trend at this lookback window instead of the optimized one.
        #[arg(long)]
        period: Option<usize>,

        /// Print the full run as JSON instead of the caption.
        #[arg(long, default_value_t = false)]
        json: bool,

        /// Write manifest.json and candidates.csv under this directory.
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
    /// Print the payoff of every candidate lookback window.
    Scan {
        /// CSV file with Date, High, Low and Close columns.
        #[arg(long)]
        csv: PathBuf,

        /// Path to a TOML config file. Defaults are used when omitted.
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Show the asset class and normalized ticker for a symbol.
    Classify {
        symbol: String,

        /// Path to a TOML config file. Defaults are used when omitted.
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    init_tracing()?;
    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            csv,
            symbol,
            config,
            period,
            json,
            output_dir,
        } => run_analyze_cmd(
            &csv,
            &symbol,
            config.as_deref(),
            period,
            json,
            output_dir.as_deref(),
        ),
        Commands::Scan { csv, config } => run_scan_cmd(&csv, config.as_deref()),
        Commands::Classify { symbol, config } => run_classify_cmd(&symbol, config.as_deref()),
    }
}

/// Logs go to stderr so stdout stays machine-readable with `--json`.
fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| anyhow!("failed to initialize tracing: {err}"))
}

fn load_config(path: Option<&Path>) -> Result<AnalysisConfig> {
    let config = AnalysisConfig::load(path)?;
    if let Some(path) = path {
        info!(path = %path.display(), "loaded config");
    }
    Ok(config)
}

fn run_analyze_cmd(
    csv: &Path,
    symbol: &str,
    config: Option<&Path>,
    period: Option<usize>,
    json: bool,
    output_dir: Option<&Path>,
) -> Result<()> {
    let mut config = load_config(config)?;
    if let Some(period) = period {
        config.period = Some(period);
    }
    let run = run_analysis_from_file(csv, symbol, &config)
        .with_context(|| format!("analysis of {} failed", csv.display()))?;

    if let Some(dir) = output_dir {
        let run_dir = save_artifacts(&run, dir)?;
        info!(dir = %run_dir.display(), "artifacts written");
    }

    if json {
        println!("{}", export_json(&run)?);
    } else {
        println!("{}", caption(&run));
    }
    Ok(())
}

fn run_scan_cmd(csv: &Path, config: Option<&Path>) -> Result<()> {
    let config = load_config(config)?;
    let loaded = load_csv(csv)?;
    info!(
        bars = loaded.series.len(),
        hash = %loaded.dataset_hash,
        "loaded bars"
    );
    print_candidates(&scan_candidates(&loaded, &config));
    Ok(())
}

fn run_classify_cmd(symbol: &str, config: Option<&Path>) -> Result<()> {
    let config = load_config(config)?;
    let instrument = classify(symbol, &config.classifier);
    println!("{} {} {}", instrument.symbol, instrument.ticker, instrument.asset_class);
    Ok(())
}

fn print_candidates(rows: &[CandidateRow]) {
    println!(
        "{:>6}  {:>10}  {:>7}  {:>7}  {:>7}  {:>8}",
        "period", "payoff", "samples", "winners", "losers", "hit_rate"
    );
    for row in rows {
        println!(
            "{:>6}  {:>10}  {:>7}  {:>7}  {:>7}  {:>7.1}%",
            row.period,
            format_payoff(row.payoff_ratio),
            row.samples,
            row.winners,
            row.losers,
            row.hit_rate * 100.0
        );
    }
}
