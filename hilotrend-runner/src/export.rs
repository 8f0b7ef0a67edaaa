//! Reporting and export: JSON manifest, candidate CSV and text caption.
//!
//! All persisted artifacts include a `schema_version` field. Unknown versions
//! are rejected on load.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use hilotrend_core::analysis::Verdict;

use crate::runner::{AnalysisRun, CandidateRow, SCHEMA_VERSION};

// ─── JSON export ────────────────────────────────────────────────────

/// Serialize an `AnalysisRun` to pretty JSON.
pub fn export_json(run: &AnalysisRun) -> Result<String> {
    serde_json::to_string_pretty(run).context("failed to serialize AnalysisRun to JSON")
}

/// Deserialize an `AnalysisRun` from JSON, rejecting unknown schema versions.
pub fn import_json(json: &str) -> Result<AnalysisRun> {
    let run: AnalysisRun =
        serde_json::from_str(json).context("failed to deserialize AnalysisRun from JSON")?;
    if run.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            run.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(run)
}

// ─── CSV export ─────────────────────────────────────────────────────

/// Export the candidate table as CSV.
///
/// Columns: period, payoff_ratio, samples, winners, losers, hit_rate
pub fn export_candidates_csv(rows: &[CandidateRow]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "period",
        "payoff_ratio",
        "samples",
        "winners",
        "losers",
        "hit_rate",
    ])?;
    for row in rows {
        wtr.write_record([
            &row.period.to_string(),
            &format_payoff(row.payoff_ratio),
            &row.samples.to_string(),
            &row.winners.to_string(),
            &row.losers.to_string(),
            &format!("{:.4}", row.hit_rate),
        ])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Save the artifact set for one analysis run.
///
/// Creates `{ticker}_{timestamp}/` under `output_dir` containing
/// `manifest.json` (the full `AnalysisRun`) and `candidates.csv`.
/// Returns the path to the created directory.
pub fn save_artifacts(run: &AnalysisRun, output_dir: &Path) -> Result<PathBuf> {
    let dirname = format!(
        "{}_{}",
        path_component(&run.instrument.ticker),
        chrono::Local::now().format("%Y%m%d_%H%M%S")
    );
    let run_dir = output_dir.join(dirname);
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("failed to create artifact dir: {}", run_dir.display()))?;

    std::fs::write(run_dir.join("manifest.json"), export_json(run)?)?;
    std::fs::write(
        run_dir.join("candidates.csv"),
        export_candidates_csv(&run.candidates)?,
    )?;

    Ok(run_dir)
}

/// Ticker reduced to characters that cannot leave the output directory.
/// Separators become `_`; the timestamp suffix keeps `..` from standing alone.
fn path_component(ticker: &str) -> String {
    ticker
        .chars()
        .map(|c| match c {
            'A'..='Z' | 'a'..='z' | '0'..='9' | '-' | '_' | '.' => c,
            _ => '_',
        })
        .collect()
}

/// Load an `AnalysisRun` from an artifact directory's manifest.json.
pub fn load_artifacts(dir: &Path) -> Result<AnalysisRun> {
    let manifest_path = dir.join("manifest.json");
    let json = std::fs::read_to_string(&manifest_path)
        .with_context(|| format!("failed to read {}", manifest_path.display()))?;
    import_json(&json)
}

// ─── Text ───────────────────────────────────────────────────────────

/// Payoff ratio for display: two decimals, `inf` when unbounded.
pub fn format_payoff(payoff: f64) -> String {
    if payoff.is_infinite() {
        "inf".to_string()
    } else {
        format!("{payoff:.2}")
    }
}

/// Short caption summarising the verdict.
pub fn caption(run: &AnalysisRun) -> String {
    let ticker = &run.instrument.ticker;
    match &run.verdict {
        Verdict::Report(report) => format!(
            "{ticker}\nTrend: {}\nHiLo period: {}\nPayoff: {}\nLast change: {}",
            report.current_trend.to_string().to_uppercase(),
            report.period,
            format_payoff(report.payoff_ratio),
            report.last_change,
        ),
        Verdict::Unsuitable(best) => format!(
            "{ticker}\nNot suitable for the HiLo strategy (best payoff {} at period {})",
            format_payoff(best.payoff_ratio),
            best.period,
        ),
        Verdict::NoData => format!("{ticker}\nNo price data to analyze"),
    }
}
