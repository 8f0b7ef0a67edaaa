//! Analysis runner: wires together data loading, the optimizer and the
//! verdict.
//!
//! Two entry points:
//! - `run_analysis_from_file()`: loads a CSV, then runs. Used by the CLI.
//! - `run_analysis()`: takes pre-loaded data, no I/O.

use std::path::Path;

use chrono::NaiveDate;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use hilotrend_core::analysis::{verdict_for, Verdict};
use hilotrend_core::domain::{classify, Instrument};
use hilotrend_core::optimizer::{select_best, PayoffResult};
use hilotrend_core::payoff::{self, ratio_serde, PayoffStats};

use crate::config::{AnalysisConfig, ConfigError};
use crate::data_loader::{load_csv, LoadError, LoadedData};

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("data error: {0}")]
    Data(#[from] LoadError),
}

/// Current schema version for persisted artifacts.
pub const SCHEMA_VERSION: u32 = 1;

/// Payoff breakdown of one candidate window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CandidateRow {
    pub period: usize,
    #[serde(with = "ratio_serde")]
    pub payoff_ratio: f64,
    pub samples: usize,
    pub winners: usize,
    pub losers: usize,
    /// Share of samples that were winners.
    pub hit_rate: f64,
}

impl CandidateRow {
    fn from_stats(period: usize, stats: &PayoffStats) -> Self {
        Self {
            period,
            payoff_ratio: stats.payoff,
            samples: stats.samples,
            winners: stats.winners,
            losers: stats.losers,
            hit_rate: stats.hit_rate(),
        }
    }

    pub fn result(&self) -> PayoffResult {
        PayoffResult::new(self.period, self.payoff_ratio)
    }
}

/// Complete result of one analysis run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRun {
    /// Schema version for forward-compatible deserialization.
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub instrument: Instrument,
    pub source: String,
    pub dataset_hash: String,
    pub bar_count: usize,
    pub skipped_rows: usize,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    /// Every candidate window, ascending by period.
    pub candidates: Vec<CandidateRow>,
    /// Set when the window was pinned by configuration instead of optimized.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed_period: Option<usize>,
    pub best: PayoffResult,
    pub verdict: Verdict,
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

/// Per-window payoff breakdown for every configured candidate.
pub fn scan_candidates(loaded: &LoadedData, config: &AnalysisConfig) -> Vec<CandidateRow> {
    config
        .optimizer
        .grid()
        .par_iter()
        .map(|&period| {
            CandidateRow::from_stats(period, &PayoffStats::for_period(&loaded.series, period))
        })
        .collect()
}

/// Run the analysis on pre-loaded data, no I/O.
pub fn run_analysis(
    loaded: &LoadedData,
    instrument: &Instrument,
    config: &AnalysisConfig,
) -> AnalysisRun {
    let series = &loaded.series;
    let candidates = scan_candidates(loaded, config);
    let results: Vec<PayoffResult> = candidates.iter().map(CandidateRow::result).collect();

    let best = match config.period {
        Some(period) => {
            info!(period, "lookback window fixed by configuration");
            fixed_window(&candidates, loaded, period)
        }
        None => select_best(&results, instrument.asset_class, &config.optimizer),
    };
    let verdict = verdict_for(series, instrument.asset_class, &config.optimizer, best);

    match &verdict {
        Verdict::Report(report) => info!(
            ticker = %instrument.ticker,
            period = report.period,
            payoff = report.payoff_ratio,
            trend = %report.current_trend,
            last_change = %report.last_change,
            "trend report ready"
        ),
        Verdict::Unsuitable(best) => warn!(
            ticker = %instrument.ticker,
            period = best.period,
            payoff = best.payoff_ratio,
            "best payoff below crypto threshold; trend report suppressed"
        ),
        Verdict::NoData => warn!(ticker = %instrument.ticker, "no bars to analyze"),
    }

    AnalysisRun {
        schema_version: SCHEMA_VERSION,
        instrument: instrument.clone(),
        source: loaded.source.clone(),
        dataset_hash: loaded.dataset_hash.clone(),
        bar_count: series.len(),
        skipped_rows: loaded.skipped_rows,
        start_date: series.first().map(|b| b.date),
        end_date: series.last().map(|b| b.date),
        candidates,
        fixed_period: config.period,
        best,
        verdict,
    }
}

/// Payoff of a pinned window, reusing the scanned row when it is on the grid.
fn fixed_window(candidates: &[CandidateRow], loaded: &LoadedData, period: usize) -> PayoffResult {
    candidates
        .iter()
        .find(|row| row.period == period)
        .map(CandidateRow::result)
        .unwrap_or_else(|| PayoffResult::new(period, payoff::evaluate(&loaded.series, period)))
}

/// Load a CSV and analyze it for `symbol`.
pub fn run_analysis_from_file(
    path: &Path,
    symbol: &str,
    config: &AnalysisConfig,
) -> Result<AnalysisRun, RunError> {
    config.validate()?;
    let instrument = classify(symbol, &config.classifier);
    let loaded = load_csv(path)?;
    info!(
        ticker = %instrument.ticker,
        asset_class = %instrument.asset_class,
        bars = loaded.series.len(),
        source = %loaded.source,
        "loaded bars"
    );
    Ok(run_analysis(&loaded, &instrument, config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use hilotrend_core::domain::{AssetClass, Bar, PriceSeries, Trend};

    fn rising(n: usize) -> LoadedData {
        let base = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let bars = (0..n)
            .map(|i| {
                let close = 100.0 + i as f64;
                Bar::new(base + chrono::Duration::days(i as i64), close + 1.0, close - 1.0, close)
            })
            .collect();
        LoadedData::from_series(PriceSeries::new(bars).unwrap(), "synthetic")
    }

    #[test]
    fn rising_crypto_reports_bullish() {
        let config = AnalysisConfig::default();
        let instrument = classify("BTC", &config.classifier);
        let run = run_analysis(&rising(70), &instrument, &config);

        assert_eq!(run.schema_version, SCHEMA_VERSION);
        assert_eq!(run.bar_count, 70);
        assert_eq!(run.candidates.len(), 12);
        assert_eq!(run.best, PayoffResult::new(5, f64::INFINITY));
        let report = run.verdict.report().unwrap();
        assert_eq!(report.current_trend, Trend::Bullish);
        assert_eq!(Some(report.last_change), run.end_date);
    }

    #[test]
    fn candidate_rows_are_ascending_and_consistent() {
        let config = AnalysisConfig::default();
        let rows = scan_candidates(&rising(70), &config);
        let periods: Vec<usize> = rows.iter().map(|r| r.period).collect();
        assert_eq!(periods, config.optimizer.grid());
        for row in &rows {
            assert_eq!(row.samples, 70 - row.period - 1);
            assert_eq!(row.losers, 0);
            assert_eq!(row.winners, row.samples);
            assert_eq!(row.hit_rate, 1.0);
        }
    }

    #[test]
    fn fixed_period_overrides_optimizer() {
        let config = AnalysisConfig {
            period: Some(30),
            ..AnalysisConfig::default()
        };
        let instrument = classify("PETR4", &config.classifier);
        let run = run_analysis(&rising(70), &instrument, &config);
        assert_eq!(run.fixed_period, Some(30));
        assert_eq!(run.best, PayoffResult::new(30, f64::INFINITY));
        assert_eq!(run.verdict.report().unwrap().period, 30);
        // The full grid is still scanned for the report.
        assert_eq!(run.candidates.len(), 12);
    }

    #[test]
    fn fixed_period_off_grid_is_evaluated_directly() {
        let config = AnalysisConfig {
            period: Some(7),
            ..AnalysisConfig::default()
        };
        let instrument = classify("PETR4", &config.classifier);
        let run = run_analysis(&rising(70), &instrument, &config);
        assert_eq!(run.best, PayoffResult::new(7, f64::INFINITY));
        assert_eq!(run.verdict.report().unwrap().period, 7);
    }

    #[test]
    fn fixed_period_still_gated_for_crypto() {
        let base = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let flat = (0..70)
            .map(|i| Bar::new(base + chrono::Duration::days(i), 10.0, 10.0, 10.0))
            .collect();
        let loaded = LoadedData::from_series(PriceSeries::new(flat).unwrap(), "flat");
        let config = AnalysisConfig {
            period: Some(10),
            ..AnalysisConfig::default()
        };
        let instrument = classify("BTC", &config.classifier);
        let run = run_analysis(&loaded, &instrument, &config);
        assert_eq!(run.verdict, Verdict::Unsuitable(PayoffResult::new(10, 0.0)));
    }

    #[test]
    fn empty_data_has_no_dates() {
        let config = AnalysisConfig::default();
        let instrument = classify("PETR4", &config.classifier);
        assert_eq!(instrument.asset_class, AssetClass::Stock);
        let loaded = LoadedData::from_series(PriceSeries::empty(), "none");
        let run = run_analysis(&loaded, &instrument, &config);
        assert_eq!(run.verdict, Verdict::NoData);
        assert_eq!(run.start_date, None);
        assert_eq!(run.best, PayoffResult::new(20, 0.0));
    }
}
