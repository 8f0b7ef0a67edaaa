//! Analysis: optimizer, locator and current signal composed into one verdict.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{AssetClass, PriceSeries, Trend};
use crate::optimizer::{self, OptimizerConfig, PayoffResult};
use crate::payoff;
use crate::trend;

/// Externally visible result of an analysis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendReport {
    pub period: usize,
    #[serde(with = "payoff::ratio_serde")]
    pub payoff_ratio: f64,
    pub last_change: NaiveDate,
    pub current_trend: Trend,
}

/// Outcome of [`analyze`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum Verdict {
    Report(TrendReport),
    /// Crypto asset whose best payoff is below the crypto threshold. No
    /// trend is reported.
    Unsuitable(PayoffResult),
    /// Nothing to analyze.
    NoData,
}

impl Verdict {
    pub fn report(&self) -> Option<&TrendReport> {
        match self {
            Verdict::Report(report) => Some(report),
            _ => None,
        }
    }
}

/// Pick the best window, then report the trend it shows today.
pub fn analyze(series: &PriceSeries, asset_class: AssetClass, config: &OptimizerConfig) -> Verdict {
    let best = optimizer::optimize_with(series, asset_class, config);
    verdict_for(series, asset_class, config, best)
}

/// Build the verdict for an already-optimized window.
pub fn verdict_for(
    series: &PriceSeries,
    asset_class: AssetClass,
    config: &OptimizerConfig,
    best: PayoffResult,
) -> Verdict {
    if let Some(min) = config.min_payoff(asset_class) {
        if best.payoff_ratio < min {
            return Verdict::Unsuitable(best);
        }
    }

    let Some(last_change) = trend::last_change(series, best.period) else {
        return Verdict::NoData;
    };

    Verdict::Report(TrendReport {
        period: best.period,
        payoff_ratio: best.payoff_ratio,
        last_change,
        current_trend: trend::current_trend(series, best.period),
    })
}
