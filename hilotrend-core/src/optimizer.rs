//! Period optimizer: grid search for the HiLo window with the best payoff.
//!
//! Every candidate is evaluated (on the rayon pool) before anything is
//! selected. Selection then walks the results in ascending period order and
//! only replaces the incumbent on a strictly greater payoff, so ties always
//! resolve to the smallest period regardless of completion order.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::domain::{AssetClass, PriceSeries};
use crate::payoff;

/// Candidate windows: 5 to 60 in steps of 5.
pub const DEFAULT_CANDIDATES: [usize; 12] = [5, 10, 15, 20, 25, 30, 35, 40, 45, 50, 55, 60];

/// Period reported when no candidate beats the baseline.
pub const DEFAULT_PERIOD: usize = 20;

/// Minimum payoff a crypto candidate needs to qualify.
pub const CRYPTO_MIN_PAYOFF: f64 = 3.0;

/// Payoff of one window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PayoffResult {
    pub period: usize,
    /// `f64::INFINITY` when the window produced winners and no losers.
    #[serde(with = "payoff::ratio_serde")]
    pub payoff_ratio: f64,
}

impl PayoffResult {
    pub fn new(period: usize, payoff_ratio: f64) -> Self {
        Self {
            period,
            payoff_ratio,
        }
    }

    /// The `{default_period, 0}` result returned when nothing qualifies.
    pub fn baseline(config: &OptimizerConfig) -> Self {
        Self::new(config.default_period, 0.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OptimizerConfig {
    pub candidates: Vec<usize>,
    pub default_period: usize,
    pub crypto_min_payoff: f64,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            candidates: DEFAULT_CANDIDATES.to_vec(),
            default_period: DEFAULT_PERIOD,
            crypto_min_payoff: CRYPTO_MIN_PAYOFF,
        }
    }
}

impl OptimizerConfig {
    /// Candidate windows in evaluation order: ascending, deduplicated, no zeros.
    pub fn grid(&self) -> Vec<usize> {
        let mut grid: Vec<usize> = self.candidates.iter().copied().filter(|&p| p > 0).collect();
        grid.sort_unstable();
        grid.dedup();
        grid
    }

    /// Qualification threshold for an asset class, if it has one.
    pub fn min_payoff(&self, asset_class: AssetClass) -> Option<f64> {
        match asset_class {
            AssetClass::Crypto => Some(self.crypto_min_payoff),
            AssetClass::Stock => None,
        }
    }
}

/// Payoff of every candidate window, ascending by period.
pub fn scan(series: &PriceSeries, config: &OptimizerConfig) -> Vec<PayoffResult> {
    config
        .grid()
        .par_iter()
        .map(|&period| PayoffResult::new(period, payoff::evaluate(series, period)))
        .collect()
}

/// Deterministic selection over already-evaluated candidates.
///
/// Starts from the baseline, skips crypto candidates below the threshold,
/// and keeps a candidate only if it is strictly better than the incumbent.
pub fn select_best(
    results: &[PayoffResult],
    asset_class: AssetClass,
    config: &OptimizerConfig,
) -> PayoffResult {
    let mut ordered = results.to_vec();
    ordered.sort_by_key(|r| r.period);

    let threshold = config.min_payoff(asset_class);
    let mut best = PayoffResult::baseline(config);

    for candidate in ordered {
        if let Some(min) = threshold {
            if candidate.payoff_ratio < min {
                continue;
            }
        }
        if candidate.payoff_ratio > best.payoff_ratio {
            best = candidate;
        }
    }

    best
}

/// Best window with a custom grid and thresholds.
pub fn optimize_with(
    series: &PriceSeries,
    asset_class: AssetClass,
    config: &OptimizerConfig,
) -> PayoffResult {
    select_best(&scan(series, config), asset_class, config)
}

/// Best window over the default grid.
pub fn optimize(series: &PriceSeries, asset_class: AssetClass) -> PayoffResult {
    optimize_with(series, asset_class, &OptimizerConfig::default())
}
