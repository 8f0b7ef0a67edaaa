//! Payoff evaluation: how a HiLo signal would have paid on past bars.
//!
//! The signal observed at bar `i-1` sizes the position that captures the
//! forward return from bar `i` to bar `i+1`:
//!
//! ```text
//! ret[i]            = close[i+1] / close[i] - 1
//! strategy_ret[i]   = ret[i] * exposure(signal[i-1])
//! ```
//!
//! Indices with a missing signal or a missing return are dropped, never
//! zero-filled. The surviving list is summarised as
//! `mean(winners) / mean(|losers|)`.

use serde::{Deserialize, Serialize};

use crate::domain::{Bar, PriceSeries, Trend};
use crate::indicators::hilo;

/// One-bar forward simple returns. The last bar, and any bar whose return is
/// not finite (zero close), has none.
pub fn forward_returns(bars: &[Bar]) -> Vec<Option<f64>> {
    let mut out = vec![None; bars.len()];
    for (i, pair) in bars.windows(2).enumerate() {
        let r = pair[1].close / pair[0].close - 1.0;
        if r.is_finite() {
            out[i] = Some(r);
        }
    }
    out
}

/// Strategy returns for an explicit signal series aligned with `bars`.
pub fn trade_returns_from_signals(bars: &[Bar], signals: &[Option<Trend>]) -> Vec<f64> {
    let returns = forward_returns(bars);
    (1..bars.len().min(signals.len()))
        .filter_map(|i| {
            let signal = signals[i - 1]?;
            let ret = returns[i]?;
            Some(ret * signal.exposure())
        })
        .collect()
}

/// Strategy returns of the HiLo signal with the given window.
pub fn trade_returns(series: &PriceSeries, period: usize) -> Vec<f64> {
    let signals = hilo::compute(series, period).signals();
    trade_returns_from_signals(series.bars(), &signals)
}

/// Average win over average loss magnitude.
///
/// - no returns, or no winners: `0.0`
/// - winners but no losers: `f64::INFINITY`
///
/// Returns of exactly zero count as neither.
pub fn payoff_ratio(returns: &[f64]) -> f64 {
    PayoffStats::from_returns(returns).payoff
}

/// Payoff ratio of the HiLo signal with the given window.
pub fn evaluate(series: &PriceSeries, period: usize) -> f64 {
    payoff_ratio(&trade_returns(series, period))
}

/// Serde adapter for payoff ratios. JSON has no infinity, so an unbounded
/// ratio is written as the string `"inf"`.
pub mod ratio_serde {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_infinite() && value.is_sign_positive() {
            serializer.serialize_str("inf")
        } else {
            serializer.serialize_f64(*value)
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Ratio {
            Number(f64),
            Text(String),
        }

        match Ratio::deserialize(deserializer)? {
            Ratio::Number(v) => Ok(v),
            Ratio::Text(s) if s.eq_ignore_ascii_case("inf") => Ok(f64::INFINITY),
            Ratio::Text(s) => Err(serde::de::Error::custom(format!(
                "invalid payoff ratio '{s}'"
            ))),
        }
    }
}

/// Breakdown of a trade-return list.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PayoffStats {
    /// Returns that survived filtering, zeros included.
    pub samples: usize,
    pub winners: usize,
    pub losers: usize,
    pub mean_win: f64,
    /// Mean magnitude of losing returns (positive).
    pub mean_loss: f64,
    #[serde(with = "ratio_serde")]
    pub payoff: f64,
}

impl PayoffStats {
    pub fn from_returns(returns: &[f64]) -> Self {
        let mut win_sum = 0.0;
        let mut winners = 0usize;
        let mut loss_sum = 0.0;
        let mut losers = 0usize;

        for &r in returns {
            if r > 0.0 {
                win_sum += r;
                winners += 1;
            } else if r < 0.0 {
                loss_sum += r.abs();
                losers += 1;
            }
        }

        let mean_win = if winners > 0 {
            win_sum / winners as f64
        } else {
            0.0
        };
        let mean_loss = if losers > 0 {
            loss_sum / losers as f64
        } else {
            0.0
        };

        let payoff = if winners == 0 {
            0.0
        } else if losers == 0 {
            f64::INFINITY
        } else {
            mean_win / mean_loss
        };

        Self {
            samples: returns.len(),
            winners,
            losers,
            mean_win,
            mean_loss,
            payoff,
        }
    }

    pub fn for_period(series: &PriceSeries, period: usize) -> Self {
        Self::from_returns(&trade_returns(series, period))
    }

    /// Share of samples that were winners. Zero when there are no samples.
    pub fn hit_rate(&self) -> f64 {
        if self.samples == 0 {
            0.0
        } else {
            self.winners as f64 / self.samples as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_bars, make_hlc_bars};

    fn series(closes: &[f64]) -> PriceSeries {
        PriceSeries::new(make_bars(closes)).unwrap()
    }

    const ZIGZAG: [f64; 10] = [10.0, 11.0, 12.0, 11.0, 10.0, 11.0, 12.0, 13.0, 12.0, 11.0];

    #[test]
    fn forward_returns_skip_last_bar() {
        let bars = make_bars(&[10.0, 11.0, 9.9]);
        let r = forward_returns(&bars);
        assert_eq!(r.len(), 3);
        assert_approx(r[0].unwrap(), 0.1, 1e-12);
        assert_approx(r[1].unwrap(), -0.1, 1e-12);
        assert_eq!(r[2], None);
    }

    #[test]
    fn zero_close_return_is_missing() {
        let bars = make_hlc_bars(&[(1.0, 0.0, 0.0), (2.0, 0.0, 1.0)]);
        assert_eq!(forward_returns(&bars)[0], None);
    }

    #[test]
    fn signal_lag_hand_computed() {
        // period 2 signals: [-, B, B, b, b, B, B, B, b, b] (B bullish, b bearish)
        let s = series(&ZIGZAG);
        let returns = trade_returns(&s, 2);
        let expected = [
            -1.0 / 12.0, // signal[1]=B, ret[2]=11/12-1
            -1.0 / 11.0, // signal[2]=B, ret[3]=10/11-1
            0.0,
            0.0,
            1.0 / 12.0, // signal[5]=B, ret[6]=13/12-1
            -1.0 / 13.0,
            -1.0 / 12.0,
        ];
        assert_eq!(returns.len(), expected.len());
        for (a, e) in returns.iter().zip(expected.iter()) {
            assert_approx(*a, *e, 1e-12);
        }

        let mean_loss = (1.0 / 12.0 + 1.0 / 11.0 + 1.0 / 13.0 + 1.0 / 12.0) / 4.0;
        assert_approx(evaluate(&s, 2), (1.0 / 12.0) / mean_loss, 1e-12);
    }

    #[test]
    fn first_usable_index_needs_period_plus_two_bars() {
        let closes: Vec<f64> = (0..7).map(|i| 100.0 + i as f64).collect();
        // period 5: signal defined from index 4, return needs close[6]
        assert_eq!(trade_returns(&series(&closes), 5).len(), 1);
        assert!(trade_returns(&series(&closes[..6]), 5).is_empty());
    }

    #[test]
    fn empty_list_pays_zero() {
        assert_eq!(payoff_ratio(&[]), 0.0);
        assert_eq!(evaluate(&PriceSeries::empty(), 20), 0.0);
        assert_eq!(evaluate(&series(&[10.0, 11.0, 12.0]), 20), 0.0);
    }

    #[test]
    fn no_losers_is_infinite() {
        assert_eq!(payoff_ratio(&[0.01, 0.02, 0.0]), f64::INFINITY);
    }

    #[test]
    fn no_winners_is_zero() {
        assert_eq!(payoff_ratio(&[-0.01, -0.02]), 0.0);
        assert_eq!(payoff_ratio(&[0.0, 0.0, 0.0]), 0.0);
    }

    #[test]
    fn zeros_are_excluded_from_both_sides() {
        let stats = PayoffStats::from_returns(&[0.02, 0.04, -0.01, -0.03, 0.0, 0.0]);
        assert_eq!(stats.samples, 6);
        assert_eq!(stats.winners, 2);
        assert_eq!(stats.losers, 2);
        assert_approx(stats.mean_win, 0.03, 1e-12);
        assert_approx(stats.mean_loss, 0.02, 1e-12);
        assert_approx(stats.payoff, 1.5, 1e-12);
        assert_approx(stats.hit_rate(), 2.0 / 6.0, 1e-12);
    }

    #[test]
    fn monotonic_rise_is_infinite_for_every_grid_period() {
        let closes: Vec<f64> = (0..70).map(|i| 100.0 + i as f64).collect();
        let s = series(&closes);
        for period in (5..=60).step_by(5) {
            assert_eq!(evaluate(&s, period), f64::INFINITY, "period {period}");
        }
    }

    #[test]
    fn flat_series_pays_zero() {
        let bars = make_hlc_bars(&[(10.0, 10.0, 10.0); 70]);
        let s = PriceSeries::new(bars).unwrap();
        for period in (5..=60).step_by(5) {
            assert_eq!(evaluate(&s, period), 0.0);
        }
    }

    #[test]
    fn infinite_payoff_survives_json() {
        let stats = PayoffStats::from_returns(&[0.01, 0.03]);
        let json = serde_json::to_string(&stats).unwrap();
        assert!(json.contains(r#""payoff":"inf""#));
        let back: PayoffStats = serde_json::from_str(&json).unwrap();
        assert_eq!(back.payoff, f64::INFINITY);

        let finite = PayoffStats::from_returns(&[0.02, -0.01]);
        let back: PayoffStats =
            serde_json::from_str(&serde_json::to_string(&finite).unwrap()).unwrap();
        assert_eq!(back, finite);
    }

    #[test]
    fn bearish_signal_never_loses() {
        // Falling closes keep the oscillator near zero: flat the whole way.
        let closes: Vec<f64> = (0..40).map(|i| 200.0 - i as f64).collect();
        let stats = PayoffStats::for_period(&series(&closes), 5);
        assert!(stats.samples > 0);
        assert_eq!(stats.winners, 0);
        assert_eq!(stats.losers, 0);
        assert_eq!(stats.payoff, 0.0);
    }
}
