//! HiLo: position of the close inside the rolling high/low range, 0..=100.
//!
//! hh = max(high[t-period+1..=t]), ll = min(low[t-period+1..=t])
//! hilo = (close - ll) / (hh - ll) * 100
//!
//! The first `period - 1` entries lack history. A flat window (hh == ll)
//! carries no information and is reported as `Undefined` rather than divided
//! by zero.

use serde::{Deserialize, Serialize};

use crate::domain::{Bar, PriceSeries, Trend};

/// Oscillator level separating bullish from bearish bars.
pub const MIDPOINT: f64 = 50.0;

/// One entry of the oscillator series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum OscillatorValue {
    /// Fewer than `period` bars end at this index.
    InsufficientHistory,
    /// Rolling high equals rolling low.
    Undefined,
    Value(f64),
}

impl OscillatorValue {
    pub fn value(self) -> Option<f64> {
        match self {
            OscillatorValue::Value(v) => Some(v),
            _ => None,
        }
    }

    /// Signal at this bar.
    ///
    /// Strictly above the midpoint is bullish. `Undefined` collapses to
    /// bearish; only `InsufficientHistory` has no signal at all.
    pub fn signal(self) -> Option<Trend> {
        match self {
            OscillatorValue::InsufficientHistory => None,
            OscillatorValue::Undefined => Some(Trend::Bearish),
            OscillatorValue::Value(v) if v > MIDPOINT => Some(Trend::Bullish),
            OscillatorValue::Value(_) => Some(Trend::Bearish),
        }
    }
}

/// Oscillator output aligned 1:1 with the bars it was computed from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OscillatorSeries {
    period: usize,
    values: Vec<OscillatorValue>,
}

impl OscillatorSeries {
    pub fn period(&self) -> usize {
        self.period
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<OscillatorValue> {
        self.values.get(index).copied()
    }

    pub fn last(&self) -> Option<OscillatorValue> {
        self.values.last().copied()
    }

    pub fn values(&self) -> &[OscillatorValue] {
        &self.values
    }

    pub fn iter(&self) -> impl Iterator<Item = OscillatorValue> + '_ {
        self.values.iter().copied()
    }

    /// Signal series: one `Option<Trend>` per bar.
    pub fn signals(&self) -> Vec<Option<Trend>> {
        self.values.iter().map(|v| v.signal()).collect()
    }
}

/// Compute the oscillator over a validated price series.
pub fn compute(series: &PriceSeries, period: usize) -> OscillatorSeries {
    compute_bars(series.bars(), period)
}

/// Compute the oscillator over raw bars. `period == 0` yields an
/// all-`InsufficientHistory` series.
pub fn compute_bars(bars: &[Bar], period: usize) -> OscillatorSeries {
    let n = bars.len();
    let mut values = vec![OscillatorValue::InsufficientHistory; n];

    if period == 0 || n < period {
        return OscillatorSeries { period, values };
    }

    for i in (period - 1)..n {
        let window = &bars[i + 1 - period..=i];

        let mut hh = f64::NEG_INFINITY;
        let mut ll = f64::INFINITY;
        for bar in window {
            hh = hh.max(bar.high);
            ll = ll.min(bar.low);
        }

        values[i] = if hh == ll {
            OscillatorValue::Undefined
        } else {
            let raw = (bars[i].close - ll) / (hh - ll) * 100.0;
            if raw.is_finite() {
                OscillatorValue::Value(raw.clamp(0.0, 100.0))
            } else {
                OscillatorValue::Undefined
            }
        };
    }

    OscillatorSeries { period, values }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_bars, make_hlc_bars, DEFAULT_EPSILON};

    #[test]
    fn hilo_3_hand_computed() {
        let bars = make_hlc_bars(&[
            (12.0, 9.0, 11.0),
            (15.0, 10.0, 14.0),
            (14.0, 13.0, 13.5),
            (16.0, 12.0, 15.0),
            (15.5, 14.0, 14.5),
        ]);
        let osc = compute_bars(&bars, 3);

        assert_eq!(osc.get(0), Some(OscillatorValue::InsufficientHistory));
        assert_eq!(osc.get(1), Some(OscillatorValue::InsufficientHistory));
        // [2]: hh=15, ll=9 -> (13.5-9)/6*100 = 75
        assert_approx(osc.get(2).unwrap().value().unwrap(), 75.0, DEFAULT_EPSILON);
        // [3]: hh=16, ll=10 -> (15-10)/6*100
        assert_approx(
            osc.get(3).unwrap().value().unwrap(),
            500.0 / 6.0,
            DEFAULT_EPSILON,
        );
        // [4]: hh=16, ll=12 -> (14.5-12)/4*100 = 62.5
        assert_approx(osc.get(4).unwrap().value().unwrap(), 62.5, DEFAULT_EPSILON);
    }

    #[test]
    fn short_series_is_all_insufficient() {
        let bars = make_bars(&[10.0, 11.0, 12.0]);
        let osc = compute_bars(&bars, 5);
        assert_eq!(osc.len(), 3);
        assert!(osc
            .iter()
            .all(|v| v == OscillatorValue::InsufficientHistory));
        assert!(osc.signals().iter().all(|s| s.is_none()));
    }

    #[test]
    fn empty_and_zero_period_do_not_panic() {
        assert!(compute_bars(&[], 5).is_empty());

        let bars = make_bars(&[10.0, 11.0]);
        let osc = compute_bars(&bars, 0);
        assert!(osc
            .iter()
            .all(|v| v == OscillatorValue::InsufficientHistory));
    }

    #[test]
    fn flat_range_is_undefined_and_bearish() {
        let bars = make_hlc_bars(&[(10.0, 10.0, 10.0); 6]);
        let osc = compute_bars(&bars, 3);
        for i in 2..6 {
            assert_eq!(osc.get(i), Some(OscillatorValue::Undefined));
            assert_eq!(osc.get(i).unwrap().signal(), Some(Trend::Bearish));
        }
    }

    #[test]
    fn midpoint_is_bearish() {
        // hh=12, ll=8, close=10 -> exactly 50
        let bars = make_hlc_bars(&[(12.0, 8.0, 10.0)]);
        let osc = compute_bars(&bars, 1);
        assert_approx(osc.get(0).unwrap().value().unwrap(), 50.0, DEFAULT_EPSILON);
        assert_eq!(osc.get(0).unwrap().signal(), Some(Trend::Bearish));
    }

    #[test]
    fn close_outside_range_is_clamped() {
        let bars = make_hlc_bars(&[(10.0, 8.0, 12.0), (10.0, 8.0, 6.0)]);
        let osc = compute_bars(&bars, 1);
        assert_eq!(osc.get(0), Some(OscillatorValue::Value(100.0)));
        assert_eq!(osc.get(1), Some(OscillatorValue::Value(0.0)));
    }

    #[test]
    fn rising_closes_saturate_high() {
        let closes: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
        let osc = compute_bars(&make_bars(&closes), 10);
        for i in 9..30 {
            let v = osc.get(i).unwrap().value().unwrap();
            // (9 + 1) / (9 + 2) * 100
            assert_approx(v, 1000.0 / 11.0, 1e-9);
            assert_eq!(osc.get(i).unwrap().signal(), Some(Trend::Bullish));
        }
    }

    #[test]
    fn no_lookahead() {
        let closes: Vec<f64> = (0..40).map(|i| 100.0 + (i as f64 * 0.7).sin() * 5.0).collect();
        let bars = make_bars(&closes);
        let full = compute_bars(&bars, 7);
        let truncated = compute_bars(&bars[..25], 7);
        for i in 0..25 {
            assert_eq!(full.get(i), truncated.get(i));
        }
    }

    #[test]
    fn oscillator_value_serializes_tagged() {
        let json = serde_json::to_string(&OscillatorValue::Value(42.0)).unwrap();
        assert_eq!(json, r#"{"state":"value","value":42.0}"#);
        let json = serde_json::to_string(&OscillatorValue::Undefined).unwrap();
        assert_eq!(json, r#"{"state":"undefined"}"#);
    }
}
