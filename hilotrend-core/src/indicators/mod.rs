//! Indicators: bar history in, one value per bar out.
//!
//! The HiLo oscillator is the only indicator. Its output keeps missing values
//! as explicit states so callers never have to interpret `NaN`.
//!
//! # Look-ahead contamination guard
//! No indicator value at bar t may depend on price data from bar t+1 or later.

pub mod hilo;

pub use hilo::{compute, compute_bars, OscillatorSeries, OscillatorValue, MIDPOINT};

#[cfg(test)]
use crate::domain::Bar;

/// Create synthetic bars from close prices for testing.
///
/// high = close + 1.0, low = close - 1.0, one bar per calendar day.
#[cfg(test)]
pub fn make_bars(closes: &[f64]) -> Vec<Bar> {
    let base_date = chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| Bar {
            date: base_date + chrono::Duration::days(i as i64),
            high: close + 1.0,
            low: close - 1.0,
            close,
        })
        .collect()
}

/// Create bars from explicit (high, low, close) triples for testing.
#[cfg(test)]
pub fn make_hlc_bars(data: &[(f64, f64, f64)]) -> Vec<Bar> {
    let base_date = chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    data.iter()
        .enumerate()
        .map(|(i, &(high, low, close))| Bar {
            date: base_date + chrono::Duration::days(i as i64),
            high,
            low,
            close,
        })
        .collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
