//! Trend change locator.
//!
//! Finds the last bar at which the HiLo signal flipped direction. Bars in the
//! warmup window have no signal and never count as a flip.

use chrono::NaiveDate;

use crate::domain::{PriceSeries, Trend};
use crate::indicators::hilo;

/// Index of the last bar whose signal differs from the previous bar's.
/// Both bars must carry a signal.
pub fn last_change_index(signals: &[Option<Trend>]) -> Option<usize> {
    signals
        .windows(2)
        .enumerate()
        .rev()
        .find_map(|(i, pair)| match (pair[0], pair[1]) {
            (Some(prev), Some(curr)) if prev != curr => Some(i + 1),
            _ => None,
        })
}

/// Date of the most recent signal flip for the given window.
///
/// Falls back to the date of the final bar when the signal never flips.
/// `None` only for an empty series.
pub fn last_change(series: &PriceSeries, period: usize) -> Option<NaiveDate> {
    let signals = hilo::compute(series, period).signals();
    match last_change_index(&signals) {
        Some(i) => series.date(i),
        None => series.last().map(|b| b.date),
    }
}

/// Signal at the final bar. A missing signal reads as bearish.
pub fn current_trend(series: &PriceSeries, period: usize) -> Trend {
    hilo::compute(series, period)
        .last()
        .and_then(|v| v.signal())
        .unwrap_or(Trend::Bearish)
}
