//! Bar: the fundamental market data unit.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// High/low/close observation for a single day.
///
/// Only the three prices the HiLo oscillator reads are carried; open, volume
/// and adjusted close are dropped at load time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub date: NaiveDate,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl Bar {
    pub fn new(date: NaiveDate, high: f64, low: f64, close: f64) -> Self {
        Self {
            date,
            high,
            low,
            close,
        }
    }

    /// Returns true if any price field is NaN or infinite.
    pub fn is_void(&self) -> bool {
        !(self.high.is_finite() && self.low.is_finite() && self.close.is_finite())
    }
}
