//! Trend direction: the boolean signal behind every report.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction of the HiLo signal at a bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Bullish,
    Bearish,
}

impl Trend {
    /// Position size implied by the signal: fully long or flat.
    pub fn exposure(self) -> f64 {
        match self {
            Trend::Bullish => 1.0,
            Trend::Bearish => 0.0,
        }
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trend::Bullish => f.write_str("bullish"),
            Trend::Bearish => f.write_str("bearish"),
        }
    }
}
