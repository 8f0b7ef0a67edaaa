//! HiLo Trend Core: price series, HiLo oscillator, payoff evaluation,
//! period optimizer and trend change locator.
//!
//! This crate contains the whole engine:
//! - Domain types (bars, validated price series, instruments, trend)
//! - HiLo oscillator with explicit missing-value states
//! - Payoff evaluation of the one-bar-lagged HiLo signal
//! - Grid search over candidate windows with asset-class acceptance rules
//! - Trend change locator and the composed analysis verdict
//!
//! Every engine operation is pure. Degenerate inputs (short or empty series,
//! flat ranges, no trades) are encoded in the output, never raised.

pub mod analysis;
pub mod domain;
pub mod indicators;
pub mod optimizer;
pub mod payoff;
pub mod trend;

pub use analysis::{analyze, TrendReport, Verdict};
pub use domain::{AssetClass, Bar, Instrument, PriceSeries, SeriesError, Trend};
pub use optimizer::{optimize, optimize_with, OptimizerConfig, PayoffResult};
pub use payoff::evaluate;
pub use trend::last_change;
