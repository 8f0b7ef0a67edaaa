//! Domain types for HiLo Trend

pub mod bar;
pub mod instrument;
pub mod series;
pub mod trend;

pub use bar::Bar;
pub use instrument::{classify, AssetClass, ClassifierConfig, Instrument, ParseAssetClassError};
pub use series::{PriceSeries, SeriesError};
pub use trend::Trend;
