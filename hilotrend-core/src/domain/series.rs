//! Price series: validated, date-ordered bar history for one instrument.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::bar::Bar;

/// Reasons a bar sequence cannot become a [`PriceSeries`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SeriesError {
    #[error("bar {index} ({date}) has a non-finite price")]
    NonFinitePrice { index: usize, date: NaiveDate },

    #[error("bar {index} ({date}) has high {high} below low {low}")]
    InvertedRange {
        index: usize,
        date: NaiveDate,
        high: f64,
        low: f64,
    },

    #[error("bar {index} ({date}) is not after the previous bar ({previous})")]
    OutOfOrder {
        index: usize,
        date: NaiveDate,
        previous: NaiveDate,
    },

    #[error("duplicate bar for {date} at index {index}")]
    DuplicateDate { index: usize, date: NaiveDate },
}

/// Immutable bar history sorted ascending by date with no duplicate dates.
///
/// An empty series is valid. Every engine operation accepts it and encodes
/// the lack of data in its output instead of failing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Bar>", into = "Vec<Bar>")]
pub struct PriceSeries {
    bars: Vec<Bar>,
}

impl PriceSeries {
    /// Validate and wrap a bar sequence.
    pub fn new(bars: Vec<Bar>) -> Result<Self, SeriesError> {
        for (index, bar) in bars.iter().enumerate() {
            if bar.is_void() {
                return Err(SeriesError::NonFinitePrice {
                    index,
                    date: bar.date,
                });
            }
            if bar.high < bar.low {
                return Err(SeriesError::InvertedRange {
                    index,
                    date: bar.date,
                    high: bar.high,
                    low: bar.low,
                });
            }
            if index > 0 {
                let previous = bars[index - 1].date;
                if bar.date == previous {
                    return Err(SeriesError::DuplicateDate {
                        index,
                        date: bar.date,
                    });
                }
                if bar.date < previous {
                    return Err(SeriesError::OutOfOrder {
                        index,
                        date: bar.date,
                        previous,
                    });
                }
            }
        }
        Ok(Self { bars })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn get(&self, index: usize) -> Option<&Bar> {
        self.bars.get(index)
    }

    pub fn first(&self) -> Option<&Bar> {
        self.bars.first()
    }

    pub fn last(&self) -> Option<&Bar> {
        self.bars.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Bar> {
        self.bars.iter()
    }

    /// Date of the bar at `index`.
    pub fn date(&self, index: usize) -> Option<NaiveDate> {
        self.bars.get(index).map(|b| b.date)
    }
}

impl TryFrom<Vec<Bar>> for PriceSeries {
    type Error = SeriesError;

    fn try_from(bars: Vec<Bar>) -> Result<Self, Self::Error> {
        Self::new(bars)
    }
}

impl From<PriceSeries> for Vec<Bar> {
    fn from(series: PriceSeries) -> Self {
        series.bars
    }
}

impl<'a> IntoIterator for &'a PriceSeries {
    type Item = &'a Bar;
    type IntoIter = std::slice::Iter<'a, Bar>;

    fn into_iter(self) -> Self::IntoIter {
        self.bars.iter()
    }
}
