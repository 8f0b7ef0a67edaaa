//! Bar loading for the runner.
//!
//! Reads an already-downloaded daily CSV (Yahoo Finance export layout or a
//! plain `date,high,low,close` file) into a validated [`PriceSeries`].
//! Rows are sorted by date; rows with a missing or non-finite price are
//! skipped and counted; duplicate dates are rejected.
//!
//! The loaded data carries a BLAKE3 dataset hash so reports can be traced
//! back to the exact bars they were computed on.

use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use hilotrend_core::domain::{Bar, PriceSeries, SeriesError};

/// Errors from the data loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to open {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("row {row}: unparseable date '{value}'")]
    BadDate { row: usize, value: String },

    #[error("invalid series: {0}")]
    Series(#[from] SeriesError),
}

/// Result of loading bars, with provenance.
#[derive(Debug, Clone)]
pub struct LoadedData {
    pub series: PriceSeries,
    /// Dataset hash for report provenance (BLAKE3 over all bar data).
    pub dataset_hash: String,
    /// Rows dropped for missing or non-finite prices.
    pub skipped_rows: usize,
    /// Where the bars came from (file path or caller-supplied label).
    pub source: String,
}

impl LoadedData {
    /// Wrap an in-memory series.
    pub fn from_series(series: PriceSeries, source: impl Into<String>) -> Self {
        Self {
            dataset_hash: dataset_hash(&series),
            series,
            skipped_rows: 0,
            source: source.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(alias = "Date", alias = "Datetime", alias = "datetime", alias = "timestamp")]
    date: String,
    #[serde(alias = "High", default, deserialize_with = "csv::invalid_option")]
    high: Option<f64>,
    #[serde(alias = "Low", default, deserialize_with = "csv::invalid_option")]
    low: Option<f64>,
    #[serde(alias = "Close", default, deserialize_with = "csv::invalid_option")]
    close: Option<f64>,
}

/// Load a CSV file from disk.
pub fn load_csv(path: &Path) -> Result<LoadedData, LoadError> {
    let file = std::fs::File::open(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    read_csv(file, path.display().to_string())
}

/// Parse CSV bars from any reader.
pub fn read_csv<R: Read>(reader: R, source: impl Into<String>) -> Result<LoadedData, LoadError> {
    let source = source.into();
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut bars = Vec::new();
    let mut skipped_rows = 0;

    for (i, record) in rdr.deserialize::<CsvRow>().enumerate() {
        let row = record?;
        // Header is line 1; first data row is row 2.
        let row_number = i + 2;
        let date = parse_date(&row.date).ok_or_else(|| LoadError::BadDate {
            row: row_number,
            value: row.date.clone(),
        })?;

        match (row.high, row.low, row.close) {
            (Some(high), Some(low), Some(close))
                if high.is_finite() && low.is_finite() && close.is_finite() =>
            {
                bars.push(Bar::new(date, high, low, close));
            }
            _ => {
                debug!(row = row_number, %date, "skipping row with missing price");
                skipped_rows += 1;
            }
        }
    }

    if skipped_rows > 0 {
        warn!(%source, skipped_rows, "dropped rows with missing or non-finite prices");
    }

    bars.sort_by_key(|b| b.date);
    let series = PriceSeries::new(bars)?;

    Ok(LoadedData {
        dataset_hash: dataset_hash(&series),
        series,
        skipped_rows,
        source,
    })
}

/// Accepts `YYYY-MM-DD` optionally followed by a time part
/// (`2024-01-02 00:00:00-05:00`, `2024-01-02T00:00:00Z`).
fn parse_date(raw: &str) -> Option<NaiveDate> {
    let day = raw.get(..10)?;
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

/// BLAKE3 over every bar's date and prices, hex encoded.
pub fn dataset_hash(series: &PriceSeries) -> String {
    let mut hasher = blake3::Hasher::new();
    for bar in series {
        hasher.update(bar.date.to_string().as_bytes());
        hasher.update(&bar.high.to_le_bytes());
        hasher.update(&bar.low.to_le_bytes());
        hasher.update(&bar.close.to_le_bytes());
    }
    hasher.finalize().to_hex().to_string()
}
