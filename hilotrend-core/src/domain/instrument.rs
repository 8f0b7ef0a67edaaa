//! Instruments: asset class and provider ticker for a user-supplied symbol.
//!
//! Crypto and stocks differ in one place only: the optimizer demands a
//! minimum payoff before it accepts a crypto window.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Asset class of an instrument. Decides the optimizer's acceptance rule.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum AssetClass {
    Crypto,
    Stock,
}

impl AssetClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetClass::Crypto => "crypto",
            AssetClass::Stock => "stock",
        }
    }
}

impl fmt::Display for AssetClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown asset class '{0}' (expected 'crypto' or 'stock')")]
pub struct ParseAssetClassError(pub String);

impl FromStr for AssetClass {
    type Err = ParseAssetClassError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "crypto" => Ok(AssetClass::Crypto),
            "stock" | "equity" => Ok(AssetClass::Stock),
            _ => Err(ParseAssetClassError(s.to_string())),
        }
    }
}

/// Rules for turning a user-supplied symbol into a data-provider ticker.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Substrings that mark a symbol as a crypto asset.
    pub crypto_markers: Vec<String>,
    /// Quote currency appended to crypto tickers (`BTC` -> `BTC-USD`).
    pub crypto_quote: String,
    /// Exchange suffix appended to stock tickers (`PETR4` -> `PETR4.SA`).
    pub stock_suffix: String,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            crypto_markers: ["BTC", "ETH", "XRP", "USDT"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            crypto_quote: "USD".to_string(),
            stock_suffix: ".SA".to_string(),
        }
    }
}

/// A classified symbol: what the user typed, what the provider expects, and
/// which acceptance rule applies.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Instrument {
    pub symbol: String,
    pub ticker: String,
    pub asset_class: AssetClass,
}

impl Instrument {
    pub fn new(
        symbol: impl Into<String>,
        ticker: impl Into<String>,
        asset_class: AssetClass,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            ticker: ticker.into(),
            asset_class,
        }
    }
}

/// Classify a symbol and normalize it to a provider ticker.
///
/// Crypto symbols get `-{quote}` appended unless they already end with the
/// quote currency. Stock symbols get the exchange suffix unless they already
/// carry it or any other `.` suffix.
pub fn classify(symbol: &str, config: &ClassifierConfig) -> Instrument {
    let symbol = symbol.trim().to_uppercase();

    let is_crypto = config
        .crypto_markers
        .iter()
        .any(|marker| !marker.is_empty() && symbol.contains(&marker.to_uppercase()));

    if is_crypto {
        let quote = config.crypto_quote.to_uppercase();
        let ticker = if symbol.ends_with(&quote) {
            symbol.clone()
        } else {
            format!("{symbol}-{quote}")
        };
        Instrument::new(symbol, ticker, AssetClass::Crypto)
    } else {
        let suffix = config.stock_suffix.to_uppercase();
        let ticker = if symbol.ends_with(&suffix) || symbol.contains('.') {
            symbol.clone()
        } else {
            format!("{symbol}{suffix}")
        };
        Instrument::new(symbol, ticker, AssetClass::Stock)
    }
}
