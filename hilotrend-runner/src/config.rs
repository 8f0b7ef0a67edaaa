//! Analysis configuration loaded from TOML.
//!
//! Every field has a default, so an empty file (or no file at all) yields the
//! standard twelve-window grid, the 20-bar baseline and the crypto threshold
//! of 3. A top-level `period` pins the lookback window instead of letting the
//! optimizer choose it.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use hilotrend_core::domain::ClassifierConfig;
use hilotrend_core::optimizer::OptimizerConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Fixed lookback window. `None` lets the optimizer pick the best one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<usize>,
    pub optimizer: OptimizerConfig,
    pub classifier: ClassifierConfig,
}

impl AnalysisConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: AnalysisConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path` if given, otherwise fall back to defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => Self::from_file(p),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.period == Some(0) {
            return Err(ConfigError::Invalid("period must be positive".into()));
        }
        let opt = &self.optimizer;
        if opt.candidates.is_empty() {
            return Err(ConfigError::Invalid(
                "optimizer.candidates must not be empty".into(),
            ));
        }
        if opt.candidates.contains(&0) {
            return Err(ConfigError::Invalid(
                "optimizer.candidates must be positive".into(),
            ));
        }
        if opt.default_period == 0 {
            return Err(ConfigError::Invalid(
                "optimizer.default_period must be positive".into(),
            ));
        }
        if !opt.crypto_min_payoff.is_finite() || opt.crypto_min_payoff < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "optimizer.crypto_min_payoff must be a non-negative number, got {}",
                opt.crypto_min_payoff
            )));
        }
        if self.classifier.crypto_quote.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "classifier.crypto_quote must not be empty".into(),
            ));
        }
        Ok(())
    }
}
