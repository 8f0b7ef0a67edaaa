//! HiLo Trend Runner: analysis orchestration on top of `hilotrend-core`.
//!
//! This crate provides:
//! - TOML analysis configuration with validated defaults
//! - CSV bar loading with dataset hashing
//! - Single-analysis runner producing the candidate table and verdict
//! - JSON/CSV artifact export and a text caption

pub mod config;
pub mod data_loader;
pub mod export;
pub mod runner;

pub use config::{AnalysisConfig, ConfigError};
pub use data_loader::{load_csv, read_csv, LoadError, LoadedData};
pub use export::{caption, export_json, format_payoff, save_artifacts};
pub use runner::{
    run_analysis, run_analysis_from_file, scan_candidates, AnalysisRun, CandidateRow, RunError,
};

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn analysis_run_is_send_sync() {
        assert_send::<AnalysisRun>();
        assert_sync::<AnalysisRun>();
    }

    #[test]
    fn config_types_are_send_sync() {
        assert_send::<AnalysisConfig>();
        assert_sync::<AnalysisConfig>();
        assert_send::<LoadedData>();
        assert_sync::<LoadedData>();
    }
}
