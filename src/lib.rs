// Fraud Hunter - Core Library
// Forensic anomaly detection over transaction ledgers, shared by the CLI,
// the dashboard and the API server.

pub mod error;
pub mod dataset;
pub mod config;
pub mod detectors;   // Duplicates, weekend timing, round numbers, threshold avoidance
pub mod benford;
pub mod fuzzy;
pub mod report;      // Aggregator + risk summary export
pub mod ingest;      // CSV/JSON → Dataset
pub mod format;

#[cfg(feature = "server")]
pub mod api;

// Re-export commonly used types
pub use error::{AnalysisError, Result};
pub use dataset::{Dataset, Transaction};
pub use config::AnalysisConfig;
pub use detectors::{
    detect_duplicate_payments, detect_round_numbers, detect_threshold_avoidance,
    detect_unusual_timing,
};
pub use benford::{analyze_benford, BenfordAnalysis, BenfordRow};
pub use fuzzy::{detect_fuzzy_duplicates, similarity_ratio, FuzzyMatchPair};
pub use report::{
    control_recommendations, render_summary_table, run_analysis, write_risk_summary_csv,
    AnalysisReport, AnalysisResponse, ReportDetails, RiskSummary, Section,
};
pub use ingest::{detect_columns, AutoMapping, ColumnMapping, IngestOutcome, RawTable};
pub use format::CurrencyFormat;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
