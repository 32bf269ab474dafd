// 🧾 Result Aggregator - Runs every detector and assembles summary + details
//
// Each section is stored as its own Result: a failed section is reported by
// name and never hides the others.

use crate::benford::{analyze_benford, BenfordAnalysis, BenfordRow};
use crate::config::AnalysisConfig;
use crate::dataset::{Dataset, Transaction};
use crate::detectors::{
    detect_duplicate_payments, detect_round_numbers, detect_threshold_avoidance,
    detect_unusual_timing,
};
use crate::error::{AnalysisError, Result};
use crate::fuzzy::{detect_fuzzy_duplicates, FuzzyMatchPair};
use anyhow::Context as AnyhowContext;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Instant;

// ============================================================================
// SECTIONS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Duplicates,
    UnusualTiming,
    RoundNumbers,
    ThresholdFlags,
    Benford,
    FuzzyDuplicates,
}

impl Section {
    pub const ALL: [Section; 6] = [
        Section::Duplicates,
        Section::UnusualTiming,
        Section::RoundNumbers,
        Section::ThresholdFlags,
        Section::Benford,
        Section::FuzzyDuplicates,
    ];

    /// Exact-match sections that produce transaction rows
    pub const ROW_SECTIONS: [Section; 4] = [
        Section::Duplicates,
        Section::UnusualTiming,
        Section::RoundNumbers,
        Section::ThresholdFlags,
    ];

    /// JSON key
    pub fn key(&self) -> &'static str {
        match self {
            Section::Duplicates => "duplicates",
            Section::UnusualTiming => "unusual_timing",
            Section::RoundNumbers => "round_numbers",
            Section::ThresholdFlags => "threshold_flags",
            Section::Benford => "benford",
            Section::FuzzyDuplicates => "fuzzy_duplicates",
        }
    }

    /// Label used in exports and the CLI summary
    pub fn label(&self) -> &'static str {
        match self {
            Section::Duplicates => "Duplicate Payments",
            Section::UnusualTiming => "Unusual Timing",
            Section::RoundNumbers => "Round-Number Abuse",
            Section::ThresholdFlags => "Threshold Avoidance",
            Section::Benford => "Benford Digits",
            Section::FuzzyDuplicates => "Fuzzy Vendor Pairs",
        }
    }
}

pub type SectionResult<T> = std::result::Result<T, AnalysisError>;

// ============================================================================
// REPORT
// ============================================================================

#[derive(Debug, Clone)]
pub struct AnalysisReport {
    pub total_transactions: usize,
    pub threshold_amount: f64,
    pub fuzzy_cutoff: u8,

    pub duplicates: SectionResult<Vec<Transaction>>,
    pub unusual_timing: SectionResult<Vec<Transaction>>,
    pub round_numbers: SectionResult<Vec<Transaction>>,
    pub threshold_flags: SectionResult<Vec<Transaction>>,
    pub benford: SectionResult<BenfordAnalysis>,
    pub fuzzy_duplicates: SectionResult<Vec<FuzzyMatchPair>>,
}

impl AnalysisReport {
    /// Flagged rows of one exact-match section (None for Benford/fuzzy)
    pub fn rows(&self, section: Section) -> Option<&SectionResult<Vec<Transaction>>> {
        match section {
            Section::Duplicates => Some(&self.duplicates),
            Section::UnusualTiming => Some(&self.unusual_timing),
            Section::RoundNumbers => Some(&self.round_numbers),
            Section::ThresholdFlags => Some(&self.threshold_flags),
            Section::Benford | Section::FuzzyDuplicates => None,
        }
    }

    /// Result-set size (Benford: digit rows, 9 or 0). None if the section failed.
    pub fn count(&self, section: Section) -> Option<usize> {
        match section {
            Section::Benford => self.benford.as_ref().ok().map(|b| b.rows.len()),
            Section::FuzzyDuplicates => self.fuzzy_duplicates.as_ref().ok().map(|p| p.len()),
            _ => self
                .rows(section)
                .and_then(|rows| rows.as_ref().ok())
                .map(|rows| rows.len()),
        }
    }

    pub fn error(&self, section: Section) -> Option<&AnalysisError> {
        match section {
            Section::Benford => self.benford.as_ref().err(),
            Section::FuzzyDuplicates => self.fuzzy_duplicates.as_ref().err(),
            _ => self.rows(section).and_then(|rows| rows.as_ref().err()),
        }
    }

    pub fn failures(&self) -> Vec<(Section, &AnalysisError)> {
        Section::ALL
            .iter()
            .filter_map(|s| self.error(*s).map(|e| (*s, e)))
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.failures().is_empty()
    }

    pub fn summary(&self) -> RiskSummary {
        RiskSummary {
            total_transactions: self.total_transactions,
            duplicates: self.count(Section::Duplicates),
            unusual_timing: self.count(Section::UnusualTiming),
            round_numbers: self.count(Section::RoundNumbers),
            threshold_flags: self.count(Section::ThresholdFlags),
            benford: self.count(Section::Benford),
            benford_sample_size: self.benford.as_ref().ok().map(|b| b.sample_size),
            fuzzy_duplicates: self.count(Section::FuzzyDuplicates),
        }
    }

    pub fn details(&self) -> ReportDetails {
        ReportDetails {
            duplicates: self.duplicates.as_ref().ok().cloned(),
            unusual_timing: self.unusual_timing.as_ref().ok().cloned(),
            round_numbers: self.round_numbers.as_ref().ok().cloned(),
            threshold_flags: self.threshold_flags.as_ref().ok().cloned(),
            benford: self.benford.as_ref().ok().map(|b| b.rows.clone()),
            fuzzy_duplicates: self.fuzzy_duplicates.as_ref().ok().cloned(),
        }
    }

    /// Serializable view handed to the request boundary
    pub fn to_response(&self) -> AnalysisResponse {
        AnalysisResponse {
            summary: self.summary(),
            details: self.details(),
            failed_sections: self
                .failures()
                .into_iter()
                .map(|(section, err)| (section.key().to_string(), err.to_string()))
                .collect(),
        }
    }

    /// (label, count) in export order; None marks a failed section
    pub fn summary_rows(&self) -> Vec<(&'static str, Option<usize>)> {
        Section::ALL
            .iter()
            .map(|s| (s.label(), self.count(*s)))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskSummary {
    pub total_transactions: usize,
    pub duplicates: Option<usize>,
    pub unusual_timing: Option<usize>,
    pub round_numbers: Option<usize>,
    pub threshold_flags: Option<usize>,
    pub benford: Option<usize>,
    /// Amounts with a leading digit, not a result-set size
    pub benford_sample_size: Option<usize>,
    pub fuzzy_duplicates: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportDetails {
    pub duplicates: Option<Vec<Transaction>>,
    pub unusual_timing: Option<Vec<Transaction>>,
    pub round_numbers: Option<Vec<Transaction>>,
    pub threshold_flags: Option<Vec<Transaction>>,
    pub benford: Option<Vec<BenfordRow>>,
    pub fuzzy_duplicates: Option<Vec<FuzzyMatchPair>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResponse {
    pub summary: RiskSummary,
    pub details: ReportDetails,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub failed_sections: BTreeMap<String, String>,
}

// ============================================================================
// AGGREGATOR
// ============================================================================

fn run_section<T, F>(section: Section, count: fn(&T) -> usize, detector: F) -> SectionResult<T>
where
    F: FnOnce() -> SectionResult<T>,
{
    let started = Instant::now();
    let result = detector();

    match &result {
        Ok(value) => log::info!("{} flagged: {}", section.label(), count(value)),
        Err(e) => log::warn!("{} failed: {}", section.label(), e),
    }
    log::debug!("{} took {:?}", section.key(), started.elapsed());

    result
}

fn owned(rows: Vec<&Transaction>) -> Vec<Transaction> {
    rows.into_iter().cloned().collect()
}

/// Run the full detector pipeline over one dataset.
///
/// Only parameter errors abort the run; a detector failure is recorded in
/// its own section.
pub fn run_analysis(dataset: &Dataset, config: &AnalysisConfig) -> Result<AnalysisReport> {
    config.validate()?;

    let threshold = config.threshold_amount;
    log::info!(
        "Analyzing {} transactions (threshold {}, fuzzy cutoff {})",
        dataset.len(),
        threshold,
        config.fuzzy_cutoff
    );

    Ok(AnalysisReport {
        total_transactions: dataset.len(),
        threshold_amount: threshold,
        fuzzy_cutoff: config.fuzzy_cutoff,
        duplicates: run_section(Section::Duplicates, Vec::len, || {
            Ok(owned(detect_duplicate_payments(dataset)))
        }),
        unusual_timing: run_section(Section::UnusualTiming, Vec::len, || {
            Ok(owned(detect_unusual_timing(dataset)))
        }),
        round_numbers: run_section(Section::RoundNumbers, Vec::len, || {
            Ok(owned(detect_round_numbers(dataset)))
        }),
        threshold_flags: run_section(Section::ThresholdFlags, Vec::len, || {
            Ok(owned(detect_threshold_avoidance(dataset, threshold)))
        }),
        benford: run_section(Section::Benford, |b: &BenfordAnalysis| b.sample_size, || {
            Ok(analyze_benford(dataset))
        }),
        fuzzy_duplicates: run_section(Section::FuzzyDuplicates, Vec::len, || {
            detect_fuzzy_duplicates(dataset, config.fuzzy_cutoff, config.max_vendors)
        }),
    })
}

// ============================================================================
// RISK SUMMARY EXPORT
// ============================================================================

pub fn control_recommendations() -> &'static [&'static str] {
    &[
        "Review duplicate payments",
        "Investigate unusual timing transactions",
        "Monitor round-number payments",
        "Enforce thresholds and approval limits",
    ]
}

/// Write a `Metric,Count` CSV; failed sections are written as FAILED
pub fn write_risk_summary_csv<P: AsRef<Path>>(report: &AnalysisReport, path: P) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_path(path.as_ref())
        .with_context(|| format!("Failed to create risk summary: {:?}", path.as_ref()))?;

    writer.write_record(["Metric", "Count"])?;
    for (label, count) in report.summary_rows() {
        let count = count.map(|c| c.to_string()).unwrap_or_else(|| "FAILED".to_string());
        writer.write_record([label, count.as_str()])?;
    }
    writer.flush().context("Failed to flush risk summary")?;

    log::info!("Risk summary exported to {:?}", path.as_ref());
    Ok(())
}

/// Plain-text table for terminal output
pub fn render_summary_table(report: &AnalysisReport) -> String {
    let rows = report.summary_rows();
    let width = rows.iter().map(|(label, _)| label.len()).max().unwrap_or(6).max(6);

    let mut out = format!("{:<width$}  Count\n", "Metric", width = width);
    for (label, count) in rows {
        let count = count.map(|c| c.to_string()).unwrap_or_else(|| "FAILED".to_string());
        out.push_str(&format!("{:<width$}  {:>5}\n", label, count, width = width));
    }
    out
}

// ============================================================================
// TESTS
// ============================================================================
