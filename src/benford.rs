// 📊 Benford Analyzer - Leading-digit frequencies vs. log10(1 + 1/d)
// Descriptive only: no deviation score or verdict is computed here.

use crate::dataset::Dataset;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenfordRow {
    pub digit: u8,

    /// Observed share of amounts with this leading digit
    pub actual: f64,

    /// Benford's theoretical share, log10(1 + 1/d)
    pub expected: f64,
}

impl BenfordRow {
    /// actual - expected
    pub fn deviation(&self) -> f64 {
        self.actual - self.expected
    }
}

/// Result of one Benford pass.
///
/// `rows` holds exactly 9 entries (digits 1-9) or none at all. An empty
/// result means "insufficient data", never "everything is anomalous".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenfordAnalysis {
    pub rows: Vec<BenfordRow>,

    /// Number of amounts with |amount| >= 1 that fed the distribution
    pub sample_size: usize,
}

impl BenfordAnalysis {
    pub fn is_insufficient_data(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, digit: u8) -> Option<&BenfordRow> {
        self.rows.iter().find(|r| r.digit == digit)
    }
}

pub fn expected_frequency(digit: u8) -> f64 {
    (1.0 + 1.0 / digit as f64).log10()
}

/// Most significant decimal digit of |amount|, or None below 1 (or non-finite).
pub fn leading_digit(amount: f64) -> Option<u8> {
    let value = amount.abs();
    if !value.is_finite() || value < 1.0 {
        return None;
    }

    // Shortest round-trip scientific form, e.g. "9.5e3": first char is the digit
    format!("{:e}", value)
        .chars()
        .next()
        .and_then(|c| c.to_digit(10))
        .map(|d| d as u8)
        .filter(|d| (1..=9).contains(d))
}

pub fn analyze_benford(dataset: &Dataset) -> BenfordAnalysis {
    let mut counts = [0usize; 9];

    for tx in dataset {
        if let Some(digit) = leading_digit(tx.amount) {
            counts[(digit - 1) as usize] += 1;
        }
    }

    let sample_size: usize = counts.iter().sum();
    if sample_size == 0 {
        log::info!("Benford analysis skipped: no amounts >= 1");
        return BenfordAnalysis {
            rows: Vec::new(),
            sample_size: 0,
        };
    }

    let rows = (1..=9u8)
        .map(|digit| BenfordRow {
            digit,
            actual: counts[(digit - 1) as usize] as f64 / sample_size as f64,
            expected: expected_frequency(digit),
        })
        .collect();

    log::info!("Performed Benford's Law analysis on {} amounts", sample_size);

    BenfordAnalysis { rows, sample_size }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Transaction;
    use chrono::NaiveDate;

    fn create_test_dataset(amounts: &[f64]) -> Dataset {
        let day = NaiveDate::from_ymd_opt(2025, 12, 1).unwrap();
        let transactions = amounts
            .iter()
            .enumerate()
            .map(|(i, amount)| Transaction::new(Transaction::synthetic_id(i + 1), day, *amount, "Vendor"))
            .collect();
        Dataset::new(transactions).unwrap()
    }

    #[test]
    fn test_leading_digit() {
        assert_eq!(leading_digit(1.0), Some(1));
        assert_eq!(leading_digit(9500.0), Some(9));
        assert_eq!(leading_digit(-2345.67), Some(2));
        assert_eq!(leading_digit(1000.0), Some(1));
        assert_eq!(leading_digit(9.999), Some(9));
        assert_eq!(leading_digit(7e20), Some(7));
        assert_eq!(leading_digit(0.99), None);
        assert_eq!(leading_digit(0.0), None);
        assert_eq!(leading_digit(-0.5), None);
        assert_eq!(leading_digit(f64::NAN), None);
    }

    #[test]
    fn test_expected_distribution_sums_to_one() {
        let total: f64 = (1..=9).map(expected_frequency).sum();
        assert!((total - 1.0).abs() < 1e-12);
        assert!((expected_frequency(1) - 0.30103).abs() < 1e-5);
        assert!((expected_frequency(9) - 0.045757).abs() < 1e-5);
    }

    #[test]
    fn test_all_leading_ones() {
        let dataset = create_test_dataset(&[1.0, 10.0, 150.0, 1999.99, -1234.0]);
        let analysis = analyze_benford(&dataset);

        assert_eq!(analysis.rows.len(), 9);
        assert_eq!(analysis.sample_size, 5);
        assert_eq!(analysis.row(1).unwrap().actual, 1.0);
        for digit in 2..=9 {
            assert_eq!(analysis.row(digit).unwrap().actual, 0.0);
        }
    }

    #[test]
    fn test_actual_sums_to_one_and_zero_fills() {
        let dataset = create_test_dataset(&[1000.0, 9500.0, 10000.0, 5000.0, 1000.0, 0.5, 0.0]);
        let analysis = analyze_benford(&dataset);

        assert_eq!(analysis.sample_size, 5);
        assert_eq!(analysis.rows.len(), 9);

        let total: f64 = analysis.rows.iter().map(|r| r.actual).sum();
        assert!((total - 1.0).abs() < 1e-9);

        assert!((analysis.row(1).unwrap().actual - 0.6).abs() < 1e-12);
        assert!((analysis.row(5).unwrap().actual - 0.2).abs() < 1e-12);
        assert!((analysis.row(9).unwrap().actual - 0.2).abs() < 1e-12);
        assert_eq!(analysis.row(3).unwrap().actual, 0.0);

        let digits: Vec<u8> = analysis.rows.iter().map(|r| r.digit).collect();
        assert_eq!(digits, (1..=9).collect::<Vec<u8>>());
    }

    #[test]
    fn test_insufficient_data() {
        let dataset = create_test_dataset(&[0.0, 0.25, -0.99]);
        let analysis = analyze_benford(&dataset);

        assert!(analysis.is_insufficient_data());
        assert!(analysis.rows.is_empty());
        assert_eq!(analysis.sample_size, 0);
    }

    #[test]
    fn test_deviation() {
        let row = BenfordRow {
            digit: 1,
            actual: 0.5,
            expected: expected_frequency(1),
        };
        assert!((row.deviation() - (0.5 - 0.30103)).abs() < 1e-5);
    }
}
