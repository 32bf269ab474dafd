// 🚩 Exact-Match Detectors - Duplicates, weekend timing, round numbers, threshold avoidance
// Pure predicates/groupings over a Dataset. Output keeps dataset order.

use crate::dataset::{Dataset, Transaction};
use chrono::{Datelike, NaiveDate, Weekday};
use std::collections::HashMap;

/// Amounts must be an exact multiple of this to count as "round"
pub const ROUND_NUMBER_UNIT: f64 = 1000.0;

/// Lower edge of the threshold-avoidance band, as a fraction of the threshold
pub const THRESHOLD_BAND_RATIO: f64 = 0.9;

// ============================================================================
// DUPLICATE PAYMENTS
// ============================================================================

/// Grouping key: exact date, exact amount bits, exact vendor string
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct DuplicateKey<'a> {
    date: NaiveDate,
    amount_bits: u64,
    vendor: &'a str,
}

impl<'a> DuplicateKey<'a> {
    fn of(tx: &'a Transaction) -> Self {
        // -0.0 and 0.0 are the same amount
        let amount = if tx.amount == 0.0 { 0.0 } else { tx.amount };

        DuplicateKey {
            date: tx.date,
            amount_bits: amount.to_bits(),
            vendor: &tx.vendor,
        }
    }
}

/// Every transaction whose (date, amount, vendor) occurs two or more times.
///
/// Returns the whole equivalence class, first occurrence included.
pub fn detect_duplicate_payments(dataset: &Dataset) -> Vec<&Transaction> {
    let mut group_sizes: HashMap<DuplicateKey, usize> = HashMap::new();
    for tx in dataset {
        *group_sizes.entry(DuplicateKey::of(tx)).or_insert(0) += 1;
    }

    dataset
        .iter()
        .filter(|tx| group_sizes.get(&DuplicateKey::of(tx)).copied().unwrap_or(0) >= 2)
        .collect()
}

// ============================================================================
// UNUSUAL TIMING
// ============================================================================

/// Saturday or Sunday, from the calendar date alone
pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

pub fn detect_unusual_timing(dataset: &Dataset) -> Vec<&Transaction> {
    dataset.iter().filter(|tx| is_weekend(tx.date)).collect()
}

// ============================================================================
// ROUND NUMBERS
// ============================================================================

/// `amount % 1000 == 0` with IEEE remainder semantics.
///
/// Sign is kept (-2000.0 qualifies), 0.0 qualifies, and no tolerance is
/// applied: 1000.0000000001 is not round.
pub fn is_round_number(amount: f64) -> bool {
    amount % ROUND_NUMBER_UNIT == 0.0
}

pub fn detect_round_numbers(dataset: &Dataset) -> Vec<&Transaction> {
    dataset.iter().filter(|tx| is_round_number(tx.amount)).collect()
}

// ============================================================================
// THRESHOLD AVOIDANCE
// ============================================================================

/// `[0.9 × threshold, threshold)`: inclusive low edge, exclusive high edge
pub fn is_threshold_avoidance(amount: f64, threshold: f64) -> bool {
    amount >= threshold * THRESHOLD_BAND_RATIO && amount < threshold
}

/// Caller validates `threshold > 0` beforehand (see `config::validate_threshold`)
pub fn detect_threshold_avoidance(dataset: &Dataset, threshold: f64) -> Vec<&Transaction> {
    dataset
        .iter()
        .filter(|tx| is_threshold_avoidance(tx.amount, threshold))
        .collect()
}

// ============================================================================
// TESTS
// ============================================================================
