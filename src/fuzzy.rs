// 🔤 Fuzzy Vendor Matcher - All-pairs similarity over distinct vendor names
//
// "ABC Corp" vs "ABC Corp." → 94, "ABC Corp" vs "XYZ Inc" → 13
//
// The O(V²) pass of the pipeline: V distinct vendors → V(V-1)/2 comparisons.

use crate::dataset::Dataset;
use crate::error::{AnalysisError, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FuzzyMatchPair {
    pub vendor_a: String,
    pub vendor_b: String,
    pub similarity_score: u8,
}

// ============================================================================
// SIMILARITY
// ============================================================================

/// Length of the longest common subsequence of two char sequences
fn lcs_length(a: &[char], b: &[char]) -> usize {
    if a.is_empty() || b.is_empty() {
        return 0;
    }

    // Two rolling rows over the shorter string
    let (outer, inner) = if a.len() >= b.len() { (a, b) } else { (b, a) };
    let mut previous = vec![0usize; inner.len() + 1];
    let mut current = vec![0usize; inner.len() + 1];

    for oc in outer {
        for (j, ic) in inner.iter().enumerate() {
            current[j + 1] = if oc == ic {
                previous[j] + 1
            } else {
                current[j].max(previous[j + 1])
            };
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[inner.len()]
}

/// Normalized Indel similarity in 0..=100.
///
/// `round(200 × LCS / (|a| + |b|))`, counted in chars. Symmetric, 100 for
/// identical strings (two empty strings included), 0 with nothing in common.
pub fn similarity_ratio(a: &str, b: &str) -> u8 {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    ratio_of_chars(&a_chars, &b_chars)
}

fn ratio_of_chars(a: &[char], b: &[char]) -> u8 {
    let total = a.len() + b.len();
    if total == 0 {
        return 100;
    }

    let common = lcs_length(a, b);
    let score = 200.0 * common as f64 / total as f64;
    score.round().clamp(0.0, 100.0) as u8
}

// ============================================================================
// MATCHER
// ============================================================================

/// Compare every unordered pair of distinct names once; keep pairs >= cutoff.
///
/// Output order: by first name's position, then second name's position.
pub fn match_vendor_names(vendors: &[&str], cutoff: u8) -> Vec<FuzzyMatchPair> {
    let chars: Vec<Vec<char>> = vendors.iter().map(|v| v.chars().collect()).collect();
    let mut pairs = Vec::new();

    for i in 0..vendors.len() {
        for j in (i + 1)..vendors.len() {
            let score = ratio_of_chars(&chars[i], &chars[j]);
            if score >= cutoff {
                pairs.push(FuzzyMatchPair {
                    vendor_a: vendors[i].to_string(),
                    vendor_b: vendors[j].to_string(),
                    similarity_score: score,
                });
            }
        }
    }

    pairs
}

/// Fuzzy duplicates over the dataset's distinct vendors.
///
/// Fails with `VendorCatalogTooLarge` when `max_vendors` is set and exceeded.
pub fn detect_fuzzy_duplicates(
    dataset: &Dataset,
    cutoff: u8,
    max_vendors: Option<usize>,
) -> Result<Vec<FuzzyMatchPair>> {
    let vendors = dataset.distinct_vendors();

    if let Some(limit) = max_vendors {
        if vendors.len() > limit {
            return Err(AnalysisError::VendorCatalogTooLarge {
                count: vendors.len(),
                limit,
            });
        }
    }

    let pairs = match_vendor_names(&vendors, cutoff);
    log::info!(
        "Fuzzy matching detected {} similar vendor name pairs among {} vendors",
        pairs.len(),
        vendors.len()
    );

    Ok(pairs)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Transaction;
    use chrono::NaiveDate;

    fn create_vendor_dataset(vendors: &[&str]) -> Dataset {
        let day = NaiveDate::from_ymd_opt(2025, 12, 1).unwrap();
        let transactions = vendors
            .iter()
            .enumerate()
            .map(|(i, v)| Transaction::new(Transaction::synthetic_id(i + 1), day, 100.0, *v))
            .collect();
        Dataset::new(transactions).unwrap()
    }

    #[test]
    fn test_lcs_length() {
        let c = |s: &str| s.chars().collect::<Vec<char>>();
        assert_eq!(lcs_length(&c(""), &c("abc")), 0);
        assert_eq!(lcs_length(&c("abc"), &c("abc")), 3);
        assert_eq!(lcs_length(&c("kitten"), &c("sitting")), 4);
        assert_eq!(lcs_length(&c("ABC Corp"), &c("ABC Corp.")), 8);
    }

    #[test]
    fn test_reflexive() {
        for v in ["", "A", "ABC Corp", "Ünïcödé Vendor GmbH", "Vendor A"] {
            assert_eq!(similarity_ratio(v, v), 100, "{:?}", v);
        }
    }

    #[test]
    fn test_symmetric() {
        let names = ["ABC Corp", "ABC Corp.", "XYZ Inc", "Acme", "acme ltd", ""];
        for a in names {
            for b in names {
                assert_eq!(similarity_ratio(a, b), similarity_ratio(b, a), "{:?} / {:?}", a, b);
            }
        }
    }

    #[test]
    fn test_near_identical_scores_high() {
        assert_eq!(similarity_ratio("ABC Corp", "ABC Corp."), 94);
        assert!(similarity_ratio("Starbucks Coffee", "Starbucks Cofee") >= 90);
        assert!(similarity_ratio("Vendor A", "Vendor B") >= 85);
    }

    #[test]
    fn test_unrelated_scores_low() {
        assert!(similarity_ratio("ABC Corp", "XYZ Inc") < 50);
        assert_eq!(similarity_ratio("abc", "xyz"), 0);
        assert_eq!(similarity_ratio("", "abc"), 0);
    }

    #[test]
    fn test_case_matters() {
        assert!(similarity_ratio("ACME", "acme") < 100);
    }

    #[test]
    fn test_match_vendor_names_each_pair_once() {
        let pairs = match_vendor_names(&["ABC Corp", "XYZ Inc", "ABC Corp."], 90);

        assert_eq!(
            pairs,
            vec![FuzzyMatchPair {
                vendor_a: "ABC Corp".to_string(),
                vendor_b: "ABC Corp.".to_string(),
                similarity_score: 94,
            }]
        );
    }

    #[test]
    fn test_cutoff_is_inclusive() {
        assert_eq!(match_vendor_names(&["ABC Corp", "ABC Corp."], 94).len(), 1);
        assert!(match_vendor_names(&["ABC Corp", "ABC Corp."], 95).is_empty());

        // cutoff 0 keeps every pair
        assert_eq!(match_vendor_names(&["a", "b", "c", "d"], 0).len(), 6);
    }

    #[test]
    fn test_detect_uses_distinct_vendors() {
        let dataset = create_vendor_dataset(&["ABC Corp", "ABC Corp", "ABC Corp.", "XYZ Inc"]);
        let pairs = detect_fuzzy_duplicates(&dataset, 90, None).unwrap();

        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].vendor_a, "ABC Corp");
        assert_eq!(pairs[0].vendor_b, "ABC Corp.");
    }

    #[test]
    fn test_vendor_cap() {
        let dataset = create_vendor_dataset(&["A", "B", "C"]);

        let err = detect_fuzzy_duplicates(&dataset, 90, Some(2)).unwrap_err();
        assert_eq!(err, AnalysisError::VendorCatalogTooLarge { count: 3, limit: 2 });

        assert!(detect_fuzzy_duplicates(&dataset, 90, Some(3)).is_ok());
    }
}
