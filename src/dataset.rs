// 📒 Dataset Model - Cleaned transactions handed to the detectors
// Every row here already has a parsed date and a finite amount.

use crate::error::{AnalysisError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

// ============================================================================
// TRANSACTION
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique within a dataset (`TXN_<n>` when the source has none)
    pub id: String,

    /// Calendar date, no timezone
    pub date: NaiveDate,

    /// Signed amount, raw value as parsed
    pub amount: f64,

    /// Free-text payee, compared case-sensitively
    pub vendor: String,
}

impl Transaction {
    pub fn new(id: impl Into<String>, date: NaiveDate, amount: f64, vendor: impl Into<String>) -> Self {
        Transaction {
            id: id.into(),
            date,
            amount,
            vendor: vendor.into(),
        }
    }

    /// Synthesized id for row `n` (1-based)
    pub fn synthetic_id(n: usize) -> String {
        format!("TXN_{}", n)
    }

    fn check(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(AnalysisError::MalformedValue {
                id: self.id.clone(),
                field: "id",
                reason: "id is empty".to_string(),
            });
        }

        if !self.amount.is_finite() {
            return Err(AnalysisError::MalformedValue {
                id: self.id.clone(),
                field: "amount",
                reason: format!("{} is not a finite number", self.amount),
            });
        }

        Ok(())
    }
}

// ============================================================================
// DATASET
// ============================================================================

/// Ordered, immutable set of transactions for one analysis run.
///
/// Construction re-validates every row, so detectors never see NaN/inf
/// amounts, empty ids or an empty table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dataset {
    transactions: Vec<Transaction>,
}

impl Dataset {
    pub fn new(transactions: Vec<Transaction>) -> Result<Self> {
        if transactions.is_empty() {
            return Err(AnalysisError::InvalidInput(
                "dataset is empty after validation".to_string(),
            ));
        }

        let mut seen_ids = HashSet::with_capacity(transactions.len());
        for tx in &transactions {
            tx.check()?;

            if !seen_ids.insert(tx.id.as_str()) {
                return Err(AnalysisError::InvalidInput(format!(
                    "duplicate transaction id: {}",
                    tx.id
                )));
            }
        }

        Ok(Dataset { transactions })
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Transaction> {
        self.transactions.iter()
    }

    /// Distinct vendor names, case-sensitive, in first-seen order
    pub fn distinct_vendors(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.transactions
            .iter()
            .map(|tx| tx.vendor.as_str())
            .filter(|vendor| seen.insert(*vendor))
            .collect()
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a Transaction;
    type IntoIter = std::slice::Iter<'a, Transaction>;

    fn into_iter(self) -> Self::IntoIter {
        self.transactions.iter()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_transaction(id: &str, date: &str, amount: f64, vendor: &str) -> Transaction {
        Transaction::new(
            id,
            NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            amount,
            vendor,
        )
    }

    #[test]
    fn test_dataset_keeps_input_order() {
        let dataset = Dataset::new(vec![
            create_test_transaction("TXN_2", "2025-12-02", 10.0, "B"),
            create_test_transaction("TXN_1", "2025-12-01", 20.0, "A"),
        ])
        .unwrap();

        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.transactions()[0].id, "TXN_2");
        assert_eq!(dataset.transactions()[1].id, "TXN_1");
    }

    #[test]
    fn test_empty_dataset_rejected() {
        let err = Dataset::new(vec![]).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidInput(_)));
    }

    #[test]
    fn test_non_finite_amount_fails_fast() {
        let err = Dataset::new(vec![
            create_test_transaction("TXN_1", "2025-12-01", 20.0, "A"),
            create_test_transaction("TXN_2", "2025-12-01", f64::NAN, "A"),
        ])
        .unwrap_err();

        match err {
            AnalysisError::MalformedValue { id, field, .. } => {
                assert_eq!(id, "TXN_2");
                assert_eq!(field, "amount");
            }
            other => panic!("unexpected error: {:?}", other),
        }

        assert!(Dataset::new(vec![create_test_transaction(
            "TXN_1",
            "2025-12-01",
            f64::INFINITY,
            "A"
        )])
        .is_err());
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let err = Dataset::new(vec![
            create_test_transaction("TXN_1", "2025-12-01", 1.0, "A"),
            create_test_transaction("TXN_1", "2025-12-02", 2.0, "B"),
        ])
        .unwrap_err();

        assert_eq!(
            err,
            AnalysisError::InvalidInput("duplicate transaction id: TXN_1".to_string())
        );
    }

    #[test]
    fn test_empty_id_rejected() {
        let err = Dataset::new(vec![create_test_transaction(" ", "2025-12-01", 1.0, "A")]).unwrap_err();
        assert!(matches!(err, AnalysisError::MalformedValue { field: "id", .. }));
    }

    #[test]
    fn test_distinct_vendors_case_sensitive_first_seen() {
        let dataset = Dataset::new(vec![
            create_test_transaction("TXN_1", "2025-12-01", 1.0, "Vendor B"),
            create_test_transaction("TXN_2", "2025-12-01", 1.0, "Vendor A"),
            create_test_transaction("TXN_3", "2025-12-01", 1.0, "vendor a"),
            create_test_transaction("TXN_4", "2025-12-01", 1.0, "Vendor B"),
        ])
        .unwrap();

        assert_eq!(dataset.distinct_vendors(), vec!["Vendor B", "Vendor A", "vendor a"]);
    }

    #[test]
    fn test_synthetic_id() {
        assert_eq!(Transaction::synthetic_id(1), "TXN_1");
        assert_eq!(Transaction::synthetic_id(42), "TXN_42");
    }
}
