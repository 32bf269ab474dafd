// ⚠️ Error Kinds - What the analysis core can reject
// Application edges (CLI, config files) wrap these in anyhow with context.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    /// The dataset cannot be analyzed at all (empty, no usable columns, duplicate ids)
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A single row carries a value the core refuses to coerce
    #[error("malformed {field} in transaction {id}: {reason}")]
    MalformedValue {
        id: String,
        field: &'static str,
        reason: String,
    },

    /// Caller-supplied parameter outside its valid range
    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    /// Fuzzy matching refused: the pair space is over the configured cap
    #[error("vendor catalog too large: {count} distinct vendors exceeds the limit of {limit}")]
    VendorCatalogTooLarge { count: usize, limit: usize },
}

impl AnalysisError {
    /// True when the caller sent something unusable (maps to HTTP 400)
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            AnalysisError::InvalidInput(_)
                | AnalysisError::MalformedValue { .. }
                | AnalysisError::InvalidParameter { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, AnalysisError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = AnalysisError::MalformedValue {
            id: "TXN_3".to_string(),
            field: "amount",
            reason: "value is not finite".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "malformed amount in transaction TXN_3: value is not finite"
        );

        let err = AnalysisError::VendorCatalogTooLarge { count: 12, limit: 10 };
        assert!(err.to_string().contains("12 distinct vendors"));
    }

    #[test]
    fn test_caller_errors() {
        assert!(AnalysisError::InvalidInput("empty".into()).is_caller_error());
        assert!(AnalysisError::InvalidParameter {
            name: "threshold_amount",
            reason: "must be > 0".into(),
        }
        .is_caller_error());
        assert!(!AnalysisError::VendorCatalogTooLarge { count: 2, limit: 1 }.is_caller_error());
    }
}
