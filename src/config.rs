// ⚙️ Analysis Configuration - Explicit parameters for one analysis run
// Loaded from JSON (config.json) or built in code; never global state.

use crate::error::{AnalysisError, Result};
use anyhow::Context as AnyhowContext;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const DEFAULT_THRESHOLD_AMOUNT: f64 = 10_000.0;
pub const DEFAULT_FUZZY_CUTOFF: u8 = 90;
pub const DEFAULT_MAX_VENDORS: usize = 5_000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Approval limit; amounts in [0.9 × threshold, threshold) are flagged
    pub threshold_amount: f64,

    /// Minimum similarity score (0-100) for a vendor pair to be reported
    pub fuzzy_cutoff: u8,

    /// Cap on distinct vendors for fuzzy matching (None = unlimited)
    pub max_vendors: Option<usize>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        AnalysisConfig {
            threshold_amount: DEFAULT_THRESHOLD_AMOUNT,
            fuzzy_cutoff: DEFAULT_FUZZY_CUTOFF,
            max_vendors: Some(DEFAULT_MAX_VENDORS),
        }
    }
}

impl AnalysisConfig {
    /// Load config from a JSON file; missing keys fall back to defaults
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;

        let config: AnalysisConfig =
            serde_json::from_str(&content).context("Failed to parse config JSON")?;

        config
            .validate()
            .with_context(|| format!("Invalid config in {:?}", path.as_ref()))?;

        Ok(config)
    }

    /// Like `from_file`, but an absent file means defaults
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        if path.as_ref().exists() {
            Self::from_file(path)
        } else {
            log::debug!("No config at {:?}, using defaults", path.as_ref());
            Ok(Self::default())
        }
    }

    pub fn with_threshold(mut self, threshold_amount: f64) -> Self {
        self.threshold_amount = threshold_amount;
        self
    }

    pub fn with_fuzzy_cutoff(mut self, fuzzy_cutoff: u8) -> Self {
        self.fuzzy_cutoff = fuzzy_cutoff;
        self
    }

    pub fn with_max_vendors(mut self, max_vendors: Option<usize>) -> Self {
        self.max_vendors = max_vendors;
        self
    }

    /// Reject caller errors before any detector runs
    pub fn validate(&self) -> Result<()> {
        validate_threshold(self.threshold_amount)?;
        validate_fuzzy_cutoff(self.fuzzy_cutoff)?;

        if self.max_vendors == Some(0) {
            return Err(AnalysisError::InvalidParameter {
                name: "max_vendors",
                reason: "must be at least 1 when set".to_string(),
            });
        }

        Ok(())
    }
}

pub fn validate_threshold(threshold: f64) -> Result<()> {
    if !threshold.is_finite() || threshold <= 0.0 {
        return Err(AnalysisError::InvalidParameter {
            name: "threshold_amount",
            reason: format!("must be a positive finite number, got {}", threshold),
        });
    }
    Ok(())
}

pub fn validate_fuzzy_cutoff(cutoff: u8) -> Result<()> {
    if cutoff > 100 {
        return Err(AnalysisError::InvalidParameter {
            name: "fuzzy_cutoff",
            reason: format!("must be within 0..=100, got {}", cutoff),
        });
    }
    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================
