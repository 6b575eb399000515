//! Configuration structures for the post-processing pipeline.
//!
//! Every tunable constant lives here and is passed into the component
//! that needs it; there is no global configuration state.

use chrono::{Datelike, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{InvexError, Result};

/// Main configuration for the invex pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InvexConfig {
    /// Date normalization configuration.
    pub date: DateConfig,

    /// Amount normalization configuration.
    pub amount: AmountConfig,

    /// Field validation configuration.
    pub validate: ValidateConfig,

    /// Evaluation configuration.
    pub eval: EvalConfig,
}

/// Date normalization configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DateConfig {
    /// Interpret ambiguous purely-numeric dates as day-first (DD/MM/YYYY).
    ///
    /// This is a fixed policy, not a per-input guess: when both the first
    /// and second component could be a month, the locale decides.
    pub day_first: bool,

    /// Pivot for expanding two-digit years: `yy <= pivot` maps to 2000+yy,
    /// anything above to 1900+yy.
    pub two_digit_year_pivot: i32,
}

impl Default for DateConfig {
    fn default() -> Self {
        Self {
            day_first: true,
            two_digit_year_pivot: Utc::now().year() % 100 + 10,
        }
    }
}

/// Amount normalization configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AmountConfig {
    /// Number of decimal places in the canonical form.
    pub decimal_places: u32,
}

impl Default for AmountConfig {
    fn default() -> Self {
        Self { decimal_places: 2 }
    }
}

/// Field validation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidateConfig {
    /// Oldest acceptable invoice year.
    pub min_year: i32,

    /// How many years past the current year a date may lie.
    pub max_year_ahead: i32,

    /// Sanity ceiling for amounts; larger values are flagged suspicious.
    pub max_amount: Decimal,

    /// Minimum trimmed length for name and identifier fields.
    pub min_name_len: usize,
}

impl Default for ValidateConfig {
    fn default() -> Self {
        Self {
            min_year: 1990,
            max_year_ahead: 1,
            max_amount: Decimal::from(1_000_000_000_i64),
            min_name_len: 2,
        }
    }
}

/// Evaluation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EvalConfig {
    /// Whether string comparisons are case-sensitive.
    pub case_sensitive: bool,

    /// Minimum similarity for a partial match (inclusive, 0.0 - 1.0).
    pub partial_threshold: f64,

    /// Fold partial matches into the accuracy numerator.
    pub partial_counts_as_match: bool,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            case_sensitive: false,
            partial_threshold: 0.8,
            partial_counts_as_match: false,
        }
    }
}

impl InvexConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| InvexError::Config(e.to_string()))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<()> {
        let content =
            serde_json::to_string_pretty(self).map_err(|e| InvexError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = InvexConfig::default();

        assert!(config.date.day_first);
        assert_eq!(config.amount.decimal_places, 2);
        assert_eq!(config.validate.min_year, 1990);
        assert_eq!(config.eval.partial_threshold, 0.8);
        assert!(!config.eval.case_sensitive);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: InvexConfig =
            serde_json::from_str(r#"{"eval": {"partial_threshold": 0.9}}"#).unwrap();

        assert_eq!(config.eval.partial_threshold, 0.9);
        assert!(!config.eval.case_sensitive);
        assert_eq!(config.amount.decimal_places, 2);
    }
}
