//! Fit and comparison configuration

use serde::{Deserialize, Serialize};
use trendline_core::TrendError;

/// Confidence level used for coefficient and prediction intervals
pub const DEFAULT_CONFIDENCE_LEVEL: f64 = 0.95;

/// Column identifying the entity behind each observation
pub const DEFAULT_ENTITY_COLUMN: &str = "System";

/// Options for a single OLS fit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitOptions {
    /// Regress log10(target) instead of the target
    pub log_target: bool,
    pub confidence_level: f64,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            log_target: false,
            confidence_level: DEFAULT_CONFIDENCE_LEVEL,
        }
    }
}

impl FitOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_log_target(mut self, enabled: bool) -> Self {
        self.log_target = enabled;
        self
    }

    pub fn with_confidence_level(mut self, level: f64) -> Self {
        self.confidence_level = level;
        self
    }

    pub fn validate(&self) -> Result<(), TrendError> {
        validate_level(self.confidence_level)
    }
}

/// Options for comparing the slopes of two datasets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComparisonOptions {
    /// Regress log10(target) in both fits and in the common-subset residuals
    pub log_target: bool,
    /// Correct the standard error for correlated residuals on shared entities
    pub adjust_correlation: bool,
    pub entity_column: String,
    pub confidence_level: f64,
}

impl Default for ComparisonOptions {
    fn default() -> Self {
        Self {
            log_target: false,
            adjust_correlation: true,
            entity_column: DEFAULT_ENTITY_COLUMN.to_string(),
            confidence_level: DEFAULT_CONFIDENCE_LEVEL,
        }
    }
}

impl ComparisonOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_log_target(mut self, enabled: bool) -> Self {
        self.log_target = enabled;
        self
    }

    pub fn with_adjust_correlation(mut self, enabled: bool) -> Self {
        self.adjust_correlation = enabled;
        self
    }

    pub fn with_entity_column(mut self, column: impl Into<String>) -> Self {
        self.entity_column = column.into();
        self
    }

    pub fn with_confidence_level(mut self, level: f64) -> Self {
        self.confidence_level = level;
        self
    }

    /// Options for each of the two independent fits
    pub fn fit_options(&self) -> FitOptions {
        FitOptions {
            log_target: self.log_target,
            confidence_level: self.confidence_level,
        }
    }

    pub fn validate(&self) -> Result<(), TrendError> {
        validate_level(self.confidence_level)
    }
}

pub(crate) fn validate_level(level: f64) -> Result<(), TrendError> {
    if level > 0.0 && level < 1.0 {
        Ok(())
    } else {
        Err(TrendError::domain_error(format!(
            "confidence level must satisfy 0 < level < 1, got {}",
            level
        )))
    }
}
