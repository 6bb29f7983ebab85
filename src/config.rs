//! Caller-supplied test parameters.
//!
//! The dashboard hands the engine a confidence level and an alternative
//! hypothesis; everything else is data. These types deserialize directly
//! from the caller's JSON settings.
//!
//! # Examples
//!
//! ```
//! use lakestat::config::{Alternative, TestOptions};
//!
//! let opts = TestOptions::from_confidence(0.95).unwrap();
//! assert!((opts.alpha - 0.05).abs() < 1e-12);
//! assert_eq!(opts.alternative, Alternative::TwoSided);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{StatsError, StatsResult};

/// Alternative hypothesis. Selects which tail(s) of the reference
/// distribution produce the p-value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Alternative {
    /// H₁: parameter ≠ reference.
    #[default]
    TwoSided,
    /// H₁: parameter > reference.
    Greater,
    /// H₁: parameter < reference.
    Less,
}

/// Significance level and alternative for a single test call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TestOptions {
    /// Reject H₀ when p < alpha.
    pub alpha: f64,
    /// Alternative hypothesis.
    pub alternative: Alternative,
}

impl Default for TestOptions {
    fn default() -> Self {
        Self {
            alpha: 0.05,
            alternative: Alternative::TwoSided,
        }
    }
}

impl TestOptions {
    /// Options with the given alpha and alternative.
    pub fn new(alpha: f64, alternative: Alternative) -> Self {
        Self { alpha, alternative }
    }

    /// Builds two-sided options from a confidence level such as 0.95.
    pub fn from_confidence(confidence: f64) -> StatsResult<Self> {
        let opts = Self {
            alpha: 1.0 - confidence,
            alternative: Alternative::TwoSided,
        };
        opts.validate()?;
        Ok(opts)
    }

    /// Same alpha, different alternative.
    pub fn with_alternative(self, alternative: Alternative) -> Self {
        Self { alternative, ..self }
    }

    /// Checks that alpha lies strictly inside (0, 1).
    pub fn validate(&self) -> StatsResult<()> {
        if !self.alpha.is_finite() || self.alpha <= 0.0 || self.alpha >= 1.0 {
            return Err(StatsError::InvalidParameter {
                name: "alpha",
                value: self.alpha,
            });
        }
        Ok(())
    }
}

/// Group centre used by the Levene family of variance tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Center {
    /// Classic Levene (1960).
    Mean,
    /// Brown–Forsythe (1974).
    #[default]
    Median,
}
