//! Error types shared by every test in the crate.

/// Errors returned by the statistical tests.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StatsError {
    /// The (cleaned) sample is smaller than the test's minimum, or removing
    /// ties left nothing to rank.
    #[error("{test}: insufficient data (need at least {needed}, got {got})")]
    InsufficientData {
        /// Test that rejected the input.
        test: &'static str,
        /// Minimum number of usable observations.
        needed: usize,
        /// Number of usable observations supplied.
        got: usize,
    },
    /// The provider has no exact implementation of a distribution the test
    /// needs.
    #[error("{distribution} distribution unavailable from provider '{provider}'")]
    DistributionUnavailable {
        /// Requested distribution.
        distribution: &'static str,
        /// Name of the provider that refused the request.
        provider: &'static str,
    },
    /// The input has no meaningful answer for this test (e.g. zero variance).
    #[error("{test}: degenerate input ({reason})")]
    DegenerateInput {
        /// Test that rejected the input.
        test: &'static str,
        /// Short description of the degenerate condition.
        reason: &'static str,
    },
    /// A scalar parameter is out of its valid range.
    #[error("invalid parameter {name} = {value}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Offending value.
        value: f64,
    },
}

/// Result alias used throughout the crate.
pub type StatsResult<T> = Result<T, StatsError>;

pub(crate) fn require_n(test: &'static str, needed: usize, got: usize) -> StatsResult<()> {
    if got < needed {
        return Err(StatsError::InsufficientData { test, needed, got });
    }
    Ok(())
}
