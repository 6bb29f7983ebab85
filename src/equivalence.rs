//! Equivalence testing with two one-sided tests (TOST).
//!
//! A sample is declared equivalent to an acceptance interval
//! `[lower, upper]` when both one-sided nulls are rejected at level α:
//! H₀₁: θ ≤ lower (tested `greater`) and H₀₂: θ ≥ upper (tested `less`).
//! The combined p-value is the larger of the two.
//!
//! # Examples
//!
//! ```
//! use lakestat::distribution::StatrsProvider;
//! use lakestat::equivalence::tost_t;
//!
//! // pH readings clustered at 7.5, acceptance range 6.5..8.5
//! let ph = [7.4, 7.6, 7.5, 7.3, 7.7, 7.5, 7.4, 7.6];
//! let r = tost_t(&StatrsProvider::new(), &ph, 6.5, 8.5, 0.05).unwrap();
//! assert!(r.equivalent);
//! ```

use serde::Serialize;
use tracing::warn;

use crate::config::{Alternative, TestOptions};
use crate::descriptive::{self, finite};
use crate::distribution::{symmetric_p_value, Distribution, DistributionProvider};
use crate::error::{require_n, StatsError, StatsResult};
use crate::one_sample::{mean_sd, signed_rank, WilcoxonMethod};

fn check_bounds(lower: f64, upper: f64) -> StatsResult<()> {
    if !lower.is_finite() {
        return Err(StatsError::InvalidParameter {
            name: "lower",
            value: lower,
        });
    }
    if !upper.is_finite() || upper <= lower {
        return Err(StatsError::InvalidParameter {
            name: "upper",
            value: upper,
        });
    }
    Ok(())
}

/// Result of the parametric (t-based) TOST.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TostTResult {
    /// Sample size.
    pub n: usize,
    /// Sample mean.
    pub mean: f64,
    /// Sample standard deviation.
    pub sd: f64,
    /// Standard error s/√n.
    pub se: f64,
    /// Degrees of freedom (n − 1).
    pub df: f64,
    /// Lower acceptance bound.
    pub lower: f64,
    /// Upper acceptance bound.
    pub upper: f64,
    /// (x̄ − lower)/se, tested as `greater`.
    pub t_lower: f64,
    /// (x̄ − upper)/se, tested as `less`.
    pub t_upper: f64,
    /// p-value of the lower one-sided test.
    pub p_lower: f64,
    /// p-value of the upper one-sided test.
    pub p_upper: f64,
    /// max(p_lower, p_upper).
    pub p_combined: f64,
    /// Significance level of each one-sided test.
    pub alpha: f64,
    /// `p_combined < alpha`.
    pub equivalent: bool,
}

/// t-based TOST against `[lower, upper]`.
///
/// # Errors
///
/// - [`StatsError::InvalidParameter`] if the bounds are non-finite or
///   `lower >= upper`.
/// - [`StatsError::InsufficientData`] if fewer than 2 finite values.
/// - [`StatsError::DegenerateInput`] for a zero-variance sample.
/// - [`StatsError::DistributionUnavailable`] without an exact t CDF.
///
/// # References
///
/// Schuirmann (1987). "A comparison of the two one-sided tests procedure and
/// the power approach for assessing the equivalence of average
/// bioavailability". J. Pharmacokinet. Biopharm., 15(6), 657–680.
pub fn tost_t(
    provider: &dyn DistributionProvider,
    data: &[f64],
    lower: f64,
    upper: f64,
    alpha: f64,
) -> StatsResult<TostTResult> {
    const TEST: &str = "tost t";
    TestOptions::new(alpha, Alternative::TwoSided).validate()?;
    check_bounds(lower, upper)?;
    let x = finite(data);
    let n = x.len();
    require_n(TEST, 2, n)?;

    let (mean, sd) = mean_sd(&x, TEST)?;
    if sd < 1e-300 {
        return Err(StatsError::DegenerateInput {
            test: TEST,
            reason: "zero variance",
        });
    }
    let se = sd / (n as f64).sqrt();
    let df = (n - 1) as f64;
    let dist = Distribution::StudentsT { df };

    let t_lower = (mean - lower) / se;
    let t_upper = (mean - upper) / se;
    let p_lower = symmetric_p_value(provider, dist, t_lower, Alternative::Greater)?;
    let p_upper = symmetric_p_value(provider, dist, t_upper, Alternative::Less)?;
    let p_combined = p_lower.max(p_upper);

    Ok(TostTResult {
        n,
        mean,
        sd,
        se,
        df,
        lower,
        upper,
        t_lower,
        t_upper,
        p_lower,
        p_upper,
        p_combined,
        alpha,
        equivalent: p_combined < alpha,
    })
}

/// One side of the Wilcoxon TOST.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TostWilcoxonSide {
    /// Observations not tied with this bound.
    pub n_effective: usize,
    /// Signed-rank statistic V (NaN when `n_effective` is 0).
    pub statistic: f64,
    /// Method used; `None` when the side is degenerate.
    pub method: Option<WilcoxonMethod>,
    /// One-sided p-value.
    pub p_value: f64,
}

/// Result of the nonparametric (Wilcoxon-based) TOST.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TostWilcoxonResult {
    /// Sample size before removing ties with either bound.
    pub n: usize,
    /// Sample median.
    pub median: f64,
    /// Lower acceptance bound.
    pub lower: f64,
    /// Upper acceptance bound.
    pub upper: f64,
    /// x − lower, tested as `greater`.
    pub lower_test: TostWilcoxonSide,
    /// x − upper, tested as `less`.
    pub upper_test: TostWilcoxonSide,
    /// p-value of the lower one-sided test.
    pub p_lower: f64,
    /// p-value of the upper one-sided test.
    pub p_upper: f64,
    /// max(p_lower, p_upper).
    pub p_combined: f64,
    /// Significance level of each one-sided test.
    pub alpha: f64,
    /// `p_combined < alpha`.
    pub equivalent: bool,
}

/// Wilcoxon signed-rank TOST against `[lower, upper]`.
///
/// Each side runs the signed-rank routine on its own differences, so ties
/// are dropped per bound and the effective sizes may differ. A side left
/// with no observations (every value sits on that bound) gets p = 1, which
/// makes the combined decision non-equivalent.
///
/// # Errors
///
/// - [`StatsError::InvalidParameter`] if the bounds are non-finite or
///   `lower >= upper`.
/// - [`StatsError::InsufficientData`] if fewer than 2 finite values.
pub fn tost_wilcoxon(
    provider: &dyn DistributionProvider,
    data: &[f64],
    lower: f64,
    upper: f64,
    alpha: f64,
) -> StatsResult<TostWilcoxonResult> {
    const TEST: &str = "tost wilcoxon";
    TestOptions::new(alpha, Alternative::TwoSided).validate()?;
    check_bounds(lower, upper)?;
    let x = finite(data);
    require_n(TEST, 2, x.len())?;

    let lower_test = tost_side(provider, &x, lower, Alternative::Greater)?;
    let upper_test = tost_side(provider, &x, upper, Alternative::Less)?;
    let p_combined = lower_test.p_value.max(upper_test.p_value);

    Ok(TostWilcoxonResult {
        n: x.len(),
        median: descriptive::median(&x).unwrap_or(f64::NAN),
        lower,
        upper,
        lower_test,
        upper_test,
        p_lower: lower_test.p_value,
        p_upper: upper_test.p_value,
        p_combined,
        alpha,
        equivalent: p_combined < alpha,
    })
}

fn tost_side(
    provider: &dyn DistributionProvider,
    x: &[f64],
    bound: f64,
    alternative: Alternative,
) -> StatsResult<TostWilcoxonSide> {
    let diffs: Vec<f64> = x.iter().map(|&v| v - bound).collect();
    match signed_rank(provider, &diffs, alternative, "tost wilcoxon") {
        Ok(sr) => Ok(TostWilcoxonSide {
            n_effective: sr.n,
            statistic: sr.statistic,
            method: Some(sr.method),
            p_value: sr.p_value,
        }),
        Err(StatsError::InsufficientData { .. }) => {
            warn!(bound, "tost wilcoxon side has no observations off the bound");
            Ok(TostWilcoxonSide {
                n_effective: 0,
                statistic: f64::NAN,
                method: None,
                p_value: 1.0,
            })
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distribution::{ApproximateProvider, StatrsProvider};

    const PH: [f64; 10] = [7.3, 7.5, 7.7, 7.4, 7.6, 7.5, 7.3, 7.7, 7.5, 7.5];

    #[test]
    fn t_clustered_inside_bounds_is_equivalent() {
        let p = StatrsProvider::new();
        let r = tost_t(&p, &PH, 6.5, 8.5, 0.05).expect("tost");
        assert!(r.t_lower > 0.0);
        assert!(r.t_upper < 0.0);
        assert!(r.equivalent, "p = {}", r.p_combined);
        assert_eq!(r.p_combined, r.p_lower.max(r.p_upper));
    }

    #[test]
    fn t_mean_on_bound_is_half() {
        let p = StatrsProvider::new();
        let data = [6.0, 7.0, 8.0];
        let r = tost_t(&p, &data, 7.0, 9.0, 0.05).expect("tost");
        assert!(r.t_lower.abs() < 1e-12);
        assert!((r.p_lower - 0.5).abs() < 1e-12);
        assert!(!r.equivalent);

        let r = tost_t(&p, &data, 5.0, 7.0, 0.05).expect("tost");
        assert!((r.p_upper - 0.5).abs() < 1e-12);
        assert!(!r.equivalent);
    }

    #[test]
    fn t_outside_bounds_not_equivalent() {
        let p = StatrsProvider::new();
        let data = [9.1, 9.3, 9.2, 9.4, 9.0];
        let r = tost_t(&p, &data, 6.5, 8.5, 0.05).expect("tost");
        assert!(!r.equivalent);
        assert!(r.p_upper > 0.9);
    }

    #[test]
    fn bounds_validated() {
        let p = StatrsProvider::new();
        assert!(matches!(
            tost_t(&p, &PH, 8.5, 6.5, 0.05),
            Err(StatsError::InvalidParameter { name: "upper", .. })
        ));
        assert!(matches!(
            tost_wilcoxon(&p, &PH, f64::NAN, 6.5, 0.05),
            Err(StatsError::InvalidParameter { name: "lower", .. })
        ));
        assert!(matches!(
            tost_t(&p, &PH, 6.5, 8.5, 0.0),
            Err(StatsError::InvalidParameter { name: "alpha", .. })
        ));
    }

    #[test]
    fn t_requires_exact_provider() {
        assert!(matches!(
            tost_t(&ApproximateProvider::new(), &PH, 6.5, 8.5, 0.05),
            Err(StatsError::DistributionUnavailable { .. })
        ));
    }

    #[test]
    fn wilcoxon_clustered_inside_bounds() {
        let p = StatrsProvider::new();
        let r = tost_wilcoxon(&p, &PH, 6.5, 8.5, 0.05).expect("tost");
        assert_eq!(r.lower_test.n_effective, 10);
        assert_eq!(r.upper_test.n_effective, 10);
        // every value is above lower and below upper: V⁺ = 55 and 0
        assert_eq!(r.lower_test.statistic, 55.0);
        assert_eq!(r.upper_test.statistic, 0.0);
        assert!(r.equivalent, "p = {}", r.p_combined);
    }

    #[test]
    fn wilcoxon_ties_dropped_per_side() {
        let p = StatrsProvider::new();
        let data = [7.0, 7.0, 7.5, 8.0, 7.8, 7.2];
        let r = tost_wilcoxon(&p, &data, 7.0, 9.0, 0.05).expect("tost");
        assert_eq!(r.lower_test.n_effective, 4);
        assert_eq!(r.upper_test.n_effective, 6);
        assert_eq!(r.n, 6);
    }

    #[test]
    fn wilcoxon_all_on_bound_is_safe_default() {
        let p = StatrsProvider::new();
        let data = [7.0, 7.0, 7.0];
        let r = tost_wilcoxon(&p, &data, 7.0, 9.0, 0.05).expect("tost");
        assert_eq!(r.lower_test.n_effective, 0);
        assert!(r.lower_test.method.is_none());
        assert_eq!(r.p_lower, 1.0);
        assert_eq!(r.p_combined, 1.0);
        assert!(!r.equivalent);
    }

    #[test]
    fn wilcoxon_insufficient() {
        let p = StatrsProvider::new();
        assert!(matches!(
            tost_wilcoxon(&p, &[7.0], 6.5, 8.5, 0.05),
            Err(StatsError::InsufficientData { .. })
        ));
    }
}
