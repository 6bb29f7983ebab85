//! Reference distributions used to turn test statistics into p-values.
//!
//! Tests never call a distribution library directly. They ask a
//! [`DistributionProvider`] for a CDF, which lets the caller decide at
//! construction time whether exact numerics are available:
//!
//! - [`StatrsProvider`] — exact CDFs for every [`Distribution`] via `statrs`.
//! - [`ApproximateProvider`] — closed-form standard normal only
//!   (Abramowitz & Stegun 7.1.26). Every other distribution returns
//!   [`StatsError::DistributionUnavailable`], so a test whose precision
//!   depends on t, χ², binomial or F aborts instead of approximating.
//!
//! # Examples
//!
//! ```
//! use lakestat::distribution::{Distribution, DistributionProvider, StatrsProvider};
//!
//! let p = StatrsProvider::new();
//! let c = p.cdf(Distribution::StudentsT { df: 10.0 }, 0.0).unwrap();
//! assert!((c - 0.5).abs() < 1e-12);
//! ```

use std::fmt;
use std::sync::{Arc, OnceLock};

use serde::Serialize;
use statrs::distribution::{
    Binomial, ChiSquared, ContinuousCDF, DiscreteCDF, FisherSnedecor, Normal, StudentsT,
};
use tracing::debug;

use crate::config::Alternative;
use crate::error::{StatsError, StatsResult};

/// A reference distribution together with its parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum Distribution {
    /// N(0, 1).
    StandardNormal,
    /// Student's t with `df` degrees of freedom (may be fractional).
    StudentsT {
        /// Degrees of freedom.
        df: f64,
    },
    /// χ² with `df` degrees of freedom.
    ChiSquared {
        /// Degrees of freedom.
        df: f64,
    },
    /// Binomial(n, p); `x` is floored to a count.
    Binomial {
        /// Number of trials.
        n: u64,
        /// Success probability.
        p: f64,
    },
    /// F(df1, df2).
    FisherSnedecor {
        /// Numerator degrees of freedom.
        df1: f64,
        /// Denominator degrees of freedom.
        df2: f64,
    },
}

impl Distribution {
    /// Short name used in errors and logs.
    pub fn name(&self) -> &'static str {
        match self {
            Distribution::StandardNormal => "normal",
            Distribution::StudentsT { .. } => "student-t",
            Distribution::ChiSquared { .. } => "chi-squared",
            Distribution::Binomial { .. } => "binomial",
            Distribution::FisherSnedecor { .. } => "F",
        }
    }
}

/// Source of cumulative distribution functions.
///
/// Implementations must be read-only after construction; a single instance
/// is shared by every test call, across threads.
pub trait DistributionProvider: Send + Sync + fmt::Debug {
    /// Provider name, reported in [`StatsError::DistributionUnavailable`].
    fn name(&self) -> &'static str;

    /// P(X ≤ x).
    fn cdf(&self, dist: Distribution, x: f64) -> StatsResult<f64>;

    /// P(X > x). Exact providers should override this to avoid the
    /// cancellation in `1 - cdf` far in the upper tail.
    fn sf(&self, dist: Distribution, x: f64) -> StatsResult<f64> {
        Ok(1.0 - self.cdf(dist, x)?)
    }

    /// Standard normal quantile Φ⁻¹(p).
    fn normal_quantile(&self, p: f64) -> f64;

    /// Φ(x), falling back to the closed-form approximation if the provider
    /// refuses. Used by tests that must not fail (Shapiro-Wilk, trend).
    fn standard_normal_cdf(&self, x: f64) -> f64 {
        self.cdf(Distribution::StandardNormal, x)
            .unwrap_or_else(|_| approx_normal_cdf(x))
    }
}

/// Exact CDFs backed by `statrs`.
#[derive(Debug, Clone, Default)]
pub struct StatrsProvider {
    _private: (),
}

impl StatrsProvider {
    /// Creates the provider.
    pub fn new() -> Self {
        debug!(provider = "statrs", "distribution provider constructed");
        Self { _private: () }
    }
}

fn bad_param(name: &'static str, value: f64) -> StatsError {
    StatsError::InvalidParameter { name, value }
}

fn binomial_count(x: f64) -> Option<u64> {
    if x < 0.0 {
        None
    } else {
        Some(x.floor() as u64)
    }
}

impl DistributionProvider for StatrsProvider {
    fn name(&self) -> &'static str {
        "statrs"
    }

    fn cdf(&self, dist: Distribution, x: f64) -> StatsResult<f64> {
        let p = match dist {
            Distribution::StandardNormal => Normal::new(0.0, 1.0)
                .map_err(|_| bad_param("sd", 1.0))?
                .cdf(x),
            Distribution::StudentsT { df } => StudentsT::new(0.0, 1.0, df)
                .map_err(|_| bad_param("df", df))?
                .cdf(x),
            Distribution::ChiSquared { df } => ChiSquared::new(df)
                .map_err(|_| bad_param("df", df))?
                .cdf(x),
            Distribution::Binomial { n, p } => {
                let b = Binomial::new(p, n).map_err(|_| bad_param("p", p))?;
                match binomial_count(x) {
                    Some(k) => b.cdf(k),
                    None => 0.0,
                }
            }
            Distribution::FisherSnedecor { df1, df2 } => FisherSnedecor::new(df1, df2)
                .map_err(|_| bad_param("df1", df1))?
                .cdf(x),
        };
        Ok(p.clamp(0.0, 1.0))
    }

    fn sf(&self, dist: Distribution, x: f64) -> StatsResult<f64> {
        let p = match dist {
            Distribution::StandardNormal => Normal::new(0.0, 1.0)
                .map_err(|_| bad_param("sd", 1.0))?
                .sf(x),
            Distribution::StudentsT { df } => StudentsT::new(0.0, 1.0, df)
                .map_err(|_| bad_param("df", df))?
                .sf(x),
            Distribution::ChiSquared { df } => ChiSquared::new(df)
                .map_err(|_| bad_param("df", df))?
                .sf(x),
            Distribution::Binomial { n, p } => {
                let b = Binomial::new(p, n).map_err(|_| bad_param("p", p))?;
                match binomial_count(x) {
                    Some(k) => b.sf(k),
                    None => 1.0,
                }
            }
            Distribution::FisherSnedecor { df1, df2 } => FisherSnedecor::new(df1, df2)
                .map_err(|_| bad_param("df1", df1))?
                .sf(x),
        };
        Ok(p.clamp(0.0, 1.0))
    }

    fn normal_quantile(&self, p: f64) -> f64 {
        match Normal::new(0.0, 1.0) {
            Ok(n) => n.inverse_cdf(p),
            Err(_) => approx_normal_quantile(p),
        }
    }
}

/// Normal-only provider built from closed-form approximations.
///
/// Stands in for an environment without an exact numerical library.
#[derive(Debug, Clone, Default)]
pub struct ApproximateProvider {
    _private: (),
}

impl ApproximateProvider {
    /// Creates the provider.
    pub fn new() -> Self {
        debug!(provider = "approximate", "distribution provider constructed");
        Self { _private: () }
    }
}

impl DistributionProvider for ApproximateProvider {
    fn name(&self) -> &'static str {
        "approximate"
    }

    fn cdf(&self, dist: Distribution, x: f64) -> StatsResult<f64> {
        match dist {
            Distribution::StandardNormal => Ok(approx_normal_cdf(x)),
            other => Err(StatsError::DistributionUnavailable {
                distribution: other.name(),
                provider: self.name(),
            }),
        }
    }

    fn normal_quantile(&self, p: f64) -> f64 {
        approx_normal_quantile(p)
    }
}

static SHARED: OnceLock<Arc<StatrsProvider>> = OnceLock::new();

/// Process-wide exact provider, initialized on first use.
///
/// Initialization is idempotent and race-free; the instance is never
/// mutated afterwards.
pub fn shared_provider() -> Arc<StatrsProvider> {
    Arc::clone(SHARED.get_or_init(|| Arc::new(StatrsProvider::new())))
}

// ---------------------------------------------------------------------------
// Tail selection
// ---------------------------------------------------------------------------

/// p-value for a statistic whose null distribution is symmetric about zero
/// (normal, Student-t).
///
/// Both one-sided tails are expressed through the lower-tail CDF so that
/// p-values near zero keep full relative precision.
pub(crate) fn symmetric_p_value(
    provider: &dyn DistributionProvider,
    dist: Distribution,
    stat: f64,
    alternative: Alternative,
) -> StatsResult<f64> {
    let p = match alternative {
        Alternative::TwoSided => 2.0 * provider.cdf(dist, -stat.abs())?,
        Alternative::Greater => provider.cdf(dist, -stat)?,
        Alternative::Less => provider.cdf(dist, stat)?,
    };
    Ok(p.clamp(0.0, 1.0))
}

// ---------------------------------------------------------------------------
// Closed-form normal approximations
// ---------------------------------------------------------------------------

/// Φ(x) via the Abramowitz & Stegun 7.1.26 erf series (|ε| < 1.5e-7).
pub fn approx_normal_cdf(x: f64) -> f64 {
    if x.is_nan() {
        return f64::NAN;
    }
    0.5 * (1.0 + erf(x / std::f64::consts::SQRT_2))
}

fn erf(x: f64) -> f64 {
    const A1: f64 = 0.254829592;
    const A2: f64 = -0.284496736;
    const A3: f64 = 1.421413741;
    const A4: f64 = -1.453152027;
    const A5: f64 = 1.061405429;
    const P: f64 = 0.3275911;

    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs();
    let t = 1.0 / (1.0 + P * x);
    let y = 1.0 - (((((A5 * t + A4) * t) + A3) * t + A2) * t + A1) * t * (-x * x).exp();
    sign * y
}

// Acklam's rational approximation (relative error < 1.15e-9).
fn approx_normal_quantile(p: f64) -> f64 {
    if p.is_nan() {
        return f64::NAN;
    }
    if p <= 0.0 {
        return f64::NEG_INFINITY;
    }
    if p >= 1.0 {
        return f64::INFINITY;
    }

    const A: [f64; 6] = [
        -3.969683028665376e+01,
        2.209460984245205e+02,
        -2.759285104469687e+02,
        1.383577518672690e+02,
        -3.066479806614716e+01,
        2.506628277459239e+00,
    ];
    const B: [f64; 5] = [
        -5.447609879822406e+01,
        1.615858368580409e+02,
        -1.556989798598866e+02,
        6.680131188771972e+01,
        -1.328068155288572e+01,
    ];
    const C: [f64; 6] = [
        -7.784894002430293e-03,
        -3.223964580411365e-01,
        -2.400758277161838e+00,
        -2.549732539343734e+00,
        4.374664141464968e+00,
        2.938163982698783e+00,
    ];
    const D: [f64; 4] = [
        7.784695709041462e-03,
        3.224671290700398e-01,
        2.445134137142996e+00,
        3.754408661907416e+00,
    ];
    const P_LOW: f64 = 0.02425;

    let tail = |q: f64| {
        (((((C[0] * q + C[1]) * q + C[2]) * q + C[3]) * q + C[4]) * q + C[5])
            / ((((D[0] * q + D[1]) * q + D[2]) * q + D[3]) * q + 1.0)
    };

    if p < P_LOW {
        tail((-2.0 * p.ln()).sqrt())
    } else if p <= 1.0 - P_LOW {
        let q = p - 0.5;
        let r = q * q;
        (((((A[0] * r + A[1]) * r + A[2]) * r + A[3]) * r + A[4]) * r + A[5]) * q
            / (((((B[0] * r + B[1]) * r + B[2]) * r + B[3]) * r + B[4]) * r + 1.0)
    } else {
        -tail((-2.0 * (1.0 - p).ln()).sqrt())
    }
}
