//! One-sample tests against a reference value μ₀, plus the Shapiro-Wilk
//! normality test.
//!
//! Every test drops non-finite values first; the minimum sample size
//! applies to what remains.
//!
//! # Examples
//!
//! ```
//! use lakestat::config::TestOptions;
//! use lakestat::distribution::StatrsProvider;
//! use lakestat::one_sample::one_sample_t_test;
//!
//! let provider = StatrsProvider::new();
//! let ph = [7.1, 7.3, 6.9, 7.0, 7.2, 7.4, 7.1, 6.8];
//! let r = one_sample_t_test(&provider, &ph, 7.0, &TestOptions::default()).unwrap();
//! assert!(!r.significant); // cannot reject H₀: μ = 7.0
//! ```

use serde::Serialize;
use tracing::{debug, warn};

use crate::config::{Alternative, TestOptions};
use crate::descriptive::{self, finite};
use crate::distribution::{symmetric_p_value, Distribution, DistributionProvider};
use crate::error::{require_n, StatsError, StatsResult};
use crate::rank::{midrank, TIE_TOLERANCE};

pub(crate) fn check_reference(mu0: f64) -> StatsResult<()> {
    if !mu0.is_finite() {
        return Err(StatsError::InvalidParameter {
            name: "mu0",
            value: mu0,
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// t-test
// ---------------------------------------------------------------------------

/// Result of the one-sample t-test.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OneSampleTResult {
    /// Sample size.
    pub n: usize,
    /// Sample mean.
    pub mean: f64,
    /// Sample standard deviation.
    pub sd: f64,
    /// Reference value.
    pub mu0: f64,
    /// t statistic.
    pub t: f64,
    /// Degrees of freedom (n − 1).
    pub df: f64,
    /// p-value for the requested alternative.
    pub p_value: f64,
    /// Significance level.
    pub alpha: f64,
    /// `p_value < alpha`.
    pub significant: bool,
    /// Alternative hypothesis.
    pub alternative: Alternative,
}

/// One-sample t-test: H₀: μ = μ₀.
///
/// # Algorithm
///
/// t = (x̄ − μ₀) / (s / √n), df = n − 1. The p-value comes from the
/// Student-t lower tail: two-sided 2·F(−|t|), greater F(−t), less F(t).
///
/// # Errors
///
/// - [`StatsError::InsufficientData`] if fewer than 2 finite values.
/// - [`StatsError::DegenerateInput`] if the sample has zero variance.
/// - [`StatsError::DistributionUnavailable`] if the provider has no exact t CDF.
pub fn one_sample_t_test(
    provider: &dyn DistributionProvider,
    data: &[f64],
    mu0: f64,
    opts: &TestOptions,
) -> StatsResult<OneSampleTResult> {
    const TEST: &str = "one-sample t-test";
    opts.validate()?;
    check_reference(mu0)?;
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

    let t = (mean - mu0) / (sd / (n as f64).sqrt());
    let df = (n - 1) as f64;
    let p_value = symmetric_p_value(
        provider,
        Distribution::StudentsT { df },
        t,
        opts.alternative,
    )?;

    Ok(OneSampleTResult {
        n,
        mean,
        sd,
        mu0,
        t,
        df,
        p_value,
        alpha: opts.alpha,
        significant: p_value < opts.alpha,
        alternative: opts.alternative,
    })
}

pub(crate) fn mean_sd(x: &[f64], test: &'static str) -> StatsResult<(f64, f64)> {
    match (descriptive::mean(x), descriptive::std_dev(x)) {
        (Some(m), Some(s)) => Ok((m, s)),
        _ => Err(StatsError::InsufficientData {
            test,
            needed: 2,
            got: x.len(),
        }),
    }
}

// ---------------------------------------------------------------------------
// Wilcoxon signed-rank
// ---------------------------------------------------------------------------

/// How the signed-rank p-value was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum WilcoxonMethod {
    /// Exact null distribution (n < 50, no ties, no zero differences).
    Exact,
    /// Normal approximation with continuity and tie correction.
    Normal,
}

/// Result of the one-sample Wilcoxon signed-rank test.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WilcoxonResult {
    /// Effective sample size (differences within 1e-12 of zero removed).
    pub n: usize,
    /// Number of differences dropped as ties with μ₀.
    pub n_zero: usize,
    /// V = sum of the ranks of the positive differences.
    pub statistic: f64,
    /// Continuity-corrected z (normal method only).
    pub z: Option<f64>,
    /// Method used for the p-value.
    pub method: WilcoxonMethod,
    /// Sample median.
    pub median: f64,
    /// Reference value.
    pub mu0: f64,
    /// p-value for the requested alternative.
    pub p_value: f64,
    /// Significance level.
    pub alpha: f64,
    /// `p_value < alpha`.
    pub significant: bool,
    /// Alternative hypothesis.
    pub alternative: Alternative,
}

/// Wilcoxon signed-rank test: H₀: the distribution of x − μ₀ is symmetric
/// about zero.
///
/// # Algorithm
///
/// 1. dᵢ = xᵢ − μ₀; differences with |dᵢ| < 1e-12 are dropped.
/// 2. Rank |dᵢ| with midranks; V = Σ ranks where dᵢ > 0.
/// 3. Exact null distribution when n < 50 and there are no ties and no
///    dropped zeros; otherwise z = (V − n(n+1)/4 − c) / σ with
///    σ² = n(n+1)(2n+1)/24 − Σ(t³ − t)/48 and continuity correction c = ±0.5
///    toward the mean.
///
/// # Errors
///
/// - [`StatsError::InsufficientData`] if fewer than 2 finite values, or no
///   differences remain after dropping ties with μ₀.
///
/// # References
///
/// Wilcoxon (1945). "Individual comparisons by ranking methods".
/// Biometrics Bulletin, 1(6), 80–83.
pub fn wilcoxon_signed_rank(
    provider: &dyn DistributionProvider,
    data: &[f64],
    mu0: f64,
    opts: &TestOptions,
) -> StatsResult<WilcoxonResult> {
    const TEST: &str = "wilcoxon signed-rank";
    opts.validate()?;
    check_reference(mu0)?;
    let x = finite(data);
    require_n(TEST, 2, x.len())?;

    let diffs: Vec<f64> = x.iter().map(|&v| v - mu0).collect();
    let sr = signed_rank(provider, &diffs, opts.alternative, TEST)?;
    let median = descriptive::median(&x).unwrap_or(f64::NAN);

    Ok(WilcoxonResult {
        n: sr.n,
        n_zero: sr.n_zero,
        statistic: sr.statistic,
        z: sr.z,
        method: sr.method,
        median,
        mu0,
        p_value: sr.p_value,
        alpha: opts.alpha,
        significant: sr.p_value < opts.alpha,
        alternative: opts.alternative,
    })
}

/// Signed-rank statistic and p-value for a vector of differences.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SignedRank {
    pub n: usize,
    pub n_zero: usize,
    pub statistic: f64,
    pub z: Option<f64>,
    pub method: WilcoxonMethod,
    pub p_value: f64,
}

pub(crate) fn signed_rank(
    provider: &dyn DistributionProvider,
    diffs: &[f64],
    alternative: Alternative,
    test: &'static str,
) -> StatsResult<SignedRank> {
    let nonzero: Vec<f64> = diffs
        .iter()
        .copied()
        .filter(|d| d.abs() >= TIE_TOLERANCE)
        .collect();
    let n = nonzero.len();
    let n_zero = diffs.len() - n;
    require_n(test, 1, n)?;

    let mut by_abs = nonzero.clone();
    by_abs.sort_by(|a, b| a.abs().total_cmp(&b.abs()));
    let abs_sorted: Vec<f64> = by_abs.iter().map(|d| d.abs()).collect();
    let ranking = midrank(&abs_sorted);

    let statistic: f64 = by_abs
        .iter()
        .zip(ranking.ranks.iter())
        .filter(|(d, _)| **d > 0.0)
        .map(|(_, &r)| r)
        .sum();

    let nf = n as f64;
    if n < 50 && !ranking.has_ties() && n_zero == 0 {
        let p_value = exact_signed_rank_p(n, statistic.round() as usize, alternative);
        return Ok(SignedRank {
            n,
            n_zero,
            statistic,
            z: None,
            method: WilcoxonMethod::Exact,
            p_value,
        });
    }

    debug!(
        test,
        n,
        n_zero,
        ties = ranking.ties.len(),
        "signed-rank normal approximation"
    );
    let centered = statistic - nf * (nf + 1.0) / 4.0;
    let sigma =
        (nf * (nf + 1.0) * (2.0 * nf + 1.0) / 24.0 - ranking.tie_term() / 48.0).sqrt();
    let correction = match alternative {
        Alternative::TwoSided => 0.5 * sign(centered),
        Alternative::Greater => 0.5,
        Alternative::Less => -0.5,
    };
    let z = (centered - correction) / sigma;
    let lower = provider.cdf(Distribution::StandardNormal, z)?;
    let upper = provider.cdf(Distribution::StandardNormal, -z)?;
    let p_value = match alternative {
        Alternative::TwoSided => 2.0 * lower.min(upper),
        Alternative::Greater => upper,
        Alternative::Less => lower,
    };

    Ok(SignedRank {
        n,
        n_zero,
        statistic,
        z: Some(z),
        method: WilcoxonMethod::Normal,
        p_value: p_value.clamp(0.0, 1.0),
    })
}

fn sign(x: f64) -> f64 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        0.0
    }
}

// Number of subsets of {1..n} for every achievable rank sum.
fn signed_rank_counts(n: usize) -> Vec<f64> {
    let max = n * (n + 1) / 2;
    let mut counts = vec![0.0; max + 1];
    counts[0] = 1.0;
    for k in 1..=n {
        let top = k * (k + 1) / 2;
        for s in (k..=top).rev() {
            counts[s] += counts[s - k];
        }
    }
    counts
}

fn exact_signed_rank_p(n: usize, v: usize, alternative: Alternative) -> f64 {
    let counts = signed_rank_counts(n);
    let total = 2f64.powi(n as i32);
    let max = counts.len() - 1;
    let v = v.min(max);
    // P(V ≤ q) and P(V ≥ q)
    let lower = |q: usize| counts[..=q].iter().sum::<f64>() / total;
    let upper = |q: usize| counts[q..].iter().sum::<f64>() / total;

    let p = match alternative {
        Alternative::Less => lower(v),
        Alternative::Greater => upper(v),
        Alternative::TwoSided => {
            let p = if (v as f64) > (n * (n + 1)) as f64 / 4.0 {
                upper(v)
            } else {
                lower(v)
            };
            2.0 * p
        }
    };
    p.clamp(0.0, 1.0)
}

// ---------------------------------------------------------------------------
// Sign test
// ---------------------------------------------------------------------------

/// Result of the one-sample sign test.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SignTestResult {
    /// Number of non-tied observations.
    pub n: usize,
    /// Observations above μ₀.
    pub k_positive: usize,
    /// Observations below μ₀.
    pub k_negative: usize,
    /// Sample median.
    pub median: f64,
    /// Reference value.
    pub mu0: f64,
    /// p-value for the requested alternative.
    pub p_value: f64,
    /// Significance level.
    pub alpha: f64,
    /// `p_value < alpha`.
    pub significant: bool,
    /// Alternative hypothesis.
    pub alternative: Alternative,
}

/// Sign test: H₀: median = μ₀.
///
/// # Algorithm
///
/// k = #(xᵢ > μ₀) among the n values not equal to μ₀; k ~ Binomial(n, ½)
/// under H₀. Greater: P(X ≥ k); less: P(X ≤ k);
/// two-sided: min(1, 2·min(F(k), F(n − k))).
///
/// # Errors
///
/// - [`StatsError::InsufficientData`] if fewer than 2 finite values or every
///   value equals μ₀.
/// - [`StatsError::DistributionUnavailable`] without an exact binomial CDF.
pub fn sign_test(
    provider: &dyn DistributionProvider,
    data: &[f64],
    mu0: f64,
    opts: &TestOptions,
) -> StatsResult<SignTestResult> {
    const TEST: &str = "sign test";
    opts.validate()?;
    check_reference(mu0)?;
    let x = finite(data);
    require_n(TEST, 2, x.len())?;

    let k_positive = x.iter().filter(|&&v| v - mu0 >= TIE_TOLERANCE).count();
    let k_negative = x.iter().filter(|&&v| mu0 - v >= TIE_TOLERANCE).count();
    let n = k_positive + k_negative;
    require_n(TEST, 1, n)?;

    let binom = Distribution::Binomial {
        n: n as u64,
        p: 0.5,
    };
    let k = k_positive as f64;
    let p_value = match opts.alternative {
        Alternative::Greater => {
            if k_positive == 0 {
                1.0
            } else {
                provider.sf(binom, k - 1.0)?
            }
        }
        Alternative::Less => provider.cdf(binom, k)?,
        Alternative::TwoSided => {
            let lo = provider.cdf(binom, k)?;
            let hi = provider.cdf(binom, (n - k_positive) as f64)?;
            (2.0 * lo.min(hi)).min(1.0)
        }
    };
    let p_value = p_value.clamp(0.0, 1.0);

    Ok(SignTestResult {
        n,
        k_positive,
        k_negative,
        median: descriptive::median(&x).unwrap_or(f64::NAN),
        mu0,
        p_value,
        alpha: opts.alpha,
        significant: p_value < opts.alpha,
        alternative: opts.alternative,
    })
}

// ---------------------------------------------------------------------------
// Shapiro-Wilk
// ---------------------------------------------------------------------------

/// Result of the Shapiro-Wilk normality test.
///
/// Outside the supported range (3 ≤ n ≤ 5000) `w` and `p_value` are NaN
/// and `normal` is false.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ShapiroWilkResult {
    /// Sample size.
    pub n: usize,
    /// Sample mean.
    pub mean: f64,
    /// Sample median.
    pub median: f64,
    /// Sample standard deviation.
    pub sd: f64,
    /// The W statistic (0 < W ≤ 1). Values close to 1 suggest normality.
    pub w: f64,
    /// Upper-tail p-value. Small values reject normality.
    pub p_value: f64,
    /// Significance level.
    pub alpha: f64,
    /// `p_value >= alpha`.
    pub normal: bool,
}

/// Shapiro-Wilk normality test: H₀: data is normally distributed.
///
/// # Algorithm
///
/// Royston (1992, 1995), algorithm AS R94:
/// 1. Coefficients from Blom scores Φ⁻¹((i − 3/8)/(n + 1/4)) with polynomial
///    corrections of the one (n ≤ 5) or two (n > 5) extreme weights.
/// 2. W = (Σ aᵢ (x₍ₙ₊₁₋ᵢ₎ − x₍ᵢ₎))² / Σ (xᵢ − x̄)².
/// 3. n = 3: p = (6/π)(asin √W − π/3). Otherwise log(1 − W) is normalised
///    with size-dependent polynomials (n ≤ 11 uses an extra −log(γ − y)
///    transform) and p is the upper-tail normal probability.
///
/// A sample with zero range returns W = 1, p = 1.
///
/// # References
///
/// - Shapiro & Wilk (1965). "An analysis of variance test for normality".
///   Biometrika, 52(3–4), 591–611.
/// - Royston (1995). "Remark AS R94: A remark on Algorithm AS 181".
///   Applied Statistics, 44(4), 547–551.
pub fn shapiro_wilk(
    provider: &dyn DistributionProvider,
    data: &[f64],
    alpha: f64,
) -> ShapiroWilkResult {
    let mut x = finite(data);
    x.sort_by(f64::total_cmp);
    let n = x.len();

    let mut result = ShapiroWilkResult {
        n,
        mean: descriptive::mean(&x).unwrap_or(f64::NAN),
        median: descriptive::median(&x).unwrap_or(f64::NAN),
        sd: descriptive::std_dev(&x).unwrap_or(f64::NAN),
        w: f64::NAN,
        p_value: f64::NAN,
        alpha,
        normal: false,
    };

    if !(3..=5000).contains(&n) {
        warn!(n, "shapiro-wilk outside supported range 3..=5000");
        return result;
    }

    let ss: f64 = x.iter().map(|&v| (v - result.mean).powi(2)).sum();
    let (w, p) = if x[n - 1] - x[0] < 1e-19 || ss < 1e-300 {
        (1.0, 1.0)
    } else if n == 3 {
        sw_n3(&x, ss)
    } else {
        match sw_coefficients(provider, n) {
            Some(a) => {
                let w = (sw_numerator(&x, &a).powi(2) / ss).min(1.0);
                (w, sw_p_value(provider, w, n))
            }
            None => return result,
        }
    };

    result.w = w;
    result.p_value = p.clamp(0.0, 1.0);
    result.normal = result.p_value >= alpha;
    result
}

// a = (1/√2, 0, −1/√2), so W = (x₃ − x₁)² / (2·SS).
fn sw_n3(x: &[f64], ss: f64) -> (f64, f64) {
    let w = ((x[2] - x[0]).powi(2) / (2.0 * ss)).clamp(0.75, 1.0);
    let p = 6.0 / std::f64::consts::PI * (w.sqrt().asin() - std::f64::consts::FRAC_PI_3);
    (w, p.max(0.0))
}

// Royston polynomial coefficients (AS R94)
const SW_C1: [f64; 6] = [0.0, 0.221157, -0.147981, -2.07119, 4.434685, -2.706056];
const SW_C2: [f64; 6] = [0.0, 0.042981, -0.293762, -1.752461, 5.682633, -3.582633];
const SW_C3: [f64; 4] = [0.544, -0.39978, 0.025054, -6.714e-4];
const SW_C4: [f64; 4] = [1.3822, -0.77857, 0.062767, -0.0020322];
const SW_C5: [f64; 4] = [-1.5861, -0.31082, -0.083751, 0.0038915];
const SW_C6: [f64; 3] = [-0.4803, -0.082676, 0.0030302];
const SW_G: [f64; 2] = [-2.273, 0.459];

// c[0] + c[1]*x + c[2]*x^2 + ... (Horner)
fn sw_poly(c: &[f64], x: f64) -> f64 {
    c.iter().rev().fold(0.0, |acc, &ci| acc * x + ci)
}

// Weights for the lower half of the order statistics.
fn sw_coefficients(provider: &dyn DistributionProvider, n: usize) -> Option<Vec<f64>> {
    let nn2 = n / 2;
    let m: Vec<f64> = (0..nn2)
        .map(|i| provider.normal_quantile((i as f64 + 1.0 - 0.375) / (n as f64 + 0.25)))
        .collect();
    let summ2 = 2.0 * m.iter().map(|v| v * v).sum::<f64>();
    let ssumm2 = summ2.sqrt();
    let rsn = 1.0 / (n as f64).sqrt();

    let a1 = sw_poly(&SW_C1, rsn) - m[0] / ssumm2;
    let mut a = vec![0.0; nn2];
    a[0] = a1;

    let (fac_sq, one_minus, first) = if n <= 5 {
        (summ2 - 2.0 * m[0] * m[0], 1.0 - 2.0 * a1 * a1, 1)
    } else {
        let a2 = -m[1] / ssumm2 + sw_poly(&SW_C2, rsn);
        a[1] = a2;
        (
            summ2 - 2.0 * m[0] * m[0] - 2.0 * m[1] * m[1],
            1.0 - 2.0 * a1 * a1 - 2.0 * a2 * a2,
            2,
        )
    };
    if fac_sq <= 0.0 || one_minus <= 0.0 {
        return None;
    }
    let fac = (fac_sq / one_minus).sqrt();
    for i in first..nn2 {
        a[i] = -m[i] / fac;
    }
    Some(a)
}

// Σ aᵢ (x₍ₙ₊₁₋ᵢ₎ − x₍ᵢ₎), pairing the lower half with the mirrored upper half.
fn sw_numerator(sorted: &[f64], a: &[f64]) -> f64 {
    a.iter()
        .zip(sorted.iter().zip(sorted.iter().rev()))
        .map(|(&ai, (&lo, &hi))| ai * (hi - lo))
        .sum()
}

fn sw_p_value(provider: &dyn DistributionProvider, w: f64, n: usize) -> f64 {
    let nf = n as f64;
    let w1 = 1.0 - w;
    if w1 <= 0.0 {
        return 1.0;
    }
    let y = w1.ln();

    let (y, m, s) = if n <= 11 {
        let gamma = sw_poly(&SW_G, nf);
        if y >= gamma {
            return 0.0;
        }
        (
            -(gamma - y).ln(),
            sw_poly(&SW_C3, nf),
            sw_poly(&SW_C4, nf).exp(),
        )
    } else {
        let ln_n = nf.ln();
        (y, sw_poly(&SW_C5, ln_n), sw_poly(&SW_C6, ln_n).exp())
    };
    if s < 1e-300 {
        return 0.0;
    }
    provider.standard_normal_cdf(-(y - m) / s)
}
