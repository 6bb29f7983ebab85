//! Two-sample location tests and the Levene / Brown–Forsythe variance test.
//!
//! # Examples
//!
//! ```
//! use lakestat::config::TestOptions;
//! use lakestat::distribution::StatrsProvider;
//! use lakestat::two_sample::welch_t_test;
//!
//! let provider = StatrsProvider::new();
//! let upstream = [5.1, 4.9, 5.2, 5.0, 4.8];
//! let downstream = [7.1, 6.9, 7.2, 7.0, 6.8];
//! let r = welch_t_test(&provider, &upstream, &downstream, &TestOptions::default()).unwrap();
//! assert!(r.p_value < 0.01);
//! ```

use serde::Serialize;

use crate::config::{Alternative, Center, TestOptions};
use crate::descriptive::{self, finite};
use crate::distribution::{symmetric_p_value, Distribution, DistributionProvider};
use crate::error::{require_n, StatsError, StatsResult};
use crate::one_sample::mean_sd;
use crate::rank::rank_unsorted;

// ---------------------------------------------------------------------------
// t-tests
// ---------------------------------------------------------------------------

/// Variance assumption of a two-sample t-test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TTestMethod {
    /// Pooled variance, df = n₁ + n₂ − 2.
    Student,
    /// Separate variances, Welch–Satterthwaite df.
    Welch,
}

/// Result of a two-sample t-test.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TwoSampleTResult {
    /// Student or Welch.
    pub method: TTestMethod,
    /// Size of the first sample.
    pub n1: usize,
    /// Size of the second sample.
    pub n2: usize,
    /// Mean of the first sample.
    pub mean1: f64,
    /// Mean of the second sample.
    pub mean2: f64,
    /// Standard deviation of the first sample.
    pub sd1: f64,
    /// Standard deviation of the second sample.
    pub sd2: f64,
    /// t statistic for mean1 − mean2.
    pub t: f64,
    /// Degrees of freedom (fractional for Welch).
    pub df: f64,
    /// p-value for the requested alternative.
    pub p_value: f64,
    /// Significance level.
    pub alpha: f64,
    /// `p_value < alpha`.
    pub significant: bool,
    /// Alternative hypothesis (about mean1 − mean2).
    pub alternative: Alternative,
}

/// Student's two-sample t-test with pooled variance: H₀: μ₁ = μ₂.
///
/// s²ₚ = ((n₁−1)s₁² + (n₂−1)s₂²) / (n₁+n₂−2), t = (x̄₁ − x̄₂) / √(s²ₚ(1/n₁ + 1/n₂)).
///
/// # Errors
///
/// [`StatsError::InsufficientData`] if either sample has fewer than 2 finite
/// values; [`StatsError::DegenerateInput`] if both samples are constant.
pub fn student_t_test(
    provider: &dyn DistributionProvider,
    a: &[f64],
    b: &[f64],
    opts: &TestOptions,
) -> StatsResult<TwoSampleTResult> {
    two_sample_t(provider, a, b, opts, TTestMethod::Student)
}

/// Welch's two-sample t-test: H₀: μ₁ = μ₂ (unequal variances).
///
/// t = (x̄₁ − x̄₂) / √(s₁²/n₁ + s₂²/n₂), df by Welch–Satterthwaite.
///
/// # References
///
/// Welch (1947). "The generalization of Student's problem when several
/// different population variances are involved". Biometrika, 34, 28–35.
pub fn welch_t_test(
    provider: &dyn DistributionProvider,
    a: &[f64],
    b: &[f64],
    opts: &TestOptions,
) -> StatsResult<TwoSampleTResult> {
    two_sample_t(provider, a, b, opts, TTestMethod::Welch)
}

fn two_sample_t(
    provider: &dyn DistributionProvider,
    a: &[f64],
    b: &[f64],
    opts: &TestOptions,
    method: TTestMethod,
) -> StatsResult<TwoSampleTResult> {
    let test = match method {
        TTestMethod::Student => "student t-test",
        TTestMethod::Welch => "welch t-test",
    };
    opts.validate()?;
    let a = finite(a);
    let b = finite(b);
    require_n(test, 2, a.len())?;
    require_n(test, 2, b.len())?;

    let (mean1, sd1) = mean_sd(&a, test)?;
    let (mean2, sd2) = mean_sd(&b, test)?;
    let n1f = a.len() as f64;
    let n2f = b.len() as f64;
    let var1 = sd1 * sd1;
    let var2 = sd2 * sd2;

    let (se_sq, df) = match method {
        TTestMethod::Student => {
            let df = n1f + n2f - 2.0;
            let pooled = ((n1f - 1.0) * var1 + (n2f - 1.0) * var2) / df;
            (pooled * (1.0 / n1f + 1.0 / n2f), df)
        }
        TTestMethod::Welch => {
            let v1 = var1 / n1f;
            let v2 = var2 / n2f;
            let df = (v1 + v2).powi(2) / (v1 * v1 / (n1f - 1.0) + v2 * v2 / (n2f - 1.0));
            (v1 + v2, df)
        }
    };
    if se_sq < 1e-300 {
        return Err(StatsError::DegenerateInput {
            test,
            reason: "zero variance in both samples",
        });
    }

    let t = (mean1 - mean2) / se_sq.sqrt();
    let p_value = symmetric_p_value(
        provider,
        Distribution::StudentsT { df },
        t,
        opts.alternative,
    )?;

    Ok(TwoSampleTResult {
        method,
        n1: a.len(),
        n2: b.len(),
        mean1,
        mean2,
        sd1,
        sd2,
        t,
        df,
        p_value,
        alpha: opts.alpha,
        significant: p_value < opts.alpha,
        alternative: opts.alternative,
    })
}

// ---------------------------------------------------------------------------
// Mann-Whitney U
// ---------------------------------------------------------------------------

/// Result of the Mann-Whitney U test.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MannWhitneyResult {
    /// Size of the first sample.
    pub n1: usize,
    /// Size of the second sample.
    pub n2: usize,
    /// Median of the first sample.
    pub median1: f64,
    /// Median of the second sample.
    pub median2: f64,
    /// min(U₁, U₂).
    pub u: f64,
    /// U for the first sample: R₁ − n₁(n₁+1)/2.
    pub u1: f64,
    /// n₁n₂ − U₁.
    pub u2: f64,
    /// Continuity-corrected z for the requested alternative.
    pub z: f64,
    /// p-value for the requested alternative.
    pub p_value: f64,
    /// Significance level.
    pub alpha: f64,
    /// `p_value < alpha`.
    pub significant: bool,
    /// Alternative hypothesis (greater: the first sample tends to be larger).
    pub alternative: Alternative,
}

/// Mann-Whitney U test: H₀: both samples come from the same distribution.
///
/// # Algorithm
///
/// 1. Pool and midrank; U₁ = R₁ − n₁(n₁+1)/2, U₂ = n₁n₂ − U₁.
/// 2. σ² = n₁n₂(N+1)/12 − n₁n₂·Σ(t³ − t) / (12N(N−1)).
/// 3. Two-sided: z = (min(U₁,U₂) − n₁n₂/2 + 0.5)/σ, p = 2Φ(z).
///    One-sided alternatives use U₁ with the 0.5 correction toward the mean.
///
/// # Errors
///
/// [`StatsError::InsufficientData`] if either sample has fewer than 2 finite
/// values; [`StatsError::DegenerateInput`] if every pooled value is tied.
///
/// # References
///
/// Mann & Whitney (1947). "On a test of whether one of two random variables
/// is stochastically larger than the other". Ann. Math. Statist., 18(1), 50–60.
pub fn mann_whitney_u(
    provider: &dyn DistributionProvider,
    a: &[f64],
    b: &[f64],
    opts: &TestOptions,
) -> StatsResult<MannWhitneyResult> {
    const TEST: &str = "mann-whitney u";
    opts.validate()?;
    let a = finite(a);
    let b = finite(b);
    require_n(TEST, 2, a.len())?;
    require_n(TEST, 2, b.len())?;

    let n1f = a.len() as f64;
    let n2f = b.len() as f64;
    let nf = n1f + n2f;

    let pooled: Vec<f64> = a.iter().chain(b.iter()).copied().collect();
    let ranking = rank_unsorted(&pooled);
    let r1: f64 = ranking.ranks[..a.len()].iter().sum();
    let u1 = r1 - n1f * (n1f + 1.0) / 2.0;
    let u2 = n1f * n2f - u1;
    let u = u1.min(u2);

    let mu = n1f * n2f / 2.0;
    let sigma_sq =
        n1f * n2f * (nf + 1.0) / 12.0 - n1f * n2f * ranking.tie_term() / (12.0 * nf * (nf - 1.0));
    if sigma_sq <= 1e-300 {
        return Err(StatsError::DegenerateInput {
            test: TEST,
            reason: "all pooled values tied",
        });
    }
    let sigma = sigma_sq.sqrt();

    let (z, p_value) = match opts.alternative {
        Alternative::TwoSided => {
            let z = (u - mu + 0.5) / sigma;
            (z, 2.0 * provider.cdf(Distribution::StandardNormal, z)?)
        }
        Alternative::Greater => {
            let z = (u1 - mu - 0.5) / sigma;
            (z, provider.cdf(Distribution::StandardNormal, -z)?)
        }
        Alternative::Less => {
            let z = (u1 - mu + 0.5) / sigma;
            (z, provider.cdf(Distribution::StandardNormal, z)?)
        }
    };
    let p_value = p_value.clamp(0.0, 1.0);

    Ok(MannWhitneyResult {
        n1: a.len(),
        n2: b.len(),
        median1: descriptive::median(&a).unwrap_or(f64::NAN),
        median2: descriptive::median(&b).unwrap_or(f64::NAN),
        u,
        u1,
        u2,
        z,
        p_value,
        alpha: opts.alpha,
        significant: p_value < opts.alpha,
        alternative: opts.alternative,
    })
}

// ---------------------------------------------------------------------------
// Mood's median test
// ---------------------------------------------------------------------------

/// Result of Mood's median test.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MoodMedianResult {
    /// Size of the first sample.
    pub n1: usize,
    /// Size of the second sample.
    pub n2: usize,
    /// Median of the first sample.
    pub median1: f64,
    /// Median of the second sample.
    pub median2: f64,
    /// Grand median of the pooled samples.
    pub median: f64,
    /// Counts per group: `table[g] = [#(x ≤ median), #(x > median)]`.
    pub table: [[u64; 2]; 2],
    /// Pearson χ² statistic.
    pub chi2: f64,
    /// Degrees of freedom (always 1).
    pub df: f64,
    /// Whether the Yates continuity correction was applied.
    pub yates: bool,
    /// Upper-tail χ² p-value.
    pub p_value: f64,
    /// Significance level.
    pub alpha: f64,
    /// `p_value < alpha`.
    pub significant: bool,
}

/// Mood's median test: H₀: both samples share the same median.
///
/// Builds the 2×2 table of values at-or-below vs above the pooled median
/// and runs Pearson's χ² (df = 1), optionally with Yates' correction
/// `(max(|O − E| − 0.5, 0))² / E`.
///
/// # Errors
///
/// - [`StatsError::InsufficientData`] if either sample has fewer than 2
///   finite values.
/// - [`StatsError::DegenerateInput`] if no value lies above the pooled
///   median (empty column).
/// - [`StatsError::DistributionUnavailable`] without an exact χ² CDF.
pub fn mood_median_test(
    provider: &dyn DistributionProvider,
    a: &[f64],
    b: &[f64],
    alpha: f64,
    yates: bool,
) -> StatsResult<MoodMedianResult> {
    const TEST: &str = "mood median test";
    TestOptions::new(alpha, Alternative::TwoSided).validate()?;
    let a = finite(a);
    let b = finite(b);
    require_n(TEST, 2, a.len())?;
    require_n(TEST, 2, b.len())?;

    let pooled: Vec<f64> = a.iter().chain(b.iter()).copied().collect();
    let median = descriptive::median(&pooled).unwrap_or(f64::NAN);

    let split = |g: &[f64]| -> [u64; 2] {
        let above = g.iter().filter(|&&v| v > median).count() as u64;
        [g.len() as u64 - above, above]
    };
    let table = [split(&a), split(&b)];

    let row_sums = [
        (table[0][0] + table[0][1]) as f64,
        (table[1][0] + table[1][1]) as f64,
    ];
    let col_sums = [
        (table[0][0] + table[1][0]) as f64,
        (table[0][1] + table[1][1]) as f64,
    ];
    let total = row_sums[0] + row_sums[1];
    if col_sums.iter().any(|&c| c <= 0.0) {
        return Err(StatsError::DegenerateInput {
            test: TEST,
            reason: "no values above the pooled median",
        });
    }

    let mut chi2 = 0.0;
    for (i, row) in table.iter().enumerate() {
        for (j, &observed) in row.iter().enumerate() {
            let expected = row_sums[i] * col_sums[j] / total;
            let dev = (observed as f64 - expected).abs();
            let dev = if yates { (dev - 0.5).max(0.0) } else { dev };
            chi2 += dev * dev / expected;
        }
    }

    let df = 1.0;
    let p_value = provider
        .sf(Distribution::ChiSquared { df }, chi2)?
        .clamp(0.0, 1.0);

    Ok(MoodMedianResult {
        n1: a.len(),
        n2: b.len(),
        median1: descriptive::median(&a).unwrap_or(f64::NAN),
        median2: descriptive::median(&b).unwrap_or(f64::NAN),
        median,
        table,
        chi2,
        df,
        yates,
        p_value,
        alpha,
        significant: p_value < alpha,
    })
}

// ---------------------------------------------------------------------------
// Levene / Brown–Forsythe
// ---------------------------------------------------------------------------

/// Result of the Levene (or Brown–Forsythe) test.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeveneResult {
    /// Centre used for the absolute deviations.
    pub center: Center,
    /// Number of groups.
    pub k: usize,
    /// Total number of observations.
    pub n_total: usize,
    /// Group sizes.
    pub sizes: Vec<usize>,
    /// Group centres (mean or median).
    pub centers: Vec<f64>,
    /// Sample variance of each group.
    pub group_variances: Vec<f64>,
    /// F statistic.
    pub f: f64,
    /// Between-group degrees of freedom, k − 1.
    pub df1: f64,
    /// Within-group degrees of freedom, N − k.
    pub df2: f64,
    /// Upper-tail F p-value.
    pub p_value: f64,
    /// Significance level.
    pub alpha: f64,
    /// `p_value >= alpha`.
    pub equal_variances: bool,
}

/// Levene test for equality of variances: H₀: all groups have equal variance.
///
/// # Algorithm
///
/// 1. zᵢⱼ = |xᵢⱼ − centerᵢ| with the group mean (Levene) or median
///    (Brown–Forsythe).
/// 2. One-way ANOVA on zᵢⱼ: F = MS_between / MS_within, df = (k−1, N−k).
///
/// # Errors
///
/// - [`StatsError::InsufficientData`] for fewer than 2 groups or a group with
///   fewer than 2 finite values.
/// - [`StatsError::DegenerateInput`] if every deviation is zero.
///
/// # References
///
/// - Levene (1960). "Robust tests for equality of variances". In
///   Olkin (Ed.), Contributions to Probability and Statistics.
/// - Brown & Forsythe (1974). "Robust tests for the equality of variances".
///   JASA, 69(346), 364–367.
pub fn levene_test(
    provider: &dyn DistributionProvider,
    groups: &[&[f64]],
    alpha: f64,
    center: Center,
) -> StatsResult<LeveneResult> {
    const TEST: &str = "levene test";
    TestOptions::new(alpha, Alternative::TwoSided).validate()?;
    require_n(TEST, 2, groups.len())?;

    let cleaned: Vec<Vec<f64>> = groups.iter().map(|g| finite(g)).collect();
    for g in &cleaned {
        require_n(TEST, 2, g.len())?;
    }

    let mut centers = Vec::with_capacity(cleaned.len());
    let mut group_variances = Vec::with_capacity(cleaned.len());
    let mut deviations = Vec::with_capacity(cleaned.len());
    for g in &cleaned {
        let c = match center {
            Center::Mean => descriptive::mean(g),
            Center::Median => descriptive::median(g),
        }
        .unwrap_or(f64::NAN);
        centers.push(c);
        group_variances.push(descriptive::variance(g).unwrap_or(f64::NAN));
        deviations.push(g.iter().map(|&x| (x - c).abs()).collect::<Vec<f64>>());
    }

    let anova = one_way_anova(&deviations);
    if anova.ms_within <= 1e-300 && anova.ms_between <= 1e-300 {
        return Err(StatsError::DegenerateInput {
            test: TEST,
            reason: "all absolute deviations are zero",
        });
    }
    let (f, p_value) = if anova.ms_within > 1e-300 {
        let f = anova.ms_between / anova.ms_within;
        let p = provider.sf(
            Distribution::FisherSnedecor {
                df1: anova.df_between,
                df2: anova.df_within,
            },
            f,
        )?;
        (f, p.clamp(0.0, 1.0))
    } else {
        (f64::INFINITY, 0.0)
    };

    Ok(LeveneResult {
        center,
        k: cleaned.len(),
        n_total: cleaned.iter().map(Vec::len).sum(),
        sizes: cleaned.iter().map(Vec::len).collect(),
        centers,
        group_variances,
        f,
        df1: anova.df_between,
        df2: anova.df_within,
        p_value,
        alpha,
        equal_variances: p_value >= alpha,
    })
}

struct Anova {
    df_between: f64,
    df_within: f64,
    ms_between: f64,
    ms_within: f64,
}

// Groups are non-empty and there are at least two of them with N > k.
fn one_way_anova(groups: &[Vec<f64>]) -> Anova {
    let k = groups.len();
    let total_n: usize = groups.iter().map(Vec::len).sum();
    let grand_mean = groups.iter().flatten().sum::<f64>() / total_n as f64;
    let group_means: Vec<f64> = groups
        .iter()
        .map(|g| g.iter().sum::<f64>() / g.len() as f64)
        .collect();

    let ss_between: f64 = groups
        .iter()
        .zip(group_means.iter())
        .map(|(g, &gm)| g.len() as f64 * (gm - grand_mean).powi(2))
        .sum();
    let ss_within: f64 = groups
        .iter()
        .zip(group_means.iter())
        .map(|(g, &gm)| g.iter().map(|&x| (x - gm).powi(2)).sum::<f64>())
        .sum();

    let df_between = (k - 1) as f64;
    let df_within = (total_n - k) as f64;
    Anova {
        df_between,
        df_within,
        ms_between: ss_between / df_between,
        ms_within: ss_within / df_within,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distribution::{ApproximateProvider, StatrsProvider};

    fn opts(alt: Alternative) -> TestOptions {
        TestOptions::new(0.05, alt)
    }

    // -----------------------------------------------------------------------
    // t-tests
    // -----------------------------------------------------------------------

    #[test]
    fn student_and_welch_agree_for_equal_sizes_and_variances() {
        let p = StatrsProvider::new();
        let a = [1.0, 2.0, 3.0, 4.0, 5.0];
        let b = [3.0, 4.0, 5.0, 6.0, 7.0];
        let s = student_t_test(&p, &a, &b, &TestOptions::default()).expect("student");
        let w = welch_t_test(&p, &a, &b, &TestOptions::default()).expect("welch");
        assert_eq!(s.df, 8.0);
        assert!((w.df - 8.0).abs() < 1e-12);
        assert!((s.t - w.t).abs() < 1e-12);
        // t = -2 / sqrt(2.5 · 0.4) = -2
        assert!((s.t + 2.0).abs() < 1e-12);
        assert!(!s.significant);
    }

    #[test]
    fn welch_df_unequal_variances() {
        let p = StatrsProvider::new();
        let a = [1.0, 2.0, 3.0];
        let b = [10.0, 20.0, 30.0, 40.0];
        let r = welch_t_test(&p, &a, &b, &TestOptions::default()).expect("welch");
        let v1: f64 = 1.0 / 3.0;
        let v2: f64 = (500.0 / 3.0) / 4.0;
        let df = (v1 + v2).powi(2) / (v1 * v1 / 2.0 + v2 * v2 / 3.0);
        assert!((r.df - df).abs() < 1e-10);
        assert_eq!(r.method, TTestMethod::Welch);
    }

    #[test]
    fn t_test_one_sided_direction() {
        let p = StatrsProvider::new();
        let low = [1.0, 1.5, 2.0, 1.2, 1.8];
        let high = [4.0, 4.5, 5.0, 4.2, 4.8];
        let less = student_t_test(&p, &low, &high, &opts(Alternative::Less)).expect("t");
        let greater = student_t_test(&p, &low, &high, &opts(Alternative::Greater)).expect("t");
        assert!(less.significant);
        assert!(!greater.significant);
        assert!((less.p_value + greater.p_value - 1.0).abs() < 1e-12);
    }

    #[test]
    fn t_test_errors() {
        let p = StatrsProvider::new();
        let o = TestOptions::default();
        assert!(matches!(
            student_t_test(&p, &[1.0], &[2.0, 3.0], &o),
            Err(StatsError::InsufficientData { .. })
        ));
        assert!(matches!(
            welch_t_test(&p, &[1.0, 1.0], &[2.0, 2.0], &o),
            Err(StatsError::DegenerateInput { .. })
        ));
        assert!(matches!(
            welch_t_test(&ApproximateProvider::new(), &[1.0, 2.0], &[2.0, 4.0], &o),
            Err(StatsError::DistributionUnavailable { .. })
        ));
    }

    // -----------------------------------------------------------------------
    // Mann-Whitney
    // -----------------------------------------------------------------------

    #[test]
    fn mann_whitney_separated_samples() {
        let p = StatrsProvider::new();
        let a = [1.0, 2.0, 3.0, 4.0, 5.0];
        let b = [6.0, 7.0, 8.0, 9.0, 10.0];
        let r = mann_whitney_u(&p, &a, &b, &TestOptions::default()).expect("mw");
        assert_eq!(r.u1, 0.0);
        assert_eq!(r.u2, 25.0);
        assert_eq!(r.u, 0.0);
        // σ² = 25·11/12, z = (0 − 12.5 + 0.5)/σ
        let z = -12.0 / (25.0 * 11.0 / 12.0_f64).sqrt();
        assert!((r.z - z).abs() < 1e-12);
        assert!(r.significant, "p = {}", r.p_value);
    }

    #[test]
    fn mann_whitney_tie_correction() {
        let p = StatrsProvider::new();
        let a = [1.0, 2.0, 2.0, 3.0];
        let b = [2.0, 3.0, 4.0, 5.0];
        let r = mann_whitney_u(&p, &a, &b, &TestOptions::default()).expect("mw");
        // pooled ranks: 1, 3,3,3 (2s), 5.5,5.5 (3s), 7, 8
        // R1 = 1 + 3 + 3 + 5.5 = 12.5, U1 = 12.5 − 10 = 2.5
        assert!((r.u1 - 2.5).abs() < 1e-12);
        let tie: f64 = (27.0 - 3.0) + (8.0 - 2.0);
        let sigma_sq: f64 = 16.0 * 9.0 / 12.0 - 16.0 * tie / (12.0 * 8.0 * 7.0);
        let z = (2.5 - 8.0 + 0.5) / sigma_sq.sqrt();
        assert!((r.z - z).abs() < 1e-12);
    }

    #[test]
    fn mann_whitney_ranks_follow_input_positions() {
        let p = StatrsProvider::new();
        let o = TestOptions::default();
        let a = [1.0, 2.0, 2.0, 3.0];
        let b = [2.0, 3.0, 4.0, 5.0];
        let sorted = mann_whitney_u(&p, &a, &b, &o).expect("mw");
        let shuffled = mann_whitney_u(&p, &[3.0, 2.0, 1.0, 2.0], &[5.0, 2.0, 4.0, 3.0], &o)
            .expect("mw");
        assert!((shuffled.u1 - 2.5).abs() < 1e-12);
        assert_eq!(sorted.u1, shuffled.u1);
        assert_eq!(sorted.z, shuffled.z);
        assert_eq!(sorted.p_value, shuffled.p_value);
    }

    #[test]
    fn mann_whitney_one_sided() {
        let p = StatrsProvider::new();
        let a = [6.0, 7.0, 8.0, 9.0, 10.0];
        let b = [1.0, 2.0, 3.0, 4.0, 5.0];
        let g = mann_whitney_u(&p, &a, &b, &opts(Alternative::Greater)).expect("mw");
        let l = mann_whitney_u(&p, &a, &b, &opts(Alternative::Less)).expect("mw");
        assert!(g.significant);
        assert!(!l.significant);
        assert!(g.p_value < l.p_value);
    }

    #[test]
    fn mann_whitney_all_tied() {
        let p = StatrsProvider::new();
        assert!(matches!(
            mann_whitney_u(&p, &[1.0, 1.0], &[1.0, 1.0], &TestOptions::default()),
            Err(StatsError::DegenerateInput { .. })
        ));
    }

    // -----------------------------------------------------------------------
    // Mood's median
    // -----------------------------------------------------------------------

    #[test]
    fn mood_table_and_statistic() {
        let p = StatrsProvider::new();
        let a = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let b = [7.0, 8.0, 9.0, 10.0, 11.0, 12.0];
        let r = mood_median_test(&p, &a, &b, 0.05, false).expect("mood");
        assert_eq!(r.median, 6.5);
        assert_eq!(r.table, [[6, 0], [0, 6]]);
        // every cell deviates by 3 from E = 3 → χ² = 4·9/3
        assert!((r.chi2 - 12.0).abs() < 1e-12);
        assert!(r.significant);

        let y = mood_median_test(&p, &a, &b, 0.05, true).expect("mood");
        assert!((y.chi2 - 4.0 * 2.5 * 2.5 / 3.0).abs() < 1e-12);
        assert!(y.p_value > r.p_value);
    }

    #[test]
    fn mood_yates_clamps_small_deviation() {
        let p = StatrsProvider::new();
        let a = [1.0, 4.0, 2.0, 5.0];
        let b = [3.0, 6.0, 2.5, 4.5];
        let r = mood_median_test(&p, &a, &b, 0.05, true).expect("mood");
        // both groups split 2/2 → χ² = 0, p = 1
        assert_eq!(r.chi2, 0.0);
        assert!((r.p_value - 1.0).abs() < 1e-12);
    }

    #[test]
    fn mood_degenerate_and_unavailable() {
        let p = StatrsProvider::new();
        assert!(matches!(
            mood_median_test(&p, &[2.0, 2.0], &[2.0, 2.0], 0.05, true),
            Err(StatsError::DegenerateInput { .. })
        ));
        assert!(matches!(
            mood_median_test(&ApproximateProvider::new(), &[1.0, 2.0], &[3.0, 4.0], 0.05, true),
            Err(StatsError::DistributionUnavailable {
                distribution: "chi-squared",
                ..
            })
        ));
    }

    // -----------------------------------------------------------------------
    // Levene
    // -----------------------------------------------------------------------

    #[test]
    fn levene_detects_spread_difference() {
        let p = StatrsProvider::new();
        let g1 = [4.9, 5.0, 5.0, 5.1, 5.0];
        let g2 = [0.0, 3.0, 5.0, 7.0, 10.0];
        let r = levene_test(&p, &[&g1, &g2], 0.05, Center::Median).expect("levene");
        assert!(r.p_value < 0.05, "p = {}", r.p_value);
        assert!(!r.equal_variances);
        assert_eq!(r.sizes, vec![5, 5]);
        assert_eq!(r.centers, vec![5.0, 5.0]);
        assert_eq!(r.df1, 1.0);
        assert_eq!(r.df2, 8.0);
    }

    #[test]
    fn levene_mean_center_hand_computed() {
        let p = StatrsProvider::new();
        let g1 = [1.0, 2.0, 3.0];
        let g2 = [2.0, 4.0, 6.0];
        let r = levene_test(&p, &[&g1, &g2], 0.05, Center::Mean).expect("levene");
        // z1 = [1,0,1], z2 = [2,0,2]; means 2/3, 4/3, grand 1
        // SSB = 3·(1/9) + 3·(1/9) = 2/3; SSW = 2/3 + 8/3 = 10/3
        let f = (2.0 / 3.0) / ((10.0 / 3.0) / 4.0);
        assert!((r.f - f).abs() < 1e-12, "F = {}", r.f);
        assert_eq!(r.centers, vec![2.0, 4.0]);
        assert!((r.group_variances[1] - 4.0).abs() < 1e-12);
        assert!(r.equal_variances);
    }

    #[test]
    fn levene_errors() {
        let p = StatrsProvider::new();
        let g = [1.0, 2.0, 3.0];
        assert!(matches!(
            levene_test(&p, &[&g], 0.05, Center::Median),
            Err(StatsError::InsufficientData { got: 1, .. })
        ));
        assert!(matches!(
            levene_test(&p, &[&[1.0, 1.0], &[2.0, 2.0]], 0.05, Center::Median),
            Err(StatsError::DegenerateInput { .. })
        ));
        assert!(matches!(
            levene_test(&p, &[&g, &[1.0]], 0.05, Center::Median),
            Err(StatsError::InsufficientData { .. })
        ));
    }
}
