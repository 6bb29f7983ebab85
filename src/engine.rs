//! Facade that owns one distribution provider and exposes every test.
//!
//! ```
//! use lakestat::config::TestOptions;
//! use lakestat::Engine;
//!
//! let engine = Engine::default();
//! let r = engine
//!     .one_sample_t(&[5.1, 4.9, 5.3, 5.0, 5.2], 5.0, &TestOptions::default())
//!     .unwrap();
//! assert!(!r.significant);
//! ```

use std::sync::Arc;

use tracing::debug;

use crate::config::{Center, TestOptions};
use crate::distribution::{shared_provider, ApproximateProvider, DistributionProvider};
use crate::equivalence::{self, TostTResult, TostWilcoxonResult};
use crate::error::StatsResult;
use crate::one_sample::{
    self, OneSampleTResult, ShapiroWilkResult, SignTestResult, WilcoxonResult,
};
use crate::trend::{self, Observation, SeasonSeries, TrendResult};
use crate::two_sample::{
    self, LeveneResult, MannWhitneyResult, MoodMedianResult, TwoSampleTResult,
};

/// Statistical test engine.
///
/// Cloning is cheap; clones share the provider.
#[derive(Debug, Clone)]
pub struct Engine {
    provider: Arc<dyn DistributionProvider>,
}

impl Default for Engine {
    /// Engine backed by the process-wide exact provider.
    fn default() -> Self {
        Self::new(shared_provider())
    }
}

impl Engine {
    /// Creates an engine around an injected provider.
    pub fn new(provider: Arc<dyn DistributionProvider>) -> Self {
        debug!(provider = provider.name(), "engine created");
        Self { provider }
    }

    /// Engine limited to the closed-form normal approximation. Tests that
    /// need t, χ², binomial or F fail with
    /// [`StatsError::DistributionUnavailable`](crate::StatsError::DistributionUnavailable).
    pub fn approximate() -> Self {
        Self::new(Arc::new(ApproximateProvider::new()))
    }

    /// The provider in use.
    pub fn provider(&self) -> &dyn DistributionProvider {
        self.provider.as_ref()
    }

    // -----------------------------------------------------------------------
    // One sample
    // -----------------------------------------------------------------------

    /// See [`one_sample::one_sample_t_test`].
    pub fn one_sample_t(
        &self,
        data: &[f64],
        mu0: f64,
        opts: &TestOptions,
    ) -> StatsResult<OneSampleTResult> {
        one_sample::one_sample_t_test(self.provider(), data, mu0, opts)
    }

    /// See [`one_sample::wilcoxon_signed_rank`].
    pub fn wilcoxon(
        &self,
        data: &[f64],
        mu0: f64,
        opts: &TestOptions,
    ) -> StatsResult<WilcoxonResult> {
        one_sample::wilcoxon_signed_rank(self.provider(), data, mu0, opts)
    }

    /// See [`one_sample::sign_test`].
    pub fn sign(&self, data: &[f64], mu0: f64, opts: &TestOptions) -> StatsResult<SignTestResult> {
        one_sample::sign_test(self.provider(), data, mu0, opts)
    }

    /// See [`one_sample::shapiro_wilk`].
    pub fn shapiro_wilk(&self, data: &[f64], alpha: f64) -> ShapiroWilkResult {
        one_sample::shapiro_wilk(self.provider(), data, alpha)
    }

    // -----------------------------------------------------------------------
    // Two samples
    // -----------------------------------------------------------------------

    /// See [`two_sample::student_t_test`].
    pub fn student_t(
        &self,
        a: &[f64],
        b: &[f64],
        opts: &TestOptions,
    ) -> StatsResult<TwoSampleTResult> {
        two_sample::student_t_test(self.provider(), a, b, opts)
    }

    /// See [`two_sample::welch_t_test`].
    pub fn welch_t(&self, a: &[f64], b: &[f64], opts: &TestOptions) -> StatsResult<TwoSampleTResult> {
        two_sample::welch_t_test(self.provider(), a, b, opts)
    }

    /// See [`two_sample::mann_whitney_u`].
    pub fn mann_whitney(
        &self,
        a: &[f64],
        b: &[f64],
        opts: &TestOptions,
    ) -> StatsResult<MannWhitneyResult> {
        two_sample::mann_whitney_u(self.provider(), a, b, opts)
    }

    /// See [`two_sample::mood_median_test`].
    pub fn mood_median(
        &self,
        a: &[f64],
        b: &[f64],
        alpha: f64,
        yates: bool,
    ) -> StatsResult<MoodMedianResult> {
        two_sample::mood_median_test(self.provider(), a, b, alpha, yates)
    }

    /// See [`two_sample::levene_test`].
    pub fn levene(&self, groups: &[&[f64]], alpha: f64, center: Center) -> StatsResult<LeveneResult> {
        two_sample::levene_test(self.provider(), groups, alpha, center)
    }

    // -----------------------------------------------------------------------
    // Equivalence
    // -----------------------------------------------------------------------

    /// See [`equivalence::tost_t`].
    pub fn tost_t(
        &self,
        data: &[f64],
        lower: f64,
        upper: f64,
        alpha: f64,
    ) -> StatsResult<TostTResult> {
        equivalence::tost_t(self.provider(), data, lower, upper, alpha)
    }

    /// See [`equivalence::tost_wilcoxon`].
    pub fn tost_wilcoxon(
        &self,
        data: &[f64],
        lower: f64,
        upper: f64,
        alpha: f64,
    ) -> StatsResult<TostWilcoxonResult> {
        equivalence::tost_wilcoxon(self.provider(), data, lower, upper, alpha)
    }

    // -----------------------------------------------------------------------
    // Trend
    // -----------------------------------------------------------------------

    /// See [`trend::seasonal_trend`].
    pub fn seasonal_trend(
        &self,
        observations: &[Observation],
        alpha: f64,
    ) -> StatsResult<TrendResult> {
        trend::seasonal_trend(self.provider(), observations, alpha)
    }

    /// See [`trend::seasonal_trend_from_series`].
    pub fn seasonal_trend_from_series(
        &self,
        series: &SeasonSeries,
        alpha: f64,
    ) -> StatsResult<TrendResult> {
        trend::seasonal_trend_from_series(self.provider(), series, alpha)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Alternative;
    use crate::distribution::StatrsProvider;
    use crate::error::StatsError;
    use crate::trend::SeasonPoint;

    const A: [f64; 8] = [2.1, 2.5, 2.3, 2.8, 2.2, 2.6, 2.4, 2.9];
    const B: [f64; 8] = [3.0, 3.4, 2.9, 3.6, 3.1, 3.3, 3.5, 3.2];

    #[test]
    fn default_uses_exact_provider() {
        assert_eq!(Engine::default().provider().name(), "statrs");
        let e = Engine::new(Arc::new(StatrsProvider::new()));
        assert_eq!(e.provider().name(), "statrs");
    }

    #[test]
    fn approximate_refuses_t_tests() {
        let e = Engine::approximate();
        let opts = TestOptions::default();
        let err = e.one_sample_t(&A, 2.0, &opts).unwrap_err();
        assert!(matches!(
            err,
            StatsError::DistributionUnavailable {
                distribution: "student-t",
                ..
            }
        ));
        assert!(matches!(
            e.welch_t(&A, &B, &opts),
            Err(StatsError::DistributionUnavailable { .. })
        ));
        assert!(matches!(
            e.sign(&A, 2.0, &opts),
            Err(StatsError::DistributionUnavailable { distribution: "binomial", .. })
        ));
        assert!(matches!(
            e.mood_median(&A, &B, 0.05, true),
            Err(StatsError::DistributionUnavailable { distribution: "chi-squared", .. })
        ));
        assert!(matches!(
            e.levene(&[&A[..], &B[..]], 0.05, Center::Median),
            Err(StatsError::DistributionUnavailable { distribution: "F", .. })
        ));
    }

    #[test]
    fn approximate_runs_normal_only_tests() {
        let e = Engine::approximate();
        let exact = Engine::default();
        let opts = TestOptions::default();

        let mw_a = e.mann_whitney(&A, &B, &opts).expect("normal only");
        let mw_x = exact.mann_whitney(&A, &B, &opts).expect("exact");
        assert_eq!(mw_a.u, mw_x.u);
        assert!((mw_a.p_value - mw_x.p_value).abs() < 1e-6);

        let sw = e.shapiro_wilk(&A, 0.05);
        assert!(sw.w > 0.8 && sw.w <= 1.0);

        let series = SeasonSeries {
            wet: (0..5)
                .map(|i| SeasonPoint { season_year: 2000 + i, value: i as f64, count: 1 })
                .collect(),
            dry: Vec::new(),
        };
        assert!(e.seasonal_trend_from_series(&series, 0.05).is_ok());
    }

    #[test]
    fn delegates_match_free_functions() {
        let e = Engine::default();
        let p = StatrsProvider::new();
        let opts = TestOptions::default().with_alternative(Alternative::Less);

        let via_engine = e.student_t(&A, &B, &opts).expect("t");
        let direct = two_sample::student_t_test(&p, &A, &B, &opts).expect("t");
        assert_eq!(via_engine, direct);
        assert!(via_engine.significant);

        let w = e.wilcoxon(&A, 2.0, &opts).expect("wilcoxon");
        assert_eq!(w, one_sample::wilcoxon_signed_rank(&p, &A, 2.0, &opts).expect("w"));

        let tost = e.tost_t(&B, 2.8, 3.8, 0.05).expect("tost");
        assert_eq!(tost, equivalence::tost_t(&p, &B, 2.8, 3.8, 0.05).expect("tost"));
        let tw = e.tost_wilcoxon(&B, 2.8, 3.8, 0.05).expect("tost");
        assert_eq!(tw.n, B.len());
    }

    #[test]
    fn engine_is_shareable_across_threads() {
        let e = Engine::default();
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let e = e.clone();
                std::thread::spawn(move || {
                    e.one_sample_t(&A, 2.0 + 0.1 * i as f64, &TestOptions::default())
                        .map(|r| r.p_value)
                })
            })
            .collect();
        for h in handles {
            let p = h.join().expect("thread").expect("t-test");
            assert!((0.0..=1.0).contains(&p));
        }
    }
}
