//! Seasonal Mann-Kendall trend test with Sen's slope.
//!
//! Irregular dated observations are reduced to one value per wet/dry
//! season-year (see [`SeasonSeries`]), then:
//!
//! - S and Var(S) are computed per season and summed across seasons with at
//!   least two points;
//! - Z = (S − 1)/√Var if S > 0, (S + 1)/√Var if S < 0, else 0;
//!   two-sided p = 2Φ(−|Z|);
//! - Sen's slope is the median of all within-season pairwise slopes (per
//!   season-year), pooled over both seasons; the intercept is the median of
//!   yᵢ − slope·yearᵢ over every season point.
//!
//! # References
//!
//! - Hirsch, Slack & Smith (1982). "Techniques of trend analysis for monthly
//!   water quality data". Water Resources Research, 18(1), 107–121.
//! - Sen (1968). "Estimates of the regression coefficient based on Kendall's
//!   tau". JASA, 63(324), 1379–1389.
//!
//! # Examples
//!
//! ```
//! use chrono::NaiveDate;
//! use lakestat::distribution::StatrsProvider;
//! use lakestat::trend::{seasonal_trend, Observation, TrendDirection};
//!
//! let mut obs = Vec::new();
//! for (i, year) in (2015..2021).enumerate() {
//!     let d = |m| NaiveDate::from_ymd_opt(year, m, 15).unwrap();
//!     obs.push(Observation::new(d(3), 10.0 + i as f64));
//!     obs.push(Observation::new(d(8), 20.0 + i as f64));
//! }
//! let r = seasonal_trend(&StatrsProvider::new(), &obs, 0.05).unwrap();
//! assert_eq!(r.direction, TrendDirection::Increasing);
//! assert!((r.sen_slope - 1.0).abs() < 1e-12);
//! ```

mod kendall;
mod season;

pub use kendall::SeasonStats;
pub use season::{
    monthly_medians, season_series, MonthlyPoint, Observation, Season, SeasonPoint, SeasonSeries,
};

use serde::Serialize;
use tracing::warn;

use crate::config::{Alternative, TestOptions};
use crate::descriptive::median_sorted;
use crate::distribution::DistributionProvider;
use crate::error::{StatsError, StatsResult};

/// Direction of a significant monotonic trend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TrendDirection {
    /// Significant upward trend.
    Increasing,
    /// Significant downward trend.
    Decreasing,
    /// No significant trend.
    NoTrend,
}

/// Advisory attached to a trend result. Not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum TrendNote {
    /// At least one season has fewer than three season-years.
    WeakSeasonalCoverage {
        /// Wet-season points.
        n_wet: usize,
        /// Dry-season points.
        n_dry: usize,
    },
    /// Fewer than five season points overall.
    ShortRecord {
        /// Total season points.
        n_points: usize,
    },
}

/// Result of the seasonal Mann-Kendall test.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendResult {
    /// Wet-season points.
    pub n_wet: usize,
    /// Dry-season points.
    pub n_dry: usize,
    /// Total season points.
    pub n_points: usize,
    /// Contribution of each season with at least two points.
    pub seasons: Vec<SeasonStats>,
    /// Combined S.
    pub s: i64,
    /// Combined Var(S).
    pub variance: f64,
    /// Continuity-corrected Z.
    pub z: f64,
    /// Two-sided p-value.
    pub p_value: f64,
    /// Significance level.
    pub alpha: f64,
    /// `p_value < alpha`.
    pub significant: bool,
    /// Trend direction; `NoTrend` unless significant.
    pub direction: TrendDirection,
    /// Sen's slope, in units per season-year.
    pub sen_slope: f64,
    /// Intercept at season-year 0.
    pub intercept: f64,
    /// Coverage advisories.
    pub notes: Vec<TrendNote>,
}

/// Seasonal Mann-Kendall test on raw dated observations.
///
/// # Errors
///
/// - [`StatsError::InvalidParameter`] for alpha outside (0, 1).
/// - [`StatsError::InsufficientData`] if no season has two or more
///   season-years.
pub fn seasonal_trend(
    provider: &dyn DistributionProvider,
    observations: &[Observation],
    alpha: f64,
) -> StatsResult<TrendResult> {
    seasonal_trend_from_series(
        provider,
        &SeasonSeries::from_observations(observations),
        alpha,
    )
}

/// Seasonal Mann-Kendall test on an already bucketed series.
pub fn seasonal_trend_from_series(
    provider: &dyn DistributionProvider,
    series: &SeasonSeries,
    alpha: f64,
) -> StatsResult<TrendResult> {
    const TEST: &str = "seasonal mann-kendall";
    TestOptions::new(alpha, Alternative::TwoSided).validate()?;

    let seasons: Vec<SeasonStats> = [Season::Wet, Season::Dry]
        .into_iter()
        .filter(|&s| series.season(s).len() >= 2)
        .map(|s| kendall::mann_kendall(s, series.season(s)))
        .collect();
    if seasons.is_empty() {
        return Err(StatsError::InsufficientData {
            test: TEST,
            needed: 2,
            got: series.wet.len().max(series.dry.len()),
        });
    }

    let s: i64 = seasons.iter().map(|st| st.s).sum();
    let variance: f64 = seasons.iter().map(|st| st.variance).sum();
    let z = if variance <= 0.0 || s == 0 {
        0.0
    } else if s > 0 {
        (s as f64 - 1.0) / variance.sqrt()
    } else {
        (s as f64 + 1.0) / variance.sqrt()
    };
    let p_value = (2.0 * provider.standard_normal_cdf(-z.abs())).clamp(0.0, 1.0);
    let significant = p_value < alpha;
    let direction = match (significant, s.signum()) {
        (true, 1) => TrendDirection::Increasing,
        (true, -1) => TrendDirection::Decreasing,
        _ => TrendDirection::NoTrend,
    };

    let (sen_slope, intercept) = sen_estimator(series);

    let n_wet = series.wet.len();
    let n_dry = series.dry.len();
    let n_points = n_wet + n_dry;
    let mut notes = Vec::new();
    if n_wet < 3 || n_dry < 3 {
        notes.push(TrendNote::WeakSeasonalCoverage { n_wet, n_dry });
    }
    if n_points < 5 {
        notes.push(TrendNote::ShortRecord { n_points });
    }
    if !notes.is_empty() {
        warn!(n_wet, n_dry, n_points, "seasonal trend on thin record");
    }

    Ok(TrendResult {
        n_wet,
        n_dry,
        n_points,
        seasons,
        s,
        variance,
        z,
        p_value,
        alpha,
        significant,
        direction,
        sen_slope,
        intercept,
        notes,
    })
}

fn sen_estimator(series: &SeasonSeries) -> (f64, f64) {
    let mut slopes = kendall::pairwise_slopes(&series.wet);
    slopes.extend(kendall::pairwise_slopes(&series.dry));
    if slopes.is_empty() {
        return (f64::NAN, f64::NAN);
    }
    slopes.sort_by(f64::total_cmp);
    let slope = median_sorted(&slopes);

    let mut residuals: Vec<f64> = series
        .wet
        .iter()
        .chain(series.dry.iter())
        .map(|p| p.value - slope * p.season_year as f64)
        .collect();
    residuals.sort_by(f64::total_cmp);
    (slope, median_sorted(&residuals))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distribution::{ApproximateProvider, StatrsProvider};
    use chrono::NaiveDate;

    fn point(season_year: i32, value: f64) -> SeasonPoint {
        SeasonPoint {
            season_year,
            value,
            count: 1,
        }
    }

    fn date(y: i32, m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, 15).expect("valid date")
    }

    #[test]
    fn increasing_in_both_seasons() {
        let series = SeasonSeries {
            wet: (0..4).map(|i| point(2010 + i, 10.0 + i as f64)).collect(),
            dry: (0..4).map(|i| point(2010 + i, 5.0 + 2.0 * i as f64)).collect(),
        };
        let r = seasonal_trend_from_series(&StatrsProvider::new(), &series, 0.05).expect("trend");
        assert_eq!(r.s, 12);
        let var: f64 = 2.0 * 4.0 * 3.0 * 13.0 / 18.0;
        assert!((r.variance - var).abs() < 1e-12);
        assert!((r.z - 11.0 / var.sqrt()).abs() < 1e-12);
        assert!(r.p_value < 0.05, "p = {}", r.p_value);
        assert_eq!(r.direction, TrendDirection::Increasing);
        // wet slopes all 1 (6), dry slopes all 2 (6): median = 1.5
        assert!((r.sen_slope - 1.5).abs() < 1e-12);
        assert!(r.notes.is_empty());
    }

    #[test]
    fn decreasing_series() {
        let series = SeasonSeries {
            wet: (0..5).map(|i| point(2000 + i, 50.0 - 3.0 * i as f64)).collect(),
            dry: (0..5).map(|i| point(2000 + i, 40.0 - 2.0 * i as f64)).collect(),
        };
        let r = seasonal_trend_from_series(&StatrsProvider::new(), &series, 0.05).expect("trend");
        assert!(r.s < 0);
        assert_eq!(r.direction, TrendDirection::Decreasing);
        assert!(r.sen_slope < 0.0);
    }

    #[test]
    fn constant_series_has_no_trend() {
        let series = SeasonSeries {
            wet: (0..4).map(|i| point(2000 + i, 3.0)).collect(),
            dry: (0..4).map(|i| point(2000 + i, 3.0)).collect(),
        };
        let r = seasonal_trend_from_series(&StatrsProvider::new(), &series, 0.05).expect("trend");
        assert_eq!(r.s, 0);
        assert_eq!(r.z, 0.0);
        assert!((r.p_value - 1.0).abs() < 1e-12);
        assert_eq!(r.direction, TrendDirection::NoTrend);
        assert_eq!(r.sen_slope, 0.0);
        assert_eq!(r.intercept, 3.0);
    }

    #[test]
    fn one_season_only_contributes() {
        let series = SeasonSeries {
            wet: (0..4).map(|i| point(2000 + i, i as f64)).collect(),
            dry: vec![point(2001, 9.0)],
        };
        let r = seasonal_trend_from_series(&StatrsProvider::new(), &series, 0.05).expect("trend");
        assert_eq!(r.seasons.len(), 1);
        assert_eq!(r.seasons[0].season, Season::Wet);
        assert_eq!(r.s, 6);
        assert!(r.notes.contains(&TrendNote::WeakSeasonalCoverage { n_wet: 4, n_dry: 1 }));
        assert!(!r.notes.iter().any(|n| matches!(n, TrendNote::ShortRecord { .. })));
    }

    #[test]
    fn short_record_note() {
        let series = SeasonSeries {
            wet: vec![point(2000, 1.0), point(2001, 2.0)],
            dry: vec![point(2001, 1.0), point(2002, 3.0)],
        };
        let r = seasonal_trend_from_series(&StatrsProvider::new(), &series, 0.05).expect("trend");
        assert!(r.notes.contains(&TrendNote::ShortRecord { n_points: 4 }));
        assert_eq!(r.direction, TrendDirection::NoTrend);
    }

    #[test]
    fn insufficient_when_no_season_has_two_points() {
        let series = SeasonSeries {
            wet: vec![point(2000, 1.0)],
            dry: vec![point(2000, 2.0)],
        };
        assert!(matches!(
            seasonal_trend_from_series(&StatrsProvider::new(), &series, 0.05),
            Err(StatsError::InsufficientData { got: 1, .. })
        ));
    }

    #[test]
    fn raw_observations_pipeline() {
        let mut obs = Vec::new();
        for (i, year) in (2012..2018).enumerate() {
            let base = i as f64 * 0.5;
            // two samples in the same month collapse to their median
            obs.push(Observation::new(date(year, 2), 1.0 + base));
            obs.push(Observation::new(date(year, 2), 3.0 + base));
            obs.push(Observation::new(date(year, 9), 4.0 + base));
            obs.push(Observation::new(date(year, 10), 6.0 + base));
        }
        let r = seasonal_trend(&StatrsProvider::new(), &obs, 0.05).expect("trend");
        assert_eq!(r.n_wet, 6);
        assert_eq!(r.n_dry, 6);
        assert_eq!(r.direction, TrendDirection::Increasing);
        assert!((r.sen_slope - 0.5).abs() < 1e-12);
        // residuals are 2 − 1006 (dry) and 5 − 1006 (wet), six of each
        let expected = 3.5 - 0.5 * 2012.0;
        assert!((r.intercept - expected).abs() < 1e-9, "b = {}", r.intercept);
    }

    #[test]
    fn normal_fallback_is_enough() {
        let series = SeasonSeries {
            wet: (0..6).map(|i| point(2000 + i, i as f64)).collect(),
            dry: (0..6).map(|i| point(2000 + i, 2.0 * i as f64)).collect(),
        };
        let exact = seasonal_trend_from_series(&StatrsProvider::new(), &series, 0.05).expect("trend");
        let approx =
            seasonal_trend_from_series(&ApproximateProvider::new(), &series, 0.05).expect("trend");
        assert!((exact.p_value - approx.p_value).abs() < 1e-6);
        assert_eq!(exact.direction, approx.direction);
    }
}
