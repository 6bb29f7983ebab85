//! Per-season Mann-Kendall statistic and Sen pairwise slopes.

use serde::Serialize;

use super::season::{Season, SeasonPoint};
use crate::rank::{midrank, TIE_TOLERANCE};

/// Mann-Kendall contribution of one season.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeasonStats {
    /// Season.
    pub season: Season,
    /// Number of season-years.
    pub n: usize,
    /// S = Σᵢ<ⱼ sign(xⱼ − xᵢ).
    pub s: i64,
    /// Tie-corrected Var(S).
    pub variance: f64,
}

/// S and tie-corrected Var(S) for a chronological series.
///
/// Var(S) = [n(n−1)(2n+5) − Σ t(t−1)(2t+5)] / 18.
pub(crate) fn mann_kendall(season: Season, points: &[SeasonPoint]) -> SeasonStats {
    let values: Vec<f64> = points.iter().map(|p| p.value).collect();
    let n = values.len();

    let mut s: i64 = 0;
    for i in 0..n {
        for j in (i + 1)..n {
            let diff = values[j] - values[i];
            if diff >= TIE_TOLERANCE {
                s += 1;
            } else if diff <= -TIE_TOLERANCE {
                s -= 1;
            }
        }
    }

    let mut sorted = values;
    sorted.sort_by(f64::total_cmp);
    let tie_correction: f64 = midrank(&sorted)
        .ties
        .iter()
        .map(|&t| {
            let t = t as f64;
            t * (t - 1.0) * (2.0 * t + 5.0)
        })
        .sum();

    let nf = n as f64;
    let variance = (nf * (nf - 1.0) * (2.0 * nf + 5.0) - tie_correction) / 18.0;

    SeasonStats {
        season,
        n,
        s,
        variance: variance.max(0.0),
    }
}

/// All slopes (yⱼ − yᵢ)/(yearⱼ − yearᵢ) for i < j within one season.
pub(crate) fn pairwise_slopes(points: &[SeasonPoint]) -> Vec<f64> {
    let n = points.len();
    let mut slopes = Vec::with_capacity(n * n.saturating_sub(1) / 2);
    for i in 0..n {
        for j in (i + 1)..n {
            let dx = (points[j].season_year - points[i].season_year) as f64;
            if dx != 0.0 {
                slopes.push((points[j].value - points[i].value) / dx);
            }
        }
    }
    slopes
}
