//! Descriptive statistics over plain `f64` slices.
//!
//! All functions return `None` when the statistic is undefined for the
//! given length (empty input, or fewer than two values for the variance).
//! They do not filter non-finite values; use [`finite`] first.
//!
//! # Examples
//!
//! ```
//! use lakestat::descriptive::{finite, mean, median, std_dev};
//!
//! let raw = [2.0, f64::NAN, 4.0, 4.0, 5.0, f64::INFINITY];
//! let data = finite(&raw);
//! assert_eq!(data.len(), 4);
//! assert!((mean(&data).unwrap() - 3.75).abs() < 1e-12);
//! assert!((median(&data).unwrap() - 4.0).abs() < 1e-12);
//! assert!(std_dev(&data).unwrap() > 0.0);
//! ```

use serde::Serialize;

/// Copies the finite values of `data`, preserving order.
pub fn finite(data: &[f64]) -> Vec<f64> {
    data.iter().copied().filter(|v| v.is_finite()).collect()
}

/// Arithmetic mean.
pub fn mean(data: &[f64]) -> Option<f64> {
    if data.is_empty() {
        return None;
    }
    Some(data.iter().sum::<f64>() / data.len() as f64)
}

/// Sample variance with Bessel's correction (n − 1).
///
/// Two-pass: deviations are taken from the mean, which keeps the result
/// stable for large offsets such as conductivity readings near 1e4.
pub fn variance(data: &[f64]) -> Option<f64> {
    let n = data.len();
    if n < 2 {
        return None;
    }
    let m = mean(data)?;
    let ss: f64 = data.iter().map(|&x| (x - m).powi(2)).sum();
    Some(ss / (n - 1) as f64)
}

/// Sample standard deviation, `sqrt(variance)`.
pub fn std_dev(data: &[f64]) -> Option<f64> {
    variance(data).map(f64::sqrt)
}

/// Median; the average of the two middle order statistics when n is even.
pub fn median(data: &[f64]) -> Option<f64> {
    if data.is_empty() {
        return None;
    }
    let mut sorted = data.to_vec();
    sorted.sort_by(f64::total_cmp);
    Some(median_sorted(&sorted))
}

// Caller guarantees `sorted` is non-empty and ascending.
pub(crate) fn median_sorted(sorted: &[f64]) -> f64 {
    let n = sorted.len();
    if n % 2 == 0 {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    } else {
        sorted[n / 2]
    }
}

/// Basic summary of a sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Summary {
    /// Number of observations.
    pub n: usize,
    /// Mean.
    pub mean: f64,
    /// Standard deviation (n − 1); NaN when n < 2.
    pub sd: f64,
    /// Median.
    pub median: f64,
    /// Smallest value.
    pub min: f64,
    /// Largest value.
    pub max: f64,
}

/// Computes a [`Summary`]. Returns `None` for an empty slice.
pub fn summary(data: &[f64]) -> Option<Summary> {
    if data.is_empty() {
        return None;
    }
    let mut sorted = data.to_vec();
    sorted.sort_by(f64::total_cmp);
    Some(Summary {
        n: data.len(),
        mean: mean(data)?,
        sd: std_dev(data).unwrap_or(f64::NAN),
        median: median_sorted(&sorted),
        min: sorted[0],
        max: sorted[sorted.len() - 1],
    })
}
