//! Wet/dry seasonal bucketing of dated observations.
//!
//! ```text
//! raw (date, value) ──► monthly median ──► season-year bucket ──► bucket median
//! ```
//!
//! Wet season: June–November of year Y, labelled Y.
//! Dry season: December of Y−1 through May of Y, labelled Y.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::descriptive::median_sorted;

/// One dated measurement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Observation {
    /// Sampling date.
    pub date: NaiveDate,
    /// Measured value.
    pub value: f64,
}

impl Observation {
    /// Creates an observation.
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self { date, value }
    }
}

/// Season of the tropical wet/dry cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Season {
    /// June–November.
    Wet,
    /// December–May.
    Dry,
}

impl Season {
    /// Season and season-year of a calendar month (1–12).
    ///
    /// December belongs to the following year's dry season.
    ///
    /// ```
    /// use lakestat::trend::Season;
    ///
    /// assert_eq!(Season::classify(2020, 12), (Season::Dry, 2021));
    /// assert_eq!(Season::classify(2021, 3), (Season::Dry, 2021));
    /// assert_eq!(Season::classify(2021, 7), (Season::Wet, 2021));
    /// ```
    pub fn classify(year: i32, month: u32) -> (Season, i32) {
        match month {
            6..=11 => (Season::Wet, year),
            12 => (Season::Dry, year + 1),
            _ => (Season::Dry, year),
        }
    }
}

/// Median of all finite observations within one calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MonthlyPoint {
    /// Calendar year.
    pub year: i32,
    /// Calendar month, 1–12.
    pub month: u32,
    /// Median of the month's observations.
    pub value: f64,
    /// Number of observations in the month.
    pub count: usize,
}

/// One aggregated value per (season, season-year).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeasonPoint {
    /// Season-year label.
    pub season_year: i32,
    /// Median of the contributing monthly medians.
    pub value: f64,
    /// Number of contributing months.
    pub count: usize,
}

/// Wet and dry series, each ascending by season-year.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SeasonSeries {
    /// Wet-season points.
    pub wet: Vec<SeasonPoint>,
    /// Dry-season points.
    pub dry: Vec<SeasonPoint>,
}

impl SeasonSeries {
    /// Runs the full bucketing pipeline on raw observations.
    pub fn from_observations(observations: &[Observation]) -> Self {
        season_series(&monthly_medians(observations))
    }

    /// Points of one season.
    pub fn season(&self, season: Season) -> &[SeasonPoint] {
        match season {
            Season::Wet => &self.wet,
            Season::Dry => &self.dry,
        }
    }

    /// Total number of season points.
    pub fn len(&self) -> usize {
        self.wet.len() + self.dry.len()
    }

    /// True if neither season has any points.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn bucket_median(values: &mut [f64]) -> f64 {
    values.sort_by(f64::total_cmp);
    median_sorted(values)
}

/// Collapses observations to one median per calendar month, in
/// chronological order. Non-finite values are ignored.
pub fn monthly_medians(observations: &[Observation]) -> Vec<MonthlyPoint> {
    let mut months: BTreeMap<(i32, u32), Vec<f64>> = BTreeMap::new();
    for obs in observations.iter().filter(|o| o.value.is_finite()) {
        months
            .entry((obs.date.year(), obs.date.month()))
            .or_default()
            .push(obs.value);
    }
    months
        .into_iter()
        .map(|((year, month), mut values)| MonthlyPoint {
            year,
            month,
            count: values.len(),
            value: bucket_median(&mut values),
        })
        .collect()
}

/// Groups monthly medians into wet/dry season-years and takes the median of
/// each bucket.
pub fn season_series(monthly: &[MonthlyPoint]) -> SeasonSeries {
    let mut buckets: BTreeMap<(Season, i32), Vec<f64>> = BTreeMap::new();
    for m in monthly.iter().filter(|m| m.value.is_finite()) {
        let key = Season::classify(m.year, m.month);
        buckets.entry(key).or_default().push(m.value);
    }

    let mut series = SeasonSeries::default();
    for ((season, season_year), mut values) in buckets {
        let point = SeasonPoint {
            season_year,
            count: values.len(),
            value: bucket_median(&mut values),
        };
        match season {
            Season::Wet => series.wet.push(point),
            Season::Dry => series.dry.push(point),
        }
    }
    series
}
