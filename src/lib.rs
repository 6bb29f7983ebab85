//! # lakestat
//!
//! Hypothesis tests, equivalence testing, and seasonal trend analysis for
//! small water-quality samples.
//!
//! Every test takes plain `f64` slices plus a few scalar parameters and
//! returns a self-contained result record whose `significant` (or
//! `equivalent`) flag is always `p_value < alpha`. Results are intended to
//! agree with R's `t.test`, `wilcox.test`, `binom.test`, `shapiro.test`,
//! `chisq.test` and `car::leveneTest` to about 1e-6.
//!
//! ## Modules
//!
//! - [`distribution`] — Pluggable CDF provider (exact `statrs` or normal-only fallback)
//! - [`descriptive`] — Mean, variance, median, summaries, sample cleaning
//! - [`rank`] — Midranks with tie blocks
//! - [`one_sample`] — t-test, Wilcoxon signed-rank, sign test, Shapiro-Wilk
//! - [`two_sample`] — Student and Welch t, Mann-Whitney U, Mood's median, Levene
//! - [`equivalence`] — TOST (t and Wilcoxon variants)
//! - [`trend`] — Wet/dry seasonal bucketing, seasonal Mann-Kendall, Sen's slope
//! - [`engine`] — Facade bundling one provider with every test
//!
//! ## Design Philosophy
//!
//! - **Domain-agnostic core**: no stations, parameters or units, just numbers
//! - **Fail loudly**: t, χ², binomial and F p-values are never approximated
//! - **Research-backed**: all algorithms reference the literature they follow
//!
//! Diagnostics go through `tracing`; the crate never installs a subscriber.

pub mod config;
pub mod descriptive;
pub mod distribution;
pub mod engine;
pub mod equivalence;
pub mod error;
pub mod one_sample;
pub mod rank;
pub mod trend;
pub mod two_sample;

pub use config::{Alternative, Center, TestOptions};
pub use engine::Engine;
pub use error::{StatsError, StatsResult};
