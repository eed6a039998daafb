#![warn(missing_docs)]
//! hookbench Statistics
//!
//! Storage and descriptive statistics for the elapsed-time samples of one
//! benchmarked test case:
//! - `SampleStore`: append-only sequence of samples in seconds
//! - `Summary`: min, max, mean, median, variance and standard deviation
//!
//! Every statistic is an `Option`. An empty store has no statistics at all,
//! and variance/stddev need at least two samples. Callers render a
//! placeholder for `None`, never a zero.

mod store;
mod summary;

pub use store::SampleStore;
pub use summary::{
    Summary, compute_summary, sample_max, sample_mean, sample_min, sample_variance, upper_median,
};

/// Conversion factor from seconds (sample unit) to microseconds (report unit)
pub const MICROS_PER_SECOND: f64 = 1_000_000.0;
