//! Summary Statistics
//!
//! Descriptive statistics over one run's samples:
//! - Extremes are plain folds; the mean is clamped into them
//! - Median uses the upper-middle element for even counts (no averaging)
//! - Variance is the Bessel-corrected sum-of-squares form
//!
//! Nothing here returns zero for missing data: an empty slice yields `None`
//! everywhere, and a single sample yields `None` for variance and stddev.

use serde::{Deserialize, Serialize};

/// Snapshot of every statistic for one sample set
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Summary {
    /// Number of samples
    pub count: usize,
    /// Sum of all samples
    pub total: Option<f64>,
    /// Smallest sample
    pub min: Option<f64>,
    /// Largest sample
    pub max: Option<f64>,
    /// Arithmetic mean
    pub mean: Option<f64>,
    /// Upper-middle median
    pub median: Option<f64>,
    /// Sample variance (n - 1 denominator)
    pub variance: Option<f64>,
    /// Square root of the sample variance
    pub std_dev: Option<f64>,
}

impl Summary {
    /// Whether the summary was computed from an empty sample set
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

/// Compute all statistics for `samples`
pub fn compute_summary(samples: &[f64]) -> Summary {
    if samples.is_empty() {
        return Summary::default();
    }

    let variance = sample_variance(samples);

    Summary {
        count: samples.len(),
        total: Some(samples.iter().sum()),
        min: sample_min(samples),
        max: sample_max(samples),
        mean: sample_mean(samples),
        median: upper_median(samples),
        variance,
        std_dev: variance.map(f64::sqrt),
    }
}

/// Smallest sample
pub fn sample_min(samples: &[f64]) -> Option<f64> {
    samples.iter().copied().reduce(f64::min)
}

/// Largest sample
pub fn sample_max(samples: &[f64]) -> Option<f64> {
    samples.iter().copied().reduce(f64::max)
}

/// Arithmetic mean, kept within `[min, max]`.
///
/// `Σx / n` can round one ulp past the extremes (three samples of `0.1`
/// average to `0.10000000000000002`).
pub fn sample_mean(samples: &[f64]) -> Option<f64> {
    let (min, max) = (sample_min(samples)?, sample_max(samples)?);
    let total: f64 = samples.iter().sum();
    Some((total / samples.len() as f64).max(min).min(max))
}

/// Median using the upper-middle convention.
///
/// Sorts a copy ascending and takes the element at `len / 2`, so `[1, 2, 3, 4]`
/// yields `3` rather than `2.5`.
pub fn upper_median(samples: &[f64]) -> Option<f64> {
    if samples.is_empty() {
        return None;
    }

    let mut sorted = samples.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    Some(sorted[sorted.len() / 2])
}

/// Sample variance `(Σx² − (Σx)²/n) / (n − 1)`, or `None` below two samples.
///
/// The sum-of-squares form can dip a hair under zero through cancellation
/// when all samples are equal; the result is clamped at zero so `sqrt`
/// stays defined.
pub fn sample_variance(samples: &[f64]) -> Option<f64> {
    let n = samples.len();
    if n < 2 {
        return None;
    }

    let total: f64 = samples.iter().sum();
    let sum_of_squares: f64 = samples.iter().map(|x| x * x).sum();
    let ss = sum_of_squares - (total * total) / n as f64;

    Some((ss / (n - 1) as f64).max(0.0))
}
