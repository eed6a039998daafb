//! Sample Store
//!
//! Ordered sequence of elapsed-time measurements (seconds) for one test case.
//! Insertion order is execution order. The store only grows: there is no
//! API to remove or rewrite a recorded sample.

use crate::summary::{
    Summary, compute_summary, sample_max, sample_mean, sample_min, sample_variance, upper_median,
};
use serde::Serialize;

/// Append-only collection of samples for one benchmarked test case
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SampleStore {
    samples: Vec<f64>,
}

impl SampleStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store with room for `capacity` samples
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            samples: Vec::with_capacity(capacity),
        }
    }

    /// Append one elapsed time in seconds
    #[inline]
    pub fn record(&mut self, seconds: f64) {
        self.samples.push(seconds);
    }

    /// Append several samples, preserving their order
    pub fn extend<I>(&mut self, samples: I)
    where
        I: IntoIterator<Item = f64>,
    {
        self.samples.extend(samples);
    }

    /// Recorded samples in execution order
    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    /// Number of recorded samples
    pub fn count(&self) -> usize {
        self.samples.len()
    }

    /// Whether nothing has been recorded
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Sum of all samples
    pub fn total(&self) -> Option<f64> {
        (!self.is_empty()).then(|| self.samples.iter().sum())
    }

    /// Smallest sample
    pub fn min(&self) -> Option<f64> {
        sample_min(&self.samples)
    }

    /// Largest sample
    pub fn max(&self) -> Option<f64> {
        sample_max(&self.samples)
    }

    /// Arithmetic mean, never outside `[min, max]`
    pub fn mean(&self) -> Option<f64> {
        sample_mean(&self.samples)
    }

    /// Upper-middle median
    pub fn median(&self) -> Option<f64> {
        upper_median(&self.samples)
    }

    /// Sample variance; absent below two samples
    pub fn variance(&self) -> Option<f64> {
        sample_variance(&self.samples)
    }

    /// Sample standard deviation; absent below two samples
    pub fn std_dev(&self) -> Option<f64> {
        self.variance().map(f64::sqrt)
    }

    /// All statistics at once
    pub fn summary(&self) -> Summary {
        compute_summary(&self.samples)
    }
}

impl FromIterator<f64> for SampleStore {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        Self {
            samples: iter.into_iter().collect(),
        }
    }
}
