//! An incremental mean/variance accumulator.
//!
//! [`RunningMoments`] implements Welford's online algorithm: it maintains the
//! running mean and the sum of squared deviations in O(1) memory. It is an
//! alternative to [`Summary`](crate::stats::Summary) for callers that only
//! need mean and standard deviation and do not want to hold every depth
//! sample in memory. It cannot produce order statistics: medians and
//! quartiles require the sorted sample set.
//!
//! Callers that want both a per-interval and a run-wide accumulator should
//! hold two values and reset the per-interval one between intervals; the two
//! lifetimes are deliberately not bundled into one type.

/// An incremental mean/variance accumulator over depth samples.
///
/// # Examples
///
/// ```
/// use genecov::stats::moments::RunningMoments;
///
/// let mut moments = RunningMoments::new();
/// for depth in [2, 4, 4, 6, 8] {
///     moments.update(depth);
/// }
///
/// assert_eq!(moments.count(), 5);
/// assert_eq!(moments.mean(), 4.8);
///
/// moments.reset();
/// assert_eq!(moments.count(), 0);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RunningMoments {
    /// The number of samples seen.
    count: u64,

    /// The running mean.
    mean: f64,

    /// The running sum of squared deviations from the mean.
    sum_squares: f64,
}

impl RunningMoments {
    /// Creates a new, empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one depth sample into the accumulator.
    pub fn update(&mut self, value: u32) {
        let value = value as f64;

        self.count += 1;

        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        self.sum_squares += delta * (value - self.mean);
    }

    /// Resets the accumulator to its empty state.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Gets the number of samples seen.
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Gets the running mean, or zero when no samples have been seen.
    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Gets the population variance, or zero when no samples have been seen.
    pub fn variance(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }

        self.sum_squares / self.count as f64
    }

    /// Gets the sample variance, or zero when fewer than two samples have
    /// been seen.
    pub fn sample_variance(&self) -> f64 {
        if self.count < 2 {
            return 0.0;
        }

        self.sum_squares / (self.count - 1) as f64
    }

    /// Gets the population standard deviation.
    pub fn sd(&self) -> f64 {
        self.variance().sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::Summary;

    #[test]
    fn matches_the_exact_summary_for_mean_and_sd() {
        let samples = [2u32, 4, 4, 6, 8];

        let mut moments = RunningMoments::new();
        for &sample in &samples {
            moments.update(sample);
        }

        let summary = Summary::from_samples(&samples).unwrap();

        assert!((moments.mean() - summary.mean()).abs() < 1e-12);
        assert!((moments.sd() - summary.sd()).abs() < 1e-12);
    }

    #[test]
    fn reset_clears_all_state() {
        let mut moments = RunningMoments::new();
        moments.update(10);
        moments.update(20);

        moments.reset();

        assert_eq!(moments, RunningMoments::new());
        assert_eq!(moments.variance(), 0.0);
    }

    #[test]
    fn a_single_sample_has_zero_variance() {
        let mut moments = RunningMoments::new();
        moments.update(42);

        assert_eq!(moments.mean(), 42.0);
        assert_eq!(moments.variance(), 0.0);
        assert_eq!(moments.sample_variance(), 0.0);
    }
}
