//! Order-statistics summaries of per-base depth samples.
//!
//! A [`Summary`] is computed from the raw multiset of depth samples for one
//! feature (or for a whole gene, via
//! [`GeneAggregator`](aggregator::GeneAggregator)): minimum, maximum, mean,
//! median, first and third quartiles, and population standard deviation.
//!
//! Medians follow the standard order-statistics convention: for an odd number
//! of samples the middle element, for an even number the average of the two
//! middle elements. Quartiles follow a piecewise interpolation rule keyed on
//! the residue of the sample count (see [`Summary::from_samples`]).

pub mod aggregator;
pub mod moments;

pub use aggregator::GeneAggregator;

/// An error related to computing a [`Summary`].
#[derive(Debug, Eq, PartialEq)]
pub enum Error {
    /// No depth samples were provided.
    ///
    /// An empty sample set has no defined statistics. Callers handling a
    /// feature with no aligned reads should use [`Summary::zero`] instead.
    EmptySamples,
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::EmptySamples => {
                write!(f, "cannot summarize an empty set of depth samples")
            }
        }
    }
}

impl std::error::Error for Error {}

/// A [`Result`](std::result::Result) with an [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// An order-statistics summary of a set of depth samples.
///
/// Summaries are immutable once created.
#[derive(Clone, Debug, PartialEq)]
pub struct Summary {
    /// The number of samples summarized.
    len: usize,

    /// The minimum depth.
    min: u32,

    /// The maximum depth.
    max: u32,

    /// The arithmetic mean.
    mean: f64,

    /// The median.
    median: f64,

    /// The first quartile.
    q1: f64,

    /// The third quartile.
    q3: f64,

    /// The population standard deviation.
    sd: f64,
}

impl Summary {
    /// Computes a [`Summary`] from a set of depth samples.
    ///
    /// The samples need not be sorted; a sorted copy is taken internally.
    ///
    /// # Quartiles
    ///
    /// For `n` samples `x[0] <= x[1] <= … <= x[n - 1]`:
    ///
    /// - odd `n` with `(n - 1) % 4 == 0`, `k = (n - 1) / 4`:
    ///   `Q1 = 0.25·x[k-1] + 0.75·x[k]` and `Q3 = 0.75·x[3k] + 0.25·x[3k+1]`;
    /// - odd `n` with `(n - 3) % 4 == 0`, `k = (n - 3) / 4`:
    ///   `Q1 = 0.75·x[k] + 0.25·x[k+1]` and
    ///   `Q3 = 0.25·x[3k+1] + 0.75·x[3k+2]`;
    /// - even `n` with `n / 2` odd: the single midpoints of each half;
    /// - even `n` with `n / 2` even: the averages of the two straddling order
    ///   statistics in each half.
    ///
    /// A single sample is its own median and both of its own quartiles.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::EmptySamples`] when `samples` is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use genecov::stats::Summary;
    ///
    /// let summary = Summary::from_samples(&[2, 4, 4, 6, 8])?;
    ///
    /// assert_eq!(summary.min(), 2);
    /// assert_eq!(summary.max(), 8);
    /// assert_eq!(summary.mean(), 4.8);
    /// assert_eq!(summary.median(), 4.0);
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn from_samples(samples: &[u32]) -> Result<Self> {
        if samples.is_empty() {
            return Err(Error::EmptySamples);
        }

        let mut sorted = samples.to_vec();
        sorted.sort_unstable();

        let n = sorted.len();
        let sum = sorted.iter().map(|&x| x as u64).sum::<u64>();
        let mean = sum as f64 / n as f64;

        let sd = (sorted
            .iter()
            .map(|&x| (x as f64 - mean).powi(2))
            .sum::<f64>()
            / n as f64)
            .sqrt();

        let (q1, q3) = quartiles(&sorted);

        Ok(Self {
            len: n,
            min: sorted[0],
            max: sorted[n - 1],
            mean,
            median: median(&sorted),
            q1,
            q3,
            sd,
        })
    }

    /// Creates the all-zero [`Summary`] for a feature with no aligned reads.
    ///
    /// # Examples
    ///
    /// ```
    /// use genecov::stats::Summary;
    ///
    /// let summary = Summary::zero();
    /// assert_eq!(summary.min(), 0);
    /// assert_eq!(summary.sd(), 0.0);
    /// ```
    pub fn zero() -> Self {
        Self {
            len: 0,
            min: 0,
            max: 0,
            mean: 0.0,
            median: 0.0,
            q1: 0.0,
            q3: 0.0,
            sd: 0.0,
        }
    }

    /// Gets the number of samples summarized.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns whether the summary was produced by [`Summary::zero`].
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Gets the minimum depth.
    pub fn min(&self) -> u32 {
        self.min
    }

    /// Gets the maximum depth.
    pub fn max(&self) -> u32 {
        self.max
    }

    /// Gets the arithmetic mean.
    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Gets the median.
    pub fn median(&self) -> f64 {
        self.median
    }

    /// Gets the first quartile.
    pub fn q1(&self) -> f64 {
        self.q1
    }

    /// Gets the third quartile.
    pub fn q3(&self) -> f64 {
        self.q3
    }

    /// Gets the interquartile range.
    pub fn iqr(&self) -> f64 {
        self.q3 - self.q1
    }

    /// Gets the population standard deviation.
    pub fn sd(&self) -> f64 {
        self.sd
    }
}

/// Computes the median of a sorted, non-empty slice.
fn median(sorted: &[u32]) -> f64 {
    let n = sorted.len();

    if n % 2 == 1 {
        sorted[n / 2] as f64
    } else {
        (sorted[n / 2 - 1] as f64 + sorted[n / 2] as f64) / 2.0
    }
}

/// Computes the first and third quartiles of a sorted, non-empty slice.
fn quartiles(sorted: &[u32]) -> (f64, f64) {
    let x = |i: usize| sorted[i] as f64;
    let n = sorted.len();

    if n == 1 {
        return (x(0), x(0));
    }

    if n % 2 == 1 {
        if (n - 1) % 4 == 0 {
            let k = (n - 1) / 4;
            let q1 = 0.25 * x(k - 1) + 0.75 * x(k);
            let q3 = 0.75 * x(3 * k) + 0.25 * x(3 * k + 1);
            (q1, q3)
        } else if (n - 3) % 4 == 0 {
            let k = (n - 3) / 4;
            let q1 = 0.75 * x(k) + 0.25 * x(k + 1);
            let q3 = 0.25 * x(3 * k + 1) + 0.75 * x(3 * k + 2);
            (q1, q3)
        } else {
            // An odd n is congruent to either 1 or 3 modulo 4.
            unreachable!("quartile residue fallthrough for n = {n}")
        }
    } else {
        let half = n / 2;

        if half % 2 == 1 {
            (x(half / 2), x(half + half / 2))
        } else {
            let q1 = (x(half / 2 - 1) + x(half / 2)) / 2.0;
            let q3 = (x(half + half / 2 - 1) + x(half + half / 2)) / 2.0;
            (q1, q3)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn empty_samples_are_rejected() {
        let err = Summary::from_samples(&[]).unwrap_err();
        assert_eq!(err, Error::EmptySamples);
        assert_eq!(
            err.to_string(),
            "cannot summarize an empty set of depth samples"
        );
    }

    #[test]
    fn a_single_sample_is_every_statistic() {
        let summary = Summary::from_samples(&[7]).unwrap();
        assert_eq!(summary.min(), 7);
        assert_eq!(summary.max(), 7);
        assert_close(summary.mean(), 7.0);
        assert_close(summary.median(), 7.0);
        assert_close(summary.q1(), 7.0);
        assert_close(summary.q3(), 7.0);
        assert_close(summary.sd(), 0.0);
    }

    #[test]
    fn the_reference_five_sample_case() {
        let summary = Summary::from_samples(&[2, 4, 4, 6, 8]).unwrap();

        assert_eq!(summary.min(), 2);
        assert_eq!(summary.max(), 8);
        assert_close(summary.mean(), 4.8);
        assert_close(summary.median(), 4.0);
        // Population standard deviation: sqrt(20.8 / 5).
        assert_close(summary.sd(), (20.8f64 / 5.0).sqrt());

        // n = 5: (n - 1) % 4 == 0 with k = 1.
        assert_close(summary.q1(), 0.25 * 2.0 + 0.75 * 4.0);
        assert_close(summary.q3(), 0.75 * 6.0 + 0.25 * 8.0);
    }

    #[test]
    fn odd_n_with_residue_three() {
        // n = 7: (n - 3) % 4 == 0 with k = 1.
        let summary = Summary::from_samples(&[1, 2, 3, 4, 5, 6, 7]).unwrap();
        assert_close(summary.median(), 4.0);
        assert_close(summary.q1(), 0.75 * 2.0 + 0.25 * 3.0);
        assert_close(summary.q3(), 0.25 * 5.0 + 0.75 * 6.0);
    }

    #[test]
    fn even_n_with_odd_halves_uses_midpoints() {
        // n = 6: halves of three samples each.
        let summary = Summary::from_samples(&[1, 2, 3, 4, 5, 6]).unwrap();
        assert_close(summary.median(), 3.5);
        assert_close(summary.q1(), 2.0);
        assert_close(summary.q3(), 5.0);
    }

    #[test]
    fn even_n_with_even_halves_averages_straddlers() {
        // n = 8: halves of four samples each.
        let summary = Summary::from_samples(&[1, 2, 3, 4, 5, 6, 7, 8]).unwrap();
        assert_close(summary.median(), 4.5);
        assert_close(summary.q1(), 2.5);
        assert_close(summary.q3(), 6.5);
    }

    #[test]
    fn unsorted_input_is_sorted_first() {
        let shuffled = Summary::from_samples(&[8, 2, 6, 4, 4]).unwrap();
        let sorted = Summary::from_samples(&[2, 4, 4, 6, 8]).unwrap();
        assert_eq!(shuffled, sorted);
    }

    #[test]
    fn quartiles_are_ordered_for_many_lengths() {
        // min <= Q1 <= median <= Q3 <= max over a spread of sample counts.
        for n in 1..=64usize {
            let samples = (0..n).map(|i| (i * 3 % 17) as u32).collect::<Vec<_>>();
            let summary = Summary::from_samples(&samples).unwrap();

            assert!(summary.min() as f64 <= summary.q1(), "n = {n}");
            assert!(summary.q1() <= summary.median(), "n = {n}");
            assert!(summary.median() <= summary.q3(), "n = {n}");
            assert!(summary.q3() <= summary.max() as f64, "n = {n}");
        }
    }

    #[test]
    fn sd_is_zero_iff_all_samples_are_equal() {
        let equal = Summary::from_samples(&[5, 5, 5, 5]).unwrap();
        assert_close(equal.sd(), 0.0);

        let unequal = Summary::from_samples(&[5, 5, 5, 6]).unwrap();
        assert!(unequal.sd() > 0.0);
    }
}
