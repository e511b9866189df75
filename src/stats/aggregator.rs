//! Aggregation of feature-level depth samples into gene-level statistics.

use crate::stats;
use crate::stats::Summary;

/// An aggregator for one gene's worth of depth samples.
///
/// An aggregator is created fresh for each gene, fed every feature of that
/// gene in turn, and consumed to produce the gene-level summary. Gene
/// statistics are recomputed over the pooled raw samples of every processed
/// feature: feature summaries are *not* combinable into a gene summary, since
/// order statistics do not compose.
///
/// Features with no aligned reads go through [`GeneAggregator::no_coverage`],
/// which produces the all-zero summary without contributing samples to the
/// pool.
///
/// # Examples
///
/// ```
/// use genecov::stats::GeneAggregator;
///
/// let mut aggregator = GeneAggregator::new();
///
/// aggregator.process_feature(&[2, 4, 4])?;
/// aggregator.process_feature(&[6, 8])?;
///
/// let gene = aggregator.finish();
/// assert_eq!(gene.len(), 5);
/// assert_eq!(gene.mean(), 4.8);
///
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone, Debug, Default)]
pub struct GeneAggregator {
    /// The pooled raw samples of every processed feature.
    pooled: Vec<u32>,
}

impl GeneAggregator {
    /// Creates a new, empty [`GeneAggregator`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Summarizes one feature's depth samples and pools them for the gene.
    ///
    /// # Errors
    ///
    /// Fails with [`stats::Error::EmptySamples`] when `samples` is empty; a
    /// feature with no aligned reads should use
    /// [`GeneAggregator::no_coverage`] instead.
    pub fn process_feature(&mut self, samples: &[u32]) -> stats::Result<Summary> {
        let summary = Summary::from_samples(samples)?;
        self.pooled.extend_from_slice(samples);
        Ok(summary)
    }

    /// Produces the all-zero summary for a feature with no aligned reads.
    ///
    /// The feature contributes nothing to the gene-level pool.
    pub fn no_coverage(&self) -> Summary {
        Summary::zero()
    }

    /// Consumes the aggregator and computes the gene-level summary over the
    /// pooled samples.
    ///
    /// A gene none of whose features had any coverage yields the all-zero
    /// summary.
    pub fn finish(self) -> Summary {
        match Summary::from_samples(&self.pooled) {
            Ok(summary) => summary,
            Err(stats::Error::EmptySamples) => Summary::zero(),
        }
    }
}
