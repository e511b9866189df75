//! A coverage session: the orchestration of a whole run.
//!
//! A [`Session`] iterates over genes, and over each gene's features, computing
//! the per-base depth samples for every feature and handing them to a
//! [`GeneAggregator`] created fresh for the gene. The output is a flat
//! sequence of [`Row`]s: one per feature, followed by one trailing row per
//! gene.
//!
//! Processing is strictly sequential and single-pass; any error aborts the
//! run with no partial results.

use std::io;

use nonempty::NonEmpty;
use tracing::debug;

use crate::alignment::source::Source;
use crate::catalog::ReferenceCatalog;
use crate::coverage::DepthBuffer;
use crate::interval::GenomicInterval;
use crate::pileup;
use crate::region;
use crate::region::Region;
use crate::report::Row;
use crate::stats;
use crate::stats::GeneAggregator;

////////////////////////////////////////////////////////////////////////////////////////
// Errors
////////////////////////////////////////////////////////////////////////////////////////

/// An error related to a [`Session`].
#[derive(Debug)]
pub enum Error {
    /// A region failed to resolve against the reference catalog.
    Region(region::Error),

    /// An I/O error from the alignment source.
    Io(io::Error),

    /// The alignment source could not address an interval.
    Seek(String),

    /// A pileup error, notably a coordinate sort-order violation.
    Pileup(pileup::engine::Error),

    /// A statistics error.
    Stats(stats::Error),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Region(err) => write!(f, "region error: {err}"),
            Error::Io(err) => write!(f, "i/o error: {err}"),
            Error::Seek(region) => write!(f, "failed to seek to region: {region}"),
            Error::Pileup(err) => write!(f, "pileup error: {err}"),
            Error::Stats(err) => write!(f, "statistics error: {err}"),
        }
    }
}

impl std::error::Error for Error {}

/// A [`Result`](std::result::Result) with an [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

////////////////////////////////////////////////////////////////////////////////////////
// Genes
////////////////////////////////////////////////////////////////////////////////////////

/// A named group of features whose raw depth samples are pooled for a second
/// level of statistics.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Gene {
    /// The gene name.
    name: String,

    /// The features of the gene, in the order they should be reported.
    features: NonEmpty<Region>,
}

impl Gene {
    /// Creates a new [`Gene`].
    ///
    /// # Examples
    ///
    /// ```
    /// use nonempty::NonEmpty;
    ///
    /// use genecov::session::Gene;
    ///
    /// let gene = Gene::new("TP53", NonEmpty::new("chr17:100-200".parse()?));
    /// assert_eq!(gene.name(), "TP53");
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn new(name: impl Into<String>, features: NonEmpty<Region>) -> Self {
        Self {
            name: name.into(),
            features,
        }
    }

    /// Gets the gene name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Gets the features of the gene.
    pub fn features(&self) -> &NonEmpty<Region> {
        &self.features
    }
}

////////////////////////////////////////////////////////////////////////////////////////
// Sessions
////////////////////////////////////////////////////////////////////////////////////////

/// The strategy used to turn an interval's alignments into depth samples.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Strategy {
    /// Walk each alignment's CIGAR directly into a window-sized depth buffer.
    ///
    /// Produces one sample for every base of the interval, including
    /// uncovered bases (which sample as zero).
    #[default]
    CigarWalk,

    /// Stream the alignments through the pileup engine.
    ///
    /// Produces one sample for every position the engine advances past within
    /// the interval; positions before the first alignment or after the last
    /// are not sampled.
    Pileup,
}

/// A coverage session.
///
/// # Examples
///
/// ```
/// use nonempty::NonEmpty;
///
/// use genecov::alignment::Record;
/// use genecov::alignment::source::Records;
/// use genecov::catalog::ReferenceCatalog;
/// use genecov::session::Gene;
/// use genecov::session::Session;
///
/// let catalog = ReferenceCatalog::try_new([("chr1", 1000)])?;
/// let chr1 = catalog.lookup("chr1").unwrap();
///
/// let mut source = Records::new(vec![
///     Record::new(chr1, 100, "50M".parse()?),
///     Record::new(chr1, 120, "50M".parse()?),
/// ]);
///
/// let genes = [Gene::new("GENE", NonEmpty::new("chr1:100-169".parse()?))];
///
/// let session = Session::new(catalog);
/// let rows = session.run(&mut source, &genes)?;
///
/// // One feature row and one trailing gene row.
/// assert_eq!(rows.len(), 2);
///
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug)]
pub struct Session {
    /// The reference catalog regions are resolved against.
    catalog: ReferenceCatalog,

    /// The depth-computation strategy.
    strategy: Strategy,
}

impl Session {
    /// Creates a new [`Session`] using the default [`Strategy`].
    pub fn new(catalog: ReferenceCatalog) -> Self {
        Self {
            catalog,
            strategy: Strategy::default(),
        }
    }

    /// Consumes `self` and sets the depth-computation strategy.
    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Runs the session over `genes`, reading alignments from `source`.
    ///
    /// Rows are emitted in processing order: each gene's feature rows
    /// followed by that gene's trailing row. Feature identifiers are
    /// sequential across the whole run, starting at one.
    ///
    /// # Errors
    ///
    /// Any failure aborts the run: an unresolvable region, an I/O error from
    /// the source, a sort-order violation in the alignment stream, or a
    /// statistics failure.
    pub fn run<S>(&self, source: &mut S, genes: &[Gene]) -> Result<Vec<Row>>
    where
        S: Source,
    {
        let mut rows = Vec::new();
        let mut feature_id = 1;

        for gene in genes {
            let mut aggregator = GeneAggregator::new();

            for feature in gene.features().iter() {
                let interval = feature.resolve(&self.catalog).map_err(Error::Region)?;

                if !source.seek(&interval).map_err(Error::Io)? {
                    return Err(Error::Seek(feature.to_string()));
                }

                let samples = self.depths(source, &interval)?;

                debug!(
                    gene = gene.name(),
                    feature = %feature,
                    samples = samples.len(),
                    "processed feature"
                );

                let summary = match samples.is_empty() {
                    true => aggregator.no_coverage(),
                    false => aggregator.process_feature(&samples).map_err(Error::Stats)?,
                };

                rows.push(Row::Feature {
                    id: feature_id,
                    region: feature.to_string(),
                    summary,
                });

                feature_id += 1;
            }

            let summary = aggregator.finish();

            debug!(gene = gene.name(), "processed gene");

            rows.push(Row::Gene {
                name: gene.name().to_string(),
                summary,
            });
        }

        Ok(rows)
    }

    /// Computes the depth samples for one interval.
    ///
    /// An empty vector means the interval had no aligned reads.
    fn depths<S>(&self, source: &mut S, interval: &GenomicInterval) -> Result<Vec<u32>>
    where
        S: Source,
    {
        match self.strategy {
            Strategy::CigarWalk => {
                let mut buffer = DepthBuffer::new(interval);
                let mut mapped = false;

                while let Some(record) = source.next_record().map_err(Error::Io)? {
                    mapped |= record.mapped();
                    buffer.record(&record);
                }

                match mapped {
                    true => Ok(buffer.into_samples()),
                    false => Ok(Vec::new()),
                }
            }
            Strategy::Pileup => {
                let mut engine = pileup::Engine::new(interval.clone());

                while let Some(record) = source.next_record().map_err(Error::Io)? {
                    engine.add(record).map_err(Error::Pileup)?;
                }

                engine.flush();
                Ok(engine.into_depths())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alignment::Record;
    use crate::alignment::source::Records;

    fn catalog() -> ReferenceCatalog {
        ReferenceCatalog::try_new([("chr1", 10_000), ("chr2", 10_000)]).unwrap()
    }

    fn source(records: Vec<(usize, &str)>) -> Records {
        let catalog = catalog();
        let chr1 = catalog.lookup("chr1").unwrap();

        Records::new(
            records
                .into_iter()
                .map(|(position, cigar)| Record::new(chr1, position, cigar.parse().unwrap()))
                .collect(),
        )
    }

    fn gene(name: &str, features: &[&str]) -> Gene {
        let mut features = features.iter().map(|f| f.parse::<Region>().unwrap());

        // SAFETY: every caller passes at least one feature.
        let mut regions = NonEmpty::new(features.next().unwrap());
        for feature in features {
            regions.push(feature);
        }

        Gene::new(name, regions)
    }

    #[test]
    fn a_gene_row_trails_its_feature_rows() {
        let session = Session::new(catalog());
        let mut source = source(vec![(100, "50M")]);

        let genes = [gene("GENE", &["chr1:100-149", "chr1:200-249"])];
        let rows = session.run(&mut source, &genes).unwrap();

        assert_eq!(rows.len(), 3);
        assert!(matches!(rows[0], Row::Feature { id: 1, .. }));
        assert!(matches!(rows[1], Row::Feature { id: 2, .. }));
        assert!(matches!(&rows[2], Row::Gene { name, .. } if name == "GENE"));
    }

    #[test]
    fn a_fully_covered_feature_summarizes_its_window() {
        let session = Session::new(catalog());
        let mut source = source(vec![(100, "50M")]);

        let genes = [gene("GENE", &["chr1:100-149"])];
        let rows = session.run(&mut source, &genes).unwrap();

        let summary = rows[0].summary();
        assert_eq!(summary.len(), 50);
        assert_eq!(summary.min(), 1);
        assert_eq!(summary.max(), 1);
        assert_eq!(summary.mean(), 1.0);
    }

    #[test]
    fn a_feature_with_no_alignments_is_all_zero_and_excluded_from_the_gene() {
        let session = Session::new(catalog());
        let mut source = source(vec![(100, "50M")]);

        let genes = [gene("GENE", &["chr1:100-149", "chr1:5000-5049"])];
        let rows = session.run(&mut source, &genes).unwrap();

        // The uncovered feature reports all zeros.
        let uncovered = rows[1].summary();
        assert!(uncovered.is_empty());
        assert_eq!(uncovered.max(), 0);

        // And contributes nothing to the gene: the gene pool is exactly the
        // covered feature's samples.
        let gene_summary = rows[2].summary();
        assert_eq!(gene_summary.len(), 50);
        assert_eq!(gene_summary.min(), 1);
    }

    #[test]
    fn gene_statistics_pool_raw_samples_across_features() {
        let session = Session::new(catalog());

        // Two features; the second is double-covered over half its span.
        let mut source = source(vec![(100, "10M"), (200, "10M"), (205, "10M")]);

        let genes = [gene("GENE", &["chr1:100-109", "chr1:200-209"])];
        let rows = session.run(&mut source, &genes).unwrap();

        // Feature pools: ten ones; five ones and five twos.
        let gene_summary = rows[2].summary();
        assert_eq!(gene_summary.len(), 20);
        assert_eq!(gene_summary.max(), 2);
        assert_eq!(gene_summary.mean(), 25.0 / 20.0);
    }

    #[test]
    fn the_pileup_strategy_samples_only_advanced_positions() {
        let session = Session::new(catalog()).with_strategy(Strategy::Pileup);
        let mut source = source(vec![(100, "50M")]);

        let genes = [gene("GENE", &["chr1:0-9999"])];
        let rows = session.run(&mut source, &genes).unwrap();

        // Exactly the fifty covered positions are sampled.
        let summary = rows[0].summary();
        assert_eq!(summary.len(), 50);
        assert_eq!(summary.min(), 1);
    }

    #[test]
    fn out_of_order_alignments_abort_the_run() {
        let session = Session::new(catalog()).with_strategy(Strategy::Pileup);
        let mut source = source(vec![(10, "5M"), (5, "5M")]);

        let genes = [gene("GENE", &["chr1:0-99"])];
        let err = session.run(&mut source, &genes).unwrap_err();

        assert!(matches!(err, Error::Pileup(_)));
    }

    #[test]
    fn an_unresolvable_region_aborts_the_run() {
        let session = Session::new(catalog());
        let mut source = source(vec![]);

        let genes = [gene("GENE", &["chrX:1-2"])];
        let err = session.run(&mut source, &genes).unwrap_err();

        assert!(matches!(err, Error::Region(region::Error::UnknownReference(_))));
    }
}
