//! Output rows for a coverage run.
//!
//! The crate does not own any output formatting beyond the canonical
//! tab-separated rendering of a row; writing rows anywhere is the caller's
//! business.

use crate::stats::Summary;

/// The header line preceding the rows of a report.
pub const HEADER: &str = "#id\tregion\tmin\tmax\tq1\tmedian\tq3\tmean\tsd";

/// A single row of a coverage report.
///
/// Rows are immutable once created: they are appended to the output sequence
/// and never touched again.
#[derive(Clone, Debug, PartialEq)]
pub enum Row {
    /// Statistics for one feature.
    Feature {
        /// The sequential feature identifier, starting at one.
        id: usize,

        /// The textual region the feature was requested as.
        region: String,

        /// The feature's statistics.
        summary: Summary,
    },

    /// Trailing statistics for one gene, pooled over its features.
    Gene {
        /// The gene name.
        name: String,

        /// The gene's statistics.
        summary: Summary,
    },
}

impl Row {
    /// Gets the summary carried by the row.
    pub fn summary(&self) -> &Summary {
        match self {
            Row::Feature { summary, .. } => summary,
            Row::Gene { summary, .. } => summary,
        }
    }
}

impl std::fmt::Display for Row {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Row::Feature {
                id,
                region,
                summary,
            } => {
                write!(f, "{id}\t{region}\t")?;
                write_summary(f, summary)
            }
            Row::Gene { name, summary } => {
                write!(f, "{name}\tNA\t")?;
                write_summary(f, summary)
            }
        }
    }
}

/// Writes the statistics columns shared by both row variants.
fn write_summary(f: &mut std::fmt::Formatter<'_>, summary: &Summary) -> std::fmt::Result {
    write!(
        f,
        "{}\t{}\t{}\t{}\t{}\t{}\t{}",
        summary.min(),
        summary.max(),
        summary.q1(),
        summary.median(),
        summary.q3(),
        summary.mean(),
        summary.sd()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a_feature_row_renders_its_identifier_and_region() {
        let row = Row::Feature {
            id: 3,
            region: String::from("chr1:100-200"),
            summary: Summary::zero(),
        };

        assert_eq!(row.to_string(), "3\tchr1:100-200\t0\t0\t0\t0\t0\t0\t0");
    }

    #[test]
    fn a_gene_row_renders_na_in_place_of_a_region() {
        let row = Row::Gene {
            name: String::from("TP53"),
            summary: Summary::zero(),
        };

        assert!(row.to_string().starts_with("TP53\tNA\t"));
    }
}
