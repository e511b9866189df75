//! The region micro-grammar.
//!
//! A region describes the genomic span a caller wants coverage for. The
//! grammar has five productions:
//!
//! ```text
//! region   := contig
//!           | contig ":" position
//!           | contig ":" start sep stop
//!           | contig ":" start sep contig ":" stop
//! sep      := "-" | ".."
//! position := [0-9]+
//! ```
//!
//! Each production maps to an explicit [`Region`] variant rather than being
//! resolved by ad hoc substring search, which removes any ambiguity between
//! the `-` and `..` separators. Positions are 0-based.
//!
//! A parsed region is purely textual; [`Region::resolve`] turns it into a
//! [`GenomicInterval`] against a [`ReferenceCatalog`], failing when a contig
//! name is unknown or a position lies outside the reference's length.

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

use crate::catalog::ReferenceCatalog;
use crate::interval;
use crate::interval::GenomicInterval;

pub mod reader;

pub use reader::Reader;

/// The production `contig ":" start sep contig ":" stop`.
static CROSS_CONTIG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([^:\s]+):(\d+)(\.\.|-)([^:\s]+):(\d+)$").unwrap());

/// The production `contig ":" start sep stop`.
static SPAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([^:\s]+):(\d+)(\.\.|-)(\d+)$").unwrap());

/// The production `contig ":" position`.
static POSITION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^([^:\s]+):(\d+)$").unwrap());

/// The production `contig`.
static CONTIG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[^:\s]+$").unwrap());

////////////////////////////////////////////////////////////////////////////////////////
// Errors
////////////////////////////////////////////////////////////////////////////////////////

/// An error related to a [`Region`].
#[derive(Debug, Eq, PartialEq)]
pub enum Error {
    /// The value did not match any production of the region grammar.
    Parse(String),

    /// A contig name was not present in the reference catalog.
    UnknownReference(String),

    /// A position lies at or beyond the length of its reference sequence.
    OutOfBounds {
        /// The contig name.
        contig: String,

        /// The offending 0-based position.
        position: usize,

        /// The length of the reference sequence.
        length: usize,
    },

    /// A cross-contig region named two different reference sequences, which
    /// cannot be represented as a single genomic interval.
    SpansMultipleReferences {
        /// The contig the region starts on.
        start_contig: String,

        /// The contig the region stops on.
        stop_contig: String,
    },

    /// The resolved positions did not form a valid interval.
    Interval(interval::Error),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Parse(value) => write!(f, "could not parse region from the value: {value}"),
            Error::UnknownReference(name) => write!(f, "unknown reference name: {name}"),
            Error::OutOfBounds {
                contig,
                position,
                length,
            } => write!(
                f,
                "position {position} lies outside of {contig}, which has length {length}"
            ),
            Error::SpansMultipleReferences {
                start_contig,
                stop_contig,
            } => write!(
                f,
                "region spans multiple reference sequences: {start_contig} and {stop_contig}"
            ),
            Error::Interval(err) => write!(f, "invalid interval: {err}"),
        }
    }
}

impl std::error::Error for Error {}

/// A [`Result`](std::result::Result) with an [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

////////////////////////////////////////////////////////////////////////////////////////
// Regions
////////////////////////////////////////////////////////////////////////////////////////

/// The separator used in a ranged region.
///
/// Which separator was used carries no meaning; it is retained only so that a
/// region can be displayed exactly as it was written.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Separator {
    /// The `-` separator.
    Dash,

    /// The `..` separator.
    Dots,
}

impl Separator {
    /// Gets the textual form of the separator.
    pub fn as_str(&self) -> &'static str {
        match self {
            Separator::Dash => "-",
            Separator::Dots => "..",
        }
    }

    /// Parses a separator from its textual form.
    ///
    /// Only ever called with a capture of the `sep` production, which cannot
    /// contain anything else.
    fn from_capture(s: &str) -> Self {
        match s {
            "-" => Separator::Dash,
            _ => Separator::Dots,
        }
    }
}

/// A parsed region.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Region {
    /// An entire contig (`chrom`).
    Contig {
        /// The contig name.
        contig: String,
    },

    /// A contig from a position to its end (`chrom:pos`).
    Position {
        /// The contig name.
        contig: String,

        /// The 0-based start position.
        position: usize,
    },

    /// A range on one contig (`chrom:start-stop` or `chrom:start..stop`).
    Span {
        /// The contig name.
        contig: String,

        /// The 0-based start position.
        start: usize,

        /// The 0-based stop position (inclusive).
        stop: usize,

        /// The separator the region was written with.
        separator: Separator,
    },

    /// A range across two contig names (`chrom1:start..chrom2:stop`).
    ///
    /// This only resolves when both names refer to the same reference
    /// sequence; a region spanning two different reference sequences is not
    /// representable as a [`GenomicInterval`].
    CrossContig {
        /// The contig the region starts on.
        start_contig: String,

        /// The 0-based start position.
        start: usize,

        /// The contig the region stops on.
        stop_contig: String,

        /// The 0-based stop position (inclusive).
        stop: usize,

        /// The separator the region was written with.
        separator: Separator,
    },
}

impl Region {
    /// Resolves the region against a reference catalog into a
    /// [`GenomicInterval`].
    ///
    /// Open-ended productions (`chrom`, `chrom:pos`) resolve up to the last
    /// base of the reference sequence.
    ///
    /// # Examples
    ///
    /// ```
    /// use genecov::catalog::ReferenceCatalog;
    /// use genecov::region::Region;
    ///
    /// let catalog = ReferenceCatalog::try_new([("chr1", 1000)])?;
    ///
    /// let interval = "chr1:100-199".parse::<Region>()?.resolve(&catalog)?;
    /// assert_eq!(interval.start(), 100);
    /// assert_eq!(interval.end(), 199);
    ///
    /// let interval = "chr1".parse::<Region>()?.resolve(&catalog)?;
    /// assert_eq!(interval.len(), 1000);
    ///
    /// assert!("chr20:1-2".parse::<Region>()?.resolve(&catalog).is_err());
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn resolve(&self, catalog: &ReferenceCatalog) -> Result<GenomicInterval> {
        match self {
            Region::Contig { contig } => {
                let (id, length) = lookup(catalog, contig)?;
                check_bounds(contig, 0, length)?;
                GenomicInterval::try_new(id, 0, length - 1).map_err(Error::Interval)
            }
            Region::Position { contig, position } => {
                let (id, length) = lookup(catalog, contig)?;
                check_bounds(contig, *position, length)?;
                GenomicInterval::try_new(id, *position, length - 1).map_err(Error::Interval)
            }
            Region::Span {
                contig,
                start,
                stop,
                ..
            } => {
                let (id, length) = lookup(catalog, contig)?;
                check_bounds(contig, *start, length)?;
                check_bounds(contig, *stop, length)?;
                GenomicInterval::try_new(id, *start, *stop).map_err(Error::Interval)
            }
            Region::CrossContig {
                start_contig,
                start,
                stop_contig,
                stop,
                ..
            } => {
                let (start_id, start_length) = lookup(catalog, start_contig)?;
                let (stop_id, stop_length) = lookup(catalog, stop_contig)?;

                if start_id != stop_id {
                    return Err(Error::SpansMultipleReferences {
                        start_contig: start_contig.clone(),
                        stop_contig: stop_contig.clone(),
                    });
                }

                check_bounds(start_contig, *start, start_length)?;
                check_bounds(stop_contig, *stop, stop_length)?;
                GenomicInterval::try_new(start_id, *start, *stop).map_err(Error::Interval)
            }
        }
    }
}

/// Looks up a contig, returning its identifier and length.
fn lookup(
    catalog: &ReferenceCatalog,
    contig: &str,
) -> Result<(crate::catalog::ReferenceId, usize)> {
    let id = catalog
        .lookup(contig)
        .ok_or_else(|| Error::UnknownReference(contig.to_string()))?;

    // SAFETY: the identifier was just produced by this catalog.
    let length = catalog.get(id).unwrap().length();

    Ok((id, length))
}

/// Checks that a 0-based position addresses a base of the reference.
fn check_bounds(contig: &str, position: usize, length: usize) -> Result<()> {
    if position >= length {
        return Err(Error::OutOfBounds {
            contig: contig.to_string(),
            position,
            length,
        });
    }

    Ok(())
}

/// Parses a non-negative position, treating overflow as a parse failure of
/// the whole region.
fn parse_position(digits: &str, region: &str) -> Result<usize> {
    digits
        .parse::<usize>()
        .map_err(|_| Error::Parse(region.to_string()))
}

impl FromStr for Region {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if let Some(groups) = CROSS_CONTIG.captures(s) {
            return Ok(Region::CrossContig {
                start_contig: groups[1].to_string(),
                start: parse_position(&groups[2], s)?,
                stop_contig: groups[4].to_string(),
                stop: parse_position(&groups[5], s)?,
                separator: Separator::from_capture(&groups[3]),
            });
        }

        if let Some(groups) = SPAN.captures(s) {
            return Ok(Region::Span {
                contig: groups[1].to_string(),
                start: parse_position(&groups[2], s)?,
                stop: parse_position(&groups[4], s)?,
                separator: Separator::from_capture(&groups[3]),
            });
        }

        if let Some(groups) = POSITION.captures(s) {
            return Ok(Region::Position {
                contig: groups[1].to_string(),
                position: parse_position(&groups[2], s)?,
            });
        }

        if CONTIG.is_match(s) {
            return Ok(Region::Contig {
                contig: s.to_string(),
            });
        }

        Err(Error::Parse(s.to_string()))
    }
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Region::Contig { contig } => write!(f, "{contig}"),
            Region::Position { contig, position } => write!(f, "{contig}:{position}"),
            Region::Span {
                contig,
                start,
                stop,
                separator,
            } => write!(f, "{contig}:{start}{}{stop}", separator.as_str()),
            Region::CrossContig {
                start_contig,
                start,
                stop_contig,
                stop,
                separator,
            } => write!(
                f,
                "{start_contig}:{start}{}{stop_contig}:{stop}",
                separator.as_str()
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_production() -> Result<()> {
        assert_eq!(
            "chr1".parse::<Region>()?,
            Region::Contig {
                contig: String::from("chr1")
            }
        );

        assert_eq!(
            "chr1:100".parse::<Region>()?,
            Region::Position {
                contig: String::from("chr1"),
                position: 100
            }
        );

        assert_eq!(
            "chr1:100-200".parse::<Region>()?,
            Region::Span {
                contig: String::from("chr1"),
                start: 100,
                stop: 200,
                separator: Separator::Dash
            }
        );

        assert_eq!(
            "chr1:100..200".parse::<Region>()?,
            Region::Span {
                contig: String::from("chr1"),
                start: 100,
                stop: 200,
                separator: Separator::Dots
            }
        );

        assert_eq!(
            "chr1:100..chr1:200".parse::<Region>()?,
            Region::CrossContig {
                start_contig: String::from("chr1"),
                start: 100,
                stop_contig: String::from("chr1"),
                stop: 200,
                separator: Separator::Dots
            }
        );

        Ok(())
    }

    #[test]
    fn round_trips_through_display() -> Result<()> {
        for value in ["chr1", "chr1:100", "chr1:100-200", "chr1:100..200"] {
            assert_eq!(value.parse::<Region>()?.to_string(), value);
        }

        Ok(())
    }

    #[test]
    fn contig_names_may_contain_dashes() -> Result<()> {
        let region = "HLA-A:5-10".parse::<Region>()?;
        assert_eq!(
            region,
            Region::Span {
                contig: String::from("HLA-A"),
                start: 5,
                stop: 10,
                separator: Separator::Dash
            }
        );

        Ok(())
    }

    #[test]
    fn rejects_values_outside_the_grammar() {
        for value in ["", "chr1:", "chr1:abc", "chr1:1-2-3", "chr 1"] {
            assert!(
                matches!(value.parse::<Region>(), Err(Error::Parse(_))),
                "value: {value:?}"
            );
        }
    }

    #[test]
    fn resolves_open_ended_regions_to_the_reference_end() -> Result<()> {
        let catalog = ReferenceCatalog::try_new([("chr1", 1000)]).unwrap();

        let interval = "chr1:950".parse::<Region>()?.resolve(&catalog)?;
        assert_eq!(interval.start(), 950);
        assert_eq!(interval.end(), 999);

        Ok(())
    }

    #[test]
    fn unknown_references_fail_resolution() {
        let catalog = ReferenceCatalog::try_new([("chr1", 1000)]).unwrap();
        let err = "chr2:1-2"
            .parse::<Region>()
            .unwrap()
            .resolve(&catalog)
            .unwrap_err();
        assert_eq!(err, Error::UnknownReference(String::from("chr2")));
    }

    #[test]
    fn positions_beyond_the_reference_fail_resolution() {
        let catalog = ReferenceCatalog::try_new([("chr1", 1000)]).unwrap();
        let err = "chr1:500-1000"
            .parse::<Region>()
            .unwrap()
            .resolve(&catalog)
            .unwrap_err();
        assert_eq!(
            err,
            Error::OutOfBounds {
                contig: String::from("chr1"),
                position: 1000,
                length: 1000
            }
        );
    }

    #[test]
    fn cross_contig_regions_must_stay_on_one_reference() {
        let catalog = ReferenceCatalog::try_new([("chr1", 1000), ("chr2", 1000)]).unwrap();

        let interval = "chr1:5..chr1:10"
            .parse::<Region>()
            .unwrap()
            .resolve(&catalog)
            .unwrap();
        assert_eq!(interval.len(), 6);

        let err = "chr1:5..chr2:10"
            .parse::<Region>()
            .unwrap()
            .resolve(&catalog)
            .unwrap_err();
        assert_eq!(
            err,
            Error::SpansMultipleReferences {
                start_contig: String::from("chr1"),
                stop_contig: String::from("chr2")
            }
        );
    }
}
