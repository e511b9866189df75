//! A 0-based genomic interval that is inclusive of both of its bounds.
//!
//! ```text
//! ================ chr1 ===============
//!
//! | 0 | 1 | 2 | 3 | 4 | 5 | 6 | 7 | 8 |
//! -------------------------------------
//! |   |   | X | X | X | X | X |   |   |  <= interval [2, 6]
//! ```
//!
//! The interval above covers five bases: positions two through six. Depth is
//! reported for every base the interval covers, so the number of depth samples
//! produced for an interval is exactly [`GenomicInterval::len`].

use crate::catalog::ReferenceId;

/// An error related to a [`GenomicInterval`].
#[derive(Debug, Eq, PartialEq)]
pub enum Error {
    /// The start position was greater than the end position.
    StartGreaterThanEnd {
        /// The offending start position.
        start: usize,

        /// The offending end position.
        end: usize,
    },
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::StartGreaterThanEnd { start, end } => {
                write!(
                    f,
                    "start position ({start}) cannot be greater than end position ({end})"
                )
            }
        }
    }
}

impl std::error::Error for Error {}

/// A 0-based genomic interval, inclusive of both bounds.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GenomicInterval {
    /// The reference sequence the interval sits on.
    reference_id: ReferenceId,

    /// The 0-based position of the first covered base.
    start: usize,

    /// The 0-based position of the last covered base.
    end: usize,
}

impl GenomicInterval {
    /// Attempts to create a new [`GenomicInterval`].
    ///
    /// # Examples
    ///
    /// ```
    /// use genecov::catalog::ReferenceId;
    /// use genecov::interval::GenomicInterval;
    ///
    /// let interval = GenomicInterval::try_new(ReferenceId::new(0), 100, 199)?;
    /// assert_eq!(interval.len(), 100);
    ///
    /// assert!(GenomicInterval::try_new(ReferenceId::new(0), 200, 100).is_err());
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn try_new(reference_id: ReferenceId, start: usize, end: usize) -> Result<Self, Error> {
        if start > end {
            return Err(Error::StartGreaterThanEnd { start, end });
        }

        Ok(Self {
            reference_id,
            start,
            end,
        })
    }

    /// Gets the reference sequence identifier.
    pub fn reference_id(&self) -> ReferenceId {
        self.reference_id
    }

    /// Gets the 0-based position of the first covered base.
    pub fn start(&self) -> usize {
        self.start
    }

    /// Gets the 0-based position of the last covered base.
    pub fn end(&self) -> usize {
        self.end
    }

    /// Gets the number of bases the interval covers.
    ///
    /// This can never be zero: a [`GenomicInterval`] covers at least one base.
    pub fn len(&self) -> usize {
        self.end - self.start + 1
    }

    /// Returns whether `position` falls within the interval on the given
    /// reference sequence.
    ///
    /// # Examples
    ///
    /// ```
    /// use genecov::catalog::ReferenceId;
    /// use genecov::interval::GenomicInterval;
    ///
    /// let interval = GenomicInterval::try_new(ReferenceId::new(0), 100, 199)?;
    ///
    /// assert!(interval.contains(ReferenceId::new(0), 100));
    /// assert!(interval.contains(ReferenceId::new(0), 199));
    /// assert!(!interval.contains(ReferenceId::new(0), 200));
    /// assert!(!interval.contains(ReferenceId::new(1), 100));
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn contains(&self, reference_id: ReferenceId, position: usize) -> bool {
        reference_id == self.reference_id && position >= self.start && position <= self.end
    }
}

impl std::fmt::Display for GenomicInterval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}-{}", self.reference_id, self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_base_interval_has_length_one() -> Result<(), Box<dyn std::error::Error>> {
        let interval = GenomicInterval::try_new(ReferenceId::new(0), 42, 42)?;
        assert_eq!(interval.len(), 1);
        assert!(interval.contains(ReferenceId::new(0), 42));
        Ok(())
    }

    #[test]
    fn inverted_bounds_are_rejected() {
        let err = GenomicInterval::try_new(ReferenceId::new(0), 10, 9).unwrap_err();
        assert_eq!(
            err.to_string(),
            "start position (10) cannot be greater than end position (9)"
        );
    }
}
