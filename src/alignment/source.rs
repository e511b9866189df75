//! The contract for sources of position-ordered alignment records.

use std::io;

use crate::alignment::Record;
use crate::interval::GenomicInterval;

/// A source of alignment records.
///
/// This is the seam between this crate and whatever actually owns the
/// alignment data (an indexed alignment file, a network stream, an in-memory
/// fixture). Implementations are expected to deliver records for one interval
/// at a time, sorted by (reference, position) ascending; the pileup engine
/// verifies that invariant and fails the run when it is violated.
pub trait Source {
    /// Returns whether the source can seek to arbitrary genomic intervals.
    fn has_index(&self) -> bool;

    /// Positions the source at the start of the given interval.
    ///
    /// Returns `false` when the interval cannot be addressed by this source.
    /// Subsequent calls to [`Source::next_record`] must yield only records
    /// overlapping the interval, in genomic order.
    fn seek(&mut self, interval: &GenomicInterval) -> io::Result<bool>;

    /// Reads the next alignment record, or [`None`] at end of stream.
    fn next_record(&mut self) -> io::Result<Option<Record>>;
}

/// An in-memory [`Source`] backed by a vector of records.
///
/// Primarily useful for tests and for callers that have already materialized
/// their alignments. Records are expected to be stored in coordinate order;
/// [`Records::seek`] performs a linear scan for overlapping records.
///
/// # Examples
///
/// ```
/// use genecov::alignment::Record;
/// use genecov::alignment::source::Records;
/// use genecov::alignment::source::Source as _;
/// use genecov::catalog::ReferenceId;
/// use genecov::interval::GenomicInterval;
///
/// let chr1 = ReferenceId::new(0);
/// let mut source = Records::new(vec![
///     Record::new(chr1, 100, "50M".parse()?),
///     Record::new(chr1, 300, "50M".parse()?),
/// ]);
///
/// let interval = GenomicInterval::try_new(chr1, 0, 199)?;
/// assert!(source.seek(&interval)?);
///
/// let record = source.next_record()?.unwrap();
/// assert_eq!(record.position(), 100);
/// assert!(source.next_record()?.is_none());
///
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone, Debug)]
pub struct Records {
    /// The backing records, in coordinate order.
    records: Vec<Record>,

    /// The interval records are currently being delivered for.
    window: Option<GenomicInterval>,

    /// The index of the next record to consider.
    cursor: usize,
}

impl Records {
    /// Creates a new in-memory source.
    pub fn new(records: Vec<Record>) -> Self {
        Self {
            records,
            window: None,
            cursor: 0,
        }
    }

    /// Returns whether `record` overlaps `interval`.
    fn overlaps(record: &Record, interval: &GenomicInterval) -> bool {
        record.reference_id() == interval.reference_id()
            && record.position() <= interval.end()
            && record.end() > interval.start()
    }
}

impl Source for Records {
    fn has_index(&self) -> bool {
        true
    }

    fn seek(&mut self, interval: &GenomicInterval) -> io::Result<bool> {
        self.window = Some(interval.clone());
        self.cursor = 0;
        Ok(true)
    }

    fn next_record(&mut self) -> io::Result<Option<Record>> {
        let window = match self.window.as_ref() {
            Some(window) => window,
            None => return Ok(None),
        };

        while self.cursor < self.records.len() {
            let record = &self.records[self.cursor];
            self.cursor += 1;

            if Self::overlaps(record, window) {
                return Ok(Some(record.clone()));
            }
        }

        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ReferenceId;

    #[test]
    fn seek_resets_the_cursor() -> Result<(), Box<dyn std::error::Error>> {
        let chr1 = ReferenceId::new(0);
        let mut source = Records::new(vec![
            Record::new(chr1, 10, "10M".parse()?),
            Record::new(chr1, 50, "10M".parse()?),
        ]);

        let interval = GenomicInterval::try_new(chr1, 0, 100)?;
        assert!(source.seek(&interval)?);
        assert_eq!(source.next_record()?.unwrap().position(), 10);
        assert_eq!(source.next_record()?.unwrap().position(), 50);
        assert!(source.next_record()?.is_none());

        // Seeking again replays from the top.
        assert!(source.seek(&interval)?);
        assert_eq!(source.next_record()?.unwrap().position(), 10);

        Ok(())
    }

    #[test]
    fn records_on_other_references_are_skipped() -> Result<(), Box<dyn std::error::Error>> {
        let chr1 = ReferenceId::new(0);
        let chr2 = ReferenceId::new(1);

        let mut source = Records::new(vec![
            Record::new(chr1, 10, "10M".parse()?),
            Record::new(chr2, 10, "10M".parse()?),
        ]);

        let interval = GenomicInterval::try_new(chr2, 0, 100)?;
        source.seek(&interval)?;

        let record = source.next_record()?.unwrap();
        assert_eq!(record.reference_id(), chr2);
        assert!(source.next_record()?.is_none());

        Ok(())
    }

    #[test]
    fn a_read_abutting_the_window_start_still_overlaps() -> Result<(), Box<dyn std::error::Error>>
    {
        let chr1 = ReferenceId::new(0);
        let mut source = Records::new(vec![Record::new(chr1, 90, "10M".parse()?)]);

        // Covers [90, 100): does not overlap [100, 200).
        let interval = GenomicInterval::try_new(chr1, 100, 199)?;
        source.seek(&interval)?;
        assert!(source.next_record()?.is_none());

        // But does overlap [99, 199].
        let interval = GenomicInterval::try_new(chr1, 99, 199)?;
        source.seek(&interval)?;
        assert!(source.next_record()?.is_some());

        Ok(())
    }
}
