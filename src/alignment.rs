//! Alignment records and the contract for sources that deliver them.
//!
//! This crate deliberately knows nothing about alignment file formats. An
//! alignment is modeled as the minimal record the depth engines need: the
//! reference sequence it is mapped to, its leftmost mapped position, and its
//! [`Cigar`]. Streams of records are delivered through the
//! [`Source`](source::Source) contract.

use crate::alignment::cigar::Cigar;
use crate::catalog::ReferenceId;

pub mod cigar;
pub mod source;

/// An alignment record.
///
/// Records are read-only once constructed: the depth engines only ever
/// inspect them.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Record {
    /// The reference sequence the record is placed upon.
    reference_id: ReferenceId,

    /// The 0-based leftmost mapped position.
    position: usize,

    /// Whether the record is mapped. Unmapped records contribute nothing to
    /// any depth computation.
    mapped: bool,

    /// The CIGAR operations for the record.
    cigar: Cigar,
}

impl Record {
    /// Creates a new, mapped [`Record`].
    ///
    /// # Examples
    ///
    /// ```
    /// use genecov::alignment::Record;
    /// use genecov::catalog::ReferenceId;
    ///
    /// let record = Record::new(ReferenceId::new(0), 100, "50M".parse()?);
    ///
    /// assert!(record.mapped());
    /// assert_eq!(record.position(), 100);
    /// assert_eq!(record.end(), 150);
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn new(reference_id: ReferenceId, position: usize, cigar: Cigar) -> Self {
        Self {
            reference_id,
            position,
            mapped: true,
            cigar,
        }
    }

    /// Consumes `self` and marks the record as unmapped.
    pub fn unmapped(mut self) -> Self {
        self.mapped = false;
        self
    }

    /// Gets the reference sequence identifier.
    pub fn reference_id(&self) -> ReferenceId {
        self.reference_id
    }

    /// Gets the 0-based leftmost mapped position.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Returns whether the record is mapped.
    pub fn mapped(&self) -> bool {
        self.mapped
    }

    /// Gets the CIGAR operations.
    pub fn cigar(&self) -> &Cigar {
        &self.cigar
    }

    /// Gets the 0-based position immediately _after_ the last reference base
    /// the record covers.
    ///
    /// A record whose `end()` is less than or equal to some position `p` does
    /// not overlap `p`.
    pub fn end(&self) -> usize {
        self.position + self.cigar.reference_len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn end_accounts_for_reference_consuming_operations_only()
    -> Result<(), Box<dyn std::error::Error>> {
        let record = Record::new(ReferenceId::new(0), 10, "5M3I5M2D4N1M".parse()?);
        // 5M + 5M + 2D + 4N + 1M consume the reference; 3I does not.
        assert_eq!(record.end(), 10 + 17);
        Ok(())
    }

    #[test]
    fn unmapped_records_are_flagged() -> Result<(), Box<dyn std::error::Error>> {
        let record = Record::new(ReferenceId::new(0), 10, "5M".parse()?).unmapped();
        assert!(!record.mapped());
        Ok(())
    }
}
