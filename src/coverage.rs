//! Per-base depth accumulation over a fixed genomic window.
//!
//! A [`DepthBuffer`] holds one depth counter per base of a
//! [`GenomicInterval`]. Recording an alignment walks its CIGAR operations and
//! applies depth deltas relative to the window:
//!
//! - matches and deletions increment the counters they span (a deletion still
//!   covers the reference under this crate's convention);
//! - soft clips, hard clips, and reference skips advance along the reference
//!   without touching any counter;
//! - insertions neither advance nor touch a counter.
//!
//! Alignments may overhang the window on either side; the out-of-window
//! portions are silently skipped.
//!
//! # Examples
//!
//! ```
//! use genecov::alignment::Record;
//! use genecov::catalog::ReferenceId;
//! use genecov::coverage::DepthBuffer;
//! use genecov::interval::GenomicInterval;
//!
//! let chr1 = ReferenceId::new(0);
//! let window = GenomicInterval::try_new(chr1, 100, 109)?;
//!
//! let mut buffer = DepthBuffer::new(&window);
//! buffer.record(&Record::new(chr1, 95, "10M".parse()?));
//!
//! // The read covers [95, 105): the first five bases of the window.
//! assert_eq!(buffer.as_slice(), [1, 1, 1, 1, 1, 0, 0, 0, 0, 0]);
//!
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use crate::alignment::Record;
use crate::alignment::cigar::Kind;
use crate::interval::GenomicInterval;

/// A window-relative buffer of per-base depths.
///
/// The buffer is built for exactly one interval, mutated while alignments are
/// recorded against it, and then consumed into its depth samples.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DepthBuffer {
    /// The 0-based genomic position of the first base in the window.
    window_start: usize,

    /// One depth counter per base in the window.
    depths: Vec<u32>,
}

impl DepthBuffer {
    /// Creates a new [`DepthBuffer`] covering `interval`, with every depth
    /// initialized to zero.
    pub fn new(interval: &GenomicInterval) -> Self {
        Self {
            window_start: interval.start(),
            depths: vec![0; interval.len()],
        }
    }

    /// Records one alignment into the buffer by walking its CIGAR operations.
    ///
    /// Unmapped records are ignored. Portions of the alignment that fall
    /// outside the window are skipped without error.
    pub fn record(&mut self, record: &Record) {
        if !record.mapped() {
            return;
        }

        // Offsets are tracked as signed values: an alignment may begin before
        // the window and only enter it partway through its operations.
        let mut offset = record.position() as i64 - self.window_start as i64;

        for op in record.cigar().ops() {
            match op.kind() {
                Kind::Match | Kind::Deletion => {
                    self.increment(offset, op.len());
                    offset += op.len() as i64;
                }
                Kind::SoftClip | Kind::HardClip | Kind::RefSkip => {
                    offset += op.len() as i64;
                }
                Kind::Insertion => {}
            }
        }
    }

    /// Increments the `len` counters starting at `offset`, skipping indices
    /// that fall outside the window.
    fn increment(&mut self, offset: i64, len: usize) {
        for i in offset..offset + len as i64 {
            if i >= 0 {
                if let Some(depth) = self.depths.get_mut(i as usize) {
                    *depth += 1;
                }
            }
        }
    }

    /// Gets the per-base depths as a slice.
    pub fn as_slice(&self) -> &[u32] {
        &self.depths
    }

    /// Gets the number of bases in the window.
    pub fn len(&self) -> usize {
        self.depths.len()
    }

    /// Returns whether the window covers no bases.
    pub fn is_empty(&self) -> bool {
        self.depths.is_empty()
    }

    /// Consumes the buffer and returns the depth samples.
    pub fn into_samples(self) -> Vec<u32> {
        self.depths
    }
}
