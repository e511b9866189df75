//! The streaming pileup engine.

use tracing::trace;

use crate::alignment::Record;
use crate::alignment::cigar::Kind;
use crate::catalog::ReferenceId;
use crate::interval::GenomicInterval;
use crate::pileup::Column;
use crate::pileup::Piled;

////////////////////////////////////////////////////////////////////////////////////////
// Errors
////////////////////////////////////////////////////////////////////////////////////////

/// An error related to the pileup [`Engine`].
#[derive(Debug, Eq, PartialEq)]
pub enum Error {
    /// An alignment arrived out of coordinate sort order: either its position
    /// went backwards on the current reference, or its reference precedes the
    /// current reference in the catalog.
    OutOfOrder {
        /// The reference sequence of the offending alignment.
        reference_id: ReferenceId,

        /// The position of the offending alignment.
        position: usize,
    },

    /// An alignment was added after the engine was flushed.
    Closed,
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::OutOfOrder {
                reference_id,
                position,
            } => write!(
                f,
                "alignment at {reference_id}:{position} is not in coordinate sort order"
            ),
            Error::Closed => {
                write!(f, "alignment added to a pileup engine that has been flushed")
            }
        }
    }
}

impl std::error::Error for Error {}

/// A [`Result`](std::result::Result) with an [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

////////////////////////////////////////////////////////////////////////////////////////
// Engine
////////////////////////////////////////////////////////////////////////////////////////

/// The lifecycle of an [`Engine`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum State {
    /// No alignment has been added yet.
    Empty,

    /// Alignments are being consumed.
    Streaming,

    /// The active set is being drained.
    Flushing,

    /// The engine has been flushed and will accept no further alignments.
    Done,
}

/// A streaming pileup engine.
///
/// Alignments are added one at a time via [`Engine::add`] and must arrive
/// sorted by (reference, position) ascending. Whenever the incoming position
/// moves past the engine's cursor, a pileup column is computed for each
/// position in between, and its depth is emitted if the position falls within
/// the reporting window. [`Engine::flush`] drains whatever remains.
///
/// # Examples
///
/// ```
/// use genecov::alignment::Record;
/// use genecov::catalog::ReferenceId;
/// use genecov::interval::GenomicInterval;
/// use genecov::pileup::Engine;
///
/// let chr1 = ReferenceId::new(0);
/// let window = GenomicInterval::try_new(chr1, 0, 1000)?;
///
/// let mut engine = Engine::new(window);
/// engine.add(Record::new(chr1, 100, "10M".parse()?))?;
/// engine.add(Record::new(chr1, 105, "10M".parse()?))?;
/// engine.flush();
///
/// // Positions [100, 105) are covered once, [105, 110) twice, [110, 115) once.
/// let depths = engine.into_depths();
/// assert_eq!(depths, vec![1, 1, 1, 1, 1, 2, 2, 2, 2, 2, 1, 1, 1, 1, 1]);
///
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug)]
pub struct Engine {
    /// The lifecycle state.
    state: State,

    /// The reporting window: only positions inside it have their depths
    /// emitted. Bounds are inclusive on both sides.
    window: GenomicInterval,

    /// The reference sequence the cursor currently sits on.
    reference_id: Option<ReferenceId>,

    /// The position cursor.
    position: usize,

    /// The active alignments: every record whose span may still cover the
    /// cursor.
    active: Vec<Record>,

    /// The emitted depths, in positional order.
    depths: Vec<u32>,

    /// The emitted columns, retained only for a detailed engine.
    columns: Option<Vec<Column>>,
}

impl Engine {
    /// Creates a new [`Engine`] reporting depths for `window`.
    pub fn new(window: GenomicInterval) -> Self {
        Self {
            state: State::Empty,
            window,
            reference_id: None,
            position: 0,
            active: Vec::new(),
            depths: Vec::new(),
            columns: None,
        }
    }

    /// Creates a new [`Engine`] that additionally retains every emitted
    /// [`Column`], making the per-base detail available via
    /// [`Engine::columns`].
    pub fn detailed(window: GenomicInterval) -> Self {
        let mut engine = Self::new(window);
        engine.columns = Some(Vec::new());
        engine
    }

    /// Adds an alignment to the pileup.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::OutOfOrder`] when the record violates coordinate
    /// sort order, and with [`Error::Closed`] when the engine has already
    /// been flushed. Both are fatal: the engine is not left in a resumable
    /// state.
    pub fn add(&mut self, record: Record) -> Result<()> {
        match self.state {
            State::Empty => {
                self.reference_id = Some(record.reference_id());
                self.position = record.position();
                self.active.push(record);
                self.state = State::Streaming;
                return Ok(());
            }
            State::Streaming => {}
            State::Flushing | State::Done => return Err(Error::Closed),
        }

        // SAFETY: the reference is always set when the state is `Streaming`.
        let current = self.reference_id.unwrap();

        if record.reference_id() == current {
            if record.position() == self.position {
                self.active.push(record);
            } else if record.position() < self.position {
                return Err(Error::OutOfOrder {
                    reference_id: record.reference_id(),
                    position: record.position(),
                });
            } else {
                // Catch up to the incoming record, emitting one column per
                // position in between (including zero-depth columns for any
                // gap not covered by the active set).
                while record.position() > self.position {
                    self.advance();
                }

                self.active.push(record);
            }
        } else if record.reference_id() < current {
            return Err(Error::OutOfOrder {
                reference_id: record.reference_id(),
                position: record.position(),
            });
        } else {
            // Moving to a later reference: drain the previous reference to
            // completion, then restart the cursor on the new one.
            trace!(
                from = %current,
                to = %record.reference_id(),
                "reference transition"
            );

            self.drain();

            self.reference_id = Some(record.reference_id());
            self.position = record.position();
            self.active.push(record);
        }

        Ok(())
    }

    /// Drains the remaining active alignments, emitting a column for every
    /// position up until the active set empties out.
    ///
    /// After flushing, the engine accepts no further alignments.
    pub fn flush(&mut self) {
        self.state = State::Flushing;
        self.drain();
        self.state = State::Done;

        trace!(depths = self.depths.len(), "engine flushed");
    }

    /// Emits a column per position until the active set empties out.
    ///
    /// Alignments that no longer reach the cursor are pruned first so that no
    /// column is emitted past the last covered base.
    fn drain(&mut self) {
        loop {
            let position = self.position;
            self.active.retain(|record| record.end() > position);

            if self.active.is_empty() {
                break;
            }

            self.advance();
        }
    }

    /// Gets the emitted depths so far.
    pub fn depths(&self) -> &[u32] {
        &self.depths
    }

    /// Consumes the engine and returns the emitted depths.
    pub fn into_depths(self) -> Vec<u32> {
        self.depths
    }

    /// Gets the emitted columns.
    ///
    /// Returns [`None`] unless the engine was created with
    /// [`Engine::detailed`].
    pub fn columns(&self) -> Option<&[Column]> {
        self.columns.as_deref()
    }

    /// Computes the pileup column at the cursor, emits its depth if the
    /// cursor falls within the reporting window, and moves the cursor one
    /// position forward.
    fn advance(&mut self) {
        // Drop alignments that end at or before the cursor. An alignment's
        // end is the position just past its last covered base, so `end ==
        // cursor` means it no longer overlaps.
        let position = self.position;
        self.active.retain(|record| record.end() > position);

        // SAFETY: `advance` is only reachable once at least one alignment has
        // been added, which sets the reference.
        let reference_id = self.reference_id.unwrap();

        let entries = self
            .active
            .iter()
            .filter_map(|record| pile(record, position))
            .collect::<Vec<_>>();

        let column = Column::new(reference_id, position, entries);

        if self.window.contains(reference_id, position) {
            self.depths.push(column.depth());
        }

        if let Some(columns) = self.columns.as_mut() {
            columns.push(column);
        }

        self.position += 1;
    }
}

/// Computes the per-base detail for one alignment at the cursor.
///
/// Returns [`None`] when the alignment contributes nothing at this position:
/// it is unmapped, or the operation spanning the cursor is a reference skip.
fn pile(record: &Record, cursor: usize) -> Option<Piled> {
    if !record.mapped() {
        return None;
    }

    let ops = record.cigar().ops();

    let mut genome = record.position();
    let mut in_alignment = 0usize;
    let mut new_segment = true;
    let mut save = true;
    let mut piled = Piled::new();

    for (i, op) in ops.iter().enumerate() {
        match op.kind() {
            Kind::Match => {
                if genome + op.len() > cursor {
                    piled.is_deletion = false;
                    piled.is_next_deletion = false;
                    piled.is_next_insertion = false;
                    piled.position_in_alignment = Some(in_alignment + (cursor - genome));

                    if genome == cursor && new_segment {
                        piled.is_segment_begin = true;
                    }

                    // The cursor sits on the last base of this match, so peek
                    // at what follows to fill in the indel and segment flags.
                    if genome + op.len() - 1 == cursor {
                        if i < ops.len() - 1 {
                            let next = &ops[i + 1];

                            match next.kind() {
                                Kind::Deletion => {
                                    piled.is_next_deletion = true;
                                    piled.deletion_len = next.len();
                                }
                                Kind::Insertion => {
                                    piled.is_next_insertion = true;
                                    piled.insertion_len = next.len();
                                }
                                _ => {}
                            }

                            if matches!(next.kind(), Kind::Deletion | Kind::Insertion) {
                                if i < ops.len() - 2 {
                                    if matches!(
                                        ops[i + 2].kind(),
                                        Kind::SoftClip | Kind::RefSkip | Kind::HardClip
                                    ) {
                                        piled.is_segment_end = true;
                                    }
                                } else {
                                    piled.is_segment_end = true;
                                }
                            } else if matches!(
                                next.kind(),
                                Kind::SoftClip | Kind::RefSkip | Kind::HardClip
                            ) {
                                piled.is_segment_end = true;
                            }
                        } else {
                            piled.is_segment_end = true;
                        }
                    }
                }

                genome += op.len();
                in_alignment += op.len();
            }
            Kind::Deletion => {
                if genome + op.len() > cursor {
                    piled.is_deletion = true;
                    piled.is_next_deletion = false;
                    piled.is_next_insertion = true;
                    piled.position_in_alignment = Some(in_alignment + (cursor - genome));
                }

                genome += op.len();
            }
            Kind::RefSkip => {
                genome += op.len();
            }
            Kind::Insertion | Kind::SoftClip => {
                in_alignment += op.len();
            }
            Kind::HardClip => {}
        }

        new_segment = matches!(op.kind(), Kind::RefSkip | Kind::SoftClip | Kind::HardClip);

        if genome > cursor {
            if op.kind() == Kind::RefSkip {
                save = false;
            }

            break;
        }
    }

    save.then_some(piled)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(reference: usize, position: usize, cigar: &str) -> Record {
        Record::new(ReferenceId::new(reference), position, cigar.parse().unwrap())
    }

    fn window(reference: usize, start: usize, end: usize) -> GenomicInterval {
        GenomicInterval::try_new(ReferenceId::new(reference), start, end).unwrap()
    }

    #[test]
    fn a_single_alignment_emits_one_depth_per_covered_base() {
        let mut engine = Engine::new(window(0, 0, 1000));
        engine.add(record(0, 100, "50M")).unwrap();
        engine.flush();

        let depths = engine.into_depths();
        assert_eq!(depths.len(), 50);
        assert!(depths.iter().all(|&depth| depth == 1));
    }

    #[test]
    fn out_of_order_positions_are_fatal() {
        let mut engine = Engine::new(window(0, 0, 1000));
        engine.add(record(0, 10, "5M")).unwrap();

        let err = engine.add(record(0, 5, "5M")).unwrap_err();
        assert_eq!(
            err,
            Error::OutOfOrder {
                reference_id: ReferenceId::new(0),
                position: 5
            }
        );
        assert_eq!(
            err.to_string(),
            "alignment at 0:5 is not in coordinate sort order"
        );
    }

    #[test]
    fn out_of_order_references_are_fatal() {
        let mut engine = Engine::new(window(0, 0, 1000));
        engine.add(record(1, 10, "5M")).unwrap();

        assert!(matches!(
            engine.add(record(0, 10, "5M")),
            Err(Error::OutOfOrder { .. })
        ));
    }

    #[test]
    fn adding_after_flush_is_fatal() {
        let mut engine = Engine::new(window(0, 0, 1000));
        engine.add(record(0, 10, "5M")).unwrap();
        engine.flush();

        assert_eq!(engine.add(record(0, 20, "5M")), Err(Error::Closed));
    }

    #[test]
    fn gaps_between_alignments_emit_zero_depth() {
        let mut engine = Engine::new(window(0, 0, 1000));
        engine.add(record(0, 0, "5M")).unwrap();
        engine.add(record(0, 8, "2M")).unwrap();
        engine.flush();

        assert_eq!(engine.into_depths(), vec![1, 1, 1, 1, 1, 0, 0, 0, 1, 1]);
    }

    #[test]
    fn depths_outside_the_window_are_not_emitted() {
        let mut engine = Engine::new(window(0, 102, 103));
        engine.add(record(0, 100, "10M")).unwrap();
        engine.flush();

        assert_eq!(engine.into_depths(), vec![1, 1]);
    }

    #[test]
    fn overlapping_alignments_stack() {
        let mut engine = Engine::new(window(0, 0, 1000));
        engine.add(record(0, 0, "4M")).unwrap();
        engine.add(record(0, 2, "4M")).unwrap();
        engine.flush();

        assert_eq!(engine.into_depths(), vec![1, 1, 2, 2, 1, 1]);
    }

    #[test]
    fn moving_to_a_later_reference_drains_the_previous_one() {
        let mut engine = Engine::new(window(1, 0, 1000));
        engine.add(record(0, 0, "5M")).unwrap();
        engine.add(record(1, 10, "5M")).unwrap();
        engine.flush();

        // Only the second reference is inside the window.
        assert_eq!(engine.into_depths(), vec![1, 1, 1, 1, 1]);
    }

    #[test]
    fn unmapped_alignments_contribute_nothing() {
        let mut engine = Engine::new(window(0, 0, 1000));
        engine
            .add(Record::new(ReferenceId::new(0), 0, "5M".parse().unwrap()).unmapped())
            .unwrap();
        engine.add(record(0, 2, "3M")).unwrap();
        engine.flush();

        assert_eq!(engine.into_depths(), vec![0, 0, 1, 1, 1]);
    }

    #[test]
    fn a_deletion_is_counted_as_covering() {
        let mut engine = Engine::detailed(window(0, 0, 1000));
        engine.add(record(0, 0, "2M3D2M")).unwrap();
        engine.flush();

        assert_eq!(engine.depths(), [1, 1, 1, 1, 1, 1, 1]);

        let columns = engine.columns().unwrap();
        assert!(!columns[1].entries()[0].is_deletion());
        assert!(columns[2].entries()[0].is_deletion());
        assert!(columns[4].entries()[0].is_deletion());
        assert!(!columns[5].entries()[0].is_deletion());
    }

    #[test]
    fn a_reference_skip_is_not_counted() {
        let mut engine = Engine::new(window(0, 0, 1000));
        engine.add(record(0, 0, "2M3N2M")).unwrap();
        engine.flush();

        assert_eq!(engine.into_depths(), vec![1, 1, 0, 0, 0, 1, 1]);
    }

    #[test]
    fn per_base_detail_reports_position_and_boundaries() {
        let mut engine = Engine::detailed(window(0, 0, 1000));
        engine.add(record(0, 0, "2S3M1I2M")).unwrap();
        engine.flush();

        let columns = engine.columns().unwrap();
        assert_eq!(columns.len(), 5);

        // First column: first matched base, after the soft clip.
        let first = &columns[0].entries()[0];
        assert!(first.is_segment_begin());
        assert_eq!(first.position_in_alignment(), Some(2));

        // Third column: last base of the first match, insertion up next.
        let third = &columns[2].entries()[0];
        assert!(third.is_next_insertion());
        assert_eq!(third.insertion_len(), 1);
        assert_eq!(third.position_in_alignment(), Some(4));

        // Final column: last base of the read.
        let last = &columns[4].entries()[0];
        assert!(last.is_segment_end());
        assert_eq!(last.position_in_alignment(), Some(7));
    }

    #[test]
    fn an_upcoming_deletion_is_flagged_with_its_length() {
        let mut engine = Engine::detailed(window(0, 0, 1000));
        engine.add(record(0, 0, "2M3D2M")).unwrap();
        engine.flush();

        let columns = engine.columns().unwrap();
        let before_deletion = &columns[1].entries()[0];
        assert!(before_deletion.is_next_deletion());
        assert_eq!(before_deletion.deletion_len(), 3);
    }
}
