//! A streaming pileup engine.
//!
//! The [`Engine`](engine::Engine) consumes alignment records sorted by
//! (reference, position) and, for every genomic position it advances past,
//! produces a pileup [`Column`]: the set of alignments covering that base,
//! each annotated with per-base detail. The per-position depth is the number
//! of entries in the column.
//!
//! Most callers only need the aggregate depths (see
//! [`Engine::into_depths`](engine::Engine::into_depths)); the per-base detail
//! is retained only when the engine is constructed with
//! [`Engine::detailed`](engine::Engine::detailed).

use crate::catalog::ReferenceId;

pub mod engine;

pub use engine::Engine;

/// Per-base detail for a single alignment at the pileup cursor.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Piled {
    /// The 0-based offset of the current base within the read, or [`None`]
    /// when the cursor was never reached by a reference-covering operation.
    position_in_alignment: Option<usize>,

    /// Whether the current base falls inside a deletion.
    is_deletion: bool,

    /// Whether the operation immediately following the current base is a
    /// deletion.
    is_next_deletion: bool,

    /// Whether the operation immediately following the current base is an
    /// insertion. Also set while the current base is inside a deletion.
    is_next_insertion: bool,

    /// The length of the upcoming deletion, if any.
    deletion_len: usize,

    /// The length of the upcoming insertion, if any.
    insertion_len: usize,

    /// Whether the current base begins a read segment.
    is_segment_begin: bool,

    /// Whether the current base ends a read segment.
    is_segment_end: bool,
}

impl Piled {
    /// Creates the detail for an alignment that has not yet been matched
    /// against the cursor.
    pub(crate) fn new() -> Self {
        Self {
            position_in_alignment: None,
            is_deletion: false,
            is_next_deletion: false,
            is_next_insertion: false,
            deletion_len: 0,
            insertion_len: 0,
            is_segment_begin: false,
            is_segment_end: false,
        }
    }

    /// Gets the 0-based offset of the current base within the read.
    pub fn position_in_alignment(&self) -> Option<usize> {
        self.position_in_alignment
    }

    /// Returns whether the current base falls inside a deletion.
    pub fn is_deletion(&self) -> bool {
        self.is_deletion
    }

    /// Returns whether the operation following the current base is a deletion.
    pub fn is_next_deletion(&self) -> bool {
        self.is_next_deletion
    }

    /// Returns whether the operation following the current base is an
    /// insertion.
    pub fn is_next_insertion(&self) -> bool {
        self.is_next_insertion
    }

    /// Gets the length of the upcoming deletion (zero when there is none).
    pub fn deletion_len(&self) -> usize {
        self.deletion_len
    }

    /// Gets the length of the upcoming insertion (zero when there is none).
    pub fn insertion_len(&self) -> usize {
        self.insertion_len
    }

    /// Returns whether the current base begins a read segment.
    pub fn is_segment_begin(&self) -> bool {
        self.is_segment_begin
    }

    /// Returns whether the current base ends a read segment.
    pub fn is_segment_end(&self) -> bool {
        self.is_segment_end
    }
}

/// A pileup column: everything known about a single reference base.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Column {
    /// The reference sequence the column sits on.
    reference_id: ReferenceId,

    /// The 0-based position of the column.
    position: usize,

    /// The per-alignment detail for every alignment covering the base.
    entries: Vec<Piled>,
}

impl Column {
    /// Creates a new [`Column`].
    pub(crate) fn new(reference_id: ReferenceId, position: usize, entries: Vec<Piled>) -> Self {
        Self {
            reference_id,
            position,
            entries,
        }
    }

    /// Gets the reference sequence identifier.
    pub fn reference_id(&self) -> ReferenceId {
        self.reference_id
    }

    /// Gets the 0-based position of the column.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Gets the per-alignment entries.
    pub fn entries(&self) -> &[Piled] {
        &self.entries
    }

    /// Gets the depth at this column: the number of alignments covering the
    /// base.
    pub fn depth(&self) -> u32 {
        self.entries.len() as u32
    }
}
