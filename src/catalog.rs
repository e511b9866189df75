//! A catalog of the reference sequences that alignments may be placed upon.
//!
//! Every alignment record and genomic interval refers to its reference
//! sequence by a [`ReferenceId`], which is an index into a
//! [`ReferenceCatalog`]. The catalog is built once, up front, from the ordered
//! list of reference sequence names and lengths (for alignment files, this
//! corresponds to the order of the sequence dictionary).

use std::collections::HashMap;

/// An error related to a [`ReferenceCatalog`].
#[derive(Debug, Eq, PartialEq)]
pub enum Error {
    /// A reference sequence name occurred more than once.
    DuplicateReference(String),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::DuplicateReference(name) => {
                write!(f, "duplicate reference sequence name: {name}")
            }
        }
    }
}

impl std::error::Error for Error {}

/// An identifier for a reference sequence within a [`ReferenceCatalog`].
///
/// Identifiers are ordered by their position in the catalog. This ordering is
/// what the coordinate sort-order check in the pileup engine is defined over.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ReferenceId(usize);

impl ReferenceId {
    /// Creates a new [`ReferenceId`] from a raw index.
    ///
    /// # Examples
    ///
    /// ```
    /// use genecov::catalog::ReferenceId;
    ///
    /// let id = ReferenceId::new(0);
    /// assert_eq!(id.inner(), 0);
    /// ```
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    /// Gets the inner index.
    pub fn inner(&self) -> usize {
        self.0
    }
}

impl std::fmt::Display for ReferenceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single reference sequence: a name paired with a length in bases.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ReferenceSequence {
    /// The name of the reference sequence (e.g., `"chr1"`).
    name: String,

    /// The length of the reference sequence in bases.
    length: usize,
}

impl ReferenceSequence {
    /// Gets the name of the reference sequence.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Gets the length of the reference sequence in bases.
    pub fn length(&self) -> usize {
        self.length
    }
}

/// A catalog of reference sequences.
#[derive(Clone, Debug, Default)]
pub struct ReferenceCatalog {
    /// The reference sequences, in catalog order.
    sequences: Vec<ReferenceSequence>,

    /// A lookup from reference sequence name to its [`ReferenceId`].
    indices: HashMap<String, ReferenceId>,
}

impl ReferenceCatalog {
    /// Attempts to create a new [`ReferenceCatalog`] from an ordered set of
    /// names and lengths.
    ///
    /// # Examples
    ///
    /// ```
    /// use genecov::catalog::ReferenceCatalog;
    ///
    /// let catalog = ReferenceCatalog::try_new([("chr1", 1000), ("chr2", 500)])?;
    /// assert_eq!(catalog.len(), 2);
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn try_new<S, I>(sequences: I) -> Result<Self, Error>
    where
        S: Into<String>,
        I: IntoIterator<Item = (S, usize)>,
    {
        let mut catalog = Self::default();

        for (name, length) in sequences {
            let name = name.into();
            let id = ReferenceId::new(catalog.sequences.len());

            if catalog.indices.insert(name.clone(), id).is_some() {
                return Err(Error::DuplicateReference(name));
            }

            catalog.sequences.push(ReferenceSequence { name, length });
        }

        Ok(catalog)
    }

    /// Looks up a reference sequence by name.
    ///
    /// # Examples
    ///
    /// ```
    /// use genecov::catalog::ReferenceCatalog;
    ///
    /// let catalog = ReferenceCatalog::try_new([("chr1", 1000)])?;
    ///
    /// assert!(catalog.lookup("chr1").is_some());
    /// assert!(catalog.lookup("chr20").is_none());
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn lookup(&self, name: &str) -> Option<ReferenceId> {
        self.indices.get(name).copied()
    }

    /// Gets a reference sequence by its identifier.
    pub fn get(&self, id: ReferenceId) -> Option<&ReferenceSequence> {
        self.sequences.get(id.inner())
    }

    /// Gets the number of reference sequences in the catalog.
    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    /// Returns whether the catalog contains no reference sequences.
    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }

    /// Returns an iterator over the reference sequences in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = &ReferenceSequence> {
        self.sequences.iter()
    }
}
