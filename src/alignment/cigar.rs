//! CIGAR strings: run-length encodings of how an aligned read's bases
//! correspond to the reference sequence.

use std::str::FromStr;

////////////////////////////////////////////////////////////////////////////////////////
// Errors
////////////////////////////////////////////////////////////////////////////////////////

/// An error related to the parsing of a [`Cigar`].
#[derive(Debug, Eq, PartialEq)]
pub enum ParseError {
    /// An operation character that is not part of the supported alphabet.
    InvalidKind(char),

    /// An operation with no preceding length (e.g., `"M"` or `"10MD"`).
    MissingLength(char),

    /// A trailing run of digits with no operation character (e.g., `"10M2"`).
    MissingKind(String),

    /// A run length that does not fit in a [`usize`].
    InvalidLength(String),
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::InvalidKind(c) => write!(f, "invalid operation kind: {c}"),
            ParseError::MissingLength(c) => {
                write!(f, "operation {c} is missing a preceding length")
            }
            ParseError::MissingKind(digits) => {
                write!(f, "length {digits} is missing an operation kind")
            }
            ParseError::InvalidLength(digits) => {
                write!(f, "invalid operation length: {digits}")
            }
        }
    }
}

impl std::error::Error for ParseError {}

////////////////////////////////////////////////////////////////////////////////////////
// Operations
////////////////////////////////////////////////////////////////////////////////////////

/// A kind of CIGAR operation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Kind {
    /// An alignment match (`M`): consumes both the read and the reference.
    Match,

    /// An insertion to the reference (`I`): consumes the read only.
    Insertion,

    /// A deletion from the reference (`D`): consumes the reference only.
    Deletion,

    /// A soft clip (`S`): clipped read bases present in the record.
    SoftClip,

    /// A hard clip (`H`): clipped read bases absent from the record.
    HardClip,

    /// A skipped region of the reference (`N`), e.g. an intron.
    RefSkip,
}

impl Kind {
    /// Returns whether the operation consumes bases of the reference sequence.
    ///
    /// # Examples
    ///
    /// ```
    /// use genecov::alignment::cigar::Kind;
    ///
    /// assert!(Kind::Match.consumes_reference());
    /// assert!(Kind::Deletion.consumes_reference());
    /// assert!(Kind::RefSkip.consumes_reference());
    /// assert!(!Kind::Insertion.consumes_reference());
    /// assert!(!Kind::SoftClip.consumes_reference());
    /// ```
    pub fn consumes_reference(&self) -> bool {
        matches!(self, Kind::Match | Kind::Deletion | Kind::RefSkip)
    }

    /// Gets the character used to represent the operation kind.
    pub fn as_char(&self) -> char {
        match self {
            Kind::Match => 'M',
            Kind::Insertion => 'I',
            Kind::Deletion => 'D',
            Kind::SoftClip => 'S',
            Kind::HardClip => 'H',
            Kind::RefSkip => 'N',
        }
    }
}

impl TryFrom<char> for Kind {
    type Error = ParseError;

    fn try_from(c: char) -> Result<Self, Self::Error> {
        match c {
            'M' => Ok(Kind::Match),
            'I' => Ok(Kind::Insertion),
            'D' => Ok(Kind::Deletion),
            'S' => Ok(Kind::SoftClip),
            'H' => Ok(Kind::HardClip),
            'N' => Ok(Kind::RefSkip),
            _ => Err(ParseError::InvalidKind(c)),
        }
    }
}

/// A single CIGAR operation: a kind paired with a run length.
///
/// Zero-length operations are permitted and are treated as no-ops by every
/// consumer in this crate.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Op {
    /// The kind of operation.
    kind: Kind,

    /// The run length of the operation.
    len: usize,
}

impl Op {
    /// Creates a new [`Op`].
    pub fn new(kind: Kind, len: usize) -> Self {
        Self { kind, len }
    }

    /// Gets the kind of the operation.
    pub fn kind(&self) -> Kind {
        self.kind
    }

    /// Gets the run length of the operation.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns whether the run length is zero.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl std::fmt::Display for Op {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.len, self.kind.as_char())
    }
}

////////////////////////////////////////////////////////////////////////////////////////
// Cigar
////////////////////////////////////////////////////////////////////////////////////////

/// An ordered sequence of CIGAR operations.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Cigar(Vec<Op>);

impl Cigar {
    /// Creates a new [`Cigar`] from a sequence of operations.
    pub fn new(ops: Vec<Op>) -> Self {
        Self(ops)
    }

    /// Gets the operations as a slice.
    pub fn ops(&self) -> &[Op] {
        &self.0
    }

    /// Returns whether the CIGAR contains no operations.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Gets the number of reference bases the alignment spans.
    ///
    /// This is the sum of the lengths of the reference-consuming operations
    /// (match, deletion, and reference skip).
    ///
    /// # Examples
    ///
    /// ```
    /// use genecov::alignment::cigar::Cigar;
    ///
    /// let cigar = "5M2I3M2D10N5M".parse::<Cigar>()?;
    /// assert_eq!(cigar.reference_len(), 25);
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn reference_len(&self) -> usize {
        self.0
            .iter()
            .filter(|op| op.kind().consumes_reference())
            .map(|op| op.len())
            .sum()
    }
}

impl From<Vec<Op>> for Cigar {
    fn from(ops: Vec<Op>) -> Self {
        Self::new(ops)
    }
}

impl FromStr for Cigar {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // The unavailable CIGAR marker from the SAM specification.
        if s == "*" {
            return Ok(Self::default());
        }

        let mut ops = Vec::new();
        let mut digits = String::new();

        for c in s.chars() {
            if c.is_ascii_digit() {
                digits.push(c);
                continue;
            }

            if digits.is_empty() {
                return Err(ParseError::MissingLength(c));
            }

            let kind = Kind::try_from(c)?;

            // `digits` is a non-empty run of ASCII digits, so the only way
            // this can fail is overflow.
            let len = digits
                .parse::<usize>()
                .map_err(|_| ParseError::InvalidLength(std::mem::take(&mut digits)))?;

            ops.push(Op::new(kind, len));
            digits.clear();
        }

        if !digits.is_empty() {
            return Err(ParseError::MissingKind(digits));
        }

        Ok(Self(ops))
    }
}

impl std::fmt::Display for Cigar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.0.is_empty() {
            return write!(f, "*");
        }

        for op in &self.0 {
            write!(f, "{op}")?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_mixed_cigar() -> Result<(), Box<dyn std::error::Error>> {
        let cigar = "2S10M1I5M2D3M".parse::<Cigar>()?;

        assert_eq!(cigar.ops().len(), 6);
        assert_eq!(cigar.ops()[0], Op::new(Kind::SoftClip, 2));
        assert_eq!(cigar.ops()[2], Op::new(Kind::Insertion, 1));
        assert_eq!(cigar.reference_len(), 20);
        assert_eq!(cigar.to_string(), "2S10M1I5M2D3M");

        Ok(())
    }

    #[test]
    fn parses_the_unavailable_marker() -> Result<(), Box<dyn std::error::Error>> {
        let cigar = "*".parse::<Cigar>()?;
        assert!(cigar.is_empty());
        assert_eq!(cigar.to_string(), "*");
        Ok(())
    }

    #[test]
    fn rejects_an_unknown_operation() {
        let err = "10M5X".parse::<Cigar>().unwrap_err();
        assert_eq!(err, ParseError::InvalidKind('X'));
        assert_eq!(err.to_string(), "invalid operation kind: X");
    }

    #[test]
    fn rejects_a_missing_length() {
        let err = "M".parse::<Cigar>().unwrap_err();
        assert_eq!(err, ParseError::MissingLength('M'));
    }

    #[test]
    fn rejects_an_overflowing_length() {
        let digits = "9".repeat(25);
        let err = format!("{digits}M").parse::<Cigar>().unwrap_err();
        assert_eq!(err, ParseError::InvalidLength(digits.clone()));
        assert_eq!(err.to_string(), format!("invalid operation length: {digits}"));
    }

    #[test]
    fn rejects_a_missing_kind() {
        let err = "10M2".parse::<Cigar>().unwrap_err();
        assert_eq!(err, ParseError::MissingKind(String::from("2")));
    }
}
