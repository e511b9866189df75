//! A reader for region-list files: one region per line.

use std::io;
use std::io::BufRead;
use std::iter;

use crate::region;
use crate::region::Region;

/// The new line character.
const NEW_LINE: char = '\n';

/// The carriage return character.
const CARRIAGE_RETURN: char = '\r';

/// An error related to a [`Reader`].
#[derive(Debug)]
pub enum Error {
    /// An I/O error.
    Io(io::Error),

    /// A region error.
    Region(region::Error),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Io(err) => write!(f, "i/o error: {err}"),
            Error::Region(err) => write!(f, "region error: {err}"),
        }
    }
}

impl std::error::Error for Error {}

/// A region-list reader.
///
/// Each non-blank line of the underlying reader is parsed as a [`Region`].
#[derive(Clone, Debug)]
pub struct Reader<T>(T)
where
    T: BufRead;

impl<T> Reader<T>
where
    T: BufRead,
{
    /// Creates a region-list reader.
    ///
    /// # Examples
    ///
    /// ```
    /// let data = b"chr1:100-200\nchr2\n";
    /// let reader = genecov::region::Reader::new(&data[..]);
    /// ```
    pub fn new(inner: T) -> Self {
        Self(inner)
    }

    /// Consumes self and returns the inner reader.
    pub fn into_inner(self) -> T {
        self.0
    }

    /// Reads a raw, textual line from the underlying reader, stripping any
    /// trailing newline or carriage return.
    pub fn read_line_raw(&mut self, buffer: &mut String) -> io::Result<usize> {
        buffer.clear();

        match self.0.read_line(buffer) {
            Ok(0) => Ok(0),
            Ok(n) => {
                if buffer.ends_with(NEW_LINE) {
                    buffer.pop();

                    if buffer.ends_with(CARRIAGE_RETURN) {
                        buffer.pop();
                    }
                }

                Ok(n)
            }
            Err(e) => Err(e),
        }
    }

    /// Returns an iterator over the [`Region`]s in the underlying reader.
    ///
    /// Blank lines are skipped.
    ///
    /// # Examples
    ///
    /// ```
    /// use genecov::region::Region;
    ///
    /// let data = b"chr1:100-200\n\nchr2\n";
    /// let mut reader = genecov::region::Reader::new(&data[..]);
    ///
    /// let regions = reader.regions().collect::<Result<Vec<_>, _>>()?;
    /// assert_eq!(regions.len(), 2);
    /// assert_eq!(regions[1], Region::Contig { contig: String::from("chr2") });
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn regions(&mut self) -> impl Iterator<Item = Result<Region, Error>> + '_ {
        let mut buffer = String::new();

        iter::from_fn(move || {
            loop {
                match self.read_line_raw(&mut buffer) {
                    Ok(0) => return None,
                    Ok(_) if buffer.is_empty() => continue,
                    Ok(_) => return Some(buffer.parse::<Region>().map_err(Error::Region)),
                    Err(e) => return Some(Err(Error::Io(e))),
                }
            }
        })
    }
}

impl<T> From<T> for Reader<T>
where
    T: BufRead,
{
    fn from(inner: T) -> Self {
        Self(inner)
    }
}
