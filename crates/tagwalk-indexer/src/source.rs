//! Line reader that tracks the line number and byte offset of every line.

use crate::TagsError;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// Position of a line inside its file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SourceLocation {
    /// Line number (1-indexed)
    pub line: usize,
    /// Byte offset of the first byte of the line (0-indexed)
    pub offset: u64,
}

impl SourceLocation {
    /// Location of the first line of a file.
    pub const START: SourceLocation = SourceLocation { line: 1, offset: 0 };
}

/// One line handed out by a [`LineSource`], without its `\n` terminator.
#[derive(Debug, Clone, Copy)]
pub struct Line<'a> {
    pub text: &'a [u8],
    pub location: SourceLocation,
}

/// Yields successive lines of a byte stream together with their location.
///
/// The underlying reader (usually an open file) is owned by the source and
/// released when the source is dropped.
pub struct LineSource<R> {
    reader: R,
    path: PathBuf,
    next: SourceLocation,
    buf: Vec<u8>,
}

impl LineSource<BufReader<File>> {
    /// Open a file for line reading.
    pub fn open(path: &Path) -> Result<Self, TagsError> {
        let file = File::open(path).map_err(|source| TagsError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::with_path(BufReader::new(file), path))
    }
}

impl<R: BufRead> LineSource<R> {
    /// Wrap an already open reader.
    pub fn from_reader(reader: R) -> Self {
        Self::with_path(reader, Path::new(""))
    }

    fn with_path(reader: R, path: &Path) -> Self {
        Self {
            reader,
            path: path.to_path_buf(),
            next: SourceLocation::START,
            buf: Vec::new(),
        }
    }

    /// Read the next line. Returns `Ok(None)` at end of input.
    pub fn read_line(&mut self) -> Result<Option<Line<'_>>, TagsError> {
        self.buf.clear();
        let read = self
            .reader
            .read_until(b'\n', &mut self.buf)
            .map_err(|source| TagsError::Read {
                path: self.path.clone(),
                source,
            })?;

        if read == 0 {
            return Ok(None);
        }

        let location = self.next;
        self.next = SourceLocation {
            line: location.line + 1,
            offset: location.offset + read as u64,
        };

        let text = match self.buf.last() {
            Some(b'\n') => &self.buf[..read - 1],
            _ => &self.buf[..],
        };

        Ok(Some(Line { text, location }))
    }

    /// Location the next line will be reported at.
    pub fn position(&self) -> SourceLocation {
        self.next
    }
}
