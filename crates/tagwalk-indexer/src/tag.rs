//! Tag entries and the per-file accumulator that serializes them.
//!
//! A file's block in the etags format looks like:
//!
//! ```text
//! \x0c
//! <path>,<length>
//! <locator>\x7f<name>\x01<line>,<offset>
//! ...
//! ```
//!
//! where `<length>` is the byte count of the entry lines only.

use crate::source::SourceLocation;
use std::borrow::Cow;
use std::path::{Path, PathBuf};

/// Separates the locator text from the tag name.
pub const NAME_SEPARATOR: u8 = 0x7f;
/// Separates the tag name from the line/offset pair.
pub const POSITION_SEPARATOR: u8 = 0x01;
/// Starts every file block.
pub const BLOCK_START: u8 = 0x0c;

/// A recorded definition site of a named symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagEntry {
    /// Symbol name
    pub name: Vec<u8>,
    /// Line text a consumer can search for to relocate the definition
    pub locator: Vec<u8>,
    /// Where the line starts
    pub location: SourceLocation,
}

impl TagEntry {
    pub fn new(name: impl Into<Vec<u8>>, locator: impl Into<Vec<u8>>, location: SourceLocation) -> Self {
        Self {
            name: name.into(),
            locator: locator.into(),
            location,
        }
    }

    /// Append this entry's line to `out`.
    ///
    /// Separator and newline bytes inside the name or locator are written as
    /// spaces so the line always parses back into exactly three fields.
    fn write_line(&self, out: &mut Vec<u8>) {
        out.extend(self.locator.iter().map(|&b| field_byte(b)));
        out.push(NAME_SEPARATOR);
        out.extend(self.name.iter().map(|&b| field_byte(b)));
        out.push(POSITION_SEPARATOR);
        out.extend_from_slice(
            format!("{},{}\n", self.location.line, self.location.offset).as_bytes(),
        );
    }
}

/// How the raw line is turned into locator text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LocatorPolicy {
    /// Truncate locators to this many bytes (`None` keeps the whole line)
    pub max_len: Option<usize>,
}

impl LocatorPolicy {
    /// Build the locator for a matched line.
    ///
    /// A trailing `\r` is dropped and the two separator bytes are replaced
    /// with spaces so every entry parses back unambiguously.
    pub fn locator(&self, line: &[u8]) -> Vec<u8> {
        let line = trim_cr(line);
        let line = match self.max_len {
            Some(max) if line.len() > max => &line[..max],
            _ => line,
        };
        line.iter().map(|&b| field_byte(b)).collect()
    }
}

/// Map a byte that would break entry framing to a space.
fn field_byte(b: u8) -> u8 {
    match b {
        NAME_SEPARATOR | POSITION_SEPARATOR | b'\n' => b' ',
        other => other,
    }
}

/// Strip a single trailing carriage return.
pub(crate) fn trim_cr(line: &[u8]) -> &[u8] {
    line.strip_suffix(b"\r").unwrap_or(line)
}

/// Collects the tags found in one source file, in discovery order.
#[derive(Debug, Clone)]
pub struct TagAccumulator {
    path: PathBuf,
    entries: Vec<TagEntry>,
    locator: LocatorPolicy,
}

impl TagAccumulator {
    /// Create an empty accumulator for `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_locator(path, LocatorPolicy::default())
    }

    /// Create an empty accumulator using a specific locator policy.
    pub fn with_locator(path: impl Into<PathBuf>, locator: LocatorPolicy) -> Self {
        Self {
            path: path.into(),
            entries: Vec::new(),
            locator,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn entries(&self) -> &[TagEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn locator_policy(&self) -> LocatorPolicy {
        self.locator
    }

    /// Append an entry as given. Duplicates are kept and no ordering is
    /// enforced; entries are serialized in push order.
    pub fn push(&mut self, entry: TagEntry) {
        self.entries.push(entry);
    }

    /// Record a tag for `line`, deriving the locator from the policy.
    pub fn record(&mut self, name: impl Into<Vec<u8>>, line: &[u8], location: SourceLocation) {
        let locator = self.locator.locator(line);
        self.push(TagEntry::new(name, locator, location));
    }

    /// Serialize the etags block for this file.
    pub fn serialize(&self) -> Vec<u8> {
        let mut body = Vec::new();
        for entry in &self.entries {
            entry.write_line(&mut body);
        }

        let path = path_bytes(&self.path);
        let mut block = Vec::with_capacity(body.len() + path.len() + 24);
        block.push(BLOCK_START);
        block.push(b'\n');
        block.extend_from_slice(&path);
        block.extend_from_slice(format!(",{}\n", body.len()).as_bytes());
        block.extend_from_slice(&body);
        block
    }
}

/// Raw bytes of a path as written in block headers.
#[cfg(unix)]
fn path_bytes(path: &Path) -> Cow<'_, [u8]> {
    use std::os::unix::ffi::OsStrExt;
    Cow::Borrowed(path.as_os_str().as_bytes())
}

#[cfg(not(unix))]
fn path_bytes(path: &Path) -> Cow<'_, [u8]> {
    match path.to_string_lossy() {
        Cow::Borrowed(s) => Cow::Borrowed(s.as_bytes()),
        Cow::Owned(s) => Cow::Owned(s.into_bytes()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc(line: usize, offset: u64) -> SourceLocation {
        SourceLocation { line, offset }
    }

    #[test]
    fn test_empty_block_has_zero_length() {
        let acc = TagAccumulator::new("src/empty.rb");
        assert_eq!(acc.serialize(), b"\x0c\nsrc/empty.rb,0\n");
    }

    #[test]
    fn test_block_layout() {
        let mut acc = TagAccumulator::new("a.go");
        acc.record("main", b"func main() {", loc(3, 20));

        assert_eq!(
            acc.serialize(),
            b"\x0c\na.go,24\nfunc main() {\x7fmain\x013,20\n"
        );
    }

    #[test]
    fn test_header_length_counts_entry_lines_only() {
        let mut acc = TagAccumulator::new("lib/thing.rb");
        acc.record("Thing", b"class Thing", loc(1, 0));
        acc.record("run", b"  def run", loc(5, 42));

        let block = acc.serialize();
        let text = String::from_utf8(block).unwrap();
        let mut lines = text.split_inclusive('\n');

        assert_eq!(lines.next(), Some("\x0c\n"));
        let header = lines.next().unwrap();
        let length: usize = header.trim_end().rsplit(',').next().unwrap().parse().unwrap();
        let body: usize = lines.map(str::len).sum();
        assert_eq!(length, body);
    }

    #[test]
    fn test_duplicate_names_are_kept() {
        let mut acc = TagAccumulator::new("x.rb");
        acc.record("initialize", b"def initialize", loc(2, 10));
        acc.record("initialize", b"def initialize", loc(9, 80));
        assert_eq!(acc.len(), 2);
    }

    #[test]
    fn test_locator_strips_cr_and_separators() {
        let policy = LocatorPolicy::default();
        assert_eq!(policy.locator(b"def a\x7fb\x01c\r"), b"def a b c");
    }

    #[test]
    fn test_separator_bytes_in_name_are_neutralized() {
        let mut acc = TagAccumulator::new("a.clj");
        acc.record(&b"a\x7fb"[..], b"(defn a\x7fb [x])", loc(1, 0));
        acc.push(TagEntry::new(&b"c\x01d\ne"[..], &b"raw\x7f"[..], loc(2, 17)));

        let block = acc.serialize();
        let body = &block[b"\x0c\na.clj,".len()..];
        let body = &body[body.iter().position(|&b| b == b'\n').unwrap() + 1..];

        assert_eq!(
            body,
            b"(defn a b [x])\x7fa b\x011,0\nraw \x7fc d e\x012,17\n"
        );
        for line in body.split(|&b| b == b'\n').filter(|l| !l.is_empty()) {
            assert_eq!(line.iter().filter(|&&b| b == NAME_SEPARATOR).count(), 1);
            assert_eq!(line.iter().filter(|&&b| b == POSITION_SEPARATOR).count(), 1);
        }
    }

    #[test]
    fn test_push_accepts_out_of_order_entries() {
        let mut acc = TagAccumulator::new("x.rb");
        acc.record("later", b"def later", loc(9, 80));
        acc.record("earlier", b"def earlier", loc(2, 10));

        let lines: Vec<_> = acc.entries().iter().map(|e| e.location.line).collect();
        assert_eq!(lines, vec![9, 2]);
    }

    #[test]
    fn test_locator_truncation() {
        let policy = LocatorPolicy { max_len: Some(5) };
        assert_eq!(policy.locator(b"function veryLong()"), b"funct");
        assert_eq!(policy.locator(b"fn a"), b"fn a");
    }
}
