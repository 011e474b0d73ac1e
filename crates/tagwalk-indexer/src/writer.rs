//! Tag file writer.

use crate::tag::TagAccumulator;
use crate::TagsError;
use std::io::{BufWriter, Write};
use tracing::trace;

/// Appends serialized file blocks to a sink in submission order.
///
/// Output is buffered; `finish` flushes it. Dropping an unfinished writer
/// flushes on a best-effort basis.
pub struct TagFileWriter<W: Write> {
    sink: BufWriter<W>,
    blocks: usize,
    bytes: u64,
}

impl<W: Write> TagFileWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            sink: BufWriter::new(sink),
            blocks: 0,
            bytes: 0,
        }
    }

    /// Serialize `acc` and append its block.
    pub fn write_block(&mut self, acc: TagAccumulator) -> Result<(), TagsError> {
        let block = acc.serialize();
        self.sink.write_all(&block)?;
        self.blocks += 1;
        self.bytes += block.len() as u64;
        trace!(path = ?acc.path(), tags = acc.len(), bytes = block.len(), "Wrote block");
        Ok(())
    }

    /// Number of blocks written so far.
    pub fn blocks(&self) -> usize {
        self.blocks
    }

    /// Number of bytes written so far.
    pub fn bytes(&self) -> u64 {
        self.bytes
    }

    /// Flush buffered output and hand back the sink.
    pub fn finish(self) -> Result<W, TagsError> {
        self.sink
            .into_inner()
            .map_err(|e| TagsError::Io(e.into_error()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::SourceLocation;

    #[test]
    fn test_blocks_are_concatenated_in_order() {
        let mut first = TagAccumulator::new("b.rb");
        first.record("B", b"class B", SourceLocation::START);
        let second = TagAccumulator::new("a.rb");

        let mut writer = TagFileWriter::new(Vec::new());
        writer.write_block(first).unwrap();
        writer.write_block(second).unwrap();
        assert_eq!(writer.blocks(), 2);

        let out = writer.finish().unwrap();
        assert_eq!(
            out,
            b"\x0c\nb.rb,14\nclass B\x7fB\x011,0\n\x0c\na.rb,0\n"
        );
    }

    #[test]
    fn test_byte_count_matches_output() {
        let mut acc = TagAccumulator::new("x.py");
        acc.record("f", b"def f():", SourceLocation::START);

        let mut writer = TagFileWriter::new(Vec::new());
        writer.write_block(acc).unwrap();
        let bytes = writer.bytes();

        let out = writer.finish().unwrap();
        assert_eq!(bytes, out.len() as u64);
    }

    #[test]
    fn test_empty_writer_produces_empty_file() {
        let writer = TagFileWriter::new(Vec::new());
        assert!(writer.finish().unwrap().is_empty());
    }
}
