//! Conversion between byte offsets and protocol positions
//!
//! The syntax tree reports byte offsets, the protocol speaks in lines and
//! UTF-16 code units. `LineIndex` bridges the two for a single text.

use crate::types::{Position, Range};

/// Line start table for one document text
#[derive(Debug, Clone)]
pub struct LineIndex<'a> {
    text: &'a str,
    line_starts: Vec<usize>,
}

impl<'a> LineIndex<'a> {
    /// Build the index for `text`
    pub fn new(text: &'a str) -> Self {
        let mut line_starts = vec![0];
        for (idx, ch) in text.char_indices() {
            if ch == '\n' {
                line_starts.push(idx + ch.len_utf8());
            }
        }
        Self { text, line_starts }
    }

    /// Number of lines (a trailing newline opens an empty last line)
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Byte offset of the start of `line`, clamped to the text length
    pub fn line_start(&self, line: usize) -> usize {
        self.line_starts
            .get(line)
            .copied()
            .unwrap_or(self.text.len())
    }

    /// Protocol position of a byte offset
    pub fn position(&self, offset: usize) -> Position {
        let offset = self.clamp_to_char_boundary(offset.min(self.text.len()));
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next - 1,
        };
        let start = self.line_starts[line];
        let character = utf16_len(&self.text[start..offset]);
        Position::new(line as u32, character as u32)
    }

    /// Protocol range of a byte span
    pub fn range(&self, start: usize, end: usize) -> Range {
        Range::new(self.position(start), self.position(end))
    }

    /// Byte offset of a protocol position, clamped to the line end
    pub fn offset(&self, position: Position) -> usize {
        let line = position.line as usize;
        if line >= self.line_starts.len() {
            return self.text.len();
        }
        let start = self.line_starts[line];
        let end = self
            .line_starts
            .get(line + 1)
            .map(|next| next - 1)
            .unwrap_or(self.text.len());

        let mut units = 0u32;
        for (idx, ch) in self.text[start..end].char_indices() {
            if units >= position.character {
                return start + idx;
            }
            units += ch.len_utf16() as u32;
        }
        end
    }

    /// Range spanning the whole text
    pub fn full_range(&self) -> Range {
        Range::new(Position::new(0, 0), self.position(self.text.len()))
    }

    fn clamp_to_char_boundary(&self, mut offset: usize) -> usize {
        while !self.text.is_char_boundary(offset) {
            offset -= 1;
        }
        offset
    }
}

/// Length of `text` in UTF-16 code units
pub fn utf16_len(text: &str) -> usize {
    text.chars().map(char::len_utf16).sum()
}
