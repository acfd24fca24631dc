//! Document access trait and the ropey-backed reference buffer.
//!
//! The checker never mutates text; it only reads lines and extracts the text
//! under a span for submission to the oracle. Embeddings with their own
//! storage implement [`Document`]; [`RopeBuffer`] is the in-crate
//! implementation used by tests and standalone hosts.

use std::ops::Range as CharRange;

use smol_str::{SmolStr, ToSmolStr};

use crate::position::{Position, Range};

/// Read-only view of the text buffer, in (line, column) coordinates.
///
/// Columns count chars. `line_len` and `line_text` exclude the line break.
pub trait Document {
    /// Number of lines. An empty buffer still has one (empty) line.
    fn line_count(&self) -> u32;

    /// Length of `line` in chars, excluding the trailing line break.
    fn line_len(&self, line: u32) -> u32;

    /// Text of `line` without the trailing line break, or `None` when out of
    /// bounds.
    fn line_text(&self, line: u32) -> Option<SmolStr>;

    /// Position just past the last char of the buffer.
    fn end_position(&self) -> Position {
        let last = self.line_count().saturating_sub(1);
        Position::new(last, self.line_len(last))
    }

    /// Extract the text covered by `range`, lines joined with `\n`. The range
    /// is clipped to the buffer; an invalid range yields an empty string.
    fn text_in(&self, range: Range) -> String {
        if !range.is_valid() || range.is_empty() {
            return String::new();
        }
        let range = range.intersect(Range::new(Position::new(0, 0), self.end_position()));
        let mut out = String::new();
        for line in range.start.line..=range.end.line {
            let Some(text) = self.line_text(line) else {
                break;
            };
            let from = if line == range.start.line {
                range.start.column as usize
            } else {
                0
            };
            let to = if line == range.end.line {
                range.end.column as usize
            } else {
                text.chars().count()
            };
            if line != range.start.line {
                out.push('\n');
            }
            out.extend(text.chars().skip(from).take(to.saturating_sub(from)));
        }
        out
    }

    /// Clamp a position onto actual buffer content.
    fn clamp_position(&self, pos: Position) -> Position {
        let end = self.end_position();
        if pos >= end {
            return end;
        }
        Position::new(pos.line, pos.column.min(self.line_len(pos.line)))
    }

    /// Clip a range to the buffer bounds.
    fn clip_range(&self, range: Range) -> Range {
        if !range.is_valid() {
            return range;
        }
        Range::new(self.clamp_position(range.start), self.clamp_position(range.end))
    }
}

/// Ropey-backed text buffer with (line, column) editing.
///
/// Edits return the affected coordinate range so the owner can forward them
/// to the checker as insertion/removal notifications.
#[derive(Clone, Default)]
pub struct RopeBuffer {
    rope: ropey::Rope,
}

impl RopeBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_str(s: &str) -> Self {
        Self {
            rope: ropey::Rope::from_str(s),
        }
    }

    pub fn to_string(&self) -> String {
        self.rope.to_string()
    }

    fn pos_to_char(&self, pos: Position) -> usize {
        let line = (pos.line as usize).min(self.rope.len_lines() - 1);
        let start = self.rope.line_to_char(line);
        start + pos.column as usize
    }

    fn char_range(&self, range: Range) -> CharRange<usize> {
        self.pos_to_char(range.start)..self.pos_to_char(range.end)
    }

    /// Insert `text` at `pos`, returning the range the new text occupies in
    /// post-edit coordinates.
    pub fn insert(&mut self, pos: Position, text: &str) -> Range {
        self.rope.insert(self.pos_to_char(pos), text);

        let newlines = text.chars().filter(|&c| c == '\n').count() as u32;
        let end = if newlines == 0 {
            Position::new(pos.line, pos.column + text.chars().count() as u32)
        } else {
            let tail = text.rsplit('\n').next().unwrap_or("");
            Position::new(pos.line + newlines, tail.chars().count() as u32)
        };
        Range::new(pos, end)
    }

    /// Remove the text under `range` (pre-edit coordinates). Returns the
    /// removed range.
    pub fn remove(&mut self, range: Range) -> Range {
        self.rope.remove(self.char_range(range));
        range
    }
}

impl Document for RopeBuffer {
    fn line_count(&self) -> u32 {
        self.rope.len_lines() as u32
    }

    fn line_len(&self, line: u32) -> u32 {
        self.line_text(line)
            .map(|t| t.chars().count() as u32)
            .unwrap_or(0)
    }

    fn line_text(&self, line: u32) -> Option<SmolStr> {
        if line as usize >= self.rope.len_lines() {
            return None;
        }
        let slice = self.rope.line(line as usize);
        let text = slice.to_smolstr();
        Some(SmolStr::new(text.trim_end_matches(['\n', '\r'])))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(line: u32, column: u32) -> Position {
        Position::new(line, column)
    }

    #[test]
    fn test_line_access() {
        let buf = RopeBuffer::from_str("alpha\nbeta\ngamma");
        assert_eq!(buf.line_count(), 3);
        assert_eq!(buf.line_text(1).as_deref(), Some("beta"));
        assert_eq!(buf.line_len(2), 5);
        assert_eq!(buf.line_text(3), None);
        assert_eq!(buf.end_position(), pos(2, 5));
    }

    #[test]
    fn test_empty_buffer() {
        let buf = RopeBuffer::new();
        assert_eq!(buf.line_count(), 1);
        assert_eq!(buf.line_len(0), 0);
        assert_eq!(buf.end_position(), pos(0, 0));
    }

    #[test]
    fn test_text_in_single_line() {
        let buf = RopeBuffer::from_str("Helllo wrold");
        let r = Range::new(pos(0, 7), pos(0, 12));
        assert_eq!(buf.text_in(r), "wrold");
    }

    #[test]
    fn test_text_in_multi_line() {
        let buf = RopeBuffer::from_str("one two\nthree four\nfive");
        let r = Range::new(pos(0, 4), pos(2, 4));
        assert_eq!(buf.text_in(r), "two\nthree four\nfive");
    }

    #[test]
    fn test_text_in_clips_to_buffer() {
        let buf = RopeBuffer::from_str("short");
        let r = Range::new(pos(0, 2), pos(9, 9));
        assert_eq!(buf.text_in(r), "ort");
        assert_eq!(buf.text_in(Range::INVALID), "");
    }

    #[test]
    fn test_insert_returns_affected_range() {
        let mut buf = RopeBuffer::from_str("hello world");
        let r = buf.insert(pos(0, 5), " there");
        assert_eq!(buf.to_string(), "hello there world");
        assert_eq!(r, Range::new(pos(0, 5), pos(0, 11)));

        let r = buf.insert(pos(0, 5), "\nx");
        assert_eq!(r, Range::new(pos(0, 5), pos(1, 1)));
        assert_eq!(buf.line_text(0).as_deref(), Some("hello"));
        assert_eq!(buf.line_text(1).as_deref(), Some("x there world"));
    }

    #[test]
    fn test_remove_joins_lines() {
        let mut buf = RopeBuffer::from_str("one\ntwo");
        buf.remove(Range::new(pos(0, 3), pos(1, 0)));
        assert_eq!(buf.to_string(), "onetwo");
        assert_eq!(buf.line_count(), 1);
    }

    #[test]
    fn test_multibyte_columns_are_chars() {
        let buf = RopeBuffer::from_str("héllo wörld");
        assert_eq!(buf.line_len(0), 11);
        assert_eq!(buf.text_in(Range::new(pos(0, 6), pos(0, 11))), "wörld");
    }
}
