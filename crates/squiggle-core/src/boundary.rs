//! Word-boundary resolution.
//!
//! Raw edit and viewport ranges rarely fall on word boundaries; before a
//! region is queued for checking it is widened to cover every whole word it
//! touches. Segmentation follows UAX-29 word boundaries (via
//! `unicode-segmentation`) with hyphen-joined compounds kept together, which
//! matches how the word-list oracle tokenizes the submitted text. The
//! resolver is a trait so an embedding can swap in the exact conventions of
//! its own oracle.

use unicode_segmentation::UnicodeSegmentation;

use crate::document::Document;
use crate::position::{Position, Range};

/// Expands raw ranges to whole-word boundaries.
pub trait WordBoundaries {
    /// Smallest range covering every word `range` touches, clipped to the
    /// buffer. A collapsed range touching a word widens to that word; a
    /// range touching no word comes back unchanged.
    fn expand(&self, doc: &dyn Document, range: Range) -> Range;
}

/// Word segments of one line as `(start, end)` char columns.
///
/// UAX-29 keeps contractions ("don't") in one segment; single hyphens
/// between words are merged here so "well-known" stays one unit.
pub(crate) fn word_segments(line: &str) -> Vec<(u32, u32)> {
    struct Raw {
        start: u32,
        end: u32,
        is_word: bool,
        is_hyphen: bool,
    }

    let mut raw = Vec::new();
    let mut col = 0u32;
    for seg in line.split_word_bounds() {
        let len = seg.chars().count() as u32;
        raw.push(Raw {
            start: col,
            end: col + len,
            is_word: seg.chars().any(|c| c.is_alphanumeric()),
            is_hyphen: seg == "-",
        });
        col += len;
    }

    let mut out = Vec::new();
    let mut i = 0;
    while i < raw.len() {
        if !raw[i].is_word {
            i += 1;
            continue;
        }
        let start = raw[i].start;
        let mut end = raw[i].end;
        let mut j = i + 1;
        while j + 1 < raw.len() && raw[j].is_hyphen && raw[j + 1].is_word {
            end = raw[j + 1].end;
            j += 2;
        }
        out.push((start, end));
        i = j;
    }
    out
}

/// Default resolver built on UAX-29 segmentation.
#[derive(Default)]
pub struct UnicodeWordBoundaries;

impl UnicodeWordBoundaries {
    /// Snap `col` to the start of a word it sits in or immediately follows.
    fn snap_start(line: &str, col: u32) -> u32 {
        for (start, end) in word_segments(line) {
            if start < col && col <= end {
                return start;
            }
        }
        col
    }

    /// Snap `col` to the end of a word it sits in or immediately precedes.
    fn snap_end(line: &str, col: u32) -> u32 {
        for (start, end) in word_segments(line) {
            if start <= col && col < end {
                return end;
            }
        }
        col
    }
}

impl WordBoundaries for UnicodeWordBoundaries {
    fn expand(&self, doc: &dyn Document, range: Range) -> Range {
        if !range.is_valid() {
            return range;
        }
        let range = doc.clip_range(range);

        let start = match doc.line_text(range.start.line) {
            Some(line) => Position::new(
                range.start.line,
                Self::snap_start(&line, range.start.column),
            ),
            None => range.start,
        };
        let end = match doc.line_text(range.end.line) {
            Some(line) => Position::new(range.end.line, Self::snap_end(&line, range.end.column)),
            None => range.end,
        };
        Range::new(start, end)
    }
}
