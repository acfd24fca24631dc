//! Buffer coordinates and half-open ranges.
//!
//! Positions are (line, column) pairs in character units, totally ordered by
//! line then column. Ranges are half-open `[start, end)` and may be empty
//! (`start == end`) or carry the invalid sentinel (document gone, range
//! unusable).

use std::fmt;

/// A (line, column) position in the buffer. Columns count chars, not bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    /// Sentinel for "no longer anchored to live text".
    pub const INVALID: Position = Position {
        line: u32::MAX,
        column: u32::MAX,
    };

    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }

    pub fn is_valid(&self) -> bool {
        self.line != u32::MAX
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "({},{})", self.line, self.column)
        } else {
            write!(f, "(invalid)")
        }
    }
}

/// A half-open `[start, end)` interval of buffer positions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    pub const INVALID: Range = Range {
        start: Position::INVALID,
        end: Position::INVALID,
    };

    pub fn new(start: Position, end: Position) -> Self {
        debug_assert!(start <= end || !start.is_valid());
        Self { start, end }
    }

    /// A collapsed range at `pos`.
    pub fn collapsed(pos: Position) -> Self {
        Self {
            start: pos,
            end: pos,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn is_valid(&self) -> bool {
        self.start.is_valid() && self.end.is_valid()
    }

    /// Whether `pos` lies inside the range (end exclusive).
    pub fn contains(&self, pos: Position) -> bool {
        pos >= self.start && pos < self.end
    }

    /// Whether `other` lies entirely inside this range.
    pub fn contains_range(&self, other: Range) -> bool {
        other.start >= self.start && other.end <= self.end
    }

    /// Strict overlap. Empty ranges overlap nothing.
    pub fn overlaps(&self, other: Range) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.start < other.end
            && other.start < self.end
    }

    /// Overlap-or-touch: also true when the ranges share an endpoint. An
    /// empty range touching the interval counts.
    pub fn touches(&self, other: Range) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    /// Smallest range covering both.
    pub fn union(&self, other: Range) -> Range {
        Range {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Common sub-range; empty (collapsed) when disjoint.
    pub fn intersect(&self, other: Range) -> Range {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        if start <= end {
            Range { start, end }
        } else {
            Range::collapsed(start.min(self.end))
        }
    }

    pub fn on_single_line(&self) -> bool {
        self.start.line == self.end.line
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}..{}]", self.start, self.end)
    }
}

/// Map a position through an insertion. `inserted` is the range the new text
/// occupies, in post-edit coordinates; `pos` is pre-edit. `move_on_boundary`
/// selects whether a position exactly at the insertion point is pushed along
/// with the inserted text.
pub(crate) fn map_through_insert(pos: Position, inserted: Range, move_on_boundary: bool) -> Position {
    let at = inserted.start;
    if pos < at || (pos == at && !move_on_boundary) {
        return pos;
    }
    let line_delta = inserted.end.line - inserted.start.line;
    if pos.line == at.line {
        Position {
            line: pos.line + line_delta,
            column: inserted.end.column + (pos.column - at.column),
        }
    } else {
        Position {
            line: pos.line + line_delta,
            column: pos.column,
        }
    }
}

/// Map a position through a removal. `removed` is in pre-edit coordinates.
/// Positions inside the removed extent collapse onto its start.
pub(crate) fn map_through_remove(pos: Position, removed: Range) -> Position {
    if pos <= removed.start {
        return pos;
    }
    if pos <= removed.end {
        return removed.start;
    }
    let line_delta = removed.end.line - removed.start.line;
    if pos.line == removed.end.line {
        Position {
            line: removed.start.line,
            column: removed.start.column + (pos.column - removed.end.column),
        }
    } else {
        Position {
            line: pos.line - line_delta,
            column: pos.column,
        }
    }
}
