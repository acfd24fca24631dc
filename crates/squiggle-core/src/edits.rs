//! Buffered modification records.
//!
//! Keystrokes arrive as a burst of tiny edits; checking after every one
//! would re-run the oracle on the same word dozens of times a second.
//! Instead each edit is logged here and the log is flushed in one coalesced
//! batch once the checker goes idle. Records are kept in current (post-edit)
//! coordinates: every later edit re-maps the pending log through the same
//! transforms the span tracker uses.

use crate::boundary::WordBoundaries;
use crate::document::Document;
use crate::position::{Position, Range, map_through_insert, map_through_remove};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModificationKind {
    Inserted,
    Removed,
}

/// One logged edit. For removals the range is the collapsed point where the
/// text used to be.
#[derive(Clone, Copy, Debug)]
pub struct ModificationRecord {
    pub kind: ModificationKind,
    pub range: Range,
}

#[derive(Default)]
pub struct EditTracker {
    records: Vec<ModificationRecord>,
}

impl EditTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Log an insertion occupying `inserted` (post-edit coordinates).
    pub fn record_insert(&mut self, inserted: Range) {
        for rec in &mut self.records {
            let keep_collapsed = rec.range.is_empty();
            rec.range = Range::new(
                map_through_insert(rec.range.start, inserted, true),
                map_through_insert(rec.range.end, inserted, keep_collapsed),
            );
        }
        self.records.push(ModificationRecord {
            kind: ModificationKind::Inserted,
            range: inserted,
        });
    }

    /// Log a removal of `removed` (pre-edit coordinates).
    pub fn record_remove(&mut self, removed: Range) {
        self.records.retain_mut(|rec| {
            rec.range = Range::new(
                map_through_remove(rec.range.start, removed),
                map_through_remove(rec.range.end, removed),
            );
            // An insertion record whose text was deleted again is moot; the
            // removal record below covers the spot.
            rec.kind == ModificationKind::Removed || !rec.range.is_empty()
        });
        self.records.push(ModificationRecord {
            kind: ModificationKind::Removed,
            range: Range::collapsed(removed.start),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Coalesce the pending log into word-aligned, single-line check ranges
    /// and clear it. Overlapping or touching records merge first, so a run
    /// of keystrokes inside one word yields one range.
    pub fn take_check_ranges(
        &mut self,
        doc: &dyn Document,
        resolver: &dyn WordBoundaries,
    ) -> Vec<Range> {
        if self.records.is_empty() {
            return Vec::new();
        }

        let mut raw: Vec<Range> = self.records.drain(..).map(|r| r.range).collect();
        raw.sort_by_key(|r| r.start);

        let mut merged: Vec<Range> = Vec::new();
        for range in raw {
            match merged.last_mut() {
                Some(last) if last.touches(range) => *last = last.union(range),
                _ => merged.push(range),
            }
        }

        let mut out = Vec::new();
        for range in merged {
            let expanded = resolver.expand(doc, range);
            if expanded.is_empty() || !expanded.is_valid() {
                continue;
            }
            for line in expanded.start.line..=expanded.end.line {
                let line_range = Range::new(
                    Position::new(line, 0),
                    Position::new(line, doc.line_len(line)),
                );
                let piece = expanded.intersect(line_range);
                if !piece.is_empty() {
                    out.push(piece);
                }
            }
        }
        tracing::debug!(
            target: "squiggle::edits",
            ranges = out.len(),
            "flushed modification log"
        );
        out
    }
}
