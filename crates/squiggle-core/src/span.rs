//! Tracked spans: intervals that follow the text they cover through edits.
//!
//! Rather than giving every span a feedback callback, all live spans sit in a
//! single [`SpanTracker`] keyed by copyable [`SpanId`]s. Applying an edit
//! remaps every span in one pass and reports the ones whose text was
//! entirely consumed; the orchestrator retires those from every collection
//! that references them before any further processing runs. Collections hold
//! only `SpanId`s, so a retired span can never dangle.

use std::collections::HashMap;

use smol_str::SmolStr;

use crate::position::{Range, map_through_insert, map_through_remove};

/// Handle to a span owned by the [`SpanTracker`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SpanId(u32);

/// A tracked interval with its payload.
#[derive(Clone, Debug)]
struct TrackedSpan {
    range: Range,
    dictionary: SmolStr,
    word: Option<SmolStr>,
}

/// Owner of every live span. Spans adjust under edits by the standard rule:
/// grow on interior insert, shift on prior insert, collapse when a deletion
/// consumes their extent.
#[derive(Default)]
pub struct SpanTracker {
    spans: HashMap<SpanId, TrackedSpan>,
    next_id: u32,
}

impl SpanTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new span. The range must be valid and non-empty.
    pub fn insert(&mut self, range: Range, dictionary: SmolStr) -> SpanId {
        debug_assert!(range.is_valid() && !range.is_empty());
        let id = SpanId(self.next_id);
        self.next_id += 1;
        self.spans.insert(
            id,
            TrackedSpan {
                range,
                dictionary,
                word: None,
            },
        );
        id
    }

    pub fn is_alive(&self, id: SpanId) -> bool {
        self.spans.contains_key(&id)
    }

    pub fn range(&self, id: SpanId) -> Option<Range> {
        self.spans.get(&id).map(|s| s.range)
    }

    pub fn dictionary(&self, id: SpanId) -> Option<&str> {
        self.spans.get(&id).map(|s| s.dictionary.as_str())
    }

    pub fn word(&self, id: SpanId) -> Option<&str> {
        self.spans.get(&id).and_then(|s| s.word.as_deref())
    }

    pub fn set_word(&mut self, id: SpanId, word: SmolStr) {
        if let Some(span) = self.spans.get_mut(&id) {
            span.word = Some(word);
        }
    }

    /// Release a span. No-op if already gone.
    pub fn remove(&mut self, id: SpanId) {
        self.spans.remove(&id);
    }

    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// Remap every span through an insertion occupying `inserted` (post-edit
    /// coordinates). Insertions never empty a span.
    pub fn map_insert(&mut self, inserted: Range) {
        for span in self.spans.values_mut() {
            span.range = Range::new(
                map_through_insert(span.range.start, inserted, true),
                map_through_insert(span.range.end, inserted, false),
            );
        }
    }

    /// Remap every span through a removal of `removed` (pre-edit
    /// coordinates). Spans whose whole extent was deleted are dropped from
    /// the tracker and returned; the caller must purge them from every
    /// collection that still references them.
    pub fn map_remove(&mut self, removed: Range) -> Vec<SpanId> {
        let mut emptied = Vec::new();
        for (id, span) in self.spans.iter_mut() {
            let range = Range::new(
                map_through_remove(span.range.start, removed),
                map_through_remove(span.range.end, removed),
            );
            if range.is_empty() {
                emptied.push(*id);
            } else {
                span.range = range;
            }
        }
        for id in &emptied {
            self.spans.remove(id);
        }
        emptied
    }

    /// Drop every span, returning the ids. Used when the document goes away.
    pub fn invalidate_all(&mut self) -> Vec<SpanId> {
        let ids: Vec<SpanId> = self.spans.keys().copied().collect();
        self.spans.clear();
        ids
    }

    /// Live spans intersecting `range`, sorted by start position.
    pub fn spans_overlapping(&self, range: Range) -> Vec<(SpanId, Range)> {
        let mut out: Vec<(SpanId, Range)> = self
            .spans
            .iter()
            .filter(|(_, s)| s.range.overlaps(range))
            .map(|(id, s)| (*id, s.range))
            .collect();
        out.sort_by_key(|(_, r)| r.start);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::Position;

    fn pos(line: u32, column: u32) -> Position {
        Position::new(line, column)
    }

    fn range(a: (u32, u32), b: (u32, u32)) -> Range {
        Range::new(pos(a.0, a.1), pos(b.0, b.1))
    }

    #[test]
    fn test_span_shifts_on_prior_insert() {
        let mut tracker = SpanTracker::new();
        let id = tracker.insert(range((0, 7), (0, 12)), "en_US".into());

        tracker.map_insert(range((0, 2), (0, 5)));
        assert_eq!(tracker.range(id), Some(range((0, 10), (0, 15))));
    }

    #[test]
    fn test_span_grows_on_interior_insert() {
        let mut tracker = SpanTracker::new();
        let id = tracker.insert(range((0, 0), (0, 6)), "en_US".into());

        tracker.map_insert(range((0, 3), (0, 4)));
        assert_eq!(tracker.range(id), Some(range((0, 0), (0, 7))));
    }

    #[test]
    fn test_insert_at_boundaries() {
        let mut tracker = SpanTracker::new();
        let id = tracker.insert(range((0, 3), (0, 6)), "en_US".into());

        // At the end: span untouched.
        tracker.map_insert(range((0, 6), (0, 8)));
        assert_eq!(tracker.range(id), Some(range((0, 3), (0, 6))));

        // At the start: span shifts, does not absorb.
        tracker.map_insert(range((0, 3), (0, 4)));
        assert_eq!(tracker.range(id), Some(range((0, 4), (0, 7))));
    }

    #[test]
    fn test_span_shrinks_on_partial_removal() {
        let mut tracker = SpanTracker::new();
        let id = tracker.insert(range((0, 2), (0, 8)), "en_US".into());

        let emptied = tracker.map_remove(range((0, 5), (0, 8)));
        assert!(emptied.is_empty());
        assert_eq!(tracker.range(id), Some(range((0, 2), (0, 5))));
    }

    #[test]
    fn test_span_emptied_by_removal_is_retired() {
        let mut tracker = SpanTracker::new();
        let id = tracker.insert(range((0, 2), (0, 8)), "en_US".into());
        let other = tracker.insert(range((1, 0), (1, 4)), "en_US".into());

        let emptied = tracker.map_remove(range((0, 0), (0, 9)));
        assert_eq!(emptied, vec![id]);
        assert!(!tracker.is_alive(id));
        assert_eq!(tracker.range(other), Some(range((1, 0), (1, 4))));
    }

    #[test]
    fn test_unaffected_span_keeps_range_through_edit_burst() {
        let mut tracker = SpanTracker::new();
        let id = tracker.insert(range((2, 3), (2, 9)), "en_US".into());

        tracker.map_insert(range((0, 0), (0, 4)));
        tracker.map_remove(range((0, 1), (0, 3)));
        tracker.map_insert(range((3, 0), (3, 7)));
        assert_eq!(tracker.range(id), Some(range((2, 3), (2, 9))));

        // Deleting a full line above moves it up.
        let emptied = tracker.map_remove(range((0, 0), (1, 0)));
        assert!(emptied.is_empty());
        assert_eq!(tracker.range(id), Some(range((1, 3), (1, 9))));
    }

    #[test]
    fn test_invalidate_all() {
        let mut tracker = SpanTracker::new();
        let a = tracker.insert(range((0, 0), (0, 3)), "en_US".into());
        let b = tracker.insert(range((1, 0), (1, 3)), "de_DE".into());

        let mut ids = tracker.invalidate_all();
        ids.sort_by_key(|id| id.0);
        assert_eq!(ids, vec![a, b]);
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_spans_overlapping_sorted() {
        let mut tracker = SpanTracker::new();
        let b = tracker.insert(range((0, 8), (0, 12)), "en_US".into());
        let a = tracker.insert(range((0, 0), (0, 5)), "en_US".into());
        tracker.insert(range((4, 0), (4, 5)), "en_US".into());

        let hits = tracker.spans_overlapping(range((0, 0), (1, 0)));
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].0, a);
        assert_eq!(hits[1].0, b);
    }
}
