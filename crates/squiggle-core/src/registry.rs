//! The set of currently-known misspellings.
//!
//! Entries pair a tracked span with the word text and the dictionary that
//! flagged it. The registry answers the rendering queries (what is
//! misspelled at this cursor, which dictionary flagged this range) and is
//! kept consistent by the orchestrator: a span retired anywhere is removed
//! here in the same breath, so every entry's span is always alive.

use smol_str::SmolStr;

use crate::position::{Position, Range};
use crate::span::{SpanId, SpanTracker};

#[derive(Clone, Debug)]
pub struct MisspelledEntry {
    pub span: SpanId,
    pub word: SmolStr,
    pub dictionary: SmolStr,
}

#[derive(Default)]
pub struct MisspelledRegistry {
    entries: Vec<MisspelledEntry>,
}

impl MisspelledRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, entry: MisspelledEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[MisspelledEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The misspelled word under `pos`, if any.
    pub fn misspelled_at(&self, spans: &SpanTracker, pos: Position) -> Option<(Range, &str)> {
        self.entries.iter().find_map(|entry| {
            let range = spans.range(entry.span)?;
            range.contains(pos).then_some((range, entry.word.as_str()))
        })
    }

    /// Dictionary of the entry whose span contains `range`.
    pub fn dictionary_for(&self, spans: &SpanTracker, range: Range) -> Option<&str> {
        self.entries.iter().find_map(|entry| {
            let span_range = spans.range(entry.span)?;
            span_range
                .contains_range(range)
                .then_some(entry.dictionary.as_str())
        })
    }

    /// Drop every entry whose word text is exactly `word` (case-sensitive),
    /// retiring the spans. Used when a word is accepted into a dictionary or
    /// the session ignore list.
    pub fn clear_word(&mut self, spans: &mut SpanTracker, word: &str) {
        let before = self.entries.len();
        self.entries.retain(|entry| {
            if entry.word == word {
                spans.remove(entry.span);
                false
            } else {
                true
            }
        });
        tracing::debug!(
            target: "squiggle::registry",
            word,
            removed = before - self.entries.len(),
            "cleared word"
        );
    }

    /// Drop entries whose span overlaps `range`, retiring the spans. Runs
    /// before a region is re-queued so a fresh check starts from a clean
    /// slate.
    pub fn remove_overlapping(&mut self, spans: &mut SpanTracker, range: Range) {
        self.entries.retain(|entry| {
            let overlapping = spans
                .range(entry.span)
                .is_some_and(|r| r.overlaps(range));
            if overlapping {
                spans.remove(entry.span);
            }
            !overlapping
        });
    }

    /// Drop the entry for `span` (already retired elsewhere). No-op if
    /// absent.
    pub fn remove_span(&mut self, span: SpanId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.span != span);
        self.entries.len() != before
    }

    /// Drop everything, retiring all entry spans.
    pub fn clear_all(&mut self, spans: &mut SpanTracker) {
        for entry in self.entries.drain(..) {
            spans.remove(entry.span);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(line: u32, column: u32) -> Position {
        Position::new(line, column)
    }

    fn range(a: (u32, u32), b: (u32, u32)) -> Range {
        Range::new(pos(a.0, a.1), pos(b.0, b.1))
    }

    fn entry(
        spans: &mut SpanTracker,
        r: Range,
        word: &str,
        dictionary: &str,
    ) -> MisspelledEntry {
        let span = spans.insert(r, SmolStr::new(dictionary));
        spans.set_word(span, SmolStr::new(word));
        MisspelledEntry {
            span,
            word: SmolStr::new(word),
            dictionary: SmolStr::new(dictionary),
        }
    }

    #[test]
    fn test_point_lookup() {
        let mut spans = SpanTracker::new();
        let mut registry = MisspelledRegistry::new();
        registry.insert(entry(&mut spans, range((0, 0), (0, 6)), "Helllo", "en_US"));
        registry.insert(entry(&mut spans, range((0, 7), (0, 12)), "wrold", "en_US"));

        assert_eq!(
            registry.misspelled_at(&spans, pos(0, 8)),
            Some((range((0, 7), (0, 12)), "wrold"))
        );
        assert_eq!(registry.misspelled_at(&spans, pos(0, 6)), None);
    }

    #[test]
    fn test_dictionary_for_containing_range() {
        let mut spans = SpanTracker::new();
        let mut registry = MisspelledRegistry::new();
        registry.insert(entry(&mut spans, range((1, 0), (1, 5)), "wrold", "de_DE"));

        assert_eq!(
            registry.dictionary_for(&spans, range((1, 1), (1, 4))),
            Some("de_DE")
        );
        assert_eq!(registry.dictionary_for(&spans, range((1, 1), (1, 9))), None);
    }

    #[test]
    fn test_clear_word_exact_match_only() {
        let mut spans = SpanTracker::new();
        let mut registry = MisspelledRegistry::new();
        registry.insert(entry(&mut spans, range((0, 0), (0, 3)), "teh", "en_US"));
        registry.insert(entry(&mut spans, range((1, 0), (1, 3)), "teh", "en_US"));
        registry.insert(entry(&mut spans, range((2, 0), (2, 3)), "Teh", "en_US"));

        registry.clear_word(&mut spans, "teh");
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.entries()[0].word, "Teh");
        assert_eq!(spans.len(), 1);
    }

    #[test]
    fn test_remove_overlapping_retires_spans() {
        let mut spans = SpanTracker::new();
        let mut registry = MisspelledRegistry::new();
        registry.insert(entry(&mut spans, range((0, 0), (0, 6)), "Helllo", "en_US"));
        registry.insert(entry(&mut spans, range((3, 0), (3, 5)), "wrold", "en_US"));

        registry.remove_overlapping(&mut spans, range((0, 0), (1, 0)));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.entries()[0].word, "wrold");
        assert_eq!(spans.len(), 1);
    }

    #[test]
    fn test_clear_all() {
        let mut spans = SpanTracker::new();
        let mut registry = MisspelledRegistry::new();
        registry.insert(entry(&mut spans, range((0, 0), (0, 6)), "Helllo", "en_US"));
        registry.clear_all(&mut spans);
        assert!(registry.is_empty());
        assert!(spans.is_empty());
    }
}
