//! The single active check session.
//!
//! At most one oracle session is outstanding at any time, enforced here. The
//! session owns the current work item, the text that was submitted, and the
//! offset table that maps oracle char offsets back to buffer positions. A
//! result is committed only if the item's span is still alive and the mapped
//! word still falls inside it; anything else is silently dropped rather than
//! mis-rendered.

use smol_str::SmolStr;

use crate::document::Document;
use crate::oracle::{OracleError, OracleEvent, SpellOracle};
use crate::position::{Position, Range};
use crate::queue::WorkItem;
use crate::registry::{MisspelledEntry, MisspelledRegistry};
use crate::span::{SpanId, SpanTracker};

/// Session lifecycle. `Done` and `Aborted` collapse straight back to `Idle`;
/// only the observable resting states are represented.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SessionState {
    #[default]
    Idle,
    /// Text submitted, no result yet.
    Started,
    /// At least one misspelling received.
    Misspelling,
}

/// Maps char offsets of the submitted text back to buffer positions.
///
/// One entry per line segment of the submitted range. Positions are recorded
/// as of submission time; lookups re-anchor against the span's current start
/// so that edits entirely before the span (which shift it wholesale) do not
/// invalidate the table. Edits inside the span abort the session instead.
#[derive(Debug)]
struct OffsetTable {
    origin: Range,
    entries: Vec<(usize, Position)>,
}

impl OffsetTable {
    fn build(range: Range, text: &str) -> Self {
        let mut entries = Vec::new();
        let mut offset = 0usize;
        let mut line = range.start.line;
        for (i, part) in text.split('\n').enumerate() {
            let column = if i == 0 { range.start.column } else { 0 };
            entries.push((offset, Position::new(line, column)));
            offset += part.chars().count() + 1;
            line += 1;
        }
        Self {
            origin: range,
            entries,
        }
    }

    /// Buffer position for `offset`, re-anchored to where the span sits now.
    fn position(&self, offset: usize, current_start: Position) -> Option<Position> {
        let idx = self
            .entries
            .partition_point(|(entry_offset, _)| *entry_offset <= offset)
            .checked_sub(1)?;
        let (entry_offset, base) = self.entries[idx];
        let original = Position::new(base.line, base.column + (offset - entry_offset) as u32);

        let line = (original.line + current_start.line).checked_sub(self.origin.start.line)?;
        let column = if original.line == self.origin.start.line {
            (original.column + current_start.column).checked_sub(self.origin.start.column)?
        } else {
            original.column
        };
        Some(Position::new(line, column))
    }
}

struct CurrentItem {
    span: SpanId,
    dictionary: SmolStr,
    offsets: OffsetTable,
}

/// Drives one work item at a time through the oracle.
#[derive(Default)]
pub struct CheckSession {
    state: SessionState,
    current: Option<CurrentItem>,
}

impl CheckSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == SessionState::Idle
    }

    /// Span of the item being checked, if any.
    pub fn current_span(&self) -> Option<SpanId> {
        self.current.as_ref().map(|c| c.span)
    }

    /// Submit `item` to the oracle. The caller guarantees the span is alive.
    /// On oracle failure the item is dropped fail-open and the session stays
    /// idle; the error is returned for one-shot reporting.
    pub fn start(
        &mut self,
        oracle: &mut dyn SpellOracle,
        spans: &SpanTracker,
        doc: &dyn Document,
        item: WorkItem,
    ) -> Result<(), OracleError> {
        debug_assert!(self.is_idle());
        let Some(range) = spans.range(item.span) else {
            return Ok(());
        };
        let text = doc.text_in(range);

        oracle.set_dictionary(&item.dictionary)?;
        oracle.begin_check(&text)?;

        tracing::debug!(
            target: "squiggle::session",
            range = %range,
            dictionary = %item.dictionary,
            chars = text.chars().count(),
            "check started"
        );
        self.current = Some(CurrentItem {
            span: item.span,
            dictionary: item.dictionary,
            offsets: OffsetTable::build(range, &text),
        });
        self.state = SessionState::Started;
        Ok(())
    }

    /// Feed one oracle event through the machine. Returns `true` when the
    /// session reached `Done` and went idle.
    pub fn handle_event(
        &mut self,
        event: OracleEvent,
        spans: &mut SpanTracker,
        registry: &mut MisspelledRegistry,
    ) -> bool {
        match event {
            OracleEvent::Misspelling { word, offset } => {
                let Some(current) = &self.current else {
                    return false;
                };
                self.state = SessionState::Misspelling;
                // Liveness first: the span may have been retired after the
                // oracle produced this event.
                let Some(item_range) = spans.range(current.span) else {
                    return false;
                };
                let Some(start) = current.offsets.position(offset, item_range.start) else {
                    return false;
                };
                let end = Position::new(start.line, start.column + word.chars().count() as u32);
                let word_range = Range::new(start, end);
                if !item_range.contains_range(word_range) {
                    tracing::trace!(
                        target: "squiggle::session",
                        range = %word_range,
                        word = %word,
                        "dropping stale misspelling outside item range"
                    );
                    return false;
                }
                let span = spans.insert(word_range, current.dictionary.clone());
                spans.set_word(span, word.clone());
                registry.insert(MisspelledEntry {
                    span,
                    word,
                    dictionary: current.dictionary.clone(),
                });
                false
            }
            OracleEvent::Finished => {
                if let Some(current) = self.current.take() {
                    // Release the item's span: no longer pending.
                    spans.remove(current.span);
                }
                self.state = SessionState::Idle;
                tracing::debug!(target: "squiggle::session", "check done");
                true
            }
        }
    }

    /// Abort the in-flight session. Returns the item's surviving range and
    /// dictionary so the caller can decide to re-queue it; `None` when idle
    /// or the span is already gone.
    pub fn abort(
        &mut self,
        oracle: &mut dyn SpellOracle,
        spans: &mut SpanTracker,
    ) -> Option<(Range, SmolStr)> {
        let current = self.current.take()?;
        oracle.cancel();
        self.state = SessionState::Idle;
        let survivor = spans.range(current.span).map(|r| (r, current.dictionary));
        spans.remove(current.span);
        tracing::debug!(target: "squiggle::session", requeue = survivor.is_some(), "check aborted");
        survivor
    }
}
