//! The pending-work queue.
//!
//! Work items are (span, dictionary) pairs checked in FIFO order. Inserting
//! a range that overlaps an already-queued span with the same dictionary
//! merges the two into a single covering span in the earlier item's queue
//! slot, so a burst of edits over one region cannot grow the queue without
//! bound. Items for different dictionaries are never merged; the dictionary
//! is part of the item's identity.

use std::collections::VecDeque;

use smol_str::SmolStr;

use crate::position::Range;
use crate::span::{SpanId, SpanTracker};

/// One region awaiting a check.
#[derive(Clone, Debug)]
pub struct WorkItem {
    pub span: SpanId,
    pub dictionary: SmolStr,
}

#[derive(Default)]
pub struct SpellCheckQueue {
    items: VecDeque<WorkItem>,
}

impl SpellCheckQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `range` (already word-aligned) for `dictionary`. Overlapping or
    /// touching queued ranges with the same dictionary are folded into one
    /// covering span; their old spans are retired.
    pub fn enqueue(&mut self, spans: &mut SpanTracker, range: Range, dictionary: &str) {
        if !range.is_valid() || range.is_empty() {
            return;
        }

        let mut covering = range;
        let mut slot: Option<usize> = None;
        loop {
            let merge = self.items.iter().position(|item| {
                item.dictionary == dictionary
                    && spans
                        .range(item.span)
                        .is_some_and(|r| r.touches(covering))
            });
            let Some(idx) = merge else { break };
            let Some(item) = self.items.remove(idx) else {
                break;
            };
            if let Some(r) = spans.range(item.span) {
                covering = covering.union(r);
            }
            spans.remove(item.span);
            slot = Some(slot.map_or(idx, |s| s.min(idx)));
        }

        let span = spans.insert(covering, SmolStr::new(dictionary));
        let item = WorkItem {
            span,
            dictionary: SmolStr::new(dictionary),
        };
        match slot {
            Some(idx) => self.items.insert(idx, item),
            None => self.items.push_back(item),
        }
        tracing::trace!(
            target: "squiggle::queue",
            range = %covering,
            dictionary,
            queued = self.items.len(),
            "enqueued check range"
        );
    }

    /// Pop the oldest item, FIFO.
    pub fn dequeue_next(&mut self) -> Option<WorkItem> {
        self.items.pop_front()
    }

    /// Drop the item holding `span`, if queued. Used when a span is retired
    /// externally. No-op if absent.
    pub fn remove_span(&mut self, span: SpanId) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.span != span);
        self.items.len() != before
    }

    /// Drop every queued item whose span overlaps `range`, retiring the
    /// spans. Used by forced refresh.
    pub fn remove_overlapping(&mut self, spans: &mut SpanTracker, range: Range) {
        self.items.retain(|item| {
            let keep = !spans.range(item.span).is_some_and(|r| r.overlaps(range));
            if !keep {
                spans.remove(item.span);
            }
            keep
        });
    }

    /// Drop everything, retiring all queued spans.
    pub fn clear(&mut self, spans: &mut SpanTracker) {
        for item in self.items.drain(..) {
            spans.remove(item.span);
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &WorkItem> {
        self.items.iter()
    }
}
