//! The on-the-fly checker: wiring between edits, the viewport, the queue,
//! and the oracle session.
//!
//! One checker exists per open document, constructed and destroyed alongside
//! it. All state lives on the document's event-processing thread; the only
//! suspension point is the oracle session, which is pumped by [`poll`].
//! The embedding is expected to call `poll` whenever it goes idle or the
//! oracle signals readiness, and `tick` from its timer.
//!
//! [`poll`]: OnTheFlyChecker::poll

use smol_str::SmolStr;
use web_time::Instant;

use crate::boundary::{UnicodeWordBoundaries, WordBoundaries};
use crate::config::{CheckerConfig, ConfigError};
use crate::document::Document;
use crate::edits::EditTracker;
use crate::oracle::SpellOracle;
use crate::position::{Position, Range};
use crate::queue::SpellCheckQueue;
use crate::registry::MisspelledRegistry;
use crate::session::{CheckSession, SessionState};
use crate::span::{SpanId, SpanTracker};
use crate::viewport::{ViewId, ViewportScheduler, newly_exposed};

pub struct OnTheFlyChecker<O: SpellOracle> {
    oracle: O,
    config: CheckerConfig,
    spans: SpanTracker,
    queue: SpellCheckQueue,
    edits: EditTracker,
    session: CheckSession,
    registry: MisspelledRegistry,
    views: ViewportScheduler,
    resolver: Box<dyn WordBoundaries>,
    oracle_warned: bool,
}

impl<O: SpellOracle> OnTheFlyChecker<O> {
    pub fn new(oracle: O, config: CheckerConfig) -> Self {
        Self::with_resolver(oracle, config, Box::new(UnicodeWordBoundaries))
    }

    /// Use a custom boundary resolver matching the oracle's tokenization.
    pub fn with_resolver(
        oracle: O,
        config: CheckerConfig,
        resolver: Box<dyn WordBoundaries>,
    ) -> Self {
        let views = ViewportScheduler::new(config.debounce);
        Self {
            oracle,
            config,
            spans: SpanTracker::new(),
            queue: SpellCheckQueue::new(),
            edits: EditTracker::new(),
            session: CheckSession::new(),
            registry: MisspelledRegistry::new(),
            views,
            resolver,
            oracle_warned: false,
        }
    }

    // === Edit notifications ===

    /// Text now occupies `inserted` (post-edit coordinates).
    pub fn text_inserted(&mut self, doc: &dyn Document, inserted: Range) {
        if !inserted.is_valid() || inserted.is_empty() {
            return;
        }
        // An insert landing strictly inside the item being checked makes the
        // submitted text stale; abort and re-queue the adjusted region.
        let split_current = self
            .current_range()
            .is_some_and(|r| r.start < inserted.start && inserted.start < r.end);

        self.spans.map_insert(inserted);
        if split_current {
            self.abort_current(doc, true);
        }
        self.edits.record_insert(inserted);
        tracing::trace!(target: "squiggle::check", range = %inserted, "text inserted");
    }

    /// The text under `removed` (pre-edit coordinates) was deleted.
    pub fn text_removed(&mut self, doc: &dyn Document, removed: Range) {
        if !removed.is_valid() || removed.is_empty() {
            return;
        }
        let overlapped_current = self.current_range().is_some_and(|r| r.overlaps(removed));

        for id in self.spans.map_remove(removed) {
            self.retire_span(id);
        }
        // The current item may have survived in part; its submitted text is
        // stale all the same.
        if overlapped_current && !self.session.is_idle() {
            self.abort_current(doc, true);
        }
        self.edits.record_remove(removed);
        tracing::trace!(target: "squiggle::check", range = %removed, "text removed");
    }

    // === View notifications ===

    pub fn view_scrolled(&mut self, view: ViewId, visible: Range, now: Instant) {
        self.views.on_scroll(view, visible, now);
    }

    pub fn view_closed(&mut self, view: ViewId) {
        self.views.view_closed(view);
    }

    /// Earliest time `tick` has work to do.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.views.next_deadline()
    }

    /// Fire due viewport timers: queue the newly exposed part of each view
    /// plus the look-ahead margin.
    pub fn tick(&mut self, doc: &dyn Document, now: Instant) {
        for (view, old, new) in self.views.take_due(now) {
            tracing::debug!(
                target: "squiggle::check",
                view = view.0,
                old = %old,
                new = %new,
                "viewport refresh"
            );
            for piece in newly_exposed(old, new) {
                let extended = self.extend_lookahead(piece, new);
                self.enqueue_region(doc, extended);
            }
        }
    }

    // === Driving the check loop ===

    /// Pump the engine: consume pending oracle events, flush the edit log
    /// once the queue drains, and start the next session. Returns when the
    /// oracle is mid-check or there is nothing left to do.
    pub fn poll(&mut self, doc: &dyn Document) {
        loop {
            if !self.session.is_idle() {
                while let Some(event) = self.oracle.next_event() {
                    if self
                        .session
                        .handle_event(event, &mut self.spans, &mut self.registry)
                    {
                        break;
                    }
                }
                if !self.session.is_idle() {
                    // Oracle still working; come back later.
                    return;
                }
            }

            if self.queue.is_empty() && !self.edits.is_empty() {
                let dictionary = self.config.dictionary.clone();
                for range in self.edits.take_check_ranges(doc, self.resolver.as_ref()) {
                    self.registry.remove_overlapping(&mut self.spans, range);
                    self.queue.enqueue(&mut self.spans, range, &dictionary);
                }
            }

            let Some(item) = self.queue.dequeue_next() else {
                return;
            };
            if !self.spans.is_alive(item.span) {
                continue;
            }
            let span = item.span;
            if let Err(err) = self.session.start(&mut self.oracle, &self.spans, doc, item) {
                // Fail-open: the region is presumed correct; move on.
                if !self.oracle_warned {
                    tracing::warn!(target: "squiggle::check", error = %err, "oracle unavailable");
                    self.oracle_warned = true;
                }
                self.spans.remove(span);
            }
        }
    }

    // === Forced re-checks and configuration ===

    /// Re-check `range`, or everything currently displayed when `None`.
    pub fn refresh(&mut self, doc: &dyn Document, range: Option<Range>) {
        match range {
            Some(range) => {
                let range = doc.clip_range(range);
                self.queue.remove_overlapping(&mut self.spans, range);
                self.registry.remove_overlapping(&mut self.spans, range);
                // Requeue the aborted item in full: its coverage outside the
                // refresh range must not be lost. The queue merge folds the
                // overlap with the range enqueued below into one item.
                if self.current_range().is_some_and(|r| r.overlaps(range)) {
                    self.abort_current(doc, true);
                }
                self.enqueue_region(doc, range);
            }
            None => {
                self.abort_current(doc, false);
                self.queue.clear(&mut self.spans);
                self.registry.clear_all(&mut self.spans);
                self.edits.clear();
                for range in self.views.displayed_ranges() {
                    self.enqueue_region(doc, range);
                }
            }
        }
    }

    /// Apply new settings. A rejected dictionary leaves everything as it
    /// was; a dictionary change invalidates all results and re-queues every
    /// displayed range under the new dictionary.
    pub fn update_config(
        &mut self,
        doc: &dyn Document,
        config: CheckerConfig,
    ) -> Result<(), ConfigError> {
        let dictionary_changed = config.dictionary != self.config.dictionary;
        if dictionary_changed {
            self.oracle
                .set_dictionary(&config.dictionary)
                .map_err(|_| ConfigError::UnknownDictionary(config.dictionary.to_string()))?;
        }
        self.views.set_debounce(config.debounce);
        self.config = config;

        if dictionary_changed {
            tracing::debug!(
                target: "squiggle::check",
                dictionary = %self.config.dictionary,
                "dictionary changed, invalidating all results"
            );
            self.abort_current(doc, false);
            self.queue.clear(&mut self.spans);
            self.registry.clear_all(&mut self.spans);
            for range in self.views.displayed_ranges() {
                self.enqueue_region(doc, range);
            }
        }
        Ok(())
    }

    /// The document is going away: drop every span and abort the session.
    pub fn document_closed(&mut self) {
        self.session.abort(&mut self.oracle, &mut self.spans);
        self.spans.invalidate_all();
        self.queue.clear(&mut self.spans);
        self.registry.clear_all(&mut self.spans);
        self.edits.clear();
        self.views.clear();
    }

    // === Word acceptance ===

    /// Accept `word` permanently and drop its markers everywhere.
    pub fn add_word_to_dictionary(&mut self, word: &str) {
        self.oracle.add_word_to_dictionary(word);
        self.clear_word(word);
    }

    /// Accept `word` for this session and drop its markers everywhere.
    pub fn add_word_to_session(&mut self, word: &str) {
        self.oracle.add_word_to_session(word);
        self.clear_word(word);
    }

    /// Remove every marker whose text is exactly `word`.
    pub fn clear_word(&mut self, word: &str) {
        self.registry.clear_word(&mut self.spans, word);
    }

    // === Queries ===

    /// The misspelled word under `pos`, if any.
    pub fn misspelled_at(&self, pos: Position) -> Option<(Range, &str)> {
        self.registry.misspelled_at(&self.spans, pos)
    }

    /// Dictionary of the marker containing `range`.
    pub fn dictionary_for(&self, range: Range) -> Option<&str> {
        self.registry.dictionary_for(&self.spans, range)
    }

    /// All known misspellings, sorted by position.
    pub fn misspellings(&self) -> Vec<(Range, SmolStr)> {
        let mut out: Vec<(Range, SmolStr)> = self
            .registry
            .entries()
            .iter()
            .filter_map(|e| self.spans.range(e.span).map(|r| (r, e.word.clone())))
            .collect();
        out.sort_by_key(|(r, _)| r.start);
        out
    }

    /// Every live span intersecting `range` (queued, in-flight, or flagged).
    /// Debug/inspection surface.
    pub fn installed_spans(&self, range: Range) -> Vec<Range> {
        self.spans
            .spans_overlapping(range)
            .into_iter()
            .map(|(_, r)| r)
            .collect()
    }

    pub fn pending_checks(&self) -> usize {
        self.queue.len()
    }

    pub fn session_state(&self) -> SessionState {
        self.session.state()
    }

    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    /// Direct backend access, e.g. to manage dictionaries. Mutating the
    /// active session through this is the host's own lookout.
    pub fn oracle_mut(&mut self) -> &mut O {
        &mut self.oracle
    }

    // === Internals ===

    fn current_range(&self) -> Option<Range> {
        self.session
            .current_span()
            .and_then(|id| self.spans.range(id))
    }

    /// Purge a retired span from whichever collection holds it.
    fn retire_span(&mut self, id: SpanId) {
        if self.session.current_span() == Some(id) {
            // Span is already gone from the tracker; abort yields no
            // survivor and nothing is re-queued.
            self.session.abort(&mut self.oracle, &mut self.spans);
        }
        self.queue.remove_span(id);
        self.registry.remove_span(id);
    }

    fn abort_current(&mut self, doc: &dyn Document, requeue: bool) {
        if let Some((range, dictionary)) = self.session.abort(&mut self.oracle, &mut self.spans) {
            if requeue {
                let dictionary = dictionary.clone();
                self.enqueue_with(doc, range, &dictionary);
            }
        }
    }

    fn enqueue_region(&mut self, doc: &dyn Document, range: Range) {
        let dictionary = self.config.dictionary.clone();
        self.enqueue_with(doc, range, &dictionary);
    }

    /// Word-align `range`, split it per line, and queue each piece under
    /// `dictionary`, dropping stale markers it covers.
    fn enqueue_with(&mut self, doc: &dyn Document, range: Range, dictionary: &str) {
        let expanded = self.resolver.expand(doc, range);
        if !expanded.is_valid() || expanded.is_empty() {
            return;
        }
        for line in expanded.start.line..=expanded.end.line {
            let line_range = Range::new(
                Position::new(line, 0),
                Position::new(line, doc.line_len(line)),
            );
            let piece = expanded.intersect(line_range);
            if piece.is_empty() {
                continue;
            }
            self.registry.remove_overlapping(&mut self.spans, piece);
            self.queue.enqueue(&mut self.spans, piece, dictionary);
        }
    }

    /// Widen a viewport delta by the look-ahead margin on the edge(s) that
    /// moved.
    fn extend_lookahead(&self, piece: Range, viewport: Range) -> Range {
        let margin = self.config.lookahead_lines;
        let mut out = piece;
        if piece.start == viewport.start {
            out.start = Position::new(piece.start.line.saturating_sub(margin), 0);
        }
        if piece.end == viewport.end {
            out.end = Position::new(piece.end.line.saturating_add(margin), u32::MAX);
        }
        out
    }
}
