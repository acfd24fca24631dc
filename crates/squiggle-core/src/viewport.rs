//! Per-view scroll debouncing.
//!
//! Scrolling fires notifications far faster than checks should run. Each
//! view keeps the range it last had checked and a debounce deadline that
//! every scroll pushes out; once the deadline passes, only the newly-exposed
//! part of the viewport is handed to the queue.

use std::collections::HashMap;

use web_time::{Duration, Instant};

use crate::position::Range;

/// Opaque view handle, assigned by the embedding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ViewId(pub u32);

#[derive(Debug)]
struct ViewState {
    /// Visible range as of the last fired refresh.
    displayed: Range,
    /// Visible range reported by the most recent scroll.
    pending: Range,
    deadline: Option<Instant>,
}

pub struct ViewportScheduler {
    views: HashMap<ViewId, ViewState>,
    debounce: Duration,
}

impl ViewportScheduler {
    pub fn new(debounce: Duration) -> Self {
        Self {
            views: HashMap::new(),
            debounce,
        }
    }

    pub fn set_debounce(&mut self, debounce: Duration) {
        self.debounce = debounce;
    }

    /// Record a scroll/resize and restart the view's debounce timer.
    pub fn on_scroll(&mut self, view: ViewId, visible: Range, now: Instant) {
        let state = self.views.entry(view).or_insert(ViewState {
            displayed: Range::INVALID,
            pending: visible,
            deadline: None,
        });
        state.pending = visible;
        state.deadline = Some(now + self.debounce);
    }

    /// Views whose debounce expired, as `(view, old_range, new_range)`.
    /// Fired views have their displayed range advanced to the pending one.
    pub fn take_due(&mut self, now: Instant) -> Vec<(ViewId, Range, Range)> {
        let mut due = Vec::new();
        for (view, state) in self.views.iter_mut() {
            if state.deadline.is_some_and(|d| d <= now) {
                state.deadline = None;
                let old = state.displayed;
                state.displayed = state.pending;
                due.push((*view, old, state.pending));
            }
        }
        due.sort_by_key(|(view, _, _)| view.0);
        due
    }

    /// Earliest pending deadline, for embeddings that schedule wakeups.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.views.values().filter_map(|s| s.deadline).min()
    }

    /// Ranges the views currently display, for global re-checks.
    pub fn displayed_ranges(&self) -> Vec<Range> {
        self.views
            .values()
            .map(|s| if s.displayed.is_valid() { s.displayed } else { s.pending })
            .filter(|r| r.is_valid() && !r.is_empty())
            .collect()
    }

    /// Forget a closed view. Anything it caused to be queued stays queued;
    /// over-checking is harmless.
    pub fn view_closed(&mut self, view: ViewId) {
        self.views.remove(&view);
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    pub fn clear(&mut self) {
        self.views.clear();
    }
}

/// The parts of `new` that `old` did not cover. At most two pieces (scrolled
/// down, scrolled up); an invalid `old` exposes all of `new`.
pub fn newly_exposed(old: Range, new: Range) -> Vec<Range> {
    if !new.is_valid() || new.is_empty() {
        return Vec::new();
    }
    if !old.is_valid() || old.is_empty() || !old.overlaps(new) {
        return vec![new];
    }
    let mut out = Vec::new();
    if new.start < old.start {
        out.push(Range::new(new.start, old.start.min(new.end)));
    }
    if new.end > old.end {
        out.push(Range::new(old.end.max(new.start), new.end));
    }
    out
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
    fn test_scroll_down_exposes_tail_only() {
        let old = range((0, 0), (50, 0));
        let new = range((30, 0), (80, 0));
        assert_eq!(newly_exposed(old, new), vec![range((50, 0), (80, 0))]);
    }

    #[test]
    fn test_scroll_up_exposes_head_only() {
        let old = range((30, 0), (80, 0));
        let new = range((10, 0), (60, 0));
        assert_eq!(newly_exposed(old, new), vec![range((10, 0), (30, 0))]);
    }

    #[test]
    fn test_jump_exposes_whole_viewport() {
        let old = range((0, 0), (50, 0));
        let new = range((200, 0), (250, 0));
        assert_eq!(newly_exposed(old, new), vec![new]);
    }

    #[test]
    fn test_no_movement_exposes_nothing() {
        let r = range((0, 0), (50, 0));
        assert!(newly_exposed(r, r).is_empty());
    }

    #[test]
    fn test_first_display_exposes_everything() {
        let new = range((0, 0), (40, 0));
        assert_eq!(newly_exposed(Range::INVALID, new), vec![new]);
    }

    #[test]
    fn test_debounce_restarts_on_scroll() {
        let mut sched = ViewportScheduler::new(Duration::from_millis(100));
        let t0 = Instant::now();
        let view = ViewId(1);

        sched.on_scroll(view, range((0, 0), (50, 0)), t0);
        assert!(sched.take_due(t0 + Duration::from_millis(50)).is_empty());

        // A second scroll pushes the deadline out.
        sched.on_scroll(view, range((30, 0), (80, 0)), t0 + Duration::from_millis(50));
        assert!(sched.take_due(t0 + Duration::from_millis(120)).is_empty());

        let due = sched.take_due(t0 + Duration::from_millis(150));
        assert_eq!(due.len(), 1);
        let (fired, old, new) = due[0];
        assert_eq!(fired, view);
        assert!(!old.is_valid());
        assert_eq!(new, range((30, 0), (80, 0)));

        // Fired once; nothing further without a new scroll.
        assert!(sched.take_due(t0 + Duration::from_millis(300)).is_empty());
    }

    #[test]
    fn test_view_closed_discards_state() {
        let mut sched = ViewportScheduler::new(Duration::from_millis(100));
        let t0 = Instant::now();
        sched.on_scroll(ViewId(7), range((0, 0), (10, 0)), t0);
        sched.view_closed(ViewId(7));
        assert!(sched.take_due(t0 + Duration::from_millis(500)).is_empty());
        assert!(sched.is_empty());
    }
}
