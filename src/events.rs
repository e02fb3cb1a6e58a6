//! Selection event system.
//!
//! Callers subscribe to what a [`PolygonSelectionSession`] does through an
//! [`EventController`].  Each event carries a set of [`EventKind`] flags
//! (bitflags-style) so that a single occurrence can match several categories
//! (a completed polygon is *also* a `SELECTION_CHANGED` event).
//!
//! The caller specifies an [`EventFilter`] to receive only the events they
//! care about.  The filter is a simple OR mask: an event is delivered when
//! `(event.kinds & filter) != 0`.
//!
//! [`PolygonSelectionSession`]: crate::session::PolygonSelectionSession

use std::sync::mpsc::{Receiver, Sender};
use std::sync::{Arc, Mutex};

// ─────────────────────────────────────────────────────────────────────────────
// EventKind – bitflags
// ─────────────────────────────────────────────────────────────────────────────

/// Bitflags describing the *categories* a [`SelectionEvent`] belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EventKind(pub u64);

impl EventKind {
    // ── Drawing ─────────────────────────────────────────────────────────
    /// A vertex was appended to the polygon under construction.
    pub const VERTEX_PLACED: Self = Self(1 << 0);
    /// A single vertex of the draft was dragged.
    pub const VERTEX_MOVED: Self = Self(1 << 1);
    /// The whole draft was translated.
    pub const POLYGON_TRANSLATED: Self = Self(1 << 2);
    /// The draft was discarded to start a new polygon.
    pub const POLYGON_CANCELLED: Self = Self(1 << 3);

    // ── Selection ───────────────────────────────────────────────────────
    /// A polygon was closed and containment recomputed.
    pub const POLYGON_COMPLETED: Self = Self(1 << 4);
    /// The published selected-index set was replaced.
    pub const SELECTION_CHANGED: Self = Self(1 << 5);

    // ── Teardown ────────────────────────────────────────────────────────
    /// Displayed colours were reset to the base colours.
    pub const COLORS_RESTORED: Self = Self(1 << 6);
    /// The session stopped accepting gestures.
    pub const DISCONNECTED: Self = Self(1 << 7);

    /// Wildcard: matches *every* event kind.
    pub const ALL: Self = Self(u64::MAX);

    /// Combine two event kinds (bitwise OR).
    #[inline]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Check whether `self` contains all bits in `other`.
    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    /// Check whether `self` intersects with `other` (at least one bit in common).
    #[inline]
    pub const fn intersects(self, other: Self) -> bool {
        (self.0 & other.0) != 0
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl std::ops::BitOr for EventKind {
    type Output = Self;
    #[inline]
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl std::ops::BitOrAssign for EventKind {
    #[inline]
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl std::ops::BitAnd for EventKind {
    type Output = Self;
    #[inline]
    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            return write!(f, "EMPTY");
        }
        if *self == EventKind::ALL {
            return write!(f, "ALL");
        }

        let pairs: &[(EventKind, &str)] = &[
            (EventKind::VERTEX_PLACED, "VERTEX_PLACED"),
            (EventKind::VERTEX_MOVED, "VERTEX_MOVED"),
            (EventKind::POLYGON_TRANSLATED, "POLYGON_TRANSLATED"),
            (EventKind::POLYGON_CANCELLED, "POLYGON_CANCELLED"),
            (EventKind::POLYGON_COMPLETED, "POLYGON_COMPLETED"),
            (EventKind::SELECTION_CHANGED, "SELECTION_CHANGED"),
            (EventKind::COLORS_RESTORED, "COLORS_RESTORED"),
            (EventKind::DISCONNECTED, "DISCONNECTED"),
        ];

        let mut names = Vec::new();
        let mut known_bits: u64 = 0;
        for (kind, name) in pairs {
            known_bits |= kind.0;
            if self.contains(*kind) {
                names.push((*name).to_string());
            }
        }

        let extra = self.0 & !known_bits;
        if extra != 0 {
            names.push(format!("0x{:x}", extra));
        }
        write!(f, "{}", names.join("|"))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Metadata
// ─────────────────────────────────────────────────────────────────────────────

/// State of the polygon under construction after a drawing gesture.
#[derive(Debug, Clone)]
pub struct DraftMeta {
    pub vertex_count: usize,
    /// Last vertex touched by the gesture, in plot coordinates.
    pub point: Option<[f64; 2]>,
}

/// The selection published after a polygon completed.
#[derive(Debug, Clone)]
pub struct SelectionMeta {
    /// Selected point indices, ascending.
    pub indices: Vec<usize>,
    /// Vertices of the polygon that produced the selection.
    pub polygon: Vec<[f64; 2]>,
    /// Number of points tested.
    pub point_count: usize,
}

// ─────────────────────────────────────────────────────────────────────────────
// SelectionEvent
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct SelectionEvent {
    pub kinds: EventKind,
    /// Seconds since the controller was created; set on emit.
    pub timestamp: f64,
    pub draft: Option<DraftMeta>,
    pub selection: Option<SelectionMeta>,
}

impl SelectionEvent {
    pub fn new(kinds: EventKind) -> Self {
        Self {
            kinds,
            timestamp: 0.0,
            draft: None,
            selection: None,
        }
    }

    pub fn with_draft(mut self, draft: DraftMeta) -> Self {
        self.draft = Some(draft);
        self
    }

    pub fn with_selection(mut self, selection: SelectionMeta) -> Self {
        self.selection = Some(selection);
        self
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// EventFilter
// ─────────────────────────────────────────────────────────────────────────────

/// OR-mask over [`EventKind`]: an event is delivered when
/// `event.kinds.intersects(filter.mask)`.
#[derive(Debug, Clone, Copy)]
pub struct EventFilter {
    pub mask: EventKind,
}

impl EventFilter {
    pub const fn all() -> Self {
        Self {
            mask: EventKind::ALL,
        }
    }

    pub const fn only(mask: EventKind) -> Self {
        Self { mask }
    }

    #[inline]
    pub fn matches(&self, event: &SelectionEvent) -> bool {
        event.kinds.intersects(self.mask)
    }
}

impl Default for EventFilter {
    fn default() -> Self {
        Self::all()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// EventController
// ─────────────────────────────────────────────────────────────────────────────

struct Subscriber {
    filter: EventFilter,
    sender: Sender<SelectionEvent>,
}

/// Collects session events and distributes them to subscribers over `mpsc`
/// channels. Cloning shares the subscriber list.
#[derive(Clone)]
pub struct EventController {
    inner: Arc<Mutex<EventCtrlInner>>,
}

struct EventCtrlInner {
    subscribers: Vec<Subscriber>,
    start_instant: std::time::Instant,
}

impl EventController {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(EventCtrlInner {
                subscribers: Vec::new(),
                start_instant: std::time::Instant::now(),
            })),
        }
    }

    /// Subscribe to events matching the given filter.
    pub fn subscribe(&self, filter: EventFilter) -> Receiver<SelectionEvent> {
        let (tx, rx) = std::sync::mpsc::channel();
        let mut inner = self.inner.lock().unwrap_or_else(|p| p.into_inner());
        inner.subscribers.push(Subscriber { filter, sender: tx });
        rx
    }

    pub fn subscribe_all(&self) -> Receiver<SelectionEvent> {
        self.subscribe(EventFilter::all())
    }

    /// Stamp and deliver an event to every matching subscriber. Subscribers
    /// whose receiver has been dropped are removed the next time an event
    /// matches them.
    pub fn emit(&self, mut event: SelectionEvent) {
        let mut inner = self.inner.lock().unwrap_or_else(|p| p.into_inner());
        event.timestamp = inner.start_instant.elapsed().as_secs_f64();
        inner.subscribers.retain(|sub| {
            if sub.filter.matches(&event) {
                sub.sender.send(event.clone()).is_ok()
            } else {
                true
            }
        });
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .subscribers
            .len()
    }
}

impl Default for EventController {
    fn default() -> Self {
        Self::new()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Unit tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_kind_union_and_intersection() {
        let done = EventKind::POLYGON_COMPLETED;
        let changed = EventKind::SELECTION_CHANGED;
        let combined = done | changed;
        assert!(combined.contains(done));
        assert!(combined.contains(changed));
        assert!(combined.intersects(done));
        assert!(!EventKind::VERTEX_PLACED.intersects(done));
    }

    #[test]
    fn event_filter_matches() {
        let filter = EventFilter::only(EventKind::SELECTION_CHANGED);
        assert!(filter.matches(&SelectionEvent::new(
            EventKind::POLYGON_COMPLETED | EventKind::SELECTION_CHANGED
        )));
        assert!(!filter.matches(&SelectionEvent::new(EventKind::VERTEX_PLACED)));
        assert!(EventFilter::all().matches(&SelectionEvent::new(EventKind::DISCONNECTED)));
    }

    #[test]
    fn event_controller_subscribe_and_emit() {
        let ctrl = EventController::new();
        let rx_all = ctrl.subscribe_all();
        let rx_sel = ctrl.subscribe(EventFilter::only(EventKind::SELECTION_CHANGED));
        let rx_draw = ctrl.subscribe(EventFilter::only(EventKind::VERTEX_PLACED));

        ctrl.emit(SelectionEvent::new(
            EventKind::POLYGON_COMPLETED | EventKind::SELECTION_CHANGED,
        ));

        assert!(rx_all.try_recv().is_ok());
        assert!(rx_sel.try_recv().is_ok());
        assert!(rx_draw.try_recv().is_err());
    }

    #[test]
    fn event_controller_timestamp_set_on_emit() {
        let ctrl = EventController::new();
        let rx = ctrl.subscribe_all();

        std::thread::sleep(std::time::Duration::from_millis(10));
        ctrl.emit(SelectionEvent::new(EventKind::VERTEX_PLACED));

        let evt = rx.try_recv().unwrap();
        assert!(evt.timestamp > 0.0);
    }

    #[test]
    fn event_kind_display() {
        assert_eq!(format!("{}", EventKind::VERTEX_PLACED), "VERTEX_PLACED");
        let combo = EventKind::POLYGON_COMPLETED | EventKind::SELECTION_CHANGED;
        assert_eq!(format!("{}", combo), "POLYGON_COMPLETED|SELECTION_CHANGED");
        assert_eq!(format!("{}", EventKind::ALL), "ALL");
        assert!(format!("{}", EventKind(1 << 63)).starts_with("0x"));
    }

    #[test]
    fn event_kinds_do_not_overlap() {
        let all_kinds = [
            EventKind::VERTEX_PLACED,
            EventKind::VERTEX_MOVED,
            EventKind::POLYGON_TRANSLATED,
            EventKind::POLYGON_CANCELLED,
            EventKind::POLYGON_COMPLETED,
            EventKind::SELECTION_CHANGED,
            EventKind::COLORS_RESTORED,
            EventKind::DISCONNECTED,
        ];
        for (i, a) in all_kinds.iter().enumerate() {
            for (j, b) in all_kinds.iter().enumerate() {
                if i != j {
                    assert!(!a.intersects(*b), "EventKind bits {} and {} overlap", i, j);
                }
            }
        }
    }

    #[test]
    fn dropped_receiver_is_cleaned_up() {
        let ctrl = EventController::new();
        let rx1 = ctrl.subscribe_all();
        let rx2 = ctrl.subscribe_all();
        drop(rx1);

        ctrl.emit(SelectionEvent::new(EventKind::VERTEX_PLACED));
        assert!(rx2.try_recv().is_ok());
        assert_eq!(ctrl.subscriber_count(), 1);
    }

    #[test]
    fn selection_event_carries_metadata() {
        let evt = SelectionEvent::new(EventKind::SELECTION_CHANGED).with_selection(SelectionMeta {
            indices: vec![0, 1],
            polygon: vec![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]],
            point_count: 3,
        });
        assert_eq!(evt.selection.as_ref().unwrap().indices, vec![0, 1]);
        assert!(evt.draft.is_none());
    }
}
