//! Polygon selection over a fixed point set.
//!
//! A [`PolygonSelectionSession`] bridges polygon-drawing gestures to the set
//! of point indices inside the most recently closed polygon. It owns the
//! per-point colour overlay used for visual feedback and asks its bound
//! [`SelectionSurface`] to redraw whenever that overlay changes.
//!
//! State machine:
//!
//! ```text
//!            PlaceVertex              Finish / close on first vertex
//!   Idle ─────────────────▶ Drawing ───────────────────────────────▶ (Completed) ─┐
//!    ▲                        │  ▲ PlaceVertex / MoveVertex / Translate           │
//!    │        Cancel          │  └──────────┘                                     │
//!    ├────────────────────────┘                                                   │
//!    └────────────────────────────────────────────────────────────────────────────┘
//!
//!   any state ── disconnect() ──▶ Disconnected (terminal)
//! ```
//!
//! `Completed` is transient: closing a polygon recomputes the selection and
//! immediately returns the session to `Idle`, so a replacement polygon can be
//! drawn straight away.

use std::collections::BTreeSet;

use eframe::egui;

use crate::color::Rgba;
use crate::data::draft::PolygonDraft;
use crate::data::point_set::PointSet;
use crate::data::polygon::Polygon;
use crate::error::{Error, Result};
use crate::events::{DraftMeta, EventController, EventKind, SelectionEvent, SelectionMeta};

/// Something that displays the session's points and can be asked to redraw.
pub trait SelectionSurface {
    fn request_redraw(&self);
}

impl SelectionSurface for egui::Context {
    fn request_redraw(&self) {
        self.request_repaint();
    }
}

/// Headless surface: redraw requests are dropped.
impl SelectionSurface for () {
    fn request_redraw(&self) {}
}

impl<S: SelectionSurface + ?Sized> SelectionSurface for &S {
    fn request_redraw(&self) {
        (**self).request_redraw();
    }
}

/// A user gesture, already translated from raw input to plot coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gesture {
    /// Append a vertex to the polygon under construction.
    PlaceVertex([f64; 2]),
    /// Drag a single vertex of the draft.
    MoveVertex { index: usize, to: [f64; 2] },
    /// Drag the whole draft.
    Translate { delta: [f64; 2] },
    /// Close the draft and recompute the selection.
    Finish,
    /// Discard the draft and start a new polygon.
    Cancel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Drawing,
    Disconnected,
}

pub struct PolygonSelectionSession<S: SelectionSurface> {
    points: PointSet,
    selection_color: Rgba,
    displayed: Vec<Rgba>,
    selected: BTreeSet<usize>,
    draft: PolygonDraft,
    last_polygon: Option<Polygon>,
    state: SessionState,
    surface: S,
    events: Option<EventController>,
}

impl<S: SelectionSurface> PolygonSelectionSession<S> {
    /// Bind a session to `points` and `surface`.
    ///
    /// Fails with [`Error::MissingColorState`] when the point set carries no
    /// base colours, since the overlay is built from them.
    pub fn new(points: PointSet, surface: S, selection_color: Rgba) -> Result<Self> {
        if points.base_colors().is_empty() {
            return Err(Error::MissingColorState);
        }
        let displayed = points.base_colors().to_vec();
        log::debug!(
            "selection session bound to {} points, selection colour {:?}",
            points.count(),
            selection_color
        );
        Ok(Self {
            points,
            selection_color,
            displayed,
            selected: BTreeSet::new(),
            draft: PolygonDraft::new(),
            last_polygon: None,
            state: SessionState::Idle,
            surface,
            events: None,
        })
    }

    /// Publish session events to `events`.
    pub fn with_events(mut self, events: EventController) -> Self {
        self.events = Some(events);
        self
    }

    pub fn point_set(&self) -> &PointSet {
        &self.points
    }

    pub fn selection_color(&self) -> Rgba {
        self.selection_color
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state != SessionState::Disconnected
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// The polygon currently being drawn.
    pub fn draft(&self) -> &PolygonDraft {
        &self.draft
    }

    /// The polygon that produced the current selection, if any.
    pub fn last_polygon(&self) -> Option<&Polygon> {
        self.last_polygon.as_ref()
    }

    /// Current colour of every point, index-aligned with the point set.
    pub fn displayed_colors(&self) -> &[Rgba] {
        &self.displayed
    }

    /// Indices inside the most recently completed polygon. Stays readable
    /// after [`disconnect`](Self::disconnect).
    pub fn selected_indices(&self) -> &BTreeSet<usize> {
        &self.selected
    }

    /// Apply one gesture. Returns `false` when the gesture does not apply in
    /// the current state (drawing edits while idle, anything after
    /// disconnect).
    pub fn handle_gesture(&mut self, gesture: Gesture) -> bool {
        if self.state == SessionState::Disconnected {
            log::debug!("ignoring {:?} on disconnected session", gesture);
            return false;
        }
        match gesture {
            Gesture::PlaceVertex(p) => {
                self.draft.push(p);
                self.state = SessionState::Drawing;
                self.emit_draft(EventKind::VERTEX_PLACED, Some(p));
            }
            Gesture::MoveVertex { index, to } => {
                if self.state != SessionState::Drawing || !self.draft.move_vertex(index, to) {
                    return false;
                }
                self.emit_draft(EventKind::VERTEX_MOVED, Some(to));
            }
            Gesture::Translate { delta } => {
                if self.state != SessionState::Drawing {
                    return false;
                }
                self.draft.translate(delta);
                self.emit_draft(EventKind::POLYGON_TRANSLATED, None);
            }
            Gesture::Finish => {
                if self.state != SessionState::Drawing {
                    return false;
                }
                let polygon = self.draft.take_polygon();
                self.on_polygon_completed(polygon);
                return true;
            }
            Gesture::Cancel => {
                if self.state != SessionState::Drawing {
                    return false;
                }
                self.draft.clear();
                self.state = SessionState::Idle;
                self.emit_draft(EventKind::POLYGON_CANCELLED, None);
            }
        }
        self.surface.request_redraw();
        true
    }

    /// Replace the selection with the points contained in `polygon` and
    /// recolour the overlay. Any draft in progress is discarded and the
    /// session returns to `Idle`. Ignored after disconnect.
    pub fn on_polygon_completed(&mut self, polygon: impl Into<Polygon>) {
        if self.state == SessionState::Disconnected {
            log::debug!("ignoring completed polygon on disconnected session");
            return;
        }
        let polygon = polygon.into();
        let indices = polygon.contained_indices(self.points.coordinates());
        self.selected = indices.iter().copied().collect();

        self.displayed.copy_from_slice(self.points.base_colors());
        for &i in &indices {
            self.displayed[i] = self.selection_color;
        }
        log::info!(
            "polygon with {} vertices selected {} of {} points",
            polygon.vertices().len(),
            indices.len(),
            self.points.count()
        );

        self.draft.clear();
        self.state = SessionState::Idle;
        self.surface.request_redraw();

        if let Some(events) = &self.events {
            events.emit(
                SelectionEvent::new(EventKind::POLYGON_COMPLETED | EventKind::SELECTION_CHANGED)
                    .with_selection(SelectionMeta {
                        indices,
                        polygon: polygon.vertices().to_vec(),
                        point_count: self.points.count(),
                    }),
            );
        }
        self.last_polygon = Some(polygon);
    }

    /// Stop accepting gestures and restore every point to its base colour.
    /// Calling it again has no further effect.
    pub fn disconnect(&mut self) {
        if self.state == SessionState::Disconnected {
            return;
        }
        self.draft.clear();
        self.displayed.copy_from_slice(self.points.base_colors());
        self.state = SessionState::Disconnected;
        self.surface.request_redraw();
        log::debug!(
            "selection session disconnected with {} points selected",
            self.selected.len()
        );
        if let Some(events) = &self.events {
            events.emit(SelectionEvent::new(
                EventKind::COLORS_RESTORED | EventKind::DISCONNECTED,
            ));
        }
    }

    fn emit_draft(&self, kind: EventKind, point: Option<[f64; 2]>) {
        if let Some(events) = &self.events {
            events.emit(SelectionEvent::new(kind).with_draft(DraftMeta {
                vertex_count: self.draft.len(),
                point,
            }));
        }
    }
}
