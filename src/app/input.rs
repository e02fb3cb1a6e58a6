//! Translate pointer and keyboard state into selection [`Gesture`]s.
//!
//! Kept free of egui's `PlotUi` so the mapping can be exercised headless:
//! the plot widget fills a [`PointerInput`] each frame and
//! [`GestureTracker::gestures`] decides what it means.

use eframe::egui;

use crate::data::draft::PolygonDraft;
use crate::data::hotkeys::SelectorKeys;
use crate::session::Gesture;

/// One frame of pointer/keyboard state over the plot, in plot coordinates.
#[derive(Debug, Clone, Default)]
pub struct PointerInput {
    pub plot_pos: Option<[f64; 2]>,
    pub clicked: bool,
    pub drag_started: bool,
    pub dragging: bool,
    pub drag_stopped: bool,
    /// Pointer movement since the previous frame, in plot units.
    pub drag_delta: [f64; 2],
    pub modifiers: egui::Modifiers,
    pub finish_pressed: bool,
    pub cancel_pressed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragMode {
    Translate,
    Vertex(usize),
}

#[derive(Debug, Default)]
pub struct GestureTracker {
    drag: Option<DragMode>,
}

impl GestureTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn drag_mode(&self) -> Option<DragMode> {
        self.drag
    }

    /// Gestures for this frame.
    ///
    /// `screen_distance` measures two plot points in screen pixels and is
    /// compared against `grab_radius` both for grabbing a vertex and for
    /// closing the polygon by clicking its first vertex.
    pub fn gestures<F>(
        &mut self,
        input: &PointerInput,
        draft: &PolygonDraft,
        keys: &SelectorKeys,
        grab_radius: f64,
        screen_distance: F,
    ) -> Vec<Gesture>
    where
        F: Fn([f64; 2], [f64; 2]) -> f64,
    {
        if input.cancel_pressed {
            self.drag = None;
            return vec![Gesture::Cancel];
        }
        if input.finish_pressed {
            self.drag = None;
            return vec![Gesture::Finish];
        }

        let mut out = Vec::new();

        if input.drag_started && !draft.is_empty() {
            self.drag = if keys.translate.matches(&input.modifiers) {
                Some(DragMode::Translate)
            } else if keys.move_vertex.matches(&input.modifiers) {
                input
                    .plot_pos
                    .and_then(|p| draft.nearest_vertex(p, grab_radius, &screen_distance))
                    .map(DragMode::Vertex)
            } else {
                None
            };
        }

        if input.dragging {
            match (self.drag, input.plot_pos) {
                (Some(DragMode::Translate), _) => {
                    if input.drag_delta != [0.0, 0.0] {
                        out.push(Gesture::Translate {
                            delta: input.drag_delta,
                        });
                    }
                }
                (Some(DragMode::Vertex(index)), Some(to)) => {
                    out.push(Gesture::MoveVertex { index, to });
                }
                _ => {}
            }
        }

        if input.drag_stopped {
            self.drag = None;
        }

        if input.clicked && self.drag.is_none() {
            if let Some(p) = input.plot_pos {
                let closes = draft.len() >= 3
                    && draft
                        .first()
                        .is_some_and(|first| screen_distance(first, p) <= grab_radius);
                out.push(if closes {
                    Gesture::Finish
                } else {
                    Gesture::PlaceVertex(p)
                });
            }
        }
        out
    }
}
