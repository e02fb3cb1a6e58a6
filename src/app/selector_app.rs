//! eframe application hosting one polygon selection round.

use eframe::egui;
use egui::Color32;
use egui_plot::{Line, Plot, PlotPoint, Points};

use crate::color::Rgba;
use crate::config::SelectorConfig;
use crate::data::density::{ContourLevel, DensityGrid};
use crate::data::point_set::PointSet;
use crate::error::Result;
use crate::events::EventController;
use crate::session::{Gesture, PolygonSelectionSession};

use super::input::{GestureTracker, PointerInput};

/// Everything needed to show one selection round.
#[derive(Debug, Clone)]
pub struct RoundSpec {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub points: PointSet,
    pub selection_color: Rgba,
    /// Control-population coordinates for the density contours.
    pub reference: Vec<[f64; 2]>,
    pub config: SelectorConfig,
}

pub struct SelectorApp {
    session: PolygonSelectionSession<egui::Context>,
    tracker: GestureTracker,
    contours: Vec<ContourLevel>,
    config: SelectorConfig,
    x_label: String,
    y_label: String,
}

impl SelectorApp {
    pub fn new(ctx: egui::Context, round: RoundSpec, events: EventController) -> Result<Self> {
        let session = PolygonSelectionSession::new(round.points, ctx, round.selection_color)?
            .with_events(events);
        let contours = DensityGrid::estimate(&round.reference, round.config.density_grid())
            .map(|grid| grid.contours(&round.config.contour_levels))
            .unwrap_or_default();
        log::debug!(
            "'{}': {} contour levels from {} control points",
            round.title,
            contours.len(),
            round.reference.len()
        );
        Ok(Self {
            session,
            tracker: GestureTracker::new(),
            contours,
            config: round.config,
            x_label: round.x_label,
            y_label: round.y_label,
        })
    }

    pub fn session(&self) -> &PolygonSelectionSession<egui::Context> {
        &self.session
    }

    fn render_status(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            let new_label = format!("{} New polygon", egui_phosphor::regular::ARROW_COUNTER_CLOCKWISE);
            if ui
                .button(new_label)
                .on_hover_text(self.config.keys.cancel.to_string())
                .clicked()
            {
                self.session.handle_gesture(Gesture::Cancel);
            }
            let close_label = format!("{} Close polygon", egui_phosphor::regular::POLYGON);
            if ui
                .add_enabled(!self.session.draft().is_empty(), egui::Button::new(close_label))
                .on_hover_text(self.config.keys.finish.to_string())
                .clicked()
            {
                self.session.handle_gesture(Gesture::Finish);
            }
            ui.separator();
            ui.label(format!(
                "Selected {} of {} fibres",
                self.session.selected_indices().len(),
                self.session.point_set().count()
            ));
        });
        ui.label(self.config.keys.help_text());
    }

    fn render_plot(&mut self, ui: &mut egui::Ui) {
        let keys = self.config.keys.clone();
        let grab_radius = self.config.vertex_grab_radius as f64;
        let radius = self.config.point_radius;
        let contour_color = self.config.palette.contour.to_color32();
        let selection_color = self.session.selection_color().to_color32();

        let plot = Plot::new("selection_plot")
            .allow_drag(false)
            .allow_double_click_reset(false)
            .x_axis_label(self.x_label.clone())
            .y_axis_label(self.y_label.clone());

        let session = &self.session;
        let tracker = &mut self.tracker;
        let contours = &self.contours;

        let gestures = plot
            .show(ui, |plot_ui| {
                let groups = color_groups(
                    session.point_set().coordinates(),
                    session.displayed_colors(),
                    selection_color,
                );
                for (color, pts) in groups {
                    plot_ui.points(Points::new("fibres", pts).color(color).radius(radius).filled(true));
                }

                for level in contours {
                    for seg in &level.segments {
                        plot_ui.line(
                            Line::new("controls", vec![seg[0], seg[1]])
                                .color(contour_color)
                                .width(1.0),
                        );
                    }
                }

                if let Some(poly) = session.last_polygon() {
                    if let Some(&first) = poly.vertices().first() {
                        let mut outline = poly.vertices().to_vec();
                        outline.push(first);
                        plot_ui.line(Line::new("selection", outline).color(selection_color).width(1.0));
                    }
                }

                let draft = session.draft();
                let pointer = plot_ui.pointer_coordinate().map(|p| [p.x, p.y]);
                if !draft.is_empty() {
                    let mut path = draft.vertices().to_vec();
                    if let Some(p) = pointer {
                        path.push(p);
                    }
                    plot_ui.line(Line::new("draft", path).color(Color32::GRAY).width(1.5));
                    plot_ui.points(
                        Points::new("vertices", draft.vertices().to_vec())
                            .color(Color32::WHITE)
                            .radius(4.0),
                    );
                }

                let resp = plot_ui.response();
                let delta = plot_ui.pointer_coordinate_drag_delta();
                let (modifiers, finish_pressed, cancel_pressed) = resp.ctx.input(|i| {
                    (i.modifiers, keys.finish.pressed(i), keys.cancel.pressed(i))
                });
                let input = PointerInput {
                    plot_pos: pointer,
                    clicked: resp.clicked(),
                    drag_started: resp.drag_started(),
                    dragging: resp.dragged(),
                    drag_stopped: resp.drag_stopped(),
                    drag_delta: [delta.x as f64, delta.y as f64],
                    modifiers,
                    finish_pressed,
                    cancel_pressed,
                };
                let screen_distance = |a: [f64; 2], b: [f64; 2]| {
                    let pa = plot_ui.screen_from_plot(PlotPoint::new(a[0], a[1]));
                    let pb = plot_ui.screen_from_plot(PlotPoint::new(b[0], b[1]));
                    pa.distance(pb) as f64
                };
                tracker.gestures(&input, draft, &keys, grab_radius, screen_distance)
            })
            .inner;

        for g in gestures {
            self.session.handle_gesture(g);
        }
    }
}

/// Group finite points by displayed colour. Groups keep first-seen order
/// except that `on_top` is always drawn last.
fn color_groups(coords: &[[f64; 2]], colors: &[Rgba], on_top: Color32) -> Vec<(Color32, Vec<[f64; 2]>)> {
    let mut groups: Vec<(Color32, Vec<[f64; 2]>)> = Vec::new();
    for (p, c) in coords.iter().zip(colors) {
        if !p[0].is_finite() || !p[1].is_finite() {
            continue;
        }
        let c = c.to_color32();
        match groups.iter_mut().find(|(gc, _)| *gc == c) {
            Some((_, pts)) => pts.push(*p),
            None => groups.push((c, vec![*p])),
        }
    }
    groups.sort_by_key(|(c, _)| *c == on_top);
    groups
}

impl eframe::App for SelectorApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if ctx.input(|i| i.viewport().close_requested()) {
            self.session.disconnect();
        }

        egui::TopBottomPanel::bottom("selection_status").show(ctx, |ui| {
            self.render_status(ui);
        });
        egui::CentralPanel::default().show(ctx, |ui| {
            self.render_plot(ui);
        });
    }
}
