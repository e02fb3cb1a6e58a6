//! Blocking entry point for one selection round.
//!
//! [`run_selection_round`] opens a native window, waits until the user closes
//! it and returns the selection the session last published. Rounds can be run
//! back to back; each call creates a fresh window.

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;
use std::sync::mpsc::Receiver;

use eframe::egui;

use crate::error::{Error, Result};
use crate::events::{EventController, EventFilter, EventKind, SelectionEvent};

use super::selector_app::{RoundSpec, SelectorApp};

/// Result of a closed selection window.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoundOutcome {
    /// Indices inside the last polygon the user closed.
    pub selected: BTreeSet<usize>,
    /// How many polygons were closed during the round.
    pub completions: usize,
}

/// Show the selection window for `round` and block until it is closed.
pub fn run_selection_round(round: RoundSpec) -> Result<RoundOutcome> {
    let events = EventController::new();
    let rx = events.subscribe(EventFilter::only(EventKind::SELECTION_CHANGED));
    let creation_error: Rc<RefCell<Option<Error>>> = Rc::new(RefCell::new(None));

    let title = round.title.clone();
    let viewport = egui::ViewportBuilder::default()
        .with_title(title.clone())
        .with_inner_size(egui::vec2(1400.0, 900.0))
        .with_maximized(round.config.maximized);
    let opts = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };

    log::info!("opening selection window '{}'", title);
    let slot = Rc::clone(&creation_error);
    let result = eframe::run_native(
        &title,
        opts,
        Box::new(move |cc| {
            let mut fonts = egui::FontDefinitions::default();
            egui_phosphor::add_to_fonts(&mut fonts, egui_phosphor::Variant::Regular);
            cc.egui_ctx.set_fonts(fonts);
            match SelectorApp::new(cc.egui_ctx.clone(), round, events) {
                Ok(app) => Ok(Box::new(app)),
                Err(e) => {
                    let msg = e.to_string();
                    *slot.borrow_mut() = Some(e);
                    Err(msg.into())
                }
            }
        }),
    );

    if let Some(e) = creation_error.borrow_mut().take() {
        return Err(e);
    }
    result?;

    let outcome = outcome_from(&rx);
    log::info!(
        "'{}' closed with {} fibres selected after {} polygons",
        title,
        outcome.selected.len(),
        outcome.completions
    );
    Ok(outcome)
}

/// Drain pending events: the last published selection wins.
fn outcome_from(rx: &Receiver<SelectionEvent>) -> RoundOutcome {
    let mut outcome = RoundOutcome::default();
    for event in rx.try_iter() {
        if let Some(sel) = event.selection {
            outcome.selected = sel.indices.into_iter().collect();
            outcome.completions += 1;
        }
    }
    outcome
}
