//! Interactive selection surface built on eframe/egui_plot.
//!
//! | Sub-module       | Responsibility |
//! | ---------------- | -------------- |
//! | [`input`]        | Map pointer/keyboard state to selection gestures |
//! | [`selector_app`] | The eframe app: scatter, contours, polygon overlay, status bar |
//! | [`run`]          | Blocking [`run_selection_round()`] entry point |

pub mod input;
mod run;
mod selector_app;

pub use input::{DragMode, GestureTracker, PointerInput};
pub use run::{run_selection_round, RoundOutcome};
pub use selector_app::{RoundSpec, SelectorApp};
