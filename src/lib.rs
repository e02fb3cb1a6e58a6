//! mitoselect crate root: re-exports and module wiring.
//!
//! Manual classification of mitochondrial protein expression per fibre by
//! drawing polygons on a scatter plot of `log(reference)` against
//! `log(protein)`:
//! - `data`: point sets, polygon containment, density contours, dataset
//!   pivoting and classification outputs
//! - `session`: the polygon selection state machine and colour overlay
//! - `events`: selection events published to subscribers
//! - `app`: the egui/eframe selection window and its blocking run helper
//! - `workflow`: the per-protein deficient/positive rounds and output files
//! - `config`: YAML configuration for all of the above

pub mod app;
pub mod color;
pub mod config;
pub mod data;
pub mod error;
pub mod events;
pub mod session;
pub mod workflow;

// Public re-exports for a compact external API
pub use app::{run_selection_round, RoundOutcome, RoundSpec};
pub use color::{ClassPalette, Rgba};
pub use config::{Config, SelectorConfig, WorkflowConfig};
pub use data::point_set::{PointColors, PointSet};
pub use data::polygon::Polygon;
pub use error::{Error, Result};
pub use events::{EventController, EventFilter, EventKind, SelectionEvent};
pub use session::{Gesture, PolygonSelectionSession, SelectionSurface, SessionState};
