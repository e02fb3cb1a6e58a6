pub mod classify;
pub mod dataset;
pub mod density;
pub mod draft;
pub mod hotkeys;
pub mod point_set;
pub mod polygon;
