//! Canonical widget state
//!
//! This module provides:
//! - The catalog of widget kinds and their start-up defaults
//! - The keyed state store (last write wins, no schema checks)
//! - Swim lane resolution from a free-text running order
//! - The undoable tennis score history

pub mod store;
pub mod swimming;
pub mod tennis;
pub mod widget;

pub use store::StateStore;
pub use swimming::{normalize_order, LaneTable, Placing};
pub use tennis::ScoreHistory;
pub use widget::WidgetKind;
