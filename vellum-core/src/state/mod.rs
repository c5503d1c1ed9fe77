//! Panel refresh state
//!
//! Tracks how many refreshes have run since the last full update and
//! decides whether the next one has to be full.

pub mod panel;

pub use panel::{DirtyRows, PanelState, RefreshMode, RefreshReport};
