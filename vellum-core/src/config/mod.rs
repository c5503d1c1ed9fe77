//! Configuration types
//!
//! Resolved configuration values for the panel: refresh policy, geometry
//! and pin assignment. Everything here is validated once, before a driver
//! is constructed; an invalid configuration never reaches the bus.

pub mod error;
pub mod pins;
pub mod types;

pub use error::ConfigError;
pub use pins::{DataLine, PinAssignment, PinRole, PIN_COUNT};
pub use types::*;
