//! Parallel-bus e-paper panel
//!
//! Drives a 6" class panel directly from GPIOs: CKV/SPH/CL on dedicated
//! pins, the remaining control lines through a 4094 shift register, and
//! pixel data on an 8-bit bus.

pub mod bus;
pub mod panel;
pub mod register;

#[cfg(test)]
pub(crate) mod mock;

pub use bus::{DataBus, PanelPins};
pub use panel::Epd;
pub use register::{ControlRegister, ShiftRegister};
