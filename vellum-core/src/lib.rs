//! Board-agnostic core logic for the Vellum e-paper panel driver
//!
//! This crate contains everything that does not touch a pin:
//!
//! - Configuration types with defaults and validation
//! - Panel state (full/partial refresh policy)
//! - Frame buffer with 2-bit pixels
//! - Drive waveform planning (clean frames, bit-plane passes)
//! - Content sources (writer callback, declarative pages)
//! - Polling schedule for periodic refreshes

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod config;
pub mod content;
pub mod framebuffer;
pub mod scheduler;
pub mod state;
pub mod waveform;

pub use config::{ConfigError, DataLine, DisplayConfig, PinAssignment, PinRole, PixelDepth};
pub use content::{Content, Pages, Writer};
pub use framebuffer::FrameBuffer;
pub use scheduler::PollingSchedule;
pub use state::{PanelState, RefreshMode, RefreshReport};
pub use waveform::RefreshPlan;
