//! Hardware driver implementations
//!
//! This crate drives the panel described by `vellum-core` configuration
//! through `embedded-hal` pins:
//!
//! - Control register loader (4094 shift register)
//! - 8-bit source data bus
//! - Frame/row scanning, power sequencing and the refresh cycle

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod epd;
