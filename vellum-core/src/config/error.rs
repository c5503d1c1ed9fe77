//! Configuration errors

use core::fmt;

use super::pins::PinRole;

/// Configuration-time errors
///
/// All of these are fatal: a configuration that produces one of them must
/// not be used to bring up the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// The same physical pin is assigned to two logical roles
    DuplicatePin {
        pin: u8,
        first: PinRole,
        second: PinRole,
    },
    /// Pin cannot be driven as a GPIO output on the target
    InvalidPin { role: PinRole, pin: u8 },
    /// `full_update_every` must be at least 1
    InvalidFullUpdateEvery,
    /// Polling interval must be non-zero
    InvalidUpdateInterval,
    /// Zero-sized panel, or width not a multiple of 4 pixels
    InvalidGeometry,
    /// Both a writer callback and declarative pages were configured
    ConflictingContent,
    /// Too many pages for the fixed page table
    TooManyPages,
    /// Frame buffer storage does not match the panel geometry
    BufferSize { required: usize, actual: usize },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::DuplicatePin { pin, first, second } => write!(
                f,
                "GPIO{} assigned to both {} and {}",
                pin,
                first.name(),
                second.name()
            ),
            ConfigError::InvalidPin { role, pin } => {
                write!(f, "GPIO{} cannot be used as output for {}", pin, role.name())
            }
            ConfigError::InvalidFullUpdateEvery => f.write_str("full_update_every must be >= 1"),
            ConfigError::InvalidUpdateInterval => f.write_str("update interval must be non-zero"),
            ConfigError::InvalidGeometry => {
                f.write_str("panel dimensions must be non-zero with width a multiple of 4")
            }
            ConfigError::ConflictingContent => {
                f.write_str("writer and pages are mutually exclusive")
            }
            ConfigError::TooManyPages => f.write_str("too many pages"),
            ConfigError::BufferSize { required, actual } => write!(
                f,
                "frame buffer storage is {} bytes, panel needs {}",
                actual, required
            ),
        }
    }
}
