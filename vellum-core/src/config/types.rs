//! Display configuration types

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::error::ConfigError;
use super::pins::PinAssignment;

/// Maximum declarative pages per display
pub const MAX_PAGES: usize = 8;

/// Default polling interval (5 s)
pub const DEFAULT_UPDATE_INTERVAL_MS: u32 = 5_000;

/// Default number of refreshes between forced full updates
pub const DEFAULT_FULL_UPDATE_EVERY: u32 = 10;

/// Pixel depth the panel is driven with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PixelDepth {
    /// Two levels, 0 = paper, 1 = ink
    #[default]
    Monochrome,
    /// Four levels (2-bit), 0 = paper .. 3 = full ink
    Greyscale,
}

impl PixelDepth {
    /// Number of bit-planes needed to represent every level
    pub const fn bit_planes(self) -> u8 {
        match self {
            PixelDepth::Monochrome => 1,
            PixelDepth::Greyscale => 2,
        }
    }

    /// Highest ink level
    pub const fn max_level(self) -> u8 {
        (1 << self.bit_planes()) - 1
    }

    /// Map an arbitrary level into the range this depth can show
    pub const fn quantize(self, level: u8) -> u8 {
        match self {
            PixelDepth::Monochrome => (level != 0) as u8,
            PixelDepth::Greyscale => {
                if level > 3 {
                    3
                } else {
                    level
                }
            }
        }
    }
}

/// Panel dimensions in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PanelGeometry {
    pub width: u16,
    pub height: u16,
}

impl Default for PanelGeometry {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
        }
    }
}

impl PanelGeometry {
    pub const fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }

    /// Bytes clocked onto the data bus per row (4 pixels per byte)
    pub const fn bytes_per_row(&self) -> usize {
        self.width as usize / 4
    }

    /// Frame buffer size at 2 bits per pixel
    pub const fn buffer_len(&self) -> usize {
        self.bytes_per_row() * self.height as usize
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 || self.width % 4 != 0 {
            return Err(ConfigError::InvalidGeometry);
        }
        Ok(())
    }
}

/// Drive timing
///
/// The per-plane voltage table is panel specific; only the hold time
/// weighting between bit-planes is fixed here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DriveTiming {
    /// Row hold time for the least significant bit-plane (µs)
    pub row_hold_us: u32,
    /// Settle time after each frame (µs)
    pub frame_settle_us: u32,
}

impl Default for DriveTiming {
    fn default() -> Self {
        Self {
            row_hold_us: 1,
            frame_settle_us: 230,
        }
    }
}

/// Complete display configuration
///
/// Mirrors the configuration surface the firmware framework exposes;
/// every field has the documented default.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DisplayConfig {
    /// Drive 2-bit greyscale instead of monochrome
    pub greyscale: bool,
    /// Allow partial (diff-only) refreshes
    pub partial_updating: bool,
    /// Force a full refresh at least every this many refreshes
    pub full_update_every: u32,
    /// Polling interval between refreshes (ms)
    pub update_interval_ms: u32,
    /// Panel dimensions
    pub geometry: PanelGeometry,
    /// Drive timing
    pub timing: DriveTiming,
    /// Physical pin assignment
    pub pins: PinAssignment,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            greyscale: false,
            partial_updating: true,
            full_update_every: DEFAULT_FULL_UPDATE_EVERY,
            update_interval_ms: DEFAULT_UPDATE_INTERVAL_MS,
            geometry: PanelGeometry::default(),
            timing: DriveTiming::default(),
            pins: PinAssignment::default(),
        }
    }
}

impl DisplayConfig {
    /// Create a configuration with all defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Pixel depth implied by the greyscale flag
    pub fn depth(&self) -> PixelDepth {
        if self.greyscale {
            PixelDepth::Greyscale
        } else {
            PixelDepth::Monochrome
        }
    }

    /// Validate every value
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.full_update_every == 0 {
            return Err(ConfigError::InvalidFullUpdateEvery);
        }
        if self.update_interval_ms == 0 {
            return Err(ConfigError::InvalidUpdateInterval);
        }
        self.geometry.validate()?;
        self.pins.validate()
    }
}

/// Where frame content comes from
///
/// A display is populated either by a writer callback or by declarative
/// pages, never both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ContentConfig {
    pub has_writer: bool,
    pub page_count: usize,
}

impl ContentConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.has_writer && self.page_count > 0 {
            return Err(ConfigError::ConflictingContent);
        }
        if self.page_count > MAX_PAGES {
            return Err(ConfigError::TooManyPages);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PinRole;

    #[test]
    fn test_defaults() {
        let config = DisplayConfig::new();
        assert!(!config.greyscale);
        assert!(config.partial_updating);
        assert_eq!(config.full_update_every, 10);
        assert_eq!(config.update_interval_ms, 5_000);
        assert_eq!(config.geometry, PanelGeometry::new(800, 600));
        assert_eq!(config.depth(), PixelDepth::Monochrome);
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_zero_full_update_every_rejected() {
        let config = DisplayConfig {
            full_update_every: 0,
            ..DisplayConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::InvalidFullUpdateEvery));
    }

    #[test]
    fn test_zero_interval_rejected() {
        let config = DisplayConfig {
            update_interval_ms: 0,
            ..DisplayConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::InvalidUpdateInterval));
    }

    #[test]
    fn test_geometry_validation() {
        assert!(PanelGeometry::new(800, 600).validate().is_ok());
        assert!(PanelGeometry::new(8, 1).validate().is_ok());
        assert_eq!(
            PanelGeometry::new(0, 600).validate(),
            Err(ConfigError::InvalidGeometry)
        );
        assert_eq!(
            PanelGeometry::new(802, 600).validate(),
            Err(ConfigError::InvalidGeometry)
        );
        assert_eq!(
            PanelGeometry::new(800, 0).validate(),
            Err(ConfigError::InvalidGeometry)
        );
    }

    #[test]
    fn test_buffer_len() {
        let geometry = PanelGeometry::default();
        assert_eq!(geometry.bytes_per_row(), 200);
        assert_eq!(geometry.buffer_len(), 120_000);
    }

    #[test]
    fn test_config_reports_duplicate_pin() {
        let mut config = DisplayConfig::default();
        config.pins.shift_strobe = config.pins.ckv;
        assert_eq!(
            config.validate(),
            Err(ConfigError::DuplicatePin {
                pin: 25,
                first: PinRole::Ckv,
                second: PinRole::ShiftStrobe,
            })
        );
    }

    #[test]
    fn test_depth_planes_and_quantize() {
        assert_eq!(PixelDepth::Monochrome.bit_planes(), 1);
        assert_eq!(PixelDepth::Greyscale.bit_planes(), 2);
        assert_eq!(PixelDepth::Monochrome.max_level(), 1);
        assert_eq!(PixelDepth::Greyscale.max_level(), 3);

        assert_eq!(PixelDepth::Monochrome.quantize(0), 0);
        assert_eq!(PixelDepth::Monochrome.quantize(3), 1);
        assert_eq!(PixelDepth::Greyscale.quantize(2), 2);
        assert_eq!(PixelDepth::Greyscale.quantize(9), 3);
    }

    #[test]
    fn test_content_exclusive() {
        assert!(ContentConfig::default().validate().is_ok());
        assert!(ContentConfig {
            has_writer: true,
            page_count: 0
        }
        .validate()
        .is_ok());
        assert!(ContentConfig {
            has_writer: false,
            page_count: 3
        }
        .validate()
        .is_ok());
        assert_eq!(
            ContentConfig {
                has_writer: true,
                page_count: 1
            }
            .validate(),
            Err(ConfigError::ConflictingContent)
        );
        assert_eq!(
            ContentConfig {
                has_writer: false,
                page_count: MAX_PAGES + 1
            }
            .validate(),
            Err(ConfigError::TooManyPages)
        );
    }
}
