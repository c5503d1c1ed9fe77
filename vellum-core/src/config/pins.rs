//! Pin assignment for the parallel panel bus
//!
//! The panel needs three control lines driven directly (CKV, SPH, CL),
//! three lines into the 4094 shift register that holds the panel control
//! register (DATA, CLK, STB), and an 8-bit source data bus.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::error::ConfigError;

/// Number of pins the panel bus uses
pub const PIN_COUNT: usize = 14;

/// Logical pin role on the panel bus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PinRole {
    /// Gate driver vertical clock
    Ckv,
    /// Source driver start pulse
    Sph,
    /// Source driver clock
    Cl,
    /// 4094 serial data
    ShiftData,
    /// 4094 shift clock
    ShiftClock,
    /// 4094 strobe (latch)
    ShiftStrobe,
    /// Source data line
    Data(DataLine),
}

/// One of the eight source data lines, D0 is the least significant bus bit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DataLine {
    D0,
    D1,
    D2,
    D3,
    D4,
    D5,
    D6,
    D7,
}

impl DataLine {
    /// Every line in bus bit order
    pub const ALL: [DataLine; 8] = [
        DataLine::D0,
        DataLine::D1,
        DataLine::D2,
        DataLine::D3,
        DataLine::D4,
        DataLine::D5,
        DataLine::D6,
        DataLine::D7,
    ];

    /// Bus bit index (0..=7)
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Line for a bus bit, `None` past D7
    pub const fn from_index(index: usize) -> Option<Self> {
        if index < Self::ALL.len() {
            Some(Self::ALL[index])
        } else {
            None
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            DataLine::D0 => "D0",
            DataLine::D1 => "D1",
            DataLine::D2 => "D2",
            DataLine::D3 => "D3",
            DataLine::D4 => "D4",
            DataLine::D5 => "D5",
            DataLine::D6 => "D6",
            DataLine::D7 => "D7",
        }
    }
}

impl PinRole {
    /// Human-readable role name
    pub fn name(&self) -> &'static str {
        match self {
            PinRole::Ckv => "CKV",
            PinRole::Sph => "SPH",
            PinRole::Cl => "CL",
            PinRole::ShiftData => "4094 data",
            PinRole::ShiftClock => "4094 clock",
            PinRole::ShiftStrobe => "4094 strobe",
            PinRole::Data(line) => line.name(),
        }
    }
}

/// Physical GPIO numbers for every bus role
///
/// Fixed once at startup; the driver never remaps a pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PinAssignment {
    pub ckv: u8,
    pub sph: u8,
    pub cl: u8,
    pub shift_data: u8,
    pub shift_clock: u8,
    pub shift_strobe: u8,
    /// Data pins D0..D7, D0 is the least significant bus bit
    pub data: [u8; 8],
}

impl Default for PinAssignment {
    fn default() -> Self {
        Self {
            ckv: 25,
            sph: 26,
            cl: 5,
            shift_data: 23,
            shift_clock: 18,
            shift_strobe: 0,
            data: [33, 32, 4, 19, 2, 27, 21, 22],
        }
    }
}

impl PinAssignment {
    /// All (role, pin) pairs in bus order
    pub fn roles(&self) -> [(PinRole, u8); PIN_COUNT] {
        let d = self.data;
        let data = |line: DataLine| (PinRole::Data(line), d[line.index()]);
        [
            (PinRole::Ckv, self.ckv),
            (PinRole::Sph, self.sph),
            (PinRole::Cl, self.cl),
            (PinRole::ShiftData, self.shift_data),
            (PinRole::ShiftClock, self.shift_clock),
            (PinRole::ShiftStrobe, self.shift_strobe),
            data(DataLine::D0),
            data(DataLine::D1),
            data(DataLine::D2),
            data(DataLine::D3),
            data(DataLine::D4),
            data(DataLine::D5),
            data(DataLine::D6),
            data(DataLine::D7),
        ]
    }

    /// Look up the physical pin for a role
    pub fn pin(&self, role: PinRole) -> u8 {
        match role {
            PinRole::Ckv => self.ckv,
            PinRole::Sph => self.sph,
            PinRole::Cl => self.cl,
            PinRole::ShiftData => self.shift_data,
            PinRole::ShiftClock => self.shift_clock,
            PinRole::ShiftStrobe => self.shift_strobe,
            PinRole::Data(line) => self.data[line.index()],
        }
    }

    /// Check every pin is output-capable and no pin serves two roles
    pub fn validate(&self) -> Result<(), ConfigError> {
        let roles = self.roles();

        for &(role, pin) in roles.iter() {
            if !is_output_capable(pin) {
                return Err(ConfigError::InvalidPin { role, pin });
            }
        }

        for (i, &(first, pin)) in roles.iter().enumerate() {
            if let Some(&(second, _)) = roles[i + 1..].iter().find(|(_, p)| *p == pin) {
                return Err(ConfigError::DuplicatePin { pin, first, second });
            }
        }

        Ok(())
    }
}

/// Whether an ESP32 GPIO can be used as a push-pull output
///
/// GPIO6-11 belong to the SPI flash, 34-39 are input-only and
/// 20, 24 and 28-31 are not bonded out.
pub const fn is_output_capable(pin: u8) -> bool {
    matches!(pin, 0..=5 | 12..=19 | 21..=23 | 25..=27 | 32 | 33)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_assignment_is_valid() {
        let pins = PinAssignment::default();
        assert_eq!(pins.validate(), Ok(()));
        assert_eq!(pins.pin(PinRole::Ckv), 25);
        assert_eq!(pins.pin(PinRole::ShiftStrobe), 0);
        assert_eq!(pins.pin(PinRole::Data(DataLine::D0)), 33);
        assert_eq!(pins.pin(PinRole::Data(DataLine::D7)), 22);
    }

    #[test]
    fn test_duplicate_pin_rejected() {
        let mut pins = PinAssignment::default();
        pins.data[3] = pins.cl;

        assert_eq!(
            pins.validate(),
            Err(ConfigError::DuplicatePin {
                pin: 5,
                first: PinRole::Cl,
                second: PinRole::Data(DataLine::D3),
            })
        );
    }

    #[test]
    fn test_duplicate_between_data_pins_rejected() {
        let mut pins = PinAssignment::default();
        pins.data[7] = pins.data[0];

        assert!(matches!(
            pins.validate(),
            Err(ConfigError::DuplicatePin {
                pin: 33,
                first: PinRole::Data(DataLine::D0),
                second: PinRole::Data(DataLine::D7),
            })
        ));
    }

    #[test]
    fn test_input_only_pin_rejected() {
        let pins = PinAssignment {
            sph: 36,
            ..PinAssignment::default()
        };
        assert_eq!(
            pins.validate(),
            Err(ConfigError::InvalidPin {
                role: PinRole::Sph,
                pin: 36
            })
        );
    }

    #[test]
    fn test_flash_pins_rejected() {
        for pin in 6..=11 {
            assert!(!is_output_capable(pin));
        }
        assert!(!is_output_capable(40));
        assert!(is_output_capable(33));
    }

    #[test]
    fn test_roles_cover_every_pin() {
        let roles = PinAssignment::default().roles();
        assert_eq!(roles.len(), PIN_COUNT);
        assert_eq!(roles[0], (PinRole::Ckv, 25));
        assert_eq!(roles[13], (PinRole::Data(DataLine::D7), 22));
    }

    #[test]
    fn test_data_line_index_bounded() {
        for (i, line) in DataLine::ALL.iter().enumerate() {
            assert_eq!(line.index(), i);
            assert_eq!(DataLine::from_index(i), Some(*line));
        }
        assert_eq!(DataLine::from_index(8), None);
        assert_eq!(PinRole::Data(DataLine::D3).name(), "D3");

        let pins = PinAssignment::default();
        for line in DataLine::ALL {
            assert_eq!(pins.pin(PinRole::Data(line)), pins.data[line.index()]);
        }
    }
}
