//! Panel control register (4094 shift register)
//!
//! The panel's control lines do not have their own GPIOs. They sit behind an
//! 8-bit serial-in/parallel-out register that is loaded over three pins:
//! DATA, CLK and STB. Bits are clocked in on the CLK rising edge, most
//! significant first, and appear on the outputs when STB goes high.
//!
//! | Bit | Line                 |
//! |-----|----------------------|
//! | 0   | Latch enable (LE)    |
//! | 1   | Power disable        |
//! | 2   | Positive rail enable |
//! | 3   | Negative rail enable |
//! | 4   | Gate start pulse (STV)|
//! | 5   | Scan direction       |
//! | 6   | Mode                 |
//! | 7   | Output enable        |

use core::convert::Infallible;

use embedded_hal::digital::OutputPin;

/// Control register contents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ControlRegister(u8);

impl ControlRegister {
    pub const LATCH_ENABLE: u8 = 1 << 0;
    pub const POWER_DISABLE: u8 = 1 << 1;
    pub const POS_POWER_ENABLE: u8 = 1 << 2;
    pub const NEG_POWER_ENABLE: u8 = 1 << 3;
    pub const STV: u8 = 1 << 4;
    pub const SCAN_DIRECTION: u8 = 1 << 5;
    pub const MODE: u8 = 1 << 6;
    pub const OUTPUT_ENABLE: u8 = 1 << 7;

    /// Power disabled, rails off, outputs off
    pub const IDLE: Self = Self(Self::POWER_DISABLE);

    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn contains(self, flag: u8) -> bool {
        self.0 & flag == flag
    }

    pub fn set(&mut self, flag: u8, on: bool) {
        if on {
            self.0 |= flag;
        } else {
            self.0 &= !flag;
        }
    }

    pub const fn latch_enable(self) -> bool {
        self.contains(Self::LATCH_ENABLE)
    }

    pub const fn power_disable(self) -> bool {
        self.contains(Self::POWER_DISABLE)
    }

    pub const fn pos_power(self) -> bool {
        self.contains(Self::POS_POWER_ENABLE)
    }

    pub const fn neg_power(self) -> bool {
        self.contains(Self::NEG_POWER_ENABLE)
    }

    pub const fn stv(self) -> bool {
        self.contains(Self::STV)
    }

    pub const fn output_enable(self) -> bool {
        self.contains(Self::OUTPUT_ENABLE)
    }
}

impl Default for ControlRegister {
    fn default() -> Self {
        Self::IDLE
    }
}

/// Serial loader for the control register
pub struct ShiftRegister<P> {
    data: P,
    clock: P,
    strobe: P,
    value: ControlRegister,
}

impl<P> ShiftRegister<P>
where
    P: OutputPin<Error = Infallible>,
{
    pub fn new(data: P, clock: P, strobe: P) -> Self {
        Self {
            data,
            clock,
            strobe,
            value: ControlRegister::IDLE,
        }
    }

    /// Last value pushed
    pub fn value(&self) -> ControlRegister {
        self.value
    }

    /// Drive the loader lines to idle (DATA and CLK low, STB high)
    pub fn idle(&mut self) {
        ok(self.data.set_low());
        ok(self.clock.set_low());
        ok(self.strobe.set_high());
    }

    /// Shift a value in and latch it onto the outputs
    pub fn push(&mut self, value: ControlRegister) {
        ok(self.strobe.set_low());
        for bit in (0..8).rev() {
            ok(self.clock.set_low());
            if value.0 & (1 << bit) != 0 {
                ok(self.data.set_high());
            } else {
                ok(self.data.set_low());
            }
            ok(self.clock.set_high());
        }
        ok(self.strobe.set_high());
        self.value = value;
    }

    /// Change one flag and push the result
    pub fn update(&mut self, flag: u8, on: bool) {
        let mut value = self.value;
        value.set(flag, on);
        self.push(value);
    }

    /// Pulse latch enable, transferring the source line buffer to the outputs
    pub fn pulse_latch(&mut self) {
        self.update(ControlRegister::LATCH_ENABLE, true);
        self.update(ControlRegister::LATCH_ENABLE, false);
    }
}

/// Unwrap a pin operation that cannot fail
#[inline(always)]
pub(crate) fn ok(result: Result<(), Infallible>) {
    match result {
        Ok(()) => {}
        Err(e) => match e {},
    }
}
