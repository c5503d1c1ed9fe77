//! Source data bus and panel pin set

use core::convert::Infallible;

use embedded_hal::digital::OutputPin;

use super::register::ok;

/// 8-bit parallel data bus feeding the panel's source drivers
///
/// Bit `n` of a byte appears on data line `Dn`. The blanket implementation
/// for eight individual pins is slow (eight pin writes per byte); a board can
/// replace it with a single register write.
pub trait DataBus {
    /// Put a byte on the bus
    fn write(&mut self, byte: u8);

    /// Drive every line low
    fn clear(&mut self) {
        self.write(0);
    }
}

impl<P> DataBus for [P; 8]
where
    P: OutputPin<Error = Infallible>,
{
    fn write(&mut self, byte: u8) {
        for (bit, pin) in self.iter_mut().enumerate() {
            if byte & (1 << bit) != 0 {
                ok(pin.set_high());
            } else {
                ok(pin.set_low());
            }
        }
    }
}

/// Every pin the panel needs
pub struct PanelPins<P, B> {
    /// Gate driver clock
    pub ckv: P,
    /// Source driver start pulse (active low)
    pub sph: P,
    /// Source driver clock
    pub cl: P,
    /// Control register DATA
    pub shift_data: P,
    /// Control register CLK
    pub shift_clock: P,
    /// Control register STB
    pub shift_strobe: P,
    /// D0..D7
    pub data: B,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::epd::mock::{Line, Sim};

    #[test]
    fn test_pin_array_bit_order() {
        let sim = Sim::new();
        let mut bus: [_; 8] = core::array::from_fn(|n| sim.pin(Line::Data(n as u8)));

        bus.write(0b1000_0101);
        assert_eq!(sim.data_lines(), 0b1000_0101);

        bus.clear();
        assert_eq!(sim.data_lines(), 0);
    }
}
