//! Simulated panel for tests
//!
//! Mock pins share one [`Sim`] that models the control register and the
//! source driver: bits shift in on CLK, the register updates on STB, a row
//! starts when CL rises with SPH low and is stored when LE rises. A falling
//! STV edge starts a new frame.

use core::cell::RefCell;
use core::convert::Infallible;
use std::rc::Rc;
use std::vec::Vec;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType, OutputPin};

use super::register::ControlRegister;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Line {
    Ckv,
    Sph,
    Cl,
    ShiftData,
    ShiftClock,
    ShiftStrobe,
    Data(u8),
}

#[derive(Default)]
struct State {
    ckv: bool,
    sph: bool,
    cl: bool,
    shift_data: bool,
    shift_clock: bool,
    shift_strobe: bool,
    data: u8,
    shift: u8,
    register: Option<ControlRegister>,
    latched: Vec<ControlRegister>,
    row: Option<Vec<u8>>,
    frames: Vec<Vec<Vec<u8>>>,
    delay_ns: u64,
}

impl State {
    fn set(&mut self, line: Line, high: bool) {
        match line {
            Line::Ckv => self.ckv = high,
            Line::Sph => self.sph = high,
            Line::Cl => {
                if high && !self.cl {
                    self.clock_source();
                }
                self.cl = high;
            }
            Line::ShiftData => self.shift_data = high,
            Line::ShiftClock => {
                if high && !self.shift_clock {
                    self.shift = self.shift << 1 | self.shift_data as u8;
                }
                self.shift_clock = high;
            }
            Line::ShiftStrobe => {
                if high && !self.shift_strobe {
                    self.strobe();
                }
                self.shift_strobe = high;
            }
            Line::Data(n) => {
                if high {
                    self.data |= 1 << n;
                } else {
                    self.data &= !(1 << n);
                }
            }
        }
    }

    fn clock_source(&mut self) {
        if !self.sph {
            self.row = Some(Vec::new());
        }
        if let Some(row) = self.row.as_mut() {
            row.push(self.data);
        }
    }

    fn strobe(&mut self) {
        let next = ControlRegister::from_bits(self.shift);
        let prev = self.register.unwrap_or(ControlRegister::IDLE);

        if prev.stv() && !next.stv() && next.output_enable() {
            self.frames.push(Vec::new());
        }
        if !prev.latch_enable() && next.latch_enable() {
            if let (Some(row), Some(frame)) = (self.row.take(), self.frames.last_mut()) {
                frame.push(row);
            }
        }

        self.register = Some(next);
        self.latched.push(next);
    }
}

/// Shared simulated panel
#[derive(Clone, Default)]
pub struct Sim(Rc<RefCell<State>>);

impl Sim {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pin(&self, line: Line) -> MockPin {
        MockPin {
            sim: self.clone(),
            line,
        }
    }

    pub fn data_bus(&self) -> [MockPin; 8] {
        core::array::from_fn(|n| self.pin(Line::Data(n as u8)))
    }

    pub fn delay(&self) -> MockDelay {
        MockDelay { sim: self.clone() }
    }

    /// Current register outputs (IDLE before the first strobe)
    pub fn register(&self) -> ControlRegister {
        self.0.borrow().register.unwrap_or(ControlRegister::IDLE)
    }

    /// Whether anything has been strobed in yet
    pub fn strobed(&self) -> bool {
        self.0.borrow().register.is_some()
    }

    /// Every value the register has held, in order
    pub fn latched(&self) -> Vec<ControlRegister> {
        self.0.borrow().latched.clone()
    }

    pub fn data_lines(&self) -> u8 {
        self.0.borrow().data
    }

    pub fn line(&self, line: Line) -> bool {
        let state = self.0.borrow();
        match line {
            Line::Ckv => state.ckv,
            Line::Sph => state.sph,
            Line::Cl => state.cl,
            Line::ShiftData => state.shift_data,
            Line::ShiftClock => state.shift_clock,
            Line::ShiftStrobe => state.shift_strobe,
            Line::Data(n) => state.data & (1 << n) != 0,
        }
    }

    /// Rows latched in each frame scan
    pub fn frames(&self) -> Vec<Vec<Vec<u8>>> {
        self.0.borrow().frames.clone()
    }

    pub fn frame_count(&self) -> usize {
        self.0.borrow().frames.len()
    }

    pub fn delay_ns(&self) -> u64 {
        self.0.borrow().delay_ns
    }

    /// Forget recorded history, keep line states
    pub fn reset_trace(&self) {
        let mut state = self.0.borrow_mut();
        state.latched.clear();
        state.frames.clear();
        state.delay_ns = 0;
    }
}

pub struct MockPin {
    sim: Sim,
    line: Line,
}

impl ErrorType for MockPin {
    type Error = Infallible;
}

impl OutputPin for MockPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.sim.0.borrow_mut().set(self.line, false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.sim.0.borrow_mut().set(self.line, true);
        Ok(())
    }
}

pub struct MockDelay {
    sim: Sim,
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.sim.0.borrow_mut().delay_ns += ns as u64;
    }
}
