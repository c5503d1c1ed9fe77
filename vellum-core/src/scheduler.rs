//! Polling schedule
//!
//! The panel is redrawn at a fixed interval. The caller owns the clock and
//! feeds a free-running millisecond counter; elapsed time is computed with
//! wrapping arithmetic so the counter may roll over.

use crate::config::ConfigError;

/// Fixed-interval polling schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PollingSchedule {
    interval_ms: u32,
    last_ms: Option<u32>,
}

impl PollingSchedule {
    /// Create a schedule that fires on the first poll
    pub fn new(interval_ms: u32) -> Result<Self, ConfigError> {
        if interval_ms == 0 {
            return Err(ConfigError::InvalidUpdateInterval);
        }
        Ok(Self {
            interval_ms,
            last_ms: None,
        })
    }

    pub fn interval_ms(&self) -> u32 {
        self.interval_ms
    }

    /// Returns true when a refresh is due, and records it
    pub fn poll(&mut self, now_ms: u32) -> bool {
        let due = match self.last_ms {
            None => true,
            Some(last) => now_ms.wrapping_sub(last) >= self.interval_ms,
        };
        if due {
            self.last_ms = Some(now_ms);
        }
        due
    }

    /// Milliseconds until the next refresh is due
    pub fn remaining_ms(&self, now_ms: u32) -> u32 {
        match self.last_ms {
            None => 0,
            Some(last) => self.interval_ms.saturating_sub(now_ms.wrapping_sub(last)),
        }
    }

    /// Make the next poll fire regardless of elapsed time
    pub fn reset(&mut self) {
        self.last_ms = None;
    }
}
