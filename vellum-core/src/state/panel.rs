//! Full/partial refresh policy
//!
//! A partial refresh only drives pixels that changed since the previous
//! frame. It is faster but leaves ghosting behind, so a full refresh is
//! forced periodically.
//!
//! The counter holds the number of refreshes since the last full update.
//! A refresh is full when partial updating is off, when the panel is in
//! greyscale, or when it would be the `full_update_every`-th refresh since
//! the last full one. The counter starts out "due" so the first refresh
//! after power-up is always full.

use crate::config::{DisplayConfig, PixelDepth};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Refresh mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum RefreshMode {
    /// Clean the whole panel and redraw every pixel
    Full,
    /// Drive only pixels that changed since the previous frame
    Partial,
}

/// Inclusive range of rows touched by a refresh
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DirtyRows {
    pub first: u16,
    pub last: u16,
}

impl DirtyRows {
    /// Single-row region
    pub const fn row(y: u16) -> Self {
        Self { first: y, last: y }
    }

    /// Grow the region to include row `y`
    pub fn include(&mut self, y: u16) {
        self.first = self.first.min(y);
        self.last = self.last.max(y);
    }

    /// Number of rows covered
    pub fn rows(&self) -> u16 {
        self.last - self.first + 1
    }
}

/// Outcome of one refresh cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RefreshReport {
    /// Mode that was driven
    pub mode: RefreshMode,
    /// Data-bearing passes (one per bit-plane)
    pub data_passes: u8,
    /// Frame scans driven in total, clean frames included
    pub frames: u16,
    /// Pixels that differ from the previous frame
    pub changed_pixels: u32,
    /// Rows with at least one changed pixel
    pub dirty_rows: Option<DirtyRows>,
}

/// Refresh state owned by the driver
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PanelState {
    depth: PixelDepth,
    partial_updating: bool,
    full_update_every: u32,
    /// Refreshes since the last full update
    since_full: u32,
    dirty: Option<DirtyRows>,
    refreshes: u32,
}

impl PanelState {
    /// Create a state that is due for a full update
    ///
    /// `full_update_every` is clamped to at least 1.
    pub fn new(depth: PixelDepth, partial_updating: bool, full_update_every: u32) -> Self {
        let full_update_every = full_update_every.max(1);
        Self {
            depth,
            partial_updating,
            full_update_every,
            since_full: full_update_every,
            dirty: None,
            refreshes: 0,
        }
    }

    /// Create the state described by a display configuration
    pub fn from_config(config: &DisplayConfig) -> Self {
        Self::new(
            config.depth(),
            config.partial_updating,
            config.full_update_every,
        )
    }

    /// Mode the next refresh must use
    ///
    /// Does not change the state; call [`PanelState::complete`] once the
    /// refresh has been driven.
    pub fn next_mode(&self) -> RefreshMode {
        if !self.partial_allowed() || self.since_full.saturating_add(1) >= self.full_update_every
        {
            RefreshMode::Full
        } else {
            RefreshMode::Partial
        }
    }

    /// Record a completed refresh
    pub fn complete(&mut self, mode: RefreshMode, dirty: Option<DirtyRows>) {
        match mode {
            RefreshMode::Full => self.since_full = 0,
            RefreshMode::Partial => {
                self.since_full = self
                    .since_full
                    .saturating_add(1)
                    .min(self.full_update_every);
            }
        }
        self.dirty = dirty;
        self.refreshes = self.refreshes.wrapping_add(1);
    }

    /// Force the next refresh to be full
    pub fn request_full(&mut self) {
        self.since_full = self.full_update_every;
    }

    /// Partial refreshes are only possible for two-level pixels
    pub fn partial_allowed(&self) -> bool {
        self.partial_updating && self.depth == PixelDepth::Monochrome
    }

    pub fn depth(&self) -> PixelDepth {
        self.depth
    }

    pub fn full_update_every(&self) -> u32 {
        self.full_update_every
    }

    /// Refreshes since the last full update
    pub fn since_full(&self) -> u32 {
        self.since_full
    }

    /// Rows changed by the most recent refresh
    pub fn dirty_rows(&self) -> Option<DirtyRows> {
        self.dirty
    }

    /// Total refreshes recorded
    pub fn refresh_count(&self) -> u32 {
        self.refreshes
    }
}
