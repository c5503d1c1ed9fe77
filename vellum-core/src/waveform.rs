//! Drive waveform planning
//!
//! The panel's source drivers take a 2-bit code per pixel on every row
//! scan. Four pixels share one bus byte, leftmost pixel in the high bits,
//! which matches the frame buffer packing.
//!
//! | Code | Effect                          |
//! |------|---------------------------------|
//! | `00` | Discharge (no voltage)          |
//! | `01` | Darken (move particles to ink)  |
//! | `10` | Lighten (move particles to paper)|
//! | `11` | Hold (leave pixel untouched)    |
//!
//! A refresh is a sequence of frame scans. Clean frames drive the same code
//! into every pixel to erase ghosting. Data passes encode the frame buffer:
//! one pass for monochrome, one pass per bit-plane for greyscale with the
//! row hold time weighted by the plane's significance.

use crate::config::{DriveTiming, PanelGeometry, PixelDepth};
use crate::state::{DirtyRows, RefreshMode};

/// Maximum data passes in any plan
pub const MAX_PASSES: usize = 2;

/// Per-pixel drive code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Drive {
    Discharge = 0b00,
    Darken = 0b01,
    Lighten = 0b10,
    Hold = 0b11,
}

impl Drive {
    /// Bus byte driving this code into all four pixels
    pub const fn splat(self) -> u8 {
        let c = self as u8;
        c << 6 | c << 4 | c << 2 | c
    }
}

/// A run of identical clean frames
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CleanStep {
    pub drive: Drive,
    pub frames: u8,
}

const fn clean(drive: Drive, frames: u8) -> CleanStep {
    CleanStep { drive, frames }
}

/// What a data pass encodes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PassKind {
    /// Darken every inked pixel (monochrome full refresh)
    Ink,
    /// Darken pixels whose level has this bit set
    BitPlane(u8),
    /// Darken newly inked pixels, lighten newly cleared ones
    Difference,
}

/// One data-bearing pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DataPass {
    pub kind: PassKind,
    /// Frame scans repeated for this pass
    pub frames: u8,
    /// Row hold time before the gate advances (µs)
    pub row_hold_us: u32,
}

// Flash white/black with discharges in between, ending on white.
const MONO_CLEAN: &[CleanStep] = &[
    clean(Drive::Lighten, 1),
    clean(Drive::Darken, 5),
    clean(Drive::Discharge, 1),
    clean(Drive::Lighten, 5),
    clean(Drive::Discharge, 1),
    clean(Drive::Darken, 12),
    clean(Drive::Discharge, 1),
    clean(Drive::Lighten, 11),
];

const GREY_CLEAN: &[CleanStep] = &[
    clean(Drive::Lighten, 1),
    clean(Drive::Darken, 12),
    clean(Drive::Discharge, 1),
    clean(Drive::Lighten, 11),
    clean(Drive::Discharge, 1),
    clean(Drive::Darken, 12),
    clean(Drive::Discharge, 1),
    clean(Drive::Lighten, 11),
];

const FULL_FINISH: &[CleanStep] = &[clean(Drive::Discharge, 1)];

const PARTIAL_FINISH: &[CleanStep] = &[clean(Drive::Discharge, 2)];

/// Panel clean cycle used outside a refresh
pub const CLEAN_CYCLE: &[CleanStep] = &[
    clean(Drive::Lighten, 1),
    clean(Drive::Lighten, 8),
    clean(Drive::Darken, 1),
    clean(Drive::Darken, 8),
    clean(Drive::Lighten, 1),
    clean(Drive::Lighten, 10),
];

const INK_FRAMES: u8 = 4;
const PLANE_FRAMES: u8 = 4;
const DIFF_FRAMES: u8 = 5;

/// Ordered drive sequence for one refresh
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RefreshPlan {
    pub mode: RefreshMode,
    /// Clean frames before the data passes
    pub clean: &'static [CleanStep],
    passes: [DataPass; MAX_PASSES],
    pass_count: u8,
    /// Clean frames after the data passes
    pub finish: &'static [CleanStep],
}

impl RefreshPlan {
    /// Build the plan for a refresh
    ///
    /// Greyscale is always driven as a full refresh; a partial request at
    /// greyscale depth is planned as full.
    pub fn for_refresh(mode: RefreshMode, depth: PixelDepth, timing: &DriveTiming) -> Self {
        let hold = timing.row_hold_us;
        let placeholder = DataPass {
            kind: PassKind::Ink,
            frames: 0,
            row_hold_us: hold,
        };

        match (mode, depth) {
            (RefreshMode::Partial, PixelDepth::Monochrome) => Self {
                mode,
                clean: &[],
                passes: [
                    DataPass {
                        kind: PassKind::Difference,
                        frames: DIFF_FRAMES,
                        row_hold_us: hold,
                    },
                    placeholder,
                ],
                pass_count: 1,
                finish: PARTIAL_FINISH,
            },
            (_, PixelDepth::Monochrome) => Self {
                mode: RefreshMode::Full,
                clean: MONO_CLEAN,
                passes: [
                    DataPass {
                        kind: PassKind::Ink,
                        frames: INK_FRAMES,
                        row_hold_us: hold,
                    },
                    placeholder,
                ],
                pass_count: 1,
                finish: FULL_FINISH,
            },
            (_, PixelDepth::Greyscale) => {
                // Most significant plane first, hold time scaled by weight
                let mut passes = [placeholder; MAX_PASSES];
                let planes = depth.bit_planes();
                for (i, pass) in passes.iter_mut().enumerate().take(planes as usize) {
                    let plane = planes - 1 - i as u8;
                    *pass = DataPass {
                        kind: PassKind::BitPlane(plane),
                        frames: PLANE_FRAMES,
                        row_hold_us: hold << plane,
                    };
                }
                Self {
                    mode: RefreshMode::Full,
                    clean: GREY_CLEAN,
                    passes,
                    pass_count: planes,
                    finish: FULL_FINISH,
                }
            }
        }
    }

    /// Data passes in drive order
    pub fn passes(&self) -> &[DataPass] {
        &self.passes[..self.pass_count as usize]
    }

    /// Number of data passes
    pub fn data_passes(&self) -> u8 {
        self.pass_count
    }

    /// Total frame scans the plan drives
    pub fn total_frames(&self) -> u16 {
        let clean: u16 = self.clean.iter().map(|s| s.frames as u16).sum();
        let finish: u16 = self.finish.iter().map(|s| s.frames as u16).sum();
        let data: u16 = self.passes().iter().map(|p| p.frames as u16).sum();
        clean + data + finish
    }
}

/// Encode one bus byte (four pixels) for a data pass
///
/// `previous` is only read for [`PassKind::Difference`].
pub fn encode_byte(kind: PassKind, current: u8, previous: u8) -> u8 {
    let mut out = 0u8;
    for slot in 0..4 {
        let shift = 6 - 2 * slot;
        let level = (current >> shift) & 0b11;
        let drive = match kind {
            PassKind::Ink => {
                if level != 0 {
                    Drive::Darken
                } else {
                    Drive::Hold
                }
            }
            PassKind::BitPlane(plane) => {
                if (level >> plane) & 1 != 0 {
                    Drive::Darken
                } else {
                    Drive::Hold
                }
            }
            PassKind::Difference => {
                let before = (previous >> shift) & 0b11;
                if level > before {
                    Drive::Darken
                } else if level < before {
                    Drive::Lighten
                } else {
                    Drive::Hold
                }
            }
        };
        out |= (drive as u8) << shift;
    }
    out
}

/// Count pixels that differ between two packed bytes
pub fn changed_pixels(current: u8, previous: u8) -> u32 {
    let x = current ^ previous;
    ((x | x >> 1) & 0b0101_0101).count_ones()
}

/// Compare two packed frames
///
/// Returns the number of changed pixels and the rows they lie in.
pub fn frame_diff(
    current: &[u8],
    previous: &[u8],
    geometry: PanelGeometry,
) -> (u32, Option<DirtyRows>) {
    let stride = geometry.bytes_per_row();
    let mut changed = 0;
    let mut dirty: Option<DirtyRows> = None;

    for (y, (cur, prev)) in current
        .chunks(stride)
        .zip(previous.chunks(stride))
        .enumerate()
    {
        let row_changed: u32 = cur
            .iter()
            .zip(prev.iter())
            .map(|(&c, &p)| changed_pixels(c, p))
            .sum();
        if row_changed > 0 {
            changed += row_changed;
            let y = y as u16;
            match dirty.as_mut() {
                Some(rows) => rows.include(y),
                None => dirty = Some(DirtyRows::row(y)),
            }
        }
    }

    (changed, dirty)
}
