//! E-paper panel driver
//!
//! A refresh runs to completion: render content, pick the mode, power the
//! panel up, drive the waveform plan frame by frame, power down and record
//! the result. Pins are `Infallible`, so nothing here can fail once the
//! driver has been constructed.

use core::convert::Infallible;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use vellum_core::config::{ConfigError, DisplayConfig, DriveTiming, PanelGeometry};
use vellum_core::content::{Content, Pages, Writer};
use vellum_core::framebuffer::FrameBuffer;
use vellum_core::scheduler::PollingSchedule;
use vellum_core::state::{PanelState, RefreshReport};
use vellum_core::waveform::{self, CleanStep, DataPass, RefreshPlan, CLEAN_CYCLE};

use super::bus::{DataBus, PanelPins};
use super::register::{ok, ControlRegister, ShiftRegister};

// Power rail settling (µs)
const POWER_UP_SETTLE_US: u32 = 100;
const NEG_RAIL_SETTLE_US: u32 = 500;
const POS_RAIL_SETTLE_US: u32 = 100;
const POS_RAIL_OFF_US: u32 = 10;
const NEG_RAIL_OFF_US: u32 = 100;

/// Pin-level panel access
struct PanelIo<P, B, D> {
    ckv: P,
    sph: P,
    cl: P,
    register: ShiftRegister<P>,
    bus: B,
    delay: D,
    timing: DriveTiming,
    powered: bool,
}

impl<P, B, D> PanelIo<P, B, D>
where
    P: OutputPin<Error = Infallible>,
    B: DataBus,
    D: DelayNs,
{
    fn idle(&mut self) {
        ok(self.ckv.set_low());
        ok(self.sph.set_low());
        ok(self.cl.set_low());
        self.bus.clear();
        self.register.push(ControlRegister::IDLE);
        self.register.idle();
        self.powered = false;
    }

    fn wait_us(&mut self, us: u32) {
        if us > 0 {
            self.delay.delay_us(us);
        }
    }

    /// Bring up the rails: negative before positive
    fn power_on(&mut self) {
        if self.powered {
            return;
        }

        let mut reg = self.register.value();
        reg.set(ControlRegister::SCAN_DIRECTION, true);
        reg.set(ControlRegister::POWER_DISABLE, false);
        self.register.push(reg);
        self.wait_us(POWER_UP_SETTLE_US);

        self.register.update(ControlRegister::NEG_POWER_ENABLE, true);
        self.wait_us(NEG_RAIL_SETTLE_US);
        self.register.update(ControlRegister::POS_POWER_ENABLE, true);
        self.wait_us(POS_RAIL_SETTLE_US);

        self.register.update(
            ControlRegister::STV | ControlRegister::MODE | ControlRegister::OUTPUT_ENABLE,
            true,
        );

        ok(self.cl.set_low());
        ok(self.sph.set_high());
        ok(self.ckv.set_low());
        self.powered = true;
    }

    /// Drop the rails in reverse order and park the lines
    fn power_off(&mut self) {
        if !self.powered {
            return;
        }

        self.register
            .update(ControlRegister::POS_POWER_ENABLE, false);
        self.wait_us(POS_RAIL_OFF_US);
        self.register
            .update(ControlRegister::NEG_POWER_ENABLE, false);
        self.wait_us(NEG_RAIL_OFF_US);
        self.register.push(ControlRegister::IDLE);

        self.bus.clear();
        ok(self.cl.set_low());
        ok(self.sph.set_low());
        self.powered = false;
    }

    fn ckv_pulse(&mut self) {
        ok(self.ckv.set_low());
        ok(self.ckv.set_high());
    }

    /// Vertical scan start: STV low across a gate clock, then clock into row 0
    fn start_frame(&mut self) {
        ok(self.ckv.set_high());
        self.wait_us(7);
        self.register.update(ControlRegister::STV, false);
        self.wait_us(10);
        self.ckv_pulse();
        self.wait_us(8);
        self.register.update(ControlRegister::STV, true);
        self.wait_us(10);
        self.ckv_pulse();
        self.wait_us(18);
        self.ckv_pulse();
        self.wait_us(18);
        self.ckv_pulse();
    }

    /// Clock one row of bytes into the source drivers
    fn shift_row(&mut self, len: usize, mut byte_at: impl FnMut(usize) -> u8) {
        ok(self.sph.set_low());
        for x in 0..len {
            self.bus.write(byte_at(x));
            ok(self.cl.set_high());
            ok(self.cl.set_low());
            if x == 0 {
                ok(self.sph.set_high());
            }
        }
        self.bus.clear();
    }

    /// Latch the shifted row onto the panel and advance the gate
    fn output_row(&mut self, hold_us: u32) {
        ok(self.ckv.set_low());
        self.register.pulse_latch();
        self.wait_us(hold_us);
        ok(self.ckv.set_high());
    }

    fn end_frame(&mut self) {
        let settle = self.timing.frame_settle_us;
        self.wait_us(settle);
    }

    fn clean_frames(&mut self, step: &CleanStep, geometry: PanelGeometry) {
        let byte = step.drive.splat();
        let hold = self.timing.row_hold_us;
        for _ in 0..step.frames {
            self.start_frame();
            for _ in 0..geometry.height {
                self.shift_row(geometry.bytes_per_row(), |_| byte);
                self.output_row(hold);
            }
            self.end_frame();
        }
    }

    fn data_frames(&mut self, pass: &DataPass, current: &[u8], previous: &[u8], stride: usize) {
        for _ in 0..pass.frames {
            self.start_frame();
            for (cur, prev) in current.chunks(stride).zip(previous.chunks(stride)) {
                self.shift_row(stride, |x| waveform::encode_byte(pass.kind, cur[x], prev[x]));
                self.output_row(pass.row_hold_us);
            }
            self.end_frame();
        }
    }
}

/// Parallel e-paper panel driver
///
/// `'a` is the lifetime of the frame storage, `'w` that of the content
/// callbacks.
pub struct Epd<'a, 'w, P, B, D> {
    config: DisplayConfig,
    io: PanelIo<P, B, D>,
    state: PanelState,
    schedule: PollingSchedule,
    fb: FrameBuffer<'a>,
    previous: &'a mut [u8],
    content: Content<'w>,
}

impl<'a, 'w, P, B, D> Epd<'a, 'w, P, B, D>
where
    P: OutputPin<Error = Infallible>,
    B: DataBus,
    D: DelayNs,
{
    /// Build a driver from a resolved configuration
    ///
    /// `buffer` holds the frame being drawn, `previous` the frame last shown
    /// on the panel; both must be [`PanelGeometry::buffer_len`] bytes.
    /// Fails on any invalid configuration value; no pin is touched in that
    /// case.
    pub fn new(
        config: DisplayConfig,
        pins: PanelPins<P, B>,
        delay: D,
        buffer: &'a mut [u8],
        previous: &'a mut [u8],
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let required = config.geometry.buffer_len();
        if previous.len() != required {
            return Err(ConfigError::BufferSize {
                required,
                actual: previous.len(),
            });
        }
        let fb = FrameBuffer::new(buffer, config.geometry, config.depth())?;
        previous.fill(0);

        let schedule = PollingSchedule::new(config.update_interval_ms)?;
        let state = PanelState::from_config(&config);

        let io = PanelIo {
            ckv: pins.ckv,
            sph: pins.sph,
            cl: pins.cl,
            register: ShiftRegister::new(pins.shift_data, pins.shift_clock, pins.shift_strobe),
            bus: pins.data,
            delay,
            timing: config.timing,
            powered: false,
        };

        Ok(Self {
            config,
            io,
            state,
            schedule,
            fb,
            previous,
            content: Content::Empty,
        })
    }

    /// Put every line in its idle state with the panel powered down
    ///
    /// The panel content is unknown afterwards; run [`Epd::clean`] once
    /// before the first refresh, or use [`Epd::begin`].
    pub fn initialize(&mut self) {
        self.io.idle();

        #[cfg(feature = "defmt")]
        defmt::debug!("EPD initialized ({}x{})", self.fb.width(), self.fb.height());
    }

    /// Startup sequence: idle the lines, clean the panel, draw the first frame
    pub fn begin(&mut self) -> RefreshReport {
        self.initialize();
        self.clean();
        self.refresh()
    }

    /// Register the per-refresh writer callback
    pub fn set_writer(&mut self, writer: &'w mut dyn Writer) -> Result<(), ConfigError> {
        self.content.set_writer(writer)
    }

    /// Use a page set as the content source
    pub fn set_pages(&mut self, pages: Pages<'w>) -> Result<(), ConfigError> {
        self.content.set_pages(pages)
    }

    /// Show page `index` from the next refresh on
    pub fn show_page(&mut self, index: usize) -> bool {
        self.content
            .pages_mut()
            .map(|pages| pages.show(index))
            .unwrap_or(false)
    }

    pub fn next_page(&mut self) {
        if let Some(pages) = self.content.pages_mut() {
            pages.next();
        }
    }

    pub fn previous_page(&mut self) {
        if let Some(pages) = self.content.pages_mut() {
            pages.previous();
        }
    }

    pub fn current_page(&self) -> Option<usize> {
        self.content.pages().map(|pages| pages.current())
    }

    /// Redraw the panel from the content source
    pub fn refresh(&mut self) -> RefreshReport {
        self.content.render(&mut self.fb);

        let geometry = self.config.geometry;
        let mode = self.state.next_mode();
        let (changed_pixels, dirty_rows) =
            waveform::frame_diff(self.fb.as_bytes(), &self.previous[..], geometry);

        let plan = RefreshPlan::for_refresh(mode, self.state.depth(), &self.config.timing);

        #[cfg(feature = "defmt")]
        defmt::debug!(
            "EPD {} refresh: {} passes, {} changed pixels",
            plan.mode,
            plan.data_passes(),
            changed_pixels
        );

        self.io.power_on();
        for step in plan.clean {
            self.io.clean_frames(step, geometry);
        }
        let stride = geometry.bytes_per_row();
        for pass in plan.passes() {
            self.io
                .data_frames(pass, self.fb.as_bytes(), &self.previous[..], stride);
        }
        for step in plan.finish {
            self.io.clean_frames(step, geometry);
        }
        self.io.power_off();

        self.previous.copy_from_slice(self.fb.as_bytes());
        self.state.complete(plan.mode, dirty_rows);

        RefreshReport {
            mode: plan.mode,
            data_passes: plan.data_passes(),
            frames: plan.total_frames(),
            changed_pixels,
            dirty_rows,
        }
    }

    /// Refresh when the polling interval has elapsed
    pub fn poll(&mut self, now_ms: u32) -> Option<RefreshReport> {
        if self.schedule.poll(now_ms) {
            Some(self.refresh())
        } else {
            None
        }
    }

    /// Flash the whole panel white/black/white to clear ghosting
    ///
    /// The panel is left showing paper, so the next partial refresh diffs
    /// against a blank frame.
    pub fn clean(&mut self) {
        #[cfg(feature = "defmt")]
        defmt::debug!("EPD clean");

        let geometry = self.config.geometry;
        self.io.power_on();
        for step in CLEAN_CYCLE {
            self.io.clean_frames(step, geometry);
        }
        self.io.power_off();
        self.previous.fill(0);
    }

    /// Set every pixel of the frame buffer to `level`
    pub fn fill(&mut self, level: u8) {
        self.fb.fill(level);
    }

    pub fn power_on(&mut self) {
        self.io.power_on();
    }

    pub fn power_off(&mut self) {
        self.io.power_off();
    }

    pub fn is_powered(&self) -> bool {
        self.io.powered
    }

    /// Log the configuration summary
    pub fn log_config(&self) {
        #[cfg(feature = "defmt")]
        {
            let config = &self.config;
            defmt::info!("E-paper display:");
            defmt::info!("  Greyscale: {}", config.greyscale);
            defmt::info!("  Partial updating: {}", config.partial_updating);
            defmt::info!("  Full update every: {}", config.full_update_every);
            defmt::info!("  Update interval: {} ms", config.update_interval_ms);
            defmt::info!(
                "  Size: {}x{}",
                config.geometry.width,
                config.geometry.height
            );
            for (role, pin) in config.pins.roles() {
                defmt::info!("  {} pin: GPIO{}", role.name(), pin);
            }
        }
    }

    pub fn config(&self) -> &DisplayConfig {
        &self.config
    }

    pub fn state(&self) -> &PanelState {
        &self.state
    }

    pub fn framebuffer(&self) -> &FrameBuffer<'a> {
        &self.fb
    }

    /// Frame buffer for drawing outside the content source
    pub fn framebuffer_mut(&mut self) -> &mut FrameBuffer<'a> {
        &mut self.fb
    }

    /// Force the next refresh to be full
    pub fn request_full_update(&mut self) {
        self.state.request_full();
    }
}
