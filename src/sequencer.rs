//! Bus cycles with calibrated settle delays.
//!
//! Every cycle starts and ends with all control lines released, runs inside a
//! critical section so nothing can stretch the gap between strobe edges, and
//! finishes with a tRP precharge so cycles can be issued back to back.
//!
//! The sequencer never judges data. [`Sequencer::read_cycle`] reports the
//! sampled bit; comparing it is up to the caller.

use crate::address::BusAddress;
use crate::bus::DramBus;
use crate::control::{self, ControlPhase};
use crate::delay;
use crate::timing::Timing;

/// RAS-only cycles required after power-up before the array is usable.
pub const WAKE_UP_CYCLES: u8 = 8;

pub struct Sequencer<B> {
    bus: B,
    timing: Timing,
    /// Extra RAS hold after sampling so the read's RAS pulse still meets tRAS
    read_tail: u32,
    /// Same for writes
    write_tail: u32,
    refresh_row: u8,
}

impl<B: DramBus> Sequencer<B> {
    pub fn new(mut bus: B, timing: Timing) -> Self {
        bus.set_control(ControlPhase::IDLE);
        bus.set_extra(None);
        Self {
            bus,
            timing,
            read_tail: timing.row_active.saturating_sub(timing.row_setup + timing.read_settle),
            write_tail: timing.row_active.saturating_sub(timing.row_setup + timing.write_pulse),
            refresh_row: 0,
        }
    }

    pub fn timing(&self) -> &Timing {
        &self.timing
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    pub fn into_bus(self) -> B {
        self.bus
    }

    /// Read one cell. `None` extras leave A8 as it is, so a value set with
    /// [`Sequencer::hold_extra`] stays in effect.
    #[inline]
    pub fn read_cycle(&mut self, row: u8, col: u8, row_extra: Option<bool>, col_extra: Option<bool>) -> bool {
        let t = &self.timing;
        let bus = &mut self.bus;
        let tail = self.read_tail;
        critical_section::with(|_| {
            // Strobe row address
            if row_extra.is_some() {
                bus.set_extra(row_extra);
            }
            bus.set_address(row);
            bus.set_control(control::READ_ROW);
            delay::cycles(t.row_setup);
            // Strobe col address
            if col_extra.is_some() {
                bus.set_extra(col_extra);
            }
            bus.set_address(col);
            bus.set_control(control::READ_COL);
            delay::cycles(t.read_settle);
            let bit = bus.sample_data();
            delay::cycles(tail);
            bus.set_control(ControlPhase::IDLE);
            delay::cycles(t.precharge);
            bit
        })
    }

    /// Write one cell (early write: WE is low before CAS falls).
    #[inline]
    pub fn write_cycle(&mut self, row: u8, col: u8, row_extra: Option<bool>, col_extra: Option<bool>, value: bool) {
        let t = &self.timing;
        let bus = &mut self.bus;
        let tail = self.write_tail;
        critical_section::with(|_| {
            bus.drive_data(value);
            if row_extra.is_some() {
                bus.set_extra(row_extra);
            }
            bus.set_address(row);
            bus.set_control(control::WRITE_ROW);
            delay::cycles(t.row_setup);
            if col_extra.is_some() {
                bus.set_extra(col_extra);
            }
            bus.set_address(col);
            bus.set_control(control::WRITE_COL);
            delay::cycles(t.write_pulse);
            delay::cycles(tail);
            bus.set_control(ControlPhase::IDLE);
            delay::cycles(t.precharge);
        })
    }

    /// RAS-only refresh of `row`.
    pub fn refresh_cycle(&mut self, row: u8) {
        let t = &self.timing;
        let bus = &mut self.bus;
        critical_section::with(|_| {
            bus.set_address(row);
            bus.set_control(control::REFRESH);
            delay::cycles(t.row_active);
            bus.set_control(ControlPhase::IDLE);
            delay::cycles(t.precharge);
        })
    }

    /// Refresh the next row of the free-running refresh counter.
    pub fn refresh_next(&mut self) {
        let row = self.refresh_row;
        self.refresh_row = self.refresh_row.wrapping_add(1);
        self.refresh_cycle(row);
    }

    /// Power-up initialization: eight RAS-only cycles.
    pub fn wake_up(&mut self) {
        for _ in 0..WAKE_UP_CYCLES {
            self.refresh_next();
        }
    }

    /// Set A8 once for a whole sweep; subsequent cycles pass `None` extras.
    pub fn hold_extra(&mut self, bit: Option<bool>) {
        self.bus.set_extra(bit);
    }

    pub fn read(&mut self, address: BusAddress) -> bool {
        self.read_cycle(address.row, address.col, address.row_extra, address.col_extra)
    }

    pub fn write(&mut self, address: BusAddress, value: bool) {
        self.write_cycle(address.row, address.col, address.row_extra, address.col_extra, value)
    }

    /// Pulse the error strobe once.
    pub fn pulse_error(&mut self) {
        let t = &self.timing;
        let bus = &mut self.bus;
        critical_section::with(|_| {
            bus.set_control(ControlPhase::ERROR_STROBE);
            delay::cycles(t.error_pulse);
            bus.set_control(ControlPhase::IDLE);
        })
    }

    /// RAS immediately followed by CAS at `(row, col)`, no row hold in
    /// between. `window` runs while both strobes are asserted; the lines are
    /// released once it returns.
    pub fn fast_access<R>(&mut self, row: u8, col: u8, window: impl FnOnce() -> R) -> R {
        let t = &self.timing;
        let bus = &mut self.bus;
        critical_section::with(|_| {
            bus.set_address(row);
            bus.set_control(control::READ_ROW);
            bus.set_address(col);
            bus.set_control(control::READ_COL);
            let r = window();
            bus.set_control(ControlPhase::IDLE);
            delay::cycles(t.precharge);
            r
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::Hertz;

    /// Records every control phase and the address seen at each strobe.
    #[derive(Default)]
    struct TraceBus {
        control: ControlPhase,
        address: u8,
        extra: Option<bool>,
        data_in: bool,
        data_out: bool,
        phases: std::vec::Vec<(ControlPhase, u8, Option<bool>)>,
    }

    impl DramBus for TraceBus {
        fn set_address(&mut self, byte: u8) {
            self.address = byte;
        }

        fn set_extra(&mut self, bit: Option<bool>) {
            self.extra = bit;
        }

        fn set_control(&mut self, phase: ControlPhase) {
            self.control = phase;
            self.phases.push((phase, self.address, self.extra));
        }

        fn drive_data(&mut self, bit: bool) {
            self.data_in = bit;
        }

        fn sample_data(&mut self) -> bool {
            self.data_out
        }
    }

    fn sequencer() -> Sequencer<TraceBus> {
        let mut seq = Sequencer::new(TraceBus::default(), Timing::derive(Hertz::mhz(16), 1));
        seq.bus_mut().phases.clear();
        seq
    }

    #[test]
    fn read_cycle_phases() {
        let mut seq = sequencer();
        seq.bus_mut().data_out = true;
        assert!(seq.read_cycle(0x12, 0x34, Some(true), Some(false)));
        assert_eq!(
            seq.bus().phases,
            [
                (control::READ_ROW, 0x12, Some(true)),
                (control::READ_COL, 0x34, Some(false)),
                (ControlPhase::IDLE, 0x34, Some(false)),
            ]
        );
    }

    #[test]
    fn write_cycle_phases() {
        let mut seq = sequencer();
        seq.write_cycle(0xAB, 0xCD, None, None, true);
        assert!(seq.bus().data_in);
        assert_eq!(
            seq.bus().phases,
            [
                (control::WRITE_ROW, 0xAB, None),
                (control::WRITE_COL, 0xCD, None),
                (ControlPhase::IDLE, 0xCD, None),
            ]
        );
        assert!(seq.bus().control.is_idle());
    }

    #[test]
    fn held_extra_survives_cycles() {
        let mut seq = sequencer();
        seq.hold_extra(Some(true));
        seq.read_cycle(1, 2, None, None);
        seq.write_cycle(1, 2, None, None, false);
        assert!(seq.bus().phases.iter().all(|(_, _, extra)| *extra == Some(true)));
    }

    #[test]
    fn refresh_counter_wraps() {
        let mut seq = sequencer();
        for _ in 0..257 {
            seq.refresh_next();
        }
        let rows: std::vec::Vec<u8> = seq
            .bus()
            .phases
            .iter()
            .filter(|(phase, _, _)| *phase == control::REFRESH)
            .map(|(_, row, _)| *row)
            .collect();
        assert_eq!(rows.len(), 257);
        assert_eq!(rows[255], 255);
        assert_eq!(rows[256], 0);
    }

    #[test]
    fn wake_up_issues_eight_ras_only_cycles() {
        let mut seq = sequencer();
        seq.wake_up();
        let phases = &seq.bus().phases;
        assert_eq!(phases.len(), 2 * WAKE_UP_CYCLES as usize);
        assert!(phases.chunks(2).all(|c| c[0].0 == control::REFRESH && c[1].0.is_idle()));
    }

    #[test]
    fn fast_access_releases_after_window() {
        let mut seq = sequencer();
        let seen = seq.fast_access(7, 7, || 42);
        assert_eq!(seen, 42);
        let phases = &seq.bus().phases;
        assert_eq!(phases[0].0, control::READ_ROW);
        assert_eq!(phases[1].0, control::READ_COL);
        assert!(phases[2].0.is_idle());
    }

    #[test]
    fn error_pulse_returns_idle() {
        let mut seq = sequencer();
        seq.pulse_error();
        assert_eq!(seq.bus().phases[0].0, ControlPhase::ERROR_STROBE);
        assert!(seq.bus().control.is_idle());
    }
}
