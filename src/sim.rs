//! Host-side models of the fixture hardware.
//!
//! [`SimDram`] behaves like a 41xx part on the multiplexed bus: it latches
//! the row on the falling RAS edge and the column on the falling CAS edge,
//! and performs the write or read at that point. A low-density part ignores
//! A8, so its row/column space aliases exactly the way a 4164 does. Cells can
//! be forced to a value to model stuck-at faults.

use std::collections::BTreeMap;

use crate::bus::DramBus;
use crate::control::ControlPhase;
use crate::density::Density;
use crate::indicator::Indicator;
use crate::stopwatch::{Edge, Stopwatch};

/// Cells in the largest supported part.
const CELLS: usize = 1 << 18;

pub struct SimDram {
    density: Density,
    cells: Vec<bool>,
    stuck: BTreeMap<u32, bool>,

    address: u8,
    extra: Option<bool>,
    control: ControlPhase,
    din: bool,
    dout: bool,

    row: u8,
    row_extra: bool,
    column_seen: bool,

    reads: u32,
    writes: u32,
    refreshes: u32,
    error_pulses: u32,
    violations: u32,
}

impl SimDram {
    /// A part of the given density with every cell at 0.
    pub fn new(density: Density) -> Self {
        Self {
            density,
            cells: vec![false; CELLS],
            stuck: BTreeMap::new(),
            address: 0,
            extra: None,
            control: ControlPhase::IDLE,
            din: false,
            dout: false,
            row: 0,
            row_extra: false,
            column_seen: false,
            reads: 0,
            writes: 0,
            refreshes: 0,
            error_pulses: 0,
            violations: 0,
        }
    }

    pub fn density(&self) -> Density {
        self.density
    }

    /// Force the cell at `address` to read `value` whatever is written.
    pub fn stuck_at(&mut self, address: u32, value: bool) {
        self.stuck.insert(self.index(address), value);
    }

    /// Set every cell, bypassing the bus.
    pub fn fill(&mut self, value: bool) {
        self.cells.fill(value);
    }

    /// Cell contents at a linear address (bits 16/17: row/column A8), as a
    /// read would see them.
    pub fn cell(&self, address: u32) -> bool {
        let index = self.index(address);
        match self.stuck.get(&index) {
            Some(&value) => value,
            None => self.cells[index as usize],
        }
    }

    pub fn control(&self) -> ControlPhase {
        self.control
    }

    pub fn extra(&self) -> Option<bool> {
        self.extra
    }

    /// CAS cycles without WE.
    pub fn reads(&self) -> u32 {
        self.reads
    }

    /// CAS cycles with WE.
    pub fn writes(&self) -> u32 {
        self.writes
    }

    /// RAS cycles that ended without a CAS.
    pub fn refreshes(&self) -> u32 {
        self.refreshes
    }

    pub fn error_pulses(&self) -> u32 {
        self.error_pulses
    }

    /// Strobe sequences a real part would not accept: CAS without RAS, or
    /// the error strobe while the part is selected.
    pub fn violations(&self) -> u32 {
        self.violations
    }

    fn index(&self, address: u32) -> u32 {
        match self.density {
            Density::Low => address & 0xFFFF,
            Density::High => address & (CELLS as u32 - 1),
        }
    }

    fn column_strobe(&mut self, write: bool) {
        let col_extra = self.extra.unwrap_or(false);
        let address = self.row as u32
            | (self.address as u32) << 8
            | (self.row_extra as u32) << 16
            | (col_extra as u32) << 17;
        let index = self.index(address);
        if write {
            self.writes += 1;
            self.cells[index as usize] = self.din;
        } else {
            self.reads += 1;
            self.dout = self.cell(address);
        }
    }
}

impl DramBus for SimDram {
    fn set_address(&mut self, byte: u8) {
        self.address = byte;
    }

    fn set_extra(&mut self, bit: Option<bool>) {
        self.extra = bit;
    }

    fn set_control(&mut self, phase: ControlPhase) {
        let prev = self.control;
        self.control = phase;

        let ras = ControlPhase::ROW_STROBE;
        let cas = ControlPhase::COLUMN_STROBE;
        let err = ControlPhase::ERROR_STROBE;

        if phase.contains(ras) && !prev.contains(ras) {
            self.row = self.address;
            self.row_extra = self.extra.unwrap_or(false);
            self.column_seen = false;
        }
        if phase.contains(cas) && !prev.contains(cas) {
            if phase.contains(ras) {
                self.column_seen = true;
                self.column_strobe(phase.contains(ControlPhase::WRITE_ENABLE));
            } else {
                self.violations += 1;
            }
        }
        if prev.contains(ras) && !phase.contains(ras) && !self.column_seen {
            self.refreshes += 1;
        }
        if phase.contains(err) && !prev.contains(err) {
            self.error_pulses += 1;
            if phase.contains(ras) || phase.contains(cas) {
                self.violations += 1;
            }
        }
    }

    fn drive_data(&mut self, bit: bool) {
        self.din = bit;
    }

    fn sample_data(&mut self) -> bool {
        self.dout
    }
}

/// Stopwatch that replays scripted captures, one per start/stop, wrapping
/// around at the end of the script.
pub struct SimStopwatch {
    script: Vec<Option<u16>>,
    next: usize,
    running: bool,
    edges: Vec<Edge>,
}

impl SimStopwatch {
    pub fn new(script: impl IntoIterator<Item = Option<u16>>) -> Self {
        let script: Vec<_> = script.into_iter().collect();
        assert!(!script.is_empty(), "empty stopwatch script");
        Self {
            script,
            next: 0,
            running: false,
            edges: Vec::new(),
        }
    }

    /// Every edge programmed so far.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn is_running(&self) -> bool {
        self.running
    }
}

impl Stopwatch for SimStopwatch {
    fn start(&mut self, edge: Edge) {
        self.edges.push(edge);
        self.running = true;
    }

    fn stop(&mut self) -> Option<u16> {
        assert!(self.running, "stop without start");
        self.running = false;
        let captured = self.script[self.next];
        self.next = (self.next + 1) % self.script.len();
        captured
    }

    fn reset(&mut self) {
        self.running = false;
    }
}

/// Lamp states plus a log of every change.
#[derive(Default)]
pub struct SimIndicator {
    pub pass: bool,
    pub fail: bool,
    pub history: Vec<(bool, bool)>,
}

impl SimIndicator {
    fn log(&mut self) {
        let state = (self.pass, self.fail);
        if self.history.last() != Some(&state) {
            self.history.push(state);
        }
    }
}

impl Indicator for SimIndicator {
    fn set_pass(&mut self, on: bool) {
        self.pass = on;
        self.log();
    }

    fn set_fail(&mut self, on: bool) {
        self.fail = on;
        self.log();
    }
}
