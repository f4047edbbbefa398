//! Access-time instrument.
//!
//! Walks the 256 diagonal cells (row = column) forever, timing each RAS→CAS
//! access with the stopwatch: RAS and CAS drop back to back, the fastest
//! transition the bus can make, so the measured time is the part's worst-case
//! row access. Each sweep's slowest result is shown as 1, 2 or 3 blinks of
//! the pass lamp; a missing Dout edge is a fault.

use crate::bus::DramBus;
use crate::delay;
use crate::fault::{Fault, FaultState};
use crate::indicator::{self, Indicator};
use crate::println;
use crate::sequencer::Sequencer;
use crate::stopwatch::{Edge, Stopwatch};

/// Ticks a typical part takes (AVS counter, ~41.7ns per tick).
pub const REFERENCE_TICKS: u16 = 3;

/// Cycles between stopwatch polls inside the capture window.
const POLL_STRIDE: u32 = 4;

/// Sweeps per blink slot (~100ms of measuring on the fixture).
const BLINK_SHIFT: u32 = 8;

/// Blink slots per blink sequence: up to three on/off pairs, then a gap.
const BLINK_FRAME: u32 = 8;

/// Speed class of the part in the socket.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SpeedBin {
    Fast,
    Typical,
    Slow,
}

impl SpeedBin {
    /// Classify a capture against `reference`.
    pub fn classify(ticks: u16, reference: u16) -> SpeedBin {
        match ticks.cmp(&reference) {
            core::cmp::Ordering::Less => SpeedBin::Fast,
            core::cmp::Ordering::Equal => SpeedBin::Typical,
            core::cmp::Ordering::Greater => SpeedBin::Slow,
        }
    }

    pub const fn blinks(self) -> u32 {
        match self {
            SpeedBin::Fast => 1,
            SpeedBin::Typical => 2,
            SpeedBin::Slow => 3,
        }
    }
}

/// Result of one timed access.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Measurement {
    Captured { ticks: u16, bin: SpeedBin },
    Timeout,
}

pub struct Instrument {
    reference: u16,
    edge: Edge,
    address: u8,
    /// Slowest bin of the sweep in progress
    sweep_worst: Option<SpeedBin>,
    /// Slowest bin of the last completed sweep
    classification: Option<SpeedBin>,
    /// Bin being blinked out in the current blink frame
    shown: Option<SpeedBin>,
    /// Completed sweeps, free running
    phase: u32,
    /// First fault of the run, reported at the end of its sweep
    unreported: Option<Fault>,
}

impl Instrument {
    pub fn new(reference: u16) -> Self {
        Self {
            reference,
            // First toggle selects a falling edge for diagonal 0, which holds 0
            edge: Edge::Rising,
            address: 0,
            sweep_worst: None,
            classification: None,
            shown: None,
            phase: 0,
            unreported: None,
        }
    }

    /// Slowest bin captured during the last completed diagonal sweep, not
    /// the bin of the most recent access. `None` before the first sweep
    /// finishes, or when every access of that sweep timed out.
    pub fn classification(&self) -> Option<SpeedBin> {
        self.classification
    }

    /// Completed diagonal sweeps.
    pub fn sweeps(&self) -> u32 {
        self.phase
    }

    /// Write the alternating pattern `0, 1, 0, 1, ..` along the diagonal.
    /// A8 is held low so both densities see the same cells.
    pub fn prime<B: DramBus>(&mut self, seq: &mut Sequencer<B>) {
        seq.hold_extra(Some(false));
        for d in 0..=255u8 {
            seq.write_cycle(d, d, None, None, d & 1 == 1);
        }
    }

    /// Time one access at the next diagonal address.
    pub fn measure<B: DramBus, S: Stopwatch>(
        &mut self,
        seq: &mut Sequencer<B>,
        stopwatch: &mut S,
        faults: &mut FaultState,
    ) -> Measurement {
        let address = self.address;
        let window = seq.timing().capture_window;

        self.edge = self.edge.toggled();
        let captured = critical_section::with(|_| {
            stopwatch.start(self.edge);
            seq.fast_access(address, address, || {
                let mut left = window;
                while left > 0 {
                    stopwatch.poll();
                    let step = left.min(POLL_STRIDE);
                    delay::cycles(step);
                    left -= step;
                }
                stopwatch.stop()
            })
        });
        stopwatch.reset();

        self.address = self.address.wrapping_add(1);

        let measurement = match captured {
            None => {
                let fault = Fault::CaptureTimeout { address };
                if faults.raise(seq, fault) {
                    self.unreported = Some(fault);
                }
                Measurement::Timeout
            }
            Some(ticks) => {
                let bin = SpeedBin::classify(ticks, self.reference);
                self.sweep_worst = Some(self.sweep_worst.map_or(bin, |worst| worst.max(bin)));
                Measurement::Captured { ticks, bin }
            }
        };

        if self.address == 0 {
            self.finish_sweep();
        }
        measurement
    }

    fn finish_sweep(&mut self) {
        if let Some(fault) = self.unreported.take() {
            println!("FAULT: {:?}", fault);
        }
        let worst = self.sweep_worst.take();
        if worst != self.classification {
            println!("access time: {:?}", worst);
        }
        self.classification = worst;
        self.phase = self.phase.wrapping_add(1);
    }

    /// Pass-lamp state for the current phase. The bin shown is latched at the
    /// start of each blink frame so a sequence is never cut short.
    pub fn lamp(&mut self) -> bool {
        let slot = self.phase >> BLINK_SHIFT;
        let in_frame = slot % BLINK_FRAME;
        if in_frame == 0 {
            self.shown = self.classification;
        }
        match self.shown {
            Some(bin) => in_frame % 2 == 0 && in_frame / 2 < bin.blinks(),
            None => false,
        }
    }

    /// Measure forever. Lamps are updated once per diagonal sweep.
    pub fn run<B: DramBus, S: Stopwatch, I: Indicator>(
        mut self,
        seq: &mut Sequencer<B>,
        stopwatch: &mut S,
        faults: &mut FaultState,
        indicator: &mut I,
    ) -> ! {
        self.prime(seq);
        indicator::render(indicator, faults, false);
        loop {
            self.measure(seq, stopwatch, faults);
            if self.address == 0 {
                let on = self.lamp();
                indicator::render(indicator, faults, on);
            }
        }
    }
}
