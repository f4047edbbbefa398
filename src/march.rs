//! March C- engine.
//!
//! Six steps, each a full sweep of the address space:
//!
//! | # | Order | Read | Write |
//! |---|-------|------|-------|
//! | 1 | up    | -    | 0     |
//! | 2 | up    | 0    | 1     |
//! | 3 | up    | 1    | 0     |
//! | 4 | down  | 0    | 1     |
//! | 5 | down  | 1    | 0     |
//! | 6 | down  | 0    | -     |
//!
//! On high-density parts every step runs four 16-bit sweeps, one per A8
//! row/column combination, ordered so the whole 18-bit space is still walked
//! monotonically. A mismatch raises a fault and the sweep carries on.

use crate::address::{split, Direction, Sweep, EXTRA_ORDER};
use crate::bus::DramBus;
use crate::density::Density;
use crate::fault::{Fault, FaultState};
use crate::indicator::{self, Indicator};
use crate::println;
use crate::sequencer::Sequencer;

/// One March element: sweep order, expected read (`None`: no read) and
/// written value (`None`: no write).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TestStep {
    pub direction: Direction,
    pub read: Option<bool>,
    pub write: Option<bool>,
}

impl TestStep {
    pub const fn new(direction: Direction, read: Option<bool>, write: Option<bool>) -> Self {
        Self { direction, read, write }
    }
}

pub const MARCH_C_MINUS: [TestStep; 6] = [
    TestStep::new(Direction::Ascending, None, Some(false)),
    TestStep::new(Direction::Ascending, Some(false), Some(true)),
    TestStep::new(Direction::Ascending, Some(true), Some(false)),
    TestStep::new(Direction::Descending, Some(false), Some(true)),
    TestStep::new(Direction::Descending, Some(true), Some(false)),
    TestStep::new(Direction::Descending, Some(false), None),
];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StepReport {
    pub reads: u32,
    pub writes: u32,
    pub mismatches: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ProgramReport {
    /// 1-based repetition number
    pub repetition: u32,
    pub steps: [StepReport; 6],
}

impl ProgramReport {
    pub fn mismatches(&self) -> u32 {
        self.steps.iter().map(|s| s.mismatches).sum()
    }
}

pub struct MarchEngine {
    density: Density,
    repetitions: u32,
}

impl MarchEngine {
    pub fn new(density: Density) -> Self {
        Self { density, repetitions: 0 }
    }

    pub fn density(&self) -> Density {
        self.density
    }

    /// Completed program repetitions.
    pub fn repetitions(&self) -> u32 {
        self.repetitions
    }

    /// Run one step (`number` is 1-based, used in fault reports).
    pub fn run_step<B: DramBus>(
        &self,
        number: u8,
        step: &TestStep,
        seq: &mut Sequencer<B>,
        faults: &mut FaultState,
    ) -> StepReport {
        let mut report = StepReport::default();
        match self.density {
            Density::Low => {
                seq.hold_extra(None);
                sweep(number, step, seq, faults, None, 0, &mut report);
            }
            Density::High => {
                let mut order = EXTRA_ORDER;
                if step.direction == Direction::Descending {
                    order.reverse();
                }
                for (row_extra, col_extra) in order {
                    let base = ((row_extra as u32) << 16) | ((col_extra as u32) << 17);
                    if row_extra == col_extra {
                        // Same level in both phases: set A8 once for the sweep
                        seq.hold_extra(Some(row_extra));
                        sweep(number, step, seq, faults, None, base, &mut report);
                    } else {
                        sweep(number, step, seq, faults, Some((row_extra, col_extra)), base, &mut report);
                    }
                }
            }
        }
        report
    }

    /// Run all six steps once.
    pub fn run_program<B: DramBus>(&mut self, seq: &mut Sequencer<B>, faults: &mut FaultState) -> ProgramReport {
        let mut steps = [StepReport::default(); 6];
        for (i, step) in MARCH_C_MINUS.iter().enumerate() {
            let number = i as u8 + 1;
            steps[i] = self.run_step(number, step, seq, faults);
            if steps[i].mismatches > 0 {
                println!("step {}: {} mismatches", number, steps[i].mismatches);
            }
        }
        self.repetitions += 1;

        let report = ProgramReport {
            repetition: self.repetitions,
            steps,
        };
        if faults.is_set() {
            println!(
                "pass {}: FAIL ({} this pass, {} total, first {:?})",
                report.repetition,
                report.mismatches(),
                faults.events(),
                faults.first()
            );
        } else {
            println!("pass {}: PASS", report.repetition);
        }
        report
    }

    /// Repeat the program forever, updating the indicator between
    /// repetitions.
    pub fn run<B: DramBus, I: Indicator>(mut self, seq: &mut Sequencer<B>, faults: &mut FaultState, indicator: &mut I) -> ! {
        indicator::render(indicator, faults, false);
        loop {
            self.run_program(seq, faults);
            indicator::render(indicator, faults, true);
        }
    }
}

/// One 16-bit sweep. `extras` is passed on every cycle; `None` relies on
/// whatever A8 state the caller set up. `base` carries the extra bits into
/// fault addresses.
#[inline]
fn sweep<B: DramBus>(
    number: u8,
    step: &TestStep,
    seq: &mut Sequencer<B>,
    faults: &mut FaultState,
    extras: Option<(bool, bool)>,
    base: u32,
    report: &mut StepReport,
) {
    let (row_extra, col_extra) = match extras {
        Some((r, c)) => (Some(r), Some(c)),
        None => (None, None),
    };

    for address in Sweep::new(step.direction) {
        let (row, col) = split(address);
        if let Some(expected) = step.read {
            report.reads += 1;
            if seq.read_cycle(row, col, row_extra, col_extra) != expected {
                report.mismatches += 1;
                faults.raise(
                    seq,
                    Fault::VerificationMismatch {
                        step: number,
                        address: base | address as u32,
                        expected,
                    },
                );
            }
        }
        if let Some(value) = step.write {
            report.writes += 1;
            seq.write_cycle(row, col, row_extra, col_extra, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn program_is_march_c_minus() {
        use Direction::*;
        let shape: [(Direction, Option<bool>, Option<bool>); 6] = [
            (Ascending, None, Some(false)),
            (Ascending, Some(false), Some(true)),
            (Ascending, Some(true), Some(false)),
            (Descending, Some(false), Some(true)),
            (Descending, Some(true), Some(false)),
            (Descending, Some(false), None),
        ];
        for (step, (direction, read, write)) in MARCH_C_MINUS.iter().zip(shape) {
            assert_eq!(step.direction, direction);
            assert_eq!(step.read, read);
            assert_eq!(step.write, write);
        }
    }

    #[test]
    fn each_read_expects_previous_write() {
        for pair in MARCH_C_MINUS.windows(2) {
            assert_eq!(pair[1].read, pair[0].write);
        }
    }
}
