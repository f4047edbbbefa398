use f1c100s_dram_tester::address::Direction;
use f1c100s_dram_tester::bus::DramBus;
use f1c100s_dram_tester::control::ControlPhase;
use f1c100s_dram_tester::density::Density;
use f1c100s_dram_tester::fault::{Fault, FaultState};
use f1c100s_dram_tester::indicator;
use f1c100s_dram_tester::march::{MarchEngine, MARCH_C_MINUS};
use f1c100s_dram_tester::sequencer::Sequencer;
use f1c100s_dram_tester::sim::{SimDram, SimIndicator};
use f1c100s_dram_tester::time::Hertz;
use f1c100s_dram_tester::timing::Timing;

fn sequencer(dram: SimDram) -> Sequencer<SimDram> {
    Sequencer::new(dram, Timing::derive(Hertz::mhz(16), 1))
}

#[test]
fn clean_low_density_part_passes() {
    let mut dram = SimDram::new(Density::Low);
    dram.fill(true);
    let mut seq = sequencer(dram);
    let mut faults = FaultState::new();
    let mut engine = MarchEngine::new(Density::Low);

    let report = engine.run_program(&mut seq, &mut faults);

    assert_eq!(report.repetition, 1);
    assert_eq!(report.mismatches(), 0);
    assert!(!faults.is_set());

    assert_eq!((report.steps[0].reads, report.steps[0].writes), (0, 65_536));
    for step in &report.steps[1..5] {
        assert_eq!((step.reads, step.writes), (65_536, 65_536));
    }
    assert_eq!((report.steps[5].reads, report.steps[5].writes), (65_536, 0));

    let dram = seq.into_bus();
    assert_eq!(dram.error_pulses(), 0);
    assert_eq!(dram.violations(), 0);
    assert!(dram.control().is_idle());
    assert!((0..1u32 << 16).all(|a| !dram.cell(a)));
}

#[test]
fn stuck_at_one_fails_every_read_of_zero() {
    let mut dram = SimDram::new(Density::Low);
    dram.stuck_at(0x1234, true);
    let mut seq = sequencer(dram);
    let mut faults = FaultState::new();
    let mut engine = MarchEngine::new(Density::Low);

    let report = engine.run_program(&mut seq, &mut faults);

    let per_step: Vec<u32> = report.steps.iter().map(|s| s.mismatches).collect();
    assert_eq!(per_step, [0, 1, 0, 1, 0, 1]);
    assert_eq!(
        faults.first(),
        Some(Fault::VerificationMismatch {
            step: 2,
            address: 0x1234,
            expected: false,
        })
    );
    assert_eq!(faults.events(), 3);
    assert_eq!(seq.bus().error_pulses(), 3);
    assert_eq!(seq.bus().violations(), 0);
}

#[test]
fn fault_is_sticky_across_repetitions() {
    let mut dram = SimDram::new(Density::Low);
    dram.stuck_at(0, false);
    let mut seq = sequencer(dram);
    let mut faults = FaultState::new();
    let mut lamps = SimIndicator::default();
    let mut engine = MarchEngine::new(Density::Low);

    indicator::render(&mut lamps, &faults, false);
    engine.run_program(&mut seq, &mut faults);
    indicator::render(&mut lamps, &faults, true);
    assert!(lamps.fail && !lamps.pass);

    let first = faults.first();
    engine.run_program(&mut seq, &mut faults);
    indicator::render(&mut lamps, &faults, true);
    assert_eq!(engine.repetitions(), 2);
    assert_eq!(faults.first(), first);
    assert_eq!(faults.events(), 4);
    assert!(lamps.fail && !lamps.pass);
    // Pass never lit
    assert!(lamps.history.iter().all(|&(pass, _)| !pass));
}

#[test]
fn clean_run_lights_pass_after_first_repetition() {
    let mut seq = sequencer(SimDram::new(Density::Low));
    let mut faults = FaultState::new();
    let mut lamps = SimIndicator::default();
    let mut engine = MarchEngine::new(Density::Low);

    indicator::render(&mut lamps, &faults, false);
    assert!(!lamps.pass && !lamps.fail);
    engine.run_program(&mut seq, &mut faults);
    indicator::render(&mut lamps, &faults, true);
    assert!(lamps.pass && !lamps.fail);
}

#[test]
fn high_density_covers_all_cells() {
    let mut dram = SimDram::new(Density::High);
    dram.fill(true);
    let mut seq = sequencer(dram);
    let mut faults = FaultState::new();
    let mut engine = MarchEngine::new(Density::High);

    let report = engine.run_program(&mut seq, &mut faults);

    assert!(!faults.is_set());
    assert_eq!(report.steps[0].writes, 1 << 18);
    assert_eq!(report.steps[5].reads, 1 << 18);

    let dram = seq.into_bus();
    assert_eq!(dram.violations(), 0);
    assert!((0..1u32 << 18).all(|a| !dram.cell(a)));
}

#[test]
fn high_density_fault_address_carries_extra_bits() {
    let mut dram = SimDram::new(Density::High);
    dram.stuck_at(0x3_0042, false);
    dram.stuck_at(0x1_00FF, true);
    let mut seq = sequencer(dram);
    let mut faults = FaultState::new();
    let mut engine = MarchEngine::new(Density::High);

    let report = engine.run_program(&mut seq, &mut faults);

    // Stuck-at-1 fails steps 2, 4, 6; stuck-at-0 fails steps 3 and 5
    let per_step: Vec<u32> = report.steps.iter().map(|s| s.mismatches).collect();
    assert_eq!(per_step, [0, 1, 1, 1, 1, 1]);
    assert_eq!(
        faults.first(),
        Some(Fault::VerificationMismatch {
            step: 2,
            address: 0x1_00FF,
            expected: false,
        })
    );
    assert_eq!(seq.bus().error_pulses(), 5);
}

/// Logs the 18-bit address latched by every column strobe, with A8 as seen
/// at the row and column strobes.
struct AddressLog {
    dram: SimDram,
    address: u8,
    extra: Option<bool>,
    control: ControlPhase,
    row: u8,
    row_extra: Option<bool>,
    cycles: Vec<u32>,
    undriven: u32,
}

impl AddressLog {
    fn new(dram: SimDram) -> Self {
        Self {
            dram,
            address: 0,
            extra: None,
            control: ControlPhase::IDLE,
            row: 0,
            row_extra: None,
            cycles: Vec::new(),
            undriven: 0,
        }
    }

    /// Distinct addresses in visiting order; a read-then-write pair on one
    /// cell counts once.
    fn visits(&self) -> Vec<u32> {
        let mut visits = self.cycles.clone();
        visits.dedup();
        visits
    }
}

impl DramBus for AddressLog {
    fn set_address(&mut self, byte: u8) {
        self.address = byte;
        self.dram.set_address(byte);
    }

    fn set_extra(&mut self, bit: Option<bool>) {
        self.extra = bit;
        self.dram.set_extra(bit);
    }

    fn set_control(&mut self, phase: ControlPhase) {
        let prev = self.control;
        self.control = phase;
        if phase.contains(ControlPhase::ROW_STROBE) && !prev.contains(ControlPhase::ROW_STROBE) {
            self.row = self.address;
            self.row_extra = self.extra;
        }
        if phase.contains(ControlPhase::COLUMN_STROBE) && !prev.contains(ControlPhase::COLUMN_STROBE) {
            match (self.row_extra, self.extra) {
                (Some(row_extra), Some(col_extra)) => self.cycles.push(
                    self.row as u32 | (self.address as u32) << 8 | (row_extra as u32) << 16 | (col_extra as u32) << 17,
                ),
                _ => self.undriven += 1,
            }
        }
        self.dram.set_control(phase);
    }

    fn drive_data(&mut self, bit: bool) {
        self.dram.drive_data(bit);
    }

    fn sample_data(&mut self) -> bool {
        self.dram.sample_data()
    }
}

#[test]
fn high_density_steps_walk_18_bit_space_monotonically() {
    let mut seq = Sequencer::new(AddressLog::new(SimDram::new(Density::High)), Timing::derive(Hertz::mhz(16), 1));
    let mut faults = FaultState::new();
    let engine = MarchEngine::new(Density::High);

    for (i, step) in MARCH_C_MINUS.iter().enumerate() {
        seq.bus_mut().cycles.clear();
        engine.run_step(i as u8 + 1, step, &mut seq, &mut faults);

        let visits = seq.bus().visits();
        assert_eq!(visits.len(), 1 << 18, "step {}", i + 1);
        let (first, last, stride) = match step.direction {
            Direction::Ascending => (0, 0x3_FFFF, 1i64),
            Direction::Descending => (0x3_FFFF, 0, -1i64),
        };
        assert_eq!((visits[0], visits[visits.len() - 1]), (first, last), "step {}", i + 1);
        assert!(
            visits.windows(2).all(|w| w[1] as i64 - w[0] as i64 == stride),
            "step {} not monotonic",
            i + 1
        );
    }
    assert_eq!(seq.bus().undriven, 0);
    assert!(!faults.is_set());
}
