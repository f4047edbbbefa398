use f1c100s_dram_tester::density::Density;
use f1c100s_dram_tester::sequencer::{Sequencer, WAKE_UP_CYCLES};
use f1c100s_dram_tester::sim::SimDram;
use f1c100s_dram_tester::time::Hertz;
use f1c100s_dram_tester::timing::Timing;

fn sequencer(density: Density) -> Sequencer<SimDram> {
    Sequencer::new(SimDram::new(density), Timing::derive(Hertz::mhz(16), 1))
}

#[test]
fn detects_64k_part() {
    let mut seq = sequencer(Density::Low);
    assert_eq!(Density::detect(&mut seq), Density::Low);
}

#[test]
fn detects_256k_part() {
    let mut seq = sequencer(Density::High);
    assert_eq!(Density::detect(&mut seq), Density::High);
}

#[test]
fn detection_is_independent_of_prior_contents() {
    for density in [Density::Low, Density::High] {
        for fill in [false, true] {
            let mut dram = SimDram::new(density);
            dram.fill(fill);
            let mut seq = Sequencer::new(dram, Timing::derive(Hertz::mhz(16), 1));
            assert_eq!(Density::detect(&mut seq), density);
        }
    }
}

#[test]
fn wake_up_is_ras_only() {
    let mut seq = sequencer(Density::High);
    seq.wake_up();
    let dram = seq.bus();
    assert_eq!(dram.refreshes(), WAKE_UP_CYCLES as u32);
    assert_eq!(dram.reads() + dram.writes(), 0);
    assert!(dram.control().is_idle());
}
