use f1c100s_dram_tester::density::Density;
use f1c100s_dram_tester::fault::{Fault, FaultState};
use f1c100s_dram_tester::instrument::{Instrument, Measurement, SpeedBin, REFERENCE_TICKS};
use f1c100s_dram_tester::sequencer::Sequencer;
use f1c100s_dram_tester::sim::{SimDram, SimStopwatch};
use f1c100s_dram_tester::stopwatch::Edge;
use f1c100s_dram_tester::time::Hertz;
use f1c100s_dram_tester::timing::Timing;

fn setup(density: Density) -> (Sequencer<SimDram>, Instrument, FaultState) {
    let mut seq = Sequencer::new(SimDram::new(density), Timing::derive(Hertz::mhz(16), 1));
    let mut instrument = Instrument::new(REFERENCE_TICKS);
    instrument.prime(&mut seq);
    (seq, instrument, FaultState::new())
}

fn sweep(
    seq: &mut Sequencer<SimDram>,
    instrument: &mut Instrument,
    stopwatch: &mut SimStopwatch,
    faults: &mut FaultState,
) -> Vec<Measurement> {
    (0..256).map(|_| instrument.measure(seq, stopwatch, faults)).collect()
}

#[test]
fn prime_writes_alternating_diagonal() {
    for density in [Density::Low, Density::High] {
        let (seq, _, _) = setup(density);
        let dram = seq.bus();
        for d in 0..=255u32 {
            assert_eq!(dram.cell(d | d << 8), d & 1 == 1, "{:?} diagonal {}", density, d);
        }
        assert_eq!(dram.extra(), Some(false));
    }
}

#[test]
fn capture_edge_follows_cell_contents() {
    let (mut seq, mut instrument, mut faults) = setup(Density::High);
    let mut stopwatch = SimStopwatch::new([Some(REFERENCE_TICKS)]);

    sweep(&mut seq, &mut instrument, &mut stopwatch, &mut faults);

    let edges = stopwatch.edges();
    assert_eq!(edges.len(), 256);
    for (d, edge) in edges.iter().enumerate() {
        let expected = if d % 2 == 1 { Edge::Rising } else { Edge::Falling };
        assert_eq!(*edge, expected, "diagonal {}", d);
    }
    assert!(!stopwatch.is_running());
    assert_eq!(seq.bus().reads(), 256);
    assert_eq!(seq.bus().violations(), 0);
    assert!(seq.bus().control().is_idle());
}

#[test]
fn sweep_reports_slowest_access() {
    let (mut seq, mut instrument, mut faults) = setup(Density::Low);
    let mut stopwatch = SimStopwatch::new([Some(2), Some(3), Some(2), Some(4)]);

    assert_eq!(instrument.classification(), None);
    let results = sweep(&mut seq, &mut instrument, &mut stopwatch, &mut faults);

    assert_eq!(
        results[0],
        Measurement::Captured {
            ticks: 2,
            bin: SpeedBin::Fast
        }
    );
    assert_eq!(
        results[3],
        Measurement::Captured {
            ticks: 4,
            bin: SpeedBin::Slow
        }
    );
    assert_eq!(instrument.sweeps(), 1);
    assert_eq!(instrument.classification(), Some(SpeedBin::Slow));
    assert!(!faults.is_set());
}

#[test]
fn classification_tracks_latest_sweep() {
    let (mut seq, mut instrument, mut faults) = setup(Density::Low);

    let mut typical = SimStopwatch::new([Some(REFERENCE_TICKS)]);
    sweep(&mut seq, &mut instrument, &mut typical, &mut faults);
    assert_eq!(instrument.classification(), Some(SpeedBin::Typical));
    assert!(instrument.lamp());

    let mut fast = SimStopwatch::new([Some(REFERENCE_TICKS - 1)]);
    sweep(&mut seq, &mut instrument, &mut fast, &mut faults);
    assert_eq!(instrument.classification(), Some(SpeedBin::Fast));
    assert_eq!(instrument.sweeps(), 2);
}

#[test]
fn missing_edge_is_a_fault() {
    let (mut seq, mut instrument, mut faults) = setup(Density::Low);
    let mut script = vec![Some(REFERENCE_TICKS); 256];
    script[7] = None;
    let mut stopwatch = SimStopwatch::new(script);

    let results = sweep(&mut seq, &mut instrument, &mut stopwatch, &mut faults);

    assert_eq!(results[7], Measurement::Timeout);
    assert_eq!(faults.first(), Some(Fault::CaptureTimeout { address: 7 }));
    assert_eq!(faults.events(), 1);
    assert_eq!(seq.bus().error_pulses(), 1);
    // The rest of the sweep still classifies
    assert_eq!(instrument.classification(), Some(SpeedBin::Typical));
}

#[test]
fn all_timeouts_leave_part_unclassified() {
    let (mut seq, mut instrument, mut faults) = setup(Density::Low);
    let mut stopwatch = SimStopwatch::new([None]);

    sweep(&mut seq, &mut instrument, &mut stopwatch, &mut faults);

    assert_eq!(instrument.classification(), None);
    assert_eq!(faults.events(), 256);
    assert!(!instrument.lamp());
}

#[test]
fn one_slow_access_outweighs_later_fast_ones() {
    let (mut seq, mut instrument, mut faults) = setup(Density::Low);
    let mut script = vec![Some(REFERENCE_TICKS - 1); 256];
    script[10] = Some(REFERENCE_TICKS + 1);
    let mut stopwatch = SimStopwatch::new(script);

    let results = sweep(&mut seq, &mut instrument, &mut stopwatch, &mut faults);

    assert_eq!(
        results[255],
        Measurement::Captured {
            ticks: REFERENCE_TICKS - 1,
            bin: SpeedBin::Fast
        }
    );
    assert_eq!(instrument.classification(), Some(SpeedBin::Slow));
}
