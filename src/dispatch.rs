//! Boot-time mode selection.
//!
//! The mode switch is read once; the chosen loop then runs until reset.

use core::convert::Infallible;

use embedded_hal::digital::InputPin;

use crate::bus::DramBus;
use crate::density::Density;
use crate::fault::FaultState;
use crate::indicator::Indicator;
use crate::instrument::{Instrument, REFERENCE_TICKS};
use crate::march::MarchEngine;
use crate::println;
use crate::sequencer::Sequencer;
use crate::stopwatch::Stopwatch;

/// What the fixture does for the rest of the run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    /// Switch open (pulled up): March C- soak test
    March,
    /// Switch grounded: access-time measurement
    Measure,
}

impl Mode {
    /// Read the pulled-up mode switch.
    pub fn sample<P: InputPin<Error = Infallible>>(pin: &mut P) -> Mode {
        match pin.is_high() {
            Ok(true) => Mode::March,
            Ok(false) => Mode::Measure,
            Err(e) => match e {},
        }
    }
}

/// Wake the part up and hand control to the selected loop. Never returns.
pub fn run<B, S, I>(mode: Mode, seq: &mut Sequencer<B>, stopwatch: &mut S, indicator: &mut I) -> !
where
    B: DramBus,
    S: Stopwatch,
    I: Indicator,
{
    let mut faults = FaultState::new();

    println!("Mode: {:?}", mode);
    seq.wake_up();

    match mode {
        Mode::Measure => Instrument::new(REFERENCE_TICKS).run(seq, stopwatch, &mut faults, indicator),
        Mode::March => {
            let density = Density::detect(seq);
            MarchEngine::new(density).run(seq, &mut faults, indicator)
        }
    }
}
