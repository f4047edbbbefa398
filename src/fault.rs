//! Sticky fault bookkeeping.
//!
//! Nothing in the fixture aborts on a fault: the event is pulsed on the error
//! strobe, logged and counted, and testing carries on so intermittent cells
//! show up over a long soak. Only a power cycle clears the state.

use crate::bus::DramBus;
use crate::sequencer::Sequencer;

/// A detected failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Fault {
    /// A March read returned the wrong bit.
    VerificationMismatch {
        /// March step, 1-based
        step: u8,
        /// Linear address; bits 16/17 hold the row/column extra bits on
        /// high-density parts
        address: u32,
        expected: bool,
    },
    /// The stopwatch saw no Dout transition inside the measurement window.
    CaptureTimeout {
        /// Diagonal address (row = column)
        address: u8,
    },
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FaultState {
    tripped: bool,
    events: u32,
    first: Option<Fault>,
}

impl FaultState {
    /// Power-on state: no fault seen.
    pub const fn new() -> Self {
        Self {
            tripped: false,
            events: 0,
            first: None,
        }
    }

    /// Record `fault`. Returns `true` if it is the first one since reset.
    pub fn record(&mut self, fault: Fault) -> bool {
        self.events = self.events.saturating_add(1);
        if self.tripped {
            return false;
        }
        self.tripped = true;
        self.first = Some(fault);
        true
    }

    /// Pulse the error strobe and record `fault`. Returns `true` if it is
    /// the first one since reset.
    ///
    /// Nothing is logged here: a UART line takes longer than the refresh
    /// interval, so callers report once their sweep is over.
    pub fn raise<B: DramBus>(&mut self, seq: &mut Sequencer<B>, fault: Fault) -> bool {
        seq.pulse_error();
        self.record(fault)
    }

    pub fn is_set(&self) -> bool {
        self.tripped
    }

    /// Number of fault events since reset.
    pub fn events(&self) -> u32 {
        self.events
    }

    pub fn first(&self) -> Option<Fault> {
        self.first
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sticky_after_first_fault() {
        let mut state = FaultState::new();
        assert!(!state.is_set());

        let f1 = Fault::CaptureTimeout { address: 3 };
        let f2 = Fault::VerificationMismatch {
            step: 2,
            address: 0x10,
            expected: false,
        };
        assert!(state.record(f1));
        assert!(!state.record(f2));
        assert!(state.is_set());
        assert_eq!(state.events(), 2);
        assert_eq!(state.first(), Some(f1));
    }
}
