//! Chip density probe.
//!
//! Writes opposite bits to the same row/column with A8 low and high, then
//! reads back the A8-low cell. A part that ignores A8 (4164 class) aliases
//! both writes onto one cell and returns the second bit; a 41256-class part
//! keeps them apart.

use crate::address::split_wide;
use crate::bus::DramBus;
use crate::println;
use crate::sequencer::Sequencer;

/// Address probed by [`Density::detect`].
const PROBE_ADDRESS: u16 = 0;

/// Storage capacity class, fixed for the rest of the run once detected.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Density {
    /// 8-bit row/column addressing (64K x 1)
    Low,
    /// 9-bit row/column addressing through A8 (256K x 1)
    High,
}

impl Density {
    /// Classify the part in the socket. Must run before the first March
    /// repetition; it overwrites two cells.
    pub fn detect<B: DramBus>(seq: &mut Sequencer<B>) -> Density {
        seq.write(split_wide(PROBE_ADDRESS, false), true);
        seq.write(split_wide(PROBE_ADDRESS, true), false);
        let density = if seq.read(split_wide(PROBE_ADDRESS, false)) {
            Density::High
        } else {
            Density::Low
        };
        println!("Density: {:?} ({} cells)", density, density.cells());
        density
    }

    /// Number of addressable cells.
    pub const fn cells(self) -> u32 {
        match self {
            Density::Low => 1 << 16,
            Density::High => 1 << 18,
        }
    }
}
