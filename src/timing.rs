//! Bus settle delays in CPU cycles.
//!
//! Minimums are for 41xx-family parts (-12/-15 speed grades). Every count is
//! derived from the CPU clock at compile time; porting to another clock means
//! picking another profile, never reusing these numbers.

use crate::time::Hertz;

// ============================================================================
// Datasheet minimums (ns)
// ============================================================================
/// RAS to CAS delay (row address hold included)
const T_RCD_NS: u32 = 25;
/// Access time from CAS
const T_CAC_NS: u32 = 120;
/// Write pulse width
const T_WP_NS: u32 = 120;
/// RAS pulse width
const T_RAS_NS: u32 = 200;
/// RAS precharge
const T_RP_NS: u32 = 100;
/// Error strobe width, long enough for a scope or logic analyser trigger
const T_ERR_NS: u32 = 1_000;
/// Access-time capture window after CAS
const T_WINDOW_NS: u32 = 300;

/// CPU cycles between writing a PIO data register and the level being
/// visible in the same port's input latch (APB round trip on F1C100S).
pub const F1C100S_SAMPLE_LATENCY: u32 = 4;

/// Settle delays for one clock profile.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Timing {
    /// Clock these counts were derived for
    pub sysclk: Hertz,
    /// Hold after RAS before the column address goes out
    pub row_setup: u32,
    /// Wait after CAS before sampling Dout (tCAC + sampling latency)
    pub read_settle: u32,
    /// Hold with CAS and WE asserted
    pub write_pulse: u32,
    /// RAS-only refresh hold
    pub row_active: u32,
    /// Idle after releasing RAS
    pub precharge: u32,
    /// Error strobe width
    pub error_pulse: u32,
    /// Access-time measurement window
    pub capture_window: u32,
}

impl Timing {
    /// Derive cycle counts for `sysclk`. `sample_latency` is the platform's
    /// pin-read latency in cycles, added on top of tCAC.
    pub const fn derive(sysclk: Hertz, sample_latency: u32) -> Self {
        Self {
            sysclk,
            row_setup: sysclk.cycles_for_ns(T_RCD_NS),
            read_settle: sysclk.cycles_for_ns(T_CAC_NS) + sample_latency,
            write_pulse: sysclk.cycles_for_ns(T_WP_NS),
            row_active: sysclk.cycles_for_ns(T_RAS_NS),
            precharge: sysclk.cycles_for_ns(T_RP_NS),
            error_pulse: sysclk.cycles_for_ns(T_ERR_NS),
            capture_window: sysclk.cycles_for_ns(T_WINDOW_NS),
        }
    }

    /// Profile selected by the `sysclk-*` feature.
    #[cfg(all(feature = "sysclk-720mhz", not(feature = "sysclk-408mhz")))]
    pub const BOARD: Timing = Timing::derive(Hertz::mhz(720), F1C100S_SAMPLE_LATENCY);

    /// Profile selected by the `sysclk-*` feature.
    #[cfg(all(feature = "sysclk-408mhz", not(feature = "sysclk-720mhz")))]
    pub const BOARD: Timing = Timing::derive(Hertz::mhz(408), F1C100S_SAMPLE_LATENCY);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_settle_exceeds_cac_plus_latency() {
        let t = Timing::derive(Hertz::mhz(720), F1C100S_SAMPLE_LATENCY);
        // 120ns @ 720MHz = 86.4 -> 87 cycles
        assert_eq!(t.read_settle, 87 + F1C100S_SAMPLE_LATENCY);
        assert_eq!(t.row_active, 144);
        assert_eq!(t.row_setup, 18);
    }

    #[test]
    fn slow_clock_still_waits() {
        // 16MHz: every nonzero minimum needs at least one cycle
        let t = Timing::derive(Hertz::mhz(16), 1);
        assert_eq!(t.row_setup, 1);
        assert_eq!(t.read_settle, 3);
        assert_eq!(t.write_pulse, 2);
        assert_eq!(t.row_active, 4);
        assert_eq!(t.error_pulse, 16);
    }

    #[test]
    fn board_profile_matches_feature() {
        #[cfg(feature = "sysclk-720mhz")]
        assert_eq!(Timing::BOARD.sysclk, Hertz::mhz(720));
        #[cfg(feature = "sysclk-408mhz")]
        assert_eq!(Timing::BOARD.sysclk, Hertz::mhz(408));
    }
}
