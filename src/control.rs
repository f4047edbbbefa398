//! DRAM control-line phases.
//!
//! Every control line is active-low on the wire. A [`ControlPhase`] records
//! which lines are *asserted*; the bus implementation turns that into pin
//! levels. The all-inactive phase ([`ControlPhase::IDLE`]) is the only legal
//! state between bus cycles.

use core::ops::{BitOr, BitOrAssign};

/// Set of asserted control lines.
#[derive(Clone, Copy, PartialEq, Eq, Default, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ControlPhase(u8);

impl ControlPhase {
    /// No line asserted (all pins high).
    pub const IDLE: Self = Self(0);
    /// RAS: latches the row half of the address.
    pub const ROW_STROBE: Self = Self(1 << 0);
    /// CAS: latches the column half of the address.
    pub const COLUMN_STROBE: Self = Self(1 << 1);
    /// WE: selects a write cycle.
    pub const WRITE_ENABLE: Self = Self(1 << 2);
    /// Trigger output for external instrumentation.
    pub const ERROR_STROBE: Self = Self(1 << 3);
    /// Marks the data-valid window of a read. No fixture pin carries it; only
    /// simulated buses observe it.
    pub const READ_ENABLE: Self = Self(1 << 4);

    const ALL: u8 = 0x1F;

    /// Combine any number of lines into one phase.
    pub const fn of(lines: &[ControlPhase]) -> Self {
        let mut bits = 0;
        let mut i = 0;
        while i < lines.len() {
            bits |= lines[i].0;
            i += 1;
        }
        Self(bits)
    }

    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn is_idle(self) -> bool {
        self.0 == 0
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn from_bits_truncate(bits: u8) -> Self {
        Self(bits & Self::ALL)
    }
}

impl BitOr for ControlPhase {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

impl BitOrAssign for ControlPhase {
    fn bitor_assign(&mut self, rhs: Self) {
        *self = self.union(rhs);
    }
}

impl core::fmt::Debug for ControlPhase {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        const NAMES: [(ControlPhase, &str); 5] = [
            (ControlPhase::ROW_STROBE, "RAS"),
            (ControlPhase::COLUMN_STROBE, "CAS"),
            (ControlPhase::WRITE_ENABLE, "WE"),
            (ControlPhase::ERROR_STROBE, "ERR"),
            (ControlPhase::READ_ENABLE, "RE"),
        ];

        if self.is_idle() {
            return f.write_str("IDLE");
        }
        let mut first = true;
        for (line, name) in NAMES {
            if self.contains(line) {
                if !first {
                    f.write_str("|")?;
                }
                f.write_str(name)?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Phases used by the bus cycles.
pub const READ_ROW: ControlPhase = ControlPhase::ROW_STROBE;
pub const READ_COL: ControlPhase = ControlPhase::of(&[
    ControlPhase::ROW_STROBE,
    ControlPhase::COLUMN_STROBE,
    ControlPhase::READ_ENABLE,
]);
pub const WRITE_ROW: ControlPhase = ControlPhase::of(&[ControlPhase::ROW_STROBE, ControlPhase::WRITE_ENABLE]);
pub const WRITE_COL: ControlPhase = ControlPhase::of(&[
    ControlPhase::ROW_STROBE,
    ControlPhase::COLUMN_STROBE,
    ControlPhase::WRITE_ENABLE,
]);
pub const REFRESH: ControlPhase = ControlPhase::ROW_STROBE;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn combine_lines() {
        let phase = ControlPhase::ROW_STROBE | ControlPhase::WRITE_ENABLE;
        assert_eq!(phase, WRITE_ROW);
        assert!(phase.contains(ControlPhase::ROW_STROBE));
        assert!(!phase.contains(ControlPhase::COLUMN_STROBE));
        assert!(!phase.is_idle());
        assert!(ControlPhase::default().is_idle());
    }

    #[test]
    fn write_col_asserts_three_lines() {
        assert_eq!(WRITE_COL.bits(), 0b0111);
        assert!(!WRITE_COL.contains(ControlPhase::READ_ENABLE));
        assert!(READ_COL.contains(ControlPhase::READ_ENABLE));
    }

    #[test]
    fn truncates_unknown_bits() {
        assert_eq!(ControlPhase::from_bits_truncate(0xFF).bits(), 0x1F);
    }
}
