//! Linear address to multiplexed row/column mapping, and address-space sweeps.
//!
//! The low byte drives the row. Consecutive addresses therefore land on
//! consecutive rows, so any sweep touches every row within 256 cycles and the
//! test traffic itself keeps the array refreshed.

/// Number of linear addresses covered by one 8-bit row/column sweep.
pub const SWEEP_LEN: u32 = 1 << 16;

/// Row, column and extra-bit lines for one bus cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BusAddress {
    pub row: u8,
    pub col: u8,
    /// A8 during the row phase; `None` leaves the line alone.
    pub row_extra: Option<bool>,
    /// A8 during the column phase; `None` leaves the line alone.
    pub col_extra: Option<bool>,
}

/// Split a 16-bit address into `(row, col)`: row is the low byte.
#[inline(always)]
pub const fn split(address: u16) -> (u8, u8) {
    (address as u8, (address >> 8) as u8)
}

/// Split for high-density parts: `top_bit` is driven on A8 in both phases.
#[inline(always)]
pub const fn split_wide(address: u16, top_bit: bool) -> BusAddress {
    let (row, col) = split(address);
    BusAddress {
        row,
        col,
        row_extra: Some(top_bit),
        col_extra: Some(top_bit),
    }
}

/// Split an 18-bit address: bits 0-15 as [`split`], bit 16 is the row
/// extra bit and bit 17 the column extra bit.
#[inline(always)]
pub const fn split_extended(address: u32) -> BusAddress {
    let (row, col) = split(address as u16);
    BusAddress {
        row,
        col,
        row_extra: Some(address & (1 << 16) != 0),
        col_extra: Some(address & (1 << 17) != 0),
    }
}

/// Traversal order of the address space.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    Ascending,
    Descending,
}

/// One full wraparound of the 16-bit address space.
///
/// The counter starts at 0 and stops when it is back at 0: ascending visits
/// `0, 1, .., 0xFFFF`; descending pre-decrements and visits `0xFFFF, .., 1, 0`.
#[derive(Clone, Debug)]
pub struct Sweep {
    direction: Direction,
    counter: u16,
    done: bool,
}

impl Sweep {
    pub const fn new(direction: Direction) -> Self {
        Self {
            direction,
            counter: 0,
            done: false,
        }
    }
}

impl Iterator for Sweep {
    type Item = u16;

    #[inline]
    fn next(&mut self) -> Option<u16> {
        if self.done {
            return None;
        }
        let address = match self.direction {
            Direction::Ascending => {
                let a = self.counter;
                self.counter = self.counter.wrapping_add(1);
                a
            }
            Direction::Descending => {
                self.counter = self.counter.wrapping_sub(1);
                self.counter
            }
        };
        if self.counter == 0 {
            self.done = true;
        }
        Some(address)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = if self.done {
            0
        } else {
            match self.direction {
                Direction::Ascending if self.counter == 0 => SWEEP_LEN as usize,
                Direction::Ascending => SWEEP_LEN as usize - self.counter as usize,
                Direction::Descending if self.counter == 0 => SWEEP_LEN as usize,
                Direction::Descending => self.counter as usize,
            }
        };
        (left, Some(left))
    }
}

impl ExactSizeIterator for Sweep {}

/// Extra-bit `(row, col)` pairs for high-density parts, in ascending order.
/// Descending sweeps walk this table backwards.
pub const EXTRA_ORDER: [(bool, bool); 4] = [(false, false), (true, false), (false, true), (true, true)];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_is_low_byte() {
        assert_eq!(split(0x1234), (0x34, 0x12));
        assert_eq!(split(0x00FF), (0xFF, 0x00));
    }

    #[test]
    fn wide_split_drives_both_phases() {
        let a = split_wide(0xABCD, true);
        assert_eq!((a.row, a.col), (0xCD, 0xAB));
        assert_eq!(a.row_extra, Some(true));
        assert_eq!(a.col_extra, Some(true));
    }

    #[test]
    fn extended_split_orders_extra_bits() {
        for (i, (row_extra, col_extra)) in EXTRA_ORDER.iter().enumerate() {
            let a = split_extended(((i as u32) << 16) | 0x0102);
            assert_eq!((a.row, a.col), (0x02, 0x01));
            assert_eq!(a.row_extra, Some(*row_extra));
            assert_eq!(a.col_extra, Some(*col_extra));
        }
    }

    #[test]
    fn ascending_sweep_bounds() {
        let mut sweep = Sweep::new(Direction::Ascending);
        assert_eq!(sweep.len(), 65536);
        assert_eq!(sweep.next(), Some(0));
        assert_eq!(sweep.len(), 65535);
        assert_eq!(sweep.last(), Some(0xFFFF));
    }

    #[test]
    fn descending_sweep_bounds() {
        let mut sweep = Sweep::new(Direction::Descending);
        assert_eq!(sweep.len(), 65536);
        assert_eq!(sweep.next(), Some(0xFFFF));
        assert_eq!(sweep.len(), 65535);
        assert_eq!(sweep.last(), Some(0));
    }

    #[test]
    fn sweep_visits_every_address_once() {
        for direction in [Direction::Ascending, Direction::Descending] {
            let mut seen = [0u8; 65536];
            for a in Sweep::new(direction) {
                seen[a as usize] += 1;
            }
            assert!(seen.iter().all(|&n| n == 1), "{:?}", direction);
        }
    }
}
