//! Time units

/// Hertz
#[derive(Eq, PartialEq, Ord, PartialOrd, Clone, Copy, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Hertz(pub u32);

impl Hertz {
    pub const fn hz(hertz: u32) -> Self {
        Self(hertz)
    }

    pub const fn khz(kilohertz: u32) -> Self {
        Self(kilohertz * 1_000)
    }

    pub const fn mhz(megahertz: u32) -> Self {
        Self(megahertz * 1_000_000)
    }

    /// Whole clock cycles needed to cover `ns` nanoseconds, rounded up.
    pub const fn cycles_for_ns(self, ns: u32) -> u32 {
        let cycles = (ns as u64 * self.0 as u64 + 999_999_999) / 1_000_000_000;
        cycles as u32
    }
}
