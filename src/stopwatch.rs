//! Polled stopwatch for access-time measurement.
//!
//! The stopwatch is a passive time base: it counts from [`Stopwatch::start`]
//! and latches the count at the first Dout edge of the programmed polarity.
//! Nothing here raises an interrupt; the instrument polls it while CAS is
//! asserted.

/// Capture polarity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Edge {
    Rising,
    Falling,
}

impl Edge {
    pub const fn toggled(self) -> Self {
        match self {
            Edge::Rising => Edge::Falling,
            Edge::Falling => Edge::Rising,
        }
    }
}

pub trait Stopwatch {
    /// Program the capture polarity, clear the captured flag and start
    /// counting.
    fn start(&mut self, edge: Edge);

    /// Give software-latched implementations a chance to look for the edge.
    /// Hardware with real input capture leaves this empty.
    fn poll(&mut self) {}

    /// Stop counting. Returns the captured tick count, or `None` when no edge
    /// was seen since [`Stopwatch::start`].
    fn stop(&mut self) -> Option<u16>;

    /// Back to idle, captured flag cleared.
    fn reset(&mut self);
}

#[cfg(all(target_arch = "arm", feature = "_stopwatch"))]
pub use avs::AvsStopwatch;

#[cfg(all(target_arch = "arm", feature = "_stopwatch"))]
mod avs {
    //! AVS counter time base with the EINT status latch as capture flag.
    //!
    //! AVS Counter runs from 24MHz / (Divisor + 1); with divisor 0 one tick is
    //! ~41.7ns. The EINT block latches the selected Dout edge in EINT_STA even
    //! with the PIO interrupt masked in INTC, which is all a polled capture
    //! needs.
    //!
    //! # Features
    //! - `stopwatch-avs0` - Use AVS Counter 0
    //! - `stopwatch-avs1` - Use AVS Counter 1 (default)

    use f1c100s_pac::{Ccu, Pio, Timer};

    use super::{Edge, Stopwatch};
    use crate::gpio::{AnyPin, Input, PinMode, SealedPin};
    use crate::{peripherals, Peri};

    /// EINT trigger type (4 bits per pin in EINT_CFGx)
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    #[repr(u32)]
    enum EintTrigger {
        PositiveEdge = 0,
        NegativeEdge = 1,
    }

    /// Only PD(3), PE(4), PF(5) support EINT
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum EintPort {
        PD = 3,
        PE = 4,
        PF = 5,
    }

    impl EintPort {
        fn from_port_num(port: u8) -> Option<Self> {
            match port {
                3 => Some(EintPort::PD),
                4 => Some(EintPort::PE),
                5 => Some(EintPort::PF),
                _ => None,
            }
        }
    }

    fn set_trigger(port: EintPort, pin: u8, trigger: EintTrigger) {
        let pio = unsafe { Pio::steal() };
        let offset = ((pin % 8) * 4) as usize;
        let val = trigger as u32;
        let update = |bits: u32| (bits & !(0xF << offset)) | (val << offset);

        match (port, pin / 8) {
            (EintPort::PD, 0) => {
                pio.pd_eint_cfg0().modify(|r, w| unsafe { w.bits(update(r.bits())) });
            }
            (EintPort::PD, 1) => {
                pio.pd_eint_cfg1().modify(|r, w| unsafe { w.bits(update(r.bits())) });
            }
            (EintPort::PD, 2) => {
                pio.pd_eint_cfg2().modify(|r, w| unsafe { w.bits(update(r.bits())) });
            }
            (EintPort::PE, 0) => {
                pio.pe_eint_cfg0().modify(|r, w| unsafe { w.bits(update(r.bits())) });
            }
            (EintPort::PE, 1) => {
                pio.pe_eint_cfg1().modify(|r, w| unsafe { w.bits(update(r.bits())) });
            }
            (EintPort::PF, 0) => {
                pio.pf_eint_cfg0().modify(|r, w| unsafe { w.bits(update(r.bits())) });
            }
            _ => {}
        }
    }

    fn enable(port: EintPort, bit: u32) {
        let pio = unsafe { Pio::steal() };
        match port {
            EintPort::PD => {
                pio.pd_eint_ctl().modify(|r, w| unsafe { w.bits(r.bits() | bit) });
            }
            EintPort::PE => {
                pio.pe_eint_ctl().modify(|r, w| unsafe { w.bits(r.bits() | bit) });
            }
            EintPort::PF => {
                pio.pf_eint_ctl().modify(|r, w| unsafe { w.bits(r.bits() | bit) });
            }
        }
    }

    fn read_status(port: EintPort) -> u32 {
        let pio = unsafe { Pio::steal() };
        match port {
            EintPort::PD => pio.pd_eint_sta().read().bits(),
            EintPort::PE => pio.pe_eint_sta().read().bits(),
            EintPort::PF => pio.pf_eint_sta().read().bits(),
        }
    }

    /// Write 1 to clear
    fn clear_status(port: EintPort, bit: u32) {
        let pio = unsafe { Pio::steal() };
        match port {
            EintPort::PD => {
                pio.pd_eint_sta().write(|w| unsafe { w.bits(bit) });
            }
            EintPort::PE => {
                pio.pe_eint_sta().write(|w| unsafe { w.bits(bit) });
            }
            EintPort::PF => {
                pio.pf_eint_sta().write(|w| unsafe { w.bits(bit) });
            }
        }
    }

    #[inline(always)]
    fn counter() -> u32 {
        let timer = unsafe { Timer::steal() };
        #[cfg(feature = "stopwatch-avs0")]
        let count = timer.avs_cnt0().read().bits();
        #[cfg(all(feature = "stopwatch-avs1", not(feature = "stopwatch-avs0")))]
        let count = timer.avs_cnt1().read().bits();
        count
    }

    pub struct AvsStopwatch<'d> {
        _timer: Peri<'d, peripherals::TIMER>,
        port: EintPort,
        bit: u32,
        started_at: u32,
        captured: Option<u32>,
    }

    impl<'d> AvsStopwatch<'d> {
        /// Put `dout` in EINT mode and start the AVS counter at 24MHz.
        ///
        /// Returns `None` if `dout` is not on an EINT-capable port.
        pub fn new(timer: Peri<'d, peripherals::TIMER>, dout: &Input<'_>) -> Option<Self> {
            let (port_num, pin) = dout.port_pin();
            let port = EintPort::from_port_num(port_num)?;

            unsafe { AnyPin::steal((port_num << 5) | pin) }.set_mode(PinMode::Eint);

            let ccu = unsafe { Ccu::steal() };
            let regs = unsafe { Timer::steal() };
            ccu.avs_clk().modify(|_, w| w.sclk_gating().set_bit());

            #[cfg(feature = "stopwatch-avs0")]
            {
                regs.avs_cnt_div().modify(|_, w| unsafe { w.avs_cnt0_d().bits(0) });
                regs.avs_cnt0().write(|w| unsafe { w.bits(0) });
                regs.avs_cnt_ctl().modify(|_, w| w.avs_cnt0_en().set_bit());
            }
            #[cfg(all(feature = "stopwatch-avs1", not(feature = "stopwatch-avs0")))]
            {
                regs.avs_cnt_div().modify(|_, w| unsafe { w.avs_cnt1_d().bits(0) });
                regs.avs_cnt1().write(|w| unsafe { w.bits(0) });
                regs.avs_cnt_ctl().modify(|_, w| w.avs_cnt1_en().set_bit());
            }

            let bit = 1u32 << pin;
            enable(port, bit);
            clear_status(port, bit);

            Some(Self {
                _timer: timer,
                port,
                bit,
                started_at: 0,
                captured: None,
            })
        }
    }

    impl<'d> Stopwatch for AvsStopwatch<'d> {
        #[inline(always)]
        fn start(&mut self, edge: Edge) {
            let trigger = match edge {
                Edge::Rising => EintTrigger::PositiveEdge,
                Edge::Falling => EintTrigger::NegativeEdge,
            };
            set_trigger(self.port, (self.bit.trailing_zeros()) as u8, trigger);
            clear_status(self.port, self.bit);
            self.captured = None;
            self.started_at = counter();
        }

        #[inline(always)]
        fn poll(&mut self) {
            if self.captured.is_none() && read_status(self.port) & self.bit != 0 {
                self.captured = Some(counter().wrapping_sub(self.started_at));
            }
        }

        fn stop(&mut self) -> Option<u16> {
            self.poll();
            self.captured.map(|ticks| ticks.min(u16::MAX as u32) as u16)
        }

        fn reset(&mut self) {
            clear_status(self.port, self.bit);
            self.captured = None;
        }
    }
}
