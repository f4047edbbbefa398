//! Multiplexed DRAM bus.
//!
//! [`DramBus`] is the seam between the signal sequencer and whatever drives
//! the wires: [`GpioBus`] on the fixture, `sim::SimDram` in host tests. It
//! only moves levels; ordering and delays belong to
//! [`Sequencer`](crate::sequencer::Sequencer).

use crate::control::ControlPhase;
use crate::gpio::{DriveStrength, Flex, Input, Output, PortGroup, Pull};

/// Raw line access for one DRAM socket.
pub trait DramBus {
    /// Put `byte` on A0-A7.
    fn set_address(&mut self, byte: u8);

    /// Drive A8 to the given level, or release it when `None`.
    fn set_extra(&mut self, bit: Option<bool>);

    /// Assert exactly the lines in `phase`, release all others.
    fn set_control(&mut self, phase: ControlPhase);

    /// Drive Din.
    fn drive_data(&mut self, bit: bool);

    /// Sample Dout.
    fn sample_data(&mut self) -> bool;
}

impl<B: DramBus + ?Sized> DramBus for &mut B {
    #[inline(always)]
    fn set_address(&mut self, byte: u8) {
        (**self).set_address(byte)
    }

    #[inline(always)]
    fn set_extra(&mut self, bit: Option<bool>) {
        (**self).set_extra(bit)
    }

    #[inline(always)]
    fn set_control(&mut self, phase: ControlPhase) {
        (**self).set_control(phase)
    }

    #[inline(always)]
    fn drive_data(&mut self, bit: bool) {
        (**self).drive_data(bit)
    }

    #[inline(always)]
    fn sample_data(&mut self) -> bool {
        (**self).sample_data()
    }
}

/// Pin levels for the control group (bit 0 RAS, 1 CAS, 2 WE, 3 ERR) with
/// every line released.
const CONTROL_RELEASED: u32 = 0b1111;

/// Fixture wiring on the F1C100S PIO:
///
/// | Signal   | Pin       |
/// |----------|-----------|
/// | A0-A7    | PD0-PD7   |
/// | A8       | PD8       |
/// | RAS      | PE2       |
/// | CAS      | PE3       |
/// | WE       | PE4       |
/// | ERR      | PE5       |
/// | Din      | PE6       |
/// | Dout     | PE10      |
///
/// In measurement mode the stopwatch switches Dout to its EINT function. The
/// DATA register still follows the pin there, so sampling keeps working.
pub struct GpioBus<'d> {
    address: PortGroup<'d, 8>,
    extra: Flex<'d>,
    extra_driven: bool,
    control: PortGroup<'d, 4>,
    din: Output<'d>,
    dout: Input<'d>,
}

impl<'d> GpioBus<'d> {
    pub fn new(
        address: PortGroup<'d, 8>,
        mut extra: Flex<'d>,
        mut control: PortGroup<'d, 4>,
        din: Output<'d>,
        dout: Input<'d>,
    ) -> Self {
        control.write(CONTROL_RELEASED);
        extra.set_as_input(Pull::None);
        Self {
            address,
            extra,
            extra_driven: false,
            control,
            din,
            dout,
        }
    }

    /// Dout, for drivers that latch edges on it.
    pub fn dout(&self) -> &Input<'d> {
        &self.dout
    }
}

impl<'d> DramBus for GpioBus<'d> {
    #[inline(always)]
    fn set_address(&mut self, byte: u8) {
        self.address.write(byte as u32);
    }

    #[inline(always)]
    fn set_extra(&mut self, bit: Option<bool>) {
        match bit {
            Some(level) => {
                self.extra.set_level(level.into());
                if !self.extra_driven {
                    self.extra.set_as_output(DriveStrength::Level1);
                    self.extra_driven = true;
                }
            }
            None => {
                if self.extra_driven {
                    self.extra.set_as_input(Pull::None);
                    self.extra_driven = false;
                }
            }
        }
    }

    #[inline(always)]
    fn set_control(&mut self, phase: ControlPhase) {
        // Active-low: asserted lines go to 0
        self.control.write(!(phase.bits() as u32) & CONTROL_RELEASED);
    }

    #[inline(always)]
    fn drive_data(&mut self, bit: bool) {
        self.din.set_level(bit.into());
    }

    #[inline(always)]
    fn sample_data(&mut self) -> bool {
        self.dout.is_high()
    }
}
