//! Pass/fail lamps.

use core::convert::Infallible;

use embedded_hal::digital::OutputPin;

use crate::fault::FaultState;

/// Two status outputs. Fail dominates pass.
pub trait Indicator {
    fn set_pass(&mut self, on: bool);
    fn set_fail(&mut self, on: bool);
}

/// Drive the lamps from the fault state. `qualified` is true once a pass
/// worth reporting has completed; fail stays on from the first fault until
/// reset and keeps pass off.
pub fn render<I: Indicator + ?Sized>(indicator: &mut I, faults: &FaultState, qualified: bool) {
    let fail = faults.is_set();
    indicator.set_fail(fail);
    indicator.set_pass(qualified && !fail);
}

/// LEDs on two GPIO outputs, active-high.
pub struct PinIndicator<P, F> {
    pass: P,
    fail: F,
}

impl<P, F> PinIndicator<P, F>
where
    P: OutputPin<Error = Infallible>,
    F: OutputPin<Error = Infallible>,
{
    pub fn new(pass: P, fail: F) -> Self {
        let mut indicator = Self { pass, fail };
        indicator.set_pass(false);
        indicator.set_fail(false);
        indicator
    }

    pub fn release(self) -> (P, F) {
        (self.pass, self.fail)
    }
}

impl<P, F> Indicator for PinIndicator<P, F>
where
    P: OutputPin<Error = Infallible>,
    F: OutputPin<Error = Infallible>,
{
    fn set_pass(&mut self, on: bool) {
        self.pass.set_state(on.into()).unwrap_or_else(|e| match e {});
    }

    fn set_fail(&mut self, on: bool) {
        self.fail.set_state(on.into()).unwrap_or_else(|e| match e {});
    }
}
