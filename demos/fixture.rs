//! DRAM test fixture firmware.
//!
//! Wiring (F1C100S PIO):
//! - DRAM bus: see [`GpioBus`]
//! - PE9: mode switch to GND (open: March C-, closed: access time)
//! - PE11: pass LED, PE12: fail LED (active-high)
//! - UART0 (PE1=TX, PE0=RX): log, 115200 baud

#![no_std]
#![no_main]

use embassy_executor::Spawner;
use f1c100s_dram_tester as fixture;
use fixture::bus::GpioBus;
use fixture::dispatch::{self, Mode};
use fixture::gpio::{DriveStrength, Flex, Input, Level, Output, PortGroup, Pull};
use fixture::indicator::PinIndicator;
use fixture::sequencer::Sequencer;
use fixture::stopwatch::AvsStopwatch;
use fixture::timing::Timing;
use fixture::println;

#[embassy_executor::main(entry = "arm9_rt::entry")]
async fn main(_spawner: Spawner) -> ! {
    let p = fixture::init(fixture::Config::default());

    println!("\n=== F1C100S DRAM Tester ===\n");

    let Some(address) = PortGroup::new(
        [
            p.PD0.into(),
            p.PD1.into(),
            p.PD2.into(),
            p.PD3.into(),
            p.PD4.into(),
            p.PD5.into(),
            p.PD6.into(),
            p.PD7.into(),
        ],
        0,
        DriveStrength::Level1,
    ) else {
        panic!("address bus pins");
    };
    let Some(control) = PortGroup::new(
        [p.PE2.into(), p.PE3.into(), p.PE4.into(), p.PE5.into()],
        0b1111,
        DriveStrength::Level1,
    ) else {
        panic!("control bus pins");
    };
    let extra = Flex::new(p.PD8);
    let din = Output::new(p.PE6, Level::Low, DriveStrength::Level1);
    let dout = Input::new(p.PE10, Pull::None);

    let bus = GpioBus::new(address, extra, control, din, dout);
    let Some(mut stopwatch) = AvsStopwatch::new(p.TIMER, bus.dout()) else {
        panic!("Dout has no EINT function");
    };

    let mut indicator = PinIndicator::new(
        Output::new(p.PE11, Level::Low, DriveStrength::Level1),
        Output::new(p.PE12, Level::Low, DriveStrength::Level1),
    );

    let mut switch = Input::new(p.PE9, Pull::Up);
    let mode = Mode::sample(&mut switch);

    println!(
        "CPU {} Hz, tCAC {} cycles, tRAS {} cycles",
        Timing::BOARD.sysclk.0,
        Timing::BOARD.read_settle,
        Timing::BOARD.row_active
    );

    let mut seq = Sequencer::new(bus, Timing::BOARD);
    dispatch::run(mode, &mut seq, &mut stopwatch, &mut indicator)
}

#[panic_handler]
fn panic(info: &core::panic::PanicInfo) -> ! {
    println!("PANIC: {:?}", info);
    loop {}
}
