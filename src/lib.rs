#![cfg_attr(not(any(test, feature = "sim")), no_std)]
#![allow(static_mut_refs, unexpected_cfgs)]

//! Test fixture firmware for 41xx-family asynchronous DRAM on the F1C100S.
//!
//! At power-up the mode switch picks one of two loops that run until reset:
//! an endless March C- soak test of the whole part, or an access-time
//! instrument that bins the part as fast, typical or slow. Everything above
//! [`bus::DramBus`] is plain logic and runs on the host against [`sim`].

#[cfg(not(any(feature = "sysclk-720mhz", feature = "sysclk-408mhz")))]
compile_error!("select a CPU clock profile: enable `sysclk-720mhz` or `sysclk-408mhz`");

#[cfg(all(feature = "sysclk-720mhz", feature = "sysclk-408mhz"))]
compile_error!("`sysclk-720mhz` and `sysclk-408mhz` are mutually exclusive");

#[cfg(all(feature = "stopwatch-avs0", feature = "stopwatch-avs1"))]
compile_error!("`stopwatch-avs0` and `stopwatch-avs1` are mutually exclusive");

#[cfg(target_arch = "arm")]
pub use arm9; // 确保 arm9 crate 被链接（提供 critical_section 实现）
pub(crate) use embassy_hal_internal::{impl_peripheral, peripherals_definition, peripherals_struct};
pub use embassy_hal_internal::{Peri, PeripheralType};
#[cfg(target_arch = "arm")]
pub use f1c100s_pac as pac;

// This must go FIRST so that all the other modules see its macros.
include!(concat!(env!("OUT_DIR"), "/_macros.rs"));

pub mod time;

pub mod debug;

#[cfg(target_arch = "arm")]
pub mod rcc;

pub use crate::_generated::{peripherals, Peripherals};

pub mod gpio;

pub mod control;
pub mod delay;
pub mod timing;

pub mod address;
pub mod bus;
pub mod sequencer;

pub mod fault;
pub mod indicator;
pub mod stopwatch;

pub mod density;
pub mod march;

pub mod instrument;

pub mod dispatch;

#[cfg(any(test, feature = "sim"))]
pub mod sim;

// This must go last, so that it sees all the impl_foo! macros defined earlier.
pub(crate) mod _generated {
    #![allow(dead_code)]
    #![allow(unused_imports)]
    #![allow(non_snake_case)]
    #![allow(missing_docs)]

    include!(concat!(env!("OUT_DIR"), "/_generated.rs"));
}

#[cfg(target_arch = "arm")]
pub struct Config {
    pub rcc: rcc::Config,
}

#[cfg(target_arch = "arm")]
impl Default for Config {
    fn default() -> Self {
        Self {
            rcc: rcc::Config::default(),
        }
    }
}

/// Initialize the board with the provided configuration.
///
/// This returns the peripheral singletons that can be used for creating drivers.
///
/// This should only be called once at startup, otherwise it panics.
///
/// IRQs stay masked: the fixture polls everything, and an interrupt landing
/// between two strobe edges would break the bus timing.
#[cfg(target_arch = "arm")]
pub fn init(config: Config) -> Peripherals {
    // Initialize clock tree (CCU)
    unsafe {
        rcc::init(config.rcc);
    }

    // Initialize debug UART (must be after clock init for correct baud rate)
    debug::DebugPrint::enable();

    let sysclk = rcc::clocks().sysclk;
    if sysclk != timing::Timing::BOARD.sysclk {
        crate::println!(
            "WARNING: CPU at {} Hz, bus timing built for {} Hz",
            sysclk.0,
            timing::Timing::BOARD.sysclk.0
        );
    }

    let p = Peripherals::take();

    // Copy vector table to 0x00000000 so ARM9 exception vectors work.
    // The linker places __vector_table after the boot header (0x30+),
    // but ARM9 always fetches exceptions from 0x00000000.
    unsafe {
        extern "C" {
            static __vector_table: u32;
        }
        let src = &__vector_table as *const u32;
        let dst = 0x0000_0000 as *mut u32;
        // Vector table is 8 entries (ldr pc, xxx) + 8 addresses = 64 bytes = 16 words
        for i in 0..16 {
            dst.add(i).write_volatile(src.add(i).read_volatile());
        }
    }

    p
}
