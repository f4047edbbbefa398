//! Cycle-count busy waits.
//!
//! The counts come from [`crate::timing::Timing`]; nothing here knows about
//! nanoseconds. On ARM each iteration is a volatile `nop`, which the compiler
//! may not merge or drop.

/// Idle for `n` CPU cycles (one `nop` per cycle, plus loop overhead).
#[inline(always)]
pub fn cycles(n: u32) {
    let mut i = 0;
    while i < core::hint::black_box(n) {
        #[cfg(target_arch = "arm")]
        unsafe {
            core::arch::asm!("nop", options(nomem, nostack, preserves_flags));
        }
        #[cfg(not(target_arch = "arm"))]
        core::hint::spin_loop();
        i += 1;
    }
}
