//! Cycle-counted WS2812 symbols written straight to the nRF52840 P0 port.
//!
//! Going through `embedded-hal` costs a few hundred ns per edge at opt-level
//! "z", a third of a bit period, so the edges here are single stores to the
//! OUTSET/OUTCLR registers and the waits are `asm::delay` loops. The loop cost
//! in [`ASM_DELAY`] is the documented one, not a measurement; confirm the
//! waveform on a logic analyzer after touching this file or the clock.

use core::ptr;

use cortex_m::asm;
use embassy_nrf::gpio::Output;
use ws2812_bitbang::{BitEmitter, DelayLoop, LoopCounts};

const P0_BASE: usize = 0x5000_0000;
const P0_OUTSET: *mut u32 = (P0_BASE + 0x508) as *mut u32;
const P0_OUTCLR: *mut u32 = (P0_BASE + 0x50C) as *mut u32;

/// `asm::delay(n)` runs `n + 1` rounds of `subs; bne`, about 3 cycles each
/// on a Cortex-M4.
pub const ASM_DELAY: DelayLoop = DelayLoop {
    cycles_per_iteration: 3,
    edge_cycles: 2,
    loop_cycles: 6,
};

/// Emitter for a P0 pin already configured as a push-pull output.
pub struct PortEmitter<'d> {
    // Held so nothing else can reconfigure or drive the pin.
    _pin: Output<'d>,
    mask: u32,
    high: [u32; 2],
    low: [u32; 2],
}

impl<'d> PortEmitter<'d> {
    /// `pin` must be P0.`number`; `counts` must come from [`ASM_DELAY`].
    pub fn new(mut pin: Output<'d>, number: u8, counts: LoopCounts) -> Self {
        assert!(number < 32, "only port 0 is supported");
        pin.set_low();
        defmt::debug!("ws2812 delay loops: high {} low {}", counts.high, counts.low);

        Self {
            _pin: pin,
            mask: 1 << number,
            high: counts.high,
            low: counts.low,
        }
    }
}

impl BitEmitter for PortEmitter<'_> {
    #[inline(always)]
    fn emit_bit(&mut self, bit: bool) {
        let i = bit as usize;
        // SAFETY: OUTSET/OUTCLR only touch the bits set in `mask`, the pin we own.
        unsafe { ptr::write_volatile(P0_OUTSET, self.mask) };
        asm::delay(self.high[i]);
        unsafe { ptr::write_volatile(P0_OUTCLR, self.mask) };
        asm::delay(self.low[i]);
    }

    fn idle(&mut self) {
        // SAFETY: as above.
        unsafe { ptr::write_volatile(P0_OUTCLR, self.mask) };
    }
}
