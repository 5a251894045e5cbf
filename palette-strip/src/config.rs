//! Board configuration. Changing the clock re-derives every cycle count in
//! [`TIMING`] and every delay-loop argument in [`LOOPS`], and the build fails
//! if the waveform those loops produce misses the WS2812 window.

use ws2812_bitbang::{BitTiming, Brightness, LoopCounts};

use crate::port::ASM_DELAY;

/// LEDs on the strip.
pub const NUM_LEDS: usize = 3;

/// Data line, P0.13.
pub const DATA_PIN: u8 = 13;

/// nRF52840 core clock.
pub const CPU_HZ: u32 = 64_000_000;

pub const BRIGHTNESS: Brightness = Brightness::DEFAULT;

/// How long each palette step stays up.
pub const STEP_MS: u64 = 1000;

pub const TIMING: BitTiming = BitTiming::for_clock(CPU_HZ);

pub const LOOPS: LoopCounts = ASM_DELAY.counts(TIMING);

const _: () = assert!(LOOPS.is_valid(), "WS2812 timing out of tolerance at CPU_HZ");
