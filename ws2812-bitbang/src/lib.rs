//! Drive a short chain of WS2812 LEDs (aka Neopixel) by bit-banging one GPIO.
//!
//! The crate keeps a frame buffer in the chain's green-red-blue wire order and
//! streams it through a [`BitEmitter`], the one primitive that has to be
//! cycle-accurate. Everything else (ordering, palette, latching) is plain code
//! and is tested on the host.
//!
//! Symbols are emitted with preemption suspended through `critical-section`,
//! so the final binary must link an implementation, e.g. `cortex-m`'s
//! `critical-section-single-core`.
//!
//! ```ignore
//! let mut ws: Ws2812<_, _, 3> = Ws2812::new(emitter, Delay);
//! ws.set_color(1, ColorIndex::RED, Brightness::DEFAULT);
//! ws.transmit();
//! ```
//!
//! [`Ws2812`] also implements `SmartLedsWrite` for use with the `smart-leds`
//! crate.

#![no_std]

pub mod emit;
pub mod exclusive;
pub mod frame;
pub mod palette;
pub mod strip;
pub mod timing;

pub use emit::{BitEmitter, DelayEmitter};
pub use frame::FrameBuffer;
pub use palette::{Brightness, ColorIndex, PALETTE, resolve_color};
pub use rgb::RGB8;
pub use strip::Ws2812;
pub use timing::{BitTiming, DelayLoop, LoopCounts};
