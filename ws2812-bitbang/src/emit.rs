//! The single timing-critical primitive and a portable implementation of it.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use crate::timing::{BIT_PERIOD_NS, T0H_NS, T1H_NS};

/// Puts one WS2812 symbol on the data line.
///
/// Implementations must drive the line high, hold it for the symbol's high
/// time, then hold it low for the rest of a fixed bit period, and return
/// without leaving a gap before the next call. Whether they do is a property of
/// the generated instructions and has to be checked with a logic analyzer.
pub trait BitEmitter {
    fn emit_bit(&mut self, bit: bool);

    /// Drive the line low ahead of a frame.
    fn idle(&mut self) {}
}

impl<T: BitEmitter + ?Sized> BitEmitter for &mut T {
    #[inline(always)]
    fn emit_bit(&mut self, bit: bool) {
        T::emit_bit(self, bit)
    }

    fn idle(&mut self) {
        T::idle(self)
    }
}

/// Emitter built from an `embedded-hal` pin and delay.
///
/// Only fast enough when `set_high`/`set_low` compile to a single register
/// write and the delay is cycle-based; a timer-queue delay will not hit the
/// window. Prefer a target-specific emitter where one exists.
pub struct DelayEmitter<DELAY, PIN> {
    delay: DELAY,
    pin: PIN,
}

impl<DELAY, PIN> DelayEmitter<DELAY, PIN>
where
    DELAY: DelayNs,
    PIN: OutputPin,
{
    pub fn new(delay: DELAY, mut pin: PIN) -> Self {
        pin.set_low().ok();
        Self { delay, pin }
    }

    pub fn release(self) -> (DELAY, PIN) {
        (self.delay, self.pin)
    }
}

impl<DELAY, PIN> BitEmitter for DelayEmitter<DELAY, PIN>
where
    DELAY: DelayNs,
    PIN: OutputPin,
{
    #[inline(always)]
    fn emit_bit(&mut self, bit: bool) {
        let high = if bit { T1H_NS } else { T0H_NS };
        self.pin.set_high().ok();
        self.delay.delay_ns(high);
        self.pin.set_low().ok();
        self.delay.delay_ns(BIT_PERIOD_NS - high);
    }

    fn idle(&mut self) {
        self.pin.set_low().ok();
    }
}
