//! WS2812 protocol timing and its conversion to CPU cycles.
//!
//! Every symbol occupies the same bit period. A `0` and a `1` differ only in
//! where the line falls inside that period, so the period must never be
//! derived separately per symbol.

/// WS2812 0-bit high time in ns.
#[cfg(not(feature = "slow"))]
pub const T0H_NS: u32 = 400;
/// WS2812 1-bit high time in ns.
#[cfg(not(feature = "slow"))]
pub const T1H_NS: u32 = 800;

/// WS2812 0-bit high time in ns, stretched towards the top of the window.
#[cfg(feature = "slow")]
pub const T0H_NS: u32 = 450;
/// WS2812 1-bit high time in ns, stretched towards the top of the window.
#[cfg(feature = "slow")]
pub const T1H_NS: u32 = 900;

/// Nominal 0-bit high time the receiver expects, in ns.
pub const NOMINAL_T0H_NS: u32 = 400;
/// Nominal 1-bit high time the receiver expects, in ns.
pub const NOMINAL_T1H_NS: u32 = 800;
/// WS2812 total bit period in ns.
pub const BIT_PERIOD_NS: u32 = 1250;
/// Allowed deviation of either high pulse in ns.
pub const HIGH_TOLERANCE_NS: u32 = 150;
/// Allowed deviation of the bit period in ns.
pub const PERIOD_TOLERANCE_NS: u32 = 600;
/// Line-low time that latches a frame, in µs (≥50µs for WS2812, ≥280µs for WS2812B).
pub const LATCH_US: u32 = 300;

/// Bits on the wire per pixel (8 each for G, R, B).
pub const BITS_PER_PIXEL: usize = 24;

/// Convert nanoseconds to cycles of a `hz` clock, rounding.
pub const fn to_cycles(ns: u32, hz: u32) -> u32 {
    ((ns as u64 * hz as u64 + 500_000_000) / 1_000_000_000) as u32
}

/// Convert cycles of a `hz` clock back to nanoseconds, truncating.
pub const fn to_ns(cycles: u32, hz: u32) -> u32 {
    (cycles as u64 * 1_000_000_000 / hz as u64) as u32
}

const fn within(actual: u32, nominal: u32, tolerance: u32) -> bool {
    if actual > nominal {
        actual - nominal <= tolerance
    } else {
        nominal - actual <= tolerance
    }
}

/// Cycle budget of one bit symbol at a fixed clock.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BitTiming {
    /// Clock the cycle counts are expressed in.
    pub clock_hz: u32,
    /// High cycles of a `0` symbol.
    pub high_zero: u32,
    /// High cycles of a `1` symbol.
    pub high_one: u32,
    /// Cycles of a whole symbol, identical for both values.
    pub period: u32,
}

impl BitTiming {
    /// Derive the cycle budget for a clock of `hz`.
    pub const fn for_clock(hz: u32) -> Self {
        Self {
            clock_hz: hz,
            high_zero: to_cycles(T0H_NS, hz),
            high_one: to_cycles(T1H_NS, hz),
            period: to_cycles(BIT_PERIOD_NS, hz),
        }
    }

    /// High cycles for a symbol of value `bit`.
    #[inline(always)]
    pub const fn high(&self, bit: bool) -> u32 {
        if bit { self.high_one } else { self.high_zero }
    }

    /// Low cycles for a symbol of value `bit`; the remainder of the period.
    #[inline(always)]
    pub const fn low(&self, bit: bool) -> u32 {
        self.period - self.high(bit)
    }

    /// Whether both symbols land inside the receiver's tolerance window.
    pub const fn is_valid(&self) -> bool {
        if self.clock_hz == 0 {
            return false;
        }
        if !(self.high_zero < self.high_one && self.high_one < self.period) {
            return false;
        }
        let hz = self.clock_hz;
        within(to_ns(self.high_zero, hz), NOMINAL_T0H_NS, HIGH_TOLERANCE_NS)
            && within(to_ns(self.high_one, hz), NOMINAL_T1H_NS, HIGH_TOLERANCE_NS)
            && within(to_ns(self.period, hz), BIT_PERIOD_NS, PERIOD_TOLERANCE_NS)
    }
}

/// Cost model of a busy-wait loop that, asked for `n`, runs `n + 1`
/// iterations (as `cortex_m::asm::delay` does).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DelayLoop {
    /// Cycles per iteration of the loop body.
    pub cycles_per_iteration: u32,
    /// Cycles of the store that flips the line.
    pub edge_cycles: u32,
    /// Cycles after the low wait before the next rising edge: bit test,
    /// branch and byte loop.
    pub loop_cycles: u32,
}

/// Iterations that fill `cycles`, rounding, never below the one iteration
/// the loop always runs.
const fn iterations(cycles: u32, per_iteration: u32) -> u32 {
    let n = (cycles + per_iteration / 2) / per_iteration;
    if n == 0 { 1 } else { n }
}

impl DelayLoop {
    /// Loop arguments that reproduce `timing` as closely as the loop allows.
    ///
    /// The low wait is derived from what the high wait really costs, so both
    /// symbols keep the same period.
    pub const fn counts(self, timing: BitTiming) -> LoopCounts {
        let per = self.cycles_per_iteration;
        let mut high = [0; 2];
        let mut low = [0; 2];
        let mut i = 0;
        while i < 2 {
            let bit = i == 1;
            let high_iters = iterations(timing.high(bit).saturating_sub(self.edge_cycles), per);
            let high_spent = self.edge_cycles + high_iters * per;
            let low_budget = timing
                .period
                .saturating_sub(high_spent + self.edge_cycles + self.loop_cycles);
            high[i] = high_iters - 1;
            low[i] = iterations(low_budget, per) - 1;
            i += 1;
        }
        LoopCounts {
            clock_hz: timing.clock_hz,
            delay: self,
            high,
            low,
        }
    }
}

/// Arguments to pass a [`DelayLoop`] for the high and low half of each
/// symbol, indexed by bit value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LoopCounts {
    pub clock_hz: u32,
    pub delay: DelayLoop,
    pub high: [u32; 2],
    pub low: [u32; 2],
}

impl LoopCounts {
    /// Cycles the line really stays high for a symbol of value `bit`.
    pub const fn high_cycles(&self, bit: bool) -> u32 {
        self.delay.edge_cycles + (self.high[bit as usize] + 1) * self.delay.cycles_per_iteration
    }

    /// Cycles from one rising edge to the next for a symbol of value `bit`.
    pub const fn period_cycles(&self, bit: bool) -> u32 {
        self.high_cycles(bit)
            + self.delay.edge_cycles
            + self.delay.loop_cycles
            + (self.low[bit as usize] + 1) * self.delay.cycles_per_iteration
    }

    /// Whether the emitted waveform, loop cost included, meets the receiver's
    /// windows, with both symbols sharing one period to within an iteration.
    pub const fn is_valid(&self) -> bool {
        let hz = self.clock_hz;
        if hz == 0 || self.delay.cycles_per_iteration == 0 {
            return false;
        }
        let p0 = self.period_cycles(false);
        let p1 = self.period_cycles(true);
        let skew = if p0 > p1 { p0 - p1 } else { p1 - p0 };
        skew < self.delay.cycles_per_iteration
            && within(to_ns(self.high_cycles(false), hz), NOMINAL_T0H_NS, HIGH_TOLERANCE_NS)
            && within(to_ns(self.high_cycles(true), hz), NOMINAL_T1H_NS, HIGH_TOLERANCE_NS)
            && within(to_ns(p0, hz), BIT_PERIOD_NS, PERIOD_TOLERANCE_NS)
            && within(to_ns(p1, hz), BIT_PERIOD_NS, PERIOD_TOLERANCE_NS)
    }
}

/// Time a frame of `leds` pixels keeps the caller blocked, latch included, in µs.
pub const fn frame_duration_us(leds: usize) -> u32 {
    let active_time_ns = (leds * BITS_PER_PIXEL) as u32 * BIT_PERIOD_NS;
    active_time_ns.div_ceil(1000) + LATCH_US
}
