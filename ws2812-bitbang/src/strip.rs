//! Frame serialization and the strip handle callers drive.

use core::convert::Infallible;

use embedded_hal::delay::DelayNs;
use rgb::RGB8;
use smart_leds_trait::SmartLedsWrite;

use crate::emit::BitEmitter;
use crate::exclusive::Exclusive;
use crate::frame::FrameBuffer;
use crate::palette::{Brightness, ColorIndex, resolve_color};
use crate::timing::LATCH_US;

/// Send one byte, most significant bit first, with no gap between symbols.
#[inline(always)]
fn write_byte<E: BitEmitter>(emitter: &mut E, mut data: u8) {
    for _ in 0..8 {
        emitter.emit_bit((data & 0x80) != 0);
        data <<= 1;
    }
}

/// Stream a whole frame: pixels in index order, G, R, B within each.
fn write_frame<E: BitEmitter, const N: usize>(emitter: &mut E, frame: &FrameBuffer<N>) {
    for byte in frame.wire_bytes() {
        write_byte(emitter, byte);
    }
}

/// Driver for a chain of `N` WS2812-family devices on one data line.
///
/// Owns the frame buffer; the only way to change what the LEDs show is to
/// edit it through this handle and call [`transmit`](Self::transmit).
pub struct Ws2812<E, D, const N: usize> {
    emitter: E,
    delay: D,
    frame: FrameBuffer<N>,
}

impl<E, D, const N: usize> Ws2812<E, D, N>
where
    E: BitEmitter,
    D: DelayNs,
{
    /// Take the line and start from an all-off frame.
    pub fn new(emitter: E, delay: D) -> Self {
        let mut ws = Self {
            emitter,
            delay,
            frame: FrameBuffer::new(),
        };
        ws.init();
        ws
    }

    /// Zero the frame and park the line low. Does not transmit.
    pub fn init(&mut self) {
        self.frame.init();
        self.emitter.idle();
    }

    /// Set pixel `index` from RGB components. Out-of-range indices are ignored.
    pub fn set_pixel(&mut self, index: usize, r: u8, g: u8, b: u8) {
        self.frame.set_pixel(index, r, g, b);
    }

    /// Set pixel `index` to a palette entry at `brightness`.
    pub fn set_color(&mut self, index: usize, color: ColorIndex, brightness: Brightness) {
        let RGB8 { r, g, b } = resolve_color(color, brightness);
        self.set_pixel(index, r, g, b);
    }

    pub fn pixel(&self, index: usize) -> Option<RGB8> {
        self.frame.pixel(index)
    }

    pub fn frame(&self) -> &FrameBuffer<N> {
        &self.frame
    }

    /// Turn every pixel off in the buffer. Call [`transmit`](Self::transmit)
    /// to make it visible.
    pub fn clear(&mut self) {
        self.frame.clear();
    }

    /// Emit the buffer and hold the line low until the chain latches.
    ///
    /// Blocks for [`frame_duration_us`](crate::timing::frame_duration_us) and
    /// cannot be interrupted: preemption is suspended while bits are on the
    /// wire and restored before the latch wait. Returning only means the
    /// waveform went out; the LEDs never acknowledge it.
    pub fn transmit(&mut self) {
        {
            let _excl = Exclusive::acquire();
            write_frame(&mut self.emitter, &self.frame);
        }
        self.delay.delay_us(LATCH_US);

        #[cfg(feature = "defmt")]
        defmt::trace!("ws2812: latched {} leds", N);
    }

    /// Same as [`transmit`](Self::transmit).
    pub fn show(&mut self) {
        self.transmit();
    }

    /// Clear the buffer, then transmit it.
    pub fn clear_and_show(&mut self) {
        self.clear();
        self.transmit();
    }

    pub fn release(self) -> (E, D) {
        (self.emitter, self.delay)
    }
}

impl<E, D, const N: usize> SmartLedsWrite for Ws2812<E, D, N>
where
    E: BitEmitter,
    D: DelayNs,
{
    type Error = Infallible;
    type Color = RGB8;

    /// Write all the items of an iterator to a ws2812 strip.
    ///
    /// Items past the end of the chain are dropped; pixels the iterator does
    /// not reach keep their previous color.
    fn write<T, I>(&mut self, iterator: T) -> Result<(), Self::Error>
    where
        T: IntoIterator<Item = I>,
        I: Into<Self::Color>,
    {
        for (i, item) in iterator.into_iter().take(N).enumerate() {
            let RGB8 { r, g, b } = item.into();
            self.set_pixel(i, r, g, b);
        }
        self.transmit();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    extern crate std;
    use std::panic::{self, AssertUnwindSafe};
    use std::sync::mpsc;
    use std::time::Duration;
    use std::{thread, vec, vec::Vec};

    use super::*;
    use crate::emit::mock::RecordingEmitter;

    #[derive(Default)]
    struct Latches(Vec<u32>);

    impl DelayNs for Latches {
        fn delay_ns(&mut self, ns: u32) {
            self.0.push(ns / 1000);
        }

        fn delay_us(&mut self, us: u32) {
            self.0.push(us);
        }
    }

    type Strip<const N: usize> = Ws2812<RecordingEmitter, Latches, N>;

    fn strip<const N: usize>() -> Strip<N> {
        Ws2812::new(RecordingEmitter::default(), Latches::default())
    }

    fn bits_of(bytes: &[u8]) -> Vec<bool> {
        bytes
            .iter()
            .flat_map(|&b| (0..8).rev().map(move |i| (b >> i) & 1 == 1))
            .collect()
    }

    #[test]
    fn green_pixel_goes_out_grb_msb_first() {
        let mut ws = strip::<1>();
        ws.set_pixel(0, 0x00, 0xff, 0x00);
        ws.transmit();

        let (emitter, _) = ws.release();
        assert_eq!(emitter.bytes(), vec![0xff, 0x00, 0x00]);
        assert_eq!(emitter.bits[..8], [true; 8]);
        assert_eq!(emitter.bits[8..], [false; 16]);
    }

    #[test]
    fn odd_byte_keeps_bit_order() {
        let mut ws = strip::<1>();
        ws.set_pixel(0, 0x00, 0b1000_0001, 0x00);
        ws.transmit();

        let (emitter, _) = ws.release();
        assert_eq!(emitter.bits[..8], bits_of(&[0x81])[..]);
        assert!(emitter.bits[0] && emitter.bits[7]);
    }

    #[test]
    fn set_then_transmit_three_leds() {
        let mut ws = strip::<3>();
        ws.init();
        ws.set_pixel(1, 100, 0, 0);
        ws.transmit();

        let (emitter, delay) = ws.release();
        let expected = [0, 0, 0, 0, 100, 0, 0, 0, 0];
        assert_eq!(emitter.bytes(), expected);
        assert_eq!(emitter.bits, bits_of(&expected));
        assert_eq!(emitter.bits.len(), 3 * 24);
        assert_eq!(delay.0, vec![LATCH_US]);
    }

    #[test]
    fn repeated_transmit_is_identical() {
        let mut ws = strip::<3>();
        ws.set_pixel(0, 1, 2, 3);
        ws.set_pixel(2, 0xaa, 0x55, 0xf0);
        ws.transmit();
        ws.transmit();

        let (emitter, delay) = ws.release();
        let (first, second) = emitter.bits.split_at(3 * 24);
        assert_eq!(first, second);
        assert_eq!(delay.0, vec![LATCH_US, LATCH_US]);
    }

    #[test]
    fn out_of_range_pixel_changes_nothing() {
        let mut ws = strip::<3>();
        ws.set_pixel(0, 5, 6, 7);
        let before = ws.frame().clone();
        ws.set_pixel(3, 1, 1, 1);
        ws.set_color(42, ColorIndex::WHITE, Brightness::FULL);
        assert_eq!(*ws.frame(), before);
    }

    #[test]
    fn clear_and_show_sends_dark_frame() {
        let mut ws = strip::<3>();
        ws.set_color(0, ColorIndex::RED, Brightness::FULL);
        ws.set_color(2, ColorIndex::CYAN, Brightness::FULL);
        ws.clear_and_show();

        for i in 0..3 {
            assert_eq!(ws.pixel(i), Some(RGB8::default()));
        }
        let (emitter, delay) = ws.release();
        assert!(emitter.bits.iter().all(|b| !b));
        assert_eq!(emitter.bits.len(), 72);
        assert_eq!(delay.0, vec![LATCH_US]);
    }

    #[test]
    fn clear_alone_does_not_transmit() {
        let mut ws = strip::<2>();
        ws.set_pixel(0, 1, 1, 1);
        ws.clear();
        let (emitter, delay) = ws.release();
        assert!(emitter.bits.is_empty());
        assert!(delay.0.is_empty());
    }

    #[test]
    fn new_parks_the_line() {
        let ws = strip::<3>();
        let (emitter, _) = ws.release();
        assert_eq!(emitter.idles, 1);
    }

    #[test]
    fn palette_colors_land_in_wire_order() {
        let mut ws = strip::<1>();
        ws.set_color(0, ColorIndex::YELLOW, Brightness::FULL);
        ws.show();
        let (emitter, _) = ws.release();
        assert_eq!(emitter.bytes(), vec![80, 100, 0]);
    }

    #[test]
    fn smart_leds_write_fills_and_transmits() {
        let mut ws = strip::<3>();
        ws.set_pixel(2, 9, 9, 9);
        let colors = [RGB8::new(1, 2, 3), RGB8::new(4, 5, 6)];
        ws.write(colors.iter().cloned()).unwrap();

        assert_eq!(ws.pixel(0), Some(RGB8::new(1, 2, 3)));
        assert_eq!(ws.pixel(1), Some(RGB8::new(4, 5, 6)));
        assert_eq!(ws.pixel(2), Some(RGB8::new(9, 9, 9)));
        let (emitter, _) = ws.release();
        assert_eq!(emitter.bytes(), vec![2, 1, 3, 5, 4, 6, 9, 9, 9]);
    }

    #[test]
    fn smart_leds_write_ignores_extra_items() {
        let mut ws = strip::<1>();
        ws.write([RGB8::new(0, 0, 7), RGB8::new(8, 8, 8)]).unwrap();
        let (emitter, _) = ws.release();
        assert_eq!(emitter.bytes(), vec![0, 0, 7]);
    }

    #[test]
    fn preemption_is_back_after_transmit() {
        let mut ws = strip::<3>();
        ws.set_pixel(1, 1, 2, 3);
        ws.transmit();

        let (tx, rx) = mpsc::channel();
        thread::spawn(move || critical_section::with(|_| tx.send(()).unwrap()));
        rx.recv_timeout(Duration::from_secs(5)).unwrap();
    }

    /// From inside the timed region, tries to get another context in.
    #[derive(Default)]
    struct Contended {
        emitted: usize,
        locked_out: Vec<bool>,
        entered: Vec<mpsc::Receiver<()>>,
    }

    impl BitEmitter for Contended {
        fn emit_bit(&mut self, _bit: bool) {
            self.emitted += 1;
            if self.emitted == 1 || self.emitted == 24 {
                let (tx, rx) = mpsc::channel();
                thread::spawn(move || critical_section::with(|_| tx.send(()).unwrap()));
                self.locked_out.push(rx.recv_timeout(Duration::from_millis(50)).is_err());
                self.entered.push(rx);
            }
        }
    }

    #[test]
    fn preemption_is_held_while_bits_go_out() {
        let mut ws: Ws2812<Contended, Latches, 1> =
            Ws2812::new(Contended::default(), Latches::default());
        ws.transmit();

        let (emitter, delay) = ws.release();
        assert_eq!(emitter.emitted, 24);
        assert_eq!(emitter.locked_out, vec![true, true]);
        // Let in once the frame is out.
        for rx in emitter.entered {
            rx.recv_timeout(Duration::from_secs(5)).unwrap();
        }
        assert_eq!(delay.0, vec![LATCH_US]);
    }

    struct Faulty;

    impl BitEmitter for Faulty {
        fn emit_bit(&mut self, _bit: bool) {
            panic!("line fault");
        }
    }

    #[test]
    fn preemption_is_back_after_a_panic() {
        let mut ws: Ws2812<Faulty, Latches, 1> = Ws2812::new(Faulty, Latches::default());
        let result = panic::catch_unwind(AssertUnwindSafe(|| ws.transmit()));
        assert!(result.is_err());

        let (tx, rx) = mpsc::channel();
        thread::spawn(move || critical_section::with(|_| tx.send(()).unwrap()));
        rx.recv_timeout(Duration::from_secs(5)).unwrap();
    }
}
