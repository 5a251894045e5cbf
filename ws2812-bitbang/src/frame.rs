//! Fixed-size pixel store kept in wire order.

use rgb::RGB8;

/// Bytes per pixel on the wire.
pub const CHANNELS: usize = 3;

/// Colors for a chain of `N` LEDs, stored green, red, blue per pixel so a
/// transmit can stream the bytes without reordering.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FrameBuffer<const N: usize> {
    grb: [[u8; CHANNELS]; N],
}

impl<const N: usize> Default for FrameBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> FrameBuffer<N> {
    /// A buffer with every LED off.
    pub const fn new() -> Self {
        Self {
            grb: [[0; CHANNELS]; N],
        }
    }

    /// Number of LEDs in the chain.
    pub const fn len(&self) -> usize {
        N
    }

    pub const fn is_empty(&self) -> bool {
        N == 0
    }

    /// Zero every channel, same as [`clear`](Self::clear).
    pub fn init(&mut self) {
        self.clear();
    }

    /// Store one pixel given in RGB order. Indices past the end are ignored.
    pub fn set_pixel(&mut self, index: usize, r: u8, g: u8, b: u8) {
        if let Some(px) = self.grb.get_mut(index) {
            *px = [g, r, b];
        }
    }

    /// Read one pixel back in RGB order.
    pub fn pixel(&self, index: usize) -> Option<RGB8> {
        self.grb.get(index).map(|&[g, r, b]| RGB8::new(r, g, b))
    }

    /// Set every pixel to `color`.
    pub fn fill(&mut self, color: RGB8) {
        self.grb.fill([color.g, color.r, color.b]);
    }

    pub fn clear(&mut self) {
        self.grb.fill([0; CHANNELS]);
    }

    /// The whole frame as it goes on the wire.
    pub fn as_wire(&self) -> &[u8] {
        self.grb.as_flattened()
    }

    /// Wire bytes in transmission order: pixel 0 G, R, B, then pixel 1, ...
    pub fn wire_bytes(&self) -> impl Iterator<Item = u8> + '_ {
        self.as_wire().iter().copied()
    }
}
