//! Eight-entry color palette and brightness scaling.

use rgb::RGB8;

/// Base colors, kept around 40% intensity to limit current draw.
pub const PALETTE: [RGB8; 8] = [
    RGB8::new(0, 0, 0),
    RGB8::new(100, 0, 0),
    RGB8::new(0, 100, 0),
    RGB8::new(0, 0, 100),
    // less green than a pure mix, reads as yellow rather than lime
    RGB8::new(100, 80, 0),
    RGB8::new(0, 100, 100),
    RGB8::new(100, 0, 100),
    RGB8::new(100, 100, 100),
];

/// Position in [`PALETTE`]. Anything out of range means off.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ColorIndex(u8);

impl ColorIndex {
    pub const OFF: Self = Self(0);
    pub const RED: Self = Self(1);
    pub const GREEN: Self = Self(2);
    pub const BLUE: Self = Self(3);
    pub const YELLOW: Self = Self(4);
    pub const CYAN: Self = Self(5);
    pub const MAGENTA: Self = Self(6);
    pub const WHITE: Self = Self(7);

    /// Coerce a raw index, mapping anything past the table to [`OFF`](Self::OFF).
    pub const fn new(raw: u8) -> Self {
        if (raw as usize) < PALETTE.len() {
            Self(raw)
        } else {
            Self::OFF
        }
    }

    pub const fn get(self) -> u8 {
        self.0
    }
}

impl From<u8> for ColorIndex {
    fn from(raw: u8) -> Self {
        Self::new(raw)
    }
}

/// Linear scale applied to all three channels, 255 being full palette intensity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Brightness(pub u8);

impl Brightness {
    /// About 4%, enough to see the color without a large supply.
    pub const DEFAULT: Self = Self(10);
    pub const FULL: Self = Self(255);
    pub const OFF: Self = Self(0);

    /// Scale one channel, truncating toward zero.
    pub const fn scale(self, channel: u8) -> u8 {
        (channel as u16 * self.0 as u16 / 255) as u8
    }
}

impl Default for Brightness {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Look up `index` in the palette and scale it by `brightness`.
pub const fn resolve_color(index: ColorIndex, brightness: Brightness) -> RGB8 {
    let base = PALETTE[index.0 as usize];
    RGB8::new(
        brightness.scale(base.r),
        brightness.scale(base.g),
        brightness.scale(base.b),
    )
}
