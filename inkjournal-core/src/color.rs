//! Colors are packed `0xRRGGBBAA`, straight (non-premultiplied) alpha.

/// A packed `0xRRGGBBAA` color.
#[repr(transparent)]
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Rgba(pub u32);
impl Rgba {
    pub const BLACK: Self = Self(0x0000_00ff);
    pub const WHITE: Self = Self(0xffff_ffff);
    /// Light blue of ruled lines.
    pub const RULING: Self = Self(0x40a0_ffff);
    /// Opacity applied to highlighter strokes.
    pub const HIGHLIGHTER_ALPHA: u8 = 0x80;

    #[must_use]
    pub const fn from_channels([r, g, b, a]: [u8; 4]) -> Self {
        Self(u32::from_be_bytes([r, g, b, a]))
    }
    #[must_use]
    pub const fn channels(self) -> [u8; 4] {
        self.0.to_be_bytes()
    }
    #[must_use]
    pub const fn alpha(self) -> u8 {
        self.channels()[3]
    }
    #[must_use]
    pub const fn with_alpha(self, alpha: u8) -> Self {
        let [r, g, b, _] = self.channels();
        Self::from_channels([r, g, b, alpha])
    }
}
impl std::fmt::Display for Rgba {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:08x}", self.0)
    }
}

/// The fixed color choices offered for ink and paper.
#[derive(
    strum::AsRefStr, strum::EnumIter, Copy, Clone, PartialEq, Eq, Hash, Debug,
)]
pub enum Swatch {
    Black,
    Blue,
    Red,
    Green,
    Gray,
    LightBlue,
    LightGreen,
    Magenta,
    Orange,
    Yellow,
    White,
}
impl Swatch {
    /// Ink color of this swatch.
    #[must_use]
    pub fn ink(self) -> Rgba {
        INK[self as usize]
    }
    /// Paper color of this swatch. Swatches with no sensible paper tint map to white.
    #[must_use]
    pub fn paper(self) -> Rgba {
        PAPER[self as usize]
    }
}

const INK: [Rgba; 11] = [
    Rgba(0x0000_00ff),
    Rgba(0x3333_ccff),
    Rgba(0xff00_00ff),
    Rgba(0x0080_00ff),
    Rgba(0x8080_80ff),
    Rgba(0x00c0_ffff),
    Rgba(0x00ff_00ff),
    Rgba(0xff00_ffff),
    Rgba(0xff80_00ff),
    Rgba(0xffff_00ff),
    Rgba(0xffff_ffff),
];
const PAPER: [Rgba; 11] = [
    Rgba(0xffff_ffff),
    Rgba(0xa0e8_ffff),
    Rgba(0xffc0_d4ff),
    Rgba(0x80ff_c0ff),
    Rgba(0xffff_ffff),
    Rgba(0xa0e8_ffff),
    Rgba(0x80ff_c0ff),
    Rgba(0xffc0_d4ff),
    Rgba(0xffc0_80ff),
    Rgba(0xffff_80ff),
    Rgba(0xffff_ffff),
];
