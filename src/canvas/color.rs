use std::fmt::{Display, Formatter};
use std::str::FromStr;
use thiserror::Error;

#[cfg(test)]
use quickcheck::{Arbitrary, Gen};

/// Color data represented as red, green, and blue channels each having a depth of 8 bits
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Color(pub u8, pub u8, pub u8);

impl Color {
    /// Pure white which is also the value of unpainted and erased pixels
    pub const WHITE: Color = Color(0xFF, 0xFF, 0xFF);

    /// Pure black, the color a new editor session starts painting with
    pub const BLACK: Color = Color(0x00, 0x00, 0x00);

    /// Whether this is the [`WHITE`](Color::WHITE) eraser color
    pub fn is_white(&self) -> bool {
        *self == Self::WHITE
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

impl From<[u8; 3]> for Color {
    fn from(data: [u8; 3]) -> Self {
        Self(data[0], data[1], data[2])
    }
}

impl From<Color> for [u8; 3] {
    fn from(value: Color) -> Self {
        [value.0, value.1, value.2]
    }
}

impl From<(u8, u8, u8)> for Color {
    fn from(value: (u8, u8, u8)) -> Self {
        Self(value.0, value.1, value.2)
    }
}

impl From<u32> for Color {
    /// Interpret the lower 24 bits of `src` as `0xRRGGBB`
    fn from(src: u32) -> Self {
        let b = src.to_be_bytes();
        Self(b[1], b[2], b[3])
    }
}

impl From<Color> for u32 {
    fn from(value: Color) -> Self {
        (value.0 as u32) << 16 | (value.1 as u32) << 8 | (value.2 as u32)
    }
}

/// An error which indicates that a string is not a valid hex color
#[derive(Debug, Error, Clone, Eq, PartialEq)]
#[error("'{input}' is not a hex color of the form #RRGGBB")]
pub struct ColorParseError {
    input: String,
}

impl FromStr for Color {
    type Err = ColorParseError;

    /// Parse a color from `#RRGGBB` or `RRGGBB` notation.
    ///
    /// An empty string is white, the same way an unfilled cell is treated by the editor.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ColorParseError { input: s.to_string() };
        let hex = s.trim();
        if hex.is_empty() {
            return Ok(Self::WHITE);
        }

        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(err());
        }
        let value = u32::from_str_radix(hex, 16).map_err(|_| err())?;
        Ok(value.into())
    }
}

impl Display for Color {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.0, self.1, self.2)
    }
}

#[cfg(test)]
impl Arbitrary for Color {
    fn arbitrary(g: &mut Gen) -> Self {
        Self(u8::arbitrary(g), u8::arbitrary(g), u8::arbitrary(g))
    }
}
