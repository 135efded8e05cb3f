//! Linear RGB color used by categories, stars and particle buffers.
//!
//! # Invariants
//! - Channels are kept in `[0.0, 1.0]`.
//! - Wire form is a `#rrggbb` hex string.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

static HEX_COLOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#?([0-9a-fA-F]{6})$").expect("valid hex color regex"));

/// Error returned when a color string is not `#rrggbb`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorParseError(pub String);

impl Display for ColorParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid color `{}`; expected #rrggbb", self.0)
    }
}

impl Error for ColorParseError {}

/// RGB triple with unit-range channels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    /// Neutral fallback used whenever no category color is available.
    pub const WHITE: Rgb = Rgb {
        r: 1.0,
        g: 1.0,
        b: 1.0,
    };

    pub fn new(r: f32, g: f32, b: f32) -> Self {
        Self {
            r: r.clamp(0.0, 1.0),
            g: g.clamp(0.0, 1.0),
            b: b.clamp(0.0, 1.0),
        }
    }

    pub fn from_u8(r: u8, g: u8, b: u8) -> Self {
        Self::new(
            f32::from(r) / 255.0,
            f32::from(g) / 255.0,
            f32::from(b) / 255.0,
        )
    }

    /// Parses `#rrggbb` (leading `#` optional, case-insensitive).
    pub fn from_hex(value: &str) -> Result<Self, ColorParseError> {
        let captures = HEX_COLOR_RE
            .captures(value.trim())
            .ok_or_else(|| ColorParseError(value.to_string()))?;
        let digits = &captures[1];
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&digits[range], 16).map_err(|_| ColorParseError(value.to_string()))
        };
        Ok(Self::from_u8(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }

    pub fn to_hex(self) -> String {
        let [r, g, b] = self.to_u8();
        format!("#{r:02x}{g:02x}{b:02x}")
    }

    pub fn to_u8(self) -> [u8; 3] {
        [
            (self.r * 255.0).round() as u8,
            (self.g * 255.0).round() as u8,
            (self.b * 255.0).round() as u8,
        ]
    }

    pub fn to_array(self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }
}

impl TryFrom<String> for Rgb {
    type Error = ColorParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value)
    }
}

impl From<Rgb> for String {
    fn from(value: Rgb) -> Self {
        value.to_hex()
    }
}

#[cfg(test)]
mod tests {
    use super::Rgb;

    #[test]
    fn hex_parse_accepts_optional_hash_and_case() {
        let a = Rgb::from_hex("#FF8000").unwrap();
        let b = Rgb::from_hex("ff8000").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.to_hex(), "#ff8000");
    }

    #[test]
    fn hex_parse_rejects_short_form() {
        let err = Rgb::from_hex("#fff").unwrap_err();
        assert!(err.to_string().contains("#rrggbb"));
    }

    #[test]
    fn new_clamps_channels() {
        let color = Rgb::new(1.5, -0.2, 0.5);
        assert_eq!(color.r, 1.0);
        assert_eq!(color.g, 0.0);
        assert_eq!(color.b, 0.5);
    }

    #[test]
    fn serializes_as_hex_string() {
        let json = serde_json::to_string(&Rgb::from_u8(0x12, 0x34, 0x56)).unwrap();
        assert_eq!(json, "\"#123456\"");
    }
}
