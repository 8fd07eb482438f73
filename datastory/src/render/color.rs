//! Colors and the stable per-entity palette.

use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Opaque 8-bit sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    /// Red.
    pub r: u8,
    /// Green.
    pub g: u8,
    /// Blue.
    pub b: u8,
}

/// The ten-entry categorical palette used for per-entity colors.
pub const CATEGORY10: [Color; 10] = [
    Color::rgb(0x1f, 0x77, 0xb4),
    Color::rgb(0xff, 0x7f, 0x0e),
    Color::rgb(0x2c, 0xa0, 0x2c),
    Color::rgb(0xd6, 0x27, 0x28),
    Color::rgb(0x94, 0x67, 0xbd),
    Color::rgb(0x8c, 0x56, 0x4b),
    Color::rgb(0xe3, 0x77, 0xc2),
    Color::rgb(0x7f, 0x7f, 0x7f),
    Color::rgb(0xbc, 0xbd, 0x22),
    Color::rgb(0x17, 0xbe, 0xcf),
];

impl Color {
    /// Default mark color.
    pub const STEELBLUE: Color = Color::rgb(0x46, 0x82, 0xb4);
    /// Axis and text color.
    pub const INK: Color = Color::rgb(0x33, 0x33, 0x33);

    /// Build from components.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Stable palette color for an entity key.
    ///
    /// The same key maps to the same color on every render, so a line and its legend swatch
    /// always agree.
    pub fn for_key(key: &str) -> Self {
        let h = xxhash_rust::xxh3::xxh3_64(key.as_bytes());
        CATEGORY10[(h % CATEGORY10.len() as u64) as usize]
    }

    /// Parse `#RRGGBB`, `#RGB` or one of a few CSS color names.
    pub fn parse(s: &str) -> Result<Self, String> {
        let s = s.trim();
        if let Some(c) = named(s) {
            return Ok(c);
        }
        let hex = s
            .strip_prefix('#')
            .ok_or_else(|| format!("unknown color \"{s}\" (use #RRGGBB or a CSS name)"))?;

        fn nibble(c: u8) -> Result<u8, String> {
            (c as char)
                .to_digit(16)
                .map(|d| d as u8)
                .ok_or_else(|| format!("invalid hex digit '{}'", c as char))
        }

        let bytes = hex.as_bytes();
        match bytes.len() {
            3 => {
                let r = nibble(bytes[0])?;
                let g = nibble(bytes[1])?;
                let b = nibble(bytes[2])?;
                Ok(Self::rgb(r * 17, g * 17, b * 17))
            }
            6 => {
                let byte = |i: usize| Ok::<u8, String>(nibble(bytes[i])? * 16 + nibble(bytes[i + 1])?);
                Ok(Self::rgb(byte(0)?, byte(2)?, byte(4)?))
            }
            _ => Err("hex color must be #RGB or #RRGGBB".to_owned()),
        }
    }
}

fn named(s: &str) -> Option<Color> {
    let c = match s.to_ascii_lowercase().as_str() {
        "steelblue" => Color::STEELBLUE,
        "black" => Color::rgb(0, 0, 0),
        "white" => Color::rgb(0xff, 0xff, 0xff),
        "gray" | "grey" => Color::rgb(0x80, 0x80, 0x80),
        "red" => Color::rgb(0xff, 0, 0),
        "green" => Color::rgb(0, 0x80, 0),
        "blue" => Color::rgb(0, 0, 0xff),
        "orange" => Color::rgb(0xff, 0xa5, 0),
        "tomato" => Color::rgb(0xff, 0x63, 0x47),
        "seagreen" => Color::rgb(0x2e, 0x8b, 0x57),
        _ => return None,
    };
    Some(c)
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Str(String),
            Arr([u8; 3]),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Str(s) => Color::parse(&s).map_err(serde::de::Error::custom),
            Repr::Arr([r, g, b]) => Ok(Color::rgb(r, g, b)),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/color.rs"]
mod tests;
