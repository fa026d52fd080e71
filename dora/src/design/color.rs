//! Engine-agnostic color representation.

use serde::{Deserialize, Serialize};

/// An RGBA color.
///
/// Serialized as a HEX string (`#RRGGBB` or `#RRGGBBAA`) so designs read
/// naturally in JSON.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Color {
    r: u8,
    g: u8,
    b: u8,
    a: u8,
}

impl From<String> for Color {
    fn from(value: String) -> Self {
        Self::try_from_hex(&value).unwrap_or(Color::BLACK)
    }
}

impl From<Color> for String {
    fn from(val: Color) -> Self {
        val.to_hex()
    }
}

impl Color {
    /// Transparent color: `#00000000`
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);
    /// Black color: `#000000FF`
    pub const BLACK: Color = Color::rgba(0, 0, 0, 255);
    /// White color: `#FFFFFFFF`
    pub const WHITE: Color = Color::rgba(255, 255, 255, 255);
    /// Gray color: `#AAAAAAFF`
    pub const GRAY: Color = Color::rgba(170, 170, 170, 255);
    /// Highlight color used for marked geometries: `#5EC4FFFF`
    pub const MARK_HIGHLIGHT: Color = Color::rgba(94, 196, 255, 255);

    /// Constructs a color from its RGBA channels.
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Converts the color into a HEX string (`#RRGGBB` when fully opaque,
    /// `#RRGGBBAA` otherwise).
    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
        } else {
            format!("#{:02X}{:02X}{:02X}{:02X}", self.r, self.g, self.b, self.a)
        }
    }

    /// Parses a color from a HEX6 (`#RRGGBB`) or HEX8 (`#RRGGBBAA`) string.
    pub fn try_from_hex(hex_string: &str) -> Option<Self> {
        if hex_string.len() != 7 && hex_string.len() != 9 || !hex_string.starts_with('#') {
            return None;
        }

        let r = u8::from_str_radix(&hex_string[1..3], 16).ok()?;
        let g = u8::from_str_radix(&hex_string[3..5], 16).ok()?;
        let b = u8::from_str_radix(&hex_string[5..7], 16).ok()?;
        let a = if hex_string.len() == 9 {
            u8::from_str_radix(&hex_string[7..9], 16).ok()?
        } else {
            255
        };

        Some(Self { r, g, b, a })
    }

    /// Returns a copy of the color with the given alpha channel.
    pub fn with_alpha(&self, a: u8) -> Self {
        Self { a, ..*self }
    }

    /// Returns true if the color is fully transparent (`a == 0`).
    pub fn is_transparent(&self) -> bool {
        self.a == 0
    }

    /// Red component of the color.
    pub fn r(&self) -> u8 {
        self.r
    }

    /// Green component of the color.
    pub fn g(&self) -> u8 {
        self.g
    }

    /// Blue component of the color.
    pub fn b(&self) -> u8 {
        self.b
    }

    /// Alpha component of the color.
    pub fn a(&self) -> u8 {
        self.a
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_round_trip() {
        let color = Color::try_from_hex("#FF1000AA").unwrap();
        assert_eq!(color, Color::rgba(255, 16, 0, 170));
        assert_eq!(&color.to_hex(), "#FF1000AA");

        let opaque = Color::try_from_hex("#112233").unwrap();
        assert_eq!(&opaque.to_hex(), "#112233");
    }

    #[test]
    fn invalid_hex() {
        assert!(Color::try_from_hex("112233").is_none());
        assert!(Color::try_from_hex("#11223").is_none());
        assert!(Color::try_from_hex("#11 233").is_none());
    }

    #[test]
    fn serde_as_string() {
        let color: Color = serde_json::from_str("\"#5EC4FF\"").unwrap();
        assert_eq!(color, Color::MARK_HIGHLIGHT);
        assert_eq!(serde_json::to_string(&color).unwrap(), "\"#5EC4FF\"");
    }
}
