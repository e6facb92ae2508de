//! RGBA colour used by the config, the markup parser and the draw surface.

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// 8-bit RGBA colour.
///
/// Serialized as `#RRGGBBAA` (alpha may be omitted when reading).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const WHITE: Rgba = Rgba::rgb(255, 255, 255);
    pub const BLACK: Rgba = Rgba::rgb(0, 0, 0);
    pub const CYAN: Rgba = Rgba::rgb(0, 255, 255);
    pub const TRANSPARENT: Rgba = Rgba::new(0, 0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Decode a bare `RRGGBB` hex string (no leading `#`). Alpha is opaque.
    pub fn from_hex(hex: &str) -> Option<Self> {
        if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        let value = u32::from_str_radix(hex, 16).ok()?;
        Some(Self::rgb((value >> 16) as u8, (value >> 8) as u8, value as u8))
    }

    /// Same colour with the given alpha.
    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    /// Scale this colour's own alpha by a line opacity (0..=255).
    pub fn modulate(self, alpha: u8) -> Self {
        let a = (u16::from(self.a) * u16::from(alpha) / 255) as u8;
        self.with_alpha(a)
    }

    pub fn is_transparent(self) -> bool {
        self.a == 0
    }

    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl Default for Rgba {
    fn default() -> Self {
        Self::WHITE
    }
}

impl From<Rgba> for String {
    fn from(c: Rgba) -> Self {
        format!("#{:02X}{:02X}{:02X}{:02X}", c.r, c.g, c.b, c.a)
    }
}

impl TryFrom<String> for Rgba {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let hex = value.trim().trim_start_matches('#').to_string();
        if !hex.is_ascii() {
            return Err(Error::InvalidColor(value));
        }
        match hex.len() {
            6 => Rgba::from_hex(&hex).ok_or(Error::InvalidColor(value)),
            8 => {
                let rgb = Rgba::from_hex(&hex[..6]).ok_or_else(|| Error::InvalidColor(value.clone()))?;
                let a = u8::from_str_radix(&hex[6..], 16).map_err(|_| Error::InvalidColor(value.clone()))?;
                Ok(rgb.with_alpha(a))
            }
            _ => Err(Error::InvalidColor(value)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_six_digit_hex() {
        assert_eq!(Rgba::from_hex("ff0000"), Some(Rgba::rgb(255, 0, 0)));
        assert_eq!(Rgba::from_hex("00FF7f"), Some(Rgba::rgb(0, 255, 127)));
    }

    #[test]
    fn rejects_malformed_hex() {
        assert_eq!(Rgba::from_hex("ff00"), None);
        assert_eq!(Rgba::from_hex("gg0000"), None);
        assert_eq!(Rgba::from_hex("+f0000"), None);
    }

    #[test]
    fn string_form_carries_alpha() {
        let s: String = Rgba::new(1, 2, 3, 4).into();
        assert_eq!(s, "#01020304");
        let back = Rgba::try_from(s).unwrap();
        assert_eq!(back, Rgba::new(1, 2, 3, 4));
        assert_eq!(Rgba::try_from("#00FFFF".to_string()).unwrap(), Rgba::CYAN);
        assert!(Rgba::try_from("cyan".to_string()).is_err());
    }

    #[test]
    fn modulate_scales_alpha() {
        assert_eq!(Rgba::WHITE.modulate(255).a, 255);
        assert_eq!(Rgba::WHITE.modulate(0).a, 0);
        assert_eq!(Rgba::new(0, 0, 0, 128).modulate(255).a, 128);
    }
}
