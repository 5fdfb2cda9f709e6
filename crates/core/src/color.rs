//! Colours for debug geometry.
//!
//! Scene markup writes colours the way CSS does: any CSS keyword, `#rgb`,
//! `#rrggbb`, `rgb(r, g, b)` or a `0xrrggbb` literal. Keyword and hex lookup is
//! delegated to `palette`, so `green` is `#008000`, not full-intensity green.

use palette::Srgb;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Error returned when parsing an invalid [`Color`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unrecognised colour '{input}'")]
pub struct ColorParseError {
    input: String,
}

impl From<ColorParseError> for crate::Error {
    fn from(err: ColorParseError) -> Self {
        crate::Error::InvalidParameter(err.to_string())
    }
}

/// 24-bit sRGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color(u32);

impl Color {
    /// Pure red.
    pub const RED: Self = Self(0xff0000);
    /// CSS `green`.
    pub const GREEN: Self = Self(0x008000);

    /// Build a colour from a packed `0xrrggbb` value.
    pub const fn from_hex(hex: u32) -> Self {
        Self(hex & 0x00ff_ffff)
    }

    /// Packed `0xrrggbb` value.
    pub const fn hex(self) -> u32 {
        self.0
    }

    /// Parse a CSS colour: keyword, `#rgb`, `#rrggbb`, `rgb()`/`rgba()` or `0xrrggbb`.
    ///
    /// Alpha is dropped, so `transparent` and `rgba(…, 0)` resolve to their RGB part.
    pub fn parse(input: &str) -> Result<Self, ColorParseError> {
        let lower = input.trim().to_ascii_lowercase();
        let srgb = if lower == "transparent" {
            Some(Srgb::new(0, 0, 0))
        } else if let Some(named) = palette::named::from_str(&lower) {
            Some(named)
        } else if let Some(args) = functional_args(&lower) {
            parse_rgb_function(args)
        } else {
            lower
                .strip_prefix('#')
                .or_else(|| lower.strip_prefix("0x"))
                .and_then(|digits| Srgb::<u8>::from_str(digits).ok())
        };

        srgb.map(Self::from_srgb).ok_or_else(|| ColorParseError {
            input: input.to_string(),
        })
    }

    /// Convert from an 8-bit sRGB value.
    pub fn from_srgb(srgb: Srgb<u8>) -> Self {
        let (r, g, b) = srgb.into_components();
        Self((u32::from(r) << 16) | (u32::from(g) << 8) | u32::from(b))
    }

    /// 8-bit sRGB components.
    pub fn to_srgb(self) -> Srgb<u8> {
        Srgb::new((self.0 >> 16) as u8, (self.0 >> 8) as u8, self.0 as u8)
    }

    /// `[r, g, b]` components in `0.0..=1.0`.
    pub fn to_rgb_f32(self) -> [f32; 3] {
        let (r, g, b) = self.to_srgb().into_format::<f32>().into_components();
        [r, g, b]
    }
}

fn functional_args(lower: &str) -> Option<&str> {
    lower
        .strip_prefix("rgba(")
        .or_else(|| lower.strip_prefix("rgb("))?
        .strip_suffix(')')
}

/// `r, g, b[, a]` with integer or percentage channels. Commas or spaces separate.
fn parse_rgb_function(args: &str) -> Option<Srgb<u8>> {
    let parts: Vec<&str> = args
        .split(|c: char| c == ',' || c == '/' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .collect();
    if !(3..=4).contains(&parts.len()) {
        return None;
    }
    let channel = |raw: &str| -> Option<f32> {
        let value = match raw.strip_suffix('%') {
            Some(pct) => pct.parse::<f32>().ok()? / 100.0,
            None => raw.parse::<f32>().ok()? / 255.0,
        };
        value.is_finite().then(|| value.clamp(0.0, 1.0))
    };
    let rgb = Srgb::new(channel(parts[0])?, channel(parts[1])?, channel(parts[2])?);
    Some(rgb.into_format())
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06x}", self.0)
    }
}

impl FromStr for Color {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Color {
    type Error = ColorParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_resolve_to_css_values() {
        assert_eq!(Color::parse("red").unwrap(), Color::RED);
        assert_eq!(Color::parse("Green").unwrap().hex(), 0x008000);
        assert_eq!(Color::parse(" yellow ").unwrap().hex(), 0xffff00);
    }

    #[test]
    fn full_css_keyword_set_is_known() {
        assert_eq!(Color::parse("orchid").unwrap().hex(), 0xda70d6);
        assert_eq!(Color::parse("darkorange").unwrap().hex(), 0xff8c00);
        assert_eq!(Color::parse("rebeccapurple").unwrap().hex(), 0x663399);
        assert_eq!(Color::parse("transparent").unwrap().hex(), 0x000000);
    }

    #[test]
    fn hex_forms_are_accepted() {
        assert_eq!(Color::parse("#00ff00").unwrap().hex(), 0x00ff00);
        assert_eq!(Color::parse("#0f0").unwrap().hex(), 0x00ff00);
        assert_eq!(Color::parse("0xFFFF00").unwrap().hex(), 0xffff00);
    }

    #[test]
    fn rgb_functions_are_accepted() {
        assert_eq!(Color::parse("rgb(255, 0, 0)").unwrap(), Color::RED);
        assert_eq!(Color::parse("rgb(0 128 0)").unwrap(), Color::GREEN);
        assert_eq!(Color::parse("rgba(0, 0, 255, 0.5)").unwrap().hex(), 0x0000ff);
        assert_eq!(Color::parse("rgb(100%, 0%, 0%)").unwrap(), Color::RED);
    }

    #[test]
    fn malformed_colours_are_rejected() {
        assert!(Color::parse("not-a-colour").is_err());
        assert!(Color::parse("#12345").is_err());
        assert!(Color::parse("#gg0000").is_err());
        assert!(Color::parse("rgb(1, 2)").is_err());
        assert!(Color::parse("bad").is_err());
        assert!(Color::parse("").is_err());
    }

    #[test]
    fn parse_error_maps_to_invalid_parameter() {
        let parse_err = Color::parse("mauve-ish").unwrap_err();
        assert_eq!(parse_err.to_string(), "unrecognised colour 'mauve-ish'");
        let err: crate::Error = parse_err.into();
        assert!(matches!(err, crate::Error::InvalidParameter(_)));
    }

    #[test]
    fn serde_uses_string_form() {
        let json = serde_json::to_string(&Color::RED).unwrap();
        assert_eq!(json, "\"#ff0000\"");
        let back: Color = serde_json::from_str("\"green\"").unwrap();
        assert_eq!(back, Color::GREEN);
    }

    #[test]
    fn rgb_components_are_normalised() {
        let [r, g, b] = Color::from_hex(0xff8000).to_rgb_f32();
        assert_eq!(r, 1.0);
        assert!((g - 128.0 / 255.0).abs() < 1e-6);
        assert_eq!(b, 0.0);
    }
}
