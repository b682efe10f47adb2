//! Color value parsing.
//!
//! Accepts hex (`#RGB`, `#RRGGBB`) and functional (`rgb()`, `rgba()`) notation
//! and normalizes both to an opaque [`Rgb`] triple. Alpha is folded away by
//! compositing against a solid backdrop.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

/// Matches `rgb(r,g,b)` and `rgba(r,g,b,a)` with optional whitespace.
/// Channels are ASCII digits only.
static RGB_FUNCTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^rgba?\(\s*([0-9]+)\s*,\s*([0-9]+)\s*,\s*([0-9]+)\s*(?:,\s*([0-9]*\.?[0-9]+)\s*)?\)$")
        .expect("valid rgb pattern")
});

/// Errors produced when a color string cannot be normalized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorParseError {
    /// The input was empty or whitespace.
    #[error("empty color string")]
    Empty,

    /// Hex digits did not resolve to exactly 3 or 6 characters.
    #[error("invalid hex length: {0} digits")]
    InvalidLength(usize),

    /// A character after `#` was not a hex digit.
    #[error("invalid hex digits in {0:?}")]
    InvalidHex(String),

    /// An `rgb`-prefixed value did not match `rgba?(n,n,n[,a])`.
    #[error("invalid rgb()/rgba() function: {0:?}")]
    InvalidFunction(String),

    /// A channel exceeded 255 or alpha left the 0–1 range.
    #[error("component out of range in {0:?}")]
    OutOfRange(String),

    /// Named colors, `transparent`, `hsl()` and anything else.
    #[error("unsupported color format: {0:?}")]
    Unsupported(String),
}

/// The solid surface a translucent color is assumed to sit on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Backdrop {
    /// Composite against white.
    #[default]
    Light,
    /// Composite against black.
    Dark,
}

impl Backdrop {
    /// Channel value of the backdrop surface.
    pub const fn channel(self) -> f64 {
        match self {
            Backdrop::Light => 255.0,
            Backdrop::Dark => 0.0,
        }
    }

    /// Pick the backdrop from a boolean "background is light" flag.
    pub const fn from_is_light(is_light: bool) -> Self {
        if is_light {
            Backdrop::Light
        } else {
            Backdrop::Dark
        }
    }
}

/// An opaque sRGB color with 8-bit channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rgb {
    /// Red channel
    pub r: u8,
    /// Green channel
    pub g: u8,
    /// Blue channel
    pub b: u8,
}

impl Rgb {
    /// Pure black.
    pub const BLACK: Self = Self { r: 0, g: 0, b: 0 };

    /// Pure white.
    pub const WHITE: Self = Self { r: 255, g: 255, b: 255 };

    /// Create a triple from its channels.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Lowercase `#rrggbb` form.
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Composite `self` at `alpha` over `backdrop`.
    ///
    /// `out = round(c * alpha + backdrop * (1 - alpha))` per channel.
    pub fn composite(self, alpha: f64, backdrop: Backdrop) -> Self {
        if alpha >= 1.0 {
            return self;
        }
        let under = backdrop.channel();
        let mix = |c: u8| (f64::from(c) * alpha + under * (1.0 - alpha)).round().clamp(0.0, 255.0) as u8;
        Self {
            r: mix(self.r),
            g: mix(self.g),
            b: mix(self.b),
        }
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({}, {}, {})", self.r, self.g, self.b)
    }
}

/// Parse a color value and flatten any alpha against `backdrop`.
///
/// # Examples
///
/// ```
/// use tokenscope_color::{parse_color, Backdrop, Rgb};
///
/// assert_eq!(parse_color("#fff", Backdrop::Light), Ok(Rgb::WHITE));
/// assert_eq!(parse_color("rgba(0,0,0,0.5)", Backdrop::Light), Ok(Rgb::new(128, 128, 128)));
/// ```
pub fn parse_color(color: &str, backdrop: Backdrop) -> Result<Rgb, ColorParseError> {
    let color = color.trim();
    if color.is_empty() {
        return Err(ColorParseError::Empty);
    }

    if let Some(digits) = color.strip_prefix('#') {
        parse_hex(digits)
    } else if color.starts_with("rgb") {
        let (rgb, alpha) = parse_rgb_function(color)?;
        Ok(rgb.composite(alpha, backdrop))
    } else {
        Err(ColorParseError::Unsupported(color.to_string()))
    }
}

/// Parse the digits following `#`.
fn parse_hex(digits: &str) -> Result<Rgb, ColorParseError> {
    let expanded: String = match digits.len() {
        3 => digits.chars().flat_map(|c| [c, c]).collect(),
        6 => digits.to_string(),
        n => return Err(ColorParseError::InvalidLength(n)),
    };

    if !expanded.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(ColorParseError::InvalidHex(digits.to_string()));
    }

    let channel = |i: usize| {
        u8::from_str_radix(&expanded[i..i + 2], 16)
            .map_err(|_| ColorParseError::InvalidHex(digits.to_string()))
    };

    Ok(Rgb::new(channel(0)?, channel(2)?, channel(4)?))
}

/// Parse `rgb(...)`/`rgba(...)` into the raw triple and its alpha.
fn parse_rgb_function(color: &str) -> Result<(Rgb, f64), ColorParseError> {
    let caps = RGB_FUNCTION
        .captures(color)
        .ok_or_else(|| ColorParseError::InvalidFunction(color.to_string()))?;

    let out_of_range = || ColorParseError::OutOfRange(color.to_string());
    let channel = |i: usize| -> Result<u8, ColorParseError> {
        caps[i].parse::<u8>().map_err(|_| out_of_range())
    };

    let rgb = Rgb::new(channel(1)?, channel(2)?, channel(3)?);

    let alpha = match caps.get(4) {
        Some(m) => m.as_str().parse::<f64>().map_err(|_| out_of_range())?,
        None => 1.0,
    };
    if !(0.0..=1.0).contains(&alpha) {
        return Err(out_of_range());
    }

    Ok((rgb, alpha))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shorthand_matches_full_hex() {
        let short = parse_color("#fff", Backdrop::Light).unwrap();
        let full = parse_color("#ffffff", Backdrop::Light).unwrap();
        assert_eq!(short, full);
        assert_eq!(short, Rgb::WHITE);

        assert_eq!(
            parse_color("#1a7", Backdrop::Light).unwrap(),
            parse_color("#11aa77", Backdrop::Light).unwrap()
        );
    }

    #[test]
    fn hex_is_case_insensitive() {
        assert_eq!(
            parse_color("#AbCdEf", Backdrop::Dark).unwrap(),
            Rgb::new(0xab, 0xcd, 0xef)
        );
    }

    #[test]
    fn hex_rejects_bad_lengths() {
        assert_eq!(parse_color("#ffff", Backdrop::Light), Err(ColorParseError::InvalidLength(4)));
        assert_eq!(parse_color("#", Backdrop::Light), Err(ColorParseError::InvalidLength(0)));
        assert_eq!(
            parse_color("#ffffffff", Backdrop::Light),
            Err(ColorParseError::InvalidLength(8))
        );
    }

    #[test]
    fn hex_rejects_non_hex_digits() {
        assert!(matches!(
            parse_color("#ggg", Backdrop::Light),
            Err(ColorParseError::InvalidHex(_))
        ));
        assert!(matches!(
            parse_color("#12345z", Backdrop::Light),
            Err(ColorParseError::InvalidHex(_))
        ));
    }

    #[test]
    fn half_black_over_white_rounds_up() {
        assert_eq!(
            parse_color("rgba(0,0,0,0.5)", Backdrop::Light).unwrap(),
            Rgb::new(128, 128, 128)
        );
    }

    #[test]
    fn half_white_over_black() {
        assert_eq!(
            parse_color("rgba(255, 255, 255, 0.5)", Backdrop::Dark).unwrap(),
            Rgb::new(128, 128, 128)
        );
    }

    #[test]
    fn opaque_rgb_ignores_backdrop() {
        let light = parse_color("rgb(12, 34, 56)", Backdrop::Light).unwrap();
        let dark = parse_color("rgb(12,34,56)", Backdrop::Dark).unwrap();
        assert_eq!(light, Rgb::new(12, 34, 56));
        assert_eq!(light, dark);
    }

    #[test]
    fn rgba_without_alpha_is_opaque() {
        assert_eq!(
            parse_color("rgba(10,20,30)", Backdrop::Dark).unwrap(),
            Rgb::new(10, 20, 30)
        );
    }

    #[test]
    fn fully_transparent_is_backdrop() {
        assert_eq!(parse_color("rgba(10,20,30,0)", Backdrop::Light).unwrap(), Rgb::WHITE);
        assert_eq!(parse_color("rgba(10,20,30,0)", Backdrop::Dark).unwrap(), Rgb::BLACK);
    }

    #[test]
    fn rgb_rejects_malformed_functions() {
        for bad in ["rgb(1,2)", "rgb(a,b,c)", "rgb 1 2 3", "rgba(1,2,3,)", "rgb(1,2,3"] {
            assert!(
                matches!(parse_color(bad, Backdrop::Light), Err(ColorParseError::InvalidFunction(_))),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn rgb_pattern_compiles() {
        assert!(RGB_FUNCTION.is_match("rgb(0, 0, 0)"));
        assert!(RGB_FUNCTION.is_match("rgba(0,0,0,.5)"));
    }

    #[test]
    fn rgb_rejects_non_ascii_digits() {
        for bad in ["rgb(\u{663},0,0)", "rgb(0,\u{ff11},0)", "rgba(0,0,\u{966},1)"] {
            assert!(
                matches!(parse_color(bad, Backdrop::Light), Err(ColorParseError::InvalidFunction(_))),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn rgb_rejects_out_of_range_components() {
        assert!(matches!(
            parse_color("rgb(256,0,0)", Backdrop::Light),
            Err(ColorParseError::OutOfRange(_))
        ));
        assert!(matches!(
            parse_color("rgba(0,0,0,1.5)", Backdrop::Light),
            Err(ColorParseError::OutOfRange(_))
        ));
    }

    #[test]
    fn unsupported_formats_fail() {
        for value in ["red", "transparent", "hsl(0, 100%, 50%)", "currentColor"] {
            assert!(matches!(
                parse_color(value, Backdrop::Light),
                Err(ColorParseError::Unsupported(_))
            ));
        }
        assert_eq!(parse_color("   ", Backdrop::Light), Err(ColorParseError::Empty));
    }

    #[test]
    fn to_hex_is_lowercase_six_digit() {
        assert_eq!(Rgb::new(0x0a, 0xbc, 0xff).to_hex(), "#0abcff");
        assert_eq!(Rgb::new(1, 2, 3).to_string(), "rgb(1, 2, 3)");
    }
}
