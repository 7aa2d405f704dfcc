//! Color codec
//!
//! Conversions between the three shapes a resolved color passes through:
//! - `#rrggbb` hexadecimal triplets (case-insensitive in, lowercase out)
//! - `rgb(r, g, b)` functional notation as reported by the style oracle
//! - hue/saturation/lightness triples used by the tone remapper
//!
//! Nothing in here fails. Input that is not one of the recognized shapes comes
//! back as `None` (or [`ColorValue::Unrecognized`]) and callers pick a fallback.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

static HEX_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#[0-9a-fA-F]{6}$").expect("hex pattern is valid"));

static RGB_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^rgb\(\s*(\d+)\s*,\s*(\d+)\s*,\s*(\d+)\s*\)$").expect("rgb pattern is valid")
});

static RGBA_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^rgba\(\s*(\d+)\s*,\s*(\d+)\s*,\s*(\d+)\s*,\s*(\d*\.?\d+)\s*\)$")
        .expect("rgba pattern is valid")
});

// =============================================================================
// Rgb / Hsl
// =============================================================================

/// A 24-bit sRGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Render as a lowercase `#rrggbb` string
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Render in the `rgb(r, g, b)` form browsers report for resolved colors
    pub fn to_css_rgb(self) -> String {
        format!("rgb({}, {}, {})", self.r, self.g, self.b)
    }

    pub fn to_hsl(self) -> Hsl {
        rgb_to_hsl(self)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Hue in degrees `[0, 360)`, saturation and lightness in percent `[0, 100]`
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Hsl {
    pub h: f64,
    pub s: f64,
    pub l: f64,
}

impl Hsl {
    pub fn new(h: f64, s: f64, l: f64) -> Self {
        Self { h, s, l }
    }

    pub fn to_rgb(self) -> Rgb {
        hsl_to_rgb(self)
    }
}

impl fmt::Display for Hsl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "hsl({:.1}, {:.1}%, {:.1}%)", self.h, self.s, self.l)
    }
}

// =============================================================================
// Parsing
// =============================================================================

/// Parse a strict `#rrggbb` string.
///
/// Shorthand (`#rgb`), alpha (`#rrggbbaa`) and surrounding whitespace are all
/// rejected; a `None` means "not a recognizable color", not a failure.
pub fn parse_hex(input: &str) -> Option<Rgb> {
    if !HEX_PATTERN.is_match(input) {
        return None;
    }

    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&input[range], 16).ok();
    Some(Rgb::new(channel(1..3)?, channel(3..5)?, channel(5..7)?))
}

/// Parse `rgb(<int>, <int>, <int>)`.
///
/// Channels above 255 make the whole value unrecognized.
pub fn parse_rgb_functional(input: &str) -> Option<Rgb> {
    let caps = RGB_PATTERN.captures(input)?;
    let channel = |i: usize| caps.get(i)?.as_str().parse::<u8>().ok();
    Some(Rgb::new(channel(1)?, channel(2)?, channel(3)?))
}

/// Parse `rgba(<int>, <int>, <int>, <alpha>)` into the color and its alpha in `[0, 1]`.
fn parse_rgba_functional(input: &str) -> Option<(Rgb, f64)> {
    let caps = RGBA_PATTERN.captures(input)?;
    let channel = |i: usize| caps.get(i)?.as_str().parse::<u8>().ok();
    let alpha = caps.get(4)?.as_str().parse::<f64>().ok()?;
    Some((
        Rgb::new(channel(1)?, channel(2)?, channel(3)?),
        alpha.clamp(0.0, 1.0),
    ))
}

// =============================================================================
// HSL conversion
// =============================================================================

/// Decompose into hue/saturation/lightness.
///
/// Achromatic inputs (all channels equal) get hue and saturation 0.
pub fn rgb_to_hsl(rgb: Rgb) -> Hsl {
    let r = rgb.r as f64 / 255.0;
    let g = rgb.g as f64 / 255.0;
    let b = rgb.b as f64 / 255.0;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let l = (max + min) / 2.0;

    if max == min {
        return Hsl::new(0.0, 0.0, l * 100.0);
    }

    let d = max - min;
    let s = if l > 0.5 {
        d / (2.0 - max - min)
    } else {
        d / (max + min)
    };

    let h = if max == r {
        (g - b) / d + if g < b { 6.0 } else { 0.0 }
    } else if max == g {
        (b - r) / d + 2.0
    } else {
        (r - g) / d + 4.0
    };

    Hsl::new((h * 60.0) % 360.0, s * 100.0, l * 100.0)
}

fn hue_to_channel(p: f64, q: f64, mut t: f64) -> f64 {
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }

    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 1.0 / 2.0 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

/// Recompose an sRGB color, rounding each channel to the nearest integer.
///
/// Hue wraps, so `720` and `-360` both mean red.
pub fn hsl_to_rgb(hsl: Hsl) -> Rgb {
    let h = hsl.h.rem_euclid(360.0) / 360.0;
    let s = (hsl.s / 100.0).clamp(0.0, 1.0);
    let l = (hsl.l / 100.0).clamp(0.0, 1.0);

    let (r, g, b) = if s == 0.0 {
        (l, l, l)
    } else {
        let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
        let p = 2.0 * l - q;
        (
            hue_to_channel(p, q, h + 1.0 / 3.0),
            hue_to_channel(p, q, h),
            hue_to_channel(p, q, h - 1.0 / 3.0),
        )
    };

    let to_u8 = |c: f64| (c * 255.0).round().clamp(0.0, 255.0) as u8;
    Rgb::new(to_u8(r), to_u8(g), to_u8(b))
}

// =============================================================================
// ColorValue
// =============================================================================

/// A resolved color string after normalization.
///
/// Every downstream consumer matches on this instead of sniffing string shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorValue {
    /// `#rrggbb`
    Hex(Rgb),
    /// `rgb(r, g, b)`, or `rgba(r, g, b, a)` with non-zero alpha
    FunctionalRgb(Rgb),
    /// `transparent`, a zero-alpha `rgba(...)`, or an empty value
    Transparent,
    /// Anything else: named colors, `hsl(...)`, modern space-separated syntax
    Unrecognized,
}

impl ColorValue {
    pub fn parse(input: &str) -> Self {
        let value = input.trim();

        if value.is_empty() || value.eq_ignore_ascii_case("transparent") {
            return ColorValue::Transparent;
        }
        if let Some(rgb) = parse_hex(value) {
            return ColorValue::Hex(rgb);
        }

        let lower = value.to_ascii_lowercase();
        if let Some(rgb) = parse_rgb_functional(&lower) {
            return ColorValue::FunctionalRgb(rgb);
        }
        match parse_rgba_functional(&lower) {
            Some((_, alpha)) if alpha == 0.0 => ColorValue::Transparent,
            Some((rgb, _)) => ColorValue::FunctionalRgb(rgb),
            None => ColorValue::Unrecognized,
        }
    }

    /// The decoded color, if there is one
    pub fn rgb(&self) -> Option<Rgb> {
        match self {
            ColorValue::Hex(rgb) | ColorValue::FunctionalRgb(rgb) => Some(*rgb),
            ColorValue::Transparent | ColorValue::Unrecognized => None,
        }
    }

    pub fn is_transparent(&self) -> bool {
        matches!(self, ColorValue::Transparent)
    }

    /// Canonical `#rrggbb` form, if the value decodes
    pub fn to_hex(&self) -> Option<String> {
        self.rgb().map(Rgb::to_hex)
    }
}

impl From<&str> for ColorValue {
    fn from(value: &str) -> Self {
        ColorValue::parse(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: u8, b: u8) -> bool {
        (a as i16 - b as i16).abs() <= 1
    }

    #[test]
    fn test_parse_hex_accepts_mixed_case() {
        assert_eq!(parse_hex("#FFaa00"), Some(Rgb::new(255, 170, 0)));
        assert_eq!(parse_hex("#0a0B0c"), Some(Rgb::new(10, 11, 12)));
    }

    #[test]
    fn test_parse_hex_rejects_other_shapes() {
        assert_eq!(parse_hex("notacolor"), None);
        assert_eq!(parse_hex("#fff"), None);
        assert_eq!(parse_hex("#ffffff00"), None);
        assert_eq!(parse_hex("ffffff"), None);
        assert_eq!(parse_hex(" #ffffff"), None);
        assert_eq!(parse_hex("#gggggg"), None);
    }

    #[test]
    fn test_parse_rgb_functional() {
        assert_eq!(
            parse_rgb_functional("rgb(255, 255, 255)"),
            Some(Rgb::WHITE)
        );
        assert_eq!(parse_rgb_functional("rgb(1,2,3)"), Some(Rgb::new(1, 2, 3)));
        assert_eq!(parse_rgb_functional("blue"), None);
        assert_eq!(parse_rgb_functional("rgb(256, 0, 0)"), None);
        assert_eq!(parse_rgb_functional("rgb(1, 2)"), None);
        assert_eq!(parse_rgb_functional("rgba(1, 2, 3, 0.5)"), None);
    }

    #[test]
    fn test_to_hex_is_lowercase_and_padded() {
        assert_eq!(Rgb::new(10, 171, 0).to_hex(), "#0aab00");
        assert_eq!(Rgb::new(1, 2, 3).to_css_rgb(), "rgb(1, 2, 3)");
    }

    #[test]
    fn test_rgb_to_hsl_known_values() {
        let red = rgb_to_hsl(Rgb::new(255, 0, 0));
        assert_eq!((red.h, red.s, red.l), (0.0, 100.0, 50.0));

        let blue = rgb_to_hsl(Rgb::new(0, 0, 255));
        assert!((blue.h - 240.0).abs() < 1e-9);

        let magenta_ish = rgb_to_hsl(Rgb::new(255, 0, 128));
        assert!(magenta_ish.h > 300.0 && magenta_ish.h < 360.0);
    }

    #[test]
    fn test_rgb_to_hsl_achromatic() {
        let gray = rgb_to_hsl(Rgb::new(128, 128, 128));
        assert_eq!(gray.h, 0.0);
        assert_eq!(gray.s, 0.0);
        assert!((gray.l - 50.196).abs() < 0.01);
    }

    #[test]
    fn test_hsl_to_rgb_zero_saturation() {
        assert_eq!(hsl_to_rgb(Hsl::new(200.0, 0.0, 100.0)), Rgb::WHITE);
        assert_eq!(hsl_to_rgb(Hsl::new(0.0, 0.0, 0.0)), Rgb::BLACK);
    }

    #[test]
    fn test_hsl_to_rgb_wraps_hue() {
        let green = hsl_to_rgb(Hsl::new(120.0, 100.0, 50.0));
        assert_eq!(green, Rgb::new(0, 255, 0));
        assert_eq!(hsl_to_rgb(Hsl::new(840.0, 100.0, 50.0)), green);
        assert_eq!(hsl_to_rgb(Hsl::new(-240.0, 100.0, 50.0)), green);
        assert_eq!(hsl_to_rgb(Hsl::new(720.0, 100.0, 50.0)), Rgb::new(255, 0, 0));
    }

    #[test]
    fn test_round_trip_strided_grid() {
        for r in (0..=255u16).step_by(5) {
            for g in (0..=255u16).step_by(5) {
                for b in (0..=255u16).step_by(5) {
                    let original = Rgb::new(r as u8, g as u8, b as u8);
                    let back = hsl_to_rgb(rgb_to_hsl(original));
                    assert!(
                        close(original.r, back.r)
                            && close(original.g, back.g)
                            && close(original.b, back.b),
                        "{} came back as {}",
                        original,
                        back
                    );
                }
            }
        }
    }

    #[test]
    fn test_color_value_variants() {
        assert_eq!(
            ColorValue::parse("#FFFFFF"),
            ColorValue::Hex(Rgb::WHITE)
        );
        assert_eq!(
            ColorValue::parse("rgb(0, 0, 0)"),
            ColorValue::FunctionalRgb(Rgb::BLACK)
        );
        assert_eq!(ColorValue::parse("transparent"), ColorValue::Transparent);
        assert_eq!(ColorValue::parse("rgba(0, 0, 0, 0)"), ColorValue::Transparent);
        assert_eq!(ColorValue::parse(""), ColorValue::Transparent);
        assert_eq!(ColorValue::parse("red"), ColorValue::Unrecognized);
        assert_eq!(ColorValue::parse("hsl(0, 0%, 0%)"), ColorValue::Unrecognized);
    }

    #[test]
    fn test_color_value_translucent_rgba_keeps_channels() {
        assert_eq!(
            ColorValue::parse("rgba(10, 20, 30, 0.5)"),
            ColorValue::FunctionalRgb(Rgb::new(10, 20, 30))
        );
        assert_eq!(
            ColorValue::parse("rgba(10, 20, 30, 0.0)"),
            ColorValue::Transparent
        );
    }
}
