//! Tone remapping
//!
//! `darken` is used for backgrounds and borders, `lighten` for text. Both keep
//! the hue untouched and snap lightness into a handful of fixed bands instead of
//! inverting it linearly, so near-white and near-black sources converge on the
//! same readable range. Saturation is nudged to offset the lightness jump.

use super::codec::{hsl_to_rgb, ColorValue, Hsl, Rgb};
use std::fmt;

/// Replacement for pure black backgrounds
pub const NEAR_BLACK: Rgb = Rgb::new(0x1a, 0x1a, 0x1a);

/// Replacement for pure white backgrounds, and for anything unparsable
pub const DARK_GRAY: Rgb = Rgb::new(0x2a, 0x2a, 0x2a);

/// Replacement for pure black/white text, and for anything unparsable
pub const LIGHT_GRAY: Rgb = Rgb::new(0xe0, 0xe0, 0xe0);

/// Direction of a remap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tone {
    /// Push toward a dark band (backgrounds, borders)
    Darken,
    /// Push toward a light band (text)
    Lighten,
}

impl Tone {
    /// Pick the direction for a free-standing color such as a custom property:
    /// light values become backgrounds, dark values become text.
    pub fn for_lightness(lightness: f64) -> Self {
        if lightness > 50.0 {
            Tone::Darken
        } else {
            Tone::Lighten
        }
    }

    /// Remap an already-normalized value
    pub fn apply(self, value: ColorValue) -> Rgb {
        match self {
            Tone::Darken => darken_value(value),
            Tone::Lighten => lighten_value(value),
        }
    }

    /// Remap a color string in either recognized shape, returning `#rrggbb`
    pub fn apply_str(self, color: &str) -> String {
        self.apply(ColorValue::parse(color)).to_hex()
    }
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tone::Darken => f.write_str("darken"),
            Tone::Lighten => f.write_str("lighten"),
        }
    }
}

// =============================================================================
// Darken
// =============================================================================

/// Band mapping used by [`darken`], applied in HSL space
pub fn darken_hsl(hsl: Hsl) -> Hsl {
    let l = if hsl.l > 80.0 {
        15.0
    } else if hsl.l > 60.0 {
        25.0
    } else if hsl.l > 40.0 {
        35.0
    } else if hsl.l < 20.0 {
        15.0
    } else {
        hsl.l
    };

    Hsl::new(hsl.h, (hsl.s * 1.1).min(100.0), l)
}

pub fn darken_value(value: ColorValue) -> Rgb {
    match value.rgb() {
        Some(Rgb::BLACK) => NEAR_BLACK,
        Some(Rgb::WHITE) => DARK_GRAY,
        Some(rgb) => hsl_to_rgb(darken_hsl(rgb.to_hsl())),
        None => DARK_GRAY,
    }
}

/// Darken a hex or `rgb(...)` color string.
///
/// ```
/// assert_eq!(blab::color::darken("#ffffff"), "#2a2a2a");
/// assert_eq!(blab::color::darken("rgb(0, 0, 0)"), "#1a1a1a");
/// ```
pub fn darken(color: &str) -> String {
    Tone::Darken.apply_str(color)
}

// =============================================================================
// Lighten
// =============================================================================

/// Band mapping used by [`lighten`], applied in HSL space
pub fn lighten_hsl(hsl: Hsl) -> Hsl {
    let l = if hsl.l < 20.0 {
        85.0
    } else if hsl.l < 40.0 {
        75.0
    } else if hsl.l < 60.0 {
        65.0
    } else if hsl.l > 80.0 {
        85.0
    } else {
        hsl.l
    };

    Hsl::new(hsl.h, (hsl.s * 0.9).max(30.0), l)
}

pub fn lighten_value(value: ColorValue) -> Rgb {
    match value.rgb() {
        Some(Rgb::BLACK) | Some(Rgb::WHITE) | None => LIGHT_GRAY,
        Some(rgb) => hsl_to_rgb(lighten_hsl(rgb.to_hsl())),
    }
}

/// Lighten a hex or `rgb(...)` color string.
///
/// ```
/// assert_eq!(blab::color::lighten("#000000"), "#e0e0e0");
/// ```
pub fn lighten(color: &str) -> String {
    Tone::Lighten.apply_str(color)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::codec::{parse_hex, rgb_to_hsl};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn hue_distance(a: f64, b: f64) -> f64 {
        let d = (a - b).abs() % 360.0;
        d.min(360.0 - d)
    }

    fn decoded(hex: &str) -> Hsl {
        rgb_to_hsl(parse_hex(hex).expect("remap output is always #rrggbb"))
    }

    #[test]
    fn test_fixed_point_literals() {
        assert_eq!(darken("#000000"), "#1a1a1a");
        assert_eq!(darken("#ffffff"), "#2a2a2a");
        assert_eq!(lighten("#ffffff"), "#e0e0e0");
        assert_eq!(lighten("#000000"), "#e0e0e0");
    }

    #[test]
    fn test_functional_input_is_normalized_first() {
        assert_eq!(darken("rgb(255, 255, 255)"), "#2a2a2a");
        assert_eq!(lighten("rgb(0, 0, 0)"), "#e0e0e0");
        assert_eq!(darken("#FFFFFF"), "#2a2a2a");
    }

    #[test]
    fn test_unparsable_fallbacks() {
        assert_eq!(darken("notacolor"), "#2a2a2a");
        assert_eq!(lighten("notacolor"), "#e0e0e0");
        assert_eq!(darken("blue"), "#2a2a2a");
    }

    #[test]
    fn test_darken_very_light_goes_to_band_15() {
        let source = hsl_to_rgb(Hsl::new(210.0, 50.0, 90.0)).to_hex();
        let result = decoded(&darken(&source));
        assert!((result.l - 15.0).abs() < 0.5, "got lightness {}", result.l);
    }

    #[test]
    fn test_lighten_very_dark_goes_to_band_85() {
        let source = hsl_to_rgb(Hsl::new(30.0, 60.0, 10.0)).to_hex();
        let result = decoded(&lighten(&source));
        assert!((result.l - 85.0).abs() < 0.5, "got lightness {}", result.l);
    }

    #[test]
    fn test_darken_bands() {
        let band = |l: f64| darken_hsl(Hsl::new(120.0, 50.0, l)).l;
        assert_eq!(band(95.0), 15.0);
        assert_eq!(band(70.0), 25.0);
        assert_eq!(band(50.0), 35.0);
        assert_eq!(band(10.0), 15.0);
        // already dark enough
        assert_eq!(band(30.0), 30.0);
    }

    #[test]
    fn test_lighten_bands() {
        let band = |l: f64| lighten_hsl(Hsl::new(120.0, 50.0, l)).l;
        assert_eq!(band(10.0), 85.0);
        assert_eq!(band(30.0), 75.0);
        assert_eq!(band(50.0), 65.0);
        assert_eq!(band(90.0), 85.0);
        // already light enough
        assert_eq!(band(70.0), 70.0);
    }

    #[test]
    fn test_saturation_bounds() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..2000 {
            let hsl = Hsl::new(
                rng.gen_range(0.0..360.0),
                rng.gen_range(0.0..=100.0),
                rng.gen_range(0.0..=100.0),
            );
            assert!(darken_hsl(hsl).s <= 100.0);
            assert!(lighten_hsl(hsl).s >= 30.0);
        }
    }

    #[test]
    fn test_hue_preserved_exactly_in_hsl() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..2000 {
            let source = rgb_to_hsl(Rgb::new(rng.gen(), rng.gen(), rng.gen()));
            assert_eq!(darken_hsl(source).h, source.h);
            assert_eq!(lighten_hsl(source).h, source.h);
        }
    }

    #[test]
    fn test_hue_drift_bounded_by_channel_rounding() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..2000 {
            let rgb = Rgb::new(rng.gen(), rng.gen(), rng.gen());
            let source = rgb_to_hsl(rgb);
            for out in [
                darken_value(ColorValue::Hex(rgb)),
                lighten_value(ColorValue::Hex(rgb)),
            ] {
                let max = out.r.max(out.g).max(out.b) as f64;
                let min = out.r.min(out.g).min(out.b) as f64;
                let chroma = max - min;
                // grays carry no hue
                if chroma < 4.0 {
                    continue;
                }
                // each channel is off by at most half a step
                let bound = 120.0 / (chroma - 1.0);
                let drift = hue_distance(out.to_hsl().h, source.h);
                assert!(drift <= bound, "{} -> {}: drift {} > {}", rgb, out, drift, bound);
            }
        }
    }

    #[test]
    fn test_tone_for_lightness() {
        assert_eq!(Tone::for_lightness(50.1), Tone::Darken);
        assert_eq!(Tone::for_lightness(50.0), Tone::Lighten);
        assert_eq!(Tone::Darken.to_string(), "darken");
    }
}
