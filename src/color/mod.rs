//! Color module
//!
//! Pure color handling with no page access.
//!
//! # Submodules
//!
//! - `codec` - hex / `rgb(...)` / HSL conversions and the `ColorValue` normalization step
//! - `tone` - hue-preserving darken and lighten remaps

pub mod codec;
pub mod tone;

pub use codec::{hsl_to_rgb, parse_hex, parse_rgb_functional, rgb_to_hsl, ColorValue, Hsl, Rgb};
pub use tone::{darken, lighten, Tone};
