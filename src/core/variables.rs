//! Custom property rewriting
//!
//! Pages that theme through `--custom-properties` on the document element keep
//! their palette there rather than on individual elements. Each color-shaped
//! value is remapped in place: light values are assumed to be backgrounds and
//! darkened, dark values are assumed to be text and lightened.
//!
//! Only `#rrggbb` and `rgb(r, g, b)` values are recognized. Anything else
//! (including `rgba(...)`, keywords and `var()` references) is left untouched.
//! The rewrite runs once per activation; properties the page introduces later
//! are not revisited.

use crate::color::{parse_hex, parse_rgb_functional, ColorValue, Tone};
use crate::page::StyleOracle;
use log::{debug, trace, warn};
use serde::Serialize;

/// Prefix that marks a custom property
pub const CUSTOM_PROPERTY_PREFIX: &str = "--";

/// Outcome of one rewrite pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct VariableStats {
    /// Custom properties seen on the root
    pub examined: usize,
    /// Properties remapped toward a dark band
    pub darkened: usize,
    /// Properties remapped toward a light band
    pub lightened: usize,
    /// Writes the host rejected
    pub write_failures: usize,
}

impl VariableStats {
    pub fn rewritten(&self) -> usize {
        self.darkened + self.lightened
    }
}

/// Recognize a color-shaped custom property value
fn color_shaped(value: &str) -> Option<ColorValue> {
    let value = value.trim();
    parse_hex(value)
        .map(ColorValue::Hex)
        .or_else(|| parse_rgb_functional(value).map(ColorValue::FunctionalRgb))
}

/// Rewrite every color-shaped custom property on the document root
pub fn rewrite_document_variables<P>(page: &mut P) -> VariableStats
where
    P: StyleOracle + ?Sized,
{
    let mut stats = VariableStats::default();

    for (name, value) in page.root_properties() {
        if !name.starts_with(CUSTOM_PROPERTY_PREFIX) {
            continue;
        }
        stats.examined += 1;

        let Some(color) = color_shaped(&value) else {
            continue;
        };
        let Some(rgb) = color.rgb() else {
            continue;
        };

        let tone = Tone::for_lightness(rgb.to_hsl().l);
        let replacement = tone.apply(color).to_hex();

        match page.set_root_property(&name, &replacement) {
            Ok(()) => {
                trace!("{}: {} -> {} ({})", name, value.trim(), replacement, tone);
                match tone {
                    Tone::Darken => stats.darkened += 1,
                    Tone::Lighten => stats.lightened += 1,
                }
            }
            Err(e) => {
                warn!("Could not rewrite {}: {}", name, e);
                stats.write_failures += 1;
            }
        }
    }

    debug!(
        "Custom properties: {} examined, {} rewritten",
        stats.examined,
        stats.rewritten()
    );
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::PageSnapshot;
    use crate::testdb::MockPage;

    fn page_with_properties(props: &[(&str, &str)]) -> MockPage {
        let snapshot = props
            .iter()
            .fold(PageSnapshot::default(), |s, (k, v)| s.property(k, v));
        MockPage::from_snapshot(&snapshot)
    }

    #[test]
    fn test_light_variable_is_darkened() {
        let mut page = page_with_properties(&[("--page-bg", "#ffffff")]);
        let stats = rewrite_document_variables(&mut page);

        assert_eq!(page.root_property("--page-bg"), Some("#2a2a2a"));
        assert_eq!(stats.darkened, 1);
    }

    #[test]
    fn test_dark_variable_is_lightened() {
        let mut page = page_with_properties(&[("--text", "rgb(0, 0, 0)")]);
        let stats = rewrite_document_variables(&mut page);

        assert_eq!(page.root_property("--text"), Some("#e0e0e0"));
        assert_eq!(stats.lightened, 1);
    }

    #[test]
    fn test_value_whitespace_is_trimmed() {
        let mut page = page_with_properties(&[("--accent", "  #FFFFFF ")]);
        rewrite_document_variables(&mut page);
        assert_eq!(page.root_property("--accent"), Some("#2a2a2a"));
    }

    #[test]
    fn test_non_color_values_untouched() {
        let mut page = page_with_properties(&[
            ("--radius", "4px"),
            ("--font", "\"Inter\", sans-serif"),
            ("--overlay", "rgba(0, 0, 0, 0.5)"),
            ("--link", "var(--accent)"),
        ]);
        let stats = rewrite_document_variables(&mut page);

        assert_eq!(stats.examined, 4);
        assert_eq!(stats.rewritten(), 0);
        assert_eq!(page.root_property("--radius"), Some("4px"));
        assert_eq!(page.root_property("--overlay"), Some("rgba(0, 0, 0, 0.5)"));
    }

    #[test]
    fn test_standard_properties_are_ignored() {
        let mut page = page_with_properties(&[("color", "#000000"), ("--fg", "#000000")]);
        let stats = rewrite_document_variables(&mut page);

        assert_eq!(stats.examined, 1);
        assert_eq!(page.root_property("color"), Some("#000000"));
        assert_eq!(page.root_property("--fg"), Some("#e0e0e0"));
    }

    #[test]
    fn test_lightness_fifty_splits_direction() {
        // #808080 has lightness just above 50 and is darkened; #7f7f7f is just below
        let mut page = page_with_properties(&[("--a", "#808080"), ("--b", "#7f7f7f")]);
        let stats = rewrite_document_variables(&mut page);

        assert_eq!(stats.darkened, 1);
        assert_eq!(stats.lightened, 1);
    }
}
