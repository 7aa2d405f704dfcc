//! Snapshot scanner
//!
//! Reads each element's resolved background, text and border colors and writes
//! remapped replacements back as forced overrides. Transparent or missing colors
//! are left alone, so an element may end up with only some properties changed.
//!
//! Two flavors exist:
//! - the full pass run at activation touches all three properties
//! - the incremental pass run for inserted nodes skips borders unless configured

use crate::color::ColorValue;
use crate::core::tracking::ProcessedNodes;
use crate::page::{ColorProperty, DocumentTree, NodeId, StyleOracle};
use log::{debug, trace, warn};
use serde::Serialize;
use std::ops::AddAssign;

/// Counters for one or more scan passes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScanStats {
    /// Elements whose styles were read
    pub elements_visited: usize,
    /// Elements skipped because the session already recolored them
    pub elements_skipped: usize,
    /// Forced declarations written
    pub overrides_written: usize,
    /// Properties left alone because they were transparent or absent
    pub properties_skipped: usize,
    /// Writes the host rejected
    pub write_failures: usize,
}

impl AddAssign for ScanStats {
    fn add_assign(&mut self, other: Self) {
        self.elements_visited += other.elements_visited;
        self.elements_skipped += other.elements_skipped;
        self.overrides_written += other.overrides_written;
        self.properties_skipped += other.properties_skipped;
        self.write_failures += other.write_failures;
    }
}

/// Which properties a pass rewrites
#[derive(Debug, Clone)]
pub struct Scanner {
    properties: Vec<ColorProperty>,
}

impl Scanner {
    /// Background, text and border
    pub fn full() -> Self {
        Self {
            properties: ColorProperty::ALL.to_vec(),
        }
    }

    /// Background and text, plus border when `borders` is set
    pub fn incremental(borders: bool) -> Self {
        let mut properties = vec![ColorProperty::Background, ColorProperty::Foreground];
        if borders {
            properties.push(ColorProperty::Border);
        }
        Self { properties }
    }

    pub fn properties(&self) -> &[ColorProperty] {
        &self.properties
    }

    /// Recolor every element in the document
    pub fn scan_document<P>(&self, page: &mut P, processed: &mut ProcessedNodes) -> ScanStats
    where
        P: DocumentTree + StyleOracle + ?Sized,
    {
        let elements = page.all_elements();
        let stats = self.process_elements(page, &elements, processed);
        debug!(
            "Document pass: {} elements, {} overrides",
            stats.elements_visited, stats.overrides_written
        );
        stats
    }

    /// Recolor each root and all elements below it
    pub fn process_subtree<P>(
        &self,
        page: &mut P,
        roots: &[NodeId],
        processed: &mut ProcessedNodes,
    ) -> ScanStats
    where
        P: DocumentTree + StyleOracle + ?Sized,
    {
        let mut stats = ScanStats::default();
        for &root in roots {
            let elements = page.subtree_elements(root);
            stats += self.process_elements(page, &elements, processed);
        }
        stats
    }

    fn process_elements<P>(
        &self,
        page: &mut P,
        elements: &[NodeId],
        processed: &mut ProcessedNodes,
    ) -> ScanStats
    where
        P: DocumentTree + StyleOracle + ?Sized,
    {
        let mut stats = ScanStats::default();
        for &node in elements {
            if !processed.should_process(node) {
                stats.elements_skipped += 1;
                continue;
            }
            stats.elements_visited += 1;
            for &property in &self.properties {
                self.process_property(page, node, property, &mut stats);
            }
            processed.mark(node);
        }
        stats
    }

    fn process_property<P>(
        &self,
        page: &mut P,
        node: NodeId,
        property: ColorProperty,
        stats: &mut ScanStats,
    ) where
        P: StyleOracle + ?Sized,
    {
        let value = match page.resolved_color(node, property) {
            Some(raw) => ColorValue::parse(&raw),
            None => ColorValue::Transparent,
        };
        if value.is_transparent() {
            stats.properties_skipped += 1;
            return;
        }

        let replacement = property.tone().apply(value).to_hex();
        match page.force_property(node, property, &replacement) {
            Ok(()) => {
                trace!("{} {}: {}", node, property, replacement);
                stats.overrides_written += 1;
            }
            Err(e) => {
                warn!("Could not override {} on {}: {}", property, node, e);
                stats.write_failures += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::{NodeSnapshot, PageSnapshot};
    use crate::testdb::MockPage;

    fn page_with(body: NodeSnapshot) -> MockPage {
        MockPage::from_snapshot(&PageSnapshot::with_body(body))
    }

    #[test]
    fn test_white_background_black_text() {
        let mut page = page_with(
            NodeSnapshot::element("body").child(
                NodeSnapshot::element("div")
                    .background("rgb(255, 255, 255)")
                    .color("rgb(0, 0, 0)"),
            ),
        );
        let div = page.first_by_tag("div").unwrap();

        Scanner::full().scan_document(&mut page, &mut ProcessedNodes::disabled());

        assert_eq!(page.override_of(div, ColorProperty::Background), Some("#2a2a2a"));
        assert_eq!(page.override_of(div, ColorProperty::Foreground), Some("#e0e0e0"));
    }

    #[test]
    fn test_transparent_background_is_not_overridden() {
        let mut page = page_with(
            NodeSnapshot::element("body").child(
                NodeSnapshot::element("div")
                    .background("rgba(0, 0, 0, 0)")
                    .color("rgb(0, 0, 0)")
                    .border("rgb(200, 200, 200)"),
            ),
        );
        let div = page.first_by_tag("div").unwrap();

        Scanner::full().scan_document(&mut page, &mut ProcessedNodes::disabled());

        assert_eq!(page.override_of(div, ColorProperty::Background), None);
        assert!(page.override_of(div, ColorProperty::Foreground).is_some());
        assert!(page.override_of(div, ColorProperty::Border).is_some());
    }

    #[test]
    fn test_transparent_keyword_skips_every_property() {
        let mut page = page_with(
            NodeSnapshot::element("body").child(
                NodeSnapshot::element("span")
                    .background("transparent")
                    .color("transparent")
                    .border("rgba(0, 0, 0, 0)"),
            ),
        );
        let span = page.first_by_tag("span").unwrap();

        let stats = Scanner::full().scan_document(&mut page, &mut ProcessedNodes::disabled());

        assert!(page.writes().iter().all(|w| w.node != span));
        assert!(stats.properties_skipped >= 3);
    }

    #[test]
    fn test_unrecognized_color_gets_fallback() {
        let mut page = page_with(
            NodeSnapshot::element("body").child(
                NodeSnapshot::element("div")
                    .background("color(display-p3 1 1 1)")
                    .color("hsl(0, 0%, 0%)"),
            ),
        );
        let div = page.first_by_tag("div").unwrap();

        Scanner::full().scan_document(&mut page, &mut ProcessedNodes::disabled());

        assert_eq!(page.override_of(div, ColorProperty::Background), Some("#2a2a2a"));
        assert_eq!(page.override_of(div, ColorProperty::Foreground), Some("#e0e0e0"));
    }

    #[test]
    fn test_incremental_scanner_leaves_borders() {
        let mut page = page_with(
            NodeSnapshot::element("body").child(
                NodeSnapshot::element("div")
                    .background("#ffffff")
                    .border("#cccccc"),
            ),
        );
        let body = page.body().unwrap();
        let div = page.first_by_tag("div").unwrap();

        Scanner::incremental(false).process_subtree(
            &mut page,
            &[body],
            &mut ProcessedNodes::disabled(),
        );

        assert!(page.override_of(div, ColorProperty::Background).is_some());
        assert_eq!(page.override_of(div, ColorProperty::Border), None);
    }

    #[test]
    fn test_incremental_scanner_with_borders() {
        let mut page = page_with(
            NodeSnapshot::element("body").child(NodeSnapshot::element("div").border("#cccccc")),
        );
        let div = page.first_by_tag("div").unwrap();

        Scanner::incremental(true).process_subtree(
            &mut page,
            &[div],
            &mut ProcessedNodes::disabled(),
        );

        assert!(page.override_of(div, ColorProperty::Border).is_some());
    }

    #[test]
    fn test_second_pass_without_tracking_remaps_again() {
        let mut page = page_with(
            NodeSnapshot::element("body").child(NodeSnapshot::element("div").background("#f0f0f5")),
        );
        let div = page.first_by_tag("div").unwrap();
        let mut processed = ProcessedNodes::disabled();

        Scanner::full().scan_document(&mut page, &mut processed);
        let first = page
            .override_of(div, ColorProperty::Background)
            .unwrap()
            .to_string();
        Scanner::full().scan_document(&mut page, &mut processed);
        let second = page
            .override_of(div, ColorProperty::Background)
            .unwrap()
            .to_string();

        // l=15 falls in the "<20" band again, but saturation keeps growing
        assert_ne!(first, second);
    }

    #[test]
    fn test_second_pass_with_tracking_is_stable() {
        let mut page = page_with(
            NodeSnapshot::element("body").child(NodeSnapshot::element("div").background("#e8f0ff")),
        );
        let div = page.first_by_tag("div").unwrap();
        let mut processed = ProcessedNodes::new(true);

        Scanner::full().scan_document(&mut page, &mut processed);
        let first = page
            .override_of(div, ColorProperty::Background)
            .map(str::to_string);
        let stats = Scanner::full().scan_document(&mut page, &mut processed);

        assert_eq!(stats.overrides_written, 0);
        assert_eq!(stats.elements_skipped, page.all_elements().len());
        assert_eq!(
            page.override_of(div, ColorProperty::Background).map(str::to_string),
            first
        );
    }

    #[test]
    fn test_write_failure_does_not_abort_pass() {
        let mut page = page_with(
            NodeSnapshot::element("body")
                .child(NodeSnapshot::element("div").background("#ffffff"))
                .child(NodeSnapshot::element("p").background("#ffffff")),
        );
        let div = page.first_by_tag("div").unwrap();
        let p = page.first_by_tag("p").unwrap();
        page.fail_writes_on(div);

        let stats = Scanner::full().scan_document(&mut page, &mut ProcessedNodes::disabled());

        assert_eq!(stats.write_failures, 1);
        assert_eq!(page.override_of(p, ColorProperty::Background), Some("#2a2a2a"));
    }
}
