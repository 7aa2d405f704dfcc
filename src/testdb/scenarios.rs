//! Predefined page scenarios
//!
//! Ready-to-run pages covering the situations the engine has to handle:
//! plain documents, transparent layers, themes driven by custom properties,
//! content inserted after activation, and seeded random pages.

use crate::color::ColorValue;
use crate::page::{ColorProperty, NodeKind, NodeSnapshot, PageSnapshot};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// A page plus what activating dark mode on it should produce
#[derive(Debug, Clone)]
pub struct PageScenario {
    /// Scenario name for identification
    pub name: String,
    /// Description of what this scenario covers
    pub description: String,
    /// Page as loaded before activation
    pub snapshot: PageSnapshot,
    /// Subtrees appended after activation, each as its own mutation batch
    pub insertions: Vec<NodeSnapshot>,
    /// Tag of the element insertions are appended to (falls back to body)
    pub insert_under: String,
    /// Expected counters
    pub expected: ExpectedOutcome,
    /// Element colors to verify once everything ran
    pub color_checks: Vec<ColorCheck>,
    /// Root custom properties to verify once everything ran
    pub variable_checks: Vec<(String, String)>,
    /// Tags for filtering scenarios
    pub tags: Vec<String>,
}

/// Counters a scenario run should report
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpectedOutcome {
    /// Elements visited by the activation pass
    pub elements: usize,
    /// Overrides written by the activation pass
    pub overrides: usize,
    /// Custom properties rewritten at activation
    pub variables_rewritten: usize,
    /// Overrides written for inserted subtrees
    pub incremental_overrides: usize,
}

/// Forced value expected on the first element with `tag`.
///
/// `expected: None` means the property must be left alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorCheck {
    pub tag: String,
    pub property: ColorProperty,
    pub expected: Option<String>,
}

impl ColorCheck {
    pub fn forced(tag: &str, property: ColorProperty, value: &str) -> Self {
        Self {
            tag: tag.to_string(),
            property,
            expected: Some(value.to_string()),
        }
    }

    pub fn untouched(tag: &str, property: ColorProperty) -> Self {
        Self {
            tag: tag.to_string(),
            property,
            expected: None,
        }
    }
}

impl PageScenario {
    pub fn new(name: &str, description: &str, snapshot: PageSnapshot) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            snapshot,
            insertions: Vec::new(),
            insert_under: "body".to_string(),
            expected: ExpectedOutcome::default(),
            color_checks: Vec::new(),
            variable_checks: Vec::new(),
            tags: Vec::new(),
        }
    }

    pub fn with_expected(mut self, expected: ExpectedOutcome) -> Self {
        self.expected = expected;
        self
    }

    /// Insert `subtree` under the first `tag` element after activation
    pub fn with_insertion(mut self, tag: &str, subtree: NodeSnapshot) -> Self {
        self.insert_under = tag.to_string();
        self.insertions.push(subtree);
        self
    }

    pub fn with_check(mut self, check: ColorCheck) -> Self {
        self.color_checks.push(check);
        self
    }

    pub fn with_variable_check(mut self, name: &str, value: &str) -> Self {
        self.variable_checks
            .push((name.to_string(), value.to_string()));
        self
    }

    /// Add tags to the scenario
    pub fn with_tags(mut self, tags: Vec<&str>) -> Self {
        self.tags = tags.into_iter().map(String::from).collect();
        self
    }
}

/// Count properties in `snapshot` a full pass would override
pub fn colored_properties(snapshot: &NodeSnapshot) -> usize {
    let own = ColorProperty::ALL
        .iter()
        .filter_map(|&p| snapshot.resolved(p))
        .filter(|v| !ColorValue::parse(v).is_transparent())
        .count();
    own + snapshot
        .children
        .iter()
        .map(colored_properties)
        .sum::<usize>()
}

/// Collection of all predefined scenarios
pub struct ScenarioLibrary;

impl ScenarioLibrary {
    // =========================================================================
    // STATIC PAGES
    // =========================================================================

    /// Scenario: white page with black text and a few text elements
    pub fn plain_document() -> PageScenario {
        let body = NodeSnapshot::element("body")
            .background("rgb(255, 255, 255)")
            .color("rgb(0, 0, 0)")
            .child(NodeSnapshot::element("h1").color("rgb(17, 17, 17)"))
            .child(
                NodeSnapshot::element("p")
                    .color("rgb(51, 51, 51)")
                    .child(NodeSnapshot::text())
                    .child(NodeSnapshot::element("a").color("rgb(0, 0, 238)")),
            );

        PageScenario::new(
            "plain_document",
            "White page, black text, headings and links",
            PageSnapshot::with_body(body),
        )
        .with_expected(ExpectedOutcome {
            elements: 6,
            overrides: 5,
            ..Default::default()
        })
        .with_check(ColorCheck::forced("body", ColorProperty::Background, "#2a2a2a"))
        .with_check(ColorCheck::forced("body", ColorProperty::Foreground, "#e0e0e0"))
        .with_tags(vec!["static", "basic"])
    }

    /// Scenario: layered elements where only some colors are opaque
    pub fn transparent_layers() -> PageScenario {
        let body = NodeSnapshot::element("body")
            .background("rgb(255, 255, 255)")
            .child(
                NodeSnapshot::element("div")
                    .background("rgba(0, 0, 0, 0)")
                    .color("rgb(0, 0, 0)"),
            )
            .child(
                NodeSnapshot::element("span")
                    .background("transparent")
                    .color("rgb(34, 34, 34)"),
            )
            .child(NodeSnapshot::element("section").background("rgba(255, 255, 255, 0.8)"));

        PageScenario::new(
            "transparent_layers",
            "Transparent backgrounds are left for the parent to show through",
            PageSnapshot::with_body(body),
        )
        .with_expected(ExpectedOutcome {
            elements: 6,
            overrides: 4,
            ..Default::default()
        })
        .with_check(ColorCheck::untouched("div", ColorProperty::Background))
        .with_check(ColorCheck::forced("div", ColorProperty::Foreground, "#e0e0e0"))
        .with_check(ColorCheck::untouched("span", ColorProperty::Background))
        .with_check(ColorCheck::forced("section", ColorProperty::Background, "#2a2a2a"))
        .with_tags(vec!["static", "transparency"])
    }

    /// Scenario: palette held in custom properties on the root
    pub fn themed_variables() -> PageScenario {
        let snapshot = PageSnapshot::with_body(
            NodeSnapshot::element("body").background("rgb(250, 250, 250)"),
        )
        .property("--bg", "#ffffff")
        .property("--fg", "#000000")
        .property("--accent", "rgb(51, 102, 255)")
        .property("--radius", "4px")
        .property("--shadow", "rgba(0, 0, 0, 0.2)");

        PageScenario::new(
            "themed_variables",
            "Theme colors defined as --custom-properties on the root",
            snapshot,
        )
        .with_expected(ExpectedOutcome {
            elements: 3,
            overrides: 1,
            variables_rewritten: 3,
            ..Default::default()
        })
        .with_check(ColorCheck::forced("body", ColorProperty::Background, "#262626"))
        .with_variable_check("--bg", "#2a2a2a")
        .with_variable_check("--fg", "#e0e0e0")
        .with_variable_check("--radius", "4px")
        .with_variable_check("--shadow", "rgba(0, 0, 0, 0.2)")
        .with_tags(vec!["static", "variables"])
    }

    // =========================================================================
    // DYNAMIC PAGES
    // =========================================================================

    fn card() -> NodeSnapshot {
        NodeSnapshot::element("article")
            .background("rgb(250, 250, 250)")
            .color("rgb(20, 20, 20)")
            .border("rgb(220, 220, 220)")
            .child(NodeSnapshot::element("h2").color("rgb(0, 0, 0)"))
            .child(
                NodeSnapshot::element("p")
                    .color("rgb(85, 85, 85)")
                    .child(NodeSnapshot::text()),
            )
            .child(NodeSnapshot {
                kind: NodeKind::Comment,
                ..Default::default()
            })
    }

    /// Scenario: cards appended to a feed after activation
    pub fn nested_cards() -> PageScenario {
        let body = NodeSnapshot::element("body")
            .background("rgb(255, 255, 255)")
            .child(NodeSnapshot::element("main"));

        PageScenario::new(
            "nested_cards",
            "Cards inserted after activation are recolored without borders",
            PageSnapshot::with_body(body),
        )
        .with_insertion("main", Self::card())
        .with_insertion("main", Self::card())
        .with_expected(ExpectedOutcome {
            elements: 4,
            overrides: 1,
            variables_rewritten: 0,
            incremental_overrides: 8,
        })
        .with_check(ColorCheck::forced("article", ColorProperty::Background, "#262626"))
        .with_check(ColorCheck::untouched("article", ColorProperty::Border))
        .with_check(ColorCheck::forced("h2", ColorProperty::Foreground, "#e0e0e0"))
        .with_tags(vec!["dynamic", "mutation"])
    }

    /// Scenario: seeded random page with `count` colored elements
    pub fn random_page(seed: u64, count: usize) -> PageScenario {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut body = NodeSnapshot::element("body").background("rgb(255, 255, 255)");

        for _ in 0..count {
            let mut element = NodeSnapshot::element("div");
            element = if rng.gen_bool(0.2) {
                element.background("rgba(0, 0, 0, 0)")
            } else {
                element.background(&random_rgb(&mut rng))
            };
            element = element.color(&random_rgb(&mut rng));
            if rng.gen_bool(0.3) {
                element = element.border(&random_rgb(&mut rng));
            }
            body = body.child(element);
        }

        let snapshot = PageSnapshot::with_body(body);
        let expected = ExpectedOutcome {
            elements: snapshot.root.element_count(),
            overrides: colored_properties(&snapshot.root),
            ..Default::default()
        };

        PageScenario::new(
            "random_page",
            "Seeded page of randomly colored elements",
            snapshot,
        )
        .with_expected(expected)
        .with_tags(vec!["static", "stress"])
    }

    // =========================================================================
    // COLLECTIONS
    // =========================================================================

    /// Get all predefined scenarios
    pub fn all_scenarios() -> Vec<PageScenario> {
        vec![
            Self::plain_document(),
            Self::transparent_layers(),
            Self::themed_variables(),
            Self::nested_cards(),
            Self::random_page(42, 200),
        ]
    }

    /// Get scenarios by tag
    pub fn by_tag(tag: &str) -> Vec<PageScenario> {
        Self::all_scenarios()
            .into_iter()
            .filter(|s| s.tags.iter().any(|t| t == tag))
            .collect()
    }

    /// Find a scenario by name
    pub fn by_name(name: &str) -> Option<PageScenario> {
        Self::all_scenarios().into_iter().find(|s| s.name == name)
    }
}

fn random_rgb(rng: &mut StdRng) -> String {
    format!(
        "rgb({}, {}, {})",
        rng.gen::<u8>(),
        rng.gen::<u8>(),
        rng.gen::<u8>()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_names_are_unique() {
        let scenarios = ScenarioLibrary::all_scenarios();
        let names: HashSet<_> = scenarios.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names.len(), scenarios.len());
    }

    #[test]
    fn test_expected_elements_match_snapshots() {
        for scenario in ScenarioLibrary::all_scenarios() {
            assert_eq!(
                scenario.snapshot.root.element_count(),
                scenario.expected.elements,
                "{}",
                scenario.name
            );
        }
    }

    #[test]
    fn test_random_page_is_deterministic() {
        let a = ScenarioLibrary::random_page(7, 25);
        let b = ScenarioLibrary::random_page(7, 25);
        assert_eq!(a.snapshot, b.snapshot);
        assert_eq!(a.expected.elements, 28);

        let c = ScenarioLibrary::random_page(8, 25);
        assert_ne!(a.snapshot, c.snapshot);
    }

    #[test]
    fn test_colored_properties_skips_transparent() {
        let node = NodeSnapshot::element("div")
            .background("transparent")
            .color("#000000")
            .child(NodeSnapshot::element("span").border("rgba(1, 2, 3, 0)"));
        assert_eq!(colored_properties(&node), 1);
    }

    #[test]
    fn test_lookup() {
        assert!(ScenarioLibrary::by_name("nested_cards").is_some());
        assert!(ScenarioLibrary::by_name("missing").is_none());
        assert_eq!(ScenarioLibrary::by_tag("dynamic").len(), 1);
    }
}
