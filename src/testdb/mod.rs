//! Test Database Module
//!
//! Lets the whole engine run without a browser: an in-memory page that
//! implements the host traits, ready-made page scenarios, and a runner that
//! replays them through a real session.
//!
//! # Features
//!
//! - **Mock Page**: element tree with resolved colors, forced overrides, style
//!   blocks and child-list observers
//! - **Scenarios**: pre-built pages with the counters and colors activation should produce
//! - **Runner**: executes scenarios and summarizes the results
//!
//! # Quick Start
//!
//! ```rust
//! use blab::testdb::{ScenarioLibrary, ScenarioRunner};
//!
//! let summary = ScenarioRunner::default().run_all();
//! assert_eq!(summary.failed, 0);
//!
//! let result = ScenarioRunner::default().run(&ScenarioLibrary::nested_cards());
//! assert!(result.passed);
//! ```
//!
//! # Available Scenarios
//!
//! - `plain_document` - White page with black text
//! - `transparent_layers` - Transparent and semi-transparent backgrounds
//! - `themed_variables` - Palette in `--custom-properties` on the root
//! - `nested_cards` - Cards inserted after activation
//! - `random_page` - Seeded page of randomly colored elements

pub mod mock_page;
pub mod runner;
pub mod scenarios;

// Re-export commonly used types for convenience
pub use mock_page::MockPage;
pub use runner::{RunSummary, ScenarioResult, ScenarioRunner};
pub use scenarios::{ColorCheck, ExpectedOutcome, PageScenario, ScenarioLibrary};

/// Get a list of all available scenario names
pub fn list_scenario_names() -> Vec<String> {
    ScenarioLibrary::all_scenarios()
        .into_iter()
        .map(|s| s.name)
        .collect()
}

/// Get a list of all available tags
pub fn list_tags() -> Vec<String> {
    let mut tags: Vec<String> = ScenarioLibrary::all_scenarios()
        .into_iter()
        .flat_map(|s| s.tags)
        .collect();
    tags.sort();
    tags.dedup();
    tags
}
