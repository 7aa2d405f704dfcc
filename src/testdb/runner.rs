//! Scenario runner
//!
//! Replays page scenarios through a real `DarkModeSession` on a `MockPage`
//! and compares what happened with what the scenario expects.

use super::mock_page::MockPage;
use super::scenarios::{PageScenario, ScenarioLibrary};
use crate::core::config::SessionConfig;
use crate::core::scanner::ScanStats;
use crate::core::session::{ActivationReport, DarkModeSession};
use crate::page::{DocumentTree, NodeId};
use log::{debug, info, warn};
use serde::Serialize;
use std::time::{Duration, Instant};

/// Result of running a single scenario
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioResult {
    /// Scenario name
    pub name: String,
    /// Whether every expectation held
    pub passed: bool,
    /// Execution time in milliseconds
    pub duration_ms: u64,
    /// Activation outcome (absent if activation failed)
    pub activation: Option<ActivationReport>,
    /// Passes run for inserted subtrees
    pub incremental: ScanStats,
    /// One line per expectation that did not hold
    pub failures: Vec<String>,
}

impl ScenarioResult {
    fn new(name: &str, duration: Duration) -> Self {
        Self {
            name: name.to_string(),
            passed: true,
            duration_ms: duration.as_millis() as u64,
            activation: None,
            incremental: ScanStats::default(),
            failures: Vec::new(),
        }
    }
}

/// Summary of a scenario run
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub results: Vec<ScenarioResult>,
}

impl RunSummary {
    /// Calculate pass rate as percentage
    pub fn pass_rate(&self) -> f64 {
        if self.total == 0 {
            100.0
        } else {
            (self.passed as f64 / self.total as f64) * 100.0
        }
    }

    /// Get all failed scenario names
    pub fn failed_scenarios(&self) -> Vec<&str> {
        self.results
            .iter()
            .filter(|r| !r.passed)
            .map(|r| r.name.as_str())
            .collect()
    }
}

/// Runs scenarios with a given session configuration
pub struct ScenarioRunner {
    config: SessionConfig,
}

impl Default for ScenarioRunner {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

impl ScenarioRunner {
    pub fn new(config: SessionConfig) -> Self {
        Self { config }
    }

    /// Run all available scenarios
    pub fn run_all(&self) -> RunSummary {
        self.run_scenarios(ScenarioLibrary::all_scenarios())
    }

    /// Run a list of scenarios
    pub fn run_scenarios(&self, scenarios: Vec<PageScenario>) -> RunSummary {
        let mut summary = RunSummary::default();
        for scenario in &scenarios {
            let result = self.run(scenario);
            summary.total += 1;
            if result.passed {
                summary.passed += 1;
            } else {
                summary.failed += 1;
            }
            summary.results.push(result);
        }
        info!(
            "Scenarios: {}/{} passed ({:.1}%)",
            summary.passed,
            summary.total,
            summary.pass_rate()
        );
        summary
    }

    /// Run one scenario end to end
    pub fn run(&self, scenario: &PageScenario) -> ScenarioResult {
        let start = Instant::now();
        debug!("Running scenario '{}'", scenario.name);

        let mut page = MockPage::from_snapshot(&scenario.snapshot);
        let mut session = DarkModeSession::new(self.config.clone());
        let mut failures = Vec::new();

        let activation = match session.activate(&mut page) {
            Ok(report) => Some(report),
            Err(e) => {
                failures.push(format!("activation failed: {}", e));
                None
            }
        };

        let mut incremental = ScanStats::default();
        if activation.is_some() {
            incremental = self.apply_insertions(scenario, &mut page, &mut session, &mut failures);
        }

        if let Some(report) = &activation {
            compare_counts(scenario, report, &incremental, &mut failures);
        }
        check_colors(scenario, &page, &mut failures);

        let mut result = ScenarioResult::new(&scenario.name, start.elapsed());
        result.passed = failures.is_empty();
        result.activation = activation;
        result.incremental = incremental;
        result.failures = failures;

        if !result.passed {
            warn!(
                "Scenario '{}' failed: {}",
                scenario.name,
                result.failures.join("; ")
            );
        }
        result
    }

    fn apply_insertions(
        &self,
        scenario: &PageScenario,
        page: &mut MockPage,
        session: &mut DarkModeSession,
        failures: &mut Vec<String>,
    ) -> ScanStats {
        if scenario.insertions.is_empty() {
            return ScanStats::default();
        }

        let target: Option<NodeId> = page
            .first_by_tag(&scenario.insert_under)
            .or_else(|| page.body());
        let Some(target) = target else {
            failures.push(format!("no <{}> to insert under", scenario.insert_under));
            return ScanStats::default();
        };

        for subtree in &scenario.insertions {
            if let Err(e) = page.insert_subtree(target, subtree) {
                failures.push(format!("insertion failed: {}", e));
            }
        }

        match session.flush(page) {
            Ok(stats) => stats,
            Err(e) => {
                failures.push(format!("flush failed: {}", e));
                ScanStats::default()
            }
        }
    }
}

fn compare_counts(
    scenario: &PageScenario,
    report: &ActivationReport,
    incremental: &ScanStats,
    failures: &mut Vec<String>,
) {
    let expected = &scenario.expected;
    let checks = [
        ("elements", expected.elements, report.scan.elements_visited),
        ("overrides", expected.overrides, report.scan.overrides_written),
        (
            "variables rewritten",
            expected.variables_rewritten,
            report.variables.rewritten(),
        ),
        (
            "incremental overrides",
            expected.incremental_overrides,
            incremental.overrides_written,
        ),
    ];
    for (label, want, got) in checks {
        if want != got {
            failures.push(format!("{}: expected {}, got {}", label, want, got));
        }
    }
}

fn check_colors(scenario: &PageScenario, page: &MockPage, failures: &mut Vec<String>) {
    for check in &scenario.color_checks {
        let Some(node) = page.first_by_tag(&check.tag) else {
            failures.push(format!("no <{}> element", check.tag));
            continue;
        };
        let actual = page.override_of(node, check.property);
        if actual != check.expected.as_deref() {
            failures.push(format!(
                "<{}> {}: expected {:?}, got {:?}",
                check.tag, check.property, check.expected, actual
            ));
        }
    }

    for (name, want) in &scenario.variable_checks {
        let actual = page.root_property(name);
        if actual != Some(want.as_str()) {
            failures.push(format!("{}: expected {}, got {:?}", name, want, actual));
        }
    }
}
