//! CLI output utilities
//!
//! Text rendering for command results and the writer used to tee log output
//! into a file.

use crate::color::{ColorValue, Tone};
use crate::core::session::ActivationReport;
use crate::page::Declaration;
use crate::testdb::{RunSummary, ScenarioResult};
use std::io::Write;

/// Describe how `input` normalizes and what both remaps make of it
pub fn describe_color(input: &str) -> Vec<String> {
    let value = ColorValue::parse(input);
    let kind = match value {
        ColorValue::Hex(_) => "hex",
        ColorValue::FunctionalRgb(_) => "rgb()",
        ColorValue::Transparent => "transparent",
        ColorValue::Unrecognized => "unrecognized",
    };

    let mut lines = vec![format!("input     {}", input.trim()), format!("kind      {}", kind)];
    if let Some(rgb) = value.rgb() {
        lines.push(format!("rgb       {}", rgb.to_css_rgb()));
        lines.push(format!("hex       {}", rgb.to_hex()));
        lines.push(format!("hsl       {}", rgb.to_hsl()));
    }
    for tone in [Tone::Darken, Tone::Lighten] {
        let result = tone.apply(value);
        lines.push(format!(
            "{:<9} {} ({})",
            tone.to_string(),
            result.to_hex(),
            result.to_hsl()
        ));
    }
    lines
}

/// Render an activation report as indented lines
pub fn format_activation(report: &ActivationReport) -> Vec<String> {
    vec![
        format!(
            "Style block: {}",
            if report.replaced_style {
                "replaced"
            } else {
                "installed"
            }
        ),
        format!(
            "Variables:   {} examined, {} darkened, {} lightened",
            report.variables.examined, report.variables.darkened, report.variables.lightened
        ),
        format!(
            "Elements:    {} visited, {} skipped",
            report.scan.elements_visited, report.scan.elements_skipped
        ),
        format!(
            "Overrides:   {} written, {} properties left alone, {} failed",
            report.scan.overrides_written,
            report.scan.properties_skipped,
            report.scan.write_failures + report.variables.write_failures
        ),
    ]
}

/// One line per forced declaration, with the element tag when known
pub fn format_overrides<'a, F>(overrides: &[Declaration], tag_of: F) -> Vec<String>
where
    F: Fn(&Declaration) -> Option<&'a str>,
{
    overrides
        .iter()
        .map(|d| {
            format!(
                "{:<8} <{}> {}: {} !important",
                d.node.to_string(),
                tag_of(d).unwrap_or("?"),
                d.property,
                d.value
            )
        })
        .collect()
}

pub fn format_scenario_result(result: &ScenarioResult) -> Vec<String> {
    let mut lines = vec![format!(
        "{} {} ({} ms)",
        if result.passed { "✅" } else { "❌" },
        result.name,
        result.duration_ms
    )];
    if let Some(report) = &result.activation {
        lines.extend(format_activation(report).into_iter().map(|l| format!("   {}", l)));
    }
    if result.incremental.elements_visited > 0 {
        lines.push(format!(
            "   Inserted:    {} elements, {} overrides",
            result.incremental.elements_visited, result.incremental.overrides_written
        ));
    }
    lines.extend(result.failures.iter().map(|f| format!("   ✗ {}", f)));
    lines
}

pub fn format_summary(summary: &RunSummary) -> String {
    format!(
        "Scenarios: {} total, {} passed, {} failed ({:.1}%)",
        summary.total,
        summary.passed,
        summary.failed,
        summary.pass_rate()
    )
}

/// A writer that writes to both console and file
///
/// Used for logging to both stderr and a log file simultaneously.
pub struct DualWriter {
    pub console: std::io::Stderr,
    pub file: std::fs::File,
}

impl Write for DualWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        // console output is best effort, the file is authoritative
        let _ = self.console.write(buf);
        self.file.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        let _ = self.console.flush();
        self.file.flush()
    }
}

// ============================================================================
// Tests
// ============================================================================
